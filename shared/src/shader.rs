// SPDX-License-Identifier: Apache-2.0

// Copyright 2024 src_resources
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::ffi::CString;
use std::ptr;
use gl::types::{GLchar, GLenum, GLint, GLuint};
use glm::{Mat4, Vec3};

#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("shader source contains an interior NUL byte")]
    InvalidSource,
    #[error("{stage} shader failed to compile: {log}")]
    Compile { stage: &'static str, log: String },
    #[error("program failed to link: {log}")]
    Link { log: String },
}

/// A linked GLSL program. Deleted when dropped.
#[derive(Debug)]
pub struct Shader {
    pub id: GLuint,
}

impl Shader {
    pub fn compile(vertex_source: &str, fragment_source: &str) -> Result<Self, ShaderError> {
        let vertex = compile_stage(gl::VERTEX_SHADER, "vertex", vertex_source)?;
        let fragment = match compile_stage(gl::FRAGMENT_SHADER, "fragment", fragment_source) {
            Ok(fragment) => fragment,
            Err(e) => {
                unsafe { gl::DeleteShader(vertex) };
                return Err(e);
            }
        };

        unsafe {
            let id = gl::CreateProgram();
            gl::AttachShader(id, vertex);
            gl::AttachShader(id, fragment);
            gl::LinkProgram(id);
            // shaders are linked into the program and no longer needed
            gl::DeleteShader(vertex);
            gl::DeleteShader(fragment);

            let mut success = GLint::from(gl::FALSE);
            gl::GetProgramiv(id, gl::LINK_STATUS, &mut success);
            if success != GLint::from(gl::TRUE) {
                let log = program_info_log(id);
                gl::DeleteProgram(id);
                return Err(ShaderError::Link { log });
            }
            log::debug!("Linked shader program {}", id);
            Ok(Self { id })
        }
    }

    pub fn use_shader(&self) {
        unsafe { gl::UseProgram(self.id) }
    }

    pub fn set_integer(&self, name: &str, value: i32) {
        unsafe { gl::Uniform1i(self.uniform_location(name), value) }
    }

    pub fn set_vector3f(&self, name: &str, value: &Vec3) {
        unsafe { gl::Uniform3f(self.uniform_location(name), value.x, value.y, value.z) }
    }

    pub fn set_matrix4(&self, name: &str, matrix: &Mat4) {
        unsafe { gl::UniformMatrix4fv(self.uniform_location(name), 1, gl::FALSE, matrix.as_ptr()) }
    }

    fn uniform_location(&self, name: &str) -> GLint {
        match CString::new(name) {
            Ok(name) => unsafe { gl::GetUniformLocation(self.id, name.as_ptr()) },
            Err(_) => -1,
        }
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        unsafe { gl::DeleteProgram(self.id) }
    }
}

fn compile_stage(kind: GLenum, stage: &'static str, source: &str) -> Result<GLuint, ShaderError> {
    let source = CString::new(source).map_err(|_| ShaderError::InvalidSource)?;
    unsafe {
        let shader = gl::CreateShader(kind);
        gl::ShaderSource(shader, 1, &source.as_ptr(), ptr::null());
        gl::CompileShader(shader);

        let mut success = GLint::from(gl::FALSE);
        gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut success);
        if success != GLint::from(gl::TRUE) {
            let mut len = 0;
            gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut len);
            let mut buffer = vec![0u8; len.max(1) as usize];
            gl::GetShaderInfoLog(shader, len, ptr::null_mut(), buffer.as_mut_ptr() as *mut GLchar);
            gl::DeleteShader(shader);
            return Err(ShaderError::Compile { stage, log: trim_log(buffer) });
        }
        Ok(shader)
    }
}

unsafe fn program_info_log(program: GLuint) -> String {
    let mut len = 0;
    gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut len);
    let mut buffer = vec![0u8; len.max(1) as usize];
    gl::GetProgramInfoLog(program, len, ptr::null_mut(), buffer.as_mut_ptr() as *mut GLchar);
    trim_log(buffer)
}

fn trim_log(mut buffer: Vec<u8>) -> String {
    while buffer.last() == Some(&0) {
        buffer.pop();
    }
    String::from_utf8_lossy(&buffer).trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trim_log_strips_terminator_and_newline() {
        let log = trim_log(b"0:1(1): error: syntax error\n\0".to_vec());
        assert_eq!(log, "0:1(1): error: syntax error");
    }

    #[test]
    fn trim_log_of_empty_buffer_is_empty() {
        assert_eq!(trim_log(vec![0]), "");
    }
}
