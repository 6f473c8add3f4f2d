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

extern crate nalgebra_glm as glm;

use std::ffi::{c_void, CStr};
use std::process::ExitCode;
use std::ptr;
use gl::types::{GLchar, GLenum, GLsizei, GLuint};
use glfw::{Action, Context, Key, OpenGlProfileHint, WindowEvent, WindowHint};
use rust_i18n::t;
use story_shared::filesystem::get_path;
use crate::config::{Config, GameConfig, CONFIG_PATH};
use crate::error::GameError;
use crate::game::Game;
use crate::text_renderer::FontData;

pub mod config;
pub mod dialogue;
pub mod error;
pub mod game;
pub mod sound_engine;
pub mod text_renderer;

rust_i18n::i18n!("locales", fallback = "en");

extern "system" fn gl_debug_output(
    source: GLenum,
    gltype: GLenum,
    id: GLuint,
    severity: GLenum,
    _length: GLsizei,
    message: *const GLchar,
    _user_param: *mut c_void
) {
    if id == 131169 || id == 131185 || id == 131218 || id == 131204 { // ignore these non-significant error codes
        return;
    }

    let message = unsafe { CStr::from_ptr(message) }.to_string_lossy();
    let source = match source {
        gl::DEBUG_SOURCE_API => "API",
        gl::DEBUG_SOURCE_WINDOW_SYSTEM => "Window System",
        gl::DEBUG_SOURCE_SHADER_COMPILER => "Shader Compiler",
        gl::DEBUG_SOURCE_THIRD_PARTY => "Third Party",
        gl::DEBUG_SOURCE_APPLICATION => "Application",
        _ => "Other",
    };
    let gltype = match gltype {
        gl::DEBUG_TYPE_ERROR => "Error",
        gl::DEBUG_TYPE_DEPRECATED_BEHAVIOR => "Deprecated Behaviour",
        gl::DEBUG_TYPE_UNDEFINED_BEHAVIOR => "Undefined Behaviour",
        gl::DEBUG_TYPE_PORTABILITY => "Portability",
        gl::DEBUG_TYPE_PERFORMANCE => "Performance",
        gl::DEBUG_TYPE_MARKER => "Marker",
        gl::DEBUG_TYPE_PUSH_GROUP => "Push Group",
        gl::DEBUG_TYPE_POP_GROUP => "Pop Group",
        _ => "Other",
    };
    let level = match severity {
        gl::DEBUG_SEVERITY_HIGH => log::Level::Error,
        gl::DEBUG_SEVERITY_MEDIUM => log::Level::Warn,
        gl::DEBUG_SEVERITY_LOW => log::Level::Info,
        _ => log::Level::Debug,
    };
    log::log!(level, "GL debug message ({}) [{} / {}]: {}", id, source, gltype, message);
}

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("{}", t!("error.fatal", reason = e.to_string()));
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), GameError> {
    let config = GameConfig::load_or_default(&get_path(CONFIG_PATH))?;
    rust_i18n::set_locale(&config.window.locale);

    // glfw: initialize and configure
    // ------------------------------
    let mut glfw = glfw::init(glfw::fail_on_errors).map_err(|_| GameError::Window)?;

    glfw.window_hint(WindowHint::ContextVersionMajor(3));
    glfw.window_hint(WindowHint::ContextVersionMinor(3));
    glfw.window_hint(WindowHint::OpenGlProfile(OpenGlProfileHint::Core));
    glfw.window_hint(WindowHint::OpenGlForwardCompat(true));
    glfw.window_hint(WindowHint::OpenGlDebugContext(cfg!(debug_assertions)));

    // glfw window creation
    // --------------------
    let (mut window, events) = glfw.create_window(
        config.window.width, config.window.height,
        &t!("window.title"), glfw::WindowMode::Windowed)
        .ok_or(GameError::Window)?;
    window.make_current();
    window.set_key_polling(true);
    window.set_mouse_button_polling(true);
    window.set_framebuffer_size_polling(true);

    // load all OpenGL function pointers
    // ---------------------------------
    gl::load_with(|s| window.get_proc_address(s) as *const _);

    // OpenGL configuration
    // --------------------
    let (width, height) = window.get_framebuffer_size();
    unsafe {
        if gl::DebugMessageCallback::is_loaded() {
            gl::Enable(gl::DEBUG_OUTPUT);
            gl::Enable(gl::DEBUG_OUTPUT_SYNCHRONOUS); // makes sure errors are displayed synchronously
            gl::DebugMessageCallback(Some(gl_debug_output), ptr::null());
            gl::DebugMessageControl(gl::DONT_CARE, gl::DONT_CARE, gl::DONT_CARE, 0, ptr::null(), gl::TRUE);
        }

        gl::Viewport(0, 0, width, height);
        gl::Enable(gl::BLEND);
        gl::BlendFunc(gl::SRC_ALPHA, gl::ONE_MINUS_SRC_ALPHA);
    }

    // initialize game
    // ---------------
    let font = FontData::load(&get_path(&config.font.path), config.font.pixel_size)?;
    let mut game = Game::new(config, &font, width.max(0) as u32, height.max(0) as u32)?;

    // deltaTime variables
    // -------------------
    let mut last_frame = glfw.get_time() as f32;

    while !window.should_close() {
        // calculate delta time
        // --------------------
        let current_frame = glfw.get_time() as f32;
        let delta_time = current_frame - last_frame;
        last_frame = current_frame;
        glfw.poll_events();

        // manage user input
        // -----------------
        for (_, event) in glfw::flush_messages(&events) {
            match event {
                WindowEvent::Key(Key::Escape, _, Action::Press, _) => window.set_should_close(true),
                WindowEvent::FramebufferSize(width, height) => {
                    // make sure the viewport matches the new window dimensions; note that width and
                    // height will be significantly larger than specified on retina displays
                    unsafe { gl::Viewport(0, 0, width, height) };
                    game.resize(width.max(0) as u32, height.max(0) as u32);
                }
                _ => {}
            }
            game.process_event(&event)?;
        }

        // update game state
        // -----------------
        game.update(delta_time)?;

        // render
        // ------
        unsafe {
            gl::ClearColor(0.5, 0.5, 0.5, 1.0);
            gl::Clear(gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT);
        }
        game.render();

        window.swap_buffers();
    }

    Ok(())
}
