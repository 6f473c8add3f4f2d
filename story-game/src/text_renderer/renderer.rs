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

use std::ffi::c_void;
use std::mem;
use std::num::NonZeroUsize;
use std::ptr;
use gl::types::{GLsizei, GLsizeiptr, GLuint};
use glm::{Mat4, Vec2, Vec3};
use story_shared::shader::Shader;
use crate::error::GameError;
use crate::text_renderer::font::FontData;
use crate::text_renderer::glyph_cache::{GlyphCache, ITextureAllocator};
use crate::text_renderer::line::{lay_out_line, QuadVertices};
use crate::text_renderer::rasterizer::{FreeTypeRasterizer, GlyphBitmap, IGlyphRasterizer};
use crate::text_renderer::shaper::{total_advance, Shaper};
use crate::text_renderer::wrap::wrap;
use crate::text_renderer::ITextRenderer;

const VERTEX_SHADER: &str = include_str!("../../resources/shaders/text.vert");
const FRAGMENT_SHADER: &str = include_str!("../../resources/shaders/text.frag");

/// Uploads glyph bitmaps as single-channel `GL_RED` textures.
pub struct GlTextureAllocator;

impl ITextureAllocator for GlTextureAllocator {
    type Texture = GLuint;

    fn upload(&mut self, bitmap: &GlyphBitmap) -> GLuint {
        let mut texture = 0;
        unsafe {
            gl::GenTextures(1, &mut texture);
            gl::BindTexture(gl::TEXTURE_2D, texture);
            gl::TexImage2D(
                gl::TEXTURE_2D,
                0,
                gl::RED as i32,
                bitmap.width as GLsizei,
                bitmap.rows as GLsizei,
                0,
                gl::RED,
                gl::UNSIGNED_BYTE,
                bitmap.pixels.as_ptr() as *const c_void
            );
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, gl::CLAMP_TO_EDGE as i32);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, gl::CLAMP_TO_EDGE as i32);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::LINEAR as i32);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl::LINEAR as i32);
            gl::BindTexture(gl::TEXTURE_2D, 0);
        }
        texture
    }

    fn release(&mut self, texture: GLuint) {
        unsafe { gl::DeleteTextures(1, &texture) }
    }
}

/// Draws shaped lines as one textured quad per glyph through a single reused VBO.
pub struct TextRenderer<'f> {
    shader: Shader,
    vao: GLuint,
    vbo: GLuint,
    transform: Mat4,
    shaper: Shaper<'f>,
    rasterizer: FreeTypeRasterizer<'f>,
    cache: GlyphCache<GlTextureAllocator>,
}

impl<'f> TextRenderer<'f> {
    pub fn new(font: &'f FontData, cache_capacity: usize) -> Result<Self, GameError> {
        let shader = Shader::compile(VERTEX_SHADER, FRAGMENT_SHADER)?;
        shader.use_shader();
        shader.set_integer("text", 0);

        let shaper = Shaper::new(font)?;
        let rasterizer = FreeTypeRasterizer::new(font)?;
        let capacity = NonZeroUsize::new(cache_capacity).unwrap_or(NonZeroUsize::MIN);
        let cache = GlyphCache::new(GlTextureAllocator, capacity);

        // configure VAO/VBO for texture quads
        // -----------------------------------
        let mut vao = 0;
        let mut vbo = 0;
        unsafe {
            // glyph bitmaps are tightly packed single bytes
            gl::PixelStorei(gl::UNPACK_ALIGNMENT, 1);
            gl::GenVertexArrays(1, &mut vao);
            gl::GenBuffers(1, &mut vbo);
            gl::BindVertexArray(vao);
            gl::BindBuffer(gl::ARRAY_BUFFER, vbo);
            gl::BufferData(
                gl::ARRAY_BUFFER,
                mem::size_of::<QuadVertices>() as GLsizeiptr,
                ptr::null(),
                gl::DYNAMIC_DRAW
            );
            gl::EnableVertexAttribArray(0);
            gl::VertexAttribPointer(0, 4, gl::FLOAT, gl::FALSE, (4 * mem::size_of::<f32>()) as GLsizei, ptr::null());
            gl::BindBuffer(gl::ARRAY_BUFFER, 0);
            gl::BindVertexArray(0);
            gl::UseProgram(0);
        }

        log::info!("Text renderer ready, caching up to {} glyphs", capacity);
        Ok(Self { shader, vao, vbo, transform: Mat4::identity(), shaper, rasterizer, cache })
    }

    /// Sets the matrix taking text-space positions to clip space for later draws.
    pub fn set_transform(&mut self, transform: &Mat4) {
        self.transform = *transform;
    }

    pub fn pixel_size(&self) -> u32 {
        self.rasterizer.pixel_size()
    }

    /// Pen displacement of `text` at scale 1, without drawing it.
    pub fn measure(&self, text: &str) -> Vec2 {
        total_advance(&self.shaper.shape(text))
    }

    /// Shapes and draws one line with its baseline starting at `origin`.
    ///
    /// Each glyph is drawn as soon as it is looked up, so an eviction made by a
    /// later glyph of the same line never releases a texture still to be drawn.
    pub fn draw_line(&mut self, text: &str, origin: Vec2, scale: f32, color: &Vec3) -> Vec2 {
        let glyphs = self.shaper.shape(text);
        if glyphs.is_empty() {
            return origin;
        }

        self.shader.use_shader();
        self.shader.set_matrix4("WORLD_TO_CLIP", &self.transform);
        self.shader.set_vector3f("textColor", color);
        unsafe {
            gl::ActiveTexture(gl::TEXTURE0);
            gl::BindVertexArray(self.vao);
        }

        let vbo = self.vbo;
        let cache = &mut self.cache;
        let rasterizer = &mut self.rasterizer;
        let pen = lay_out_line(
            &glyphs,
            origin,
            scale,
            |glyph| match cache.get_or_rasterize(rasterizer, glyph.glyph_id) {
                Ok(cached) => Some(cached),
                Err(e) => {
                    log::warn!("{}", e);
                    None
                }
            },
            |placed| unsafe {
                // render glyph texture over quad
                gl::BindTexture(gl::TEXTURE_2D, placed.texture);
                // update content of VBO memory
                gl::BindBuffer(gl::ARRAY_BUFFER, vbo);
                gl::BufferSubData(
                    gl::ARRAY_BUFFER,
                    0,
                    mem::size_of::<QuadVertices>() as GLsizeiptr,
                    placed.vertices.as_ptr() as *const c_void
                );
                gl::BindBuffer(gl::ARRAY_BUFFER, 0);
                gl::DrawArrays(gl::TRIANGLES, 0, 6);
            },
        );

        unsafe {
            gl::BindVertexArray(0);
            gl::BindTexture(gl::TEXTURE_2D, 0);
            gl::UseProgram(0);
        }
        pen
    }

    /// Wraps `text` to `max_chars` and draws each line `line_height` below the last.
    pub fn draw_paragraph(
        &mut self,
        text: &str,
        origin: Vec2,
        max_chars: usize,
        line_height: f32,
        color: &Vec3
    ) -> usize {
        let mut rows = 0;
        for line in wrap(text, max_chars) {
            let y = origin.y - line.row as f32 * line_height;
            self.draw_line(line.text, glm::vec2(origin.x, y), 1.0, color);
            rows += 1;
        }
        rows
    }
}

impl ITextRenderer for TextRenderer<'_> {
    fn render_text_ex(&mut self, text: &str, x: f32, y: f32, scale: f32, color: &Vec3) -> Vec2 {
        self.draw_line(text, glm::vec2(x, y), scale, color)
    }
}

impl Drop for TextRenderer<'_> {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteVertexArrays(1, &self.vao);
            gl::DeleteBuffers(1, &self.vbo);
        }
        let stats = self.cache.stats();
        log::info!(
            "Glyph cache: {} hits, {} misses, {} evictions",
            stats.hits, stats.misses, stats.evictions
        );
    }
}
