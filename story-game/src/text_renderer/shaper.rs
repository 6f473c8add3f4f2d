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

use glm::Vec2;
use crate::error::FontLoadError;
use crate::text_renderer::font::FontData;

/// One positioned glyph of a shaped line, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapedGlyph {
    /// Face-specific glyph index, opaque outside the rasterizer.
    pub glyph_id: u32,
    /// Byte offset of the source cluster in the line.
    pub cluster: u32,
    pub advance: Vec2,
    pub offset: Vec2,
}

/// Thin adapter over the OpenType shaping engine for one face.
pub struct Shaper<'f> {
    face: rustybuzz::Face<'f>,
    units_to_pixels: f32,
}

impl<'f> Shaper<'f> {
    pub fn new(font: &'f FontData) -> Result<Self, FontLoadError> {
        let face = rustybuzz::Face::from_slice(font.bytes(), 0).ok_or(FontLoadError::InvalidFace)?;
        let units_per_em = face.units_per_em() as f32;
        if units_per_em <= 0.0 {
            return Err(FontLoadError::InvalidFace);
        }
        Ok(Self { face, units_to_pixels: font.pixel_size as f32 / units_per_em })
    }

    /// Shapes one line. Script, language and direction are guessed from the text.
    pub fn shape(&self, line: &str) -> Vec<ShapedGlyph> {
        if line.is_empty() {
            return Vec::new();
        }
        let mut buffer = rustybuzz::UnicodeBuffer::new();
        buffer.push_str(line);
        buffer.guess_segment_properties();
        let output = rustybuzz::shape(&self.face, &[], buffer);

        output
            .glyph_infos()
            .iter()
            .zip(output.glyph_positions())
            .map(|(info, position)| ShapedGlyph {
                glyph_id: info.glyph_id,
                cluster: info.cluster,
                advance: scale(position.x_advance, position.y_advance, self.units_to_pixels),
                offset: scale(position.x_offset, position.y_offset, self.units_to_pixels),
            })
            .collect()
    }
}

/// Sum of a run's advances, i.e. where the pen ends relative to where it started.
pub fn total_advance(glyphs: &[ShapedGlyph]) -> Vec2 {
    glyphs.iter().fold(Vec2::zeros(), |pen, glyph| pen + glyph.advance)
}

fn scale(x: i32, y: i32, units_to_pixels: f32) -> Vec2 {
    glm::vec2(x as f32 * units_to_pixels, y as f32 * units_to_pixels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn glyph(advance: f32) -> ShapedGlyph {
        ShapedGlyph { glyph_id: 1, cluster: 0, advance: glm::vec2(advance, 0.0), offset: Vec2::zeros() }
    }

    #[test]
    fn font_units_scale_to_pixels() {
        // 2048 units per em at 36px
        let v = scale(1229, -410, 36.0 / 2048.0);
        assert_relative_eq!(v.x, 21.603516, epsilon = 1e-4);
        assert_relative_eq!(v.y, -7.207031, epsilon = 1e-4);
    }

    #[test]
    fn total_advance_sums_the_run() {
        let run = [glyph(10.5), glyph(7.25), glyph(0.0), glyph(12.0)];
        let total = total_advance(&run);
        assert_relative_eq!(total.x, 29.75);
        assert_relative_eq!(total.y, 0.0);
    }

    #[test]
    fn empty_run_does_not_move_the_pen() {
        assert_eq!(total_advance(&[]), Vec2::zeros());
    }
}
