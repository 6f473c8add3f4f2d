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

use std::marker::PhantomData;
use std::ptr;
use freetype::freetype::{
    FT_Done_Face, FT_Done_FreeType, FT_Face, FT_Init_FreeType, FT_Library, FT_Load_Glyph,
    FT_New_Memory_Face, FT_Set_Pixel_Sizes, FT_LOAD_RENDER,
};
use crate::error::{FontLoadError, GlyphError};
use crate::text_renderer::font::{FontData, FontId};

/// Single-channel coverage bitmap of one glyph, rows packed top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphBitmap {
    pub width: u32,
    pub rows: u32,
    /// Distance from the pen to the bitmap's left edge.
    pub left: i32,
    /// Distance from the baseline up to the bitmap's top row.
    pub top: i32,
    pub pixels: Vec<u8>,
}

impl GlyphBitmap {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.rows == 0
    }
}

pub trait IGlyphRasterizer {
    fn font_id(&self) -> FontId;
    fn pixel_size(&self) -> u32;
    fn rasterize(&mut self, glyph_id: u32) -> Result<GlyphBitmap, GlyphError>;
}

/// FreeType library and face, acquired once and released on drop.
pub struct FreeTypeRasterizer<'f> {
    library: FT_Library,
    face: FT_Face,
    font_id: FontId,
    pixel_size: u32,
    // FreeType reads the face from the borrowed bytes for as long as it lives
    _font: PhantomData<&'f FontData>,
}

impl<'f> FreeTypeRasterizer<'f> {
    pub fn new(font: &'f FontData) -> Result<Self, FontLoadError> {
        let bytes = font.bytes();
        let mut library: FT_Library = ptr::null_mut();
        let mut face: FT_Face = ptr::null_mut();
        unsafe {
            check("FT_Init_FreeType", FT_Init_FreeType(&mut library))?;
            let error = FT_New_Memory_Face(library, bytes.as_ptr(), bytes.len() as _, 0, &mut face);
            if let Err(e) = check("FT_New_Memory_Face", error) {
                FT_Done_FreeType(library);
                return Err(e);
            }
            if let Err(e) = check("FT_Set_Pixel_Sizes", FT_Set_Pixel_Sizes(face, 0, font.pixel_size)) {
                FT_Done_Face(face);
                FT_Done_FreeType(library);
                return Err(e);
            }
        }
        log::info!("Acquired FreeType face at {}px", font.pixel_size);
        Ok(Self { library, face, font_id: font.id, pixel_size: font.pixel_size, _font: PhantomData })
    }
}

impl IGlyphRasterizer for FreeTypeRasterizer<'_> {
    fn font_id(&self) -> FontId {
        self.font_id
    }

    fn pixel_size(&self) -> u32 {
        self.pixel_size
    }

    fn rasterize(&mut self, glyph_id: u32) -> Result<GlyphBitmap, GlyphError> {
        unsafe {
            let error = FT_Load_Glyph(self.face, glyph_id, FT_LOAD_RENDER as _);
            if error != 0 {
                return Err(GlyphError { glyph_id, code: error });
            }
            let slot = (*self.face).glyph;
            let bitmap = &(*slot).bitmap;
            let width = bitmap.width as u32;
            let rows = bitmap.rows as u32;
            let pitch = bitmap.pitch as i32;
            let pixels = if bitmap.buffer.is_null() || width == 0 || rows == 0 {
                Vec::new()
            } else {
                let len = pitch.unsigned_abs() as usize * rows as usize;
                pack_rows(std::slice::from_raw_parts(bitmap.buffer, len), width, rows, pitch)
            };
            Ok(GlyphBitmap {
                width,
                rows,
                left: (*slot).bitmap_left as i32,
                top: (*slot).bitmap_top as i32,
                pixels,
            })
        }
    }
}

impl Drop for FreeTypeRasterizer<'_> {
    fn drop(&mut self) {
        unsafe {
            FT_Done_Face(self.face);
            FT_Done_FreeType(self.library);
        }
        log::info!("Released FreeType face");
    }
}

fn check(call: &'static str, error: i32) -> Result<(), FontLoadError> {
    if error == 0 {
        Ok(())
    } else {
        Err(FontLoadError::FreeType { call, code: error })
    }
}

/// Copies `rows` rows of `width` bytes out of a pitched buffer.
/// A negative pitch means the rows are stored bottom-up.
fn pack_rows(buffer: &[u8], width: u32, rows: u32, pitch: i32) -> Vec<u8> {
    let stride = pitch.unsigned_abs() as usize;
    let width = width as usize;
    let rows = rows as usize;
    let mut pixels = Vec::with_capacity(width * rows);
    for row in 0..rows {
        let source_row = if pitch < 0 { rows - 1 - row } else { row };
        let start = source_row * stride;
        pixels.extend_from_slice(&buffer[start..start + width]);
    }
    pixels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_rows_drops_padding() {
        // 3 wide, padded to a pitch of 4
        let buffer = [1, 2, 3, 0, 4, 5, 6, 0];
        assert_eq!(pack_rows(&buffer, 3, 2, 4), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn pack_rows_flips_bottom_up_buffers() {
        let buffer = [4, 5, 6, 1, 2, 3];
        assert_eq!(pack_rows(&buffer, 3, 2, -3), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn empty_bitmap_reports_empty() {
        let bitmap = GlyphBitmap { width: 0, rows: 0, left: 0, top: 0, pixels: Vec::new() };
        assert!(bitmap.is_empty());
    }
}
