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

use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::Path;
use crate::error::FontLoadError;

pub const MAX_PIXEL_SIZE: u32 = 512;

/// Identifies a loaded face in glyph cache keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontId(pub u64);

/// Outline font bytes plus the size they are rendered at.
///
/// Loaded once at startup and borrowed by the shaper and rasterizer for
/// the whole session.
pub struct FontData {
    pub id: FontId,
    pub pixel_size: u32,
    bytes: Vec<u8>,
}

impl FontData {
    pub fn load(path: &Path, pixel_size: u32) -> Result<Self, FontLoadError> {
        let bytes = fs::read(path).map_err(|source| FontLoadError::Io { path: path.to_path_buf(), source })?;
        let font = Self::from_bytes(bytes, pixel_size)?;
        log::info!("Loaded font {:?} at {}px", path, pixel_size);
        Ok(font)
    }

    pub fn from_bytes(bytes: Vec<u8>, pixel_size: u32) -> Result<Self, FontLoadError> {
        if pixel_size == 0 || pixel_size > MAX_PIXEL_SIZE {
            return Err(FontLoadError::UnsupportedSize(pixel_size));
        }
        if rustybuzz::Face::from_slice(&bytes, 0).is_none() {
            return Err(FontLoadError::InvalidFace);
        }
        let mut hasher = DefaultHasher::new();
        bytes.hash(&mut hasher);
        Ok(Self { id: FontId(hasher.finish()), pixel_size, bytes })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unsupported_sizes_before_parsing() {
        assert!(matches!(FontData::from_bytes(Vec::new(), 0), Err(FontLoadError::UnsupportedSize(0))));
        assert!(matches!(
            FontData::from_bytes(Vec::new(), MAX_PIXEL_SIZE + 1),
            Err(FontLoadError::UnsupportedSize(_))
        ));
    }

    #[test]
    fn rejects_bytes_that_are_not_a_font() {
        let result = FontData::from_bytes(b"definitely not a font".to_vec(), 36);
        assert!(matches!(result, Err(FontLoadError::InvalidFace)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = FontData::load(Path::new("resources/fonts/does-not-exist.ttf"), 36);
        assert!(matches!(result, Err(FontLoadError::Io { .. })));
    }
}
