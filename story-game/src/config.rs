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

use std::fs;
use std::io;
use std::path::Path;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use crate::dialogue::NodeId;
use crate::error::ConfigError;

pub const CONFIG_PATH: &str = "resources/config/game.toml";

pub trait Config: DeserializeOwned + Default {
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    /// Like `load_from_file`, but a missing file yields the defaults.
    fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match Self::load_from_file(path) {
            Err(ConfigError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                log::info!("No config at {:?}, using defaults", path);
                Ok(Self::default())
            }
            other => other,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub window: WindowConfig,
    pub font: FontConfig,
    pub text: TextConfig,
    pub dialogue: DialogueConfig,
    pub glyph_cache: GlyphCacheConfig,
    pub audio: AudioConfig,
}

impl Config for GameConfig {}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub locale: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self { width: 1280, height: 720, locale: "en".to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub path: String,
    pub pixel_size: u32,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self { path: "resources/fonts/OpenSans-Regular.ttf".to_string(), pixel_size: 36 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Wrap width, in characters.
    pub max_line_chars: usize,
    /// Baseline distance as a multiple of the font's pixel size.
    pub line_spacing: f32,
    pub margin: f32,
    pub primary_color: [f32; 3],
    pub secondary_color: [f32; 3],
    pub banner: String,
    pub banner_color: [f32; 3],
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            max_line_chars: 48,
            line_spacing: 1.3,
            margin: 18.0,
            primary_color: [1.0, 1.0, 1.0],
            secondary_color: [0.7, 0.8, 1.0],
            banner: String::new(),
            banner_color: [1.0, 0.85, 0.4],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DialogueConfig {
    pub script: String,
    pub start_node: NodeId,
    pub max_auto_chain: usize,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self { script: "resources/scripts/story.txt".to_string(), start_node: 1, max_auto_chain: 64 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GlyphCacheConfig {
    pub capacity: usize,
}

impl Default for GlyphCacheConfig {
    fn default() -> Self {
        Self { capacity: 512 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub loop_path: Option<String>,
    pub volume: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self { loop_path: None, volume: 1.0 }
    }
}
