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

use std::io;
use std::path::PathBuf;
use story_shared::shader::ShaderError;
use crate::dialogue::NodeId;

/// A dialogue script that cannot be loaded. Fatal at load time.
#[derive(Debug, thiserror::Error)]
pub enum ScriptFormatError {
    #[error("failed to read script {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("line {line}: malformed control line: {reason}")]
    MalformedControlLine { line: usize, reason: String },
    #[error("line {line}: control line has no matching text line")]
    UnmatchedControlLine { line: usize },
    #[error("node {node} has no choices")]
    NoChoices { node: NodeId },
    #[error("node {node} starts a cycle made only of auto-advancing nodes")]
    AutoAdvanceCycle { node: NodeId },
}

/// A start or successor id that names no node. Indicates a corrupt script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("dialogue node {node} does not exist")]
pub struct UnknownNodeError {
    pub node: NodeId,
}

#[derive(Debug, thiserror::Error)]
pub enum FontLoadError {
    #[error("failed to read font {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("font data is not a usable OpenType face")]
    InvalidFace,
    #[error("unsupported font pixel size {0}")]
    UnsupportedSize(u32),
    #[error("{call} failed with FreeType error {code}")]
    FreeType { call: &'static str, code: i32 },
}

/// Rasterization of a single glyph failed. The glyph is skipped for the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("failed to rasterize glyph {glyph_id}: FreeType error {code}")]
pub struct GlyphError {
    pub glyph_id: u32,
    pub code: i32,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path:?}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },
}

#[derive(Debug, thiserror::Error)]
pub enum SoundError {
    #[error("no audio output device: {0}")]
    Stream(#[from] rodio::StreamError),
    #[error("failed to create audio sink: {0}")]
    Play(#[from] rodio::PlayError),
    #[error("failed to open sample {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to decode sample: {0}")]
    Decode(#[from] rodio::decoder::DecoderError),
}

/// Everything that aborts session construction.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Script(#[from] ScriptFormatError),
    #[error(transparent)]
    UnknownNode(#[from] UnknownNodeError),
    #[error(transparent)]
    Font(#[from] FontLoadError),
    #[error(transparent)]
    Shader(#[from] ShaderError),
    #[error("failed to create window")]
    Window,
}
