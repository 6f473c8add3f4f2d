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

//! Text pipeline: wrap, shape, rasterize, cache, draw.

use glm::{Vec2, Vec3};

pub mod font;
pub mod glyph_cache;
pub mod line;
pub mod rasterizer;
pub mod renderer;
pub mod shaper;
pub mod wrap;

pub use font::FontData;
pub use renderer::TextRenderer;

pub trait ITextRenderer {
    /// Draws one line in `color`. Returns the final pen position.
    fn render_text_ex(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        scale: f32,
        color: &Vec3
    ) -> Vec2;
}
