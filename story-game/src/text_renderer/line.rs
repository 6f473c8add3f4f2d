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
use crate::text_renderer::glyph_cache::CachedGlyph;
use crate::text_renderer::shaper::ShapedGlyph;

/// Two triangles of `[x, y, u, v]`, v = 0 on the bitmap's top row.
pub type QuadVertices = [[f32; 4]; 6];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedGlyph<T> {
    pub texture: T,
    pub vertices: QuadVertices,
}

pub fn quad_vertices(x: f32, y: f32, w: f32, h: f32) -> QuadVertices {
    [
        [x, y + h, 0.0, 0.0],
        [x, y, 0.0, 1.0],
        [x + w, y, 1.0, 1.0],
        [x, y + h, 0.0, 0.0],
        [x + w, y, 1.0, 1.0],
        [x + w, y + h, 1.0, 0.0],
    ]
}

/// Places a shaped run starting at `origin`, in shaping order.
///
/// `lookup` supplies each glyph's bitmap metrics and `draw` receives its quad
/// before the next glyph is looked up, so a texture handed to `draw` is still
/// resident when it is drawn. Glyphs `lookup` cannot supply, and glyphs without
/// pixels, get no quad but still advance the pen. Returns the final pen position.
pub fn lay_out_line<T, F, D>(glyphs: &[ShapedGlyph], origin: Vec2, scale: f32, mut lookup: F, mut draw: D) -> Vec2
where
    T: Copy,
    F: FnMut(&ShapedGlyph) -> Option<CachedGlyph<T>>,
    D: FnMut(PlacedGlyph<T>),
{
    let mut pen = origin;
    for glyph in glyphs {
        if let Some(CachedGlyph { texture: Some(texture), size, bearing }) = lookup(glyph) {
            let x = pen.x + (glyph.offset.x + bearing.x as f32) * scale;
            let y = pen.y + (glyph.offset.y + bearing.y as f32 - size.y as f32) * scale;
            let w = size.x as f32 * scale;
            let h = size.y as f32 * scale;
            draw(PlacedGlyph { texture, vertices: quad_vertices(x, y, w, h) });
        }
        pen += glyph.advance * scale;
    }
    pen
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::num::NonZeroUsize;
    use std::rc::Rc;
    use approx::assert_relative_eq;
    use crate::error::GlyphError;
    use crate::text_renderer::font::FontId;
    use crate::text_renderer::glyph_cache::{GlyphCache, ITextureAllocator};
    use crate::text_renderer::rasterizer::{GlyphBitmap, IGlyphRasterizer};
    use crate::text_renderer::shaper::total_advance;

    fn shaped(glyph_id: u32, advance: f32) -> ShapedGlyph {
        ShapedGlyph { glyph_id, cluster: 0, advance: glm::vec2(advance, 0.0), offset: Vec2::zeros() }
    }

    fn collect<F>(run: &[ShapedGlyph], origin: Vec2, scale: f32, lookup: F) -> (Vec<PlacedGlyph<u32>>, Vec2)
    where
        F: FnMut(&ShapedGlyph) -> Option<CachedGlyph<u32>>,
    {
        let mut placed = Vec::new();
        let pen = lay_out_line(run, origin, scale, lookup, |glyph| placed.push(glyph));
        (placed, pen)
    }

    fn solid(texture: u32) -> CachedGlyph<u32> {
        CachedGlyph { texture: Some(texture), size: glm::vec2(10, 20), bearing: glm::vec2(2, 15) }
    }

    #[test]
    fn pen_ends_at_sum_of_advances() {
        let run = [shaped(1, 12.5), shaped(2, 9.0), shaped(3, 14.25)];
        let (_, pen) = collect(&run, glm::vec2(100.0, 50.0), 1.0, |g| Some(solid(g.glyph_id)));
        let total = total_advance(&run);
        assert_relative_eq!(pen.x, 100.0 + total.x);
        assert_relative_eq!(pen.y, 50.0);
    }

    #[test]
    fn quads_follow_shaping_order_and_bearings() {
        let run = [shaped(1, 12.0), shaped(2, 12.0)];
        let (placed, _) = collect(&run, glm::vec2(0.0, 0.0), 1.0, |g| Some(solid(g.glyph_id)));

        assert_eq!(placed.iter().map(|p| p.texture).collect::<Vec<_>>(), vec![1, 2]);
        // left bearing 2, descends 20 - 15 = 5 below the baseline
        assert_eq!(placed[0].vertices[1], [2.0, -5.0, 0.0, 1.0]);
        assert_eq!(placed[0].vertices[5], [12.0, 15.0, 1.0, 0.0]);
        assert_eq!(placed[1].vertices[1], [14.0, -5.0, 0.0, 1.0]);
    }

    #[test]
    fn scale_applies_to_advances_and_quads() {
        let run = [shaped(1, 10.0)];
        let (placed, pen) = collect(&run, Vec2::zeros(), 0.5, |g| Some(solid(g.glyph_id)));
        assert_relative_eq!(pen.x, 5.0);
        assert_eq!(placed[0].vertices[2], [6.0, -2.5, 1.0, 1.0]);
    }

    #[test]
    fn blank_and_missing_glyphs_still_advance() {
        let run = [shaped(1, 8.0), shaped(0, 4.0), shaped(99, 6.0), shaped(2, 8.0)];
        let (placed, pen) = collect(&run, Vec2::zeros(), 1.0, |g| match g.glyph_id {
            0 => Some(CachedGlyph { texture: None, size: glm::vec2(0, 0), bearing: glm::vec2(0, 0) }),
            99 => None,
            id => Some(solid(id)),
        });
        assert_eq!(placed.len(), 2);
        assert_relative_eq!(placed[1].vertices[1][0], 18.0 + 2.0);
        assert_relative_eq!(pen.x, 26.0);
    }

    #[test]
    fn offsets_shift_only_their_glyph() {
        let mut run = [shaped(1, 10.0), shaped(2, 10.0)];
        run[0].offset = glm::vec2(1.0, 3.0);
        let (placed, pen) = collect(&run, Vec2::zeros(), 1.0, |g| Some(solid(g.glyph_id)));
        assert_eq!(placed[0].vertices[1], [3.0, -2.0, 0.0, 1.0]);
        assert_eq!(placed[1].vertices[1], [12.0, -5.0, 0.0, 1.0]);
        assert_relative_eq!(pen.x, 20.0);
    }

    struct LiveTextures {
        next: u32,
        live: Rc<RefCell<HashSet<u32>>>,
    }

    impl ITextureAllocator for LiveTextures {
        type Texture = u32;

        fn upload(&mut self, _bitmap: &GlyphBitmap) -> u32 {
            self.next += 1;
            self.live.borrow_mut().insert(self.next);
            self.next
        }

        fn release(&mut self, texture: u32) {
            self.live.borrow_mut().remove(&texture);
        }
    }

    struct SolidRasterizer;

    impl IGlyphRasterizer for SolidRasterizer {
        fn font_id(&self) -> FontId {
            FontId(1)
        }

        fn pixel_size(&self) -> u32 {
            36
        }

        fn rasterize(&mut self, _glyph_id: u32) -> Result<GlyphBitmap, GlyphError> {
            Ok(GlyphBitmap { width: 1, rows: 1, left: 0, top: 1, pixels: vec![255] })
        }
    }

    #[test]
    fn line_wider_than_cache_draws_only_resident_textures() {
        let live = Rc::new(RefCell::new(HashSet::new()));
        let allocator = LiveTextures { next: 0, live: Rc::clone(&live) };
        let mut cache = GlyphCache::new(allocator, NonZeroUsize::new(2).unwrap());
        let mut rasterizer = SolidRasterizer;
        let run = [shaped(1, 5.0), shaped(2, 5.0), shaped(3, 5.0), shaped(1, 5.0)];

        let mut drawn = Vec::new();
        let pen = lay_out_line(
            &run,
            Vec2::zeros(),
            1.0,
            |g| cache.get_or_rasterize(&mut rasterizer, g.glyph_id).ok(),
            |placed| {
                assert!(live.borrow().contains(&placed.texture), "texture {} drawn after release", placed.texture);
                drawn.push(placed.texture);
            },
        );

        // glyph 1 was evicted by glyph 3 and uploaded again for the last quad
        assert_eq!(drawn, vec![1, 2, 3, 4]);
        assert_relative_eq!(pen.x, 20.0);
        assert_eq!(cache.stats().evictions, 2);
    }
}

