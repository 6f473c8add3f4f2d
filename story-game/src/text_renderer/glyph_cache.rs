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

//! Persistent glyph textures, keyed by face, size and glyph id.
//!
//! Each resident glyph owns one texture until it is evicted (least recently
//! used first) or the cache is dropped.

use std::num::NonZeroUsize;
use glm::{IVec2, UVec2};
use lru::LruCache;
use crate::error::GlyphError;
use crate::text_renderer::font::FontId;
use crate::text_renderer::rasterizer::{GlyphBitmap, IGlyphRasterizer};

pub trait ITextureAllocator {
    type Texture: Copy;

    fn upload(&mut self, bitmap: &GlyphBitmap) -> Self::Texture;
    fn release(&mut self, texture: Self::Texture);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlyphKey {
    pub font: FontId,
    pub pixel_size: u32,
    pub glyph_id: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachedGlyph<T> {
    /// `None` for glyphs with no visible pixels, such as spaces.
    pub texture: Option<T>,
    pub size: UVec2,
    /// Left and top bearing of the bitmap relative to the pen on the baseline.
    pub bearing: IVec2,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

pub struct GlyphCache<A: ITextureAllocator> {
    allocator: A,
    entries: LruCache<GlyphKey, CachedGlyph<A::Texture>>,
    stats: CacheStats,
}

impl<A: ITextureAllocator> GlyphCache<A> {
    pub fn new(allocator: A, capacity: NonZeroUsize) -> Self {
        Self { allocator, entries: LruCache::new(capacity), stats: CacheStats::default() }
    }

    /// Returns the resident glyph, rasterizing and uploading it on a miss.
    pub fn get_or_rasterize<R>(&mut self, rasterizer: &mut R, glyph_id: u32) -> Result<CachedGlyph<A::Texture>, GlyphError>
    where
        R: IGlyphRasterizer + ?Sized,
    {
        let key = GlyphKey { font: rasterizer.font_id(), pixel_size: rasterizer.pixel_size(), glyph_id };
        if let Some(glyph) = self.entries.get(&key) {
            self.stats.hits += 1;
            return Ok(*glyph);
        }

        self.stats.misses += 1;
        let bitmap = rasterizer.rasterize(glyph_id)?;
        let glyph = CachedGlyph {
            texture: if bitmap.is_empty() { None } else { Some(self.allocator.upload(&bitmap)) },
            size: glm::vec2(bitmap.width, bitmap.rows),
            bearing: glm::vec2(bitmap.left, bitmap.top),
        };
        if let Some((evicted_key, evicted)) = self.entries.push(key, glyph) {
            log::debug!("Evicting glyph {} from cache", evicted_key.glyph_id);
            self.stats.evictions += 1;
            if let Some(texture) = evicted.texture {
                self.allocator.release(texture);
            }
        }
        Ok(glyph)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Releases every resident texture.
    pub fn clear(&mut self) {
        while let Some((_, glyph)) = self.entries.pop_lru() {
            if let Some(texture) = glyph.texture {
                self.allocator.release(texture);
            }
        }
    }
}

impl<A: ITextureAllocator> Drop for GlyphCache<A> {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Ledger {
        uploaded: Vec<u32>,
        released: Vec<u32>,
    }

    struct FakeAllocator {
        next: u32,
        ledger: Rc<RefCell<Ledger>>,
    }

    impl ITextureAllocator for FakeAllocator {
        type Texture = u32;

        fn upload(&mut self, _bitmap: &GlyphBitmap) -> u32 {
            self.next += 1;
            self.ledger.borrow_mut().uploaded.push(self.next);
            self.next
        }

        fn release(&mut self, texture: u32) {
            self.ledger.borrow_mut().released.push(texture);
        }
    }

    struct FakeRasterizer {
        calls: Vec<u32>,
    }

    impl IGlyphRasterizer for FakeRasterizer {
        fn font_id(&self) -> FontId {
            FontId(7)
        }

        fn pixel_size(&self) -> u32 {
            36
        }

        fn rasterize(&mut self, glyph_id: u32) -> Result<GlyphBitmap, GlyphError> {
            self.calls.push(glyph_id);
            match glyph_id {
                0 => Ok(GlyphBitmap { width: 0, rows: 0, left: 0, top: 0, pixels: Vec::new() }),
                99 => Err(GlyphError { glyph_id, code: 6 }),
                _ => Ok(GlyphBitmap { width: 2, rows: 3, left: 1, top: 3, pixels: vec![255; 6] }),
            }
        }
    }

    fn cache(capacity: usize) -> (GlyphCache<FakeAllocator>, Rc<RefCell<Ledger>>) {
        let ledger = Rc::new(RefCell::new(Ledger::default()));
        let allocator = FakeAllocator { next: 0, ledger: Rc::clone(&ledger) };
        (GlyphCache::new(allocator, NonZeroUsize::new(capacity).unwrap()), ledger)
    }

    #[test]
    fn repeated_glyph_is_rasterized_once() {
        let (mut cache, ledger) = cache(4);
        let mut rasterizer = FakeRasterizer { calls: Vec::new() };

        let first = cache.get_or_rasterize(&mut rasterizer, 5).unwrap();
        let second = cache.get_or_rasterize(&mut rasterizer, 5).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.size, glm::vec2(2, 3));
        assert_eq!(first.bearing, glm::vec2(1, 3));
        assert_eq!(rasterizer.calls, vec![5]);
        assert_eq!(ledger.borrow().uploaded.len(), 1);
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1, evictions: 0 });
    }

    #[test]
    fn least_recently_used_glyph_is_evicted_and_released() {
        let (mut cache, ledger) = cache(2);
        let mut rasterizer = FakeRasterizer { calls: Vec::new() };

        let a = cache.get_or_rasterize(&mut rasterizer, 1).unwrap();
        cache.get_or_rasterize(&mut rasterizer, 2).unwrap();
        cache.get_or_rasterize(&mut rasterizer, 1).unwrap();
        cache.get_or_rasterize(&mut rasterizer, 3).unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(ledger.borrow().released, vec![2]);
        assert_eq!(cache.get_or_rasterize(&mut rasterizer, 1).unwrap(), a);
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn blank_glyphs_take_no_texture() {
        let (mut cache, ledger) = cache(2);
        let mut rasterizer = FakeRasterizer { calls: Vec::new() };

        let space = cache.get_or_rasterize(&mut rasterizer, 0).unwrap();
        assert_eq!(space.texture, None);
        assert!(ledger.borrow().uploaded.is_empty());
        cache.get_or_rasterize(&mut rasterizer, 0).unwrap();
        assert_eq!(rasterizer.calls, vec![0]);
    }

    #[test]
    fn failed_rasterization_is_not_cached() {
        let (mut cache, _ledger) = cache(2);
        let mut rasterizer = FakeRasterizer { calls: Vec::new() };

        assert_eq!(cache.get_or_rasterize(&mut rasterizer, 99), Err(GlyphError { glyph_id: 99, code: 6 }));
        assert!(cache.is_empty());
        assert!(cache.get_or_rasterize(&mut rasterizer, 99).is_err());
        assert_eq!(rasterizer.calls, vec![99, 99]);
    }

    #[test]
    fn dropping_the_cache_releases_every_texture() {
        let (mut cache, ledger) = cache(8);
        let mut rasterizer = FakeRasterizer { calls: Vec::new() };
        for glyph_id in 1..=3 {
            cache.get_or_rasterize(&mut rasterizer, glyph_id).unwrap();
        }
        drop(cache);

        let mut released = ledger.borrow().released.clone();
        released.sort_unstable();
        assert_eq!(released, ledger.borrow().uploaded);
    }
}
