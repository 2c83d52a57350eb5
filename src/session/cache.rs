use std::collections::HashMap;

use image::RgbaImage;

use crate::filter::Filter;
use crate::foundation::color::BorderColor;

/// Identity of one rasterized strip.
///
/// Stickers are not part of the key: any sticker change bumps the session's visual version,
/// which empties the cache instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameKey {
    /// Render frame index (`None` = final shots).
    pub frame: Option<usize>,
    /// Filter burned in.
    pub filter: Filter,
    /// Strip background.
    pub border: BorderColor,
    /// Raster scale in thousandths, so 1.0 and 2.0 renders never alias.
    pub scale_milli: u32,
}

impl FrameKey {
    /// Build a key, quantizing `scale`.
    pub fn new(frame: Option<usize>, filter: Filter, border: BorderColor, scale: f64) -> Self {
        Self {
            frame,
            filter,
            border,
            scale_milli: (scale * 1000.0).round().clamp(0.0, f64::from(u32::MAX)) as u32,
        }
    }
}

/// Counters for cache effectiveness.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameCacheStats {
    /// Lookups served from the cache.
    pub hits: u64,
    /// Lookups that had to rasterize.
    pub misses: u64,
    /// Times the cache was emptied by a visual change.
    pub invalidations: u64,
}

/// Rasterized strips keyed by [`FrameKey`], valid for one visual version.
///
/// Hits hand out independent copies so callers can mutate them freely.
#[derive(Debug, Default)]
pub struct FrameCache {
    version: u64,
    entries: HashMap<FrameKey, RgbaImage>,
    stats: FrameCacheStats,
}

impl FrameCache {
    /// Empty cache at version 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Visual version the entries belong to.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Number of cached rasters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hit/miss counters.
    pub fn stats(&self) -> FrameCacheStats {
        self.stats
    }

    /// Copy of the raster for `key`, if cached.
    pub fn get(&mut self, key: &FrameKey) -> Option<RgbaImage> {
        match self.entries.get(key) {
            Some(img) => {
                self.stats.hits += 1;
                Some(img.clone())
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Whether `key` is cached, without touching the counters.
    pub fn contains(&self, key: &FrameKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Store a raster.
    pub fn insert(&mut self, key: FrameKey, img: RgbaImage) {
        self.entries.insert(key, img);
    }

    /// Adopt `version`; entries from any other version are dropped.
    pub fn sync_version(&mut self, version: u64) {
        if version == self.version {
            return;
        }
        self.version = version;
        if !self.entries.is_empty() {
            self.entries.clear();
            self.stats.invalidations += 1;
        }
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(frame: usize) -> FrameKey {
        FrameKey::new(Some(frame), Filter::Normal, BorderColor::WHITE, 1.0)
    }

    #[test]
    fn hits_are_independent_copies() {
        let mut cache = FrameCache::new();
        cache.insert(key(0), RgbaImage::from_pixel(2, 2, image::Rgba([1, 2, 3, 255])));

        let mut a = cache.get(&key(0)).unwrap();
        a.put_pixel(0, 0, image::Rgba([9, 9, 9, 9]));

        let b = cache.get(&key(0)).unwrap();
        assert_eq!(b.get_pixel(0, 0).0, [1, 2, 3, 255]);
        assert_eq!(cache.stats().hits, 2);
    }

    #[test]
    fn version_change_empties_cache() {
        let mut cache = FrameCache::new();
        cache.insert(key(0), RgbaImage::new(1, 1));
        cache.sync_version(0);
        assert_eq!(cache.len(), 1);

        cache.sync_version(1);
        assert!(cache.is_empty());
        assert!(cache.get(&key(0)).is_none());
        assert_eq!(cache.stats().invalidations, 1);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn key_separates_scale_filter_and_border() {
        let base = key(3);
        assert_ne!(base, FrameKey::new(Some(3), Filter::Normal, BorderColor::WHITE, 2.0));
        assert_ne!(base, FrameKey::new(Some(3), Filter::Bw, BorderColor::WHITE, 1.0));
        assert_ne!(base, FrameKey::new(Some(3), Filter::Normal, BorderColor::BLACK, 1.0));
        assert_eq!(base, FrameKey::new(Some(3), Filter::Normal, BorderColor::WHITE, 1.0004));
    }
}
