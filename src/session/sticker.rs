use kurbo::Point;
use serde::{Deserialize, Serialize};

use crate::foundation::error::{PhotoboothError, PhotoboothResult};

/// Smallest allowed sticker scale.
pub const MIN_STICKER_SCALE: f64 = 0.5;
/// Largest allowed sticker scale.
pub const MAX_STICKER_SCALE: f64 = 3.0;
/// Glyph size in strip units at scale 1.0.
pub const STICKER_BASE_SIZE: f64 = 40.0;
/// Step used by the editor's +/- resize handles.
pub const STICKER_RESIZE_STEP: f64 = 0.1;

/// Glyphs offered by the sticker tray.
pub const STICKER_TRAY: [&str; 12] = [
    "\u{2764}\u{fe0f}",
    "\u{2b50}",
    "\u{2728}",
    "\u{1f338}",
    "\u{1f496}",
    "\u{1f60e}",
    "\u{1f389}",
    "\u{1f308}",
    "\u{1f98b}",
    "\u{1f370}",
    "\u{1f431}",
    "\u{1f4f8}",
];

/// Identity of a placed sticker, unique within one editor session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StickerId(pub u64);

/// Decorative glyph placed on the strip.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Sticker {
    id: StickerId,
    glyph: String,
    position: Point,
    scale: f64,
}

impl Sticker {
    /// Sticker centred on `position` at scale 1.0.
    pub fn new(id: StickerId, glyph: impl Into<String>, position: Point) -> Self {
        Self {
            id,
            glyph: glyph.into(),
            position,
            scale: 1.0,
        }
    }

    /// Identity.
    pub fn id(&self) -> StickerId {
        self.id
    }

    /// Glyph text.
    pub fn glyph(&self) -> &str {
        &self.glyph
    }

    /// Centre in strip coordinates.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Current scale, always within `[MIN_STICKER_SCALE, MAX_STICKER_SCALE]`.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Rendered glyph size in strip units.
    pub fn size(&self) -> f64 {
        STICKER_BASE_SIZE * self.scale
    }

    fn set_scale(&mut self, scale: f64) {
        self.scale = clamp_scale(scale);
    }
}

fn clamp_scale(scale: f64) -> f64 {
    if !scale.is_finite() {
        return 1.0;
    }
    scale.clamp(MIN_STICKER_SCALE, MAX_STICKER_SCALE)
}

/// Ordered set of stickers; later stickers draw on top.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StickerBoard {
    stickers: Vec<Sticker>,
    next_id: u64,
}

impl StickerBoard {
    /// Empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stickers in draw order.
    pub fn stickers(&self) -> &[Sticker] {
        &self.stickers
    }

    /// Number of stickers.
    pub fn len(&self) -> usize {
        self.stickers.len()
    }

    /// Whether no sticker is placed.
    pub fn is_empty(&self) -> bool {
        self.stickers.is_empty()
    }

    /// Look a sticker up.
    pub fn get(&self, id: StickerId) -> Option<&Sticker> {
        self.stickers.iter().find(|s| s.id == id)
    }

    /// Place a new sticker on top and return its id.
    pub fn add(&mut self, glyph: &str, position: Point, scale: f64) -> PhotoboothResult<StickerId> {
        if glyph.trim().is_empty() {
            return Err(PhotoboothError::validation("sticker glyph must be non-empty"));
        }
        if !position.x.is_finite() || !position.y.is_finite() {
            return Err(PhotoboothError::validation(
                "sticker position must be finite",
            ));
        }
        let id = StickerId(self.next_id);
        self.next_id += 1;
        let mut sticker = Sticker::new(id, glyph, position);
        sticker.set_scale(scale);
        self.stickers.push(sticker);
        Ok(id)
    }

    /// Commit a drag.
    pub fn move_to(&mut self, id: StickerId, position: Point) -> PhotoboothResult<()> {
        if !position.x.is_finite() || !position.y.is_finite() {
            return Err(PhotoboothError::validation(
                "sticker position must be finite",
            ));
        }
        self.get_mut(id)?.position = position;
        Ok(())
    }

    /// Change scale by `delta`, clamped; returns the new scale.
    pub fn resize_by(&mut self, id: StickerId, delta: f64) -> PhotoboothResult<f64> {
        let s = self.get_mut(id)?;
        // Round to avoid 0.1-step drift accumulating past the bounds' decimal values.
        let next = ((s.scale + delta) * 1000.0).round() / 1000.0;
        s.set_scale(next);
        Ok(s.scale)
    }

    /// Set scale directly, clamped; returns the new scale.
    pub fn set_scale(&mut self, id: StickerId, scale: f64) -> PhotoboothResult<f64> {
        let s = self.get_mut(id)?;
        s.set_scale(scale);
        Ok(s.scale)
    }

    /// Remove a sticker.
    pub fn remove(&mut self, id: StickerId) -> PhotoboothResult<Sticker> {
        let idx = self
            .stickers
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| unknown(id))?;
        Ok(self.stickers.remove(idx))
    }

    /// Remove every sticker; returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let n = self.stickers.len();
        self.stickers.clear();
        n
    }

    fn get_mut(&mut self, id: StickerId) -> PhotoboothResult<&mut Sticker> {
        self.stickers
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| unknown(id))
    }
}

fn unknown(id: StickerId) -> PhotoboothError {
    PhotoboothError::validation(format!("no sticker with id {}", id.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_steps_never_leave_bounds() {
        let mut board = StickerBoard::new();
        let id = board.add("\u{2b50}", Point::new(10.0, 10.0), 1.0).unwrap();

        for _ in 0..100 {
            let s = board.resize_by(id, STICKER_RESIZE_STEP).unwrap();
            assert!(s <= MAX_STICKER_SCALE);
        }
        assert_eq!(board.get(id).unwrap().scale(), MAX_STICKER_SCALE);

        for _ in 0..100 {
            let s = board.resize_by(id, -STICKER_RESIZE_STEP).unwrap();
            assert!(s >= MIN_STICKER_SCALE);
        }
        assert_eq!(board.get(id).unwrap().scale(), MIN_STICKER_SCALE);
    }

    #[test]
    fn add_clamps_initial_scale_and_assigns_fresh_ids() {
        let mut board = StickerBoard::new();
        let a = board.add("a", Point::ZERO, 10.0).unwrap();
        let b = board.add("b", Point::ZERO, f64::NAN).unwrap();
        assert_ne!(a, b);
        assert_eq!(board.get(a).unwrap().scale(), MAX_STICKER_SCALE);
        assert_eq!(board.get(b).unwrap().scale(), 1.0);

        board.remove(a).unwrap();
        let c = board.add("c", Point::ZERO, 1.0).unwrap();
        assert_ne!(c, a, "ids are never reused");
    }

    #[test]
    fn move_and_remove_unknown_ids_fail() {
        let mut board = StickerBoard::new();
        assert!(board.move_to(StickerId(9), Point::ZERO).is_err());
        assert!(board.remove(StickerId(9)).is_err());
        assert!(board.add("  ", Point::ZERO, 1.0).is_err());
    }

    #[test]
    fn move_commits_new_position() {
        let mut board = StickerBoard::new();
        let id = board.add("x", Point::new(1.0, 2.0), 1.0).unwrap();
        board.move_to(id, Point::new(30.0, 40.0)).unwrap();
        assert_eq!(board.get(id).unwrap().position(), Point::new(30.0, 40.0));
        assert_eq!(board.get(id).unwrap().size(), STICKER_BASE_SIZE);
    }
}
