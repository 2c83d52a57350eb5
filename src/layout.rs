//! Photo strip layouts and their static slot templates.

use kurbo::{Rect, Size};
use serde::{Deserialize, Serialize};

/// Logical strip width before any export upscale.
pub const STRIP_WIDTH: f64 = 360.0;
/// Outer border thickness around the strip contents.
pub const STRIP_PADDING: f64 = 16.0;
/// Height of the header band (date stamp + brand text).
pub const HEADER_HEIGHT: f64 = 56.0;
/// Gap between neighbouring photo slots.
pub const SLOT_GAP: f64 = 10.0;
/// Photo slots are 4:3 landscape.
pub const SLOT_ASPECT: f64 = 3.0 / 4.0;

/// Arrangement chosen at the start of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layout {
    /// Four shots staggered down two columns.
    #[serde(rename = "4-diagonal")]
    FourDiagonal,
    /// Three shots stepping diagonally across the strip.
    #[serde(rename = "3-diagonal")]
    ThreeDiagonal,
    /// Four shots in a 2x2 grid.
    #[serde(rename = "4-square")]
    FourSquare,
    /// Six shots in a 2x3 grid.
    #[serde(rename = "6-grid")]
    SixGrid,
}

struct Template {
    /// Area width measured in slot widths.
    columns: f64,
    /// Slot origins in units of `(slot width + gap, slot height + gap)`.
    slots: &'static [(f64, f64)],
}

const FOUR_DIAGONAL: Template = Template {
    columns: 2.0,
    slots: &[(0.0, 0.0), (1.0, 0.5), (0.0, 1.0), (1.0, 1.5)],
};

const THREE_DIAGONAL: Template = Template {
    columns: 1.5,
    slots: &[(0.0, 0.0), (0.25, 1.0), (0.5, 2.0)],
};

const FOUR_SQUARE: Template = Template {
    columns: 2.0,
    slots: &[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)],
};

const SIX_GRID: Template = Template {
    columns: 2.0,
    slots: &[
        (0.0, 0.0),
        (1.0, 0.0),
        (0.0, 1.0),
        (1.0, 1.0),
        (0.0, 2.0),
        (1.0, 2.0),
    ],
};

impl Layout {
    /// Every layout, in picker order.
    pub const ALL: [Layout; 4] = [
        Layout::FourDiagonal,
        Layout::ThreeDiagonal,
        Layout::FourSquare,
        Layout::SixGrid,
    ];

    /// Number of bursts a session with this layout captures.
    pub fn shot_count(self) -> usize {
        self.template().slots.len()
    }

    /// Stable kebab-case name, as used in config files.
    pub fn name(self) -> &'static str {
        match self {
            Layout::FourDiagonal => "4-diagonal",
            Layout::ThreeDiagonal => "3-diagonal",
            Layout::FourSquare => "4-square",
            Layout::SixGrid => "6-grid",
        }
    }

    fn template(self) -> &'static Template {
        match self {
            Layout::FourDiagonal => &FOUR_DIAGONAL,
            Layout::ThreeDiagonal => &THREE_DIAGONAL,
            Layout::FourSquare => &FOUR_SQUARE,
            Layout::SixGrid => &SIX_GRID,
        }
    }

    /// Strip geometry in logical (unscaled) units.
    pub fn geometry(self) -> StripGeometry {
        let t = self.template();
        let area_x = STRIP_PADDING;
        let area_y = STRIP_PADDING + HEADER_HEIGHT;
        let area_w = STRIP_WIDTH - 2.0 * STRIP_PADDING;

        let cell_w = (area_w - SLOT_GAP * (t.columns - 1.0)) / t.columns;
        let cell_h = cell_w * SLOT_ASPECT;

        let slots: Vec<Rect> = t
            .slots
            .iter()
            .map(|&(ux, uy)| {
                let x = area_x + ux * (cell_w + SLOT_GAP);
                let y = area_y + uy * (cell_h + SLOT_GAP);
                Rect::new(x, y, x + cell_w, y + cell_h)
            })
            .collect();

        let bottom = slots.iter().map(|r| r.y1).fold(area_y, f64::max);

        StripGeometry {
            size: Size::new(STRIP_WIDTH, bottom + STRIP_PADDING),
            header: Rect::new(
                STRIP_PADDING,
                STRIP_PADDING,
                STRIP_WIDTH - STRIP_PADDING,
                STRIP_PADDING + HEADER_HEIGHT,
            ),
            slots,
        }
    }
}

impl std::fmt::Display for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        Layout::ALL
            .into_iter()
            .find(|l| l.name() == s)
            .ok_or_else(|| {
                format!(
                    "unknown layout '{s}' (expected 4-diagonal, 3-diagonal, 4-square or 6-grid)"
                )
            })
    }
}

/// Resolved placement of a strip's header and photo slots.
#[derive(Clone, Debug, PartialEq)]
pub struct StripGeometry {
    /// Full strip size.
    pub size: Size,
    /// Header band.
    pub header: Rect,
    /// One rect per burst, in shot order.
    pub slots: Vec<Rect>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shot_counts_match_layout_names() {
        assert_eq!(Layout::FourDiagonal.shot_count(), 4);
        assert_eq!(Layout::ThreeDiagonal.shot_count(), 3);
        assert_eq!(Layout::FourSquare.shot_count(), 4);
        assert_eq!(Layout::SixGrid.shot_count(), 6);
    }

    #[test]
    fn slots_stay_inside_strip_and_below_header() {
        for layout in Layout::ALL {
            let g = layout.geometry();
            assert_eq!(g.slots.len(), layout.shot_count());
            for slot in &g.slots {
                assert!(slot.x0 >= STRIP_PADDING - 1e-9, "{layout}: {slot:?}");
                assert!(slot.x1 <= STRIP_WIDTH - STRIP_PADDING + 1e-9, "{layout}: {slot:?}");
                assert!(slot.y0 >= g.header.y1 - 1e-9, "{layout}: {slot:?}");
                assert!(slot.y1 <= g.size.height - STRIP_PADDING + 1e-9, "{layout}: {slot:?}");
            }
        }
    }

    #[test]
    fn grid_slots_do_not_overlap() {
        for layout in Layout::ALL {
            let g = layout.geometry();
            for (i, a) in g.slots.iter().enumerate() {
                for b in &g.slots[i + 1..] {
                    assert!(a.intersect(*b).area() < 1e-6, "{layout}: {a:?} vs {b:?}");
                }
            }
        }
    }

    #[test]
    fn parses_and_serializes_kebab_names() {
        assert_eq!("4-square".parse::<Layout>().unwrap(), Layout::FourSquare);
        assert!("5-grid".parse::<Layout>().is_err());
        let json = serde_json::to_string(&Layout::SixGrid).unwrap();
        assert_eq!(json, "\"6-grid\"");
        let back: Layout = serde_json::from_str("\"3-diagonal\"").unwrap();
        assert_eq!(back, Layout::ThreeDiagonal);
    }
}
