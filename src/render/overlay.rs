use std::fmt::Write as _;
use std::sync::Arc;

use crate::foundation::error::{PhotoboothError, PhotoboothResult};
use crate::render::scene::CompositeScene;

/// Brand line size in strip units.
const BRAND_FONT_SIZE: f64 = 22.0;
/// Date stamp size in strip units.
const DATE_FONT_SIZE: f64 = 11.0;

/// Font database shared by every overlay rasterization of a surface.
pub(crate) fn system_fontdb() -> Arc<usvg::fontdb::Database> {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    Arc::new(db)
}

/// SVG document for everything drawn above the photos: header text and stickers.
///
/// Coordinates are logical strip units; the document is sized to the strip.
pub(crate) fn overlay_svg(scene: &CompositeScene) -> String {
    let (w, h) = (scene.size.width, scene.size.height);
    let ink = scene.border.contrasting_ink().to_hex();
    let header = &scene.header;
    let cx = (header.rect.x0 + header.rect.x1) / 2.0;

    let mut svg = String::with_capacity(512 + scene.stickers.len() * 160);
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
    );
    let _ = write!(
        svg,
        r#"<text x="{cx}" y="{y}" font-family="sans-serif" font-weight="bold" font-size="{BRAND_FONT_SIZE}" text-anchor="middle" fill="{ink}">{}</text>"#,
        escape_xml(&header.brand),
        y = header.rect.y0 + BRAND_FONT_SIZE + 6.0,
    );
    let _ = write!(
        svg,
        r#"<text x="{cx}" y="{y}" font-family="monospace" font-size="{DATE_FONT_SIZE}" text-anchor="middle" fill="{ink}">{}</text>"#,
        escape_xml(&header.date_stamp),
        y = header.rect.y1 - 8.0,
    );

    for sticker in &scene.stickers {
        let p = sticker.position();
        let _ = write!(
            svg,
            r#"<text x="{x}" y="{y}" font-size="{size}" text-anchor="middle" dominant-baseline="central">{}</text>"#,
            escape_xml(sticker.glyph()),
            x = p.x,
            y = p.y,
            size = sticker.size(),
        );
    }
    svg.push_str("</svg>");
    svg
}

/// Rasterize the overlay at `width` x `height` pixels into premultiplied RGBA8.
pub(crate) fn rasterize_overlay(
    svg: &str,
    fontdb: Arc<usvg::fontdb::Database>,
    width: u32,
    height: u32,
) -> PhotoboothResult<Vec<u8>> {
    let opts = usvg::Options {
        fontdb,
        ..Default::default()
    };
    let tree = usvg::Tree::from_str(svg, &opts)
        .map_err(|e| PhotoboothError::raster(format!("parse overlay svg: {e}")))?;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| PhotoboothError::raster("failed to allocate overlay pixmap"))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(&tree, xform, &mut pixmap.as_mut());
    Ok(pixmap.take())
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
