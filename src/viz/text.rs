//! Text measurement.

/// Heuristic: estimate pixel width of text (Plotters has no built-in text measuring).
pub fn estimate_text_width_px(text: &str, font_px: f64, bold: bool) -> f64 {
    let per_char = if bold { 0.66 } else { 0.60 };
    (text.chars().count() as f64) * font_px * per_char
}

/// Line box height for a font size, in pixels.
pub fn line_height_px(font_px: f64) -> f64 {
    font_px * 1.2
}

/// Points to pixels at `dpi`.
#[inline]
pub fn pt_to_px(pt: f64, dpi: f64) -> f64 {
    pt * dpi / 72.0
}
