use ab_glyph::{point, Font, FontArc, GlyphId, PxScale, ScaleFont};
use image::{Pixel, Rgba, RgbaImage};

pub const fn rgb(hex: u32) -> Rgba<u8> {
    Rgba([(hex >> 16) as u8, (hex >> 8) as u8, hex as u8, 0xFF])
}

/// Axis-aligned box in canvas pixels.
#[derive(Debug, Clone, Copy)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn centered(cx: i32, y: i32, w: u32, h: u32) -> Self {
        Self {
            x: cx - (w / 2) as i32,
            y,
            w,
            h,
        }
    }

    /// Whether (px, py) lies inside the box with corners rounded to `radius`.
    fn contains_rounded(&self, px: i32, py: i32, radius: u32) -> bool {
        let (x0, y0) = (self.x, self.y);
        let (x1, y1) = (self.x + self.w as i32 - 1, self.y + self.h as i32 - 1);
        if px < x0 || px > x1 || py < y0 || py > y1 {
            return false;
        }

        let r = radius.min(self.w / 2).min(self.h / 2) as i32;
        let cx = if px < x0 + r {
            x0 + r
        } else if px > x1 - r {
            x1 - r
        } else {
            return true;
        };
        let cy = if py < y0 + r {
            y0 + r
        } else if py > y1 - r {
            y1 - r
        } else {
            return true;
        };

        let (dx, dy) = (px - cx, py - cy);
        dx * dx + dy * dy <= r * r
    }

    fn shrink(&self, by: u32) -> Self {
        Self {
            x: self.x + by as i32,
            y: self.y + by as i32,
            w: self.w.saturating_sub(by * 2),
            h: self.h.saturating_sub(by * 2),
        }
    }
}

fn put(img: &mut RgbaImage, x: i32, y: i32, color: Rgba<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        let pixel = img.get_pixel_mut(x as u32, y as u32);
        if color[3] == 0xFF {
            *pixel = color;
        } else {
            pixel.blend(&color);
        }
    }
}

pub fn fill_rounded_rect(img: &mut RgbaImage, rect: Rect, radius: u32, color: Rgba<u8>) {
    for py in rect.y..rect.y + rect.h as i32 {
        for px in rect.x..rect.x + rect.w as i32 {
            if rect.contains_rounded(px, py, radius) {
                put(img, px, py, color);
            }
        }
    }
}

pub fn stroke_rounded_rect(
    img: &mut RgbaImage,
    rect: Rect,
    radius: u32,
    thickness: u32,
    color: Rgba<u8>,
) {
    let inner = rect.shrink(thickness);
    let inner_radius = radius.saturating_sub(thickness);
    for py in rect.y..rect.y + rect.h as i32 {
        for px in rect.x..rect.x + rect.w as i32 {
            if rect.contains_rounded(px, py, radius)
                && !inner.contains_rounded(px, py, inner_radius)
            {
                put(img, px, py, color);
            }
        }
    }
}

/// Horizontal advance of `text` at `size` px, including kerning.
pub fn text_width(font: &FontArc, size: f32, text: &str) -> f32 {
    let scaled = font.as_scaled(PxScale::from(size));
    let mut width = 0.0;
    let mut last: Option<GlyphId> = None;
    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(prev) = last {
            width += scaled.kern(prev, id);
        }
        width += scaled.h_advance(id);
        last = Some(id);
    }
    width
}

/// Draw `text` with its top-left corner at (x, y).
pub fn draw_text(
    img: &mut RgbaImage,
    font: &FontArc,
    size: f32,
    x: f32,
    y: f32,
    text: &str,
    color: Rgba<u8>,
) {
    let scale = PxScale::from(size);
    let scaled = font.as_scaled(scale);
    let baseline = y + scaled.ascent();
    let mut caret = x;
    let mut last: Option<GlyphId> = None;

    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(prev) = last {
            caret += scaled.kern(prev, id);
        }
        let glyph = id.with_scale_and_position(scale, point(caret, baseline));
        caret += scaled.h_advance(id);
        last = Some(id);

        let Some(outlined) = font.outline_glyph(glyph) else {
            continue;
        };
        let bounds = outlined.px_bounds();
        outlined.draw(|gx, gy, coverage| {
            let alpha = (coverage.clamp(0.0, 1.0) * color[3] as f32) as u8;
            if alpha == 0 {
                return;
            }
            let px = bounds.min.x as i32 + gx as i32;
            let py = bounds.min.y as i32 + gy as i32;
            put(img, px, py, Rgba([color[0], color[1], color[2], alpha]));
        });
    }
}

/// Draw `text` horizontally centred on `cx` with its top at `y`.
pub fn draw_text_centered(
    img: &mut RgbaImage,
    font: &FontArc,
    size: f32,
    cx: f32,
    y: f32,
    text: &str,
    color: Rgba<u8>,
) {
    let width = text_width(font, size, text);
    draw_text(img, font, size, cx - width / 2.0, y, text, color);
}

/// Text height in px for vertical centring.
pub fn line_height(font: &FontArc, size: f32) -> f32 {
    font.as_scaled(PxScale::from(size)).height()
}
