use ab_glyph::FontArc;
use image::{imageops, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

use super::canvas::{
    draw_text, draw_text_centered, fill_rounded_rect, line_height, rgb, stroke_rounded_rect,
    text_width, Rect,
};
use super::{Assets, RenderError};
use crate::models::ShareRecord;

pub const CARD_WIDTH: u32 = 1200;
pub const CARD_HEIGHT: u32 = 630;

const TITLE: &str = "ZeroX TicTacToe";
const MAX_NAME_CHARS: usize = 18;

const BACKGROUND: Rgba<u8> = rgb(0x000000);
const ACCENT: Rgba<u8> = rgb(0x70FF5A);
const TEXT: Rgba<u8> = rgb(0xFFFFFF);

const CENTER_X: i32 = (CARD_WIDTH / 2) as i32;
const HEADER_Y: i32 = 70;
const LOGO_SIZE: u32 = 48;
const PLAYERS_Y: i32 = 190;
const PLAYER_OFFSET_X: i32 = 200;
const SYMBOL_SIZE: u32 = 60;
const RESULT_Y: f32 = 380.0;
const STATS_Y: f32 = 470.0;
const STATS_GAP: f32 = 24.0;

/// Render the 1200×630 result card for `record` as PNG bytes.
pub fn render_card(record: &ShareRecord, assets: &Assets) -> Result<Vec<u8>, RenderError> {
    let mut img = RgbaImage::from_pixel(CARD_WIDTH, CARD_HEIGHT, BACKGROUND);

    draw_header(&mut img, assets);

    let player_name = display_name(record.player_name.as_deref(), "Player");
    let opponent_name = display_name(record.opponent_name.as_deref(), "Opponent");
    let player_x = CENTER_X - PLAYER_OFFSET_X;
    let opponent_x = CENTER_X + PLAYER_OFFSET_X;

    draw_player(
        &mut img,
        assets,
        player_x,
        &player_name,
        record.player_symbol.as_str(),
        true,
    );
    draw_player(
        &mut img,
        assets,
        opponent_x,
        &opponent_name,
        record.player_symbol.opponent().as_str(),
        false,
    );

    if let Some(font) = assets.body_font() {
        let vs_y = (PLAYERS_Y + 40 + (SYMBOL_SIZE / 2) as i32) as f32 - line_height(font, 32.0) / 2.0;
        draw_text_centered(&mut img, font, 32.0, CENTER_X as f32, vs_y, "VS", TEXT);
    }

    if let Some(font) = assets.heading_font() {
        draw_text_centered(
            &mut img,
            font,
            48.0,
            CENTER_X as f32,
            RESULT_Y,
            record.result.label(),
            ACCENT,
        );
    }

    if let Some(font) = assets.body_font() {
        draw_stats(&mut img, font, &stats_items(record));
    }

    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(png)
}

fn draw_header(img: &mut RgbaImage, assets: &Assets) {
    let font = assets.heading_font();
    let title_width = font.map(|f| text_width(f, 40.0, TITLE)).unwrap_or(0.0);
    let logo_width = if assets.logo.is_some() { LOGO_SIZE as f32 + 16.0 } else { 0.0 };
    let start_x = CENTER_X as f32 - (logo_width + title_width) / 2.0;

    if let Some(logo) = &assets.logo {
        let logo = imageops::resize(logo, LOGO_SIZE, LOGO_SIZE, imageops::FilterType::Triangle);
        imageops::overlay(img, &logo, start_x as i64, HEADER_Y as i64);
    }

    if let Some(font) = font {
        let y = HEADER_Y as f32 + (LOGO_SIZE as f32 - line_height(font, 40.0)) / 2.0;
        draw_text(img, font, 40.0, start_x + logo_width, y, TITLE, ACCENT);
    }
}

fn draw_player(
    img: &mut RgbaImage,
    assets: &Assets,
    cx: i32,
    name: &str,
    symbol: &str,
    is_player: bool,
) {
    if let Some(font) = assets.body_font() {
        draw_text_centered(img, font, 24.0, cx as f32, PLAYERS_Y as f32, name, TEXT);
    }

    let badge = Rect::centered(cx, PLAYERS_Y + 40, SYMBOL_SIZE, SYMBOL_SIZE);
    let symbol_color = if is_player {
        fill_rounded_rect(img, badge, 12, ACCENT);
        BACKGROUND
    } else {
        stroke_rounded_rect(img, badge, 12, 2, ACCENT);
        ACCENT
    };

    if let Some(font) = assets.heading_font() {
        let y = badge.y as f32 + (SYMBOL_SIZE as f32 - line_height(font, 32.0)) / 2.0;
        draw_text_centered(img, font, 32.0, cx as f32, y, symbol, symbol_color);
    }
}

fn draw_stats(img: &mut RgbaImage, font: &FontArc, items: &[String]) {
    let widths: Vec<f32> = items.iter().map(|s| text_width(font, 20.0, s)).collect();
    let total = widths.iter().sum::<f32>() + STATS_GAP * items.len().saturating_sub(1) as f32;
    let mut x = CENTER_X as f32 - total / 2.0;
    for (item, width) in items.iter().zip(widths) {
        draw_text(img, font, 20.0, x, STATS_Y, item, TEXT);
        x += width + STATS_GAP;
    }
}

fn stats_items(record: &ShareRecord) -> [String; 3] {
    let moves = record
        .moves
        .map(|m| m.to_string())
        .unwrap_or_else(|| "-".to_string());
    let elapsed = record
        .time_elapsed
        .map(|t| format!("{}s", t))
        .unwrap_or_else(|| "-".to_string());
    [
        format!("{} moves", moves),
        elapsed,
        format!("Room #{}", truncate(&record.room_code, MAX_NAME_CHARS)),
    ]
}

/// Trimmed, truncated name, or the placeholder when missing or blank.
pub(crate) fn display_name(name: Option<&str>, placeholder: &str) -> String {
    match name.map(str::trim) {
        Some(name) if !name.is_empty() => truncate(name, MAX_NAME_CHARS),
        _ => placeholder.to_string(),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GameResult, PlayerSymbol};

    fn record() -> ShareRecord {
        ShareRecord {
            player_name: None,
            player_pfp: None,
            opponent_name: None,
            opponent_pfp: None,
            player_symbol: PlayerSymbol::X,
            result: GameResult::Lost,
            room_code: "AB12".to_string(),
            timestamp: 1_700_000_000,
            moves: Some(7),
            time_elapsed: None,
        }
    }

    #[test]
    fn renders_full_size_png_without_assets() {
        let png = render_card(&record(), &Assets::default()).unwrap();
        let decoded = image::load_from_memory_with_format(&png, ImageFormat::Png).unwrap();
        assert_eq!(decoded.width(), CARD_WIDTH);
        assert_eq!(decoded.height(), CARD_HEIGHT);
    }

    #[test]
    fn draws_symbol_badges() {
        let png = render_card(&record(), &Assets::default()).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        let badge_center = (
            (CENTER_X - PLAYER_OFFSET_X) as u32,
            (PLAYERS_Y + 40 + (SYMBOL_SIZE / 2) as i32) as u32,
        );
        assert_eq!(*decoded.get_pixel(badge_center.0, badge_center.1), ACCENT);
        assert_eq!(*decoded.get_pixel(5, 5), BACKGROUND);
    }

    #[test]
    fn placeholder_names_for_missing_or_blank() {
        assert_eq!(display_name(None, "Player"), "Player");
        assert_eq!(display_name(Some("   "), "Opponent"), "Opponent");
        assert_eq!(display_name(Some("alice"), "Player"), "alice");
    }

    #[test]
    fn long_names_are_truncated() {
        let name = display_name(Some("abcdefghijklmnopqrstuvwxyz"), "Player");
        assert_eq!(name.chars().count(), MAX_NAME_CHARS);
        assert!(name.ends_with('…'));
    }

    #[test]
    fn missing_stats_render_as_dash() {
        let items = stats_items(&record());
        assert_eq!(items[0], "7 moves");
        assert_eq!(items[1], "-");
        assert_eq!(items[2], "Room #AB12");
    }
}
