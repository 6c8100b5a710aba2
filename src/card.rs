use ab_glyph::{FontVec, PxScale};
use anyhow::Context as _;
use image::{imageops, DynamicImage, ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use std::io::Cursor;
use std::path::Path;

pub const CARD_WIDTH: u32 = 934;
pub const CARD_HEIGHT: u32 = 282;

const AVATAR_SIZE: u32 = 200;
const AVATAR_X: i64 = 40;

const TEXT_X: i32 = AVATAR_X as i32 + AVATAR_SIZE as i32 + 50;
const USERNAME_Y: i32 = 50;
const LEVEL_Y: i32 = USERNAME_Y + 70;
const XP_Y: i32 = LEVEL_Y + 55;

const BAR_WIDTH: u32 = 550;
const BAR_HEIGHT: u32 = 30;
const BAR_Y: i32 = XP_Y + 50;

const USERNAME_SCALE: f32 = 60.0;
const STATS_SCALE: f32 = 40.0;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BAR_TRACK: Rgba<u8> = Rgba([80, 80, 80, 255]);
const BAR_FILL: Rgba<u8> = Rgba([0, 200, 255, 255]);

#[derive(Debug, thiserror::Error)]
pub enum CardError {
    #[error("xp requirement must be positive, got {0}")]
    InvalidRequirement(i64),
    #[error("failed to encode rank card: {0}")]
    Encode(#[from] image::ImageError),
}

/// Background template and font, loaded once at startup so render calls are
/// pure functions of their inputs.
pub struct CardAssets {
    background: RgbaImage,
    font: FontVec,
}

impl CardAssets {
    pub fn load(dir: &Path) -> anyhow::Result<Self> {
        let background_path = dir.join("background.png");
        let background = image::open(&background_path)
            .with_context(|| format!("Failed to load card background {:?}", background_path))?
            .resize_exact(CARD_WIDTH, CARD_HEIGHT, imageops::FilterType::Lanczos3)
            .to_rgba8();

        let font_path = dir.join("font.ttf");
        let font_data = std::fs::read(&font_path)
            .with_context(|| format!("Failed to read card font {:?}", font_path))?;
        let font = FontVec::try_from_vec(font_data)
            .with_context(|| format!("Card font {:?} is not a valid font", font_path))?;

        Ok(Self { background, font })
    }
}

/// Composes the rank card: background, circular avatar, name and stats text,
/// and a progress bar filled proportionally to `xp / required_xp`.
pub fn render_rank_card(
    assets: &CardAssets,
    username: &str,
    level: i64,
    max_level: i64,
    xp: i64,
    required_xp: i64,
    avatar: &DynamicImage,
) -> Result<Vec<u8>, CardError> {
    if required_xp <= 0 {
        return Err(CardError::InvalidRequirement(required_xp));
    }

    let mut card = assets.background.clone();

    let avatar = circular_avatar(avatar);
    let avatar_y = i64::from((CARD_HEIGHT - AVATAR_SIZE) / 2);
    imageops::overlay(&mut card, &avatar, AVATAR_X, avatar_y);

    draw_text_mut(
        &mut card,
        WHITE,
        TEXT_X,
        USERNAME_Y,
        PxScale::from(USERNAME_SCALE),
        &assets.font,
        username,
    );
    draw_text_mut(
        &mut card,
        WHITE,
        TEXT_X,
        LEVEL_Y,
        PxScale::from(STATS_SCALE),
        &assets.font,
        &format!("Level: {} / {}", level, max_level),
    );
    draw_text_mut(
        &mut card,
        WHITE,
        TEXT_X,
        XP_Y,
        PxScale::from(STATS_SCALE),
        &assets.font,
        &format!("XP: {} / {}", xp, required_xp),
    );

    draw_filled_rect_mut(
        &mut card,
        Rect::at(TEXT_X, BAR_Y).of_size(BAR_WIDTH, BAR_HEIGHT),
        BAR_TRACK,
    );
    let fill = bar_fill_width(xp, required_xp);
    if fill > 0 {
        draw_filled_rect_mut(
            &mut card,
            Rect::at(TEXT_X, BAR_Y).of_size(fill, BAR_HEIGHT),
            BAR_FILL,
        );
    }

    let mut buffer = Cursor::new(Vec::new());
    card.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
}

/// Fill width in pixels, clamped to the bar. XP can exceed the requirement
/// once a user sits at the level cap.
fn bar_fill_width(xp: i64, required_xp: i64) -> u32 {
    let ratio = (xp.max(0) as f64 / required_xp as f64).min(1.0);
    (ratio * f64::from(BAR_WIDTH)) as u32
}

/// Resizes the avatar and masks it to a circle by zeroing alpha outside the
/// inscribed disc.
fn circular_avatar(avatar: &DynamicImage) -> RgbaImage {
    let mut avatar = avatar
        .resize_exact(AVATAR_SIZE, AVATAR_SIZE, imageops::FilterType::Lanczos3)
        .to_rgba8();

    let radius = AVATAR_SIZE as f32 / 2.0;
    for (x, y, pixel) in avatar.enumerate_pixels_mut() {
        let dx = x as f32 + 0.5 - radius;
        let dy = y as f32 + 0.5 - radius;
        if dx * dx + dy * dy > radius * radius {
            pixel.0[3] = 0;
        }
    }
    avatar
}
