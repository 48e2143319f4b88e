// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Rendering of detections onto the source image

use ab_glyph::{FontRef, PxScale};
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;

use super::Detection;

/// Font used for box captions (DejaVu Sans, see assets/fonts)
static FONT_BYTES: &[u8] = include_bytes!("../../../assets/fonts/DejaVuSans.ttf");

const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// Ultralytics default palette, indexed by class id
const PALETTE: [[u8; 3]; 20] = [
    [255, 56, 56],
    [255, 157, 151],
    [255, 112, 31],
    [255, 178, 29],
    [207, 210, 49],
    [72, 249, 10],
    [146, 204, 23],
    [61, 219, 134],
    [26, 147, 52],
    [0, 212, 187],
    [44, 153, 168],
    [0, 194, 255],
    [52, 69, 147],
    [100, 115, 255],
    [0, 24, 236],
    [132, 56, 255],
    [82, 0, 133],
    [203, 56, 255],
    [255, 149, 200],
    [255, 55, 199],
];

pub fn class_color(class_id: usize) -> Rgb<u8> {
    Rgb(PALETTE[class_id % PALETTE.len()])
}

/// Line width scaled to the image, as Ultralytics does
pub fn line_width(width: u32, height: u32) -> u32 {
    (((width + height) as f32 / 2.0 * 0.003).round() as u32).max(2)
}

/// Caption font size in pixels, never below 12
pub fn font_size(width: u32, height: u32) -> f32 {
    ((width + height) as f32 / 2.0 * 0.035).round().max(12.0)
}

/// Caption drawn on a box: `"<label> <confidence>"`
pub fn caption(det: &Detection) -> String {
    format!("{} {:.2}", det.label, det.confidence)
}

/// Draw every detection as a coloured rectangle with a filled caption tab
/// holding its label and confidence.
///
/// The tab sits above the box, or inside its top edge when there is no room.
pub fn draw_detections(image: &DynamicImage, detections: &[Detection]) -> DynamicImage {
    let mut canvas = image.to_rgb8();
    let (w, h) = canvas.dimensions();
    if w == 0 || h == 0 {
        return DynamicImage::ImageRgb8(canvas);
    }
    let thickness = line_width(w, h);
    let scale = PxScale::from(font_size(w, h));

    let font = match FontRef::try_from_slice(FONT_BYTES) {
        Ok(font) => Some(font),
        Err(e) => {
            tracing::warn!("Caption font unusable, drawing boxes only: {}", e);
            None
        }
    };

    for det in detections {
        let color = class_color(det.class_id);
        let x1 = det.x1.max(0.0) as u32;
        let y1 = det.y1.max(0.0) as u32;
        let x2 = (det.x2.max(0.0) as u32).min(w - 1);
        let y2 = (det.y2.max(0.0) as u32).min(h - 1);
        if x2 <= x1 || y2 <= y1 {
            continue;
        }

        draw_rect_outline(&mut canvas, x1, y1, x2, y2, thickness, color);

        if let Some(font) = &font {
            draw_caption(&mut canvas, font, scale, thickness, x1, y1, &caption(det), color);
        }
    }

    DynamicImage::ImageRgb8(canvas)
}

#[allow(clippy::too_many_arguments)]
fn draw_caption(
    canvas: &mut RgbImage,
    font: &FontRef<'_>,
    scale: PxScale,
    padding: u32,
    x1: u32,
    y1: u32,
    text: &str,
    color: Rgb<u8>,
) {
    let (text_w, text_h) = text_size(scale, font, text);
    let tab_w = text_w + 2 * padding;
    let tab_h = text_h + 2 * padding;
    let tab_top = if y1 >= tab_h { y1 - tab_h } else { y1 };

    draw_filled_rect_mut(
        canvas,
        Rect::at(x1 as i32, tab_top as i32).of_size(tab_w, tab_h),
        color,
    );
    draw_text_mut(
        canvas,
        TEXT_COLOR,
        (x1 + padding) as i32,
        (tab_top + padding) as i32,
        scale,
        font,
        text,
    );
}

/// `thickness` nested outlines, growing inwards from `[x1, x2] x [y1, y2]`
fn draw_rect_outline(
    canvas: &mut RgbImage,
    x1: u32,
    y1: u32,
    x2: u32,
    y2: u32,
    thickness: u32,
    color: Rgb<u8>,
) {
    for i in 0..thickness {
        let (left, top) = (x1 + i, y1 + i);
        let (right, bottom) = (x2.saturating_sub(i), y2.saturating_sub(i));
        if right < left || bottom < top {
            break;
        }
        let rect = Rect::at(left as i32, top as i32).of_size(right - left + 1, bottom - top + 1);
        draw_hollow_rect_mut(canvas, rect, color);
    }
}
