//! Frame-to-frame similarity

use std::io::Cursor;

use image::imageops::FilterType;
use image::{GrayImage, ImageReader};
use serde::{Deserialize, Serialize};

/// Comparison edge length. Downscaling this hard also flattens sensor
/// noise, which would otherwise dominate night captures.
const COMPARE_EDGE: u32 = 64;

/// Region of the frame used for comparison, e.g. a band of sky. Configured
/// as `[x, y, width, height]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[u32; 4]", into = "[u32; 4]")]
pub struct CompareArea {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl From<[u32; 4]> for CompareArea {
    fn from(v: [u32; 4]) -> Self {
        Self {
            x: v[0],
            y: v[1],
            width: v[2],
            height: v[3],
        }
    }
}

impl From<CompareArea> for [u32; 4] {
    fn from(area: CompareArea) -> Self {
        [area.x, area.y, area.width, area.height]
    }
}

/// Visual closeness of two encoded images in [0, 1]; 1.0 means identical.
///
/// Returns `None` when either image cannot be decoded - the caller falls
/// back to its fixed pacing rather than failing.
pub fn similarity_score(previous: &[u8], current: &[u8], area: Option<CompareArea>) -> Option<f64> {
    let a = decode_luma(previous, area)?;
    let b = decode_luma(current, area)?;

    let total: u64 = a
        .pixels()
        .zip(b.pixels())
        .map(|(p, q)| (p.0[0] as i32 - q.0[0] as i32).unsigned_abs() as u64)
        .sum();
    let mean = total as f64 / (COMPARE_EDGE * COMPARE_EDGE) as f64;
    Some(1.0 - mean / 255.0)
}

fn decode_luma(bytes: &[u8], area: Option<CompareArea>) -> Option<GrayImage> {
    let image = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .decode()
        .ok()?;
    let image = match area {
        Some(area) => image.crop_imm(area.x, area.y, area.width, area.height),
        None => image,
    };
    Some(
        image
            .resize_exact(COMPARE_EDGE, COMPARE_EDGE, FilterType::Nearest)
            .to_luma8(),
    )
}
