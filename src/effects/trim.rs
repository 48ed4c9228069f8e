//! Boundary detection for auto-crop.

use serde::{Deserialize, Serialize};

use crate::bitmap::buffer::BitmapBuffer;
use crate::foundation::error::EaselResult;

/// What counts as an "empty" pixel when trimming.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrimOptions {
    /// Pixels with alpha at or below this value are empty.
    pub alpha_tolerance: u8,
    /// Also treat near-white pixels (every RGB channel `>= 255 - alpha_tolerance`) as empty.
    pub remove_white: bool,
}

impl TrimOptions {
    fn treats_as_empty(&self, px: &[u8]) -> bool {
        if px[3] <= self.alpha_tolerance {
            return true;
        }
        let floor = 255 - self.alpha_tolerance;
        self.remove_white && px[0] >= floor && px[1] >= floor && px[2] >= floor
    }
}

/// Margins to strip from each edge plus the size of what remains.
///
/// `width`/`height` never drop below 1: a buffer with no content keeps its
/// top-left pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrimBounds {
    /// Empty rows above the content.
    pub top: u32,
    /// Empty columns left of the content.
    pub left: u32,
    /// Empty rows below the content.
    pub bottom: u32,
    /// Empty columns right of the content.
    pub right: u32,
    /// Width after trimming.
    pub width: u32,
    /// Height after trimming.
    pub height: u32,
}

/// Scan each edge inward and report the empty margins.
pub fn detect_trim(src: &BitmapBuffer, opts: TrimOptions) -> EaselResult<TrimBounds> {
    src.ensure_non_empty()?;
    let (w, h) = (src.width(), src.height());
    let data = src.pixels();
    let empty_at = |x: u32, y: u32| {
        let i = ((y as usize) * (w as usize) + x as usize) * 4;
        opts.treats_as_empty(&data[i..i + 4])
    };
    let row_has_content = |y: u32| (0..w).any(|x| !empty_at(x, y));

    let Some(top) = (0..h).find(|&y| row_has_content(y)) else {
        return Ok(TrimBounds {
            top: 0,
            left: 0,
            bottom: h - 1,
            right: w - 1,
            width: 1,
            height: 1,
        });
    };
    // A content row exists, so each of these scans stops early.
    let last_row = (top..h).rev().find(|&y| row_has_content(y)).unwrap_or(top);
    let col_has_content = |x: u32| (top..=last_row).any(|y| !empty_at(x, y));
    let left = (0..w).find(|&x| col_has_content(x)).unwrap_or(0);
    let last_col = (left..w).rev().find(|&x| col_has_content(x)).unwrap_or(left);

    Ok(TrimBounds {
        top,
        left,
        bottom: h - 1 - last_row,
        right: w - 1 - last_col,
        width: last_col - left + 1,
        height: last_row - top + 1,
    })
}

/// Crop `src` to the bounds found by [`detect_trim`].
#[tracing::instrument(skip(src), fields(width = src.width(), height = src.height()))]
pub fn trim(src: &BitmapBuffer, opts: TrimOptions) -> EaselResult<(BitmapBuffer, TrimBounds)> {
    let bounds = detect_trim(src, opts)?;
    let cropped = src.crop(bounds.left, bounds.top, bounds.width, bounds.height)?;
    tracing::debug!(?bounds, "trimmed bitmap");
    Ok((cropped, bounds))
}

#[cfg(test)]
#[path = "../../tests/unit/effects/trim.rs"]
mod tests;
