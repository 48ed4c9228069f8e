/// Round and clamp a float into a byte, the way a clamped 8-bit canvas store does.
pub(crate) fn to_u8(v: f64) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.round().clamp(0.0, 255.0) as u8
}

/// Rec. 601 luma on 0..=255 channels.
pub(crate) fn luma601(r: f64, g: f64, b: f64) -> f64 {
    r * 0.299 + g * 0.587 + b * 0.114
}

/// Rec. 709 luminance on 0..=255 channels.
pub(crate) fn luma709(r: f64, g: f64, b: f64) -> f64 {
    0.2126 * r + 0.7152 * g + 0.0722 * b
}

/// Clamp a float parameter; NaN falls back to `fallback`.
pub(crate) fn clamp_param(v: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if v.is_nan() {
        return fallback;
    }
    v.clamp(min, max)
}

pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Integer hash used for reproducible per-pixel noise.
pub(crate) fn hash_u32(mut x: u32) -> u32 {
    x ^= x >> 16;
    x = x.wrapping_mul(0x7feb_352d);
    x ^= x >> 15;
    x = x.wrapping_mul(0x846c_a68b);
    x ^= x >> 16;
    x
}

/// Hash of a pixel position and seed mapped into `[0, 1)`.
pub(crate) fn noise01(x: u32, y: u32, seed: u32) -> f64 {
    let h = hash_u32(x ^ hash_u32(y ^ hash_u32(seed)));
    f64::from(h >> 8) / f64::from(1u32 << 24)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
