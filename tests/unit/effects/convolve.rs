use super::*;
use crate::foundation::core::Rgba8;
use crate::foundation::error::EaselError;

fn flat(w: u32, h: u32, px: Rgba8) -> BitmapBuffer {
    BitmapBuffer::filled(w, h, px).unwrap()
}

#[test]
fn flat_image_has_no_edges() {
    let src = flat(5, 4, Rgba8::new(90, 40, 200, 180));
    let out = edge_detect(&src).unwrap();
    assert_eq!(out, flat(5, 4, Rgba8::new(0, 0, 0, 180)));
}

#[test]
fn vertical_step_lights_up_the_boundary_columns_only() {
    let mut src = flat(6, 3, Rgba8::BLACK);
    for y in 0..3 {
        for x in 3..6 {
            src.set(x, y, Rgba8::WHITE).unwrap();
        }
    }
    let out = edge_detect(&src).unwrap();
    for y in 0..3 {
        assert_eq!(out.get(0, y).unwrap().r, 0);
        assert_eq!(out.get(2, y).unwrap().r, 255);
        assert_eq!(out.get(3, y).unwrap().r, 255);
        assert_eq!(out.get(5, y).unwrap().r, 0);
    }
}

#[test]
fn emboss_of_flat_image_is_gray_128_plus_luma() {
    // Kernel weights sum to 1, so a flat field maps to luma + 128.
    let src = flat(3, 3, Rgba8::new(10, 10, 10, 255));
    let out = emboss(&src).unwrap();
    assert_eq!(out.get(1, 1).unwrap(), Rgba8::new(138, 138, 138, 255));
    assert_eq!(out.get(0, 0).unwrap(), Rgba8::new(138, 138, 138, 255));
}

#[test]
fn sharpen_of_flat_image_is_identity() {
    let src = flat(4, 4, Rgba8::new(12, 34, 56, 78));
    assert_eq!(sharpen(&src).unwrap(), src);
}

#[test]
fn sharpen_amplifies_a_single_bright_pixel() {
    let mut src = flat(3, 3, Rgba8::new(100, 100, 100, 255));
    src.set(1, 1, Rgba8::new(150, 100, 100, 255)).unwrap();
    let out = sharpen(&src).unwrap();
    assert_eq!(out.get(1, 1).unwrap(), Rgba8::new(255, 100, 100, 255));
    assert_eq!(out.get(1, 0).unwrap(), Rgba8::new(50, 100, 100, 255));
}

#[test]
fn single_pixel_buffer_is_handled_by_edge_clamping() {
    let src = flat(1, 1, Rgba8::new(1, 2, 3, 4));
    assert_eq!(sharpen(&src).unwrap(), src);
    assert_eq!(edge_detect(&src).unwrap().get(0, 0).unwrap(), Rgba8::new(0, 0, 0, 4));
}

#[test]
fn empty_input_is_rejected() {
    let src = BitmapBuffer::new(0, 0).unwrap();
    assert!(matches!(emboss(&src), Err(EaselError::EmptyBuffer)));
}
