use super::*;
use crate::foundation::core::Rgba8;

#[test]
fn png_roundtrip_is_lossless_with_alpha() {
    let mut b = BitmapBuffer::new(2, 1).unwrap();
    b.set(0, 0, Rgba8::new(100, 50, 200, 128)).unwrap();
    b.set(1, 0, Rgba8::new(1, 2, 3, 0)).unwrap();

    let bytes = b.encode(ExportFormat::Png).unwrap();
    assert_eq!(&bytes[1..4], b"PNG");
    let back = BitmapBuffer::decode(&bytes).unwrap();
    assert_eq!(back, b);
}

#[test]
fn jpeg_encode_drops_alpha_but_keeps_size() {
    let b = BitmapBuffer::filled(8, 4, Rgba8::new(200, 10, 10, 90)).unwrap();
    let bytes = b.encode(ExportFormat::Jpeg { quality: 90 }).unwrap();
    let back = BitmapBuffer::decode(&bytes).unwrap();
    assert_eq!((back.width(), back.height()), (8, 4));
    assert_eq!(back.get(0, 0).unwrap().a, 255);
}

#[test]
fn decode_garbage_fails() {
    assert!(BitmapBuffer::decode(b"not an image").is_err());
}

#[test]
fn encode_empty_fails() {
    let b = BitmapBuffer::new(0, 0).unwrap();
    assert!(matches!(
        b.encode(ExportFormat::Png),
        Err(EaselError::EmptyBuffer)
    ));
}
