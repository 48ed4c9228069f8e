use super::*;

#[test]
fn from_raw_rejects_wrong_length() {
    assert!(BitmapBuffer::from_raw(2, 2, vec![0u8; 15]).is_err());
    let b = BitmapBuffer::from_raw(2, 2, vec![0u8; 16]).unwrap();
    assert_eq!((b.width(), b.height()), (2, 2));
}

#[test]
fn get_set_roundtrip_in_place() {
    let mut b = BitmapBuffer::new(3, 2).unwrap();
    b.set(2, 1, Rgba8::new(10, 20, 30, 40)).unwrap();
    assert_eq!(b.get(2, 1).unwrap(), Rgba8::new(10, 20, 30, 40));
    assert_eq!(b.get(0, 0).unwrap(), Rgba8::TRANSPARENT);
    assert_eq!(&b.pixels()[20..24], &[10, 20, 30, 40]);
}

#[test]
fn out_of_range_access_is_rejected() {
    let mut b = BitmapBuffer::new(3, 2).unwrap();
    assert!(matches!(
        b.get(3, 0),
        Err(EaselError::OutOfBounds { x: 3, y: 0, .. })
    ));
    assert!(matches!(
        b.set(0, 2, Rgba8::WHITE),
        Err(EaselError::OutOfBounds { .. })
    ));
}

#[test]
fn clone_is_deep() {
    let a = BitmapBuffer::filled(2, 2, Rgba8::WHITE).unwrap();
    let mut b = a.clone();
    b.set(0, 0, Rgba8::BLACK).unwrap();
    assert_eq!(a.get(0, 0).unwrap(), Rgba8::WHITE);
}

#[test]
fn crop_copies_the_requested_rectangle() {
    let mut b = BitmapBuffer::new(4, 3).unwrap();
    b.set(1, 1, Rgba8::new(1, 1, 1, 1)).unwrap();
    b.set(2, 2, Rgba8::new(2, 2, 2, 2)).unwrap();

    let c = b.crop(1, 1, 2, 2).unwrap();
    assert_eq!((c.width(), c.height()), (2, 2));
    assert_eq!(c.get(0, 0).unwrap(), Rgba8::new(1, 1, 1, 1));
    assert_eq!(c.get(1, 1).unwrap(), Rgba8::new(2, 2, 2, 2));

    assert!(b.crop(3, 0, 2, 1).is_err());
}

#[test]
fn empty_buffer_is_detected() {
    let b = BitmapBuffer::new(0, 5).unwrap();
    assert!(b.is_empty());
    assert!(matches!(b.ensure_non_empty(), Err(EaselError::EmptyBuffer)));
}
