use super::*;
use crate::bitmap::codec::ExportFormat;
use crate::foundation::core::Rgba8;

fn png(px: Rgba8) -> Vec<u8> {
    BitmapBuffer::filled(2, 2, px)
        .unwrap()
        .encode(ExportFormat::Png)
        .unwrap()
}

#[test]
fn repeated_bytes_decode_once() {
    let mut cache = BitmapCache::new(4);
    let bytes = png(Rgba8::WHITE);
    let a = cache.decode(&bytes).unwrap();
    let b = cache.decode(&bytes).unwrap();
    assert_eq!(a, b);
    assert_eq!(cache.decodes(), 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn least_recently_used_is_evicted() {
    let mut cache = BitmapCache::new(2);
    let red = png(Rgba8::new(255, 0, 0, 255));
    let green = png(Rgba8::new(0, 255, 0, 255));
    let blue = png(Rgba8::new(0, 0, 255, 255));

    cache.decode(&red).unwrap();
    cache.decode(&green).unwrap();
    cache.decode(&red).unwrap();
    cache.decode(&blue).unwrap();
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.decodes(), 3);

    // Red was touched last before blue arrived, so green went.
    cache.decode(&red).unwrap();
    assert_eq!(cache.decodes(), 3);
    cache.decode(&green).unwrap();
    assert_eq!(cache.decodes(), 4);
}

#[test]
fn zero_capacity_never_stores_and_bad_bytes_fail() {
    let mut cache = BitmapCache::new(0);
    let bytes = png(Rgba8::BLACK);
    cache.decode(&bytes).unwrap();
    cache.decode(&bytes).unwrap();
    assert!(cache.is_empty());
    assert_eq!(cache.decodes(), 2);
    assert!(cache.decode(b"garbage").is_err());
}
