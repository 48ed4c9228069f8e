use std::collections::{BTreeMap, HashSet};

use super::*;
use crate::foundation::core::Rgba8;

fn params(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

#[test]
fn catalog_keys_are_unique_and_defaults_in_range() {
    let mut seen = HashSet::new();
    for def in effect_definitions() {
        assert!(seen.insert(def.key), "duplicate key {}", def.key);
        for p in def.params {
            assert!(p.min <= p.default && p.default <= p.max, "{}.{}", def.key, p.name);
        }
    }
    assert_eq!(
        effect_definitions()
            .iter()
            .filter(|d| d.category == EffectCategory::Instagram)
            .count(),
        Preset::ALL.len()
    );
}

#[test]
fn every_catalog_entry_parses_with_defaults_and_reports_its_key() {
    let src = BitmapBuffer::filled(4, 4, Rgba8::new(90, 140, 200, 255)).unwrap();
    for def in effect_definitions() {
        let effect = Effect::parse(def.key, &BTreeMap::new()).unwrap();
        assert_eq!(effect.key(), def.key);
        let out = effect.apply(&src).unwrap();
        assert_eq!((out.width(), out.height()), (4, 4));
    }
}

#[test]
fn parse_fills_defaults_and_clamps() {
    let e = Effect::parse("box-blur", &params(&[("hRadius", 500.0)])).unwrap();
    assert_eq!(
        e,
        Effect::BoxBlur {
            h_radius: 20,
            v_radius: 3,
            quality: 3
        }
    );

    let e = Effect::parse("mosaic", &params(&[("blockSize", 0.0)])).unwrap();
    assert_eq!(e, Effect::Mosaic { block_size: 2 });

    let e = Effect::parse("aden", &params(&[("intensity", f64::NAN)])).unwrap();
    assert_eq!(
        e,
        Effect::Preset {
            preset: Preset::Aden,
            intensity: 100.0
        }
    );
}

#[test]
fn unknown_effect_is_a_validation_error() {
    let err = Effect::parse("posterize", &BTreeMap::new()).unwrap_err();
    assert!(matches!(err, EaselError::Validation(_)));
}

#[test]
fn channel_transform_via_catalog() {
    let src = BitmapBuffer::filled(1, 1, Rgba8::new(100, 50, 50, 255)).unwrap();
    let e = Effect::parse("channel-transform", &params(&[("redOffset", 50.0)])).unwrap();
    assert_eq!(e.apply(&src).unwrap().get(0, 0).unwrap(), Rgba8::new(150, 50, 50, 255));
}

#[test]
fn zero_intensity_convolution_is_identity() {
    let mut src = BitmapBuffer::filled(3, 3, Rgba8::new(10, 20, 30, 255)).unwrap();
    src.set(1, 1, Rgba8::WHITE).unwrap();
    let e = Effect::parse("edge", &params(&[("intensity", 0.0)])).unwrap();
    assert_eq!(e.apply(&src).unwrap(), src);
}

#[test]
fn effects_serialize_with_kind_tag() {
    let e = Effect::Oil { range: 2, levels: 8 };
    let json = serde_json::to_value(&e).unwrap();
    assert_eq!(json["kind"], "oil");
    let back: Effect = serde_json::from_value(json).unwrap();
    assert_eq!(back, e);
}
