#![cfg(target_arch = "x86_64")]

use simd_detector::{Extension, FeatureDetector};

#[test]
fn test_matches_std_detection() {
    let cpu = FeatureDetector::new();
    assert_eq!(cpu.has_sse(), std::is_x86_feature_detected!("sse"));
    assert_eq!(cpu.has_sse2(), std::is_x86_feature_detected!("sse2"));
    assert_eq!(cpu.has_sse3(), std::is_x86_feature_detected!("sse3"));
    assert_eq!(cpu.has_ssse3(), std::is_x86_feature_detected!("ssse3"));
    assert_eq!(cpu.has_sse41(), std::is_x86_feature_detected!("sse4.1"));
    assert_eq!(cpu.has_sse42(), std::is_x86_feature_detected!("sse4.2"));
    assert_eq!(cpu.has_aes(), std::is_x86_feature_detected!("aes"));
    assert_eq!(cpu.has_avx(), std::is_x86_feature_detected!("avx"));
    assert_eq!(cpu.has_sse4a(), std::is_x86_feature_detected!("sse4a"));
}

#[test]
fn test_x86_64_baseline() {
    // SSE2 is part of the x86_64 baseline.
    let cpu = FeatureDetector::new();
    assert!(cpu.has_mmx());
    assert!(cpu.has_sse());
    assert!(cpu.has_sse2());
}

#[test]
fn test_repeatable_on_hardware() {
    let cpu = FeatureDetector::new();
    let first: Vec<bool> = Extension::ALL.iter().map(|&e| cpu.has(e)).collect();
    let again: Vec<bool> = Extension::ALL.iter().map(|&e| cpu.has(e)).collect();
    assert_eq!(first, again);

    let brand = cpu.brand_string();
    assert_eq!(brand, brand.trim());
    println!("Brand: {}", brand);
}

#[test]
fn test_avx_implies_raw_bit() {
    let cpu = FeatureDetector::new();
    if cpu.has_avx() {
        assert!(cpu.snapshot().contains(Extension::Avx));
    }
}
