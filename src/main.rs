use simd_detector::core::brand::encode_wide;
use simd_detector::{Extension, FeatureDetector};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== SIMD Detector Demo ===");

    // 1. Detect
    println!("\n[1] Probing CPUID...");
    let cpu = FeatureDetector::new();
    let snapshot = cpu.snapshot();
    println!(
        "    Max basic leaf: {:#x}, max extended leaf: {:#x}",
        snapshot.max_basic_leaf(),
        snapshot.max_extended_leaf()
    );

    // 2. Brand
    let brand = cpu.brand_string();
    println!("\n[2] CPU: {}", brand);
    println!("    ({} UTF-16 units)", encode_wide(&brand).len());

    // 3. Extensions
    println!("\n[3] Primary extensions ({:#06x}):", snapshot.primary().bits());
    for ext in Extension::PRIMARY {
        println!("    - {:<8} {}", ext.name(), if cpu.has(ext) { "yes" } else { "no" });
    }
    println!("\n    Secondary extensions ({:#06x}):", snapshot.secondary().bits());
    for ext in Extension::SECONDARY {
        println!("    - {:<8} {}", ext.name(), if cpu.has(ext) { "yes" } else { "no" });
    }

    if snapshot.contains(Extension::Avx) && !cpu.has_avx() {
        println!("\n    Note: CPU reports AVX but the OS has not enabled YMM state.");
    }

    println!("\n=== Demo Complete ===");
    Ok(())
}
