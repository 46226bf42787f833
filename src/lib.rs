//! Runtime detection of x86 SIMD instruction-set extensions.
//!
//! ```no_run
//! use simd_detector::FeatureDetector;
//!
//! let cpu = FeatureDetector::new();
//! if cpu.has_sse42() {
//!     println!("{} supports SSE4.2", cpu.brand_string());
//! }
//! ```

pub mod core;
pub mod cpuid;

pub use crate::core::flags::{Extension, PrimaryFlags, SecondaryFlags};
pub use crate::core::hardware::{CapabilitySnapshot, FeatureDetector};
