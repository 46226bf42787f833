//! Hardware Detection Module
//! Queries CPU features at runtime.

use crate::core::brand::{self, DEFAULT_TRIM};
use crate::core::config::DetectorConfig;
use crate::core::flags::{Extension, FlagMask, PrimaryFlags, SecondaryFlags};
use crate::core::runtime::{PinError, RuntimeConfig};
use crate::cpuid::{
    CpuidSource, HardwareCpuid, Register, Registers, ECX_OSXSAVE_BIT, LEAF_BRAND,
    LEAF_EXT_FEATURES, LEAF_EXT_MAX, LEAF_FEATURES, LEAF_VENDOR, XCR_XFEATURE_ENABLED_MASK,
};

/// XCR0 bits 1-2: XMM + YMM state saved on context switch.
const XCR0_AVX_MASK: u64 = 0x6;

/// Decoded feature masks from a single CPUID pass. Never changes once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CapabilitySnapshot {
    primary: PrimaryFlags,
    secondary: SecondaryFlags,
    max_basic_leaf: u32,
    max_extended_leaf: u32,
}

impl CapabilitySnapshot {
    /// Run the construction-time CPUID sequence against `source`.
    pub fn read<S: CpuidSource + ?Sized>(source: &S) -> Self {
        let max_basic_leaf = source.cpuid(LEAF_VENDOR).eax;
        let leaf1 = if max_basic_leaf >= LEAF_FEATURES {
            source.cpuid(LEAF_FEATURES)
        } else {
            Registers::ZERO
        };

        let max_extended_leaf = source.cpuid(LEAF_EXT_MAX).eax;
        let ext1 = if max_extended_leaf >= LEAF_EXT_FEATURES {
            source.cpuid(LEAF_EXT_FEATURES)
        } else {
            Registers::ZERO
        };

        let snapshot = Self::decode(leaf1, ext1, max_basic_leaf, max_extended_leaf);
        if !snapshot.has_brand_leaves() {
            tracing::warn!(max_extended_leaf, "brand string leaves not advertised");
        }
        tracing::debug!(
            max_basic_leaf,
            max_extended_leaf,
            primary = ?snapshot.primary,
            secondary = ?snapshot.secondary,
            "cpuid read complete"
        );
        snapshot
    }

    /// Test every table entry against the leaf 1 / leaf 0x80000001 registers.
    pub fn decode(
        leaf1: Registers,
        ext1: Registers,
        max_basic_leaf: u32,
        max_extended_leaf: u32,
    ) -> Self {
        let mut primary = PrimaryFlags::empty();
        let mut secondary = SecondaryFlags::empty();

        for ext in Extension::ALL {
            let src = ext.source();
            let regs = if ext.is_primary() { &leaf1 } else { &ext1 };
            if !regs.bit(src.register, src.bit) {
                continue;
            }
            match ext.mask() {
                FlagMask::Primary(flag) => primary |= flag,
                FlagMask::Secondary(flag) => secondary |= flag,
            }
        }

        Self {
            primary,
            secondary,
            max_basic_leaf,
            max_extended_leaf,
        }
    }

    /// Raw cached bit. For AVX this is only the CPU bit, see `FeatureDetector::has_avx`.
    pub fn contains(&self, ext: Extension) -> bool {
        match ext.mask() {
            FlagMask::Primary(flag) => self.primary.contains(flag),
            FlagMask::Secondary(flag) => self.secondary.contains(flag),
        }
    }

    pub fn primary(&self) -> PrimaryFlags {
        self.primary
    }

    pub fn secondary(&self) -> SecondaryFlags {
        self.secondary
    }

    pub fn max_basic_leaf(&self) -> u32 {
        self.max_basic_leaf
    }

    pub fn max_extended_leaf(&self) -> u32 {
        self.max_extended_leaf
    }

    /// Whether the CPUID pass saw leaves 0x80000002..=0x80000004 advertised.
    pub fn has_brand_leaves(&self) -> bool {
        self.max_extended_leaf >= LEAF_BRAND[2]
    }
}

/// Read-once, query-many view of the executing core's SIMD support.
///
/// Results reflect whichever logical core ran the CPUID pass; use
/// [`FeatureDetector::from_config`] with a `pin_core` to fix it.
#[derive(Debug, Clone)]
pub struct FeatureDetector<S = HardwareCpuid> {
    source: S,
    snapshot: CapabilitySnapshot,
    xgetbv_capable: bool,
    trim: Vec<char>,
}

impl FeatureDetector<HardwareCpuid> {
    pub fn new() -> Self {
        Self::with_source(HardwareCpuid::default())
    }

    /// Pin to `config.pin_core` (if any) before probing, and trim the brand with
    /// `config.trim`.
    pub fn from_config(config: &DetectorConfig) -> Result<Self, PinError> {
        if let Some(core) = config.pin_core {
            RuntimeConfig::pin_thread(core)?;
        }
        Ok(Self::new().with_trim(&config.trim_set()))
    }
}

impl Default for FeatureDetector<HardwareCpuid> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: CpuidSource> FeatureDetector<S> {
    pub fn with_source(source: S) -> Self {
        let snapshot = CapabilitySnapshot::read(&source);
        let xgetbv_capable = source.supports_xgetbv();
        Self {
            source,
            snapshot,
            xgetbv_capable,
            trim: DEFAULT_TRIM.to_vec(),
        }
    }

    /// Replace the set `brand_string` trims with.
    pub fn with_trim(mut self, trim: &[char]) -> Self {
        self.trim = trim.to_vec();
        self
    }

    pub fn trim_set(&self) -> &[char] {
        &self.trim
    }

    pub fn snapshot(&self) -> &CapabilitySnapshot {
        &self.snapshot
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Whether `ext` is usable. AVX goes through the OS-state check; everything else is
    /// a cached bit test.
    pub fn has(&self, ext: Extension) -> bool {
        match ext {
            Extension::Avx => self.has_avx(),
            _ => self.snapshot.contains(ext),
        }
    }

    // Primary set
    pub fn has_mmx(&self) -> bool {
        self.snapshot.contains(Extension::Mmx)
    }

    pub fn has_sse(&self) -> bool {
        self.snapshot.contains(Extension::Sse)
    }

    pub fn has_sse2(&self) -> bool {
        self.snapshot.contains(Extension::Sse2)
    }

    pub fn has_sse3(&self) -> bool {
        self.snapshot.contains(Extension::Sse3)
    }

    pub fn has_ssse3(&self) -> bool {
        self.snapshot.contains(Extension::Ssse3)
    }

    pub fn has_sse41(&self) -> bool {
        self.snapshot.contains(Extension::Sse41)
    }

    pub fn has_sse42(&self) -> bool {
        self.snapshot.contains(Extension::Sse42)
    }

    pub fn has_aes(&self) -> bool {
        self.snapshot.contains(Extension::Aes)
    }

    /// AVX needs three things, checked fresh on every call:
    /// 1) CPUID reports AVX,
    /// 2) CPUID reports the OS uses XSAVE/XRSTOR,
    /// 3) XGETBV shows the OS saves both XMM and YMM state.
    pub fn has_avx(&self) -> bool {
        if !self.xgetbv_capable || self.snapshot.max_basic_leaf < LEAF_FEATURES {
            return false;
        }

        let leaf1 = self.source.cpuid(LEAF_FEATURES);
        let avx = Extension::Avx.source();
        let cpu_avx = leaf1.bit(avx.register, avx.bit);
        let os_xsave = leaf1.bit(Register::Ecx, ECX_OSXSAVE_BIT);
        if !(cpu_avx && os_xsave) {
            tracing::trace!(cpu_avx, os_xsave, "avx unavailable");
            return false;
        }

        let xcr0 = self.source.xgetbv(XCR_XFEATURE_ENABLED_MASK).unwrap_or(0);
        tracing::trace!(xcr0, "xgetbv");
        xcr0 & XCR0_AVX_MASK == XCR0_AVX_MASK
    }

    // Secondary set
    pub fn has_mmx_plus(&self) -> bool {
        self.snapshot.contains(Extension::MmxPlus)
    }

    pub fn has_3dnow(&self) -> bool {
        self.snapshot.contains(Extension::Amd3DNow)
    }

    pub fn has_3dnow_ext(&self) -> bool {
        self.snapshot.contains(Extension::Amd3DNowExt)
    }

    pub fn has_sse4a(&self) -> bool {
        self.snapshot.contains(Extension::Sse4a)
    }

    pub fn has_sse5(&self) -> bool {
        self.snapshot.contains(Extension::Sse5)
    }

    /// CPU model string, trimmed with the detector's trim set (space, tab, CR, LF
    /// unless replaced by `with_trim` or the config).
    pub fn brand_string(&self) -> String {
        self.brand_string_with(&self.trim)
    }

    /// CPU model string, re-read from CPUID and trimmed of `trim` at both ends.
    pub fn brand_string_with(&self, trim: &[char]) -> String {
        let max_extended_leaf = self.source.cpuid(LEAF_EXT_MAX).eax;
        tracing::trace!(max_extended_leaf, "brand string re-read");

        let leaves = LEAF_BRAND.map(|leaf| self.source.cpuid(leaf));
        brand::decode(leaves, trim)
    }
}
