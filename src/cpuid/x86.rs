#[cfg(target_arch = "x86")]
use std::arch::x86::{__cpuid, _xgetbv};
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::{__cpuid, _xgetbv};

use super::{CpuidSource, Register, Registers, ECX_OSXSAVE_BIT, LEAF_FEATURES, LEAF_VENDOR};

/// The executing logical core.
#[derive(Debug, Clone, Copy, Default)]
pub struct X86Cpuid;

impl X86Cpuid {
    /// Pre-Pentium 32-bit parts may lack CPUID entirely.
    #[cfg(target_arch = "x86")]
    fn available() -> bool {
        std::arch::x86::has_cpuid()
    }

    #[cfg(target_arch = "x86_64")]
    fn available() -> bool {
        true
    }

    fn osxsave(&self) -> bool {
        if self.cpuid(LEAF_VENDOR).eax < LEAF_FEATURES {
            return false;
        }
        self.cpuid(LEAF_FEATURES).bit(Register::Ecx, ECX_OSXSAVE_BIT)
    }
}

impl CpuidSource for X86Cpuid {
    #[allow(unused_unsafe)]
    fn cpuid(&self, leaf: u32) -> Registers {
        if !Self::available() {
            return Registers::ZERO;
        }
        // SAFETY: CPUID is present (checked above) and unprivileged.
        let r = unsafe { __cpuid(leaf) };
        Registers { eax: r.eax, ebx: r.ebx, ecx: r.ecx, edx: r.edx }
    }

    fn supports_xgetbv(&self) -> bool {
        Self::available()
    }

    fn xgetbv(&self, xcr: u32) -> Option<u64> {
        if !self.osxsave() {
            return None;
        }
        // SAFETY: OSXSAVE is set, so XGETBV is enabled by the OS.
        Some(unsafe { _xgetbv(xcr) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpuid::LEAF_EXT_MAX;

    #[test]
    fn test_hardware_leaf_limits() {
        let cpu = X86Cpuid;
        let max_basic = cpu.cpuid(LEAF_VENDOR).eax;
        // Every CPU that runs this test has at least leaf 1.
        assert!(max_basic >= LEAF_FEATURES);
        let max_ext = cpu.cpuid(LEAF_EXT_MAX).eax;
        println!("Max basic leaf: {:#x}, max extended leaf: {:#x}", max_basic, max_ext);
    }

    #[test]
    fn test_xgetbv_matches_osxsave() {
        let cpu = X86Cpuid;
        let osxsave = cpu.cpuid(LEAF_FEATURES).bit(Register::Ecx, ECX_OSXSAVE_BIT);
        assert_eq!(cpu.xgetbv(0).is_some(), osxsave);
    }
}
