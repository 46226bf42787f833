//! CPUID Access Layer
//! Every CPUID / XGETBV query the detector makes goes through `CpuidSource`.

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub mod x86;

use bytemuck::{Pod, Zeroable};

/// Highest standard leaf / vendor string.
pub const LEAF_VENDOR: u32 = 0;
/// Processor info and feature bits.
pub const LEAF_FEATURES: u32 = 1;
/// Highest extended leaf.
pub const LEAF_EXT_MAX: u32 = 0x8000_0000;
/// Extended feature bits (AMD).
pub const LEAF_EXT_FEATURES: u32 = 0x8000_0001;
/// Brand string, three consecutive leaves.
pub const LEAF_BRAND: [u32; 3] = [0x8000_0002, 0x8000_0003, 0x8000_0004];

/// XCR0, the OS-managed extended state enable mask.
pub const XCR_XFEATURE_ENABLED_MASK: u32 = 0;

/// Leaf 1 ECX: the OS has set CR4.OSXSAVE, so XGETBV will not fault.
pub const ECX_OSXSAVE_BIT: u8 = 27;

/// Output registers of a single CPUID query.
///
/// Laid out eax, ebx, ecx, edx so that consecutive leaves cast straight into the
/// byte order the processor uses for the brand string.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct Registers {
    pub eax: u32,
    pub ebx: u32,
    pub ecx: u32,
    pub edx: u32,
}

// 4 registers * 4 bytes
const _: () = assert!(std::mem::size_of::<Registers>() == 16);

impl Registers {
    pub const ZERO: Self = Self { eax: 0, ebx: 0, ecx: 0, edx: 0 };

    pub fn get(&self, register: Register) -> u32 {
        match register {
            Register::Eax => self.eax,
            Register::Ebx => self.ebx,
            Register::Ecx => self.ecx,
            Register::Edx => self.edx,
        }
    }

    pub fn bit(&self, register: Register, bit: u8) -> bool {
        self.get(register) & (1u32 << bit) != 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    Eax,
    Ebx,
    Ecx,
    Edx,
}

impl Register {
    pub fn name(self) -> &'static str {
        match self {
            Register::Eax => "eax",
            Register::Ebx => "ebx",
            Register::Ecx => "ecx",
            Register::Edx => "edx",
        }
    }
}

/// Something that can answer CPUID and XGETBV.
///
/// Implemented by the real processor and by simulated processors in tests.
pub trait CpuidSource {
    /// Execute CPUID for `leaf` (sub-leaf 0).
    fn cpuid(&self, leaf: u32) -> Registers;

    /// Whether this platform is able to issue XGETBV at all.
    fn supports_xgetbv(&self) -> bool;

    /// Read extended control register `xcr`.
    /// Returns `None` when the OS has not enabled XSAVE or the platform lacks XGETBV.
    fn xgetbv(&self, xcr: u32) -> Option<u64>;
}

impl<S: CpuidSource + ?Sized> CpuidSource for &S {
    fn cpuid(&self, leaf: u32) -> Registers {
        (**self).cpuid(leaf)
    }

    fn supports_xgetbv(&self) -> bool {
        (**self).supports_xgetbv()
    }

    fn xgetbv(&self, xcr: u32) -> Option<u64> {
        (**self).xgetbv(xcr)
    }
}

/// Source for targets without CPUID. Every leaf reads as zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCpuid;

impl CpuidSource for NullCpuid {
    fn cpuid(&self, _leaf: u32) -> Registers {
        Registers::ZERO
    }

    fn supports_xgetbv(&self) -> bool {
        false
    }

    fn xgetbv(&self, _xcr: u32) -> Option<u64> {
        None
    }
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub type HardwareCpuid = x86::X86Cpuid;

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
pub type HardwareCpuid = NullCpuid;
