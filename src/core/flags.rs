//! Extension Table
//! Maps each detectable extension to the CPUID bit that reports it and to the bit it
//! occupies in the detector's own masks.

use crate::cpuid::{Register, LEAF_EXT_FEATURES, LEAF_FEATURES};
use bitflags::bitflags;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

bitflags! {
    /// Intel-style extensions decoded from leaf 1.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PrimaryFlags: u16 {
        const MMX   = 0x0001;
        const SSE   = 0x0002;
        const SSE2  = 0x0004;
        const SSE3  = 0x0008;
        const SSSE3 = 0x0010;
        const SSE41 = 0x0020;
        const SSE42 = 0x0040;
        const AES   = 0x0080;
        const AVX   = 0x0100;
    }
}

bitflags! {
    /// Legacy / AMD extensions decoded from leaf 0x80000001.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SecondaryFlags: u16 {
        const MMX_PLUS    = 0x0001;
        const AMD_3DNOW   = 0x0002;
        const AMD_3DNOWEXT = 0x0004;
        const SSE4A       = 0x0008;
        const SSE5        = 0x0010;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Extension {
    Mmx,
    Sse,
    Sse2,
    Sse3,
    Ssse3,
    Sse41,
    Sse42,
    Aes,
    Avx,
    MmxPlus,
    Amd3DNow,
    Amd3DNowExt,
    Sse4a,
    Sse5,
}

/// Where in the CPUID output an extension is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitSource {
    pub leaf: u32,
    pub register: Register,
    pub bit: u8,
}

/// The detector-side bit an extension owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagMask {
    Primary(PrimaryFlags),
    Secondary(SecondaryFlags),
}

impl Extension {
    pub const PRIMARY: [Extension; 9] = [
        Extension::Mmx,
        Extension::Sse,
        Extension::Sse2,
        Extension::Sse3,
        Extension::Ssse3,
        Extension::Sse41,
        Extension::Sse42,
        Extension::Aes,
        Extension::Avx,
    ];

    pub const SECONDARY: [Extension; 5] = [
        Extension::MmxPlus,
        Extension::Amd3DNow,
        Extension::Amd3DNowExt,
        Extension::Sse4a,
        Extension::Sse5,
    ];

    pub const ALL: [Extension; 14] = [
        Extension::Mmx,
        Extension::Sse,
        Extension::Sse2,
        Extension::Sse3,
        Extension::Ssse3,
        Extension::Sse41,
        Extension::Sse42,
        Extension::Aes,
        Extension::Avx,
        Extension::MmxPlus,
        Extension::Amd3DNow,
        Extension::Amd3DNowExt,
        Extension::Sse4a,
        Extension::Sse5,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Extension::Mmx => "MMX",
            Extension::Sse => "SSE",
            Extension::Sse2 => "SSE2",
            Extension::Sse3 => "SSE3",
            Extension::Ssse3 => "SSSE3",
            Extension::Sse41 => "SSE4.1",
            Extension::Sse42 => "SSE4.2",
            Extension::Aes => "AES-NI",
            Extension::Avx => "AVX",
            Extension::MmxPlus => "MMX+",
            Extension::Amd3DNow => "3DNow!",
            Extension::Amd3DNowExt => "3DNow!+",
            Extension::Sse4a => "SSE4a",
            Extension::Sse5 => "SSE5",
        }
    }

    pub fn source(self) -> BitSource {
        use Register::{Ecx, Edx};
        let (leaf, register, bit) = match self {
            Extension::Mmx => (LEAF_FEATURES, Edx, 23),
            Extension::Sse => (LEAF_FEATURES, Edx, 25),
            Extension::Sse2 => (LEAF_FEATURES, Edx, 26),
            Extension::Sse3 => (LEAF_FEATURES, Ecx, 0),
            Extension::Ssse3 => (LEAF_FEATURES, Ecx, 9),
            Extension::Sse41 => (LEAF_FEATURES, Ecx, 19),
            Extension::Sse42 => (LEAF_FEATURES, Ecx, 20),
            Extension::Aes => (LEAF_FEATURES, Ecx, 25),
            Extension::Avx => (LEAF_FEATURES, Ecx, 28),
            Extension::MmxPlus => (LEAF_EXT_FEATURES, Edx, 22),
            Extension::Amd3DNow => (LEAF_EXT_FEATURES, Edx, 31),
            Extension::Amd3DNowExt => (LEAF_EXT_FEATURES, Edx, 30),
            Extension::Sse4a => (LEAF_EXT_FEATURES, Ecx, 6),
            Extension::Sse5 => (LEAF_EXT_FEATURES, Ecx, 11),
        };
        BitSource { leaf, register, bit }
    }

    pub fn mask(self) -> FlagMask {
        match self {
            Extension::Mmx => FlagMask::Primary(PrimaryFlags::MMX),
            Extension::Sse => FlagMask::Primary(PrimaryFlags::SSE),
            Extension::Sse2 => FlagMask::Primary(PrimaryFlags::SSE2),
            Extension::Sse3 => FlagMask::Primary(PrimaryFlags::SSE3),
            Extension::Ssse3 => FlagMask::Primary(PrimaryFlags::SSSE3),
            Extension::Sse41 => FlagMask::Primary(PrimaryFlags::SSE41),
            Extension::Sse42 => FlagMask::Primary(PrimaryFlags::SSE42),
            Extension::Aes => FlagMask::Primary(PrimaryFlags::AES),
            Extension::Avx => FlagMask::Primary(PrimaryFlags::AVX),
            Extension::MmxPlus => FlagMask::Secondary(SecondaryFlags::MMX_PLUS),
            Extension::Amd3DNow => FlagMask::Secondary(SecondaryFlags::AMD_3DNOW),
            Extension::Amd3DNowExt => FlagMask::Secondary(SecondaryFlags::AMD_3DNOWEXT),
            Extension::Sse4a => FlagMask::Secondary(SecondaryFlags::SSE4A),
            Extension::Sse5 => FlagMask::Secondary(SecondaryFlags::SSE5),
        }
    }

    pub fn is_primary(self) -> bool {
        matches!(self.mask(), FlagMask::Primary(_))
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown extension: {0}")]
pub struct UnknownExtension(pub String);

impl FromStr for Extension {
    type Err = UnknownExtension;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Compare without punctuation so "sse4.1", "SSE41" and "sse4_1" all match.
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '+' || *c == '!')
            .map(|c| c.to_ascii_lowercase())
            .collect();

        let ext = match key.as_str() {
            "mmx" => Extension::Mmx,
            "sse" => Extension::Sse,
            "sse2" => Extension::Sse2,
            "sse3" => Extension::Sse3,
            "ssse3" => Extension::Ssse3,
            "sse41" => Extension::Sse41,
            "sse42" => Extension::Sse42,
            "aes" | "aesni" => Extension::Aes,
            "avx" => Extension::Avx,
            "mmx+" | "mmxplus" | "mmxext" => Extension::MmxPlus,
            "3dnow" | "3dnow!" => Extension::Amd3DNow,
            "3dnow!+" | "3dnow+" | "3dnowext" | "3dnowplus" => Extension::Amd3DNowExt,
            "sse4a" => Extension::Sse4a,
            "sse5" => Extension::Sse5,
            _ => return Err(UnknownExtension(s.to_string())),
        };
        Ok(ext)
    }
}
