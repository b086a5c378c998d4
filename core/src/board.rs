//! # Board Abstraction
//!
//! Shared description of a virtual board: the chip parameters it was built
//! with, the memory map it exposes and the components living on it.

use std::fmt;
use std::str::FromStr;

use pulp_common::options::Options;

/// Platform a board is generated for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Platform {
    #[default]
    Gvsoc,
    Rtl,
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gvsoc" => Ok(Platform::Gvsoc),
            "rtl" => Ok(Platform::Rtl),
            other => Err(format!("unsupported platform '{other}', expected gvsoc or rtl")),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Gvsoc => f.write_str("gvsoc"),
            Platform::Rtl => f.write_str("rtl"),
        }
    }
}

/// Chip level parameters resolved from the board options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChipConfig {
    pub nb_cluster: u32,
    pub nb_pe: u32,
    pub l1_size: u64,
    pub l2_size: u64,
    pub neureka: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemoryRegion {
    pub name: String,
    pub base: u64,
    pub size: u64,
}

impl MemoryRegion {
    pub fn new(name: impl Into<String>, base: u64, size: u64) -> Self {
        Self {
            name: name.into(),
            base,
            size,
        }
    }

    /// First address past the region.
    pub fn end(&self) -> u64 {
        self.base + self.size
    }

    pub fn contains(&self, addr: u64) -> bool {
        addr >= self.base && addr < self.end()
    }

    pub fn overlaps(&self, other: &MemoryRegion) -> bool {
        self.base < other.end() && other.base < self.end()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ComponentKind {
    ClusterCtrl { nb_core: u32 },
    Neureka,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentKind::ClusterCtrl { nb_core } => write!(f, "cluster controller ({nb_core} cores)"),
            ComponentKind::Neureka => f.write_str("neureka accelerator"),
        }
    }
}

/// A component instantiated on the board, addressed by its path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComponentInfo {
    pub path: String,
    pub kind: ComponentKind,
    pub base: u64,
}

/// Behavior shared by every board a target can build on.
pub trait Board: fmt::Display + Send + Sync {
    fn name(&self) -> &str;

    fn platform(&self) -> Platform;

    fn chip(&self) -> &ChipConfig;

    /// Options the board was constructed with, as received.
    fn options(&self) -> &Options;

    /// Executable to preload, if one was given.
    fn binary(&self) -> Option<&str>;

    fn memory_map(&self) -> &[MemoryRegion];

    fn components(&self) -> &[ComponentInfo];

    fn region_at(&self, addr: u64) -> Option<&MemoryRegion> {
        self.memory_map().iter().find(|region| region.contains(addr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_from_str() {
        assert_eq!("GVSOC".parse::<Platform>(), Ok(Platform::Gvsoc));
        assert_eq!("rtl".parse::<Platform>(), Ok(Platform::Rtl));
        assert!("fpga".parse::<Platform>().is_err());
    }

    #[test]
    fn test_region_bounds() {
        let l2 = MemoryRegion::new("l2", 0x1C00_0000, 0x1000);
        assert!(l2.contains(0x1C00_0000));
        assert!(l2.contains(0x1C00_0FFF));
        assert!(!l2.contains(0x1C00_1000));

        let next = MemoryRegion::new("next", 0x1C00_1000, 0x10);
        assert!(!l2.overlaps(&next));
        assert!(l2.overlaps(&MemoryRegion::new("inner", 0x1C00_0800, 0x1000)));
    }
}
