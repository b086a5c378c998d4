use crate::terminal::colors;
use colored::*;
use pulp_common::args::ArgSpec;
use pulp_core::board::{ComponentInfo, MemoryRegion};

pub type Detail = (String, ColoredString);

pub fn hex(value: u64) -> ColoredString {
    format!("{value:#010x}").color(colors::ADDRESS)
}

/// Renders a byte count with the largest binary unit dividing it exactly.
pub fn size(bytes: u64) -> String {
    const UNITS: [(u64, &str); 3] = [(1 << 30, "GiB"), (1 << 20, "MiB"), (1 << 10, "KiB")];

    UNITS
        .iter()
        .find(|(unit, _)| bytes >= *unit && bytes % unit == 0)
        .map(|(unit, name)| format!("{} {}", bytes / unit, name))
        .unwrap_or_else(|| format!("{bytes} B"))
}

pub fn region_to_detail(region: &MemoryRegion) -> Detail {
    let value = format!(
        "{} - {} ({})",
        hex(region.base),
        hex(region.end()),
        size(region.size).color(colors::SIZE)
    );
    (region.name.clone(), value.normal())
}

pub fn component_to_detail(component: &ComponentInfo) -> Detail {
    let value = format!("{} @ {}", component.kind, hex(component.base));
    (component.path.clone(), value.normal())
}

pub fn argument_to_detail(spec: &ArgSpec, value: Option<&str>) -> Detail {
    let value = match value {
        Some(value) => value.color(colors::ACCENT),
        None => "unset".dimmed(),
    };
    (spec.name.clone(), value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_use_exact_units() {
        assert_eq!(size(0x10000), "64 KiB");
        assert_eq!(size(0x80000), "512 KiB");
        assert_eq!(size(0x100000), "1 MiB");
        assert_eq!(size(0x400), "1 KiB");
        assert_eq!(size(1000), "1000 B");
    }
}
