//! # Extended PULP Board
//!
//! Multi-cluster PULP chip with an optional Neureka accelerator per cluster.
//!
//! Recognized options (defaults in brackets):
//! * `soc/nb_cluster` [1]: number of clusters, 1 to 16.
//! * `cluster/nb_pe` [8]: cores per cluster, 1 to 32.
//! * `cluster/l1/size` [0x10000]: L1 scratchpad size per cluster.
//! * `soc/l2/size` [0x80000]: L2 memory size.
//! * `cluster/neureka` [true]: instantiate the Neureka accelerator.
//!
//! Declared arguments: `binary` and `platform` (`gvsoc` or `rtl`).

use std::fmt;

use pulp_common::args::ArgParser;
use pulp_common::error::BoardError;
use pulp_common::options::{OptionValue, Options};
use tracing::debug;

use crate::board::{Board, ChipConfig, ComponentInfo, ComponentKind, MemoryRegion, Platform};
use crate::models::cluster_ctrl::ClusterCtrl;
use crate::models::neureka::{Control, HwParams};

pub const L2_BASE: u64 = 0x1C00_0000;
pub const CLUSTER_BASE: u64 = 0x1000_0000;
pub const CLUSTER_SIZE: u64 = 0x40_0000;
pub const CLUSTER_PERIPHERALS_OFFSET: u64 = 0x20_0000;
pub const CLUSTER_CTRL_OFFSET: u64 = 0x0;
pub const CLUSTER_CTRL_SIZE: u64 = 0x400;
pub const NEUREKA_OFFSET: u64 = 0x1000;
pub const NEUREKA_SIZE: u64 = 0x400;

const MAX_CLUSTERS: u32 = 16;
const MAX_PE: u32 = 32;

pub struct ExtendedPulpBoard {
    platform: Platform,
    binary: Option<String>,
    chip: ChipConfig,
    options: Options,
    memory_map: Vec<MemoryRegion>,
    components: Vec<ComponentInfo>,
}

impl ExtendedPulpBoard {
    pub const NAME: &'static str = "extended_pulp";

    pub fn new(parser: &mut ArgParser, options: &Options) -> Result<Self, BoardError> {
        parser.add_argument("binary", None, "Executable preloaded into L2 before boot")?;
        parser.add_argument("platform", Some("gvsoc"), "Platform the board is generated for")?;

        let platform = match parser.value("platform") {
            Some(raw) => raw.parse::<Platform>().map_err(|reason| BoardError::InvalidArgument {
                name: "platform".to_string(),
                value: raw.to_string(),
                reason,
            })?,
            None => Platform::default(),
        };
        let binary = parser.value("binary").map(str::to_string);

        let chip = chip_config(options)?;
        let memory_map = memory_map(&chip);
        let components = components(&chip);

        debug!(
            nb_cluster = chip.nb_cluster,
            nb_pe = chip.nb_pe,
            neureka = chip.neureka,
            %platform,
            "assembled extended pulp board"
        );

        Ok(Self {
            platform,
            binary,
            chip,
            options: options.clone(),
            memory_map,
            components,
        })
    }

    /// Base address of the peripheral area of `cluster`.
    pub fn cluster_peripherals(cluster: u32) -> u64 {
        CLUSTER_BASE + u64::from(cluster) * CLUSTER_SIZE + CLUSTER_PERIPHERALS_OFFSET
    }

    /// Builds the controller model of `cluster`, sized for this board.
    pub fn cluster_ctrl(&self, cluster: u32) -> Option<ClusterCtrl> {
        (cluster < self.chip.nb_cluster).then(|| ClusterCtrl::new(self.chip.nb_pe as usize))
    }

    /// Builds the Neureka tiling controller of `cluster`, if the board has one.
    pub fn neureka(&self, cluster: u32) -> Option<Control> {
        (self.chip.neureka && cluster < self.chip.nb_cluster).then(|| Control::new(HwParams::default()))
    }
}

fn chip_config(options: &Options) -> Result<ChipConfig, BoardError> {
    let nb_cluster = bounded(options, "soc/nb_cluster", 1, 1, MAX_CLUSTERS)?;
    let nb_pe = bounded(options, "cluster/nb_pe", 8, 1, MAX_PE)?;
    let l1_size = bounded(options, "cluster/l1/size", 0x1_0000, 1, CLUSTER_PERIPHERALS_OFFSET)?;
    let l2_size = bounded(options, "soc/l2/size", 0x8_0000, 1, 0x400_0000)?;
    let neureka = options.get_or("cluster/neureka", true)?;

    Ok(ChipConfig {
        nb_cluster,
        nb_pe,
        l1_size,
        l2_size,
        neureka,
    })
}

fn bounded<T>(options: &Options, key: &str, default: T, min: T, max: T) -> Result<T, BoardError>
where
    T: OptionValue + PartialOrd + Copy + fmt::LowerHex,
{
    let value = options.get_or(key, default)?;
    if value < min || value > max {
        return Err(BoardError::InvalidOption {
            key: key.to_string(),
            value: options.raw(key).unwrap_or_default().to_string(),
            reason: format!("must be between {min:#x} and {max:#x}"),
        });
    }
    Ok(value)
}

fn memory_map(chip: &ChipConfig) -> Vec<MemoryRegion> {
    let mut regions = vec![MemoryRegion::new("l2", L2_BASE, chip.l2_size)];

    for cluster in 0..chip.nb_cluster {
        let base = CLUSTER_BASE + u64::from(cluster) * CLUSTER_SIZE;
        let periph = ExtendedPulpBoard::cluster_peripherals(cluster);

        regions.push(MemoryRegion::new(format!("cluster{cluster}/l1"), base, chip.l1_size));
        regions.push(MemoryRegion::new(
            format!("cluster{cluster}/cluster_ctrl"),
            periph + CLUSTER_CTRL_OFFSET,
            CLUSTER_CTRL_SIZE,
        ));
        if chip.neureka {
            regions.push(MemoryRegion::new(
                format!("cluster{cluster}/neureka"),
                periph + NEUREKA_OFFSET,
                NEUREKA_SIZE,
            ));
        }
    }

    regions
}

fn components(chip: &ChipConfig) -> Vec<ComponentInfo> {
    let mut components = Vec::new();

    for cluster in 0..chip.nb_cluster {
        let periph = ExtendedPulpBoard::cluster_peripherals(cluster);
        components.push(ComponentInfo {
            path: format!("cluster{cluster}/cluster_ctrl"),
            kind: ComponentKind::ClusterCtrl { nb_core: chip.nb_pe },
            base: periph + CLUSTER_CTRL_OFFSET,
        });
        if chip.neureka {
            components.push(ComponentInfo {
                path: format!("cluster{cluster}/neureka"),
                kind: ComponentKind::Neureka,
                base: periph + NEUREKA_OFFSET,
            });
        }
    }

    components
}

impl Board for ExtendedPulpBoard {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn platform(&self) -> Platform {
        self.platform
    }

    fn chip(&self) -> &ChipConfig {
        &self.chip
    }

    fn options(&self) -> &Options {
        &self.options
    }

    fn binary(&self) -> Option<&str> {
        self.binary.as_deref()
    }

    fn memory_map(&self) -> &[MemoryRegion] {
        &self.memory_map
    }

    fn components(&self) -> &[ComponentInfo] {
        &self.components
    }
}

impl fmt::Display for ExtendedPulpBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Extended pulp board")
    }
}
