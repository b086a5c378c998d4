//! # Cluster Controller
//!
//! Register block controlling the cores of one cluster: boot addresses,
//! fetch enable and the debug cross-trigger halt logic.
//!
//! Only 32-bit accesses are accepted. Each core owns three output wires
//! (boot address, fetch enable, halt) and reports its own halt state back
//! through [`ClusterCtrl::halt_status_sync`].
//!
//! Cross-trigger: when one core in the halt mask halts, every core in the
//! mask is halted with it. Writing a bit to `DBG_STATUS` resumes that core.

use tracing::{debug, trace, warn};

use crate::models::io::{IoReq, IoReqStatus, IoSlave};
use crate::models::wire::WireMaster;

pub const FETCH_EN: u64 = 0x08;
pub const EVENT: u64 = 0x10;
pub const CLUSTER_CFG: u64 = 0x18;
pub const CLUSTER_CLK_GATE: u64 = 0x20;
pub const DBG_STATUS: u64 = 0x28;
pub const DBG_HALT_MASK: u64 = 0x38;
pub const BOOTADDR_BASE: u64 = 0x40;

/// Boot address of every core until software programs one.
pub const BOOTADDR_RESET: u32 = 0x5757_5757;

/// Halt bitmasks are 32 bits wide.
pub const MAX_CORES: usize = 32;

/// Offset of the boot address register of `core`.
pub const fn bootaddr(core: usize) -> u64 {
    BOOTADDR_BASE + (core as u64) * 4
}

const fn bootaddr_core(offset: u64) -> usize {
    ((offset - BOOTADDR_BASE) >> 2) as usize
}

/// Output wires of one core.
#[derive(Debug, Default)]
pub struct CorePorts {
    pub bootaddr: WireMaster<u32>,
    pub fetch_enable: WireMaster<bool>,
    pub halt: WireMaster<bool>,
}

#[derive(Debug)]
pub struct ClusterCtrl {
    ports: Vec<CorePorts>,
    bootaddrs: Vec<u32>,
    fetch_en: u32,
    dbg_halt_mask: u32,
    dbg_halt_status: u32,
    dbg_halt_status_sync: u32,
}

impl ClusterCtrl {
    pub fn new(nb_core: usize) -> Self {
        if nb_core > MAX_CORES {
            warn!(nb_core, "cluster controller supports at most {MAX_CORES} cores, extra cores ignored");
        }
        let nb_core = nb_core.min(MAX_CORES);

        Self {
            ports: (0..nb_core).map(|_| CorePorts::default()).collect(),
            bootaddrs: vec![BOOTADDR_RESET; nb_core],
            fetch_en: 0,
            dbg_halt_mask: 0,
            dbg_halt_status: 0,
            dbg_halt_status_sync: 0,
        }
    }

    pub fn nb_core(&self) -> usize {
        self.ports.len()
    }

    pub fn ports(&mut self, core: usize) -> Option<&mut CorePorts> {
        self.ports.get_mut(core)
    }

    pub fn bootaddr(&self, core: usize) -> Option<u32> {
        self.bootaddrs.get(core).copied()
    }

    pub fn dbg_halt_status(&self) -> u32 {
        self.dbg_halt_status
    }

    pub fn dbg_halt_mask(&self) -> u32 {
        self.dbg_halt_mask
    }

    pub fn reset(&mut self, active: bool) {
        if active {
            self.dbg_halt_mask = 0;
            self.dbg_halt_status = 0;
            self.dbg_halt_status_sync = 0;
        }
    }

    /// A core reports whether it is halted.
    pub fn halt_status_sync(&mut self, core: usize, halted: bool) {
        if core >= self.nb_core() {
            warn!(core, "halt status from unknown core");
            return;
        }
        trace!(core, halted, "received new core halt status");

        let bit = 1u32 << core;
        self.dbg_halt_status = (self.dbg_halt_status & !bit) | (u32::from(halted) << core);
        self.dbg_halt_status_sync = self.dbg_halt_status;

        if halted {
            self.check_dbg_halt();
        }
    }

    fn check_dbg_halt(&mut self) {
        let trig_mask = self.dbg_halt_status & self.dbg_halt_mask;

        if trig_mask != 0 && trig_mask != self.dbg_halt_mask {
            debug!(
                halt_status = format_args!("{:#x}", trig_mask),
                new_halt_status = format_args!("{:#x}", self.dbg_halt_mask),
                "propagating cross-trigger halt"
            );
            self.dbg_halt_status |= self.dbg_halt_mask;
        }

        if self.dbg_halt_status == self.dbg_halt_status_sync {
            return;
        }

        let previous = self.dbg_halt_status_sync;
        self.dbg_halt_status_sync = self.dbg_halt_status;

        for (core, ports) in self.ports.iter_mut().enumerate() {
            let current = (self.dbg_halt_status >> core) & 1 != 0;
            let synced = (previous >> core) & 1 != 0;

            if current != synced {
                trace!(core, halt = current, "synchronizing core halt");
                ports.halt.sync(current);
            }
        }
    }

    fn fetch_en_req(&mut self, is_write: bool, data: u32) -> (IoReqStatus, Option<u32>) {
        if !is_write {
            return (IoReqStatus::Ok, Some(self.fetch_en));
        }

        self.fetch_en = data;
        for (core, ports) in self.ports.iter_mut().enumerate() {
            ports.fetch_enable.sync((data >> core) & 1 != 0);
        }
        (IoReqStatus::Ok, None)
    }

    fn bootaddr_req(&mut self, core: usize, is_write: bool, data: u32) -> (IoReqStatus, Option<u32>) {
        if !is_write {
            return (IoReqStatus::Ok, Some(self.bootaddrs[core]));
        }

        debug!(core, addr = format_args!("{:#x}", data), "setting boot address");
        self.ports[core].bootaddr.sync(data);
        self.bootaddrs[core] = data;
        (IoReqStatus::Ok, None)
    }

    fn dbg_halt_status_req(&mut self, is_write: bool, data: u32) -> (IoReqStatus, Option<u32>) {
        if !is_write {
            return (IoReqStatus::Ok, Some(self.dbg_halt_status));
        }

        debug!(dbg_status = format_args!("{:#x}", data), "writing debug status");
        // Each bit set resumes the matching core
        self.dbg_halt_status &= !data;
        self.check_dbg_halt();
        (IoReqStatus::Ok, None)
    }

    fn dbg_halt_mask_req(&mut self, is_write: bool, data: u32) -> (IoReqStatus, Option<u32>) {
        if !is_write {
            return (IoReqStatus::Ok, Some(self.dbg_halt_mask));
        }

        debug!(dbg_halt_mask = format_args!("{:#x}", data), "writing debug halt mask");
        self.dbg_halt_mask = data;
        self.check_dbg_halt();
        (IoReqStatus::Ok, None)
    }
}

impl IoSlave for ClusterCtrl {
    fn access(&mut self, req: &mut IoReq<'_>) -> IoReqStatus {
        let offset = req.offset;
        let is_write = req.is_write;
        trace!(
            offset = format_args!("{:#x}", offset),
            size = req.size(),
            is_write,
            "cluster_ctrl access"
        );

        let Some(data) = req.word() else {
            warn!(size = req.size(), "only 32 bits accesses are allowed");
            return IoReqStatus::Invalid;
        };

        let bootaddr_end = bootaddr(self.nb_core());
        let (status, read_value) = match offset {
            FETCH_EN => self.fetch_en_req(is_write, data),
            o if o >= BOOTADDR_BASE && o < bootaddr_end => {
                self.bootaddr_req(bootaddr_core(o), is_write, data)
            }
            EVENT | CLUSTER_CFG | CLUSTER_CLK_GATE => (IoReqStatus::Ok, None),
            DBG_STATUS => self.dbg_halt_status_req(is_write, data),
            DBG_HALT_MASK => self.dbg_halt_mask_req(is_write, data),
            _ => {
                warn!(offset = format_args!("{:#x}", offset), "invalid access");
                (IoReqStatus::Invalid, None)
            }
        };

        if let Some(value) = read_value {
            req.set_word(value);
        }
        status
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    type Log<T> = Arc<Mutex<Vec<(usize, T)>>>;

    fn record_halts(ctrl: &mut ClusterCtrl) -> Log<bool> {
        let log: Log<bool> = Arc::default();
        for core in 0..ctrl.nb_core() {
            let log = log.clone();
            ctrl.ports(core)
                .unwrap()
                .halt
                .bind(move |halted| log.lock().unwrap().push((core, halted)));
        }
        log
    }

    fn drain<T>(log: &Log<T>) -> Vec<(usize, T)> {
        std::mem::take(&mut *log.lock().unwrap())
    }

    #[test]
    fn test_rejects_non_word_accesses() {
        let mut ctrl = ClusterCtrl::new(4);
        let mut data = [0u8; 2];
        assert_eq!(ctrl.access(&mut IoReq::write(FETCH_EN, &mut data)), IoReqStatus::Invalid);
        assert_eq!(ctrl.read_word(0x3C), Err(IoReqStatus::Invalid));
        assert_eq!(ctrl.read_word(bootaddr(4)), Err(IoReqStatus::Invalid));
        // End of computation is not part of this block
        assert_eq!(ctrl.read_word(0x00), Err(IoReqStatus::Invalid));
    }

    #[test]
    fn test_unaligned_bootaddr_offset_selects_enclosing_core() {
        let mut ctrl = ClusterCtrl::new(4);

        assert_eq!(ctrl.write_word(bootaddr(1) + 2, 0x1C00_0100), IoReqStatus::Ok);
        assert_eq!(ctrl.bootaddr(1), Some(0x1C00_0100));
        assert_eq!(ctrl.read_word(bootaddr(1) + 3), Ok(0x1C00_0100));
        assert_eq!(ctrl.bootaddr(2), Some(BOOTADDR_RESET));
    }

    #[test]
    fn test_bootaddr_registers() {
        let mut ctrl = ClusterCtrl::new(4);
        let log: Log<u32> = Arc::default();
        {
            let log = log.clone();
            ctrl.ports(2).unwrap().bootaddr.bind(move |addr| log.lock().unwrap().push((2, addr)));
        }

        assert_eq!(ctrl.read_word(bootaddr(2)), Ok(BOOTADDR_RESET));
        assert_eq!(ctrl.write_word(bootaddr(2), 0x1C00_8080), IoReqStatus::Ok);
        assert_eq!(ctrl.read_word(bootaddr(2)), Ok(0x1C00_8080));
        assert_eq!(ctrl.bootaddr(2), Some(0x1C00_8080));
        assert_eq!(ctrl.bootaddr(1), Some(BOOTADDR_RESET));
        assert_eq!(drain(&log), [(2, 0x1C00_8080)]);
    }

    #[test]
    fn test_fetch_enable_drives_every_core() {
        let mut ctrl = ClusterCtrl::new(3);
        let log: Log<bool> = Arc::default();
        for core in 0..3 {
            let log = log.clone();
            ctrl.ports(core)
                .unwrap()
                .fetch_enable
                .bind(move |en| log.lock().unwrap().push((core, en)));
        }

        assert_eq!(ctrl.write_word(FETCH_EN, 0b101), IoReqStatus::Ok);
        assert_eq!(drain(&log), [(0, true), (1, false), (2, true)]);
        assert_eq!(ctrl.read_word(FETCH_EN), Ok(0b101));
        assert!(drain(&log).is_empty());
    }

    #[test]
    fn test_ignored_registers() {
        let mut ctrl = ClusterCtrl::new(1);
        for offset in [EVENT, CLUSTER_CFG, CLUSTER_CLK_GATE] {
            assert_eq!(ctrl.write_word(offset, 0xFFFF_FFFF), IoReqStatus::Ok);
        }
        assert_eq!(ctrl.dbg_halt_status(), 0);
    }

    #[test]
    fn test_cross_trigger_halts_masked_cores() {
        let mut ctrl = ClusterCtrl::new(4);
        let halts = record_halts(&mut ctrl);

        ctrl.write_word(DBG_HALT_MASK, 0b0111);
        assert!(drain(&halts).is_empty());

        // Core 1 hits a breakpoint
        ctrl.halt_status_sync(1, true);
        assert_eq!(ctrl.dbg_halt_status(), 0b0111);
        assert_eq!(drain(&halts), [(0, true), (2, true)]);
        assert_eq!(ctrl.read_word(DBG_STATUS), Ok(0b0111));

        // Resume everything
        ctrl.write_word(DBG_STATUS, 0b0111);
        assert_eq!(ctrl.dbg_halt_status(), 0);
        assert_eq!(drain(&halts), [(0, false), (1, false), (2, false)]);
    }

    #[test]
    fn test_unmasked_core_halts_alone() {
        let mut ctrl = ClusterCtrl::new(4);
        let halts = record_halts(&mut ctrl);

        ctrl.write_word(DBG_HALT_MASK, 0b0011);
        ctrl.halt_status_sync(3, true);

        assert_eq!(ctrl.dbg_halt_status(), 0b1000);
        assert!(drain(&halts).is_empty());
    }

    #[test]
    fn test_mask_write_propagates_existing_halt() {
        let mut ctrl = ClusterCtrl::new(2);
        let halts = record_halts(&mut ctrl);

        ctrl.halt_status_sync(0, true);
        assert!(drain(&halts).is_empty());

        ctrl.write_word(DBG_HALT_MASK, 0b11);
        assert_eq!(ctrl.read_word(DBG_HALT_MASK), Ok(0b11));
        assert_eq!(drain(&halts), [(1, true)]);
    }

    #[test]
    fn test_reset_clears_debug_state() {
        let mut ctrl = ClusterCtrl::new(2);
        ctrl.write_word(DBG_HALT_MASK, 0b11);
        ctrl.halt_status_sync(0, true);

        ctrl.reset(true);
        assert_eq!(ctrl.dbg_halt_mask(), 0);
        assert_eq!(ctrl.dbg_halt_status(), 0);
        assert_eq!(ctrl.bootaddr(0), Some(BOOTADDR_RESET));
    }

    #[test]
    fn test_core_count_is_capped() {
        assert_eq!(ClusterCtrl::new(40).nb_core(), MAX_CORES);
    }
}
