//! # Neureka Tiling Controller
//!
//! A layer is split in tiles along four dimensions, iterated innermost first:
//! input channels (`kin`), output width (`wout`), output height (`hout`) and
//! output channels (`kout`). For the current tile the controller derives
//! which PEs, columns and binconv rows are active, steps the load and store
//! iterators, and computes streamer configurations.
//!
//! Tile remainders of zero mean the last tile is a full one.

use tracing::{trace, warn};

use super::params::HwParams;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Dense3x3,
    Depthwise,
    Pointwise,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Padding {
    pub top: usize,
    pub right: usize,
    pub bottom: usize,
    pub left: usize,
}

impl Padding {
    fn on_all_sides(&self) -> bool {
        self.top > 0 && self.right > 0 && self.bottom > 0 && self.left > 0
    }
}

/// Three dimensional address stride, in bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stride {
    pub d0: u32,
    pub d1: u32,
    pub d2: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Length {
    pub d0: usize,
    pub d1: usize,
    pub d2: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamerConfig {
    pub base_addr: u32,
    pub stride: Stride,
    pub length: Length,
}

/// Job configuration as programmed in the register file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegConfig {
    pub filter_mode: Mode,
    pub weight_bit_count: usize,
    /// Output width in bits, 8 or 32.
    pub quantization_bit_count: usize,
    pub strided2x2: bool,
    /// Depthwise only: every output channel reads the same input channels.
    pub broadcast: bool,

    pub kin_tile_count: usize,
    pub kout_tile_count: usize,
    pub hout_tile_count: usize,
    pub wout_tile_count: usize,

    pub kin_tile_rem: usize,
    pub kout_tile_rem: usize,
    pub hout_tile_rem: usize,
    pub wout_tile_rem: usize,
    pub hin_tile_rem: usize,
    pub win_tile_rem: usize,

    pub padding: Padding,
    /// Bit `row` set disables binconv row `row`.
    pub filter_mask: u32,

    pub infeat_ptr: u32,
    pub weight_ptr: u32,
    pub outfeat_ptr: u32,
    pub infeat_stride: Stride,
    pub weight_stride: Stride,
    pub outfeat_stride: Stride,
}

impl Default for RegConfig {
    fn default() -> Self {
        Self {
            filter_mode: Mode::default(),
            weight_bit_count: 8,
            quantization_bit_count: 8,
            strided2x2: false,
            broadcast: false,
            kin_tile_count: 1,
            kout_tile_count: 1,
            hout_tile_count: 1,
            wout_tile_count: 1,
            kin_tile_rem: 0,
            kout_tile_rem: 0,
            hout_tile_rem: 0,
            wout_tile_rem: 0,
            hin_tile_rem: 0,
            win_tile_rem: 0,
            padding: Padding::default(),
            filter_mask: 0,
            infeat_ptr: 0,
            weight_ptr: 0,
            outfeat_ptr: 0,
            infeat_stride: Stride::default(),
            weight_stride: Stride::default(),
            outfeat_stride: Stride::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TileDims {
    pub kin: usize,
    pub kout: usize,
    pub hout: usize,
    pub wout: usize,
    pub hin: usize,
    pub win: usize,
}

impl TileDims {
    /// One along every dimension.
    pub const fn single() -> Self {
        Self {
            kin: 1,
            kout: 1,
            hout: 1,
            wout: 1,
            hin: 1,
            win: 1,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TileDone {
    pub kin: bool,
    pub kout: bool,
    pub hout: bool,
    pub wout: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TilingStatus {
    pub index: TileDims,
    pub count: TileDims,
    pub done: TileDone,
    pub finish: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InFeatLoad {
    pub win: usize,
    pub hin: usize,
    /// Linear position in the input buffer of the last loaded pixel.
    pub hin_x_win: usize,
    pub count_win: usize,
    pub count_hin: usize,
    pub done: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WeightLoad {
    pub wgt: usize,
    pub kout: usize,
    pub done: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OutFeatStore {
    pub word: usize,
    pub wout: usize,
    pub hout: usize,
    pub count_word: usize,
    pub count_wout: usize,
    pub count_hout: usize,
    pub done: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadStoreStatus {
    pub infeat: InFeatLoad,
    pub weight: WeightLoad,
    pub outfeat: OutFeatStore,
}

#[derive(Clone, Debug, Default)]
pub struct Control {
    hw: HwParams,
    config: RegConfig,
    pub tiles: TilingStatus,
    pub prev_tiles: TilingStatus,
    pub load_store: LoadStoreStatus,
    pub current_tile_size: TileDims,
    pub total_size: TileDims,
    pe_enable: Vec<bool>,
    col_enable: Vec<Vec<bool>>,
}

/// Full size unless this is the last tile and a remainder is programmed.
fn tile_extent(index: usize, count: usize, rem: usize, full: usize) -> usize {
    if index + 1 < count || rem == 0 { full } else { rem }
}

fn div_ceil8(n: usize) -> usize {
    n.div_ceil(8)
}

/// Remainder of `n` over 8, with a multiple of 8 counting as a full word.
fn rem8(n: usize) -> usize {
    match n % 8 {
        0 => 8,
        r => r,
    }
}

impl Control {
    /// An unconfigured controller behaves as a single tile job.
    pub fn new(hw: HwParams) -> Self {
        let mut ctrl = Self {
            hw,
            ..Self::default()
        };
        ctrl.tiles.count = TileDims::single();
        ctrl
    }

    pub fn hw(&self) -> &HwParams {
        &self.hw
    }

    pub fn config(&self) -> &RegConfig {
        &self.config
    }

    /// Rewinds to the first tile, keeping the configured tile counts.
    pub fn reset_indexes(&mut self) {
        self.tiles = TilingStatus {
            count: self.tiles.count,
            ..TilingStatus::default()
        };
        self.prev_tiles = TilingStatus::default();
        self.load_store = LoadStoreStatus::default();
        self.current_tile_size = TileDims::default();
        self.total_size = TileDims::default();
    }

    /// Loads a job configuration and resets the tile counters to it.
    pub fn set_config(&mut self, mut config: RegConfig) {
        for (name, count) in [
            ("kin", &mut config.kin_tile_count),
            ("kout", &mut config.kout_tile_count),
            ("hout", &mut config.hout_tile_count),
            ("wout", &mut config.wout_tile_count),
        ] {
            if *count == 0 {
                warn!(dimension = name, "tile count of zero, using one tile");
                *count = 1;
            }
        }

        self.tiles.count = TileDims {
            kin: if config.filter_mode == Mode::Depthwise { 1 } else { config.kin_tile_count },
            kout: config.kout_tile_count,
            hout: config.hout_tile_count,
            wout: config.wout_tile_count,
            hin: config.hout_tile_count,
            win: config.wout_tile_count,
        };
        self.tiles.done = TileDone::default();
        self.tiles.finish = false;
        self.config = config;

        trace!(count = ?self.tiles.count, "neureka configured");
    }

    pub fn compute_dimensions(&mut self) {
        let hw = self.hw;
        let cfg = &self.config;
        let index = self.tiles.index;
        let count = self.tiles.count;
        let status = &mut self.load_store;

        let (win_full, hin_full) = if cfg.filter_mode != Mode::Pointwise {
            (hw.infeat_buffer_size_x, hw.infeat_buffer_size_y)
        } else {
            (hw.pe_count_x, hw.pe_count_y)
        };
        status.infeat.count_win = tile_extent(index.wout, count.wout, cfg.win_tile_rem, win_full);
        status.infeat.count_hin = tile_extent(index.hout, count.hout, cfg.hin_tile_rem, hin_full);

        status.outfeat.count_wout = tile_extent(index.wout, count.wout, cfg.wout_tile_rem, hw.pe_count_x);
        status.outfeat.count_hout = tile_extent(index.hout, count.hout, cfg.hout_tile_rem, hw.pe_count_y);

        self.current_tile_size.kin =
            tile_extent(index.kin, count.kin, cfg.kin_tile_rem, hw.infeat_scalar_buffer_count);
        self.current_tile_size.kout =
            tile_extent(index.kout, count.kout, cfg.kout_tile_rem, hw.accumulator_per_pe);

        status.outfeat.count_word = if cfg.quantization_bit_count == 8 {
            1
        } else {
            div_ceil8(self.current_tile_size.kout)
        };

        let full = |count: usize| count.saturating_sub(1);
        self.total_size = TileDims {
            kin: full(count.kin) * hw.infeat_scalar_buffer_count + cfg.kin_tile_rem,
            kout: full(count.kout) * hw.accumulator_per_pe + cfg.kout_tile_rem,
            hout: full(count.hout) * hw.pe_count_y + cfg.hout_tile_rem,
            wout: full(count.wout) * hw.pe_count_x + cfg.wout_tile_rem,
            hin: full(count.hout) * hw.pe_count_y + cfg.hin_tile_rem,
            win: full(count.wout) * hw.pe_count_x + cfg.win_tile_rem,
        };
    }

    /// PEs holding an output pixel of the current tile, row major.
    pub fn compute_pe_enable(&mut self) -> &[bool] {
        self.compute_dimensions();

        let hw = self.hw;
        let outfeat = self.load_store.outfeat;
        self.pe_enable = (0..hw.pe_count_y)
            .flat_map(|y| (0..hw.pe_count_x).map(move |x| (x, y)))
            .map(|(x, y)| y < outfeat.count_hout && x < outfeat.count_wout)
            .collect();
        &self.pe_enable
    }

    /// Active columns per PE. With `woffs` only the first weight bit is used.
    pub fn compute_column_enable(&mut self, woffs: bool) -> &[Vec<bool>] {
        self.compute_pe_enable();

        let hw = self.hw;
        let columns = hw.infeat_scalar_buffer_count;
        let mode = self.config.filter_mode;
        let weight_bits = self.config.weight_bit_count;
        let tile = self.current_tile_size;

        self.col_enable = self
            .pe_enable
            .iter()
            .map(|&pe_enabled| {
                let mut cols = vec![false; columns];
                match mode {
                    Mode::Pointwise => {
                        for wgt_bit in 0..weight_bits {
                            for i in 0..hw.channelwise_1x1 {
                                let index = wgt_bit * hw.channelwise_1x1 + i;
                                if index < columns {
                                    cols[index] = pe_enabled && !(woffs && wgt_bit > 0);
                                }
                            }
                        }
                    }
                    Mode::Depthwise => {
                        for (col, enabled) in cols.iter_mut().enumerate() {
                            *enabled = col < tile.kout && pe_enabled;
                        }
                    }
                    Mode::Dense3x3 => {
                        for (col, enabled) in cols.iter_mut().enumerate() {
                            *enabled = col < tile.kin && pe_enabled;
                        }
                    }
                }
                cols
            })
            .collect();
        &self.col_enable
    }

    /// Active binconv rows, indexed `[pe][column][row]`.
    pub fn compute_binconv_enable(&mut self, woffs: bool) -> Vec<Vec<Vec<bool>>> {
        self.compute_column_enable(woffs);

        let hw = self.hw;
        let rows = hw.compute_row_count;
        let mode = self.config.filter_mode;
        let weight_bits = self.config.weight_bit_count;
        let mask = self.config.filter_mask;
        let kin = self.current_tile_size.kin;
        let row_masked = |row: usize| row < 32 && (mask >> row) & 1 != 0;

        self.col_enable
            .iter()
            .map(|cols| {
                let mut binconv = vec![vec![false; rows]; cols.len()];
                if mode == Mode::Pointwise {
                    for wgt_bit in 0..weight_bits {
                        for i in 0..hw.channelwise_1x1 {
                            let col = wgt_bit * hw.channelwise_1x1 + i;
                            if col >= cols.len() {
                                continue;
                            }
                            for row in 0..rows.saturating_sub(1) {
                                let channel = i * hw.repeated_1x1 + row;
                                binconv[col][row] = channel < kin && cols[col] && !row_masked(row);
                            }
                        }
                    }
                } else {
                    for (col, col_rows) in binconv.iter_mut().enumerate() {
                        for (row, enabled) in col_rows.iter_mut().enumerate() {
                            *enabled = cols[col] && !row_masked(row);
                        }
                    }
                }
                binconv
            })
            .collect()
    }

    /// Advances to the next tile. Stays put once every output channel tile is done.
    pub fn update_tile_index(&mut self) {
        self.prev_tiles = self.tiles;
        let index = &mut self.tiles.index;
        let count = self.tiles.count;

        if index.kout >= count.kout {
            return;
        }

        index.kin += 1;
        if index.kin >= count.kin {
            index.kin = 0;
            index.wout += 1;
            if index.wout >= count.wout {
                index.wout = 0;
                index.hout += 1;
                if index.hout >= count.hout {
                    index.hout = 0;
                    index.kout += 1;
                }
            }
        }
        index.win = index.wout;
        index.hin = index.hout;
    }

    pub fn check_tile_status(&mut self) {
        let index = self.tiles.index;
        let count = self.tiles.count;
        let done = TileDone {
            kin: index.kin + 1 == count.kin,
            kout: index.kout + 1 == count.kout,
            hout: index.hout + 1 == count.hout,
            wout: index.wout + 1 == count.wout,
        };
        self.tiles.done = done;
        self.tiles.finish = done.kin && done.kout && done.hout && done.wout;
    }

    pub fn reset_infeat_load_iteration(&mut self) {
        let infeat = &mut self.load_store.infeat;
        infeat.done = false;
        infeat.win = 0;
        infeat.hin = 0;
    }

    /// Steps the input pixel iterator, row major over the input tile.
    pub fn infeat_load_iteration(&mut self) {
        let buffer_x = self.hw.infeat_buffer_size_x;
        let infeat = &mut self.load_store.infeat;
        let last_w = infeat.win + 1 >= infeat.count_win;
        let last_h = infeat.hin + 1 >= infeat.count_hin;

        infeat.hin_x_win = infeat.hin * buffer_x + infeat.win;
        infeat.done = last_w && last_h;
        if last_w {
            infeat.win = 0;
            infeat.hin = if last_h { 0 } else { infeat.hin + 1 };
        } else {
            infeat.win += 1;
        }
    }

    pub fn reset_weight_load_iteration(&mut self) {
        let weight = &mut self.load_store.weight;
        weight.kout = 0;
        weight.wgt = 0;
    }

    /// Steps the weight iterator: bits for depthwise, output channels for
    /// pointwise, bits within output channels for dense 3x3.
    pub fn weight_load_iteration(&mut self) {
        let last_qw = self.load_store.weight.wgt + 1 >= self.config.weight_bit_count;
        let last_kout = self.load_store.weight.kout + 1 >= self.current_tile_size.kout;
        let weight = &mut self.load_store.weight;

        match self.config.filter_mode {
            Mode::Depthwise => {
                weight.kout = 0;
                if !last_qw {
                    weight.wgt += 1;
                }
                weight.done = last_qw;
            }
            Mode::Pointwise => {
                weight.wgt = 0;
                if !last_kout {
                    weight.kout += 1;
                }
                weight.done = last_kout;
            }
            Mode::Dense3x3 => {
                if last_qw {
                    weight.wgt = 0;
                    weight.kout = if last_kout { 0 } else { weight.kout + 1 };
                } else {
                    weight.wgt += 1;
                }
                weight.done = last_qw && last_kout;
            }
        }
    }

    pub fn reset_outfeat_store_iteration(&mut self) {
        let outfeat = &mut self.load_store.outfeat;
        outfeat.done = false;
        outfeat.word = 0;
        outfeat.wout = 0;
        outfeat.hout = 0;
    }

    /// Bytes stored by the current outfeat store step.
    pub fn outfeat_store_width(&self) -> usize {
        let kout = self.current_tile_size.kout;
        let outfeat = &self.load_store.outfeat;

        if self.config.quantization_bit_count != 32 {
            return kout;
        }
        if outfeat.word + 1 < outfeat.count_word {
            self.hw.l1_bandwidth_bytes
        } else {
            4 * rem8(kout)
        }
    }

    /// Steps the output iterator: words, then pixels along the width, then
    /// rows. A stride of 2x2 skips every other pixel and row.
    pub fn outfeat_store_iteration(&mut self) {
        let offs = if self.config.strided2x2 { 2 } else { 1 };
        let outfeat = &mut self.load_store.outfeat;

        let last_word = outfeat.word + 1 >= outfeat.count_word;
        let last_w = outfeat.wout + offs >= outfeat.count_wout;
        let last_h = outfeat.hout + offs >= outfeat.count_hout;

        outfeat.done = last_word && last_w && last_h;
        if !last_word {
            outfeat.word += 1;
            return;
        }

        outfeat.word = 0;
        if !last_w {
            outfeat.wout += offs;
            return;
        }

        outfeat.wout = 0;
        outfeat.hout = if last_h { 0 } else { outfeat.hout + offs };
    }

    /// Whether the input pixel being loaded falls in the padding border.
    pub fn padding_enable(&self) -> bool {
        let infeat = &self.load_store.infeat;
        let padding = self.config.padding;
        let index = self.tiles.index;
        let count = self.tiles.count;
        let lim = padding.left;

        (padding.left > 0 && infeat.win < padding.left && index.win == 0)
            || (padding.top > 0 && infeat.hin < padding.top && index.hin == 0)
            || (padding.right > 0 && infeat.win + lim >= infeat.count_win && index.win + 1 == count.win)
            || (padding.bottom > 0 && infeat.hin + lim >= infeat.count_hin && index.hin + 1 == count.hin)
    }

    pub fn infeat_load_streamer_config(&self) -> StreamerConfig {
        let hw = &self.hw;
        let cfg = &self.config;
        let index = &self.tiles.index;
        let total = &self.total_size;
        let padded = cfg.padding.on_all_sides();

        let (addr_kin, addr_win, addr_hin) = if cfg.filter_mode != Mode::Depthwise {
            let row = if padded {
                total.win.saturating_sub(2 * cfg.padding.left)
            } else {
                total.win
            };
            (
                index.kin * hw.infeat_scalar_buffer_count,
                index.win * hw.pe_count_x * total.kin,
                index.hin * hw.pe_count_y * row * total.kin,
            )
        } else if cfg.broadcast {
            let row = if padded {
                total.win.saturating_sub(2 * cfg.padding.left)
            } else {
                total.win
            };
            (
                hw.infeat_scalar_buffer_count,
                index.win * hw.pe_count_x,
                index.hin * hw.pe_count_y * row,
            )
        } else {
            let row = if padded { total.win.saturating_sub(2) } else { total.win };
            (
                index.kout * hw.infeat_scalar_buffer_count,
                index.win * hw.pe_count_x * total.kout,
                index.hin * hw.pe_count_y * row * total.kout,
            )
        };

        let offset = (addr_hin + addr_win + addr_kin) as u32;
        StreamerConfig {
            base_addr: hw.l1_mask & cfg.infeat_ptr.wrapping_add(offset),
            stride: cfg.infeat_stride,
            length: Length {
                d0: self.load_store.infeat.count_win,
                d1: self.load_store.infeat.count_hin,
                d2: 1,
            },
        }
    }

    pub fn weight_load_streamer_config(&self) -> StreamerConfig {
        let hw = &self.hw;
        let cfg = &self.config;
        let index = &self.tiles.index;
        let mode = cfg.filter_mode;
        let qw = cfg.weight_bit_count;

        let filter_size = if mode == Mode::Pointwise { 1 } else { 3 * 3 };
        let addr_fs = (hw.infeat_scalar_buffer_count / 8) * filter_size;
        let addr_qw = if mode == Mode::Depthwise { index.kout } else { index.kin } * addr_fs * qw;
        let addr_kout = if mode == Mode::Depthwise {
            0
        } else {
            index.kout * cfg.kin_tile_count * hw.accumulator_per_pe * qw * addr_fs
        };

        StreamerConfig {
            base_addr: cfg.weight_ptr.wrapping_add((addr_kout + addr_qw) as u32),
            stride: cfg.weight_stride,
            length: Length {
                d0: if mode == Mode::Pointwise { 1 } else { qw },
                d1: if mode == Mode::Depthwise { 1 } else { self.current_tile_size.kout },
                d2: 1,
            },
        }
    }

    /// Store configuration for the tile that was just computed.
    pub fn outfeat_store_streamer_config(&self) -> StreamerConfig {
        let hw = &self.hw;
        let cfg = &self.config;
        let prev = &self.prev_tiles.index;
        let total = &self.total_size;
        let outfeat = &self.load_store.outfeat;

        let offs = if cfg.strided2x2 { 2 } else { 1 };
        let h_size = if cfg.strided2x2 {
            total.kout * total.wout.div_ceil(offs)
        } else {
            cfg.outfeat_stride.d2 as usize
        };
        let scale = if cfg.quantization_bit_count == 32 { 4 } else { 1 };

        let addr_kout = scale * prev.kout * hw.accumulator_per_pe;
        let addr_wout = scale * prev.wout * (hw.pe_count_x / offs) * cfg.outfeat_stride.d1 as usize;
        let addr_hout = scale * prev.hout * (hw.pe_count_y / offs) * h_size;
        let offset = (addr_kout + addr_wout + addr_hout) as u32;

        let (d1, d2) = if cfg.strided2x2 {
            (outfeat.count_wout.div_ceil(2), outfeat.count_hout.div_ceil(2))
        } else {
            (outfeat.count_wout, outfeat.count_hout)
        };

        StreamerConfig {
            base_addr: hw.l1_mask & cfg.outfeat_ptr.wrapping_add(offset),
            stride: cfg.outfeat_stride,
            length: Length {
                d0: outfeat.count_word,
                d1,
                d2,
            },
        }
    }
}
