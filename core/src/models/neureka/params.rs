/// Hardware dimensions of a Neureka instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HwParams {
    /// Processing elements along the output width.
    pub pe_count_x: usize,
    /// Processing elements along the output height.
    pub pe_count_y: usize,
    /// Input feature buffer width, PEs plus the 3x3 halo.
    pub infeat_buffer_size_x: usize,
    pub infeat_buffer_size_y: usize,
    /// Input channels a PE consumes per tile.
    pub infeat_scalar_buffer_count: usize,
    /// Output channels accumulated per PE.
    pub accumulator_per_pe: usize,
    /// Binconv rows per column (one per 3x3 filter position).
    pub compute_row_count: usize,
    /// Columns sharing one weight bit in 1x1 mode.
    pub channelwise_1x1: usize,
    /// Rows reused per column in 1x1 mode.
    pub repeated_1x1: usize,
    /// Bytes the streamer moves per L1 access.
    pub l1_bandwidth_bytes: usize,
    /// Address window of the cluster L1 seen by the streamers.
    pub l1_mask: u32,
}

impl Default for HwParams {
    fn default() -> Self {
        Self {
            pe_count_x: 6,
            pe_count_y: 6,
            infeat_buffer_size_x: 8,
            infeat_buffer_size_y: 8,
            infeat_scalar_buffer_count: 32,
            accumulator_per_pe: 32,
            compute_row_count: 9,
            channelwise_1x1: 4,
            repeated_1x1: 8,
            l1_bandwidth_bytes: 256 / 8,
            l1_mask: 0x0003_FFFF,
        }
    }
}

impl HwParams {
    pub fn pe_count(&self) -> usize {
        self.pe_count_x * self.pe_count_y
    }
}
