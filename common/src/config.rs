pub struct Config {
    /// Reduces the amount of output.
    ///
    /// `1` hides headers, `2` also hides the per-target details.
    pub quiet: u8,
}
