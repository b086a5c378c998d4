//! Register level models of the components a board instantiates.

pub mod cluster_ctrl;
pub mod io;
pub mod neureka;
pub mod wire;
