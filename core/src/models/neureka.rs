//! Neureka convolution accelerator.
//!
//! Only the tiling controller is modeled: it walks a layer tile by tile and
//! tells the streamers which addresses to load from and store to.

pub mod control;
pub mod params;

pub use control::{Control, Mode, Padding, RegConfig, StreamerConfig};
pub use params::HwParams;
