//! Virtual board assembly for PULP based platforms.
//!
//! A [`targets::VirtualTarget`] is selected by name through the
//! [`registry::TargetRegistry`], constructed from an
//! [`ArgParser`](pulp_common::args::ArgParser) and
//! [`Options`](pulp_common::options::Options), and delegates everything it
//! knows about the hardware to the [`board::Board`] it embeds.

pub mod board;
pub mod boards;
pub mod models;
pub mod registry;
pub mod targets;
