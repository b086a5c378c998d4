//! Selectable virtual targets.
//!
//! A target is a named entry point wrapping a [`Board`]. It adds nothing to the
//! board's behavior; it only tells the registry under which name it can be
//! built and how it labels itself.

use std::fmt;

use pulp_common::args::ArgParser;
use pulp_common::error::BoardError;
use pulp_common::options::Options;

use crate::board::Board;

pub mod extended_pulp;

pub trait VirtualTarget: fmt::Display + Send + Sync {
    /// Human readable label of the target.
    fn describe(&self) -> String {
        self.to_string()
    }

    /// The board every operation of the target delegates to.
    fn board(&self) -> &dyn Board;
}

/// Registration contract of a target type.
pub trait TargetDescriptor: VirtualTarget + Sized + 'static {
    /// Name the target is selected by.
    const NAME: &'static str;

    /// Label shown before the target is built. Matches `describe()`.
    const LABEL: &'static str;

    /// Targets with this unset are skipped at registration.
    const IS_TARGET: bool;

    fn construct(parser: &mut ArgParser, options: &Options) -> Result<Self, BoardError>;
}
