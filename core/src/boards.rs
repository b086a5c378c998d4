//! Concrete boards targets build on.

pub mod extended_pulp;

pub use extended_pulp::ExtendedPulpBoard;
