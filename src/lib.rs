//! hscaler-regmap computes the phase, tap index and write-enable signals of a
//! horizontal scaler (pixel-rate converter) and packs them into the register
//! map of the scaler core. Two independent implementations are provided: a
//! reference implementation that goes through an intermediate phase table,
//! and a fused implementation that writes the register map in a single pass.
//! The binary compares both implementations for a given configuration.

#![warn(missing_docs)]

pub mod app;
pub mod args;
pub mod config;
pub mod constants;
pub mod fused;
pub mod generator;
pub mod layout;
pub mod reference;
pub mod regmap;

pub use config::Config;
pub use generator::{generate_fused, generate_reference, PhaseGenerator};
pub use regmap::{Comparison, RegisterMap};
