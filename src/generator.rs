//! Phase generators.
//!
//! This module defines the [`PhaseGenerator`] trait, which is implemented by
//! the [`Reference`] and [`Fused`] generators. Both generators must produce
//! the same register map for the same configuration.

use crate::{config::Config, fused, reference, regmap::RegisterMap};

/// Phase generator.
///
/// A phase generator calculates the register map of the scaler core for a
/// configuration. The calculation has no side effects and does not keep any
/// state across calls.
pub trait PhaseGenerator {
    /// Name of the generator, used in reports.
    fn name(&self) -> &'static str;

    /// Calculates the register map for a configuration.
    fn generate(&self, config: &Config) -> RegisterMap;
}

/// Reference generator.
///
/// See [`reference`](crate::reference).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct Reference;

/// Fused generator.
///
/// See [`fused`](crate::fused).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct Fused;

impl PhaseGenerator for Reference {
    fn name(&self) -> &'static str {
        "reference"
    }

    fn generate(&self, config: &Config) -> RegisterMap {
        reference::generate(config)
    }
}

impl PhaseGenerator for Fused {
    fn name(&self) -> &'static str {
        "fused"
    }

    fn generate(&self, config: &Config) -> RegisterMap {
        fused::generate(config)
    }
}

/// Calculates the register map using the reference generator.
pub fn generate_reference(config: &Config) -> RegisterMap {
    Reference.generate(config)
}

/// Calculates the register map using the fused generator.
pub fn generate_fused(config: &Config) -> RegisterMap {
    Fused.generate(config)
}
