//! Scaler register map.
//!
//! This module contains [`RegisterMap`], the image of the phase registers of
//! the scaler core, and [`Comparison`], which describes the differences
//! between two register maps.

use crate::constants::{REGISTER_STRIDE, REGMAP_WORDS};
use serde::Serialize;

/// Register map.
///
/// The register map is a flat array of [`REGMAP_WORDS`] 32-bit words. Register
/// slot `k` is stored at word `k * REGISTER_STRIDE`. The other words are
/// reserved and are never written.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct RegisterMap(Vec<u32>);

/// Comparison between two register maps.
#[derive(Serialize, Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Comparison {
    /// First word that differs, if any.
    pub first_difference: Option<Difference>,
    /// Number of words that differ.
    pub num_differences: usize,
}

/// A word that differs between two register maps.
#[derive(Serialize, Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Difference {
    /// Word index in the register map.
    pub index: usize,
    /// Value in the first register map.
    pub a: u32,
    /// Value in the second register map.
    pub b: u32,
}

impl RegisterMap {
    /// Creates a register map with all the words set to zero.
    pub fn new() -> RegisterMap {
        RegisterMap(vec![0; REGMAP_WORDS])
    }

    /// Gives the number of register slots.
    pub fn num_slots(&self) -> usize {
        self.0.len() / REGISTER_STRIDE
    }

    /// Gives the value of a register slot.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is not smaller than [`RegisterMap::num_slots`].
    pub fn register(&self, slot: usize) -> u32 {
        self.0[slot * REGISTER_STRIDE]
    }

    /// Sets the value of a register slot.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is not smaller than [`RegisterMap::num_slots`].
    pub fn set_register(&mut self, slot: usize, value: u32) {
        self.0[slot * REGISTER_STRIDE] = value;
    }

    /// Writes consecutive register slots starting at `first_slot`.
    pub fn set_registers(&mut self, first_slot: usize, values: &[u32]) {
        for (slot, &value) in (first_slot..).zip(values) {
            self.set_register(slot, value);
        }
    }

    /// Gives all the words of the register map, including reserved words.
    pub fn words(&self) -> &[u32] {
        &self.0
    }

    /// Compares this register map with another one.
    pub fn compare(&self, other: &RegisterMap) -> Comparison {
        let mut differences = self
            .0
            .iter()
            .zip(other.0.iter())
            .enumerate()
            .filter(|(_, (a, b))| a != b)
            .map(|(index, (&a, &b))| Difference { index, a, b });
        let first_difference = differences.next();
        let num_differences = first_difference.map_or(0, |_| 1 + differences.count());
        Comparison {
            first_difference,
            num_differences,
        }
    }
}

impl Default for RegisterMap {
    fn default() -> RegisterMap {
        RegisterMap::new()
    }
}

impl Comparison {
    /// Returns `true` if the two register maps are equal.
    pub fn is_equal(&self) -> bool {
        self.num_differences == 0
    }
}

impl std::fmt::Display for Comparison {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        match &self.first_difference {
            None => write!(f, "Status... Equal"),
            Some(diff) => {
                writeln!(f, "Different")?;
                writeln!(f, "First offending index: {}", diff.index)?;
                writeln!(f, "A: {:#010x}\t B: {:#010x}", diff.a, diff.b)?;
                write!(f, "Num differences: {}", self.num_differences)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn stride() {
        let mut regmap = RegisterMap::new();
        assert_eq!(regmap.words().len(), 3840 * 4);
        assert_eq!(regmap.num_slots(), 3840);
        regmap.set_registers(2, &[0xaa, 0xbb]);
        assert_eq!(regmap.words()[8], 0xaa);
        assert_eq!(regmap.words()[12], 0xbb);
        assert_eq!(regmap.register(3), 0xbb);
        assert_eq!(regmap.words().iter().filter(|&&w| w != 0).count(), 2);
    }

    #[test]
    #[should_panic]
    fn register_out_of_range() {
        let regmap = RegisterMap::new();
        regmap.register(regmap.num_slots());
    }

    #[test]
    fn compare_equal() {
        let comparison = RegisterMap::new().compare(&RegisterMap::new());
        assert!(comparison.is_equal());
        assert_eq!(comparison.first_difference, None);
        assert_eq!(comparison.to_string(), "Status... Equal");
    }

    #[test]
    fn compare_different() {
        let a = RegisterMap::new();
        let mut b = RegisterMap::new();
        b.set_register(5, 0x1234);
        b.set_register(100, 1);
        let comparison = a.compare(&b);
        assert!(!comparison.is_equal());
        assert_eq!(
            comparison.first_difference,
            Some(Difference {
                index: 20,
                a: 0,
                b: 0x1234
            })
        );
        assert_eq!(comparison.num_differences, 2);
        assert_eq!(
            comparison.to_string(),
            "Different\nFirst offending index: 20\n\
             A: 0x00000000\t B: 0x00001234\nNum differences: 2"
        );
    }
}
