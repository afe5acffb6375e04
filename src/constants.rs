//! Scaler core implementation constants.
//!
//! This module contains constants that define the fixed-point format of the
//! phase accumulator and the register map of the horizontal scaler core.

/// Number of fractional bits of the Q16.16 phase accumulator and pixel rate.
pub const STEP_PRECISION_SHIFT: u32 = 16;

/// One whole pixel in Q16.16 format.
pub const STEP_PRECISION: u64 = 1 << STEP_PRECISION_SHIFT;

/// Maximum phase resolution in bits.
///
/// The phase is extracted from the fractional part of the accumulator, so it
/// cannot have more bits than [`STEP_PRECISION_SHIFT`].
pub const MAX_PHASE_SHIFT: u32 = STEP_PRECISION_SHIFT;

/// Supported number of pixels processed per clock cycle.
pub const SUPPORTED_PIX_PER_CLOCK: [usize; 4] = [1, 2, 4, 8];

/// Number of register slots in the register map.
pub const REGMAP_SLOTS: usize = 3840;

/// Widest line, in pixels, whose registers fit in the map with every
/// supported number of pixels per clock.
///
/// Narrower layouts pack more pixels per slot, so this is bounded by the
/// register groups of each layout, not by [`REGMAP_SLOTS`] pixels.
pub const MAX_LINE_WIDTH: u32 = 7680;

/// Distance in 32-bit words between two consecutive registers.
///
/// Only the first word of each stride is used. The remaining words are
/// reserved.
pub const REGISTER_STRIDE: usize = 4;

/// Total number of 32-bit words in the register map.
pub const REGMAP_WORDS: usize = REGMAP_SLOTS * REGISTER_STRIDE;

/// Width of the phase field of each lane.
///
/// The tap index field starts right after it.
pub const PHASE_FIELD_BITS: u32 = 6;
