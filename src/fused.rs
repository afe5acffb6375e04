//! Fused phase generator.
//!
//! This generator calculates the lanes of each clock cycle and writes the
//! corresponding registers right away, without building a phase table. It
//! does its own lane packing: each lane is shifted into a 64-bit word pair
//! for the current clock, and the words are split into registers as soon as
//! the clock is done. With 1 pixel per clock the word of the previous clock
//! is kept, since two clocks share a register.

use crate::{
    config::Config,
    constants::{PHASE_FIELD_BITS, STEP_PRECISION, STEP_PRECISION_SHIFT},
    layout::Layout,
    regmap::RegisterMap,
};

const PHASE_FIELD_MASK: u64 = (1 << PHASE_FIELD_BITS) - 1;
// number of lanes packed in the low word of a clock
const LOW_WORD_LANES: usize = 4;

/// Runs the fused generator for a configuration.
pub fn generate(config: &Config) -> RegisterMap {
    let mut regmap = RegisterMap::new();
    generate_into(config, &mut regmap);
    regmap
}

/// Runs the fused generator, writing the registers into an existing register
/// map.
///
/// Only the register slots used by the line are written.
pub fn generate_into(config: &Config, regmap: &mut RegisterMap) {
    let layout = config.layout();
    let pix_per_clock = config.pix_per_clock();
    let phase_lsb = STEP_PRECISION_SHIFT - config.phase_shift();
    let phase_mask = u64::from(config.phase_mask());
    let pixel_rate = u64::from(config.pixel_rate());
    let width_out = config.width_out();
    let loop_width = config.loop_width();
    // bits per lane; the write-enable flag is the top bit of the lane
    let lane_bits = match layout {
        Layout::One | Layout::Two => 9,
        Layout::Four => 10,
        Layout::Eight => 11,
    };
    let write_enable_bit = lane_bits - 1;
    tracing::debug!(loop_width, pix_per_clock, "running fused phase generator");

    let mut offset = 0u64;
    let mut tap = 0u64;
    let mut outputs_written = 0u32;
    let mut last_phase_h = 0u64;

    for x in 0..loop_width {
        let mut phase_h = 0u64;
        let mut phase_h_h = 0u64;
        for lane in 0..pix_per_clock {
            let phase = (offset >> phase_lsb) & phase_mask;
            if offset >= STEP_PRECISION {
                offset -= STEP_PRECISION;
                tap += 1;
            }
            let write_enable = offset < STEP_PRECISION && outputs_written < width_out;
            if write_enable {
                offset += pixel_rate;
                outputs_written += 1;
            }
            let value = (phase & PHASE_FIELD_MASK)
                | tap << PHASE_FIELD_BITS
                | u64::from(write_enable) << write_enable_bit;
            if lane < LOW_WORD_LANES {
                phase_h |= value << (lane * lane_bits);
            } else {
                phase_h_h |= value << ((lane - LOW_WORD_LANES) * lane_bits);
            }
        }
        if tap >= pix_per_clock as u64 {
            tap &= pix_per_clock as u64 - 1;
        }

        match layout {
            Layout::One => {
                if x % 2 == 1 {
                    regmap.set_register(
                        x / 2,
                        ((phase_h & 0xffff) << 16 | (last_phase_h & 0xffff)) as u32,
                    );
                }
            }
            Layout::Two => regmap.set_register(x, phase_h as u32),
            Layout::Four => {
                regmap.set_register(2 * x, phase_h as u32);
                regmap.set_register(2 * x + 1, (phase_h >> 32) as u32);
            }
            Layout::Eight => {
                regmap.set_register(4 * x, phase_h as u32);
                regmap.set_register(
                    4 * x + 1,
                    ((phase_h >> 32) & 0xfff | (phase_h_h & 0xf_ffff) << 12) as u32,
                );
                regmap.set_register(4 * x + 2, ((phase_h_h >> 20) & 0xff_ffff) as u32);
            }
        }
        last_phase_h = phase_h;
    }

    // an odd number of clocks leaves half a register with 1 pixel per clock
    if layout == Layout::One && loop_width % 2 == 1 {
        regmap.set_register(loop_width / 2, (last_phase_h & 0xffff) as u32);
    }
}
