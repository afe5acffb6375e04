//! Reference phase generator.
//!
//! The reference generator works in two stages. First it calculates a
//! [`PhaseTable`] with one packed [`ClockWord`] per clock cycle, and then it
//! packs the table into a [`RegisterMap`].

use crate::{
    config::Config,
    constants::{STEP_PRECISION, STEP_PRECISION_SHIFT},
    layout::{ClockWord, Layout, PhaseEntry},
    regmap::RegisterMap,
};

/// Phase table.
///
/// Contains the packed lanes of each clock cycle of a line. The table is
/// formed by two parallel arrays, `H` and `H_H`, which can be accessed with
/// [`PhaseTable::h`] and [`PhaseTable::h_h`].
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct PhaseTable {
    layout: Layout,
    words: Vec<ClockWord>,
}

/// Phase accumulator.
///
/// Walks through the lanes of a line, one lane at a time, tracking the
/// fractional position in the input line, the tap index and the number of
/// output pixels written.
#[derive(Debug, Clone)]
struct PhaseAccumulator<'a> {
    config: &'a Config,
    // Q16.16
    offset: u64,
    tap: u32,
    outputs_written: u32,
}

impl<'a> PhaseAccumulator<'a> {
    fn new(config: &'a Config) -> PhaseAccumulator<'a> {
        PhaseAccumulator {
            config,
            offset: 0,
            tap: 0,
            outputs_written: 0,
        }
    }

    fn phase(&self) -> u32 {
        let shift = STEP_PRECISION_SHIFT - self.config.phase_shift();
        (self.offset >> shift) as u32 & self.config.phase_mask()
    }

    fn next_lane(&mut self) -> PhaseEntry {
        let phase = self.phase();
        if self.offset >> STEP_PRECISION_SHIFT != 0 {
            // consume an input pixel
            self.offset -= STEP_PRECISION;
            self.tap += 1;
        }
        let write_enable = self.offset >> STEP_PRECISION_SHIFT == 0
            && self.outputs_written < self.config.width_out();
        if write_enable {
            self.offset += u64::from(self.config.pixel_rate());
            self.outputs_written += 1;
        }
        PhaseEntry {
            phase,
            tap: self.tap,
            write_enable,
        }
    }

    fn end_clock(&mut self) {
        let pix_per_clock = self.config.pix_per_clock() as u32;
        if self.tap >= pix_per_clock {
            self.tap &= pix_per_clock - 1;
        }
    }
}

impl PhaseTable {
    /// Calculates the phase table for a configuration.
    ///
    /// The table has [`Config::loop_width`] entries.
    pub fn calculate(config: &Config) -> PhaseTable {
        let layout = config.layout();
        let mut accumulator = PhaseAccumulator::new(config);
        let words = (0..config.loop_width())
            .map(|_| {
                let mut word = ClockWord::default();
                for lane in 0..layout.pix_per_clock() {
                    layout.pack_lane(&mut word, lane, accumulator.next_lane());
                }
                accumulator.end_clock();
                word
            })
            .collect();
        PhaseTable { layout, words }
    }

    /// Gives the layout with which the table was packed.
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Gives the packed clock words.
    pub fn words(&self) -> &[ClockWord] {
        &self.words
    }

    /// Returns an iterator over the `H` array.
    pub fn h(&self) -> impl Iterator<Item = u64> + '_ {
        self.words.iter().map(|w| w.h)
    }

    /// Returns an iterator over the `H_H` array.
    ///
    /// Only the 8 pixels per clock layout uses this array. In other layouts
    /// all its entries are zero.
    pub fn h_h(&self) -> impl Iterator<Item = u64> + '_ {
        self.words.iter().map(|w| w.h_h)
    }

    /// Returns an iterator over the lanes of the table in processing order.
    pub fn entries(&self) -> impl Iterator<Item = PhaseEntry> + '_ {
        let layout = self.layout;
        self.words.iter().flat_map(move |w| {
            (0..layout.pix_per_clock()).map(move |s| layout.unpack_lane(w, s))
        })
    }

    /// Packs the table into a register map.
    ///
    /// Each group of [`Layout::clocks_per_group`] clock words is written to
    /// the register slots of the group. Slots not covered by the table are
    /// left untouched.
    pub fn pack_registers(&self, regmap: &mut RegisterMap) {
        let layout = self.layout;
        for (group, clocks) in self.words.chunks(layout.clocks_per_group()).enumerate() {
            regmap.set_registers(
                group * layout.group_slots(),
                &layout.group_registers(clocks),
            );
        }
    }
}

/// Runs the reference generator for a configuration.
pub fn generate(config: &Config) -> RegisterMap {
    let table = PhaseTable::calculate(config);
    tracing::debug!(
        loop_width = table.words().len(),
        pix_per_clock = config.pix_per_clock(),
        "calculated reference phase table"
    );
    let mut regmap = RegisterMap::new();
    table.pack_registers(&mut regmap);
    regmap
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn downscale_2_to_1() {
        let config = Config::with_scaled_rate(6, 4, 3840, 1920).unwrap();
        let table = PhaseTable::calculate(&config);
        assert_eq!(table.words().len(), 960);
        let entries: Vec<_> = table.entries().collect();
        // first lane writes without consuming
        assert_eq!(
            entries[0],
            PhaseEntry {
                phase: 0,
                tap: 0,
                write_enable: true
            }
        );
        // afterwards every other lane writes, and every lane consumes an
        // input pixel
        for (n, e) in entries.iter().enumerate().skip(1) {
            assert_eq!(e.write_enable, n % 2 == 0, "lane {n}");
            assert_eq!(e.phase, 0);
        }
        assert_eq!(entries.iter().filter(|e| e.write_enable).count(), 1920);
        // within a clock the tap index counts through 8 staged pixels; it is
        // wrapped modulo 4 at the clock boundary
        let taps: Vec<_> = entries[..12].iter().map(|e| e.tap).collect();
        assert_eq!(taps, [0, 1, 2, 3, 4, 5, 6, 7, 4, 5, 6, 7]);
    }

    #[test]
    fn upscale_writes_every_lane() {
        let config = Config::with_scaled_rate(6, 2, 960, 1920).unwrap();
        let table = PhaseTable::calculate(&config);
        assert_eq!(table.words().len(), 960);
        let entries: Vec<_> = table.entries().collect();
        assert!(entries.iter().all(|e| e.write_enable));
        // phase alternates between 0 and half a pixel
        for (n, e) in entries.iter().enumerate() {
            assert_eq!(e.phase, if n % 2 == 0 { 0 } else { 32 });
        }
    }

    #[test]
    fn consuming_lane_can_also_write() {
        let config = Config::with_scaled_rate(6, 1, 2, 1).unwrap();
        let mut accumulator = PhaseAccumulator::new(&config);
        // writes the only output pixel
        assert!(accumulator.next_lane().write_enable);
        // consumes, but the accumulator still holds a whole pixel
        let e = accumulator.next_lane();
        assert!(!e.write_enable);
        assert_eq!(e.tap, 1);
        let config = Config::with_scaled_rate(6, 1, 4, 2).unwrap();
        let mut accumulator = PhaseAccumulator::new(&config);
        assert!(accumulator.next_lane().write_enable);
        assert!(!accumulator.next_lane().write_enable);
        // consumes and writes in the same lane
        let e = accumulator.next_lane();
        assert!(e.write_enable);
        assert_eq!(e.tap, 2);
    }

    #[test]
    fn write_count_limited_by_width_out() {
        let config = Config::new(6, 8, 100, 10, 0x8000).unwrap();
        let table = PhaseTable::calculate(&config);
        assert_eq!(table.entries().filter(|e| e.write_enable).count(), 10);
    }

    #[test]
    fn tap_wraps_at_clock_boundary() {
        for ppc in [1, 2, 4, 8] {
            let config = Config::with_scaled_rate(6, ppc, 3000, 1234).unwrap();
            let mut accumulator = PhaseAccumulator::new(&config);
            for _ in 0..config.loop_width() {
                for _ in 0..ppc {
                    let e = accumulator.next_lane();
                    assert!(e.tap < 2 * ppc as u32);
                }
                accumulator.end_clock();
                assert!(accumulator.tap < ppc as u32);
            }
        }
    }

    #[test]
    fn phase_below_max_phases() {
        for phase_shift in 1..=16 {
            for (width_in, width_out) in [(3840, 1001), (1001, 3840), (17, 16)] {
                let config = Config::with_scaled_rate(phase_shift, 2, width_in, width_out).unwrap();
                let mut accumulator = PhaseAccumulator::new(&config);
                for _ in 0..config.loop_width() {
                    for _ in 0..2 {
                        assert!(accumulator.next_lane().phase < config.max_phases());
                    }
                    accumulator.end_clock();
                }
            }
        }
    }

    #[test]
    fn odd_phases_are_kept() {
        // rate of 1 + 1/64 pixels steps the phase by one
        let config = Config::new(6, 4, 64, 63, 65536 + 1024).unwrap();
        let table = PhaseTable::calculate(&config);
        let phases: Vec<_> = table.entries().take(4).map(|e| e.phase).collect();
        assert_eq!(phases, [0, 1, 2, 3]);
    }

    #[test]
    fn h_h_only_used_with_8_pixels() {
        for ppc in [1, 2, 4] {
            let config = Config::with_scaled_rate(6, ppc, 1000, 777).unwrap();
            assert!(PhaseTable::calculate(&config).h_h().all(|w| w == 0));
        }
        let config = Config::with_scaled_rate(6, 8, 1000, 777).unwrap();
        assert!(PhaseTable::calculate(&config).h_h().any(|w| w != 0));
    }

    #[test]
    fn one_pixel_destination_advances() {
        let config = Config::with_scaled_rate(6, 1, 5, 5).unwrap();
        let table = PhaseTable::calculate(&config);
        let h: Vec<_> = table.h().collect();
        assert_eq!(h.len(), 5);
        let regmap = generate(&config);
        let lo16 = |v: u64| (v & 0xffff) as u32;
        assert_eq!(regmap.register(0), lo16(h[1]) << 16 | lo16(h[0]));
        assert_eq!(regmap.register(1), lo16(h[3]) << 16 | lo16(h[2]));
        // unpaired trailing clock
        assert_eq!(regmap.register(2), lo16(h[4]));
        assert!((3..regmap.num_slots()).all(|s| regmap.register(s) == 0));
    }
}
