//! Register layouts.
//!
//! The scaler core packs the phase, tap index and write-enable of each lane
//! of a clock cycle into a clock word, and then maps clock words onto 32-bit
//! registers. Both steps depend on the number of pixels per clock, and each
//! supported value is represented by a variant of [`Layout`].
//!
//! Lane `s` of a clock word occupies `lane_bits` bits starting at bit
//! `s * lane_bits`. Within a lane, the phase is in bits 0-5, the tap index
//! starts at bit 6, and the write-enable is the most significant bit.

use crate::constants::PHASE_FIELD_BITS;

/// Phase, tap index and write-enable of a single lane.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct PhaseEntry {
    /// Sub-pixel phase.
    pub phase: u32,
    /// Index of the staged input pixel read by this lane.
    pub tap: u32,
    /// Whether an output pixel is written in this lane.
    pub write_enable: bool,
}

/// Packed lanes of one clock cycle.
///
/// With 8 pixels per clock the lanes do not fit in 64 bits, so lanes 0 to 3
/// go to `h` and lanes 4 to 7 go to `h_h`. All the other layouts only use
/// `h`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct ClockWord {
    /// Lanes 0 to 3.
    pub h: u64,
    /// Lanes 4 to 7 (8 pixels per clock only).
    pub h_h: u64,
}

/// Register layout.
///
/// Selected by the number of pixels per clock.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Layout {
    /// 1 pixel per clock. Two clock words share a register.
    One,
    /// 2 pixels per clock. One register per clock word.
    Two,
    /// 4 pixels per clock. Two registers per clock word.
    Four,
    /// 8 pixels per clock. Three registers per clock word, in a group of four
    /// register slots.
    Eight,
}

/// Registers produced from a group of clock words.
///
/// This behaves as a `&[u32]` with the register values in slot order.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct RegisterGroup {
    values: [u32; 3],
    len: usize,
}

impl std::ops::Deref for RegisterGroup {
    type Target = [u32];
    fn deref(&self) -> &[u32] {
        &self.values[..self.len]
    }
}

const LANES_PER_WORD: usize = 4;
const MASK_12: u64 = 0xfff;
const MASK_16: u64 = 0xffff;
const MASK_20: u64 = 0xfffff;
const MASK_24: u64 = 0xffffff;

impl Layout {
    /// All the layouts, in increasing number of pixels per clock.
    pub const ALL: [Layout; 4] = [Layout::One, Layout::Two, Layout::Four, Layout::Eight];

    /// Returns the layout used for `pix_per_clock`, or `None` if the number
    /// of pixels per clock is not supported.
    pub fn from_pix_per_clock(pix_per_clock: usize) -> Option<Layout> {
        Some(match pix_per_clock {
            1 => Layout::One,
            2 => Layout::Two,
            4 => Layout::Four,
            8 => Layout::Eight,
            _ => return None,
        })
    }

    /// Gives the number of pixels per clock of this layout.
    pub fn pix_per_clock(self) -> usize {
        match self {
            Layout::One => 1,
            Layout::Two => 2,
            Layout::Four => 4,
            Layout::Eight => 8,
        }
    }

    /// Gives the number of bits used by each lane in a clock word.
    pub fn lane_bits(self) -> u32 {
        match self {
            Layout::One | Layout::Two => 9,
            Layout::Four => 10,
            Layout::Eight => 11,
        }
    }

    fn tap_bits(self) -> u32 {
        self.lane_bits() - PHASE_FIELD_BITS - 1
    }

    fn write_enable_bit(self) -> u32 {
        self.lane_bits() - 1
    }

    // word and bit offset of a lane
    fn lane_position(self, lane: usize) -> (bool, u32) {
        debug_assert!(lane < self.pix_per_clock());
        let high = lane >= LANES_PER_WORD;
        let lane = lane % LANES_PER_WORD;
        (high, lane as u32 * self.lane_bits())
    }

    /// Packs a lane into a clock word.
    ///
    /// The phase and tap index are truncated to the width of their fields.
    /// The lane bits of `word` are expected to be zero.
    pub fn pack_lane(self, word: &mut ClockWord, lane: usize, entry: PhaseEntry) {
        let (high, shift) = self.lane_position(lane);
        let phase = u64::from(entry.phase) & ((1 << PHASE_FIELD_BITS) - 1);
        let tap = u64::from(entry.tap) & ((1 << self.tap_bits()) - 1);
        let lane_value = phase
            | (tap << PHASE_FIELD_BITS)
            | (u64::from(entry.write_enable) << self.write_enable_bit());
        let dest = if high { &mut word.h_h } else { &mut word.h };
        *dest |= lane_value << shift;
    }

    /// Extracts a lane from a clock word.
    pub fn unpack_lane(self, word: &ClockWord, lane: usize) -> PhaseEntry {
        let (high, shift) = self.lane_position(lane);
        let src = if high { word.h_h } else { word.h };
        let lane_value = src >> shift;
        PhaseEntry {
            phase: (lane_value & ((1 << PHASE_FIELD_BITS) - 1)) as u32,
            tap: ((lane_value >> PHASE_FIELD_BITS) & ((1 << self.tap_bits()) - 1)) as u32,
            write_enable: (lane_value >> self.write_enable_bit()) & 1 != 0,
        }
    }

    /// Gives the number of consecutive clock words that form a register group.
    pub fn clocks_per_group(self) -> usize {
        match self {
            Layout::One => 2,
            Layout::Two | Layout::Four | Layout::Eight => 1,
        }
    }

    /// Gives the number of register slots spanned by each register group.
    ///
    /// This includes reserved slots.
    pub fn group_slots(self) -> usize {
        match self {
            Layout::One | Layout::Two => 1,
            Layout::Four => 2,
            Layout::Eight => 4,
        }
    }

    /// Gives the number of register slots used by a line of `loop_width`
    /// clock cycles.
    ///
    /// An incomplete last group still spans all of its slots.
    pub fn register_slots(self, loop_width: usize) -> usize {
        loop_width.div_ceil(self.clocks_per_group()) * self.group_slots()
    }

    /// Maps a group of clock words onto registers.
    ///
    /// `clocks` must contain between 1 and [`Layout::clocks_per_group`] clock
    /// words. With 1 pixel per clock, a missing second clock word is taken as
    /// zero.
    pub fn group_registers(self, clocks: &[ClockWord]) -> RegisterGroup {
        debug_assert!((1..=self.clocks_per_group()).contains(&clocks.len()));
        let word = clocks[0];
        match self {
            Layout::One => {
                let lsb = word.h & MASK_16;
                let msb = clocks.get(1).map_or(0, |next| next.h & MASK_16);
                RegisterGroup::new(&[(msb << 16 | lsb) as u32])
            }
            Layout::Two => RegisterGroup::new(&[word.h as u32]),
            Layout::Four => RegisterGroup::new(&[word.h as u32, (word.h >> 32) as u32]),
            Layout::Eight => {
                // 88 contiguous bits: 44 from h followed by 44 from h_h
                let bits_0_31 = word.h as u32;
                let bits_32_63 = ((word.h >> 32) & MASK_12) | ((word.h_h & MASK_20) << 12);
                let bits_64_87 = (word.h_h >> 20) & MASK_24;
                RegisterGroup::new(&[bits_0_31, bits_32_63 as u32, bits_64_87 as u32])
            }
        }
    }
}

impl RegisterGroup {
    fn new(values: &[u32]) -> RegisterGroup {
        let mut group = RegisterGroup {
            values: [0; 3],
            len: values.len(),
        };
        group.values[..values.len()].copy_from_slice(values);
        group
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn entry(phase: u32, tap: u32, write_enable: bool) -> PhaseEntry {
        PhaseEntry {
            phase,
            tap,
            write_enable,
        }
    }

    #[test]
    fn lane_offsets() {
        let mut word = ClockWord::default();
        Layout::Two.pack_lane(&mut word, 1, entry(0x2a, 3, true));
        assert_eq!(word.h, (0x2a | 3 << 6 | 1 << 8) << 9);

        let mut word = ClockWord::default();
        Layout::Four.pack_lane(&mut word, 3, entry(1, 7, true));
        assert_eq!(word.h, (1 | 7 << 6 | 1 << 9) << 30);

        let mut word = ClockWord::default();
        Layout::Eight.pack_lane(&mut word, 3, entry(0, 15, false));
        Layout::Eight.pack_lane(&mut word, 4, entry(5, 0, true));
        assert_eq!(word.h, 15 << (6 + 33));
        assert_eq!(word.h_h, 5 | 1 << 10);
    }

    #[test]
    fn fields_are_truncated() {
        let mut word = ClockWord::default();
        // 7 bit phase and 3 bit tap do not spill into the write-enable bit
        Layout::One.pack_lane(&mut word, 0, entry(0x7f, 5, false));
        assert_eq!(word.h, 0x3f | 1 << 6);
    }

    #[test]
    fn unpack() {
        for layout in Layout::ALL {
            let mut word = ClockWord::default();
            let ppc = layout.pix_per_clock();
            let entries: Vec<_> = (0..ppc)
                .map(|s| entry(s as u32 * 7, (s as u32) % (2 * ppc as u32), s % 2 == 0))
                .collect();
            for (s, &e) in entries.iter().enumerate() {
                layout.pack_lane(&mut word, s, e);
            }
            for (s, &e) in entries.iter().enumerate() {
                assert_eq!(layout.unpack_lane(&word, s), e);
            }
        }
    }

    #[test]
    fn register_slots() {
        assert_eq!(Layout::One.register_slots(7680), 3840);
        assert_eq!(Layout::One.register_slots(7681), 3841);
        assert_eq!(Layout::Two.register_slots(3840), 3840);
        assert_eq!(Layout::Four.register_slots(1920), 3840);
        assert_eq!(Layout::Eight.register_slots(960), 3840);
        assert_eq!(Layout::Eight.register_slots(961), 3844);
    }

    #[test]
    fn one_pixel_registers() {
        let a = ClockWord { h: 0x1abc, h_h: 0 };
        let b = ClockWord { h: 0x0123, h_h: 0 };
        assert_eq!(&*Layout::One.group_registers(&[a, b]), &[0x0123_1abc]);
        // unpaired trailing clock
        assert_eq!(&*Layout::One.group_registers(&[a]), &[0x0000_1abc]);
    }

    #[test]
    fn four_pixel_registers() {
        let word = ClockWord {
            h: 0xab_1234_5678,
            h_h: 0,
        };
        assert_eq!(
            &*Layout::Four.group_registers(&[word]),
            &[0x1234_5678, 0xab]
        );
    }

    #[test]
    fn eight_pixel_registers_keep_all_bits() {
        let h = 0xfed_cba9_8765;
        let h_h = 0x5a5_f0f0_1234;
        let regs = Layout::Eight.group_registers(&[ClockWord { h, h_h }]);
        assert_eq!(regs.len(), 3);
        let rebuilt = u128::from(regs[0]) | u128::from(regs[1]) << 32 | u128::from(regs[2]) << 64;
        assert_eq!(rebuilt, u128::from(h) | u128::from(h_h) << 44);
        assert_eq!(regs[2], (h_h >> 20) as u32);
    }
}
