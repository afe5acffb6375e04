//! Scaler configuration.
//!
//! This module contains [`Config`], the validated set of parameters that
//! drives both phase generators.

use crate::{constants, layout::Layout};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Scaler configuration.
///
/// A `Config` can only be obtained through validation, so every generator can
/// assume that its parameters are in range.
///
/// # Examples
/// ```
/// use hscaler_regmap::Config;
/// // 2:1 downscale of a 4K line with 4 pixels per clock and 64 phases
/// let config = Config::with_scaled_rate(6, 4, 3840, 1920).unwrap();
/// assert_eq!(config.pixel_rate(), 131072);
/// assert_eq!(config.loop_width(), 960);
/// ```
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[serde(try_from = "ConfigParams", into = "ConfigParams")]
pub struct Config {
    phase_shift: u32,
    layout: Layout,
    width_in: u32,
    width_out: u32,
    pixel_rate: u32,
}

/// Unvalidated scaler parameters.
///
/// This is the format used to store a [`Config`] in JSON. The `pixel_rate` is
/// optional; when it is missing it is derived from the line widths as in
/// [`Config::with_scaled_rate`].
#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq, Hash)]
pub struct ConfigParams {
    /// Number of fractional bits of the phase.
    pub phase_shift: u32,
    /// Pixels processed per clock cycle.
    pub pix_per_clock: usize,
    /// Input line width in pixels.
    pub width_in: u32,
    /// Output line width in pixels.
    pub width_out: u32,
    /// Accumulator step per output pixel, in Q16.16 format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pixel_rate: Option<u32>,
}

impl Config {
    /// Creates a configuration.
    ///
    /// Returns an error if `pix_per_clock` is not 1, 2, 4 or 8, if
    /// `phase_shift` is outside `1..=16`, if a line width is zero, if the
    /// registers of the line do not fit in the
    /// [`REGMAP_SLOTS`](constants::REGMAP_SLOTS) slots of the register map, or
    /// if the pixel rate is zero.
    ///
    /// Lines of up to [`MAX_LINE_WIDTH`](constants::MAX_LINE_WIDTH) pixels fit
    /// with any number of pixels per clock.
    pub fn new(
        phase_shift: u32,
        pix_per_clock: usize,
        width_in: u32,
        width_out: u32,
        pixel_rate: u32,
    ) -> Result<Config> {
        let Some(layout) = Layout::from_pix_per_clock(pix_per_clock) else {
            anyhow::bail!(
                "invalid pixels per clock {pix_per_clock}: supported values are {:?}",
                constants::SUPPORTED_PIX_PER_CLOCK
            );
        };
        if !(1..=constants::MAX_PHASE_SHIFT).contains(&phase_shift) {
            anyhow::bail!(
                "invalid phase shift {phase_shift}: must be between 1 and {}",
                constants::MAX_PHASE_SHIFT
            );
        }
        check_width("input", width_in)?;
        check_width("output", width_out)?;
        let loop_width = (width_in.max(width_out) as usize).div_ceil(pix_per_clock);
        let slots = layout.register_slots(loop_width);
        if slots > constants::REGMAP_SLOTS {
            anyhow::bail!(
                "line of {} pixels needs {slots} register slots with {pix_per_clock} \
                 pixels per clock, but the register map has {}",
                width_in.max(width_out),
                constants::REGMAP_SLOTS
            );
        }
        if pixel_rate == 0 {
            anyhow::bail!("invalid pixel rate: must be greater than zero");
        }
        if phase_shift > constants::PHASE_FIELD_BITS {
            tracing::warn!(
                "phase shift {phase_shift} exceeds the {}-bit phase field; \
                 packed phases keep only their low bits",
                constants::PHASE_FIELD_BITS
            );
        }
        Ok(Config {
            phase_shift,
            layout,
            width_in,
            width_out,
            pixel_rate,
        })
    }

    /// Creates a configuration deriving the pixel rate from the line widths.
    ///
    /// The pixel rate is `width_in / width_out` in Q16.16 format, rounded
    /// down.
    pub fn with_scaled_rate(
        phase_shift: u32,
        pix_per_clock: usize,
        width_in: u32,
        width_out: u32,
    ) -> Result<Config> {
        check_width("input", width_in)?;
        check_width("output", width_out)?;
        let pixel_rate = (u64::from(width_in) << constants::STEP_PRECISION_SHIFT)
            / u64::from(width_out);
        let pixel_rate =
            u32::try_from(pixel_rate).context("pixel rate does not fit in Q16.16 format")?;
        Config::new(phase_shift, pix_per_clock, width_in, width_out, pixel_rate)
    }

    /// Loads a configuration from a JSON file.
    ///
    /// The file contents follow the [`ConfigParams`] format.
    pub fn from_json_file(path: &Path) -> Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse configuration {}", path.display()))
    }

    /// Returns a copy of this configuration with a different number of pixels
    /// per clock.
    pub fn with_pix_per_clock(&self, pix_per_clock: usize) -> Result<Config> {
        Config::new(
            self.phase_shift,
            pix_per_clock,
            self.width_in,
            self.width_out,
            self.pixel_rate,
        )
    }

    /// Gives the number of fractional bits of the phase.
    pub fn phase_shift(&self) -> u32 {
        self.phase_shift
    }

    /// Gives the number of pixels processed per clock cycle.
    pub fn pix_per_clock(&self) -> usize {
        self.layout.pix_per_clock()
    }

    /// Gives the input line width in pixels.
    pub fn width_in(&self) -> u32 {
        self.width_in
    }

    /// Gives the output line width in pixels.
    pub fn width_out(&self) -> u32 {
        self.width_out
    }

    /// Gives the accumulator step per output pixel, in Q16.16 format.
    pub fn pixel_rate(&self) -> u32 {
        self.pixel_rate
    }

    /// Gives the register layout selected by the number of pixels per clock.
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Gives the number of clock cycles needed to process a line.
    ///
    /// This is the longest of the two lines divided by the number of pixels
    /// per clock, rounded up.
    pub fn loop_width(&self) -> usize {
        let width = self.width_in.max(self.width_out) as usize;
        width.div_ceil(self.pix_per_clock())
    }

    /// Gives the number of distinct phases, `2^phase_shift`.
    pub fn max_phases(&self) -> u32 {
        1 << self.phase_shift
    }

    /// Gives the mask applied to the shifted accumulator to obtain the phase.
    ///
    /// This is `max_phases - 1`, which keeps every phase in
    /// `0..max_phases`. Both generators use this mask.
    pub fn phase_mask(&self) -> u32 {
        self.max_phases() - 1
    }
}

fn check_width(name: &str, width: u32) -> Result<()> {
    if width == 0 {
        anyhow::bail!("invalid {name} width: must be greater than zero");
    }
    Ok(())
}

impl TryFrom<ConfigParams> for Config {
    type Error = anyhow::Error;

    fn try_from(params: ConfigParams) -> Result<Config> {
        match params.pixel_rate {
            Some(pixel_rate) => Config::new(
                params.phase_shift,
                params.pix_per_clock,
                params.width_in,
                params.width_out,
                pixel_rate,
            ),
            None => Config::with_scaled_rate(
                params.phase_shift,
                params.pix_per_clock,
                params.width_in,
                params.width_out,
            ),
        }
    }
}

impl From<Config> for ConfigParams {
    fn from(config: Config) -> ConfigParams {
        ConfigParams {
            phase_shift: config.phase_shift,
            pix_per_clock: config.pix_per_clock(),
            width_in: config.width_in,
            width_out: config.width_out,
            pixel_rate: Some(config.pixel_rate),
        }
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        writeln!(f, "Phase Shift: \t{}", self.phase_shift)?;
        writeln!(f, "Pix Per Clk: \t{}", self.pix_per_clock())?;
        writeln!(f, "Width In: \t{}", self.width_in)?;
        writeln!(f, "Width Out: \t{}", self.width_out)?;
        writeln!(f, "Pixel Rate: \t{}", self.pixel_rate)
    }
}
