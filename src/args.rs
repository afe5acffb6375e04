//! hscaler-regmap CLI arguments.
//!
//! This module contains the definition of the CLI arguments for the
//! hscaler-regmap application.

use clap::Parser;
use std::path::PathBuf;

/// hscaler-regmap CLI arguments.
#[derive(Parser, Debug, Clone, Eq, PartialEq, Hash)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// Number of fractional bits of the phase
    #[clap(long, default_value_t = 6)]
    pub phase_shift: u32,
    /// Pixels processed per clock cycle (1, 2, 4 or 8)
    #[clap(long, default_value_t = 4)]
    pub pix_per_clock: usize,
    /// Input line width in pixels
    #[clap(long, default_value_t = 3840)]
    pub width_in: u32,
    /// Output line width in pixels
    #[clap(long, default_value_t = 1920)]
    pub width_out: u32,
    /// Pixel rate in Q16.16 format [default: width-in / width-out]
    #[clap(long)]
    pub pixel_rate: Option<u32>,
    /// JSON configuration file, replaces the configuration arguments above
    #[clap(long)]
    pub config: Option<PathBuf>,
    /// Repeat the comparison for every supported number of pixels per clock
    #[clap(long)]
    pub sweep: bool,
    /// Print the configuration and the first difference
    #[clap(long)]
    pub verbose: bool,
    /// Print the comparison reports in JSON format
    #[clap(long)]
    pub json: bool,
}
