//! hscaler-regmap application.
//!
//! This module contains a top-level structure [`App`] that runs the reference
//! and fused generators for one or more configurations and compares their
//! register maps, and a structure [`Report`] with the result of each
//! comparison.

use crate::{
    args::Args,
    config::Config,
    constants,
    generator::{Fused, PhaseGenerator, Reference},
    regmap::Comparison,
};
use anyhow::Result;
use serde::Serialize;

/// hscaler-regmap application.
#[derive(Debug, Clone)]
pub struct App {
    configs: Vec<Config>,
    verbose: bool,
    json: bool,
}

/// Comparison report.
///
/// Result of comparing the register maps calculated by two generators for
/// the same configuration.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Report {
    /// Configuration used by both generators.
    pub config: Config,
    /// Name of the first generator.
    pub a: &'static str,
    /// Name of the second generator.
    pub b: &'static str,
    /// Comparison of the register map of `a` against the one of `b`.
    pub comparison: Comparison,
}

impl App {
    /// Creates a new application.
    ///
    /// Fails if the configuration given in the arguments is not valid.
    #[tracing::instrument(name = "App::new", level = "debug")]
    pub fn new(args: &Args) -> Result<App> {
        let config = match (&args.config, args.pixel_rate) {
            (Some(path), _) => Config::from_json_file(path)?,
            (None, Some(pixel_rate)) => Config::new(
                args.phase_shift,
                args.pix_per_clock,
                args.width_in,
                args.width_out,
                pixel_rate,
            )?,
            (None, None) => Config::with_scaled_rate(
                args.phase_shift,
                args.pix_per_clock,
                args.width_in,
                args.width_out,
            )?,
        };
        let configs = if args.sweep {
            constants::SUPPORTED_PIX_PER_CLOCK
                .iter()
                .map(|&ppc| config.with_pix_per_clock(ppc))
                .collect::<Result<Vec<_>>>()?
        } else {
            vec![config]
        };
        Ok(App {
            configs,
            verbose: args.verbose,
            json: args.json,
        })
    }

    /// Gives the configurations that the application compares.
    pub fn configs(&self) -> &[Config] {
        &self.configs
    }

    /// Runs the comparisons and prints the reports.
    ///
    /// Returns an error if any of the comparisons finds differences.
    #[tracing::instrument(name = "App::run", level = "debug", skip_all)]
    pub fn run(self) -> Result<()> {
        let reports: Vec<Report> = self
            .configs
            .iter()
            .map(|config| Report::new(config, &Reference, &Fused))
            .collect();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&reports)?);
        } else {
            for report in &reports {
                println!("{}", report.render(self.verbose));
            }
        }

        let failed = reports.iter().filter(|r| !r.comparison.is_equal()).count();
        if failed != 0 {
            anyhow::bail!(
                "{failed} of {} register map comparisons found differences",
                reports.len()
            );
        }
        Ok(())
    }
}

impl Report {
    /// Runs two generators on a configuration and compares their register
    /// maps.
    pub fn new(config: &Config, a: &dyn PhaseGenerator, b: &dyn PhaseGenerator) -> Report {
        let comparison = a.generate(config).compare(&b.generate(config));
        tracing::info!(
            pix_per_clock = config.pix_per_clock(),
            num_differences = comparison.num_differences,
            "compared {} and {} register maps",
            a.name(),
            b.name()
        );
        Report {
            config: *config,
            a: a.name(),
            b: b.name(),
            comparison,
        }
    }

    /// Formats the report as text.
    ///
    /// The configuration and the details of the first difference are only
    /// included if `verbose` is `true`.
    pub fn render(&self, verbose: bool) -> String {
        let mut text = format!("\nComparison for {} / {} regmap\n", self.a, self.b);
        if verbose {
            text.push_str("Configuration:\n");
            text.push_str(&self.config.to_string());
            text.push_str(&self.comparison.to_string());
        } else if self.comparison.is_equal() {
            text.push_str("Status... Equal");
        } else {
            text.push_str("Different");
        }
        text
    }
}
