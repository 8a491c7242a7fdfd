//! CLI argument parsing for ortrend

use crate::config::EngineConfig;
use crate::rounding::RoundingMode;
use crate::sampler::Semantics;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for occupancy reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
    /// CSV format for spreadsheet analysis
    Csv,
}

/// Sampling semantics selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SemanticsKind {
    /// Interval intersects [anchor+a, anchor+b]
    WindowOverlap,
    /// start <= anchor < end
    PointSample,
    /// Closed per-minute sampling averaged over the window
    MinuteAveraged,
    /// Overlap minutes as a fraction of the window
    OverlapFraction,
}

/// Rounding tie rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RoundingArg {
    HalfUp,
    HalfEven,
}

impl From<RoundingArg> for RoundingMode {
    fn from(arg: RoundingArg) -> Self {
        match arg {
            RoundingArg::HalfUp => RoundingMode::HalfUp,
            RoundingArg::HalfEven => RoundingMode::HalfEven,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "ortrend")]
#[command(version)]
#[command(
    about = "Operating-room occupancy curves by time of day, category and weekday",
    long_about = None
)]
pub struct Cli {
    /// Engine configuration (TOML): room weights, weekdays, anchors, semantics
    #[arg(short, long, value_name = "FILE")]
    pub config: PathBuf,

    /// Surgery records (CSV with header)
    #[arg(short, long, value_name = "FILE")]
    pub records: PathBuf,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Override the configured sampling semantics
    #[arg(long = "semantics", value_enum)]
    pub semantics: Option<SemanticsKind>,

    /// Window start offset in minutes (window-overlap)
    #[arg(long = "offset-a", allow_negative_numbers = true, value_name = "MIN")]
    pub offset_a: Option<i32>,

    /// Window end offset in minutes (window-overlap)
    #[arg(long = "offset-b", allow_negative_numbers = true, value_name = "MIN")]
    pub offset_b: Option<i32>,

    /// Window length in minutes (minute-averaged, overlap-fraction)
    #[arg(long = "window", value_name = "MIN")]
    pub window: Option<u32>,

    /// Override the configured rounding tie rule
    #[arg(long = "rounding", value_enum)]
    pub rounding: Option<RoundingArg>,

    /// Override the consistency tolerance
    #[arg(long = "tolerance", value_name = "VALUE")]
    pub tolerance: Option<f64>,

    /// Print the per-day verification table (CSV) instead of the report
    #[arg(long = "day-table")]
    pub day_table: bool,

    /// Enable debug tracing output to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

impl Cli {
    /// Apply command-line overrides on top of the file configuration
    pub fn apply_overrides(&self, config: &mut EngineConfig) -> Result<(), String> {
        config.semantics = self.resolve_semantics(config.semantics)?;
        if let Some(rounding) = self.rounding {
            config.rounding.mode = rounding.into();
        }
        if let Some(tolerance) = self.tolerance {
            config.tolerance = tolerance;
        }
        Ok(())
    }

    fn resolve_semantics(&self, configured: Semantics) -> Result<Semantics, String> {
        let base = match self.semantics {
            None => configured,
            Some(kind) if kind == kind_of(&configured) => configured,
            Some(SemanticsKind::WindowOverlap) => Semantics::default(),
            Some(SemanticsKind::PointSample) => Semantics::PointSample,
            Some(SemanticsKind::MinuteAveraged) => Semantics::minute_averaged(),
            Some(SemanticsKind::OverlapFraction) => Semantics::OverlapFraction { window: 30 },
        };

        let wants_offsets = self.offset_a.is_some() || self.offset_b.is_some();
        match base {
            Semantics::WindowOverlap { offset_a, offset_b } => {
                if self.window.is_some() {
                    return Err("--window does not apply to window-overlap semantics".to_string());
                }
                Ok(Semantics::WindowOverlap {
                    offset_a: self.offset_a.unwrap_or(offset_a),
                    offset_b: self.offset_b.unwrap_or(offset_b),
                })
            }
            Semantics::PointSample => {
                if wants_offsets || self.window.is_some() {
                    return Err("point-sample semantics takes no window parameters".to_string());
                }
                Ok(base)
            }
            Semantics::MinuteAveraged { window } | Semantics::OverlapFraction { window } => {
                if wants_offsets {
                    return Err(format!("--offset-a/--offset-b do not apply to {}", base));
                }
                let window = self.window.unwrap_or(window);
                Ok(match base {
                    Semantics::MinuteAveraged { .. } => Semantics::MinuteAveraged { window },
                    _ => Semantics::OverlapFraction { window },
                })
            }
        }
    }
}

fn kind_of(semantics: &Semantics) -> SemanticsKind {
    match semantics {
        Semantics::WindowOverlap { .. } => SemanticsKind::WindowOverlap,
        Semantics::PointSample => SemanticsKind::PointSample,
        Semantics::MinuteAveraged { .. } => SemanticsKind::MinuteAveraged,
        Semantics::OverlapFraction { .. } => SemanticsKind::OverlapFraction,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Cli {
        let mut args = vec!["ortrend", "-c", "rooms.toml", "-r", "records.csv"];
        args.extend_from_slice(extra);
        Cli::parse_from(args)
    }

    #[test]
    fn test_cli_requires_inputs() {
        assert!(Cli::try_parse_from(["ortrend"]).is_err());
        assert!(Cli::try_parse_from(["ortrend", "-c", "rooms.toml"]).is_err());
    }

    #[test]
    fn test_cli_defaults() {
        let cli = parse(&[]);
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(cli.semantics.is_none());
        assert!(!cli.debug);
        assert!(!cli.day_table);
    }

    #[test]
    fn test_cli_negative_offset() {
        let cli = parse(&["--offset-a", "-20", "--offset-b", "10"]);
        assert_eq!(cli.offset_a, Some(-20));
        let mut config = EngineConfig::default();
        cli.apply_overrides(&mut config).unwrap();
        assert_eq!(
            config.semantics,
            Semantics::WindowOverlap {
                offset_a: -20,
                offset_b: 10
            }
        );
    }

    #[test]
    fn test_cli_semantics_switch_uses_defaults() {
        let cli = parse(&["--semantics", "minute-averaged"]);
        let mut config = EngineConfig::default();
        cli.apply_overrides(&mut config).unwrap();
        assert_eq!(config.semantics, Semantics::MinuteAveraged { window: 30 });

        let cli = parse(&["--semantics", "overlap-fraction", "--window", "15"]);
        cli.apply_overrides(&mut config).unwrap();
        assert_eq!(config.semantics, Semantics::OverlapFraction { window: 15 });
    }

    #[test]
    fn test_cli_same_kind_keeps_configured_parameters() {
        let cli = parse(&["--semantics", "window-overlap", "--offset-b", "29"]);
        let mut config = EngineConfig {
            semantics: Semantics::WindowOverlap {
                offset_a: 0,
                offset_b: 15,
            },
            ..EngineConfig::default()
        };
        cli.apply_overrides(&mut config).unwrap();
        assert_eq!(
            config.semantics,
            Semantics::WindowOverlap {
                offset_a: 0,
                offset_b: 29
            }
        );
    }

    #[test]
    fn test_cli_rejects_mismatched_parameters() {
        let mut config = EngineConfig::default();
        assert!(parse(&["--window", "10"]).apply_overrides(&mut config).is_err());
        assert!(parse(&["--semantics", "point-sample", "--offset-a", "0"])
            .apply_overrides(&mut config)
            .is_err());
        assert!(parse(&["--semantics", "minute-averaged", "--offset-b", "3"])
            .apply_overrides(&mut config)
            .is_err());
    }

    #[test]
    fn test_cli_rounding_and_tolerance() {
        let cli = parse(&["--rounding", "half-up", "--tolerance", "0.05", "--format", "json"]);
        let mut config = EngineConfig::default();
        cli.apply_overrides(&mut config).unwrap();
        assert_eq!(config.rounding.mode, RoundingMode::HalfUp);
        assert_eq!(config.tolerance, 0.05);
        assert_eq!(cli.format, OutputFormat::Json);
    }
}
