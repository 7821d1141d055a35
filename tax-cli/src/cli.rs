use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use tax_core::Channel;
use tax_core::calculations::{DEFAULT_STEP, DEFAULT_TOP_K};

/// Zurich income tax estimator and deduction optimizer.
///
/// Reads a taxpayer profile from a TOML file, estimates cantonal, communal,
/// church and federal tax, and searches for the cheapest way to spend an
/// extra budget on deductible contributions.
#[derive(Debug, Parser)]
#[command(name = "zh-tax", version, about)]
pub struct Cli {
    /// Directory holding brackets.csv, municipalities.csv and config.toml.
    /// The built-in Zurich 2025 data is used when omitted.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Tax year to compute; must match the loaded data set.
    #[arg(long, global = true)]
    pub year: Option<i32>,

    /// Log at debug level with timestamps and source locations.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the municipalities of the data set.
    Municipalities,

    /// Estimate the tax owed for a profile.
    Estimate(EstimateArgs),

    /// Search allocations of an extra budget across deduction channels.
    Optimize(OptimizeArgs),
}

#[derive(Debug, Args)]
pub struct EstimateArgs {
    /// Taxpayer profile (TOML).
    #[arg(short, long)]
    pub profile: PathBuf,
}

#[derive(Debug, Args)]
pub struct OptimizeArgs {
    /// Taxpayer profile (TOML).
    #[arg(short, long)]
    pub profile: PathBuf,

    /// Most to spend across all channels, in CHF.
    #[arg(short, long)]
    pub budget: Decimal,

    /// Amount granularity in whole CHF.
    #[arg(short, long, default_value_t = DEFAULT_STEP)]
    pub step: Decimal,

    /// Channel to include; repeat for several. Defaults to pillar3a,
    /// pillar2 and donations.
    #[arg(short, long = "channel", value_parser = parse_channel)]
    pub channels: Vec<Channel>,

    /// How many ranked allocations to print.
    #[arg(short, long, default_value_t = DEFAULT_TOP_K)]
    pub top: usize,
}

impl OptimizeArgs {
    /// The requested channels, or the default selection when none were given.
    pub fn selected_channels(&self) -> Vec<Channel> {
        if self.channels.is_empty() {
            Channel::DEFAULT_SELECTION.to_vec()
        } else {
            self.channels.clone()
        }
    }
}

fn parse_channel(s: &str) -> Result<Channel, String> {
    Channel::parse(&s.to_ascii_lowercase()).ok_or_else(|| {
        let known: Vec<&str> = Channel::ALL.iter().map(Channel::as_str).collect();
        format!("unknown channel '{s}' (expected one of: {})", known.join(", "))
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("arguments parse")
    }

    #[test]
    fn optimize_defaults() {
        let cli = parse(&["zh-tax", "optimize", "--profile", "me.toml", "--budget", "3000"]);

        let Command::Optimize(args) = cli.command else {
            panic!("expected optimize");
        };
        assert_eq!(args.budget, dec!(3000));
        assert_eq!(args.step, dec!(100));
        assert_eq!(args.top, 10);
        assert_eq!(
            args.selected_channels(),
            vec![Channel::Pillar3a, Channel::Pillar2, Channel::Donations]
        );
    }

    #[test]
    fn optimize_with_explicit_channels() {
        let cli = parse(&[
            "zh-tax", "optimize", "-p", "me.toml", "-b", "500", "--channel", "moving",
            "--channel", "Donations", "--step", "50",
        ]);

        let Command::Optimize(args) = cli.command else {
            panic!("expected optimize");
        };
        assert_eq!(args.step, dec!(50));
        assert_eq!(args.selected_channels(), vec![Channel::Moving, Channel::Donations]);
    }

    #[test]
    fn unknown_channel_is_rejected() {
        let result = Cli::try_parse_from([
            "zh-tax", "optimize", "-p", "me.toml", "-b", "500", "--channel", "lottery",
        ]);

        assert!(result.is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = parse(&["zh-tax", "municipalities", "--year", "2025", "--data-dir", "data"]);

        assert_eq!(cli.year, Some(2025));
        assert_eq!(cli.data_dir, Some(PathBuf::from("data")));
        assert!(matches!(cli.command, Command::Municipalities));
    }
}
