use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::readers::CacheWritePolicy;
use crate::settings::{Layout, Settings};

#[derive(Parser)]
#[command(name = "weather-dataset")]
#[command(about = "Build machine-learning CSV datasets from historical weather observations")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Hide the progress bar")]
    pub quiet: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(
        short,
        long,
        global = true,
        help = "Settings file (TOML, JSON, YAML, ...); WXDATA_* variables override it"
    )]
    pub config: Option<PathBuf>,
}

/// Options shared by every command that queries observations.
#[derive(Args, Debug, Clone, Default)]
pub struct FetchArgs {
    #[arg(short, long, help = "Directory for the cache and CSV output")]
    pub output_dir: Option<PathBuf>,

    #[arg(short, long, help = "Number of days to query, ending yesterday")]
    pub days: Option<u32>,

    #[arg(
        short = 'p',
        long = "place",
        help = "Place to query, e.g. Norway/Oslo (repeatable, replaces the configured list)"
    )]
    pub places: Vec<String>,

    #[arg(long, help = "Seconds to wait after each API call (0 disables)")]
    pub rate_limit: Option<u64>,

    #[arg(long, help = "Use cached data only; no API key needed")]
    pub offline: bool,

    #[arg(long, value_enum, help = "What to do when a fetched payload cannot be cached")]
    pub cache_write_policy: Option<CacheWritePolicy>,
}

impl FetchArgs {
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(dir) = &self.output_dir {
            settings.output_dir = dir.clone();
        }
        if let Some(days) = self.days {
            settings.days = days;
        }
        if !self.places.is_empty() {
            settings.places = self.places.clone();
        }
        if let Some(secs) = self.rate_limit {
            settings.rate_limit_secs = secs;
        }
        if let Some(policy) = self.cache_write_policy {
            settings.cache_write_policy = policy;
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch observations and write the CSV dataset
    Generate {
        #[command(flatten)]
        fetch: FetchArgs,

        #[arg(long, value_enum)]
        layout: Option<Layout>,

        #[arg(long, help = "Do not add a target column or an unlabeled file")]
        no_target: bool,

        #[arg(long, help = "Exit with an error if any place/date pair failed")]
        fail_on_partial: bool,
    },

    /// Fill the cache without writing a dataset
    Fetch {
        #[command(flatten)]
        fetch: FetchArgs,

        #[arg(long, help = "Exit with an error if any place/date pair failed")]
        fail_on_partial: bool,
    },

    /// Show what the cache holds for each configured place
    Info {
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
}

impl Commands {
    /// Fold command line options into the loaded settings. The target is
    /// only kept for `generate` in the wide layout, the one place it is used.
    pub fn apply(&self, settings: &mut Settings) {
        match self {
            Commands::Generate {
                fetch,
                layout,
                no_target,
                ..
            } => {
                fetch.apply(settings);
                if let Some(layout) = layout {
                    settings.layout = *layout;
                }
                if *no_target || settings.layout == Layout::Long {
                    settings.target.enabled = false;
                }
            }
            Commands::Fetch { fetch, .. } => {
                fetch.apply(settings);
                settings.target.enabled = false;
            }
            Commands::Info { output_dir } => {
                if let Some(dir) = output_dir {
                    settings.output_dir = dir.clone();
                }
                settings.target.enabled = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_generate_overrides() {
        let cli = Cli::parse_from([
            "weather-dataset",
            "generate",
            "--days",
            "3",
            "-p",
            "A/X",
            "-p",
            "A/Y",
            "--rate-limit",
            "0",
            "--layout",
            "long",
            "--no-target",
            "--cache-write-policy",
            "skip-pair",
        ]);

        let mut settings = Settings::default();
        cli.command.apply(&mut settings);

        assert_eq!(settings.days, 3);
        assert_eq!(settings.places, vec!["A/X", "A/Y"]);
        assert_eq!(settings.rate_limit_secs, 0);
        assert_eq!(settings.layout, Layout::Long);
        assert_eq!(settings.cache_write_policy, CacheWritePolicy::SkipPair);
        assert!(!settings.target.enabled);
    }

    #[test]
    fn test_target_only_checked_where_used() {
        // None of these build a target, so the default Oslo target must not
        // reject a place list without Oslo
        for args in [
            vec!["weather-dataset", "fetch", "-p", "Sweden/Uppsala", "--offline"],
            vec!["weather-dataset", "generate", "-p", "A/X", "-p", "A/Y", "--layout", "long"],
            vec!["weather-dataset", "info"],
        ] {
            let cli = Cli::parse_from(args.iter().copied());
            let mut settings = Settings::default();
            cli.command.apply(&mut settings);
            assert!(!settings.target.enabled, "{args:?}");
            assert!(settings.check().is_ok(), "{args:?}");
        }

        // Long layout coming from the settings file drops it too
        let cli = Cli::parse_from(["weather-dataset", "generate", "-p", "A/X"]);
        let mut settings = Settings {
            layout: Layout::Long,
            ..Default::default()
        };
        cli.command.apply(&mut settings);
        assert!(settings.check().is_ok());

        // Wide generate keeps the target and its checks
        let cli = Cli::parse_from(["weather-dataset", "generate", "-p", "Sweden/Uppsala"]);
        let mut settings = Settings::default();
        cli.command.apply(&mut settings);
        assert!(settings.target.enabled);
        assert!(matches!(
            settings.check(),
            Err(crate::error::ConfigError::UnknownTargetPlace(_))
        ));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["weather-dataset", "info", "--verbose", "-o", "cache"]);
        assert!(cli.verbose);

        let mut settings = Settings::default();
        cli.command.apply(&mut settings);
        assert_eq!(settings.output_dir, PathBuf::from("cache"));
    }
}
