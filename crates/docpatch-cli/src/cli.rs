use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use docpatch_diff::{ArrayStrategy, ZeroValueHandling};

#[derive(Parser)]
#[command(
    name = "docpatch",
    about = "Compile the difference between two documents into a partial-update patch",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Bson,
}

#[derive(Subcommand)]
pub enum Command {
    /// Diff two JSON documents
    Diff(DiffArgs),
    /// Print the effective diff configuration
    Config(ConfigArgs),
}

/// Options shared by every command that builds a diff configuration.
#[derive(Args, Clone, Debug, Default)]
pub struct ConfigOptions {
    /// TOML file with diff settings; flags below override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub strategy: Option<StrategyArg>,

    /// What a change to a zero value emits
    #[arg(long)]
    pub zero: Option<ZeroArg>,

    /// Field names or paths to skip
    #[arg(long, value_delimiter = ',')]
    pub ignore: Vec<String>,

    /// Fail if the documents share heap values
    #[arg(long)]
    pub detect_sharing: bool,
}

#[derive(Args)]
pub struct DiffArgs {
    /// Old document (`null` means absent)
    pub old: PathBuf,
    /// New document (`null` means absent)
    pub new: PathBuf,
    #[command(flatten)]
    pub options: ConfigOptions,
}

#[derive(Args)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub options: ConfigOptions,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum StrategyArg {
    Replace,
    Append,
    Smart,
    Merge,
}

impl From<StrategyArg> for ArrayStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Replace => Self::Replace,
            StrategyArg::Append => Self::Append,
            StrategyArg::Smart => Self::Smart,
            StrategyArg::Merge => Self::Merge,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ZeroArg {
    Set,
    Unset,
    Ignore,
}

impl From<ZeroArg> for ZeroValueHandling {
    fn from(arg: ZeroArg) -> Self {
        match arg {
            ZeroArg::Set => Self::AsSet,
            ZeroArg::Unset => Self::AsUnset,
            ZeroArg::Ignore => Self::Ignore,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_diff() {
        let cli = Cli::try_parse_from(["docpatch", "diff", "a.json", "b.json"]).unwrap();
        if let Command::Diff(args) = cli.command {
            assert_eq!(args.old, PathBuf::from("a.json"));
            assert_eq!(args.new, PathBuf::from("b.json"));
            assert!(args.options.strategy.is_none());
            assert!(!args.options.detect_sharing);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_diff_options() {
        let cli = Cli::try_parse_from([
            "docpatch",
            "diff",
            "a.json",
            "b.json",
            "--strategy",
            "merge",
            "--zero",
            "unset",
            "--ignore",
            "updated_at,meta.etag",
            "--detect-sharing",
            "--config",
            "diff.toml",
        ])
        .unwrap();
        if let Command::Diff(args) = cli.command {
            let o = args.options;
            assert_eq!(o.strategy, Some(StrategyArg::Merge));
            assert_eq!(o.zero, Some(ZeroArg::Unset));
            assert_eq!(o.ignore, vec!["updated_at", "meta.etag"]);
            assert!(o.detect_sharing);
            assert_eq!(o.config, Some(PathBuf::from("diff.toml")));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn diff_requires_two_files() {
        assert!(Cli::try_parse_from(["docpatch", "diff", "a.json"]).is_err());
    }

    #[test]
    fn rejects_unknown_strategy() {
        assert!(
            Cli::try_parse_from(["docpatch", "diff", "a", "b", "--strategy", "zip"]).is_err()
        );
    }

    #[test]
    fn parse_config() {
        let cli = Cli::try_parse_from(["docpatch", "config", "--strategy", "smart"]).unwrap();
        if let Command::Config(args) = cli.command {
            assert_eq!(args.options.strategy, Some(StrategyArg::Smart));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::try_parse_from(["docpatch", "--verbose", "diff", "a", "b"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn parse_formats() {
        let cli = Cli::try_parse_from(["docpatch", "diff", "a", "b"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Text);
        let cli = Cli::try_parse_from(["docpatch", "--format", "bson", "diff", "a", "b"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Bson);
        let cli = Cli::try_parse_from(["docpatch", "diff", "a", "b", "--format", "json"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn strategy_and_zero_map_to_library_values() {
        assert_eq!(ArrayStrategy::from(StrategyArg::Append), ArrayStrategy::Append);
        assert_eq!(ZeroValueHandling::from(ZeroArg::Set), ZeroValueHandling::AsSet);
        assert_eq!(ZeroValueHandling::from(ZeroArg::Ignore), ZeroValueHandling::Ignore);
    }
}
