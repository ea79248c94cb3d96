//! qsnest CLI tool
//!
//! Examples:
//!   qsnest parse nested 'colors[]=orange&colors[]=rebeccapurple'
//!   qsnest build nested '{"user":{"name":"Alice"}}'
//!   qsnest parse simplistic 'a=1&a=2' --diagnostics

use std::io;
use std::str::FromStr;

use clap::{Parser, ValueEnum};
use qsnest_tree::{
    AdjacentContainers, BuildOptions, ParseOptions, PushMode, SequenceStyle, Strategy, Value,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

// ============================================================================
// Exit codes
// ============================================================================

const EXIT_SUCCESS: i32 = 0;
const EXIT_CODEC_ERROR: i32 = 1;
const EXIT_INVALID_JSON: i32 = 2;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "QSNEST_LOG";

// ============================================================================
// CLI argument structures
// ============================================================================

/// Parse and build nested query strings.
#[derive(Parser, Debug)]
#[command(name = "qsnest", version)]
struct Args {
    /// What to do with the test string
    method: Method,

    /// How keys map to structure: simplistic, collapsing or nested
    #[arg(value_parser = Strategy::from_str)]
    strategy: Strategy,

    /// A query string to parse, or JSON to build from
    #[arg(allow_hyphen_values = true)]
    teststring: String,

    /// Maximum nesting depth of keys and values
    #[arg(long, default_value_t = 20)]
    max_depth: usize,

    /// Maximum number of pairs in one query string
    #[arg(long, default_value_t = 1000)]
    max_pairs: usize,

    /// Maximum length of the query string in bytes
    #[arg(long, default_value_t = 1 << 20)]
    max_length: usize,

    /// How `[]` segments followed by more segments are resolved
    #[arg(long, value_enum, default_value_t = PushModeArg::Merge)]
    push_mode: PushModeArg,

    /// How sequence items are keyed when building
    #[arg(long, value_enum, default_value_t = SequenceStyleArg::Push)]
    sequence_style: SequenceStyleArg,

    /// What to do with neighbouring containers in a `[]`-keyed sequence
    #[arg(long, value_enum, default_value_t = AdjacentArg::Flatten)]
    adjacent: AdjacentArg,

    /// Render recovered problems to stderr
    #[arg(long)]
    diagnostics: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Method {
    /// Query string in, JSON out
    Parse,
    /// JSON in, query string out
    Build,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PushModeArg {
    Merge,
    Append,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SequenceStyleArg {
    Push,
    Index,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AdjacentArg {
    Flatten,
    Index,
    Reject,
}

impl From<PushModeArg> for PushMode {
    fn from(arg: PushModeArg) -> Self {
        match arg {
            PushModeArg::Merge => PushMode::Merge,
            PushModeArg::Append => PushMode::Append,
        }
    }
}

impl From<SequenceStyleArg> for SequenceStyle {
    fn from(arg: SequenceStyleArg) -> Self {
        match arg {
            SequenceStyleArg::Push => SequenceStyle::Push,
            SequenceStyleArg::Index => SequenceStyle::Index,
        }
    }
}

impl From<AdjacentArg> for AdjacentContainers {
    fn from(arg: AdjacentArg) -> Self {
        match arg {
            AdjacentArg::Flatten => AdjacentContainers::Flatten,
            AdjacentArg::Index => AdjacentContainers::Index,
            AdjacentArg::Reject => AdjacentContainers::Reject,
        }
    }
}

impl Args {
    fn parse_options(&self) -> ParseOptions {
        ParseOptions::new()
            .max_depth(self.max_depth)
            .max_pairs(self.max_pairs)
            .max_length(self.max_length)
            .push_mode(self.push_mode.into())
    }

    fn build_options(&self) -> BuildOptions {
        BuildOptions::new()
            .max_depth(self.max_depth)
            .sequence_style(self.sequence_style.into())
            .adjacent_containers(self.adjacent.into())
    }
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let result = match args.method {
        Method::Parse => run_parse(&args),
        Method::Build => run_build(&args),
    };

    match result {
        Ok(output) => {
            println!("{output}");
            std::process::exit(EXIT_SUCCESS);
        }
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}

// ============================================================================
// Error handling
// ============================================================================

#[derive(Debug)]
enum CliError {
    Codec(qsnest_tree::Error),
    InvalidJson(serde_json::Error),
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Codec(_) => EXIT_CODEC_ERROR,
            CliError::InvalidJson(_) => EXIT_INVALID_JSON,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Codec(e) => write!(f, "{e}"),
            CliError::InvalidJson(e) => write!(f, "invalid JSON input: {e}"),
        }
    }
}

impl From<qsnest_tree::Error> for CliError {
    fn from(e: qsnest_tree::Error) -> Self {
        CliError::Codec(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::InvalidJson(e)
    }
}

// ============================================================================
// Methods
// ============================================================================

fn run_parse(args: &Args) -> Result<String, CliError> {
    let strategy = args.strategy;
    debug!("Parsing {:?} with the {} strategy", args.teststring, strategy);
    let parsed =
        qsnest_tree::parse_with_options(&args.teststring, strategy, &args.parse_options())?;

    if args.diagnostics {
        for diagnostic in &parsed.diagnostics {
            diagnostic.write_report("query", &args.teststring, io::stderr());
        }
    }

    // A mapping or sequence of strings always serializes.
    Ok(serde_json::to_string(&parsed.value)?)
}

fn run_build(args: &Args) -> Result<String, CliError> {
    let strategy = args.strategy;
    let json: serde_json::Value = serde_json::from_str(&args.teststring)?;
    let value = Value::from(json);
    debug!("Building a {} with the {} strategy", value.kind(), strategy);
    Ok(qsnest_tree::build_with_options(
        &value,
        strategy,
        &args.build_options(),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_options_from_flags() {
        let args = Args::parse_from([
            "qsnest",
            "build",
            "nested",
            "{}",
            "--max-depth",
            "3",
            "--sequence-style",
            "index",
            "--adjacent",
            "reject",
        ]);
        let options = args.build_options();
        assert_eq!(options.max_depth, 3);
        assert_eq!(options.sequence_style, SequenceStyle::Index);
        assert_eq!(options.adjacent_containers, AdjacentContainers::Reject);

        let options = args.parse_options();
        assert_eq!(options.max_pairs, 1000);
        assert_eq!(options.max_length, 1 << 20);
        assert_eq!(options.push_mode, PushMode::Merge);
    }

    #[test]
    fn test_strategy_names() {
        let args = Args::parse_from(["qsnest", "parse", "collapsing", "a=1"]);
        assert_eq!(args.strategy, Strategy::Collapsing);
        assert!(Args::try_parse_from(["qsnest", "parse", "deep", "a=1"]).is_err());
    }
}
