use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod output;

/// Combine the sessions of one BIDS subject into a single session.
///
/// Anatomical images are renumbered per suffix (T1w, T2w) with the run
/// replacing the session. Functional runs of the same task are renumbered in
/// session order, and each new sidecar gets a SourceFile field pointing back
/// at the original. Field maps are renumbered as one sequence and their
/// IntendedFor entries are pointed at the combined functional files.
///
/// Output goes to a sibling of BIDS_DIR named <BIDS_DIR>_desc-<DATASET_NAME>.
/// Do not run two instances for the same subject and output at once.
#[derive(Parser)]
#[command(name = "unisession", version, verbatim_doc_comment)]
struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output format for the summary
    #[arg(long, default_value = "text")]
    format: output::OutputFormat,

    #[command(flatten)]
    combine: commands::combine::CombineArgs,
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    commands::combine::run(&cli.combine, cli.format)
}
