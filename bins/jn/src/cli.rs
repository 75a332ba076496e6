use clap::{Parser, Subcommand};

/// Composable NDJSON pipeline toolkit (spec.md §6.1).
#[derive(Parser)]
#[command(name = "jn", about = "Composable NDJSON pipeline toolkit")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Wall-clock budget for the whole pipeline, in seconds; on expiry the
    /// orchestrator is cancelled the same way any other caller of `cancel()`
    /// would tear it down (not a feature of spec.md's orchestrator itself —
    /// see SPEC_FULL.md §5).
    #[arg(long, global = true, value_name = "SECONDS")]
    pub timeout: Option<u64>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Read one or more sources in sequence, writing NDJSON to stdout.
    Cat {
        #[arg(required = true, num_args = 1..)]
        sources: Vec<String>,
    },
    /// Write NDJSON from stdin to a sink.
    Put {
        sink: String,
    },
    /// Transform stdin through a filter expression or profile reference.
    Filter {
        expr: String,
    },
    /// Read labeled sources, tagging every record with `_source`/`_label`.
    Merge {
        #[arg(required = true, num_args = 1..)]
        sources: Vec<String>,
    },
    /// Resolve an address through C1-C3 and print the result as a single
    /// NDJSON record, without spawning anything (SPEC_FULL.md §4).
    Resolve {
        addr: String,
        #[arg(long, default_value = "read")]
        mode: String,
    },
}
