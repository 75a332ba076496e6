mod args;
mod delimiter;
mod error;
mod quote;
mod reader;
mod writer;

use std::io::{self, Write};
use std::process::ExitCode;

use jn_core::{Mode, PluginMeta, Role};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let argv = args::parse(std::env::args().skip(1));

    let result = match argv.mode.as_str() {
        "inspect" => inspect(),
        "read" => reader::run(&argv, io::stdin().lock(), io::stdout().lock()),
        "write" => writer::run(&argv, io::stdin().lock(), io::stdout().lock()),
        other => {
            eprintln!("jn-fmt-csv: unknown mode {other:?} (expected read, write, or inspect)");
            return ExitCode::from(2);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("jn-fmt-csv: {err}");
            ExitCode::FAILURE
        }
    }
}

/// `--mode inspect`: emit this plugin's metadata as a single NDJSON record
/// (spec.md §4.2, §6.3), read by `jn-registry::inspect` for self-contained
/// plugins that carry no sidecar `.jnplugin.toml`. Serializing `PluginMeta`
/// directly (its `executable` field is `#[serde(skip)]`) keeps this record
/// shaped exactly like what the registry parses back out.
fn inspect() -> Result<(), error::CsvError> {
    let meta = PluginMeta {
        name: "csv".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        role: Role::Format,
        modes: vec![Mode::Read, Mode::Write, Mode::Inspect],
        matches: vec![r"^.*\.csv(\.(gz|bz2|xz))?$".to_string()],
        dependencies: Vec::new(),
        defaults: Vec::new(),
        executable: std::path::PathBuf::new(),
    };
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, &meta)?;
    stdout.write_all(b"\n")?;
    Ok(())
}
