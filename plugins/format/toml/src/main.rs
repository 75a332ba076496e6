mod args;
mod error;
mod parser;
mod render;
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
        "read" => reader::run(io::stdin().lock(), io::stdout().lock()),
        "write" => writer::run(io::stdin().lock(), io::stdout().lock()),
        other => {
            eprintln!("jn-fmt-toml: unknown mode {other:?} (expected read, write, or inspect)");
            return ExitCode::from(2);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("jn-fmt-toml: {err}");
            ExitCode::FAILURE
        }
    }
}

fn inspect() -> Result<(), error::TomlError> {
    let meta = PluginMeta {
        name: "toml".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        role: Role::Format,
        modes: vec![Mode::Read, Mode::Write, Mode::Inspect],
        matches: vec![r"^.*\.toml$".to_string()],
        dependencies: Vec::new(),
        defaults: Vec::new(),
        executable: std::path::PathBuf::new(),
    };
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, &meta)?;
    stdout.write_all(b"\n")?;
    Ok(())
}
