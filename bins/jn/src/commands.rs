use std::io::{BufRead, Write};
use std::process::Stdio;
use std::time::Duration;

use jn_address::Kind;
use jn_core::Mode;
use jn_pipeline::{Pipeline, PipelineResult, StageSpec};
use jn_registry::Registry;
use jn_resolver::ResolvedAddress;

use crate::error::JnError;

/// `cat SRC [SRC…]` (spec.md §6.1): spawn each source's plugin in turn,
/// only moving to the next once the previous has produced EOF. Each
/// source is its own single-stage pipeline writing straight to our
/// inherited stdout; nothing is fanned out concurrently.
pub fn cat(sources: &[String], registry: &Registry, timeout: Option<Duration>) -> Result<i32, JnError> {
    for source in sources {
        let resolved = resolve(source, Mode::Read, registry)?;
        let spec = single_stage(resolved, Mode::Read);
        let pipeline = jn_pipeline::build(&[spec], Stdio::null(), Stdio::inherit())?;
        let result = run_pipeline(pipeline, timeout)?;
        if result.exit_code != 0 {
            return Ok(result.exit_code);
        }
    }
    Ok(0)
}

/// `put SINK` (spec.md §6.1): spawn the resolved plugin with stdin wired
/// straight to the command's own stdin.
pub fn put(sink: &str, registry: &Registry, timeout: Option<Duration>) -> Result<i32, JnError> {
    let resolved = resolve(sink, Mode::Write, registry)?;
    let spec = single_stage(resolved, Mode::Write);
    let pipeline = jn_pipeline::build(&[spec], Stdio::inherit(), Stdio::inherit())?;
    let result = run_pipeline(pipeline, timeout)?;
    Ok(result.exit_code)
}

/// `filter EXPR` (spec.md §6.1): EXPR is either an address (a profile or
/// bare plugin reference) or a textual jq-like expression. A textual
/// expression falls back to whatever plugin the `@jn/filter` profile
/// declares, carried as an `expr` config parameter.
pub fn filter(expr: &str, registry: &Registry, timeout: Option<Duration>) -> Result<i32, JnError> {
    let resolved = resolve_filter(expr, registry)?;
    let spec = single_stage(resolved, Mode::Raw);
    let pipeline = jn_pipeline::build(&[spec], Stdio::inherit(), Stdio::inherit())?;
    let result = run_pipeline(pipeline, timeout)?;
    Ok(result.exit_code)
}

/// `merge SRC:label=NAME [SRC…]` (spec.md §6.1): like `cat`, but every
/// record read from each source is rewritten with `_source` (and, when
/// given, `_label`) before being written on. This rewriting is core
/// orchestrator behavior, not something any plugin does, so each source's
/// stdout is piped back to us instead of going straight to our stdout.
pub fn merge(sources: &[String], registry: &Registry, timeout: Option<Duration>) -> Result<i32, JnError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    for raw in sources {
        let (address_text, label) = parse_merge_source(raw)?;
        let resolved = resolve(&address_text, Mode::Read, registry)?;
        let spec = single_stage(resolved, Mode::Read);
        let mut pipeline = jn_pipeline::build(&[spec], Stdio::null(), Stdio::piped())?;
        let stdout_handle = pipeline.take_final_stdout().expect("piped stdout was requested");

        for line in std::io::BufReader::new(stdout_handle).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let mut record: serde_json::Value = serde_json::from_str(&line)?;
            if let serde_json::Value::Object(map) = &mut record {
                map.insert("_source".to_string(), serde_json::Value::String(address_text.clone()));
                if let Some(label) = &label {
                    map.insert("_label".to_string(), serde_json::Value::String(label.clone()));
                }
            }
            serde_json::to_writer(&mut out, &record)?;
            out.write_all(b"\n")?;
        }

        let result = run_pipeline(pipeline, timeout)?;
        if result.exit_code != 0 {
            return Ok(result.exit_code);
        }
    }
    Ok(0)
}

/// `resolve ADDR --mode MODE` (SPEC_FULL.md §4, supplemented feature): run
/// C1 (`jn_address::parse`) through C3 (`jn_resolver::resolve`) and print
/// the resulting `ResolvedAddress` as a single NDJSON record, spawning
/// nothing. Grounded on the teacher's own `--mode inspect` convention of
/// surfacing internal state as one NDJSON record on demand.
pub fn resolve_dry_run(addr: &str, mode: &str, registry: &Registry) -> Result<i32, JnError> {
    let mode: Mode = mode.parse().map_err(JnError::InvalidMode)?;
    let resolved = resolve(addr, mode, registry)?;
    let record = resolved_to_json(&resolved);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer(&mut out, &record)?;
    out.write_all(b"\n")?;
    Ok(0)
}

fn resolved_to_json(resolved: &ResolvedAddress) -> serde_json::Value {
    let config: serde_json::Map<String, serde_json::Value> = resolved
        .config
        .iter()
        .map(|(k, v)| (k.to_string(), serde_json::to_value(v).unwrap_or(serde_json::Value::Null)))
        .collect();

    serde_json::json!({
        "address": {
            "raw": resolved.address.raw,
            "kind": resolved.address.kind,
            "base": resolved.address.base,
            "format_override": resolved.address.format_override,
            "compression": resolved.address.compression,
        },
        "plugin": resolved.plugin,
        "config": config,
        "effective_target": resolved.effective_target,
    })
}

/// Run `pipeline` to completion, optionally bounded by a wall-clock
/// `timeout`. On expiry, every stage is killed by PID from this thread
/// while `jn_pipeline::run` blocks on `wait()` over on its own thread
/// (SPEC_FULL.md §5's supplemented `--timeout`: not a new cancellation
/// mechanism, just another caller of the `cancel()` op's kill-and-reap
/// behavior, triggered from outside instead of from within the pipeline).
fn run_pipeline(pipeline: Pipeline, timeout: Option<Duration>) -> Result<PipelineResult, JnError> {
    let Some(budget) = timeout else {
        return Ok(jn_pipeline::run(pipeline)?);
    };

    let pids = pipeline.stage_pids();
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let _ = tx.send(jn_pipeline::run(pipeline));
    });

    match rx.recv_timeout(budget) {
        Ok(result) => Ok(result?),
        Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {
            tracing::warn!(timeout_secs = budget.as_secs(), "pipeline timeout exceeded, killing stages");
            for pid in pids {
                let _ = std::process::Command::new("kill").arg("-9").arg(pid.to_string()).status();
            }
            Err(JnError::Timeout(budget.as_secs()))
        }
        Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => {
            Err(JnError::Timeout(budget.as_secs()))
        }
    }
}

fn resolve(raw: &str, mode: Mode, registry: &Registry) -> Result<ResolvedAddress, jn_resolver::ResolveError> {
    let address = jn_address::parse(raw);
    jn_resolver::resolve(&address, mode, registry)
}

fn resolve_filter(expr: &str, registry: &Registry) -> Result<ResolvedAddress, jn_resolver::ResolveError> {
    let address = jn_address::parse(expr);
    if matches!(address.kind, Kind::Profile | Kind::Plugin) {
        return jn_resolver::resolve(&address, Mode::Raw, registry);
    }
    let mut fallback = jn_address::parse("@jn/filter");
    fallback.parameters.push(("expr".to_string(), expr.to_string()));
    jn_resolver::resolve(&fallback, Mode::Raw, registry)
}

fn single_stage(resolved: ResolvedAddress, mode: Mode) -> StageSpec {
    let name = resolved.plugin.name.clone();
    StageSpec::new(name, mode, resolved)
}

/// Split `SRC:label=NAME` into its address and optional label (spec.md
/// §6.1). Searches for the literal `:label=` substring rather than the
/// first colon, since an address itself may contain colons (`https://…`).
fn parse_merge_source(raw: &str) -> Result<(String, Option<String>), JnError> {
    match raw.find(":label=") {
        Some(at) => {
            let (src, rest) = raw.split_at(at);
            let label = &rest[":label=".len()..];
            if label.is_empty() {
                return Err(JnError::InvalidMergeSyntax(raw.to_string()));
            }
            Ok((src.to_string(), Some(label.to_string())))
        }
        None => Ok((raw.to_string(), None)),
    }
}
