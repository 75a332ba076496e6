use std::process::Command;

use jn_core::Mode;
use jn_resolver::ResolvedAddress;

/// Everything needed to spawn one pipeline stage (spec.md §3 `PipelineStage`,
/// §4.4 step 3): which executable, in which mode, with which merged config,
/// against which effective target.
#[derive(Debug, Clone)]
pub struct StageSpec {
    pub name: String,
    pub resolved: ResolvedAddress,
    pub mode: Mode,
    /// Test-only escape hatch: when set, `to_command` passes these argv
    /// entries verbatim instead of the spec.md §6.2 `--mode`/config-flag
    /// shape. Lets pipeline tests drive plain `/bin/sh -c <script>` stages
    /// through the real orchestrator wiring without a `--mode`-aware
    /// executable on hand.
    pub(crate) raw_args: Option<Vec<String>>,
}

impl StageSpec {
    pub fn new(name: impl Into<String>, mode: Mode, resolved: ResolvedAddress) -> Self {
        Self { name: name.into(), resolved, mode, raw_args: None }
    }

    /// Build the not-yet-spawned `Command` per spec.md §6.2: `--mode
    /// <mode>`, then `--<key> <value>` for every merged config entry, then
    /// the effective target as a single positional argument.
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.resolved.plugin.executable);
        if let Some(raw_args) = &self.raw_args {
            cmd.args(raw_args);
            return cmd;
        }
        cmd.arg("--mode").arg(self.mode.to_string());
        for (key, value) in self.resolved.config.iter() {
            cmd.arg(format!("--{key}")).arg(value.to_text());
        }
        if !self.resolved.effective_target.is_empty() {
            cmd.arg(&self.resolved.effective_target);
        }
        cmd
    }
}
