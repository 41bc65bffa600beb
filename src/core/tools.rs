//! External oref0 executables.

use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::constants;
use crate::core::tuning::{PrepInputs, PrepStep, TuneInputs, TuneStep};

/// How an external tool invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutcome {
    Success,
    /// Non-zero exit, death by signal, or failure to launch.
    Failed(String),
}

impl ToolOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// An executable looked up on `$PATH` (or given as a path) and run without a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalTool {
    program: String,
}

impl ExternalTool {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Runs the tool to completion. Standard output is discarded when
    /// `show_output` is false; standard error is always inherited.
    pub fn run<I, S>(&self, args: I, show_output: bool) -> ToolOutcome
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new(&self.program);
        cmd.args(args);
        if !show_output {
            cmd.stdout(Stdio::null());
        }

        tracing::info!(command = ?cmd, "running");
        match cmd.status() {
            Ok(status) if status.success() => ToolOutcome::Success,
            Ok(status) => {
                tracing::warn!(tool = %self.program, %status, "tool failed");
                ToolOutcome::Failed(status.to_string())
            }
            Err(e) => {
                tracing::warn!(tool = %self.program, error = %e, "could not launch tool");
                ToolOutcome::Failed(format!("could not launch {}: {e}", self.program))
            }
        }
    }
}

/// A launchable tool with a fixed argument list.
pub trait Tool {
    fn invoke(&self, args: &[&OsStr], show_output: bool) -> ToolOutcome;
}

impl Tool for ExternalTool {
    fn invoke(&self, args: &[&OsStr], show_output: bool) -> ToolOutcome {
        self.run(args.iter().copied(), show_output)
    }
}

fn prep_args<'a>(inputs: &PrepInputs<'a>) -> [&'a OsStr; 6] {
    [
        inputs.treatments.as_os_str(),
        inputs.profile.as_os_str(),
        inputs.entries.as_os_str(),
        inputs.pump_profile.as_os_str(),
        OsStr::new(constants::TOOL_OUTPUT_FLAG),
        inputs.output.as_os_str(),
    ]
}

fn core_args<'a>(inputs: &TuneInputs<'a>) -> [&'a OsStr; 5] {
    [
        inputs.prepped.as_os_str(),
        inputs.profile.as_os_str(),
        inputs.pump_profile.as_os_str(),
        OsStr::new(constants::TOOL_OUTPUT_FLAG),
        inputs.output.as_os_str(),
    ]
}

/// `oref0-autotune-prep <treatments> <profile> <entries> <pump profile> --output-file <out>`
pub struct OrefPrep(pub ExternalTool);

impl PrepStep for OrefPrep {
    fn name(&self) -> &str {
        self.0.program()
    }

    fn prep(&self, inputs: &PrepInputs<'_>) -> ToolOutcome {
        self.0.run(prep_args(inputs), false)
    }
}

/// `oref0-autotune-core <prepped> <profile> <pump profile> --output-file <out>`
pub struct OrefCore(pub ExternalTool);

impl TuneStep for OrefCore {
    fn name(&self) -> &str {
        self.0.program()
    }

    fn tune(&self, inputs: &TuneInputs<'_>) -> ToolOutcome {
        self.0.run(core_args(inputs), false)
    }
}

fn export_args<'a>(base: &'a Path, xlsx: &'a Path) -> [&'a OsStr; 4] {
    [
        OsStr::new("--dir"),
        base.as_os_str(),
        OsStr::new("--output"),
        xlsx.as_os_str(),
    ]
}

fn report_args(base: &Path) -> [&OsStr; 1] {
    [base.as_os_str()]
}

/// `oref0-autotune-export-to-xlsx --dir <base> --output <xlsx>`
pub fn export_to_xlsx(tool: &impl Tool, base: &Path, xlsx: &Path) -> ToolOutcome {
    tool.invoke(&export_args(base, xlsx), true)
}

/// `oref0-autotune-recommends-report <base>`
pub fn recommends_report(tool: &impl Tool, base: &Path) -> ToolOutcome {
    tool.invoke(&report_args(base), true)
}
