//! The seam to the external document-merge algorithm.
//!
//! The merge itself is not implemented here: it is an external program
//! invoked as a managed subprocess. Anything that can take an input
//! directory and produce one output file can stand behind
//! [`DocumentMerger`]; tests substitute an in-process fake.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use tokio::process::Command;

use crate::reporter::ProgressReporter;

/// Everything a merge run needs to know.
#[derive(Debug, Clone)]
pub struct MergeJobSpec {
    /// Directory holding the uploaded document batch.
    pub input_dir: PathBuf,
    /// Directory the result file must be written under.
    pub output_dir: PathBuf,
    /// Path of the persisted module-configuration file.
    pub config_path: PathBuf,
    /// Retention parameter forwarded verbatim to the merge program.
    pub days: u32,
}

/// An opaque document-merge job.
///
/// Implementations report progress through the shared reporter and return
/// the path of the produced output file.
#[async_trait::async_trait]
pub trait DocumentMerger: Send + Sync {
    async fn merge(
        &self,
        spec: &MergeJobSpec,
        progress: Arc<ProgressReporter>,
    ) -> anyhow::Result<PathBuf>;
}

/// Default time limit for the external merge process.
const DEFAULT_MERGE_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Runs the merge as an external command.
///
/// The command receives the job parameters as arguments and must print the
/// produced file path as the last line of stdout. `kill_on_drop` ensures
/// the child does not outlive a timed-out run.
pub struct CommandMerger {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandMerger {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout: DEFAULT_MERGE_TIMEOUT,
        }
    }

    /// Parse a whitespace-separated command line (the `MERGE_COMMAND`
    /// configuration value) into program + leading arguments.
    pub fn from_command_line(command_line: &str) -> anyhow::Result<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next().context("MERGE_COMMAND must not be empty")?;
        Ok(Self::new(program, parts.collect()))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait::async_trait]
impl DocumentMerger for CommandMerger {
    async fn merge(
        &self,
        spec: &MergeJobSpec,
        progress: Arc<ProgressReporter>,
    ) -> anyhow::Result<PathBuf> {
        progress.update(Some(0.0), Some("Merging documents"), None);

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg("--input-dir")
            .arg(&spec.input_dir)
            .arg("--output-dir")
            .arg(&spec.output_dir)
            .arg("--module-config")
            .arg(&spec.config_path)
            .arg("--days")
            .arg(spec.days.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::info!(
            program = %self.program,
            input_dir = %spec.input_dir.display(),
            days = spec.days,
            "Starting merge process",
        );

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .with_context(|| {
                format!(
                    "Merge process exceeded the {}s time limit",
                    self.timeout.as_secs()
                )
            })?
            .with_context(|| format!("Failed to run merge command '{}'", self.program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "Merge process exited with {}: {}",
                output.status,
                stderr.trim().lines().last().unwrap_or("<no output>"),
            );
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let path = stdout
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .map(|line| PathBuf::from(line.trim()));

        match path {
            Some(path) => {
                tracing::info!(output = %path.display(), "Merge process finished");
                Ok(path)
            }
            None => bail!("Merge process produced no output path"),
        }
    }
}

/// Check that a produced output path actually lies under the output
/// directory. Guards against a misbehaving merge command handing back an
/// arbitrary path.
pub fn is_under_dir(path: &Path, dir: &Path) -> bool {
    path.starts_with(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_parses_program_and_args() {
        let merger = CommandMerger::from_command_line("python3 merge.py --verbose").unwrap();
        assert_eq!(merger.program, "python3");
        assert_eq!(merger.args, vec!["merge.py", "--verbose"]);
    }

    #[test]
    fn empty_command_line_is_rejected() {
        assert!(CommandMerger::from_command_line("   ").is_err());
    }

    #[test]
    fn output_path_confinement() {
        let dir = Path::new("/srv/output");
        assert!(is_under_dir(Path::new("/srv/output/result.docx"), dir));
        assert!(!is_under_dir(Path::new("/etc/passwd"), dir));
    }
}
