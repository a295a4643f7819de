//! Version control detection and metadata extraction.
//!
//! Every probe shells out to `git` or `hg` with a bounded timeout. The child
//! is spawned with `kill_on_drop`, so dropping a pending probe (timeout or
//! caller cancellation) also kills the subprocess.
//!
//! Failures are advisory: callers treat any `VcsError` as "no data".

use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

use super::types::VcsKind;

/// Default upper bound for a single VCS subprocess
pub const DEFAULT_VCS_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum VcsError {
    #[error("failed to run `{program}`: {source}")]
    Spawn {
        program: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` timed out after {}ms", .timeout.as_millis())]
    Timeout {
        program: &'static str,
        timeout: Duration,
    },

    #[error("`{program} {args}` exited with {status}: {stderr}")]
    Failed {
        program: &'static str,
        args: String,
        status: ExitStatus,
        stderr: String,
    },
}

/// Probes directories for Git/Mercurial and reads their metadata.
#[derive(Debug, Clone, Copy)]
pub struct VcsDetector {
    timeout: Duration,
}

impl Default for VcsDetector {
    fn default() -> Self {
        Self::new(DEFAULT_VCS_TIMEOUT)
    }
}

impl VcsDetector {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run a VCS subcommand in `dir` and return its trimmed stdout.
    async fn run(&self, program: &'static str, args: &[&str], dir: &Path) -> Result<String, VcsError> {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .current_dir(dir)
            .env("LC_ALL", "C")
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(result) => result.map_err(|source| VcsError::Spawn { program, source })?,
            Err(_) => {
                return Err(VcsError::Timeout {
                    program,
                    timeout: self.timeout,
                })
            }
        };

        if !output.status.success() {
            return Err(VcsError::Failed {
                program,
                args: args.join(" "),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Detect which VCS manages `dir`. Not being a repository is the common
    /// case and yields `VcsKind::None`.
    pub async fn detect(&self, dir: &Path) -> VcsKind {
        if self.is_git_repository(dir).await {
            return VcsKind::Git;
        }
        if self.is_mercurial_repository(dir).await {
            return VcsKind::Mercurial;
        }
        VcsKind::None
    }

    async fn is_git_repository(&self, dir: &Path) -> bool {
        match self.run("git", &["rev-parse", "--git-dir"], dir).await {
            Ok(_) => true,
            Err(e) => {
                debug!("{} is not a git repository: {}", dir.display(), e);
                false
            }
        }
    }

    async fn is_mercurial_repository(&self, dir: &Path) -> bool {
        match self.run("hg", &["root"], dir).await {
            Ok(_) => true,
            Err(e) => {
                debug!("{} is not a mercurial repository: {}", dir.display(), e);
                false
            }
        }
    }

    /// Full hash of `HEAD`
    pub async fn commit_hash(&self, dir: &Path) -> Result<String, VcsError> {
        self.run("git", &["rev-parse", "HEAD"], dir).await
    }

    /// Current branch name (`HEAD` when detached)
    pub async fn branch(&self, dir: &Path) -> Result<String, VcsError> {
        self.run("git", &["rev-parse", "--abbrev-ref", "HEAD"], dir)
            .await
    }

    /// Fetch URLs of all configured remotes
    pub async fn remote_urls(&self, dir: &Path) -> Result<Vec<String>, VcsError> {
        let output = self.run("git", &["remote", "-v"], dir).await?;
        Ok(parse_remote_urls(&output))
    }

    /// Whether the working copy has no uncommitted changes.
    ///
    /// Directories without VCS have nothing to commit and report clean.
    pub async fn is_clean(&self, dir: &Path, vcs: VcsKind) -> Result<bool, VcsError> {
        let status = match vcs {
            VcsKind::Git => self.run("git", &["status", "--porcelain"], dir).await?,
            VcsKind::Mercurial => self.run("hg", &["status"], dir).await?,
            VcsKind::None => return Ok(true),
        };
        Ok(status.is_empty())
    }
}

/// Parse `git remote -v` output into unique fetch URLs.
///
/// Each remote appears once for fetch and once for push; only the fetch
/// rows are kept.
pub fn parse_remote_urls(output: &str) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();

    for line in output.lines() {
        if !line.contains("(fetch)") {
            continue;
        }
        if let Some(url) = line.split_whitespace().nth(1) {
            if !urls.iter().any(|u| u == url) {
                urls.push(url.to_string());
            }
        }
    }

    urls
}
