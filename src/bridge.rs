//! Job-streaming bridge between the external downloader and the event channel
//!
//! Spawns the downloader as an independent OS process, consumes its
//! stdout/stderr line by line, and maps every line to a typed
//! [`StreamEvent`]. Destination paths are scraped out of the diagnostic text
//! as a side effect of the same pass.
//!
//! The scraping contract is best-effort by nature: it depends on the wording
//! of another program's progress output (`Destination:` and
//! `Merging formats into` lines). If that wording drifts in a future
//! downloader release, jobs still complete — they just report success without
//! a download link.

use crate::config::Config;
use crate::resolver;
use crate::types::{Job, Mode, StreamEvent};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

/// Matches the downloader's destination diagnostics, with an optionally
/// double-quoted path anchored at end of line. Case-sensitive on purpose —
/// these are exact strings printed by the tool, not user input.
const DESTINATION_PATTERN: &str = r#"(?:Destination:|Merging formats into)\s+"?([^"]+)"?$"#;

/// Incremental line matcher capturing the job's final output path
///
/// Fed every output line in arrival order; the last matching line wins. That
/// is the correct policy for merged downloads, where intermediate
/// `Destination:` lines (separate video/audio streams) are superseded by the
/// final `Merging formats into` line naming the real artifact.
pub struct OutputScanner {
    pattern: Regex,
    destination: Option<PathBuf>,
}

impl OutputScanner {
    /// Create a scanner with the destination pattern compiled once
    pub fn new() -> Self {
        #[allow(clippy::expect_used)]
        let pattern = Regex::new(DESTINATION_PATTERN).expect("hard-coded pattern compiles");
        Self {
            pattern,
            destination: None,
        }
    }

    /// Inspect one output line, updating the captured destination on a match
    pub fn observe(&mut self, line: &str) {
        if let Some(captures) = self.pattern.captures(line)
            && let Some(path) = captures.get(1)
        {
            let path = path.as_str().trim();
            if !path.is_empty() {
                self.destination = Some(PathBuf::from(path));
            }
        }
    }

    /// The most recently captured destination path, if any line matched
    pub fn destination(&self) -> Option<&Path> {
        self.destination.as_deref()
    }
}

impl Default for OutputScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the downloader argument list for a job
///
/// The base flags suppress warnings, force line-buffered newline-delimited
/// progress, restrict output filenames to safe characters, disable playlist
/// expansion, and disable `.part` artifacts. The cookies file is appended
/// only when it exists on disk. Mode-specific flags follow, the URL comes
/// last.
pub fn build_args(config: &Config, job: &Job) -> Vec<String> {
    let mut args = vec![
        "--no-warnings".to_string(),
        "--newline".to_string(),
        "--restrict-filenames".to_string(),
        "--no-playlist".to_string(),
        "--no-part".to_string(),
        "-o".to_string(),
        job.output_template.to_string_lossy().into_owned(),
    ];

    if let Some(cookies) = config.cookies_file_if_present() {
        args.push("--cookies".to_string());
        args.push(cookies.to_string_lossy().into_owned());
    }

    match job.mode {
        Mode::Audio => {
            args.extend(["-x", "--audio-format", "mp3", "--audio-quality", "192K"].map(String::from))
        }
        Mode::Video => {
            args.extend(["-f", "bv*+ba/b", "--merge-output-format", "mp4"].map(String::from))
        }
    }

    args.push(job.url.clone());
    args
}

/// Run one job to completion, pushing events into the channel
///
/// Emits `start`, then one `log` per non-empty output line, then exactly one
/// terminal `done` — either from process exit (with the exit code and a
/// resolver-checked download link on success) or from a process-level error
/// (spawn failure, reap failure). The two terminal paths are mutually
/// exclusive. Dropping the sender on return is what closes the caller's HTTP
/// stream, so every path out of this function ends the stream exactly once.
///
/// Send errors are ignored: a client that disconnects mid-job stops
/// receiving events, but the process still runs to completion. There is no
/// cancellation and no timeout.
pub async fn run_job(
    config: Arc<Config>,
    job: Job,
    base_url: String,
    tx: mpsc::Sender<StreamEvent>,
) {
    let _ = tx
        .send(StreamEvent::Start {
            job_id: job.id.clone(),
        })
        .await;

    let binary = config.downloader_binary();
    let args = build_args(&config, &job);

    tracing::info!(
        job_id = %job.id,
        url = %job.url,
        mode = ?job.mode,
        binary = %binary.display(),
        "spawning downloader"
    );

    let mut child = match Command::new(&binary)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            tracing::error!(job_id = %job.id, error = %e, "failed to spawn downloader");
            let _ = tx
                .send(StreamEvent::failed(format!(
                    "failed to launch {}: {e}",
                    binary.display()
                )))
                .await;
            return;
        }
    };

    // Both pipes were requested above; losing them is a process-level error,
    // not a panic.
    let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
        let _ = tx
            .send(StreamEvent::failed("downloader pipes unavailable"))
            .await;
        return;
    };

    let mut stdout_lines = BufReader::new(stdout).lines();
    let mut stderr_lines = BufReader::new(stderr).lines();
    let mut stdout_open = true;
    let mut stderr_open = true;
    let mut scanner = OutputScanner::new();

    // One pump for both pipes: per-pipe line order is preserved, interleaving
    // between the two follows I/O arrival.
    while stdout_open || stderr_open {
        let line = tokio::select! {
            line = stdout_lines.next_line(), if stdout_open => match line {
                Ok(Some(line)) => Some(line),
                Ok(None) => {
                    stdout_open = false;
                    None
                }
                Err(e) => {
                    tracing::warn!(job_id = %job.id, error = %e, "stdout read error");
                    stdout_open = false;
                    None
                }
            },
            line = stderr_lines.next_line(), if stderr_open => match line {
                Ok(Some(line)) => Some(line),
                Ok(None) => {
                    stderr_open = false;
                    None
                }
                Err(e) => {
                    tracing::warn!(job_id = %job.id, error = %e, "stderr read error");
                    stderr_open = false;
                    None
                }
            },
        };

        if let Some(line) = line {
            if line.is_empty() {
                continue;
            }
            scanner.observe(&line);
            let _ = tx.send(StreamEvent::Log { line }).await;
        }
    }

    match child.wait().await {
        Ok(status) => {
            let ok = status.success();
            let download_url = if ok {
                resolver::resolve_download_url(
                    scanner.destination(),
                    &config.output_dir,
                    &base_url,
                )
            } else {
                None
            };

            tracing::info!(
                job_id = %job.id,
                code = ?status.code(),
                ok,
                link = download_url.is_some(),
                "downloader finished"
            );

            let _ = tx
                .send(StreamEvent::Done {
                    ok,
                    code: status.code(),
                    error: None,
                    download_url,
                })
                .await;
        }
        Err(e) => {
            tracing::error!(job_id = %job.id, error = %e, "failed to reap downloader");
            let _ = tx.send(StreamEvent::failed(e.to_string())).await;
        }
    }
}
