//! Core types for mediafetch

use crate::utils;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use utoipa::ToSchema;

/// Download mode requested by the client
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Extract best audio and transcode to mp3
    Audio,

    /// Best video + best audio, merged into an mp4 container
    ///
    /// Unknown mode strings fold into this variant, so clients sending
    /// unrecognized modes get the default behavior instead of an error.
    #[default]
    #[serde(other)]
    Video,
}

/// One invocation of the external downloader, triggered by one request
///
/// Ephemeral by design: owned by the request-handling flow, dropped when the
/// flow ends. There is no job table and no cross-request state; concurrent
/// jobs stay independent because the random id is embedded in every output
/// filename.
#[derive(Clone, Debug)]
pub struct Job {
    /// Opaque job identifier (32 hex chars, 128 bits of entropy)
    pub id: String,

    /// Filesystem-safe base name derived from the requested filename
    pub base_name: String,

    /// Validated media URL handed to the downloader
    pub url: String,

    /// Requested download mode
    pub mode: Mode,

    /// Output path template; the downloader resolves `%(ext)s` itself
    pub output_template: PathBuf,
}

impl Job {
    /// Create a job for a validated URL
    ///
    /// Generates a fresh random id and slugifies the requested filename
    /// (falling back to a fixed token when empty), then derives the output
    /// template `<output_dir>/<base_name>-<id>.%(ext)s`.
    pub fn new(url: String, mode: Mode, filename: Option<&str>, output_dir: &Path) -> Self {
        let id = utils::generate_job_id();
        let base_name = utils::slugify(filename.unwrap_or(""));
        let output_template = output_dir.join(format!("{base_name}-{id}.%(ext)s"));

        Self {
            id,
            base_name,
            url,
            mode,
            output_template,
        }
    }
}

/// Events pushed to the client over the per-job SSE channel
///
/// Per job the sequence is exactly one `start` (or a lone error `done` when
/// the input never passes validation), zero or more `log`, and exactly one
/// terminal `done`. Nothing follows `done`.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StreamEvent {
    /// Job accepted; the downloader is about to be spawned
    #[serde(rename_all = "camelCase")]
    Start {
        /// Opaque job identifier
        job_id: String,
    },

    /// One raw diagnostic line from the downloader's stdout or stderr
    Log {
        /// The line, without its trailing newline
        line: String,
    },

    /// Terminal event; the stream closes after this
    #[serde(rename_all = "camelCase")]
    Done {
        /// Whether the downloader exited successfully
        ok: bool,

        /// Process exit code (absent on spawn errors and signal deaths)
        #[serde(skip_serializing_if = "Option::is_none")]
        code: Option<i32>,

        /// Error description for spawn/process-level failures
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,

        /// Public link to the produced file, when one could be resolved
        #[serde(skip_serializing_if = "Option::is_none")]
        download_url: Option<String>,
    },
}

impl StreamEvent {
    /// SSE event name for this variant
    pub fn kind(&self) -> &'static str {
        match self {
            StreamEvent::Start { .. } => "start",
            StreamEvent::Log { .. } => "log",
            StreamEvent::Done { .. } => "done",
        }
    }

    /// Terminal failure event carrying only an error message
    pub fn failed(error: impl Into<String>) -> Self {
        StreamEvent::Done {
            ok: false,
            code: None,
            error: Some(error.into()),
            download_url: None,
        }
    }
}
