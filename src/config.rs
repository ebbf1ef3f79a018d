//! Configuration types for mediafetch
//!
//! All configuration is read from the environment exactly once at startup
//! ([`Config::from_env`]) and handed to the rest of the crate as an immutable
//! struct behind an `Arc`. Request-handling code never consults the
//! environment directly.

use crate::error::{Error, Result};
use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Default listening port
const DEFAULT_PORT: u16 = 3002;

/// Name of the downloader binary searched on PATH when no explicit path is set
const DOWNLOADER_BINARY: &str = "yt-dlp";

/// HTTP Basic credentials gating every route
///
/// Only constructed when both `BASIC_AUTH_USER` and `BASIC_AUTH_PASS` are set
/// to non-empty values; otherwise the gate is disabled entirely.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BasicAuthConfig {
    /// Expected username
    pub username: String,

    /// Expected password
    pub password: String,
}

/// Main configuration for the mediafetch server
///
/// Built once from the environment at startup. See [`Config::from_env`] for
/// the variable names; every field has a sensible default so the server runs
/// with zero configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Address to bind to (default: 0.0.0.0:3002, port from `PORT`)
    pub bind_address: SocketAddr,

    /// Directory all produced files land in (default: "/data/downloads")
    ///
    /// Created at startup if absent. Download links are only ever issued for
    /// files residing inside this directory.
    pub output_dir: PathBuf,

    /// Optional HTTP Basic credentials; `None` disables authentication
    pub basic_auth: Option<BasicAuthConfig>,

    /// Explicit public base URL for download links (e.g. behind a proxy)
    ///
    /// When unset, the base URL is derived per request from forwarded
    /// headers.
    pub public_base_url: Option<String>,

    /// Directory holding the UI bundle served at `/` (default: "./public")
    pub ui_dir: PathBuf,

    /// Directory holding static assets served at `/assets` (default: "./assets")
    pub assets_dir: PathBuf,

    /// Path to the yt-dlp executable (auto-detected from PATH if None)
    pub ytdlp_path: Option<PathBuf>,

    /// Cookies file passed to the downloader when it exists on disk
    /// (default: "/app/cookies.txt")
    pub cookies_file: PathBuf,

    /// Serve Swagger UI at /swagger-ui (default: true)
    pub swagger_ui: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            output_dir: PathBuf::from("/data/downloads"),
            basic_auth: None,
            public_base_url: None,
            ui_dir: PathBuf::from("./public"),
            assets_dir: PathBuf::from("./assets"),
            ytdlp_path: None,
            cookies_file: PathBuf::from("/app/cookies.txt"),
            swagger_ui: true,
        }
    }
}

impl Config {
    /// Build the configuration from environment variables
    ///
    /// Empty values are treated the same as unset values. Basic auth is only
    /// enabled when both `BASIC_AUTH_USER` and `BASIC_AUTH_PASS` are present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when `PORT` is set but not a valid port
    /// number. A bad port is a deployment mistake worth failing loudly on
    /// rather than silently falling back to the default.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let bind_address = match env_nonempty("PORT") {
            Some(raw) => {
                let port: u16 = raw.parse().map_err(|_| Error::Config {
                    message: format!("invalid PORT value: {raw:?}"),
                    key: Some("PORT".to_string()),
                })?;
                SocketAddr::from(([0, 0, 0, 0], port))
            }
            None => defaults.bind_address,
        };

        let basic_auth = match (
            env_nonempty("BASIC_AUTH_USER"),
            env_nonempty("BASIC_AUTH_PASS"),
        ) {
            (Some(username), Some(password)) => Some(BasicAuthConfig { username, password }),
            _ => None,
        };

        let swagger_ui = !matches!(
            env_nonempty("SWAGGER_UI").as_deref(),
            Some("false") | Some("0")
        );

        Ok(Self {
            bind_address,
            output_dir: env_nonempty("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            basic_auth,
            public_base_url: env_nonempty("PUBLIC_BASE_URL"),
            ui_dir: env_nonempty("UI_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.ui_dir),
            assets_dir: env_nonempty("ASSETS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.assets_dir),
            ytdlp_path: env_nonempty("YTDLP_PATH").map(PathBuf::from),
            cookies_file: env_nonempty("COOKIES_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.cookies_file),
            swagger_ui,
        })
    }

    /// Resolve the downloader binary to spawn
    ///
    /// Prefers the explicitly configured path, then searches PATH. Falls back
    /// to the bare binary name so a missing installation surfaces as a spawn
    /// error on the event stream instead of a startup failure.
    pub fn downloader_binary(&self) -> PathBuf {
        if let Some(path) = &self.ytdlp_path {
            return path.clone();
        }
        which::which(DOWNLOADER_BINARY).unwrap_or_else(|_| PathBuf::from(DOWNLOADER_BINARY))
    }

    /// Cookies file to pass to the downloader, if it exists on disk
    ///
    /// Probed per job so cookies dropped into a running container are picked
    /// up without a restart.
    pub fn cookies_file_if_present(&self) -> Option<&Path> {
        if self.cookies_file.is_file() {
            Some(self.cookies_file.as_path())
        } else {
            None
        }
    }
}

/// Read an environment variable, treating empty and whitespace-only values as unset
fn env_nonempty(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const ALL_VARS: &[&str] = &[
        "PORT",
        "OUTPUT_DIR",
        "BASIC_AUTH_USER",
        "BASIC_AUTH_PASS",
        "PUBLIC_BASE_URL",
        "UI_DIR",
        "ASSETS_DIR",
        "YTDLP_PATH",
        "COOKIES_FILE",
        "SWAGGER_UI",
    ];

    fn clear_env() {
        for var in ALL_VARS {
            // SAFETY: env-mutating tests run serially (#[serial]) and never
            // race with other threads reading the environment.
            unsafe { env::remove_var(var) };
        }
    }

    fn set_var(key: &str, value: &str) {
        // SAFETY: see clear_env
        unsafe { env::set_var(key, value) };
    }

    #[test]
    #[serial]
    fn from_env_uses_defaults_when_nothing_is_set() {
        clear_env();
        let config = Config::from_env().unwrap();

        assert_eq!(config.bind_address.port(), 3002);
        assert_eq!(config.output_dir, PathBuf::from("/data/downloads"));
        assert!(config.basic_auth.is_none());
        assert!(config.public_base_url.is_none());
        assert!(config.swagger_ui);
    }

    #[test]
    #[serial]
    fn from_env_reads_port_and_output_dir() {
        clear_env();
        set_var("PORT", "8080");
        set_var("OUTPUT_DIR", "/srv/media");

        let config = Config::from_env().unwrap();
        assert_eq!(config.bind_address.port(), 8080);
        assert_eq!(config.output_dir, PathBuf::from("/srv/media"));
        clear_env();
    }

    #[test]
    #[serial]
    fn from_env_rejects_invalid_port() {
        clear_env();
        set_var("PORT", "not-a-port");

        let err = Config::from_env().unwrap_err();
        match err {
            Error::Config { key, .. } => assert_eq!(key.as_deref(), Some("PORT")),
            other => panic!("expected config error, got {other:?}"),
        }
        clear_env();
    }

    #[test]
    #[serial]
    fn basic_auth_requires_both_credentials() {
        clear_env();
        set_var("BASIC_AUTH_USER", "admin");
        assert!(Config::from_env().unwrap().basic_auth.is_none());

        set_var("BASIC_AUTH_PASS", "secret");
        let auth = Config::from_env().unwrap().basic_auth.unwrap();
        assert_eq!(auth.username, "admin");
        assert_eq!(auth.password, "secret");
        clear_env();
    }

    #[test]
    #[serial]
    fn empty_values_count_as_unset() {
        clear_env();
        set_var("BASIC_AUTH_USER", "");
        set_var("BASIC_AUTH_PASS", "secret");
        set_var("PUBLIC_BASE_URL", "   ");

        let config = Config::from_env().unwrap();
        assert!(config.basic_auth.is_none());
        assert!(config.public_base_url.is_none());
        clear_env();
    }

    #[test]
    #[serial]
    fn swagger_ui_can_be_disabled() {
        clear_env();
        set_var("SWAGGER_UI", "false");
        assert!(!Config::from_env().unwrap().swagger_ui);

        set_var("SWAGGER_UI", "0");
        assert!(!Config::from_env().unwrap().swagger_ui);

        set_var("SWAGGER_UI", "yes");
        assert!(Config::from_env().unwrap().swagger_ui);
        clear_env();
    }

    #[test]
    fn downloader_binary_prefers_explicit_path() {
        let config = Config {
            ytdlp_path: Some(PathBuf::from("/opt/yt-dlp/yt-dlp")),
            ..Config::default()
        };
        assert_eq!(
            config.downloader_binary(),
            PathBuf::from("/opt/yt-dlp/yt-dlp")
        );
    }

    #[test]
    fn cookies_file_if_present_checks_the_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let cookies = dir.path().join("cookies.txt");

        let config = Config {
            cookies_file: cookies.clone(),
            ..Config::default()
        };
        assert!(config.cookies_file_if_present().is_none());

        std::fs::write(&cookies, "# Netscape HTTP Cookie File\n").unwrap();
        assert_eq!(config.cookies_file_if_present(), Some(cookies.as_path()));
    }
}
