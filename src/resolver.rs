//! Public download-link resolution
//!
//! Turns the file path captured from downloader output into a URL the caller
//! can fetch, but only after proving the file actually lives inside the
//! configured output directory. Canonicalization resolves `..` components and
//! symlinks before the containment check, so a crafted destination line can
//! never mint a link that escapes the sandboxed output root.

use crate::config::Config;
use axum::http::HeaderMap;
use std::path::Path;

/// Route prefix under which the output directory is served
pub const DOWNLOADS_ROUTE: &str = "/downloads";

/// Derive the public base URL for download links on this request
///
/// An explicitly configured base URL always wins. Otherwise the scheme comes
/// from `X-Forwarded-Proto` (first comma-separated value, defaulting to
/// `http`) and the host from `X-Forwarded-Host`, falling back to the literal
/// `Host` header. Trailing slashes are stripped. Without any usable host the
/// result is an empty string, which suppresses link generation downstream.
///
/// Deterministic: identical configuration and headers always produce the same
/// base URL.
pub fn public_base_url(config: &Config, headers: &HeaderMap) -> String {
    if let Some(base) = &config.public_base_url {
        return base.trim_end_matches('/').to_string();
    }

    let proto =
        first_header_value(headers, "x-forwarded-proto").unwrap_or_else(|| "http".to_string());
    let host = first_header_value(headers, "x-forwarded-host")
        .or_else(|| first_header_value(headers, "host"));

    match host {
        Some(host) => format!("{proto}://{host}")
            .trim_end_matches('/')
            .to_string(),
        None => String::new(),
    }
}

/// Resolve the public URL for a produced file
///
/// Returns a link only when all of the following hold:
/// - a destination path was captured from the downloader's output,
/// - the path canonicalizes (the file exists on disk),
/// - the canonical path is a strict descendant of the canonical output
///   directory,
/// - a non-empty base URL is available.
///
/// The output-directory-relative path is joined with `/` regardless of
/// platform and appended under [`DOWNLOADS_ROUTE`]. Any failed condition
/// yields `None`; the caller still reports the process outcome, just without
/// a link.
pub fn resolve_download_url(
    file: Option<&Path>,
    output_dir: &Path,
    base_url: &str,
) -> Option<String> {
    let file = file?;
    if base_url.is_empty() {
        return None;
    }

    let canonical_dir = std::fs::canonicalize(output_dir).ok()?;
    let canonical_file = std::fs::canonicalize(file).ok()?;

    let relative = canonical_file.strip_prefix(&canonical_dir).ok()?;
    if relative.as_os_str().is_empty() {
        // the output directory itself is not a downloadable file
        return None;
    }

    let relative_posix = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");

    Some(format!("{base_url}{DOWNLOADS_ROUTE}/{relative_posix}"))
}

/// First comma-separated value of a header, trimmed; `None` when missing or empty
fn first_header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.split(',').next().unwrap_or("").trim().to_string())
        .filter(|value| !value.is_empty())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use std::fs;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                axum::http::HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn explicit_base_url_wins_and_loses_trailing_slashes() {
        let config = Config {
            public_base_url: Some("https://media.example.com///".to_string()),
            ..Config::default()
        };
        let derived = public_base_url(&config, &headers(&[("host", "internal:3002")]));
        assert_eq!(derived, "https://media.example.com");
    }

    #[test]
    fn derives_from_forwarded_headers() {
        let config = Config::default();
        let derived = public_base_url(
            &config,
            &headers(&[
                ("x-forwarded-proto", "https, http"),
                ("x-forwarded-host", "public.example.com, internal"),
            ]),
        );
        assert_eq!(derived, "https://public.example.com");
    }

    #[test]
    fn falls_back_to_host_header_with_http_scheme() {
        let config = Config::default();
        let derived = public_base_url(&config, &headers(&[("host", "localhost:3002")]));
        assert_eq!(derived, "http://localhost:3002");
    }

    #[test]
    fn no_usable_host_yields_empty_base() {
        let config = Config::default();
        assert_eq!(public_base_url(&config, &HeaderMap::new()), "");
    }

    #[test]
    fn derivation_is_idempotent_for_identical_headers() {
        let config = Config::default();
        let map = headers(&[
            ("x-forwarded-proto", "https"),
            ("x-forwarded-host", "public.example.com"),
        ]);
        assert_eq!(public_base_url(&config, &map), public_base_url(&config, &map));
    }

    #[test]
    fn resolves_link_for_file_inside_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("clip-ab12.mp4");
        fs::write(&file, b"video").unwrap();

        let link = resolve_download_url(Some(&file), dir.path(), "https://host");
        assert_eq!(link.unwrap(), "https://host/downloads/clip-ab12.mp4");
    }

    #[test]
    fn resolves_nested_files_with_posix_separators() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let file = dir.path().join("sub").join("clip.mp4");
        fs::write(&file, b"video").unwrap();

        let link = resolve_download_url(Some(&file), dir.path(), "https://host");
        assert_eq!(link.unwrap(), "https://host/downloads/sub/clip.mp4");
    }

    #[test]
    fn rejects_files_outside_output_dir() {
        let output = tempfile::tempdir().unwrap();
        let elsewhere = tempfile::tempdir().unwrap();
        let file = elsewhere.path().join("passwd");
        fs::write(&file, b"root:x").unwrap();

        assert!(resolve_download_url(Some(&file), output.path(), "https://host").is_none());
    }

    #[test]
    fn rejects_traversal_through_dotdot_components() {
        let root = tempfile::tempdir().unwrap();
        let output = root.path().join("downloads");
        fs::create_dir(&output).unwrap();
        let secret = root.path().join("secret.txt");
        fs::write(&secret, b"keep out").unwrap();

        let sneaky = output.join("..").join("secret.txt");
        assert!(resolve_download_url(Some(&sneaky), &output, "https://host").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn rejects_symlinks_escaping_the_output_dir() {
        let root = tempfile::tempdir().unwrap();
        let output = root.path().join("downloads");
        fs::create_dir(&output).unwrap();
        let secret = root.path().join("secret.txt");
        fs::write(&secret, b"keep out").unwrap();

        let link_path = output.join("innocent.txt");
        std::os::unix::fs::symlink(&secret, &link_path).unwrap();

        assert!(resolve_download_url(Some(&link_path), &output, "https://host").is_none());
    }

    #[test]
    fn missing_file_or_base_url_suppresses_the_link() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("clip.mp4");
        fs::write(&file, b"video").unwrap();

        assert!(resolve_download_url(None, dir.path(), "https://host").is_none());
        assert!(resolve_download_url(Some(&file), dir.path(), "").is_none());
        assert!(
            resolve_download_url(Some(&dir.path().join("ghost.mp4")), dir.path(), "https://host")
                .is_none()
        );
    }

    #[test]
    fn output_dir_itself_is_not_linkable() {
        let dir = tempfile::tempdir().unwrap();
        assert!(resolve_download_url(Some(dir.path()), dir.path(), "https://host").is_none());
    }
}
