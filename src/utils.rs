//! Pure helpers for job identity and input hygiene

use url::Url;

/// Fallback base name used when a requested filename slugifies to nothing
const DEFAULT_BASE_NAME: &str = "mediafetch";

/// Maximum length of a slug in characters
const MAX_SLUG_LEN: usize = 80;

/// Generate a collision-resistant job identifier
///
/// 16 random bytes rendered as 32 lowercase hex characters — 128 bits of
/// entropy, which makes filename collisions across concurrent jobs
/// negligible without any coordination between requests.
///
/// # Examples
///
/// ```
/// use mediafetch::utils::generate_job_id;
///
/// let id = generate_job_id();
/// assert_eq!(id.len(), 32);
/// assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
/// ```
pub fn generate_job_id() -> String {
    let bytes: [u8; 16] = rand::random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Derive a filesystem- and URL-safe base name from user-supplied text
///
/// Lowercases the input, collapses every run of characters outside
/// `[a-z0-9._-]` into a single hyphen, strips leading/trailing hyphens, and
/// truncates to 80 characters. An input that reduces to nothing yields the
/// fixed fallback token.
///
/// # Examples
///
/// ```
/// use mediafetch::utils::slugify;
///
/// assert_eq!(slugify("Hello, World!!"), "hello-world");
/// assert_eq!(slugify(""), "mediafetch");
/// assert_eq!(slugify("My.Mix_2024"), "my.mix_2024");
/// ```
#[must_use]
pub fn slugify(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len().min(MAX_SLUG_LEN));

    for c in raw.to_lowercase().chars() {
        if matches!(c, 'a'..='z' | '0'..='9' | '.' | '_' | '-') {
            slug.push(c);
        } else if !slug.ends_with('-') {
            // collapse runs of disallowed characters into one hyphen
            slug.push('-');
        }
    }

    let trimmed: String = slug
        .trim_matches('-')
        .chars()
        .take(MAX_SLUG_LEN)
        .collect();

    if trimmed.is_empty() {
        DEFAULT_BASE_NAME.to_string()
    } else {
        trimmed
    }
}

/// Validate a user-supplied media URL
///
/// Trims surrounding whitespace and accepts only URLs that parse with an
/// `http` or `https` scheme (the parser lowercases schemes, so the check is
/// case-insensitive). Returns the trimmed input on success so the downloader
/// sees exactly what the caller sent.
///
/// Rejection here must never leave an HTTP connection hanging — the caller is
/// responsible for still completing the event-stream protocol with an
/// error-only terminal event.
pub fn clean_input_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let parsed = Url::parse(trimmed).ok()?;
    match parsed.scheme() {
        "http" | "https" => Some(trimmed.to_string()),
        _ => None,
    }
}
