//! Cookie jar persistence.
//!
//! One cookie per line in `Set-Cookie` attribute syntax. The jar is replaced
//! as a whole and only when the response set at least one cookie.

use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use reqwest::cookie::Cookie;

use crate::config::COOKIE_EXPIRES_FORMAT;
use crate::error_handling::{CurlError, Stage};

/// Serializes a received cookie as `name=value` plus its attributes.
pub fn serialize_cookie(cookie: &Cookie<'_>) -> String {
    let mut line = format!("{}={}", cookie.name(), cookie.value());
    if let Some(path) = cookie.path() {
        line.push_str("; Path=");
        line.push_str(path);
    }
    if let Some(domain) = cookie.domain() {
        line.push_str("; Domain=");
        line.push_str(domain.trim_start_matches('.'));
    }
    if let Some(expires) = cookie.expires() {
        let expires: DateTime<Utc> = expires.into();
        line.push_str("; Expires=");
        line.push_str(&expires.format(COOKIE_EXPIRES_FORMAT).to_string());
    }
    if let Some(max_age) = cookie.max_age() {
        line.push_str(&format!("; Max-Age={}", max_age.as_secs()));
    }
    if cookie.http_only() {
        line.push_str("; HttpOnly");
    }
    if cookie.secure() {
        line.push_str("; Secure");
    }
    if cookie.same_site_strict() {
        line.push_str("; SameSite=Strict");
    } else if cookie.same_site_lax() {
        line.push_str("; SameSite=Lax");
    }
    line
}

/// Collects the cookies set by a response, in header order.
pub fn collect_cookies(response: &reqwest::Response) -> Vec<String> {
    response.cookies().map(|c| serialize_cookie(&c)).collect()
}

/// Replaces the jar with `entries`. Does nothing when `entries` is empty.
///
/// Returns whether the jar was written.
pub fn write_cookie_jar(path: &Path, entries: &[String]) -> Result<bool, CurlError> {
    if entries.is_empty() {
        log::debug!("No cookies received; leaving {} untouched", path.display());
        return Ok(false);
    }

    let context = || format!("failed to write cookie jar {}", path.display());
    let mut file = std::fs::File::create(path)
        .map_err(|e| CurlError::output(Stage::Rendering, context(), e))?;
    for entry in entries {
        writeln!(file, "{}", entry).map_err(|e| CurlError::output(Stage::Rendering, context(), e))?;
    }
    file.flush()
        .map_err(|e| CurlError::output(Stage::Rendering, context(), e))?;

    log::debug!("Wrote {} cookie(s) to {}", entries.len(), path.display());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_jar_is_not_touched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("jar.txt");
        std::fs::write(&path, "old=1\n").unwrap();

        assert!(!write_cookie_jar(&path, &[]).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "old=1\n");
    }

    #[test]
    fn test_jar_is_replaced_line_per_cookie() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("jar.txt");
        std::fs::write(&path, "old=1\nstale=2\nmore=3\n").unwrap();

        let entries = vec!["a=1; Path=/".to_string(), "b=2; HttpOnly".to_string()];
        assert!(write_cookie_jar(&path, &entries).unwrap());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "a=1; Path=/\nb=2; HttpOnly\n"
        );
    }

    #[test]
    fn test_unwritable_jar_is_output_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing-dir").join("jar.txt");
        let err = write_cookie_jar(&path, &["a=1".to_string()]).unwrap_err();
        assert_eq!(err.stage(), Stage::Rendering);
        assert!(err.to_string().contains("failed to write cookie jar"));
    }
}
