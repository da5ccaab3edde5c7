//! Output file naming for grab-dl
//!
//! Picks a name from the server's Content-Disposition header or the fallback
//! hint, and makes sure it never overwrites an existing file.

use std::path::{Path, PathBuf};

/// Extracts a filename from a Content-Disposition header value.
///
/// Handles:
/// - `attachment; filename="example.pdf"`
/// - `attachment; filename=example.pdf`
/// - `attachment; filename*=UTF-8''example%20file.pdf` (RFC 5987, preferred)
pub fn parse_content_disposition(header: &str) -> Option<String> {
    if let Some(pos) = header.find("filename*=") {
        let value = header[pos + "filename*=".len()..].trim();
        // charset'language'encoded
        if let Some(quote_pos) = value.find("''") {
            let encoded = &value[quote_pos + 2..];
            let end = encoded.find(';').unwrap_or(encoded.len());
            let encoded = encoded[..end].trim().trim_matches('"');
            if let Ok(decoded) = urlencoding::decode(encoded) {
                if !decoded.is_empty() {
                    return Some(decoded.into_owned());
                }
            }
        }
    }

    let pos = header.find("filename=")?;
    let value = header[pos + "filename=".len()..].trim();

    if let Some(stripped) = value.strip_prefix('"') {
        let end = stripped.find('"')?;
        let name = &stripped[..end];
        return (!name.is_empty()).then(|| name.to_string());
    }

    let end = value.find(';').unwrap_or(value.len());
    let name = value[..end].trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// Reduces a server- or URL-supplied name to a safe single path component.
///
/// Directory parts are dropped and characters invalid on common filesystems
/// are replaced with `_`. Returns an empty string when nothing usable remains.
pub fn sanitize_filename(name: &str) -> String {
    let last = name
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(name);

    let sanitized: String = last
        .chars()
        .map(|c| match c {
            ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = sanitized.trim();
    if trimmed.chars().all(|c| c == '.') {
        return String::new();
    }
    trimmed.to_string()
}

/// Builds the collision-free candidate for attempt `n` (`report (n).pdf`)
fn numbered_name(filename: &str, n: u32) -> String {
    let path = Path::new(filename);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string());

    match path.extension() {
        Some(ext) => format!("{stem} ({n}).{}", ext.to_string_lossy()),
        None => format!("{stem} ({n})"),
    }
}

/// Resolves a path inside `dir` that does not exist yet.
///
/// `report.pdf` becomes `report (1).pdf`, then `report (2).pdf`, and so on.
/// The check is not atomic with file creation; the executor opens with
/// `create_new` so a lost race surfaces as an error instead of an overwrite.
pub fn resolve_unique_path(dir: &Path, filename: &str) -> PathBuf {
    let candidate = dir.join(filename);
    if !candidate.exists() {
        return candidate;
    }

    let mut n = 1u32;
    loop {
        let candidate = dir.join(numbered_name(filename, n));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_content_disposition_quoted() {
        let header = r#"attachment; filename="example.pdf""#;
        assert_eq!(parse_content_disposition(header), Some("example.pdf".to_string()));
    }

    #[test]
    fn test_parse_content_disposition_unquoted() {
        let header = "attachment; filename=example.pdf; size=123";
        assert_eq!(parse_content_disposition(header), Some("example.pdf".to_string()));
    }

    #[test]
    fn test_parse_content_disposition_rfc5987_preferred() {
        let header = r#"attachment; filename="fallback.pdf"; filename*=UTF-8''r%C3%A9sum%C3%A9.pdf"#;
        assert_eq!(parse_content_disposition(header), Some("résumé.pdf".to_string()));
    }

    #[test]
    fn test_parse_content_disposition_missing() {
        assert_eq!(parse_content_disposition("inline"), None);
        assert_eq!(parse_content_disposition("attachment; filename=\"\""), None);
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("report.pdf"), "report.pdf");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\temp\\evil.exe"), "evil.exe");
        assert_eq!(sanitize_filename("what?.txt"), "what_.txt");
        assert_eq!(sanitize_filename("file (1).pdf"), "file (1).pdf");
        assert_eq!(sanitize_filename(".."), "");
        assert_eq!(sanitize_filename("dir/"), "");
    }

    #[test]
    fn test_resolve_unique_path_no_collision() {
        let dir = tempdir().unwrap();
        let path = resolve_unique_path(dir.path(), "report.pdf");
        assert_eq!(path, dir.path().join("report.pdf"));
    }

    #[test]
    fn test_resolve_unique_path_collisions() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("report.pdf"), b"first").unwrap();

        let second = resolve_unique_path(dir.path(), "report.pdf");
        assert_eq!(second, dir.path().join("report (1).pdf"));
        std::fs::write(&second, b"second").unwrap();

        let third = resolve_unique_path(dir.path(), "report.pdf");
        assert_eq!(third, dir.path().join("report (2).pdf"));
    }

    #[test]
    fn test_resolve_unique_path_suffix_goes_before_last_extension() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("data.tar.gz"), b"x").unwrap();
        std::fs::write(dir.path().join("README"), b"x").unwrap();

        assert_eq!(
            resolve_unique_path(dir.path(), "data.tar.gz"),
            dir.path().join("data.tar (1).gz")
        );
        assert_eq!(
            resolve_unique_path(dir.path(), "README"),
            dir.path().join("README (1)")
        );
    }
}
