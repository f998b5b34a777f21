//! Shared key generation for storage backends.
//!
//! Key format: `content/{unix_millis}-{suffix}-{filename}`.

use chrono::Utc;
use uuid::Uuid;

const KEY_PREFIX: &str = "content";
const MAX_FILENAME_LENGTH: usize = 120;

/// Generate a storage key for an uploaded file.
///
/// The millisecond timestamp keeps keys roughly ordered; the random suffix keeps
/// two files with the same name in one batch from colliding.
pub fn generate_content_key(filename: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "{}/{}-{}-{}",
        KEY_PREFIX,
        Utc::now().timestamp_millis(),
        &suffix[..8],
        sanitize_filename(filename)
    )
}

/// Reduce a client-supplied filename to a safe key segment.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
        .trim();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    let cleaned = if cleaned.contains("..") {
        cleaned.replace("..", "_")
    } else {
        cleaned.to_string()
    };

    if cleaned.is_empty() {
        return "file".to_string();
    }

    cleaned.chars().take(MAX_FILENAME_LENGTH).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_has_expected_shape() {
        let key = generate_content_key("a.pdf");
        assert!(key.starts_with("content/"));
        assert!(key.ends_with("-a.pdf"));
        let rest = key.trim_start_matches("content/");
        let mut parts = rest.splitn(3, '-');
        assert!(parts.next().unwrap().parse::<i64>().is_ok());
        assert_eq!(parts.next().unwrap().len(), 8);
    }

    #[test]
    fn same_name_keys_differ() {
        assert_ne!(generate_content_key("a.pdf"), generate_content_key("a.pdf"));
    }

    #[test]
    fn sanitizes_paths_and_odd_characters() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\docs\\my file.pdf"), "my_file.pdf");
        assert_eq!(sanitize_filename(".hidden"), "hidden");
        assert_eq!(sanitize_filename("a..b"), "a_b");
        assert_eq!(sanitize_filename("   "), "file");
    }
}
