use anyhow::{Result, anyhow};
use std::path::Path;

/// Validation error with a stable code and a human-readable message
#[derive(Debug)]
pub struct ValidationError {
    pub code: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Sanitizes an uploaded filename for logging and response echoing
///
/// The uploaded name never becomes a storage path (results are stored under
/// server-generated ids), but it is still stripped of path components,
/// control characters, and reserved characters before leaving the handler.
pub fn sanitize_filename(filename: &str) -> Result<String> {
    // Get only the filename component (remove any path)
    let name = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    if name.is_empty() {
        return Err(anyhow!(ValidationError {
            code: "INVALID_FILENAME",
            message: "Filename cannot be empty".to_string(),
        }));
    }

    // Check for path traversal attempts
    if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
        tracing::warn!("Path traversal attempt detected: {}", filename);
    }

    // Replace path separators, reserved characters, and control characters
    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_control() || "/\\:*?\"<>|;".contains(c) {
                '_'
            } else {
                c
            }
        })
        .collect();

    // Limit length safely for UTF-8
    let sanitized = if sanitized.len() > 255 {
        let mut end = 255;
        while !sanitized.is_char_boundary(end) {
            end -= 1;
        }
        sanitized[..end].to_string()
    } else {
        sanitized
    };

    if sanitized.starts_with('.') {
        return Err(anyhow!(ValidationError {
            code: "INVALID_FILENAME",
            message: "Hidden files are not allowed".to_string(),
        }));
    }

    Ok(sanitized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("street.jpg").unwrap(), "street.jpg");
        assert_eq!(sanitize_filename("my photo.png").unwrap(), "my photo.png");
        assert_eq!(
            sanitize_filename("shot<scaled>.jpg").unwrap(),
            "shot_scaled_.jpg"
        );
        assert_eq!(sanitize_filename("测试.jpg").unwrap(), "测试.jpg");

        // Path traversal collapses to the final component
        assert_eq!(sanitize_filename("../../../etc/passwd").unwrap(), "passwd");
        assert_eq!(sanitize_filename("photos/cat.jpg").unwrap(), "cat.jpg");
    }

    #[test]
    fn test_sanitize_rejects_empty_and_hidden_names() {
        assert!(sanitize_filename("").is_err());
        assert!(sanitize_filename("..").is_err());
        assert!(sanitize_filename(".hidden.jpg").is_err());
    }

    #[test]
    fn test_sanitize_truncates_long_names_on_char_boundary() {
        let long = format!("{}.jpg", "あ".repeat(120));
        let sanitized = sanitize_filename(&long).unwrap();
        assert!(sanitized.len() <= 255);
        assert!(sanitized.is_char_boundary(sanitized.len()));
    }
}
