use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameKeyError {
    #[error("frame key must not be empty")]
    Empty,
    #[error("frame key must not start or end with '/'")]
    DanglingSeparator,
    #[error("frame key must not contain an empty segment")]
    EmptySegment,
    #[error("frame key contains invalid character '{character}'")]
    InvalidCharacter { character: char },
}

/// Frame keys are '/'-separated segments of ASCII letters, digits, '_' and '-'.
/// Letters keep their case because auto-tile art keys are upper-case.
pub(crate) fn validate_frame_key(key: &str) -> Result<(), FrameKeyError> {
    if key.is_empty() {
        return Err(FrameKeyError::Empty);
    }
    if key.starts_with('/') || key.ends_with('/') {
        return Err(FrameKeyError::DanglingSeparator);
    }
    if key.contains("//") {
        return Err(FrameKeyError::EmptySegment);
    }
    for ch in key.chars() {
        if ch.is_ascii_alphanumeric() || matches!(ch, '_' | '/' | '-') {
            continue;
        }
        return Err(FrameKeyError::InvalidCharacter { character: ch });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::validate_frame_key;

    #[test]
    fn accepts_valid_keys() {
        for key in ["player/idle_right", "land/ABCDE", "land/X", "palm/small-fg"] {
            assert!(validate_frame_key(key).is_ok(), "key={key}");
        }
    }

    #[test]
    fn rejects_invalid_keys() {
        for key in ["", "/a", "a/", "a//b", r"a\b", "a.b", "land/A B"] {
            assert!(validate_frame_key(key).is_err(), "key={key}");
        }
    }
}
