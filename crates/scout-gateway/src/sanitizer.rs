/// Input sanitizer for user questions: strips control characters and bounds
/// length before anything reaches a search provider or the model.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    max_message_length: usize,
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self {
            max_message_length: 100_000,
        }
    }
}

impl Sanitizer {
    /// Sanitizer accepting messages up to `max_message_length` bytes.
    pub fn new(max_message_length: usize) -> Self {
        Self { max_message_length }
    }

    /// Configured length limit.
    pub fn max_message_length(&self) -> usize {
        self.max_message_length
    }

    /// Strip control characters (newlines and tabs survive) and enforce the
    /// length limit, counted in bytes.
    pub fn sanitize(&self, input: &str) -> SanitizeResult {
        if input.len() > self.max_message_length {
            return SanitizeResult::Rejected("Message exceeds maximum length".to_string());
        }

        let cleaned: String = input
            .chars()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\t' || *c == '\r')
            .collect();

        if cleaned.trim().is_empty() && !input.trim().is_empty() {
            return SanitizeResult::Rejected("Message contains only control characters".to_string());
        }

        if cleaned != input {
            SanitizeResult::Cleaned(cleaned)
        } else {
            SanitizeResult::Clean(cleaned)
        }
    }
}

/// Outcome of [`Sanitizer::sanitize`].
#[derive(Debug, PartialEq)]
pub enum SanitizeResult {
    /// Input was already clean.
    Clean(String),
    /// Control characters were removed.
    Cleaned(String),
    /// Input was rejected entirely; carries the reason.
    Rejected(String),
}

impl SanitizeResult {
    /// Whether the input was refused.
    pub fn is_rejected(&self) -> bool {
        matches!(self, SanitizeResult::Rejected(_))
    }

    /// The usable text, or the rejection reason.
    pub fn into_result(self) -> Result<String, String> {
        match self {
            SanitizeResult::Clean(s) | SanitizeResult::Cleaned(s) => Ok(s),
            SanitizeResult::Rejected(reason) => Err(reason),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_input_passes() {
        let s = Sanitizer::default();
        assert_eq!(
            s.sanitize("What is Bitcoin?\nAnd Ethereum?"),
            SanitizeResult::Clean("What is Bitcoin?\nAnd Ethereum?".into())
        );
    }

    #[test]
    fn test_control_chars_stripped() {
        let s = Sanitizer::default();
        let result = s.sanitize("price\u{0}of\u{7} eth");
        assert_eq!(result, SanitizeResult::Cleaned("priceof eth".into()));
    }

    #[test]
    fn test_only_control_chars_rejected() {
        let s = Sanitizer::default();
        assert!(s.sanitize("\u{1}\u{2}\u{3}").is_rejected());
    }

    #[test]
    fn test_length_limit() {
        let s = Sanitizer::new(10);
        assert!(s.sanitize("0123456789").into_result().is_ok());
        let err = s.sanitize("0123456789a").into_result().unwrap_err();
        assert!(err.contains("maximum length"));
    }
}
