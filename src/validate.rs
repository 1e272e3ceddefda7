use std::sync::OnceLock;

use regex::Regex;

use crate::constants::SERIAL_NUMBER_PATTERN;

/// Outcome of checking scanned text against the serial number format.
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum Validation {
    Accepted,
    Rejected,
}

impl Validation {
    pub fn is_accepted(self) -> bool {
        self == Validation::Accepted
    }
}

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(SERIAL_NUMBER_PATTERN).expect("serial number pattern is valid"))
}

/// Classifies `text` against the fixed serial number pattern: the literal
/// prefix `01BB2-` followed by exactly five decimal digits, anchored
/// start-to-end. Pure and deterministic; never fails.
pub fn validate(text: &str) -> Validation {
    if pattern().is_match(text) {
        Validation::Accepted
    } else {
        Validation::Rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_serial_is_accepted() {
        assert_eq!(validate("01BB2-12345"), Validation::Accepted);
        assert_eq!(validate("01BB2-00042"), Validation::Accepted);
    }

    #[test]
    fn prefix_case_is_significant() {
        assert_eq!(validate("01bb2-12345"), Validation::Rejected);
    }

    #[test]
    fn digit_count_must_be_exact() {
        assert_eq!(validate("01BB2-1234"), Validation::Rejected);
        assert_eq!(validate("01BB2-123456"), Validation::Rejected);
    }

    #[test]
    fn match_is_anchored() {
        assert_eq!(validate("x01BB2-12345"), Validation::Rejected);
        assert_eq!(validate("01BB2-12345 "), Validation::Rejected);
        assert_eq!(validate("01BB2-"), Validation::Rejected);
    }

    #[test]
    fn empty_text_is_rejected() {
        assert_eq!(validate(""), Validation::Rejected);
    }
}
