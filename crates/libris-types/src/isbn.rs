//! Structural ISBN validation.
//!
//! An ISBN is accepted when it has the hyphenated ISBN-13 shape
//! `PPP-G-R-I-C`:
//! - `PPP` is the `978` or `979` prefix
//! - `G` (registration group) is 1 to 5 digits
//! - `R` (registrant) is 1 to 7 digits
//! - `I` (publication) is 1 to 7 digits
//! - `C` (check digit) is exactly one digit
//!
//! Only the shape is checked. The check digit is not verified.

use crate::error::RecordError;

/// A well-formed ISBN shown to users who enter a malformed one.
pub const ISBN_EXAMPLE: &str = "978-0-123456-78-9";

/// Accepted EAN prefixes.
const PREFIXES: &[&str] = &["978", "979"];

/// Inclusive digit-count bounds for the four groups after the prefix.
const GROUP_BOUNDS: [(usize, usize); 4] = [(1, 5), (1, 7), (1, 7), (1, 1)];

/// Returns `true` if `isbn` has the structural ISBN shape.
///
/// # Examples
///
/// ```
/// use libris_types::isbn::is_valid_isbn;
///
/// assert!(is_valid_isbn("978-0-123456-78-9"));
/// assert!(!is_valid_isbn("invalid_isbn"));
/// assert!(!is_valid_isbn("977-0-123456-78-9"));
/// ```
pub fn is_valid_isbn(isbn: &str) -> bool {
    let mut groups = isbn.split('-');

    match groups.next() {
        Some(prefix) if PREFIXES.contains(&prefix) => {}
        _ => return false,
    }

    for (min, max) in GROUP_BOUNDS {
        match groups.next() {
            Some(group)
                if (min..=max).contains(&group.len())
                    && group.bytes().all(|b| b.is_ascii_digit()) => {}
            _ => return false,
        }
    }

    groups.next().is_none()
}

/// Validate an ISBN, returning `InvalidFormat` with [`ISBN_EXAMPLE`] attached
/// when the shape is wrong.
pub fn validate_isbn(isbn: &str) -> Result<(), RecordError> {
    if is_valid_isbn(isbn) {
        Ok(())
    } else {
        Err(RecordError::InvalidFormat {
            field: "ISBN",
            value: isbn.to_string(),
            example: ISBN_EXAMPLE,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn accepts_example() {
        assert!(is_valid_isbn(ISBN_EXAMPLE));
        assert!(validate_isbn(ISBN_EXAMPLE).is_ok());
    }

    #[test]
    fn accepts_979_prefix() {
        assert!(is_valid_isbn("979-12-3456-7890-1"));
    }

    #[test]
    fn accepts_group_bounds() {
        assert!(is_valid_isbn("978-1-1-1-1"));
        assert!(is_valid_isbn("978-12345-1234567-1234567-1"));
    }

    #[test]
    fn rejects_free_text() {
        let err = validate_isbn("invalid_isbn").unwrap_err();
        assert_eq!(err.example(), Some(ISBN_EXAMPLE));
    }

    #[test]
    fn rejects_wrong_prefix() {
        assert!(!is_valid_isbn("977-0-123456-78-9"));
        assert!(!is_valid_isbn("97-0-123456-78-9"));
    }

    #[test]
    fn rejects_oversized_groups() {
        assert!(!is_valid_isbn("978-123456-1-1-1"));
        assert!(!is_valid_isbn("978-1-12345678-1-1"));
        assert!(!is_valid_isbn("978-1-1-12345678-1"));
        assert!(!is_valid_isbn("978-1-1-1-12"));
    }

    #[test]
    fn rejects_wrong_group_count() {
        assert!(!is_valid_isbn("978-0-123456-78"));
        assert!(!is_valid_isbn("978-0-123456-78-9-1"));
        assert!(!is_valid_isbn("9780123456789"));
    }

    #[test]
    fn rejects_empty_groups_and_non_digits() {
        assert!(!is_valid_isbn("978--123456-78-9"));
        assert!(!is_valid_isbn("978-0-12a456-78-9"));
        assert!(!is_valid_isbn("978-0-123456-78-X"));
        assert!(!is_valid_isbn(""));
    }

    #[test]
    fn rejects_surrounding_whitespace() {
        // Callers trim before validating.
        assert!(!is_valid_isbn(" 978-0-123456-78-9"));
        assert!(!is_valid_isbn("978-0-123456-78-9\n"));
    }

    proptest! {
        #[test]
        fn well_formed_groups_are_accepted(
            prefix in prop::sample::select(vec!["978", "979"]),
            group in "[0-9]{1,5}",
            registrant in "[0-9]{1,7}",
            publication in "[0-9]{1,7}",
            check in "[0-9]",
        ) {
            let isbn = format!("{prefix}-{group}-{registrant}-{publication}-{check}");
            prop_assert!(is_valid_isbn(&isbn));
        }

        #[test]
        fn strings_without_hyphens_are_rejected(s in "[^-]*") {
            prop_assert!(!is_valid_isbn(&s));
        }
    }
}
