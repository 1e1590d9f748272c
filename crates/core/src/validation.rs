//! Structured validation of request payloads.
//!
//! Handlers collect every problem with a payload before rejecting it, so a
//! client sees all issues in one 400 response instead of fixing them one at a
//! time.

use serde::{Deserialize, Serialize};

/// A single problem with an input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Path of the offending field, e.g. `pointsLabel` or `uids[3]`.
    pub field: String,
    /// Human-readable description of the problem.
    pub message: String,
}

impl ValidationIssue {
    /// Create a new issue.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Accumulates validation issues.
///
/// # Example
///
/// ```
/// use loyalty_core::Validator;
///
/// let mut v = Validator::new();
/// v.check_length("name", "", 1, 100);
/// let issues = v.finish().unwrap_err();
/// assert_eq!(issues[0].field, "name");
/// ```
#[derive(Debug, Default)]
pub struct Validator {
    issues: Vec<ValidationIssue>,
}

impl Validator {
    /// Create an empty validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an issue unconditionally.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.issues.push(ValidationIssue::new(field, message));
    }

    /// Record an issue when `ok` is false. Returns `ok`.
    pub fn check(&mut self, ok: bool, field: impl Into<String>, message: impl Into<String>) -> bool {
        if !ok {
            self.push(field, message);
        }
        ok
    }

    /// Check that `value` has between `min` and `max` characters (inclusive).
    pub fn check_length(&mut self, field: &str, value: &str, min: usize, max: usize) -> bool {
        let len = value.chars().count();
        if len < min {
            self.push(field, format!("must be at least {min} characters"));
            false
        } else if len > max {
            self.push(field, format!("must be at most {max} characters"));
            false
        } else {
            true
        }
    }

    /// Check that a collection has between `min` and `max` items (inclusive).
    pub fn check_count(&mut self, field: &str, count: usize, min: usize, max: usize) -> bool {
        if count < min {
            self.push(field, format!("must contain at least {min} items"));
            false
        } else if count > max {
            self.push(field, format!("must contain at most {max} items"));
            false
        } else {
            true
        }
    }

    /// Check that a number lies in `min..=max`.
    pub fn check_range(&mut self, field: &str, value: i64, min: i64, max: i64) -> bool {
        self.check(
            (min..=max).contains(&value),
            field,
            format!("must be between {min} and {max}"),
        )
    }

    /// Whether no issues have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Finish validation.
    ///
    /// # Errors
    ///
    /// Returns the collected issues if there are any.
    pub fn finish(self) -> Result<(), Vec<ValidationIssue>> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(self.issues)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_validator_passes() {
        assert!(Validator::new().finish().is_ok());
    }

    #[test]
    fn test_length_bounds_are_inclusive() {
        let mut v = Validator::new();
        assert!(v.check_length("a", "xy", 2, 4));
        assert!(v.check_length("b", "wxyz", 2, 4));
        assert!(!v.check_length("c", "x", 2, 4));
        assert!(!v.check_length("d", "vwxyz", 2, 4));

        let issues = v.finish().unwrap_err();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].field, "c");
        assert_eq!(issues[0].message, "must be at least 2 characters");
        assert_eq!(issues[1].field, "d");
        assert_eq!(issues[1].message, "must be at most 4 characters");
    }

    #[test]
    fn test_count_bounds() {
        let mut v = Validator::new();
        assert!(v.check_count("uids", 100, 1, 100));
        assert!(!v.check_count("uids", 101, 1, 100));
        assert!(!v.check_count("uids", 0, 1, 100));
        assert_eq!(v.finish().unwrap_err().len(), 2);
    }

    #[test]
    fn test_range() {
        let mut v = Validator::new();
        assert!(v.check_range("limit", 1, 1, 500));
        assert!(!v.check_range("limit", 501, 1, 500));
        assert!(!v.is_empty());
    }

    #[test]
    fn test_issue_serializes_flat() {
        let issue = ValidationIssue::new("pointsLabel", "must be at least 2 characters");
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "field": "pointsLabel", "message": "must be at least 2 characters" })
        );
    }
}
