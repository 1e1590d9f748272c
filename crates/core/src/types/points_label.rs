//! Points label types.
//!
//! Each business names its points currency ("Stars", "Beans", "Punches").
//! The full label appears in running text; the short label fits on badges.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a points label.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PointsLabelError {
    /// The label is shorter than the minimum.
    #[error("must be at least {min} characters")]
    TooShort {
        /// Minimum allowed length.
        min: usize,
    },
    /// The label is longer than the maximum.
    #[error("must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// The full points label for a business.
///
/// ## Constraints
///
/// - Leading and trailing whitespace is trimmed
/// - Length: 2-48 characters (counted as Unicode scalar values)
///
/// ## Examples
///
/// ```
/// use loyalty_core::PointsLabel;
///
/// assert!(PointsLabel::parse("Stars").is_ok());
/// assert!(PointsLabel::parse("S").is_err());
/// assert!(PointsLabel::parse(&"x".repeat(49)).is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PointsLabel(String);

impl PointsLabel {
    /// Minimum label length.
    pub const MIN_LENGTH: usize = 2;
    /// Maximum label length.
    pub const MAX_LENGTH: usize = 48;

    /// Parse a `PointsLabel` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is outside 2-48 characters.
    pub fn parse(s: &str) -> Result<Self, PointsLabelError> {
        let trimmed = s.trim();
        let len = trimmed.chars().count();

        if len < Self::MIN_LENGTH {
            return Err(PointsLabelError::TooShort {
                min: Self::MIN_LENGTH,
            });
        }
        if len > Self::MAX_LENGTH {
            return Err(PointsLabelError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the label as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the label and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PointsLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The abbreviated points label, at most 12 characters.
///
/// An empty (or all-whitespace) input means "no short label".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PointsLabelShort(String);

impl PointsLabelShort {
    /// Maximum short label length.
    pub const MAX_LENGTH: usize = 12;

    /// Parse an optional short label.
    ///
    /// Returns `Ok(None)` for blank input.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is longer than 12 characters.
    pub fn parse(s: &str) -> Result<Option<Self>, PointsLabelError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        if trimmed.chars().count() > Self::MAX_LENGTH {
            return Err(PointsLabelError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Some(Self(trimmed.to_owned())))
    }

    /// Returns the label as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the label and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PointsLabelShort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_points_label_boundaries() {
        assert!(matches!(
            PointsLabel::parse("a"),
            Err(PointsLabelError::TooShort { min: 2 })
        ));
        assert!(PointsLabel::parse("ab").is_ok());
        assert!(PointsLabel::parse(&"a".repeat(48)).is_ok());
        assert!(matches!(
            PointsLabel::parse(&"a".repeat(49)),
            Err(PointsLabelError::TooLong { max: 48 })
        ));
    }

    #[test]
    fn test_points_label_trims() {
        let label = PointsLabel::parse("  Stars ").unwrap();
        assert_eq!(label.as_str(), "Stars");

        // Whitespace does not count toward the minimum
        assert!(PointsLabel::parse(" a ").is_err());
    }

    #[test]
    fn test_points_label_counts_characters_not_bytes() {
        // 24 two-byte characters = 48 bytes but 24 characters
        assert!(PointsLabel::parse(&"é".repeat(24)).is_ok());
        assert!(PointsLabel::parse(&"é".repeat(48)).is_ok());
        assert!(PointsLabel::parse(&"é".repeat(49)).is_err());
    }

    #[test]
    fn test_short_label() {
        assert_eq!(PointsLabelShort::parse("").unwrap(), None);
        assert_eq!(PointsLabelShort::parse("   ").unwrap(), None);
        assert_eq!(
            PointsLabelShort::parse(" pts ").unwrap().unwrap().as_str(),
            "pts"
        );
        assert!(PointsLabelShort::parse(&"a".repeat(12)).is_ok());
        assert!(PointsLabelShort::parse(&"a".repeat(13)).is_err());
    }
}
