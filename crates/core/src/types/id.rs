//! Human-readable entity IDs.
//!
//! Businesses, customers and customer classes are identified by short codes
//! that people read aloud and type by hand: a fixed prefix followed by a
//! fixed-width, zero-padded random number.
//!
//! | Type | Format | Example |
//! |------|--------|---------|
//! | [`BusinessId`] | `BIZ####` | `BIZ0042` |
//! | [`CustomerId`] | `BC####` | `BC9001` |
//! | [`ClassId`] | `CLASS######` | `CLASS000317` |
//!
//! Uniqueness is checked against a set of IDs already in use. The check is
//! not atomic with the later insert, so the database also carries a unique
//! constraint on every code column.

use std::collections::HashSet;

use rand::Rng;

/// Number of candidates tried before giving up.
pub const MAX_ATTEMPTS: usize = 10;

/// Errors that can occur when generating or parsing an ID.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    /// Every candidate collided with an existing ID.
    #[error("could not generate a unique {prefix} id after {attempts} attempts")]
    Exhausted {
        /// Prefix of the ID space that was exhausted.
        prefix: &'static str,
        /// Number of candidates that were tried.
        attempts: usize,
    },
    /// The input does not match the expected format.
    #[error("invalid {kind} id: {value:?}")]
    InvalidFormat {
        /// Human name of the ID kind.
        kind: &'static str,
        /// The rejected input.
        value: String,
    },
}

/// Shape of a prefixed numeric ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdFormat {
    prefix: &'static str,
    digits: u32,
}

impl IdFormat {
    /// Create a format with the given prefix and number of digits.
    #[must_use]
    pub const fn new(prefix: &'static str, digits: u32) -> Self {
        Self { prefix, digits }
    }

    /// The fixed prefix.
    #[must_use]
    pub const fn prefix(&self) -> &'static str {
        self.prefix
    }

    /// Width of the numeric suffix.
    #[must_use]
    pub const fn digits(&self) -> u32 {
        self.digits
    }

    /// Total number of distinct IDs in this format.
    #[must_use]
    pub const fn space(&self) -> u64 {
        10_u64.pow(self.digits)
    }

    /// Render the ID with the given numeric value.
    #[must_use]
    pub fn render(&self, value: u64) -> String {
        format!(
            "{}{:0width$}",
            self.prefix,
            value,
            width = self.digits as usize
        )
    }

    /// Draw one random candidate. No uniqueness check.
    pub fn candidate<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        self.render(rng.random_range(0..self.space()))
    }

    /// Whether `s` is the prefix followed by exactly `digits` ASCII digits.
    #[must_use]
    pub fn is_valid_format(&self, s: &str) -> bool {
        s.strip_prefix(self.prefix).is_some_and(|rest| {
            rest.len() == self.digits as usize && rest.bytes().all(|b| b.is_ascii_digit())
        })
    }

    /// The leading prefix-length slice of `s`.
    ///
    /// Inputs shorter than the prefix are returned whole.
    #[must_use]
    pub fn prefix_of<'a>(&self, s: &'a str) -> &'a str {
        s.get(..self.prefix.len()).unwrap_or(s)
    }

    /// Everything after the prefix-length slice of `s`.
    ///
    /// Inputs shorter than the prefix yield an empty string.
    #[must_use]
    pub fn numeric_part<'a>(&self, s: &'a str) -> &'a str {
        s.get(self.prefix.len()..).unwrap_or("")
    }

    /// Generate an ID that is not in `existing`.
    ///
    /// Tries up to [`MAX_ATTEMPTS`] random candidates.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::Exhausted`] if every candidate collided.
    pub fn generate_unique<R: Rng + ?Sized>(
        &self,
        existing: &HashSet<String>,
        rng: &mut R,
    ) -> Result<String, IdError> {
        for _ in 0..MAX_ATTEMPTS {
            let candidate = self.candidate(rng);
            if !existing.contains(&candidate) {
                return Ok(candidate);
            }
        }

        Err(IdError::Exhausted {
            prefix: self.prefix,
            attempts: MAX_ATTEMPTS,
        })
    }
}

/// Macro to define a type-safe, human-readable ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - A `FORMAT` constant describing prefix and width
/// - `generate()`, `generate_unique()`, `parse()` and `is_valid_format()`
/// - `Serialize`/`Deserialize` (deserialization validates the format)
/// - `Display`, `FromStr`, `AsRef<str>`
/// - `sqlx` `Type`, `Encode`, and `Decode` implementations (with `postgres` feature)
///
/// # Example
///
/// ```rust
/// # use loyalty_core::BusinessId;
/// let mut rng = rand::rng();
/// let id = BusinessId::generate(&mut rng);
/// assert!(BusinessId::is_valid_format(id.as_str()));
/// ```
#[macro_export]
macro_rules! define_code {
    ($(#[$meta:meta])* $name:ident, $prefix:literal, $digits:literal, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[derive(::serde::Serialize, ::serde::Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Prefix and width of this ID kind.
            pub const FORMAT: $crate::types::id::IdFormat =
                $crate::types::id::IdFormat::new($prefix, $digits);

            /// Generate a random ID without a uniqueness check.
            pub fn generate<R: $crate::rand::Rng + ?Sized>(rng: &mut R) -> Self {
                Self(Self::FORMAT.candidate(rng))
            }

            /// Generate an ID that does not appear in `existing`.
            ///
            /// # Errors
            ///
            /// Returns `IdError::Exhausted` after the attempt budget is spent.
            pub fn generate_unique<R: $crate::rand::Rng + ?Sized>(
                existing: &::std::collections::HashSet<String>,
                rng: &mut R,
            ) -> Result<Self, $crate::types::id::IdError> {
                Self::FORMAT.generate_unique(existing, rng).map(Self)
            }

            /// Parse and validate an ID.
            ///
            /// # Errors
            ///
            /// Returns `IdError::InvalidFormat` if `s` does not match the format.
            pub fn parse(s: &str) -> Result<Self, $crate::types::id::IdError> {
                if Self::is_valid_format(s) {
                    Ok(Self(s.to_owned()))
                } else {
                    Err($crate::types::id::IdError::InvalidFormat {
                        kind: $kind,
                        value: s.to_owned(),
                    })
                }
            }

            /// Whether `s` matches this ID format.
            #[must_use]
            pub fn is_valid_format(s: &str) -> bool {
                Self::FORMAT.is_valid_format(s)
            }

            /// Returns the ID as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns the digits after the prefix.
            #[must_use]
            pub fn numeric_part(&self) -> &str {
                Self::FORMAT.numeric_part(&self.0)
            }

            /// Consumes the ID and returns its inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::types::id::IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::types::id::IdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <String as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <String as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for $name {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
                let s = <String as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
                Ok(Self::parse(&s)?)
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <String as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

define_code!(
    /// Business identifier, `BIZ` followed by 4 digits.
    BusinessId,
    "BIZ",
    4,
    "business"
);
define_code!(
    /// Customer identifier, `BC` followed by 4 digits.
    CustomerId,
    "BC",
    4,
    "customer"
);
define_code!(
    /// Customer class identifier, `CLASS` followed by 6 digits.
    ///
    /// Unique within one business, not globally.
    ClassId,
    "CLASS",
    6,
    "class"
);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use regex::Regex;

    use super::*;

    #[test]
    fn test_generated_ids_match_patterns() {
        let business = Regex::new(r"^BIZ\d{4}$").unwrap();
        let customer = Regex::new(r"^BC\d{4}$").unwrap();
        let class = Regex::new(r"^CLASS\d{6}$").unwrap();

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            assert!(business.is_match(BusinessId::generate(&mut rng).as_str()));
            assert!(customer.is_match(CustomerId::generate(&mut rng).as_str()));
            assert!(class.is_match(ClassId::generate(&mut rng).as_str()));
        }
    }

    #[test]
    fn test_generated_ids_satisfy_is_valid_format() {
        let mut rng = rand::rng();
        for _ in 0..200 {
            let id = BusinessId::generate(&mut rng);
            assert!(BusinessId::is_valid_format(id.as_str()));
            let id = CustomerId::generate(&mut rng);
            assert!(CustomerId::is_valid_format(id.as_str()));
            let id = ClassId::generate(&mut rng);
            assert!(ClassId::is_valid_format(id.as_str()));
        }
    }

    #[test]
    fn test_render_zero_pads() {
        assert_eq!(BusinessId::FORMAT.render(7), "BIZ0007");
        assert_eq!(ClassId::FORMAT.render(42), "CLASS000042");
    }

    #[test]
    fn test_is_valid_format_rejects_malformed() {
        assert!(BusinessId::is_valid_format("BIZ0001"));
        assert!(!BusinessId::is_valid_format("BIZ001"));
        assert!(!BusinessId::is_valid_format("BIZ00001"));
        assert!(!BusinessId::is_valid_format("biz0001"));
        assert!(!BusinessId::is_valid_format("BIZ00a1"));
        assert!(!BusinessId::is_valid_format("BC0001"));
        assert!(!CustomerId::is_valid_format("BIZ0001"));
        assert!(!ClassId::is_valid_format("CLASS12345"));
        assert!(!ClassId::is_valid_format(""));
    }

    #[test]
    fn test_prefix_and_numeric_part() {
        let format = ClassId::FORMAT;
        assert_eq!(format.prefix_of("CLASS000123"), "CLASS");
        assert_eq!(format.numeric_part("CLASS000123"), "000123");

        // Shorter than the prefix: no panic
        assert_eq!(format.prefix_of("CL"), "CL");
        assert_eq!(format.numeric_part("CL"), "");
    }

    #[test]
    fn test_parse_and_display() {
        let id: CustomerId = "BC1234".parse().unwrap();
        assert_eq!(id.to_string(), "BC1234");
        assert_eq!(id.numeric_part(), "1234");

        let err = CustomerId::parse("BC12").unwrap_err();
        assert!(matches!(err, IdError::InvalidFormat { kind: "customer", .. }));
    }

    #[test]
    fn test_serde_validates() {
        let id: BusinessId = serde_json::from_str("\"BIZ0420\"").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"BIZ0420\"");

        assert!(serde_json::from_str::<BusinessId>("\"BIZ42\"").is_err());
    }

    #[test]
    fn test_generate_unique_skips_existing() {
        let format = IdFormat::new("T", 1);
        let existing: HashSet<String> = (0..10)
            .filter(|n| *n != 7)
            .map(|n| format.render(n))
            .collect();

        let mut rng = StdRng::seed_from_u64(42);
        match format.generate_unique(&existing, &mut rng) {
            Ok(id) => assert_eq!(id, "T7"),
            Err(e) => assert_eq!(
                e,
                IdError::Exhausted {
                    prefix: "T",
                    attempts: MAX_ATTEMPTS
                }
            ),
        }
    }

    #[test]
    fn test_generate_unique_is_deterministic_when_seeded() {
        let existing: HashSet<String> = (0..9_999).map(|n| BusinessId::FORMAT.render(n)).collect();

        let first = BusinessId::generate_unique(&existing, &mut StdRng::seed_from_u64(99));
        let second = BusinessId::generate_unique(&existing, &mut StdRng::seed_from_u64(99));
        assert_eq!(first, second);

        match first {
            Ok(id) => assert_eq!(id.as_str(), "BIZ9999"),
            Err(e) => assert!(matches!(e, IdError::Exhausted { prefix: "BIZ", .. })),
        }
    }

    #[test]
    fn test_generate_unique_exhausts_when_space_is_full() {
        let format = IdFormat::new("X", 1);
        let existing: HashSet<String> = (0..10).map(|n| format.render(n)).collect();

        let err = format
            .generate_unique(&existing, &mut StdRng::seed_from_u64(1))
            .unwrap_err();
        assert_eq!(
            err,
            IdError::Exhausted {
                prefix: "X",
                attempts: 10
            }
        );
    }

    #[test]
    fn test_generate_unique_with_empty_set() {
        let id = ClassId::generate_unique(&HashSet::new(), &mut rand::rng()).unwrap();
        assert!(ClassId::is_valid_format(id.as_str()));
    }
}
