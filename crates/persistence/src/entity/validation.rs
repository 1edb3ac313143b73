//! Entity validation.
//!
//! Entities report constraint violations through [`Entity::validate`], usually
//! built with the fluent [`Validator`]. The repository and user store call
//! [`ensure_valid`] before any write.

use std::fmt::Display;
use std::sync::LazyLock;

use regex::Regex;

use super::Entity;
use crate::error::{StorageResult, ValidationDetail, ValidationError};

const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";

static EMAIL_REGEX: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(EMAIL_PATTERN));

/// Collects validation details for one entity.
///
/// # Examples
///
/// ```
/// use storefront_persistence::entity::Validator;
///
/// let details = Validator::new()
///     .required("name", "")
///     .email("email", "not-an-email")
///     .range("price", -1.0, 0.0, 1_000.0)
///     .finish();
///
/// assert_eq!(details.len(), 3);
/// ```
#[derive(Debug, Default)]
pub struct Validator {
    details: Vec<ValidationDetail>,
}

impl Validator {
    /// Creates an empty validator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires a non-blank string.
    pub fn required(self, field: &str, value: &str) -> Self {
        self.check(field, !value.trim().is_empty(), "is required")
    }

    /// Requires at least `min` characters.
    pub fn min_length(self, field: &str, value: &str, min: usize) -> Self {
        let ok = value.chars().count() >= min;
        self.check(field, ok, format!("must be at least {} characters", min))
    }

    /// Allows at most `max` characters.
    pub fn max_length(self, field: &str, value: &str, max: usize) -> Self {
        let ok = value.chars().count() <= max;
        self.check(field, ok, format!("must be at most {} characters", max))
    }

    /// Requires a well-formed email address. Blank values are left to
    /// [`required`](Self::required).
    pub fn email(self, field: &str, value: &str) -> Self {
        if value.trim().is_empty() {
            return self;
        }
        match EMAIL_REGEX.as_ref() {
            Ok(re) => self.check(field, re.is_match(value), "is not a valid email address"),
            Err(e) => self.check(field, false, format!("could not be checked: {}", e)),
        }
    }

    /// Requires `min <= value <= max`.
    pub fn range<T: PartialOrd + Display>(self, field: &str, value: T, min: T, max: T) -> Self {
        let ok = value >= min && value <= max;
        self.check(field, ok, format!("must be between {} and {}", min, max))
    }

    /// Records `message` against `field` unless `condition` holds.
    pub fn check(mut self, field: &str, condition: bool, message: impl Into<String>) -> Self {
        if !condition {
            self.details.push(ValidationDetail::new(field, message));
        }
        self
    }

    /// Returns the collected details.
    pub fn finish(self) -> Vec<ValidationDetail> {
        self.details
    }
}

/// Fails with [`ValidationError::InvalidEntity`] when the entity reports any
/// detail.
pub fn ensure_valid<E: Entity>(entity: &E) -> StorageResult<()> {
    let details = entity.validate();
    if details.is_empty() {
        return Ok(());
    }

    let message = details
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    tracing::debug!(entity = E::ENTITY_NAME, %message, "entity failed validation");

    Err(ValidationError::InvalidEntity {
        entity: E::ENTITY_NAME.to_string(),
        message,
        details,
    }
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_and_length() {
        let details = Validator::new()
            .required("name", "   ")
            .min_length("password", "abc", 6)
            .max_length("code", "abcdef", 4)
            .finish();
        let paths: Vec<_> = details.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["name", "password", "code"]);
    }

    #[test]
    fn test_email_format() {
        assert!(Validator::new().email("email", "a@b.io").finish().is_empty());
        assert!(Validator::new().email("email", "").finish().is_empty());
        assert_eq!(Validator::new().email("email", "a@b").finish().len(), 1);
        assert_eq!(Validator::new().email("email", "a b@c.io").finish().len(), 1);
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        assert!(Validator::new().range("qty", 1, 1, 10).finish().is_empty());
        assert!(Validator::new().range("qty", 10, 1, 10).finish().is_empty());
        let details = Validator::new().range("qty", 11, 1, 10).finish();
        assert_eq!(details[0].message, "must be between 1 and 10");
    }
}
