//! Field-path validation for registry configuration
//!
//! Every failed rule is kept, so one pass over a config file reports all of
//! its problems. Sections and list items extend the path, giving locations
//! such as `bootstrap.fcc_ids[2].fcc_id`.

use std::fmt;

/// Outcome of a validation pass
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A failed rule, located by field path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Empty string where a value is required
    Empty {
        /// Field path
        field: String,
    },
    /// Number below its minimum
    TooSmall {
        /// Field path
        field: String,
        /// Inclusive minimum
        min: u64,
        /// Supplied value
        actual: u64,
    },
    /// Number above its maximum
    TooLarge {
        /// Field path
        field: String,
        /// Inclusive maximum
        max: u64,
        /// Supplied value
        actual: u64,
    },
    /// Value outside an enumerated set
    NotOneOf {
        /// Field path
        field: String,
        /// Accepted values
        expected: Vec<String>,
        /// Supplied value
        actual: String,
    },
    /// Rule-specific failure
    Rule {
        /// Field path
        field: String,
        /// What the rule requires
        message: String,
    },
}

impl ValidationError {
    /// Path of the offending field
    pub fn field(&self) -> &str {
        match self {
            Self::Empty { field }
            | Self::TooSmall { field, .. }
            | Self::TooLarge { field, .. }
            | Self::NotOneOf { field, .. }
            | Self::Rule { field, .. } => field,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{field}: must not be empty"),
            Self::TooSmall { field, min, actual } => {
                write!(f, "{field}: must be at least {min}, got {actual}")
            }
            Self::TooLarge { field, max, actual } => {
                write!(f, "{field}: must be at most {max}, got {actual}")
            }
            Self::NotOneOf {
                field,
                expected,
                actual,
            } => write!(
                f,
                "{field}: expected one of [{}], got '{actual}'",
                expected.join(", ")
            ),
            Self::Rule { field, message } => write!(f, "{field}: {message}"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Collects rule failures under a field path
#[derive(Debug, Default)]
pub struct ConfigValidator {
    path: String,
    errors: Vec<ValidationError>,
}

impl ConfigValidator {
    /// Validator rooted at the top of the document
    pub fn new() -> Self {
        Self::default()
    }

    /// Require a non-empty string
    pub fn non_empty(&mut self, field: &str, value: &str) -> &mut Self {
        if value.is_empty() {
            let field = self.path_of(field);
            self.errors.push(ValidationError::Empty { field });
        }
        self
    }

    /// Require `value >= min`
    pub fn at_least(&mut self, field: &str, value: u64, min: u64) -> &mut Self {
        if value < min {
            let field = self.path_of(field);
            self.errors.push(ValidationError::TooSmall {
                field,
                min,
                actual: value,
            });
        }
        self
    }

    /// Require `value <= max`
    pub fn at_most(&mut self, field: &str, value: u64, max: u64) -> &mut Self {
        if value > max {
            let field = self.path_of(field);
            self.errors.push(ValidationError::TooLarge {
                field,
                max,
                actual: value,
            });
        }
        self
    }

    /// Require one of a fixed set of strings
    pub fn one_of(&mut self, field: &str, value: &str, choices: &[&str]) -> &mut Self {
        if !choices.contains(&value) {
            let field = self.path_of(field);
            self.errors.push(ValidationError::NotOneOf {
                field,
                expected: choices.iter().map(|choice| choice.to_string()).collect(),
                actual: value.to_string(),
            });
        }
        self
    }

    /// Record `message` against `field` unless `holds`
    pub fn check(&mut self, field: &str, holds: bool, message: &str) -> &mut Self {
        if !holds {
            let field = self.path_of(field);
            self.errors.push(ValidationError::Rule {
                field,
                message: message.to_string(),
            });
        }
        self
    }

    /// Validate a nested table under `field`
    pub fn section<F>(&mut self, field: &str, rules: F) -> &mut Self
    where
        F: FnOnce(&mut ConfigValidator),
    {
        let mut nested = self.child(field.to_string());
        rules(&mut nested);
        self.errors.append(&mut nested.errors);
        self
    }

    /// Validate every element of an array under `field[index]`
    pub fn each<T, F>(&mut self, field: &str, items: &[T], mut rules: F) -> &mut Self
    where
        F: FnMut(&mut ConfigValidator, &T),
    {
        for (index, item) in items.iter().enumerate() {
            let mut nested = self.child(format!("{field}[{index}]"));
            rules(&mut nested, item);
            self.errors.append(&mut nested.errors);
        }
        self
    }

    /// Collected failures, if any
    pub fn finish(self) -> ValidationResult {
        match self.errors.is_empty() {
            true => Ok(()),
            false => Err(self.errors),
        }
    }

    fn child(&self, segment: String) -> Self {
        Self {
            path: self.path_of(&segment),
            errors: Vec::new(),
        }
    }

    fn path_of(&self, field: &str) -> String {
        match self.path.as_str() {
            "" => field.to_string(),
            parent => format!("{parent}.{field}"),
        }
    }
}
