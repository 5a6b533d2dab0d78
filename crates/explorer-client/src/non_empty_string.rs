// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Non-empty string validation
//!
//! [`NonEmptyString`] is used for explorer configuration values such as the
//! base URL and API key, where an empty value would only surface later as a
//! confusing request failure.

use std::{fmt, str::FromStr};

/// A string guaranteed to contain at least one non-whitespace character
///
/// ```rust
/// use explorer_client::NonEmptyString;
///
/// let key = NonEmptyString::new("YourApiKeyToken").unwrap();
/// assert_eq!(key.as_str(), "YourApiKeyToken");
///
/// assert!(NonEmptyString::new("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyString(Box<str>);

impl NonEmptyString {
    /// Validate and wrap a string
    ///
    /// Leading and trailing whitespace is kept; only blank input is rejected.
    pub fn new(s: impl Into<String>) -> Result<Self, String> {
        let s = s.into();
        if s.trim().is_empty() {
            Err("String cannot be empty or whitespace-only".to_string())
        } else {
            Ok(NonEmptyString(s.into_boxed_str()))
        }
    }

    /// Borrow the contained value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NonEmptyString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NonEmptyString {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for NonEmptyString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_input() {
        assert!(NonEmptyString::new("").is_err());
        assert!(NonEmptyString::new(" \t\n").is_err());
    }

    #[test]
    fn keeps_surrounding_whitespace() {
        let value = NonEmptyString::new(" key ").unwrap();
        assert_eq!(value.as_str(), " key ");
        assert_eq!(value.to_string(), " key ");
    }

    #[test]
    fn parses_from_str() {
        let value: NonEmptyString = "https://api.bscscan.com/api".parse().unwrap();
        assert_eq!(value.as_ref(), "https://api.bscscan.com/api");
        assert!("".parse::<NonEmptyString>().is_err());
    }
}
