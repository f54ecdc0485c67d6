//! Field formats and value normalization.
//!
//! A format is written as a compact string: `long/short` lists accepted words,
//! `#.##` describes a number with two decimals (`#.##%` additionally accepts a
//! percentage such as `10%`), and `any` accepts a single free-form word.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

const NUMERIC_CHARS: [char; 3] = ['#', '.', '%'];
const FREE_TEXT: &str = "any";

/// Problems with a format string or a field schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("format string is empty")]
    Empty,
    #[error("format `{0}` lists no options")]
    NoOptions(String),
    #[error("field `{0}` is defined twice")]
    DuplicateField(String),
}

/// Field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Accepted shape of one field's value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatSpec {
    /// One of a fixed set of words, matched case-insensitively.
    Enumeration(Vec<String>),
    /// A number rounded to `decimal_places`; `allows_percentage` accepts `N%` as `N / 100`.
    Numeric {
        decimal_places: usize,
        allows_percentage: bool,
    },
    /// Any single token.
    FreeText,
}

impl FromStr for FormatSpec {
    type Err = FormatError;

    fn from_str(format: &str) -> Result<Self, Self::Err> {
        let format = format.trim();
        if format.is_empty() {
            return Err(FormatError::Empty);
        }
        if format.eq_ignore_ascii_case(FREE_TEXT) {
            return Ok(FormatSpec::FreeText);
        }
        if format.chars().all(|ch| NUMERIC_CHARS.contains(&ch)) {
            let (body, allows_percentage) = match format.strip_suffix('%') {
                Some(body) => (body, true),
                None => (format, false),
            };
            let decimal_places = body
                .split_once('.')
                .map(|(_, decimals)| decimals.chars().count())
                .unwrap_or(0);
            return Ok(FormatSpec::Numeric {
                decimal_places,
                allows_percentage,
            });
        }

        let options: Vec<String> = format
            .split('/')
            .map(|option| option.trim().to_lowercase())
            .filter(|option| !option.is_empty())
            .collect();
        if options.is_empty() {
            Err(FormatError::NoOptions(format.to_string()))
        } else {
            Ok(FormatSpec::Enumeration(options))
        }
    }
}

impl fmt::Display for FormatSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatSpec::Enumeration(options) => write!(f, "{}", options.join("/")),
            FormatSpec::Numeric {
                decimal_places,
                allows_percentage,
            } => {
                f.write_str("#")?;
                if *decimal_places > 0 {
                    write!(f, ".{}", "#".repeat(*decimal_places))?;
                }
                if *allows_percentage {
                    f.write_str("%")?;
                }
                Ok(())
            }
            FormatSpec::FreeText => f.write_str(FREE_TEXT),
        }
    }
}

impl FormatSpec {
    /// Whether the free-token pass may try this format by trial.
    ///
    /// Numbers are excluded: a bare `10` is too ambiguous to place without an
    /// explicit key or a `%` suffix.
    pub fn auto_assignable(&self) -> bool {
        !matches!(self, FormatSpec::Numeric { .. })
    }

    pub fn allows_percentage(&self) -> bool {
        matches!(
            self,
            FormatSpec::Numeric {
                allows_percentage: true,
                ..
            }
        )
    }

    /// True when `literal` is one of the listed words of an enumeration.
    pub fn lists(&self, literal: &str) -> bool {
        match self {
            FormatSpec::Enumeration(options) => options
                .iter()
                .any(|option| option.eq_ignore_ascii_case(literal)),
            _ => false,
        }
    }

    /// Human-readable description of accepted input, used in feedback.
    pub fn describe(&self) -> String {
        match self {
            FormatSpec::Enumeration(options) => format!("one of {}", options.join("/")),
            FormatSpec::Numeric {
                decimal_places,
                allows_percentage,
            } => {
                let example = format!("{:.*}", decimal_places, 1.5);
                let base = if *decimal_places == 0 {
                    "a whole number (e.g. 2)".to_string()
                } else {
                    format!("a number with {decimal_places} decimals (e.g. {example})")
                };
                if *allows_percentage {
                    format!("{base} or a percentage (e.g. 10%)")
                } else {
                    base
                }
            }
            FormatSpec::FreeText => "any single word".to_string(),
        }
    }

    /// Normalizes `raw` against this format.
    ///
    /// Commas are read as decimal points and a leading `.` gains a `0`.
    /// Numbers come back with exactly the configured decimals, enumerations
    /// come back as the listed word.
    pub fn validate(&self, raw: &str) -> Result<String, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(self.invalid());
        }
        let mut normalized = trimmed.replace(',', ".");
        if normalized.starts_with('.') {
            normalized.insert(0, '0');
        }

        match self {
            FormatSpec::Numeric {
                decimal_places,
                allows_percentage,
            } => {
                let (digits, scale) = match normalized.strip_suffix('%') {
                    Some(digits) if *allows_percentage => (digits, 100.0),
                    _ => (normalized.as_str(), 1.0),
                };
                let value = digits
                    .parse::<f64>()
                    .ok()
                    .filter(|value| value.is_finite())
                    .ok_or_else(|| self.invalid())?;
                Ok(format!("{:.*}", decimal_places, value / scale))
            }
            FormatSpec::Enumeration(options) => options
                .iter()
                .find(|option| option.eq_ignore_ascii_case(&normalized))
                .cloned()
                .ok_or_else(|| self.invalid()),
            FormatSpec::FreeText => {
                if trimmed.split_whitespace().count() == 1 {
                    Ok(trimmed.to_string())
                } else {
                    Err(self.invalid())
                }
            }
        }
    }

    fn invalid(&self) -> ValidationError {
        ValidationError::new(format!("Expected {}", self.describe()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(format: &str) -> FormatSpec {
        format.parse().expect("valid format")
    }

    #[test]
    fn numeric_formats_count_decimals_and_percent() {
        for (format, decimals, percent) in [
            ("#", 0, false),
            ("#.##", 2, false),
            ("#.####%", 4, true),
            ("#.########", 8, false),
            ("#%", 0, true),
        ] {
            assert_eq!(
                spec(format),
                FormatSpec::Numeric {
                    decimal_places: decimals,
                    allows_percentage: percent
                },
                "format {format}"
            );
            assert_eq!(spec(format).to_string(), format);
        }
    }

    #[test]
    fn enumeration_and_free_text_formats() {
        assert_eq!(
            spec("Long/Short"),
            FormatSpec::Enumeration(vec!["long".into(), "short".into()])
        );
        assert_eq!(spec("any"), FormatSpec::FreeText);
        assert!(spec("long/short").auto_assignable());
        assert!(spec("any").auto_assignable());
        assert!(!spec("#.##").auto_assignable());
    }

    #[test]
    fn malformed_formats_are_rejected() {
        assert_eq!("".parse::<FormatSpec>(), Err(FormatError::Empty));
        assert_eq!(
            "//".parse::<FormatSpec>(),
            Err(FormatError::NoOptions("//".into()))
        );
    }

    #[test]
    fn numbers_are_normalized() {
        let money = spec("#.##");
        assert_eq!(money.validate("1,5").unwrap(), "1.50");
        assert_eq!(money.validate(".5").unwrap(), "0.50");
        assert_eq!(money.validate("2.346").unwrap(), "2.35");
        assert_eq!(money.validate("150").unwrap(), "150.00");
        assert!(money.validate("10%").is_err());
        assert!(money.validate("abc").is_err());
        assert!(money.validate("nan").is_err());
        assert!(money.validate("inf").is_err());
    }

    #[test]
    fn percentages_are_divided_by_one_hundred() {
        let ratio = spec("#.##%");
        assert_eq!(ratio.validate("10%").unwrap(), "0.10");
        assert_eq!(ratio.validate("0.25").unwrap(), "0.25");
        assert_eq!(spec("#.####%").validate("2,5%").unwrap(), "0.0250");
    }

    #[test]
    fn enumerations_match_case_insensitively() {
        let side = spec("long/short");
        assert_eq!(side.validate("SHORT").unwrap(), "short");
        let err = side.validate("flat").unwrap_err();
        assert_eq!(err.message, "Expected one of long/short");
    }

    #[test]
    fn free_text_takes_one_word() {
        let any = spec("any");
        assert_eq!(any.validate("EURUSD").unwrap(), "EURUSD");
        assert!(any.validate("two words").is_err());
        assert!(any.validate("  ").is_err());
    }
}
