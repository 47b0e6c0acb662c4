//! Literal nodes and their canonical text.

use std::fmt;

use super::element::{SqlElement, SqlWriter};
use super::tree::NodeId;
use crate::constants::MAX_STRING_LENGTH;
use crate::error::{QueryError, Result};

/// A leading `+` or `-`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sign {
    Plus,
    Minus,
}

impl Sign {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plus => "+",
            Self::Minus => "-",
        }
    }
}

/// Splits `text` into the digits before and after an optional single `.`.
fn split_decimal(text: &str) -> Option<(&str, &str)> {
    let (integer, fraction) = text.split_once('.').unwrap_or((text, ""));
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if integer.is_empty() && fraction.is_empty() {
        return None;
    }
    (all_digits(integer) && all_digits(fraction)).then_some((integer, fraction))
}

/// An exact numeric literal such as `42` or `1.5`.
///
/// The text is canonical: a bare leading or trailing decimal point gets a
/// `0` on that side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactNumericLiteral {
    text: String,
}

impl ExactNumericLiteral {
    /// Canonicalises `text`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Construction`] if `text` is not a decimal number.
    pub fn new(text: &str) -> Result<Self> {
        let (integer, fraction) = split_decimal(text)
            .ok_or_else(|| QueryError::construction(format!("'{text}' is not an exact numeric")))?;
        let text = if text.contains('.') {
            format!(
                "{}.{}",
                if integer.is_empty() { "0" } else { integer },
                if fraction.is_empty() { "0" } else { fraction }
            )
        } else {
            String::from(integer)
        };
        Ok(Self { text })
    }

    /// An integer literal.
    #[must_use]
    pub fn from_integer(value: u64) -> Self {
        Self {
            text: value.to_string(),
        }
    }

    /// The canonical text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The value, if the literal is an integer that fits in a `u64`.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        self.text.parse().ok()
    }
}

impl SqlElement for ExactNumericLiteral {
    fn children(&self) -> Vec<NodeId> {
        Vec::new()
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        Vec::new()
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.text(&self.text);
    }
}

/// An approximate numeric literal, kept in normalised scientific notation:
/// one non-zero leading digit, at least one fraction digit, an uppercase `E`
/// and an exponent signed only when negative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApproximateNumericLiteral {
    text: String,
}

impl ApproximateNumericLiteral {
    /// Normalises `text`, e.g. `1234e-15` becomes `1.234E-12`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Construction`] if `text` is not a number with an
    /// exponent, or the exponent is out of range.
    pub fn new(text: &str) -> Result<Self> {
        let invalid = || QueryError::construction(format!("'{text}' is not an approximate numeric"));
        let (mantissa, exponent) = text.split_once(['e', 'E']).ok_or_else(invalid)?;
        let (integer, fraction) = split_decimal(mantissa).ok_or_else(invalid)?;
        let unsigned = exponent.strip_prefix(['+', '-']).unwrap_or(exponent);
        if unsigned.is_empty() || !unsigned.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let exponent: i64 = exponent.parse().map_err(|_| invalid())?;

        let digits: String = integer.chars().chain(fraction.chars()).collect();
        let significant = digits.trim_start_matches('0');
        if significant.is_empty() {
            return Ok(Self {
                text: String::from("0.0E0"),
            });
        }
        let skipped = digits.len() - significant.len();
        let shift = i64::try_from(integer.len())
            .ok()
            .and_then(|len| len.checked_sub(i64::try_from(skipped).ok()?))
            .and_then(|len| len.checked_sub(1))
            .ok_or_else(invalid)?;
        let exponent = exponent.checked_add(shift).ok_or_else(invalid)?;

        let (lead, rest) = significant.split_at(1);
        let rest = rest.trim_end_matches('0');
        let rest = if rest.is_empty() { "0" } else { rest };
        Ok(Self {
            text: format!("{lead}.{rest}E{exponent}"),
        })
    }

    /// The canonical text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl SqlElement for ApproximateNumericLiteral {
    fn children(&self) -> Vec<NodeId> {
        Vec::new()
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        Vec::new()
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.text(&self.text);
    }
}

/// A single-quoted string. `value` holds the unescaped text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterStringLiteral {
    value: String,
}

impl CharacterStringLiteral {
    /// # Errors
    ///
    /// Returns [`QueryError::Construction`] if `value` is longer than
    /// [`MAX_STRING_LENGTH`] characters.
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        let length = value.chars().count();
        if length > MAX_STRING_LENGTH {
            return Err(QueryError::construction(format!(
                "String literal of {length} characters exceeds the maximum of {MAX_STRING_LENGTH}"
            )));
        }
        Ok(Self { value })
    }

    /// The unescaped value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl SqlElement for CharacterStringLiteral {
    fn children(&self) -> Vec<NodeId> {
        Vec::new()
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        Vec::new()
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        if !w.quotes() {
            w.text(&self.value);
            return;
        }
        w.char('\'');
        w.text(&self.value.replace('\'', "''"));
        w.char('\'');
    }

    fn has_quotes(&self) -> bool {
        true
    }
}

/// A string or interval literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneralLiteral {
    pub inner: NodeId,
}

impl SqlElement for GeneralLiteral {
    fn children(&self) -> Vec<NodeId> {
        vec![self.inner]
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        vec![&mut self.inner]
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.node(self.inner);
    }
}

/// Units accepted after `INTERVAL n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntervalUnit {
    Microsecond,
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl IntervalUnit {
    const ALL: [Self; 9] = [
        Self::Microsecond,
        Self::Second,
        Self::Minute,
        Self::Hour,
        Self::Day,
        Self::Week,
        Self::Month,
        Self::Quarter,
        Self::Year,
    ];

    /// Looks up a unit by name (case-insensitive).
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|unit| unit.as_str().eq_ignore_ascii_case(s))
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Microsecond => "MICROSECOND",
            Self::Second => "SECOND",
            Self::Minute => "MINUTE",
            Self::Hour => "HOUR",
            Self::Day => "DAY",
            Self::Week => "WEEK",
            Self::Month => "MONTH",
            Self::Quarter => "QUARTER",
            Self::Year => "YEAR",
        }
    }
}

impl fmt::Display for IntervalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `INTERVAL <signed literal> <unit>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalLiteral {
    /// A [`SignedLiteral`].
    pub value: NodeId,
    pub unit: IntervalUnit,
}

impl SqlElement for IntervalLiteral {
    fn children(&self) -> Vec<NodeId> {
        vec![self.value]
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        vec![&mut self.value]
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.text("INTERVAL ");
        w.node(self.value);
        w.char(' ');
        w.text(self.unit.as_str());
    }
}

/// An optionally signed numeric literal, or a general literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedLiteral {
    sign: Option<Sign>,
    numeric: Option<NodeId>,
    general: Option<NodeId>,
}

impl SignedLiteral {
    /// # Errors
    ///
    /// Returns [`QueryError::Construction`] unless exactly one of `numeric`
    /// and `general` is given.
    pub fn new(sign: Option<Sign>, numeric: Option<NodeId>, general: Option<NodeId>) -> Result<Self> {
        match (numeric, general) {
            (Some(_), None) | (None, Some(_)) => Ok(Self {
                sign,
                numeric,
                general,
            }),
            (Some(_), Some(_)) => Err(QueryError::construction(
                "a signed literal cannot be both numeric and general",
            )),
            (None, None) => Err(QueryError::construction(
                "a signed literal needs a numeric or a general value",
            )),
        }
    }

    #[must_use]
    pub const fn sign(&self) -> Option<Sign> {
        self.sign
    }

    /// The unsigned numeric value, if any.
    #[must_use]
    pub const fn numeric(&self) -> Option<NodeId> {
        self.numeric
    }

    /// The general literal, if any.
    #[must_use]
    pub const fn general(&self) -> Option<NodeId> {
        self.general
    }
}

impl SqlElement for SignedLiteral {
    fn children(&self) -> Vec<NodeId> {
        self.numeric.into_iter().chain(self.general).collect()
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        self.numeric.iter_mut().chain(self.general.iter_mut()).collect()
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        if let Some(sign) = self.sign {
            w.text(sign.as_str());
        }
        for child in self.children() {
            w.node(child);
        }
    }
}

/// `TRUE` or `FALSE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanLiteral {
    pub value: bool,
}

impl SqlElement for BooleanLiteral {
    fn children(&self) -> Vec<NodeId> {
        Vec::new()
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        Vec::new()
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.text(if self.value { "TRUE" } else { "FALSE" });
    }
}

/// Any literal without a sign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedLiteral {
    pub inner: NodeId,
}

impl SqlElement for UnsignedLiteral {
    fn children(&self) -> Vec<NodeId> {
        vec![self.inner]
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        vec![&mut self.inner]
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.node(self.inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Tree;

    fn approximate(text: &str) -> String {
        ApproximateNumericLiteral::new(text).unwrap().as_str().to_string()
    }

    #[test]
    fn test_exact_numeric_canonical_text() {
        assert_eq!(ExactNumericLiteral::new("123").unwrap().as_str(), "123");
        assert_eq!(ExactNumericLiteral::new("123.").unwrap().as_str(), "123.0");
        assert_eq!(ExactNumericLiteral::new(".123").unwrap().as_str(), "0.123");
        assert_eq!(ExactNumericLiteral::new("1.50").unwrap().as_str(), "1.50");
        assert!(ExactNumericLiteral::new(".").is_err());
        assert!(ExactNumericLiteral::new("1.2.3").is_err());
        assert!(ExactNumericLiteral::new("12a").is_err());
    }

    #[test]
    fn test_approximate_numeric_normalisation() {
        assert_eq!(approximate("123.4e123"), "1.234E125");
        assert_eq!(approximate("1.3456e+15"), "1.3456E15");
        assert_eq!(approximate("1.3456e-15"), "1.3456E-15");
        assert_eq!(approximate("1234e-15"), "1.234E-12");
        assert_eq!(approximate("1e10"), "1.0E10");
        assert_eq!(approximate(".00120E3"), "1.2E0");
        assert_eq!(approximate("0.0e5"), "0.0E0");
    }

    #[test]
    fn test_approximate_numeric_rejects_garbage() {
        assert!(ApproximateNumericLiteral::new("12").is_err());
        assert!(ApproximateNumericLiteral::new("1e").is_err());
        assert!(ApproximateNumericLiteral::new("1e+").is_err());
        assert!(ApproximateNumericLiteral::new("1e99999999999999999999").is_err());
    }

    #[test]
    fn test_string_literal_length_limit() {
        assert!(CharacterStringLiteral::new("x".repeat(MAX_STRING_LENGTH)).is_ok());
        let err = CharacterStringLiteral::new("x".repeat(MAX_STRING_LENGTH + 1)).unwrap_err();
        assert!(matches!(err, QueryError::Construction(_)));
    }

    #[test]
    fn test_string_literal_escapes_quotes() {
        let mut tree = Tree::new();
        let id = tree.push(CharacterStringLiteral::new("it's").unwrap());
        assert_eq!(tree.to_sql(id), "'it''s'");
        assert_eq!(tree.to_sql_without_quotes(id), "it's");
    }

    #[test]
    fn test_signed_literal_needs_exactly_one_value() {
        let mut tree = Tree::new();
        let numeric = tree.push(ExactNumericLiteral::from_integer(3));
        let string = tree.push(CharacterStringLiteral::new("a").unwrap());
        let general = tree.push(GeneralLiteral { inner: string });

        assert!(matches!(
            SignedLiteral::new(None, Some(numeric), Some(general)),
            Err(QueryError::Construction(_))
        ));
        assert!(matches!(
            SignedLiteral::new(Some(Sign::Minus), None, None),
            Err(QueryError::Construction(_))
        ));

        let signed = SignedLiteral::new(Some(Sign::Minus), Some(numeric), None).unwrap();
        let signed = tree.add(signed).unwrap();
        assert_eq!(tree.to_sql(signed), "-3");
    }

    #[test]
    fn test_interval_unit_lookup() {
        assert_eq!(IntervalUnit::from_str("month"), Some(IntervalUnit::Month));
        assert_eq!(IntervalUnit::from_str("FORTNIGHT"), None);
    }
}
