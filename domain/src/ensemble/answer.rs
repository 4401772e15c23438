//! Answer normalization
//!
//! Every raw candidate string is classified into an [`AnswerForm`]: the
//! textual shape it was written in plus, when it denotes a finite number,
//! its numeric value. Clustering compares values; requirement checks look
//! at the shape (e.g. how many digits follow the decimal separator).

use crate::core::string::collapse_whitespace;
use serde::Serialize;

/// Strings that mean "no answer" and never count as candidates.
const SENTINELS: &[&str] = &[
    "null",
    "none",
    "nan",
    "-nan",
    "undefined",
    "n/a",
    "na",
    "nil",
];

/// Textual shape of a normalized answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerKind {
    /// `42`, `-7`
    Integer,
    /// `3.14159` — a literal decimal with `fraction_digits` after the separator
    Decimal { fraction_digits: usize },
    /// `6.02e23`
    Scientific,
    /// `22/7`
    Fraction,
    /// `pi`, `e`, `tau`
    Constant,
    /// Anything that is not a number
    Text,
    /// Empty, whitespace, `null`/`NaN` and friends, or a non-finite literal
    Sentinel,
}

/// A classified, normalized answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerForm {
    /// Canonical text: compact for numbers, lowercased for text
    pub normalized: String,
    pub kind: AnswerKind,
    /// Finite numeric value, if the answer denotes one
    pub value: Option<f64>,
}

impl AnswerForm {
    /// Classify a raw candidate string.
    pub fn parse(raw: &str) -> Self {
        let text = clean(raw);
        if text.is_empty() {
            return Self::sentinel(text);
        }

        let lowered = collapse_whitespace(&text).to_lowercase();
        if SENTINELS.contains(&lowered.as_str()) {
            return Self::sentinel(lowered);
        }

        let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        let compact = unify_decimal_separator(&compact);

        if let Some(form) = parse_numeric(&compact) {
            return form;
        }

        Self {
            normalized: lowered,
            kind: AnswerKind::Text,
            value: None,
        }
    }

    fn sentinel(normalized: String) -> Self {
        Self {
            normalized,
            kind: AnswerKind::Sentinel,
            value: None,
        }
    }

    /// Passes the hygiene filter.
    pub fn is_usable(&self) -> bool {
        self.kind != AnswerKind::Sentinel
    }

    pub fn is_numeric(&self) -> bool {
        self.value.is_some()
    }

    /// Integer, fraction and named-constant forms denote a value exactly.
    pub fn is_exact(&self) -> bool {
        matches!(
            self.kind,
            AnswerKind::Integer | AnswerKind::Fraction | AnswerKind::Constant
        )
    }

    /// Digits after the decimal separator, for literal decimals only.
    pub fn fraction_digits(&self) -> Option<usize> {
        match self.kind {
            AnswerKind::Decimal { fraction_digits } => Some(fraction_digits),
            _ => None,
        }
    }
}

/// Trim, drop one pair of surrounding quotes, unify minus signs, and strip
/// a trailing full stop and a leading plus.
fn clean(raw: &str) -> String {
    let mut s = raw.trim();
    for quote in ['"', '\'', '`'] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            s = s[1..s.len() - 1].trim();
            break;
        }
    }

    let mut out = s.replace('\u{2212}', "-");
    if out.len() > 1 && out.ends_with('.') {
        out.pop();
    }
    if let Some(rest) = out.strip_prefix('+')
        && rest.starts_with(|c: char| c.is_ascii_digit() || c == '.')
    {
        out = rest.to_string();
    }
    out.trim().to_string()
}

/// A lone comma with no dot is a decimal separator (`3,14` -> `3.14`).
///
/// Exactly three digits after the comma with a non-zero integer part
/// (`1,000`) could be a thousands group, so the text is left untouched.
fn unify_decimal_separator(s: &str) -> String {
    if s.matches(',').count() == 1 && !s.contains('.') {
        let (left, right) = s.split_once(',').unwrap_or((s, ""));
        let left_digits = left.trim_start_matches('-');
        let thousands_group =
            right.len() == 3 && left_digits.chars().any(|c| c != '0');
        if !left_digits.is_empty()
            && left_digits.chars().all(|c| c.is_ascii_digit())
            && !right.is_empty()
            && right.chars().all(|c| c.is_ascii_digit())
            && !thousands_group
        {
            return format!("{}.{}", left, right);
        }
    }
    s.to_string()
}

fn parse_numeric(s: &str) -> Option<AnswerForm> {
    if let Some((kind, value)) = parse_literal(s) {
        return Some(numeric_form(s, kind, value));
    }

    if let Some((num, den)) = s.split_once('/') {
        let (_, n) = parse_literal(num)?;
        let (_, d) = parse_literal(den)?;
        let value = match (n, d) {
            (Some(n), Some(d)) if d != 0.0 => Some(n / d),
            _ => None,
        };
        return Some(numeric_form(s, AnswerKind::Fraction, value));
    }

    let (negative, name) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let constant = match name.to_lowercase().as_str() {
        "pi" | "π" => std::f64::consts::PI,
        "tau" | "τ" => std::f64::consts::TAU,
        "e" => std::f64::consts::E,
        _ => return None,
    };
    let value = if negative { -constant } else { constant };
    Some(AnswerForm {
        normalized: s.to_lowercase(),
        kind: AnswerKind::Constant,
        value: Some(value),
    })
}

/// Build a numeric form; a non-finite or undefined value is a sentinel.
fn numeric_form(s: &str, kind: AnswerKind, value: Option<f64>) -> AnswerForm {
    match value {
        Some(v) if v.is_finite() => AnswerForm {
            normalized: s.to_string(),
            kind,
            value: Some(v),
        },
        _ => AnswerForm::sentinel(s.to_string()),
    }
}

/// Recognize `-?digits[.digits][e[+-]digits]` (also `.5`).
///
/// Returns the shape and the value; the value is `None` when the literal
/// overflows to infinity.
fn parse_literal(s: &str) -> Option<(AnswerKind, Option<f64>)> {
    let body = s.strip_prefix('-').unwrap_or(s);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(pos) => (&body[..pos], Some(&body[pos + 1..])),
        None => (body, None),
    };

    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (mantissa, None),
    };
    let all_digits = |p: &str| p.chars().all(|c| c.is_ascii_digit());
    if !all_digits(int_part) || !frac_part.is_none_or(all_digits) {
        return None;
    }
    if int_part.is_empty() && frac_part.is_none_or(str::is_empty) {
        return None;
    }

    if let Some(exp) = exponent {
        let digits = exp.strip_prefix(['+', '-']).unwrap_or(exp);
        if digits.is_empty() || !all_digits(digits) {
            return None;
        }
    }

    let kind = match (exponent, frac_part) {
        (Some(_), _) => AnswerKind::Scientific,
        (None, Some(frac)) => AnswerKind::Decimal {
            fraction_digits: frac.len(),
        },
        (None, None) => AnswerKind::Integer,
    };
    let value = s.parse::<f64>().ok().filter(|v| v.is_finite());
    Some((kind, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_and_decimal_shapes() {
        let a = AnswerForm::parse("42");
        assert_eq!(a.kind, AnswerKind::Integer);
        assert_eq!(a.value, Some(42.0));

        let b = AnswerForm::parse(" 42.0 ");
        assert_eq!(b.kind, AnswerKind::Decimal { fraction_digits: 1 });
        assert_eq!(b.value, Some(42.0));

        let c = AnswerForm::parse("3.14159");
        assert_eq!(c.fraction_digits(), Some(5));
    }

    #[test]
    fn test_decimal_comma_and_signs() {
        assert_eq!(AnswerForm::parse("3,14").value, Some(3.14));
        assert_eq!(AnswerForm::parse("+7").value, Some(7.0));
        assert_eq!(AnswerForm::parse("\u{2212}2.5").value, Some(-2.5));
        assert_eq!(AnswerForm::parse("42.").kind, AnswerKind::Integer);
        assert_eq!(AnswerForm::parse(".5").value, Some(0.5));
    }

    #[test]
    fn test_quotes_are_stripped() {
        assert_eq!(AnswerForm::parse("\"12\"").value, Some(12.0));
        assert_eq!(AnswerForm::parse("`x = 4`").normalized, "x = 4");
    }

    #[test]
    fn test_fraction_and_constant() {
        let half = AnswerForm::parse("1 / 2");
        assert_eq!(half.kind, AnswerKind::Fraction);
        assert_eq!(half.value, Some(0.5));
        assert!(half.is_exact());

        let pi = AnswerForm::parse("PI");
        assert_eq!(pi.kind, AnswerKind::Constant);
        assert_eq!(pi.value, Some(std::f64::consts::PI));

        assert_eq!(AnswerForm::parse("-e").value, Some(-std::f64::consts::E));
    }

    #[test]
    fn test_scientific() {
        let a = AnswerForm::parse("6.02e23");
        assert_eq!(a.kind, AnswerKind::Scientific);
        assert!(a.is_numeric());
        assert!(AnswerForm::parse("1e").value.is_none());
    }

    #[test]
    fn test_sentinels() {
        for raw in ["", "   ", "null", "NaN", "None", "n/a", "undefined", "1/0", "1e999"] {
            assert!(!AnswerForm::parse(raw).is_usable(), "{raw:?} should be a sentinel");
        }
    }

    #[test]
    fn test_thousands_group_comma_is_not_a_decimal() {
        let grouped = AnswerForm::parse("1,000");
        assert_eq!(grouped.kind, AnswerKind::Text);
        assert_eq!(grouped.value, None);
        assert_eq!(AnswerForm::parse("-12,500").kind, AnswerKind::Text);

        // Leading zero or other digit counts stay decimal
        assert_eq!(AnswerForm::parse("0,125").value, Some(0.125));
        assert_eq!(AnswerForm::parse("1,5").value, Some(1.5));
        assert_eq!(AnswerForm::parse("1,0000").value, Some(1.0));
    }

    #[test]
    fn test_text_is_lowercased_and_collapsed() {
        let a = AnswerForm::parse("  No   Real Solution ");
        assert_eq!(a.kind, AnswerKind::Text);
        assert_eq!(a.normalized, "no real solution");
        assert!(!a.is_numeric());
        // "inf" is text, not a float literal
        assert_eq!(AnswerForm::parse("inf").kind, AnswerKind::Text);
    }
}
