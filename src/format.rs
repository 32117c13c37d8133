//! Number formatting for totals, segment values, and percentages.
//!
//! The chart's `fmt` field accepts a printf conversion (`"%.2f"`, `"%'d"`)
//! or a brace placeholder (`"{:.2f}"`, `"{:,.0f}"`), each with optional
//! literal text around it (`"{:.1f} mm²"`).

use crate::error::ChartError;
use num_format::{Locale, ToFormattedString};

/// Largest accepted field width or precision.
const MAX_FIELD: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Fixed,
    Integer,
    Exp,
    General,
    /// Brace-style `%`: value * 100 followed by a percent sign.
    Percent,
    Display,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Spec {
    grouping: bool,
    plus: bool,
    zero_pad: bool,
    width: Option<usize>,
    precision: Option<usize>,
    kind: Kind,
}

/// A parsed `fmt` string with exactly one numeric placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberFormat {
    prefix: String,
    spec: Spec,
    suffix: String,
}

impl NumberFormat {
    pub fn parse(text: &str) -> Result<Self, ChartError> {
        let bad = || ChartError::InvalidFormat(text.to_string());
        if let Some(start) = find_unescaped(text, '{') {
            let end = text[start..].find('}').ok_or_else(bad)? + start;
            let inner = &text[start + 1..end];
            let spec_text = match inner.split_once(':') {
                Some(("" | "0", spec)) => spec,
                None if inner.is_empty() || inner == "0" => "",
                _ => return Err(bad()),
            };
            let spec = parse_spec(spec_text, true).ok_or_else(bad)?;
            Ok(Self {
                prefix: unescape(&text[..start], '{'),
                spec,
                suffix: unescape(&text[end + 1..], '}'),
            })
        } else if let Some(start) = find_unescaped(text, '%') {
            let rest = &text[start + 1..];
            let conv = rest
                .find(|c: char| c.is_ascii_alphabetic())
                .ok_or_else(bad)?;
            let spec = parse_spec(&rest[..=conv], false).ok_or_else(bad)?;
            Ok(Self {
                prefix: unescape(&text[..start], '%'),
                spec,
                suffix: unescape(&rest[conv + 1..], '%'),
            })
        } else {
            Err(bad())
        }
    }

    pub fn format(&self, value: f64) -> String {
        let body = format_number(&self.spec, value);
        format!("{}{}{}", self.prefix, body, self.suffix)
    }
}

/// Share of `value` in `reference_total`, in percent: one decimal below 10,
/// rounded to an integer from 10 on.
pub fn percent_label(value: f64, reference_total: f64) -> String {
    let pct = value / reference_total * 100.0;
    if pct < 10.0 {
        format!("{pct:.1}")
    } else {
        format!("{pct:.0}")
    }
}

/// First occurrence of `c` that is not doubled (`{{`, `%%`).
fn find_unescaped(text: &str, c: char) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == c as u8 {
            if bytes.get(i + 1) == Some(&(c as u8)) {
                i += 2;
                continue;
            }
            return Some(i);
        }
        i += 1;
    }
    None
}

fn unescape(text: &str, c: char) -> String {
    let doubled: String = [c, c].iter().collect();
    let mut out = text.replace(&doubled, &c.to_string());
    if c == '{' {
        out = out.replace("}}", "}");
    }
    out
}

/// Parse the part after `%` (printf) or after `:` (brace).
fn parse_spec(text: &str, brace: bool) -> Option<Spec> {
    let mut chars = text.chars().peekable();
    let mut spec = Spec {
        grouping: false,
        plus: false,
        zero_pad: false,
        width: None,
        precision: None,
        kind: Kind::Display,
    };

    while let Some(&c) = chars.peek() {
        match c {
            '+' => spec.plus = true,
            '0' => spec.zero_pad = true,
            '\'' | ',' => spec.grouping = true,
            '-' | ' ' | '#' => {}
            _ => break,
        }
        chars.next();
    }

    let mut width = String::new();
    while let Some(&c) = chars.peek() {
        if !c.is_ascii_digit() {
            break;
        }
        width.push(c);
        chars.next();
    }
    if !width.is_empty() {
        spec.width = Some(width.parse().ok().filter(|w| *w <= MAX_FIELD)?);
    }
    if chars.peek() == Some(&',') {
        spec.grouping = true;
        chars.next();
    }

    if chars.peek() == Some(&'.') {
        chars.next();
        let mut prec = String::new();
        while let Some(&c) = chars.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            prec.push(c);
            chars.next();
        }
        let prec = if prec.is_empty() { Some(0) } else { prec.parse().ok() };
        spec.precision = Some(prec.filter(|p| *p <= MAX_FIELD)?);
    }

    spec.kind = match chars.next() {
        None if brace => Kind::Display,
        Some('f' | 'F') => Kind::Fixed,
        Some('d' | 'i' | 'u') => Kind::Integer,
        Some('e' | 'E') => Kind::Exp,
        Some('g' | 'G') => Kind::General,
        Some('%') if brace => Kind::Percent,
        Some('s') if !brace => Kind::Display,
        _ => return None,
    };
    if chars.next().is_some() {
        return None;
    }
    Some(spec)
}

fn format_number(spec: &Spec, value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let magnitude = value.abs();
    let mut digits = match spec.kind {
        Kind::Fixed => format!("{:.*}", spec.precision.unwrap_or(6), magnitude),
        Kind::Integer => format!("{:.0}", magnitude.trunc()),
        Kind::Exp => c_exponent(magnitude, spec.precision.unwrap_or(6)),
        Kind::General => general(magnitude, spec.precision.unwrap_or(6)),
        Kind::Percent => format!("{:.*}%", spec.precision.unwrap_or(6), magnitude * 100.0),
        Kind::Display => match spec.precision {
            Some(p) => format!("{:.*}", p, magnitude),
            None => float_repr(magnitude),
        },
    };
    if spec.grouping {
        digits = group_thousands(&digits);
    }

    let sign = if value.is_sign_negative() && digits.chars().any(|c| matches!(c, '1'..='9')) {
        "-"
    } else if spec.plus {
        "+"
    } else {
        ""
    };

    let len = sign.len() + digits.chars().count();
    match spec.width {
        Some(w) if w > len && spec.zero_pad => {
            format!("{sign}{}{digits}", "0".repeat(w - len))
        }
        Some(w) if w > len => format!("{}{sign}{digits}", " ".repeat(w - len)),
        _ => format!("{sign}{digits}"),
    }
}

/// Shortest round-trip text that always shows a decimal point or exponent
/// (`3.0`, `0.1`, `1e+16`).
fn float_repr(magnitude: f64) -> String {
    let s = format!("{magnitude:?}");
    match s.split_once('e') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exp.abs())
        }
        None => s,
    }
}

/// `1.5e3` -> `1.50e+03`, matching C's `%e`.
fn c_exponent(magnitude: f64, precision: usize) -> String {
    let s = format!("{:.*e}", precision, magnitude);
    match s.split_once('e') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exp.abs())
        }
        None => s,
    }
}

/// C `%g`: shortest of fixed/exponent with `precision` significant digits,
/// trailing zeros removed.
fn general(magnitude: f64, precision: usize) -> String {
    let p = precision.max(1);
    if magnitude == 0.0 {
        return "0".to_string();
    }
    // Exponent after rounding to `p` digits, so 999999.5 counts as 1e+06.
    let exp = format!("{:.*e}", p - 1, magnitude)
        .split_once('e')
        .and_then(|(_, e)| e.parse::<i32>().ok())
        .unwrap_or(0);
    let trim = |s: String| -> String {
        if s.contains('.') {
            s.trim_end_matches('0').trim_end_matches('.').to_string()
        } else {
            s
        }
    };
    if exp < -4 || exp >= p as i32 {
        let s = c_exponent(magnitude, p - 1);
        match s.split_once('e') {
            Some((m, e)) => format!("{}e{}", trim(m.to_string()), e),
            None => s,
        }
    } else {
        let decimals = (p as i32 - 1 - exp).max(0) as usize;
        trim(format!("{:.*}", decimals, magnitude))
    }
}

/// Insert `,` separators into the integer part of an unsigned decimal string.
fn group_thousands(digits: &str) -> String {
    let split = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let (int_part, rest) = digits.split_at(split);
    match int_part.parse::<u64>() {
        Ok(n) => format!("{}{}", n.to_formatted_string(&Locale::en), rest),
        Err(_) => digits.to_string(),
    }
}
