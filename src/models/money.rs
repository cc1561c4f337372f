//! Exact money arithmetic in satang (1/100 of a baht).
//!
//! The payment gateway reports amounts both as decimal baht strings
//! ("19.00") and as raw satang ("1901" in `amount_check`). Everything inside
//! this service is an i64 satang value; decimal strings only exist at the
//! boundary.

use serde::{Deserialize, Serialize};

/// Amount of money in satang
pub type Satang = i64;

/// Parse a decimal baht string ("19.00", "19.5", "19") into satang.
///
/// Rejects negative values, more than two fraction digits, and anything
/// that is not a plain decimal number. No floating point is involved.
pub fn parse_baht(s: &str) -> Result<Satang, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty amount".to_string());
    }
    if s.starts_with('-') {
        return Err(format!("negative amount: {}", s));
    }

    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };

    if whole.is_empty() && frac.is_empty() {
        return Err(format!("invalid amount: {}", s));
    }
    if frac.len() > 2 {
        return Err(format!("too many fraction digits: {}", s));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("invalid amount: {}", s));
    }

    let whole: i64 = if whole.is_empty() {
        0
    } else {
        whole
            .parse()
            .map_err(|_| format!("amount out of range: {}", s))?
    };

    let frac_satang: i64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<i64>().map_err(|_| "bad fraction".to_string())? * 10,
        _ => frac.parse::<i64>().map_err(|_| "bad fraction".to_string())?,
    };

    whole
        .checked_mul(100)
        .and_then(|w| w.checked_add(frac_satang))
        .ok_or_else(|| format!("amount out of range: {}", s))
}

/// Parse a raw satang string ("1901") as reported in `amount_check`
pub fn parse_satang(s: &str) -> Result<Satang, String> {
    let s = s.trim();
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("invalid satang amount: {}", s));
    }
    s.parse().map_err(|_| format!("satang out of range: {}", s))
}

/// Format satang as a decimal baht string ("1901" -> "19.01")
pub fn format_baht(satang: Satang) -> String {
    format!("{}.{:02}", satang / 100, (satang % 100).abs())
}

/// Round satang up to the next whole baht
pub fn ceil_to_baht(satang: Satang) -> Satang {
    if satang <= 0 {
        return 0;
    }
    ((satang + 99) / 100) * 100
}

/// JSON amounts arrive either as a number or a string depending on the
/// gateway endpoint; accept both.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BahtAmount {
    Text(String),
    Number(i64),
}

impl BahtAmount {
    /// Convert to satang. Integer JSON numbers are whole baht.
    pub fn to_satang(&self) -> Result<Satang, String> {
        match self {
            BahtAmount::Text(s) => parse_baht(s),
            BahtAmount::Number(n) => n
                .checked_mul(100)
                .ok_or_else(|| format!("amount out of range: {}", n)),
        }
    }
}

/// Convert a loosely-typed JSON amount (string, integer, or float baht)
/// into satang. Floats only appear in supplier catalog prices; they are
/// rounded to the nearest satang.
pub fn value_to_satang(value: &serde_json::Value) -> Result<Satang, String> {
    match value {
        serde_json::Value::String(s) => parse_baht(s),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                if i < 0 {
                    return Err(format!("negative amount: {}", i));
                }
                i.checked_mul(100)
                    .ok_or_else(|| format!("amount out of range: {}", i))
            } else if let Some(f) = n.as_f64() {
                if !f.is_finite() || f < 0.0 || f > 9e15 {
                    return Err(format!("invalid amount: {}", f));
                }
                Ok((f * 100.0).round() as Satang)
            } else {
                Err(format!("invalid amount: {}", n))
            }
        }
        other => Err(format!("invalid amount: {}", other)),
    }
}
