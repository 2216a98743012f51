//! @acp:module "Cell Coercion"
//! @acp:summary "Lenient deserializers for interview cells"
//! @acp:domain subsidy
//! @acp:layer model
//!
//! Interview records come from hand-filled spreadsheets. A cell may hold a
//! number where text is expected, text where a number is expected, or
//! nothing at all. These helpers never fail on a cell value: malformed
//! integers become `0`, missing text becomes `""`.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Cell {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Other(IgnoredAny),
}

/// Deserialize any cell as text
pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Cell::deserialize(deserializer)? {
        Cell::Text(s) => s,
        Cell::Int(n) => n.to_string(),
        Cell::Float(f) => f.to_string(),
        Cell::Bool(b) => b.to_string(),
        Cell::Other(_) => String::new(),
    })
}

/// Deserialize any cell as an integer, defaulting to zero
pub fn int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Cell::deserialize(deserializer)? {
        Cell::Int(n) => n,
        Cell::Float(f) => truncate(f),
        Cell::Text(s) => parse_int(&s),
        Cell::Bool(b) => i64::from(b),
        Cell::Other(_) => 0,
    })
}

/// Deserialize any cell by truthiness
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Cell::deserialize(deserializer)? {
        Cell::Bool(b) => b,
        Cell::Int(n) => n != 0,
        Cell::Float(f) => f != 0.0,
        Cell::Text(s) => !s.is_empty(),
        Cell::Other(_) => false,
    })
}

/// Parse integer text such as `"1,200,000"` or `" 35.0 "`; anything else is zero
pub fn parse_int(raw: &str) -> i64 {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '，')
        .collect();

    if let Ok(n) = cleaned.parse::<i64>() {
        return n;
    }
    cleaned.parse::<f64>().map(truncate).unwrap_or(0)
}

fn truncate(f: f64) -> i64 {
    if f.is_finite() {
        f.trunc() as i64
    } else {
        0
    }
}
