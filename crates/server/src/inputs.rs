//! Explicit request schemas for the POST bodies and path identifiers.
//!
//! Clients transmit `movieId` and `rating` inconsistently as JSON numbers
//! or strings; both are accepted and coerced to integers here. Anything
//! non-numeric is a hard `BadRequest`, never a silently-empty filter.

use serde::Deserialize;

/// An integer that may arrive as a number or as its string form.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LooseInt {
    Int(i64),
    Float(f64),
    Text(String),
}

impl LooseInt {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            LooseInt::Int(n) => Some(*n),
            // integral, finite, and inside i64 range; the upper bound is
            // exclusive because i64::MAX as f64 rounds up to 2^63
            LooseInt::Float(f)
                if f.fract() == 0.0
                    && f.is_finite()
                    && *f >= i64::MIN as f64
                    && *f < i64::MAX as f64 =>
            {
                Some(*f as i64)
            }
            LooseInt::Float(_) => None,
            LooseInt::Text(s) => s.trim().parse::<i64>().ok(),
        }
    }
}

/// Path segment form of a movie identifier.
pub fn parse_movie_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewBody {
    pub username: String,
    pub movie_id: LooseInt,
    #[serde(default)]
    pub content: String,
    pub rating: LooseInt,
    #[serde(default)]
    pub timestamp: String,
}

#[derive(Debug, Deserialize)]
pub struct CredentialsBody {
    pub username: String,
    pub password: String,
}
