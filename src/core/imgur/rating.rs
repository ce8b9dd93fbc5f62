// Content ratings for Imgur posts.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// How explicit a post is. Ordered from least to most explicit so filters can
/// compare with `<=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rating {
    Safe,
    Questionable,
    Explicit,
}

/// Tags that push a post out of `Safe` without making it `Explicit`.
const QUESTIONABLE_TAGS: &[&str] = &["suggestive", "lewd", "ecchi", "mature"];

impl Rating {
    /// Classify a post from Imgur's `nsfw` flag and its tag names.
    pub fn classify<S: AsRef<str>>(nsfw: bool, tags: &[S]) -> Self {
        let has_tag = |wanted: &str| tags.iter().any(|t| t.as_ref().eq_ignore_ascii_case(wanted));

        if nsfw || has_tag("nsfw") {
            Rating::Explicit
        } else if QUESTIONABLE_TAGS.iter().any(|tag| has_tag(tag)) {
            Rating::Questionable
        } else {
            Rating::Safe
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Safe => "safe",
            Rating::Questionable => "questionable",
            Rating::Explicit => "explicit",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown rating `{0}` (expected safe, questionable or explicit)")]
pub struct ParseRatingError(pub String);

impl FromStr for Rating {
    type Err = ParseRatingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s" | "safe" => Ok(Rating::Safe),
            "q" | "questionable" => Ok(Rating::Questionable),
            "e" | "explicit" => Ok(Rating::Explicit),
            _ => Err(ParseRatingError(s.to_string())),
        }
    }
}
