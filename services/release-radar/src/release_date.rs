//!
//! src/release_date.rs
//!
//! Parses catalog release dates of year, month or day precision into a
//! comparable calendar date. Text is always read in year-month-day order
//!

use std::{fmt, str::FromStr};

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleasePrecision {
    Year,
    Month,
    Day
}

impl ReleasePrecision {
    pub fn as_str(self) -> &'static str {
        match self {
            ReleasePrecision::Year  => "year",
            ReleasePrecision::Month => "month",
            ReleasePrecision::Day   => "day"
        }
    }

    /// Shape the text must have, `9` stands for any ascii digit
    fn shape(self) -> &'static str {
        match self {
            ReleasePrecision::Year  => "9999",
            ReleasePrecision::Month => "9999-99",
            ReleasePrecision::Day   => "9999-99-99"
        }
    }
}

impl fmt::Display for ReleasePrecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReleasePrecision {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "year"  => Ok(ReleasePrecision::Year),
            "month" => Ok(ReleasePrecision::Month),
            "day"   => Ok(ReleasePrecision::Day),
            other   => Err(DateError::UnsupportedPrecision(other.to_string()))
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    #[error("empty release date")]
    Empty,
    #[error("unsupported release date precision {0:?}")]
    UnsupportedPrecision(String),
    #[error("release date {raw:?} does not match {precision} precision: {cause}")]
    Parse {
        precision: ReleasePrecision,
        raw: String,
        cause: String
    }
}

/// A calendar date together with the precision the catalog declared for it.
///
/// Year precision is anchored at January 1st and month precision at the
/// first of the month, so comparisons treat a coarse date as its earliest day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ReleaseDate {
    pub date: NaiveDate,
    pub precision: ReleasePrecision
}

impl ReleaseDate {
    /// Parse `text` using the textual precision tag the catalog sent with it.
    pub fn parse(text: &str, precision: &str) -> Result<Self, DateError> {
        if text.is_empty() {
            return Err(DateError::Empty);
        }
        Self::parse_with(text, precision.parse()?)
    }

    pub fn parse_with(text: &str, precision: ReleasePrecision) -> Result<Self, DateError> {
        if text.is_empty() {
            return Err(DateError::Empty);
        }

        let mismatch = |cause: String| DateError::Parse {
            precision,
            raw: text.to_string(),
            cause
        };

        if !matches_shape(text, precision.shape()) {
            return Err(mismatch(format!("expected {}", display_shape(precision))));
        }

        let date = match precision {
            ReleasePrecision::Year => {
                let year = text.parse::<i32>().map_err(|e| mismatch(e.to_string()))?;
                NaiveDate::from_ymd_opt(year, 1, 1)
                    .ok_or_else(|| mismatch("year out of range".to_string()))?
            },
            ReleasePrecision::Month => {
                NaiveDate::parse_from_str(&format!("{text}-01"), "%Y-%m-%d")
                    .map_err(|e| mismatch(e.to_string()))?
            },
            ReleasePrecision::Day => {
                NaiveDate::parse_from_str(text, "%Y-%m-%d")
                    .map_err(|e| mismatch(e.to_string()))?
            }
        };

        Ok( ReleaseDate { date, precision } )
    }
}

/// Formats back to the catalog's text form for the declared precision
impl fmt::Display for ReleaseDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.precision {
            ReleasePrecision::Year  => write!(f, "{:04}", self.date.year()),
            ReleasePrecision::Month => write!(f, "{}", self.date.format("%Y-%m")),
            ReleasePrecision::Day   => write!(f, "{}", self.date.format("%Y-%m-%d"))
        }
    }
}

fn matches_shape(text: &str, shape: &str) -> bool {
    text.len() == shape.len()
        && text.bytes().zip(shape.bytes()).all(|(t, s)| match s {
            b'9' => t.is_ascii_digit(),
            _ => t == s
        })
}

fn display_shape(precision: ReleasePrecision) -> &'static str {
    match precision {
        ReleasePrecision::Year  => "YYYY",
        ReleasePrecision::Month => "YYYY-MM",
        ReleasePrecision::Day   => "YYYY-MM-DD"
    }
}
