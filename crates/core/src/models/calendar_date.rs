//! Serde adapters for calendar dates that may arrive as bare dates or as
//! timestamps. Always serialized as `yyyy-mm-dd`.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serializer};

use crate::format::{format_date_input, parse_date_input};

pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_date_input(*date))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_date_input(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid calendar date '{}'", raw)))
}

pub mod option {
    use super::*;

    pub fn serialize<S: Serializer>(
        date: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => super::serialize(date, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => parse_date_input(&raw).map(Some).ok_or_else(|| {
                serde::de::Error::custom(format!("invalid calendar date '{}'", raw))
            }),
        }
    }
}
