use std::path::Path;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, ParseError};
use serde::Deserialize;

use crate::error::LoadError;

/// Date of a post, used only for ordering. TOML dates parse to midnight so
/// date-only and datetime posts sort together.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct MetaDate(pub NaiveDateTime);

impl<'de> Deserialize<'de> for MetaDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: serde::Deserializer<'de>,
    {
        use serde::de::Error;
        let value = toml::value::Datetime::deserialize(deserializer)?;
        let date = MetaDate::from_str(&value.to_string()).map_err(Error::custom)?;
        Ok(date)
    }
}

impl FromStr for MetaDate {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(date_time) = NaiveDateTime::from_str(s) {
            return Ok(Self(date_time));
        }
        if let Ok(date_time) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
            return Ok(Self(date_time));
        }
        let date = NaiveDate::from_str(s)?;
        Ok(Self(date.and_hms_opt(0, 0, 0).unwrap()))
    }
}

/// Typed view of a post's metadata block.
#[derive(Debug, Deserialize)]
pub struct PostMeta {
    pub id: String,
    pub locale: String,
    pub title: String,
    pub date: MetaDate,
    pub url: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Deserialize)]
pub struct PageMeta {
    pub id: String,
    pub locale: String,
    pub title: String,
}

pub fn parse_post_meta(path: &Path, meta_block: &str) -> Result<PostMeta, LoadError> {
    toml::from_str::<PostMeta>(meta_block).map_err(|e| LoadError::MalformedMetadata {
        path: path.to_path_buf(),
        source: e,
    })
}

pub fn parse_page_meta(path: &Path, meta_block: &str) -> Result<PageMeta, LoadError> {
    toml::from_str::<PageMeta>(meta_block).map_err(|e| LoadError::MalformedMetadata {
        path: path.to_path_buf(),
        source: e,
    })
}
