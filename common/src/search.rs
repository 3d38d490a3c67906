use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::EXCLUDE_PREFIX;

#[derive(Debug, Clone)]
pub struct InvalidSort(pub String);

impl fmt::Display for InvalidSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for InvalidSort {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

impl FromStr for Direction {
    type Err = InvalidSort;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(InvalidSort(format!(
                "invalid sort direction: '{s}' (expected 'asc' or 'desc')"
            ))),
        }
    }
}

/// Sort order in the `property,direction` form used by pageable endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sort {
    pub property: String,
    pub direction: Direction,
}

impl Sort {
    #[must_use]
    pub fn new(property: &str, direction: Direction) -> Self {
        Self {
            property: property.to_string(),
            direction,
        }
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.property, self.direction)
    }
}

impl FromStr for Sort {
    type Err = InvalidSort;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (property, direction) = match s.split_once(',') {
            Some((p, d)) => (p.trim(), d.trim().parse()?),
            None => (s.trim(), Direction::default()),
        };

        if property.is_empty() {
            return Err(InvalidSort("sort property cannot be empty".to_string()));
        }
        if !property
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
        {
            return Err(InvalidSort(format!("invalid sort property: '{property}'")));
        }

        Ok(Self {
            property: property.to_string(),
            direction,
        })
    }
}

impl Serialize for Sort {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Sort {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Advanced search request. Unset criteria are left out of the body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub random_seed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width_min: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width_max: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_min: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_max: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_min: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_max: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<Sort>,
}

impl SearchRequest {
    /// Checks that every min/max pair is ordered.
    pub fn validate(&self) -> Result<(), String> {
        fn ordered<T: PartialOrd + fmt::Display>(
            name: &str,
            min: Option<T>,
            max: Option<T>,
        ) -> Result<(), String> {
            match (min, max) {
                (Some(min), Some(max)) if min > max => Err(format!(
                    "{name} minimum ({min}) is greater than maximum ({max})"
                )),
                _ => Ok(()),
            }
        }

        ordered("width", self.width_min, self.width_max)?;
        ordered("height", self.height_min, self.height_max)?;
        ordered("size", self.size_min, self.size_max)?;
        if self.size == Some(0) {
            return Err("page size must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Builds the `tags` expression of a search: included tags as-is, excluded
/// tags prefixed with `-`, separated by spaces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagQuery {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl TagQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn include(mut self, tag: &str) -> Self {
        push_unique(&mut self.include, tag);
        self
    }

    #[must_use]
    pub fn exclude(mut self, tag: &str) -> Self {
        push_unique(&mut self.exclude, tag);
        self
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    /// Parses a whitespace separated expression; `-tag` excludes.
    #[must_use]
    pub fn parse(expr: &str) -> Self {
        expr.split_whitespace()
            .fold(Self::new(), |q, token| match token.strip_prefix(EXCLUDE_PREFIX) {
                Some(tag) => q.exclude(tag),
                None => q.include(token),
            })
    }
}

fn push_unique(tags: &mut Vec<String>, tag: &str) {
    let tag = tag.trim();
    if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
        tags.push(tag.to_string());
    }
}

impl fmt::Display for TagQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .include
            .iter()
            .cloned()
            .chain(self.exclude.iter().map(|t| format!("{EXCLUDE_PREFIX}{t}")))
            .collect();
        write!(f, "{}", parts.join(" "))
    }
}
