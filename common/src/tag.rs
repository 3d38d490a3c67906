use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Tag category as assigned by the tagger.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum TagType {
    Copyright,
    Character,
    Artist,
    #[default]
    General,
    Meta,
    Rating,
    Year,
    Other(String),
}

impl TagType {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Copyright => "copyright",
            Self::Character => "character",
            Self::Artist => "artist",
            Self::General => "general",
            Self::Meta => "meta",
            Self::Rating => "rating",
            Self::Year => "year",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for TagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TagType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "copyright" => Self::Copyright,
            "character" => Self::Character,
            "artist" => Self::Artist,
            "general" => Self::General,
            "meta" => Self::Meta,
            "rating" => Self::Rating,
            "year" => Self::Year,
            _ => Self::Other(s.to_string()),
        })
    }
}

impl Serialize for TagType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TagType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TagTypeVisitor;

        impl Visitor<'_> for TagTypeVisitor {
            type Value = TagType;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a tag type string")
            }

            fn visit_str<E>(self, value: &str) -> Result<TagType, E>
            where
                E: de::Error,
            {
                // Infallible, unknown categories are kept verbatim
                TagType::from_str(value).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_str(TagTypeVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagDto {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TagType,
}

#[derive(Debug, Clone)]
pub struct InvalidTagRef(pub String);

impl fmt::Display for InvalidTagRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for InvalidTagRef {}

/// Partial tag sent when attaching a tag to an image.
///
/// An existing tag is referenced by `id`; a new one is described by `name`
/// and optionally `type`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<TagType>,
}

impl TagRef {
    #[must_use]
    pub const fn by_id(id: u64) -> Self {
        Self {
            id: Some(id),
            name: None,
            kind: None,
        }
    }

    pub fn by_name(name: &str, kind: Option<TagType>) -> Result<Self, InvalidTagRef> {
        let name = name.trim();
        if name.is_empty() {
            return Err(InvalidTagRef("Tag name cannot be empty".to_string()));
        }
        if name.chars().any(char::is_whitespace) {
            return Err(InvalidTagRef(format!(
                "Tag name cannot contain whitespace: '{name}'"
            )));
        }
        Ok(Self {
            id: None,
            name: Some(name.to_string()),
            kind,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_type_known_values() {
        for s in [
            "copyright",
            "character",
            "artist",
            "general",
            "meta",
            "rating",
            "year",
        ] {
            let kind = TagType::from_str(s).unwrap();
            assert_eq!(kind.to_string(), s);
            assert!(!matches!(kind, TagType::Other(_)));
        }
    }

    #[test]
    fn test_tag_type_case_insensitive() {
        assert_eq!(TagType::from_str("Artist").unwrap(), TagType::Artist);
    }

    #[test]
    fn test_tag_type_unknown_kept_verbatim() {
        let kind: TagType = serde_json::from_str("\"species\"").unwrap();
        assert_eq!(kind, TagType::Other("species".to_string()));
        assert_eq!(serde_json::to_string(&kind).unwrap(), "\"species\"");
    }

    #[test]
    fn test_tag_dto_type_field() {
        let tag: TagDto =
            serde_json::from_str(r#"{"id": 7, "name": "hatsune_miku", "type": "character"}"#)
                .unwrap();
        assert_eq!(tag.id, 7);
        assert_eq!(tag.kind, TagType::Character);
    }

    #[test]
    fn test_tag_ref_by_id_serializes_only_id() {
        let json = serde_json::to_string(&TagRef::by_id(3)).unwrap();
        assert_eq!(json, r#"{"id":3}"#);
    }

    #[test]
    fn test_tag_ref_by_name() {
        let tag = TagRef::by_name(" blue_sky ", Some(TagType::General)).unwrap();
        let json = serde_json::to_string(&tag).unwrap();
        assert_eq!(json, r#"{"name":"blue_sky","type":"general"}"#);
    }

    #[test]
    fn test_tag_ref_by_name_invalid() {
        assert!(TagRef::by_name("   ", None).is_err());
        let err = TagRef::by_name("blue sky", None).unwrap_err();
        assert!(err.0.contains("whitespace"));
    }
}
