use std::collections::{BTreeMap, btree_map};

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_MAX_FILE_SIZE, SETTING_LLM_API_KEY, SETTING_LLM_MODEL,
    SETTING_LLM_URL, SETTING_THUMBNAIL_SIZE, SETTING_UPLOAD_ALLOWED_EXTENSIONS,
    SETTING_UPLOAD_MAX_FILE_SIZE,
};

/// System settings as a flat string map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings(BTreeMap<String, String>);

impl Settings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.0.insert(key.to_string(), value.to_string());
    }

    /// Entries in key order.
    #[must_use]
    pub fn iter(&self) -> SettingsIter<'_> {
        SettingsIter(self.0.iter())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn max_file_size(&self) -> u64 {
        self.get(SETTING_UPLOAD_MAX_FILE_SIZE)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_MAX_FILE_SIZE)
    }

    /// Allowed upload extensions, lowercased, without leading dots.
    #[must_use]
    pub fn allowed_extensions(&self) -> Vec<String> {
        self.get(SETTING_UPLOAD_ALLOWED_EXTENSIONS)
            .unwrap_or(DEFAULT_ALLOWED_EXTENSIONS)
            .split(',')
            .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect()
    }

    #[must_use]
    pub fn thumbnail_size(&self) -> Option<u32> {
        self.get(SETTING_THUMBNAIL_SIZE)
            .and_then(|v| v.trim().parse().ok())
    }

    /// Natural language query parsing needs the three LLM settings.
    #[must_use]
    pub fn llm_configured(&self) -> bool {
        [SETTING_LLM_URL, SETTING_LLM_MODEL, SETTING_LLM_API_KEY]
            .iter()
            .all(|k| self.get(k).is_some_and(|v| !v.trim().is_empty()))
    }

    /// Whether the value of `key` must not be printed in clear.
    #[must_use]
    pub fn is_secret(key: &str) -> bool {
        key == SETTING_LLM_API_KEY || key.starts_with("auth.")
    }
}

impl<'a> IntoIterator for &'a Settings {
    type Item = (&'a str, &'a str);
    type IntoIter = SettingsIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Borrowing iterator over the entries of [`Settings`].
#[derive(Debug, Clone)]
pub struct SettingsIter<'a>(btree_map::Iter<'a, String, String>);

impl<'a> Iterator for SettingsIter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl ExactSizeIterator for SettingsIter<'_> {}

impl FromIterator<(String, String)> for Settings {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::new();
        assert_eq!(settings.max_file_size(), 52_428_800);
        assert_eq!(
            settings.allowed_extensions(),
            vec!["jpg", "png", "webp", "gif", "jpeg"]
        );
        assert_eq!(settings.thumbnail_size(), None);
        assert!(!settings.llm_configured());
    }

    #[test]
    fn test_settings_from_backend_map() {
        let json = r#"{
            "upload.max-file-size": "1048576",
            "upload.allowed-extensions": " PNG, .webp ,,",
            "file.thumbnail.size": "300"
        }"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.len(), 3);
        assert_eq!(settings.max_file_size(), 1_048_576);
        assert_eq!(settings.allowed_extensions(), vec!["png", "webp"]);
        assert_eq!(settings.thumbnail_size(), Some(300));
    }

    #[test]
    fn test_settings_invalid_number_falls_back() {
        let mut settings = Settings::new();
        settings.set(SETTING_UPLOAD_MAX_FILE_SIZE, "lots");
        assert_eq!(settings.max_file_size(), DEFAULT_MAX_FILE_SIZE);
    }

    #[test]
    fn test_settings_llm_configured() {
        let mut settings = Settings::new();
        settings.set(SETTING_LLM_URL, "https://llm.example/v1");
        settings.set(SETTING_LLM_MODEL, "small");
        settings.set(SETTING_LLM_API_KEY, "  ");
        assert!(!settings.llm_configured());
        settings.set(SETTING_LLM_API_KEY, "sk-1");
        assert!(settings.llm_configured());
    }

    #[test]
    fn test_settings_serialize_as_map() {
        let mut settings = Settings::new();
        settings.set("b", "2");
        settings.set("a", "1");
        assert_eq!(
            serde_json::to_string(&settings).unwrap(),
            r#"{"a":"1","b":"2"}"#
        );
    }

    #[test]
    fn test_secret_keys() {
        assert!(Settings::is_secret("llm.api-key"));
        assert!(Settings::is_secret("auth.password"));
        assert!(!Settings::is_secret("llm.url"));
    }

    #[test]
    fn test_settings_iterate_by_reference() {
        let settings: Settings = [("b", "2"), ("a", "1")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut keys = Vec::new();
        for (key, _) in &settings {
            keys.push(key);
        }
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(settings.iter().len(), 2);
        assert_eq!(settings.iter().next(), Some(("a", "1")));
    }
}
