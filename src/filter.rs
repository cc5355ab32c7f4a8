// src/filter.rs

//! Token substitution for filtered layer copies.
//!
//! Layers flagged `filtered` copy text files through a property filter that
//! replaces `@key@` and `${key}` tokens. Files with a non-filtered extension
//! (binary formats) are always copied verbatim.

use std::collections::BTreeMap;

/// Extensions never run through the filter, regardless of layer settings.
pub const DEFAULT_NON_FILTERED_EXTENSIONS: &[&str] =
    &["jar", "war", "zip", "aar", "mar", "tld", "png", "jpg", "jpeg", "gif", "ico", "pdf"];

/// Property-driven token filter.
#[derive(Debug, Clone, Default)]
pub struct ContentFilter {
    properties: BTreeMap<String, String>,
    non_filtered_extensions: Vec<String>,
}

impl ContentFilter {
    pub fn new(properties: BTreeMap<String, String>) -> Self {
        Self {
            properties,
            non_filtered_extensions: DEFAULT_NON_FILTERED_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// Extend the list of extensions exempt from filtering.
    pub fn with_non_filtered_extensions(mut self, extensions: &[String]) -> Self {
        self.non_filtered_extensions
            .extend(extensions.iter().cloned());
        self
    }

    /// Whether a file with this name may be filtered at all.
    pub fn is_filterable(&self, file_name: &str) -> bool {
        let extension = file_name.rsplit('.').next().unwrap_or("").to_lowercase();
        !self
            .non_filtered_extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(&extension))
    }

    /// Substitute `@key@` and `${key}` tokens. Unknown tokens are left
    /// untouched.
    pub fn apply(&self, content: &str) -> String {
        let mut result = content.to_string();
        for (key, value) in &self.properties {
            result = result.replace(&format!("@{}@", key), value);
            result = result.replace(&format!("${{{}}}", key), value);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> ContentFilter {
        let mut props = BTreeMap::new();
        props.insert("app.name".to_string(), "shop".to_string());
        props.insert("app.version".to_string(), "2.4".to_string());
        ContentFilter::new(props)
    }

    #[test]
    fn test_token_substitution() {
        let filtered = filter().apply("name=@app.name@ version=${app.version}");
        assert_eq!(filtered, "name=shop version=2.4");
    }

    #[test]
    fn test_unknown_tokens_preserved() {
        let filtered = filter().apply("value=@unknown@ other=${missing}");
        assert_eq!(filtered, "value=@unknown@ other=${missing}");
    }

    #[test]
    fn test_binary_extensions_not_filterable() {
        let f = filter();
        assert!(!f.is_filterable("library.jar"));
        assert!(!f.is_filterable("logo.PNG"));
        assert!(f.is_filterable("web.xml"));
        assert!(f.is_filterable("application.properties"));
    }
}
