//! The module configuration document and its edit operations.
//!
//! A module configuration is a small JSON document of the shape
//! `{"module_titles": ["Intro", "Body", ...]}` that tells the merge job
//! which section titles to assemble. Users select one from disk and may
//! edit the title list in memory before submitting.

use serde::{Deserialize, Serialize};

/// Fallback name used when an edited configuration is uploaded but the
/// original on-disk file name is no longer known.
pub const DEFAULT_CONFIG_FILE_NAME: &str = "module_config.json";

/// Parsed module configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleConfig {
    /// Ordered section titles the merge output is organised under.
    #[serde(default)]
    pub module_titles: Vec<String>,
}

impl ModuleConfig {
    /// Parse configuration bytes, recovering from malformed input.
    ///
    /// A file that is not valid JSON, or whose `module_titles` is not an
    /// array of strings, yields an empty title list instead of an error so
    /// the user can re-add titles through the editor and still proceed.
    pub fn parse_lenient(bytes: &[u8]) -> Self {
        serde_json::from_slice(bytes).unwrap_or_default()
    }

    /// Serialize with 2-space indentation, the format the edited copy is
    /// uploaded in.
    pub fn to_pretty_json(&self) -> Vec<u8> {
        // Serialization of this struct cannot fail: it is a plain map of
        // strings with no non-string keys.
        serde_json::to_vec_pretty(self).unwrap_or_default()
    }

    /// Append a new title at the end of the list.
    pub fn add_title(&mut self, title: impl Into<String>) {
        self.module_titles.push(title.into());
    }

    /// Replace the title at `idx`. Returns `false` when `idx` is out of
    /// bounds.
    pub fn rename_title(&mut self, idx: usize, title: impl Into<String>) -> bool {
        match self.module_titles.get_mut(idx) {
            Some(slot) => {
                *slot = title.into();
                true
            }
            None => false,
        }
    }

    /// Remove the title at `idx`. Returns `false` when `idx` is out of
    /// bounds.
    pub fn remove_title(&mut self, idx: usize) -> bool {
        if idx < self.module_titles.len() {
            self.module_titles.remove(idx);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_config() {
        let cfg = ModuleConfig::parse_lenient(br#"{"module_titles":["Intro","Body"]}"#);
        assert_eq!(cfg.module_titles, vec!["Intro", "Body"]);
    }

    #[test]
    fn parse_malformed_json_recovers_to_empty() {
        let cfg = ModuleConfig::parse_lenient(b"not json at all");
        assert!(cfg.module_titles.is_empty());
    }

    #[test]
    fn parse_wrong_titles_type_recovers_to_empty() {
        let cfg = ModuleConfig::parse_lenient(br#"{"module_titles": "oops"}"#);
        assert!(cfg.module_titles.is_empty());

        let cfg = ModuleConfig::parse_lenient(br#"{"module_titles": [1, 2, 3]}"#);
        assert!(cfg.module_titles.is_empty());
    }

    #[test]
    fn parse_missing_titles_field_yields_empty() {
        let cfg = ModuleConfig::parse_lenient(br#"{"unrelated": true}"#);
        assert!(cfg.module_titles.is_empty());
    }

    #[test]
    fn pretty_json_round_trips() {
        let mut cfg = ModuleConfig::default();
        cfg.add_title("Intro");
        cfg.add_title("Body");

        let bytes = cfg.to_pretty_json();
        assert_eq!(ModuleConfig::parse_lenient(&bytes), cfg);
    }

    #[test]
    fn rename_and_remove_respect_bounds() {
        let mut cfg = ModuleConfig {
            module_titles: vec!["A".into(), "B".into()],
        };

        assert!(cfg.rename_title(1, "B2"));
        assert_eq!(cfg.module_titles[1], "B2");
        assert!(!cfg.rename_title(5, "nope"));

        assert!(cfg.remove_title(0));
        assert_eq!(cfg.module_titles, vec!["B2"]);
        assert!(!cfg.remove_title(7));
    }
}
