//! Selection of the effective module-configuration payload at submission
//! time.
//!
//! The user can either submit the configuration file exactly as selected
//! from disk, or, after editing the title list in memory and explicitly
//! confirming the intent, an in-memory copy serialized on the fly. This
//! module decides which of the two goes on the wire.

use crate::module_config::{ModuleConfig, DEFAULT_CONFIG_FILE_NAME};
use crate::upload::FilePayload;

/// Produce the configuration payload to transmit with a submission.
///
/// When `use_edited` is set and an edited copy exists, the edited copy is
/// serialized and named after the original on-disk file so the backend's
/// filename-based matching still recognises it as a replacement for the
/// same logical configuration; without a known original name the fixed
/// default name is used. In every other case the on-disk payload is passed
/// through unchanged.
///
/// Pure selection logic with no side effects. Callers must invoke it fresh
/// on every submission attempt: both the flag and the edited copy can
/// change between attempts.
pub fn resolve_effective_config(
    use_edited: bool,
    edited: Option<&ModuleConfig>,
    original_file_name: Option<&str>,
    on_disk: &FilePayload,
) -> FilePayload {
    match (use_edited, edited) {
        (true, Some(config)) => FilePayload {
            file_name: original_file_name
                .unwrap_or(DEFAULT_CONFIG_FILE_NAME)
                .to_string(),
            bytes: config.to_pretty_json(),
        },
        _ => on_disk.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn on_disk_payload() -> FilePayload {
        FilePayload::new("cfg.json", br#"{"module_titles":["Intro"]}"#.to_vec())
    }

    fn edited_config() -> ModuleConfig {
        ModuleConfig {
            module_titles: vec!["Intro".into(), "Body".into(), "Appendix".into()],
        }
    }

    #[test]
    fn override_with_known_name_keeps_original_name() {
        let edited = edited_config();
        let payload =
            resolve_effective_config(true, Some(&edited), Some("cfg.json"), &on_disk_payload());

        assert_eq!(payload.file_name, "cfg.json");
        let parsed = ModuleConfig::parse_lenient(&payload.bytes);
        assert_eq!(parsed.module_titles.len(), 3);
    }

    #[test]
    fn override_without_name_falls_back_to_default() {
        let edited = edited_config();
        let payload = resolve_effective_config(true, Some(&edited), None, &on_disk_payload());

        assert_eq!(payload.file_name, DEFAULT_CONFIG_FILE_NAME);
    }

    #[test]
    fn no_override_passes_on_disk_through() {
        let edited = edited_config();
        let on_disk = on_disk_payload();
        let payload = resolve_effective_config(false, Some(&edited), Some("cfg.json"), &on_disk);

        assert_eq!(payload, on_disk);
    }

    #[test]
    fn override_without_edited_copy_passes_on_disk_through() {
        let on_disk = on_disk_payload();
        let payload = resolve_effective_config(true, None, Some("cfg.json"), &on_disk);

        assert_eq!(payload, on_disk);
    }
}
