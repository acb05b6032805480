//! `config` subcommand: show the effective settings.

use adapter_core::AdapterSettings;

const REDACTED: &str = "********";

/// Effective settings as pretty JSON, with secrets masked.
pub fn render_settings(settings: &AdapterSettings) -> serde_json::Result<String> {
    let mut shown = settings.clone();
    if shown.stt_api_key.is_some() {
        shown.stt_api_key = Some(REDACTED.to_string());
    }
    serde_json::to_string_pretty(&shown)
}
