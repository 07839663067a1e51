//! Notification rendering.
//!
//! Templates live under `messages.<key>` and use `{param}` placeholders.
//! `messages.prefix` is prepended to every rendered line. Colour codes are
//! left untouched for the host to translate.

use cropplus_harvest::ConfigurationView;
use cropplus_types::Notification;
use tracing::warn;

/// Render `notification` against the configured templates.
///
/// Returns `None` when the template is configured as an empty string,
/// which silences that message. A missing template renders a placeholder
/// line and logs a warning.
pub fn render(view: &dyn ConfigurationView, notification: &Notification) -> Option<String> {
    let path = format!("messages.{}", notification.key);
    let mut text = view.find_string(&path).unwrap_or_else(|| {
        warn!(key = %notification.key, "Missing message key");
        format!("Message key '{}' not found in config!", notification.key)
    });
    if text.is_empty() {
        return None;
    }
    for (param, value) in &notification.params {
        text = text.replace(&format!("{{{param}}}"), value);
    }
    let prefix = view.get_string("messages.prefix", "");
    Some(format!("{prefix}{text}"))
}
