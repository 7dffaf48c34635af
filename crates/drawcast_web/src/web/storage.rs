use drawcast::config::DrawcastConfig;
use drawcast::theme::Theme;

use crate::ui_model::{parse_theme, resolve_config, LOCALSTORAGE_CONFIG_KEY, LOCALSTORAGE_THEME_KEY};

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

pub(super) fn local_storage_get_string(key: &str) -> Option<String> {
    local_storage().and_then(|s| s.get_item(key).ok().flatten())
}

pub(super) fn local_storage_set_string(key: &str, value: &str) {
    if let Some(s) = local_storage() {
        let _ = s.set_item(key, value);
    }
}

fn page_origin() -> Option<String> {
    web_sys::window().and_then(|w| w.location().origin().ok())
}

/// Stored override (if any) on top of the defaults, pointed at the page
/// origin unless the override names a backend.
pub(super) fn load_config() -> DrawcastConfig {
    let stored = local_storage_get_string(LOCALSTORAGE_CONFIG_KEY);
    resolve_config(stored.as_deref(), page_origin().as_deref())
}

pub(super) fn load_theme() -> Option<Theme> {
    parse_theme(local_storage_get_string(LOCALSTORAGE_THEME_KEY).as_deref())
}

pub(super) fn save_theme(theme: Theme) {
    local_storage_set_string(LOCALSTORAGE_THEME_KEY, theme.as_attr());
}

pub(super) fn apply_theme_to_document(theme: Theme) {
    let Some(doc) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let Some(el) = doc.document_element() else {
        return;
    };
    let _ = el.set_attribute("data-theme", theme.as_attr());
}
