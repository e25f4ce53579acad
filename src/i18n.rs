//! Translated UI strings.
//!
//! Key→string tables are embedded at compile time from `locales/*.txt`.
//! `t!("key")` looks up the current language, falling back to English and
//! finally to the key itself.

use std::collections::HashMap;
use std::sync::Mutex;

static I18N: Mutex<Option<I18nState>> = Mutex::new(None);

struct I18nState {
    current_lang: String,
    /// lang_code → (key → translated_string)
    translations: HashMap<String, HashMap<String, String>>,
}

/// Supported languages: (code, native_name)
pub const LANGUAGES: &[(&str, &str)] = &[("en", "English"), ("hu", "Magyar")];

/// Load the embedded tables. Safe to call more than once.
pub fn init() {
    let mut translations: HashMap<String, HashMap<String, String>> = HashMap::new();
    translations.insert(
        "en".to_string(),
        parse_translations(include_str!("../locales/en.txt")),
    );
    translations.insert(
        "hu".to_string(),
        parse_translations(include_str!("../locales/hu.txt")),
    );

    if let Ok(mut guard) = I18N.lock() {
        let current_lang = guard
            .as_ref()
            .map(|s| s.current_lang.clone())
            .unwrap_or_else(|| "en".to_string());
        *guard = Some(I18nState {
            current_lang,
            translations,
        });
    }
}

/// Set the active language. Unknown codes fall back to "en".
pub fn set_language(code: &str) {
    if let Ok(mut guard) = I18N.lock()
        && let Some(ref mut state) = *guard
    {
        if state.translations.contains_key(code) {
            state.current_lang = code.to_string();
        } else {
            state.current_lang = "en".to_string();
        }
    }
}

pub fn current_language() -> String {
    if let Ok(guard) = I18N.lock()
        && let Some(ref state) = *guard
    {
        return state.current_lang.clone();
    }
    "en".to_string()
}

pub fn translate(key: &str) -> String {
    if let Ok(guard) = I18N.lock()
        && let Some(ref state) = *guard
    {
        if let Some(map) = state.translations.get(&state.current_lang)
            && let Some(val) = map.get(key)
        {
            return val.clone();
        }
        if state.current_lang != "en"
            && let Some(map) = state.translations.get("en")
            && let Some(val) = map.get(key)
        {
            return val.clone();
        }
    }
    key.to_string()
}

/// Best supported language for the environment's locale, or "en".
pub fn detect_system_language() -> String {
    for var in &["LC_ALL", "LC_MESSAGES", "LANG", "LANGUAGE"] {
        if let Ok(val) = std::env::var(var)
            && let Some(lang) = match_system_locale(&val)
        {
            return lang;
        }
    }
    "en".to_string()
}

/// Match a locale string ("hu_HU.UTF-8", "en-GB") to a supported code.
fn match_system_locale(locale: &str) -> Option<String> {
    let normalized = locale.to_lowercase().replace('_', "-");
    let lang_part = normalized.split(['.', '@']).next().unwrap_or(&normalized);
    let primary = lang_part.split('-').next().unwrap_or(lang_part);
    LANGUAGES
        .iter()
        .find(|(code, _)| *code == primary)
        .map(|(code, _)| code.to_string())
}

/// One `key=value` per line; `#` starts a comment line.
fn parse_translations(data: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in data.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, val)) = line.split_once('=') {
            map.insert(key.trim().to_string(), val.trim().to_string());
        }
    }
    map
}

/// Translation macro. Usage: `t!("menu.new")` or `t!("status.saved", path = p)`
#[macro_export]
macro_rules! t {
    ($key:expr) => {
        $crate::i18n::translate($key)
    };
    ($key:expr, $($name:ident = $val:expr),+ $(,)?) => {{
        let mut s = $crate::i18n::translate($key);
        $(
            s = s.replace(concat!("{", stringify!($name), "}"), &format!("{}", $val));
        )+
        s
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_key_value_lines() {
        let map = parse_translations("# header\n\ntool.pen = Pen\nbad line\nx=a=b\n");
        assert_eq!(map.get("tool.pen").map(String::as_str), Some("Pen"));
        assert_eq!(map.get("x").map(String::as_str), Some("a=b"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn locale_strings_map_to_supported_codes() {
        assert_eq!(match_system_locale("hu_HU.UTF-8").as_deref(), Some("hu"));
        assert_eq!(match_system_locale("en-GB").as_deref(), Some("en"));
        assert_eq!(match_system_locale("C.UTF-8"), None);
    }

    #[test]
    fn every_english_key_has_a_hungarian_translation() {
        let en = parse_translations(include_str!("../locales/en.txt"));
        let hu = parse_translations(include_str!("../locales/hu.txt"));
        for key in en.keys() {
            assert!(hu.contains_key(key), "missing hu translation for {key}");
        }
    }

    #[test]
    fn translate_falls_back_to_english_then_key() {
        init();
        assert_eq!(translate("no.such.key"), "no.such.key");
        assert!(!translate("tool.pen").is_empty());
        let with_arg = t!("status.saved", path = "a.png");
        assert!(with_arg.contains("a.png"));
    }
}
