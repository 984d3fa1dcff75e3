use crate::prefs::{KeyValueStore, PrefsError};
use std::fmt;

/// Preference key holding the last explicitly chosen locale.
pub const LANGUAGE_KEY: &str = "preferred-language";

/// A supported locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Locale {
    #[default]
    En,
    Zh,
    Ja,
}

impl Locale {
    pub const ALL: [Locale; 3] = [Locale::En, Locale::Zh, Locale::Ja];

    /// Parse one of the three supported identifiers, exactly.
    pub fn parse(id: &str) -> Option<Locale> {
        match id {
            "en" => Some(Locale::En),
            "zh" => Some(Locale::Zh),
            "ja" => Some(Locale::Ja),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Zh => "zh",
            Locale::Ja => "ja",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map an environment locale signal to a supported locale.
///
/// Accepts POSIX (`ja_JP.UTF-8`) and BCP-47 (`zh-Hant-TW`) forms. Only the
/// primary language subtag is considered; anything unsupported, including
/// `C` and `POSIX`, maps to English.
pub fn detect_locale(signal: Option<&str>) -> Locale {
    let primary = signal
        .and_then(|s| s.split(['-', '_', '.', '@']).next())
        .map(|s| s.to_ascii_lowercase());
    primary
        .as_deref()
        .and_then(Locale::parse)
        .unwrap_or_default()
}

/// Read the process locale signal: `LC_ALL`, then `LC_MESSAGES`, then `LANG`.
/// Empty variables are skipped.
pub fn env_locale_signal() -> Option<String> {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .into_iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.is_empty())
}

/// The active locale and its lifecycle: initialized once, changed only by an
/// explicit setter that persists immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocaleState {
    locale: Locale,
}

impl LocaleState {
    /// Use the persisted preference when it names a supported locale,
    /// otherwise derive the locale from the environment signal.
    pub fn init(store: &dyn KeyValueStore, env_signal: Option<&str>) -> Self {
        let saved = store.get(LANGUAGE_KEY);
        let locale = match saved.as_deref().and_then(Locale::parse) {
            Some(locale) => locale,
            None => {
                if let Some(value) = saved.as_deref() {
                    tracing::debug!(value, "ignoring unsupported saved language");
                }
                detect_locale(env_signal)
            }
        };
        tracing::debug!(%locale, "locale initialized");
        Self { locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Switch to `locale` and persist the choice.
    pub fn change(&mut self, store: &mut dyn KeyValueStore, locale: Locale) -> Result<(), PrefsError> {
        self.locale = locale;
        store.set(LANGUAGE_KEY, locale.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::MemoryStore;

    #[test]
    fn parse_accepts_only_supported_ids() {
        assert_eq!(Locale::parse("ja"), Some(Locale::Ja));
        assert_eq!(Locale::parse("zh"), Some(Locale::Zh));
        assert_eq!(Locale::parse("en"), Some(Locale::En));
        assert_eq!(Locale::parse("fr"), None);
        assert_eq!(Locale::parse("JA"), None);
    }

    #[test]
    fn detect_reads_primary_subtag() {
        assert_eq!(detect_locale(Some("ja")), Locale::Ja);
        assert_eq!(detect_locale(Some("ja_JP.UTF-8")), Locale::Ja);
        assert_eq!(detect_locale(Some("zh-CN")), Locale::Zh);
        assert_eq!(detect_locale(Some("zh_TW.UTF-8@calendar")), Locale::Zh);
        assert_eq!(detect_locale(Some("ZH-hant")), Locale::Zh);
    }

    #[test]
    fn detect_defaults_to_english() {
        assert_eq!(detect_locale(None), Locale::En);
        assert_eq!(detect_locale(Some("")), Locale::En);
        assert_eq!(detect_locale(Some("C")), Locale::En);
        assert_eq!(detect_locale(Some("fr_FR.UTF-8")), Locale::En);
    }

    #[test]
    fn init_prefers_saved_language() {
        let mut store = MemoryStore::new();
        store.set(LANGUAGE_KEY, "zh").unwrap();
        let state = LocaleState::init(&store, Some("ja_JP.UTF-8"));
        assert_eq!(state.locale(), Locale::Zh);
    }

    #[test]
    fn init_without_preference_uses_environment() {
        let store = MemoryStore::new();
        let state = LocaleState::init(&store, Some("ja"));
        assert_eq!(state.locale(), Locale::Ja);
    }

    #[test]
    fn init_ignores_unsupported_saved_language() {
        let mut store = MemoryStore::new();
        store.set(LANGUAGE_KEY, "klingon").unwrap();
        let state = LocaleState::init(&store, Some("zh-CN"));
        assert_eq!(state.locale(), Locale::Zh);
    }

    #[test]
    fn change_persists_immediately() {
        let mut store = MemoryStore::new();
        let mut state = LocaleState::init(&store, None);
        assert_eq!(state.locale(), Locale::En);

        state.change(&mut store, Locale::Ja).unwrap();

        assert_eq!(state.locale(), Locale::Ja);
        assert_eq!(store.get(LANGUAGE_KEY).as_deref(), Some("ja"));
        assert_eq!(LocaleState::init(&store, None).locale(), Locale::Ja);
    }
}
