//! Translations and locale selection.
//!
//! Three locales are supported: English (the default), Chinese and Japanese.
//! Each locale is a nested JSON table embedded in the binary from
//! `locales/<id>.json`. Keys are dotted paths into that table
//! (`"export.formats.png"`).
//!
//! - **Resolution**: [`resolve`] walks the active table and restarts from the
//!   English table on a miss. A key missing from both comes back unchanged,
//!   so untranslated text is visible instead of blank.
//! - **Selection**: [`LocaleState`] loads the persisted preference, falls back
//!   to the environment's locale signal, and persists every explicit change.

mod locale;
mod resolve;

pub use locale::{LANGUAGE_KEY, Locale, LocaleState, detect_locale, env_locale_signal};
pub use resolve::{Translator, locale_table, resolve};
