use super::locale::Locale;
use serde_json::Value;
use std::sync::LazyLock;

const EN: &str = include_str!("../../locales/en.json");
const ZH: &str = include_str!("../../locales/zh.json");
const JA: &str = include_str!("../../locales/ja.json");

fn parse_table(locale: Locale, source: &str) -> Value {
    serde_json::from_str(source).unwrap_or_else(|e| {
        tracing::error!(%locale, error = %e, "embedded locale table is not valid JSON");
        Value::Object(Default::default())
    })
}

static TABLES: LazyLock<[Value; 3]> = LazyLock::new(|| {
    [
        parse_table(Locale::En, EN),
        parse_table(Locale::Zh, ZH),
        parse_table(Locale::Ja, JA),
    ]
});

/// The embedded resource table for `locale`.
pub fn locale_table(locale: Locale) -> &'static Value {
    let index = match locale {
        Locale::En => 0,
        Locale::Zh => 1,
        Locale::Ja => 2,
    };
    &TABLES[index]
}

/// Walk `segments` through nested tables. A segment that is absent, or a
/// leaf that is an empty string, counts as a miss.
fn walk<'a>(table: &'a Value, key_path: &str) -> Option<&'a Value> {
    let mut node = table;
    for segment in key_path.split('.') {
        node = node.get(segment)?;
        if node.as_str().is_some_and(str::is_empty) {
            return None;
        }
    }
    Some(node)
}

/// Resolve `key_path` in `locale_table`, restarting from `default_table` on
/// a miss, then substitute `{name}` placeholders from `params`.
///
/// When the key resolves to something other than a string in both passes
/// (or to a nested table), the key path itself is returned.
pub fn resolve(
    locale_table: &Value,
    default_table: &Value,
    key_path: &str,
    params: &[(&str, &str)],
) -> String {
    let found = walk(locale_table, key_path).or_else(|| walk(default_table, key_path));

    let Some(text) = found.and_then(Value::as_str) else {
        tracing::warn!(key = key_path, "translation key not found");
        return key_path.to_string();
    };

    params
        .iter()
        .fold(text.to_string(), |acc, (name, value)| {
            acc.replace(&format!("{{{name}}}"), value)
        })
}

/// Lookup bound to one locale, with English as the fallback table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Translator {
    locale: Locale,
}

impl Translator {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn t(&self, key_path: &str) -> String {
        self.t_with(key_path, &[])
    }

    pub fn t_with(&self, key_path: &str, params: &[(&str, &str)]) -> String {
        resolve(
            locale_table(self.locale),
            locale_table(Locale::En),
            key_path,
            params,
        )
    }

    /// The sample document a new card starts from.
    pub fn default_markdown(&self) -> String {
        self.t("defaultMarkdown")
    }

    /// Display name of `locale`, in the active language.
    pub fn language_name(&self, locale: Locale) -> String {
        self.t(&format!("langNames.{locale}"))
    }
}
