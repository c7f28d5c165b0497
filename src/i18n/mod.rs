//! Internationalization (i18n) support
//!
//! `pt-BR` and `en` ship embedded in the binary; a site may add or
//! override languages with YAML files in its `languages/` folder.

use anyhow::Result;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

type Translations = HashMap<String, serde_yaml::Value>;

const BUILTIN: &[(&str, &str)] = &[
    ("pt-BR", include_str!("languages/pt-BR.yml")),
    ("en", include_str!("languages/en.yml")),
];

/// Internationalization handler
#[derive(Debug, Clone)]
pub struct I18n {
    /// Current language
    language: String,
    /// Language data: lang -> key -> translation
    translations: HashMap<String, Translations>,
}

impl I18n {
    /// Create a handler for `language` with the built-in tables loaded
    pub fn new(language: &str) -> Self {
        let mut translations = HashMap::new();
        for (lang, source) in BUILTIN {
            match serde_yaml::from_str::<Translations>(source) {
                Ok(data) => {
                    translations.insert(lang.to_string(), data);
                }
                Err(e) => tracing::error!("Built-in language {} is invalid: {}", lang, e),
            }
        }

        Self {
            language: language.to_string(),
            translations,
        }
    }

    /// Load language files from a directory, merging over the built-ins
    pub fn load_languages<P: AsRef<Path>>(&mut self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        if !dir.exists() {
            return Ok(());
        }

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let ext = path.extension().and_then(|e| e.to_str());
            if !path.is_file() || !matches!(ext, Some("yml") | Some("yaml")) {
                continue;
            }

            let lang = match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) => stem.to_string(),
                None => continue,
            };

            let content = fs::read_to_string(&path)?;
            match serde_yaml::from_str::<Translations>(&content) {
                Ok(data) => {
                    let table = self.translations.entry(lang).or_default();
                    for (key, value) in data {
                        match table.get_mut(&key) {
                            Some(existing) => merge_value(existing, value),
                            None => {
                                table.insert(key, value);
                            }
                        }
                    }
                    tracing::debug!("Loaded language file: {:?}", path);
                }
                Err(e) => tracing::warn!("Failed to parse language file {:?}: {}", path, e),
            }
        }

        Ok(())
    }

    /// Get the current language
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Get a translation by key; nested keys use dots (`post.loading`)
    pub fn get(&self, key: &str) -> String {
        self.lookup(key)
            .map(yaml_value_to_string)
            .unwrap_or_else(|| key.to_string())
    }

    /// Abbreviated month name, `month` being 1-based
    pub fn month_abbr(&self, month: u32) -> String {
        let index = month.saturating_sub(1) as usize;
        match self.lookup("months") {
            Some(serde_yaml::Value::Sequence(months)) if index < months.len() => {
                yaml_value_to_string(&months[index])
            }
            _ => format!("{:02}", month),
        }
    }

    /// Translation with `%d` replaced by `count`
    pub fn get_count(&self, key: &str, count: u64) -> String {
        self.get(key).replace("%d", &count.to_string())
    }

    /// Flat map of the UI strings templates need
    pub fn ui_strings(&self) -> HashMap<&'static str, String> {
        [
            ("load_more", "listing.load_more"),
            ("empty", "listing.empty"),
            ("loading", "post.loading"),
            ("banner_alt", "post.banner_alt"),
            ("not_found", "not_found.title"),
            ("back", "not_found.back"),
        ]
        .into_iter()
        .map(|(name, key)| (name, self.get(key)))
        .collect()
    }

    fn lookup(&self, key: &str) -> Option<&serde_yaml::Value> {
        let current = self
            .translations
            .get(&self.language)
            .and_then(|data| get_nested_value(data, key));
        if current.is_some() || self.language == "en" {
            return current;
        }

        // Fallback to English
        self.translations
            .get("en")
            .and_then(|data| get_nested_value(data, key))
    }
}

impl Default for I18n {
    fn default() -> Self {
        Self::new("en")
    }
}

/// Get a nested value from a YAML map using dot notation
/// Merge `overlay` into `base`; mappings merge key by key, anything else replaces
fn merge_value(base: &mut serde_yaml::Value, overlay: serde_yaml::Value) {
    match (base, overlay) {
        (serde_yaml::Value::Mapping(base), serde_yaml::Value::Mapping(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_value(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

fn get_nested_value<'a>(data: &'a Translations, key: &str) -> Option<&'a serde_yaml::Value> {
    let mut parts = key.split('.');
    let mut current = data.get(parts.next()?);

    for part in parts {
        match current {
            Some(serde_yaml::Value::Mapping(map)) => {
                current = map.get(serde_yaml::Value::String(part.to_string()));
            }
            _ => return None,
        }
    }

    current
}

/// Convert a YAML value to a string
fn yaml_value_to_string(value: &serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Null => String::new(),
        _ => format!("{:?}", value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_portuguese() {
        let i18n = I18n::new("pt-BR");
        assert_eq!(i18n.get("listing.load_more"), "Carregar mais posts");
        assert_eq!(i18n.get("post.loading"), "Carregando...");
        assert_eq!(i18n.month_abbr(5), "mai");
        assert_eq!(i18n.month_abbr(12), "dez");
    }

    #[test]
    fn test_unknown_language_falls_back_to_english() {
        let i18n = I18n::new("de");
        assert_eq!(i18n.get("listing.load_more"), "Load more posts");
        assert_eq!(i18n.month_abbr(1), "Jan");
        assert_eq!(i18n.get("no.such.key"), "no.such.key");
    }

    #[test]
    fn test_get_count() {
        let i18n = I18n::new("en");
        assert_eq!(i18n.get_count("post.reading_time", 3), "3 min");
    }

    #[test]
    fn test_load_languages_overrides_builtin() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("pt-BR.yml"),
            "listing:\n  load_more: Mais posts\n",
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut i18n = I18n::new("pt-BR");
        i18n.load_languages(dir.path()).unwrap();
        assert_eq!(i18n.get("listing.load_more"), "Mais posts");
        // sibling keys of an overridden section survive
        assert_eq!(i18n.get("listing.empty"), "Nenhum post publicado ainda.");
        // top-level keys not in the override file survive
        assert_eq!(i18n.month_abbr(5), "mai");
    }

    #[test]
    fn test_ui_strings() {
        let strings = I18n::new("pt-BR").ui_strings();
        assert_eq!(strings["loading"], "Carregando...");
        assert_eq!(strings["not_found"], "Post não encontrado");
    }
}
