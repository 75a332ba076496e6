use crate::value::ConfigValue;

/// Ordered string→value mapping used throughout the resolution pipeline.
///
/// Insertion order is preserved (needed for deterministic `Display`/debug
/// output); lookups overwrite in place rather than appending a duplicate
/// entry, so `Config` never holds two entries for the same key — this is
/// this implementation's answer to spec.md's open question on duplicate
/// parameter keys: later assignments always override earlier ones, they
/// never accumulate into a list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    entries: Vec<(String, ConfigValue)>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: ConfigValue) {
        let key = key.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Set from raw text, applying spec.md's type-inference rule.
    pub fn set_text(&mut self, key: impl Into<String>, raw: &str) {
        self.set(key, crate::value::infer_value(raw));
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ConfigValue::as_str)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(ConfigValue::as_i64)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(ConfigValue::as_f64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(ConfigValue::as_bool)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Merge `other` on top of `self`: keys in `other` override keys already
    /// present, new keys are appended. Used to build the merge chain of
    /// spec.md §4.3: plugin defaults → profile component defaults →
    /// address parameters, applied left to right via repeated `merge`.
    pub fn merge(&mut self, other: &Config) {
        for (k, v) in &other.entries {
            self.set(k.clone(), v.clone());
        }
    }

    /// Expand `${NAME}` placeholders in every string-valued entry using the
    /// process environment (spec.md §4.3, §6.6).
    pub fn expand_env(&mut self) {
        for (_, v) in self.entries.iter_mut() {
            if let ConfigValue::String(s) = v {
                *s = crate::env::expand_placeholders(s);
            }
        }
    }
}

impl FromIterator<(String, ConfigValue)> for Config {
    fn from_iter<T: IntoIterator<Item = (String, ConfigValue)>>(iter: T) -> Self {
        let mut cfg = Config::new();
        for (k, v) in iter {
            cfg.set(k, v);
        }
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_overrides_later_over_earlier() {
        let mut base = Config::new();
        base.set_text("delimiter", ",");
        let mut overlay = Config::new();
        overlay.set_text("delimiter", ";");
        overlay.set_text("header", "true");

        base.merge(&overlay);

        assert_eq!(base.get_str("delimiter"), Some(";"));
        assert_eq!(base.get_bool("header"), Some(true));
    }

    #[test]
    fn set_is_idempotent_on_key() {
        let mut cfg = Config::new();
        cfg.set_text("x", "1");
        cfg.set_text("x", "2");
        assert_eq!(cfg.len(), 1);
        assert_eq!(cfg.get_i64("x"), Some(2));
    }
}
