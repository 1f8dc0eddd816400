//! Translator configuration.

/// Configuration options for [`translate`](crate::translate::translate).
///
/// Use `TranslatorConfig::default()` for the settings that produce the
/// classic `.model` output.
///
/// # Examples
///
/// ```
/// use kconfig_model::config::TranslatorConfig;
///
/// let config = TranslatorConfig::default()
///     .with_strict_always_on(false)
///     .with_modules_symbol("CONFIG_MODULES");
/// assert!(!config.strict_always_on);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatorConfig {
    /// If set, an item with an explicit `depends on` is never marked always-on,
    /// even if it defaults to `y` unconditionally (default: true)
    pub strict_always_on: bool,
    /// Symbol every `_MODULE` symbol depends on (default: "CONFIG_MODULES")
    pub modules_symbol: String,
    /// Prefix of the placeholder symbols minted for unconditional defaults (default: "__FREE__")
    pub free_item_prefix: String,
    /// Value of the `SCHEMA_VERSION` header line (default: "1.1")
    pub schema_version: String,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            strict_always_on: true,
            modules_symbol: "CONFIG_MODULES".to_string(),
            free_item_prefix: "__FREE__".to_string(),
            schema_version: "1.1".to_string(),
        }
    }
}

impl TranslatorConfig {
    pub fn with_strict_always_on(mut self, strict: bool) -> Self {
        self.strict_always_on = strict;
        self
    }

    pub fn with_modules_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.modules_symbol = symbol.into();
        self
    }

    pub fn with_free_item_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.free_item_prefix = prefix.into();
        self
    }

    pub fn with_schema_version(mut self, version: impl Into<String>) -> Self {
        self.schema_version = version.into();
        self
    }
}
