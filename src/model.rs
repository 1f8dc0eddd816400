//! Queryable presence-condition models.
//!
//! A [`Model`] maps every `CONFIG_` symbol to an optional presence condition,
//! the normalized expression that must hold whenever the symbol is enabled.
//! Models are produced by the [translator](crate::translate) or read back from
//! one of two on-disk formats:
//!
//! - **`.model` text**: one `SYMBOL` or `SYMBOL "expression"` per line, plus
//!   `I:` comment lines and `UNDERTAKER_SET <KEY> <values...>` metadata lines.
//! - **`.cnf` compiled**: only the `c sym <name> <code>` and
//!   `c meta_value <KEY> <values...>` comment lines are read; clauses are skipped.
//!
//! Two metadata keys are special: `ALWAYS_ON` and `ALWAYS_OFF` list the
//! symbols forced on or off regardless of their condition.
//!
//! # Examples
//!
//! ```
//! use kconfig_model::model::Model;
//!
//! let model = Model::from_model_str(
//!     "CONFIG_A\n\
//!      CONFIG_B \"CONFIG_A\"\n",
//! ).unwrap();
//! assert_eq!(model.mentioned_items("CONFIG_B"), vec!["CONFIG_A"]);
//! assert_eq!(model.slice_symbols(&["CONFIG_B"]), vec!["CONFIG_A", "CONFIG_B"]);
//! ```
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::fs;
use std::path::Path;

use regex::Regex;

use crate::error::{Error, Result};
use crate::rsf::{split_row, RsfReader};
use crate::types::ItemKind;

pub const ALWAYS_ON: &str = "ALWAYS_ON";
pub const ALWAYS_OFF: &str = "ALWAYS_OFF";
pub const SCHEMA_VERSION: &str = "SCHEMA_VERSION";
pub const CONFIGURATION_SPACE_REGEX: &str = "CONFIGURATION_SPACE_REGEX";
pub const CONFIGURATION_SPACE_INCOMPLETE: &str = "CONFIGURATION_SPACE_INCOMPLETE";

/// Symbols matching this pattern belong to the configuration space, unless
/// the model overrides it with `CONFIGURATION_SPACE_REGEX`.
pub const DEFAULT_CONFIGURATION_SPACE_REGEX: &str = "^CONFIG_[^ ]+$";

/// Placeholder symbols with this prefix are never reported as missing.
pub const FREE_ITEM_PREFIX: &str = "__FREE__";

const META_TAG: &str = "UNDERTAKER_SET";

/// Where a model gets its item kinds from.
#[derive(Debug, Clone)]
pub enum TypeSource {
    /// The `.rsf` dump the model was translated from.
    Rsf(RsfReader),
    /// The `c sym` declarations of a `.cnf` file, keyed by bare item name.
    Cnf(HashMap<String, ItemKind>),
}

impl TypeSource {
    fn get_type(&self, name: &str) -> Option<ItemKind> {
        match self {
            TypeSource::Rsf(rsf) => rsf.get_type(name),
            TypeSource::Cnf(types) => types.get(name).copied(),
        }
    }
}

/// Result of [`Model::intersect`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Intersection {
    /// Conjunction of the constraints of every relevant symbol, clauses joined by `"\n&& "`.
    pub formula: String,
    /// Configuration-space symbols the slice needs but the model does not define.
    pub missing: BTreeSet<String>,
    /// Number of relevant symbols the model defines.
    pub valid_items: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Model {
    entries: BTreeMap<String, Option<String>>,
    always_on: BTreeSet<String>,
    always_off: BTreeSet<String>,
    meta: BTreeMap<String, Vec<String>>,
    type_source: Option<TypeSource>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the `.model` text format.
    pub fn from_model_str(text: &str) -> Result<Self> {
        let mut model = Self::new();

        for (line_num, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with("I:") {
                continue;
            }
            if line.starts_with(META_TAG) {
                let row = split_row(line).ok_or_else(|| Error::Malformed {
                    line: line_num + 1,
                    message: "unbalanced quotes".to_string(),
                })?;
                if let [_, key, values @ ..] = row.as_slice() {
                    model.add_meta(key, values.iter().map(|v| v.trim().to_string()));
                }
                continue;
            }

            match line.split_once(' ') {
                Some((symbol, expr)) => {
                    let expr = expr.trim_matches(|c| matches!(c, ' ' | '"' | '\t' | '\n'));
                    let expr = if expr.is_empty() { None } else { Some(expr.to_string()) };
                    model.entries.insert(symbol.to_string(), expr);
                }
                None => {
                    model.entries.insert(line.to_string(), None);
                }
            }
        }

        log::debug!("Read model with {} symbols", model.entries.len());
        Ok(model)
    }

    /// Parses the symbol table and metadata of a compiled `.cnf` file.
    ///
    /// Every `c sym <name> <code>` declares `CONFIG_<name>`, plus
    /// `CONFIG_<name>_MODULE` for tristate items. Declared symbols carry no
    /// expression. The declarations become the model's type source.
    pub fn from_cnf_str(text: &str) -> Result<Self> {
        let mut model = Self::new();
        let mut types = HashMap::new();

        for (line_num, line) in text.lines().enumerate() {
            let mut words = line.split_whitespace();
            if words.next() != Some("c") {
                continue;
            }
            match words.next() {
                Some("sym") => {
                    let (Some(name), Some(code), None) = (words.next(), words.next(), words.next()) else {
                        return Err(Error::Malformed {
                            line: line_num + 1,
                            message: format!("expected 'c sym <name> <code>', got '{}'", line),
                        });
                    };
                    let kind = code.parse().ok().and_then(ItemKind::from_code).ok_or_else(|| Error::Malformed {
                        line: line_num + 1,
                        message: format!("invalid type code '{}'", code),
                    })?;
                    model.entries.insert(format!("CONFIG_{}", name), None);
                    if kind == ItemKind::Tristate {
                        model.entries.insert(format!("CONFIG_{}_MODULE", name), None);
                    }
                    types.insert(name.to_string(), kind);
                }
                Some("meta_value") => {
                    if let Some(key) = words.next() {
                        model.add_meta(key, words.map(|w| w.trim_matches('"').to_string()));
                    }
                }
                _ => {}
            }
        }

        log::debug!("Read cnf model with {} symbols", model.entries.len());
        model.type_source = Some(TypeSource::Cnf(types));
        Ok(model)
    }

    /// Loads a model from disk.
    ///
    /// Files ending in `.cnf` are read as compiled models. Anything else is
    /// read as `.model` text; a `.model` file gets the `.rsf` dump next to it
    /// attached as type source, if there is one.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;

        let extension = path.extension().and_then(|e| e.to_str());
        if extension == Some("cnf") {
            return Self::from_cnf_str(&text);
        }

        let mut model = Self::from_model_str(&text)?;
        if extension == Some("model") {
            let rsf_path = path.with_extension("rsf");
            if rsf_path.is_file() {
                model.type_source = Some(TypeSource::Rsf(RsfReader::load(&rsf_path)?));
            } else {
                log::warn!("No rsf file for model {} was found", path.display());
            }
        }
        Ok(model)
    }

    /// Writes the model in `.model` text format.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_string())?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.entries.contains_key(symbol)
    }

    /// All defined symbols, sorted.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// The presence condition of `symbol`, if it has one.
    pub fn expression(&self, symbol: &str) -> Option<&str> {
        self.entries.get(symbol).and_then(Option::as_deref)
    }

    /// Defines `symbol`, replacing any previous definition.
    pub fn insert(&mut self, symbol: impl Into<String>, expression: Option<String>) {
        self.entries.insert(symbol.into(), expression);
    }

    pub fn always_on(&self) -> &BTreeSet<String> {
        &self.always_on
    }

    pub fn always_off(&self) -> &BTreeSet<String> {
        &self.always_off
    }

    /// Whitelists `symbol`. Undefined symbols become unconstrained entries.
    pub fn add_always_on(&mut self, symbol: impl Into<String>) {
        let symbol = symbol.into();
        self.entries.entry(symbol.clone()).or_insert(None);
        self.always_on.insert(symbol);
    }

    /// Blacklists `symbol`. Undefined symbols become unconstrained entries.
    pub fn add_always_off(&mut self, symbol: impl Into<String>) {
        let symbol = symbol.into();
        self.entries.entry(symbol.clone()).or_insert(None);
        self.always_off.insert(symbol);
    }

    /// Values of an `UNDERTAKER_SET` key, other than `ALWAYS_ON`/`ALWAYS_OFF`.
    pub fn meta_value(&self, key: &str) -> Option<&[String]> {
        self.meta.get(key).map(Vec::as_slice)
    }

    pub fn set_meta_value(&mut self, key: impl Into<String>, values: Vec<String>) {
        self.meta.insert(key.into(), values);
    }

    fn add_meta(&mut self, key: &str, values: impl Iterator<Item = String>) {
        match key {
            ALWAYS_ON => values.for_each(|v| self.add_always_on(v)),
            ALWAYS_OFF => values.for_each(|v| self.add_always_off(v)),
            _ => self.meta.entry(key.to_string()).or_default().extend(values),
        }
    }

    pub fn type_source(&self) -> Option<&TypeSource> {
        self.type_source.as_ref()
    }

    pub fn set_type_source(&mut self, source: TypeSource) {
        self.type_source = Some(source);
    }

    /// Items mentioned in the condition of `symbol`.
    ///
    /// This is a textual split on the operator characters `()&!|><-`, not a
    /// parse. Unknown and unconstrained symbols mention nothing.
    pub fn mentioned_items(&self, symbol: &str) -> Vec<&str> {
        let Some(expr) = self.expression(symbol) else {
            return Vec::new();
        };
        expr.split(|c| matches!(c, '(' | ')' | '&' | '!' | '|' | '>' | '<' | '-'))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Symbols no other symbol's condition mentions, sorted.
    ///
    /// `_MODULE` symbols are never leaves, and a mention of `X_MODULE` counts
    /// as a mention of `X`. A symbol mentioning itself stays a leaf, so the
    /// tristate pair `X -> !X_MODULE`, `X_MODULE -> !X` does not hide `X`.
    pub fn leaf_features(&self) -> Vec<String> {
        let mut features: BTreeMap<&str, bool> = self
            .entries
            .keys()
            .filter(|key| !key.ends_with("_MODULE"))
            .map(|key| (key.as_str(), true))
            .collect();

        let keys: Vec<&str> = features.keys().copied().collect();
        for key in keys {
            let module = format!("{}_MODULE", key);
            let mut mentions = self.mentioned_items(key);
            mentions.extend(self.mentioned_items(&module));

            for mentioned in mentions {
                let mentioned = mentioned.strip_suffix("_MODULE").unwrap_or(mentioned);
                if mentioned == key {
                    continue;
                }
                if let Some(is_leaf) = features.get_mut(mentioned) {
                    *is_leaf = false;
                }
            }
        }

        features
            .into_iter()
            .filter(|(_, is_leaf)| *is_leaf)
            .map(|(key, _)| key.to_string())
            .collect()
    }

    /// Closure of `initial` under [`mentioned_items`](Self::mentioned_items), sorted.
    pub fn slice_symbols<S: AsRef<str>>(&self, initial: &[S]) -> Vec<String> {
        self.slice_set(initial.iter().map(|s| s.as_ref().to_string()))
            .into_iter()
            .collect()
    }

    fn slice_set(&self, initial: impl IntoIterator<Item = String>) -> BTreeSet<String> {
        let mut visited = BTreeSet::new();
        let mut stack: Vec<String> = initial.into_iter().collect();

        while let Some(symbol) = stack.pop() {
            if visited.insert(symbol.clone()) {
                stack.extend(self.mentioned_items(&symbol).into_iter().map(str::to_string));
            }
        }

        visited
    }

    /// Looks up the item kind of `symbol` in the attached type source.
    ///
    /// The `CONFIG_` prefix is stripped first. If the remaining name is
    /// unknown, a `_MODULE` suffix is stripped too.
    pub fn get_type(&self, symbol: &str) -> Result<ItemKind> {
        let source = self.type_source.as_ref().ok_or(Error::NoTypeSource)?;
        let name = symbol.strip_prefix("CONFIG_").unwrap_or(symbol);
        source
            .get_type(name)
            .or_else(|| name.strip_suffix("_MODULE").and_then(|n| source.get_type(n)))
            .ok_or_else(|| Error::UnknownSymbol(symbol.to_string()))
    }

    /// Returns `true` if `symbol` is a boolean or tristate item.
    ///
    /// Unknown symbols are not boolean or tristate.
    pub fn is_bool_tristate(&self, symbol: &str) -> Result<bool> {
        match self.get_type(symbol) {
            Ok(kind) => Ok(kind.is_bool_tristate()),
            Err(Error::UnknownSymbol(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// A model is incomplete if it is empty or flagged `CONFIGURATION_SPACE_INCOMPLETE`.
    pub fn is_complete(&self) -> bool {
        !self.entries.is_empty() && !self.meta.contains_key(CONFIGURATION_SPACE_INCOMPLETE)
    }

    /// Returns `true` if `symbol` belongs to the configuration space.
    pub fn in_configuration_space(&self, symbol: &str) -> Result<bool> {
        Ok(self.configuration_space()?.is_match(symbol))
    }

    fn configuration_space(&self) -> Result<Regex> {
        let pattern = self
            .meta_value(CONFIGURATION_SPACE_REGEX)
            .and_then(|values| values.first())
            .filter(|p| !p.is_empty());
        match pattern {
            Some(pattern) => {
                log::info!("Set configuration space regex to '{}'", pattern);
                Ok(Regex::new(&format!("^(?:{})$", pattern))?)
            }
            None => Ok(Regex::new(DEFAULT_CONFIGURATION_SPACE_REGEX)?),
        }
    }

    /// Collects the constraints relevant for `start`.
    ///
    /// The relevant symbols are the slice of `start` plus every always-on and
    /// always-off symbol. Each of them that the model defines contributes
    /// `(S -> (expr))` if it has a condition, `S` if it is always on and `!S`
    /// if it is always off. Relevant symbols the model lacks are reported as
    /// missing if they lie in the configuration space and are not placeholders.
    pub fn intersect<S: AsRef<str>>(&self, start: &[S]) -> Result<Intersection> {
        let space = self.configuration_space()?;

        let mut interesting = self.slice_set(start.iter().map(|s| s.as_ref().to_string()));
        interesting.extend(self.always_on.iter().cloned());
        interesting.extend(self.always_off.iter().cloned());

        let mut clauses = Vec::new();
        let mut result = Intersection::default();
        for symbol in interesting {
            match self.entries.get(&symbol) {
                Some(expr) => {
                    result.valid_items += 1;
                    if let Some(expr) = expr {
                        clauses.push(format!("({} -> ({}))", symbol, expr));
                    }
                    if self.always_on.contains(&symbol) {
                        clauses.push(symbol.clone());
                    }
                    if self.always_off.contains(&symbol) {
                        clauses.push(format!("!{}", symbol));
                    }
                }
                None => {
                    if space.is_match(&symbol) && symbol.len() > 1 && !symbol.starts_with(FREE_ITEM_PREFIX) {
                        result.missing.insert(symbol);
                    }
                }
            }
        }
        result.formula = clauses.join("\n&& ");

        log::debug!(
            "Out of {} items {} have been put in the missing set",
            start.len(),
            result.missing.len()
        );
        Ok(result)
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, key: &str, values: &[String]) -> fmt::Result {
    write!(f, "{} {}", META_TAG, key)?;
    for value in values {
        write!(f, " \"{}\"", value)?;
    }
    writeln!(f)
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "I: Items-Count: {}", self.entries.len())?;
        writeln!(f, "I: Format: <variable> [presence condition]")?;
        if let Some(version) = self.meta.get(SCHEMA_VERSION) {
            writeln!(f, "{} {} {}", META_TAG, SCHEMA_VERSION, version.join(" "))?;
        }
        if !self.always_on.is_empty() {
            write_quoted(f, ALWAYS_ON, &self.always_on.iter().cloned().collect::<Vec<_>>())?;
        }
        if !self.always_off.is_empty() {
            write_quoted(f, ALWAYS_OFF, &self.always_off.iter().cloned().collect::<Vec<_>>())?;
        }
        for (key, values) in &self.meta {
            if key != SCHEMA_VERSION {
                write_quoted(f, key, values)?;
            }
        }

        for (symbol, expr) in &self.entries {
            match expr {
                Some(expr) => writeln!(f, "{} \"{}\"", symbol, expr)?,
                None => writeln!(f, "{}", symbol)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    const MODEL: &str = r#"I: Items-Count: 12399
I: Format: <variable> [presence condition]
UNDERTAKER_SET SCHEMA_VERSION 1.1
UNDERTAKER_SET ALWAYS_ON "CONFIG_ALWAYS_ON" "CONFIG_BARFOO"
CONFIG_A
CONFIG_X "CONFIG_C -> CONFIG_FOO && (CONFIG_BLA)"
CONFIG_B CONFIG_A
CONFIG_C "!CONFIG_C_MODULE"
CONFIG_C_MODULE "!CONFIG_C && CONFIG_MODULE"
"#;

    fn model() -> Model {
        Model::from_model_str(MODEL).unwrap()
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_all_symbols_included() {
        let model = model();
        for symbol in [
            "CONFIG_ALWAYS_ON",
            "CONFIG_BARFOO",
            "CONFIG_A",
            "CONFIG_B",
            "CONFIG_C",
            "CONFIG_C_MODULE",
            "CONFIG_X",
        ] {
            assert!(model.contains(symbol), "{} not in model", symbol);
        }
        assert_eq!(model.len(), 7);
        assert_eq!(model.expression("CONFIG_B"), Some("CONFIG_A"));
        assert_eq!(model.expression("CONFIG_C"), Some("!CONFIG_C_MODULE"));
        assert_eq!(model.expression("CONFIG_A"), None);
        assert_eq!(model.always_on(), &set(&["CONFIG_ALWAYS_ON", "CONFIG_BARFOO"]));
        assert_eq!(model.meta_value(SCHEMA_VERSION), Some(&["1.1".to_string()][..]));
    }

    #[test]
    fn test_mentioned_items() {
        let model = model();
        assert!(model.mentioned_items("CONFIG_A").is_empty());
        assert!(model.mentioned_items("CONFIG_XYZ").is_empty());
        assert_eq!(model.mentioned_items("CONFIG_B"), vec!["CONFIG_A"]);
        assert_eq!(
            model.mentioned_items("CONFIG_X"),
            vec!["CONFIG_C", "CONFIG_FOO", "CONFIG_BLA"]
        );
        assert_eq!(model.mentioned_items("CONFIG_C"), vec!["CONFIG_C_MODULE"]);
        assert_eq!(
            model.mentioned_items("CONFIG_C_MODULE"),
            vec!["CONFIG_C", "CONFIG_MODULE"]
        );
    }

    #[test]
    fn test_leaf_features() {
        let model = model();
        assert_eq!(
            model.leaf_features(),
            vec!["CONFIG_ALWAYS_ON", "CONFIG_B", "CONFIG_BARFOO", "CONFIG_X"]
        );
    }

    #[test]
    fn test_slice_symbols() {
        let model = model();
        assert_eq!(model.slice_symbols(&["CONFIG_B"]), vec!["CONFIG_A", "CONFIG_B"]);
        assert_eq!(model.slice_symbols(&["CONFIG_A"]), vec!["CONFIG_A"]);
        assert_eq!(
            model.slice_symbols(&["CONFIG_X"]),
            vec![
                "CONFIG_BLA",
                "CONFIG_C",
                "CONFIG_C_MODULE",
                "CONFIG_FOO",
                "CONFIG_MODULE",
                "CONFIG_X"
            ]
        );
    }

    #[test]
    fn test_slice_is_closed() {
        let model = model();
        for symbol in model.symbols() {
            let slice = model.slice_symbols(&[symbol]);
            assert!(slice.iter().any(|s| s == symbol));
            for member in &slice {
                for mentioned in model.mentioned_items(member) {
                    assert!(slice.iter().any(|s| s == mentioned), "{} not in slice of {}", mentioned, symbol);
                }
            }
        }
    }

    #[test]
    fn test_no_type_source() {
        let model = model();
        assert!(matches!(model.get_type("CONFIG_A"), Err(Error::NoTypeSource)));
        assert!(matches!(model.is_bool_tristate("CONFIG_A"), Err(Error::NoTypeSource)));
    }

    #[test]
    fn test_rsf_type_source() {
        let mut model = model();
        model.set_type_source(TypeSource::Rsf(RsfReader::from_text(
            "Item A boolean\nItem C tristate\nItem S string\n",
        )));
        assert_eq!(model.get_type("CONFIG_A").unwrap(), ItemKind::Boolean);
        assert_eq!(model.get_type("CONFIG_C_MODULE").unwrap(), ItemKind::Tristate);
        assert_eq!(model.get_type("S").unwrap(), ItemKind::String);
        assert!(matches!(model.get_type("CONFIG_NOPE"), Err(Error::UnknownSymbol(_))));
        assert!(model.is_bool_tristate("CONFIG_C").unwrap());
        assert!(!model.is_bool_tristate("CONFIG_S").unwrap());
        assert!(!model.is_bool_tristate("CONFIG_NOPE").unwrap());
    }

    #[test]
    fn test_cnf_model() {
        let model = Model::from_cnf_str(
            "c File Format Version: 2.0\n\
             c sym A 1\n\
             c sym B 2\n\
             c sym H 4\n\
             c meta_value ALWAYS_ON CONFIG_A\n\
             c meta_value ALWAYS_OFF CONFIG_H\n\
             c meta_value CONFIGURATION_SPACE_INCOMPLETE 1\n\
             p cnf 2 1\n\
             1 -2 0\n",
        )
        .unwrap();
        assert_eq!(
            model.symbols().collect::<Vec<_>>(),
            vec!["CONFIG_A", "CONFIG_B", "CONFIG_B_MODULE", "CONFIG_H"]
        );
        assert_eq!(model.always_on(), &set(&["CONFIG_A"]));
        assert_eq!(model.always_off(), &set(&["CONFIG_H"]));
        assert_eq!(model.get_type("CONFIG_B_MODULE").unwrap(), ItemKind::Tristate);
        assert_eq!(model.get_type("CONFIG_H").unwrap(), ItemKind::Hex);
        assert!(!model.is_complete());
    }

    #[test]
    fn test_cnf_invalid_type_code() {
        let err = Model::from_cnf_str("c sym A 1\nc sym B 9\n").unwrap_err();
        assert!(matches!(err, Error::Malformed { line: 2, .. }));
        assert!(Model::from_cnf_str("c sym A\n").is_err());
    }

    #[test]
    fn test_display_roundtrip() {
        let mut model = model();
        model.add_always_off("CONFIG_D");
        let text = model.to_string();
        assert!(text.starts_with("I: Items-Count: 8\nI: Format: <variable> [presence condition]\n"));
        assert!(text.contains("UNDERTAKER_SET SCHEMA_VERSION 1.1\n"));
        assert!(text.contains("UNDERTAKER_SET ALWAYS_ON \"CONFIG_ALWAYS_ON\" \"CONFIG_BARFOO\"\n"));
        assert!(text.contains("UNDERTAKER_SET ALWAYS_OFF \"CONFIG_D\"\n"));
        assert!(text.contains("CONFIG_B \"CONFIG_A\"\n"));
        assert!(text.contains("\nCONFIG_A\n"));

        let reread = Model::from_model_str(&text).unwrap();
        assert_eq!(reread.to_string(), text);
    }

    #[test]
    fn test_intersect() {
        let model = model();
        let result = model.intersect(&["CONFIG_B", "CONFIG_UNKNOWN", "__FREE__3"]).unwrap();
        assert_eq!(result.valid_items, 4);
        assert_eq!(result.missing, set(&["CONFIG_UNKNOWN"]));
        assert_eq!(
            result.formula,
            "CONFIG_ALWAYS_ON\n&& (CONFIG_B -> (CONFIG_A))\n&& CONFIG_BARFOO"
        );
    }

    #[test]
    fn test_configuration_space_regex() {
        let mut model = model();
        assert!(model.is_complete());
        assert!(model.in_configuration_space("CONFIG_FOO").unwrap());
        assert!(!model.in_configuration_space("FOO").unwrap());

        model.set_meta_value(CONFIGURATION_SPACE_REGEX, vec!["^(CONFIG|BR2)_[^ ]+$".to_string()]);
        assert!(model.in_configuration_space("BR2_FOO").unwrap());
        let result = model.intersect(&["BR2_FOO", "OTHER"]).unwrap();
        assert_eq!(result.missing, set(&["BR2_FOO"]));

        model.set_meta_value(CONFIGURATION_SPACE_REGEX, vec!["(".to_string()]);
        assert!(matches!(model.intersect(&["CONFIG_A"]), Err(Error::Regex(_))));
    }

    #[test]
    fn test_meta_values_keep_spaces() {
        let model = Model::from_model_str(
            "UNDERTAKER_SET CONFIGURATION_SPACE_REGEX \"^CONFIG_[^ ]+$\"\nCONFIG_A\n",
        )
        .unwrap();
        assert_eq!(
            model.meta_value(CONFIGURATION_SPACE_REGEX),
            Some(&["^CONFIG_[^ ]+$".to_string()][..])
        );
        assert!(Model::from_model_str("UNDERTAKER_SET ALWAYS_ON \"CONFIG_A\n").is_err());
    }

    #[test]
    fn test_load_and_save() {
        let dir = std::env::temp_dir().join(format!("kconfig-model-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let model_path = dir.join("x86.model");
        model().save(&model_path).unwrap();
        let loaded = Model::load(&model_path).unwrap();
        assert!(loaded.type_source().is_none());
        assert_eq!(loaded.expression("CONFIG_B"), Some("CONFIG_A"));

        fs::write(dir.join("x86.rsf"), "Item A boolean\n").unwrap();
        let loaded = Model::load(&model_path).unwrap();
        assert_eq!(loaded.get_type("CONFIG_A").unwrap(), ItemKind::Boolean);

        let cnf_path = dir.join("x86.cnf");
        fs::write(&cnf_path, "c sym A 2\n").unwrap();
        let loaded = Model::load(&cnf_path).unwrap();
        assert!(loaded.contains("CONFIG_A_MODULE"));

        assert!(matches!(Model::load(dir.join("missing.model")), Err(Error::Io(_))));
        fs::remove_dir_all(&dir).unwrap();
    }
}
