//! Translation of a Kconfig dump into a presence-condition [`Model`].
//!
//! Every item `X` yields the symbol `CONFIG_X`, and tristate items also yield
//! `CONFIG_X_MODULE`. The condition of a symbol is the conjunction of
//!
//! - the item's own `depends on` (evaluated to `y` for `CONFIG_X` and to
//!   `y` or `m` for `CONFIG_X_MODULE`),
//! - the mutual exclusion of the two tristate symbols,
//! - the constraints a choice puts on its members,
//! - the items this item selects,
//! - the disjunction of everything that can turn a prompt-less item on:
//!   its defaults and the items selecting it.
//!
//! A `default` or `select` whose condition cannot be rewritten is logged and
//! skipped; the rest of the dump is still translated.
use std::collections::HashMap;

use crate::config::TranslatorConfig;
use crate::error::Result;
use crate::model::{Model, TypeSource, SCHEMA_VERSION};
use crate::rewrite::BoolRewriter;
use crate::rsf::{ConfigOption, RsfReader};

/// Translates `rsf` with the given configuration.
///
/// # Examples
///
/// ```
/// use kconfig_model::config::TranslatorConfig;
/// use kconfig_model::rsf::RsfReader;
/// use kconfig_model::translate::translate;
///
/// let rsf = RsfReader::from_text("Item A boolean\nItem B tristate\nDepends B \"A\"\n");
/// let model = translate(&rsf, &TranslatorConfig::default());
/// assert_eq!(model.expression("CONFIG_B"), Some("CONFIG_A && !CONFIG_B_MODULE"));
/// ```
pub fn translate(rsf: &RsfReader, config: &TranslatorConfig) -> Model {
    Translator::new(rsf, config).run()
}

/// Mints the placeholder symbols `__FREE__0`, `__FREE__1`, ...
///
/// A placeholder stands for "on by default": adding it as an alternative to
/// the selects of an item keeps a select from being the only way to enable it.
#[derive(Debug, Clone)]
pub struct FreeItems {
    prefix: String,
    next: usize,
}

impl FreeItems {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
        }
    }

    pub fn mint(&mut self) -> String {
        let item = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        item
    }

    /// Number of placeholders minted so far.
    pub fn count(&self) -> usize {
        self.next
    }
}

/// State of one translation run.
pub struct Translator<'a> {
    rsf: &'a RsfReader,
    config: &'a TranslatorConfig,
    symbols: Vec<String>,
    deps: HashMap<String, Vec<String>>,
    default_selects: HashMap<String, Vec<String>>,
    always_on: Vec<String>,
    free_items: FreeItems,
}

impl<'a> Translator<'a> {
    pub fn new(rsf: &'a RsfReader, config: &'a TranslatorConfig) -> Self {
        Self {
            rsf,
            config,
            symbols: Vec::new(),
            deps: HashMap::new(),
            default_selects: HashMap::new(),
            always_on: Vec::new(),
            free_items: FreeItems::new(config.free_item_prefix.clone()),
        }
    }

    pub fn run(mut self) -> Model {
        let rsf = self.rsf;

        for option in rsf.options().values() {
            if let Err(e) = self.translate_option(option) {
                log::warn!("Skipping option {}: {}", option.name(), e);
            }
        }

        for option in rsf.options().values() {
            if let ConfigOption::Choice(choice) = option {
                match choice.insert_forward_references(rsf) {
                    Ok(references) => {
                        for (symbol, deps) in references {
                            self.deps.entry(symbol).or_default().extend(deps);
                        }
                    }
                    Err(e) => log::warn!("Skipping choice {}: {}", choice.name, e),
                }
            }
        }

        for (name, defaults) in rsf.collect("Default", 0) {
            let Some(option) = rsf.option(&name) else {
                continue;
            };
            for default in &defaults {
                if let Err(e) = self.translate_default(option, default) {
                    log::debug!("Ignoring default {:?} of {}: {}", default, name, e);
                }
            }
        }

        for (name, selects) in rsf.collect("ItemSelects", 0) {
            let Some(option) = rsf.option(&name) else {
                continue;
            };
            for select in &selects {
                if let Err(e) = self.translate_select(option, select) {
                    log::debug!("Ignoring select {:?} of {}: {}", select, name, e);
                }
            }
        }

        self.into_model()
    }

    /// Declares the symbols of `option` together with their dependencies.
    pub fn translate_option(&mut self, option: &ConfigOption) -> Result<()> {
        let symbol = option.symbol()?;
        self.symbols.push(symbol.clone());
        self.deps.insert(symbol.clone(), Vec::new());
        self.default_selects.insert(symbol.clone(), Vec::new());

        if option.is_tristate() {
            let symbol_module = option.symbol_module()?;
            self.symbols.push(symbol_module.clone());
            self.deps.insert(
                symbol_module.clone(),
                vec![format!("!{}", symbol), self.config.modules_symbol.clone()],
            );
            self.deps_of(&symbol).push(format!("!{}", symbol_module));

            // Built-in needs the dependency to be `y`, a module is fine with `m`.
            if let Some(dep) = option.dependency_with(&self.rewriter(false)) {
                self.deps_of(&symbol).insert(0, dep);
            }
            if let Some(dep) = option.dependency_with(&self.rewriter(true)) {
                self.deps_of(&symbol_module).insert(0, dep);
            }
        } else if let Some(dep) = option.dependency_with(&self.rewriter(true)) {
            self.deps_of(&symbol).insert(0, dep);
        }
        Ok(())
    }

    /// Handles one `Default <item> <state> <cond>` row.
    ///
    /// Only prompt-less boolean items are affected, since a user can change
    /// anything else.
    pub fn translate_default(&mut self, option: &ConfigOption, default: &[String]) -> Result<()> {
        let [state, cond] = default else {
            return Ok(());
        };
        if option.is_choice() || option.is_tristate() || option.prompts() != 0 {
            return Ok(());
        }
        let symbol = option.symbol()?;

        if state == "y" && cond == "y" {
            if !self.config.strict_always_on || !option.has_depends() {
                self.always_on.push(symbol.clone());
            }
            let free = self.free_items.mint();
            self.selects_of(&symbol).push(free);
        } else if state == "y" || cond == "y" {
            let expr = if state == "y" { cond } else { state };
            let expr = self.rewriter(true).rewrite_str(expr)?;
            self.selects_of(&symbol).push(expr);
        } else if state.len() > 1 && cond.len() > 1 {
            let expr = self.rewriter(true).rewrite_str(&format!("({}) && ({})", state, cond))?;
            self.selects_of(&symbol).push(expr);
        }
        Ok(())
    }

    /// Handles one `ItemSelects <item> <target> <cond>` row.
    ///
    /// Only boolean targets are considered.
    pub fn translate_select(&mut self, option: &ConfigOption, select: &[String]) -> Result<()> {
        let [target, cond] = select else {
            return Ok(());
        };
        if option.is_choice() {
            return Ok(());
        }
        let rsf = self.rsf;
        let Some(selected) = rsf.option(target) else {
            return Ok(());
        };
        if selected.is_choice() || selected.is_tristate() {
            return Ok(());
        }

        let selected_symbol = selected.symbol()?;
        let implied = if cond == "y" {
            selected_symbol.clone()
        } else {
            let expr = self.rewriter(true).rewrite_str(cond)?;
            format!("(({}) -> {})", expr, selected_symbol)
        };

        let mut selectors = vec![option.symbol()?];
        if option.is_tristate() {
            selectors.push(option.symbol_module()?);
        }
        for selector in selectors {
            if selected.prompts() == 0 {
                self.selects_of(&selected_symbol).push(selector.clone());
            }
            self.deps_of(&selector).push(implied.clone());
        }
        Ok(())
    }

    fn rewriter(&self, eval_to_module: bool) -> BoolRewriter<'a, RsfReader> {
        BoolRewriter::new(self.rsf, eval_to_module).with_modules_symbol(self.config.modules_symbol.as_str())
    }

    fn deps_of(&mut self, symbol: &str) -> &mut Vec<String> {
        self.deps.entry(symbol.to_string()).or_default()
    }

    fn selects_of(&mut self, symbol: &str) -> &mut Vec<String> {
        self.default_selects.entry(symbol.to_string()).or_default()
    }

    fn into_model(mut self) -> Model {
        let mut model = Model::new();

        for symbol in &self.symbols {
            let mut deps = self.deps.remove(symbol).unwrap_or_default();
            if let Some(selects) = self.default_selects.get(symbol).filter(|s| !s.is_empty()) {
                deps.push(format!("({})", selects.join(" || ")));
            }
            let expr = if deps.is_empty() { None } else { Some(deps.join(" && ")) };
            model.insert(symbol.clone(), expr);
        }
        for symbol in self.always_on {
            model.add_always_on(symbol);
        }
        model.set_meta_value(SCHEMA_VERSION, vec![self.config.schema_version.clone()]);
        model.set_type_source(TypeSource::Rsf(self.rsf.clone()));

        log::info!(
            "Translated {} symbols ({} always on, {} placeholders)",
            model.len(),
            model.always_on().len(),
            self.free_items.count()
        );
        model
    }
}
