//! Reader for relational Kconfig dumps (`.rsf`).
//!
//! Every line of a dump is a shell-quoted row whose first token names the
//! relation:
//!
//! ```text
//! Item        <name> <kind>            kind: boolean, tristate, int, hex, string, ...
//! HasPrompts  <name> <count>
//! Depends     <name> <expr>
//! Default     <name> <state> <cond>
//! ItemSelects <name> <target> <cond>
//! Choice      <name> <required|optional> <tristate|boolean>
//! ChoiceItem  <item> <choice>
//! ```
//!
//! Rows with any other tag are ignored. The reader builds the option table
//! once, at construction, and is immutable afterwards.
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::error::{Error, Result};
use crate::rewrite::{BoolRewriter, ItemLookup};
use crate::types::ItemKind;

/// Relation tags understood by the reader.
pub const RELATIONS: [&str; 7] = [
    "Item",
    "HasPrompts",
    "Default",
    "ItemSelects",
    "Depends",
    "Choice",
    "ChoiceItem",
];

const SYMBOL_PREFIX: &str = "CONFIG_";

/// Returns the `CONFIG_` symbol of an item.
///
/// Names that already carry the prefix are returned unchanged, so lowering
/// already-normalized text is a no-op.
pub fn symbol(name: &str) -> Result<String> {
    if name.chars().any(char::is_whitespace) {
        return Err(Error::OptionInvalid(name.to_string()));
    }
    if name.starts_with(SYMBOL_PREFIX) {
        Ok(name.to_string())
    } else {
        Ok(format!("{}{}", SYMBOL_PREFIX, name))
    }
}

/// Returns the `CONFIG_<NAME>_MODULE` symbol of an item.
pub fn symbol_module(name: &str) -> Result<String> {
    Ok(format!("{}_MODULE", symbol(name)?))
}

/// A plain configuration item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigItem {
    pub name: String,
    pub kind: ItemKind,
    pub prompts: usize,
    /// Raw `depends on` text. Several `Depends` rows are joined with `&&`.
    pub depends: Option<String>,
}

/// A group of mutually exclusive items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub name: String,
    /// If `false`, selecting none of the members is valid.
    pub required: bool,
    pub tristate: bool,
    /// Member item names, in dump order.
    pub members: Vec<String>,
    pub prompts: usize,
    pub depends: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOption {
    Item(ConfigItem),
    Choice(Choice),
}

impl ConfigOption {
    pub fn name(&self) -> &str {
        match self {
            ConfigOption::Item(item) => &item.name,
            ConfigOption::Choice(choice) => &choice.name,
        }
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            ConfigOption::Item(item) => item.kind,
            ConfigOption::Choice(choice) if choice.tristate => ItemKind::Tristate,
            ConfigOption::Choice(_) => ItemKind::Boolean,
        }
    }

    pub fn is_tristate(&self) -> bool {
        self.kind() == ItemKind::Tristate
    }

    pub fn is_choice(&self) -> bool {
        matches!(self, ConfigOption::Choice(_))
    }

    pub fn is_hex(&self) -> bool {
        self.kind() == ItemKind::Hex
    }

    pub fn is_string(&self) -> bool {
        self.kind() == ItemKind::String
    }

    pub fn is_integer(&self) -> bool {
        self.kind() == ItemKind::Integer
    }

    /// Number of prompts. Items without a prompt can only be set by defaults or selects.
    pub fn prompts(&self) -> usize {
        match self {
            ConfigOption::Item(item) => item.prompts,
            ConfigOption::Choice(choice) => choice.prompts,
        }
    }

    pub fn has_depends(&self) -> bool {
        self.raw_depends().is_some()
    }

    pub fn raw_depends(&self) -> Option<&str> {
        match self {
            ConfigOption::Item(item) => item.depends.as_deref(),
            ConfigOption::Choice(choice) => choice.depends.as_deref(),
        }
    }

    pub fn symbol(&self) -> Result<String> {
        symbol(self.name())
    }

    /// Fails with [`Error::OptionNotTristate`] for non-tristate options.
    pub fn symbol_module(&self) -> Result<String> {
        let name = symbol(self.name())?;
        if !self.is_tristate() {
            return Err(Error::OptionNotTristate(self.name().to_string()));
        }
        Ok(format!("{}_MODULE", name))
    }

    /// The normalized `depends on` condition.
    ///
    /// A dependency that cannot be parsed or rewritten counts as no dependency.
    pub fn dependency(&self, rsf: &RsfReader, eval_to_module: bool) -> Option<String> {
        self.dependency_with(&BoolRewriter::new(rsf, eval_to_module))
    }

    /// Same as [`dependency`](Self::dependency), with a preconfigured rewriter.
    pub fn dependency_with(&self, rewriter: &BoolRewriter<'_, RsfReader>) -> Option<String> {
        let depends = self.raw_depends()?;
        match rewriter.rewrite_str(depends) {
            Ok(expr) => Some(expr),
            Err(e) => {
                log::debug!("Ignoring dependency of {} ('{}'): {}", self.name(), depends, e);
                None
            }
        }
    }
}

impl Choice {
    /// Implications contributed by this choice, keyed by symbol.
    ///
    /// - every member implies the choice,
    /// - the choice implies that exactly one member is selected (or, if the
    ///   choice is optional, possibly none),
    /// - for a tristate choice, `CHOICE_MODULE` excludes every member as
    ///   built-in, and a tristate member's module symbol implies `CHOICE_MODULE`.
    pub fn insert_forward_references(&self, rsf: &RsfReader) -> Result<BTreeMap<String, Vec<String>>> {
        let choice_symbol = symbol(&self.name)?;
        let choice_module = symbol_module(&self.name)?;

        let mut deps: BTreeMap<String, Vec<String>> = BTreeMap::new();
        deps.insert(choice_symbol.clone(), Vec::new());
        if self.tristate {
            deps.insert(choice_module.clone(), Vec::new());
        }

        let mut own_items = Vec::new();
        for member in &self.members {
            let Some(option) = rsf.option(member) else {
                continue;
            };
            let member_symbol = symbol(member)?;
            own_items.push(member_symbol.clone());
            deps.insert(member_symbol.clone(), vec![choice_symbol.clone()]);

            if self.tristate {
                if let Some(module_deps) = deps.get_mut(&choice_module) {
                    module_deps.push(format!("!{}", member_symbol));
                }
                if option.is_tristate() {
                    deps.insert(symbol_module(member)?, vec![choice_module.clone()]);
                }
            }
        }

        if !own_items.is_empty() {
            let mut clause_count = own_items.len();
            if !self.required {
                // The extra clause has every member negated.
                clause_count += 1;
            }
            let clauses: Vec<String> = (0..clause_count)
                .map(|x| {
                    own_items
                        .iter()
                        .enumerate()
                        .map(|(y, item)| if x == y { item.clone() } else { format!("!{}", item) })
                        .collect::<Vec<_>>()
                        .join(" && ")
                })
                .collect();
            if let Some(choice_deps) = deps.get_mut(&choice_symbol) {
                choice_deps.push(format!("(({}))", clauses.join(") || (")));
            }
        }

        Ok(deps)
    }
}

/// Splits a row like a POSIX shell would: whitespace separates words,
/// quotes group them and backslashes escape.
///
/// Returns `None` on an unterminated quote or a trailing backslash.
pub fn split_row(line: &str) -> Option<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            '\'' => {
                in_word = true;
                loop {
                    match chars.next()? {
                        '\'' => break,
                        c => current.push(c),
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next()? {
                        '"' => break,
                        '\\' => match chars.next()? {
                            c @ ('"' | '\\' | '$' | '`') => current.push(c),
                            '\n' => {}
                            c => {
                                current.push('\\');
                                current.push(c);
                            }
                        },
                        c => current.push(c),
                    }
                }
            }
            '\\' => {
                in_word = true;
                current.push(chars.next()?);
            }
            c => {
                in_word = true;
                current.push(c);
            }
        }
    }
    if in_word {
        words.push(current);
    }
    Some(words)
}

/// The item model of one Kconfig dump.
#[derive(Debug, Clone, Default)]
pub struct RsfReader {
    database: HashMap<String, Vec<Vec<String>>>,
    options: BTreeMap<String, ConfigOption>,
}

impl RsfReader {
    /// Reads a dump from text.
    pub fn from_text(text: &str) -> Self {
        let mut database: HashMap<String, Vec<Vec<String>>> = HashMap::new();
        for key in RELATIONS {
            database.insert(key.to_string(), Vec::new());
        }

        for (line_num, line) in text.lines().enumerate() {
            let Some(mut row) = split_row(line) else {
                log::warn!("Couldn't parse line {}: {}", line_num + 1, line);
                continue;
            };
            if row.len() < 2 {
                continue;
            }
            if let Some(rows) = database.get_mut(row[0].as_str()) {
                row.remove(0);
                rows.push(row);
            }
        }

        let options = build_options(&database);
        log::debug!("Read {} options", options.len());
        Self { database, options }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut text = String::new();
        for line in BufReader::new(reader).lines() {
            text.push_str(&line?);
            text.push('\n');
        }
        Ok(Self::from_text(&text))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(Self::from_text(&text))
    }

    /// All rows of a relation, without the tag.
    pub fn rows(&self, relation: &str) -> &[Vec<String>] {
        self.database.get(relation).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All items and choices, keyed by name.
    pub fn options(&self) -> &BTreeMap<String, ConfigOption> {
        &self.options
    }

    pub fn option(&self, name: &str) -> Option<&ConfigOption> {
        self.options.get(name)
    }

    /// Groups the rows of `relation` by column `col`.
    ///
    /// Each value holds the remaining columns of one row. Rows too short to
    /// have column `col` are skipped.
    pub fn collect(&self, relation: &str, col: usize) -> BTreeMap<String, Vec<Vec<String>>> {
        collect_rows(self.rows(relation), col)
    }

    /// Returns the `.rsf` kind of an item or choice.
    pub fn get_type(&self, name: &str) -> Option<ItemKind> {
        self.option(name).map(ConfigOption::kind)
    }

    pub fn is_bool_tristate(&self, name: &str) -> bool {
        self.get_type(name).is_some_and(ItemKind::is_bool_tristate)
    }
}

impl ItemLookup for RsfReader {
    fn is_tristate(&self, name: &str) -> bool {
        self.option(name).is_some_and(ConfigOption::is_tristate)
    }
}

fn collect_rows(rows: &[Vec<String>], col: usize) -> BTreeMap<String, Vec<Vec<String>>> {
    let mut result: BTreeMap<String, Vec<Vec<String>>> = BTreeMap::new();
    for row in rows {
        if row.len() <= col {
            continue;
        }
        let mut rest = row.clone();
        let key = rest.remove(col);
        result.entry(key).or_default().push(rest);
    }
    result
}

fn build_options(database: &HashMap<String, Vec<Vec<String>>>) -> BTreeMap<String, ConfigOption> {
    let empty = Vec::new();
    let rows = |key: &str| database.get(key).unwrap_or(&empty);

    let mut depends: HashMap<String, String> = HashMap::new();
    for (name, exprs) in collect_rows(rows("Depends"), 0) {
        let exprs: Vec<&str> = exprs.iter().filter_map(|r| r.first().map(String::as_str)).collect();
        let joined = match exprs.as_slice() {
            [] => continue,
            [single] => single.to_string(),
            many => format!("({})", many.join(") && (")),
        };
        depends.insert(name, joined);
    }

    let mut prompts: HashMap<String, usize> = HashMap::new();
    for row in rows("HasPrompts") {
        if let [name, count, ..] = row.as_slice() {
            match count.parse::<usize>() {
                Ok(count) => {
                    prompts.insert(name.clone(), count);
                }
                Err(_) => log::warn!("Invalid prompt count for {}: '{}'", name, count),
            }
        }
    }

    let members = collect_rows(rows("ChoiceItem"), 1);

    let mut options = BTreeMap::new();
    for row in rows("Item") {
        let [name, kind, ..] = row.as_slice() else {
            continue;
        };
        let item = ConfigItem {
            name: name.clone(),
            kind: ItemKind::from_rsf(kind),
            prompts: prompts.get(name).copied().unwrap_or(0),
            depends: depends.get(name).cloned(),
        };
        options.insert(name.clone(), ConfigOption::Item(item));
    }

    for row in rows("Choice") {
        let [name, required, rest @ ..] = row.as_slice() else {
            continue;
        };
        let choice = Choice {
            name: name.clone(),
            required: required == "required",
            tristate: rest.first().is_some_and(|t| t == "tristate"),
            members: members
                .get(name)
                .map(|items| items.iter().filter_map(|r| r.first().cloned()).collect())
                .unwrap_or_default(),
            prompts: prompts.get(name).copied().unwrap_or(0),
            depends: depends.get(name).cloned(),
        };
        options.insert(name.clone(), ConfigOption::Choice(choice));
    }

    options
}
