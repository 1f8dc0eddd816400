//! Partial configurations as restricted CNF.
//!
//! A [`Selection`] is a conjunction of clauses, each clause a disjunction of
//! [`Assignment`]s such as `CONFIG_PM=y` or `CONFIG_ACPI=m`. It renders
//! canonically, so two selections are equal iff they print the same:
//!
//! ```
//! use kconfig_model::selection::Selection;
//!
//! let s = Selection::from_symbol_clauses(&[&["CONFIG_PM"], &["CONFIG_SOUND", "CONFIG_ACPI_MODULE"]]);
//! assert_eq!(s.to_string(), "(CONFIG_ACPI_MODULE || CONFIG_SOUND) && CONFIG_PM");
//! ```
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::types::Tristate;

/// A single `symbol=value` literal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Assignment {
    pub symbol: String,
    pub value: Tristate,
}

impl Assignment {
    pub fn new(symbol: impl Into<String>, value: Tristate) -> Self {
        Self {
            symbol: symbol.into(),
            value,
        }
    }

    /// `CONFIG_X` is `CONFIG_X=y`, `CONFIG_X_MODULE` is `CONFIG_X=m`.
    pub fn from_symbol(symbol: &str) -> Self {
        match symbol.strip_suffix("_MODULE") {
            Some(base) if !base.is_empty() => Self::new(base, Tristate::Module),
            _ => Self::new(symbol, Tristate::Yes),
        }
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Tristate::Yes => write!(f, "{}", self.symbol),
            Tristate::Module => write!(f, "{}_MODULE", self.symbol),
            Tristate::No => write!(f, "!{}", self.symbol),
        }
    }
}

type Clause = BTreeSet<Assignment>;

#[derive(Debug, Clone)]
pub struct Selection {
    clauses: Vec<Clause>,
    symbols: BTreeSet<String>,
}

impl Default for Selection {
    fn default() -> Self {
        Self::new()
    }
}

impl Selection {
    /// An empty selection: one clause without alternatives.
    pub fn new() -> Self {
        Self {
            clauses: vec![Clause::new()],
            symbols: BTreeSet::new(),
        }
    }

    pub fn from_clauses<C, I>(clauses: C) -> Self
    where
        C: IntoIterator<Item = I>,
        I: IntoIterator<Item = Assignment>,
    {
        let clauses: Vec<Clause> = clauses.into_iter().map(|c| c.into_iter().collect()).collect();
        if clauses.is_empty() {
            return Self::new();
        }
        let symbols = clauses
            .iter()
            .flatten()
            .map(|a| a.symbol.clone())
            .collect();
        Self { clauses, symbols }
    }

    /// Builds a selection from `CONFIG_X` / `CONFIG_X_MODULE` spellings.
    pub fn from_symbol_clauses(clauses: &[&[&str]]) -> Self {
        Self::from_clauses(
            clauses
                .iter()
                .map(|clause| clause.iter().map(|s| Assignment::from_symbol(s)).collect::<Vec<_>>()),
        )
    }

    pub fn clauses(&self) -> &[BTreeSet<Assignment>] {
        &self.clauses
    }

    /// Number of clauses, empty ones included.
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.iter().all(BTreeSet::is_empty)
    }

    /// All symbols mentioned, regardless of value.
    pub fn symbols(&self) -> &BTreeSet<String> {
        &self.symbols
    }

    /// Starts a new, empty clause.
    pub fn push_down(&mut self) {
        self.clauses.push(Clause::new());
    }

    /// Adds `symbol=value` to the last clause.
    pub fn add_alternative(&mut self, symbol: impl Into<String>, value: Tristate) {
        let symbol = symbol.into();
        self.symbols.insert(symbol.clone());
        match self.clauses.last_mut() {
            Some(clause) => {
                clause.insert(Assignment::new(symbol, value));
            }
            None => self.clauses.push(BTreeSet::from([Assignment::new(symbol, value)])),
        }
    }

    /// One assignment per non-empty clause: the smallest alternative.
    pub fn features(&self) -> BTreeMap<String, Tristate> {
        self.clauses
            .iter()
            .filter_map(|clause| clause.first())
            .map(|a| (a.symbol.clone(), a.value))
            .collect()
    }

    /// Returns `true` if `feature` (with or without `_MODULE`) is mentioned.
    pub fn feature_in_selection(&self, feature: &str) -> bool {
        let feature = feature.strip_suffix("_MODULE").unwrap_or(feature);
        self.symbols.contains(feature) || self.symbols.contains(&format!("{}_MODULE", feature))
    }

    /// `self` is better if it has fewer clauses, all of which appear in `other`.
    pub fn better_than(&self, other: &Selection) -> bool {
        self.clauses.len() < other.clauses.len() && self.clauses.iter().all(|c| other.clauses.contains(c))
    }

    /// Merges two selections that differ in at most one clause.
    ///
    /// The differing clauses are joined into one. Returns `None` if the clause
    /// counts differ or more than one clause differs.
    pub fn merge(&self, other: &Selection) -> Option<Selection> {
        if self.clauses.len() != other.clauses.len() {
            return None;
        }

        let (common, ours): (Vec<&Clause>, Vec<&Clause>) =
            self.clauses.iter().partition(|c| other.clauses.contains(c));
        let theirs: Vec<&Clause> = other.clauses.iter().filter(|c| !self.clauses.contains(c)).collect();
        if ours.len() > 1 || theirs.len() > 1 {
            return None;
        }

        let mut clauses: Vec<Clause> = common.into_iter().cloned().collect();
        let union: Clause = ours.into_iter().chain(theirs).flatten().cloned().collect();
        if !union.is_empty() {
            clauses.push(union);
        }
        Some(Selection::from_clauses(clauses))
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rendered: Vec<String> = self
            .clauses
            .iter()
            .filter(|c| !c.is_empty())
            .map(|clause| {
                let mut alternatives: Vec<String> = clause.iter().map(Assignment::to_string).collect();
                alternatives.sort();
                if alternatives.len() == 1 {
                    alternatives.swap_remove(0)
                } else {
                    format!("({})", alternatives.join(" || "))
                }
            })
            .collect();
        rendered.sort();
        write!(f, "{}", rendered.join(" && "))
    }
}

impl PartialEq for Selection {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}

impl Eq for Selection {}
