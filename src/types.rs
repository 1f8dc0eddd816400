//! Value and kind types shared by the dump reader, the rewriter and the models.
//!
//! Kconfig symbols are tri-valued: off (`n`), built-in (`y`) or built as a
//! loadable module (`m`). Items additionally carry a declared kind, which the
//! compiled `.cnf` format encodes as a small integer.
use std::fmt;
use std::str::FromStr;

/// A tristate value.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Tristate {
    /// Built-in (`y`).
    Yes,
    /// Built as module (`m`).
    Module,
    /// Off (`n`).
    No,
}

impl Tristate {
    /// Returns the literal spelling (`y`, `m` or `n`).
    pub fn as_str(self) -> &'static str {
        match self {
            Tristate::Yes => "y",
            Tristate::Module => "m",
            Tristate::No => "n",
        }
    }

    /// Parses a literal. Only the lower-case spellings are literals.
    pub fn from_literal(s: &str) -> Option<Self> {
        match s {
            "y" => Some(Tristate::Yes),
            "m" => Some(Tristate::Module),
            "n" => Some(Tristate::No),
            _ => None,
        }
    }
}

impl fmt::Display for Tristate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Tristate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tristate::from_literal(s).ok_or_else(|| format!("not a tristate literal: '{}'", s))
    }
}

/// The declared kind of a configuration item.
///
/// The discriminants are the type codes of the `.cnf` format
/// (`c sym <name> <code>`).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ItemKind {
    Boolean = 1,
    Tristate = 2,
    Integer = 3,
    Hex = 4,
    String = 5,
    Other = 6,
}

impl ItemKind {
    /// Parses the kind column of an `Item` row. Unknown kinds map to [`ItemKind::Other`].
    pub fn from_rsf(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "boolean" | "bool" => ItemKind::Boolean,
            "tristate" => ItemKind::Tristate,
            "integer" | "int" => ItemKind::Integer,
            "hex" => ItemKind::Hex,
            "string" => ItemKind::String,
            _ => ItemKind::Other,
        }
    }

    /// Converts a `.cnf` type code.
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(ItemKind::Boolean),
            2 => Some(ItemKind::Tristate),
            3 => Some(ItemKind::Integer),
            4 => Some(ItemKind::Hex),
            5 => Some(ItemKind::String),
            6 => Some(ItemKind::Other),
            _ => None,
        }
    }

    /// Returns the `.cnf` type code.
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Returns `true` for boolean and tristate items.
    pub fn is_bool_tristate(self) -> bool {
        matches!(self, ItemKind::Boolean | ItemKind::Tristate)
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ItemKind::Boolean => "boolean",
            ItemKind::Tristate => "tristate",
            ItemKind::Integer => "integer",
            ItemKind::Hex => "hex",
            ItemKind::String => "string",
            ItemKind::Other => "other",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    #[test]
    fn test_tristate_literals() {
        assert_eq!(Tristate::from_literal("y"), Some(Tristate::Yes));
        assert_eq!(Tristate::from_literal("m"), Some(Tristate::Module));
        assert_eq!(Tristate::from_literal("n"), Some(Tristate::No));
        assert_eq!(Tristate::from_literal("Y"), None);
        assert_eq!(Tristate::from_literal("yes"), None);
        assert_eq!("m".parse::<Tristate>(), Ok(Tristate::Module));
        assert_eq!(Tristate::No.to_string(), "n");
    }

    #[test]
    fn test_item_kind_from_rsf() {
        assert_eq!(ItemKind::from_rsf("boolean"), ItemKind::Boolean);
        assert_eq!(ItemKind::from_rsf("Tristate"), ItemKind::Tristate);
        assert_eq!(ItemKind::from_rsf("hex"), ItemKind::Hex);
        assert_eq!(ItemKind::from_rsf("string"), ItemKind::String);
        assert_eq!(ItemKind::from_rsf("integer"), ItemKind::Integer);
        assert_eq!(ItemKind::from_rsf("XXX"), ItemKind::Other);
    }

    #[test]
    fn test_item_kind_codes() {
        for code in 1..=6 {
            let kind = ItemKind::from_code(code).unwrap();
            assert_eq!(kind.code(), code);
        }
        assert_eq!(ItemKind::from_code(0), None);
        assert_eq!(ItemKind::from_code(7), None);
        assert!(ItemKind::Tristate.is_bool_tristate());
        assert!(!ItemKind::Hex.is_bool_tristate());
    }
}
