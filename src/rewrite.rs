//! Tristate-aware normalization of Kconfig conditions.
//!
//! A condition such as `SSB && (PCI || PCI=SSB)` talks about items, whose
//! values are `y`, `m` or `n`. The normalized form talks about propositional
//! symbols instead: `CONFIG_X` is true iff `X=y`, and `CONFIG_X_MODULE` is
//! true iff `X=m`. Rewriting runs three passes over the tree, in this order:
//!
//! 1. **Negation pushdown** (De Morgan): `!` ends up directly above identifiers
//!    and literals, and negated comparisons flip their operator.
//! 2. **Tristate expansion**: a bare tristate item `B` in boolean position means
//!    `B!=n` when evaluating to module (`m` counts as present) and `B=y`
//!    otherwise; `!B` means `B!=y` respectively `B=n`.
//! 3. **Lowering**: identifiers become `CONFIG_` symbols and comparisons are
//!    expanded over the `CONFIG_X`/`CONFIG_X_MODULE` pair. A bare `m` becomes
//!    the modules symbol; `y` under `&&` and `n` under `||` are dropped.
//!
//! ```
//! use kconfig_model::rsf::RsfReader;
//! use kconfig_model::rewrite::rewrite;
//!
//! let rsf = RsfReader::from_text("Item A boolean\nItem B tristate\n");
//! assert_eq!(rewrite(&rsf, "A && B", true).unwrap(), "(CONFIG_A && (CONFIG_B_MODULE || CONFIG_B))");
//! assert_eq!(rewrite(&rsf, "!B", false).unwrap(), "(!CONFIG_B_MODULE && !CONFIG_B)");
//! ```
use std::collections::HashMap;

use crate::ast::{Expr, Operand};
use crate::error::{Error, Result};
use crate::parser::parse;
use crate::rsf::{symbol, symbol_module};
use crate::types::{ItemKind, Tristate};

/// Answers whether an item name refers to a tristate item.
///
/// Unknown names are treated as boolean.
pub trait ItemLookup {
    fn is_tristate(&self, name: &str) -> bool;
}

impl ItemLookup for HashMap<String, ItemKind> {
    fn is_tristate(&self, name: &str) -> bool {
        self.get(name) == Some(&ItemKind::Tristate)
    }
}

/// Parses and normalizes `text` in one go.
pub fn rewrite<L: ItemLookup + ?Sized>(lookup: &L, text: &str, eval_to_module: bool) -> Result<String> {
    BoolRewriter::new(lookup, eval_to_module).rewrite_str(text)
}

/// Symbol a bare `m` is lowered to, unless configured otherwise.
pub const DEFAULT_MODULES_SYMBOL: &str = "CONFIG_MODULES";

pub struct BoolRewriter<'a, L: ItemLookup + ?Sized> {
    lookup: &'a L,
    eval_to_module: bool,
    modules_symbol: String,
}

impl<'a, L: ItemLookup + ?Sized> BoolRewriter<'a, L> {
    pub fn new(lookup: &'a L, eval_to_module: bool) -> Self {
        Self {
            lookup,
            eval_to_module,
            modules_symbol: DEFAULT_MODULES_SYMBOL.to_string(),
        }
    }

    pub fn with_modules_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.modules_symbol = symbol.into();
        self
    }

    pub fn rewrite_str(&self, text: &str) -> Result<String> {
        let expr = parse(text)?;
        Ok(self.rewrite(expr)?.to_string())
    }

    /// Runs all three passes.
    pub fn rewrite(&self, expr: Expr) -> Result<Expr> {
        let expr = push_negations(expr);
        let expr = self.expand_tristate(expr);
        self.lower(expr)
    }

    /// Pass 2. Only touches identifiers in boolean position.
    pub fn expand_tristate(&self, expr: Expr) -> Expr {
        match expr {
            Expr::Ident(name) if self.lookup.is_tristate(&name) => {
                let name = Operand::Ident(name);
                if self.eval_to_module {
                    Expr::NotEqual(name, Operand::Lit(Tristate::No))
                } else {
                    Expr::Equal(name, Operand::Lit(Tristate::Yes))
                }
            }
            Expr::Not(inner) => match *inner {
                Expr::Ident(name) if self.lookup.is_tristate(&name) => {
                    let name = Operand::Ident(name);
                    if self.eval_to_module {
                        Expr::NotEqual(name, Operand::Lit(Tristate::Yes))
                    } else {
                        Expr::Equal(name, Operand::Lit(Tristate::No))
                    }
                }
                other => Expr::not(other),
            },
            Expr::And(children) => Expr::And(children.into_iter().map(|c| self.expand_tristate(c)).collect()),
            Expr::Or(children) => Expr::Or(children.into_iter().map(|c| self.expand_tristate(c)).collect()),
            other => other,
        }
    }

    /// Pass 3.
    pub fn lower(&self, expr: Expr) -> Result<Expr> {
        match expr {
            Expr::Ident(name) => Ok(Expr::Ident(symbol(&name)?)),
            // `m` and `!m` both evaluate to `m`, which needs module support.
            Expr::Lit(Tristate::Module) => Ok(Expr::Ident(self.modules_symbol.clone())),
            Expr::Not(inner) if *inner == Expr::Lit(Tristate::Module) => Ok(Expr::Ident(self.modules_symbol.clone())),
            Expr::Lit(value) => Err(Error::Rewrite(format!("literal '{}' in boolean context", value))),
            Expr::Not(inner) => Ok(Expr::not(self.lower(*inner)?)),
            Expr::And(children) => Ok(Expr::And(self.lower_junction(children, Tristate::Yes)?)),
            Expr::Or(children) => Ok(Expr::Or(self.lower_junction(children, Tristate::No)?)),
            Expr::Equal(lhs, rhs) => lower_comparison(lhs, rhs, false),
            Expr::NotEqual(lhs, rhs) => lower_comparison(lhs, rhs, true),
        }
    }

    /// Lowers the children of `&&` (`neutral` is `y`) or `||` (`neutral` is `n`).
    fn lower_junction(&self, children: Vec<Expr>, neutral: Tristate) -> Result<Vec<Expr>> {
        let lowered = children
            .into_iter()
            .filter(|c| constant_value(c) != Some(neutral))
            .map(|c| self.lower(c))
            .collect::<Result<Vec<_>>>()?;
        if lowered.is_empty() {
            return Err(Error::Rewrite("condition consists of literals only".to_string()));
        }
        Ok(lowered)
    }
}

/// Value of a `y`/`n` leaf, possibly negated.
fn constant_value(expr: &Expr) -> Option<Tristate> {
    match expr {
        Expr::Lit(value @ (Tristate::Yes | Tristate::No)) => Some(*value),
        Expr::Not(inner) => match **inner {
            Expr::Lit(Tristate::Yes) => Some(Tristate::No),
            Expr::Lit(Tristate::No) => Some(Tristate::Yes),
            _ => None,
        },
        _ => None,
    }
}

/// Pass 1: De Morgan transformation down to the leaves.
pub fn push_negations(expr: Expr) -> Expr {
    match expr {
        Expr::Not(inner) => match *inner {
            Expr::And(children) => Expr::Or(children.into_iter().map(|c| push_negations(Expr::not(c))).collect()),
            Expr::Or(children) => Expr::And(children.into_iter().map(|c| push_negations(Expr::not(c))).collect()),
            Expr::Not(e) => push_negations(*e),
            Expr::Equal(lhs, rhs) => Expr::NotEqual(lhs, rhs),
            Expr::NotEqual(lhs, rhs) => Expr::Equal(lhs, rhs),
            leaf => Expr::not(leaf),
        },
        Expr::And(children) => Expr::And(children.into_iter().map(push_negations).collect()),
        Expr::Or(children) => Expr::Or(children.into_iter().map(push_negations).collect()),
        other => other,
    }
}

fn lower_comparison(lhs: Operand, rhs: Operand, negated: bool) -> Result<Expr> {
    // Literal on the left: `y=X` is `X=y`.
    let (lhs, rhs) = if lhs.as_literal().is_some() { (rhs, lhs) } else { (lhs, rhs) };
    let Operand::Ident(name) = lhs else {
        return Err(Error::Rewrite("compare literal with literal".to_string()));
    };

    let y = Expr::Ident(symbol(&name)?);
    let m = Expr::Ident(symbol_module(&name)?);

    let result = match (rhs, negated) {
        (Operand::Lit(Tristate::Yes), false) => y,
        (Operand::Lit(Tristate::Yes), true) => Expr::not(y),
        (Operand::Lit(Tristate::Module), false) => m,
        (Operand::Lit(Tristate::Module), true) => Expr::not(m),
        (Operand::Lit(Tristate::No), false) => Expr::and(vec![Expr::not(m), Expr::not(y)]),
        (Operand::Lit(Tristate::No), true) => Expr::or(vec![m, y]),
        (Operand::Ident(other), negated) => {
            let ry = Expr::Ident(symbol(&other)?);
            let rm = Expr::Ident(symbol_module(&other)?);
            if negated {
                // Some state holds on one side only.
                Expr::or(vec![
                    Expr::and(vec![y.clone(), Expr::not(ry.clone())]),
                    Expr::and(vec![m.clone(), Expr::not(rm.clone())]),
                    Expr::and(vec![Expr::not(y), ry]),
                    Expr::and(vec![Expr::not(m), rm]),
                ])
            } else {
                // Both y, both m, or both off.
                Expr::or(vec![
                    Expr::and(vec![y.clone(), ry.clone()]),
                    Expr::and(vec![m.clone(), rm.clone()]),
                    Expr::and(vec![Expr::not(y), Expr::not(ry), Expr::not(m), Expr::not(rm)]),
                ])
            }
        }
    };
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::rsf::RsfReader;
    use test_log::test;

    fn reader() -> RsfReader {
        RsfReader::from_text(
            "Item A 'boolean'\n\
             Item B tristate\n\
             ItemFoo B some_value\n\
             Item C boolean\n\
             Item S string\n\
             Item H hex\n\
             CRAP CARASDD\n",
        )
    }

    fn check(rsf: &RsfReader, input: &str, expected: &str) {
        assert_eq!(rewrite(rsf, input, true).unwrap(), expected, "rewriting '{}'", input);
    }

    #[test]
    fn test_numeric_identifiers() {
        let rsf = reader();
        check(&rsf, "64BIT", "CONFIG_64BIT");
        check(&rsf, "FOO && 64BIT", "(CONFIG_FOO && CONFIG_64BIT)");
        check(&rsf, "FOO && (64BIT)", "(CONFIG_FOO && CONFIG_64BIT)");
    }

    #[test]
    fn test_boolean_items() {
        let rsf = reader();
        check(&rsf, "A", "CONFIG_A");
        check(&rsf, "!A", "!CONFIG_A");
        check(&rsf, "!(A && C)", "(!CONFIG_A || !CONFIG_C)");
        check(&rsf, "!(A || !C)", "(!CONFIG_A && CONFIG_C)");
        check(&rsf, "!!A", "CONFIG_A");
        check(&rsf, "S", "CONFIG_S");
        check(&rsf, "H", "CONFIG_H");
    }

    #[test]
    fn test_tristate_items() {
        let rsf = reader();
        assert_eq!(rewrite(&rsf, "B", true).unwrap(), "(CONFIG_B_MODULE || CONFIG_B)");
        assert_eq!(rewrite(&rsf, "!B", true).unwrap(), "!CONFIG_B");
        assert_eq!(rewrite(&rsf, "B", false).unwrap(), "CONFIG_B");
        assert_eq!(rewrite(&rsf, "!B", false).unwrap(), "(!CONFIG_B_MODULE && !CONFIG_B)");
        assert_eq!(
            rewrite(&rsf, "!(A && B)", true).unwrap(),
            "(!CONFIG_A || !CONFIG_B)"
        );
    }

    #[test]
    fn test_literal_comparisons() {
        let rsf = reader();
        check(&rsf, "FOO=y", "CONFIG_FOO");
        check(&rsf, "FOO=n", "(!CONFIG_FOO_MODULE && !CONFIG_FOO)");
        check(&rsf, "FOO=m", "CONFIG_FOO_MODULE");
        check(&rsf, "FOO!=y", "!CONFIG_FOO");
        check(&rsf, "FOO!=n", "(CONFIG_FOO_MODULE || CONFIG_FOO)");
        check(&rsf, "FOO!=m", "!CONFIG_FOO_MODULE");
        check(&rsf, "y=FOO", "CONFIG_FOO");
        check(&rsf, "!(FOO=m)", "!CONFIG_FOO_MODULE");
    }

    #[test]
    fn test_symbol_comparisons() {
        let rsf = reader();
        check(
            &rsf,
            "FOO=BAR",
            "((CONFIG_FOO && CONFIG_BAR) || (CONFIG_FOO_MODULE && CONFIG_BAR_MODULE) \
             || (!CONFIG_FOO && !CONFIG_BAR && !CONFIG_FOO_MODULE && !CONFIG_BAR_MODULE))",
        );
        check(
            &rsf,
            "FOO!=BAR",
            "((CONFIG_FOO && !CONFIG_BAR) \
             || (CONFIG_FOO_MODULE && !CONFIG_BAR_MODULE) \
             || (!CONFIG_FOO && CONFIG_BAR) \
             || (!CONFIG_FOO_MODULE && CONFIG_BAR_MODULE))",
        );
        check(
            &rsf,
            "FOO && BAR=HURZ",
            "(CONFIG_FOO && \
             ((CONFIG_BAR && CONFIG_HURZ) || (CONFIG_BAR_MODULE && CONFIG_HURZ_MODULE) || \
             (!CONFIG_BAR && !CONFIG_HURZ && !CONFIG_BAR_MODULE && !CONFIG_HURZ_MODULE)))",
        );
        check(
            &rsf,
            "B43 && (HW_RANDOM || HW_RANDOM=B43)",
            "(CONFIG_B43 && \
             (CONFIG_HW_RANDOM || \
             ((CONFIG_HW_RANDOM && CONFIG_B43) || \
             (CONFIG_HW_RANDOM_MODULE && CONFIG_B43_MODULE) || \
             (!CONFIG_HW_RANDOM && !CONFIG_B43 && \
             !CONFIG_HW_RANDOM_MODULE && !CONFIG_B43_MODULE))))",
        );
    }

    #[test]
    fn test_mixed_tristate_expression() {
        let rsf = RsfReader::from_text(
            "Item SSB_POSSIBLE boolean\n\
             Item SSB tristate\n\
             Item PCI tristate\n\
             Item THINKPAD_ACPI boolean\n\
             Item SND boolean\n",
        );
        check(
            &rsf,
            "SSB_POSSIBLE && SSB && (PCI || PCI=SSB)",
            "(CONFIG_SSB_POSSIBLE && (CONFIG_SSB_MODULE || CONFIG_SSB) && \
             ((CONFIG_PCI_MODULE || CONFIG_PCI) || ((CONFIG_PCI && CONFIG_SSB) || \
             (CONFIG_PCI_MODULE && CONFIG_SSB_MODULE) || \
             (!CONFIG_PCI && !CONFIG_SSB && !CONFIG_PCI_MODULE && !CONFIG_SSB_MODULE))))",
        );
        check(
            &rsf,
            "THINKPAD_ACPI && SND && (SND=y || THINKPAD_ACPI=SND)",
            "(CONFIG_THINKPAD_ACPI && CONFIG_SND && \
             (CONFIG_SND || ((CONFIG_THINKPAD_ACPI && CONFIG_SND) || \
             (CONFIG_THINKPAD_ACPI_MODULE && CONFIG_SND_MODULE) || \
             (!CONFIG_THINKPAD_ACPI && !CONFIG_SND && !CONFIG_THINKPAD_ACPI_MODULE && !CONFIG_SND_MODULE))))",
        );
    }

    #[test]
    fn test_rewrite_is_idempotent_for_boolean_items() {
        let rsf = reader();
        for input in ["A", "!(A && C)", "FOO && (BAR || !A)", "FOO=n", "FOO!=BAR"] {
            let once = rewrite(&rsf, input, true).unwrap();
            let twice = rewrite(&rsf, &once, true).unwrap();
            assert_eq!(once, twice, "rewriting '{}'", input);
        }
    }

    #[test]
    fn test_literals_in_junctions() {
        let rsf = reader();
        check(&rsf, "FOO && m", "(CONFIG_FOO && CONFIG_MODULES)");
        check(&rsf, "B && m", "((CONFIG_B_MODULE || CONFIG_B) && CONFIG_MODULES)");
        check(&rsf, "FOO && y", "(CONFIG_FOO)");
        check(&rsf, "A && !n", "(CONFIG_A)");
        check(&rsf, "FOO || n", "(CONFIG_FOO)");
        check(&rsf, "m", "CONFIG_MODULES");
        check(&rsf, "!m", "CONFIG_MODULES");
        assert_eq!(
            BoolRewriter::new(&rsf, true)
                .with_modules_symbol("CONFIG_MODULES_ENABLED")
                .rewrite_str("FOO && m")
                .unwrap(),
            "(CONFIG_FOO && CONFIG_MODULES_ENABLED)"
        );
    }

    #[test]
    fn test_rewrite_errors() {
        let rsf = reader();
        assert!(matches!(rewrite(&rsf, "y=n", true), Err(Error::Rewrite(_))));
        assert!(matches!(rewrite(&rsf, "y", true), Err(Error::Rewrite(_))));
        assert!(matches!(rewrite(&rsf, "A && n", true), Err(Error::Rewrite(_))));
        assert!(matches!(rewrite(&rsf, "y && !n", true), Err(Error::Rewrite(_))));
        assert!(matches!(rewrite(&rsf, "A || y", true), Err(Error::Rewrite(_))));
        assert!(matches!(rewrite(&rsf, "(A && C)=y", true), Err(Error::Parse(_))));
        assert!(matches!(rewrite(&rsf, "A &&", true), Err(Error::Parse(_))));
    }

    #[test]
    fn test_type_map_lookup() {
        let mut types = HashMap::new();
        types.insert("B".to_string(), ItemKind::Tristate);
        types.insert("A".to_string(), ItemKind::Boolean);
        assert_eq!(rewrite(&types, "A && B", false).unwrap(), "(CONFIG_A && CONFIG_B)");
        assert_eq!(rewrite(&types, "B", true).unwrap(), "(CONFIG_B_MODULE || CONFIG_B)");
    }

    #[test]
    fn test_push_negations_leaves_only() {
        let e = parse("!(A && (B || !C=m))").unwrap();
        assert_eq!(push_negations(e).to_string(), "(!A || (!B && C=m))");
    }
}
