//! Expression trees for Kconfig conditions.
//!
//! An [`Expr`] is produced by the [parser](crate::parser), rewritten by the
//! [rewriter](crate::rewrite) and finally rendered back to text with
//! [`Display`](fmt::Display). The rendering is the normalized form used in
//! `.model` files:
//!
//! ```text
//! A                  identifier
//! !A                 negation
//! (A && B && C)      n-ary conjunction, always parenthesized
//! (A || B)           n-ary disjunction, always parenthesized
//! A=y, A!=B          comparisons (only before lowering)
//! ```
use std::collections::BTreeSet;
use std::fmt;

use crate::types::Tristate;

/// One side of a comparison.
///
/// Comparisons never contain nested boolean structure, so their operands
/// are either a symbol name or a tristate literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operand {
    Ident(String),
    Lit(Tristate),
}

impl Operand {
    pub fn as_literal(&self) -> Option<Tristate> {
        match self {
            Operand::Lit(value) => Some(*value),
            Operand::Ident(_) => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Ident(name) => write!(f, "{}", name),
            Operand::Lit(value) => write!(f, "{}", value),
        }
    }
}

/// Boolean expression over configuration items.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    /// Item or symbol reference
    Ident(String),
    /// Tristate literal (`y`, `m`, `n`)
    Lit(Tristate),
    /// Logical NOT
    Not(Box<Expr>),
    /// Logical AND (n-ary)
    And(Vec<Expr>),
    /// Logical OR (n-ary)
    Or(Vec<Expr>),
    /// `lhs = rhs`
    Equal(Operand, Operand),
    /// `lhs != rhs`
    NotEqual(Operand, Operand),
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(name.into())
    }

    pub fn not(inner: Expr) -> Self {
        Expr::Not(Box::new(inner))
    }

    pub fn and(children: Vec<Expr>) -> Self {
        Expr::And(children)
    }

    pub fn or(children: Vec<Expr>) -> Self {
        Expr::Or(children)
    }

    /// Returns `true` for `And`/`Or` nodes.
    pub fn is_composite(&self) -> bool {
        matches!(self, Expr::And(_) | Expr::Or(_))
    }

    /// Number of nodes in the tree. Comparisons count as one node.
    pub fn size(&self) -> usize {
        match self {
            Expr::Ident(_) | Expr::Lit(_) | Expr::Equal(..) | Expr::NotEqual(..) => 1,
            Expr::Not(e) => 1 + e.size(),
            Expr::And(children) | Expr::Or(children) => 1 + children.iter().map(Expr::size).sum::<usize>(),
        }
    }

    /// All identifier names mentioned in the tree, including comparison operands.
    pub fn identifiers(&self) -> BTreeSet<String> {
        let mut result = BTreeSet::new();
        self.collect_identifiers(&mut result);
        result
    }

    fn collect_identifiers(&self, acc: &mut BTreeSet<String>) {
        match self {
            Expr::Ident(name) => {
                acc.insert(name.clone());
            }
            Expr::Lit(_) => {}
            Expr::Not(e) => e.collect_identifiers(acc),
            Expr::And(children) | Expr::Or(children) => {
                for child in children {
                    child.collect_identifiers(acc);
                }
            }
            Expr::Equal(l, r) | Expr::NotEqual(l, r) => {
                for operand in [l, r] {
                    if let Operand::Ident(name) = operand {
                        acc.insert(name.clone());
                    }
                }
            }
        }
    }
}

fn fmt_joined(f: &mut fmt::Formatter<'_>, children: &[Expr], sep: &str) -> fmt::Result {
    write!(f, "(")?;
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", sep)?;
        }
        write!(f, "{}", child)?;
    }
    write!(f, ")")
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Ident(name) => write!(f, "{}", name),
            Expr::Lit(value) => write!(f, "{}", value),
            Expr::Not(e) => match e.as_ref() {
                Expr::Equal(..) | Expr::NotEqual(..) => write!(f, "!({})", e),
                _ => write!(f, "!{}", e),
            },
            Expr::And(children) => fmt_joined(f, children, " && "),
            Expr::Or(children) => fmt_joined(f, children, " || "),
            Expr::Equal(l, r) => write!(f, "{}={}", l, r),
            Expr::NotEqual(l, r) => write!(f, "{}!={}", l, r),
        }
    }
}
