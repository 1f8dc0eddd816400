//! Model to DOT (Graphviz) conversion.
//!
//! The generated graph shows which symbols a presence condition mentions:
//! - **Nodes** are symbols. Symbols the model does not define are drawn with
//!   a separate shape, always-on and always-off symbols are filled.
//! - **Edges** point from a symbol to every item its condition mentions.
//!   Mentions of `_MODULE` symbols use their own style.
//! - **Leaf features** are grouped at the top (source rank).
//!
//! # Examples
//!
//! ```
//! use kconfig_model::model::Model;
//!
//! let model = Model::from_model_str("CONFIG_A\nCONFIG_B \"CONFIG_A\"\n").unwrap();
//! let dot = model.to_dot(&["CONFIG_B"]).unwrap();
//! assert!(dot.contains("\"CONFIG_B\" -> \"CONFIG_A\""));
//! // Render with: dot -Tpng output.dot -o output.png
//! ```

use std::collections::BTreeSet;
use std::fmt::Write as _;

use crate::model::Model;

/// Configuration options for DOT output generation.
///
/// Use `DotConfig::default()` for standard settings.
///
/// # Examples
///
/// ```
/// use kconfig_model::dot::DotConfig;
/// use kconfig_model::model::Model;
///
/// let model = Model::from_model_str("CONFIG_A \"CONFIG_B\"\n").unwrap();
/// let config = DotConfig {
///     node_shape: "ellipse",
///     ..DotConfig::default()
/// };
/// let dot = model.to_dot_with_config(&["CONFIG_A"], &config).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct DotConfig {
    /// Shape for defined symbols (default: "box")
    pub node_shape: &'static str,
    /// Shape for mentioned but undefined symbols (default: "ellipse")
    pub missing_shape: &'static str,
    /// Fill color for always-on symbols (default: "palegreen")
    pub always_on_color: &'static str,
    /// Fill color for always-off symbols (default: "lightpink")
    pub always_off_color: &'static str,
    /// Style for edges to `CONFIG_X` symbols (default: "solid")
    pub edge_style: &'static str,
    /// Style for edges to `CONFIG_X_MODULE` symbols (default: "dashed")
    pub module_edge_style: &'static str,
    /// Whether to put leaf features at the top (default: true)
    pub rank_leaves: bool,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            node_shape: "box",
            missing_shape: "ellipse",
            always_on_color: "palegreen",
            always_off_color: "lightpink",
            edge_style: "solid",
            module_edge_style: "dashed",
            rank_leaves: true,
        }
    }
}

impl Model {
    /// Converts the slice of `roots` to DOT format.
    ///
    /// An empty `roots` renders the whole model.
    pub fn to_dot<S: AsRef<str>>(&self, roots: &[S]) -> Result<String, std::fmt::Error> {
        self.to_dot_with_config(roots, &DotConfig::default())
    }

    /// Converts the slice of `roots` to DOT format with custom configuration.
    pub fn to_dot_with_config<S: AsRef<str>>(&self, roots: &[S], config: &DotConfig) -> Result<String, std::fmt::Error> {
        let nodes: Vec<String> = if roots.is_empty() {
            self.symbols().map(str::to_string).collect()
        } else {
            self.slice_symbols(roots)
        };

        let mut dot = String::new();
        writeln!(dot, "digraph {{")?;
        writeln!(dot, "node [shape={}];", config.node_shape)?;

        for node in &nodes {
            let mut attributes = Vec::new();
            if !self.contains(node) {
                attributes.push(format!("shape={}", config.missing_shape));
            } else if self.always_on().contains(node) {
                attributes.push(format!("style=filled, fillcolor={}", config.always_on_color));
            } else if self.always_off().contains(node) {
                attributes.push(format!("style=filled, fillcolor={}", config.always_off_color));
            }
            if attributes.is_empty() {
                writeln!(dot, "\"{}\";", node)?;
            } else {
                writeln!(dot, "\"{}\" [{}];", node, attributes.join(", "))?;
            }
        }

        if config.rank_leaves {
            let leaves: Vec<String> = self
                .leaf_features()
                .into_iter()
                .filter(|leaf| nodes.contains(leaf))
                .collect();
            if !leaves.is_empty() {
                writeln!(dot, "{{ rank=source")?;
                for leaf in leaves {
                    writeln!(dot, "\"{}\";", leaf)?;
                }
                writeln!(dot, "}}")?;
            }
        }

        for node in &nodes {
            // A condition may mention the same item several times.
            let targets: BTreeSet<&str> = self.mentioned_items(node).into_iter().collect();
            for target in targets {
                let style = if target.ends_with("_MODULE") {
                    config.module_edge_style
                } else {
                    config.edge_style
                };
                writeln!(dot, "\"{}\" -> \"{}\" [style={}];", node, target, style)?;
            }
        }

        writeln!(dot, "}}")?;
        Ok(dot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    fn model() -> Model {
        Model::from_model_str(
            "UNDERTAKER_SET ALWAYS_ON \"CONFIG_ON\"\n\
             CONFIG_A\n\
             CONFIG_B \"CONFIG_A && (CONFIG_A || CONFIG_C_MODULE)\"\n\
             CONFIG_C \"!CONFIG_C_MODULE\"\n\
             CONFIG_C_MODULE \"!CONFIG_C\"\n",
        )
        .unwrap()
    }

    #[test]
    fn test_to_dot_basic() {
        let dot = model().to_dot(&["CONFIG_B"]).unwrap();
        assert!(dot.starts_with("digraph {"));
        assert!(dot.ends_with("}\n"));
        assert!(dot.contains("\"CONFIG_B\" -> \"CONFIG_A\" [style=solid];"));
        assert!(dot.contains("\"CONFIG_B\" -> \"CONFIG_C_MODULE\" [style=dashed];"));
        assert_eq!(dot.matches("\"CONFIG_B\" -> \"CONFIG_A\"").count(), 1);
        assert!(!dot.contains("CONFIG_ON"));
    }

    #[test]
    fn test_to_dot_whole_model() {
        let dot = model().to_dot::<&str>(&[]).unwrap();
        assert!(dot.contains("\"CONFIG_ON\" [style=filled, fillcolor=palegreen];"));
        assert!(dot.contains("{ rank=source\n\"CONFIG_B\";\n\"CONFIG_ON\";\n}"));
    }

    #[test]
    fn test_to_dot_missing_symbols() {
        let model = Model::from_model_str("CONFIG_A \"CONFIG_GHOST\"\n").unwrap();
        let dot = model.to_dot(&["CONFIG_A"]).unwrap();
        assert!(dot.contains("\"CONFIG_GHOST\" [shape=ellipse];"));
    }

    #[test]
    fn test_to_dot_with_config() {
        let config = DotConfig {
            rank_leaves: false,
            module_edge_style: "dotted",
            ..DotConfig::default()
        };
        let dot = model().to_dot_with_config(&["CONFIG_B"], &config).unwrap();
        assert!(!dot.contains("rank=source"));
        assert!(dot.contains("[style=dotted]"));
    }
}
