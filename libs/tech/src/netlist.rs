//! Critical-net list reading.
//!
//! Security-critical signals arrive as a Graphviz `.dot` node list; each
//! node name is a hierarchical path whose last dot-separated component is
//! the net basename used to match GDSII net annotations.

use arcstr::ArcStr;
use indexmap::IndexSet;

/// Parses the node names of a `.dot` file into a set of net basenames.
///
/// Edge lines (`->`) and the graph braces are skipped; everything else is
/// treated as a quoted or bare node name.
///
/// # Example
///
/// ```
/// let dot = r#"digraph G {
/// "top.core.key_reg" [shape=box];
/// "top.core.state" -> "top.core.key_reg";
/// }"#;
/// let nets = tech::netlist::parse_dot(dot);
/// assert!(nets.contains("key_reg"));
/// assert!(nets.contains("state") == false);
/// ```
pub fn parse_dot(text: &str) -> IndexSet<ArcStr> {
    let mut basenames = IndexSet::new();
    for raw in text.lines() {
        let line = raw.trim().trim_end_matches(';').trim_end();
        if line.is_empty() || line.contains("->") || line.contains('{') || line.contains('}') {
            continue;
        }
        let name = line
            .trim_start_matches('"')
            .split('"')
            .next()
            .unwrap_or("")
            .trim();
        if name.is_empty() {
            continue;
        }
        let basename = name.rsplit('.').next().unwrap_or(name);
        basenames.insert(ArcStr::from(basename));
    }
    basenames
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_basenames_are_extracted() {
        let dot = "digraph nets {\n\"soc.aes.key_sched.round_key\";\n\"soc.aes.sbox_out\" [x=1];\nplain_node;\n\"a\" -> \"b\";\n}\n";
        let nets = parse_dot(dot);
        assert!(nets.contains("round_key"));
        assert!(nets.contains("sbox_out"));
        assert!(nets.contains("plain_node"));
        assert_eq!(nets.len(), 3);
    }
}
