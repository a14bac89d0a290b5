//! Node graph visitor

use std::io::{self, Write};

use scenedump_core::Node;

/// Number of nodes in the subtree rooted at `node`, including `node` itself
pub fn count_nodes(node: &Node) -> usize {
    node.walk().count()
}

/// Print the subtree rooted at `node`, one name per line.
///
/// Each level adds one tab to `prefix`. A node that references meshes gets
/// an extra `Meshes: i j k` line one level deeper. Pre-order, children in
/// stored order.
pub fn print_nodes<W: Write>(node: &Node, w: &mut W, prefix: &str) -> io::Result<()> {
    let mut indent = String::from(prefix);

    for (depth, node) in node.walk() {
        let width = prefix.len() + depth;
        indent.truncate(width);
        while indent.len() < width {
            indent.push('\t');
        }

        writeln!(w, "{indent}{}", node.name)?;

        if !node.meshes.is_empty() {
            write!(w, "{indent}\tMeshes:")?;
            for mesh in &node.meshes {
                write!(w, " {mesh}")?;
            }
            writeln!(w)?;
        }
    }
    Ok(())
}
