//! Text rendering of a [`FileTree`], one entry per line with box-drawing connectors.
//! The root is not printed; top-level entries start at column zero.

use std::fmt;

use super::{FileTree, NodeId, NodeValue};

impl fmt::Display for NodeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeValue::None => write!(f, "\\"),
            NodeValue::Dir(entry) | NodeValue::File(entry) => write!(f, "{}", entry.name),
        }
    }
}

impl fmt::Display for FileTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // (node, prefix of its line, whether it is the last of its siblings);
        // top-level entries have no connector
        let mut stack: Vec<(NodeId, String, Option<bool>)> = self
            .children(self.root())
            .iter()
            .rev()
            .map(|&id| (id, String::new(), None))
            .collect();

        while let Some((id, prefix, last)) = stack.pop() {
            let Some(node) = self.get(id) else {
                continue;
            };
            let child_prefix = match last {
                None => {
                    writeln!(f, "{}", node.value)?;
                    String::new()
                }
                Some(last) => {
                    let connector = if last { "└── " } else { "├── " };
                    writeln!(f, "{prefix}{connector}{}", node.value)?;
                    format!("{prefix}{}", if last { "    " } else { "│   " })
                }
            };

            let children = self.children(id);
            for (i, &child) in children.iter().enumerate().rev() {
                stack.push((child, child_prefix.clone(), Some(i + 1 == children.len())));
            }
        }
        Ok(())
    }
}
