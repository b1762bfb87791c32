//! Radix tree over literal route prefixes.
//!
//! Every registered template contributes its literal prefix (the text before
//! its first placeholder) as a key. Looking up a concrete path walks the tree
//! along that path and collects every node whose key is a prefix of it, so
//! only templates that can possibly match are tried.
//!
//! Nodes are compressed: a node's label may span many characters and no two
//! children of one node share a first character. Edges are split on insert
//! when a new key diverges inside an existing label.

use smallvec::{smallvec, SmallVec};

/// Route indices stored at a node, in registration order.
pub(crate) type EntryVec = SmallVec<[usize; 2]>;

#[derive(Debug, Clone, Default)]
pub(crate) struct PrefixNode {
    label: String,
    entries: EntryVec,
    children: Vec<PrefixNode>,
}

/// Byte length of the longest common prefix, always on a char boundary.
fn common_prefix_len(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .find(|((_, ca), cb)| ca != cb)
        .map(|((i, _), _)| i)
        .unwrap_or_else(|| a.len().min(b.len()))
}

impl PrefixNode {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn leaf(label: &str, entry: usize) -> Self {
        Self {
            label: label.to_string(),
            entries: smallvec![entry],
            children: Vec::new(),
        }
    }

    /// Insert `entry` under `key`.
    pub(crate) fn insert(&mut self, key: &str, entry: usize) {
        if key.is_empty() {
            self.entries.push(entry);
            return;
        }

        for child in &mut self.children {
            let common = common_prefix_len(&child.label, key);
            if common == 0 {
                continue;
            }
            if common < child.label.len() {
                // split the edge, the existing node keeps the tail of its label
                let tail = PrefixNode {
                    label: child.label[common..].to_string(),
                    entries: std::mem::take(&mut child.entries),
                    children: std::mem::take(&mut child.children),
                };
                child.label.truncate(common);
                child.children.push(tail);
            }
            child.insert(&key[common..], entry);
            return;
        }

        self.children.push(PrefixNode::leaf(key, entry));
    }

    /// Collect the entry lists of every node whose full key prefixes `path`.
    ///
    /// Lists are pushed shallowest first; a deeper node always has a strictly
    /// longer key than the nodes before it.
    pub(crate) fn collect<'a>(&'a self, path: &str, out: &mut Vec<&'a [usize]>) {
        if !self.entries.is_empty() {
            out.push(&self.entries);
        }
        for child in &self.children {
            if let Some(rest) = path.strip_prefix(child.label.as_str()) {
                child.collect(rest, out);
                // children never share a first character
                return;
            }
        }
    }

    /// Total number of nodes, root included.
    #[cfg(test)]
    pub(crate) fn node_count(&self) -> usize {
        1 + self.children.iter().map(PrefixNode::node_count).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(root: &PrefixNode, path: &str) -> Vec<usize> {
        let mut lists = Vec::new();
        root.collect(path, &mut lists);
        lists.into_iter().rev().flat_map(|l| l.iter().copied()).collect()
    }

    #[test]
    fn test_common_prefix_len_respects_char_boundaries() {
        assert_eq!(common_prefix_len("/users", "/usage"), 3);
        assert_eq!(common_prefix_len("/ä", "/ö"), 1);
        assert_eq!(common_prefix_len("/a", "/a/b"), 2);
    }

    #[test]
    fn test_longest_prefix_first() {
        let mut root = PrefixNode::new();
        root.insert("/a/", 0);
        root.insert("/a/b", 1);
        root.insert("/", 2);

        assert_eq!(lookup(&root, "/a/b"), vec![1, 0, 2]);
        assert_eq!(lookup(&root, "/a/c"), vec![0, 2]);
        assert_eq!(lookup(&root, "/x"), vec![2]);
    }

    #[test]
    fn test_same_key_keeps_registration_order() {
        let mut root = PrefixNode::new();
        root.insert("/users/", 3);
        root.insert("/users/", 1);
        assert_eq!(lookup(&root, "/users/1"), vec![3, 1]);
    }

    #[test]
    fn test_edge_split() {
        let mut root = PrefixNode::new();
        root.insert("/users", 0);
        root.insert("/usage", 1);
        // root, "/us", "ers", "age"
        assert_eq!(root.node_count(), 4);
        assert_eq!(lookup(&root, "/users"), vec![0]);
        assert_eq!(lookup(&root, "/usage"), vec![1]);
        assert!(lookup(&root, "/us").is_empty());
    }
}
