//! Segment prefix tree.
//!
//! # Responsibilities
//! - Store keys of the form `/seg/:name/*rest` with an attached value
//! - Find the winning leaf for a concrete path and capture wildcard values
//! - Rebuild a concrete path from a leaf and named argument values
//!
//! # Design Decisions
//! - Each node has static edges, at most one `:name` child and at most one
//!   `*name` catch-all leaf
//! - When several children match, the leaf added first wins (declaration
//!   order), not the most specific one
//! - A trailing slash is insignificant for matching but remembered for reverse
//! - A catch-all needs at least one remaining segment to match

use std::collections::{BTreeMap, HashMap};

use crate::routing::encoding::{encode_catch_all, encode_segment};
use crate::routing::error::TreeError;

/// Index of a leaf in insertion order.
pub type LeafId = usize;

/// One element of a registered key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Static(String),
    Param(String),
    CatchAll(String),
}

impl Segment {
    fn parse(key: &str, element: &str) -> Result<Self, TreeError> {
        if element.is_empty() {
            return Err(TreeError::EmptySegment(key.to_string()));
        }
        let segment = if let Some(name) = element.strip_prefix(':') {
            Segment::Param(name.to_string())
        } else if let Some(name) = element.strip_prefix('*') {
            Segment::CatchAll(name.to_string())
        } else {
            return Ok(Segment::Static(element.to_string()));
        };
        match segment.wildcard_name() {
            Some("") => Err(TreeError::EmptyPlaceholder(key.to_string())),
            _ => Ok(segment),
        }
    }

    fn wildcard_name(&self) -> Option<&str> {
        match self {
            Segment::Static(_) => None,
            Segment::Param(name) | Segment::CatchAll(name) => Some(name),
        }
    }
}

/// A registered key and its value.
#[derive(Debug)]
pub struct Leaf<T> {
    value: T,
    wildcards: Vec<String>,
    pattern: Vec<Segment>,
    trailing_slash: bool,
}

impl<T> Leaf<T> {
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Names of the `:name` / `*name` elements, in key order.
    pub fn wildcards(&self) -> &[String] {
        &self.wildcards
    }
}

#[derive(Debug, Default)]
struct Node {
    edges: HashMap<String, Node>,
    wildcard: Option<Box<Node>>,
    star: Option<LeafId>,
    leaf: Option<LeafId>,
}

/// Result of rebuilding a path from a leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReversedPath {
    pub path: String,
    /// Arguments not substituted into the path.
    pub unused: BTreeMap<String, String>,
    /// Wildcards for which no argument was supplied.
    pub missing: Vec<String>,
}

/// Prefix tree over `/`-separated keys.
#[derive(Debug)]
pub struct PathTree<T> {
    root: Node,
    leaves: Vec<Leaf<T>>,
}

impl<T> Default for PathTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PathTree<T> {
    pub fn new() -> Self {
        Self {
            root: Node::default(),
            leaves: Vec::new(),
        }
    }

    /// Number of registered leaves.
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Register `key`. Later registrations lose ties against earlier ones.
    pub fn add(&mut self, key: &str, value: T) -> Result<LeafId, TreeError> {
        if !key.starts_with('/') {
            return Err(TreeError::NotAbsolute(key.to_string()));
        }

        let elements = split_path(key);
        let pattern = elements
            .iter()
            .map(|el| Segment::parse(key, el))
            .collect::<Result<Vec<_>, _>>()?;

        let (catch_all, body) = match pattern.split_last() {
            Some((last @ Segment::CatchAll(_), body)) => (Some(last), body),
            _ => (None, pattern.as_slice()),
        };
        if body.iter().any(|s| matches!(s, Segment::CatchAll(_))) {
            return Err(TreeError::CatchAllNotLast(key.to_string()));
        }

        let id = self.leaves.len();
        let mut node = &mut self.root;
        for segment in body {
            node = match segment {
                Segment::Static(text) => node.edges.entry(text.clone()).or_default(),
                _ => &mut **node.wildcard.get_or_insert_with(Box::default),
            };
        }

        let slot = if catch_all.is_some() {
            if node.star.is_some() {
                return Err(TreeError::DuplicateCatchAll(key.to_string()));
            }
            &mut node.star
        } else {
            if node.leaf.is_some() {
                return Err(TreeError::DuplicatePath(key.to_string()));
            }
            &mut node.leaf
        };
        *slot = Some(id);

        let wildcards = pattern
            .iter()
            .filter_map(Segment::wildcard_name)
            .map(str::to_string)
            .collect();
        self.leaves.push(Leaf {
            value,
            wildcards,
            pattern,
            trailing_slash: key.len() > 1 && key.ends_with('/'),
        });
        Ok(id)
    }

    /// Find the leaf for `path` and the values captured by its wildcards.
    pub fn find(&self, path: &str) -> Option<(&Leaf<T>, Vec<String>)> {
        if !path.starts_with('/') {
            return None;
        }
        let elements = split_path(path);
        let (id, expansions) = lookup(&self.root, &elements, Vec::new())?;
        self.leaves.get(id).map(|leaf| (leaf, expansions))
    }

    /// Rebuild the path of leaf `id`, omitting its first `skip` elements.
    pub fn reverse(
        &self,
        id: LeafId,
        skip: usize,
        args: &BTreeMap<String, String>,
    ) -> Option<ReversedPath> {
        let leaf = self.leaves.get(id)?;
        let mut unused = args.clone();
        let mut missing = Vec::new();
        let mut parts = Vec::with_capacity(leaf.pattern.len());

        for segment in leaf.pattern.iter().skip(skip) {
            let (name, catch_all) = match segment {
                Segment::Static(text) => {
                    parts.push(text.clone());
                    continue;
                }
                Segment::Param(name) => (name, false),
                Segment::CatchAll(name) => (name, true),
            };
            match unused.remove(name).or_else(|| args.get(name).cloned()) {
                Some(value) if catch_all => parts.push(encode_catch_all(&value)),
                Some(value) => parts.push(encode_segment(&value).into_owned()),
                None => {
                    parts.push(format!("{}{}", if catch_all { '*' } else { ':' }, name));
                    missing.push(name.clone());
                }
            }
        }

        let mut path = format!("/{}", parts.join("/"));
        if leaf.trailing_slash && !parts.is_empty() {
            path.push('/');
        }
        Some(ReversedPath {
            path,
            unused,
            missing,
        })
    }
}

fn lookup(node: &Node, elements: &[&str], expansions: Vec<String>) -> Option<(LeafId, Vec<String>)> {
    let Some((first, rest)) = elements.split_first() else {
        return node.leaf.map(|id| (id, expansions));
    };

    let mut best = node
        .edges
        .get(*first)
        .and_then(|next| lookup(next, rest, expansions.clone()));

    if let Some(wildcard) = &node.wildcard {
        let mut captured = expansions.clone();
        captured.push(first.to_string());
        if let Some(found) = lookup(wildcard, rest, captured) {
            if best.as_ref().map_or(true, |(id, _)| *id > found.0) {
                best = Some(found);
            }
        }
    }

    if let Some(star) = node.star {
        if best.as_ref().map_or(true, |(id, _)| *id > star) {
            let mut captured = expansions;
            captured.push(elements.join("/"));
            best = Some((star, captured));
        }
    }

    best
}

/// Split on `/`, dropping one leading and one trailing empty element.
fn split_path(key: &str) -> Vec<&str> {
    let mut elements: Vec<&str> = key.split('/').collect();
    if elements.first() == Some(&"") {
        elements.remove(0);
    }
    if elements.last() == Some(&"") {
        elements.pop();
    }
    elements
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(keys: &[&str]) -> PathTree<usize> {
        let mut tree = PathTree::new();
        for (i, key) in keys.iter().enumerate() {
            tree.add(key, i).unwrap();
        }
        tree
    }

    #[test]
    fn test_static_and_param() {
        let t = tree(&["/GET/users", "/GET/users/:id"]);
        let (leaf, exp) = t.find("/GET/users").unwrap();
        assert_eq!(*leaf.value(), 0);
        assert!(exp.is_empty());

        let (leaf, exp) = t.find("/GET/users/42").unwrap();
        assert_eq!(*leaf.value(), 1);
        assert_eq!(leaf.wildcards(), &["id".to_string()]);
        assert_eq!(exp, vec!["42"]);

        assert!(t.find("/GET/users/42/edit").is_none());
        assert!(t.find("/POST/users").is_none());
        assert!(t.find("users").is_none());
    }

    #[test]
    fn test_first_added_wins() {
        let t = tree(&["/GET/:page", "/GET/about"]);
        let (leaf, exp) = t.find("/GET/about").unwrap();
        assert_eq!(*leaf.value(), 0);
        assert_eq!(exp, vec!["about"]);

        let t = tree(&["/GET/about", "/GET/:page"]);
        let (leaf, _) = t.find("/GET/about").unwrap();
        assert_eq!(*leaf.value(), 0);
    }

    #[test]
    fn test_catch_all() {
        let t = tree(&["/GET/public/*filepath"]);
        let (leaf, exp) = t.find("/GET/public/css/site.css").unwrap();
        assert_eq!(*leaf.value(), 0);
        assert_eq!(exp, vec!["css/site.css"]);
        assert!(t.find("/GET/public").is_none());
    }

    #[test]
    fn test_trailing_slash_ignored() {
        let t = tree(&["/GET/docs/"]);
        assert!(t.find("/GET/docs").is_some());
        assert!(t.find("/GET/docs/").is_some());
    }

    #[test]
    fn test_add_errors() {
        let mut t = PathTree::new();
        assert_eq!(
            t.add("GET/x", ()),
            Err(TreeError::NotAbsolute("GET/x".into()))
        );
        assert!(matches!(t.add("/GET/a//b", ()), Err(TreeError::EmptySegment(_))));
        assert!(matches!(t.add("/GET/:", ()), Err(TreeError::EmptyPlaceholder(_))));
        assert!(matches!(t.add("/GET/*rest/x", ()), Err(TreeError::CatchAllNotLast(_))));

        t.add("/GET/a", ()).unwrap();
        assert!(matches!(t.add("/GET/a/", ()), Err(TreeError::DuplicatePath(_))));
        t.add("/GET/s/*x", ()).unwrap();
        assert!(matches!(t.add("/GET/s/*y", ()), Err(TreeError::DuplicateCatchAll(_))));
    }

    #[test]
    fn test_reverse_substitutes_and_reports() {
        let t = tree(&["/GET/item/:id/*rest/"]);
        let mut args = BTreeMap::new();
        args.insert("id".to_string(), "5 x".to_string());
        args.insert("sort".to_string(), "asc".to_string());

        let reversed = t.reverse(0, 1, &args).unwrap();
        assert_eq!(reversed.path, "/item/5%20x/*rest/");
        assert_eq!(reversed.missing, vec!["rest"]);
        assert_eq!(reversed.unused.len(), 1);
        assert_eq!(reversed.unused["sort"], "asc");
    }

    #[test]
    fn test_reverse_root() {
        let t = tree(&["/GET/"]);
        let reversed = t.reverse(0, 1, &BTreeMap::new()).unwrap();
        assert_eq!(reversed.path, "/");
        assert!(t.reverse(7, 1, &BTreeMap::new()).is_none());
    }
}
