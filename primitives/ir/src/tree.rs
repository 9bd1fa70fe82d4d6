//! Document forest
//!
//! Documents are stored in an arena keyed by filename; include edges are
//! filenames. Every edge is checked when the tree is built, so walking it
//! cannot fail.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::idl::Document;
use crate::{IrError, Result};

/// A parsed document forest plus the root set generation starts from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "TreeFile", into = "TreeFile")]
pub struct DocumentTree {
    roots: Vec<String>,
    documents: Vec<Document>,
    index: BTreeMap<String, usize>,
}

/// On-disk shape of a [`DocumentTree`].
#[derive(Serialize, Deserialize)]
struct TreeFile {
    roots: Vec<String>,
    documents: Vec<Document>,
}

impl TryFrom<TreeFile> for DocumentTree {
    type Error = IrError;

    fn try_from(file: TreeFile) -> Result<Self> { DocumentTree::new(file.documents, file.roots) }
}

impl From<DocumentTree> for TreeFile {
    fn from(tree: DocumentTree) -> Self {
        TreeFile { roots: tree.roots, documents: tree.documents }
    }
}

impl DocumentTree {
    /// Build a tree, checking that every root and include names a known document.
    pub fn new(documents: Vec<Document>, roots: Vec<String>) -> Result<Self> {
        let mut index = BTreeMap::new();
        for (i, doc) in documents.iter().enumerate() {
            if index.insert(doc.filename.clone(), i).is_some() {
                return Err(IrError::DuplicateDocument(doc.filename.clone()));
            }
        }

        for doc in &documents {
            if let Some(missing) = doc.includes.iter().find(|inc| !index.contains_key(*inc)) {
                return Err(IrError::UnknownDocument {
                    from: doc.filename.clone(),
                    missing: missing.clone(),
                });
            }
        }

        if let Some(root) = roots.iter().find(|r| !index.contains_key(*r)) {
            return Err(IrError::UnknownRoot(root.clone()));
        }

        Ok(Self { roots, documents, index })
    }

    /// Build a tree with a single root document.
    pub fn with_root(root: &str, documents: Vec<Document>) -> Result<Self> {
        Self::new(documents, vec![root.to_string()])
    }

    /// Load a tree from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let tree: Self = serde_json::from_str(&content)?;
        Ok(tree)
    }

    /// Save the tree to a JSON file with pretty formatting
    pub fn to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut content = serde_json::to_string_pretty(self)?;
        content.push('\n');
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Look up a document by filename.
    pub fn get(&self, filename: &str) -> Option<&Document> {
        self.index.get(filename).map(|&i| &self.documents[i])
    }

    /// Root filenames in order.
    pub fn roots(&self) -> &[String] { &self.roots }

    /// Every document in the arena, reachable or not.
    pub fn documents(&self) -> &[Document] { &self.documents }

    /// Documents directly included by `doc`, in declaration order.
    pub fn includes<'a>(&'a self, doc: &'a Document) -> impl Iterator<Item = &'a Document> + 'a {
        doc.includes.iter().filter_map(move |inc| self.get(inc))
    }

    /// Depth-first, pre-order walk from the roots.
    ///
    /// Each reachable document is yielded exactly once, however many
    /// documents include it.
    pub fn depth_first(&self) -> DepthFirst<'_> {
        let stack = self.roots.iter().rev().filter_map(|r| self.index.get(r).copied()).collect();
        DepthFirst { tree: self, stack, visited: HashSet::new() }
    }
}

/// Iterator returned by [`DocumentTree::depth_first`].
pub struct DepthFirst<'a> {
    tree: &'a DocumentTree,
    stack: Vec<usize>,
    visited: HashSet<usize>,
}

impl<'a> Iterator for DepthFirst<'a> {
    type Item = &'a Document;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(i) = self.stack.pop() {
            if !self.visited.insert(i) {
                continue;
            }
            let tree = self.tree;
            let doc = &tree.documents[i];
            self.stack
                .extend(doc.includes.iter().rev().filter_map(|inc| tree.index.get(inc).copied()));
            return Some(doc);
        }
        None
    }
}
