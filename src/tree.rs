//! Incremental path tree.
//!
//! Every distinct path seen in the input maps to one [`Node`] in an arena.
//! Nodes are created on first sight and only ever grow: frequencies are
//! bumped on each revisit and scalar samples are appended to per-kind
//! buffers until the summarizer drains them.
use log::{debug, trace};
use serde_json::Value;

use crate::error::Result;
use crate::report::Reporter;
use crate::scan::{self, ScanCallbacks, Step};
use crate::summary::{self, Summary};
use crate::SummarizeOptions;

/// One scalar sample. Values of different kinds never compare equal.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeValue {
    Number(f64),
    String(String),
    Bool(bool),
    Null,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Clone, Debug, Default)]
pub struct Node {
    pub key: String,
    pub frequency: u64,
    /// Reached through object keys, in first-seen order.
    pub children: Vec<NodeId>,
    /// Reached through array indices; gaps are frequency-0 placeholders.
    pub elements: Vec<NodeId>,

    // raw samples, drained by the summarizer
    pub numbers: Vec<f64>,
    pub strings: Vec<String>,
    pub bools: Vec<bool>,
    pub nulls: u64,
}

impl Node {
    fn new(key: String, frequency: u64) -> Self {
        Self { key, frequency, ..Self::default() }
    }

    pub fn push(&mut self, value: TypeValue) {
        match value {
            TypeValue::Number(n) => self.numbers.push(n),
            TypeValue::String(s) => self.strings.push(s),
            TypeValue::Bool(b) => self.bools.push(b),
            TypeValue::Null => self.nulls += 1,
        }
    }
}

/// Arena of nodes; [`Tree::ROOT`] is always present.
#[derive(Clone, Debug)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    pub const ROOT: NodeId = NodeId(0);

    pub fn new() -> Self {
        Self { nodes: vec![Node::default()] }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Walk `path` from the root, creating or revisiting one node per step,
    /// then hand the terminal node to `on_resolved`.
    pub fn resolve<F>(&mut self, path: &[Step], on_resolved: F)
    where
        F: FnOnce(&mut Node),
    {
        let mut at = Self::ROOT;
        for step in path {
            at = match step {
                Step::Key(key) => self.child(at, key),
                Step::Index(i) => self.element(at, *i),
            };
        }
        on_resolved(self.node_mut(at));
    }

    /// Read-only lookup; does not touch frequencies.
    pub fn find(&self, path: &[Step]) -> Option<NodeId> {
        let mut at = Self::ROOT;
        for step in path {
            let node = self.node(at);
            at = match step {
                Step::Key(key) => node.children.iter().copied().find(|c| self.node(*c).key == *key)?,
                Step::Index(i) => node.elements.get(*i).copied()?,
            };
        }
        Some(at)
    }

    fn alloc(&mut self, key: String, frequency: u64) -> NodeId {
        let id = NodeId(self.nodes.len());
        trace!("new node #{} {key:?} (freq {frequency})", id.0);
        self.nodes.push(Node::new(key, frequency));
        id
    }

    fn child(&mut self, parent: NodeId, key: &str) -> NodeId {
        let found = self.nodes[parent.0]
            .children
            .iter()
            .copied()
            .find(|c| self.nodes[c.0].key == key);
        if let Some(id) = found {
            self.nodes[id.0].frequency += 1;
            return id;
        }
        let id = self.alloc(key.to_owned(), 1);
        self.nodes[parent.0].children.push(id);
        id
    }

    fn element(&mut self, parent: NodeId, index: usize) -> NodeId {
        let len = self.nodes[parent.0].elements.len();
        if index < len {
            let id = self.nodes[parent.0].elements[index];
            self.nodes[id.0].frequency += 1;
            return id;
        }
        // backfill never-visited slots
        for gap in len..index {
            let id = self.alloc(gap.to_string(), 0);
            self.nodes[parent.0].elements.push(id);
        }
        let id = self.alloc(index.to_string(), 1);
        self.nodes[parent.0].elements.push(id);
        id
    }
}

// ------------------------------- Builder ---------------------------------- //

/// Accumulates documents into a [`Tree`], then summarizes it.
#[derive(Debug)]
pub struct TreeBuilder {
    tree: Tree,
    options: SummarizeOptions,
}

impl TreeBuilder {
    pub fn new(options: SummarizeOptions) -> Self {
        Self { tree: Tree::new(), options }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Scan every object in `data`, returning how many were read.
    ///
    /// The first malformed object aborts the scan; the builder should then
    /// be discarded.
    pub fn scan_bytes(&mut self, data: &[u8], reporter: &mut dyn Reporter) -> Result<u64> {
        let max_depth = self.options.max_depth;
        let mut documents = 0;
        let mut i = 0;
        while i < data.len() {
            let Some(span) = scan::scan_object(data, i, max_depth, self)? else {
                break;
            };
            self.tree.node_mut(Tree::ROOT).frequency += 1;
            documents += 1;
            debug!("scanned object #{documents} at bytes {}..{}", span.from, span.to);
            reporter.object_read(i, span.to, data.len());
            i = span.to;
        }
        Ok(documents)
    }

    /// Observe an already-decoded top-level object. `offset` is where its
    /// source document starts, for error reports.
    pub fn observe_document(&mut self, value: &Value, offset: usize) -> Result<()> {
        let max_depth = self.options.max_depth;
        scan::walk_document(value, offset, max_depth, self)?;
        self.tree.node_mut(Tree::ROOT).frequency += 1;
        Ok(())
    }

    pub fn finish(self, reporter: &mut dyn Reporter) -> Summary {
        summary::summarize_tree(self.tree, &self.options, reporter)
    }
}

impl ScanCallbacks for TreeBuilder {
    fn on_number(&mut self, path: &[Step], value: f64) {
        self.tree.resolve(path, |node| node.push(TypeValue::Number(value)));
    }

    fn on_string(&mut self, path: &[Step], value: &str) {
        self.tree.resolve(path, |node| node.push(TypeValue::String(value.to_owned())));
    }

    fn on_bool(&mut self, path: &[Step], value: bool) {
        self.tree.resolve(path, |node| node.push(TypeValue::Bool(value)));
    }

    fn on_null(&mut self, path: &[Step]) {
        self.tree.resolve(path, |node| node.push(TypeValue::Null));
    }
}

// ------------------------------- Tests ------------------------------------ //
