//! Summarizer: collapses the raw samples of a [`Tree`] into digests.
//!
//! The tree is walked post-order. At each node every applicable digest is
//! produced independently (a node may carry object, array and several
//! scalar digests at once), and the node's raw sample buffers are dropped
//! as soon as its digest exists.
pub mod num;
pub mod str;

use indexmap::IndexMap;
use log::info;
use serde::{Deserialize, Serialize};

use crate::report::Reporter;
use crate::scan::Step;
use crate::tree::{NodeId, Tree};
use crate::SummarizeOptions;

pub use num::{BucketRange, NumberSummary};
pub use str::{StringSample, StringSummary};

// ------------------------------- Output ----------------------------------- //

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Summary {
    pub root: SummaryNode,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryNode {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub key: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SummaryNode>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<SummaryNode>,
    #[serde(skip_serializing_if = "is_zero")]
    pub freq: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<Digest>,
}

/// At most one digest per value kind.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Digest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<ObjectSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub array: Option<ArraySummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<NumberSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub string: Option<StringSummary>,
    #[serde(rename = "bool", skip_serializing_if = "Option::is_none")]
    pub boolean: Option<BoolSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub null: Option<NullSummary>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectSummary {
    pub keys: Vec<KeyFreq>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyFreq {
    pub key: String,
    pub freq: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArraySummary {
    pub count: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoolSummary {
    pub freq: u64,
    #[serde(skip_serializing_if = "is_zero")]
    pub true_freq: u64,
    #[serde(skip_serializing_if = "is_zero")]
    pub false_freq: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NullSummary {
    pub freq: u64,
}

pub(crate) fn is_zero(n: &u64) -> bool {
    *n == 0
}

pub(crate) fn is_false(b: &bool) -> bool {
    !*b
}

impl Digest {
    pub fn is_empty(&self) -> bool {
        self.object.is_none()
            && self.array.is_none()
            && self.number.is_none()
            && self.string.is_none()
            && self.boolean.is_none()
            && self.null.is_none()
    }
}

impl Summary {
    /// Follow `path` from the root.
    pub fn find(&self, path: &[Step]) -> Option<&SummaryNode> {
        path.iter().try_fold(&self.root, |node, step| match step {
            Step::Key(k) => node.child(k),
            Step::Index(i) => node.element(*i),
        })
    }

    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }
}

impl SummaryNode {
    pub fn child(&self, key: &str) -> Option<&SummaryNode> {
        self.children.iter().find(|c| c.key == key)
    }

    pub fn element(&self, index: usize) -> Option<&SummaryNode> {
        self.elements.get(index)
    }

    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .chain(&self.elements)
            .map(SummaryNode::node_count)
            .sum::<usize>()
    }
}

// ------------------------------- Digests ---------------------------------- //

/// Key frequencies in first-seen order, summed per key.
pub fn summarize_object(children: &[SummaryNode]) -> Option<ObjectSummary> {
    if children.is_empty() {
        return None;
    }
    let mut freqs: IndexMap<&str, u64> = IndexMap::new();
    for c in children {
        *freqs.entry(c.key.as_str()).or_default() += c.freq;
    }
    let keys = freqs
        .into_iter()
        .map(|(key, freq)| KeyFreq { key: key.to_owned(), freq })
        .collect();
    Some(ObjectSummary { keys })
}

pub fn summarize_array(elements: &[SummaryNode]) -> Option<ArraySummary> {
    if elements.is_empty() {
        return None;
    }
    Some(ArraySummary { count: elements.len() as u64 })
}

pub fn summarize_bools(samples: &[bool]) -> Option<BoolSummary> {
    if samples.is_empty() {
        return None;
    }
    let true_freq = samples.iter().filter(|b| **b).count() as u64;
    let freq = samples.len() as u64;
    Some(BoolSummary { freq, true_freq, false_freq: freq - true_freq })
}

pub fn summarize_nulls(count: u64) -> Option<NullSummary> {
    (count > 0).then_some(NullSummary { freq: count })
}

// ------------------------------- Walk ------------------------------------- //

/// Consume `tree` and produce its summary.
pub fn summarize_tree(
    tree: Tree,
    options: &SummarizeOptions,
    reporter: &mut dyn Reporter,
) -> Summary {
    let total = tree.len();
    info!("summarizing {total} nodes");
    let mut walk = Walk { tree, options, reporter, done: 0, total };
    let root = walk.visit(Tree::ROOT);
    Summary { root }
}

struct Walk<'a> {
    tree: Tree,
    options: &'a SummarizeOptions,
    reporter: &'a mut dyn Reporter,
    done: usize,
    total: usize,
}

impl Walk<'_> {
    fn visit(&mut self, id: NodeId) -> SummaryNode {
        let node = self.tree.node_mut(id);
        let child_ids = std::mem::take(&mut node.children);
        let element_ids = std::mem::take(&mut node.elements);

        let children: Vec<SummaryNode> = child_ids.into_iter().map(|c| self.visit(c)).collect();
        let elements: Vec<SummaryNode> = element_ids.into_iter().map(|e| self.visit(e)).collect();

        let node = self.tree.node_mut(id);
        let key = std::mem::take(&mut node.key);
        let freq = node.frequency;
        let numbers = std::mem::take(&mut node.numbers);
        let strings = std::mem::take(&mut node.strings);
        let bools = std::mem::take(&mut node.bools);
        let nulls = std::mem::take(&mut node.nulls);

        let digest = Digest {
            object: summarize_object(&children),
            array: summarize_array(&elements),
            number: (!numbers.is_empty())
                .then(|| num::summarize_numbers(&numbers, self.options.bucket_count)),
            string: (!strings.is_empty())
                .then(|| str::summarize_strings(&strings, self.options.top_count)),
            boolean: summarize_bools(&bools),
            null: summarize_nulls(nulls),
        };

        self.done += 1;
        self.reporter.nodes_summarized(self.done, self.total);

        SummaryNode {
            key,
            children,
            elements,
            freq,
            digest: (!digest.is_empty()).then_some(digest),
        }
    }
}

// ------------------------------- Tests ------------------------------------ //
