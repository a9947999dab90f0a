//! Human-readable tree view of a [`Summary`].
use std::fmt::Write;

use colored::Colorize;

use crate::summary::{Digest, NumberSummary, StringSummary, Summary, SummaryNode};

#[derive(Clone, Debug)]
pub struct RenderOptions {
    /// Top strings shown per node.
    pub max_top: usize,
    /// Skip frequency-0 array placeholders.
    pub hide_placeholders: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { max_top: 3, hide_placeholders: true }
    }
}

pub fn render_tree(summary: &Summary, options: &RenderOptions) -> String {
    let mut out = String::new();
    render_node(&mut out, &summary.root, None, 0, options);
    out
}

fn render_node(
    out: &mut String,
    node: &SummaryNode,
    index: Option<usize>,
    depth: usize,
    options: &RenderOptions,
) {
    let label = match index {
        Some(i) => format!("[{i}]").cyan().to_string(),
        None if depth == 0 => "$".bold().to_string(),
        None => node.key.bold().to_string(),
    };
    let _ = write!(out, "{}{label} {}", "  ".repeat(depth), format!("×{}", node.freq).dimmed());
    if let Some(digest) = &node.digest {
        for part in digest_parts(digest, options) {
            let _ = write!(out, "  {part}");
        }
    }
    out.push('\n');

    for child in &node.children {
        render_node(out, child, None, depth + 1, options);
    }
    for (i, el) in node.elements.iter().enumerate() {
        if options.hide_placeholders && el.freq == 0 {
            continue;
        }
        render_node(out, el, Some(i), depth + 1, options);
    }
}

fn digest_parts(digest: &Digest, options: &RenderOptions) -> Vec<String> {
    let mut parts = Vec::new();
    if let Some(obj) = &digest.object {
        parts.push(format!("obj({} keys)", obj.keys.len()).blue().to_string());
    }
    if let Some(arr) = &digest.array {
        parts.push(format!("arr({})", arr.count).blue().to_string());
    }
    if let Some(num) = &digest.number {
        parts.push(number_part(num).green().to_string());
    }
    if let Some(s) = &digest.string {
        parts.push(string_part(s, options.max_top).yellow().to_string());
    }
    if let Some(b) = &digest.boolean {
        parts.push(format!("bool {}/{}", b.true_freq, b.false_freq).magenta().to_string());
    }
    if let Some(n) = &digest.null {
        parts.push(format!("null×{}", n.freq).red().to_string());
    }
    parts
}

fn number_part(num: &NumberSummary) -> String {
    let mut s = format!("num[{}..{}] uniq={}", num.min, num.max, num.unique);
    if num.all_ints {
        s.push_str(" int");
    }
    s
}

fn string_part(s: &StringSummary, max_top: usize) -> String {
    let mut out = format!("str len={}..{} uniq={}", s.min_len, s.max_len, s.unique);
    let top: Vec<String> = s
        .top
        .iter()
        .take(max_top)
        .map(|t| format!("{:?}×{}", t.value, t.freq))
        .collect();
    if !top.is_empty() {
        out.push_str(" top=");
        out.push_str(&top.join(","));
    }
    out
}
