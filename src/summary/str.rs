use std::cmp::Ordering;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StringSummary {
    pub freq: u64,
    pub unique: u64,
    pub min_len: usize,
    pub max_len: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub top: Vec<StringSample>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StringSample {
    pub value: String,
    pub freq: u64,
}

#[derive(Clone, Copy, Debug)]
struct Candidate<'a> {
    value: &'a str,
    freq: u64,
}

/// Ranking used both to pick and to order the top samples: higher frequency
/// first, then longer, then lexicographically greater.
fn rank(a: &Candidate<'_>, b: &Candidate<'_>) -> Ordering {
    a.freq
        .cmp(&b.freq)
        .then(a.value.len().cmp(&b.value.len()))
        .then(a.value.cmp(b.value))
}

pub fn summarize_strings(samples: &[String], top_count: usize) -> StringSummary {
    if samples.is_empty() {
        return StringSummary::default();
    }
    let mut min_len = usize::MAX;
    let mut max_len = 0;
    let mut counts: IndexMap<&str, u64> = IndexMap::new();
    for s in samples {
        min_len = min_len.min(s.len());
        max_len = max_len.max(s.len());
        *counts.entry(s.as_str()).or_default() += 1;
    }

    let top = select_top(&counts, top_count)
        .into_iter()
        .map(|c| StringSample { value: c.value.to_owned(), freq: c.freq })
        .collect();

    StringSummary {
        freq: samples.len() as u64,
        unique: counts.len() as u64,
        min_len,
        max_len,
        top,
    }
}

/// Bounded working set: seeded with the first `top_count` distinct values,
/// then each later value replaces the current lowest-ranked member if it
/// ranks strictly above it.
fn select_top<'a>(counts: &IndexMap<&'a str, u64>, top_count: usize) -> Vec<Candidate<'a>> {
    let mut top: Vec<Candidate<'a>> = Vec::with_capacity(top_count.min(counts.len()));
    for (&value, &freq) in counts {
        let candidate = Candidate { value, freq };
        if top.len() < top_count {
            top.push(candidate);
            continue;
        }
        let worst = (0..top.len()).reduce(|w, i| {
            if rank(&top[i], &top[w]) == Ordering::Less { i } else { w }
        });
        if let Some(w) = worst {
            if rank(&top[w], &candidate) == Ordering::Less {
                top[w] = candidate;
            }
        }
    }
    top.sort_by(|a, b| rank(b, a));
    top
}
