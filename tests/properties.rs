use std::collections::HashMap;

use json_digest::report::NoopReporter;
use json_digest::scan::Step;
use json_digest::summary::num::summarize_numbers;
use json_digest::summary::str::summarize_strings;
use json_digest::{summarize, SummarizeOptions, Summary, SummaryNode};
use proptest::prelude::*;

fn collect_freqs(node: &SummaryNode, path: String, out: &mut HashMap<String, u64>) {
    out.insert(path.clone(), node.freq);
    for c in &node.children {
        collect_freqs(c, format!("{path}.{}", c.key), out);
    }
    for (i, e) in node.elements.iter().enumerate() {
        collect_freqs(e, format!("{path}[{i}]"), out);
    }
}

fn small_document() -> impl Strategy<Value = serde_json::Value> {
    let leaf = prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::from),
        (-1000i64..1000).prop_map(serde_json::Value::from),
        "[a-c]{0,3}".prop_map(serde_json::Value::from),
    ];
    let value = leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(serde_json::Value::from),
            prop::collection::btree_map("[k-n]", inner, 0..4)
                .prop_map(|m| serde_json::Value::Object(m.into_iter().collect())),
        ]
    });
    prop::collection::btree_map("[a-d]", value, 1..4)
        .prop_map(|m| serde_json::Value::Object(m.into_iter().collect()))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_number_bounds_and_buckets(
        xs in prop::collection::vec(-1.0e6f64..1.0e6, 1..60),
        buckets in 0usize..12,
    ) {
        let sum = summarize_numbers(&xs, buckets);
        prop_assert_eq!(sum.freq, xs.len() as u64);
        prop_assert!(sum.unique <= sum.freq);
        for x in &xs {
            prop_assert!(sum.min <= *x && *x <= sum.max);
        }
        if buckets <= 1 {
            prop_assert!(sum.distribution.is_empty());
        } else {
            let total: u64 = sum.distribution.iter().map(|b| b.freq).sum();
            prop_assert_eq!(total, sum.freq);
            prop_assert_eq!(sum.distribution.len() as u64, (buckets as u64).min(sum.unique));
            prop_assert_eq!(sum.distribution.first().map(|b| b.from), Some(sum.min));
            prop_assert_eq!(sum.distribution.last().map(|b| b.to), Some(sum.max));
            for b in &sum.distribution {
                prop_assert!(b.from <= b.to);
            }
            for pair in sum.distribution.windows(2) {
                prop_assert!(pair[0].to < pair[1].from);
            }
        }
    }

    #[test]
    fn prop_all_distinct_numbers(xs in prop::collection::btree_set(-500i32..500, 1..40)) {
        let xs: Vec<f64> = xs.into_iter().map(f64::from).collect();
        let sum = summarize_numbers(&xs, 4);
        prop_assert_eq!(sum.unique, sum.freq);
        prop_assert!(sum.all_ints);
    }

    #[test]
    fn prop_top_strings(
        xs in prop::collection::vec("[a-e]{0,3}", 1..80),
        top in 0usize..6,
    ) {
        let sum = summarize_strings(&xs, top);
        let mut counts: HashMap<&str, u64> = HashMap::new();
        for s in &xs {
            *counts.entry(s.as_str()).or_default() += 1;
        }
        prop_assert_eq!(sum.unique as usize, counts.len());
        prop_assert_eq!(sum.top.len(), top.min(counts.len()));
        for t in &sum.top {
            prop_assert_eq!(counts[t.value.as_str()], t.freq);
        }
        for pair in sum.top.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            let key = |s: &json_digest::summary::StringSample| (s.freq, s.value.len(), s.value.clone());
            prop_assert!(key(a) > key(b));
        }
        // nothing left out ranks above the weakest kept sample
        if let Some(weakest) = sum.top.last() {
            for (value, freq) in &counts {
                if sum.top.iter().all(|t| t.value != *value) {
                    prop_assert!((*freq, value.len(), value.to_string())
                        < (weakest.freq, weakest.value.len(), weakest.value.clone()));
                }
            }
        }
        let lens: Vec<usize> = xs.iter().map(String::len).collect();
        prop_assert_eq!(sum.min_len, *lens.iter().min().unwrap());
        prop_assert_eq!(sum.max_len, *lens.iter().max().unwrap());
    }

    #[test]
    fn prop_rescan_doubles_frequencies(docs in prop::collection::vec(small_document(), 1..5)) {
        let text: String = docs.iter().map(|d| d.to_string()).collect::<Vec<_>>().join("\n");
        let twice = format!("{text}\n{text}");
        let options = SummarizeOptions::default();

        let once = summarize(text.as_bytes(), &options, &mut NoopReporter).unwrap();
        let doubled = summarize(twice.as_bytes(), &options, &mut NoopReporter).unwrap();

        let (mut a, mut b) = (HashMap::new(), HashMap::new());
        collect_freqs(&once.root, String::new(), &mut a);
        collect_freqs(&doubled.root, String::new(), &mut b);
        prop_assert_eq!(a.len(), b.len());
        for (path, freq) in &a {
            prop_assert_eq!(b[path], 2 * freq);
        }
    }

    #[test]
    fn prop_digest_round_trip(docs in prop::collection::vec(small_document(), 1..5), x in any::<f64>()) {
        prop_assume!(x.is_finite());
        let mut text: String = docs.iter().map(|d| d.to_string()).collect::<Vec<_>>().join(" ");
        text.push_str(&serde_json::json!({ "x": x }).to_string());
        let sum = summarize(text.as_bytes(), &SummarizeOptions::default(), &mut NoopReporter).unwrap();
        let encoded = serde_json::to_vec(&sum).unwrap();
        let back = Summary::from_json_slice(&encoded).unwrap();
        prop_assert_eq!(&back, &sum);
        let num = back.find(&[Step::Key("x".into())]).unwrap().digest.as_ref().unwrap().number.as_ref().unwrap();
        prop_assert_eq!(num.min.to_bits(), x.to_bits());
    }
}
