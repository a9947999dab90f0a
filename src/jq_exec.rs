//! jq pre-filter applied to each document before it is summarized.
use jaq_core::{compile::Undefined, load, Compiler, Ctx, RcIter};
use jaq_json::Val;
use serde_json::Value;

use crate::error::{Error, Result};

/// Compile `filter_src` once, then hand `body` a runner that applies it to
/// one input at a time. A filter that fails to compile never reaches `body`.
pub fn with_jaq<T, B>(filter_src: &str, body: B) -> Result<T>
where
    B: FnOnce(&dyn Fn(&Value) -> Result<Vec<Value>>) -> Result<T>,
{
    let loader = load::Loader::new(jaq_std::defs().chain(jaq_json::defs()));
    let arena = load::Arena::default();
    let program = load::File { code: filter_src, path: () };

    let modules = loader
        .load(&arena, program)
        .map_err(format_parse_errors)?;

    let filter = Compiler::default()
        .with_funs(jaq_std::funs().chain(jaq_json::funs()))
        .compile(modules)
        .map_err(format_undefined_errors)?;

    let run = |input: &Value| -> Result<Vec<Value>> {
        let inputs = RcIter::new(core::iter::empty());
        let outputs = filter.run((Ctx::new([], &inputs), Val::from(input.clone())));

        let mut out = Vec::new();
        for item in outputs {
            let v = item.map_err(|e| Error::Jq(format!("{e:?}")))?;
            // Val: Display -> JSON text
            let value = serde_json::from_str::<Value>(&v.to_string())
                .map_err(|e| Error::Jq(format!("filter produced invalid JSON: {e}")))?;
            out.push(value);
        }
        Ok(out)
    };
    body(&run)
}

fn format_parse_errors(errs: Vec<(load::File<&str, ()>, load::Error<&str>)>) -> Error {
    let mut s = String::new();
    for (file, err) in errs {
        s.push_str(&format!("parse error: {err:?} in `{}`\n", file.code));
    }
    Error::Jq(s.trim_end().to_owned())
}

fn format_undefined_errors(errs: Vec<(load::File<&str, ()>, Vec<(&str, Undefined)>)>) -> Error {
    let mut s = String::new();
    for (file, list) in errs {
        for (name, undef) in list {
            s.push_str(&format!("undefined `{name}`: {undef:?} in `{}`\n", file.code));
        }
    }
    Error::Jq(s.trim_end().to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn selects_nested_objects() {
        let input = json!({"items": [{"a": 1}, {"a": 2}]});
        let out = with_jaq(".items[]", |run| run(&input)).unwrap();
        assert_eq!(out, vec![json!({"a": 1}), json!({"a": 2})]);
    }

    #[test]
    fn parse_errors_surface() {
        let err = with_jaq(".[", |run| run(&json!({}))).unwrap_err();
        assert!(matches!(err, Error::Jq(_)));
    }

    #[test]
    fn one_compile_serves_many_inputs() {
        let got = with_jaq(".n * 2", |run| {
            let mut all = Vec::new();
            for n in 1..=3 {
                all.extend(run(&json!({"n": n}))?);
            }
            Ok(all)
        })
        .unwrap();
        assert_eq!(got, vec![json!(2), json!(4), json!(6)]);
    }

    #[test]
    fn broken_filter_never_runs_body() {
        let mut called = false;
        let err = with_jaq("map(", |_| {
            called = true;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, Error::Jq(_)));
        assert!(!called);
    }
}
