//! Scanner over concatenated JSON objects.
//!
//! Each call to [`scan_object`] locates one top-level object starting at a
//! byte offset and replays every scalar leaf to a [`ScanCallbacks`]
//! implementation, tagged with the path of object keys and array indices
//! that leads to it. Containers themselves produce no events.
//!
//! Events are emitted while the object is deserialized, so no `Value` is
//! built and repeated keys inside one object are each reported.
use std::fmt;

use serde::de::{self, DeserializeSeed, MapAccess, SeqAccess, Visitor};
use serde_json::value::RawValue;
use serde_json::{Deserializer, Value};
use thiserror::Error;

/// One step of a path from the document root.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Step {
    Key(String),
    Index(usize),
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Key(k) => write!(f, ".{k}"),
            Step::Index(i) => write!(f, "[{i}]"),
        }
    }
}

/// Event sink driven by the scanner, one method per scalar kind.
pub trait ScanCallbacks {
    fn on_number(&mut self, path: &[Step], value: f64);
    fn on_string(&mut self, path: &[Step], value: &str);
    fn on_bool(&mut self, path: &[Step], value: bool);
    fn on_null(&mut self, path: &[Step]);
}

/// Absolute byte range of one scanned object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    pub from: usize,
    pub to: usize,
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("malformed JSON in document at byte {offset}: {source}")]
    Malformed {
        offset: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("document at byte {offset} nests deeper than {max_depth} levels")]
    TooDeep { offset: usize, max_depth: usize },

    #[error("unsupported {found} in document at byte {offset}, expected an object")]
    Unsupported { offset: usize, found: &'static str },
}

/// Locate the next top-level JSON value at or after `offset` without
/// decoding it. Returns `Ok(None)` when only whitespace remains.
pub fn next_document(data: &[u8], offset: usize) -> Result<Option<(Span, &RawValue)>, ScanError> {
    let rest = data.get(offset..).unwrap_or_default();
    let skipped = rest.iter().take_while(|b| is_json_whitespace(**b)).count();
    if skipped == rest.len() {
        return Ok(None);
    }
    let from = offset + skipped;

    let mut stream = Deserializer::from_slice(&data[from..]).into_iter::<&RawValue>();
    match stream.next() {
        None => Ok(None),
        Some(Err(source)) => Err(ScanError::Malformed { offset: from, source }),
        Some(Ok(raw)) => Ok(Some((Span { from, to: from + stream.byte_offset() }, raw))),
    }
}

/// Scan the next top-level object at or after `offset`.
///
/// Returns `Ok(None)` when only whitespace remains.
pub fn scan_object<C>(
    data: &[u8],
    offset: usize,
    max_depth: usize,
    callbacks: &mut C,
) -> Result<Option<Span>, ScanError>
where
    C: ScanCallbacks + ?Sized,
{
    let Some((span, raw)) = next_document(data, offset)? else {
        return Ok(None);
    };

    let mut walker = Walker::new(span.from, max_depth, callbacks);
    let mut de = Deserializer::from_str(raw.get());
    let result = ValueSeed { walker: &mut walker, depth: 1 }.deserialize(&mut de);
    match (walker.failure.take(), result) {
        (Some(failure), _) => Err(failure),
        (None, Err(source)) => Err(ScanError::Malformed { offset: span.from, source }),
        (None, Ok(())) => Ok(Some(span)),
    }
}

/// Replay an already-decoded document to `callbacks`.
///
/// `offset` only locates the document in error reports.
pub fn walk_document<C>(
    value: &Value,
    offset: usize,
    max_depth: usize,
    callbacks: &mut C,
) -> Result<(), ScanError>
where
    C: ScanCallbacks + ?Sized,
{
    if !value.is_object() {
        return Err(ScanError::Unsupported { offset, found: kind_name(value) });
    }
    Walker::new(offset, max_depth, callbacks).visit_value(value, 1)
}

struct Walker<'c, C: ?Sized> {
    path: Vec<Step>,
    offset: usize,
    max_depth: usize,
    callbacks: &'c mut C,
    /// Scan error behind the last serde error raised by the visitor.
    failure: Option<ScanError>,
}

impl<'c, C: ScanCallbacks + ?Sized> Walker<'c, C> {
    fn new(offset: usize, max_depth: usize, callbacks: &'c mut C) -> Self {
        Self { path: Vec::new(), offset, max_depth, callbacks, failure: None }
    }

    fn check_depth(&self, depth: usize) -> Result<(), ScanError> {
        if depth > self.max_depth {
            return Err(ScanError::TooDeep { offset: self.offset, max_depth: self.max_depth });
        }
        Ok(())
    }

    /// Park `err` and hand serde an opaque error to unwind with.
    fn fail<E: de::Error>(&mut self, err: ScanError) -> E {
        let message = err.to_string();
        self.failure = Some(err);
        E::custom(message)
    }

    fn visit_value(&mut self, value: &Value, depth: usize) -> Result<(), ScanError> {
        match value {
            Value::Object(map) => {
                self.check_depth(depth)?;
                for (k, v) in map {
                    self.path.push(Step::Key(k.clone()));
                    self.visit_value(v, depth + 1)?;
                    self.path.pop();
                }
            }
            Value::Array(xs) => {
                self.check_depth(depth)?;
                for (i, v) in xs.iter().enumerate() {
                    self.path.push(Step::Index(i));
                    self.visit_value(v, depth + 1)?;
                    self.path.pop();
                }
            }
            Value::Number(n) => {
                let Some(f) = n.as_f64() else {
                    return Err(ScanError::Unsupported { offset: self.offset, found: "number" });
                };
                self.callbacks.on_number(&self.path, f);
            }
            Value::String(s) => self.callbacks.on_string(&self.path, s),
            Value::Bool(b) => self.callbacks.on_bool(&self.path, *b),
            Value::Null => self.callbacks.on_null(&self.path),
        }
        Ok(())
    }
}

// ------------------------------- Streaming -------------------------------- //

/// Visits one value at `depth` (the top-level object is depth 1).
struct ValueSeed<'w, 'c, C: ?Sized> {
    walker: &'w mut Walker<'c, C>,
    depth: usize,
}

impl<'w, 'c, C: ScanCallbacks + ?Sized> ValueSeed<'w, 'c, C> {
    fn nested(&mut self) -> ValueSeed<'_, 'c, C> {
        ValueSeed { walker: &mut *self.walker, depth: self.depth + 1 }
    }

    fn enter<E: de::Error>(&mut self, found: &'static str) -> Result<(), E> {
        if self.depth == 1 && found != "object" {
            let err = ScanError::Unsupported { offset: self.walker.offset, found };
            return Err(self.walker.fail(err));
        }
        match self.walker.check_depth(self.depth) {
            Ok(()) => Ok(()),
            Err(err) => Err(self.walker.fail(err)),
        }
    }

    fn scalar<E, F>(mut self, found: &'static str, emit: F) -> Result<(), E>
    where
        E: de::Error,
        F: FnOnce(&mut C, &[Step]),
    {
        if self.depth == 1 {
            let err = ScanError::Unsupported { offset: self.walker.offset, found };
            return Err(self.walker.fail(err));
        }
        let walker = &mut *self.walker;
        emit(&mut *walker.callbacks, &walker.path);
        Ok(())
    }
}

impl<'de, C: ScanCallbacks + ?Sized> DeserializeSeed<'de> for ValueSeed<'_, '_, C> {
    type Value = ();

    fn deserialize<D: de::Deserializer<'de>>(self, deserializer: D) -> Result<(), D::Error> {
        deserializer.deserialize_any(self)
    }
}

impl<'de, C: ScanCallbacks + ?Sized> Visitor<'de> for ValueSeed<'_, '_, C> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<(), E> {
        self.scalar("boolean", |cb, path| cb.on_bool(path, v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<(), E> {
        self.scalar("number", |cb, path| cb.on_number(path, v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<(), E> {
        self.scalar("number", |cb, path| cb.on_number(path, v as f64))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<(), E> {
        self.scalar("number", |cb, path| cb.on_number(path, v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<(), E> {
        self.scalar("string", |cb, path| cb.on_string(path, v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<(), E> {
        self.scalar("null", |cb, path| cb.on_null(path))
    }

    fn visit_seq<A: SeqAccess<'de>>(mut self, mut seq: A) -> Result<(), A::Error> {
        self.enter("array")?;
        let mut i = 0;
        loop {
            self.walker.path.push(Step::Index(i));
            let more = seq.next_element_seed(self.nested())?;
            self.walker.path.pop();
            if more.is_none() {
                return Ok(());
            }
            i += 1;
        }
    }

    fn visit_map<A: MapAccess<'de>>(mut self, mut map: A) -> Result<(), A::Error> {
        self.enter("object")?;
        while let Some(key) = map.next_key::<String>()? {
            self.walker.path.push(Step::Key(key));
            map.next_value_seed(self.nested())?;
            self.walker.path.pop();
        }
        Ok(())
    }
}

fn is_json_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ------------------------------- Tests ------------------------------------ //
