use serde_json::{Map, Number, Value};

pub type Document = Map<String, Value>;

/// Look up a dotted path.
pub fn get_path<'a>(doc: &'a Document, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = doc.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

fn slot_mut<'a>(doc: &'a mut Document, path: &str) -> Result<&'a mut Value, String> {
    let (parents, leaf) = match path.rsplit_once('.') {
        Some((parents, leaf)) => (Some(parents), leaf),
        None => (None, path),
    };

    let mut current = doc;
    for segment in parents.into_iter().flat_map(|p| p.split('.')) {
        let next = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        current = next
            .as_object_mut()
            .ok_or_else(|| format!("{segment} in {path} is not an object"))?;
    }

    Ok(current.entry(leaf.to_string()).or_insert(Value::Null))
}

/// One document write within a batch.
#[derive(Debug, Clone)]
pub struct WriteOp {
    pub collection: String,
    pub key: String,
    pub update: Update,
}

impl WriteOp {
    pub fn upsert(collection: impl Into<String>, key: impl Into<String>, update: Update) -> Self {
        Self {
            collection: collection.into(),
            key: key.into(),
            update,
        }
    }
}

/// A set of changes applied atomically to one document.
#[derive(Debug, Clone, Default)]
pub struct Update {
    set: Vec<(String, Value)>,
    set_on_insert: Vec<(String, Value)>,
    inc: Vec<(String, i64)>,
    max: Vec<(String, f64)>,
    add_to_set: Vec<(String, Value)>,
}

impl Update {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set.push((field.into(), value.into()));
        self
    }

    /// Only written when the document is created by this update.
    pub fn set_on_insert(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_on_insert.push((field.into(), value.into()));
        self
    }

    pub fn inc(mut self, field: impl Into<String>, delta: i64) -> Self {
        self.inc.push((field.into(), delta));
        self
    }

    /// Keep the larger of the stored value and `value`.
    pub fn max(mut self, field: impl Into<String>, value: f64) -> Self {
        self.max.push((field.into(), value));
        self
    }

    /// Append `value` to the array at `field` unless already present.
    pub fn add_to_set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.add_to_set.push((field.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
            && self.set_on_insert.is_empty()
            && self.inc.is_empty()
            && self.max.is_empty()
            && self.add_to_set.is_empty()
    }

    /// Apply to `doc` in place. On error `doc` may be partially modified, so
    /// callers apply to a copy.
    pub(crate) fn apply(&self, doc: &mut Document, inserted: bool) -> Result<(), String> {
        if inserted {
            for (field, value) in &self.set_on_insert {
                *slot_mut(doc, field)? = value.clone();
            }
        }

        for (field, value) in &self.set {
            *slot_mut(doc, field)? = value.clone();
        }

        for (field, delta) in &self.inc {
            let slot = slot_mut(doc, field)?;
            let next = match &*slot {
                Value::Null => Value::from(*delta),
                Value::Number(n) => add(n, *delta).ok_or_else(|| format!("{field} overflowed"))?,
                _ => return Err(format!("{field} is not numeric")),
            };
            *slot = next;
        }

        for (field, value) in &self.max {
            let slot = slot_mut(doc, field)?;
            let current = match &*slot {
                Value::Null => None,
                Value::Number(n) => n.as_f64(),
                _ => return Err(format!("{field} is not numeric")),
            };
            if current.is_none_or(|c| *value > c) {
                *slot = Number::from_f64(*value)
                    .map(Value::Number)
                    .ok_or_else(|| format!("{field} must be finite"))?;
            }
        }

        for (field, value) in &self.add_to_set {
            let slot = slot_mut(doc, field)?;
            if slot.is_null() {
                *slot = Value::Array(Vec::new());
            }
            let items = slot
                .as_array_mut()
                .ok_or_else(|| format!("{field} is not an array"))?;
            if !items.contains(value) {
                items.push(value.clone());
            }
        }

        Ok(())
    }
}

fn add(n: &Number, delta: i64) -> Option<Value> {
    if let Some(i) = n.as_i64() {
        return i.checked_add(delta).map(Value::from);
    }
    let f = n.as_f64()? + delta as f64;
    Number::from_f64(f).map(Value::Number)
}

/// Equality conditions on dotted paths, all of which must hold.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    conditions: Vec<(String, Value)>,
}

impl Filter {
    /// Matches every document.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::all().and(field, value)
    }

    pub fn and(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((field.into(), value.into()));
        self
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.conditions
            .iter()
            .all(|(field, expected)| get_path(doc, field) == Some(expected))
    }
}
