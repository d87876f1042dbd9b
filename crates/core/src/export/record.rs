use std::borrow::Cow;

/// A primitive cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Empty,
}

impl ExportValue {
    /// Text rendering used by CSV output and column sizing.
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            ExportValue::Text(s) => Cow::Borrowed(s.as_str()),
            ExportValue::Number(n) => Cow::Owned(n.to_string()),
            ExportValue::Bool(b) => Cow::Owned(b.to_string()),
            ExportValue::Empty => Cow::Borrowed(""),
        }
    }
}

impl From<&str> for ExportValue {
    fn from(value: &str) -> Self {
        ExportValue::Text(value.to_string())
    }
}

impl From<String> for ExportValue {
    fn from(value: String) -> Self {
        ExportValue::Text(value)
    }
}

impl From<f64> for ExportValue {
    fn from(value: f64) -> Self {
        ExportValue::Number(value)
    }
}

impl From<i64> for ExportValue {
    fn from(value: i64) -> Self {
        ExportValue::Number(value as f64)
    }
}

impl From<u32> for ExportValue {
    fn from(value: u32) -> Self {
        ExportValue::Number(f64::from(value))
    }
}

impl From<bool> for ExportValue {
    fn from(value: bool) -> Self {
        ExportValue::Bool(value)
    }
}

impl<T: Into<ExportValue>> From<Option<T>> for ExportValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ExportValue::Empty, Into::into)
    }
}

/// An ordered mapping from column name to cell value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportRecord {
    fields: Vec<(String, ExportValue)>,
}

impl ExportRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ExportValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets a column, replacing an existing value with the same name.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ExportValue>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ExportValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<ExportValue>> FromIterator<(K, V)> for ExportRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = ExportRecord::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

/// Column names across all records, in order of first appearance.
pub fn collect_headers(records: &[ExportRecord]) -> Vec<String> {
    let mut headers: Vec<String> = Vec::new();
    for record in records {
        for key in record.keys() {
            if !headers.iter().any(|h| h == key) {
                headers.push(key.to_string());
            }
        }
    }
    headers
}
