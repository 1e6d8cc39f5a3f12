use crate::data_source::{DataSource, FetchResponse, FieldRequest, record_in_window};
use crate::error::FetchError;
use csv::ReaderBuilder;
use itertools::Itertools;
use locustrack_protocol::LocusState;
use serde_json::{Map, Value};
use std::{
    collections::HashMap,
    fs::File,
    io::BufReader,
    path::Path,
};

pub type Record = Map<String, Value>;

/// Records held in memory, grouped by namespace.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    namespaces: HashMap<String, Vec<Record>>,
}

/// Numbers in table cells become JSON numbers, empty cells become null.
fn cell_value(cell: &str) -> Value {
    let cell = cell.trim();
    if cell.is_empty() {
        return Value::Null;
    }
    if let Ok(v) = cell.parse::<u64>() {
        return Value::from(v);
    }
    if let Ok(v) = cell.parse::<i64>() {
        return Value::from(v);
    }
    match cell.parse::<f64>() {
        Ok(v) if v.is_finite() => Value::from(v),
        _ => Value::String(cell.to_string()),
    }
}

fn id_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, namespace: impl Into<String>, records: Vec<Record>) {
        self.namespaces
            .entry(namespace.into())
            .or_default()
            .extend(records);
    }

    /// Builds a source from a JSON object mapping namespaces to record arrays.
    pub fn from_json_value(value: Value) -> Result<Self, FetchError> {
        let namespaces: HashMap<String, Vec<Record>> = serde_json::from_value(value)?;
        Ok(Self { namespaces })
    }

    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self, FetchError> {
        let reader = BufReader::new(File::open(path)?);
        let value: Value = serde_json::from_reader(reader)?;
        Self::from_json_value(value)
    }

    /// Appends the rows of a tab-separated table with a header line to `namespace`.
    pub fn load_table(&mut self, namespace: &str, path: impl AsRef<Path>) -> Result<usize, FetchError> {
        let reader = BufReader::new(File::open(path)?);
        let mut rdr = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(false)
            .from_reader(reader);
        let headers = rdr.headers()?.clone();
        let mut records = vec![];
        for row in rdr.records() {
            let row = row?;
            let record: Record = headers
                .iter()
                .zip(row.iter())
                .map(|(key, cell)| (key.to_string(), cell_value(cell)))
                .collect();
            records.push(record);
        }
        let count = records.len();
        self.insert(namespace, records);
        Ok(count)
    }

    fn records(&self, namespace: &str) -> Result<&[Record], FetchError> {
        self.namespaces
            .get(namespace)
            .map(Vec::as_slice)
            .ok_or_else(|| FetchError::UnknownNamespace(namespace.to_string()))
    }

    /// `id` → record lookup for a joined namespace. The first record wins on duplicate ids.
    fn id_index(&self, namespace: &str) -> Result<HashMap<String, &Record>, FetchError> {
        let mut index = HashMap::new();
        for record in self.records(namespace)? {
            if let Some(id) = record.get("id").and_then(id_key) {
                index.entry(id).or_insert(record);
            }
        }
        Ok(index)
    }
}

impl DataSource for MemorySource {
    fn fetch(&self, state: &LocusState, fields: &[String]) -> Result<FetchResponse, FetchError> {
        let Some(request) = FieldRequest::parse(fields) else {
            return Ok(FetchResponse::default());
        };
        let joined = request
            .joined_fields()
            .map(|f| f.namespace.as_str())
            .unique()
            .map(|ns| self.id_index(ns).map(|index| (ns, index)))
            .collect::<Result<HashMap<&str, HashMap<String, &Record>>, FetchError>>()?;
        let mut body = vec![];
        for record in self.records(&request.primary)? {
            if !record_in_window(record, state) {
                continue;
            }
            let mut out = Record::new();
            for field in request.primary_fields() {
                if field.is_whole_record() {
                    out.extend(record.clone());
                } else {
                    let value = record.get(&field.name).cloned().unwrap_or(Value::Null);
                    out.insert(field.name.clone(), value);
                }
            }
            let id = record.get("id").and_then(id_key);
            for field in request.joined_fields() {
                let value = id
                    .as_ref()
                    .and_then(|id| joined.get(field.namespace.as_str())?.get(id))
                    .and_then(|r| r.get(&field.name))
                    .cloned()
                    .unwrap_or(Value::Null);
                out.insert(field.raw.clone(), value);
            }
            body.push(Value::Object(out));
        }
        tracing::debug!(
            "memory source: {} '{}' records in {}:{}-{}",
            body.len(),
            request.primary,
            state.chr,
            state.start,
            state.end
        );
        Ok(FetchResponse { body })
    }
}
