//! Where layer records come from.
//!
//! A layer asks for a list of fields such as `id`, `pvalue`, `ld:best` or
//! `gene:gene`. A `ns:field` entry names `field` in namespace `ns`; a bare
//! name belongs to the [`BASE_NAMESPACE`]. The namespace of the first field
//! is the primary one and provides the records; fields of other namespaces
//! are joined onto them by `id` and keep their prefixed name as the key.
//! A field named like its namespace (`gene:gene`) asks for whole records.

use crate::error::FetchError;
use locustrack_protocol::LocusState;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const BASE_NAMESPACE: &str = "base";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchResponse {
    #[serde(default)]
    pub body: Vec<Value>,
}

pub trait DataSource: Send + Sync {
    fn fetch(&self, state: &LocusState, fields: &[String]) -> Result<FetchResponse, FetchError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// The field as the layer requested it, also the output key for joined fields.
    pub raw: String,
    pub namespace: String,
    pub name: String,
}

impl FieldSpec {
    pub fn parse(raw: &str) -> Self {
        let (namespace, name) = match raw.split_once(':') {
            Some((ns, name)) if !ns.is_empty() => (ns, name),
            _ => (BASE_NAMESPACE, raw),
        };
        Self {
            raw: raw.to_string(),
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }

    /// `gene:gene` style requests return the whole record.
    pub fn is_whole_record(&self) -> bool {
        self.name == self.namespace
    }
}

/// Parsed field list with its primary namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRequest {
    pub primary: String,
    pub fields: Vec<FieldSpec>,
}

impl FieldRequest {
    /// `None` for an empty field list.
    pub fn parse(fields: &[String]) -> Option<Self> {
        let fields: Vec<FieldSpec> = fields.iter().map(|f| FieldSpec::parse(f)).collect();
        let primary = fields.first()?.namespace.clone();
        Some(Self { primary, fields })
    }

    pub fn primary_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.namespace == self.primary)
    }

    pub fn joined_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.namespace != self.primary)
    }
}

fn as_u64(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().filter(|v| *v >= 0.0).map(|v| v as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Whether a record lies in the requested region. Records carry either a
/// `position` or a `start`/`end` interval; records with neither are kept.
/// A `chr` or `chrom` key, when present, has to match.
pub fn record_in_window(record: &serde_json::Map<String, Value>, state: &LocusState) -> bool {
    let chrom = record
        .get("chr")
        .or_else(|| record.get("chrom"))
        .and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });
    if let Some(chrom) = chrom {
        let chrom = chrom.strip_prefix("chr").unwrap_or(&chrom);
        let wanted = state.chr.strip_prefix("chr").unwrap_or(&state.chr);
        if chrom != wanted {
            return false;
        }
    }
    if let Some(position) = as_u64(record.get("position")) {
        return state.contains(position);
    }
    match (as_u64(record.get("start")), as_u64(record.get("end"))) {
        (Some(start), Some(end)) => state.overlaps(start, end),
        _ => true,
    }
}
