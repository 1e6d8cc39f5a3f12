use crate::layout::GenePlacement;
use serde::{Deserialize, Serialize};

/// One association result (a variant with its p-value and LD).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: String,
    pub position: u64,
    #[serde(default)]
    pub pvalue: Option<f64>,
    #[serde(default, rename = "refAllele", skip_serializing_if = "Option::is_none")]
    pub ref_allele: Option<String>,
    /// Raw LD value as delivered by the source; may be a number or a string.
    #[serde(default, rename = "ld:best", skip_serializing_if = "Option::is_none")]
    pub ld_best: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ld: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log10pval: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecombinationPoint {
    pub position: u64,
    pub recomb_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Strand {
    #[default]
    Forward,
    Reverse,
    Unknown,
}

impl From<String> for Strand {
    fn from(value: String) -> Self {
        match value.trim() {
            "+" => Strand::Forward,
            "-" => Strand::Reverse,
            _ => Strand::Unknown,
        }
    }
}

impl From<Strand> for String {
    fn from(value: Strand) -> Self {
        match value {
            Strand::Forward => "+",
            Strand::Reverse => "-",
            Strand::Unknown => ".",
        }
        .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exon {
    pub exon_id: String,
    pub start: u64,
    pub end: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub transcript_id: String,
    #[serde(default)]
    pub exons: Vec<Exon>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gene {
    pub gene_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gene_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chrom: Option<String>,
    pub start: u64,
    pub end: u64,
    #[serde(default)]
    pub strand: Strand,
    #[serde(default)]
    pub transcripts: Vec<Transcript>,
    /// Written by the track layout; absent until a layout pass ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement: Option<GenePlacement>,
}

impl Gene {
    pub fn new(gene_name: impl Into<String>, start: u64, end: u64) -> Self {
        Self {
            gene_name: gene_name.into(),
            gene_id: None,
            chrom: None,
            start,
            end,
            strand: Strand::Forward,
            transcripts: vec![],
            placement: None,
        }
    }

    /// Gene name with a strand arrow, as shown under the gene.
    pub fn label(&self) -> String {
        match self.strand {
            Strand::Forward => format!("{}→", self.gene_name),
            _ => format!("←{}", self.gene_name),
        }
    }

    pub fn track(&self) -> Option<usize> {
        self.placement.as_ref().map(|p| p.track)
    }
}
