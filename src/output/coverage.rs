//! Per-field completeness of a batch of stored records

use crate::model::{StoredRecord, BASE_FIELDS};
use serde::{Deserialize, Serialize};

/// Share of records holding a non-empty value for one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldCoverage {
    pub field: String,
    /// Whole percent, rounded down
    pub percent: u32,
}

/// Coverage of every reported field over one batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageReport {
    pub total_records: usize,
    pub fields: Vec<FieldCoverage>,
}

impl CoverageReport {
    /// Names of the reported fields: the base columns, then description and
    /// long description per locale
    pub fn field_names(locales: &[String]) -> Vec<String> {
        let mut names: Vec<String> = BASE_FIELDS.iter().map(|f| f.to_string()).collect();
        for locale in locales {
            names.push(format!("description_{}", locale));
            names.push(format!("long_description_{}", locale));
        }
        names
    }

    /// Computes coverage over `records`
    ///
    /// An empty batch reports 0 for every field.
    pub fn compute(records: &[StoredRecord], locales: &[String]) -> Self {
        let total = records.len();
        let fields = Self::field_names(locales)
            .into_iter()
            .map(|field| {
                let filled = records.iter().filter(|r| r.is_filled(&field)).count();
                let percent = if total == 0 {
                    0
                } else {
                    (filled * 100 / total) as u32
                };
                FieldCoverage { field, percent }
            })
            .collect();

        Self {
            total_records: total,
            fields,
        }
    }

    pub fn percent(&self, field: &str) -> Option<u32> {
        self.fields
            .iter()
            .find(|f| f.field == field)
            .map(|f| f.percent)
    }

    /// Fields below full coverage, lowest first
    pub fn gaps(&self) -> Vec<&FieldCoverage> {
        let mut gaps: Vec<&FieldCoverage> = self.fields.iter().filter(|f| f.percent < 100).collect();
        gaps.sort_by_key(|f| f.percent);
        gaps
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
