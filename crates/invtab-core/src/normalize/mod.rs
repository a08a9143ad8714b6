//! Column normalization against a synonym library.
//!
//! Raw invoice tables label their columns in many ways ("Qty", "Quantity",
//! "Pcs", ...). The [`ColumnLibrary`] lists, for every canonical field, the
//! lowercase prefixes that identify it; [`normalize_columns`] renames every
//! header that starts with one of those prefixes.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::table::{CanonicalField, NormalizedTable, RawTable};

/// Synonyms for one canonical field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynonymEntry {
    pub field: CanonicalField,
    pub synonyms: Vec<String>,
}

/// Ordered mapping canonical field -> header prefixes.
///
/// Iteration order matters: with [`ConflictPolicy::LastWins`] the field
/// listed later claims a header that several fields match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnLibrary {
    entries: Vec<SynonymEntry>,
}

/// How to resolve a header claimed by more than one canonical field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// The field evaluated last wins.
    #[default]
    LastWins,
    /// The field with the longest matching prefix wins; ties go to the later field.
    LongestPrefix,
}

/// Two fields whose synonyms can claim the same header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynonymOverlap {
    pub first: (CanonicalField, String),
    pub second: (CanonicalField, String),
}

impl ColumnLibrary {
    /// Build a library from `(field, synonyms)` pairs, keeping their order.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (CanonicalField, Vec<S>)>,
        S: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(field, synonyms)| SynonymEntry {
                    field,
                    synonyms: synonyms.into_iter().map(Into::into).collect(),
                })
                .collect(),
        }
    }

    pub fn entries(&self) -> &[SynonymEntry] {
        &self.entries
    }

    /// Synonyms registered for a field (empty if the field is absent).
    pub fn synonyms(&self, field: CanonicalField) -> &[String] {
        self.entries
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.synonyms.as_slice())
            .unwrap_or(&[])
    }

    /// Pairs of synonyms from different fields where one is a prefix of the other.
    ///
    /// Any header matching the longer synonym also matches the shorter one,
    /// so these pairs are where renaming depends on [`ConflictPolicy`].
    pub fn overlaps(&self) -> Vec<SynonymOverlap> {
        let mut overlaps = Vec::new();
        for (i, a) in self.entries.iter().enumerate() {
            for b in &self.entries[i + 1..] {
                if a.field == b.field {
                    continue;
                }
                for sa in a.synonyms.iter().map(|s| s.trim().to_lowercase()) {
                    for sb in b.synonyms.iter().map(|s| s.trim().to_lowercase()) {
                        if sa.is_empty() || sb.is_empty() {
                            continue;
                        }
                        if sa.starts_with(&sb) || sb.starts_with(&sa) {
                            overlaps.push(SynonymOverlap {
                                first: (a.field, sa.clone()),
                                second: (b.field, sb.clone()),
                            });
                        }
                    }
                }
            }
        }
        overlaps
    }
}

impl Default for ColumnLibrary {
    fn default() -> Self {
        use CanonicalField::*;

        Self::new([
            (InvoiceNo, vec!["invoice no", "inv no", "invoice number", "inv#", "bill no"]),
            (Date, vec!["date", "invoice date", "bill date"]),
            (Supplier, vec!["supplier", "vendor", "company"]),
            (Item, vec!["item", "description", "product", "goods"]),
            (Qty, vec!["qty", "quantity", "pcs", "no.", "units"]),
            (Price, vec!["price", "unit price", "unit cost", "rate", "cost"]),
            (Total, vec!["total", "amount", "value", "line total"]),
            (Vat, vec!["vat", "tax", "vat amount"]),
        ])
    }
}

/// Longest synonym of `synonyms` that prefixes `label`, if any.
fn longest_match(label: &str, synonyms: &[String]) -> Option<usize> {
    synonyms
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty() && label.starts_with(s.as_str()))
        .map(|s| s.len())
        .max()
}

/// Rename headers to canonical field names.
///
/// A header is compared lower-cased and trimmed; it is renamed when it starts
/// with any synonym of a field. Unmatched headers keep their original label.
pub fn normalize_columns(
    headers: &[String],
    library: &ColumnLibrary,
    policy: ConflictPolicy,
) -> Vec<String> {
    // (field, matched prefix length) chosen so far for each header
    let mut chosen: Vec<Option<(CanonicalField, usize)>> = vec![None; headers.len()];

    for entry in library.entries() {
        for (idx, header) in headers.iter().enumerate() {
            let label = header.trim().to_lowercase();
            let Some(len) = longest_match(&label, &entry.synonyms) else {
                continue;
            };

            let replace = match (chosen[idx], policy) {
                (None, _) => true,
                (Some(_), ConflictPolicy::LastWins) => true,
                (Some((_, prev_len)), ConflictPolicy::LongestPrefix) => len >= prev_len,
            };

            if let Some((prev, _)) = chosen[idx] {
                debug!(
                    "Column '{}' claimed by both {} and {} ({})",
                    header,
                    prev,
                    entry.field,
                    if replace { entry.field } else { prev }
                );
            }

            if replace {
                chosen[idx] = Some((entry.field, len));
            }
        }
    }

    headers
        .iter()
        .zip(chosen)
        .map(|(header, field)| match field {
            Some((field, _)) => field.as_str().to_string(),
            None => header.clone(),
        })
        .collect()
}

/// Split a raw table into header and rows and normalize the header.
pub fn normalize_table(
    raw: &RawTable,
    library: &ColumnLibrary,
    policy: ConflictPolicy,
) -> NormalizedTable {
    NormalizedTable {
        page: raw.page,
        columns: normalize_columns(raw.header(), library, policy),
        rows: raw.body().to_vec(),
    }
}
