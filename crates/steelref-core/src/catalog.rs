//! Steel catalog data model and loading.
//!
//! The catalog is a read-only list of [`SteelRecord`]s deserialized from the
//! dynamic data file (`steels.json`). The core never mutates it; reloads
//! replace the whole list. Parsing is deliberately lenient: a record missing
//! fields deserializes with empty defaults, and a malformed element inside a
//! well-formed array is skipped and counted rather than failing the load.
//! One bad record must never blank the whole catalog.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{SteelRefError, SteelRefResult};
use crate::recommend::{GrindKey, Recommendation};

// ---------------------------------------------------------------------------
// Closed enumerations
// ---------------------------------------------------------------------------

/// Finish category of an edge, used both for grouping records into display
/// panels and as the style of a sharpening recommendation.
///
/// The data file spells record finishes capitalized (`"Polished"`);
/// recommendation tables use the lowercase spelling. Both deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Finish {
    /// Fine, smooth edge for push cuts.
    #[serde(alias = "polished")]
    Polished,
    /// Coarse, aggressive edge for slicing.
    #[serde(alias = "toothy")]
    Toothy,
    /// Intermediate edge.
    #[serde(alias = "balanced")]
    Balanced,
}

impl Default for Finish {
    fn default() -> Self {
        Self::Balanced
    }
}

impl fmt::Display for Finish {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Polished => write!(f, "Polished"),
            Self::Toothy => write!(f, "Toothy"),
            Self::Balanced => write!(f, "Balanced"),
        }
    }
}

/// Coarse metallurgical grouping used as a fallback key when a steel lacks
/// its own recommendation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SteelClass {
    /// High vanadium-carbide volume (S90V, 10V, K390).
    VanadiumHeavy,
    /// Fine-carbide structures that take a keen polished edge (52100, AEB-L).
    FineCarbide,
    /// Conventional tool steels (O1, A2, D2).
    ToolSteel,
    /// Nitrogen-alloyed stainless (LC200N, Vanax).
    NitrogenSteel,
}

impl SteelClass {
    /// All classes, in fallback-table order.
    pub const ALL: [Self; 4] = [
        Self::VanadiumHeavy,
        Self::FineCarbide,
        Self::ToolSteel,
        Self::NitrogenSteel,
    ];

    /// Kebab-case tag as it appears in the data file.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::VanadiumHeavy => "vanadium-heavy",
            Self::FineCarbide => "fine-carbide",
            Self::ToolSteel => "tool-steel",
            Self::NitrogenSteel => "nitrogen-steel",
        }
    }
}

impl fmt::Display for SteelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One data-point-strength row: a severity tag (rendered as a bar by the UI)
/// plus free text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataPoint {
    /// Severity tag, e.g. `"bar strong"`. Opaque to the core.
    pub bar: String,
    /// Free-text description.
    pub text: String,
}

/// One steel in the catalog. Externally supplied, read-only.
///
/// Every field except `name` tolerates absence in the data file; missing
/// fields deserialize to empty strings, empty lists, or `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SteelRecord {
    /// Display name, unique within a catalog.
    pub name: String,
    /// Alternate names ("154CM" for CPM-154).
    pub aliases: Vec<String>,
    /// Manufacturer.
    pub mfg: String,
    /// Finish category the steel is grouped under.
    pub finish: Finish,
    /// Workable hardness range, free text ("58–62").
    pub hrc_range: String,
    /// Optimal hardness descriptor, free text ("62+", "61–62 / 61").
    pub hrc_optimal: String,
    /// Manufacturing process description.
    pub process: String,
    /// Trait strings rendered as a list.
    pub traits: Vec<String>,
    /// Grit descriptor for the stock edge.
    pub grit: String,
    /// Data-point strength rows.
    pub dps: Vec<DataPoint>,
    /// Metallurgical class used for recommendation fallback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steel_class: Option<SteelClass>,
    /// Per-grind recommendation overrides, taking precedence over every
    /// default table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grind_recommendations: Option<BTreeMap<GrindKey, Recommendation>>,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Result of a lenient catalog load: the records that parsed, plus how many
/// array elements were skipped as malformed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedCatalog {
    /// Records in data-file order.
    pub records: Vec<SteelRecord>,
    /// Malformed elements dropped from the array.
    pub skipped: usize,
}

/// Parse the dynamic data payload.
///
/// # Errors
///
/// Returns [`SteelRefError::DataShape`] when the payload is not valid JSON
/// or its root is not an array. The caller recovers by serving an empty
/// catalog and surfacing a banner. Malformed *elements* are not errors: they
/// are skipped, counted in [`LoadedCatalog::skipped`], and logged.
pub fn load_catalog(payload: &[u8]) -> SteelRefResult<LoadedCatalog> {
    let root: serde_json::Value =
        serde_json::from_slice(payload).map_err(|err| SteelRefError::DataShape {
            reason: err.to_string(),
        })?;
    let Some(items) = root.as_array() else {
        return Err(SteelRefError::DataShape {
            reason: format!("root is a JSON {}", json_kind(&root)),
        });
    };

    let mut records = Vec::with_capacity(items.len());
    let mut skipped = 0usize;
    for (position, item) in items.iter().enumerate() {
        match serde_json::from_value::<SteelRecord>(item.clone()) {
            Ok(record) => records.push(record),
            Err(err) => {
                skipped += 1;
                warn!(position, %err, "skipping malformed steel record");
            }
        }
    }

    debug!(
        record_count = records.len(),
        skipped, "catalog payload parsed"
    );
    Ok(LoadedCatalog { records, skipped })
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Hardness parsing and grouping
// ---------------------------------------------------------------------------

/// Extract the leading numeric value from an optimal-hardness descriptor.
///
/// Handles `"62+"`, `"61–62 / 61"`, `"60.5"`. Returns `None` when the
/// descriptor carries no number at all.
#[must_use]
pub fn parse_hrc_optimal(descriptor: &str) -> Option<f64> {
    let bytes = descriptor.as_bytes();
    let start = bytes.iter().position(u8::is_ascii_digit)?;
    let mut end = start;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' && bytes.get(end + 1).is_some_and(u8::is_ascii_digit)
    {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    descriptor[start..end].parse().ok()
}

/// Panel order of the grouped view.
pub const FINISH_PANEL_ORDER: [Finish; 3] = [Finish::Polished, Finish::Toothy, Finish::Balanced];

/// Group a catalog into the three finish panels, each sorted ascending by
/// parsed optimal hardness. Records without a parseable hardness sort first.
/// The sort is stable, so equal-hardness records keep catalog order.
#[must_use]
pub fn group_by_finish(records: &[SteelRecord]) -> Vec<(Finish, Vec<&SteelRecord>)> {
    FINISH_PANEL_ORDER
        .into_iter()
        .map(|finish| {
            let mut group: Vec<&SteelRecord> =
                records.iter().filter(|s| s.finish == finish).collect();
            group.sort_by(|a, b| sort_hrc(a).total_cmp(&sort_hrc(b)));
            (finish, group)
        })
        .collect()
}

fn sort_hrc(record: &SteelRecord) -> f64 {
    parse_hrc_optimal(&record.hrc_optimal).unwrap_or(f64::NEG_INFINITY)
}
