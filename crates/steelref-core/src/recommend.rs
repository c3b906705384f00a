//! Layered sharpening-recommendation resolution.
//!
//! A recommendation for a (steel, grind) pair is resolved through a
//! three-tier fallback chain, first hit wins:
//!
//! | Tier | Source                                   |
//! |------|------------------------------------------|
//! | 1    | the steel's own per-grind override       |
//! | 2    | the steel-class default for that grind   |
//! | 3    | the global default for that grind        |
//! | —    | baseline (terminal, always fully filled) |
//!
//! Resolution never fails and never returns a partially-populated value.
//! The grind itself cascades independently of the table lookup: explicit
//! argument, then the session's active grind, then [`GrindKey::BASELINE`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{Finish, SteelClass, SteelRecord};

// ---------------------------------------------------------------------------
// Grind keys
// ---------------------------------------------------------------------------

/// Blade cross-section geometry category, the lookup key at every tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GrindKey {
    FullFlat,
    Hollow,
    Convex,
    Saber,
    Scandi,
    Chisel,
    Compound,
    Tanto,
    MicrobevelFocused,
}

impl GrindKey {
    /// Every grind key, in table order.
    pub const ALL: [Self; 9] = [
        Self::FullFlat,
        Self::Hollow,
        Self::Convex,
        Self::Saber,
        Self::Scandi,
        Self::Chisel,
        Self::Compound,
        Self::Tanto,
        Self::MicrobevelFocused,
    ];

    /// Terminal default when neither an explicit grind nor a session grind
    /// is supplied.
    pub const BASELINE: Self = Self::FullFlat;

    /// Kebab-case tag as it appears in the data file.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FullFlat => "full-flat",
            Self::Hollow => "hollow",
            Self::Convex => "convex",
            Self::Saber => "saber",
            Self::Scandi => "scandi",
            Self::Chisel => "chisel",
            Self::Compound => "compound",
            Self::Tanto => "tanto",
            Self::MicrobevelFocused => "microbevel-focused",
        }
    }

    /// Parse a kebab-case tag. Returns `None` for unrecognized strings.
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.as_str() == tag)
    }
}

impl fmt::Display for GrindKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Recommendation value
// ---------------------------------------------------------------------------

/// Microbevel portion of a recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Microbevel {
    /// Angle descriptor, per side ("15 dps").
    pub angle: String,
    /// Grit to apply the microbevel at.
    pub grit: String,
}

/// A fully-populated sharpening recommendation. Immutable value type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    /// Finish style the edge should be taken to.
    #[serde(rename = "finishStyle")]
    pub finish: Finish,
    /// Primary bevel grit progression.
    pub grit_range: String,
    /// Microbevel angle and grit.
    pub microbevel: Microbevel,
    /// Free-text guidance. May be empty, never absent.
    #[serde(default)]
    pub notes: String,
}

impl Recommendation {
    fn new(finish: Finish, grit_range: &str, angle: &str, grit: &str, notes: &str) -> Self {
        Self {
            finish,
            grit_range: grit_range.into(),
            microbevel: Microbevel {
                angle: angle.into(),
                grit: grit.into(),
            },
            notes: notes.into(),
        }
    }
}

/// Terminal fallback for a grind absent from every table: balanced style,
/// generic mid-range grit, empty notes.
#[must_use]
pub fn baseline_recommendation() -> Recommendation {
    Recommendation::new(Finish::Balanced, "400\u{2013}800", "15 dps", "600", "")
}

// ---------------------------------------------------------------------------
// Default tables
// ---------------------------------------------------------------------------

/// Static default tables for recommendation resolution: one per-class table
/// and one global table. Plain data owned by the caller, not process state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationTables {
    /// Tier-2 defaults, keyed by steel class then grind.
    pub by_class: BTreeMap<SteelClass, BTreeMap<GrindKey, Recommendation>>,
    /// Tier-3 defaults, keyed by grind. Covers every [`GrindKey`] in the
    /// built-in tables.
    pub global: BTreeMap<GrindKey, Recommendation>,
}

impl RecommendationTables {
    /// The built-in tables shipped with the reference.
    #[must_use]
    pub fn builtin() -> Self {
        let global = BTreeMap::from([
            (
                GrindKey::FullFlat,
                Recommendation::new(
                    Finish::Balanced,
                    "400\u{2013}1000",
                    "15 dps",
                    "600",
                    "All-purpose geometry; finish on a fine stone and strop lightly.",
                ),
            ),
            (
                GrindKey::Hollow,
                Recommendation::new(
                    Finish::Polished,
                    "1000\u{2013}3000",
                    "12\u{2013}15 dps",
                    "1000",
                    "Thin edge shoulder rewards a refined apex; keep pressure light.",
                ),
            ),
            (
                GrindKey::Convex,
                Recommendation::new(
                    Finish::Balanced,
                    "400\u{2013}800",
                    "rolled",
                    "800",
                    "Maintain on a loaded strop; stones flatten the convexity over time.",
                ),
            ),
            (
                GrindKey::Saber,
                Recommendation::new(
                    Finish::Toothy,
                    "220\u{2013}600",
                    "17 dps",
                    "400",
                    "Thick spine tolerates coarse edges for hard use.",
                ),
            ),
            (
                GrindKey::Scandi,
                Recommendation::new(
                    Finish::Polished,
                    "800\u{2013}2000",
                    "none",
                    "\u{2014}",
                    "Sharpen the full bevel flat on the stone; no secondary bevel.",
                ),
            ),
            (
                GrindKey::Chisel,
                Recommendation::new(
                    Finish::Polished,
                    "1000\u{2013}4000",
                    "1\u{2013}2 dps back bevel",
                    "2000",
                    "Single-side geometry; deburr the flat face only.",
                ),
            ),
            (
                GrindKey::Compound,
                Recommendation::new(
                    Finish::Balanced,
                    "320\u{2013}1000",
                    "15 dps",
                    "600",
                    "Treat each bevel zone separately; match the factory transitions.",
                ),
            ),
            (
                GrindKey::Tanto,
                Recommendation::new(
                    Finish::Toothy,
                    "220\u{2013}400",
                    "17 dps",
                    "400",
                    "Sharpen the tip bevel as its own edge; do not round the yokote.",
                ),
            ),
            (
                GrindKey::MicrobevelFocused,
                Recommendation::new(
                    Finish::Balanced,
                    "600\u{2013}1000",
                    "20 dps",
                    "1000",
                    "The microbevel is the working edge; refresh it often, reset rarely.",
                ),
            ),
        ]);

        let by_class = BTreeMap::from([
            (
                SteelClass::VanadiumHeavy,
                BTreeMap::from([
                    (
                        GrindKey::FullFlat,
                        Recommendation::new(
                            Finish::Toothy,
                            "320\u{2013}600",
                            "17 dps",
                            "400",
                            "Vanadium carbides outlast fine abrasives; stop coarse, use diamond or CBN.",
                        ),
                    ),
                    (
                        GrindKey::Hollow,
                        Recommendation::new(
                            Finish::Toothy,
                            "400\u{2013}800",
                            "15 dps",
                            "600",
                            "Diamond plates keep the thin edge honest; skip the high-grit polish.",
                        ),
                    ),
                    (
                        GrindKey::Saber,
                        Recommendation::new(
                            Finish::Toothy,
                            "220\u{2013}400",
                            "18 dps",
                            "320",
                            "Edge retention carries the coarse finish for a long time.",
                        ),
                    ),
                ]),
            ),
            (
                SteelClass::FineCarbide,
                BTreeMap::from([
                    (
                        GrindKey::FullFlat,
                        Recommendation::new(
                            Finish::Polished,
                            "1000\u{2013}5000",
                            "13 dps",
                            "2000",
                            "Fine structure takes a razor polish; deburr thoroughly.",
                        ),
                    ),
                    (
                        GrindKey::Hollow,
                        Recommendation::new(
                            Finish::Polished,
                            "2000\u{2013}8000",
                            "12 dps",
                            "4000",
                            "Push-cut performance peaks at high polish on this geometry.",
                        ),
                    ),
                    (
                        GrindKey::Scandi,
                        Recommendation::new(
                            Finish::Polished,
                            "1000\u{2013}4000",
                            "none",
                            "\u{2014}",
                            "Full-bevel polish; the burr strips cleanly on leather.",
                        ),
                    ),
                ]),
            ),
            (
                SteelClass::ToolSteel,
                BTreeMap::from([
                    (
                        GrindKey::FullFlat,
                        Recommendation::new(
                            Finish::Balanced,
                            "400\u{2013}1000",
                            "15 dps",
                            "600",
                            "Forgiving on any abrasive; oxide stones work fine.",
                        ),
                    ),
                    (
                        GrindKey::Convex,
                        Recommendation::new(
                            Finish::Balanced,
                            "320\u{2013}800",
                            "rolled",
                            "600",
                            "Field maintenance on a strop keeps the apex aligned.",
                        ),
                    ),
                ]),
            ),
            (
                SteelClass::NitrogenSteel,
                BTreeMap::from([
                    (
                        GrindKey::FullFlat,
                        Recommendation::new(
                            Finish::Polished,
                            "800\u{2013}3000",
                            "14 dps",
                            "1000",
                            "Corrosion-proof edge holds a polish well in wet use.",
                        ),
                    ),
                    (
                        GrindKey::Hollow,
                        Recommendation::new(
                            Finish::Polished,
                            "1000\u{2013}3000",
                            "13 dps",
                            "2000",
                            "Refine fully; nitrogen steels deburr easily.",
                        ),
                    ),
                ]),
            ),
        ]);

        Self { by_class, global }
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Resolve a recommendation for `steel` at `grind` through the three-tier
/// fallback chain. Total: always returns a fully-populated value.
#[must_use]
pub fn resolve(
    steel: &SteelRecord,
    grind: GrindKey,
    tables: &RecommendationTables,
) -> Recommendation {
    if let Some(overrides) = &steel.grind_recommendations
        && let Some(rec) = overrides.get(&grind)
    {
        debug!(steel = %steel.name, %grind, tier = "override", "recommendation resolved");
        return rec.clone();
    }

    if let Some(class) = steel.steel_class
        && let Some(rec) = tables.by_class.get(&class).and_then(|m| m.get(&grind))
    {
        debug!(steel = %steel.name, %grind, %class, tier = "class", "recommendation resolved");
        return rec.clone();
    }

    if let Some(rec) = tables.global.get(&grind) {
        debug!(steel = %steel.name, %grind, tier = "global", "recommendation resolved");
        return rec.clone();
    }

    debug!(steel = %steel.name, %grind, tier = "baseline", "recommendation resolved");
    baseline_recommendation()
}

/// Cascade the grind choice: explicit argument, then the session's active
/// grind, then [`GrindKey::BASELINE`].
#[must_use]
pub fn effective_grind(explicit: Option<GrindKey>, session: Option<GrindKey>) -> GrindKey {
    explicit.or(session).unwrap_or(GrindKey::BASELINE)
}

/// [`resolve`] with the grind cascade applied first.
#[must_use]
pub fn resolve_with_session(
    steel: &SteelRecord,
    explicit: Option<GrindKey>,
    session: Option<GrindKey>,
    tables: &RecommendationTables,
) -> Recommendation {
    resolve(steel, effective_grind(explicit, session), tables)
}
