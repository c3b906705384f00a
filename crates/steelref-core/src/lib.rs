//! Core components of the steelref knife-steel reference.
//!
//! This crate holds the pure, synchronous parts of the system: the catalog
//! data model ([`SteelRecord`]), Unicode-aware key normalization, the fuzzy
//! [`SearchIndex`], the layered recommendation resolver, and the explicit
//! [`Session`] context the UI collaborator owns. The offline cache
//! subsystem lives in `steelref-offline` and shares this crate's error
//! type.
//!
//! None of the components here perform I/O or hold hidden state; they
//! index, score, and resolve immutable inputs and hand plain data back to
//! the caller.

pub mod catalog;
pub mod config;
pub mod error;
pub mod normalize;
pub mod recommend;
pub mod search;
pub mod session;
pub mod tracing_config;

pub use catalog::{
    DataPoint, FINISH_PANEL_ORDER, Finish, LoadedCatalog, SteelClass, SteelRecord,
    group_by_finish, load_catalog, parse_hrc_optimal,
};
pub use config::{DEFAULT_COMPARE_CAPACITY, DEFAULT_SEARCH_LIMIT, SessionConfig};
pub use error::{SteelRefError, SteelRefResult};
pub use normalize::normalize;
pub use recommend::{
    GrindKey, Microbevel, Recommendation, RecommendationTables, baseline_recommendation,
    effective_grind, resolve, resolve_with_session,
};
pub use search::{SearchIndex, score, search_key};
pub use session::{CompareTray, Session};
