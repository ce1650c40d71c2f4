//! Library layer for `dvhc`: resolves pre-merger Vietnamese administrative
//! units to their post-merger successors and back.
//!
//! The batch side ([`pipeline`]) builds old catalogs, province correspondence
//! and both relations from three source documents and emits them as flat
//! JSON tables ([`emit`]). The read side ([`lookup`]) answers queries over
//! those tables with the same matching rules.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod emit;
pub mod error;
pub mod gap_fill;
pub mod lookup;
pub mod matching;
pub mod normalize;
pub mod pipeline;
pub mod province_merge;
pub mod sources;
pub mod units;

pub use dvhc_model;
pub use dvhc_model::types;

pub use catalog::{build_catalog, CatalogSource, OldCatalog};
pub use config::{ConfigError, InputPaths, PipelineConfig};
pub use emit::{BuildSummary, CatalogTables, LookupTables};
pub use error::PipelineError;
pub use lookup::{LookupClient, ReverseLookup, ReverseSource};
pub use matching::{MatchWeights, MatchingEngine, Relations};
pub use pipeline::{run, BuildContext, PipelineInputs};
