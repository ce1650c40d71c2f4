//! Data model for the Vietnamese administrative-unit merger resolver.
//!
//! `types` holds the catalog and relation records written to the generated
//! lookup tables. `raw` holds the shapes of the upstream source dumps and one
//! adapter per row schema.

pub mod raw;
pub mod types;
