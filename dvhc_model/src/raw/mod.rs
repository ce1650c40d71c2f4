//! Shapes of the upstream source dumps.
//!
//! Each dump has its own row schema, and the unit dump mixes two. Every schema
//! variant gets an explicit adapter into a uniform record, resolved once at
//! ingestion so downstream code never probes for alternative field names.

mod code;
pub use self::code::{
    pad_code, DISTRICT_CODE_WIDTH, PROVINCE_CODE_WIDTH, WARD_CODE_WIDTH,
};

mod catalog_row;
pub use self::catalog_row::{CatalogDocument, CatalogRow};

mod province_row;
pub use self::province_row::ProvinceMergeRecord;

mod unit_row;
pub use self::unit_row::{collect_unit_rows, NamedUnitRow, PositionalUnitRow, RawUnitRow, UnitRecord};
