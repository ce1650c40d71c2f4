mod old_units;
pub use self::old_units::{OldDistrict, OldProvince, OldWard};

mod new_units;
pub use self::new_units::{NewProvince, NewWard, ProvinceStats, UnitType, WardStats};

mod mapping;
pub use self::mapping::{MappingEntry, ProvinceRef, ReverseEntry, WardRef, PARTIAL_NOTE};

mod index;
pub use self::index::{DistrictIndexEntry, WardIndexEntry};
