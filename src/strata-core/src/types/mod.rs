//! Type system for Strata values.
//!
//! This module defines the `Value` enum for runtime values, `DataType` for
//! type information, and the string casts used to turn raw partition values
//! into typed literals.

mod cast;
mod data_type;
mod time_zone;
mod value;

pub use cast::{HIVE_DEFAULT_PARTITION, cast_partition_value};
pub use data_type::DataType;
pub use time_zone::TimeZone;
pub use value::Value;
