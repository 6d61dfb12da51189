//! Value objects - immutable types that represent domain concepts

mod money;
mod snowflake;
mod stay_range;

pub use money::to_minor_units;
pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
pub use stay_range::StayRange;
