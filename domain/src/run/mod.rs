//! Run parameters
//!
//! The typed snapshot a batch run works from, its validation rules and the
//! daily numbering epoch.

mod city;
mod customer_type;
mod environment;
pub mod epoch;
mod run_state;
mod validation;

pub use city::CityCode;
pub use customer_type::CustomerType;
pub use environment::Environment;
pub use run_state::RunState;
pub use validation::{
    MOBILE_PREFIX_RANGE, NUMBERING_CEILING, ValidationError, ValidationErrors,
};
