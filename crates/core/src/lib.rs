//! Domain core of the adaptive arithmetic drill: exact rational values, the
//! question and attempt model, per-level generation parameters, and the
//! progression rules that move a learner between levels.

#![forbid(unsafe_code)]

pub mod error;
pub mod model;
pub mod params;
pub mod progression;
pub mod rational;
pub mod settings;
pub mod time;

pub use error::Error;
pub use time::Clock;
