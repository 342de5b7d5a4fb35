pub mod calculations;
mod engine;
mod error;
pub mod models;
pub mod rules;

pub use engine::TaxEngine;
pub use error::TaxError;
