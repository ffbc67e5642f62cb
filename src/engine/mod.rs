pub mod aggregate;
pub mod errors;
pub mod index;
pub mod plan;
pub mod series;
pub mod session;

pub use errors::*;
