pub mod builder;
pub mod hl_query;


pub use hl_query::{HlQuery, ORDER_BY_TIMESTAMP_DESC};
