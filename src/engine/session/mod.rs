pub mod bootstrap;
pub mod memory;
pub mod timeout;
pub mod traits;
pub mod value;

#[cfg(test)]
mod memory_test;

pub use bootstrap::{BLESSED_KEYSPACE, BLESSED_TABLES, build_client_side_index, fetch_series_collection};
pub use memory::{MemorySession, PointRecord};
pub use timeout::TimeoutSession;
pub use traits::{RowIter, Session, SharedSession, VecRowIter};
pub use value::{CqlValue, Row};
