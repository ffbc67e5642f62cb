pub mod ops;


pub use ops::AggregatorImpl;
