pub mod time_interval;


pub use time_interval::{
    TimeInterval, TimeIntervalError, bucket_time_intervals, duration_nanos, from_unix_nanos,
    to_unix_nanos, truncate_nanos,
};
