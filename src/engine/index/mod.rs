pub mod client_side_index;


pub use client_side_index::ClientSideIndex;
