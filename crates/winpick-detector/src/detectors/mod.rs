//! Region detector implementations.

pub mod region;

pub use region::RegionDetector;
