//! Text ingestion of point sets.

pub mod reader;

pub use reader::{PointReader, PointSetInfo};
