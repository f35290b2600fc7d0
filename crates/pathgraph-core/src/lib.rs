pub mod error;
pub mod id;
pub mod multigraph;
pub mod record;
pub mod tracker;

// Re-export commonly used types
pub use error::CoreError;
pub use id::{EdgeId, NodeId, TreeNodeId};
pub use multigraph::{EdgeEntry, Multigraph};
pub use record::PathRecord;
pub use tracker::Tracker;
