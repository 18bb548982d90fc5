//! Client-side task domain: wire types, the draft list, the dependency
//! graph transform, the force layout, and quadrant classification.

pub mod graph;
pub mod layout;
pub mod quadrant;
pub mod store;
pub mod task;

pub use graph::{build_graph, GraphEdge, GraphNode, TaskGraph};
pub use layout::ForceSimulation;
pub use quadrant::Quadrant;
pub use store::TaskStore;
pub use task::{Cycle, ScoredTask, Task};
