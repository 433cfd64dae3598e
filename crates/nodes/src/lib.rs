//! `nodes` crate: the `ExecutableNode` trait and the Presenton node.
//!
//! The host dispatches execution through [`ExecutableNode`]; the
//! [`presenton`] module implements it on top of the Presenton
//! presentation-generation API.

pub mod error;
pub mod item;
pub mod traits;
pub mod presenton;

pub use error::NodeError;
pub use item::{BinaryData, NodeItem, NodeOutput};
pub use traits::{ExecutableNode, ExecutionContext};
