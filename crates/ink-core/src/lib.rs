pub mod error;
pub mod graph;
pub mod object;
pub mod path;
pub mod save;

pub use error::InkError;
pub use graph::*;
pub use object::*;
pub use path::*;
pub use save::*;
