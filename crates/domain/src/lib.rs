pub mod errors;
pub mod patch;
pub mod todo;

pub use errors::*;
pub use patch::*;
pub use todo::*;
