pub mod dynamodb;
pub mod memory;
pub mod models;
pub mod retry;
pub mod store;

pub use dynamodb::*;
pub use memory::*;
pub use models::*;
pub use retry::*;
pub use store::*;
