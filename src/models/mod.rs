pub mod catalog;
pub mod pagination;
pub mod search;

mod serde_helpers;

pub use catalog::*;
pub use pagination::*;
pub use search::*;
