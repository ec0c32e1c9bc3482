//! Built-in checkout stages, in pipeline order.

pub mod book;
pub mod patron;
pub mod precondition;

pub use book::{AvailabilityStage, BookStage};
pub use patron::{HoldStage, PatronStage};
pub use precondition::{CatalogStage, RequestStage};
