#[path = "coordinator/request.rs"]
mod request;

#[path = "coordinator/loader.rs"]
mod loader;

pub use loader::{LoadCoordinator, LoadOutcome};
pub use request::LoadRequest;
