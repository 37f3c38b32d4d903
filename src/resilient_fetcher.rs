#[path = "resilient_fetcher/config.rs"]
mod config;

#[path = "resilient_fetcher/wrapper.rs"]
mod wrapper;

pub use config::ResilienceConfig;
pub use wrapper::ResilientFetcher;
