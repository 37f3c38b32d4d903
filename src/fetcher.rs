#[path = "fetcher/traits.rs"]
mod traits;

#[path = "fetcher/memory.rs"]
mod memory;

#[path = "fetcher/ids.rs"]
mod ids;

#[path = "fetcher/http.rs"]
mod http;

pub use http::{HttpFetcherConfig, HttpPageFetcher};
pub use ids::{IdListFetcher, IdLookup};
pub use memory::MemoryPageFetcher;
pub use traits::PageFetcher;
