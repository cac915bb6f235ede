pub mod extractor;
pub mod orchestrator;
pub mod pipeline;
pub mod scheduler;
pub mod search;
pub mod selectors;

pub use crate::domain::model::{PriceRecord, RefreshSummary, RefreshTarget, SelectorTarget};
pub use crate::domain::ports::{PageFetcher, PriceStore, Sleeper};
pub use crate::utils::error::Result;
