pub mod client;
pub mod crawler;
pub mod detect;
pub mod error;
pub mod intruder;
pub mod repeater;
pub mod response;
pub mod result;

pub use client::build_client;
pub use crawler::Crawler;
pub use error::ScanError;
pub use response::PageResponse;
pub use result::{Finding, FormDescriptor, IntruderEntry, RepeaterEntry, ScanOutcome};
