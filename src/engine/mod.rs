pub mod dynamic;
pub mod events;
pub mod hypermedia;
mod pipeline;
pub mod state;
#[cfg(test)]
pub mod integration_tests;

pub use dynamic::{CreatedResource, DynamicResourceApi};
pub use events::{Event, ProcessedResource};
pub use hypermedia::HypermediaEngine;
pub use state::{ResourceState, ScopedLogger};
