// src/events/mod.rs
pub mod block;
pub mod dates;
pub mod models;
pub mod window;

// Re-export key extraction types for convenience
#[allow(unused_imports)]
pub use self::{
    block::{EventBlockExtractor, FieldStrategy, LexicalFieldStrategy},
    dates::DateTextResolver,
    models::{EventRecord, RawFieldSignals, ResolvedDateRange},
    window::ReportingWindow,
};
