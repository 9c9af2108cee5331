// src/web/mod.rs
pub mod client;
pub mod resolver;

pub use client::{HttpFetcher, PageFetcher};
pub use resolver::{QueryTemplateResolver, SearchLinkResolver, WebsiteResolver};
