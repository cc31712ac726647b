// SEO generation pipeline.
// Implements: feature aggregation, keyword extraction, description generation,
// scoring, and metadata assembly. All model calls go through `oracle` — no
// direct HTTP calls here.

pub mod description;
pub mod features;
pub mod handlers;
pub mod keywords;
pub mod metadata;
pub mod pipeline;
pub mod prompts;
pub mod scoring;
