//! Crawler module for the recipe fan-out
//!
//! This module contains the fetch-and-extract machinery:
//! - HTTP fetching with a fixed timeout and browser identification
//! - JSON-LD scanning and `Recipe` extraction
//! - A task group that joins concurrent fetches as one batch
//! - The coordinator that drives all of it over a candidate list

mod coordinator;
mod extractor;
mod fetcher;
mod task_group;

pub use coordinator::{fetch_and_extract, Coordinator, PageOutcome};
pub use extractor::{
    candidate_objects, declares_type, extract_recipe, scan_blocks, BlockOutcome, TARGET_KIND,
};
pub use fetcher::{
    build_http_client, fetch_document, FetchCause, FetchFailure, RawDocument, FETCH_TIMEOUT,
};
pub use task_group::TaskGroup;
