//! Per-request run statistics
//!
//! Counts what happened to each candidate URL on its way through the fan-out.

use serde::Serialize;

/// Run statistics for one aggregation request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStatistics {
    /// Candidate URLs received
    pub candidates: usize,

    /// Candidates dropped by the exclusion list, never fetched
    pub excluded: usize,

    /// Candidates handed to the fetcher
    pub dispatched: usize,

    /// Fetches that failed (transport, timeout, non-2xx)
    pub fetch_failures: usize,

    /// Pages fetched fine but holding no recipe record
    pub extraction_absent: usize,

    /// Pages that yielded a recipe record
    pub extracted: usize,

    /// Records kept, at most the requested limit
    pub accepted: usize,

    /// Records extracted beyond the limit and thrown away
    pub discarded_over_limit: usize,
}

impl RunStatistics {
    /// Share of dispatched pages that produced a recipe, as a percentage
    pub fn extraction_rate(&self) -> f64 {
        if self.dispatched == 0 {
            return 0.0;
        }
        (self.extracted as f64 / self.dispatched as f64) * 100.0
    }
}

/// Formats statistics for terminal display
pub fn format_statistics(stats: &RunStatistics) -> String {
    let mut out = String::from("=== Run Statistics ===\n");
    out.push_str(&format!("  Candidates:            {}\n", stats.candidates));
    out.push_str(&format!("  Excluded:              {}\n", stats.excluded));
    out.push_str(&format!("  Dispatched:            {}\n", stats.dispatched));
    out.push_str(&format!("  Fetch failures:        {}\n", stats.fetch_failures));
    out.push_str(&format!(
        "  No recipe on page:     {}\n",
        stats.extraction_absent
    ));
    out.push_str(&format!(
        "  Extracted:             {} ({:.1}%)\n",
        stats.extracted,
        stats.extraction_rate()
    ));
    out.push_str(&format!("  Accepted:              {}\n", stats.accepted));
    out.push_str(&format!(
        "  Discarded over limit:  {}\n",
        stats.discarded_over_limit
    ));
    out
}

/// Logs statistics at info level
pub fn log_statistics(stats: &RunStatistics) {
    tracing::info!(
        "Candidates: {}, excluded: {}, dispatched: {}, failed: {}, no recipe: {}, accepted: {}/{}",
        stats.candidates,
        stats.excluded,
        stats.dispatched,
        stats.fetch_failures,
        stats.extraction_absent,
        stats.accepted,
        stats.extracted
    );
}
