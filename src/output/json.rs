//! JSON report output

use crate::output::traits::{OutputResult, RecipeReport, ReportWriter};
use std::io::Write;

/// Writes the report as pretty-printed JSON to any `Write` sink
pub struct JsonReportWriter<W: Write> {
    sink: W,
}

impl<W: Write> JsonReportWriter<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

impl<W: Write> ReportWriter for JsonReportWriter<W> {
    fn write_report(&mut self, report: &RecipeReport) -> OutputResult<()> {
        serde_json::to_writer_pretty(&mut self.sink, report)?;
        self.sink.write_all(b"\n")?;
        self.sink.flush()?;
        Ok(())
    }
}
