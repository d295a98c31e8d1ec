use crate::output::{CrawlStats, OutputResult, PageOutput};
use crate::page::PageRecord;
use std::io::Write;

/// Writes each page as one line of JSON
#[derive(Debug)]
pub struct JsonLinesWriter<W: Write> {
    writer: W,
    written: u64,
}

impl<W: Write> JsonLinesWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Number of pages written so far
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> PageOutput for JsonLinesWriter<W> {
    fn write_page(&mut self, page: &PageRecord) -> OutputResult<()> {
        serde_json::to_writer(&mut self.writer, page)?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    fn finalize(&mut self, stats: &CrawlStats) -> OutputResult<()> {
        self.writer.flush()?;
        tracing::debug!(
            "Wrote {} pages ({} processed)",
            self.written,
            stats.pages_processed
        );
        Ok(())
    }
}
