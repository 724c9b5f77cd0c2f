//! Progress reporting for downloads.
//!
//! The downloader feeds a [`ProgressSink`]; the CLI renders it as a bar.

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Converts a byte count to megabytes (MiB) for display.
pub fn to_mb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

/// Snapshot of download progress.
#[derive(Debug, Clone, Default)]
pub struct ProgressStats {
    /// Bytes written so far.
    pub bytes_done: u64,
    /// Total size announced by `Content-Length`.
    pub total_bytes: u64,
    /// Elapsed time since download start (seconds).
    pub elapsed_secs: f64,
}

impl ProgressStats {
    /// Download rate in bytes per second (0 if elapsed is 0).
    pub fn bytes_per_sec(&self) -> f64 {
        if self.elapsed_secs <= 0.0 {
            return 0.0;
        }
        self.bytes_done as f64 / self.elapsed_secs
    }

    pub fn total_mb(&self) -> f64 {
        to_mb(self.total_bytes)
    }
}

/// Receives download progress. All methods default to no-ops.
pub trait ProgressSink {
    /// Called once, after the size is known and before the first chunk.
    fn start(&mut self, _total_bytes: u64) {}
    /// Called after every chunk is written; `chunk_bytes` is that chunk's size.
    fn advance(&mut self, _stats: &ProgressStats, _chunk_bytes: u64) {}
    /// Called once after a complete transfer.
    fn finish(&mut self, _stats: &ProgressStats) {}
}

/// Discards all progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {}
