//! Terminal progress bar for package downloads (indicatif).

use apkcache_core::progress::{to_mb, ProgressSink, ProgressStats};
use indicatif::{ProgressBar, ProgressState, ProgressStyle};
use std::fmt::Write;

const TEMPLATE: &str =
    "{msg} {percent:>3}%|{wide_bar}| {mb} MB [{elapsed_precise}<{eta_precise}, {binary_bytes_per_sec}]";

fn style() -> ProgressStyle {
    ProgressStyle::with_template(TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .with_key("mb", |state: &ProgressState, w: &mut dyn Write| {
            let _ = write!(
                w,
                "{:.2}/{:.2}",
                to_mb(state.pos()),
                to_mb(state.len().unwrap_or(0))
            );
        })
}

/// Shows nothing until the size is known, then a bar sized in bytes.
#[derive(Default)]
pub struct DownloadBar {
    bar: Option<ProgressBar>,
}

impl ProgressSink for DownloadBar {
    fn start(&mut self, total_bytes: u64) {
        let bar = ProgressBar::new(total_bytes);
        bar.set_style(style());
        bar.set_message("Downloading");
        self.bar = Some(bar);
    }

    fn advance(&mut self, stats: &ProgressStats, _chunk_bytes: u64) {
        if let Some(bar) = &self.bar {
            bar.set_position(stats.bytes_done);
        }
    }

    fn finish(&mut self, stats: &ProgressStats) {
        if let Some(bar) = self.bar.take() {
            bar.set_position(stats.bytes_done);
            bar.finish();
        }
    }
}

impl Drop for DownloadBar {
    fn drop(&mut self) {
        // Failed transfer: leave the bar where it stopped.
        if let Some(bar) = self.bar.take() {
            bar.abandon();
        }
    }
}
