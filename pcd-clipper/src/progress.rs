use indicatif::{ProgressBar, ProgressStyle};

/// Receives batch progress from a running pipeline.
pub trait ProgressReporter {
    /// Called once before the first batch with the expected number of batches.
    /// The estimate comes from the input header and may be off.
    fn start(&self, total_batches: u64);

    fn advance(&self, batches: u64);

    fn finish(&self);

    /// The run failed; nothing more will be reported.
    fn abandon(&self);
}

/// Discards all progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn start(&self, _total_batches: u64) {}

    fn advance(&self, _batches: u64) {}

    fn finish(&self) {}

    fn abandon(&self) {}
}

/// Terminal progress bar: `processed/total batches (percent)`.
pub struct BatchProgressBar {
    bar: ProgressBar,
}

impl BatchProgressBar {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} batches ({percent}%) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("▉▊▋▌▍▎▏ "),
        );
        Self { bar }
    }
}

impl Default for BatchProgressBar {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for BatchProgressBar {
    fn start(&self, total_batches: u64) {
        self.bar.set_length(total_batches);
        self.bar.set_position(0);
        self.bar.set_message("clipping");
    }

    fn advance(&self, batches: u64) {
        self.bar.inc(batches);
    }

    fn finish(&self) {
        // The header estimate can be short or long; the final state is 100%.
        self.bar.set_length(self.bar.position());
        self.bar.finish_with_message("done");
    }

    fn abandon(&self) {
        self.bar.abandon_with_message("failed");
    }
}
