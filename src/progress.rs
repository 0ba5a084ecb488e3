//! Progress reporting for apply runs

use declarative::{ApplyResult, ProgressCallback};
use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar fed by the declarative executor
#[derive(Default)]
pub struct BarProgress {
    bar: Option<ProgressBar>,
    hidden: bool,
}

impl BarProgress {
    pub fn new(hidden: bool) -> Self {
        Self { bar: None, hidden }
    }
}

fn bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-");
    pb.set_style(style);
    pb
}

/// Symbol shown next to a finished key
pub fn symbol(result: &ApplyResult) -> &'static str {
    match result {
        ApplyResult::NoChange => "○",
        ApplyResult::Created | ApplyResult::Modified | ApplyResult::Removed => "✓",
        ApplyResult::Failed { .. } => "✗",
        ApplyResult::Skipped { .. } => "⊘",
    }
}

impl ProgressCallback for BarProgress {
    fn on_batch_start(&mut self, count: usize) {
        self.bar = Some(if self.hidden {
            ProgressBar::hidden()
        } else {
            bar(count as u64)
        });
    }

    fn on_resource_start(&mut self, id: &str, _description: &str) {
        if let Some(pb) = &self.bar {
            pb.set_message(id.to_string());
        }
    }

    fn on_resource_complete(&mut self, id: &str, result: &ApplyResult) {
        if let Some(pb) = &self.bar {
            if let ApplyResult::Failed { error } = result {
                pb.println(format!("  ✗ {id}: {error}"));
            }
            pb.set_message(format!("{} {id}", symbol(result)));
            pb.inc(1);
        }
    }

    fn on_batch_complete(&mut self) {
        if let Some(pb) = self.bar.take() {
            pb.finish_and_clear();
        }
    }
}
