//! Implements RunObserver with an indicatif progress bar over the day range.

use crate::ports::RunObserver;
use crate::usecases::RunStats;
use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

const TEMPLATE: &str = "{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} days {msg}";

pub struct DayProgress {
    bar: ProgressBar,
    started: AtomicBool,
}

impl DayProgress {
    pub fn new(total_days: usize) -> Self {
        let bar = ProgressBar::new(total_days as u64);
        let style = ProgressStyle::with_template(TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(100));
        Self {
            bar,
            started: AtomicBool::new(false),
        }
    }

    /// A bar that never draws (tests, `--no-progress`, non-interactive runs).
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            started: AtomicBool::new(false),
        }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

impl RunObserver for DayProgress {
    fn day_started(&self, date: NaiveDate, present: bool) {
        // Position counts completed days; the bar advances when the next one starts.
        if self.started.swap(true, Ordering::Relaxed) {
            self.bar.inc(1);
        }
        let note = if present { "" } else { " (no file)" };
        self.bar.set_message(format!("{date}{note}"));
    }

    fn finished(&self, stats: &RunStats) {
        self.bar.set_position(stats.days_in_range as u64);
        self.bar
            .finish_with_message(format!("{} clusters", stats.clusters));
    }
}
