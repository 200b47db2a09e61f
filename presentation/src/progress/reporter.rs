//! Progress reporting for batch runs

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use leadforge_application::{AttemptFailure, BatchProgressNotifier, BatchSummary};
use leadforge_domain::LeadRecord;
use std::sync::Mutex;

/// Reports batch progress with a progress bar
pub struct ProgressReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn batch_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=>-")
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock()
            && let Some(pb) = guard.as_ref()
        {
            f(pb);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchProgressNotifier for ProgressReporter {
    fn on_batch_start(&self, first_ordinal: u32, lead_count: u32) {
        let pb = ProgressBar::new(lead_count as u64);
        pb.set_style(Self::batch_style());
        pb.set_prefix("Creating leads");
        pb.set_message(format!("starting at #{first_ordinal}"));

        if let Ok(mut guard) = self.bar.lock() {
            *guard = Some(pb);
        }
    }

    fn on_attempt_start(&self, ordinal: u32, attempt: u32, max_attempts: u32) {
        self.with_bar(|pb| {
            if attempt == 1 {
                pb.set_message(format!("#{ordinal}"));
            } else {
                pb.set_message(format!("#{ordinal} (attempt {attempt}/{max_attempts})"));
            }
        });
    }

    fn on_attempt_failed(
        &self,
        ordinal: u32,
        attempt: u32,
        max_attempts: u32,
        failure: &AttemptFailure,
    ) {
        self.with_bar(|pb| {
            pb.println(format!(
                "  {} #{} attempt {}/{}: {}",
                "x".red(),
                ordinal,
                attempt,
                max_attempts,
                failure
            ));
        });
    }

    fn on_lead_created(&self, record: &LeadRecord, _created: u32, _total: u32) {
        self.with_bar(|pb| {
            pb.set_message(format!("{} #{} {}", "v".green(), record.ordinal, record.project_id));
            pb.inc(1);
        });
    }

    fn on_batch_complete(&self, summary: &BatchSummary) {
        if let Ok(mut guard) = self.bar.lock()
            && let Some(pb) = guard.take()
        {
            if summary.completed {
                pb.finish_with_message(format!("{}", "complete!".green()));
            } else {
                pb.abandon_with_message(format!(
                    "{} after #{}",
                    "stopped".red(),
                    summary.last_successful_ordinal
                ));
            }
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl BatchProgressNotifier for SimpleProgress {
    fn on_batch_start(&self, first_ordinal: u32, lead_count: u32) {
        println!(
            "{} {} ({} leads from #{})",
            "->".cyan(),
            "Creating leads".bold(),
            lead_count,
            first_ordinal
        );
    }

    fn on_attempt_start(&self, ordinal: u32, attempt: u32, max_attempts: u32) {
        if attempt > 1 {
            println!(
                "  {} #{} retry {}/{}",
                "~".yellow(),
                ordinal,
                attempt,
                max_attempts
            );
        }
    }

    fn on_attempt_failed(
        &self,
        ordinal: u32,
        attempt: u32,
        max_attempts: u32,
        failure: &AttemptFailure,
    ) {
        println!(
            "  {} #{} attempt {}/{} failed: {}",
            "x".red(),
            ordinal,
            attempt,
            max_attempts,
            failure
        );
    }

    fn on_lead_created(&self, record: &LeadRecord, created: u32, total: u32) {
        println!(
            "  {} #{} customer {} project {} ({}/{})",
            "v".green(),
            record.ordinal,
            record.customer_id,
            record.project_id,
            created,
            total
        );
    }

    fn on_batch_complete(&self, _summary: &BatchSummary) {
        println!();
    }
}
