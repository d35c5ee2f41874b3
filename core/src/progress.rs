use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Terminal progress for the orchestration loop: one bar for the iteration
/// budget and a spinner for the task currently being worked on.
pub struct ProgressMonitor {
    multi: MultiProgress,
    overall: ProgressBar,
    current: Option<ProgressBar>,
    enabled: bool,
}

impl ProgressMonitor {
    /// `enabled` is false for JSON output or when stderr is not a terminal.
    pub fn new(max_iterations: u32, enabled: bool) -> Self {
        if !enabled {
            return Self {
                multi: MultiProgress::new(),
                overall: ProgressBar::hidden(),
                current: None,
                enabled: false,
            };
        }

        let multi = MultiProgress::new();
        let overall = multi.add(ProgressBar::new(u64::from(max_iterations)));
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} iterations {msg}")
        {
            overall.set_style(style.progress_chars("█▓▒░  "));
        }
        overall.set_message("planning...");

        Self {
            multi,
            overall,
            current: None,
            enabled: true,
        }
    }

    pub fn start_task(&mut self, name: &str, attempt: u32) {
        if !self.enabled {
            return;
        }

        let bar = self.multi.add(ProgressBar::new_spinner());
        if let Ok(style) = ProgressStyle::default_spinner().template("  {spinner:.green} {msg}") {
            bar.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
        }
        if attempt > 0 {
            bar.set_message(format!("⏳ {} (retry {})", name, attempt));
        } else {
            bar.set_message(format!("⏳ {}", name));
        }
        bar.enable_steady_tick(Duration::from_millis(100));

        if let Some(prev) = self.current.replace(bar) {
            prev.finish_and_clear();
        }
    }

    /// Close the current spinner with an outcome label such as "completed" or "retry".
    pub fn finish_task(&mut self, name: &str, outcome: &str, success: bool) {
        if !self.enabled {
            return;
        }
        if let Some(bar) = self.current.take() {
            let icon = if success { "✅" } else { "❌" };
            bar.finish_with_message(format!("{} {} ({})", icon, name, outcome));
        }
    }

    /// Advance the iteration bar by one pass.
    pub fn tick(&self) {
        if self.enabled {
            self.overall.inc(1);
        }
    }

    pub fn set_message(&self, msg: &str) {
        if self.enabled {
            self.overall.set_message(msg.to_string());
        }
    }

    pub fn finish(&self, success: bool) {
        if !self.enabled {
            return;
        }
        let msg = if success {
            "✅ run succeeded"
        } else {
            "❌ run did not succeed"
        };
        self.overall.finish_with_message(msg.to_string());
    }
}

impl Drop for ProgressMonitor {
    fn drop(&mut self) {
        if let Some(bar) = self.current.take() {
            bar.finish_and_clear();
        }
    }
}
