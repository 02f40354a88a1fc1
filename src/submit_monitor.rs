use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::events::TabId;

pub const SUBMIT_TIMEOUT: Duration = Duration::from_secs(15);
pub const RESULT_DEBOUNCE: Duration = Duration::from_millis(1000);

const SUBMIT_LABEL: &str = "Submit";
const SUBMIT_LOCATOR: &str = "console-submit-button";
const ACCEPTED_KEYWORD: &str = "Accepted";
const FAILURE_KEYWORDS: [&str; 2] = ["Wrong Answer", "Error"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Failed,
}

pub fn is_submit_button(text: &str, locator: Option<&str>) -> bool {
    text.contains(SUBMIT_LABEL) || locator == Some(SUBMIT_LOCATOR)
}

pub fn verdict_for(text: &str) -> Option<Verdict> {
    if text.contains(ACCEPTED_KEYWORD) {
        Some(Verdict::Accepted)
    } else if FAILURE_KEYWORDS.iter().any(|keyword| text.contains(keyword)) {
        Some(Verdict::Failed)
    } else {
        None
    }
}

/// Watches the result banner of one tab after the Submit button was pressed.
///
/// Clicking Submit arms the monitor for `submit_timeout`. While armed, every
/// page mutation restarts the debounce window, and the banner text is only
/// inspected once the page has been quiet for `debounce`.
#[derive(Debug)]
pub struct SubmitMonitor {
    submit_timeout: Duration,
    debounce: Duration,
    armed_until: Option<Instant>,
    pending: Option<(Instant, String)>,
}

impl SubmitMonitor {
    pub fn new(submit_timeout: Duration, debounce: Duration) -> Self {
        SubmitMonitor {
            submit_timeout,
            debounce,
            armed_until: None,
            pending: None,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed_until.is_some()
    }

    pub fn submit_clicked(&mut self, now: Instant) {
        self.armed_until = Some(now + self.submit_timeout);
    }

    pub fn on_mutation(&mut self, now: Instant, text: &str) {
        if !self.is_armed() {
            return;
        }
        self.pending = Some((now, text.to_string()));
    }

    pub fn poll(&mut self, now: Instant) -> Option<Verdict> {
        let armed_until = self.armed_until?;

        let quiet = match &self.pending {
            Some((last_mutation, _)) => now.duration_since(*last_mutation) >= self.debounce,
            None => false,
        };
        if quiet {
            if let Some((_, text)) = self.pending.take() {
                if let Some(verdict) = verdict_for(&text) {
                    self.disarm();
                    return Some(verdict);
                }
            }
        }

        if now >= armed_until {
            self.disarm();
        }
        None
    }

    fn disarm(&mut self) {
        self.armed_until = None;
        self.pending = None;
    }
}

/// One monitor per tab.
#[derive(Debug)]
pub struct SubmitMonitors {
    submit_timeout: Duration,
    debounce: Duration,
    monitors: HashMap<TabId, SubmitMonitor>,
}

impl SubmitMonitors {
    pub fn new(submit_timeout: Duration, debounce: Duration) -> Self {
        SubmitMonitors {
            submit_timeout,
            debounce,
            monitors: HashMap::new(),
        }
    }

    pub fn submit_clicked(&mut self, tab_id: TabId, now: Instant) {
        let (submit_timeout, debounce) = (self.submit_timeout, self.debounce);
        self.monitors
            .entry(tab_id)
            .or_insert_with(|| SubmitMonitor::new(submit_timeout, debounce))
            .submit_clicked(now);
    }

    pub fn on_mutation(&mut self, tab_id: TabId, now: Instant, text: &str) {
        if let Some(monitor) = self.monitors.get_mut(&tab_id) {
            monitor.on_mutation(now, text);
        }
    }

    /// Collect verdicts that became ready and forget monitors that disarmed.
    pub fn poll(&mut self, now: Instant) -> Vec<(TabId, Verdict)> {
        let mut verdicts = Vec::new();
        for (tab_id, monitor) in self.monitors.iter_mut() {
            if let Some(verdict) = monitor.poll(now) {
                verdicts.push((*tab_id, verdict));
            }
        }
        self.monitors.retain(|_, monitor| monitor.is_armed());
        verdicts
    }
}
