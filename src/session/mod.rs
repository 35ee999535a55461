// * Convergence loop: drives the page scanner across successive
// * load-more interactions until one of the terminal conditions holds.
// * All loop state lives in this module's values; there are no ambient
// * globals to reconcile with a sleeping service worker.

use chrono::NaiveDate;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::config::constants::{DEFAULT_BOUNDARY_YEAR, SETTLE_DELAY_MS, STAGNATION_LIMIT};
use crate::extract::scan::{scan_snapshot, ProcessedSet};
use crate::model::{Language, Order};
use crate::page::OrderPage;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalState {
    /// A past-year card was seen; all remaining data is older.
    Boundary,
    /// The page stopped yielding new cards despite a present control.
    Stagnant,
    /// The load-more control disappeared (or the page stopped answering).
    Exhausted,
    /// The caller's cancel flag was raised.
    Cancelled,
}

/// Events pushed to the host listener while a run is in flight.
/// Delivery is best effort; a gone receiver never aborts the loop.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Progress { count: usize },
    Completed { count: usize, language: Language },
}

/// Cooperative cancellation, honored at the top of each iteration.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Re-arms the flag. A request only ever targets the run it was made
    /// against; the owner clears the flag before starting the next run.
    pub fn clear(&self) {
        self.0.store(false, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub boundary_year: i32,
    pub settle_delay: Duration,
    pub stagnation_limit: u32,
    /// Reference date for "today"-relative card dates, injected so the
    /// resolver stays a pure function of its inputs.
    pub today: NaiveDate,
}

impl SessionConfig {
    pub fn new(boundary_year: i32, today: NaiveDate) -> Self {
        Self {
            boundary_year,
            settle_delay: Duration::from_millis(SETTLE_DELAY_MS),
            stagnation_limit: STAGNATION_LIMIT,
            today,
        }
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_BOUNDARY_YEAR,
            chrono::Local::now().date_naive(),
        )
    }
}

/// Final output of one extraction run.
#[derive(Debug)]
pub struct SessionReport {
    pub orders: Vec<Order>,
    pub language: Language,
    pub terminal: TerminalState,
    pub iterations: u32,
}

/// One extraction run over one page. At most one session is intended to
/// run per page; the host boundary enforces the single-flight guard.
pub struct ExtractionSession {
    config: SessionConfig,
    cancel: CancelFlag,
    events: Option<UnboundedSender<SessionEvent>>,
    processed: ProcessedSet,
}

impl ExtractionSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            cancel: CancelFlag::new(),
            events: None,
            processed: ProcessedSet::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_events(mut self, events: UnboundedSender<SessionEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Runs the loop to a terminal state. Page-level failures end the run
    /// as `Exhausted` with whatever was collected so far; only the final
    /// report says how far it got.
    pub async fn run<P: OrderPage>(mut self, page: &mut P) -> SessionReport {
        let language = match page.page_language().await {
            Ok(language) => language,
            Err(err) => {
                warn!(error = %err, "Language read failed, defaulting to French");
                Language::Fr
            }
        };

        let mut orders: Vec<Order> = Vec::new();
        let mut last_seen_date: Option<String> = None;
        let mut stagnant_observations: u32 = 0;
        let mut iterations: u32 = 0;

        let terminal = loop {
            if self.cancel.is_cancelled() {
                info!("Cancellation requested, stopping extraction");
                break TerminalState::Cancelled;
            }

            let html = match page.snapshot_html().await {
                Ok(html) => html,
                Err(err) => {
                    warn!(error = %err, "Snapshot failed, keeping partial results");
                    break TerminalState::Exhausted;
                }
            };

            iterations += 1;
            let scan = scan_snapshot(
                &html,
                self.config.boundary_year,
                self.config.today,
                &mut self.processed,
            );

            if scan.boundary_reached {
                // * The scan already excluded the past-year card and
                // * everything after it; keep what it did collect
                orders.extend(scan.orders);
                info!(total = orders.len(), "Past-year order reached, stopping");
                break TerminalState::Boundary;
            }

            if scan.last_seen_date == last_seen_date {
                stagnant_observations += 1;
                debug!(
                    observations = stagnant_observations,
                    "Last seen date unchanged"
                );
                if stagnant_observations >= self.config.stagnation_limit {
                    info!(
                        total = orders.len(),
                        "Page stagnant, treating as exhausted"
                    );
                    break TerminalState::Stagnant;
                }
            } else {
                stagnant_observations = 0;
                last_seen_date = scan.last_seen_date;
                orders.extend(scan.orders);
                self.notify(SessionEvent::Progress {
                    count: orders.len(),
                });
            }

            match page.click_load_more().await {
                Ok(true) => {}
                Ok(false) => {
                    info!(total = orders.len(), "No load-more control, page exhausted");
                    break TerminalState::Exhausted;
                }
                Err(err) => {
                    warn!(error = %err, "Load-more failed, keeping partial results");
                    break TerminalState::Exhausted;
                }
            }

            // * Let the newly requested cards render before re-scanning
            tokio::time::sleep(self.config.settle_delay).await;
        };

        self.notify(SessionEvent::Completed {
            count: orders.len(),
            language,
        });

        SessionReport {
            orders,
            language,
            terminal,
            iterations,
        }
    }

    fn notify(&self, event: SessionEvent) {
        if let Some(sender) = &self.events {
            if sender.send(event).is_err() {
                // * Receiving end gone; the run itself carries on
                warn!("Session listener dropped, event discarded");
            }
        }
    }
}
