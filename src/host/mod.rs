// * Host boundary: the request/response surface the embedding shell
// * talks to. Replaces the original convention of answering an empty
// * array for every failure cause with explicit result variants, and
// * guards against concurrent starts with an atomic check-and-set.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use url::Url;

use crate::config::constants::ALLOWED_URL_PREFIXES;
use crate::model::{Language, Order};
use crate::page::OrderPage;
use crate::session::{CancelFlag, ExtractionSession, SessionConfig, SessionEvent, TerminalState};

/// Result of a "begin extraction" request.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Extraction ran and found at least one order.
    Ok {
        orders: Vec<Order>,
        language: Language,
        terminal: TerminalState,
    },
    /// Extraction ran to a terminal state but collected nothing.
    Empty { terminal: TerminalState },
    /// The page is not one of the two known order-history URLs.
    NotAuthorized,
    /// Another extraction is already in flight for this service.
    AlreadyRunning,
}

/// Point-in-time answer to the host's status query. `is_authorized` is
/// computed from the page URL alone, independent of extraction state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceStatus {
    pub is_fetching: bool,
    pub fetched_orders: usize,
    pub is_authorized: bool,
}

#[derive(Debug, Default)]
struct SharedState {
    fetched_orders: usize,
}

/// Single-flight extraction service for one page.
pub struct ExtractionService {
    config: SessionConfig,
    cancel: CancelFlag,
    running: Arc<AtomicBool>,
    state: Arc<RwLock<SharedState>>,
}

impl ExtractionService {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            cancel: CancelFlag::new(),
            running: Arc::new(AtomicBool::new(false)),
            state: Arc::new(RwLock::new(SharedState::default())),
        }
    }

    /// Handle for cancelling an in-flight run from another task.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Runs one extraction against the given page, blocking until the
    /// session reaches a terminal state.
    pub async fn run_extraction<P: OrderPage>(&self, page: &mut P) -> FetchOutcome {
        let current_url = match page.current_url().await {
            Ok(url) => url,
            Err(err) => {
                warn!(error = %err, "Could not read page URL");
                return FetchOutcome::NotAuthorized;
            }
        };
        if !is_authorized_url(&current_url) {
            info!(url = %current_url, "Page not authorized for extraction");
            return FetchOutcome::NotAuthorized;
        }

        // * Single loop instance per service: reject, don't queue
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return FetchOutcome::AlreadyRunning;
        }

        // * A leftover cancellation from an earlier run must not carry
        // * over; the flag belongs to the run now being admitted
        self.cancel.clear();
        self.state.write().await.fetched_orders = 0;

        // * Mirror progress events into the queryable counter
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        let state = Arc::clone(&self.state);
        let mirror = tokio::spawn(async move {
            while let Some(event) = events_rx.recv().await {
                if let SessionEvent::Progress { count } = event {
                    state.write().await.fetched_orders = count;
                }
            }
        });

        let report = ExtractionSession::new(self.config.clone())
            .with_cancel(self.cancel.clone())
            .with_events(events_tx)
            .run(page)
            .await;

        let _ = mirror.await;
        self.state.write().await.fetched_orders = report.orders.len();
        self.running.store(false, Ordering::SeqCst);

        info!(
            orders = report.orders.len(),
            terminal = ?report.terminal,
            language = report.language.as_str(),
            "Extraction complete"
        );

        if report.orders.is_empty() {
            FetchOutcome::Empty {
                terminal: report.terminal,
            }
        } else {
            FetchOutcome::Ok {
                orders: report.orders,
                language: report.language,
                terminal: report.terminal,
            }
        }
    }

    /// Answers "are you running, and how many orders so far" for the
    /// given page URL.
    pub async fn status(&self, current_url: Option<&str>) -> ServiceStatus {
        ServiceStatus {
            is_fetching: self.running.load(Ordering::SeqCst),
            fetched_orders: self.state.read().await.fetched_orders,
            is_authorized: current_url.is_some_and(is_authorized_url),
        }
    }
}

/// A page is authorized when its URL starts with one of the two known
/// order-history prefixes (one per locale). The URL must parse at all;
/// prefix matching happens on the normalized form.
pub fn is_authorized_url(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let normalized = parsed.as_str();
    ALLOWED_URL_PREFIXES
        .iter()
        .any(|prefix| normalized.starts_with(prefix))
}
