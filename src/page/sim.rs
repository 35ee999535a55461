// * Deterministic in-memory page for tests.
// * Plays back a fixed sequence of HTML snapshots; each load-more click
// * advances to the next snapshot. A "sticky" control keeps answering
// * clicks after the last snapshot, which is how a stalled live page
// * behaves and what the stagnation heuristic exists for.

use crate::model::Language;
use crate::page::{OrderPage, PageError};

/// Scripted order-history page.
#[derive(Debug)]
pub struct SimulatedPage {
    snapshots: Vec<String>,
    cursor: usize,
    sticky_load_more: bool,
    snapshot_failure_after: Option<u32>,
    click_failure: bool,
    language: Language,
    url: String,
    pub clicks: u32,
    pub scans: u32,
}

impl SimulatedPage {
    pub fn new(snapshots: Vec<String>) -> Self {
        Self {
            snapshots,
            cursor: 0,
            sticky_load_more: false,
            snapshot_failure_after: None,
            click_failure: false,
            language: Language::Fr,
            url: "https://www.refectory.fr/mon-compte/mes-commandes".to_string(),
            clicks: 0,
            scans: 0,
        }
    }

    /// Keeps the load-more control present even once all snapshots are
    /// exhausted, so clicks keep "succeeding" without changing the page.
    pub fn with_sticky_load_more(mut self) -> Self {
        self.sticky_load_more = true;
        self
    }

    /// Makes every snapshot after the first `successes` fail, as a live
    /// page does when the tab dies mid-run.
    pub fn with_snapshot_failure_after(mut self, successes: u32) -> Self {
        self.snapshot_failure_after = Some(successes);
        self
    }

    /// Makes every load-more click fail.
    pub fn with_click_failure(mut self) -> Self {
        self.click_failure = true;
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = url.to_string();
        self
    }
}

impl OrderPage for SimulatedPage {
    async fn snapshot_html(&mut self) -> Result<String, PageError> {
        if self
            .snapshot_failure_after
            .is_some_and(|successes| self.scans >= successes)
        {
            return Err(PageError::Snapshot("page stopped answering".to_string()));
        }
        self.scans += 1;
        Ok(self
            .snapshots
            .get(self.cursor)
            .cloned()
            .unwrap_or_default())
    }

    async fn click_load_more(&mut self) -> Result<bool, PageError> {
        if self.click_failure {
            return Err(PageError::Evaluation("click target detached".to_string()));
        }
        if self.cursor + 1 < self.snapshots.len() {
            self.cursor += 1;
            self.clicks += 1;
            Ok(true)
        } else if self.sticky_load_more {
            self.clicks += 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn page_language(&mut self) -> Result<Language, PageError> {
        Ok(self.language)
    }

    async fn current_url(&mut self) -> Result<String, PageError> {
        Ok(self.url.clone())
    }
}
