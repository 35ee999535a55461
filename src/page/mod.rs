// * External page boundary.
// * The extraction core depends on exactly four page capabilities:
// * snapshotting the rendered markup, invoking the load-more control,
// * reading the selected language, and reporting the current URL.

pub mod browser;
pub mod sim;

use thiserror::Error;

use crate::model::Language;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("Browser launch failed: {0}")]
    BrowserLaunch(String),

    #[error("Page navigation failed: {0}")]
    Navigation(String),

    #[error("Page timeout after {0}ms")]
    Timeout(u64),

    #[error("Script evaluation failed: {0}")]
    Evaluation(String),

    #[error("Content snapshot failed: {0}")]
    Snapshot(String),
}

/// A live order-history page as seen by the convergence loop.
/// The loop is generic over this trait; tests drive it with the
/// deterministic simulator in `sim`.
#[allow(async_fn_in_trait)]
pub trait OrderPage {
    /// Full rendered markup of the page at this instant.
    async fn snapshot_html(&mut self) -> Result<String, PageError>;

    /// Invokes the "load more" control. Returns false when the control is
    /// absent from the page, which the loop reads as exhaustion.
    async fn click_load_more(&mut self) -> Result<bool, PageError>;

    /// Selected language of the page, defaulting to French.
    async fn page_language(&mut self) -> Result<Language, PageError>;

    /// URL currently loaded in the page, used for authorization.
    async fn current_url(&mut self) -> Result<String, PageError>;
}
