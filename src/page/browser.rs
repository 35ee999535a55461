// * Headless browser driver for the live order-history page.
// * Uses ChromiumOxide because the page builds its card list with
// * client-side rendering; a plain HTTP fetch never sees the cards.

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::constants::PAGE_TIMEOUT_MS;
use crate::model::Language;
use crate::page::{OrderPage, PageError};

// * Clicks the load-more control if present; resolves to whether it existed
const CLICK_LOAD_MORE_JS: &str = r#"
(() => {
    const button = document.querySelector('.c-paginated-list__more-wrap .c-show-more');
    if (button) {
        button.click();
        return true;
    }
    return false;
})()
"#;

// * Reads the footer language selector, empty string when absent
const READ_LANGUAGE_JS: &str = r#"
(() => {
    const dropdown = document.querySelector('.select select');
    return dropdown ? dropdown.value : '';
})()
"#;

/// A live page handle backed by a headless Chromium instance.
pub struct BrowserPage {
    browser: Browser,
    page: Page,
    handler: tokio::task::JoinHandle<()>,
}

impl BrowserPage {
    /// Launches a browser and navigates to the given order-history URL.
    pub async fn open(url: &str) -> Result<Self, PageError> {
        let config = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .build()
            .map_err(|e| PageError::BrowserLaunch(e.to_string()))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| PageError::BrowserLaunch(e.to_string()))?;

        // * Drive browser events in the background
        let handle = tokio::spawn(async move {
            while let Some(_event) = handler.next().await {}
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| PageError::Navigation(e.to_string()))?;

        let timeout = Duration::from_millis(PAGE_TIMEOUT_MS);
        match tokio::time::timeout(timeout, page.goto(url)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(PageError::Navigation(e.to_string())),
            Err(_) => return Err(PageError::Timeout(PAGE_TIMEOUT_MS)),
        }

        info!(url, "Order-history page opened");
        Ok(Self {
            browser,
            page,
            handler: handle,
        })
    }

    /// Closes the browser gracefully.
    pub async fn shutdown(mut self) {
        // * Page::close consumes the handle; Page is a cheap Arc wrapper,
        // * so close a clone instead of moving the field out
        let _ = self.page.clone().close().await;
        let _ = self.browser.close().await;
        self.handler.abort();
        info!("Browser page shut down");
    }
}

impl OrderPage for BrowserPage {
    async fn snapshot_html(&mut self) -> Result<String, PageError> {
        self.page
            .content()
            .await
            .map_err(|e| PageError::Snapshot(e.to_string()))
    }

    async fn click_load_more(&mut self) -> Result<bool, PageError> {
        let value = self
            .page
            .evaluate(CLICK_LOAD_MORE_JS)
            .await
            .map_err(|e| PageError::Evaluation(e.to_string()))?;

        let clicked = value.into_value::<bool>().unwrap_or(false);
        debug!(clicked, "Load-more control invoked");
        Ok(clicked)
    }

    async fn page_language(&mut self) -> Result<Language, PageError> {
        let value = self
            .page
            .evaluate(READ_LANGUAGE_JS)
            .await
            .map_err(|e| PageError::Evaluation(e.to_string()))?;

        let raw = value.into_value::<String>().unwrap_or_default();
        Ok(Language::from_page_value(&raw))
    }

    async fn current_url(&mut self) -> Result<String, PageError> {
        self.page
            .url()
            .await
            .map_err(|e| PageError::Navigation(e.to_string()))
            .map(|url| url.unwrap_or_default())
    }
}

impl Drop for BrowserPage {
    fn drop(&mut self) {
        // * Best effort cleanup - can't await in drop
        self.handler.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::selectors;

    #[test]
    fn test_click_script_targets_load_more_selector() {
        assert!(CLICK_LOAD_MORE_JS.contains(selectors::LOAD_MORE.split_whitespace().next().unwrap()));
    }

    #[test]
    fn test_language_script_targets_selector() {
        assert!(READ_LANGUAGE_JS.contains(selectors::LANGUAGE_SELECT));
    }
}
