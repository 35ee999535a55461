use order_rewind::host::{ExtractionService, FetchOutcome};
use order_rewind::page::browser::BrowserPage;
use order_rewind::session::SessionConfig;
use order_rewind::stats;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("order_rewind=debug,info")
        .with_target(false)
        .json()
        .init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| order_rewind::config::constants::ALLOWED_URL_PREFIXES[0].to_string());

    let mut page = match BrowserPage::open(&url).await {
        Ok(page) => page,
        Err(err) => {
            tracing::error!(error = %err, "Could not open the order-history page");
            std::process::exit(1);
        }
    };

    let service = ExtractionService::new(SessionConfig::default());
    let outcome = service.run_extraction(&mut page).await;
    page.shutdown().await;

    match outcome {
        FetchOutcome::Ok {
            orders, language, ..
        } => {
            let year_stats = stats::aggregate(&orders, language);
            match serde_json::to_string_pretty(&year_stats) {
                Ok(json) => println!("{json}"),
                Err(err) => tracing::error!(error = %err, "Could not serialize statistics"),
            }
        }
        FetchOutcome::Empty { terminal } => {
            tracing::warn!(?terminal, "No orders found for the boundary year");
        }
        FetchOutcome::NotAuthorized => {
            tracing::error!(url, "Page is not a known order-history URL");
            std::process::exit(2);
        }
        FetchOutcome::AlreadyRunning => {
            tracing::error!("An extraction is already running");
            std::process::exit(3);
        }
    }
}
