use chrono::NaiveDate;
use std::time::Duration;
use order_rewind::extract::scan::{scan_snapshot, CardIdentity, ProcessedSet};
use order_rewind::model::Language;
use order_rewind::page::sim::SimulatedPage;
use order_rewind::session::{ExtractionSession, SessionConfig, SessionEvent, TerminalState};

// * Test Suite for convergence-loop termination and idempotency

const BOUNDARY_YEAR: i32 = 2024;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

fn config() -> SessionConfig {
    SessionConfig::new(BOUNDARY_YEAR, today()).with_settle_delay(Duration::ZERO)
}

fn success_card(date: &str, body: &str) -> String {
    format!(
        r#"<div class="c-order-card c-order-card--success">
             <span class="c-order-card__date">{date}</span>
             {body}
           </div>"#
    )
}

fn simple_card(date: &str) -> String {
    success_card(
        date,
        r#"<div class="c-cart-detail-products">
             <div class="c-cart-detail-product">
               <div class="c-cart-detail-product__title">Plat du jour</div>
               <div class="c-price">€10,00</div>
             </div>
           </div>"#,
    )
}

fn page_html(cards: &[String]) -> String {
    format!(
        r#"<div class="c-paginated-list__bloc">{}</div>"#,
        cards.join("\n")
    )
}

#[tokio::test]
async fn test_fixed_page_terminates_exhausted_after_one_scan() {
    let cards: Vec<String> = (1..=4)
        .map(|day| simple_card(&format!("Lundi, {day:02}/03/2024 à 12h00")))
        .collect();
    let mut page = SimulatedPage::new(vec![page_html(&cards)]);

    let report = ExtractionSession::new(config()).run(&mut page).await;

    assert_eq!(report.terminal, TerminalState::Exhausted);
    assert_eq!(report.orders.len(), 4);
    assert_eq!(report.iterations, 1);
    assert_eq!(page.clicks, 0);
}

#[tokio::test]
async fn test_stagnation_stops_after_exactly_five_observations() {
    // * A future-year card is never marked processed, so every re-scan of
    // * the unchanged page observes the same last seen date
    let snapshot = page_html(&[simple_card("Mercredi, 01/01/2025 à 12h30")]);
    let mut page = SimulatedPage::new(vec![snapshot]).with_sticky_load_more();

    let report = ExtractionSession::new(config()).run(&mut page).await;

    assert_eq!(report.terminal, TerminalState::Stagnant);
    assert!(report.orders.is_empty());
    // * One initial observation plus exactly 5 repeats, not 4 or 6
    assert_eq!(report.iterations, 6);
    assert_eq!(page.clicks, 5);
}

#[tokio::test]
async fn test_boundary_year_halts_across_batches() {
    let first_batch = page_html(&[simple_card("Mardi, 12/03/2024 à 12h30")]);
    let second_batch = page_html(&[
        simple_card("Mardi, 12/03/2024 à 12h30"),
        simple_card("Lundi, 11/03/2024 à 12h00"),
        simple_card("Vendredi, 22/12/2023 à 12h00"),
        simple_card("Jeudi, 21/12/2023 à 12h00"),
    ]);
    let mut page = SimulatedPage::new(vec![first_batch, second_batch]);

    let report = ExtractionSession::new(config()).run(&mut page).await;

    assert_eq!(report.terminal, TerminalState::Boundary);
    // * Both 2024 orders survive; nothing from 2023 leaks through
    assert_eq!(report.orders.len(), 2);
    assert!(report.orders.iter().all(|o| o.year == 2024));
    assert_eq!(page.clicks, 1);
}

#[tokio::test]
async fn test_progress_events_carry_running_total() {
    let first_batch = page_html(&[simple_card("Mardi, 12/03/2024 à 12h30")]);
    let second_batch = page_html(&[
        simple_card("Mardi, 12/03/2024 à 12h30"),
        simple_card("Lundi, 11/03/2024 à 12h00"),
    ]);
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

    let mut page = SimulatedPage::new(vec![first_batch, second_batch]);
    let report = ExtractionSession::new(config())
        .with_events(tx)
        .run(&mut page)
        .await;
    assert_eq!(report.orders.len(), 2);

    let mut progress = Vec::new();
    let mut completed = None;
    while let Ok(event) = rx.try_recv() {
        match event {
            SessionEvent::Progress { count } => progress.push(count),
            SessionEvent::Completed { count, language } => completed = Some((count, language)),
        }
    }
    assert_eq!(progress, vec![1, 2]);
    assert_eq!(completed, Some((2, Language::Fr)));
}

#[tokio::test]
async fn test_snapshot_failure_keeps_partial_results() {
    let first_batch = page_html(&[simple_card("Mardi, 12/03/2024 à 12h30")]);
    let second_batch = page_html(&[
        simple_card("Mardi, 12/03/2024 à 12h30"),
        simple_card("Lundi, 11/03/2024 à 12h00"),
    ]);
    let mut page = SimulatedPage::new(vec![first_batch, second_batch])
        .with_snapshot_failure_after(1);

    let report = ExtractionSession::new(config()).run(&mut page).await;

    // * The dead page ends the run, but the first batch survives
    assert_eq!(report.terminal, TerminalState::Exhausted);
    assert_eq!(report.orders.len(), 1);
    assert_eq!(report.iterations, 1);
    assert_eq!(page.clicks, 1);
}

#[tokio::test]
async fn test_click_failure_keeps_partial_results() {
    let snapshot = page_html(&[
        simple_card("Mardi, 12/03/2024 à 12h30"),
        simple_card("Lundi, 11/03/2024 à 12h00"),
    ]);
    let mut page = SimulatedPage::new(vec![snapshot]).with_click_failure();

    let report = ExtractionSession::new(config()).run(&mut page).await;

    assert_eq!(report.terminal, TerminalState::Exhausted);
    assert_eq!(report.orders.len(), 2);
    assert_eq!(report.iterations, 1);
}

#[test]
fn test_end_to_end_three_card_scenario() {
    // * One current-year card with a 10.00 product and an unlabeled -2.00
    // * totals row, a duplicate of it already marked processed, and an
    // * older-year card closing the list
    let current = success_card(
        "Mardi, 12/03/2024 à 12h30",
        r#"<div class="c-cart-detail-products">
             <div class="c-cart-detail-product">
               <div class="c-cart-detail-product__title">Plat du jour</div>
               <div class="c-price">€10,00</div>
             </div>
           </div>
           <div class="c-shared-totals__section">
             <div class="c-shared-total-item">
               <div class="c-shared-total-item__price">-€2,00</div>
             </div>
           </div>"#,
    );
    let duplicate = current.clone();
    let older = simple_card("Vendredi, 22/12/2023 à 12h00");
    let html = page_html(&[current, duplicate, older]);

    let mut processed = ProcessedSet::new();
    processed.mark(CardIdentity::new(1, "Mardi, 12/03/2024 à 12h30"));

    let result = scan_snapshot(&html, BOUNDARY_YEAR, today(), &mut processed);

    assert_eq!(result.orders.len(), 1);
    let order = &result.orders[0];
    assert_eq!(order.total_due, 8.0);
    assert_eq!(order.discounts, vec![-2.0]);
    assert!(result.boundary_reached);
}

#[test]
fn test_extractor_is_idempotent_across_passes() {
    let html = page_html(&[simple_card("Mardi, 12/03/2024 à 12h30")]);
    let mut processed = ProcessedSet::new();

    let mut emitted = 0;
    for _ in 0..3 {
        emitted += scan_snapshot(&html, BOUNDARY_YEAR, today(), &mut processed)
            .orders
            .len();
    }
    assert_eq!(emitted, 1);
}
