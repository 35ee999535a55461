// * Page scanner: one pass over all currently rendered cards.
// * Cards are visited strictly in document order; the site lists orders
// * reverse-chronologically, so the first past-year card ends the pass.

use chrono::NaiveDate;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::{debug, warn};
use xxhash_rust::xxh64::xxh64;

use crate::config::selectors;
use crate::extract::card::{card_date_text, extract_card, CardOutcome};
use crate::model::Order;

static SEL_BLOC: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(selectors::ORDER_BLOC).unwrap());
static SEL_CARD: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(selectors::ORDER_CARD).unwrap());

/// Stable key for one rendered card: document position plus the raw date
/// text. Load-more only appends cards, so the position of an existing
/// card never changes between snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CardIdentity(u64);

impl CardIdentity {
    pub fn new(position: usize, date_text: &str) -> Self {
        let canonical = format!("{position}:{date_text}");
        Self(xxh64(canonical.as_bytes(), 0))
    }
}

/// Set of cards already consumed, owned by the convergence loop.
/// Replaces the original's DOM-attribute marker so the rendering layer
/// stays untouched.
#[derive(Debug, Default)]
pub struct ProcessedSet(HashSet<CardIdentity>);

impl ProcessedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: CardIdentity) -> bool {
        self.0.contains(&id)
    }

    pub fn mark(&mut self, id: CardIdentity) {
        self.0.insert(id);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Result of one scan over a page snapshot. Discarded after the
/// convergence loop folds it into its accumulator.
#[derive(Debug, Default)]
pub struct ScanResult {
    pub orders: Vec<Order>,
    pub boundary_reached: bool,
    pub last_seen_date: Option<String>,
}

/// Scans every rendered card of one HTML snapshot.
///
/// Marking policy, applied exactly once per inspected card:
/// - emitted orders and failed transactions are marked
/// - a card whose date text matches no strategy is marked, so a
///   permanently malformed card is never reprocessed
/// - a card with no date element at all stays unmarked (retryable if the
///   DOM changes), as do future/past year markers
pub fn scan_snapshot(
    html: &str,
    boundary_year: i32,
    today: NaiveDate,
    processed: &mut ProcessedSet,
) -> ScanResult {
    let doc = Html::parse_document(html);
    let mut result = ScanResult::default();
    let mut position = 0usize;

    'blocs: for bloc in doc.select(&SEL_BLOC) {
        for card in bloc.select(&SEL_CARD) {
            let current = position;
            position += 1;

            let date_text = match card_date_text(card) {
                Ok(text) => text,
                Err(err) => {
                    // * Card-level failures never abort the pass
                    warn!(position = current, error = %err, "Skipping card");
                    continue;
                }
            };

            let id = CardIdentity::new(current, &date_text);
            if processed.contains(id) {
                continue;
            }

            match extract_card(card, &date_text, boundary_year, today) {
                CardOutcome::Order(order) => {
                    result.last_seen_date = Some(order.full_date.clone());
                    result.orders.push(*order);
                    processed.mark(id);
                }
                CardOutcome::FailedStatus { .. } => {
                    processed.mark(id);
                }
                CardOutcome::FutureYear { full_date } => {
                    result.last_seen_date = Some(full_date);
                }
                CardOutcome::PastYear { full_date } => {
                    result.last_seen_date = Some(full_date);
                    result.boundary_reached = true;
                    break 'blocs;
                }
                CardOutcome::Skip(reason) => {
                    debug!(position = current, ?reason, "Card skipped");
                    processed.mark(id);
                }
            }
        }
    }

    debug!(
        cards_seen = position,
        orders = result.orders.len(),
        boundary = result.boundary_reached,
        "Snapshot scan complete"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn card(date: &str) -> String {
        format!(
            r#"<div class="c-order-card c-order-card--success">
                 <span class="c-order-card__date">{date}</span>
                 <div class="c-cart-detail-products">
                   <div class="c-cart-detail-product">
                     <div class="c-cart-detail-product__title">Plat</div>
                     <div class="c-price">€9,00</div>
                   </div>
                 </div>
               </div>"#
        )
    }

    fn page(cards: &[String]) -> String {
        format!(
            r#"<div class="c-paginated-list__bloc">{}</div>"#,
            cards.join("\n")
        )
    }

    #[test]
    fn test_orders_in_encounter_order() {
        let html = page(&[
            card("Mardi, 12/03/2024 à 12h30"),
            card("Lundi, 11/03/2024 à 12h00"),
        ]);
        let mut processed = ProcessedSet::new();
        let result = scan_snapshot(&html, 2024, today(), &mut processed);

        assert_eq!(result.orders.len(), 2);
        assert_eq!(result.orders[0].full_date, "2024-03-12 12:30");
        assert_eq!(result.orders[1].full_date, "2024-03-11 12:00");
        assert_eq!(result.last_seen_date.as_deref(), Some("2024-03-11 12:00"));
        assert!(!result.boundary_reached);
        assert_eq!(processed.len(), 2);
    }

    #[test]
    fn test_past_year_short_circuits_pass() {
        let html = page(&[
            card("Mardi, 12/03/2024 à 12h30"),
            card("Vendredi, 22/12/2023 à 12h00"),
            card("Lundi, 11/03/2024 à 12h00"),
        ]);
        let mut processed = ProcessedSet::new();
        let result = scan_snapshot(&html, 2024, today(), &mut processed);

        // * The 2023 card stops the pass; the trailing 2024 card is never
        // * inspected this pass
        assert_eq!(result.orders.len(), 1);
        assert!(result.boundary_reached);
        assert_eq!(result.last_seen_date.as_deref(), Some("2023-12-22 12:00"));
    }

    #[test]
    fn test_future_year_excluded_but_scanning_continues() {
        let html = page(&[
            card("Mercredi, 01/01/2025 à 12h30"),
            card("Mardi, 12/03/2024 à 12h30"),
        ]);
        let mut processed = ProcessedSet::new();
        let result = scan_snapshot(&html, 2024, today(), &mut processed);

        assert_eq!(result.orders.len(), 1);
        assert_eq!(result.orders[0].year, 2024);
        assert!(!result.boundary_reached);
    }

    #[test]
    fn test_rescan_is_idempotent() {
        let html = page(&[card("Mardi, 12/03/2024 à 12h30")]);
        let mut processed = ProcessedSet::new();

        let first = scan_snapshot(&html, 2024, today(), &mut processed);
        assert_eq!(first.orders.len(), 1);

        let second = scan_snapshot(&html, 2024, today(), &mut processed);
        assert!(second.orders.is_empty());
        assert_eq!(second.last_seen_date, None);
        assert_eq!(processed.len(), 1);
    }

    #[test]
    fn test_malformed_date_marked_missing_date_not() {
        let html = page(&[
            card("du texte sans date"),
            r#"<div class="c-order-card c-order-card--success"></div>"#.to_string(),
        ]);
        let mut processed = ProcessedSet::new();
        let result = scan_snapshot(&html, 2024, today(), &mut processed);

        assert!(result.orders.is_empty());
        // * Only the unparsable-date card is marked; the dateless card
        // * stays retryable
        assert_eq!(processed.len(), 1);
    }
}
