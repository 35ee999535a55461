// * Record extraction for one rendered order card.
// * Turns the card's date, line items, totals and promo code into one
// * `Order`, or into a year marker that steers the page scan.

use chrono::NaiveDate;
use regex::Regex;
use scraper::{ElementRef, Selector};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::selectors;
use crate::extract::date::resolve_date;
use crate::extract::labels::{classify_totals_row, TotalsField};
use crate::extract::price::parse_price;
use crate::model::{Order, OrderStatus, Product};

// * Precompiled sub-element selectors
static SEL_DATE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(selectors::ORDER_DATE).unwrap());
static SEL_POSITION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(selectors::ORDER_POSITION).unwrap());
static SEL_PRODUCT_SECTIONS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(selectors::PRODUCT_SECTIONS).unwrap());
static SEL_PRODUCT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(selectors::PRODUCT).unwrap());
static SEL_PRODUCT_TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(selectors::PRODUCT_TITLE).unwrap());
static SEL_PRODUCT_PRICE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(selectors::PRODUCT_PRICE).unwrap());
static SEL_TOTALS_SECTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(selectors::TOTALS_SECTION).unwrap());
static SEL_TOTAL_ITEM: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(selectors::TOTAL_ITEM).unwrap());
static SEL_TOTAL_LABEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(selectors::TOTAL_LABEL).unwrap());
static SEL_TOTAL_PRICE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(selectors::TOTAL_PRICE).unwrap());
static SEL_PROMO_TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(selectors::PROMO_TITLE).unwrap());

// * Trailing number of the positional label ("Commande du jour n°3")
static POSITION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)$").unwrap());

#[derive(Debug, Error)]
pub enum CardError {
    #[error("Card has no date element")]
    MissingDate,
}

/// Why a card produced nothing this pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No date text could be resolved; the card is marked processed so a
    /// permanently malformed card is never re-inspected.
    UnparsableDate,
}

/// Outcome of inspecting one card against the boundary year.
#[derive(Debug)]
pub enum CardOutcome {
    Skip(SkipReason),
    /// Resolved year is after the boundary year: keep scanning, add nothing.
    FutureYear { full_date: String },
    /// Resolved year is before the boundary year: everything after this
    /// card is older still, the whole scan stops here.
    PastYear { full_date: String },
    /// Parsed but the transaction failed; excluded from results.
    FailedStatus { full_date: String },
    Order(Box<Order>),
}

/// Extracts one card. The caller has already filtered out cards marked
/// processed; marking decisions are derived from the returned outcome.
pub fn extract_card(
    card: ElementRef<'_>,
    date_text: &str,
    boundary_year: i32,
    today: NaiveDate,
) -> CardOutcome {
    let Some(resolved) = resolve_date(date_text, today) else {
        warn!(date_text, "Unable to resolve card date");
        return CardOutcome::Skip(SkipReason::UnparsableDate);
    };

    if resolved.year > boundary_year {
        return CardOutcome::FutureYear {
            full_date: resolved.full_date,
        };
    }
    if resolved.year < boundary_year {
        return CardOutcome::PastYear {
            full_date: resolved.full_date,
        };
    }

    let is_success = has_class(card, selectors::ORDER_CARD_SUCCESS_CLASS);
    let order_position = parse_position(card);
    let products = parse_products(card);
    let totals = parse_totals(card);
    let promo_code = parse_promo_code(card);

    // * Fallback when the page shows no total row: discounts are already
    // * signed negative, so the sum is floored at zero
    let total_due = totals.total_due.unwrap_or_else(|| {
        let product_total: f64 = products.iter().map(|p| p.price).sum();
        let discount_total: f64 = totals.discounts.iter().sum();
        (product_total + discount_total).max(0.0)
    });

    let order = Order {
        day: resolved.day,
        month: resolved.month,
        year: resolved.year,
        hour: resolved.hour_label(),
        full_date: resolved.full_date.clone(),
        order_position,
        promo_code,
        products,
        total_due,
        delivery: totals.delivery,
        discounts: totals.discounts,
        points_fidelity: totals.points_fidelity,
        status: if is_success {
            OrderStatus::Success
        } else {
            OrderStatus::Failed
        },
    };

    if !is_success {
        debug!(full_date = %resolved.full_date, "Failed transaction, excluded from results");
        return CardOutcome::FailedStatus {
            full_date: resolved.full_date,
        };
    }

    CardOutcome::Order(Box::new(order))
}

/// Reads the raw date text of a card, if a date element exists at all.
pub fn card_date_text(card: ElementRef<'_>) -> Result<String, CardError> {
    let date_el = card.select(&SEL_DATE).next().ok_or(CardError::MissingDate)?;
    Ok(element_text(date_el))
}

// * Collected totals-block fields for one card
#[derive(Debug, Default)]
struct CardTotals {
    delivery: Option<String>,
    points_fidelity: Option<String>,
    total_due: Option<f64>,
    discounts: Vec<f64>,
}

fn parse_totals(card: ElementRef<'_>) -> CardTotals {
    let mut totals = CardTotals::default();

    for section in card.select(&SEL_TOTALS_SECTION) {
        for item in section.select(&SEL_TOTAL_ITEM) {
            let label = item.select(&SEL_TOTAL_LABEL).next().map(element_text);
            let Some(price_el) = item.select(&SEL_TOTAL_PRICE).next() else {
                continue;
            };
            let price_text = element_text(price_el);
            if price_text.is_empty() {
                continue;
            }
            let price = parse_price(&price_text);

            match classify_totals_row(label.as_deref(), price) {
                Some(TotalsField::Delivery) => totals.delivery = Some(price_text),
                Some(TotalsField::LoyaltyPoints) => totals.points_fidelity = Some(price_text),
                Some(TotalsField::TotalDue) => totals.total_due = Some(price),
                Some(TotalsField::Discount) => totals.discounts.push(price),
                None => {}
            }
        }
    }

    totals
}

fn parse_products(card: ElementRef<'_>) -> Vec<Product> {
    let mut products = Vec::new();
    for section in card.select(&SEL_PRODUCT_SECTIONS) {
        for product_el in section.select(&SEL_PRODUCT) {
            let title = product_el
                .select(&SEL_PRODUCT_TITLE)
                .next()
                .map(element_text)
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Unknown Product".to_string());
            let price_text = product_el
                .select(&SEL_PRODUCT_PRICE)
                .next()
                .map(element_text)
                .unwrap_or_else(|| "€0.00".to_string());
            products.push(Product {
                title,
                price: parse_price(&price_text),
            });
        }
    }
    products
}

fn parse_position(card: ElementRef<'_>) -> Option<u32> {
    let section = card.select(&SEL_POSITION).next()?;
    let text = element_text(section);
    let caps = POSITION_RE.captures(&text)?;
    caps[1].parse().ok()
}

// * The promo code lives in a section title whose enclosing totals row
// * carries a "code"/"promo" label; anything else is a regular section
// * title and is ignored.
fn parse_promo_code(card: ElementRef<'_>) -> Option<String> {
    let title = card.select(&SEL_PROMO_TITLE).next()?;

    let mut node = title.parent();
    while let Some(current) = node {
        if let Some(el) = ElementRef::wrap(current) {
            if has_class(el, selectors::TOTAL_ITEM_CLASS) {
                let label = el.select(&SEL_TOTAL_LABEL).next()?;
                let label_text = element_text(label).to_lowercase();
                if label_text.contains("code") || label_text.contains("promo") {
                    let code = element_text(title);
                    return (!code.is_empty()).then_some(code);
                }
                return None;
            }
        }
        node = current.parent();
    }
    None
}

fn has_class(el: ElementRef<'_>, class: &str) -> bool {
    el.value().classes().any(|c| c == class)
}

// * Concatenated text content, trimmed, inner whitespace collapsed.
pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" ")
}
