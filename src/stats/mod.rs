// * Year statistics: a pure fold over the final order list.
// * Deterministic for a given order list and language; the language only
// * affects month-name localization. Never mutates its input.

use regex::Regex;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use crate::model::{Language, Order};

// * Leading "+N pts" of the loyalty label
static POINTS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\+(\d+)\s*pts").unwrap());

const MONTHS_FR: [&str; 12] = [
    "Janvier",
    "Février",
    "Mars",
    "Avril",
    "Mai",
    "Juin",
    "Juillet",
    "Août",
    "Septembre",
    "Octobre",
    "Novembre",
    "Décembre",
];

const MONTHS_EN: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// A dish and how many times it was ordered.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DishCount {
    pub title: String,
    pub count: u32,
}

/// Aggregate statistics for one year of orders. Computed once per
/// slideshow session, read-only afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct YearStats {
    pub total_orders: usize,
    pub total_spent: f64,
    pub average_spent: f64,
    pub total_unique_dishes: usize,
    /// Top 3 main dishes; the first product of each order is the main
    /// dish by site convention.
    pub top_dishes: Vec<DishCount>,
    /// Orders that had anything beyond the main dish.
    pub desserts_orders_count: usize,
    pub favorite_dessert: DishCount,
    /// Loyalty points summed from the "+N pts" labels.
    pub fidelities: u32,
    /// Absolute value of all discounts combined.
    pub discount_saved: f64,
    pub top_month: String,
    pub top_month_count: u32,
    pub average_order_position: f64,
    pub language: Language,
}

/// Folds the final order list into `YearStats`.
pub fn aggregate(orders: &[Order], language: Language) -> YearStats {
    let total_orders = orders.len();
    let total_spent: f64 = orders.iter().map(|o| o.total_due).sum();
    let average_spent = if total_orders > 0 {
        total_spent / total_orders as f64
    } else {
        0.0
    };

    let mut unique_dishes: HashSet<&str> = HashSet::new();
    for order in orders {
        for product in &order.products {
            unique_dishes.insert(product.title.as_str());
        }
    }

    let mut dish_counts: HashMap<&str, u32> = HashMap::new();
    for order in orders {
        if let Some(main) = order.products.first() {
            *dish_counts.entry(main.title.as_str()).or_default() += 1;
        }
    }
    let top_dishes = top_n(&dish_counts, 3);

    let mut dessert_counts: HashMap<&str, u32> = HashMap::new();
    let mut desserts_orders_count = 0;
    for order in orders {
        if order.products.len() > 1 {
            desserts_orders_count += 1;
            for product in &order.products[1..] {
                *dessert_counts.entry(product.title.as_str()).or_default() += 1;
            }
        }
    }
    let favorite_dessert = top_n(&dessert_counts, 1)
        .into_iter()
        .next()
        .unwrap_or(DishCount {
            title: "Aucun".to_string(),
            count: 0,
        });

    let fidelities: u32 = orders
        .iter()
        .filter_map(|o| o.points_fidelity.as_deref())
        .filter_map(|label| {
            POINTS_RE
                .captures(label)
                .and_then(|caps| caps[1].parse::<u32>().ok())
        })
        .sum();

    let discount_saved: f64 = orders
        .iter()
        .flat_map(|o| o.discounts.iter())
        .sum::<f64>()
        .abs();

    let mut month_counts: HashMap<u32, u32> = HashMap::new();
    for order in orders {
        if (1..=12).contains(&order.month) {
            *month_counts.entry(order.month).or_default() += 1;
        }
    }
    // * Ties break on the earlier month for determinism
    let (top_month_index, top_month_count) = month_counts
        .iter()
        .map(|(m, c)| (*m, *c))
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
        .unwrap_or((1, 0));
    let top_month = month_name(top_month_index, language).to_string();

    // * Absent queue positions count as zero, as the original did
    let average_order_position = if total_orders > 0 {
        orders
            .iter()
            .map(|o| o.order_position.unwrap_or(0) as f64)
            .sum::<f64>()
            / total_orders as f64
    } else {
        0.0
    };

    YearStats {
        total_orders,
        total_spent,
        average_spent,
        total_unique_dishes: unique_dishes.len(),
        top_dishes,
        desserts_orders_count,
        favorite_dessert,
        fidelities,
        discount_saved,
        top_month,
        top_month_count,
        average_order_position,
        language,
    }
}

fn month_name(month: u32, language: Language) -> &'static str {
    let index = (month.clamp(1, 12) - 1) as usize;
    match language {
        Language::Fr => MONTHS_FR[index],
        Language::En => MONTHS_EN[index],
    }
}

// * Highest counts first; ties break alphabetically so output is stable
fn top_n(counts: &HashMap<&str, u32>, n: usize) -> Vec<DishCount> {
    let mut entries: Vec<(&str, u32)> = counts.iter().map(|(t, c)| (*t, *c)).collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    entries
        .into_iter()
        .take(n)
        .map(|(title, count)| DishCount {
            title: title.to_string(),
            count,
        })
        .collect()
}
