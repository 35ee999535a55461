// * Core data model for extracted orders.
// * Wire names follow the original extension payload so downstream
// * consumers of the final JSON keep working.

use serde::{Deserialize, Serialize};

/// One line item of an order. Insertion order is preserved; downstream
/// treats the first product as the main dish and the rest as extras.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub title: String,
    pub price: f64,
}

/// Transaction status as rendered on the card.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Success,
    Failed,
}

/// One fully extracted order record. Immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub day: u32,
    pub month: u32,
    pub year: i32,
    // * Canonical `YYYY-MM-DD HH:MM`; sortable lexicographically and the
    // * single source of truth for later date math.
    #[serde(rename = "fullDate")]
    pub full_date: String,
    #[serde(rename = "orderPosition")]
    pub order_position: Option<u32>,
    pub hour: String,
    pub promo_code: Option<String>,
    pub products: Vec<Product>,
    pub total_due: f64,
    pub delivery: Option<String>,
    // * Always <= 0, signed as displayed.
    pub discounts: Vec<f64>,
    pub points_fidelity: Option<String>,
    pub status: OrderStatus,
}

/// Page locale, read from the site's footer language selector.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Fr,
    En,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Fr => "fr",
            Language::En => "en",
        }
    }

    // * The site defaults to French when the selector control is absent.
    pub fn from_page_value(value: &str) -> Self {
        match value.trim() {
            "en" => Language::En,
            _ => Language::Fr,
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::Fr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_from_page_value() {
        assert_eq!(Language::from_page_value("en"), Language::En);
        assert_eq!(Language::from_page_value("fr"), Language::Fr);
        assert_eq!(Language::from_page_value("de"), Language::Fr);
        assert_eq!(Language::from_page_value(""), Language::Fr);
    }

    #[test]
    fn test_order_wire_names() {
        let order = Order {
            day: 12,
            month: 3,
            year: 2024,
            full_date: "2024-03-12 12:30".to_string(),
            order_position: Some(3),
            hour: "12:30".to_string(),
            promo_code: None,
            products: vec![Product {
                title: "Poulet rôti".to_string(),
                price: 10.0,
            }],
            total_due: 10.0,
            delivery: None,
            discounts: vec![],
            points_fidelity: None,
            status: OrderStatus::Success,
        };

        let json = serde_json::to_string(&order).unwrap();
        assert!(json.contains("\"fullDate\":\"2024-03-12 12:30\""));
        assert!(json.contains("\"orderPosition\":3"));
        assert!(json.contains("\"total_due\":10.0"));
        assert!(json.contains("\"status\":\"success\""));
    }
}
