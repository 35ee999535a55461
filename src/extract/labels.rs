// * Classifier for rows of the card's totals block.
// * A small ordered rule table replaces the original's cascading
// * substring checks; evaluation order is part of the contract because
// * "total due" must win over the bare "total" fallback and a negative
// * price with no recognized label is still a discount.

/// Which field of the order a totals row feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalsField {
    Delivery,
    LoyaltyPoints,
    TotalDue,
    Discount,
}

// * Case-insensitive keyword rules, evaluated top to bottom.
// * Both locales share one table; labels are lowercased before matching.
const LABEL_RULES: &[(&[&str], TotalsField)] = &[
    (&["delivery", "livraison"], TotalsField::Delivery),
    (
        &["points fidélité", "loyalty points"],
        TotalsField::LoyaltyPoints,
    ),
    (&["total due", "total"], TotalsField::TotalDue),
    (&["discount", "réduction"], TotalsField::Discount),
];

/// Classifies one totals row given its (optional) label text and the
/// parsed price. Returns `None` for rows that feed nothing (for example
/// an unlabeled row with a non-negative price).
pub fn classify_totals_row(label: Option<&str>, price: f64) -> Option<TotalsField> {
    if let Some(label) = label {
        let label = label.to_lowercase();
        for (keywords, field) in LABEL_RULES {
            if keywords.iter().any(|k| label.contains(k)) {
                // * A discount row only counts when the price is negative
                if *field == TotalsField::Discount && price >= 0.0 {
                    return None;
                }
                return Some(*field);
            }
        }
    }

    // * Final rule: negative price with no label match is a discount
    if price < 0.0 {
        return Some(TotalsField::Discount);
    }

    None
}
