// * CSS selector vocabulary for the order-history page.
// * These are tied to one site's markup and break when it changes.

// * Card containers
pub const ORDER_BLOC: &str = ".c-paginated-list__bloc";
pub const ORDER_CARD: &str = ".c-order-card";
pub const ORDER_CARD_SUCCESS_CLASS: &str = "c-order-card--success";

// * Per-card sub-elements
pub const ORDER_DATE: &str = ".c-order-card__date";
pub const ORDER_POSITION: &str = ".c-order-card__top";

// * Line items
pub const PRODUCT_SECTIONS: &str = ".c-cart-detail-products, .c-shared-section__products";
pub const PRODUCT: &str = ".c-cart-detail-product";
pub const PRODUCT_TITLE: &str = ".c-cart-detail-product__title";
pub const PRODUCT_PRICE: &str = ".c-price";

// * Totals block
pub const TOTALS_SECTION: &str = ".c-shared-totals__section";
pub const TOTAL_ITEM: &str = ".c-shared-total-item";
pub const TOTAL_ITEM_CLASS: &str = "c-shared-total-item";
pub const TOTAL_LABEL: &str = ".c-shared-total-item__label";
pub const TOTAL_PRICE: &str = ".c-shared-total-item__price, \
     .c-shared-total-item__price--free, \
     .c-shared-total-item__price--loyalty, \
     .c-shared-total-item__price--information";
pub const PROMO_TITLE: &str = ".c-shared-totals__section-title";

// * Page-level controls
pub const LOAD_MORE: &str = ".c-paginated-list__more-wrap .c-show-more";
pub const LANGUAGE_SELECT: &str = ".select select";
