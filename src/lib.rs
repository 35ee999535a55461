// * order-rewind: year-in-review extraction for a meal-delivery
// * order-history page. The pipeline turns bilingual free-text card
// * markup into typed order records, converges over the site's
// * load-more pagination, and folds the result into yearly statistics.

pub mod config;
pub mod extract;
pub mod host;
pub mod model;
pub mod page;
pub mod session;
pub mod stats;
