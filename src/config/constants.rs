// * Configuration Constants
// * Central location for all configurable thresholds and timeouts

// * Delay after a "load more" click before re-scanning, in milliseconds.
// * Newly loaded cards need this long to render on the live page.
pub const SETTLE_DELAY_MS: u64 = 3_000;

// * Consecutive unchanged last-seen-date observations before the loop
// * declares the page exhausted.
pub const STAGNATION_LIMIT: u32 = 5;

// * Page navigation timeout in milliseconds
pub const PAGE_TIMEOUT_MS: u64 = 60_000;

// * The single calendar year treated as "current" for inclusion.
// * Orders outside it are excluded; past years stop the scan entirely.
pub const DEFAULT_BOUNDARY_YEAR: i32 = 2024;

// * Order-history URLs the extractor is allowed to run against,
// * one per supported locale.
pub const ALLOWED_URL_PREFIXES: [&str; 2] = [
    "https://www.refectory.fr/en/account/orders",
    "https://www.refectory.fr/mon-compte/mes-commandes",
];
