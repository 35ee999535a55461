pub mod constants;
pub mod selectors;
