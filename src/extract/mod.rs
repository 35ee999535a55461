pub mod card;
pub mod date;
pub mod labels;
pub mod locale;
pub mod price;
pub mod scan;
