pub mod chit;
pub mod price;
pub mod rates;
pub mod refresh;
pub mod setup;
pub mod ui;
