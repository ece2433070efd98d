pub mod catalog;
pub mod insights;
pub mod providers;
pub mod watchlist;
