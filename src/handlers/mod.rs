pub mod accounts;
pub mod portfolio;
pub mod stocks;
