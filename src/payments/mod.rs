pub mod error;
pub mod factory;
pub mod gateway;
pub mod stripe;
