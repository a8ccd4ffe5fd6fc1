//! Data model, token storage and remote service gateway for the mealmate
//! client.

pub mod config;
pub mod gateway;
pub mod models;
pub mod token;

pub use config::GatewayConfig;
pub use gateway::{GatewayError, HttpGateway, RemoteService};
pub use token::TokenStore;
