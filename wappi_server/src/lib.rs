//! # Wappi server
//! The HTTP front end of the Wappi order-tracking backend. It is responsible for:
//! * Creating orders, handing out claim links, and letting customers claim them.
//! * Letting managers track order status, maintain the imported price list and edit business settings.
//! * Pushing live `order_claimed` notifications to connected managers over a websocket.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/ws?token=...`: The notification websocket.
//! * `/api/claim/{token}`: Public claim link lookup.
//! * `/api/...`: Everything else, behind JWT authentication. See [routes](routes/index.html).

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod ws;

#[cfg(test)]
mod endpoint_tests;
