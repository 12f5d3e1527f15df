//! API Module
//!
//! HTTP handlers and routing for the lake cache REST API.
//!
//! # Endpoints
//! - `PUT /lakes/:key` - Store conditions for a lake
//! - `GET /lakes/:key` - Retrieve conditions for a lake
//! - `DELETE /lakes/:key` - Remove a lake's entry
//! - `POST /lakes/:key/refresh` - Overwrite a live entry
//! - `GET /size` - Stored row count
//! - `POST /sweep` - Purge expired entries
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
