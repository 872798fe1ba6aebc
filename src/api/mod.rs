//! API Module
//!
//! HTTP handlers and routing for the cache REST facade.
//!
//! # Endpoints
//! - `PUT /set` - Store a JSON value
//! - `GET /get/:key` - Retrieve a value by key
//! - `DELETE /del/:key` - Delete a key
//! - `DELETE /clear` - Empty the cache
//! - `GET /stats` - Get cache statistics
//! - `GET /predictions` - Get predicted keys
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
