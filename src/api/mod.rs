//! API Module
//!
//! HTTP handlers and routing for the bot command API. A chat adapter turns
//! user commands into these calls and relays the `message` fields back.
//!
//! # Endpoints
//! - `GET /balance/:username` - Caller's balance
//! - `POST /pay` - Transfer between two users
//! - `GET /price/:query` - Price list lookup
//! - `DELETE /cache/:table` - Force a re-read of `accounts` or `prices`
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
