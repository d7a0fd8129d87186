//! Request and Response models for the command API
//!
//! This module defines the DTOs used for serializing/deserializing HTTP
//! request and response bodies.

pub mod requests;
pub mod responses;

pub use requests::PayRequest;
pub use responses::{
    BalanceResponse, ErrorResponse, HealthResponse, InvalidateResponse, PayResponse,
    PriceResponse, StatsResponse,
};
