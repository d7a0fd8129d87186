//! API Handlers
//!
//! HTTP request handlers for each bot command endpoint.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use crate::config::Config;
use crate::error::Result;
use crate::models::{
    BalanceResponse, HealthResponse, InvalidateResponse, PayRequest, PayResponse, PriceResponse,
    StatsResponse,
};
use crate::service::LedgerService;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<LedgerService>,
}

impl AppState {
    pub fn new(service: LedgerService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    /// Creates a new AppState from configuration, wiring the live sheet
    /// export and transfer form.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(LedgerService::from_config(config)?))
    }
}

/// Handler for GET /balance/:username
pub async fn balance_handler(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<BalanceResponse>> {
    let balance = state.service.balance(&username).await?;
    Ok(Json(balance.into()))
}

/// Handler for POST /pay
///
/// Answers 200 once the transfer is visible in the ledger and 202 when it
/// was submitted but polling gave up before the sheet caught up. An
/// unreadable body is a 400 with the usual error body.
pub async fn pay_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<PayRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PayResponse>)> {
    let Json(req) = payload?;

    let outcome = state.service.pay(&req.from, &req.to, req.amount).await?;
    let status = if outcome.is_confirmed() {
        StatusCode::OK
    } else {
        StatusCode::ACCEPTED
    };
    Ok((status, Json(outcome.into())))
}

/// Handler for GET /price/:query
pub async fn price_handler(
    State(state): State<AppState>,
    Path(query): Path<String>,
) -> Result<Json<PriceResponse>> {
    let found = state.service.price(&query).await?;
    Ok(Json(PriceResponse::new(query, found)))
}

/// Handler for DELETE /cache/:table
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Path(table): Path<String>,
) -> Result<Json<InvalidateResponse>> {
    state.service.invalidate(&table)?;
    Ok(Json(InvalidateResponse::new(table)))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.service.cache_stats().into())
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{ManualClock, TableCache};
    use crate::error::LedgerError;
    use crate::ledger::{Amount, LedgerReader};
    use crate::source::MemorySource;
    use std::time::Duration;

    fn state_with(source: Arc<MemorySource>) -> AppState {
        let cache = TableCache::new(source, Arc::new(ManualClock::new()), Duration::from_secs(60));
        AppState::new(LedgerService::new(
            Arc::new(cache),
            LedgerReader::default(),
            "0",
        ))
    }

    fn sheet() -> Arc<MemorySource> {
        let source = Arc::new(MemorySource::new());
        source.push_csv("0", "Имя,Username,Баланс\nAlice,alice123,120\n");
        source
    }

    #[tokio::test]
    async fn test_balance_handler() {
        let state = state_with(sheet());

        let response = balance_handler(State(state), Path("@alice123".to_string()))
            .await
            .unwrap();
        assert_eq!(response.display_name, "Alice");
        assert_eq!(response.balance, Amount::from_units(120));
    }

    #[tokio::test]
    async fn test_balance_unknown_user() {
        let state = state_with(sheet());

        let result = balance_handler(State(state), Path("bobby".to_string())).await;
        assert!(matches!(result, Err(LedgerError::AccountNotFound(_))));
    }

    #[tokio::test]
    async fn test_pay_invalid_request() {
        let state = state_with(sheet());

        let req = PayRequest {
            from: "alice123".to_string(),
            to: "bob_t".to_string(),
            amount: Amount::ZERO,
        };
        let result = pay_handler(State(state), Ok(Json(req))).await;
        assert!(matches!(result, Err(LedgerError::InvalidRequest(ref m)) if m.contains("positive")));
    }

    #[tokio::test]
    async fn test_stats_handler_counts_reads() {
        let state = state_with(sheet());
        balance_handler(State(state.clone()), Path("alice123".to_string()))
            .await
            .unwrap();
        balance_handler(State(state.clone()), Path("alice123".to_string()))
            .await
            .unwrap();

        let response = stats_handler(State(state)).await;
        assert_eq!(response.hits, 1);
        assert_eq!(response.misses, 1);
        assert_eq!(response.fetches, 1);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
