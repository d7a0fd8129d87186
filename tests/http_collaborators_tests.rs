//! Integration Tests for the HTTP Collaborators
//!
//! Runs a local axum server that plays the spreadsheet export and the
//! transfer form, and drives the real reqwest-backed source and submitter
//! against it.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Router,
};
use ledger_bot::{
    config::FormConfig,
    form::{FormFields, FormSubmitter, HttpFormSubmitter, TransferIntent},
    ledger::Amount,
    source::{SheetExportSource, TabularSource},
    Config, LedgerError, LedgerService,
};
use parking_lot::Mutex;

const BEFORE: &str = "\u{feff}Имя,Username,Баланс\nAlice,alice123,120\nBroken,row\nBob,bob_t,10\n,,\n";
const AFTER: &str = "\u{feff}Имя,Username,Баланс\nAlice,alice123,100\nBob,bob_t,30\n";

// == Fake Google Endpoints ==

#[derive(Default)]
struct Fake {
    accounts: Mutex<String>,
    exports: AtomicUsize,
    submissions: Mutex<Vec<HashMap<String, String>>>,
}

async fn export(
    State(fake): State<Arc<Fake>>,
    Path(document): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    fake.exports.fetch_add(1, Ordering::SeqCst);
    if document != "doc" || params.get("format").map(String::as_str) != Some("csv") {
        return StatusCode::NOT_FOUND.into_response();
    }
    match params.get("gid").map(String::as_str) {
        Some("0") => fake.accounts.lock().clone().into_response(),
        Some("5") => (StatusCode::INTERNAL_SERVER_ERROR, "backend error").into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn accept_form(
    State(fake): State<Arc<Fake>>,
    Form(fields): Form<HashMap<String, String>>,
) -> Response {
    fake.submissions.lock().push(fields);
    *fake.accounts.lock() = AFTER.to_string();
    (StatusCode::FOUND, [(header::LOCATION, "/thanks")]).into_response()
}

async fn reject_form() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "form closed").into_response()
}

async fn spawn_fake() -> (SocketAddr, Arc<Fake>) {
    let fake = Arc::new(Fake::default());
    *fake.accounts.lock() = BEFORE.to_string();

    let app = Router::new()
        .route("/d/:document/export", get(export))
        .route("/ok/formResponse", post(accept_form))
        .route("/closed/formResponse", post(reject_form))
        .with_state(fake.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, fake)
}

fn fields() -> FormFields {
    FormFields {
        payer: "entry.100".to_string(),
        payee: "entry.200".to_string(),
        amount: "entry.300".to_string(),
    }
}

fn intent() -> TransferIntent {
    TransferIntent::new("alice123", "bob_t", Amount::from_minor(2050)).unwrap()
}

// == Sheet Export Tests ==

#[tokio::test]
async fn test_export_parses_csv_and_skips_bad_rows() {
    let (addr, _fake) = spawn_fake().await;
    let source =
        SheetExportSource::new(&format!("http://{}/d", addr), "doc", Duration::from_secs(5))
            .unwrap();

    let table = source.fetch_rows("0").await.unwrap();

    assert_eq!(table.headers(), ["Имя", "Username", "Баланс"]);
    assert_eq!(table.len(), 2);
    assert_eq!(table.malformed(), 1);
    assert_eq!(table.value(&table.rows()[1], "username"), Some("bob_t"));
}

#[tokio::test]
async fn test_export_error_status_is_fetch_error() {
    let (addr, _fake) = spawn_fake().await;
    let source =
        SheetExportSource::new(&format!("http://{}/d", addr), "doc", Duration::from_secs(5))
            .unwrap();

    let result = source.fetch_rows("5").await;

    assert!(matches!(
        result,
        Err(LedgerError::Fetch { ref table_id, ref reason }) if table_id == "5" && reason.contains("500")
    ));
}

// == Form Submitter Tests ==

#[tokio::test]
async fn test_form_redirect_counts_as_success() {
    let (addr, fake) = spawn_fake().await;
    let submitter = HttpFormSubmitter::new(
        &format!("http://{}/ok/formResponse", addr),
        fields(),
        Duration::from_secs(5),
    )
    .unwrap();

    submitter.submit(&intent()).await.unwrap();

    let submissions = fake.submissions.lock();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0]["entry.100"], "alice123");
    assert_eq!(submissions[0]["entry.200"], "bob_t");
    assert_eq!(submissions[0]["entry.300"], "20.50");
}

#[tokio::test]
async fn test_form_error_status_is_write_failure() {
    let (addr, _fake) = spawn_fake().await;
    let submitter = HttpFormSubmitter::new(
        &format!("http://{}/closed/formResponse", addr),
        fields(),
        Duration::from_secs(5),
    )
    .unwrap();

    let result = submitter.submit(&intent()).await;

    assert!(matches!(result, Err(LedgerError::WriteFailure(ref m)) if m.contains("500")));
}

// == End To End ==

#[tokio::test]
async fn test_pay_round_trip_through_live_collaborators() {
    let (addr, fake) = spawn_fake().await;
    let config = Config {
        sheet_id: "doc".to_string(),
        accounts_gid: "0".to_string(),
        export_base_url: format!("http://{}/d", addr),
        http_timeout: 5,
        form: Some(FormConfig {
            url: format!("http://{}/ok/formResponse", addr),
            fields: fields(),
        }),
        reconcile_max_attempts: 3,
        reconcile_interval_ms: 10,
        ..Config::default()
    };
    let service = LedgerService::from_config(&config).unwrap();

    let before = service.balance("alice123").await.unwrap();
    assert_eq!(before.account.balance, Amount::from_units(120));

    let outcome = service
        .pay("alice123", "Bob", Amount::from_units(20))
        .await
        .unwrap();

    assert!(outcome.is_confirmed());
    assert_eq!(outcome.account().balance, Amount::from_units(100));
    assert_eq!(fake.submissions.lock()[0]["entry.200"], "bob_t");
    // balance read, fresh pre-write snapshot, one confirming read
    assert_eq!(fake.exports.load(Ordering::SeqCst), 3);
}
