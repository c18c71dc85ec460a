use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use service::errors::ServiceError;
use service::sheets::token::StaticToken;
use service::sheets::{GoogleSheetsClient, SheetClient};

const SPREADSHEET: &str = "sheet-123";

#[derive(Debug, Clone)]
struct Recorded {
    method: Method,
    path: String,
    query: String,
    auth: String,
    body: Value,
}

#[derive(Clone, Default)]
struct Stub {
    calls: Arc<Mutex<Vec<Recorded>>>,
}

impl Stub {
    fn calls(&self) -> Vec<Recorded> {
        self.calls.lock().unwrap().clone()
    }
}

async fn sheets_api(State(stub): State<Stub>, method: Method, uri: Uri, headers: HeaderMap, body: String) -> Response {
    let path = uri.path().to_string();
    let query = uri.query().unwrap_or_default().to_string();
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let body_json = serde_json::from_str(&body).unwrap_or(Value::Null);
    stub.calls.lock().unwrap().push(Recorded {
        method: method.clone(),
        path: path.clone(),
        query: query.clone(),
        auth,
        body: body_json,
    });

    if path.contains("broken") {
        return (StatusCode::FORBIDDEN, "permission denied").into_response();
    }
    if method == Method::GET && !path.contains("/values/") {
        return Json(json!({"sheets": [
            {"properties": {"sheetId": 0, "title": "Other"}},
            {"properties": {"sheetId": 42, "title": "Bookings"}}
        ]}))
        .into_response();
    }
    if method == Method::GET && query.contains("majorDimension=COLUMNS") {
        return Json(json!({"values": [["phone_number", "555-1234", "", "555-9"]]})).into_response();
    }
    if method == Method::GET && path.ends_with("1:1") {
        return Json(json!({"values": [["modality", "call_time", "phone_number"]]})).into_response();
    }
    if method == Method::GET {
        return Json(json!({"values": [["a", "b", "c"], ["1"], [2, "x"]]})).into_response();
    }
    Json(json!({})).into_response()
}

async fn start_stub() -> anyhow::Result<(Stub, String)> {
    let stub = Stub::default();
    let app = Router::new().fallback(sheets_api).with_state(stub.clone());
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("stub error: {}", e); }
    });
    Ok((stub, format!("http://{}:{}", addr.ip(), addr.port())))
}

async fn open(base: &str, spreadsheet: &str, worksheet: &str) -> Result<GoogleSheetsClient, ServiceError> {
    GoogleSheetsClient::open(
        reqwest::Client::new(),
        Arc::new(StaticToken("test-token".into())),
        base,
        spreadsheet,
        worksheet,
    )
    .await
}

#[tokio::test]
async fn open_resolves_worksheet_id() -> anyhow::Result<()> {
    let (stub, base) = start_stub().await?;
    let client = open(&base, SPREADSHEET, "Bookings").await?;
    assert_eq!(client.sheet_id(), 42);

    let calls = stub.calls();
    assert_eq!(calls[0].path, "/v4/spreadsheets/sheet-123");
    assert!(calls[0].query.contains("fields="));
    assert_eq!(calls[0].auth, "Bearer test-token");
    Ok(())
}

#[tokio::test]
async fn open_fails_for_unknown_worksheet() -> anyhow::Result<()> {
    let (_stub, base) = start_stub().await?;
    let res = open(&base, SPREADSHEET, "Missing").await;
    assert!(matches!(res, Err(ServiceError::Configuration(_))));
    Ok(())
}

#[tokio::test]
async fn reads_rows_columns_and_pads_grid() -> anyhow::Result<()> {
    let (stub, base) = start_stub().await?;
    let client = open(&base, SPREADSHEET, "Bookings").await?;

    let header = client.row_values(1).await?;
    assert_eq!(header, vec!["modality", "call_time", "phone_number"]);

    let phones = client.col_values(3).await?;
    assert_eq!(phones, vec!["phone_number", "555-1234", "", "555-9"]);

    let all = client.all_values().await?;
    assert_eq!(all, vec![vec!["a", "b", "c"], vec!["1", "", ""], vec!["2", "x", ""]]);

    let calls = stub.calls();
    assert!(calls[1].path.ends_with("/values/'Bookings'!1:1"));
    assert!(calls[2].path.ends_with("/values/'Bookings'!C:C"));
    assert!(calls[2].query.contains("majorDimension=COLUMNS"));
    assert!(calls[3].path.ends_with("/values/'Bookings'"));
    Ok(())
}

#[tokio::test]
async fn writes_use_raw_values_and_batch_delete() -> anyhow::Result<()> {
    let (stub, base) = start_stub().await?;
    let client = open(&base, SPREADSHEET, "Bookings").await?;
    let row: Vec<String> = ["", "", "555-1234", "", "101", "", "", "", ""].iter().map(|s| s.to_string()).collect();

    client.append_row(row.clone()).await?;
    client.update_row(5, 1, row.clone()).await?;
    client.delete_row(5).await?;

    let calls = stub.calls();
    let append = &calls[1];
    assert_eq!(append.method, Method::POST);
    assert!(append.path.ends_with("/values/'Bookings':append"));
    assert!(append.query.contains("valueInputOption=RAW"));
    assert_eq!(append.body["values"][0][2], "555-1234");

    let update = &calls[2];
    assert_eq!(update.method, Method::PUT);
    assert!(update.path.ends_with("/values/'Bookings'!A5:I5"));
    assert_eq!(update.body["range"], "'Bookings'!A5:I5");
    assert_eq!(update.body["values"][0].as_array().map(Vec::len), Some(9));

    let delete = &calls[3];
    assert_eq!(delete.path, "/v4/spreadsheets/sheet-123:batchUpdate");
    let range = &delete.body["requests"][0]["deleteDimension"]["range"];
    assert_eq!(range["sheetId"], 42);
    assert_eq!(range["dimension"], "ROWS");
    assert_eq!(range["startIndex"], 4);
    assert_eq!(range["endIndex"], 5);
    Ok(())
}

#[tokio::test]
async fn non_success_status_surfaces_as_sheet_error() -> anyhow::Result<()> {
    let (_stub, base) = start_stub().await?;
    let res = open(&base, "broken", "Bookings").await;
    match res {
        Err(ServiceError::Sheet(msg)) => assert!(msg.contains("403")),
        other => panic!("expected sheet error, got {:?}", other.map(|c| c.sheet_id())),
    }
    Ok(())
}
