use std::sync::Arc;

use reqwest::Method;
use wiremock::matchers::{body_string, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use aster_api_client::auth::{StaticCredentials, hmac_sign};
use aster_api_client::futures::FuturesClient;
use aster_api_client::rest::{RestClient, SecurityLevel, UserDataStreamApi};
use aster_api_client::spot::SpotClient;
use aster_api_client::types::{KlineInterval, KlinesRequest};
use aster_api_client::{AsterError, error::error_codes};
use rust_decimal::Decimal;
use tokio_test::{assert_err, assert_ok};

const API_KEY: &str = "test_key";
const SECRET_KEY: &str = "test_secret";
const PRIVATE_KEY: &str = "0x0000000000000000000000000000000000000000000000000000000000000001";

fn hmac_futures(server: &MockServer) -> FuturesClient {
    let credentials = Arc::new(StaticCredentials::hmac(API_KEY, SECRET_KEY));
    FuturesClient::builder()
        .base_url(server.uri())
        .credentials(credentials)
        .build()
        .map(FuturesClient::new)
        .unwrap()
}

fn web3_futures(server: &MockServer) -> FuturesClient {
    let credentials = Arc::new(StaticCredentials::web3(
        "0x1111111111111111111111111111111111111111",
        "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf",
        PRIVATE_KEY,
    ));
    FuturesClient::builder()
        .base_url(server.uri())
        .credentials(credentials)
        .build()
        .map(FuturesClient::new)
        .unwrap()
}

fn public_spot(server: &MockServer) -> SpotClient {
    SpotClient::new(SpotClient::builder().base_url(server.uri()).build().unwrap())
}

/// Split a received query into its unsigned prefix and the signature.
fn split_signature(query: &str) -> (&str, &str) {
    let (prefix, signature) = query
        .rsplit_once("&signature=")
        .expect("signature must be the last query parameter");
    assert!(!signature.contains('&'));
    (prefix, signature)
}

#[tokio::test]
async fn test_hmac_signature_is_last_and_verifiable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/fapi/v1/leverage"))
        .and(query_param("symbol", "BTCUSDT"))
        .and(header("x-mbx-apikey", API_KEY))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("leverage=20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "leverage": 20,
            "maxNotionalValue": "250000",
            "symbol": "BTCUSDT"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = hmac_futures(&server);
    let leverage = client.change_leverage("BTCUSDT", 20).await.unwrap();
    assert_eq!(leverage.leverage, 20);
    assert_eq!(leverage.max_notional_value, Some(Decimal::new(250_000, 0)));

    let requests = server.received_requests().await.unwrap();
    let query = requests[0].url.query().unwrap();
    let (prefix, signature) = split_signature(query);
    assert!(prefix.contains("timestamp="));
    let body = String::from_utf8(requests[0].body.clone()).unwrap();
    assert_eq!(signature, hmac_sign(SECRET_KEY, &format!("{prefix}{body}")).unwrap());
}

#[tokio::test]
async fn test_signed_call_without_credentials_sends_nothing() {
    let server = MockServer::start().await;
    let client = FuturesClient::new(FuturesClient::builder().base_url(server.uri()).build().unwrap());

    let err = client.balance().await.unwrap_err();
    assert!(matches!(err, AsterError::MissingCredential(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_api_key_sends_nothing() {
    let server = MockServer::start().await;
    let client = FuturesClient::new(
        FuturesClient::builder()
            .base_url(server.uri())
            .credentials(Arc::new(StaticCredentials::hmac("", SECRET_KEY)))
            .build()
            .unwrap(),
    );

    let err = client.balance().await.unwrap_err();
    assert!(matches!(err, AsterError::MissingCredential("api key")));
    let err = client.start_user_stream().await.unwrap_err();
    assert!(matches!(err, AsterError::MissingCredential("api key")));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_web3_signed_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fapi/v2/balance"))
        .and(query_param("userAddress", "0x1111111111111111111111111111111111111111"))
        .and(query_param("signerAddress", "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
            "accountAlias": "SgsR",
            "asset": "USDT",
            "balance": "10.5",
            "crossWalletBalance": "10.5",
            "crossUnPnl": "0",
            "availableBalance": "10.5",
            "maxWithdrawAmount": "10.5",
            "marginAvailable": true,
            "updateTime": 1
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let client = web3_futures(&server);
    let balances = client.balance().await.unwrap();
    assert_eq!(balances[0].available_balance, Decimal::new(105, 1));

    let requests = server.received_requests().await.unwrap();
    let request = &requests[0];
    assert!(request.headers.get("x-mbx-apikey").is_none());

    let query = request.url.query().unwrap();
    let (prefix, signature) = split_signature(query);
    assert!(prefix.contains("nonce="));
    assert!(prefix.contains("timestamp="));
    assert!(signature.starts_with("0x"));
    assert_eq!(signature.len(), 132);
}

#[tokio::test]
async fn test_structured_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fapi/v2/balance"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "code": -1021,
            "msg": "Timestamp for this request is outside of the recvWindow."
        })))
        .mount(&server)
        .await;

    let err = hmac_futures(&server).balance().await.unwrap_err();
    let api_error = err.api_error().expect("structured error");
    assert_eq!(api_error.code, error_codes::TIMESTAMP_OUTSIDE_RECV_WINDOW);
    assert!(api_error.is_timestamp_outside_recv_window());
    assert_eq!(
        api_error.to_string(),
        "<APIError> code=-1021, msg=Timestamp for this request is outside of the recvWindow."
    );
}

#[tokio::test]
async fn test_unstructured_error_keeps_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/ping"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let err = public_spot(&server).ping().await.unwrap_err();
    match err {
        AsterError::MalformedResponse { status, body } => {
            assert_eq!(status, 502);
            assert_eq!(body, "<html>Bad Gateway</html>");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_klines_decode_and_reject_short_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/klines"))
        .and(query_param("symbol", "BTCUSDT"))
        .and(query_param("interval", "1h"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            [1499040000000i64, "0.01634790", "0.80000000", "0.01575800", "0.01577100",
             "148976.11427815", 1499644799999i64, "2434.19055334", 308, "1756.87402397",
             "28.46694368", "0"]
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/klines"))
        .and(query_param("symbol", "ETHUSDT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            [1499040000000i64, "1", "1", "1", "1"]
        ])))
        .mount(&server)
        .await;

    let client = public_spot(&server);
    let klines = client
        .klines(&KlinesRequest::new("BTCUSDT", KlineInterval::OneHour).limit(2))
        .await
        .unwrap();
    assert_eq!(klines.len(), 1);
    assert_eq!(klines[0].number_of_trades, 308);

    let err = client
        .klines(&KlinesRequest::new("ETHUSDT", KlineInterval::OneHour))
        .await
        .unwrap_err();
    assert!(matches!(err, AsterError::MalformedResponse { status: 200, .. }));
}

#[tokio::test]
async fn test_book_ticker_one_or_all() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fapi/v1/ticker/bookTicker"))
        .and(query_param("symbol", "BTCUSDT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "symbol": "BTCUSDT", "bidPrice": "60000", "bidQty": "1",
            "askPrice": "60001", "askQty": "2", "time": 1700000000000i64
        })))
        .mount(&server)
        .await;

    let client = hmac_futures(&server);
    let tickers = client.book_ticker(Some("BTCUSDT")).await.unwrap();
    assert_eq!(tickers.len(), 1);
    assert_eq!(tickers[0].time, Some(1700000000000));

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("x-mbx-apikey").is_none());
}

#[tokio::test]
async fn test_generic_request_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fapi/v1/depth"))
        .and(query_param("symbol", "BTCUSDT"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"lastUpdateId":1}"#))
        .mount(&server)
        .await;

    let client = RestClient::builder().base_url(server.uri()).build().unwrap();
    let request = client
        .build_request(Method::GET, "/fapi/v1/depth", SecurityLevel::None)
        .set_param("symbol", "BTCUSDT")
        .set_param("limit", 5);
    let body = client.execute(request).await.unwrap();
    assert_eq!(body, br#"{"lastUpdateId":1}"#);
}

#[tokio::test]
async fn test_sync_server_time_sets_offset() {
    let server = MockServer::start().await;
    let server_time = aster_api_client::auth::now_millis() + 60_000;
    Mock::given(method("GET"))
        .and(path("/fapi/v1/time"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "serverTime": server_time })),
        )
        .mount(&server)
        .await;

    let client = hmac_futures(&server);
    let offset = client.sync_server_time().await.unwrap();
    assert!((55_000..=60_000).contains(&offset), "offset {offset}");
    assert_eq!(client.rest().time_offset().get(), offset);
}

#[tokio::test]
async fn test_spot_listen_key_lifecycle() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v3/userDataStream"))
        .and(header("x-mbx-apikey", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "listenKey": "spot-key" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v3/userDataStream"))
        .and(body_string("listenKey=spot-key"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v3/userDataStream"))
        .and(body_string("listenKey=spot-key"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&server)
        .await;

    let credentials = Arc::new(StaticCredentials::hmac(API_KEY, SECRET_KEY));
    let client = SpotClient::new(
        SpotClient::builder()
            .base_url(server.uri())
            .credentials(credentials)
            .build()
            .unwrap(),
    );

    let key = client.start_user_stream().await.unwrap();
    assert_eq!(key, "spot-key");
    assert_ok!(client.keepalive_user_stream(&key).await);
    assert_ok!(client.close_user_stream(&key).await);

    // ApiKey level: no signature on spot listen key calls.
    for request in server.received_requests().await.unwrap() {
        assert!(request.url.query().is_none());
    }
}

#[tokio::test]
async fn test_futures_listen_key_is_signed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/fapi/v1/listenKey"))
        .and(header_exists("x-mbx-apikey"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "listenKey": "fut-key" })))
        .mount(&server)
        .await;

    let key = hmac_futures(&server).start_user_stream().await.unwrap();
    assert_eq!(key, "fut-key");

    let requests = server.received_requests().await.unwrap();
    split_signature(requests[0].url.query().unwrap());
}

#[tokio::test]
async fn test_expired_listen_key_error() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/fapi/v1/listenKey"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "code": -1125,
            "msg": "This listenKey does not exist."
        })))
        .mount(&server)
        .await;

    let err = assert_err!(hmac_futures(&server).keepalive_user_stream("gone").await);
    assert!(err.api_error().unwrap().is_listen_key_missing());
}
