//! Adapter integration tests against a mock venue
//!
//! Each adapter is built from its config with `rest_url` pointed at a
//! mockito server and driven through the public trait only.

use exchange_adapters::adapters::{
    AnyAdapter, BackpackAdapter, BackpackConfig, DeepwatersAdapter, DeepwatersConfig, ExchangeAdapter, ExchangeError,
    IndodaxAdapter, IndodaxConfig, Params, ToobitAdapter, ToobitConfig,
};
use mockito::Matcher;

const TOOBIT_INFO: &str = r#"{
    "timezone": "UTC", "serverTime": "1755583099926",
    "symbols": [{
        "filters": [
            {"minPrice": "0.01", "maxPrice": "10000000", "tickSize": "0.01", "filterType": "PRICE_FILTER"},
            {"minQty": "0.0001", "maxQty": "4000", "stepSize": "0.0001", "filterType": "LOT_SIZE"}
        ],
        "symbol": "ETHUSDT", "status": "TRADING", "baseAsset": "ETH", "quoteAsset": "USDT"
    }],
    "contracts": []
}"#;

#[tokio::test]
async fn test_toobit_markets_then_book_through_any_adapter() {
    let mut server = mockito::Server::new_async().await;
    let info = server
        .mock("GET", "/api/v1/exchangeInfo")
        .with_status(200)
        .with_body(TOOBIT_INFO)
        .expect(1)
        .create_async()
        .await;
    let _depth = server
        .mock("GET", "/quote/v1/depth")
        .match_query(Matcher::UrlEncoded("symbol".into(), "ETHUSDT".into()))
        .with_status(200)
        .with_body(r#"{"t":"1755593995237","b":[["4300.1","1.5"],["4300.5","0.2"]],"a":[["4300.9","3"]]}"#)
        .create_async()
        .await;

    let adapter = AnyAdapter::Toobit(ToobitAdapter::new(ToobitConfig {
        rest_url: Some(server.url()),
        ..ToobitConfig::default()
    }));

    let markets = adapter.load_markets(false).await.unwrap();
    assert_eq!(markets.len(), 1);
    assert_eq!(adapter.market("ETH/USDT").await.unwrap().id, "ETHUSDT");

    let book = adapter.fetch_order_book("ETH/USDT", None).await.unwrap();
    assert_eq!(book.bids[0].price, "4300.5");
    assert_eq!(book.asks[0].amount, "3");

    // markets were cached by the first load
    info.assert_async().await;
}

#[tokio::test]
async fn test_toobit_unknown_symbol_is_bad_symbol() {
    let mut server = mockito::Server::new_async().await;
    let _info = server
        .mock("GET", "/api/v1/exchangeInfo")
        .with_status(200)
        .with_body(TOOBIT_INFO)
        .create_async()
        .await;
    let adapter = ToobitAdapter::new(ToobitConfig {
        rest_url: Some(server.url()),
        ..ToobitConfig::default()
    });
    let err = adapter.fetch_order_book("DOGE/USDT", None).await.unwrap_err();
    assert!(matches!(err, ExchangeError::BadSymbol(_)), "{:?}", err);
}

#[tokio::test]
async fn test_indodax_server_time() {
    let mut server = mockito::Server::new_async().await;
    let _time = server
        .mock("GET", "/api/server_time")
        .with_status(200)
        .with_body(r#"{"timezone":"UTC","server_time":1571205969552}"#)
        .create_async()
        .await;
    let adapter = IndodaxAdapter::new(IndodaxConfig {
        rest_url: Some(server.url()),
        ..IndodaxConfig::default()
    });
    assert_eq!(adapter.fetch_time().await.unwrap(), 1_571_205_969_552);
}

#[tokio::test]
async fn test_backpack_server_time_bare_integer() {
    let mut server = mockito::Server::new_async().await;
    let _time = server
        .mock("GET", "/api/v1/time")
        .with_status(200)
        .with_body("1753131712992")
        .create_async()
        .await;
    let adapter = BackpackAdapter::new(BackpackConfig {
        rest_url: Some(server.url()),
        ..BackpackConfig::default()
    });
    assert_eq!(adapter.fetch_time().await.unwrap(), 1_753_131_712_992);
}

#[tokio::test]
async fn test_deepwaters_time_and_rejection() {
    let mut server = mockito::Server::new_async().await;
    let _time = server
        .mock("GET", "/time")
        .with_status(200)
        .with_body(r#"{"success":true,"result":{"timestampMicros":1753102447307501}}"#)
        .create_async()
        .await;
    let _pairs = server
        .mock("GET", "/pairs")
        .with_status(200)
        .with_body(r#"{"success":false,"error":"service paused"}"#)
        .create_async()
        .await;

    let adapter = DeepwatersAdapter::new(DeepwatersConfig {
        rest_url: Some(server.url()),
        ..DeepwatersConfig::default()
    });
    assert_eq!(adapter.fetch_time().await.unwrap(), 1_753_102_447_307);

    let err = adapter.fetch_markets().await.unwrap_err();
    assert!(err.to_string().contains("service paused"));
}

#[tokio::test]
async fn test_private_call_without_credentials_fails_before_network() {
    let adapter = BackpackAdapter::new(BackpackConfig {
        rest_url: Some("http://127.0.0.1:1".into()),
        ..BackpackConfig::default()
    });
    let err = adapter.fetch_balance(&Params::new()).await.unwrap_err();
    assert!(matches!(err, ExchangeError::AuthenticationError(_)), "{:?}", err);
}
