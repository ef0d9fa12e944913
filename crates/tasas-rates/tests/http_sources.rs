//! HTTP-level tests for the three source clients against a local mock server.

use std::time::Duration;

use tasas_models::quote::{labels, Currency, SourceKind};
use tasas_rates::{
    build_http_client, CommunityScrapeClient, FetchError, OfficialRateClient, PeerMarketClient,
    RateSource,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client() -> reqwest::Client {
    build_http_client(Duration::from_secs(2)).unwrap()
}

#[tokio::test]
async fn official_client_reads_price_for_its_currency() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tipo-cambio"))
        .and(query_param("currency", "eur"))
        .and(query_param("rounded_price", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "price": 52.18,
            "last_update": "13/01/2025"
        })))
        .mount(&server)
        .await;

    let source = OfficialRateClient::new(
        client(),
        format!("{}/tipo-cambio", server.uri()),
        Currency::Eur,
    );
    let quotes = source.fetch().await.unwrap();

    assert_eq!(source.name(), "official_eur");
    assert_eq!(quotes.len(), 1);
    assert_eq!(quotes[0].source, SourceKind::Official);
    assert_eq!(quotes[0].currency, Currency::Eur);
    assert_eq!(quotes[0].price, 52.18);
}

#[tokio::test]
async fn official_client_rejects_bad_responses() {
    let server = MockServer::start().await;
    Mock::given(path("/down"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(path("/zero"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"price": 0})))
        .mount(&server)
        .await;
    Mock::given(path("/html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let fetch = |route: &str| {
        OfficialRateClient::new(client(), format!("{}{route}", server.uri()), Currency::Usd)
    };

    assert_eq!(fetch("/down").fetch().await, Err(FetchError::Status(503)));
    assert!(matches!(
        fetch("/zero").fetch().await,
        Err(FetchError::InvalidPayload(_))
    ));
    assert!(matches!(
        fetch("/html").fetch().await,
        Err(FetchError::InvalidPayload(_))
    ));
}

#[tokio::test]
async fn official_client_times_out() {
    let server = MockServer::start().await;
    Mock::given(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"price": 40.0}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let source = OfficialRateClient::new(
        build_http_client(Duration::from_millis(200)).unwrap(),
        format!("{}/slow", server.uri()),
        Currency::Usd,
    );
    assert_eq!(source.fetch().await, Err(FetchError::Timeout));
}

#[tokio::test]
async fn peer_market_client_parses_platforms() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/market-p2p"))
        .and(query_param("currency", "usd"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"platforms": {
                "binance": {"title": "Binance P2P", "price": 44.1},
                "bybit": {"title": "Bybit", "price": 43.9}
            }}"#,
        ))
        .mount(&server)
        .await;

    let source = PeerMarketClient::new(client(), format!("{}/market-p2p", server.uri()));
    let quotes = source.fetch().await.unwrap();

    let labels_in_order: Vec<&str> = quotes.iter().map(|q| q.label.as_str()).collect();
    assert_eq!(labels_in_order, vec!["Binance", "Bybit"]);
}

#[tokio::test]
async fn peer_market_malformed_body_is_empty_not_error() {
    let server = MockServer::start().await;
    Mock::given(path("/market-p2p"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"error\": \"rate limited\"}"))
        .mount(&server)
        .await;

    let source = PeerMarketClient::new(client(), format!("{}/market-p2p", server.uri()));
    assert_eq!(source.fetch().await, Ok(vec![]));
}

#[tokio::test]
async fn community_client_scrapes_page() {
    let server = MockServer::start().await;
    Mock::given(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<html><body><h2>Tasas</h2><p>Zelle: 45,20</p><p>Euro 49,80</p></body></html>",
        ))
        .mount(&server)
        .await;

    let source = CommunityScrapeClient::new(client(), format!("{}/", server.uri()));
    let quotes = source.fetch().await.unwrap();

    assert_eq!(quotes.len(), 2);
    assert_eq!(quotes[0].label, labels::ZELLE);
    assert_eq!(quotes[0].price, 45.2);
    assert_eq!(quotes[1].label, labels::EURO);
    assert_eq!(quotes[1].currency, Currency::Eur);
}

#[tokio::test]
async fn community_client_without_matches_is_empty() {
    let server = MockServer::start().await;
    Mock::given(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>Sin datos hoy</p>"))
        .mount(&server)
        .await;

    let source = CommunityScrapeClient::new(client(), format!("{}/", server.uri()));
    assert_eq!(source.fetch().await, Ok(vec![]));
}
