use crate::config::SearchConfig;
use crate::entity::{SearchOutcome, parse_response};
use crate::error::SearchError;
use crate::query::Query;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use tracing::{debug, warn};

/// Issues one GET per search against the configured endpoint.
///
/// There is no retry, backoff or client-side timeout: a failed attempt is
/// reported to the caller as is.
#[derive(Clone, Debug)]
pub struct KgClient {
    http: reqwest::Client,
    config: SearchConfig,
}

impl KgClient {
    pub fn new(config: SearchConfig) -> Self {
        Self::with_http_client(reqwest::Client::new(), config)
    }

    pub fn with_http_client(http: reqwest::Client, config: SearchConfig) -> Self {
        Self { http, config }
    }

    pub fn request_url(&self, query: &Query) -> String {
        format!(
            "{endpoint}?query={query}&limit={limit}&key={key}",
            endpoint = self.config.endpoint,
            query = encode_component(query.as_str()),
            limit = self.config.limit,
            key = encode_component(&self.config.api_key),
        )
    }

    pub async fn search(&self, query: &Query) -> Result<SearchOutcome, SearchError> {
        debug!(endpoint = %self.config.endpoint, %query, "Dispatching entity search");
        let response = self.http.get(self.request_url(query)).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), %query, "Entity search rejected");
            return Err(SearchError::HttpStatus {
                status: status.as_u16(),
            });
        }
        let body = response.bytes().await?;
        let outcome = parse_response(&body).map_err(|err| {
            warn!(error = %err, %query, "Entity search returned an unexpected body");
            SearchError::from(err)
        })?;
        debug!(results = outcome.len(), %query, "Entity search completed");
        Ok(outcome)
    }
}

pub(crate) fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, NON_ALPHANUMERIC).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> KgClient {
        KgClient::new(
            SearchConfig::new("abc123")
                .unwrap()
                .with_endpoint("https://kg.example/v1/entities:search"),
        )
    }

    #[test]
    fn request_url_encodes_query_and_carries_fixed_params() {
        let query = Query::parse("Taylor Swift & co").unwrap();
        assert_eq!(
            client().request_url(&query),
            "https://kg.example/v1/entities:search?query=Taylor%20Swift%20%26%20co&limit=10000&key=abc123"
        );
    }

    #[test]
    fn limit_follows_config() {
        let client = KgClient::new(SearchConfig::new("k").unwrap().with_limit(5));
        let url = client.request_url(&Query::parse("x").unwrap());
        assert!(url.contains("&limit=5&"));
    }

    #[cfg(feature = "web")]
    mod upstream {
        use super::*;
        use crate::test_support::{Upstream, unused_endpoint};
        use axum::http::StatusCode;
        use serde_json::json;

        #[tokio::test]
        async fn non_success_status_is_a_transport_error() {
            let upstream = Upstream::spawn(StatusCode::FORBIDDEN, json!({ "error": "denied" })).await;
            let client = KgClient::new(upstream.config());
            let err = client
                .search(&Query::parse("einstein").unwrap())
                .await
                .unwrap_err();
            assert!(err.is_transport());
            assert_eq!(err.status(), Some(403));
            assert!(err.to_string().contains("403"));
        }

        #[tokio::test]
        async fn successful_response_is_normalized() {
            let upstream = Upstream::spawn(
                StatusCode::OK,
                json!({
                    "itemListElement": [
                        { "result": { "name": "Albert Einstein" }, "resultScore": 10.2 },
                        { "result": { "name": "Einstein (crater)" }, "resultScore": 3.0 }
                    ]
                }),
            )
            .await;
            let client = KgClient::new(upstream.config());
            let outcome = client
                .search(&Query::parse("einstein").unwrap())
                .await
                .unwrap();
            assert_eq!(outcome.len(), 2);
            assert_eq!(upstream.hits(), 1);

            let params = upstream.last_params().expect("request recorded");
            assert_eq!(params.get("query").map(String::as_str), Some("einstein"));
            assert_eq!(params.get("limit").map(String::as_str), Some("10000"));
            assert_eq!(params.get("key").map(String::as_str), Some("test-key"));
        }

        #[tokio::test]
        async fn empty_list_is_not_an_error() {
            let upstream = Upstream::spawn(StatusCode::OK, json!({ "itemListElement": [] })).await;
            let client = KgClient::new(upstream.config());
            let outcome = client.search(&Query::parse("zzzz").unwrap()).await.unwrap();
            assert_eq!(outcome, SearchOutcome::Empty);
        }

        #[tokio::test]
        async fn refused_connection_is_a_transport_error() {
            let endpoint = unused_endpoint().await;
            let config = SearchConfig::new("k").unwrap().with_endpoint(endpoint);
            let err = KgClient::new(config)
                .search(&Query::parse("einstein").unwrap())
                .await
                .unwrap_err();
            assert!(matches!(err, SearchError::Network(_)));
            assert!(err.is_transport());
        }
    }
}
