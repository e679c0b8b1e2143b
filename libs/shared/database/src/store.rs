use anyhow::{anyhow, Result};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;

const REST_PREFIX: &str = "/rest/v1";

/// Filter/order builder for the store's `column=op.value` query syntax.
#[derive(Debug, Default, Clone)]
pub struct StoreQuery {
    parts: Vec<String>,
}

impl StoreQuery {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, column: &str, op: &str, value: &str) -> Self {
        self.parts.push(format!("{}={}.{}", column, op, urlencoding::encode(value)));
        self
    }

    pub fn eq(self, column: &str, value: impl ToString) -> Self {
        self.push(column, "eq", &value.to_string())
    }

    pub fn gte(self, column: &str, value: impl ToString) -> Self {
        self.push(column, "gte", &value.to_string())
    }

    pub fn lte(self, column: &str, value: impl ToString) -> Self {
        self.push(column, "lte", &value.to_string())
    }

    /// Case-insensitive pattern match; `*` in `value` is a wildcard.
    pub fn ilike(self, column: &str, value: impl ToString) -> Self {
        self.push(column, "ilike", &value.to_string())
    }

    /// Matches rows whose column is one of `values`.
    pub fn in_list<T: ToString>(mut self, column: &str, values: &[T]) -> Self {
        let joined = values
            .iter()
            .map(|v| urlencoding::encode(&v.to_string()).into_owned())
            .collect::<Vec<_>>()
            .join(",");
        self.parts.push(format!("{}=in.({})", column, joined));
        self
    }

    /// Matches rows whose array column contains `value`.
    pub fn contains(mut self, column: &str, value: impl ToString) -> Self {
        self.parts.push(format!(
            "{}=cs.{{{}}}",
            column,
            urlencoding::encode(&value.to_string())
        ));
        self
    }

    pub fn order(mut self, spec: &str) -> Self {
        self.parts.push(format!("order={}", spec));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.parts.push(format!("limit={}", limit));
        self
    }

    pub fn to_query_string(&self) -> String {
        if self.parts.is_empty() {
            String::new()
        } else {
            format!("?{}", self.parts.join("&"))
        }
    }
}

/// REST client for the clinic's document store.
#[derive(Clone)]
pub struct StoreClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl StoreClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.store_url.trim_end_matches('/').to_string(),
            api_key: config.store_api_key.clone(),
        }
    }

    fn get_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        headers.insert("apikey", HeaderValue::from_str(&self.api_key)?);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(headers)
    }

    pub async fn request<T>(&self, method: Method, path: &str, body: Option<Value>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.request_with_headers(method, path, body, None).await
    }

    pub async fn request_with_headers<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut headers = self.get_headers()?;
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url).headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("Store error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => anyhow!("Store authentication error: {}", error_text),
                404 => anyhow!("Store resource not found: {}", error_text),
                _ => anyhow!("Store error ({}): {}", status, error_text),
            });
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }

    fn representation() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));
        headers
    }

    fn collection_path(collection: &str, query: &StoreQuery) -> String {
        format!("{}/{}{}", REST_PREFIX, collection, query.to_query_string())
    }

    pub async fn select<T>(&self, collection: &str, query: &StoreQuery) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let rows: Vec<Value> = self
            .request(Method::GET, &Self::collection_path(collection, query), None)
            .await?;

        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(|e| anyhow!("Malformed {} document: {}", collection, e)))
            .collect()
    }

    pub async fn select_one<T>(&self, collection: &str, query: &StoreQuery) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let rows = self.select(collection, &query.clone().limit(1)).await?;
        Ok(rows.into_iter().next())
    }

    pub async fn exists(&self, collection: &str, query: &StoreQuery) -> Result<bool> {
        let rows: Vec<Value> = self
            .request(Method::GET, &Self::collection_path(collection, &query.clone().limit(1)), None)
            .await?;
        Ok(!rows.is_empty())
    }

    pub async fn insert<D, T>(&self, collection: &str, document: &D) -> Result<T>
    where
        D: Serialize,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(document)?;
        let rows: Vec<Value> = self
            .request_with_headers(
                Method::POST,
                &format!("{}/{}", REST_PREFIX, collection),
                Some(body),
                Some(Self::representation()),
            )
            .await?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Store returned no {} document after insert", collection))?;
        Ok(serde_json::from_value(row)?)
    }

    /// Applies `patch` to every matching document and returns the updated ones.
    pub async fn update<T>(&self, collection: &str, query: &StoreQuery, patch: Value) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let rows: Vec<Value> = self
            .request_with_headers(
                Method::PATCH,
                &Self::collection_path(collection, query),
                Some(patch),
                Some(Self::representation()),
            )
            .await?;

        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(Into::into))
            .collect()
    }

    /// Deletes matching documents, returning how many were removed.
    pub async fn delete(&self, collection: &str, query: &StoreQuery) -> Result<usize> {
        let rows: Vec<Value> = self
            .request_with_headers(
                Method::DELETE,
                &Self::collection_path(collection, query),
                None,
                Some(Self::representation()),
            )
            .await?;
        Ok(rows.len())
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize)]
    struct Row {
        id: String,
    }

    fn config(url: &str) -> AppConfig {
        AppConfig {
            store_url: url.to_string(),
            store_api_key: "store-key".to_string(),
            jwt_secret: String::new(),
            jwt_ttl_hours: 24,
            razorpay_key_id: String::new(),
            razorpay_key_secret: String::new(),
            razorpay_base_url: String::new(),
            recaptcha_secret: String::new(),
            recaptcha_verify_url: String::new(),
            upload_dir: "uploads".to_string(),
            max_upload_bytes: 1024,
            port: 0,
        }
    }

    #[test]
    fn query_string_is_built_in_order() {
        let query = StoreQuery::new()
            .eq("appointment_id", "APT-1")
            .order("date.desc,created_at.desc")
            .limit(5);
        assert_eq!(
            query.to_query_string(),
            "?appointment_id=eq.APT-1&order=date.desc,created_at.desc&limit=5"
        );
        assert_eq!(StoreQuery::new().to_query_string(), "");
        assert_eq!(
            StoreQuery::new().ilike("name", "Root Canal").to_query_string(),
            "?name=ilike.Root%20Canal"
        );
    }

    #[test]
    fn list_filters_encode_each_value() {
        let query = StoreQuery::new().in_list("id", &["a b", "c"]).contains("services", "x");
        assert_eq!(query.to_query_string(), "?id=in.(a%20b,c)&services=cs.{x}");
    }

    #[tokio::test]
    async fn select_sends_api_key_and_parses_rows() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/doctors"))
            .and(query_param("id", "eq.d1"))
            .and(header("apikey", "store-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": "d1" }])))
            .mount(&server)
            .await;

        let store = StoreClient::new(&config(&server.uri()));
        let row: Option<Row> = store
            .select_one("doctors", &StoreQuery::new().eq("id", "d1"))
            .await
            .unwrap();
        assert_eq!(row.unwrap().id, "d1");
    }

    #[tokio::test]
    async fn failed_requests_surface_as_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/doctors"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let store = StoreClient::new(&config(&server.uri()));
        let result: Result<Vec<Row>> = store.select("doctors", &StoreQuery::new()).await;
        assert!(result.unwrap_err().to_string().contains("boom"));
    }

    #[tokio::test]
    async fn delete_counts_removed_documents() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/rest/v1/contacts"))
            .and(header("Prefer", "return=representation"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": "c1" }])))
            .mount(&server)
            .await;

        let store = StoreClient::new(&config(&server.uri()));
        let removed = store
            .delete("contacts", &StoreQuery::new().eq("id", "c1"))
            .await
            .unwrap();
        assert_eq!(removed, 1);
    }
}
