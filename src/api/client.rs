use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client as HttpClient, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use super::models::{ApiError, ApiReply};
use crate::config::ApiConfig;
use crate::logger::Logger;

/// HTTP client for the Goodbudget REST API.
///
/// Every request carries the bearer token and is logged before dispatch;
/// every response is logged with its status and body. Logging never
/// changes the outcome: non-2xx responses come back as
/// [`ApiError::Status`] for the caller to inspect.
pub struct ApiClient {
    http_client: HttpClient,
    base_url: String,
    logger: Logger,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http_client = HttpClient::builder()
            .default_headers(Self::create_headers(&config.auth_token)?)
            .timeout(config.timeout)
            .build()
            .map_err(ApiError::Build)?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            logger: Logger::util("ApiClient"),
        })
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    fn create_headers(auth_token: &str) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut auth_value = HeaderValue::from_str(&format!("Bearer {}", auth_token))?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);
        Ok(headers)
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<ApiReply<T>, ApiError> {
        self.send(Method::GET, path, params, None).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<ApiReply<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body).map_err(ApiError::Encode)?;
        self.send(Method::POST, path, &[], Some(body)).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<ApiReply<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body).map_err(ApiError::Encode)?;
        self.send(Method::PUT, path, &[], Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<ApiReply<T>, ApiError> {
        self.send(Method::DELETE, path, &[], None).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, &str)],
        body: Option<Value>,
    ) -> Result<ApiReply<T>, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let query: serde_json::Map<String, Value> = params
            .iter()
            .map(|(key, value)| (key.to_string(), Value::String(value.to_string())))
            .collect();
        self.logger.info(
            format!("🚀 {} {}", method, path),
            Some(json!({ "data": body, "params": query })),
        );

        let mut request = self.http_client.request(method.clone(), &url);
        if !params.is_empty() {
            request = request.query(params);
        }
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                self.logger.error(format!("Request error: {}", e), None);
                return Err(ApiError::Request(e));
            }
        };

        let status = response.status().as_u16();
        let text = response.text().await.map_err(ApiError::Request)?;
        let data = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or_else(|_| Value::String(text))
        };

        if !response_ok(status) {
            self.logger.error(
                format!("❌ {} {}", status, path),
                Some(json!({ "error": data })),
            );
            return Err(ApiError::Status {
                method: method.to_string(),
                url,
                status,
                body: data,
            });
        }

        self.logger
            .info(format!("✅ {} {}", status, path), Some(json!({ "data": data })));
        let data = serde_json::from_value(data).map_err(|source| ApiError::Decode { url, source })?;
        Ok(ApiReply { status, data })
    }
}

fn response_ok(status: u16) -> bool {
    (200..300).contains(&status)
}
