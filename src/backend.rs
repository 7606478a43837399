use crate::config::Config;
use crate::errors::AppError;
use crate::footfall::FootfallDistribution;
use crate::models::{DashboardRequest, DateRange, TimeSlot};
use crate::range::format_date;
use reqwest::{Client, RequestBuilder, Response, header};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;

/// The analytics backend the dashboard reads from.
pub trait Backend: Send + Sync {
    fn time_slots(&self, range: DateRange) -> impl Future<Output = Result<Vec<TimeSlot>, AppError>> + Send;

    fn dashboard(&self, request: &DashboardRequest) -> impl Future<Output = Result<Value, AppError>> + Send;

    fn cameras(&self) -> impl Future<Output = Result<Vec<String>, AppError>> + Send;

    fn footfall_distribution(&self) -> impl Future<Output = Result<FootfallDistribution, AppError>> + Send;
}

#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let mut headers = header::HeaderMap::new();
        if let Some(cookie) = &config.session_cookie {
            let value = header::HeaderValue::from_str(cookie)
                .map_err(|err| AppError::validation(format!("invalid session cookie: {err}")))?;
            headers.insert(header::COOKIE, value);
        }

        let client = Client::builder()
            .timeout(config.backend_timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.backend_url.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn fetch_json<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T, AppError> {
        let response = request.send().await?;
        let response = ensure_success(response, what)?;
        Ok(response.json().await?)
    }
}

fn ensure_success(response: Response, what: &str) -> Result<Response, AppError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(AppError::network(format!("{what} returned {status}")))
    }
}

impl Backend for HttpBackend {
    async fn time_slots(&self, range: DateRange) -> Result<Vec<TimeSlot>, AppError> {
        let request = self.client.get(self.url("/api/alltime")).query(&[
            ("date_start", format_date(range.start)),
            ("date_end", format_date(range.end)),
        ]);
        self.fetch_json(request, "time slot lookup").await
    }

    async fn dashboard(&self, request: &DashboardRequest) -> Result<Value, AppError> {
        let request = self.client.post(self.url("/api/dashboard")).json(request);
        self.fetch_json(request, "dashboard lookup").await
    }

    async fn cameras(&self) -> Result<Vec<String>, AppError> {
        let request = self.client.get(self.url("/api/cameras"));
        self.fetch_json(request, "camera lookup").await
    }

    async fn footfall_distribution(&self) -> Result<FootfallDistribution, AppError> {
        let request = self.client.get(self.url("/api/footfall-distribution"));
        self.fetch_json(request, "footfall distribution lookup").await
    }
}
