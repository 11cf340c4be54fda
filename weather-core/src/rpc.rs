use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;
use crate::model::WeatherSnapshot;
use crate::status::{Code, Status};

/// Metadata key carrying the shared-secret credential on every call.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Route of the `GetCurrentWeather` RPC.
pub const GET_CURRENT_PATH: &str = "/rpc/weather/get-current";

/// Route of the `GetWeatherHistory` RPC.
pub const GET_HISTORY_PATH: &str = "/rpc/weather/get-history";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetCurrentWeatherRequest {
    pub city: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetCurrentWeatherResponse {
    pub snapshot: WeatherSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetWeatherHistoryRequest {
    pub city: String,
    pub from_ms: i64,
    pub to_ms: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetWeatherHistoryResponse {
    pub series: Vec<WeatherSnapshot>,
}

/// Caller-side view of the weather RPC service. The gateway and the CLI
/// talk through this trait so tests can substitute a stub.
#[async_trait]
pub trait WeatherRpc: Send + Sync {
    async fn get_current_weather(&self, city: &str) -> Result<WeatherSnapshot, Status>;

    async fn get_weather_history(
        &self,
        city: &str,
        from_ms: i64,
        to_ms: i64,
    ) -> Result<Vec<WeatherSnapshot>, Status>;
}

/// HTTP client for the RPC surface. Attaches the `x-api-key` credential and
/// a call-level deadline to every request; a tripped deadline surfaces as
/// DEADLINE_EXCEEDED, any other transport failure as UNAVAILABLE, and a
/// non-success reply as the `Status` decoded from its body.
#[derive(Debug, Clone)]
pub struct RpcHttpClient {
    base: String,
    api_key: String,
    deadline: Duration,
    http: reqwest::Client,
}

impl RpcHttpClient {
    const DEFAULT_DEADLINE: Duration = Duration::from_secs(10);

    pub fn new(config: &ClientConfig) -> Self {
        Self {
            base: config.rpc_addr.trim_end_matches('/').to_string(),
            api_key: config.service_api_key.clone(),
            deadline: Self::DEFAULT_DEADLINE,
            http: reqwest::Client::new(),
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    async fn call<Req, Resp>(&self, path: &str, request: &Req) -> Result<Resp, Status>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let res = self
            .http
            .post(format!("{}{}", self.base, path))
            .header(API_KEY_HEADER, &self.api_key)
            .timeout(self.deadline)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Status::deadline_exceeded("RPC deadline exceeded")
                } else {
                    Status::unavailable(format!("RPC transport failure: {e}"))
                }
            })?;

        let http_status = res.status();
        if http_status.is_success() {
            res.json::<Resp>()
                .await
                .map_err(|e| Status::internal(format!("malformed RPC response: {e}")))
        } else {
            let status = res.json::<Status>().await.unwrap_or_else(|_| {
                Status::new(Code::Unknown, format!("RPC failed with HTTP {http_status}"))
            });
            Err(status)
        }
    }
}

#[async_trait]
impl WeatherRpc for RpcHttpClient {
    async fn get_current_weather(&self, city: &str) -> Result<WeatherSnapshot, Status> {
        let response: GetCurrentWeatherResponse = self
            .call(
                GET_CURRENT_PATH,
                &GetCurrentWeatherRequest { city: city.to_string() },
            )
            .await?;
        Ok(response.snapshot)
    }

    async fn get_weather_history(
        &self,
        city: &str,
        from_ms: i64,
        to_ms: i64,
    ) -> Result<Vec<WeatherSnapshot>, Status> {
        let response: GetWeatherHistoryResponse = self
            .call(
                GET_HISTORY_PATH,
                &GetWeatherHistoryRequest {
                    city: city.to_string(),
                    from_ms,
                    to_ms,
                },
            )
            .await?;
        Ok(response.series)
    }
}
