//! HTTP client for vendor server API calls

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use shared::{ApiResponse, Kit, Order, OrderCreate, OrderStatus};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// HTTP client for making requests to the vendor server
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        if config.base_url.trim().is_empty() {
            return Err(ClientError::Config("base_url is empty".into()));
        }

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()
            .map_err(ClientError::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Make a GET request
    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.client.get(self.url(path)).send().await?;
        Self::handle_response(response).await
    }

    /// Make a POST request with JSON body
    async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        Self::handle_response(response).await
    }

    /// Make a PUT request with JSON body
    async fn put<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let response = self.client.put(self.url(path)).json(body).send().await?;
        Self::handle_response(response).await
    }

    /// Handle the HTTP response
    ///
    /// 错误响应体是 `ApiResponse` 信封，从中提取人类可读的消息。
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiResponse<()>>(&text)
                .map(|envelope| envelope.message)
                .unwrap_or(text);

            return match status {
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(message)),
                StatusCode::CONFLICT => Err(ClientError::Conflict(message)),
                StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                    Err(ClientError::Validation(message))
                }
                _ => Err(ClientError::Internal(message)),
            };
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    // ========== Catalog API ==========

    /// Fetch active kits (catalog load)
    pub async fn list_kits(&self) -> ClientResult<Vec<Kit>> {
        self.get("/api/kits").await
    }

    // ========== Order API ==========

    /// Fetch all orders, window_start ascending
    pub async fn list_orders(&self) -> ClientResult<Vec<Order>> {
        self.get("/api/orders").await
    }

    /// Fetch one order by id
    pub async fn get_order(&self, id: &str) -> ClientResult<Order> {
        self.get(&format!("/api/orders/{id}")).await
    }

    /// Fetch the next sequential invoice number
    ///
    /// 读后写分配的"读"半步：返回 max + 1 (无订单时为 1)。
    pub async fn next_invoice_number(&self) -> ClientResult<i64> {
        #[derive(serde::Deserialize)]
        struct NextInvoiceResponse {
            next_invoice_number: i64,
        }

        let resp: NextInvoiceResponse = self.get("/api/orders/next-invoice").await?;
        Ok(resp.next_invoice_number)
    }

    /// Submit an order (single attempt, no retry, no idempotency key)
    pub async fn create_order(&self, order: &OrderCreate) -> ClientResult<Order> {
        self.post("/api/orders", order).await
    }

    /// Update order status (e.g. mark delivered)
    pub async fn update_order_status(
        &self,
        id: &str,
        status: OrderStatus,
    ) -> ClientResult<Order> {
        #[derive(serde::Serialize)]
        struct UpdateStatusRequest {
            status: OrderStatus,
        }

        self.put(&format!("/api/orders/{id}/status"), &UpdateStatusRequest { status })
            .await
    }
}
