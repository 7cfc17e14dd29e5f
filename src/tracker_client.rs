// src/tracker_client.rs

use chrono::NaiveDate;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use url::Url;

// Constants
pub const DEFAULT_BASE_URL: &str = "http://localhost:5004";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// --- Backend API Data Structures ---

/// The four punch slots recorded by the clock endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum RecordType {
    Arrival,
    LunchStart,
    LunchEnd,
    Departure,
}

impl RecordType {
    /// Wire name, also used for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Arrival => "arrival",
            RecordType::LunchStart => "lunch_start",
            RecordType::LunchEnd => "lunch_end",
            RecordType::Departure => "departure",
        }
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single punch event as returned by `GET /time-records`.
/// The timestamp stays a string here; the backend emits naive-UTC isoformat
/// and the aggregator parses it with a raw-string fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeRecord {
    pub id: i64,
    pub employee_id: i64,
    pub employee_name: String,
    pub timestamp: String,
    pub record_type: RecordType,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub cpf: Option<String>,
    pub rg: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub birth_date: Option<String>,
    pub admission_date: Option<String>,
    pub base_salary: Option<f64>,
    // "HH:MM" strings, used server-side for the lateness report
    pub expected_arrival_time: Option<String>,
    pub expected_departure_time: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Body for `POST /employees`. Password is required on create only, so the
/// update body is a separate struct below.
#[derive(Debug, Clone, Serialize)]
pub struct NewEmployee {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpf: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admission_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_salary: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_arrival_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_departure_time: Option<String>,
}

/// Partial body for `PUT /employees/{id}`. Absent fields are left unchanged
/// by the backend.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EmployeeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpf: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admission_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_salary: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_arrival_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_departure_time: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmployeeCreated {
    pub message: String,
    pub employee: EmployeeSummary,
}

/// Row of the server-computed lateness report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatenessRecord {
    pub employee_id: i64,
    pub employee_name: String,
    pub date: String,
    pub check_in_time: String,
    pub expected_check_in: String,
    pub lateness_duration: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialType {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub expected_duration_days: Option<i64>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MaterialTypeInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_duration_days: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Partial body for `PUT /materials/types/{id}`; absent fields are kept.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MaterialTypeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_duration_days: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MaterialTypeCreated {
    pub message: String,
    pub material_type_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialLog {
    pub id: i64,
    pub material_type_id: i64,
    pub material_type_name: String,
    pub employee_id: i64,
    pub employee_name: String,
    pub delivery_date: String,
    pub quantity: i64,
    pub photo_url: Option<String>,
    pub notes: Option<String>,
    pub expected_replacement_date: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MaterialLogInput {
    pub material_type_id: i64,
    pub employee_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MaterialLogCreated {
    pub message: String,
    pub log_id: i64,
}

/// Body for `POST /record` (employee-facing clock endpoint). Geolocation and
/// photo capture happen elsewhere; this just forwards the values.
#[derive(Debug, Clone, Serialize)]
pub struct PunchRequest {
    pub employee_id: i64,
    pub record_type: RecordType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_data: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PunchResponse {
    pub message: String,
    pub time: Option<String>,
}

/// Generic `{"message": "..."}` envelope used by update/delete endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusMessage {
    pub message: String,
}

// --- Query filters ---

#[derive(Debug, Clone, Default)]
pub struct TimeRecordFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub employee_id: Option<i64>,
}

impl TimeRecordFilter {
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(date) = self.start_date {
            query.push(("start_date".to_string(), date.format("%Y-%m-%d").to_string()));
        }
        if let Some(date) = self.end_date {
            query.push(("end_date".to_string(), date.format("%Y-%m-%d").to_string()));
        }
        if let Some(id) = self.employee_id {
            query.push(("employee_id".to_string(), id.to_string()));
        }
        query
    }
}

#[derive(Debug, Clone, Default)]
pub struct MaterialLogFilter {
    pub employee_id: Option<i64>,
    pub material_type_id: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl MaterialLogFilter {
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(id) = self.employee_id {
            query.push(("employee_id".to_string(), id.to_string()));
        }
        if let Some(id) = self.material_type_id {
            query.push(("material_type_id".to_string(), id.to_string()));
        }
        if let Some(date) = self.start_date {
            query.push(("start_date".to_string(), date.format("%Y-%m-%d").to_string()));
        }
        if let Some(date) = self.end_date {
            query.push(("end_date".to_string(), date.format("%Y-%m-%d").to_string()));
        }
        query
    }
}

// --- Error type ---

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("HTTP request failed")]
    Request(#[from] reqwest::Error),

    #[error("JSON processing error")]
    Json(#[from] serde_json::Error),

    #[error("URL parsing error")]
    UrlParse(#[from] url::ParseError),

    #[error("API token not available (set PONTO_API_TOKEN)")]
    MissingToken,

    #[error("Backend API error: Status={status}, Message='{message}'")]
    ApiError { status: StatusCode, message: String },
}

/// Error payload shapes the backend uses: `{"error": "..."}` on most routes,
/// `{"message": "..."}` on the clock routes.
#[derive(Debug, Deserialize)]
struct ApiErrorPayload {
    error: Option<String>,
    message: Option<String>,
}

/// Pulls a human-readable message out of an error body, falling back to the
/// raw body when it is not the known JSON shape.
pub fn extract_error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorPayload>(body) {
        Ok(payload) => payload
            .error
            .or(payload.message)
            .unwrap_or_else(|| body.to_string()),
        Err(_) => body.to_string(),
    }
}

// --- Configuration ---

/// Session context for the backend. Built once at startup from the
/// environment and owned by the client; nothing reads ambient token state
/// after that.
#[derive(Clone, Debug)]
pub struct TrackerConfig {
    pub base_url: String,
    pub token: String,
    pub timeout_secs: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: String::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

// --- Client Implementation ---

#[derive(Clone)]
pub struct TrackerClient {
    config: Arc<TrackerConfig>,
    http_client: Client,
}

impl TrackerClient {
    pub fn new(config: TrackerConfig) -> Result<Self, TrackerError> {
        if config.token.trim().is_empty() {
            return Err(TrackerError::MissingToken);
        }

        // Validate the base URL up front so a bad PONTO_API_URL fails here
        // and not on the first request.
        Url::parse(&config.base_url)?;

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?; // Maps to TrackerError::Request

        Ok(Self {
            config: Arc::new(config),
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn build_request(&self, method: Method, endpoint: &str) -> Result<RequestBuilder, TrackerError> {
        let base = self.config.base_url.trim_end_matches('/');
        let url = if endpoint.starts_with('/') {
            format!("{}{}", base, endpoint)
        } else {
            format!("{}/{}", base, endpoint)
        };

        // Validate the final URL - url::ParseError maps via #[from]
        Url::parse(&url)?;

        Ok(self
            .http_client
            .request(method, &url)
            .header(AUTHORIZATION, format!("Bearer {}", self.config.token))
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json"))
    }

    async fn send_and_deserialize<T: DeserializeOwned>(
        &self,
        request_builder: RequestBuilder,
        context_msg: &str,
    ) -> Result<T, TrackerError> {
        let request = match request_builder.build() {
            Ok(req) => req,
            Err(e) => {
                error!("Request build failed for '{}': {}", context_msg, e);
                return Err(TrackerError::Request(e));
            }
        };
        let request_url = request.url().to_string();
        debug!("Sending request for '{}' to URL: {}", context_msg, request_url);

        let response = self.http_client.execute(request).await?;
        let status = response.status();
        debug!(
            "Received response for '{}' (URL: {}): Status={}",
            context_msg, request_url, status
        );

        if status.is_success() {
            let bytes = response.bytes().await?;
            match std::str::from_utf8(&bytes) {
                Ok(text) => debug!("Raw response body for '{}': {}", context_msg, text),
                Err(_) => {
                    // Log hex so a broken body is still inspectable
                    warn!("Response body for '{}' is not valid UTF-8", context_msg);
                    debug!(
                        "Raw response body (hex) for '{}': {}",
                        context_msg,
                        hex::encode(&bytes)
                    );
                }
            }
            match serde_json::from_slice::<T>(&bytes) {
                Ok(data) => Ok(data),
                Err(e) => {
                    error!(
                        "JSON deserialization failed for '{}' (URL: {}): {}",
                        context_msg, request_url, e
                    );
                    Err(TrackerError::Json(e))
                }
            }
        } else {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("Failed to read error body: {}", e));
            error!(
                "API error response: Status={}, Body='{}' for URL: {}",
                status, error_body, request_url
            );
            Err(TrackerError::ApiError {
                status,
                message: extract_error_message(&error_body),
            })
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(String, String)],
        context_msg: &str,
    ) -> Result<T, TrackerError> {
        let mut request = self.build_request(Method::GET, endpoint)?;
        if !query.is_empty() {
            request = request.query(query);
        }
        self.send_and_deserialize(request, context_msg).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
        context_msg: &str,
    ) -> Result<T, TrackerError> {
        let request = self.build_request(Method::POST, endpoint)?.json(body);
        self.send_and_deserialize(request, context_msg).await
    }

    async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
        context_msg: &str,
    ) -> Result<T, TrackerError> {
        let request = self.build_request(Method::PUT, endpoint)?.json(body);
        self.send_and_deserialize(request, context_msg).await
    }

    async fn delete<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        context_msg: &str,
    ) -> Result<T, TrackerError> {
        let request = self.build_request(Method::DELETE, endpoint)?;
        self.send_and_deserialize(request, context_msg).await
    }

    // --- Employees ---

    pub async fn list_employees(&self) -> Result<Vec<Employee>, TrackerError> {
        self.get("/employees", &[], "List Employees").await
    }

    pub async fn get_employee(&self, employee_id: i64) -> Result<Employee, TrackerError> {
        let endpoint = format!("/employees/{}", employee_id);
        self.get(&endpoint, &[], "Get Employee").await
    }

    pub async fn create_employee(&self, employee: &NewEmployee) -> Result<EmployeeCreated, TrackerError> {
        self.post("/employees", employee, "Create Employee").await
    }

    pub async fn update_employee(
        &self,
        employee_id: i64,
        update: &EmployeeUpdate,
    ) -> Result<StatusMessage, TrackerError> {
        let endpoint = format!("/employees/{}", employee_id);
        self.put(&endpoint, update, "Update Employee").await
    }

    pub async fn delete_employee(&self, employee_id: i64) -> Result<StatusMessage, TrackerError> {
        let endpoint = format!("/employees/{}", employee_id);
        self.delete(&endpoint, "Delete Employee").await
    }

    // --- Time records ---

    pub async fn get_time_records(
        &self,
        filter: &TimeRecordFilter,
    ) -> Result<Vec<TimeRecord>, TrackerError> {
        self.get("/time-records", &filter.to_query(), "Get Time Records")
            .await
    }

    // --- Lateness report ---

    pub async fn get_lateness_report(
        &self,
        filter: &TimeRecordFilter,
    ) -> Result<Vec<LatenessRecord>, TrackerError> {
        self.get("/reports/lateness", &filter.to_query(), "Get Lateness Report")
            .await
    }

    /// Downloads the lateness report as raw PDF bytes. The caller decides
    /// where to save them.
    pub async fn download_lateness_pdf(
        &self,
        filter: &TimeRecordFilter,
    ) -> Result<Vec<u8>, TrackerError> {
        let mut request = self.build_request(Method::GET, "/reports/lateness/pdf")?;
        let query = filter.to_query();
        if !query.is_empty() {
            request = request.query(&query);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            let bytes = response.bytes().await?;
            info!("Downloaded lateness PDF ({} bytes)", bytes.len());
            Ok(bytes.to_vec())
        } else {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("Failed to read error body: {}", e));
            error!(
                "PDF download failed: Status={}, Body='{}'",
                status, error_body
            );
            Err(TrackerError::ApiError {
                status,
                message: extract_error_message(&error_body),
            })
        }
    }

    // --- Materials ---

    pub async fn list_material_types(&self) -> Result<Vec<MaterialType>, TrackerError> {
        self.get("/materials/types", &[], "List Material Types").await
    }

    pub async fn create_material_type(
        &self,
        input: &MaterialTypeInput,
    ) -> Result<MaterialTypeCreated, TrackerError> {
        self.post("/materials/types", input, "Create Material Type")
            .await
    }

    pub async fn update_material_type(
        &self,
        type_id: i64,
        update: &MaterialTypeUpdate,
    ) -> Result<StatusMessage, TrackerError> {
        let endpoint = format!("/materials/types/{}", type_id);
        self.put(&endpoint, update, "Update Material Type").await
    }

    pub async fn delete_material_type(&self, type_id: i64) -> Result<StatusMessage, TrackerError> {
        let endpoint = format!("/materials/types/{}", type_id);
        self.delete(&endpoint, "Delete Material Type").await
    }

    pub async fn list_material_logs(
        &self,
        filter: &MaterialLogFilter,
    ) -> Result<Vec<MaterialLog>, TrackerError> {
        self.get("/materials/logs", &filter.to_query(), "List Material Logs")
            .await
    }

    pub async fn log_material_delivery(
        &self,
        input: &MaterialLogInput,
    ) -> Result<MaterialLogCreated, TrackerError> {
        self.post("/materials/logs", input, "Log Material Delivery")
            .await
    }

    // --- Clock endpoint ---

    pub async fn submit_punch(&self, punch: &PunchRequest) -> Result<PunchResponse, TrackerError> {
        self.post("/record", punch, "Submit Punch").await
    }
}
