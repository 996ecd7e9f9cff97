//! Typed client for the Fintrack cloud backend.
//!
//! Every method is a single request/response call-through to the backend's
//! table API under `/rest/v1`, shaped only by an owning-user filter, a
//! designated ordering column, and column selection. The client holds no
//! session state: callers pass the access token on each call.

use chrono::{Months, NaiveDate, Utc};
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::{ConnectError, Result};
use crate::models::*;

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_LOG_BODY_CHARS: usize = 512;

/// Backend error body. PostgREST sends `{code, message, details, hint}`;
/// the identity endpoints send `{error, error_description}` or `{code, msg}`.
#[derive(Debug, serde::Deserialize)]
struct ApiErrorBody {
    code: Option<serde_json::Value>,
    message: Option<String>,
    msg: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// Client for the Fintrack cloud backend (identity + table API).
#[derive(Debug, Clone)]
pub struct ConnectClient {
    pub(crate) client: reqwest::Client,
    pub(crate) base_url: String,
    pub(crate) api_key: String,
}

impl ConnectClient {
    /// Create a new client for a backend project instance.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The project base URL (e.g., "https://abc.supabase.co")
    /// * `api_key` - The project's publishable API key
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self::with_config(ClientConfig::new(base_url, api_key))
    }

    /// Create a client from an explicit [`ClientConfig`].
    pub fn with_config(config: ClientConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: config.base_url,
            api_key: config.api_key,
        }
    }

    /// Create a client from `FINTRACK_API_URL` / `FINTRACK_PUBLISHABLE_KEY`.
    pub fn from_env() -> Result<Self> {
        Ok(Self::with_config(ClientConfig::from_env()?))
    }

    /// Headers for identity requests that carry no user session.
    pub(crate) fn auth_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let key_value = HeaderValue::from_str(&self.api_key)
            .map_err(|_| ConnectError::auth("Invalid publishable API key format"))?;
        headers.insert("apikey", key_value);
        Ok(headers)
    }

    /// Headers for requests made on behalf of an authenticated user.
    pub(crate) fn headers(&self, token: &str) -> Result<HeaderMap> {
        let mut headers = self.auth_headers()?;
        let auth_value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ConnectError::auth("Invalid access token format"))?;
        headers.insert(AUTHORIZATION, auth_value);
        Ok(headers)
    }

    fn log_response(status: reqwest::StatusCode, body: &str) {
        if status.is_success() {
            debug!("API response status: {}", status);
            return;
        }

        let mut preview = body.chars().take(MAX_LOG_BODY_CHARS).collect::<String>();
        if body.chars().count() > MAX_LOG_BODY_CHARS {
            preview.push_str("...");
        }
        debug!("API response error ({}): {}", status, preview);
    }

    /// Turn a failed response body into an [`ConnectError::Api`], passing the
    /// backend's code and message through untouched.
    pub(crate) fn api_error(status: u16, body: &str) -> ConnectError {
        if let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(body) {
            let code = match parsed.code {
                Some(serde_json::Value::String(code)) => code,
                Some(other) => other.to_string(),
                None => parsed.error.clone().unwrap_or_default(),
            };
            let message = parsed
                .message
                .or(parsed.msg)
                .or(parsed.error_description)
                .or(parsed.error)
                .unwrap_or_else(|| body.to_string());
            return ConnectError::api(status, code, message);
        }
        ConnectError::api(status, "", format!("Request failed: {}", body))
    }

    /// Parse a JSON response body.
    pub(crate) async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;
        Self::log_response(status, &body);

        if !status.is_success() {
            return Err(Self::api_error(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            log::error!("Failed to deserialize response. Body: {}, Error: {}", body, e);
            ConnectError::api(status.as_u16(), "", format!("Failed to parse response: {}", e))
        })
    }

    /// Consume a response whose success body is empty (DELETE, logout).
    pub(crate) async fn parse_empty_response(response: reqwest::Response) -> Result<()> {
        let status = response.status();
        if status.is_success() {
            debug!("API response status: {}", status);
            return Ok(());
        }
        let body = response.text().await?;
        Self::log_response(status, &body);
        Err(Self::api_error(status.as_u16(), &body))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Table API plumbing
    // ─────────────────────────────────────────────────────────────────────────

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    async fn rest_select<T: DeserializeOwned>(
        &self,
        token: &str,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let response = self
            .client
            .get(self.rest_url(table))
            .headers(self.headers(token)?)
            .query(query)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn rest_insert<B: Serialize, T: DeserializeOwned>(
        &self,
        token: &str,
        table: &str,
        record: &B,
    ) -> Result<T> {
        let mut headers = self.headers(token)?;
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        let response = self
            .client
            .post(self.rest_url(table))
            .headers(headers)
            .json(record)
            .send()
            .await?;
        let mut rows: Vec<T> = Self::parse_response(response).await?;
        rows.pop()
            .ok_or_else(|| ConnectError::invalid_request("Insert returned no representation"))
    }

    async fn rest_update<B: Serialize, T: DeserializeOwned>(
        &self,
        token: &str,
        table: &str,
        id: Uuid,
        fields: &B,
    ) -> Result<Option<T>> {
        let mut headers = self.headers(token)?;
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        let response = self
            .client
            .patch(self.rest_url(table))
            .headers(headers)
            .query(&[("id", format!("eq.{}", id))])
            .json(fields)
            .send()
            .await?;
        let mut rows: Vec<T> = Self::parse_response(response).await?;
        Ok(rows.pop())
    }

    async fn rest_delete(&self, token: &str, table: &str, id: Uuid) -> Result<()> {
        let response = self
            .client
            .delete(self.rest_url(table))
            .headers(self.headers(token)?)
            .query(&[("id", format!("eq.{}", id))])
            .send()
            .await?;
        Self::parse_empty_response(response).await
    }

    fn owner_query(user_id: Uuid, order: &str) -> Vec<(&'static str, String)> {
        vec![
            ("user_id", format!("eq.{}", user_id)),
            ("order", order.to_string()),
        ]
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Income
    // ─────────────────────────────────────────────────────────────────────────

    /// All income records owned by `user_id`, newest date first.
    ///
    /// GET /rest/v1/income
    pub async fn list_income(&self, token: &str, user_id: Uuid) -> Result<Vec<Income>> {
        self.rest_select(token, "income", &Self::owner_query(user_id, "date.desc"))
            .await
    }

    /// Insert an income record and return the persisted row.
    ///
    /// POST /rest/v1/income
    pub async fn create_income(&self, token: &str, record: &NewIncome) -> Result<Income> {
        self.rest_insert(token, "income", record).await
    }

    /// Partially update an income record by id. `None` when no row matched.
    ///
    /// PATCH /rest/v1/income?id=eq.{id}
    pub async fn update_income(
        &self,
        token: &str,
        id: Uuid,
        fields: &IncomeUpdate,
    ) -> Result<Option<Income>> {
        self.rest_update(token, "income", id, fields).await
    }

    /// DELETE /rest/v1/income?id=eq.{id}
    pub async fn delete_income(&self, token: &str, id: Uuid) -> Result<()> {
        self.rest_delete(token, "income", id).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expenses
    // ─────────────────────────────────────────────────────────────────────────

    /// All expense records owned by `user_id`, newest date first.
    ///
    /// GET /rest/v1/expenses
    pub async fn list_expenses(&self, token: &str, user_id: Uuid) -> Result<Vec<Expense>> {
        self.rest_select(token, "expenses", &Self::owner_query(user_id, "date.desc"))
            .await
    }

    /// POST /rest/v1/expenses
    pub async fn create_expense(&self, token: &str, record: &NewExpense) -> Result<Expense> {
        self.rest_insert(token, "expenses", record).await
    }

    /// PATCH /rest/v1/expenses?id=eq.{id}
    pub async fn update_expense(
        &self,
        token: &str,
        id: Uuid,
        fields: &ExpenseUpdate,
    ) -> Result<Option<Expense>> {
        self.rest_update(token, "expenses", id, fields).await
    }

    /// DELETE /rest/v1/expenses?id=eq.{id}
    pub async fn delete_expense(&self, token: &str, id: Uuid) -> Result<()> {
        self.rest_delete(token, "expenses", id).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Investments
    // ─────────────────────────────────────────────────────────────────────────

    /// All investment records owned by `user_id`, newest date first.
    ///
    /// GET /rest/v1/investments
    pub async fn list_investments(&self, token: &str, user_id: Uuid) -> Result<Vec<Investment>> {
        self.rest_select(token, "investments", &Self::owner_query(user_id, "date.desc"))
            .await
    }

    /// POST /rest/v1/investments
    pub async fn create_investment(
        &self,
        token: &str,
        record: &NewInvestment,
    ) -> Result<Investment> {
        self.rest_insert(token, "investments", record).await
    }

    /// PATCH /rest/v1/investments?id=eq.{id}
    pub async fn update_investment(
        &self,
        token: &str,
        id: Uuid,
        fields: &InvestmentUpdate,
    ) -> Result<Option<Investment>> {
        self.rest_update(token, "investments", id, fields).await
    }

    /// DELETE /rest/v1/investments?id=eq.{id}
    pub async fn delete_investment(&self, token: &str, id: Uuid) -> Result<()> {
        self.rest_delete(token, "investments", id).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Savings goals
    // ─────────────────────────────────────────────────────────────────────────

    /// All savings goals owned by `user_id`, newest first.
    ///
    /// GET /rest/v1/savings
    pub async fn list_savings_goals(
        &self,
        token: &str,
        user_id: Uuid,
    ) -> Result<Vec<SavingsGoal>> {
        self.rest_select(token, "savings", &Self::owner_query(user_id, "created_at.desc"))
            .await
    }

    /// POST /rest/v1/savings
    pub async fn create_savings_goal(
        &self,
        token: &str,
        record: &NewSavingsGoal,
    ) -> Result<SavingsGoal> {
        self.rest_insert(token, "savings", record).await
    }

    /// PATCH /rest/v1/savings?id=eq.{id}
    pub async fn update_savings_goal(
        &self,
        token: &str,
        id: Uuid,
        fields: &SavingsGoalUpdate,
    ) -> Result<Option<SavingsGoal>> {
        self.rest_update(token, "savings", id, fields).await
    }

    /// DELETE /rest/v1/savings?id=eq.{id}
    pub async fn delete_savings_goal(&self, token: &str, id: Uuid) -> Result<()> {
        self.rest_delete(token, "savings", id).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Budgets
    // ─────────────────────────────────────────────────────────────────────────

    /// All budgets owned by `user_id`, most recent start date first.
    ///
    /// GET /rest/v1/budgets
    pub async fn list_budgets(&self, token: &str, user_id: Uuid) -> Result<Vec<Budget>> {
        self.rest_select(token, "budgets", &Self::owner_query(user_id, "start_date.desc"))
            .await
    }

    /// POST /rest/v1/budgets
    pub async fn create_budget(&self, token: &str, record: &NewBudget) -> Result<Budget> {
        self.rest_insert(token, "budgets", record).await
    }

    /// PATCH /rest/v1/budgets?id=eq.{id}
    pub async fn update_budget(
        &self,
        token: &str,
        id: Uuid,
        fields: &BudgetUpdate,
    ) -> Result<Option<Budget>> {
        self.rest_update(token, "budgets", id, fields).await
    }

    /// DELETE /rest/v1/budgets?id=eq.{id}
    pub async fn delete_budget(&self, token: &str, id: Uuid) -> Result<()> {
        self.rest_delete(token, "budgets", id).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // User profile
    // ─────────────────────────────────────────────────────────────────────────

    /// Fetch the profile row keyed by the user's identity. `None` when the
    /// profile does not exist (not an error).
    ///
    /// GET /rest/v1/user_profiles?id=eq.{userId}
    pub async fn get_user_profile(
        &self,
        token: &str,
        user_id: Uuid,
    ) -> Result<Option<UserProfile>> {
        let query = vec![
            ("id", format!("eq.{}", user_id)),
            ("limit", "1".to_string()),
        ];
        let mut rows: Vec<UserProfile> =
            self.rest_select(token, "user_profiles", &query).await?;
        Ok(rows.pop())
    }

    /// PATCH /rest/v1/user_profiles?id=eq.{userId}
    pub async fn update_user_profile(
        &self,
        token: &str,
        user_id: Uuid,
        fields: &UserProfileUpdate,
    ) -> Result<Option<UserProfile>> {
        self.rest_update(token, "user_profiles", user_id, fields).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Analytics
    // ─────────────────────────────────────────────────────────────────────────

    /// Income and expense amount/date pairs for the trailing six months.
    ///
    /// The two queries are independent and run concurrently; either side may
    /// fail without affecting the other, so each carries its own result.
    ///
    /// GET /rest/v1/income + GET /rest/v1/expenses
    pub async fn monthly_activity(&self, token: &str, user_id: Uuid) -> MonthlyActivity {
        let since = monthly_window_start(Utc::now().date_naive());
        let window_query = vec![
            ("select", "amount,date".to_string()),
            ("user_id", format!("eq.{}", user_id)),
            ("date", format!("gte.{}", since)),
            ("order", "date.desc".to_string()),
        ];

        let (income, expenses) = tokio::join!(
            self.rest_select::<MonthlyPoint>(token, "income", &window_query),
            self.rest_select::<MonthlyPoint>(token, "expenses", &window_query),
        );
        MonthlyActivity { income, expenses }
    }

    /// Category/amount pairs for all of a user's expenses, unaggregated.
    /// Aggregation is left to the caller.
    ///
    /// GET /rest/v1/expenses?select=category,amount
    pub async fn expenses_by_category(
        &self,
        token: &str,
        user_id: Uuid,
    ) -> Result<Vec<CategorySpend>> {
        let query = vec![
            ("select", "category,amount".to_string()),
            ("user_id", format!("eq.{}", user_id)),
        ];
        self.rest_select(token, "expenses", &query).await
    }
}

/// Start of the trailing-six-months window. The boundary date itself is
/// included (sent as a `gte` filter).
fn monthly_window_start(today: NaiveDate) -> NaiveDate {
    today
        .checked_sub_months(Months::new(6))
        .unwrap_or(NaiveDate::MIN)
}
