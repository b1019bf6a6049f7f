//! Job search: a thin pass-through to the JSearch listings API on RapidAPI.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::ids::IdGenerator;

pub mod handlers;

const RAPIDAPI_HOST: &str = "jsearch.p.rapidapi.com";
const REQUEST_TIMEOUT_SECS: u64 = 120;
pub const MAX_NUM_PAGES: u32 = 20;

/// Query parameters accepted by `GET /jobs`, with the listing defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobQuery {
    pub query: String,
    pub page: u32,
    pub num_pages: u32,
    pub country: String,
    pub date_posted: String,
    pub job_requirements: String,
}

impl Default for JobQuery {
    fn default() -> Self {
        Self {
            query: "Software Developer Jobs in USA".to_string(),
            page: 1,
            num_pages: 1,
            country: "us".to_string(),
            date_posted: "today".to_string(),
            job_requirements: "under_3_years_experience".to_string(),
        }
    }
}

impl JobQuery {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.query.trim().is_empty() {
            return Err(AppError::InvalidRequest("query cannot be empty".to_string()));
        }
        if self.page == 0 {
            return Err(AppError::InvalidRequest("page must be at least 1".to_string()));
        }
        if !(1..=MAX_NUM_PAGES).contains(&self.num_pages) {
            return Err(AppError::InvalidRequest(format!(
                "num_pages must be between 1 and {MAX_NUM_PAGES}"
            )));
        }
        Ok(())
    }
}

/// A listing as the provider returns it. Every field may be absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobPosting {
    pub job_id: Option<String>,
    pub job_title: Option<String>,
    pub employer_name: Option<String>,
    pub job_description: Option<String>,
    pub job_city: Option<String>,
    pub job_state: Option<String>,
    pub job_apply_link: Option<String>,
    pub job_employment_type: Option<String>,
    #[serde(alias = "job_min_salary")]
    pub job_salary_min: Option<f64>,
    #[serde(alias = "job_max_salary")]
    pub job_salary_max: Option<f64>,
    pub job_salary_currency: Option<String>,
    pub job_salary_period: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<JobPosting>,
}

/// Job listing returned by `GET /jobs`. `job_id` is always populated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawJob {
    pub job_id: String,
    pub job_title: Option<String>,
    pub employer_name: Option<String>,
    pub job_description: Option<String>,
    pub job_city: Option<String>,
    pub job_state: Option<String>,
    pub job_apply_link: Option<String>,
    pub job_employment_type: Option<String>,
    pub job_salary_min: Option<f64>,
    pub job_salary_max: Option<f64>,
    pub job_salary_currency: Option<String>,
    pub job_salary_period: Option<String>,
}

impl RawJob {
    /// Keeps the provider's id when it sent one, otherwise mints a new one.
    pub fn from_posting(posting: JobPosting, ids: &dyn IdGenerator) -> Self {
        let job_id = posting
            .job_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| ids.next_id());
        Self {
            job_id,
            job_title: posting.job_title,
            employer_name: posting.employer_name,
            job_description: posting.job_description,
            job_city: posting.job_city,
            job_state: posting.job_state,
            job_apply_link: posting.job_apply_link,
            job_employment_type: posting.job_employment_type,
            job_salary_min: posting.job_salary_min,
            job_salary_max: posting.job_salary_max,
            job_salary_currency: posting.job_salary_currency,
            job_salary_period: posting.job_salary_period,
        }
    }
}

/// Source of job listings. Carried in `AppState` as `Arc<dyn JobSource>`.
#[async_trait]
pub trait JobSource: Send + Sync {
    async fn search(&self, query: &JobQuery) -> Result<Vec<JobPosting>, AppError>;
}

pub struct JSearchClient {
    client: Client,
    api_key: Option<String>,
}

impl JSearchClient {
    /// A missing key is not fatal: the first search fails instead.
    pub fn new(api_key: Option<String>) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            api_key,
        })
    }
}

#[async_trait]
impl JobSource for JSearchClient {
    async fn search(&self, query: &JobQuery) -> Result<Vec<JobPosting>, AppError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            AppError::Transport("JSearch API error: RAPIDAPI_KEY is not configured".to_string())
        })?;

        let page = query.page.to_string();
        let num_pages = query.num_pages.to_string();
        let params = [
            ("query", query.query.as_str()),
            ("page", page.as_str()),
            ("num_pages", num_pages.as_str()),
            ("country", query.country.as_str()),
            ("date_posted", query.date_posted.as_str()),
            ("job_requirements", query.job_requirements.as_str()),
        ];

        let response = self
            .client
            .get(format!("https://{RAPIDAPI_HOST}/search"))
            .header("x-rapidapi-host", RAPIDAPI_HOST)
            .header("x-rapidapi-key", api_key)
            .query(&params)
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("JSearch API error: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!("JSearch returned {}: {}", status, message);
            return Err(AppError::Upstream {
                provider: "JSearch",
                status: status.as_u16(),
                message,
            });
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::Transport(format!("JSearch API error: {e}")))?;
        debug!("JSearch returned {} postings", body.data.len());
        Ok(body.data)
    }
}
