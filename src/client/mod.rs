//! REST access to the CRM backend.
//!
//! Four collaborators sit behind [`CrmBackend`]: the stage lookup, the record
//! list, the user list (owner filter) and the per-record update. [`CrmClient`]
//! implements them over HTTP. Credentials are never read from ambient state:
//! every call receives a [`RequestContext`].

pub mod envelope;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use serde_json::Value;
use tracing::{debug, instrument};

use crm_common::{Module, OwnerOption, Record, Stage};

use crate::errors::ClientError;
use envelope::{Envelope, owners_from_list, records_from_list, stages_from_lookup};

const LEAD_STATUSES_PATH: &str = "/EnumLookup/LeadStatuses";
const OPPORTUNITY_STAGES_PATH: &str = "/EnumLookup/OpportunityStages";
const LEADS_PATH: &str = "/Leads/GetCRMLeads";
const OPPORTUNITIES_PATH: &str = "/CRMOpportunities/GetCRMOpportunities";
const USERS_PATH: &str = "/User/GetAllUser";
const UPDATE_LEAD_PATH: &str = "/Leads/UpdateLead";
const UPDATE_OPPORTUNITY_PATH: &str = "/CRMOpportunities/UpdateCRMOpportunity";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub fn stages_path(module: Module) -> &'static str {
    match module {
        Module::Leads => LEAD_STATUSES_PATH,
        Module::Opportunities => OPPORTUNITY_STAGES_PATH,
    }
}

pub fn records_path(module: Module) -> &'static str {
    match module {
        Module::Leads => LEADS_PATH,
        Module::Opportunities => OPPORTUNITIES_PATH,
    }
}

pub fn update_path(module: Module) -> &'static str {
    match module {
        Module::Leads => UPDATE_LEAD_PATH,
        Module::Opportunities => UPDATE_OPPORTUNITY_PATH,
    }
}

pub fn owners_path() -> &'static str {
    USERS_PATH
}

/// Per-call credentials.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    token: Option<String>,
}

impl RequestContext {
    /// No credentials; requests go out without an `Authorization` header.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Blank tokens are treated as absent.
    pub fn with_token(token: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            token: (!token.trim().is_empty()).then_some(token),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[async_trait]
pub trait CrmBackend: Send + Sync {
    async fn fetch_stages(&self, ctx: &RequestContext, module: Module) -> Result<Vec<Stage>, ClientError>;

    async fn fetch_records(&self, ctx: &RequestContext, module: Module) -> Result<Vec<Record>, ClientError>;

    async fn fetch_owners(&self, ctx: &RequestContext) -> Result<Vec<OwnerOption>, ClientError>;

    /// Push a full record (PascalCase payload) to the module's update endpoint.
    async fn update_record(&self, ctx: &RequestContext, module: Module, payload: &Value) -> Result<(), ClientError>;
}

/// HTTP implementation of [`CrmBackend`].
#[derive(Clone)]
pub struct CrmClient {
    base_url: String,
    client: reqwest::Client,
}

impl CrmClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("crm-board/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ClientError::Build)?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_envelope(&self, ctx: &RequestContext, path: &str) -> Result<(String, Envelope), ClientError> {
        let url = self.url(path);
        let response = ctx
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.clone(),
                source,
            })?;
        let response = check_status(&url, response).await?;
        let body: Value = response.json().await.map_err(|e| ClientError::Malformed {
            url: url.clone(),
            message: format!("invalid JSON body: {}", e),
        })?;
        Ok((url, Envelope::from(body)))
    }
}

async fn check_status(url: &str, response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    Err(ClientError::Status {
        url: url.to_string(),
        status: status.as_u16(),
        body: response.text().await.unwrap_or_default(),
    })
}

#[async_trait]
impl CrmBackend for CrmClient {
    #[instrument(skip(self, ctx))]
    async fn fetch_stages(&self, ctx: &RequestContext, module: Module) -> Result<Vec<Stage>, ClientError> {
        let (url, envelope) = self.get_envelope(ctx, stages_path(module)).await?;
        let stages = stages_from_lookup(envelope, &url)?;
        debug!(count = stages.len(), "fetched stages");
        Ok(stages)
    }

    #[instrument(skip(self, ctx))]
    async fn fetch_records(&self, ctx: &RequestContext, module: Module) -> Result<Vec<Record>, ClientError> {
        let (url, envelope) = self.get_envelope(ctx, records_path(module)).await?;
        let records = records_from_list(envelope, &url)?;
        debug!(count = records.len(), "fetched records");
        Ok(records)
    }

    #[instrument(skip(self, ctx))]
    async fn fetch_owners(&self, ctx: &RequestContext) -> Result<Vec<OwnerOption>, ClientError> {
        let (url, envelope) = self.get_envelope(ctx, owners_path()).await?;
        let owners = owners_from_list(envelope, &url)?;
        debug!(count = owners.len(), "fetched owners");
        Ok(owners)
    }

    #[instrument(skip(self, ctx, payload))]
    async fn update_record(&self, ctx: &RequestContext, module: Module, payload: &Value) -> Result<(), ClientError> {
        let url = self.url(update_path(module));
        let response = ctx
            .authorize(self.client.post(&url))
            .json(payload)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.clone(),
                source,
            })?;
        check_status(&url, response).await?;
        debug!("record updated");
        Ok(())
    }
}
