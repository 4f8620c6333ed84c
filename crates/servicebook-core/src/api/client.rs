//! API client for the service book REST API.
//!
//! Every call goes through [`ApiClient::send`], which decorates the request
//! from the current session and recovers once from an expired access token.

use std::collections::HashSet;
use std::sync::Arc;

use reqwest::{Method, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::policy::{auth_headers, RefreshPolicy};
use super::transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
use super::ApiError;
use crate::auth::{Role, SessionStore};
use crate::config::Config;
use crate::models::{
    Complaint, ComplaintDraft, ComplaintFilter, Identity, Listing, Machine, MachineFilter,
    Maintenance, MaintenanceDraft, MaintenanceFilter, PublicMachine, Reference, UserRef,
};
use crate::utils::cmp_ignore_case;

// ============================================================================
// Constants
// ============================================================================

const TOKEN_CREATE_PATH: &str = "/api/auth/jwt/create/";
const TOKEN_REFRESH_PATH: &str = "/api/auth/jwt/refresh/";

/// Profile endpoint returning the identity and its groups
pub const DEFAULT_PROFILE_PATH: &str = "/api/auth/me/";

const MACHINES_PATH: &str = "/api/machines/";
const MAINTENANCE_PATH: &str = "/api/maintenance/";
const COMPLAINTS_PATH: &str = "/api/complaints/";
const REFERENCES_PATH: &str = "/api/references/";
const PUBLIC_LOOKUP_PATH: &str = "/api/public/machine-by-serial/";

/// Page size requested for directory listings.
const REFERENCE_PAGE_SIZE: u32 = 100;

/// Upper bound on pages followed for one directory, in case the server
/// keeps handing out `next` links.
const MAX_REFERENCE_PAGES: usize = 50;

/// Page size used when scanning machines for their service companies.
const SERVICE_COMPANY_SCAN_SIZE: u32 = 1000;

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenPair {
    access: String,
    refresh: String,
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Debug, Deserialize)]
struct RefreshedToken {
    access: String,
}

/// API client for the service book backend.
/// Clone is cheap - the transport, session and refresh gate are shared.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    session: Arc<SessionStore>,
    policy: RefreshPolicy,
    profile_path: String,
    /// Serialises refresh exchanges across concurrent calls
    refresh_gate: Arc<Mutex<()>>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, session: Arc<SessionStore>) -> Self {
        Self {
            transport,
            session,
            policy: RefreshPolicy::default(),
            profile_path: DEFAULT_PROFILE_PATH.to_string(),
            refresh_gate: Arc::new(Mutex::new(())),
        }
    }

    /// Client over HTTP for the configured backend
    pub fn from_config(config: &Config, session: Arc<SessionStore>) -> Result<Self, ApiError> {
        let transport = HttpTransport::new(&config.api_url)?;
        Ok(Self::new(Arc::new(transport), session).with_profile_path(config.profile_path.clone()))
    }

    pub fn with_policy(mut self, policy: RefreshPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_profile_path(mut self, path: impl Into<String>) -> Self {
        self.profile_path = path.into();
        self
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    // ===== Request pipeline =====

    /// Perform one logical call.
    ///
    /// A 401 is answered by exchanging the refresh token and retrying with
    /// the new access token, at most `policy.max_refreshes` times for this
    /// call. If the exchange fails the original 401 is returned. The
    /// session is never cleared here.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let mut refreshes = 0;

        loop {
            let snapshot = self.session.snapshot()?;
            let mut outbound = request.clone();
            outbound.headers.extend(auth_headers(&snapshot)?);

            let response = self.transport.send(&outbound).await?;
            if response.is_success() {
                return Ok(response);
            }

            if self
                .policy
                .should_refresh(response.status, refreshes, snapshot.has_refresh_token())
            {
                refreshes += 1;
                debug!(
                    method = %request.method,
                    path = %request.path,
                    "Access token rejected, refreshing"
                );
                match self
                    .refresh_access_token(snapshot.access_token.as_deref())
                    .await
                {
                    Ok(()) => continue,
                    Err(e) => {
                        warn!(path = %request.path, error = %e, "Token refresh failed");
                    }
                }
            }

            debug!(
                method = %request.method,
                path = %request.path,
                status = %response.status,
                "Request failed"
            );
            return Err(response.into_error());
        }
    }

    /// Exchange the refresh token for a new access token and store it.
    ///
    /// `failed_with` is the access token the caller was rejected with. If
    /// the stored token differs by the time the gate is acquired, another
    /// call already refreshed and no exchange is made.
    async fn refresh_access_token(&self, failed_with: Option<&str>) -> Result<(), ApiError> {
        let _gate = self.refresh_gate.lock().await;

        let snapshot = self.session.snapshot()?;
        if snapshot.is_authenticated() && snapshot.access_token.as_deref() != failed_with {
            debug!("Access token already refreshed by a concurrent call");
            return Ok(());
        }

        let refresh = snapshot
            .refresh_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::InvalidRequest("No refresh token stored".to_string()))?;

        let request =
            ApiRequest::post(TOKEN_REFRESH_PATH).json(&RefreshRequest { refresh: &refresh })?;
        let response = self.transport.send(&request).await?;
        if !response.is_success() {
            return Err(response.into_error());
        }

        let token: RefreshedToken = response.json()?;
        self.session.set_access_token(&token.access)?;
        info!("Access token refreshed");
        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        self.send(request).await?.json()
    }

    /// Fetch a list endpoint, accepting either a bare array or one page
    async fn list<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<Vec<T>, ApiError> {
        let listing: Listing<T> = self.get_json(request).await?;
        Ok(listing.into_items())
    }

    // ===== Account =====

    /// Exchange username and password for a token pair, store it, and
    /// select the identity's preferred role.
    ///
    /// The token request bypasses the refresh policy: a 401 here means the
    /// credentials were rejected. If the profile lookup fails afterwards the
    /// error is returned and the stored tokens are kept.
    pub async fn login(&self, username: &str, password: &str) -> Result<Identity, ApiError> {
        let request =
            ApiRequest::post(TOKEN_CREATE_PATH).json(&TokenRequest { username, password })?;
        let response = self.transport.send(&request).await?;
        if !response.is_success() {
            warn!(username = username, status = %response.status, "Login rejected");
            return Err(response.into_error());
        }

        let tokens: TokenPair = response.json()?;
        self.session
            .set_credentials(&tokens.access, &tokens.refresh, username)?;

        let identity = self.me().await?;
        let role = identity.preferred_role();
        if let Some(role) = role {
            self.session.set_active_role(role)?;
        }
        info!(username = username, role = ?role, "Logged in");
        Ok(identity)
    }

    /// Forget every stored credential
    pub fn logout(&self) -> Result<(), ApiError> {
        self.session.clear()?;
        Ok(())
    }

    /// Fetch the authenticated identity
    pub async fn me(&self) -> Result<Identity, ApiError> {
        self.get_json(ApiRequest::get(self.profile_path.clone())).await
    }

    /// Select a role the identity holds
    pub async fn switch_role(&self, role: Role) -> Result<Identity, ApiError> {
        let identity = self.me().await?;
        if !identity.holds(role) {
            return Err(ApiError::RoleNotGranted(role));
        }
        self.session.set_active_role(role)?;
        Ok(identity)
    }

    /// Fetch the identity and, when no role is stored yet, select its
    /// preferred one. Returns the identity and the role now in effect.
    pub async fn ensure_active_role(&self) -> Result<(Identity, Option<Role>), ApiError> {
        let identity = self.me().await?;
        let mut role = self.session.snapshot()?.active_role;
        if role.is_none() {
            role = identity.preferred_role();
            if let Some(role) = role {
                self.session.set_active_role(role)?;
            }
        }
        Ok((identity, role))
    }

    // ===== Machines =====

    /// Public lookup of one machine by exact serial number
    pub async fn lookup_machine(&self, serial: &str) -> Result<PublicMachine, ApiError> {
        let serial = serial.trim();
        if serial.is_empty() {
            return Err(ApiError::InvalidRequest("Serial number is required".to_string()));
        }
        self.get_json(ApiRequest::get(PUBLIC_LOOKUP_PATH).query("serial", serial))
            .await
    }

    /// Machines visible to the session, newest shipment first
    pub async fn list_machines(&self, filter: &MachineFilter) -> Result<Vec<Machine>, ApiError> {
        let request = ApiRequest::get(MACHINES_PATH)
            .query("ordering", "-shipment_date")
            .query_pairs(filter.params());
        self.list(request).await
    }

    pub async fn get_machine(&self, id: i64) -> Result<Machine, ApiError> {
        self.get_json(ApiRequest::get(format!("{}{}/", MACHINES_PATH, id)))
            .await
    }

    /// Maintenance records and complaints of one machine, fetched together.
    ///
    /// The backend matches the serial as a substring for maintenance and
    /// ignores it for complaints, so both lists are narrowed to records
    /// whose `machine` is this one.
    pub async fn machine_records(
        &self,
        machine: &Machine,
    ) -> Result<(Vec<Maintenance>, Vec<Complaint>), ApiError> {
        let maintenance_filter = MaintenanceFilter {
            machine_serial: Some(machine.serial_number.clone()),
            ..Default::default()
        };
        let complaint_filter = ComplaintFilter {
            machine_serial: Some(machine.serial_number.clone()),
            ..Default::default()
        };
        let (mut maintenance, mut complaints) = futures::try_join!(
            self.list_maintenance(&maintenance_filter),
            self.list_complaints(&complaint_filter),
        )?;

        maintenance.retain(|record| record.machine == machine.id);
        complaints.retain(|record| record.machine == machine.id);
        Ok((maintenance, complaints))
    }

    /// Distinct service companies across the visible machines, by name
    pub async fn service_companies(&self) -> Result<Vec<UserRef>, ApiError> {
        let machines: Vec<Machine> = self
            .list(ApiRequest::get(MACHINES_PATH).query("page_size", SERVICE_COMPANY_SCAN_SIZE))
            .await?;
        Ok(distinct_service_companies(machines))
    }

    // ===== Maintenance =====

    /// Maintenance records visible to the session, most recent first
    pub async fn list_maintenance(
        &self,
        filter: &MaintenanceFilter,
    ) -> Result<Vec<Maintenance>, ApiError> {
        let request = ApiRequest::get(MAINTENANCE_PATH)
            .query("ordering", "-performed_date")
            .query_pairs(filter.params());
        self.list(request).await
    }

    pub async fn get_maintenance(&self, id: i64) -> Result<Maintenance, ApiError> {
        self.get_json(ApiRequest::get(format!("{}{}/", MAINTENANCE_PATH, id)))
            .await
    }

    pub async fn create_maintenance(
        &self,
        draft: &MaintenanceDraft,
    ) -> Result<Maintenance, ApiError> {
        let request = ApiRequest::new(Method::POST, MAINTENANCE_PATH).json(draft)?;
        self.get_json(request).await
    }

    // ===== Complaints =====

    /// Complaints visible to the session, most recent failure first
    pub async fn list_complaints(
        &self,
        filter: &ComplaintFilter,
    ) -> Result<Vec<Complaint>, ApiError> {
        let request = ApiRequest::get(COMPLAINTS_PATH)
            .query("ordering", "-failure_date")
            .query_pairs(filter.params());
        self.list(request).await
    }

    pub async fn get_complaint(&self, id: i64) -> Result<Complaint, ApiError> {
        self.get_json(ApiRequest::get(format!("{}{}/", COMPLAINTS_PATH, id)))
            .await
    }

    pub async fn create_complaint(&self, draft: &ComplaintDraft) -> Result<Complaint, ApiError> {
        let request = ApiRequest::new(Method::POST, COMPLAINTS_PATH).json(draft)?;
        self.get_json(request).await
    }

    // ===== References =====

    /// All entries of one directory, following pagination to the end
    pub async fn references(&self, entity: &str) -> Result<Vec<Reference>, ApiError> {
        let mut request = ApiRequest::get(REFERENCES_PATH)
            .query("entity", entity)
            .query("ordering", "name")
            .query("page_size", REFERENCE_PAGE_SIZE);
        let mut items = Vec::new();

        for page in 1..=MAX_REFERENCE_PAGES {
            let listing: Listing<Reference> = self.get_json(request).await?;
            let next = listing.next().map(str::to_string);
            items.extend(listing.into_items());

            match next {
                Some(next) => {
                    debug!(entity = entity, page = page, "Following next page");
                    request = ApiRequest::get(REFERENCES_PATH).query_pairs(next_page_query(&next)?);
                }
                None => return Ok(items),
            }
        }

        warn!(entity = entity, pages = MAX_REFERENCE_PAGES, "Stopped following reference pages");
        Ok(items)
    }
}

/// Query parameters of a `next` link, to be replayed against the same path
fn next_page_query(next: &str) -> Result<Vec<(String, String)>, ApiError> {
    let url = Url::parse(next)
        .or_else(|_| Url::parse("http://localhost/").and_then(|base| base.join(next)))
        .map_err(|e| {
            ApiError::InvalidResponse(format!("Invalid next page link '{}': {}", next, e))
        })?;
    Ok(url.query_pairs().into_owned().collect())
}

fn distinct_service_companies(machines: Vec<Machine>) -> Vec<UserRef> {
    let mut seen = HashSet::new();
    let mut companies: Vec<UserRef> = machines
        .into_iter()
        .filter_map(|m| m.service_company)
        .filter(|company| company.key().is_some_and(|key| seen.insert(key)))
        .collect();
    companies.sort_by(|a, b| cmp_ignore_case(&a.display_name(), &b.display_name()));
    companies
}
