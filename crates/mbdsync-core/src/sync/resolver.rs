use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{debug, info};

use crate::api::ApiClient;
use crate::models::{ApiId, GuardianProfile};

/// The logged-in guardian and the dependents linked to them.
#[derive(Debug, Clone)]
pub struct Dependents {
    pub guardian: GuardianProfile,
    pub ids: Vec<ApiId>,
}

impl Dependents {
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Fetch the guardian profile, then the dependents linked to it as of `today`.
pub async fn retrieve_children(client: &ApiClient, today: NaiveDate) -> Result<Dependents> {
    let guardian = client
        .fetch_profile()
        .await
        .context("Failed to fetch guardian profile")?;
    debug!(
        guardian_id = %guardian.id,
        name = guardian.display_name().as_deref().unwrap_or("unknown"),
        "Fetched guardian profile"
    );

    let response = client
        .fetch_dependents(&guardian.id, today)
        .await
        .context("Failed to fetch dependents")?;
    let ids = response.ids();

    debug!(dependents = ?ids, "Resolved dependents");
    info!(count = ids.len(), "Retrieved children");

    Ok(Dependents { guardian, ids })
}
