use crate::dto::invite_dto::{invite_id, parse_invite, INVITE_LIST_KEYS};
use crate::error::{Error, Result};
use crate::models::invite::{Invite, InviteDetail};
use crate::routes;
use crate::services::fetch_service::ResilientFetch;
use crate::utils::collection::as_collection;
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct InviteService {
    fetch: ResilientFetch,
    fragment_timeout: Duration,
}

impl InviteService {
    pub fn new(fetch: ResilientFetch, fragment_timeout: Duration) -> Self {
        Self {
            fetch,
            fragment_timeout,
        }
    }

    async fn invite_records(&self) -> Result<Vec<JsonValue>> {
        let response = self.fetch.call(&routes::interviews::candidate_invites()).await?;
        let collection = response
            .data
            .as_ref()
            .and_then(|data| as_collection(data, INVITE_LIST_KEYS));
        match collection {
            Some(records) => Ok(records),
            None if response.ok => Err(Error::MalformedResponse(
                "invite list is not a collection".to_string(),
            )),
            None => Err(response.failure()),
        }
    }

    pub async fn list_invites(&self) -> Result<Vec<Invite>> {
        let records = self.invite_records().await?;
        Ok(records.iter().filter_map(parse_invite).collect())
    }

    /// Server-rendered row when it arrives in time, otherwise the JSON record from the list.
    pub async fn invite_detail(&self, id: &str) -> Result<InviteDetail> {
        let request = routes::interviews::invite_fragment(id, self.fragment_timeout);
        match self.fetch.call_one(request).await {
            Ok(response) if response.ok => {
                if let Some(JsonValue::String(html)) = response.data {
                    if !html.trim().is_empty() {
                        return Ok(InviteDetail::Fragment(html));
                    }
                }
                debug!(invite_id = id, "Invite fragment was empty, using invite list");
            }
            Ok(response) => {
                warn!(
                    invite_id = id,
                    status = response.status,
                    "Invite fragment unavailable, using invite list"
                );
            }
            Err(e) if e.is_auth() => return Err(e),
            Err(e) => {
                warn!(invite_id = id, error = %e, "Invite fragment failed, using invite list");
            }
        }

        let records = self.invite_records().await?;
        records
            .iter()
            .find(|record| invite_id(record).as_deref() == Some(id))
            .and_then(parse_invite)
            .map(InviteDetail::Record)
            .ok_or_else(|| Error::NotFound(format!("invite {}", id)))
    }
}
