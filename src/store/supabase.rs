//! Supabase implementation of [`Store`].
//!
//! Talks to three APIs of one project, all authenticated with the
//! service-role key:
//!
//! - `/rest/v1/{table}` (PostgREST) for table reads and writes
//! - `/auth/v1/admin/*` (GoTrue admin) for users and magic links
//! - `/storage/v1/object/public/{bucket}/{path}` for public object URLs

use async_trait::async_trait;
use confdesk_proto::{
    Conference, FlexibleId, LineAccount, Location, Participant, Presentation, PresentationTag, Tag,
};
use reqwest::{Method, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

use super::{MagicLink, Store, StoreError};
use crate::config::BackendConfig;
use crate::upstream::{UpstreamError, build_client, expect_success};

const SERVICE: &str = "backend";

/// Store backed by a Supabase project.
pub struct SupabaseStore {
    base_url: String,
    service_key: String,
    bucket: String,
    http: reqwest::Client,
}

impl SupabaseStore {
    /// Create a store for the configured project.
    pub fn new(config: &BackendConfig) -> Self {
        info!(url = %config.base_url(), bucket = %config.storage_bucket, "Backend store initialized");
        Self {
            base_url: config.base_url().to_string(),
            service_key: config.service_key.clone().unwrap_or_default(),
            bucket: config.storage_bucket.clone(),
            http: build_client(Duration::from_secs(config.timeout_secs)),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    fn table(&self, method: Method, table: &str) -> RequestBuilder {
        self.request(method, &format!("/rest/v1/{table}"))
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, StoreError> {
        let response = request
            .send()
            .await
            .map_err(UpstreamError::transport(SERVICE))
            .inspect_err(|_| crate::metrics::record_upstream_failure(SERVICE))?;
        Ok(expect_success(SERVICE, response).await?)
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, StoreError> {
        let response = self.send(request).await?;
        Ok(response
            .json::<T>()
            .await
            .map_err(UpstreamError::decode(SERVICE))?)
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
    ) -> Result<Vec<T>, StoreError> {
        let request = self
            .table(Method::GET, table)
            .query(&[("select", "*")])
            .query(filters);
        self.fetch(request).await
    }

    async fn select_one<T: DeserializeOwned>(
        &self,
        table: &str,
        column: &str,
        value: &str,
    ) -> Result<Option<T>, StoreError> {
        let filters = [(column, format!("eq.{value}")), ("limit", "1".to_string())];
        let rows: Vec<T> = self.select(table, &filters).await?;
        Ok(rows.into_iter().next())
    }
}

/// PostgREST `in.(...)` filter with every value quoted.
fn in_filter(ids: &[FlexibleId]) -> String {
    let quoted: Vec<String> = ids
        .iter()
        .map(|id| format!("\"{}\"", id.as_str().replace('"', "")))
        .collect();
    format!("in.({})", quoted.join(","))
}

/// `generate_link` answers in two shapes depending on the GoTrue version:
/// flat (`action_link` next to the user fields) or nested under
/// `properties` / `user`.
#[derive(Debug, Deserialize)]
struct GenerateLinkResponse {
    #[serde(default)]
    action_link: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    properties: Option<LinkProperties>,
    #[serde(default)]
    user: Option<AuthUser>,
}

#[derive(Debug, Deserialize)]
struct LinkProperties {
    action_link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
}

impl GenerateLinkResponse {
    fn into_link(self) -> Option<MagicLink> {
        let url = self
            .action_link
            .or_else(|| self.properties.and_then(|p| p.action_link))?;
        let user_id = self.id.or_else(|| self.user.map(|u| u.id))?;
        Some(MagicLink { url, user_id })
    }
}

#[async_trait]
impl Store for SupabaseStore {
    async fn list_conferences(&self) -> Result<Vec<Conference>, StoreError> {
        self.select("conferences", &[("order", "starts_on.desc.nullslast".into())])
            .await
    }

    async fn list_locations(&self, conference_id: &str) -> Result<Vec<Location>, StoreError> {
        let filters = [
            ("conference_id", format!("eq.{conference_id}")),
            ("order", "name.asc".into()),
        ];
        self.select("locations", &filters).await
    }

    async fn list_presentations(
        &self,
        conference_id: &str,
    ) -> Result<Vec<Presentation>, StoreError> {
        let filters = [
            ("conference_id", format!("eq.{conference_id}")),
            ("order", "starts_at.asc.nullslast".into()),
        ];
        self.select("presentations", &filters).await
    }

    async fn get_presentation(&self, id: &str) -> Result<Option<Presentation>, StoreError> {
        self.select_one("presentations", "id", id).await
    }

    async fn presentation_tags(
        &self,
        presentation_ids: &[FlexibleId],
    ) -> Result<Vec<PresentationTag>, StoreError> {
        if presentation_ids.is_empty() {
            return Ok(Vec::new());
        }
        let filters = [("presentation_id", in_filter(presentation_ids))];
        self.select("presentation_tags", &filters).await
    }

    async fn replace_presentation_tags(
        &self,
        presentation_id: &str,
        tag_ids: &[FlexibleId],
    ) -> Result<(), StoreError> {
        let delete = self
            .table(Method::DELETE, "presentation_tags")
            .query(&[("presentation_id", format!("eq.{presentation_id}"))]);
        self.send(delete).await?;

        if tag_ids.is_empty() {
            return Ok(());
        }

        let rows: Vec<_> = tag_ids
            .iter()
            .map(|tag_id| json!({ "presentation_id": presentation_id, "tag_id": tag_id }))
            .collect();
        let insert = self
            .table(Method::POST, "presentation_tags")
            .header("Prefer", "return=minimal")
            .json(&rows);
        self.send(insert).await?;

        debug!(presentation = %presentation_id, tags = tag_ids.len(), "Presentation tags replaced");
        Ok(())
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, StoreError> {
        self.select("tags", &[("order", "name.asc".into())]).await
    }

    async fn create_tag(&self, name: &str) -> Result<Tag, StoreError> {
        let request = self
            .table(Method::POST, "tags")
            .header("Prefer", "return=representation")
            .json(&[json!({ "name": name })]);
        let rows: Vec<Tag> = self.fetch(request).await?;
        rows.into_iter().next().ok_or(StoreError::EmptyResult("tags"))
    }

    async fn list_participants(
        &self,
        location_id: Option<&str>,
    ) -> Result<Vec<Participant>, StoreError> {
        let mut filters = vec![("order", "name.asc".to_string())];
        if let Some(location) = location_id {
            filters.push(("location_id", format!("eq.{location}")));
        }
        self.select("participants", &filters).await
    }

    async fn get_participant(&self, id: &str) -> Result<Option<Participant>, StoreError> {
        self.select_one("participants", "id", id).await
    }

    async fn find_participant_by_line_user(
        &self,
        line_user_id: &str,
    ) -> Result<Option<Participant>, StoreError> {
        self.select_one("participants", "line_user_id", line_user_id)
            .await
    }

    async fn upsert_line_account(&self, account: &LineAccount) -> Result<(), StoreError> {
        let request = self
            .table(Method::POST, "line_users")
            .query(&[("on_conflict", "line_user_id")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&[account]);
        self.send(request).await?;
        Ok(())
    }

    async fn ensure_auth_user(
        &self,
        email: &str,
        metadata: serde_json::Value,
    ) -> Result<Option<String>, StoreError> {
        let request = self
            .request(Method::POST, "/auth/v1/admin/users")
            .json(&json!({
                "email": email,
                "email_confirm": true,
                "user_metadata": metadata,
            }));

        match self.send(request).await {
            Ok(response) => {
                let user: AuthUser = response
                    .json()
                    .await
                    .map_err(UpstreamError::decode(SERVICE))?;
                info!(user_id = %user.id, "Auth user created");
                Ok(Some(user.id))
            }
            // GoTrue answers 422 for an email that is already registered
            Err(StoreError::Upstream(UpstreamError::Status { status: 422, .. })) => {
                debug!("Auth user already exists");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn generate_magic_link(
        &self,
        email: &str,
        redirect_to: Option<&str>,
    ) -> Result<MagicLink, StoreError> {
        let mut body = json!({ "type": "magiclink", "email": email });
        if let Some(redirect) = redirect_to {
            body["redirect_to"] = json!(redirect);
        }

        let request = self
            .request(Method::POST, "/auth/v1/admin/generate_link")
            .json(&body);
        let response: GenerateLinkResponse = self.fetch(request).await?;
        response.into_link().ok_or_else(|| {
            StoreError::Upstream(UpstreamError::Decode {
                service: SERVICE,
                detail: "generate_link response lacks action_link or user id".into(),
            })
        })
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url,
            self.bucket,
            path.trim_start_matches('/')
        )
    }
}
