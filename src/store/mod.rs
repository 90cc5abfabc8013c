//! Hosted store abstraction.
//!
//! The relational tables, auth users and storage bucket all live in the
//! hosted backend. [`Store`] is the interface the handlers consume; the
//! [`supabase`] module implements it over the backend's REST APIs.

use async_trait::async_trait;
use confdesk_proto::{
    Conference, FlexibleId, LineAccount, Location, Participant, Presentation, PresentationTag, Tag,
};
use thiserror::Error;

use crate::upstream::UpstreamError;

pub mod supabase;

pub use supabase::SupabaseStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error("store returned no row for {0}")]
    EmptyResult(&'static str),
}

/// A freshly issued magic link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagicLink {
    /// One-time sign-in URL.
    pub url: String,
    /// Auth user the link signs in.
    pub user_id: String,
}

#[async_trait]
pub trait Store: Send + Sync {
    /// All conferences, newest first.
    async fn list_conferences(&self) -> Result<Vec<Conference>, StoreError>;

    /// Locations of one conference, by name.
    async fn list_locations(&self, conference_id: &str) -> Result<Vec<Location>, StoreError>;

    /// Presentations of one conference, by start time.
    async fn list_presentations(
        &self,
        conference_id: &str,
    ) -> Result<Vec<Presentation>, StoreError>;

    /// Look up one presentation.
    async fn get_presentation(&self, id: &str) -> Result<Option<Presentation>, StoreError>;

    /// Join rows for the given presentations.
    async fn presentation_tags(
        &self,
        presentation_ids: &[FlexibleId],
    ) -> Result<Vec<PresentationTag>, StoreError>;

    /// Replace the tag set of a presentation.
    async fn replace_presentation_tags(
        &self,
        presentation_id: &str,
        tag_ids: &[FlexibleId],
    ) -> Result<(), StoreError>;

    /// All tags, by name.
    async fn list_tags(&self) -> Result<Vec<Tag>, StoreError>;

    /// Insert a tag and return the stored row.
    async fn create_tag(&self, name: &str) -> Result<Tag, StoreError>;

    /// Participants, optionally filtered by location.
    async fn list_participants(
        &self,
        location_id: Option<&str>,
    ) -> Result<Vec<Participant>, StoreError>;

    /// Look up one participant.
    async fn get_participant(&self, id: &str) -> Result<Option<Participant>, StoreError>;

    /// Look up the participant linked to a LINE user.
    async fn find_participant_by_line_user(
        &self,
        line_user_id: &str,
    ) -> Result<Option<Participant>, StoreError>;

    /// Insert or update the link between a LINE user and an auth user.
    async fn upsert_line_account(&self, account: &LineAccount) -> Result<(), StoreError>;

    /// Create an auth user for `email` unless one exists.
    ///
    /// Returns the new user's id, or `None` when the user already existed.
    async fn ensure_auth_user(
        &self,
        email: &str,
        metadata: serde_json::Value,
    ) -> Result<Option<String>, StoreError>;

    /// Issue a magic link for an existing auth user.
    async fn generate_magic_link(
        &self,
        email: &str,
        redirect_to: Option<&str>,
    ) -> Result<MagicLink, StoreError>;

    /// Public URL of an object in the presentations bucket.
    fn public_url(&self, path: &str) -> String;
}
