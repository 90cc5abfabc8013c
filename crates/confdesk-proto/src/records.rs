//! Records mirrored from the hosted store's tables.
//!
//! Field names follow the column names, so rows decode straight from the
//! store's REST responses and re-encode unchanged for the web clients.
//! No invariants are enforced here beyond the store's own constraints.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::id::FlexibleId;

/// A row of `conferences`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conference {
    /// Primary key.
    pub id: FlexibleId,
    /// Display name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// First day.
    #[serde(default)]
    pub starts_on: Option<NaiveDate>,
    /// Last day.
    #[serde(default)]
    pub ends_on: Option<NaiveDate>,
    /// Venue name or address.
    #[serde(default)]
    pub venue: Option<String>,
}

/// A row of `locations` (rooms, halls, booths).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Primary key.
    pub id: FlexibleId,
    /// Owning conference.
    pub conference_id: FlexibleId,
    /// Display name.
    pub name: String,
    /// Floor label.
    #[serde(default)]
    pub floor: Option<String>,
    /// Seating capacity.
    #[serde(default)]
    pub capacity: Option<u32>,
}

/// A row of `presentations`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Presentation {
    /// Primary key.
    pub id: FlexibleId,
    /// Owning conference.
    pub conference_id: FlexibleId,
    /// Room the talk is held in.
    #[serde(default)]
    pub location_id: Option<FlexibleId>,
    /// Talk title.
    pub title: String,
    /// Abstract text, usually filled from PDF analysis.
    #[serde(default, rename = "abstract")]
    pub abstract_text: Option<String>,
    /// Short summary.
    #[serde(default)]
    pub summary: Option<String>,
    /// Speaker display name.
    #[serde(default)]
    pub speaker: Option<String>,
    /// Start time.
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    /// End time.
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    /// Object path of the uploaded slides in the storage bucket.
    #[serde(default)]
    pub pdf_path: Option<String>,
}

/// A row of `tags`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Primary key.
    pub id: FlexibleId,
    /// Tag name, unique case-insensitively by convention.
    pub name: String,
}

/// A row of the `presentation_tags` join table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationTag {
    /// Tagged presentation.
    pub presentation_id: FlexibleId,
    /// Applied tag.
    pub tag_id: FlexibleId,
}

/// A row of `participants`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    /// Primary key.
    pub id: FlexibleId,
    /// Conference the participant registered for.
    #[serde(default)]
    pub conference_id: Option<FlexibleId>,
    /// Location the participant is assigned to or checked into.
    #[serde(default)]
    pub location_id: Option<FlexibleId>,
    /// Display name.
    pub name: String,
    /// Linked LINE user id, when the participant logged in through LINE.
    #[serde(default)]
    pub line_user_id: Option<String>,
}

impl Participant {
    /// The linked messaging identity, ignoring blank values.
    pub fn linked_line_user(&self) -> Option<&str> {
        self.line_user_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// A row of `line_users`, linking a LINE identity to a backend auth user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineAccount {
    /// LINE user id (`sub` of the verified id token). Unique.
    pub line_user_id: String,
    /// Backend auth user id.
    pub user_id: String,
    /// LINE display name.
    #[serde(default)]
    pub display_name: Option<String>,
    /// LINE profile picture URL.
    #[serde(default)]
    pub picture_url: Option<String>,
    /// Last login through the bridge.
    pub updated_at: DateTime<Utc>,
}

/// A presentation joined with its tag names and public slide URL.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresentationView {
    /// The underlying row.
    #[serde(flatten)]
    pub presentation: Presentation,
    /// Names of the applied tags, sorted.
    pub tags: Vec<String>,
    /// Public URL of the slides in the storage bucket.
    pub pdf_url: Option<String>,
}
