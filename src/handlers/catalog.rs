//! Catalog reads for the admin and attendee front-ends, plus tag
//! application.

use std::collections::{HashMap, HashSet};

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use confdesk_proto::{
    Conference, FlexibleId, Location, Participant, PresentationView, Tag,
};
use serde::Deserialize;
use tracing::info;

use crate::error::CatalogError;
use crate::state::AppState;

pub async fn conferences(
    State(state): State<AppState>,
) -> Result<Json<Vec<Conference>>, CatalogError> {
    Ok(Json(state.store.list_conferences().await?))
}

pub async fn locations(
    State(state): State<AppState>,
    Path(conference_id): Path<String>,
) -> Result<Json<Vec<Location>>, CatalogError> {
    let conference_id = required_id(&conference_id)?;
    Ok(Json(state.store.list_locations(conference_id).await?))
}

/// Presentations of a conference with their tag names and PDF link.
pub async fn presentations(
    State(state): State<AppState>,
    Path(conference_id): Path<String>,
) -> Result<Json<Vec<PresentationView>>, CatalogError> {
    let conference_id = required_id(&conference_id)?;
    let presentations = state.store.list_presentations(conference_id).await?;
    if presentations.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let ids: Vec<FlexibleId> = presentations.iter().map(|p| p.id.clone()).collect();
    let links = state.store.presentation_tags(&ids).await?;
    let names: HashMap<FlexibleId, String> = state
        .store
        .list_tags()
        .await?
        .into_iter()
        .map(|t| (t.id, t.name))
        .collect();

    let mut tags_by_presentation: HashMap<FlexibleId, Vec<String>> = HashMap::new();
    for link in links {
        if let Some(name) = names.get(&link.tag_id) {
            tags_by_presentation
                .entry(link.presentation_id)
                .or_default()
                .push(name.clone());
        }
    }

    let views = presentations
        .into_iter()
        .map(|presentation| {
            let mut tags = tags_by_presentation
                .remove(&presentation.id)
                .unwrap_or_default();
            tags.sort();
            let pdf_url = presentation
                .pdf_path
                .as_deref()
                .filter(|p| !p.trim().is_empty())
                .map(|p| state.store.public_url(p));
            PresentationView {
                presentation,
                tags,
                pdf_url,
            }
        })
        .collect();
    Ok(Json(views))
}

pub async fn tags(State(state): State<AppState>) -> Result<Json<Vec<Tag>>, CatalogError> {
    Ok(Json(state.store.list_tags().await?))
}

#[derive(Debug, Deserialize)]
pub struct ParticipantFilter {
    pub location_id: Option<String>,
}

pub async fn participants(
    State(state): State<AppState>,
    Query(filter): Query<ParticipantFilter>,
) -> Result<Json<Vec<Participant>>, CatalogError> {
    let location = filter
        .location_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());
    Ok(Json(state.store.list_participants(location).await?))
}

/// Body of a tag assignment.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagAssignment {
    pub tag_names: Vec<String>,
}

/// Replace a presentation's tags by name, creating tags that do not exist.
pub async fn set_presentation_tags(
    State(state): State<AppState>,
    Path(presentation_id): Path<String>,
    payload: Result<Json<TagAssignment>, JsonRejection>,
) -> Result<Json<Vec<Tag>>, CatalogError> {
    let presentation_id = required_id(&presentation_id)?;
    let Json(assignment) =
        payload.map_err(|e| CatalogError::BadRequest(format!("Invalid JSON body: {}", e.body_text())))?;
    let wanted = normalize_tag_names(&assignment.tag_names);

    if state.store.get_presentation(presentation_id).await?.is_none() {
        return Err(CatalogError::NotFound("presentation"));
    }

    let mut existing: HashMap<String, Tag> = state
        .store
        .list_tags()
        .await?
        .into_iter()
        .map(|t| (t.name.to_lowercase(), t))
        .collect();

    let mut applied = Vec::with_capacity(wanted.len());
    for name in wanted {
        let tag = match existing.remove(&name.to_lowercase()) {
            Some(tag) => tag,
            None => {
                let tag = state.store.create_tag(&name).await?;
                info!(tag = %tag.name, "Tag created");
                tag
            }
        };
        applied.push(tag);
    }

    let ids: Vec<FlexibleId> = applied.iter().map(|t| t.id.clone()).collect();
    state
        .store
        .replace_presentation_tags(presentation_id, &ids)
        .await?;
    info!(presentation = presentation_id, tags = applied.len(), "Presentation tags replaced");
    Ok(Json(applied))
}

/// Trimmed, non-empty names, first spelling wins among case variants.
pub fn normalize_tag_names(names: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .filter(|n| seen.insert(n.to_lowercase()))
        .map(str::to_string)
        .collect()
}

fn required_id(raw: &str) -> Result<&str, CatalogError> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(CatalogError::BadRequest("id is required".into()));
    }
    Ok(id)
}
