//! In-memory stand-ins for the hosted services.
//!
//! Each fake records the calls it receives so tests can assert on what the
//! handlers sent, and can be switched into a failing mode.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use confdesk::config::Config;
use confdesk::line::{IdentityVerifier, Messenger, VerifiedIdentity, VerifyError};
use confdesk::model::{ChatModel, Prompt};
use confdesk::pdf::{ExtractError, TextExtractor};
use confdesk::state::AppState;
use confdesk::store::{MagicLink, Store, StoreError};
use confdesk::upstream::UpstreamError;
use confdesk_proto::{
    Conference, FlexibleId, LineAccount, Location, Participant, Presentation, PresentationTag,
    PushRequest, Tag,
};
use serde_json::{Value, json};

fn unavailable(service: &'static str) -> UpstreamError {
    UpstreamError::Status {
        service,
        status: 503,
        body: "unavailable".to_string(),
    }
}

// ============================================================================
// Store
// ============================================================================

#[derive(Default)]
pub struct FakeStore {
    pub conferences: Mutex<Vec<Conference>>,
    pub locations: Mutex<Vec<Location>>,
    pub presentations: Mutex<Vec<Presentation>>,
    pub tags: Mutex<Vec<Tag>>,
    pub presentation_tags: Mutex<Vec<PresentationTag>>,
    pub participants: Mutex<Vec<Participant>>,
    pub line_accounts: Mutex<Vec<LineAccount>>,
    pub auth_users: Mutex<HashSet<String>>,
    pub magic_links: Mutex<Vec<(String, Option<String>)>>,
    pub fail: AtomicBool,
}

impl FakeStore {
    pub fn failing(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(unavailable("store").into());
        }
        Ok(())
    }

    pub fn add_participant(&self, id: &str, name: &str, line_user_id: Option<&str>) {
        self.participants.lock().unwrap().push(Participant {
            id: id.into(),
            conference_id: Some("1".into()),
            location_id: Some("10".into()),
            name: name.to_string(),
            line_user_id: line_user_id.map(str::to_string),
        });
    }

    pub fn add_tag(&self, id: &str, name: &str) {
        self.tags.lock().unwrap().push(Tag {
            id: id.into(),
            name: name.to_string(),
        });
    }
}

#[async_trait]
impl Store for FakeStore {
    async fn list_conferences(&self) -> Result<Vec<Conference>, StoreError> {
        self.check()?;
        Ok(self.conferences.lock().unwrap().clone())
    }

    async fn list_locations(&self, conference_id: &str) -> Result<Vec<Location>, StoreError> {
        self.check()?;
        Ok(self
            .locations
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.conference_id.as_str() == conference_id)
            .cloned()
            .collect())
    }

    async fn list_presentations(
        &self,
        conference_id: &str,
    ) -> Result<Vec<Presentation>, StoreError> {
        self.check()?;
        Ok(self
            .presentations
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.conference_id.as_str() == conference_id)
            .cloned()
            .collect())
    }

    async fn get_presentation(&self, id: &str) -> Result<Option<Presentation>, StoreError> {
        self.check()?;
        Ok(self
            .presentations
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id.as_str() == id)
            .cloned())
    }

    async fn presentation_tags(
        &self,
        presentation_ids: &[FlexibleId],
    ) -> Result<Vec<PresentationTag>, StoreError> {
        self.check()?;
        Ok(self
            .presentation_tags
            .lock()
            .unwrap()
            .iter()
            .filter(|pt| presentation_ids.contains(&pt.presentation_id))
            .cloned()
            .collect())
    }

    async fn replace_presentation_tags(
        &self,
        presentation_id: &str,
        tag_ids: &[FlexibleId],
    ) -> Result<(), StoreError> {
        self.check()?;
        let mut links = self.presentation_tags.lock().unwrap();
        links.retain(|pt| pt.presentation_id.as_str() != presentation_id);
        links.extend(tag_ids.iter().map(|tag_id| PresentationTag {
            presentation_id: presentation_id.into(),
            tag_id: tag_id.clone(),
        }));
        Ok(())
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, StoreError> {
        self.check()?;
        Ok(self.tags.lock().unwrap().clone())
    }

    async fn create_tag(&self, name: &str) -> Result<Tag, StoreError> {
        self.check()?;
        let mut tags = self.tags.lock().unwrap();
        let tag = Tag {
            id: FlexibleId::new((100 + tags.len()).to_string()),
            name: name.to_string(),
        };
        tags.push(tag.clone());
        Ok(tag)
    }

    async fn list_participants(
        &self,
        location_id: Option<&str>,
    ) -> Result<Vec<Participant>, StoreError> {
        self.check()?;
        Ok(self
            .participants
            .lock()
            .unwrap()
            .iter()
            .filter(|p| match location_id {
                Some(loc) => p.location_id.as_ref().is_some_and(|l| l.as_str() == loc),
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn get_participant(&self, id: &str) -> Result<Option<Participant>, StoreError> {
        self.check()?;
        Ok(self
            .participants
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id.as_str() == id)
            .cloned())
    }

    async fn find_participant_by_line_user(
        &self,
        line_user_id: &str,
    ) -> Result<Option<Participant>, StoreError> {
        self.check()?;
        Ok(self
            .participants
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.linked_line_user() == Some(line_user_id))
            .cloned())
    }

    async fn upsert_line_account(&self, account: &LineAccount) -> Result<(), StoreError> {
        self.check()?;
        let mut accounts = self.line_accounts.lock().unwrap();
        accounts.retain(|a| a.line_user_id != account.line_user_id);
        accounts.push(account.clone());
        Ok(())
    }

    async fn ensure_auth_user(
        &self,
        email: &str,
        _metadata: Value,
    ) -> Result<Option<String>, StoreError> {
        self.check()?;
        if self.auth_users.lock().unwrap().insert(email.to_string()) {
            Ok(Some(format!("user-{email}")))
        } else {
            Ok(None)
        }
    }

    async fn generate_magic_link(
        &self,
        email: &str,
        redirect_to: Option<&str>,
    ) -> Result<MagicLink, StoreError> {
        self.check()?;
        self.magic_links
            .lock()
            .unwrap()
            .push((email.to_string(), redirect_to.map(str::to_string)));
        Ok(MagicLink {
            url: format!("http://store.invalid/auth/v1/verify?token=t&email={email}"),
            user_id: format!("user-{email}"),
        })
    }

    fn public_url(&self, path: &str) -> String {
        format!("http://store.invalid/storage/v1/object/public/presentations/{path}")
    }
}

// ============================================================================
// Model
// ============================================================================

/// Replies are served in order; an exhausted queue answers "ok".
#[derive(Default)]
pub struct FakeModel {
    pub replies: Mutex<VecDeque<String>>,
    pub prompts: Mutex<Vec<Prompt>>,
    pub fail: AtomicBool,
}

impl FakeModel {
    pub fn reply(&self, text: &str) {
        self.replies.lock().unwrap().push_back(text.to_string());
    }
}

#[async_trait]
impl ChatModel for FakeModel {
    async fn complete(&self, prompt: Prompt) -> Result<String, UpstreamError> {
        self.prompts.lock().unwrap().push(prompt);
        if self.fail.load(Ordering::SeqCst) {
            return Err(unavailable("model"));
        }
        Ok(self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| "ok".to_string()))
    }
}

// ============================================================================
// LINE
// ============================================================================

#[derive(Default)]
pub struct FakeMessenger {
    pub pushed: Mutex<Vec<PushRequest>>,
    pub fail: AtomicBool,
}

impl FakeMessenger {
    pub fn pushed(&self) -> Vec<PushRequest> {
        self.pushed.lock().unwrap().clone()
    }
}

#[async_trait]
impl Messenger for FakeMessenger {
    async fn push(&self, request: &PushRequest) -> Result<Value, UpstreamError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(unavailable("line"));
        }
        self.pushed.lock().unwrap().push(request.clone());
        Ok(json!({ "sentMessages": [{ "id": "m1", "quoteToken": "q1" }] }))
    }
}

/// Accepts only registered tokens.
#[derive(Default)]
pub struct FakeVerifier {
    pub identities: Mutex<HashMap<String, VerifiedIdentity>>,
    pub calls: Mutex<Vec<(String, String)>>,
    pub fail: AtomicBool,
}

impl FakeVerifier {
    pub fn accept(&self, token: &str, user_id: &str, name: Option<&str>) {
        self.identities.lock().unwrap().insert(
            token.to_string(),
            VerifiedIdentity {
                user_id: user_id.to_string(),
                name: name.map(str::to_string),
                picture: None,
            },
        );
    }
}

#[async_trait]
impl IdentityVerifier for FakeVerifier {
    async fn verify(
        &self,
        id_token: &str,
        channel_id: &str,
    ) -> Result<VerifiedIdentity, VerifyError> {
        self.calls
            .lock()
            .unwrap()
            .push((id_token.to_string(), channel_id.to_string()));
        if self.fail.load(Ordering::SeqCst) {
            return Err(unavailable("line").into());
        }
        self.identities
            .lock()
            .unwrap()
            .get(id_token)
            .cloned()
            .ok_or_else(|| VerifyError::Rejected("IdToken expired.".to_string()))
    }
}

// ============================================================================
// PDF
// ============================================================================

/// Returns the configured text for any document; `None` fails to parse.
#[derive(Default)]
pub struct FakeExtractor {
    pub text: Mutex<Option<String>>,
    pub seen: Mutex<Vec<Bytes>>,
}

impl FakeExtractor {
    pub fn yields(&self, text: &str) {
        *self.text.lock().unwrap() = Some(text.to_string());
    }
}

#[async_trait]
impl TextExtractor for FakeExtractor {
    async fn extract(&self, document: Bytes) -> Result<String, ExtractError> {
        self.seen.lock().unwrap().push(document);
        self.text
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ExtractError::Parse("no xref table".to_string()))
    }
}

// ============================================================================
// Harness
// ============================================================================

/// One fake of each service, shared between the state and the test.
#[derive(Default, Clone)]
pub struct Harness {
    pub store: Arc<FakeStore>,
    pub model: Arc<FakeModel>,
    pub messenger: Arc<FakeMessenger>,
    pub verifier: Arc<FakeVerifier>,
    pub extractor: Arc<FakeExtractor>,
}

impl Harness {
    pub fn state(&self, config: Config) -> AppState {
        AppState {
            config: Arc::new(config),
            store: self.store.clone(),
            model: self.model.clone(),
            messenger: self.messenger.clone(),
            verifier: self.verifier.clone(),
            extractor: self.extractor.clone(),
        }
    }
}
