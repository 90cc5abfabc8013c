//! # confdesk-proto
//!
//! Wire types shared by the confdesk daemon and its tests:
//!
//! - Records mirrored 1:1 from the hosted store's tables ([`records`])
//! - Request and response payloads of the daemon's endpoints
//!   ([`analysis`], [`login`], [`notify`])
//! - LINE Messaging API envelopes, inbound ([`webhook`]) and outbound ([`message`])
//!
//! The types carry no behaviour beyond validation of required fields and
//! tolerant decoding; everything stateful lives in the daemon.

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod analysis;
pub mod error;
pub mod id;
pub mod login;
pub mod message;
pub mod notify;
pub mod records;
pub mod webhook;

pub use analysis::{AnalysisFailure, AnalysisResponse};
pub use error::{ProtoError, Result};
pub use id::FlexibleId;
pub use login::{LoginRequest, LoginResponse, MessageBody};
pub use message::{PushRequest, TextMessage, MAX_TEXT_LEN};
pub use notify::{NotificationKind, NotifyFailure, NotifyRequest, NotifyResponse};
pub use records::{
    Conference, LineAccount, Location, Participant, Presentation, PresentationTag,
    PresentationView, Tag,
};
pub use webhook::{EventMessage, EventSource, WebhookEnvelope, WebhookEvent};
