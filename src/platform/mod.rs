//! Boundary types and traits for the chat platform layer.
//!
//! The platform dispatcher (slash-command routing, role resolution, message
//! transport) lives outside this crate. It hands the core a fully resolved
//! [`SubmissionRequest`] and receives results through [`ResponseSink`]. The
//! sanitizer acts on raw channel traffic through [`MessageActions`].
//!
//! Nothing in here touches a chat SDK; every implementation is supplied by
//! the embedding gateway.

use async_trait::async_trait;
use std::time::Duration;

/// Chat channel identifier (platform snowflake).
pub type ChannelId = u64;
/// Role identifier (platform snowflake).
pub type RoleId = u64;
/// User identifier (platform snowflake).
pub type UserId = u64;

/// An uploaded image attachment as reported by the dispatcher.
#[derive(Debug, Clone)]
pub struct Attachment {
    /// Download URL for the raw bytes.
    pub url: String,
    /// Original filename, used to derive the output filename.
    pub filename: String,
    /// Declared content type, if the platform reported one.
    pub content_type: Option<String>,
}

/// One proof submission, immutable for the life of the request/response cycle.
///
/// Constructed by the external dispatcher after it has authenticated the
/// caller and resolved their role set.
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    /// The submitted screenshot.
    pub attachment: Attachment,
    /// Optional free-text side note from the caller.
    pub note: Option<String>,
    /// Channel the command was invoked in.
    pub channel_id: ChannelId,
    /// The invoking member.
    pub caller_id: UserId,
    /// Roles held by the invoking member.
    pub caller_roles: Vec<RoleId>,
    /// URL of the community emblem, if the community has one configured.
    /// Absence is a valid state, not a collaborator error.
    pub emblem_url: Option<String>,
}

/// A message observed in a channel, as seen by the sanitizer.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub channel_id: ChannelId,
    pub message_id: u64,
    pub author_id: UserId,
    /// True when the service itself authored the message.
    pub authored_by_self: bool,
    /// True when the message is a recognized pipeline invocation.
    pub is_command: bool,
}

/// Encoded image handed back to the platform for delivery.
#[derive(Debug, Clone)]
pub struct OutgoingFile {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Failure in the platform layer (missing privilege, object already gone,
/// transport error). The core only ever logs these.
#[derive(Debug, thiserror::Error)]
#[error("platform error: {0}")]
pub struct PlatformError(pub String);

impl PlatformError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Delivery sink for one submission's outcome.
#[async_trait]
pub trait ResponseSink: Send + Sync {
    /// Caller-only notice, used for gate denials.
    async fn send_ephemeral(&self, text: String) -> Result<(), PlatformError>;

    /// Short human-readable failure string, visible in the channel.
    async fn send_failure(&self, text: String) -> Result<(), PlatformError>;

    /// Success caption plus the watermarked image. Ownership of the bytes
    /// passes to the sink.
    async fn send_success(&self, caption: String, file: OutgoingFile) -> Result<(), PlatformError>;
}

/// Message-level moderation actions used by the channel sanitizer.
#[async_trait]
pub trait MessageActions: Send + Sync {
    async fn delete_message(
        &self,
        channel: ChannelId,
        message: u64,
    ) -> Result<(), PlatformError>;

    /// Post a notice that the platform removes again after `ttl`.
    async fn post_transient_notice(
        &self,
        channel: ChannelId,
        text: String,
        ttl: Duration,
    ) -> Result<(), PlatformError>;
}

/// The verification role flip: once a member holds the verified role, the
/// unverified role is removed. This is moderation state external to the
/// watermarking core; the core exposes the seam but never invokes it.
#[async_trait]
pub trait VerificationPolicy: Send + Sync {
    async fn on_roles_changed(
        &self,
        member: UserId,
        roles: &[RoleId],
    ) -> Result<(), PlatformError>;
}

/// Role pair backing a [`VerificationPolicy`] implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerificationRoles {
    pub unverified: RoleId,
    pub verified: RoleId,
}

impl VerificationRoles {
    /// True when the member holds both roles and the unverified one should
    /// be stripped.
    pub fn should_strip(&self, roles: &[RoleId]) -> bool {
        roles.contains(&self.verified) && roles.contains(&self.unverified)
    }
}
