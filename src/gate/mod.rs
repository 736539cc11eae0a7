//! Request gate: decides whether a submission may reach the pipeline.
//!
//! Three checks run synchronously, before any network I/O, in a fixed order:
//! channel → role → content type. A channel mismatch short-circuits the role
//! check. Every denial carries a caller-only notice; the pipeline is never
//! invoked on a denied request.

use crate::platform::{ChannelId, RoleId, SubmissionRequest};

/// Static gate configuration, read once at process start.
#[derive(Debug, Clone, Copy)]
pub struct GateConfig {
    /// The only channel the command is allowed in.
    pub allowed_channel: ChannelId,
    /// Role required to invoke the command. `None` disables the check.
    pub required_role: Option<RoleId>,
}

/// Outcome of gating one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allowed,
    WrongChannel { expected: ChannelId },
    MissingRole { required: RoleId },
    BadContentType,
}

impl GateDecision {
    /// Ephemeral notice shown to the caller on denial.
    pub fn notice(&self) -> Option<String> {
        match self {
            GateDecision::Allowed => None,
            GateDecision::WrongChannel { expected } => {
                Some(format!("❌ Wrong channel! Please use <#{expected}>."))
            }
            GateDecision::MissingRole { required } => Some(format!(
                "❌ You need the <@&{required}> role to use this command."
            )),
            GateDecision::BadContentType => {
                Some("❌ Invalid file type. Please upload an image.".to_string())
            }
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, GateDecision::Allowed)
    }

    /// Stable label for metrics/logging.
    pub fn reason(&self) -> &'static str {
        match self {
            GateDecision::Allowed => "allowed",
            GateDecision::WrongChannel { .. } => "wrong_channel",
            GateDecision::MissingRole { .. } => "missing_role",
            GateDecision::BadContentType => "bad_content_type",
        }
    }
}

/// Run the gate checks against one request.
pub fn check(request: &SubmissionRequest, config: &GateConfig) -> GateDecision {
    if request.channel_id != config.allowed_channel {
        return GateDecision::WrongChannel {
            expected: config.allowed_channel,
        };
    }

    if let Some(required) = config.required_role {
        if !request.caller_roles.contains(&required) {
            return GateDecision::MissingRole { required };
        }
    }

    if !is_raster_image(request.attachment.content_type.as_deref()) {
        return GateDecision::BadContentType;
    }

    GateDecision::Allowed
}

/// A declared content type indicates a raster image when it is present and
/// falls under the `image/` top-level type.
fn is_raster_image(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.starts_with("image/"))
}
