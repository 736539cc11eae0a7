//! Channel sanitizer: keeps the restricted channel command-only.
//!
//! Runs on every observed message as a standing background rule, independent
//! of the submission pipeline (two handlers over the same event stream, so
//! this module's failure swallowing can never mask pipeline errors). Any
//! message in the restricted channel that is not a recognized invocation is
//! deleted and answered with a transient notice naming the expected command.
//!
//! Everything here is best-effort: a failed deletion (insufficient
//! privilege, message already gone) or a failed notice post is logged at
//! debug and swallowed. The service's own messages are exempt so it never
//! deletes its own notices.

use crate::metrics::Metrics;
use crate::platform::{ChannelId, InboundMessage, MessageActions};
use std::sync::Arc;
use std::time::Duration;

/// How long a warning notice stays up before the platform removes it.
pub const NOTICE_TTL: Duration = Duration::from_secs(5);

/// What the sanitizer decided for one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanitizerVerdict {
    /// Leave the message alone.
    Ignore,
    /// Delete it and post the warning notice.
    Remove,
}

/// Static sanitizer configuration.
#[derive(Debug, Clone)]
pub struct SanitizerConfig {
    /// The command-only channel.
    pub channel: ChannelId,
    /// Command name shown in the warning notice.
    pub command_name: String,
}

pub struct ChannelSanitizer {
    config: SanitizerConfig,
    metrics: Arc<Metrics>,
}

impl ChannelSanitizer {
    pub fn new(config: SanitizerConfig, metrics: Arc<Metrics>) -> Self {
        Self { config, metrics }
    }

    /// Pure decision for one observed message.
    pub fn evaluate(&self, message: &InboundMessage) -> SanitizerVerdict {
        if message.channel_id != self.config.channel {
            return SanitizerVerdict::Ignore;
        }
        if message.authored_by_self {
            return SanitizerVerdict::Ignore;
        }
        if message.is_command {
            return SanitizerVerdict::Ignore;
        }
        SanitizerVerdict::Remove
    }

    /// Evaluate and enforce. Platform failures are swallowed.
    pub async fn enforce(&self, message: &InboundMessage, actions: &dyn MessageActions) {
        if self.evaluate(message) != SanitizerVerdict::Remove {
            return;
        }

        if let Err(e) = actions
            .delete_message(message.channel_id, message.message_id)
            .await
        {
            tracing::debug!(
                channel = message.channel_id,
                message = message.message_id,
                error = %e,
                "sanitizer failed to delete message"
            );
        } else {
            self.metrics.record_sanitizer_removal();
        }

        let notice = format!(
            "<@{}> ❌ This channel is for `/{}` commands only.",
            message.author_id, self.config.command_name
        );
        if let Err(e) = actions
            .post_transient_notice(message.channel_id, notice, NOTICE_TTL)
            .await
        {
            tracing::debug!(
                channel = message.channel_id,
                error = %e,
                "sanitizer failed to post notice"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::PlatformError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn sanitizer() -> ChannelSanitizer {
        ChannelSanitizer::new(
            SanitizerConfig {
                channel: 100,
                command_name: "success".to_string(),
            },
            Arc::new(Metrics::new()),
        )
    }

    fn message(channel: ChannelId, own: bool, command: bool) -> InboundMessage {
        InboundMessage {
            channel_id: channel,
            message_id: 555,
            author_id: 7,
            authored_by_self: own,
            is_command: command,
        }
    }

    #[test]
    fn test_plain_message_in_restricted_channel_removed() {
        assert_eq!(
            sanitizer().evaluate(&message(100, false, false)),
            SanitizerVerdict::Remove
        );
    }

    #[test]
    fn test_other_channels_ignored() {
        assert_eq!(
            sanitizer().evaluate(&message(200, false, false)),
            SanitizerVerdict::Ignore
        );
    }

    #[test]
    fn test_own_messages_exempt() {
        assert_eq!(
            sanitizer().evaluate(&message(100, true, false)),
            SanitizerVerdict::Ignore
        );
    }

    #[test]
    fn test_commands_exempt() {
        assert_eq!(
            sanitizer().evaluate(&message(100, false, true)),
            SanitizerVerdict::Ignore
        );
    }

    #[derive(Default)]
    struct RecordingActions {
        deleted: Mutex<Vec<u64>>,
        notices: Mutex<Vec<(String, Duration)>>,
        fail_delete: bool,
        fail_notice: bool,
    }

    #[async_trait]
    impl MessageActions for RecordingActions {
        async fn delete_message(
            &self,
            _channel: ChannelId,
            message: u64,
        ) -> Result<(), PlatformError> {
            if self.fail_delete {
                return Err(PlatformError::new("missing permission"));
            }
            self.deleted.lock().unwrap().push(message);
            Ok(())
        }

        async fn post_transient_notice(
            &self,
            _channel: ChannelId,
            text: String,
            ttl: Duration,
        ) -> Result<(), PlatformError> {
            if self.fail_notice {
                return Err(PlatformError::new("send failed"));
            }
            self.notices.lock().unwrap().push((text, ttl));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_enforce_deletes_and_posts_notice() {
        let actions = RecordingActions::default();
        sanitizer().enforce(&message(100, false, false), &actions).await;

        assert_eq!(actions.deleted.lock().unwrap().as_slice(), &[555]);
        let notices = actions.notices.lock().unwrap();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].0.contains("`/success`"));
        assert!(notices[0].0.contains("<@7>"));
        assert_eq!(notices[0].1, NOTICE_TTL);
    }

    #[tokio::test]
    async fn test_enforce_swallows_platform_failures() {
        let actions = RecordingActions {
            fail_delete: true,
            fail_notice: true,
            ..Default::default()
        };

        // Must not panic or propagate anything.
        sanitizer().enforce(&message(100, false, false), &actions).await;

        assert!(actions.deleted.lock().unwrap().is_empty());
        assert!(actions.notices.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_enforce_ignores_exempt_messages() {
        let actions = RecordingActions::default();
        sanitizer().enforce(&message(100, false, true), &actions).await;

        assert!(actions.deleted.lock().unwrap().is_empty());
        assert!(actions.notices.lock().unwrap().is_empty());
    }
}
