// Vouchmark service library
//
// The chat-platform gateway embeds this crate: it hands submissions to
// pipeline::SubmissionService, feeds channel traffic to
// sanitizer::ChannelSanitizer, and implements the traits in platform.

pub mod config;
pub mod error;
pub mod fetcher;
pub mod gate;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod platform;
pub mod sanitizer;
pub mod server;
pub mod watermark;
