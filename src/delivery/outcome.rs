//! Terminal result of one delivery attempt.

/// What the pipeline ultimately did with a request.
///
/// Exactly one of these is produced per invocation. The local artifact
/// is gone by the time the caller sees the outcome, so variants carry
/// sizes and URLs rather than paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Media was sent directly in the chat.
    InlineAttachment {
        /// Size of the file that was actually sent.
        size_bytes: u64,
        /// Set when the artifact was re-encoded down to fit the inline
        /// limit; holds the pre-compression size.
        compressed_from_bytes: Option<u64>,
    },
    /// Media was pushed to a storage provider and the user got a link.
    RemoteLink {
        provider: &'static str,
        url: String,
        size_bytes: u64,
    },
    /// Nothing was delivered; the user got this message instead.
    Failure { message: String },
}

impl DeliveryOutcome {
    /// Short tag for log lines.
    pub fn kind_label(&self) -> &'static str {
        match self {
            DeliveryOutcome::InlineAttachment {
                compressed_from_bytes: Some(_),
                ..
            } => "inline (compressed)",
            DeliveryOutcome::InlineAttachment { .. } => "inline",
            DeliveryOutcome::RemoteLink { .. } => "remote link",
            DeliveryOutcome::Failure { .. } => "failure",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, DeliveryOutcome::Failure { .. })
    }
}
