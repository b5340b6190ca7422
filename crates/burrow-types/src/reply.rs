//! Replies returned to the dispatch layer.
//!
//! The engine never prints. Every command produces a [`Reply`] whose
//! tone tells the surrounding transport (REPL, chat bridge) how to
//! present it; the original chat front end mapped tones to colors.

/// Presentation hint for a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Plain output, e.g. file contents or a variable value.
    Info,
    /// A state change that succeeded.
    Success,
    /// Something was off but the command still went through.
    Warning,
    /// The command failed.
    Error,
}

/// A single message handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub tone: Tone,
}

impl Reply {
    pub fn info(text: impl Into<String>) -> Self {
        Self { text: text.into(), tone: Tone::Info }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self { text: text.into(), tone: Tone::Success }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self { text: text.into(), tone: Tone::Warning }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { text: text.into(), tone: Tone::Error }
    }

    /// True unless the reply carries the error tone.
    pub fn ok(&self) -> bool {
        self.tone != Tone::Error
    }
}

impl From<crate::Error> for Reply {
    fn from(err: crate::Error) -> Self {
        Reply::error(err.to_string())
    }
}
