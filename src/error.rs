use thiserror::Error;

// Each subsystem owns a typed error. Callers match on these to pick a
// response; ad-hoc context chains stay on `anyhow`.

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("validation failed: {0}")]
    Validation(String),
}

// ─── LLM / Provider errors ──────────────────────────────────────────────────

/// Failures reaching the inference service. Malformed replies are never
/// represented here; they degrade to an `unknown` classification instead.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("provider {provider} is not configured (missing API key)")]
    NotConfigured { provider: String },

    #[error("provider {provider} request failed: {message}")]
    Request { provider: String, message: String },

    #[error("provider {provider} authentication failed")]
    Auth { provider: String },
}

// ─── Tool errors ────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {name}")]
    NotFound { name: String },

    #[error("tool {name} rejected arguments: {message}")]
    InvalidArguments { name: String, message: String },

    #[error("tool {name} execution failed: {message}")]
    Execution { name: String, message: String },
}

// ─── Transport errors ───────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid frame payload: {0}")]
    InvalidFrame(String),
}
