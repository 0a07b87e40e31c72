pub mod gemini;
mod gemini_types;
pub mod http_client;
pub mod response;
pub mod traits;

pub use gemini::GeminiProvider;
pub use http_client::build_provider_client_with_timeout;
pub use response::{ContentBlock, MessageRole, ProviderMessage};
pub use traits::{ChatRequest, Provider};
