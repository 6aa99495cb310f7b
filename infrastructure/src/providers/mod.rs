//! Provider adapters implementing [`ChatProvider`](schatphone_application::ChatProvider)
//!
//! One adapter per protocol family; the gateway selects between them from
//! the configured URL.

pub mod gemini;
mod http_error;
pub mod openai;

#[cfg(test)]
mod test_support;

pub use gemini::GeminiProvider;
pub use openai::OpenAiCompatibleProvider;
