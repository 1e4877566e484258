pub mod factory;
pub mod openai;

pub use factory::{create_provider, create_provider_with_env};
pub use openai::OpenAIProvider;
