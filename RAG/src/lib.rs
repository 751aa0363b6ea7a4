pub mod augmentation;
pub mod chat_service;
pub mod config;
pub mod error;
pub mod gemini_service;
pub mod models;
pub mod prompt_composer;
pub mod query_refiner;
pub mod search_service;

pub use augmentation::{AugmentationDecider, AugmentationPolicy};
pub use chat_service::ChatService;
pub use config::AppConfig;
pub use error::{UpstreamError, UpstreamResult};
pub use gemini_service::{GeminiService, GenerationClient};
pub use models::*;
pub use search_service::{GoogleSearchService, SearchClient};
