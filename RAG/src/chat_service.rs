use crate::augmentation::{date_answer, is_date_query, AugmentationDecider};
use crate::config::AppConfig;
use crate::error::UpstreamError;
use crate::gemini_service::{GeminiService, GenerationClient};
use crate::models::*;
use crate::prompt_composer::compose_prompt;
use crate::query_refiner::refine_query;
use crate::search_service::{GoogleSearchService, SearchClient};
use anyhow::Result;
use chrono::{Local, NaiveDate};
use std::sync::Arc;

pub const MISSING_CONFIG_ANSWER: &str = "Thiếu cấu hình API key.";
pub const APOLOGY_ANSWER: &str = "Xin lỗi, đã có lỗi xảy ra.";
pub const EMPTY_PROMPT_ANSWER: &str = "Vui lòng nhập câu hỏi.";

pub type Clock = fn() -> NaiveDate;

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Runs one prompt through decide → refine → search → compose → generate.
/// Every outcome, including upstream failures, becomes a `ChatResponse`.
pub struct ChatService {
    decider: AugmentationDecider,
    search: Arc<dyn SearchClient>,
    generator: Arc<dyn GenerationClient>,
    generation_configured: bool,
    date_fast_path: bool,
    search_result_limit: usize,
    clock: Clock,
}

impl ChatService {
    pub fn new(
        config: &AppConfig,
        search: Arc<dyn SearchClient>,
        generator: Arc<dyn GenerationClient>,
    ) -> Self {
        Self {
            decider: AugmentationDecider::new(config.augmentation_policy, generator.clone()),
            search,
            generator,
            generation_configured: config.has_generation_credentials(),
            date_fast_path: config.date_fast_path,
            search_result_limit: config.search_result_limit,
            clock: local_today,
        }
    }

    /// Wires the Gemini and Google Search clients from configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let generator: Arc<dyn GenerationClient> = Arc::new(GeminiService::new(config)?);
        let search: Arc<dyn SearchClient> = Arc::new(GoogleSearchService::new(config)?);

        if !config.has_generation_credentials() {
            log::warn!("GEMINI_API_KEY is not set, every request will report missing configuration");
        }
        if !config.has_search_credentials() {
            log::warn!("Search credentials are not set, answers will not be augmented");
        }

        Ok(Self::new(config, search, generator))
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub async fn respond(&self, prompt: &str) -> ChatResponse {
        if !self.generation_configured {
            log::warn!("Rejecting prompt: generation credentials missing");
            return ChatResponse::failed(MISSING_CONFIG_ANSWER, "configuration_missing");
        }

        let prompt = prompt.trim();
        if prompt.is_empty() {
            return ChatResponse::failed(EMPTY_PROMPT_ANSWER, "invalid_request");
        }

        let today = (self.clock)();

        if self.date_fast_path && is_date_query(prompt) {
            log::info!("Answering date question locally");
            return ChatResponse::answered(date_answer(today), Vec::new());
        }

        let snippets = if self.decider.needs_live_context(prompt).await {
            let search_query = refine_query(prompt, today);
            log::info!("Augmenting with search for: {}", search_query);
            self.search.search(&search_query, self.search_result_limit).await
        } else {
            log::info!("Answering without search ({} policy)", self.decider.policy());
            Vec::new()
        };

        let composed = compose_prompt(prompt, &snippets, today);

        match self.generator.generate(&composed).await {
            Ok(answer) => {
                log::info!("Generated answer with {} sources", snippets.len());
                ChatResponse::answered(answer, snippets)
            }
            Err(e) => {
                log::error!("Generation failed: {}", e);
                failure_response(&e)
            }
        }
    }
}

fn failure_response(error: &UpstreamError) -> ChatResponse {
    let answer = match error {
        UpstreamError::ConfigurationMissing(_) => MISSING_CONFIG_ANSWER,
        UpstreamError::UpstreamTransportFailure(_) | UpstreamError::UpstreamResponseMalformed(_) => {
            APOLOGY_ANSWER
        }
    };
    ChatResponse::failed(answer, error.kind())
}
