use crate::config::HumanizeConfig;
use crate::llm::{CompletionRequest, FinishReason, LlmBackend, LlmError, Message};
use crate::rewrite::{RandomSource, Rewriter, SeededRandom, ThreadRandom};
use humanizer_core::humanize::HumanizeRequest;

use std::sync::Arc;
use thiserror::Error;

pub const SYSTEM_PROMPT: &str = r#"You are an expert academic writer with 20 years of experience. Refine the text you are given so it reads as authentically human-written while preserving all of its original content and meaning.

Structure:
- Keep every heading, subheading and formatting element exactly as it is.
- Keep the original document structure and length.
- Keep technical terms, proper nouns and specialized vocabulary untouched.

Style:
- Vary sentence structure noticeably, mixing short and long sentences.
- Allow the occasional minor, natural grammatical imperfection.
- Use fitting transitional phrases between ideas.
- Break paragraphs where a human writer would pause.
- Use somewhat more complex sentences than typical machine output.

Language:
- Add the occasional colloquialism that suits academic writing.
- Use a few more metaphors and analogies than machine output usually does, without overdoing it.
- Include one or two rare but correct words per paragraph.
- Let the tone shift subtly within the piece.

Detection:
- Avoid phrases commonly flagged as machine-written.
- Introduce very small, human inconsistencies in style.
- Now and then restate a concept in different words.
- Include one or two slightly tangential but relevant thoughts per page.

The output must be indistinguishable from skilled human writing at the postgraduate level."#;

const HUMANIZE_INSTRUCTION: &str = "Please humanize the following text:";
const REFINE_INSTRUCTION: &str = "Please refine this text to make it sound even more human-like, paying special attention to varying sentence structure and adding subtle imperfections:";

#[derive(Debug, Error)]
pub enum HumanizeError {
    #[error("Invalid input: text is required.")]
    MissingText,
    #[error("Invalid input: temperature must be a number.")]
    InvalidTemperature,
    #[error(transparent)]
    Upstream(#[from] LlmError),
}

/// Completion passes of a single request.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Pass {
    Initial,
    Refine,
}

impl Pass {
    fn instruction(self) -> &'static str {
        match self {
            Pass::Initial => HUMANIZE_INSTRUCTION,
            Pass::Refine => REFINE_INSTRUCTION,
        }
    }
}

pub type RandomFactory = Arc<dyn Fn() -> Box<dyn RandomSource> + Send + Sync>;

pub struct Humanizer {
    backend: Arc<dyn LlmBackend>,
    settings: HumanizeConfig,
    rewriter: Rewriter,
    random: RandomFactory,
}

impl Humanizer {
    pub fn new(backend: Arc<dyn LlmBackend>, settings: HumanizeConfig, rewriter: Rewriter) -> Self {
        let random: RandomFactory = match settings.seed {
            Some(seed) => {
                Arc::new(move || Box::new(SeededRandom::new(seed)) as Box<dyn RandomSource>)
            }
            None => Arc::new(|| Box::new(ThreadRandom::new()) as Box<dyn RandomSource>),
        };
        Self {
            backend,
            settings,
            rewriter,
            random,
        }
    }

    /// Replaces the random source used by the rewrite pass.
    pub fn with_random<F>(mut self, random: F) -> Self
    where
        F: Fn() -> Box<dyn RandomSource> + Send + Sync + 'static,
    {
        self.random = Arc::new(random);
        self
    }

    pub async fn humanize(&self, request: HumanizeRequest) -> Result<String, HumanizeError> {
        let text = request
            .text
            .filter(|text| !text.is_empty())
            .ok_or(HumanizeError::MissingText)?;
        let model = request
            .model
            .filter(|model| !model.is_empty())
            .unwrap_or_else(|| self.settings.default_model.clone());
        let temperature = match request.temperature {
            Some(temperature) => temperature
                .value()
                .ok_or(HumanizeError::InvalidTemperature)?,
            None => self.settings.default_temperature,
        };

        let output = self.complete_passes(&text, &model, temperature).await?;
        log::debug!("rewriting {} characters of model output", output.len());
        Ok(self.rewrite(&output))
    }

    /// Runs the initial pass and, for long inputs, the refining pass over its
    /// output. Returns the raw model text.
    pub async fn complete_passes(
        &self,
        text: &str,
        model: &str,
        temperature: f32,
    ) -> Result<String, HumanizeError> {
        let first = self
            .complete(Pass::Initial, text, model, self.settings.temperature.clamp(temperature))
            .await?;

        if text.chars().count() <= self.settings.refine_threshold {
            return Ok(first);
        }

        let refine_temperature = self
            .settings
            .refine_temperature
            .clamp(temperature + self.settings.refine_temperature_boost);
        self.complete(Pass::Refine, &first, model, refine_temperature)
            .await
    }

    async fn complete(
        &self,
        pass: Pass,
        input: &str,
        model: &str,
        temperature: f32,
    ) -> Result<String, HumanizeError> {
        log::debug!(
            "{pass:?} pass pending on {} (model {model}, temperature {temperature})",
            self.backend.id()
        );
        let request = self.completion_request(pass, input, model, temperature);

        let response = self.backend.complete(request).await.map_err(|e| {
            log::error!("{pass:?} pass failed - {e}");
            HumanizeError::from(e)
        })?;

        if response.finish_reason == FinishReason::Length {
            log::warn!("{pass:?} pass output was truncated at the token limit");
        }
        log::debug!("{pass:?} pass done, {} tokens used", response.usage.total());
        Ok(response.content)
    }

    fn completion_request(
        &self,
        pass: Pass,
        input: &str,
        model: &str,
        temperature: f32,
    ) -> CompletionRequest {
        let system_prompt = self
            .settings
            .system_prompt
            .as_deref()
            .unwrap_or(SYSTEM_PROMPT);

        CompletionRequest::new(model)
            .with_system(system_prompt)
            .with_message(Message::user(format!("{}\n\n{input}", pass.instruction())))
            .with_max_tokens(self.settings.max_tokens)
            .with_temperature(temperature)
    }

    fn rewrite(&self, text: &str) -> String {
        let mut random = (self.random)();
        self.rewriter.rewrite(text, random.as_mut())
    }
}
