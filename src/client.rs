use async_openai::{Client, config::OpenAIConfig, types::CreateChatCompletionRequestArgs};
use std::time::{Duration, Instant};
use tokio::time::{sleep, timeout};

use crate::config::RunConfig;
use crate::models::CompletionResult;

/// Chat-completion client with rate limiting and a fallback mode.
///
/// The credential is resolved once at construction; if the configured
/// environment variable is unset the client stays in fallback mode for the
/// whole run and every call returns the empty result. Per-call failures and
/// timeouts also produce the fallback result, never an error: the run
/// measures failure rates, so there are no retries.
pub struct CompletionClient {
    client: Option<Client<OpenAIConfig>>,
    model: String,
    temperature: f64,
    max_tokens: u32,
    call_timeout: Duration,
    rate_limit_rps: f64,
    last_request: Option<Instant>,
}

impl CompletionClient {
    /// Create a client from the run configuration
    pub fn new(config: &RunConfig) -> Self {
        let client = std::env::var(&config.env_var_api_key).ok().map(|api_key| {
            let openai_config = OpenAIConfig::new()
                .with_api_key(api_key)
                .with_api_base(&config.api_endpoint);
            Client::with_config(openai_config)
        });

        Self {
            client,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            call_timeout: Duration::from_secs(config.timeout_secs),
            rate_limit_rps: config.rate_limit_rps,
            last_request: None,
        }
    }

    /// Whether the run has no credential and every call will fall back
    pub fn is_fallback_mode(&self) -> bool {
        self.client.is_none()
    }

    /// Issue one completion call. Never fails: any error or timeout is
    /// converted into the fallback result.
    pub async fn complete(&mut self, request: &str) -> CompletionResult {
        let Some(client) = &self.client else {
            return CompletionResult::fallback();
        };

        Self::enforce_rate_limit(&mut self.last_request, self.rate_limit_rps).await;

        let chat_request = match self.build_request(request) {
            Ok(chat_request) => chat_request,
            Err(_) => return CompletionResult::fallback(),
        };

        match timeout(self.call_timeout, client.chat().create(chat_request)).await {
            Ok(Ok(response)) => {
                let raw_text = response
                    .choices
                    .first()
                    .and_then(|choice| choice.message.content.clone())
                    .unwrap_or_default();
                CompletionResult {
                    raw_text,
                    succeeded: true,
                }
            }
            Ok(Err(_)) | Err(_) => CompletionResult::fallback(),
        }
    }

    /// Enforce a minimum interval between requests
    async fn enforce_rate_limit(last_request: &mut Option<Instant>, rate_limit_rps: f64) {
        if rate_limit_rps <= 0.0 {
            return;
        }

        let min_interval = Duration::from_secs_f64(1.0 / rate_limit_rps);

        if let Some(last_time) = *last_request {
            let elapsed = last_time.elapsed();
            if elapsed < min_interval {
                sleep(min_interval - elapsed).await;
            }
        }

        *last_request = Some(Instant::now());
    }

    fn build_request(
        &self,
        prompt: &str,
    ) -> anyhow::Result<async_openai::types::CreateChatCompletionRequest> {
        let user_message = async_openai::types::ChatCompletionRequestUserMessageArgs::default()
            .content(prompt.to_string())
            .build()?
            .into();

        Ok(CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages([user_message])
            .temperature(self.temperature as f32)
            .max_tokens(self.max_tokens as u16)
            .build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::Instant as TokioInstant;

    fn test_config(env_var: &str, endpoint: &str) -> RunConfig {
        RunConfig {
            api_endpoint: endpoint.to_string(),
            env_var_api_key: env_var.to_string(),
            model: "gpt-3.5-turbo".to_string(),
            dataset_path: "data/reviews.csv".to_string(),
            sample_size: 10,
            seed: 42,
            temperature: 0.0,
            max_tokens: 64,
            timeout_secs: 5,
            rate_limit_rps: 0.0,
            storage_path: None,
        }
    }

    fn completion_body(content: &str) -> String {
        serde_json::json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "created": 0,
            "model": "gpt-3.5-turbo",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_missing_credential_enters_fallback_mode() {
        let env_var = "RPE_TEST_KEY_ABSENT";
        unsafe {
            std::env::remove_var(env_var);
        }

        let mut client = CompletionClient::new(&test_config(env_var, "http://localhost:1"));
        assert!(client.is_fallback_mode());

        let result = client.complete("test prompt").await;
        assert!(!result.succeeded);
        assert_eq!(result.raw_text, "");
    }

    #[tokio::test]
    async fn test_successful_completion() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body("{\"rating\": 4}"))
            .create_async()
            .await;

        let env_var = "RPE_TEST_KEY_SUCCESS";
        unsafe {
            std::env::set_var(env_var, "test-key");
        }

        let mut client = CompletionClient::new(&test_config(env_var, &server.url()));
        assert!(!client.is_fallback_mode());

        let result = client.complete("rate this review").await;
        assert!(result.succeeded);
        assert_eq!(result.raw_text, "{\"rating\": 4}");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_garbled_response_falls_back() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("not json at all")
            .create_async()
            .await;

        let env_var = "RPE_TEST_KEY_GARBLED";
        unsafe {
            std::env::set_var(env_var, "test-key");
        }

        let mut client = CompletionClient::new(&test_config(env_var, &server.url()));
        let result = client.complete("rate this review").await;
        assert!(!result.succeeded);
        assert_eq!(result.raw_text, "");
    }

    #[tokio::test]
    async fn test_enforce_rate_limit_no_limit() {
        let mut last_request = None;
        let start = TokioInstant::now();

        CompletionClient::enforce_rate_limit(&mut last_request, 0.0).await;

        assert!(start.elapsed() < Duration::from_millis(10));
        assert!(last_request.is_none());
    }

    #[tokio::test]
    async fn test_enforce_rate_limit_first_request() {
        let mut last_request = None;
        let start = TokioInstant::now();

        CompletionClient::enforce_rate_limit(&mut last_request, 10.0).await;

        assert!(start.elapsed() < Duration::from_millis(10));
        assert!(last_request.is_some());
    }

    #[tokio::test]
    async fn test_enforce_rate_limit_with_sleep() {
        let mut last_request = Some(Instant::now());
        let start = TokioInstant::now();

        CompletionClient::enforce_rate_limit(&mut last_request, 100.0).await;

        assert!(start.elapsed() >= Duration::from_millis(8));
    }
}
