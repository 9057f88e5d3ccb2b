/*!
 * Mock provider implementations for testing.
 *
 * This module provides a scripted provider that simulates different backends:
 * - `MockProvider::working()` - Answers translation prompts with `[locale] text`
 * - `MockProvider::intermittent(n)` - Fails every nth request
 * - `MockProvider::failing()` - Always fails with an error
 * - `MockProvider::malformed()` - Answers with prose instead of JSON
 *
 * Every call is recorded with its timing so tests can check ordering and
 * concurrency bounds.
 */

use async_trait::async_trait;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;
use serde_json::{json, Map, Value};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::app_config::ProviderConfig;
use crate::errors::ProviderError;
use crate::translation::prompts::Prompt;

use super::{Provider, RequestOptions, CONNECTION_TEST_MESSAGE};

/// Custom reply generator, given the prompt and the zero-based call number
pub type Responder = Arc<dyn Fn(&Prompt, usize) -> Result<String, ProviderError> + Send + Sync>;

/// Locale codes in a rendered `code (Name), ...` list
static LOCALE_CODE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|, )([A-Za-z]{2,3}(?:-[A-Za-z0-9]+)*) \(").expect("Invalid locale regex")
});

/// Indexed batch lines such as `[3] "text"`
static BATCH_ITEM_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[(\d+)\] (.*)$").expect("Invalid batch item regex"));

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a well-formed translation
    Working,
    /// Well-formed translation wrapped in a Markdown code fence
    Fenced,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Returns prose that is not JSON
    Malformed,
    /// Returns an empty JSON object
    Empty,
}

/// One recorded call
#[derive(Debug, Clone)]
pub struct MockCall {
    /// Zero-based call number
    pub index: usize,
    /// User message that was sent
    pub user_message: String,
    /// When the call started
    pub started_at: Instant,
    /// When the call returned
    pub finished_at: Instant,
}

#[derive(Default)]
struct MockState {
    request_count: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls: Mutex<Vec<MockCall>>,
}

/// Mock provider for testing translation behavior
#[derive(Clone)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Simulated latency per call
    delay: Option<Duration>,
    /// Custom reply generator (optional)
    responder: Option<Responder>,
    /// Counters shared between clones
    state: Arc<MockState>,
}

impl fmt::Debug for MockProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockProvider")
            .field("behavior", &self.behavior)
            .field("delay", &self.delay)
            .field("custom_responder", &self.responder.is_some())
            .field("request_count", &self.request_count())
            .finish()
    }
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            delay: None,
            responder: None,
            state: Arc::new(MockState::default()),
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a working mock whose replies are fenced as ```json blocks
    pub fn fenced() -> Self {
        Self::new(MockBehavior::Fenced)
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent {
            fail_every: fail_every.max(1),
        })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that answers with non-JSON prose
    pub fn malformed() -> Self {
        Self::new(MockBehavior::Malformed)
    }

    /// Create a mock that answers with `{}`
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Simulate latency on every call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Replace the behavior with a custom reply generator
    pub fn with_responder<F>(mut self, responder: F) -> Self
    where
        F: Fn(&Prompt, usize) -> Result<String, ProviderError> + Send + Sync + 'static,
    {
        self.responder = Some(Arc::new(responder));
        self
    }

    /// Number of calls received so far
    pub fn request_count(&self) -> usize {
        self.state.request_count.load(Ordering::SeqCst)
    }

    /// Highest number of calls that were in flight at the same time
    pub fn max_in_flight(&self) -> usize {
        self.state.max_in_flight.load(Ordering::SeqCst)
    }

    /// Completed calls, in completion order
    pub fn calls(&self) -> Vec<MockCall> {
        self.state.calls.lock().clone()
    }

    /// Reply a well-behaved model would give to `prompt`
    ///
    /// Batch prompts get `{"<i>": {"<locale>": "[<locale>] <text>"}}`,
    /// single prompts get `{"translations": {...}}` and anything else is
    /// echoed back.
    pub fn working_reply(prompt: &Prompt) -> String {
        let message = &prompt.user_message;

        if let Some(locales) = requested_locales(message, " texts to: ") {
            let mut reply = Map::new();
            for line in message.lines() {
                let Some(captures) = BATCH_ITEM_REGEX.captures(line) else {
                    continue;
                };
                let Some(text) = leading_json_string(&captures[2]) else {
                    continue;
                };
                reply.insert(captures[1].to_string(), fake_translations(&text, &locales));
            }
            return Value::Object(reply).to_string();
        }

        if let Some(locales) = requested_locales(message, " text to the following languages: ") {
            let text = message
                .lines()
                .find_map(|line| line.split_once(" text: ").and_then(|(_, rest)| leading_json_string(rest)))
                .unwrap_or_default();
            return json!({ "translations": fake_translations(&text, &locales) }).to_string();
        }

        if message == CONNECTION_TEST_MESSAGE {
            return "API connection successful".to_string();
        }

        format!("[mock] {}", message)
    }

    fn reply(&self, prompt: &Prompt, count: usize) -> Result<String, ProviderError> {
        if let Some(responder) = &self.responder {
            return responder(prompt, count);
        }

        match self.behavior {
            MockBehavior::Working => Ok(Self::working_reply(prompt)),
            MockBehavior::Fenced => Ok(format!("```json\n{}\n```", Self::working_reply(prompt))),
            MockBehavior::Intermittent { fail_every } => {
                if count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        status_code: 503,
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                    })
                } else {
                    Ok(Self::working_reply(prompt))
                }
            }
            MockBehavior::Failing => Err(ProviderError::ApiError {
                status_code: 500,
                message: "Simulated provider failure".to_string(),
            }),
            MockBehavior::Malformed => Ok("Sure! Here are the translations you asked for.".to_string()),
            MockBehavior::Empty => Ok("{}".to_string()),
        }
    }
}

/// Locale codes listed after `marker` on the first line that contains it
fn requested_locales(message: &str, marker: &str) -> Option<Vec<String>> {
    let line = message.lines().find(|line| line.contains(marker))?;
    let (_, list) = line.split_once(marker)?;
    Some(
        LOCALE_CODE_REGEX
            .captures_iter(list)
            .map(|c| c[1].to_string())
            .collect(),
    )
}

/// Decode the JSON string literal at the start of `input`, ignoring any trailer
fn leading_json_string(input: &str) -> Option<String> {
    serde_json::Deserializer::from_str(input)
        .into_iter::<String>()
        .next()
        .and_then(Result::ok)
}

fn fake_translations(text: &str, locales: &[String]) -> Value {
    Value::Object(
        locales
            .iter()
            .map(|locale| (locale.clone(), Value::String(format!("[{}] {}", locale, text))))
            .collect(),
    )
}

/// Decrements the in-flight counter when a call ends, even if it was dropped
struct InFlight<'a>(&'a MockState);

impl<'a> InFlight<'a> {
    fn enter(state: &'a MockState) -> Self {
        let now = state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        state.max_in_flight.fetch_max(now, Ordering::SeqCst);
        Self(state)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "Mock"
    }

    async fn send(
        &self,
        prompt: &Prompt,
        _config: &ProviderConfig,
        _options: &RequestOptions,
    ) -> Result<String, ProviderError> {
        let count = self.state.request_count.fetch_add(1, Ordering::SeqCst);
        let started_at = Instant::now();
        let _guard = InFlight::enter(&self.state);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let result = self.reply(prompt, count);

        self.state.calls.lock().push(MockCall {
            index: count,
            user_message: prompt.user_message.clone(),
            started_at,
            finished_at: Instant::now(),
        });

        result
    }
}
