//! Guardrail dispatcher
//!
//! Runs the input guardrails concurrently with the generation call. The first
//! veto cancels generation and returns that guardrail's refusal; when every
//! guardrail passes, the generation result is returned. Output guardrails then
//! run in order on the generated text.

use std::str::FromStr;
use std::sync::Arc;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use tokio::task::AbortHandle;
use tracing::Instrument;

use super::config::GuardrailConfig;
use super::moderation::ModerationGuardrail;
use super::prompts::DEFAULT_SYSTEM_PROMPT;
use super::topical::TopicalGuardrail;
use crate::error::LlmError;
use crate::traits::{ChatCapability, InputGuardrail, OutputGuardrail};
use crate::types::{ChatMessage, ChatRequest, GuardedResponse, GuardrailVerdict};
use crate::utils::cancel::{new_cancel_handle, run_cancellable};

/// What to do when generation finishes before every input guardrail has reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RacePolicy {
    /// Return the generation result immediately; pending guardrails are aborted.
    #[default]
    FirstComplete,
    /// Hold the generation result until every guardrail has passed. A late
    /// veto still wins.
    AwaitVerdicts,
}

impl FromStr for RacePolicy {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "first_complete" => Ok(Self::FirstComplete),
            "await_verdicts" => Ok(Self::AwaitVerdicts),
            other => Err(LlmError::ConfigurationError(format!(
                "unknown race policy '{other}' (expected first_complete or await_verdicts)"
            ))),
        }
    }
}

/// Aborts every registered task when dropped, so no guardrail or generation
/// call outlives the dispatch that started it.
struct AbortOnDrop(Vec<AbortHandle>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        for handle in &self.0 {
            handle.abort();
        }
    }
}

/// A chat client wrapped in input and output guardrails.
#[derive(Clone)]
pub struct GuardedChat {
    client: Arc<dyn ChatCapability>,
    input_guardrails: Vec<Arc<dyn InputGuardrail>>,
    output_guardrails: Vec<Arc<dyn OutputGuardrail>>,
    system_prompt: String,
    model: Option<String>,
    temperature: Option<f32>,
    race_policy: RacePolicy,
}

impl GuardedChat {
    /// A dispatcher with no guardrails; add them with the `with_*` methods.
    pub fn new(client: Arc<dyn ChatCapability>) -> Self {
        Self {
            client,
            input_guardrails: Vec::new(),
            output_guardrails: Vec::new(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            model: None,
            temperature: None,
            race_policy: RacePolicy::default(),
        }
    }

    /// Topical input guardrail plus moderation output guardrail, all calls
    /// going through `client`.
    pub fn from_config(client: Arc<dyn ChatCapability>, config: &GuardrailConfig) -> Self {
        let mut topical = TopicalGuardrail::new(Arc::clone(&client))
            .with_system_prompt(config.topical_prompt.clone())
            .with_temperature(config.guardrail_temperature);
        let mut moderation = ModerationGuardrail::new(Arc::clone(&client))
            .with_rubric(config.moderation_rubric.clone())
            .with_threshold(config.moderation_threshold)
            .with_temperature(config.guardrail_temperature);
        if let Some(model) = &config.guardrail_model {
            topical = topical.with_model(model.clone());
            moderation = moderation.with_model(model.clone());
        }

        let mut chat = Self::new(client)
            .with_system_prompt(config.system_prompt.clone())
            .with_temperature(config.chat_temperature)
            .with_race_policy(config.race_policy)
            .with_input_guardrail(Arc::new(topical))
            .with_output_guardrail(Arc::new(moderation));
        chat.model = config.chat_model.clone();
        chat
    }

    pub fn with_input_guardrail(mut self, guardrail: Arc<dyn InputGuardrail>) -> Self {
        self.input_guardrails.push(guardrail);
        self
    }

    pub fn with_output_guardrail(mut self, guardrail: Arc<dyn OutputGuardrail>) -> Self {
        self.output_guardrails.push(guardrail);
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub const fn with_race_policy(mut self, policy: RacePolicy) -> Self {
        self.race_policy = policy;
        self
    }

    fn generation_request(&self, request: &str) -> ChatRequest {
        let mut builder = ChatRequest::builder()
            .message(ChatMessage::system(self.system_prompt.clone()))
            .message(ChatMessage::user(request));
        if let Some(model) = &self.model {
            builder = builder.model(model.clone());
        }
        if let Some(t) = self.temperature {
            builder = builder.temperature(t);
        }
        builder.build()
    }

    /// The generation call alone, without guardrails.
    pub async fn generate(&self, request: &str) -> Result<String, LlmError> {
        let response = self
            .client
            .chat_request(self.generation_request(request))
            .await?;
        Ok(response.into_text())
    }

    /// Race the input guardrails against generation.
    pub async fn execute(&self, request: &str) -> Result<GuardedResponse, LlmError> {
        let span = tracing::debug_span!(
            "guarded_chat",
            request_id = %uuid::Uuid::new_v4(),
            guardrails = self.input_guardrails.len()
        );
        self.race(request).instrument(span).await
    }

    async fn race(&self, request: &str) -> Result<GuardedResponse, LlmError> {
        let cancel = new_cancel_handle();
        let client = Arc::clone(&self.client);
        let chat_request = self.generation_request(request);
        let mut generation = tokio::spawn(
            run_cancellable(cancel.clone(), async move {
                Ok(client.chat_request(chat_request).await?.into_text())
            })
            .in_current_span(),
        );

        let mut tasks = AbortOnDrop(vec![generation.abort_handle()]);
        let mut checks = FuturesUnordered::new();
        for guardrail in &self.input_guardrails {
            let name = guardrail.name().to_string();
            let guardrail = Arc::clone(guardrail);
            let input = request.to_string();
            let handle = tokio::spawn(
                async move { guardrail.check(&input).await }.in_current_span(),
            );
            tasks.0.push(handle.abort_handle());
            checks.push(async move { (name, handle.await) });
        }
        tracing::debug!("generation and input guardrails started");

        let mut held: Option<String> = None;
        loop {
            tokio::select! {
                // Verdicts first, so a veto ready alongside generation still wins.
                biased;

                Some((name, joined)) = checks.next(), if !checks.is_empty() => {
                    let verdict = match joined.map_err(LlmError::from).and_then(|r| r) {
                        Ok(verdict) => verdict,
                        Err(e) => {
                            tracing::debug!(guardrail = %name, error = %e, "input guardrail failed");
                            cancel.cancel();
                            return Err(e);
                        }
                    };
                    match verdict {
                        GuardrailVerdict::Veto { refusal } => {
                            tracing::info!(guardrail = %name, "request vetoed, cancelling generation");
                            cancel.cancel();
                            return Ok(GuardedResponse::refused(name, refusal));
                        }
                        GuardrailVerdict::Pass => {
                            tracing::debug!(guardrail = %name, remaining = checks.len(), "input guardrail passed");
                            if checks.is_empty()
                                && let Some(content) = held.take()
                            {
                                return Ok(GuardedResponse::generated(content));
                            }
                        }
                    }
                }

                joined = &mut generation, if held.is_none() => {
                    let content = joined??;
                    if checks.is_empty() || self.race_policy == RacePolicy::FirstComplete {
                        tracing::debug!(pending_guardrails = checks.len(), "generation finished");
                        return Ok(GuardedResponse::generated(content));
                    }
                    tracing::debug!(pending_guardrails = checks.len(), "generation finished, awaiting verdicts");
                    held = Some(content);
                }

                else => {
                    return Err(LlmError::InternalError(
                        "guarded chat ended without a result".to_string(),
                    ));
                }
            }
        }
    }

    /// Run the output guardrails in order on `content`.
    pub async fn check_output(&self, content: String) -> Result<GuardedResponse, LlmError> {
        for guardrail in &self.output_guardrails {
            if let GuardrailVerdict::Veto { refusal } = guardrail.check(&content).await? {
                tracing::info!(guardrail = guardrail.name(), "generated content suppressed");
                return Ok(GuardedResponse::refused(guardrail.name(), refusal));
            }
        }
        Ok(GuardedResponse::generated(content))
    }

    /// Input race followed by the output guardrails.
    pub async fn execute_with_output_checks(
        &self,
        request: &str,
    ) -> Result<GuardedResponse, LlmError> {
        match self.execute(request).await? {
            GuardedResponse::Generated { content } => self.check_output(content).await,
            refused => Ok(refused),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;
    use tokio::sync::oneshot;
    use tracing_test::traced_test;

    use crate::types::ChatResponse;

    /// Sets the flag when dropped unless disarmed.
    struct DropFlag(Arc<AtomicBool>, bool);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            if self.1 {
                self.0.store(true, Ordering::SeqCst);
            }
        }
    }

    /// Generation that replies once `release` fires.
    struct GatedChat {
        reply: String,
        release: Mutex<Option<oneshot::Receiver<()>>>,
        abandoned: Arc<AtomicBool>,
    }

    impl GatedChat {
        fn new(reply: &str) -> (Self, oneshot::Sender<()>, Arc<AtomicBool>) {
            let (tx, rx) = oneshot::channel();
            let abandoned = Arc::new(AtomicBool::new(false));
            (
                Self {
                    reply: reply.to_string(),
                    release: Mutex::new(Some(rx)),
                    abandoned: abandoned.clone(),
                },
                tx,
                abandoned,
            )
        }
    }

    #[async_trait]
    impl ChatCapability for GatedChat {
        async fn chat_request(&self, _request: ChatRequest) -> Result<ChatResponse, LlmError> {
            let mut flag = DropFlag(self.abandoned.clone(), true);
            let rx = self.release.lock().unwrap().take();
            if let Some(rx) = rx {
                let _ = rx.await;
            }
            flag.1 = false;
            Ok(ChatResponse::new(self.reply.clone()))
        }
    }

    /// Input guardrail whose verdict is released by the test.
    struct GatedGuardrail {
        name: String,
        verdict: Mutex<Option<oneshot::Receiver<Result<GuardrailVerdict, LlmError>>>>,
    }

    impl GatedGuardrail {
        fn new(name: &str) -> (Self, oneshot::Sender<Result<GuardrailVerdict, LlmError>>) {
            let (tx, rx) = oneshot::channel();
            (
                Self {
                    name: name.to_string(),
                    verdict: Mutex::new(Some(rx)),
                },
                tx,
            )
        }
    }

    #[async_trait]
    impl InputGuardrail for GatedGuardrail {
        fn name(&self) -> &str {
            &self.name
        }

        async fn check(&self, _request: &str) -> Result<GuardrailVerdict, LlmError> {
            let rx = self.verdict.lock().unwrap().take();
            match rx {
                Some(rx) => rx
                    .await
                    .unwrap_or_else(|_| Err(LlmError::InternalError("verdict dropped".into()))),
                None => Ok(GuardrailVerdict::Pass),
            }
        }
    }

    async fn wait_for(flag: &AtomicBool) {
        tokio::time::timeout(Duration::from_secs(1), async {
            while !flag.load(Ordering::SeqCst) {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("flag should be set");
    }

    #[tokio::test]
    #[traced_test]
    async fn veto_before_generation_cancels_it() {
        let (chat, _release, abandoned) = GatedChat::new("never shown");
        let (guard, verdict) = GatedGuardrail::new("topical");
        let guarded = GuardedChat::new(Arc::new(chat)).with_input_guardrail(Arc::new(guard));

        verdict
            .send(Ok(GuardrailVerdict::veto("Topical guardrail triggered")))
            .unwrap();
        let out = guarded.execute("how do I fix my car?").await.unwrap();

        assert_eq!(out, GuardedResponse::refused("topical", "Topical guardrail triggered"));
        wait_for(&abandoned).await;
        assert!(logs_contain("request vetoed, cancelling generation"));
    }

    #[tokio::test]
    async fn allowed_verdict_then_generation() {
        let (chat, release, _) = GatedChat::new("Cats purr.");
        let (guard, verdict) = GatedGuardrail::new("topical");
        let guarded = Arc::new(GuardedChat::new(Arc::new(chat)).with_input_guardrail(Arc::new(guard)));

        verdict.send(Ok(GuardrailVerdict::Pass)).unwrap();
        let task = {
            let guarded = guarded.clone();
            tokio::spawn(async move { guarded.execute("tell me about cats").await })
        };
        tokio::task::yield_now().await;
        release.send(()).unwrap();

        let out = task.await.unwrap().unwrap();
        assert_eq!(out, GuardedResponse::generated("Cats purr."));
    }

    #[tokio::test]
    async fn generation_first_returns_without_waiting_by_default() {
        let (chat, release, _) = GatedChat::new("Dogs bark.");
        let (guard, _verdict) = GatedGuardrail::new("topical");
        let guarded = GuardedChat::new(Arc::new(chat)).with_input_guardrail(Arc::new(guard));

        release.send(()).unwrap();
        let out = tokio::time::timeout(Duration::from_secs(1), guarded.execute("dogs?"))
            .await
            .expect("must not wait for the pending verdict")
            .unwrap();
        assert_eq!(out.text(), "Dogs bark.");
    }

    #[tokio::test]
    async fn await_verdicts_lets_late_veto_win() {
        let (chat, release, _) = GatedChat::new("Buy a Persian.");
        let (guard, verdict) = GatedGuardrail::new("topical");
        let guarded = Arc::new(
            GuardedChat::new(Arc::new(chat))
                .with_input_guardrail(Arc::new(guard))
                .with_race_policy(RacePolicy::AwaitVerdicts),
        );

        release.send(()).unwrap();
        let task = {
            let guarded = guarded.clone();
            tokio::spawn(async move { guarded.execute("which cat?").await })
        };
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert!(!task.is_finished());

        verdict.send(Ok(GuardrailVerdict::veto("no"))).unwrap();
        let out = task.await.unwrap().unwrap();
        assert!(out.is_refused());
    }

    #[tokio::test]
    async fn await_verdicts_releases_held_result_on_late_pass() {
        let (chat, release, _) = GatedChat::new("Buy a Siamese.");
        let (guard, verdict) = GatedGuardrail::new("topical");
        let guarded = Arc::new(
            GuardedChat::new(Arc::new(chat))
                .with_input_guardrail(Arc::new(guard))
                .with_race_policy(RacePolicy::AwaitVerdicts),
        );

        release.send(()).unwrap();
        let task = {
            let guarded = guarded.clone();
            tokio::spawn(async move { guarded.execute("which cat?").await })
        };
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert!(!task.is_finished());

        verdict.send(Ok(GuardrailVerdict::Pass)).unwrap();
        let out = tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("held result must be released")
            .unwrap()
            .unwrap();
        assert_eq!(out, GuardedResponse::generated("Buy a Siamese."));
    }

    #[tokio::test]
    async fn await_verdicts_holds_until_last_guardrail_passes() {
        let (chat, release, _) = GatedChat::new("Try a Beagle.");
        let (topical, topical_verdict) = GatedGuardrail::new("topical");
        let (pii, pii_verdict) = GatedGuardrail::new("pii");
        let guarded = Arc::new(
            GuardedChat::new(Arc::new(chat))
                .with_input_guardrail(Arc::new(topical))
                .with_input_guardrail(Arc::new(pii))
                .with_race_policy(RacePolicy::AwaitVerdicts),
        );

        topical_verdict.send(Ok(GuardrailVerdict::Pass)).unwrap();
        let task = {
            let guarded = guarded.clone();
            tokio::spawn(async move { guarded.execute("which dog?").await })
        };
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        release.send(()).unwrap();
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert!(!task.is_finished());

        pii_verdict.send(Ok(GuardrailVerdict::Pass)).unwrap();
        let out = tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("held result must be released")
            .unwrap()
            .unwrap();
        assert_eq!(out.text(), "Try a Beagle.");
        assert!(!out.is_refused());
    }

    #[tokio::test]
    async fn guardrail_error_propagates_and_cancels_generation() {
        let (chat, _release, abandoned) = GatedChat::new("unused");
        let (guard, verdict) = GatedGuardrail::new("topical");
        let guarded = GuardedChat::new(Arc::new(chat)).with_input_guardrail(Arc::new(guard));

        verdict
            .send(Err(LlmError::RateLimitError("slow down".into())))
            .unwrap();
        let err = guarded.execute("cats").await.unwrap_err();
        assert!(matches!(err, LlmError::RateLimitError(_)));
        wait_for(&abandoned).await;
    }

    #[tokio::test]
    async fn first_of_several_vetoes_is_reported() {
        let (chat, _release, _) = GatedChat::new("unused");
        let (topical, topical_verdict) = GatedGuardrail::new("topical");
        let (pii, _pii_verdict) = GatedGuardrail::new("pii");
        let guarded = GuardedChat::new(Arc::new(chat))
            .with_input_guardrail(Arc::new(topical))
            .with_input_guardrail(Arc::new(pii));

        topical_verdict
            .send(Ok(GuardrailVerdict::veto("off topic")))
            .unwrap();
        let out = guarded.execute("anything").await.unwrap();
        assert_eq!(out.refused_by(), Some("topical"));
    }

    #[tokio::test]
    async fn no_guardrails_is_plain_generation() {
        let (chat, release, _) = GatedChat::new("plain");
        release.send(()).unwrap();
        let guarded = GuardedChat::new(Arc::new(chat));
        assert_eq!(guarded.execute("hi").await.unwrap().text(), "plain");
    }

    #[test]
    fn race_policy_parses() {
        assert_eq!("await-verdicts".parse::<RacePolicy>().unwrap(), RacePolicy::AwaitVerdicts);
        assert_eq!("FIRST_COMPLETE".parse::<RacePolicy>().unwrap(), RacePolicy::FirstComplete);
        assert!("sometimes".parse::<RacePolicy>().is_err());
    }
}
