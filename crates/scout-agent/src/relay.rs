//! The per-request completion relay.
//!
//! A relay is built for exactly one chat request. It aggregates retrieval
//! results, builds the system prompt, opens one streaming completion and
//! forwards assistant text to the event channel as it is decoded. Its
//! lifecycle is tracked in an explicit [`RelayState`]:
//!
//! ```text
//! Idle -> Aggregating -> Prompting -> Streaming -> Finalizing -> Closed
//!   \_________\______________\____________\____________> Errored
//! ```

use crate::backends::{ChatMessage, ChatRequest, CompletionBackend};
use crate::config::ModelConfig;
use crate::prompt::build_system_prompt;
use crate::sse::{parse_frame, SseDecoder, UpstreamFrame};
use crate::stream::StreamEvent;
use futures_util::{FutureExt, StreamExt};
use scout_core::{RetrievalResult, ScoutError, SourceRef, SourceType};
use scout_search::{build_context, Aggregator};
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// User-facing text sent in place of an answer when the request fails.
pub const APOLOGY: &str = "Sorry, I encountered an error. Please check your API key and try again.";

/// Lifecycle of one relay run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    /// Created, not yet started.
    Idle,
    /// Waiting on the search providers.
    Aggregating,
    /// Building the prompt and opening the completion.
    Prompting,
    /// Forwarding assistant text.
    Streaming,
    /// Sending sources and the end marker.
    Finalizing,
    /// Finished normally.
    Closed,
    /// Failed or cancelled.
    Errored,
}

impl fmt::Display for RelayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Aggregating => "aggregating",
            Self::Prompting => "prompting",
            Self::Streaming => "streaming",
            Self::Finalizing => "finalizing",
            Self::Closed => "closed",
            Self::Errored => "errored",
        };
        f.write_str(name)
    }
}

/// One chat turn to answer.
#[derive(Debug, Clone)]
pub struct RelayRequest {
    /// The user's question.
    pub query: String,
    /// Sources to search. Empty means web only.
    pub sources: Vec<SourceType>,
    /// Prior turns, oldest first.
    pub history: Vec<ChatMessage>,
}

impl RelayRequest {
    /// Request for `query` with no sources or history.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            sources: Vec::new(),
            history: Vec::new(),
        }
    }

    /// Sets the sources to search.
    pub fn with_sources(mut self, sources: Vec<SourceType>) -> Self {
        self.sources = sources;
        self
    }

    /// Sets the prior turns.
    pub fn with_history(mut self, history: Vec<ChatMessage>) -> Self {
        self.history = history;
        self
    }

    /// Requested sources; web only when none were given.
    pub fn effective_sources(&self) -> Vec<SourceType> {
        if self.sources.is_empty() {
            vec![SourceType::Web]
        } else {
            self.sources.clone()
        }
    }
}

/// How a relay run ended.
#[derive(Debug, Clone)]
pub struct RelayOutcome {
    /// `Closed` or `Errored`.
    pub state: RelayState,
    /// Assistant text forwarded to the client.
    pub answer: String,
    /// Sources sent in the sources event.
    pub sources: Vec<SourceRef>,
    /// Upstream payloads that were not valid JSON.
    pub skipped_frames: usize,
    /// The client went away before the terminal event.
    pub cancelled: bool,
}

impl RelayOutcome {
    /// The client received a complete answer.
    pub fn is_complete(&self) -> bool {
        self.state == RelayState::Closed && !self.cancelled
    }
}

enum Halt {
    Cancelled,
    Failed(ScoutError),
}

/// Streams one answer from retrieval through completion to the client.
pub struct CompletionRelay {
    aggregator: Arc<Aggregator>,
    backend: Arc<dyn CompletionBackend>,
    config: Arc<ModelConfig>,
    state: RelayState,
    answer: String,
    sources: Vec<SourceRef>,
    skipped_frames: usize,
}

impl CompletionRelay {
    /// Relay in the `Idle` state.
    pub fn new(
        aggregator: Arc<Aggregator>,
        backend: Arc<dyn CompletionBackend>,
        config: Arc<ModelConfig>,
    ) -> Self {
        Self {
            aggregator,
            backend,
            config,
            state: RelayState::Idle,
            answer: String::new(),
            sources: Vec::new(),
            skipped_frames: 0,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RelayState {
        self.state
    }

    fn transition(&mut self, next: RelayState) {
        debug!(from = %self.state, to = %next, "Relay state transition");
        self.state = next;
    }

    /// Runs the request to completion, writing events to `tx`.
    ///
    /// Exactly one terminal event (`Done` or `Error`) is sent unless the
    /// receiver is dropped first, in which case the relay stops immediately
    /// and sends nothing more.
    pub async fn run(
        mut self,
        request: RelayRequest,
        tx: mpsc::Sender<StreamEvent>,
    ) -> RelayOutcome {
        let mut cancelled = false;
        match self.drive(&request, &tx).await {
            Ok(()) => self.transition(RelayState::Closed),
            Err(Halt::Cancelled) => {
                info!(state = %self.state, "Client disconnected, relay cancelled");
                cancelled = true;
                self.transition(RelayState::Errored);
            }
            Err(Halt::Failed(e)) => {
                warn!(state = %self.state, error = %e, "Relay failed");
                self.transition(RelayState::Errored);
                let event = StreamEvent::Error {
                    message: APOLOGY.to_string(),
                };
                if tx.send(event).await.is_err() {
                    cancelled = true;
                }
            }
        }

        if self.skipped_frames > 0 {
            warn!(skipped = self.skipped_frames, "Skipped malformed upstream frames");
        }

        RelayOutcome {
            state: self.state,
            answer: self.answer,
            sources: self.sources,
            skipped_frames: self.skipped_frames,
            cancelled,
        }
    }

    async fn drive(
        &mut self,
        request: &RelayRequest,
        tx: &mpsc::Sender<StreamEvent>,
    ) -> Result<(), Halt> {
        self.transition(RelayState::Aggregating);
        let results = self.aggregate(request, tx).await?;

        self.transition(RelayState::Prompting);
        let context = build_context(&results);
        let chat = self.chat_request(request, &context);

        let mut upstream = tokio::select! {
            _ = tx.closed() => return Err(Halt::Cancelled),
            opened = self.backend.stream(&chat) => opened.map_err(Halt::Failed)?,
        };

        self.transition(RelayState::Streaming);
        let mut decoder = SseDecoder::new();
        loop {
            let next = tokio::select! {
                _ = tx.closed() => return Err(Halt::Cancelled),
                chunk = upstream.next() => chunk,
            };
            let payloads = match next {
                Some(Ok(bytes)) => {
                    let payloads = decoder.push(&bytes);
                    self.skipped_frames += decoder.take_dropped();
                    payloads
                }
                Some(Err(e)) => return Err(Halt::Failed(e)),
                None => {
                    let rest = decoder.finish();
                    self.forward(rest, tx).await?;
                    break;
                }
            };
            if self.forward(payloads, tx).await? {
                break;
            }
        }
        drop(upstream);

        self.transition(RelayState::Finalizing);
        if !results.is_empty() {
            self.sources = results.iter().map(SourceRef::from).collect();
            let event = StreamEvent::Sources {
                sources: self.sources.clone(),
            };
            tx.send(event).await.map_err(|_| Halt::Cancelled)?;
        }
        tx.send(StreamEvent::Done).await.map_err(|_| Halt::Cancelled)?;

        info!(
            chars = self.answer.len(),
            sources = self.sources.len(),
            "Relay finished"
        );
        Ok(())
    }

    async fn aggregate(
        &self,
        request: &RelayRequest,
        tx: &mpsc::Sender<StreamEvent>,
    ) -> Result<Vec<RetrievalResult>, Halt> {
        let sources = request.effective_sources();
        let work = AssertUnwindSafe(self.aggregator.aggregate(&request.query, &sources))
            .catch_unwind();
        tokio::select! {
            _ = tx.closed() => Err(Halt::Cancelled),
            settled = work => settled.map_err(|_| {
                Halt::Failed(ScoutError::Search("aggregation panicked".into()))
            }),
        }
    }

    fn chat_request(&self, request: &RelayRequest, context: &str) -> ChatRequest {
        let mut messages = Vec::with_capacity(request.history.len() + 2);
        messages.push(ChatMessage::system(build_system_prompt(context)));
        messages.extend(request.history.iter().cloned());
        messages.push(ChatMessage::user(request.query.clone()));

        ChatRequest {
            model: self.config.model_id.clone(),
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        }
    }

    /// Handles decoded payloads in order. Returns `true` once the upstream
    /// `[DONE]` sentinel has been seen; later payloads are ignored.
    async fn forward(
        &mut self,
        payloads: Vec<String>,
        tx: &mpsc::Sender<StreamEvent>,
    ) -> Result<bool, Halt> {
        for payload in payloads {
            match parse_frame(&payload) {
                UpstreamFrame::Delta(text) => {
                    self.answer.push_str(&text);
                    tx.send(StreamEvent::content(text))
                        .await
                        .map_err(|_| Halt::Cancelled)?;
                }
                UpstreamFrame::Done => return Ok(true),
                UpstreamFrame::Malformed => {
                    self.skipped_frames += 1;
                    debug!(payload = %payload, "Skipping malformed upstream frame");
                }
                UpstreamFrame::Ignored => {}
            }
        }
        Ok(false)
    }
}
