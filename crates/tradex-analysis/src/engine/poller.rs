//! Polling orchestrator
//!
//! [`AnalysisPoller`] drives one analysis at a time through
//! `Idle → Submitting → Polling → Ready | Failed`. It owns the only
//! [`CadenceTimer`] and is the only writer of the published
//! [`PollSnapshot`]; views observe it through [`AnalysisPoller::subscribe`].

use super::session::{AnalysisSession, FailureKind, PollSnapshot, SessionPhase};
use super::timer::{CadenceTimer, TickControl, TickHandler, TimerLedger};
use crate::api::AnalysisApi;
use crate::catalog::{Fundamental, Technical};
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::request::AnalysisRequest;
use crate::selection::IndicatorSelection;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Single-session analysis poller
pub struct AnalysisPoller {
    api: Arc<dyn AnalysisApi>,
    interval: Duration,
    stop_on_llm_failure: bool,
    state: Arc<watch::Sender<PollSnapshot>>,
    timer: Option<CadenceTimer>,
    ledger: TimerLedger,
    session: Option<AnalysisSession>,
    generation: u64,
}

impl AnalysisPoller {
    pub fn new(api: Arc<dyn AnalysisApi>, config: &AnalysisConfig) -> Self {
        let (state, _) = watch::channel(PollSnapshot::default());
        Self {
            api,
            interval: config.poll_interval,
            stop_on_llm_failure: config.stop_on_llm_failure,
            state: Arc::new(state),
            timer: None,
            ledger: TimerLedger::new(),
            session: None,
            generation: 0,
        }
    }

    /// Receive every snapshot change
    pub fn subscribe(&self) -> watch::Receiver<PollSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> PollSnapshot {
        self.state.borrow().clone()
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.borrow().phase.clone()
    }

    pub fn session(&self) -> Option<&AnalysisSession> {
        self.session.as_ref()
    }

    pub fn ledger(&self) -> &TimerLedger {
        &self.ledger
    }

    /// Whether a cadence is currently running
    pub fn is_polling(&self) -> bool {
        self.timer.as_ref().is_some_and(CadenceTimer::is_armed)
    }

    /// Validate the form input and submit it.
    ///
    /// A blank symbol fails with [`AnalysisError::InvalidSymbol`] before
    /// anything else happens: no network call, and any running session is
    /// left untouched.
    pub async fn start(
        &mut self,
        raw_symbol: &str,
        fundamentals: &IndicatorSelection<Fundamental>,
        technicals: &IndicatorSelection<Technical>,
    ) -> Result<AnalysisSession> {
        let request = AnalysisRequest::build(raw_symbol, fundamentals, technicals)?;
        self.submit(request).await
    }

    /// Start a new session for `request`, replacing any current one.
    ///
    /// On success the session is polling when this returns. On failure the
    /// published phase is `Failed { kind: Submission }` and no timer is armed.
    pub async fn submit(&mut self, request: AnalysisRequest) -> Result<AnalysisSession> {
        self.cancel_timer("new submission");
        self.session = None;
        self.generation += 1;
        let generation = self.generation;

        info!(symbol = request.symbol(), generation, "submitting analysis");
        self.state
            .send_replace(PollSnapshot::submitting(generation, request.symbol()));

        let created = match self.api.create(&request).await {
            Ok(created) => created,
            Err(e) => {
                warn!(symbol = request.symbol(), error = %e, "analysis submission failed");
                self.publish(generation, |s| s.fail(FailureKind::Submission));
                return Err(match e {
                    AnalysisError::SubmissionFailed(detail) => {
                        AnalysisError::SubmissionFailed(detail)
                    }
                    other => AnalysisError::SubmissionFailed(other.to_string()),
                });
            }
        };

        let session = AnalysisSession::new(generation, created, &request);
        info!(
            symbol = %session.symbol,
            analysis_id = %session.analysis_id,
            "analysis accepted, polling"
        );
        self.publish(generation, |s| s.enter_polling(&session.analysis_id));

        let handler = PollTick {
            api: self.api.clone(),
            session: session.clone(),
            stop_on_llm_failure: self.stop_on_llm_failure,
            publisher: SnapshotPublisher {
                state: self.state.clone(),
                generation,
            },
            fetches: 0,
        };
        self.timer = Some(CadenceTimer::arm(self.interval, &self.ledger, handler));
        self.session = Some(session.clone());

        Ok(session)
    }

    /// Tear down the current session, e.g. when the view goes away.
    ///
    /// A session that was still active ends as `Idle`; its last result stays
    /// visible. Terminal phases are left as they are.
    pub fn shutdown(&mut self) {
        self.cancel_timer("shutdown");
        self.generation += 1;
        let generation = self.generation;
        self.state.send_modify(|s| {
            s.generation = generation;
            if s.phase.is_active() {
                s.go_idle();
            }
        });
    }

    fn cancel_timer(&mut self, reason: &str) {
        if let Some(timer) = self.timer.take() {
            if timer.cancel() {
                debug!(reason, "cancelled poll cadence");
            }
        }
    }

    fn publish(&self, generation: u64, apply: impl FnOnce(&mut PollSnapshot)) -> bool {
        publish_if_current(&self.state, generation, apply)
    }
}

impl Drop for AnalysisPoller {
    fn drop(&mut self) {
        self.cancel_timer("poller dropped");
    }
}

fn publish_if_current(
    state: &watch::Sender<PollSnapshot>,
    generation: u64,
    apply: impl FnOnce(&mut PollSnapshot),
) -> bool {
    state.send_if_modified(|snapshot| {
        if snapshot.generation != generation {
            return false;
        }
        apply(snapshot);
        true
    })
}

/// Write access for one session; stale sessions can't overwrite newer ones
struct SnapshotPublisher {
    state: Arc<watch::Sender<PollSnapshot>>,
    generation: u64,
}

impl SnapshotPublisher {
    fn publish(&self, apply: impl FnOnce(&mut PollSnapshot)) -> bool {
        publish_if_current(&self.state, self.generation, apply)
    }
}

/// One fetch per tick for the current session
struct PollTick {
    api: Arc<dyn AnalysisApi>,
    session: AnalysisSession,
    stop_on_llm_failure: bool,
    publisher: SnapshotPublisher,
    fetches: u64,
}

#[async_trait]
impl TickHandler for PollTick {
    async fn on_tick(&mut self) -> TickControl {
        self.fetches += 1;
        let analysis_id = self.session.analysis_id.as_str();

        match self.api.fetch(analysis_id).await {
            Ok(result) => {
                let complete = self.session.is_complete(&result, self.stop_on_llm_failure);
                debug!(
                    analysis_id,
                    fetch = self.fetches,
                    llm_ready = result.llm_ready,
                    complete,
                    "poll result"
                );

                if !self.publisher.publish(|s| s.apply_result(result, complete)) {
                    debug!(analysis_id, "session superseded, stopping");
                    return TickControl::Stop;
                }

                if complete {
                    info!(analysis_id, fetches = self.fetches, "analysis ready");
                    TickControl::Stop
                } else {
                    TickControl::Continue
                }
            }
            Err(e) => {
                warn!(analysis_id, error = %e, "poll failed, stopping");
                self.publisher.publish(|s| s.fail(FailureKind::Poll));
                TickControl::Stop
            }
        }
    }
}
