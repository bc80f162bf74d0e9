//! Visitor runtime.
//!
//! Owns the visitor state machine and the transport drivers, executes the
//! machine's actions against REST, feeds results back as events, and
//! relays decoded push deliveries. Observable state is published through a
//! `tokio::sync::watch` channel; the view layer is a pure consumer.

use lounge_client::{
    ExaminationStatus, JoinPolicy, Notice, QueueStatus, VisitorAction, VisitorEvent,
    VisitorMachine, VisitorPhase,
};
use lounge_core::{ApiError, AuthToken, Role, SessionStorage};
use lounge_proto::{Channel, JoinQueueRequest, PushEvent};
use tokio::sync::watch;

use crate::{PushClient, RestClient, RuntimeError, SessionManager, SubscriptionSet};

/// Snapshot of visitor state for rendering.
#[derive(Debug, Clone, Default)]
pub struct VisitorView {
    /// Queue membership.
    pub queue: QueueStatus,
    /// Examination state.
    pub examination: ExaminationStatus,
    /// Current notice, if any.
    pub notice: Option<Notice>,
}

impl VisitorView {
    fn of(machine: &VisitorMachine) -> Self {
        Self {
            queue: machine.queue_status().clone(),
            examination: machine.examination().clone(),
            notice: machine.notice().cloned(),
        }
    }

    /// Coarse phase, derived.
    pub fn phase(&self) -> VisitorPhase {
        if self.examination.active {
            VisitorPhase::InExamination
        } else if self.queue.in_queue {
            VisitorPhase::Queued
        } else {
            VisitorPhase::Idle
        }
    }
}

/// Orchestrates the visitor machine over injected drivers.
pub struct VisitorRuntime<R, P, S>
where
    R: RestClient,
    P: PushClient,
    S: SessionStorage,
{
    rest: R,
    push: P,
    session: SessionManager<S>,
    machine: VisitorMachine,
    subscriptions: SubscriptionSet,
    state_tx: watch::Sender<VisitorView>,
    connected: bool,
}

impl<R, P, S> VisitorRuntime<R, P, S>
where
    R: RestClient,
    P: PushClient,
    S: SessionStorage,
{
    /// Connect, subscribe, and reconcile against the server.
    ///
    /// Requires an authenticated visitor session in `session`. On any
    /// startup failure the push connection is torn down before the error
    /// is returned.
    pub async fn start(
        rest: R,
        push: P,
        session: SessionManager<S>,
        policy: JoinPolicy,
    ) -> Result<Self, RuntimeError> {
        let identity = session.current().cloned().ok_or(RuntimeError::NotAuthenticated)?;
        match identity.role {
            Role::Visitor => {},
            Role::Provider => {
                return Err(RuntimeError::RoleMismatch {
                    required: Role::Visitor,
                    actual: identity.role,
                });
            },
        }
        let token = session.token().cloned().ok_or(RuntimeError::NotAuthenticated)?;

        let machine = VisitorMachine::new(identity.role_id, policy);
        let (state_tx, _) = watch::channel(VisitorView::of(&machine));
        let mut runtime = Self {
            rest,
            push,
            session,
            machine,
            subscriptions: SubscriptionSet::new(),
            state_tx,
            connected: false,
        };

        if let Err(err) = runtime.open_channels(&token, identity.role_id).await {
            runtime.shutdown().await;
            return Err(err);
        }
        if let Err(err) = runtime.reconcile().await {
            runtime.shutdown().await;
            return Err(err);
        }
        Ok(runtime)
    }

    async fn open_channels(
        &mut self,
        token: &AuthToken,
        visitor_id: u64,
    ) -> Result<(), RuntimeError> {
        self.push.connect(token).await?;
        self.connected = true;
        for channel in [Channel::VisitorPrivate(visitor_id), Channel::LoungeQueue] {
            self.push.subscribe(channel).await?;
            self.subscriptions.record(channel);
            tracing::debug!(channel = %channel, "subscribed");
        }
        Ok(())
    }

    /// Re-fetch both statuses and reconcile.
    ///
    /// The examination snapshot is applied first and takes precedence:
    /// while it reports an active examination, whatever the queue endpoint
    /// says is stale handoff residue and is not consulted.
    pub async fn reconcile(&mut self) -> Result<(), RuntimeError> {
        let events = self.execute(VisitorAction::FetchExamination).await?;
        for event in events {
            self.apply(event).await?;
        }
        if !self.machine.examination().active {
            let events = self.execute(VisitorAction::FetchQueueItem).await?;
            for event in events {
                self.apply(event).await?;
            }
        }
        Ok(())
    }

    /// Ask to join the queue.
    pub async fn join_queue(
        &mut self,
        external_id: impl Into<String>,
        reason: Option<String>,
    ) -> Result<(), RuntimeError> {
        self.apply(VisitorEvent::JoinRequested { external_id: external_id.into(), reason }).await
    }

    /// Ask to leave the queue.
    pub async fn exit_queue(&mut self) -> Result<(), RuntimeError> {
        self.apply(VisitorEvent::ExitRequested).await
    }

    /// Ask to end the running examination.
    pub async fn exit_examination(&mut self) -> Result<(), RuntimeError> {
        self.apply(VisitorEvent::CompleteRequested).await
    }

    /// Dismiss the current notice.
    pub async fn dismiss_notice(&mut self) -> Result<(), RuntimeError> {
        self.apply(VisitorEvent::NoticeDismissed).await
    }

    /// Drain pending push deliveries into the machine.
    pub async fn pump_events(&mut self) -> Result<(), RuntimeError> {
        loop {
            match self.push.poll_event().await {
                Ok(Some(envelope)) => match PushEvent::decode_envelope(&envelope) {
                    Ok(Some(event)) => self.apply(VisitorEvent::Push(event)).await?,
                    Ok(None) => tracing::debug!(
                        channel = %envelope.channel,
                        event = %envelope.event,
                        "ignoring unknown push event"
                    ),
                    Err(err) => tracing::warn!(error = %err, "malformed push payload"),
                },
                Ok(None) => return Ok(()),
                Err(err) if err.is_unauthorized() => {
                    self.force_teardown().await;
                    return Err(err.into());
                },
                Err(err) => {
                    tracing::warn!(error = %err, "push poll failed");
                    return Ok(());
                },
            }
        }
    }

    /// End the session: best-effort server logout, then teardown. The
    /// local session is gone on return regardless of the server outcome.
    pub async fn logout(&mut self) -> Result<(), ApiError> {
        let result = self.session.logout(&self.rest).await;
        self.shutdown().await;
        result
    }

    /// Unsubscribe every live binding exactly once and disconnect.
    ///
    /// Idempotent; safe to call after a forced teardown.
    pub async fn shutdown(&mut self) {
        for channel in self.subscriptions.drain() {
            if let Err(err) = self.push.unsubscribe(channel).await {
                tracing::warn!(channel = %channel, error = %err, "unsubscribe failed");
            }
        }
        if self.connected {
            self.push.disconnect().await;
            self.connected = false;
        }
    }

    /// Watch handle for observable state.
    pub fn state(&self) -> watch::Receiver<VisitorView> {
        self.state_tx.subscribe()
    }

    /// Current observable state.
    pub fn view(&self) -> VisitorView {
        VisitorView::of(&self.machine)
    }

    /// The visitor's role-scoped id.
    pub fn visitor_id(&self) -> u64 {
        self.machine.visitor_id()
    }

    /// The session manager, e.g. for the route guard.
    pub fn session(&self) -> &SessionManager<S> {
        &self.session
    }

    /// Give the session manager back, consuming the runtime.
    pub fn into_session(self) -> SessionManager<S> {
        self.session
    }

    async fn apply(&mut self, event: VisitorEvent) -> Result<(), RuntimeError> {
        let mut pending = self.machine.handle(event);
        while !pending.is_empty() {
            let actions = std::mem::take(&mut pending);
            for action in actions {
                for event in self.execute(action).await? {
                    pending.extend(self.machine.handle(event));
                }
            }
        }
        self.state_tx.send_replace(VisitorView::of(&self.machine));
        Ok(())
    }

    /// Execute one action and return the events to feed back.
    ///
    /// The session generation is captured before the call; a completion
    /// from a session that ended mid-flight is discarded instead of
    /// applied.
    async fn execute(&mut self, action: VisitorAction) -> Result<Vec<VisitorEvent>, RuntimeError> {
        let token = self.token()?;
        let generation = self.session.generation();

        let event = match action {
            VisitorAction::CallJoin { external_id, reason } => {
                let request = JoinQueueRequest { external_id, reason };
                match self.rest.join_queue(&token, &request).await {
                    Ok(_) => VisitorEvent::JoinAccepted,
                    Err(err) => VisitorEvent::JoinRejected(self.intercept(err).await?),
                }
            },
            VisitorAction::CallExit => match self.rest.exit_queue(&token).await {
                Ok(_) => VisitorEvent::ExitConfirmed,
                Err(err) => VisitorEvent::ExitRejected(self.intercept(err).await?),
            },
            VisitorAction::CallComplete { provider_id } => {
                match self.rest.complete_examination(&token, provider_id).await {
                    Ok(_) => VisitorEvent::CompleteConfirmed,
                    Err(err) => VisitorEvent::CompleteRejected(self.intercept(err).await?),
                }
            },
            VisitorAction::FetchQueueItem => match self.rest.fetch_queue_item(&token).await {
                Ok(item) => VisitorEvent::QueueItemLoaded(Some(item)),
                Err(ApiError::NotFound) => VisitorEvent::QueueItemLoaded(None),
                Err(err) => VisitorEvent::StatusLoadFailed(self.intercept(err).await?),
            },
            VisitorAction::FetchExamination => {
                match self.rest.fetch_examination(&token, Role::Visitor).await {
                    Ok(detail) => VisitorEvent::ExaminationLoaded(Some(detail)),
                    Err(ApiError::NotFound) => VisitorEvent::ExaminationLoaded(None),
                    Err(err) => VisitorEvent::StatusLoadFailed(self.intercept(err).await?),
                }
            },
        };

        if self.session.generation() != generation {
            tracing::debug!("discarding completion from an ended session");
            return Ok(vec![]);
        }
        Ok(vec![event])
    }

    /// Route an error: 401 tears the session down and propagates, anything
    /// else goes back to the machine as a rejection.
    async fn intercept(&mut self, err: ApiError) -> Result<ApiError, RuntimeError> {
        if err.is_unauthorized() {
            self.force_teardown().await;
            return Err(err.into());
        }
        Ok(err)
    }

    async fn force_teardown(&mut self) {
        self.session.force_logout();
        self.shutdown().await;
    }

    fn token(&self) -> Result<AuthToken, RuntimeError> {
        self.session.token().cloned().ok_or(RuntimeError::NotAuthenticated)
    }
}
