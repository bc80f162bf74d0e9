//! Provider runtime.
//!
//! Mirrors the visitor runtime for the provider role: owns the provider
//! machine, executes its actions against REST, relays decoded push
//! deliveries, and publishes observable state through a watch channel.

use lounge_client::{Notice, ProviderAction, ProviderEvent, ProviderMachine};
use lounge_core::{ApiError, AuthToken, Role, SessionStorage};
use lounge_proto::{Channel, ExaminationDetail, PushEvent, WaitingList};
use tokio::sync::watch;

use crate::{PushClient, RestClient, RuntimeError, SessionManager, SubscriptionSet};

/// Snapshot of provider state for rendering.
#[derive(Debug, Clone, Default)]
pub struct ProviderView {
    /// Latest waiting-list snapshot.
    pub queue: WaitingList,
    /// Whether a snapshot has been loaded since the last failure.
    pub queue_loaded: bool,
    /// The running examination, if any.
    pub examination: Option<ExaminationDetail>,
    /// Current notice, if any.
    pub notice: Option<Notice>,
}

impl ProviderView {
    fn of(machine: &ProviderMachine) -> Self {
        Self {
            queue: machine.waiting_list().clone(),
            queue_loaded: machine.queue_loaded(),
            examination: machine.examination().cloned(),
            notice: machine.notice().cloned(),
        }
    }
}

/// Orchestrates the provider machine over injected drivers.
pub struct ProviderRuntime<R, P, S>
where
    R: RestClient,
    P: PushClient,
    S: SessionStorage,
{
    rest: R,
    push: P,
    session: SessionManager<S>,
    machine: ProviderMachine,
    subscriptions: SubscriptionSet,
    state_tx: watch::Sender<ProviderView>,
    connected: bool,
}

impl<R, P, S> ProviderRuntime<R, P, S>
where
    R: RestClient,
    P: PushClient,
    S: SessionStorage,
{
    /// Connect, subscribe, and pull the initial snapshots.
    ///
    /// Requires an authenticated provider session in `session`. On any
    /// startup failure the push connection is torn down before the error
    /// is returned.
    pub async fn start(
        rest: R,
        push: P,
        session: SessionManager<S>,
    ) -> Result<Self, RuntimeError> {
        let identity = session.current().cloned().ok_or(RuntimeError::NotAuthenticated)?;
        match identity.role {
            Role::Provider => {},
            Role::Visitor => {
                return Err(RuntimeError::RoleMismatch {
                    required: Role::Provider,
                    actual: identity.role,
                });
            },
        }
        let token = session.token().cloned().ok_or(RuntimeError::NotAuthenticated)?;

        let machine = ProviderMachine::new();
        let (state_tx, _) = watch::channel(ProviderView::of(&machine));
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
        if let Err(err) = runtime.refresh().await {
            runtime.shutdown().await;
            return Err(err);
        }
        Ok(runtime)
    }

    async fn open_channels(
        &mut self,
        token: &AuthToken,
        provider_id: u64,
    ) -> Result<(), RuntimeError> {
        self.push.connect(token).await?;
        self.connected = true;
        for channel in [Channel::ProviderPrivate(provider_id), Channel::LoungeQueue] {
            self.push.subscribe(channel).await?;
            self.subscriptions.record(channel);
            tracing::debug!(channel = %channel, "subscribed");
        }
        Ok(())
    }

    /// Re-pull examination status and the waiting-list snapshot.
    pub async fn refresh(&mut self) -> Result<(), RuntimeError> {
        self.apply(ProviderEvent::RefreshRequested).await
    }

    /// Pull a visitor out of the queue into an examination.
    pub async fn pickup_visitor(&mut self, visitor_id: u64) -> Result<(), RuntimeError> {
        self.apply(ProviderEvent::PickupRequested { visitor_id }).await
    }

    /// End the examination with the given visitor.
    pub async fn complete_examination(&mut self, visitor_id: u64) -> Result<(), RuntimeError> {
        self.apply(ProviderEvent::CompleteRequested { visitor_id }).await
    }

    /// Dismiss the current notice.
    pub async fn dismiss_notice(&mut self) -> Result<(), RuntimeError> {
        self.apply(ProviderEvent::NoticeDismissed).await
    }

    /// Drain pending push deliveries into the machine.
    pub async fn pump_events(&mut self) -> Result<(), RuntimeError> {
        loop {
            match self.push.poll_event().await {
                Ok(Some(envelope)) => match PushEvent::decode_envelope(&envelope) {
                    Ok(Some(event)) => self.apply(ProviderEvent::Push(event)).await?,
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

    /// End the session: best-effort server logout, then teardown.
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
    pub fn state(&self) -> watch::Receiver<ProviderView> {
        self.state_tx.subscribe()
    }

    /// Current observable state.
    pub fn view(&self) -> ProviderView {
        ProviderView::of(&self.machine)
    }

    /// The session manager, e.g. for the route guard.
    pub fn session(&self) -> &SessionManager<S> {
        &self.session
    }

    /// Give the session manager back, consuming the runtime.
    pub fn into_session(self) -> SessionManager<S> {
        self.session
    }

    async fn apply(&mut self, event: ProviderEvent) -> Result<(), RuntimeError> {
        let mut pending = self.machine.handle(event);
        while !pending.is_empty() {
            let actions = std::mem::take(&mut pending);
            for action in actions {
                for event in self.execute(action).await? {
                    pending.extend(self.machine.handle(event));
                }
            }
        }
        self.state_tx.send_replace(ProviderView::of(&self.machine));
        Ok(())
    }

    /// Execute one action and return the events to feed back.
    ///
    /// The session generation is captured before the call; a completion
    /// from a session that ended mid-flight is discarded instead of
    /// applied.
    async fn execute(
        &mut self,
        action: ProviderAction,
    ) -> Result<Vec<ProviderEvent>, RuntimeError> {
        let token = self.token()?;
        let generation = self.session.generation();

        let event = match action {
            ProviderAction::FetchQueue => match self.rest.fetch_waiting_list(&token).await {
                Ok(list) => Some(ProviderEvent::QueueLoaded(list)),
                Err(err) => Some(ProviderEvent::QueueLoadFailed(self.intercept(err).await?)),
            },
            ProviderAction::FetchExamination => {
                match self.rest.fetch_examination(&token, Role::Provider).await {
                    Ok(detail) => Some(ProviderEvent::ExaminationLoaded(Some(detail))),
                    Err(ApiError::NotFound) => Some(ProviderEvent::ExaminationLoaded(None)),
                    Err(err) => {
                        let err = self.intercept(err).await?;
                        tracing::warn!(error = %err, "examination status fetch failed");
                        None
                    },
                }
            },
            ProviderAction::CallPickup { visitor_id } => {
                match self.rest.pickup_visitor(&token, visitor_id).await {
                    Ok(_) => Some(ProviderEvent::PickupAccepted { visitor_id }),
                    Err(err) => Some(ProviderEvent::PickupRejected(self.intercept(err).await?)),
                }
            },
            ProviderAction::CallComplete { visitor_id } => {
                match self.rest.complete_examination(&token, visitor_id).await {
                    Ok(_) => Some(ProviderEvent::CompleteConfirmed),
                    Err(err) => Some(ProviderEvent::CompleteRejected(self.intercept(err).await?)),
                }
            },
        };

        if self.session.generation() != generation {
            tracing::debug!("discarding completion from an ended session");
            return Ok(vec![]);
        }
        Ok(event.into_iter().collect())
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
