//! Transport driver traits.
//!
//! The two traits mirror the two external collaborators: a
//! request/response client and a publish/subscribe client. Implementations
//! provide platform-specific I/O (HTTP, WebSocket, or the in-memory
//! simulation in `lounge-harness`); the runtimes handle all orchestration.
//!
//! Every authenticated call takes the bearer token explicitly. Mapping
//! transport responses into [`ApiError`] is the implementation's job:
//! classify by HTTP status via [`ApiError::from_status`] so a 401 reaches
//! the runtimes as [`ApiError::Auth`] and a 404 as [`ApiError::NotFound`].

use std::future::Future;

use lounge_core::{ApiError, AuthToken, Role};
use lounge_proto::{
    AuthResponse, Channel, ExaminationDetail, JoinQueueRequest, LoginRequest, PushEnvelope,
    QueueActionResponse, QueueItem, WaitingList,
};

/// Request/response transport.
pub trait RestClient: Send {
    /// `POST /login`.
    fn login(
        &self,
        request: &LoginRequest,
    ) -> impl Future<Output = Result<AuthResponse, ApiError>> + Send;

    /// `POST /logout`. Server-side invalidation; best effort.
    fn logout(&self, token: &AuthToken) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `POST /queue` — visitor joins the queue.
    fn join_queue(
        &self,
        token: &AuthToken,
        request: &JoinQueueRequest,
    ) -> impl Future<Output = Result<QueueActionResponse, ApiError>> + Send;

    /// `DELETE /queue` — visitor leaves the queue.
    fn exit_queue(
        &self,
        token: &AuthToken,
    ) -> impl Future<Output = Result<QueueActionResponse, ApiError>> + Send;

    /// `GET /queue/item` — visitor's own position. Answers
    /// [`ApiError::NotFound`] when not queued.
    fn fetch_queue_item(
        &self,
        token: &AuthToken,
    ) -> impl Future<Output = Result<QueueItem, ApiError>> + Send;

    /// `GET /queue/list` — provider's full waiting-list snapshot.
    fn fetch_waiting_list(
        &self,
        token: &AuthToken,
    ) -> impl Future<Output = Result<WaitingList, ApiError>> + Send;

    /// `POST /queue/pickup` — provider pulls a visitor out of the queue.
    fn pickup_visitor(
        &self,
        token: &AuthToken,
        visitor_id: u64,
    ) -> impl Future<Output = Result<QueueActionResponse, ApiError>> + Send;

    /// `POST /examination/complete` — either side ends the examination,
    /// naming the counterparty.
    fn complete_examination(
        &self,
        token: &AuthToken,
        counterparty_id: u64,
    ) -> impl Future<Output = Result<QueueActionResponse, ApiError>> + Send;

    /// `GET /examination` — the caller's current examination, role-scoped.
    /// Answers [`ApiError::NotFound`] when none exists.
    fn fetch_examination(
        &self,
        token: &AuthToken,
        role: Role,
    ) -> impl Future<Output = Result<ExaminationDetail, ApiError>> + Send;
}

/// Publish/subscribe transport.
///
/// Subscription and unsubscription must be symmetric: the runtimes pair
/// every `subscribe` with exactly one `unsubscribe` on teardown and expect
/// implementations to tolerate nothing less.
pub trait PushClient: Send {
    /// Establish the connection. Private channels require the
    /// authenticated handshake, so the token is part of connecting.
    fn connect(&mut self, token: &AuthToken)
    -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Bind to a channel.
    fn subscribe(&mut self, channel: Channel)
    -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Unbind from a channel.
    fn unsubscribe(
        &mut self,
        channel: Channel,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Next pending delivery, or `None` when nothing is ready.
    fn poll_event(
        &mut self,
    ) -> impl Future<Output = Result<Option<PushEnvelope>, ApiError>> + Send;

    /// Drop the connection and all bindings.
    fn disconnect(&mut self) -> impl Future<Output = ()> + Send;
}
