//! Driver implementations over a shared [`SimClinic`].
//!
//! [`SimRest`] answers synchronously from clinic state. [`SimPush`] reads
//! the clinic's push log through a private cursor, so several clients (one
//! per role in an end-to-end test) each see their own subscribed channels
//! without consuming each other's deliveries.

use std::collections::HashSet;

use lounge_app::{PushClient, RestClient};
use lounge_core::{ApiError, AuthToken, Role};
use lounge_proto::{
    AuthResponse, Authorisation, Channel, ExaminationDetail, JoinQueueRequest, LoginRequest,
    PushEnvelope, QueueActionData, QueueActionResponse, QueueItem, UserDto, WaitingList,
};

use crate::SharedClinic;

/// Request/response driver over the shared clinic.
#[derive(Clone)]
pub struct SimRest {
    clinic: SharedClinic,
}

impl SimRest {
    /// Driver over the given clinic.
    pub fn new(clinic: SharedClinic) -> Self {
        Self { clinic }
    }
}

impl RestClient for SimRest {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        let mut clinic = self.clinic.lock().await;
        let (identity, token) = clinic.login(&request.email, &request.password)?;
        Ok(AuthResponse {
            status: "success".to_string(),
            user: UserDto {
                id: identity.id,
                name: identity.name,
                email: identity.email,
                role: identity.role,
                type_id: identity.role_id,
            },
            authorisation: Authorisation {
                token,
                token_type: "bearer".to_string(),
                expires_in: 3600,
            },
        })
    }

    async fn logout(&self, token: &AuthToken) -> Result<(), ApiError> {
        self.clinic.lock().await.logout(token.as_str())
    }

    async fn join_queue(
        &self,
        token: &AuthToken,
        request: &JoinQueueRequest,
    ) -> Result<QueueActionResponse, ApiError> {
        let mut clinic = self.clinic.lock().await;
        let position = clinic.join_queue(token.as_str(), request.reason.as_deref())?;
        Ok(QueueActionResponse {
            success: true,
            data: Some(QueueActionData { position: Some(position), ..QueueActionData::default() }),
            message: None,
        })
    }

    async fn exit_queue(&self, token: &AuthToken) -> Result<QueueActionResponse, ApiError> {
        self.clinic.lock().await.exit_queue(token.as_str())?;
        Ok(QueueActionResponse { success: true, data: None, message: None })
    }

    async fn fetch_queue_item(&self, token: &AuthToken) -> Result<QueueItem, ApiError> {
        self.clinic.lock().await.queue_item(token.as_str())
    }

    async fn fetch_waiting_list(&self, token: &AuthToken) -> Result<WaitingList, ApiError> {
        self.clinic.lock().await.waiting_list(token.as_str())
    }

    async fn pickup_visitor(
        &self,
        token: &AuthToken,
        visitor_id: u64,
    ) -> Result<QueueActionResponse, ApiError> {
        let mut clinic = self.clinic.lock().await;
        clinic.pickup_visitor(token.as_str(), visitor_id)?;
        Ok(QueueActionResponse {
            success: true,
            data: Some(QueueActionData {
                visitor_id: Some(visitor_id),
                ..QueueActionData::default()
            }),
            message: None,
        })
    }

    async fn complete_examination(
        &self,
        token: &AuthToken,
        counterparty_id: u64,
    ) -> Result<QueueActionResponse, ApiError> {
        let mut clinic = self.clinic.lock().await;
        clinic.complete_examination(token.as_str(), counterparty_id)?;
        Ok(QueueActionResponse { success: true, data: None, message: None })
    }

    async fn fetch_examination(
        &self,
        token: &AuthToken,
        role: Role,
    ) -> Result<ExaminationDetail, ApiError> {
        self.clinic.lock().await.examination(token.as_str(), role)
    }
}

/// Publish/subscribe driver over the shared clinic.
pub struct SimPush {
    clinic: SharedClinic,
    subscribed: HashSet<Channel>,
    cursor: usize,
    connected: bool,
}

impl SimPush {
    /// Driver over the given clinic.
    pub fn new(clinic: SharedClinic) -> Self {
        Self { clinic, subscribed: HashSet::new(), cursor: 0, connected: false }
    }
}

impl PushClient for SimPush {
    async fn connect(&mut self, token: &AuthToken) -> Result<(), ApiError> {
        let clinic = self.clinic.lock().await;
        // Authenticated handshake: private channels are refused without it.
        clinic.authorize(token.as_str())?;
        self.cursor = clinic.log_len();
        drop(clinic);
        self.connected = true;
        Ok(())
    }

    async fn subscribe(&mut self, channel: Channel) -> Result<(), ApiError> {
        if channel.requires_auth() && !self.connected {
            return Err(ApiError::Auth { message: "subscribe before handshake".to_string() });
        }
        self.subscribed.insert(channel);
        self.clinic.lock().await.record_bind(channel, true);
        Ok(())
    }

    async fn unsubscribe(&mut self, channel: Channel) -> Result<(), ApiError> {
        self.subscribed.remove(&channel);
        self.clinic.lock().await.record_bind(channel, false);
        Ok(())
    }

    async fn poll_event(&mut self) -> Result<Option<PushEnvelope>, ApiError> {
        if !self.connected {
            return Ok(None);
        }
        let clinic = self.clinic.lock().await;
        if clinic.held() {
            return Ok(None);
        }
        while let Some(envelope) = clinic.log_entry(self.cursor) {
            self.cursor += 1;
            if self.subscribed.contains(&envelope.channel) {
                return Ok(Some(envelope.clone()));
            }
        }
        Ok(None)
    }

    async fn disconnect(&mut self) {
        self.connected = false;
        self.subscribed.clear();
    }
}

/// Convenience for tests: a REST/push driver pair over one clinic.
pub fn drivers(clinic: &SharedClinic) -> (SimRest, SimPush) {
    (SimRest::new(clinic.clone()), SimPush::new(clinic.clone()))
}
