//! In-memory clinic backend.
//!
//! Server-side rules live here so the drivers stay thin: one queue entry
//! per visitor, one active examination per provider and per visitor,
//! rejections for double pickups and not-in-queue exits. Every mutation
//! appends the push envelopes a real backend would publish.

use std::{collections::HashMap, sync::Arc};

use lounge_core::{ApiError, Identity};
use lounge_proto::{
    Channel, ExamStatus, ExaminationDetail, PushEnvelope, QueueItem, QueueVisitor, Role,
    WaitingList, event_names,
};
use tokio::sync::Mutex;

/// Clinic shared between sim drivers.
pub type SharedClinic = Arc<Mutex<SimClinic>>;

/// Wrap a clinic for sharing between drivers.
pub fn share(clinic: SimClinic) -> SharedClinic {
    Arc::new(Mutex::new(clinic))
}

/// One bind or unbind observed by the push side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindLogEntry {
    /// Channel affected.
    pub channel: Channel,
    /// `true` for subscribe, `false` for unsubscribe.
    pub bound: bool,
}

#[derive(Debug, Clone)]
struct Account {
    password: String,
    identity: Identity,
}

#[derive(Debug, Clone)]
struct QueueEntry {
    visitor_id: u64,
    visitor_name: String,
    email: String,
    reason: Option<String>,
    joined_at: String,
}

#[derive(Debug, Clone)]
struct Examination {
    id: u64,
    provider_id: u64,
    provider_name: String,
    visitor_id: u64,
    visitor_name: String,
    started_at: String,
    reason: Option<String>,
}

/// Authoritative in-memory waiting-room backend.
#[derive(Debug, Default)]
pub struct SimClinic {
    accounts: Vec<Account>,
    tokens: HashMap<String, Identity>,
    next_account_id: u64,
    next_token: u64,
    next_examination_id: u64,
    clock: u64,
    queue: Vec<QueueEntry>,
    examinations: Vec<Examination>,
    log: Vec<PushEnvelope>,
    held: bool,
    bind_log: Vec<BindLogEntry>,
}

impl SimClinic {
    /// Empty clinic.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a visitor account and return its identity.
    pub fn add_visitor(&mut self, name: &str, email: &str, password: &str) -> Identity {
        self.add_account(name, email, password, Role::Visitor)
    }

    /// Register a provider account and return its identity.
    pub fn add_provider(&mut self, name: &str, email: &str, password: &str) -> Identity {
        self.add_account(name, email, password, Role::Provider)
    }

    fn add_account(&mut self, name: &str, email: &str, password: &str, role: Role) -> Identity {
        self.next_account_id += 1;
        let identity = Identity {
            id: self.next_account_id,
            name: name.to_string(),
            email: email.to_string(),
            role,
            role_id: self.next_account_id + 100,
        };
        self.accounts
            .push(Account { password: password.to_string(), identity: identity.clone() });
        identity
    }

    // --- delivery control -------------------------------------------------

    /// Stop delivering push events; they accumulate until [`Self::release`].
    pub fn hold_events(&mut self) {
        self.held = true;
    }

    /// Resume delivery of accumulated push events.
    pub fn release_events(&mut self) {
        self.held = false;
    }

    /// Append a copy of the most recent push event on `channel`, as a
    /// transport that redelivers would.
    pub fn duplicate_last_event_on(&mut self, channel: Channel) {
        if let Some(last) = self.log.iter().rev().find(|e| e.channel == channel).cloned() {
            self.log.push(last);
        }
    }

    /// Invalidate every issued token. Subsequent authenticated calls
    /// answer 401.
    pub fn revoke_all_tokens(&mut self) {
        self.tokens.clear();
    }

    /// Append an arbitrary delivery to the push log, e.g. an event name
    /// outside the contract or a malformed payload.
    pub fn inject_event(&mut self, channel: Channel, event: &str, payload: serde_json::Value) {
        self.emit(channel, event, payload);
    }

    /// Bind/unbind history, in order.
    pub fn bind_log(&self) -> &[BindLogEntry] {
        &self.bind_log
    }

    pub(crate) fn record_bind(&mut self, channel: Channel, bound: bool) {
        self.bind_log.push(BindLogEntry { channel, bound });
    }

    pub(crate) fn held(&self) -> bool {
        self.held
    }

    pub(crate) fn log_len(&self) -> usize {
        self.log.len()
    }

    pub(crate) fn log_entry(&self, index: usize) -> Option<&PushEnvelope> {
        self.log.get(index)
    }

    fn emit(&mut self, channel: Channel, event: &str, payload: serde_json::Value) {
        self.log.push(PushEnvelope { channel, event: event.to_string(), payload });
    }

    fn tick(&mut self) -> String {
        self.clock += 1;
        format!("2024-05-01T10:00:{:02}Z", self.clock % 60)
    }

    // --- auth -------------------------------------------------------------

    /// `POST /login`.
    pub fn login(&mut self, email: &str, password: &str) -> Result<(Identity, String), ApiError> {
        let account = self
            .accounts
            .iter()
            .find(|a| a.identity.email == email && a.password == password)
            .cloned()
            .ok_or_else(|| ApiError::from_status(401, "invalid credentials"))?;

        self.next_token += 1;
        let token = format!("token-{}", self.next_token);
        self.tokens.insert(token.clone(), account.identity.clone());
        Ok((account.identity, token))
    }

    /// `POST /logout`.
    pub fn logout(&mut self, token: &str) -> Result<(), ApiError> {
        self.authorize(token)?;
        self.tokens.remove(token);
        Ok(())
    }

    pub(crate) fn authorize(&self, token: &str) -> Result<Identity, ApiError> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or_else(|| ApiError::from_status(401, "token expired or revoked"))
    }

    fn authorize_role(&self, token: &str, role: Role) -> Result<Identity, ApiError> {
        let identity = self.authorize(token)?;
        if identity.role != role {
            return Err(ApiError::from_status(403, "wrong role for this endpoint"));
        }
        Ok(identity)
    }

    // --- visitor queue ----------------------------------------------------

    /// `POST /queue`.
    pub fn join_queue(
        &mut self,
        token: &str,
        reason: Option<&str>,
    ) -> Result<u32, ApiError> {
        let identity = self.authorize_role(token, Role::Visitor)?;
        if self.queue.iter().any(|e| e.visitor_id == identity.role_id) {
            return Err(ApiError::from_status(409, "already in the queue"));
        }
        if self.active_examination_for_visitor(identity.role_id).is_some() {
            return Err(ApiError::from_status(409, "examination in progress"));
        }

        let joined_at = self.tick();
        self.queue.push(QueueEntry {
            visitor_id: identity.role_id,
            visitor_name: identity.name.clone(),
            email: identity.email.clone(),
            reason: reason.map(str::to_string),
            joined_at,
        });
        let position = self.queue.len() as u32;

        self.emit(
            Channel::LoungeQueue,
            event_names::VISITOR_JOINED_QUEUE,
            serde_json::json!({
                "visitor_id": identity.role_id,
                "visitor_name": identity.name,
                "position": position,
            }),
        );
        Ok(position)
    }

    /// `DELETE /queue`.
    pub fn exit_queue(&mut self, token: &str) -> Result<(), ApiError> {
        let identity = self.authorize_role(token, Role::Visitor)?;
        let index = self
            .queue
            .iter()
            .position(|e| e.visitor_id == identity.role_id)
            .ok_or_else(|| ApiError::from_status(409, "not in the queue"))?;
        self.queue.remove(index);

        self.emit(
            Channel::LoungeQueue,
            event_names::VISITOR_EXITED_QUEUE,
            serde_json::json!({
                "visitor_id": identity.role_id,
                "visitor_name": identity.name,
            }),
        );
        Ok(())
    }

    /// `GET /queue/item`.
    pub fn queue_item(&self, token: &str) -> Result<QueueItem, ApiError> {
        let identity = self.authorize_role(token, Role::Visitor)?;
        let position = self
            .queue
            .iter()
            .position(|e| e.visitor_id == identity.role_id)
            .ok_or(ApiError::NotFound)?;
        let entry = &self.queue[position];
        Ok(QueueItem {
            position: (position + 1) as u32,
            joined_at: entry.joined_at.clone(),
            waited_time: Some("1 minute".to_string()),
            estimated_wait_time: Some(format!("{} minutes", (position + 1) * 5)),
            total_visitors: Some(self.queue.len() as u32),
        })
    }

    // --- provider queue ---------------------------------------------------

    /// `GET /queue/list`.
    pub fn waiting_list(&self, token: &str) -> Result<WaitingList, ApiError> {
        self.authorize_role(token, Role::Provider)?;
        Ok(WaitingList {
            total: self.queue.len() as u32,
            visitors: self
                .queue
                .iter()
                .enumerate()
                .map(|(i, e)| QueueVisitor {
                    position: (i + 1) as u32,
                    visitor_id: e.visitor_id,
                    visitor_name: e.visitor_name.clone(),
                    reason: e.reason.clone(),
                    email: Some(e.email.clone()),
                    waiting_time: Some("1 minute".to_string()),
                })
                .collect(),
        })
    }

    /// `POST /queue/pickup`.
    pub fn pickup_visitor(&mut self, token: &str, visitor_id: u64) -> Result<u64, ApiError> {
        let provider = self.authorize_role(token, Role::Provider)?;
        if self.active_examination_for_provider(provider.role_id).is_some() {
            return Err(ApiError::from_status(409, "provider already in examination"));
        }
        let index = self
            .queue
            .iter()
            .position(|e| e.visitor_id == visitor_id)
            .ok_or_else(|| ApiError::from_status(409, "visitor is not in the queue"))?;
        let entry = self.queue.remove(index);

        self.next_examination_id += 1;
        let examination_id = self.next_examination_id;
        let started_at = self.tick();
        self.examinations.push(Examination {
            id: examination_id,
            provider_id: provider.role_id,
            provider_name: provider.name.clone(),
            visitor_id: entry.visitor_id,
            visitor_name: entry.visitor_name.clone(),
            started_at: started_at.clone(),
            reason: entry.reason.clone(),
        });

        self.emit(
            Channel::VisitorPrivate(entry.visitor_id),
            event_names::VISITOR_PICKED_UP,
            serde_json::json!({
                "provider": {
                    "id": provider.role_id,
                    "name": provider.name.clone(),
                    "email": provider.email.clone(),
                },
                "visitor": {
                    "id": entry.visitor_id,
                    "name": entry.visitor_name.clone(),
                    "email": entry.email.clone(),
                },
                "examination_id": examination_id,
                "started_at": started_at,
                "message": format!("You are invited by {}", provider.name),
            }),
        );
        self.emit(
            Channel::ProviderPrivate(provider.role_id),
            event_names::PROVIDER_PICKED_UP_VISITOR,
            serde_json::json!({
                "visitor_id": entry.visitor_id,
                "examination_id": examination_id,
            }),
        );
        self.emit(
            Channel::LoungeQueue,
            event_names::VISITOR_EXITED_QUEUE,
            serde_json::json!({
                "visitor_id": entry.visitor_id,
                "visitor_name": entry.visitor_name,
            }),
        );
        Ok(examination_id)
    }

    // --- examinations -----------------------------------------------------

    /// `POST /examination/complete`, from either side. `counterparty_id`
    /// names the other side's role-scoped id.
    pub fn complete_examination(
        &mut self,
        token: &str,
        counterparty_id: u64,
    ) -> Result<(), ApiError> {
        let identity = self.authorize(token)?;
        let index = self
            .examinations
            .iter()
            .position(|exam| match identity.role {
                Role::Provider => {
                    exam.provider_id == identity.role_id && exam.visitor_id == counterparty_id
                },
                Role::Visitor => {
                    exam.visitor_id == identity.role_id && exam.provider_id == counterparty_id
                },
            })
            .ok_or_else(|| ApiError::from_status(409, "no active examination"))?;
        let exam = self.examinations.remove(index);

        self.emit(
            Channel::VisitorPrivate(exam.visitor_id),
            event_names::VISITOR_EXAMINATION_COMPLETED,
            serde_json::json!({ "examination_id": exam.id }),
        );
        self.emit(
            Channel::ProviderPrivate(exam.provider_id),
            event_names::PROVIDER_COMPLETED_EXAMINATION,
            serde_json::json!({ "examination_id": exam.id }),
        );
        Ok(())
    }

    /// `GET /examination`, role-scoped.
    pub fn examination(&self, token: &str, role: Role) -> Result<ExaminationDetail, ApiError> {
        let identity = self.authorize_role(token, role)?;
        let exam = match role {
            Role::Visitor => self.active_examination_for_visitor(identity.role_id),
            Role::Provider => self.active_examination_for_provider(identity.role_id),
        }
        .ok_or(ApiError::NotFound)?;

        Ok(match role {
            Role::Visitor => ExaminationDetail {
                examination_id: exam.id,
                status: ExamStatus::InProgress,
                provider_id: Some(exam.provider_id),
                provider_name: Some(exam.provider_name.clone()),
                visitor_id: None,
                visitor_name: None,
                started_at: Some(exam.started_at.clone()),
                duration: Some("1 minute".to_string()),
                reason: exam.reason.clone(),
            },
            Role::Provider => ExaminationDetail {
                examination_id: exam.id,
                status: ExamStatus::InProgress,
                provider_id: None,
                provider_name: None,
                visitor_id: Some(exam.visitor_id),
                visitor_name: Some(exam.visitor_name.clone()),
                started_at: Some(exam.started_at.clone()),
                duration: Some("1 minute".to_string()),
                reason: exam.reason.clone(),
            },
        })
    }

    fn active_examination_for_visitor(&self, visitor_id: u64) -> Option<&Examination> {
        self.examinations.iter().find(|e| e.visitor_id == visitor_id)
    }

    fn active_examination_for_provider(&self, provider_id: u64) -> Option<&Examination> {
        self.examinations.iter().find(|e| e.provider_id == provider_id)
    }

    // --- assertions for tests ---------------------------------------------

    /// Number of visitors currently queued.
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the given visitor is queued.
    pub fn is_queued(&self, visitor_id: u64) -> bool {
        self.queue.iter().any(|e| e.visitor_id == visitor_id)
    }

    /// Number of active examinations.
    pub fn examination_count(&self) -> usize {
        self.examinations.len()
    }
}
