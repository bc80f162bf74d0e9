//! State-machine core of the lounge waiting-room client.
//!
//! Both role machines are pure: they consume typed events
//! ([`VisitorEvent`] / [`ProviderEvent`]) and return actions
//! ([`VisitorAction`] / [`ProviderAction`]) for the runtime to execute. No
//! I/O, no clock, no globals — fully testable in simulation, same code in
//! production.
//!
//! The transport provides no ordering between a locally-issued REST call's
//! completion and an independently-arriving push event for the same logical
//! change, so every transition here is a total, idempotent function of the
//! latest known truth. Where ambiguity exists the machines prefer asking
//! for a fresh snapshot (`Fetch*` actions) over applying deltas.
//!
//! # Components
//!
//! - [`VisitorMachine`]: idle → queued → in-examination loop
//! - [`ProviderMachine`]: waiting-list snapshot plus active examination
//! - [`Notice`]: transient, user-dismissible message
//! - [`QueueStatus`] / [`ExaminationStatus`]: visitor-side view model

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod event;
mod notice;
mod provider;
mod status;
mod visitor;

pub use action::{ProviderAction, VisitorAction};
pub use event::{ProviderEvent, VisitorEvent};
pub use notice::{Notice, Severity};
pub use provider::ProviderMachine;
pub use status::{ExaminationStatus, QueueStatus};
pub use visitor::{JoinPolicy, VisitorMachine, VisitorPhase};
