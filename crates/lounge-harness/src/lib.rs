//! Deterministic simulation harness for lounge client testing.
//!
//! [`SimClinic`] is an authoritative in-memory rendition of the waiting-room
//! backend: accounts, the FIFO queue, active examinations, and the push
//! outbox. [`SimRest`] and [`SimPush`] implement the `lounge-app` driver
//! traits against a shared clinic, so the same runtime code that talks to
//! production transports runs against the simulation.
//!
//! Delivery is test-controlled: the clinic can hold its outbox to create
//! race windows and duplicate deliveries to exercise idempotency, and every
//! bind/unbind is logged so tests can assert symmetric subscription
//! teardown.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod sim_clinic;
mod sim_driver;

pub use sim_clinic::{BindLogEntry, SharedClinic, SimClinic, share};
pub use sim_driver::{SimPush, SimRest, drivers};
