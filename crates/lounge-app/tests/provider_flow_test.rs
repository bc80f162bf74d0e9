//! Provider runtime flows against the simulated clinic.

use lounge_app::{ProviderRuntime, SessionManager};
use lounge_client::Severity;
use lounge_core::MemorySessionStorage;
use lounge_harness::{SharedClinic, SimClinic, SimPush, SimRest, drivers, share};
use lounge_proto::LoginRequest;

fn credentials(email: &str) -> LoginRequest {
    LoginRequest { email: email.to_string(), password: "pw".to_string() }
}

fn seeded_clinic() -> SharedClinic {
    let mut clinic = SimClinic::new();
    clinic.add_visitor("Ada", "ada@example.com", "pw");
    clinic.add_visitor("Grace", "grace@example.com", "pw");
    clinic.add_provider("Dr. X", "drx@example.com", "pw");
    clinic.add_provider("Dr. Y", "dry@example.com", "pw");
    share(clinic)
}

async fn provider_runtime(
    clinic: &SharedClinic,
    email: &str,
) -> ProviderRuntime<SimRest, SimPush, MemorySessionStorage> {
    let (rest, push) = drivers(clinic);
    let mut session = SessionManager::new(MemorySessionStorage::new());
    session.login(&rest, credentials(email)).await.expect("login");
    ProviderRuntime::start(rest, push, session).await.expect("start")
}

/// Queue a visitor directly against the clinic, returning the role id.
async fn queue_visitor(clinic: &SharedClinic, email: &str, reason: &str) -> u64 {
    let mut clinic = clinic.lock().await;
    let (identity, token) = clinic.login(email, "pw").expect("visitor login");
    clinic.join_queue(&token, Some(reason)).expect("join");
    identity.role_id
}

#[tokio::test]
async fn startup_loads_the_waiting_list() {
    let clinic = seeded_clinic();
    let ada = queue_visitor(&clinic, "ada@example.com", "checkup").await;

    let runtime = provider_runtime(&clinic, "drx@example.com").await;

    let view = runtime.view();
    assert!(view.queue_loaded);
    assert_eq!(view.queue.total, 1);
    assert!(view.queue.contains(ada));
    assert!(view.examination.is_none());
}

#[tokio::test]
async fn join_broadcast_triggers_full_repull() {
    let clinic = seeded_clinic();
    let mut runtime = provider_runtime(&clinic, "drx@example.com").await;
    assert_eq!(runtime.view().queue.total, 0);

    let ada = queue_visitor(&clinic, "ada@example.com", "checkup").await;
    runtime.pump_events().await.expect("pump");

    let view = runtime.view();
    assert_eq!(view.queue.total, 1);
    assert!(view.queue.contains(ada));
}

#[tokio::test]
async fn pickup_starts_examination_and_clears_entry() {
    let clinic = seeded_clinic();
    let ada = queue_visitor(&clinic, "ada@example.com", "checkup").await;
    let mut runtime = provider_runtime(&clinic, "drx@example.com").await;

    runtime.pickup_visitor(ada).await.expect("pickup");
    runtime.pump_events().await.expect("pump");

    let view = runtime.view();
    let exam = view.examination.expect("examination active");
    assert_eq!(exam.visitor_id, Some(ada));
    assert!(!view.queue.contains(ada));
}

#[tokio::test]
async fn losing_a_pickup_race_keeps_state_and_reports() {
    let clinic = seeded_clinic();
    let ada = queue_visitor(&clinic, "ada@example.com", "checkup").await;
    let mut first = provider_runtime(&clinic, "drx@example.com").await;
    let mut second = provider_runtime(&clinic, "dry@example.com").await;

    first.pickup_visitor(ada).await.expect("pickup");
    second.pickup_visitor(ada).await.expect("pickup command");

    let view = second.view();
    assert!(view.examination.is_none());
    assert!(view.notice.is_some_and(|n| n.severity == Severity::Error));
}

#[tokio::test]
async fn completion_returns_to_idle_and_notifies() {
    let clinic = seeded_clinic();
    let ada = queue_visitor(&clinic, "ada@example.com", "checkup").await;
    let mut runtime = provider_runtime(&clinic, "drx@example.com").await;

    runtime.pickup_visitor(ada).await.expect("pickup");
    runtime.pump_events().await.expect("pump");
    runtime.complete_examination(ada).await.expect("complete");
    runtime.pump_events().await.expect("pump");

    assert!(runtime.view().examination.is_none());
    assert_eq!(clinic.lock().await.examination_count(), 0);
}

#[tokio::test]
async fn queue_keeps_updating_while_examining() {
    let clinic = seeded_clinic();
    let ada = queue_visitor(&clinic, "ada@example.com", "checkup").await;
    let mut runtime = provider_runtime(&clinic, "drx@example.com").await;

    runtime.pickup_visitor(ada).await.expect("pickup");
    runtime.pump_events().await.expect("pump");
    assert!(runtime.view().examination.is_some());

    let grace = queue_visitor(&clinic, "grace@example.com", "followup").await;
    runtime.pump_events().await.expect("pump");

    let view = runtime.view();
    assert!(view.examination.is_some());
    assert!(view.queue.contains(grace));
}

#[tokio::test]
async fn notice_is_dismissible() {
    let clinic = seeded_clinic();
    let mut runtime = provider_runtime(&clinic, "drx@example.com").await;

    // Unqueued pickup is rejected server-side and surfaces as a notice.
    runtime.pickup_visitor(999).await.expect("pickup command");
    assert!(runtime.view().notice.is_some());

    runtime.dismiss_notice().await.expect("dismiss");
    assert!(runtime.view().notice.is_none());
}
