//! Full waiting-room scenario across both runtimes sharing one clinic.
//!
//! Visitor joins, provider picks up, provider completes; each side observes
//! its own transitions through its own push channels and snapshots.

use lounge_app::{ProviderRuntime, SessionManager, VisitorRuntime};
use lounge_client::{JoinPolicy, VisitorPhase};
use lounge_core::MemorySessionStorage;
use lounge_harness::{SimClinic, drivers, share};
use lounge_proto::LoginRequest;

fn credentials(email: &str) -> LoginRequest {
    LoginRequest { email: email.to_string(), password: "pw".to_string() }
}

#[tokio::test]
async fn visitor_and_provider_walk_through_a_full_visit() {
    let mut clinic = SimClinic::new();
    clinic.add_visitor("Ada", "ada@example.com", "pw");
    clinic.add_provider("Dr. X", "drx@example.com", "pw");
    let clinic = share(clinic);

    let (visitor_rest, visitor_push) = drivers(&clinic);
    let mut visitor_session = SessionManager::new(MemorySessionStorage::new());
    visitor_session
        .login(&visitor_rest, credentials("ada@example.com"))
        .await
        .expect("visitor login");
    let mut visitor =
        VisitorRuntime::start(visitor_rest, visitor_push, visitor_session, JoinPolicy::default())
            .await
            .expect("visitor start");

    let (provider_rest, provider_push) = drivers(&clinic);
    let mut provider_session = SessionManager::new(MemorySessionStorage::new());
    provider_session
        .login(&provider_rest, credentials("drx@example.com"))
        .await
        .expect("provider login");
    let mut provider = ProviderRuntime::start(provider_rest, provider_push, provider_session)
        .await
        .expect("provider start");

    // Visitor joins; both sides converge on position 1.
    visitor.join_queue("vsee123", Some("checkup".to_string())).await.expect("join");
    visitor.pump_events().await.expect("visitor pump");
    provider.pump_events().await.expect("provider pump");

    let visitor_id = visitor.visitor_id();
    assert_eq!(visitor.view().phase(), VisitorPhase::Queued);
    assert_eq!(visitor.view().queue.position, Some(1));
    assert!(provider.view().queue.contains(visitor_id));

    // Provider picks the visitor up; the visitor transitions via its own
    // push channel, and the provider's list no longer holds the visitor.
    provider.pickup_visitor(visitor_id).await.expect("pickup");
    provider.pump_events().await.expect("provider pump");
    visitor.pump_events().await.expect("visitor pump");

    let visitor_view = visitor.view();
    assert_eq!(visitor_view.phase(), VisitorPhase::InExamination);
    assert!(visitor_view.examination.active);
    assert_eq!(visitor_view.examination.counterparty_name.as_deref(), Some("Dr. X"));
    assert!(visitor_view.examination.examination_id.is_some());
    assert!(!visitor_view.queue.in_queue);

    let provider_view = provider.view();
    let exam = provider_view.examination.expect("provider examination");
    assert_eq!(exam.visitor_id, Some(visitor_id));
    assert!(!provider_view.queue.contains(visitor_id));

    // Provider completes; both sides return to idle.
    provider.complete_examination(visitor_id).await.expect("complete");
    provider.pump_events().await.expect("provider pump");
    visitor.pump_events().await.expect("visitor pump");

    assert_eq!(visitor.view().phase(), VisitorPhase::Idle);
    assert!(!visitor.view().examination.active);
    assert!(!visitor.view().queue.in_queue);
    assert!(provider.view().examination.is_none());

    // Teardown is symmetric on both runtimes.
    visitor.shutdown().await;
    provider.shutdown().await;
    let clinic = clinic.lock().await;
    let binds = clinic.bind_log();
    assert_eq!(
        binds.iter().filter(|b| b.bound).count(),
        binds.iter().filter(|b| !b.bound).count()
    );
}
