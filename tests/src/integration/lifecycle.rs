//! # Pool Lifecycle Scenarios
//!
//! Startup failure modes, failure isolation while running, and
//! graceful shutdown with a bounded drain.

#[cfg(test)]
mod tests {
    use crate::integration::support::*;
    use oracle_pool::{OraclePoolApi, PoolError, SupervisorState};
    use std::sync::Arc;
    use std::time::Duration;
    use surety_types::{FlightStatus, SendError};

    #[tokio::test]
    async fn test_stop_on_stopped_pool_is_noop() {
        let ledger = Arc::new(fixture_ledger());
        let supervisor = supervisor_with_status(&ledger, pool_config(), FlightStatus::OnTime);

        supervisor.stop().await;
        assert_eq!(supervisor.status().state, SupervisorState::Stopped);

        supervisor.start(&fixture_accounts()).await.unwrap();
        supervisor.stop().await;
        supervisor.stop().await;
        assert_eq!(supervisor.status().state, SupervisorState::Stopped);
    }

    #[tokio::test]
    async fn test_unreachable_ledger_fails_startup() {
        let ledger = Arc::new(fixture_ledger());
        ledger.set_reachable(false);
        let supervisor = supervisor_with_status(&ledger, pool_config(), FlightStatus::OnTime);

        let err = supervisor.start(&fixture_accounts()).await.unwrap_err();
        assert!(matches!(err, PoolError::LedgerUnreachable(_)));
        assert_eq!(supervisor.status().state, SupervisorState::Stopped);

        // The pool recovers once the node is back.
        ledger.set_reachable(true);
        supervisor.start(&fixture_accounts()).await.unwrap();
        assert_eq!(supervisor.status().state, SupervisorState::Running);
        supervisor.stop().await;
    }

    /// One oracle's submissions time out; its failures are counted and
    /// the rest of the pool keeps answering later requests.
    #[tokio::test]
    async fn test_submission_timeout_does_not_stall_the_pool() {
        let ledger = Arc::new(
            fixture_ledger().failing_submission(addr(1), SendError::Timeout { after_ms: 250 }),
        );
        let supervisor =
            supervisor_with_status(&ledger, pool_config(), FlightStatus::LateAirline);
        supervisor.start(&fixture_accounts()).await.unwrap();

        // Index 3 matches oracles 1, 3, 5; oracle 1 times out.
        let first = flight(100);
        ledger.request_with_index(3, first.clone());
        wait_for(|| ledger.responses(&first).len() == 2).await;

        // A later request still gets served.
        let second = flight(200);
        ledger.request_with_index(2, second.clone());
        wait_for(|| ledger.responses(&second).len() == 2).await;

        supervisor.stop().await;
        let status = supervisor.status();
        assert_eq!(status.submissions_failed, 1);
        assert_eq!(status.submissions_issued, 4);
        assert_eq!(status.requests_processed, 2);
    }

    /// Submissions still in flight when the grace period expires are
    /// abandoned and counted; completions within it count as issued.
    #[tokio::test]
    async fn test_shutdown_grace_bounds_the_drain() {
        let ledger = Arc::new(
            fixture_ledger()
                .with_submit_latency(Duration::from_secs(3), Duration::from_secs(3)),
        );
        let mut config = pool_config();
        config.stop_grace = Duration::from_millis(500);
        let supervisor =
            supervisor_with_status(&ledger, config, FlightStatus::LateTechnical);
        supervisor.start(&fixture_accounts()).await.unwrap();

        // Three submissions enter the 3s ledger call, far beyond the
        // 500ms grace.
        ledger.request_with_index(3, flight(300));
        wait_for(|| ledger.max_in_flight() == 3).await;

        let before = std::time::Instant::now();
        supervisor.stop().await;
        assert!(before.elapsed() < Duration::from_secs(2));

        let status = supervisor.status();
        assert_eq!(status.submissions_abandoned, 3);
        assert_eq!(status.submissions_issued, 0);
        assert_eq!(status.state, SupervisorState::Stopped);
    }

    /// Fast submissions drain fully within the grace period.
    #[tokio::test]
    async fn test_shutdown_waits_for_short_work() {
        let ledger = Arc::new(
            fixture_ledger()
                .with_submit_latency(Duration::from_millis(50), Duration::from_millis(100)),
        );
        let supervisor =
            supervisor_with_status(&ledger, pool_config(), FlightStatus::OnTime);
        supervisor.start(&fixture_accounts()).await.unwrap();

        ledger.request_with_index(3, flight(400));
        wait_for(|| ledger.max_in_flight() >= 1).await;
        supervisor.stop().await;

        let status = supervisor.status();
        assert_eq!(status.submissions_abandoned, 0);
        assert_eq!(status.submissions_issued, 3);
    }
}
