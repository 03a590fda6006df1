//! # Request Dispatch Scenarios
//!
//! Index matching against the registered pool, exclusion of failed
//! registrations, and at-most-once submission under redelivery.

#[cfg(test)]
mod tests {
    use crate::integration::support::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use surety_types::{FlightStatus, SendError};

    /// Index 3 is held by oracles 1, 3, and 5 of the fixture; exactly
    /// those three respond.
    #[tokio::test]
    async fn test_request_reaches_every_matching_oracle() {
        let ledger = Arc::new(fixture_ledger());
        let supervisor =
            supervisor_with_status(&ledger, pool_config(), FlightStatus::LateAirline);
        supervisor.start(&fixture_accounts()).await.unwrap();

        let key = flight(100);
        ledger.request_with_index(3, key.clone());
        wait_for(|| ledger.responses(&key).len() == 3).await;

        let responders: HashSet<_> = ledger
            .responses(&key)
            .into_iter()
            .map(|(oracle, _)| oracle)
            .collect();
        assert_eq!(responders, HashSet::from([addr(1), addr(3), addr(5)]));
        supervisor.stop().await;
    }

    /// Index 8 is held only by oracle 5.
    #[tokio::test]
    async fn test_single_holder_index() {
        let ledger = Arc::new(fixture_ledger());
        let supervisor = supervisor_with_status(&ledger, pool_config(), FlightStatus::OnTime);
        supervisor.start(&fixture_accounts()).await.unwrap();

        let key = flight(200);
        ledger.request_with_index(8, key.clone());
        wait_for(|| ledger.responses(&key).len() == 1).await;
        assert_eq!(ledger.responses(&key)[0].0, addr(5));

        settle().await;
        assert_eq!(ledger.responses(&key).len(), 1);
        supervisor.stop().await;
    }

    /// A rejected registration never matches, whatever index comes in.
    #[tokio::test]
    async fn test_failed_registration_excluded_from_matching() {
        let ledger = Arc::new(fixture_ledger().failing_registration(addr(3)));
        let supervisor =
            supervisor_with_status(&ledger, pool_config(), FlightStatus::LateWeather);
        supervisor.start(&fixture_accounts()).await.unwrap();

        let status = oracle_pool::OraclePoolApi::status(&supervisor);
        assert_eq!(status.registered, 4);
        assert_eq!(status.failed, 1);

        // Index 3 normally matches oracles 1, 3, 5; only 1 and 5 remain.
        let key = flight(300);
        ledger.request_with_index(3, key.clone());
        wait_for(|| ledger.responses(&key).len() == 2).await;

        let responders: HashSet<_> = ledger
            .responses(&key)
            .into_iter()
            .map(|(oracle, _)| oracle)
            .collect();
        assert_eq!(responders, HashSet::from([addr(1), addr(5)]));
        supervisor.stop().await;
    }

    /// Redelivering the same journaled request produces no second
    /// submission from any oracle, and no reverted duplicates either:
    /// the pool suppresses them before they reach the ledger.
    #[tokio::test]
    async fn test_redelivered_request_is_suppressed() {
        let ledger = Arc::new(fixture_ledger());
        let supervisor =
            supervisor_with_status(&ledger, pool_config(), FlightStatus::LateOther);
        supervisor.start(&fixture_accounts()).await.unwrap();

        let key = flight(400);
        let offset = ledger.request_with_index(9, key.clone());
        wait_for(|| ledger.responses(&key).len() == 1).await;

        ledger.redeliver(offset).unwrap();
        settle().await;

        assert_eq!(ledger.responses(&key).len(), 1);
        let status = oracle_pool::OraclePoolApi::status(&supervisor);
        assert_eq!(status.requests_processed, 1);
        assert_eq!(status.submissions_issued, 1);
        assert_eq!(status.submissions_failed, 0);
        supervisor.stop().await;
    }

    /// The same flight under a different index is a distinct request.
    #[tokio::test]
    async fn test_same_flight_new_index_is_new_request() {
        let ledger = Arc::new(fixture_ledger());
        let supervisor = supervisor_with_status(&ledger, pool_config(), FlightStatus::OnTime);
        supervisor.start(&fixture_accounts()).await.unwrap();

        let key = flight(500);
        ledger.request_with_index(7, key.clone());
        wait_for(|| ledger.responses(&key).len() == 1).await;
        ledger.request_with_index(6, key.clone());
        wait_for(|| ledger.responses(&key).len() == 2).await;

        let status = oracle_pool::OraclePoolApi::status(&supervisor);
        assert_eq!(status.requests_processed, 2);
        supervisor.stop().await;
    }

    /// A duplicate would revert at the ledger; the pool never sends it,
    /// so the ledger-side rule stays a backstop.
    #[tokio::test]
    async fn test_ledger_backstop_rejects_manual_duplicate() {
        let ledger = Arc::new(fixture_ledger());
        let supervisor = supervisor_with_status(&ledger, pool_config(), FlightStatus::OnTime);
        supervisor.start(&fixture_accounts()).await.unwrap();

        let key = flight(600);
        ledger.request_with_index(8, key.clone());
        wait_for(|| ledger.responses(&key).len() == 1).await;
        supervisor.stop().await;

        use oracle_pool::LedgerGateway;
        let err = ledger
            .submit_oracle_response(addr(5), 8, &key, FlightStatus::OnTime)
            .await
            .unwrap_err();
        assert!(matches!(err, SendError::Reverted(_)));
    }
}
