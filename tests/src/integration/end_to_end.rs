//! # End-to-End Flow
//!
//! A flight-status request travels the full loop: published on the
//! ledger, dispatched to matching oracles, answered back, and settled
//! by the contract once three responses agree.

#[cfg(test)]
mod tests {
    use crate::integration::support::*;
    use ledger_bus::{EventFilter, EventTopic, LedgerEvent, StartOffset};
    use std::sync::Arc;
    use std::time::Duration;
    use surety_types::FlightStatus;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_three_agreeing_responses_finalize_the_flight() {
        let ledger = Arc::new(fixture_ledger());
        let supervisor =
            supervisor_with_status(&ledger, pool_config(), FlightStatus::LateAirline);
        supervisor.start(&fixture_accounts()).await.unwrap();

        let mut finals = ledger.bus().subscribe(
            EventFilter::topics(vec![EventTopic::FlightStatusFinal]),
            StartOffset::Now,
        );

        // Index 3 matches oracles 1, 3, 5; all report LateAirline.
        let key = flight(100);
        ledger.request_with_index(3, key.clone());

        let event = timeout(Duration::from_secs(5), finals.recv())
            .await
            .expect("finalization within the deadline")
            .expect("subscription open");
        assert_eq!(
            event.1,
            LedgerEvent::FlightStatusFinal {
                flight: key.clone(),
                status: FlightStatus::LateAirline,
            }
        );

        supervisor.stop().await;
        let status = oracle_pool::OraclePoolApi::status(&supervisor);
        assert_eq!(status.submissions_issued, 3);
        assert_eq!(status.submissions_failed, 0);
        assert_eq!(ledger.responses(&key).len(), 3);
    }

    /// Disagreeing oracles never settle the flight.
    #[tokio::test]
    async fn test_split_reports_leave_the_flight_open() {
        // Per-oracle fixed answers: three responders, three statuses.
        struct SplitStatus;
        impl oracle_pool::FlightStatusSource for SplitStatus {
            fn observe(
                &self,
                oracle: &surety_types::Address,
                _flight: &surety_types::FlightKey,
            ) -> FlightStatus {
                match oracle[0] {
                    1 => FlightStatus::OnTime,
                    3 => FlightStatus::LateAirline,
                    _ => FlightStatus::LateWeather,
                }
            }
        }

        let ledger = Arc::new(fixture_ledger());
        let gateway: Arc<dyn oracle_pool::LedgerGateway> = ledger.clone();
        let supervisor =
            oracle_pool::PoolSupervisor::new(pool_config(), gateway, Arc::new(SplitStatus))
                .unwrap();
        supervisor.start(&fixture_accounts()).await.unwrap();

        let mut finals = ledger.bus().subscribe(
            EventFilter::topics(vec![EventTopic::FlightStatusFinal]),
            StartOffset::Now,
        );

        let key = flight(200);
        ledger.request_with_index(3, key.clone());
        wait_for(|| ledger.responses(&key).len() == 3).await;

        assert!(
            timeout(Duration::from_millis(300), finals.recv())
                .await
                .is_err(),
            "no finalization should occur"
        );
        supervisor.stop().await;
    }
}
