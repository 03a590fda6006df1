//! # Concurrency Bound
//!
//! The pool caps simultaneously in-flight ledger submissions at the
//! configured limit, whatever the backlog.

#[cfg(test)]
mod tests {
    use crate::integration::support::*;
    use std::sync::Arc;
    use std::time::Duration;
    use surety_types::FlightStatus;

    /// Fifteen requests over five oracles with randomized latency:
    /// the sim's high-water mark never exceeds the limit of 3.
    #[tokio::test]
    async fn test_in_flight_submissions_never_exceed_limit() {
        let ledger = Arc::new(
            fixture_ledger()
                .with_submit_latency(Duration::from_millis(10), Duration::from_millis(60)),
        );
        let mut config = pool_config();
        config.concurrency_limit = 3;
        config.stop_grace = Duration::from_secs(10);
        let supervisor =
            supervisor_with_status(&ledger, config, FlightStatus::LateAirline);
        supervisor.start(&fixture_accounts()).await.unwrap();

        // Index 3 matches three oracles, so this queues 45 submissions.
        let mut expected = 0;
        for round in 0..15 {
            ledger.request_with_index(3, flight(1000 + round));
            expected += 3;
        }
        wait_for(|| {
            (0..15)
                .map(|round| ledger.responses(&flight(1000 + round)).len())
                .sum::<usize>()
                == expected
        })
        .await;

        assert!(
            ledger.max_in_flight() <= 3,
            "high-water mark {} exceeded the limit",
            ledger.max_in_flight()
        );
        supervisor.stop().await;
    }

    /// A limit above the workload size leaves the bound untouched but
    /// lets everything run at once.
    #[tokio::test]
    async fn test_generous_limit_is_not_a_bottleneck() {
        let ledger = Arc::new(
            fixture_ledger()
                .with_submit_latency(Duration::from_millis(100), Duration::from_millis(100)),
        );
        let supervisor =
            supervisor_with_status(&ledger, pool_config(), FlightStatus::OnTime);
        supervisor.start(&fixture_accounts()).await.unwrap();

        let key = flight(2000);
        ledger.request_with_index(3, key.clone());
        wait_for(|| ledger.responses(&key).len() == 3).await;

        // All three ran concurrently under the default limit of 8.
        assert_eq!(ledger.max_in_flight(), 3);
        supervisor.stop().await;
    }
}
