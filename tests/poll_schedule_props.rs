use std::time::Duration;

use proptest::prelude::*;

use orchestrator::engine::PollSchedule;

proptest! {
    #[test]
    fn simulated_polling_lands_exactly_on_the_deadline(
        intervals in prop::collection::vec(1u64..5_000, 1..8),
        timeout_ms in 1u64..60_000,
    ) {
        let schedule = PollSchedule::new(intervals.iter().copied().map(Duration::from_millis).collect())
            .expect("generated intervals are positive");
        let timeout = Duration::from_millis(timeout_ms);

        let mut elapsed = Duration::ZERO;
        let mut tick = 0usize;
        while elapsed < timeout {
            let wait = schedule.next_wait(tick, elapsed, timeout);
            prop_assert!(!wait.is_zero());
            prop_assert!(wait <= schedule.interval_at(tick));
            elapsed += wait;
            tick += 1;
            // Each tick advances by at least 1ms.
            prop_assert!(tick as u64 <= timeout_ms);
        }

        prop_assert_eq!(elapsed, timeout);
    }

    #[test]
    fn intervals_past_the_end_repeat_the_last(
        intervals in prop::collection::vec(1u64..10_000, 1..8),
        tick in 0usize..100,
    ) {
        let durations: Vec<Duration> = intervals.iter().copied().map(Duration::from_millis).collect();
        let schedule = PollSchedule::new(durations.clone()).expect("generated intervals are positive");

        let expected = durations.get(tick).copied().unwrap_or(durations[durations.len() - 1]);
        prop_assert_eq!(schedule.interval_at(tick), expected);
    }
}
