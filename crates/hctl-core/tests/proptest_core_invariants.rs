//! Property-based invariant tests for request tokens and observer lists.
//!
//! 1. Issued tokens are strictly increasing and never `NONE`.
//! 2. Only the latest issued token is current.
//! 3. Each listener sees one replay plus one call per notify while live.
//! 4. Subscription ids are never reused.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use hctl_core::{RequestToken, Subscribers, SubscriptionId, TokenSequence};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum ObsOp {
    Subscribe,
    Unsubscribe(usize),
    Notify,
}

fn obs_op_strategy() -> impl Strategy<Value = ObsOp> {
    prop_oneof![
        Just(ObsOp::Subscribe),
        (0usize..8).prop_map(ObsOp::Unsubscribe),
        Just(ObsOp::Notify),
    ]
}

proptest! {
    #[test]
    fn tokens_are_strictly_monotonic(count in 1usize..64) {
        let mut seq = TokenSequence::new();
        let mut issued = Vec::with_capacity(count);
        for _ in 0..count {
            issued.push(seq.issue());
        }
        prop_assert!(issued.iter().all(|t| *t != RequestToken::NONE));
        prop_assert!(issued.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(seq.current(), issued[count - 1]);
        for (i, token) in issued.iter().enumerate() {
            prop_assert_eq!(seq.is_current(*token), i == count - 1);
        }
    }

    #[test]
    fn observers_see_replay_and_every_notify(
        ops in proptest::collection::vec(obs_op_strategy(), 0..40),
    ) {
        let mut subs: Subscribers<u32> = Subscribers::new();
        let mut live: Vec<(SubscriptionId, Arc<Mutex<u32>>, u32)> = Vec::new();
        let mut seen_ids = HashSet::new();
        let mut removed = Vec::new();

        for op in ops {
            match op {
                ObsOp::Subscribe => {
                    let calls = Arc::new(Mutex::new(0u32));
                    let sink = Arc::clone(&calls);
                    let id = subs.subscribe(&0, move |_| *sink.lock().unwrap() += 1);
                    prop_assert!(seen_ids.insert(id), "id reused: {id}");
                    prop_assert_eq!(*calls.lock().unwrap(), 1);
                    live.push((id, calls, 1));
                }
                ObsOp::Unsubscribe(i) => {
                    if live.is_empty() {
                        continue;
                    }
                    let (id, calls, expected) = live.remove(i % live.len());
                    prop_assert!(subs.unsubscribe(id));
                    prop_assert!(!subs.unsubscribe(id));
                    removed.push((calls, expected));
                }
                ObsOp::Notify => {
                    subs.notify(&7);
                    for entry in &mut live {
                        entry.2 += 1;
                    }
                }
            }
            prop_assert_eq!(subs.len(), live.len());
        }

        for (_, calls, expected) in &live {
            prop_assert_eq!(*calls.lock().unwrap(), *expected);
        }
        for (calls, expected) in &removed {
            prop_assert_eq!(*calls.lock().unwrap(), *expected);
        }
    }
}
