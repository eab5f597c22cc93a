use std::sync::Arc;

use sr_relayer::events::{Outcome, RelayEvent};

use crate::testing_tool::chain::{ScriptedChain, ScriptedConnector};
use crate::testing_tool::common::{
    relay_config, setup_scheduler, RecordingSink, MAIN_SEED_URLS, MAIN_URL, SUB_CHAIN, SUB_URL,
};

fn failovers(sink: &RecordingSink) -> Vec<(String, String)> {
    sink.events()
        .into_iter()
        .filter_map(|event| match event {
            RelayEvent::EndpointFailedOver {
                old_url, new_url, ..
            } => Some((old_url, new_url)),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_main_chain_fails_over_after_threshold() {
    let main = Arc::new(ScriptedChain::new(MAIN_URL, 1000));
    main.set_alive(false);
    // first seed is unregistered and therefore down
    let seed = Arc::new(ScriptedChain::new(MAIN_SEED_URLS[1], 1000));
    seed.set_accepted(SUB_CHAIN, 14);
    let sub = Arc::new(ScriptedChain::new(SUB_URL, 25));
    let connector = Arc::new(
        ScriptedConnector::new()
            .with_chain(main.clone())
            .with_chain(seed.clone())
            .with_chain(sub),
    );
    let sink = Arc::new(RecordingSink::default());
    let mut scheduler = setup_scheduler(&relay_config(), connector, sink.clone()).await;

    for _ in 0..3 {
        scheduler.on_fire().await;
    }
    assert!(failovers(&sink).is_empty());
    assert_eq!(scheduler.main_chain().endpoints.active_url(), MAIN_URL);
    assert_eq!(scheduler.main_chain().endpoints.consecutive_failures(), 3);
    assert!(sink
        .relay_outcomes()
        .iter()
        .all(|(_, _, outcome)| matches!(outcome, Outcome::Failed { .. })));

    sink.clear();
    scheduler.on_fire().await;
    assert_eq!(
        failovers(&sink),
        vec![(MAIN_URL.to_string(), MAIN_SEED_URLS[1].to_string())]
    );
    assert_eq!(
        scheduler.main_chain().endpoints.active_url(),
        MAIN_SEED_URLS[1]
    );
    assert_eq!(scheduler.main_chain().endpoints.consecutive_failures(), 0);

    // the same tick already relays through the new endpoint
    assert_eq!(seed.accepted(SUB_CHAIN), 24);
    assert!(main.pushed().is_empty());
}

#[tokio::test]
async fn test_recovered_endpoint_resets_failures() {
    let main = Arc::new(ScriptedChain::new(MAIN_URL, 1000));
    let seed = Arc::new(ScriptedChain::new(MAIN_SEED_URLS[0], 1000));
    let sub = Arc::new(ScriptedChain::new(SUB_URL, 10));
    let connector = Arc::new(
        ScriptedConnector::new()
            .with_chain(main.clone())
            .with_chain(seed.clone())
            .with_chain(sub),
    );
    let sink = Arc::new(RecordingSink::default());
    let mut scheduler = setup_scheduler(&relay_config(), connector, sink.clone()).await;

    for alive in [false, false, false, true, false, false, false] {
        main.set_alive(alive);
        scheduler.on_fire().await;
    }
    assert!(failovers(&sink).is_empty());
    assert_eq!(scheduler.main_chain().endpoints.active_url(), MAIN_URL);
    assert_eq!(seed.info_calls(), 0);
}

#[tokio::test]
async fn test_no_responsive_seed_keeps_endpoint() {
    let main = Arc::new(ScriptedChain::new(MAIN_URL, 1000));
    main.set_alive(false);
    let sub = Arc::new(ScriptedChain::new(SUB_URL, 10));
    let connector = Arc::new(
        ScriptedConnector::new()
            .with_chain(main.clone())
            .with_chain(sub),
    );
    let sink = Arc::new(RecordingSink::default());
    let mut scheduler = setup_scheduler(&relay_config(), connector, sink.clone()).await;

    for _ in 0..4 {
        scheduler.on_fire().await;
    }
    assert!(failovers(&sink).is_empty());
    assert_eq!(scheduler.main_chain().endpoints.active_url(), MAIN_URL);
    // the counter starts over after an unsuccessful rotation
    assert_eq!(scheduler.main_chain().endpoints.consecutive_failures(), 0);

    // the endpoint comes back and is used again
    main.set_alive(true);
    main.set_accepted(SUB_CHAIN, 0);
    scheduler.on_fire().await;
    assert_eq!(main.accepted(SUB_CHAIN), 9);
}
