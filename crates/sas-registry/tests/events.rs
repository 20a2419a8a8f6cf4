//! Event Publication Tests
//!
//! Every committed mutation yields exactly one sequenced event, visible both
//! in the bounded history and on the broadcast channel, and an indexer fed
//! from the channel reproduces the device view.

use sas_core::{EventRecord, RegistryEvent};
use sas_registry::{EventIndexer, IndexedStatus};
use sas_testkit::*;
use tokio::sync::broadcast::error::TryRecvError;

fn drain(receiver: &mut tokio::sync::broadcast::Receiver<EventRecord>) -> Vec<EventRecord> {
    let mut records = Vec::new();
    loop {
        match receiver.try_recv() {
            Ok(record) => records.push(record),
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return records,
            Err(TryRecvError::Lagged(skipped)) => panic!("receiver lagged by {skipped}"),
        }
    }
}

#[test]
fn one_event_per_successful_mutation() {
    let fixture = RegistryFixture::builder().build();
    let registry = &fixture.registry;
    let mut receiver = registry.subscribe();

    registry
        .register(SAS_1, sample_registration(FCC_ID, USER_ID, "SN1"))
        .unwrap();
    registry
        .register(SAS_1, sample_registration(FCC_ID, USER_ID, "SN1"))
        .unwrap_err();
    let receipt = registry
        .grant_spectrum(SAS_1, &sample_grant(FCC_ID, "SN1"))
        .unwrap();
    registry
        .heartbeat(SAS_1, FCC_ID, "SN1", &receipt.grant_id)
        .unwrap();
    registry
        .relinquish(SAS_1, FCC_ID, "SN1", &receipt.grant_id)
        .unwrap();
    registry.deregister(SAS_1, FCC_ID, "SN1").unwrap();
    registry.reset(OWNER).unwrap();

    let names: Vec<&str> = drain(&mut receiver)
        .iter()
        .map(|record| record.event.name())
        .collect();
    assert_eq!(
        names,
        vec![
            "CBSDRegistered",
            "GrantCreated",
            "GrantTerminated",
            "CBSDDeregistered",
            "RegistryReset",
        ]
    );
}

#[test]
fn history_and_channel_agree() {
    let fixture = RegistryFixture::builder().build();
    let registry = &fixture.registry;
    let mut receiver = registry.subscribe();

    for serial in ["SN1", "SN2", "SN3"] {
        registry
            .register(SAS_2, sample_registration(FCC_ID, USER_ID, serial))
            .unwrap();
    }

    let published = drain(&mut receiver);
    assert_eq!(registry.recent_events(3), published);
    assert_eq!(
        published.last().map(|record| record.sequence),
        Some(registry.stats().last_sequence)
    );
}

#[test]
fn history_is_bounded() {
    let fixture = RegistryFixture::builder()
        .without_defaults()
        .event_log_capacity(4)
        .build();
    let registry = &fixture.registry;
    for n in 0..10 {
        registry.inject_user_id(OWNER, &format!("U{n}")).unwrap();
    }

    let recent = registry.recent_events(100);
    assert_eq!(recent.len(), 4);
    assert_eq!(recent[0].sequence, 7);
    assert_eq!(
        recent[3].event,
        RegistryEvent::UserIdInjected {
            user_id: "U9".to_string()
        }
    );
}

#[test]
fn events_serialize_with_wire_names() {
    let fixture = RegistryFixture::builder().build();
    let record = fixture
        .registry
        .register(SAS_1, sample_registration(FCC_ID, USER_ID, "SN1"))
        .unwrap();

    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(value["event"], "CBSDRegistered");
    assert_eq!(value["fccId"], FCC_ID);
    assert_eq!(value["serialNumber"], "SN1");
    assert_eq!(value["sasOrigin"], SAS_1.to_string());
}

#[tokio::test]
async fn indexer_follows_the_registry() {
    let fixture = RegistryFixture::builder().build();
    let registry = fixture.registry.clone();
    let receiver = registry.subscribe();

    let indexer_task = tokio::spawn(async move {
        let mut indexer = EventIndexer::new();
        indexer.run(receiver).await;
        indexer
    });

    registry
        .register(SAS_1, sample_registration(FCC_ID, USER_ID, "SN1"))
        .unwrap();
    registry
        .register(SAS_2, sample_registration(FCC_ID, USER_ID, "SN2"))
        .unwrap();
    let receipt = registry
        .grant_spectrum(SAS_2, &sample_grant(FCC_ID, "SN1"))
        .unwrap();
    registry
        .relinquish(SAS_1, FCC_ID, "SN1", &receipt.grant_id)
        .unwrap();
    registry.deregister(SAS_2, FCC_ID, "SN2").unwrap();
    let last_sequence = registry.stats().last_sequence;

    // Closing every sender ends the indexer loop after the buffered events.
    drop(registry);
    drop(fixture);
    let indexer = indexer_task.await.unwrap();

    assert_eq!(indexer.last_applied_sequence(), last_sequence);
    assert_eq!(indexer.registered_count(), 1);

    let sn1 = indexer.device(FCC_ID, "SN1").unwrap();
    assert_eq!(sn1.sas_origin, SAS_1);
    assert_eq!(sn1.grants.len(), 1);
    assert!(sn1.grants[0].terminated);
    assert_eq!(sn1.grants[0].sas_origin, SAS_2);
    assert_eq!(sn1.grants[0].terminated_by, Some(SAS_1));

    let sn2 = indexer.device(FCC_ID, "SN2").unwrap();
    assert_eq!(sn2.status, IndexedStatus::Deregistered);
}

#[tokio::test]
async fn lagging_indexer_keeps_going() {
    let fixture = RegistryFixture::builder().broadcast_capacity(2).build();
    let registry = fixture.registry.clone();
    let receiver = registry.subscribe();

    for n in 0..6 {
        registry
            .register(SAS_1, sample_registration(FCC_ID, USER_ID, &format!("SN{n}")))
            .unwrap();
    }
    let last_sequence = registry.stats().last_sequence;
    drop(registry);
    drop(fixture);

    let mut indexer = EventIndexer::new();
    indexer.run(receiver).await;

    // Only the newest two survive the lag.
    assert_eq!(indexer.last_applied_sequence(), last_sequence);
    assert_eq!(indexer.registered_count(), 2);
    assert!(indexer.device(FCC_ID, "SN5").is_some());
    assert!(indexer.device(FCC_ID, "SN0").is_none());
}
