//! Device and Grant Lifecycle Tests
//!
//! End-to-end flows through `SharedRegistry`: registration, grants,
//! relinquishment, deregistration, reset and the authorization gates.

use assert_matches::assert_matches;
use sas_core::{GrantId, RegistryEvent, SasError};
use sas_registry::SharedRegistry;
use sas_testkit::*;

fn stats_snapshot(registry: &SharedRegistry) -> (u64, u64, u64) {
    let stats = registry.stats();
    (stats.total_cbsds, stats.total_grants, stats.last_sequence)
}

// ============================================================================
// End-to-end scenario
// ============================================================================

#[test]
fn full_device_lifecycle() {
    let fixture = RegistryFixture::builder().build();
    let registry = &fixture.registry;

    let record = registry
        .register(SAS_1, sample_registration(FCC_ID, USER_ID, "SN1"))
        .unwrap();
    assert_eq!(
        record.event,
        RegistryEvent::CbsdRegistered {
            fcc_id: FCC_ID.to_string(),
            serial_number: "SN1".to_string(),
            sas_origin: SAS_1,
        }
    );
    assert_eq!(registry.total_cbsds(), 1);

    let receipt = registry
        .grant_spectrum(SAS_1, &sample_grant(FCC_ID, "SN1"))
        .unwrap();
    assert_eq!(registry.total_grants(), 1);
    let grants = registry.grants(FCC_ID, "SN1");
    assert_eq!(grants.len(), 1);
    assert!(!grants[0].terminated);
    assert_eq!(grants[0].max_eirp, 30);
    assert_eq!(grants[0].low_frequency, 3_550_000_000);
    assert_eq!(grants[0].high_frequency, 3_700_000_000);
    assert_eq!(grants[0].grant_id, receipt.grant_id);

    registry
        .relinquish(SAS_1, FCC_ID, "SN1", &receipt.grant_id)
        .unwrap();
    assert!(registry.grants(FCC_ID, "SN1")[0].terminated);
    assert_eq!(registry.total_grants(), 0);

    registry.deregister(SAS_1, FCC_ID, "SN1").unwrap();
    assert_eq!(registry.total_cbsds(), 0);
    assert!(registry.cbsd_info(FCC_ID, "SN1").is_empty());
    assert!(registry.find_cbsd(FCC_ID, "SN1").is_none());
}

#[test]
fn timestamps_come_from_the_clock() {
    let fixture = RegistryFixture::builder().start_time(1_000).build();
    let registry = &fixture.registry;

    registry
        .register(SAS_1, sample_registration(FCC_ID, USER_ID, "SN1"))
        .unwrap();
    fixture.clock.advance(60);
    let receipt = registry
        .grant_spectrum(SAS_2, &sample_grant(FCC_ID, "SN1"))
        .unwrap();

    let record = registry.cbsd_info(FCC_ID, "SN1");
    assert_eq!(record.registration_timestamp, 1_000);
    assert_eq!(record.sas_origin, SAS_1);

    let grant = &registry.grants(FCC_ID, "SN1")[0];
    assert_eq!(grant.grant_timestamp, 1_060);
    assert_eq!(grant.sas_origin, SAS_2);
    assert_eq!(receipt.record.timestamp, 1_060);
}

// ============================================================================
// Grants
// ============================================================================

#[test]
fn grant_on_missing_device_fails() {
    let fixture = RegistryFixture::builder().build();
    let registry = &fixture.registry;
    let before = stats_snapshot(registry);

    let err = registry
        .grant_spectrum(SAS_1, &sample_grant(FCC_ID, "NOPE"))
        .unwrap_err();
    assert_eq!(err.reason(), "CBSDNotRegistered");
    assert_eq!(stats_snapshot(registry), before);
}

#[test]
fn grant_ids_follow_device_ordinals() {
    let fixture = RegistryFixture::builder().build();
    let registry = &fixture.registry;
    registry
        .register(SAS_1, sample_registration(FCC_ID, USER_ID, "SN1"))
        .unwrap();
    registry
        .register(SAS_1, sample_registration(FCC_ID, USER_ID, "SN2"))
        .unwrap();

    let ids: Vec<GrantId> = ["SN1", "SN1", "SN2", "SN1"]
        .into_iter()
        .map(|serial| {
            registry
                .grant_spectrum(SAS_1, &sample_grant(FCC_ID, serial))
                .unwrap()
                .grant_id
        })
        .collect();

    assert_eq!(ids[0].as_str(), "grant_F1SN10");
    assert_eq!(ids[1].as_str(), "grant_F1SN11");
    assert_eq!(ids[2].as_str(), "grant_F1SN20");
    assert_eq!(ids[3].as_str(), "grant_F1SN12");
    assert_eq!(registry.total_grants(), 4);

    let sn1: Vec<GrantId> = registry
        .grants(FCC_ID, "SN1")
        .into_iter()
        .map(|grant| grant.grant_id)
        .collect();
    assert_eq!(sn1, vec![ids[0].clone(), ids[1].clone(), ids[3].clone()]);
}

#[test]
fn heartbeat_validates_without_mutating() {
    let fixture = RegistryFixture::builder().build();
    let registry = &fixture.registry;
    registry
        .register(SAS_1, sample_registration(FCC_ID, USER_ID, "SN1"))
        .unwrap();
    let receipt = registry
        .grant_spectrum(SAS_1, &sample_grant(FCC_ID, "SN1"))
        .unwrap();
    let before = stats_snapshot(registry);

    registry
        .heartbeat(SAS_2, FCC_ID, "SN1", &receipt.grant_id)
        .unwrap();
    assert_matches!(
        registry.heartbeat(SAS_2, FCC_ID, "SN2", &receipt.grant_id),
        Err(SasError::CbsdNotRegistered { .. })
    );
    assert_matches!(
        registry.heartbeat(SAS_2, FCC_ID, "SN1", &GrantId::derive(FCC_ID, "SN1", 5)),
        Err(SasError::GrantNotFound { .. })
    );
    assert_matches!(
        registry.heartbeat(OUTSIDER, FCC_ID, "SN1", &receipt.grant_id),
        Err(SasError::NotAnAuthorizedSas { .. })
    );
    assert_eq!(stats_snapshot(registry), before);
}

#[test]
fn relinquish_twice_is_idempotent() {
    let fixture = RegistryFixture::builder().build();
    let registry = &fixture.registry;
    registry
        .register(SAS_1, sample_registration(FCC_ID, USER_ID, "SN1"))
        .unwrap();
    registry
        .grant_spectrum(SAS_1, &sample_grant(FCC_ID, "SN1"))
        .unwrap();
    let second = registry
        .grant_spectrum(SAS_1, &sample_grant(FCC_ID, "SN1"))
        .unwrap();

    let first_call = registry
        .relinquish(SAS_1, FCC_ID, "SN1", &second.grant_id)
        .unwrap();
    let second_call = registry
        .relinquish(SAS_2, FCC_ID, "SN1", &second.grant_id)
        .unwrap();

    assert_eq!(registry.total_grants(), 1);
    assert!(registry.grants(FCC_ID, "SN1")[1].terminated);
    assert!(!registry.grants(FCC_ID, "SN1")[0].terminated);
    assert_eq!(first_call.event.name(), "GrantTerminated");
    assert_eq!(second_call.event.name(), "GrantTerminated");
    assert!(second_call.sequence > first_call.sequence);
}

#[test]
fn relinquish_checks_device_before_grant() {
    let fixture = RegistryFixture::builder().build();
    let registry = &fixture.registry;
    let grant_id = GrantId::derive(FCC_ID, "SN1", 0);

    assert_matches!(
        registry.relinquish(SAS_1, FCC_ID, "SN1", &grant_id),
        Err(SasError::CbsdNotRegistered { .. })
    );

    registry
        .register(SAS_1, sample_registration(FCC_ID, USER_ID, "SN1"))
        .unwrap();
    assert_matches!(
        registry.relinquish(SAS_1, FCC_ID, "SN1", &grant_id),
        Err(SasError::GrantNotFound { .. })
    );
}

// ============================================================================
// Deregistration and reset
// ============================================================================

#[test]
fn deregistration_drops_grants_and_frees_key() {
    let fixture = RegistryFixture::builder().build();
    let registry = &fixture.registry;
    registry
        .register(SAS_1, sample_registration(FCC_ID, USER_ID, "SN1"))
        .unwrap();
    let first = registry
        .grant_spectrum(SAS_1, &sample_grant(FCC_ID, "SN1"))
        .unwrap();
    registry
        .grant_spectrum(SAS_1, &sample_grant(FCC_ID, "SN1"))
        .unwrap();
    registry
        .relinquish(SAS_1, FCC_ID, "SN1", &first.grant_id)
        .unwrap();
    assert_eq!(registry.total_grants(), 1);

    let record = registry.deregister(SAS_2, FCC_ID, "SN1").unwrap();
    assert_matches!(
        record.event,
        RegistryEvent::CbsdDeregistered { grants_removed: 2, .. }
    );
    assert_eq!((registry.total_cbsds(), registry.total_grants()), (0, 0));
    assert!(registry.grants(FCC_ID, "SN1").is_empty());

    registry
        .register(SAS_2, sample_registration(FCC_ID, USER_ID, "SN1"))
        .unwrap();
    assert_eq!(registry.cbsd_info(FCC_ID, "SN1").sas_origin, SAS_2);
    assert!(registry.grants(FCC_ID, "SN1").is_empty());
    let again = registry
        .grant_spectrum(SAS_2, &sample_grant(FCC_ID, "SN1"))
        .unwrap();
    assert_eq!(again.grant_id, GrantId::derive(FCC_ID, "SN1", 2));
}

#[test]
fn stale_grant_id_cannot_touch_a_reregistered_device() {
    let fixture = RegistryFixture::builder().build();
    let registry = &fixture.registry;
    registry
        .register(SAS_1, sample_registration(FCC_ID, USER_ID, "SN1"))
        .unwrap();
    let old = registry
        .grant_spectrum(SAS_1, &sample_grant(FCC_ID, "SN1"))
        .unwrap();
    registry.deregister(SAS_1, FCC_ID, "SN1").unwrap();

    registry
        .register(SAS_2, sample_registration(FCC_ID, USER_ID, "SN1"))
        .unwrap();
    let new = registry
        .grant_spectrum(SAS_2, &sample_grant(FCC_ID, "SN1"))
        .unwrap();
    assert_ne!(old.grant_id, new.grant_id);

    assert_matches!(
        registry.relinquish(SAS_1, FCC_ID, "SN1", &old.grant_id),
        Err(SasError::GrantNotFound { .. })
    );
    assert_matches!(
        registry.heartbeat(SAS_1, FCC_ID, "SN1", &old.grant_id),
        Err(SasError::GrantNotFound { .. })
    );
    assert!(!registry.grants(FCC_ID, "SN1")[0].terminated);
    assert_eq!(registry.total_grants(), 1);
}

#[test]
fn deregistering_missing_device_fails() {
    let fixture = RegistryFixture::builder().build();
    assert_matches!(
        fixture.registry.deregister(SAS_1, FCC_ID, "SN1"),
        Err(SasError::CbsdNotRegistered { .. })
    );
}

#[test]
fn reset_clears_devices_but_keeps_lists() {
    let fixture = RegistryFixture::builder().blacklist_fcc_id("F9").build();
    let registry = &fixture.registry;
    for serial in ["SN1", "SN2", "SN3"] {
        registry
            .register(SAS_1, sample_registration(FCC_ID, USER_ID, serial))
            .unwrap();
        registry
            .grant_spectrum(SAS_1, &sample_grant(FCC_ID, serial))
            .unwrap();
    }

    assert_matches!(registry.reset(SAS_1), Err(SasError::NotAuthorized { .. }));
    assert_eq!(registry.total_cbsds(), 3);

    let record = registry.reset(OWNER).unwrap();
    assert_eq!(record.event, RegistryEvent::RegistryReset { by: OWNER });

    let stats = registry.stats();
    assert_eq!((stats.total_cbsds, stats.total_grants), (0, 0));
    assert_eq!(stats.fcc_allow_list, 1);
    assert_eq!(stats.user_allow_list, 1);
    assert_eq!(stats.blacklisted_fcc_ids, 1);
    assert!(registry.is_authorized_sas(&SAS_1));
    assert!(registry.grants(FCC_ID, "SN1").is_empty());

    // Grant ids keep counting after a reset.
    registry
        .register(SAS_1, sample_registration(FCC_ID, USER_ID, "SN1"))
        .unwrap();
    let after_reset = registry
        .grant_spectrum(SAS_1, &sample_grant(FCC_ID, "SN1"))
        .unwrap();
    assert_eq!(after_reset.grant_id, GrantId::derive(FCC_ID, "SN1", 1));
}

// ============================================================================
// Authorization gates
// ============================================================================

#[test]
fn outsider_cannot_use_sas_operations() {
    let fixture = RegistryFixture::builder().build();
    let registry = &fixture.registry;
    registry
        .register(SAS_1, sample_registration(FCC_ID, USER_ID, "SN1"))
        .unwrap();
    let receipt = registry
        .grant_spectrum(SAS_1, &sample_grant(FCC_ID, "SN1"))
        .unwrap();
    let before = stats_snapshot(registry);

    let results = [
        registry
            .register(OUTSIDER, sample_registration(FCC_ID, USER_ID, "SN2"))
            .map(|_| ()),
        registry.deregister(OUTSIDER, FCC_ID, "SN1").map(|_| ()),
        registry
            .grant_spectrum(OUTSIDER, &sample_grant(FCC_ID, "SN1"))
            .map(|_| ()),
        registry.heartbeat(OUTSIDER, FCC_ID, "SN1", &receipt.grant_id),
        registry
            .relinquish(OUTSIDER, FCC_ID, "SN1", &receipt.grant_id)
            .map(|_| ()),
    ];
    for result in results {
        assert_eq!(result.unwrap_err().reason(), "NotAnAuthorizedSAS");
    }
    assert_eq!(stats_snapshot(registry), before);
    assert!(!registry.grants(FCC_ID, "SN1")[0].terminated);
}

#[test]
fn owner_operations_reject_sas_callers() {
    let fixture = RegistryFixture::builder().build();
    let registry = &fixture.registry;
    let before = registry.stats();

    let results = [
        registry.authorize_sas(SAS_1, OUTSIDER),
        registry.revoke_sas(SAS_1, SAS_2),
        registry.inject_fcc_id(SAS_1, "F2", 10),
        registry.inject_user_id(SAS_1, "U2"),
        registry.blacklist_fcc_id(SAS_1, FCC_ID),
        registry.blacklist_device(SAS_1, FCC_ID, "SN1"),
        registry.reset(SAS_1),
    ];
    for result in results {
        assert_eq!(result.unwrap_err().reason(), "NotAuthorized");
    }
    assert_eq!(registry.stats(), before);
}

#[test]
fn revocation_is_not_retroactive() {
    let fixture = RegistryFixture::builder().build();
    let registry = &fixture.registry;
    registry
        .register(SAS_1, sample_registration(FCC_ID, USER_ID, "SN1"))
        .unwrap();
    registry.revoke_sas(OWNER, SAS_1).unwrap();

    assert!(!registry.is_authorized_sas(&SAS_1));
    assert!(registry.is_cbsd_registered(FCC_ID, "SN1"));
    assert_eq!(registry.cbsd_info(FCC_ID, "SN1").sas_origin, SAS_1);
    assert_matches!(
        registry.grant_spectrum(SAS_1, &sample_grant(FCC_ID, "SN1")),
        Err(SasError::NotAnAuthorizedSas { .. })
    );
    registry
        .grant_spectrum(SAS_2, &sample_grant(FCC_ID, "SN1"))
        .unwrap();
}

#[test]
fn owner_keeps_admin_rights_after_losing_sas_flag() {
    let fixture = RegistryFixture::builder().build();
    let registry = &fixture.registry;
    assert!(registry.is_authorized_sas(&OWNER));

    registry.revoke_sas(OWNER, OWNER).unwrap();
    assert!(!registry.is_authorized_sas(&OWNER));
    assert_matches!(
        registry.register(OWNER, sample_registration(FCC_ID, USER_ID, "SN1")),
        Err(SasError::NotAnAuthorizedSas { .. })
    );
    registry.inject_user_id(OWNER, "U2").unwrap();
    assert_eq!(registry.owner(), OWNER);
}

// ============================================================================
// Identity lists
// ============================================================================

#[test]
fn registration_rejections_name_the_failed_check() {
    let fixture = RegistryFixture::builder()
        .fcc_id("F2", 20)
        .blacklist_fcc_id("F2")
        .blacklist_device(FCC_ID, "STOLEN")
        .build();
    let registry = &fixture.registry;

    let cases = [
        (sample_registration("F3", USER_ID, "SN1"), "FCCIdNotAuthorized"),
        (sample_registration(FCC_ID, "U9", "SN1"), "UserIdNotAuthorized"),
        (sample_registration("F2", USER_ID, "SN1"), "FCCIdBlacklisted"),
        (sample_registration(FCC_ID, USER_ID, "STOLEN"), "SerialNumberBlacklisted"),
    ];
    for (request, reason) in cases {
        assert_eq!(registry.register(SAS_1, request).unwrap_err().reason(), reason);
    }
    assert_eq!(registry.total_cbsds(), 0);
    assert_eq!(registry.max_eirp_for("F2"), Some(20));
    assert_eq!(registry.max_eirp_for("F3"), None);

    registry
        .register(SAS_1, sample_registration(FCC_ID, USER_ID, "SN1"))
        .unwrap();
}

#[test]
fn blacklisting_does_not_evict_registered_devices() {
    let fixture = RegistryFixture::builder().build();
    let registry = &fixture.registry;
    registry
        .register(SAS_1, sample_registration(FCC_ID, USER_ID, "SN1"))
        .unwrap();

    registry.blacklist_device(OWNER, FCC_ID, "SN1").unwrap();
    assert!(registry.is_cbsd_registered(FCC_ID, "SN1"));

    registry.deregister(SAS_1, FCC_ID, "SN1").unwrap();
    assert_matches!(
        registry.register(SAS_1, sample_registration(FCC_ID, USER_ID, "SN1")),
        Err(SasError::SerialNumberBlacklisted { .. })
    );
}

#[test]
fn schema_enforcement_rejects_malformed_requests() {
    let fixture = RegistryFixture::builder()
        .enforce_request_schema()
        .fcc_id("FCC1", 47)
        .user_id("USER1")
        .build();
    let registry = &fixture.registry;

    let mut request = sample_registration("FCC1", "USER1", "SN1");
    request.antenna_beamwidth = 0;
    assert_matches!(
        registry.register(SAS_1, request),
        Err(SasError::InvalidRequest { ref field, .. }) if field == "antennaBeamwidth"
    );

    registry
        .register(SAS_1, sample_registration("FCC1", "USER1", "SN1"))
        .unwrap();

    let mut grant = sample_grant("FCC1", "SN1");
    grant.low_frequency = 3_700_000_000;
    assert_matches!(
        registry.grant_spectrum(SAS_1, &grant),
        Err(SasError::InvalidRequest { ref field, .. }) if field == "highFrequency"
    );
    assert_eq!(registry.total_grants(), 0);
}

#[test]
fn schema_enforcement_stores_lowercase_address() {
    let fixture = RegistryFixture::builder()
        .enforce_request_schema()
        .fcc_id("FCC1", 47)
        .user_id("USER1")
        .build();
    let registry = &fixture.registry;

    let mut request = sample_registration("FCC1", "USER1", "SN1");
    request.cbsd_address = format!("0x{}", "AB".repeat(20));
    registry.register(SAS_1, request).unwrap();

    assert_eq!(
        registry.cbsd_info("FCC1", "SN1").cbsd_address,
        format!("0x{}", "ab".repeat(20))
    );
}
