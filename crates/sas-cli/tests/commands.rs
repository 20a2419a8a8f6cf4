//! sasctl Command Tests
//!
//! Drives the subcommand implementations against temp config and script
//! files, the way the binary does.

use assert_matches::assert_matches;
use sas_cli::commands::{check_config, run};
use sas_cli::{ScriptOp, ScriptStep};
use sas_core::{BootstrapConfig, FccIdEntry, RegistryConfig};
use sas_testkit::*;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

const CONFIG: &str = r#"
owner = "0x0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a"
enforce_request_schema = true

[bootstrap]
authorized_sas = ["0x5151515151515151515151515151515151515151"]
user_ids = ["USER1"]
fcc_ids = [{ fcc_id = "FCC1", max_eirp = 47 }]
"#;

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

fn config() -> RegistryConfig {
    RegistryConfig::new(OWNER).with_bootstrap(BootstrapConfig {
        authorized_sas: vec![SAS_1],
        fcc_ids: vec![FccIdEntry {
            fcc_id: FCC_ID.to_string(),
            max_eirp: 47,
        }],
        user_ids: vec![USER_ID.to_string()],
        ..Default::default()
    })
}

fn step(caller: sas_core::Principal, op: ScriptOp) -> ScriptStep {
    ScriptStep { caller, op }
}

#[tokio::test]
async fn run_reports_each_step_and_summary() {
    let steps = vec![
        step(
            SAS_1,
            ScriptOp::Register {
                request: sample_registration(FCC_ID, USER_ID, "SN1"),
            },
        ),
        step(
            OUTSIDER,
            ScriptOp::GrantSpectrum {
                request: sample_grant(FCC_ID, "SN1"),
            },
        ),
        step(
            SAS_1,
            ScriptOp::GrantSpectrum {
                request: sample_grant(FCC_ID, "SN1"),
            },
        ),
        step(
            SAS_1,
            ScriptOp::Heartbeat {
                fcc_id: FCC_ID.to_string(),
                serial_number: "SN1".to_string(),
                grant_id: sas_core::GrantId::derive(FCC_ID, "SN1", 0),
            },
        ),
    ];

    let mut out = Vec::new();
    let summary = run::run_steps(config(), &steps, false, &mut out)
        .await
        .unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert!(lines[0].starts_with("ok register "));
    assert!(lines[0].contains("\"event\":\"CBSDRegistered\""));
    assert!(lines[1].starts_with("err grant_spectrum NotAnAuthorizedSAS"));
    assert!(lines[2].contains("grant_F1SN10"));
    assert_eq!(lines[3], "ok heartbeat");

    assert_eq!(summary.steps, 4);
    assert_eq!(summary.rejected, 1);
    assert_eq!(summary.stats.total_cbsds, 1);
    assert_eq!(summary.stats.total_grants, 1);
    assert_eq!(summary.indexed_registered, 1);
    assert!(text.contains("\"indexedRegistered\": 1"));
}

#[tokio::test]
async fn fail_fast_stops_at_first_rejection() {
    let steps = vec![
        step(
            SAS_1,
            ScriptOp::Deregister {
                fcc_id: FCC_ID.to_string(),
                serial_number: "SN1".to_string(),
            },
        ),
        step(
            SAS_1,
            ScriptOp::Register {
                request: sample_registration(FCC_ID, USER_ID, "SN1"),
            },
        ),
    ];

    let mut out = Vec::new();
    let err = run::run_steps(config(), &steps, true, &mut out)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("CBSDNotRegistered"));
    assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
}

#[tokio::test]
async fn run_loads_files_from_disk() {
    let dir = TempDir::new().unwrap();
    let config_path = write_file(&dir, "registry.toml", CONFIG);
    let script_path = write_file(
        &dir,
        "script.json",
        r#"[
          { "caller": "0x5151515151515151515151515151515151515151",
            "op": "register",
            "request": {
              "fccId": "FCC1", "userId": "USER1", "cbsdSerialNumber": "SN1",
              "callSign": "CALL1", "cbsdCategory": "A", "airInterface": "E_UTRA",
              "measCapability": ["EUTRA_CARRIER_RSSI"], "eirpCapability": 20,
              "latitude": 0, "longitude": 0, "height": 5, "heightType": "AGL",
              "indoorDeployment": true, "antennaGain": 3, "antennaBeamwidth": 60,
              "antennaAzimuth": 90,
              "cbsdAddress": "0x0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a" } },
          { "caller": "0x0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a", "op": "reset" }
        ]"#,
    );

    let mut out = Vec::new();
    let summary = run::run(&config_path, &script_path, true, &mut out)
        .await
        .unwrap();
    assert_eq!(summary.rejected, 0);
    assert_eq!(summary.stats.total_cbsds, 0);
    assert_eq!(summary.indexed_registered, 0);
}

#[test]
fn check_config_accepts_valid_file() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "registry.toml", CONFIG);

    let mut out = Vec::new();
    check_config::run(&path, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("is valid"));
    assert!(text.contains("1 sas, 1 fcc ids, 1 user ids"));
}

#[test]
fn check_config_rejects_zero_capacity() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "registry.toml",
        "owner = \"0x0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a\"\nevent_log_capacity = 0\n",
    );

    let mut out = Vec::new();
    let err = check_config::run(&path, &mut out).unwrap_err();
    assert!(format!("{err:#}").contains("event_log_capacity"));
    assert_matches!(out.len(), 0);
}
