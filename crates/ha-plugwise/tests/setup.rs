//! Config entry setup for the Plugwise integration

mod common;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use common::RecordingSmile;
use ha_config_entries::ConfigEntryState;
use ha_core::{HomeAssistantError, NumberPlatform};
use ha_plugwise::{
    async_setup_integration, FixtureSmile, PlugwiseDataUpdateCoordinator, SetupError, SmileType,
};
use serde_json::json;

const HEATER_ENTITY: &str = "number.opentherm_maximum_boiler_temperature_setpoint";

#[tokio::test]
async fn test_setup_from_fixture() {
    let smile = FixtureSmile::from_file(
        SmileType::Thermostat,
        common::fixture_path("anna_heatpump.json"),
    )
    .await
    .unwrap();
    let platform = Arc::new(NumberPlatform::new("plugwise"));
    let mut entry = common::mock_config_entry();

    let coordinator = async_setup_integration(&mut entry, Arc::new(smile), &platform)
        .await
        .unwrap();

    assert_eq!(entry.state, ConfigEntryState::Loaded);
    assert_eq!(coordinator.update_interval(), Some(Duration::from_secs(60)));
    assert_eq!(platform.entity_ids(), vec![HEATER_ENTITY.to_string()]);

    let state = platform.state(HEATER_ENTITY).unwrap();
    assert_eq!(state.state, "60");
    assert_eq!(state.attribute::<f64>("min"), Some(0.0));
    assert_eq!(state.attribute::<f64>("max"), Some(100.0));
    assert_eq!(state.attribute::<String>("mode").as_deref(), Some("box"));

    coordinator.shutdown();
}

#[tokio::test]
async fn test_write_through_fixture_smile() {
    let fixture = common::load_json_fixture("anna_heatpump.json");
    let smile = FixtureSmile::from_value(SmileType::Thermostat, fixture).unwrap();
    let platform = Arc::new(NumberPlatform::new("plugwise"));
    let mut entry = common::mock_config_entry().with_pref_disable_polling(true);

    async_setup_integration(&mut entry, Arc::new(smile), &platform)
        .await
        .unwrap();
    platform.async_set_value(HEATER_ENTITY, 65.0).await.unwrap();

    // The refresh after the write already brought in the new value
    assert_eq!(platform.state(HEATER_ENTITY).unwrap().state, "65");
}

#[tokio::test]
async fn test_nan_setpoint_rejected() {
    let fixture = common::load_json_fixture("anna_heatpump.json");
    let smile = FixtureSmile::from_value(SmileType::Thermostat, fixture).unwrap();
    let platform = Arc::new(NumberPlatform::new("plugwise"));
    let mut entry = common::mock_config_entry().with_pref_disable_polling(true);

    async_setup_integration(&mut entry, Arc::new(smile), &platform)
        .await
        .unwrap();
    let err = platform
        .async_set_value(HEATER_ENTITY, f64::NAN)
        .await
        .unwrap_err();

    assert!(matches!(err, HomeAssistantError::ValueOutOfRange { .. }));
    assert_eq!(platform.state(HEATER_ENTITY).unwrap().state, "60");
}

#[tokio::test]
async fn test_setup_not_ready() {
    let smile = Arc::new(RecordingSmile::new(json!({
        "gateway": {"gateway_id": "gw"},
        "devices": {}
    })));
    smile.fail_updates(true);
    let platform = Arc::new(NumberPlatform::new("plugwise"));
    let mut entry = common::mock_config_entry();

    let err = async_setup_integration(&mut entry, smile, &platform)
        .await
        .err()
        .unwrap();

    assert!(matches!(err, SetupError::NotReady(_)));
    assert_eq!(entry.state, ConfigEntryState::SetupRetry);
    assert_eq!(
        entry.reason.as_deref(),
        Some("Failed to connect to the Plugwise Smile")
    );
    assert!(platform.is_empty());
}

#[tokio::test]
async fn test_setup_invalid_config() {
    let smile = Arc::new(RecordingSmile::new(json!({
        "gateway": {"gateway_id": "gw"},
        "devices": {}
    })));
    let platform = Arc::new(NumberPlatform::new("plugwise"));
    let mut entry = common::mock_config_entry().with_data(HashMap::new());

    let err = async_setup_integration(&mut entry, smile.clone(), &platform)
        .await
        .err()
        .unwrap();

    assert!(matches!(err, SetupError::InvalidConfig(_)));
    assert_eq!(entry.state, ConfigEntryState::SetupError);
    assert_eq!(smile.update_count(), 0);
}

#[tokio::test]
async fn test_scan_interval_option() {
    let smile = Arc::new(RecordingSmile::new(json!({
        "gateway": {"gateway_id": "gw"},
        "devices": {}
    })));
    let platform = Arc::new(NumberPlatform::new("plugwise"));
    let mut entry = common::mock_config_entry()
        .with_options(HashMap::from([("scan_interval".to_string(), json!(15))]));

    let coordinator: Arc<PlugwiseDataUpdateCoordinator> =
        async_setup_integration(&mut entry, smile, &platform)
            .await
            .unwrap();

    assert_eq!(coordinator.update_interval(), Some(Duration::from_secs(15)));
    coordinator.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_polling_picks_up_changes() {
    let smile = Arc::new(RecordingSmile::new(json!({
        "gateway": {"gateway_id": "gw"},
        "devices": {"dev1": {"name": "Boiler", "maximum_boiler_temperature": 60.0}}
    })));
    let platform = Arc::new(NumberPlatform::new("plugwise"));
    let mut entry = common::mock_config_entry();

    let coordinator = async_setup_integration(&mut entry, smile.clone(), &platform)
        .await
        .unwrap();
    let mut changes = coordinator.subscribe();
    changes.borrow_and_update();

    smile.replace(json!({
        "gateway": {"gateway_id": "gw"},
        "devices": {"dev1": {"name": "Boiler", "maximum_boiler_temperature": 55.0}}
    }));
    tokio::time::advance(Duration::from_secs(61)).await;
    changes.changed().await.unwrap();

    let entity_id = "number.boiler_maximum_boiler_temperature_setpoint";
    assert_eq!(platform.state(entity_id).unwrap().state, "55");
    assert_eq!(smile.update_count(), 2);
    coordinator.shutdown();
}
