//! Configuration file loading
//!
//! Round-trips configuration through a temporary TOML file and checks
//! environment overrides applied on top of it.

use chrono::{TimeDelta, Weekday};
use kuba_sampling::Config;
use tempfile::TempDir;

#[test]
fn test_save_and_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sampling.toml");
    let path = path.to_str().unwrap();

    let mut config = Config::default();
    config.aggregation.first_day_of_week = Weekday::Sun;
    config.aggregation.start_time_of_day = "05:30".to_string();
    config.aggregation.time_zone = "America/New_York".to_string();
    config.logging.structured = true;
    config.save_to_file(path).unwrap();

    let loaded = Config::from_file(path).unwrap();
    assert!(loaded.validate().is_ok());
    assert_eq!(loaded.aggregation.first_day_of_week, Weekday::Sun);
    assert!(loaded.logging.structured);

    let prefs = loaded.aggregation.preferences().unwrap();
    assert_eq!(prefs.start_time_of_day, TimeDelta::minutes(330));
    assert_eq!(
        loaded.aggregation.time_zone().unwrap(),
        chrono_tz::America::New_York
    );
}

#[test]
fn test_env_overrides_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sampling.toml");
    std::fs::write(
        &path,
        "[aggregation]\nstart_time_of_day = \"02:00\"\ntime_zone = \"Europe/Paris\"\n",
    )
    .unwrap();

    std::env::set_var("KUBA_START_TIME_OF_DAY", "03:15");
    let config = Config::from_file_with_env(path.to_str().unwrap()).unwrap();
    std::env::remove_var("KUBA_START_TIME_OF_DAY");

    assert_eq!(config.aggregation.start_time_of_day, "03:15");
    assert_eq!(config.aggregation.time_zone, "Europe/Paris");
}

#[test]
fn test_missing_and_malformed_files() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.toml");
    assert!(Config::from_file(missing.to_str().unwrap()).is_err());

    let broken = dir.path().join("broken.toml");
    std::fs::write(&broken, "[aggregation\nfirst_day_of_week = 3").unwrap();
    assert!(Config::from_file(broken.to_str().unwrap()).is_err());
}
