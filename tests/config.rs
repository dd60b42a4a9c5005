use boothsim::arrivals::FirstArrival;
use boothsim::booth::SchedulerVariant;
use boothsim::config::{ArrivalModel, BoothConfig, SeedPlan};
use boothsim::ConfigError;

#[test]
fn empty_document_is_the_cinema_default() {
    let config = BoothConfig::from_json_str("{}").unwrap();
    assert_eq!(BoothConfig::default(), config);
    assert_eq!(SchedulerVariant::ThreeEvent, config.scheduler);
    assert_eq!(Some(250), config.show_capacity);
}

#[test]
fn json_round_trips() {
    let config = BoothConfig {
        first_arrival: FirstArrival::AtOpening,
        scheduler: SchedulerVariant::TwoEvent,
        show_capacity: None,
        seeds: SeedPlan::Explicit { seeds: vec![3, 5, 8] },
        ..BoothConfig::default()
    };
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(config, BoothConfig::from_json_str(&json).unwrap());
}

#[test]
fn partial_document_overrides_only_what_it_names() {
    let config = BoothConfig::from_json_str(
        r#"{
            "arrivals": {"model": "renewal", "mean_interarrival": 4.5},
            "first_arrival": "at_opening",
            "scheduler": "two_event",
            "seeds": {"rule": "explicit", "seeds": [11, 12]},
            "parallel": false
        }"#,
    )
    .unwrap();

    assert_eq!(ArrivalModel::Renewal { mean_interarrival: 4.5 }, config.arrivals);
    assert_eq!(FirstArrival::AtOpening, config.first_arrival);
    assert_eq!(vec![11, 12], config.seeds.seeds());
    assert!(!config.parallel);
    assert_eq!(510.0, config.horizon_minutes);
}

#[test]
fn malformed_inputs_are_rejected() {
    let cases = [
        r#"{"tickets": [{"count": 1, "probability": 0.5}, {"count": 2, "probability": 0.4}]}"#,
        r#"{"tickets": [{"count": 0, "probability": 1.0}]}"#,
        r#"{"payments": []}"#,
        r#"{"payments": [{"method": "cash", "probability": 1.0, "min_minutes": 5.0, "max_minutes": 2.0}]}"#,
        r#"{"arrivals": {"model": "renewal", "mean_interarrival": 0.0}}"#,
        r#"{"arrivals": {"model": "renewal", "mean_interarrival": 0.0001}, "horizon_minutes": 30.0}"#,
        r#"{"arrivals": {"model": "hourly_poisson", "rates": [{"start_hour": 10, "end_hour": 12, "rate": 5.0},
            {"start_hour": 11, "end_hour": 14, "rate": 5.0}]}}"#,
        r#"{"arrivals": {"model": "hourly_poisson", "rates": []}}"#,
        r#"{"horizon_minutes": -1.0}"#,
        r#"{"closing_cutoff": -5.0}"#,
        r#"{"opening_hour": 24, "arrivals": {"model": "hourly_poisson"}}"#,
        r#"{"generator": {"multiplier": 0, "increment": 3, "modulus": 1289}}"#,
        r#"{"days_per_replication": 0}"#,
        r#"{"seeds": {"rule": "explicit", "seeds": []}}"#,
        r#"{"seeds": {"rule": "explicit", "seeds": [4, 4]}}"#,
        r#"{"seeds": {"rule": "consecutive", "first": 0, "count": 1290}}"#,
    ];

    for json in cases {
        let result = BoothConfig::from_json_str(json);
        assert!(result.is_err(), "accepted {json}");
        assert!(!matches!(result, Err(ConfigError::Parse(_))), "{json} should parse before it is rejected");
    }
}

#[test]
fn syntax_errors_are_parse_errors() {
    assert!(matches!(BoothConfig::from_json_str("{"), Err(ConfigError::Parse(_))));
    assert!(matches!(
        BoothConfig::from_json_str(r#"{"arrivals": {"model": "gamma"}}"#),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn missing_files_are_io_errors() {
    assert!(matches!(
        BoothConfig::from_path("no/such/booth.json"),
        Err(ConfigError::Io(_))
    ));
}
