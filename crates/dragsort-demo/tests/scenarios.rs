//! Demo scenarios run end to end through the CLI entry point.

use std::io::Write;

use clap::Parser;
use dragsort_demo::cli::{Cli, execute};
use dragsort_demo::report::Report;
use dragsort_demo::DemoError;
use pretty_assertions::assert_eq;

fn run(args: &[&str]) -> Result<Report, DemoError> {
    let argv = std::iter::once("dragsort-demo").chain(args.iter().copied());
    execute(&Cli::try_parse_from(argv).unwrap())
}

fn scenario(args: &[&str]) -> dragsort_demo::report::ScenarioReport {
    match run(args).unwrap() {
        Report::Scenario(report) => report,
        Report::Frames(_) => panic!("expected a scenario report"),
    }
}

#[test]
fn values_drag_then_keyboard_nudge() {
    let report = scenario(&["values"]);
    assert_eq!(
        report.before,
        vec!["integrity", "customers", "ownership", "curiosity", "craft"]
    );
    assert_eq!(report.steps.len(), 2);
    assert_eq!(
        report.steps[0].optimistic,
        vec!["ownership", "integrity", "customers", "curiosity", "craft"]
    );
    assert!(report.steps.iter().all(|step| step.committed));
    assert_eq!(
        report.final_order,
        vec!["ownership", "integrity", "customers", "craft", "curiosity"]
    );
    assert_eq!(report.persist_calls, 2);
    assert_eq!(report.reload_calls, 0);
    assert_eq!(report.stored[0].title, "Own the outcome");
    assert_eq!(report.stored[0].position, 0);
    assert!(!report.rolled_back());
}

#[test]
fn values_with_rejected_persist_rolls_back_first_move() {
    let report = scenario(&["values", "--fail-persist"]);
    assert!(report.rolled_back());
    assert_eq!(report.reload_calls, 1);
    assert_eq!(report.persist_calls, 2);
    assert_eq!(
        report.final_order,
        vec!["integrity", "customers", "ownership", "craft", "curiosity"]
    );
    let stored: Vec<&str> = report.stored.iter().map(|item| item.id.as_str()).collect();
    assert_eq!(stored, report.final_order);
}

#[test]
fn list_drag_down_past_two_rows() {
    let report = scenario(&["list", "--items", "4", "--drag", "1:85"]);
    assert_eq!(report.item_height, 48.0);
    assert_eq!(
        report.final_order,
        vec!["item-1", "item-3", "item-4", "item-2"]
    );
    assert_eq!(report.persist_calls, 1);
}

#[test]
fn list_drop_in_place_skips_persistence() {
    let report = scenario(&["list", "--items", "3", "--drag", "2:-10"]);
    assert!(!report.steps[0].committed);
    assert_eq!(report.persist_calls, 0);
    assert_eq!(report.final_order, report.before);
}

#[test]
fn list_rejects_slot_outside_the_list() {
    let err = run(&["list", "--items", "3", "--drag", "3:10"]).unwrap_err();
    assert!(matches!(err, DemoError::InvalidArgument(_)));
    assert_eq!(err.exit_code(), 2);

    let err = run(&["list", "--items", "0", "--drag", "0:10"]).unwrap_err();
    assert!(matches!(err, DemoError::InvalidArgument(_)));
}

#[test]
fn frames_glide_to_rest_after_release() {
    let report = match run(&["frames", "--items", "3", "--drag", "0:96", "--frames", "400"]).unwrap()
    {
        Report::Frames(report) => report,
        Report::Scenario(_) => panic!("expected a frames report"),
    };
    assert_eq!(report.drop_order, vec!["item-2", "item-3", "item-1"]);
    assert_eq!(report.frames.len(), 401);

    let held = &report.frames[0].items[0];
    assert_eq!(held.vertical_offset, 96.0);
    assert_eq!(held.stack_order, 1);

    assert!(report.settled);
    let last = report.frames.last().unwrap();
    let offsets: Vec<f64> = last.items.iter().map(|frame| frame.vertical_offset).collect();
    assert_eq!(offsets, vec![96.0, 0.0, 48.0]);
    assert!(last.items.iter().all(|frame| frame.stack_order == 0));
}

#[test]
fn config_file_changes_row_height() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(b"item_height = 40.0\n").unwrap();
    let path = file.path().to_str().unwrap().to_owned();

    let report = scenario(&["--config", &path, "list", "--items", "4", "--drag", "1:85"]);
    assert_eq!(report.item_height, 40.0);
    assert_eq!(
        report.final_order,
        vec!["item-1", "item-3", "item-4", "item-2"]
    );
}

#[test]
fn invalid_config_maps_to_config_exit_code() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    file.write_all(br#"{"item_height": 0}"#).unwrap();
    let path = file.path().to_str().unwrap().to_owned();

    let err = run(&["--config", &path, "values"]).unwrap_err();
    assert!(matches!(err, DemoError::Config(_)));
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn json_report_carries_transitions() {
    let report = run(&["list", "--items", "3", "--drag", "0:48", "--json"]).unwrap();
    let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    let effects: Vec<&str> = value["transitions"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|transition| transition["effect"]["effect"].as_str())
        .collect();
    assert_eq!(effects.first(), Some(&"drag_started"));
    assert!(effects.contains(&"committed"));
    assert_eq!(effects.last(), Some(&"persist_confirmed"));
}
