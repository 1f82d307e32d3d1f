// tests/snapshot_tests.rs
// FrameInspector over JSON frame snapshots, plus the CLI entry points

use frame_inspector::cli;
use frame_inspector::config::ScopeSelection;
use frame_inspector::debugger::{
    FrameInspector, Scope, SnapshotError, SnapshotFrame, SnapshotValue, SnapshotVariable,
    VariableDescriptor,
};
use std::fs;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn names(variables: &[VariableDescriptor<SnapshotValue>]) -> Vec<String> {
    variables.iter().map(|v| v.name().to_string()).collect()
}

#[cfg(test)]
mod snapshot_frame_tests {
    use super::*;

    #[test]
    fn test_method_frame_scopes() {
        let frame = SnapshotFrame::load(fixture("counter_tick.json")).expect("fixture loads");
        let inspector = FrameInspector::new(&frame);

        assert_eq!(frame.function(), "Counter::tick");
        assert_eq!(
            names(&inspector.all_local_variables().unwrap()),
            vec!["step", "this", "count", "count"]
        );
        assert_eq!(
            names(&inspector.all_non_local_variables().unwrap()),
            vec!["count", "history"]
        );
        assert_eq!(
            names(&inspector.all_variables().unwrap()),
            vec!["step", "this", "count", "count", "count", "history"]
        );
    }

    #[test]
    fn test_shadowed_local_and_member_resolve_by_scope() {
        let frame = SnapshotFrame::load(fixture("counter_tick.json")).unwrap();
        let inspector = FrameInspector::new(&frame);

        let local = inspector.get_variable("count", Scope::Local).unwrap().unwrap();
        let member = inspector.get_variable("count", Scope::Member).unwrap().unwrap();

        // first of the two `count` locals
        assert_eq!(local.value().value, "7");
        assert_eq!(member.value().value, "41");
    }

    #[test]
    fn test_nested_members_through_path() {
        let frame = SnapshotFrame::load(fixture("counter_tick.json")).unwrap();
        let inspector = FrameInspector::new(&frame);

        let history = inspector.resolve_path("this.history").unwrap().unwrap();
        assert!(history.value().is_aggregate());
        assert_eq!(names(&inspector.members_of(&history).unwrap()), vec!["[0]", "[1]"]);

        let second = inspector.resolve_path("this.history.[1]").unwrap().unwrap();
        assert_eq!(second.value().to_string(), "int = 40");
    }

    #[test]
    fn test_static_frame_has_empty_member_scope() {
        let frame = SnapshotFrame::load(fixture("static_main.json")).unwrap();
        let inspector = FrameInspector::new(&frame);

        assert!(inspector.all_non_local_variables().unwrap().is_empty());
        assert_eq!(inspector.get_variable("this", Scope::Member).unwrap(), None);
        assert_eq!(
            inspector.try_get_variable("argc", Scope::Member).unwrap(),
            (false, None)
        );
    }

    #[test]
    fn test_resumed_snapshot_fails_every_query() {
        let mut frame = SnapshotFrame::load(fixture("counter_tick.json")).unwrap();
        frame.resume();
        assert!(frame.is_resumed());

        let inspector = FrameInspector::new(&frame);
        assert!(matches!(inspector.all_variables(), Err(SnapshotError::FrameResumed(_))));
        assert!(matches!(
            inspector.get_variable("step", Scope::Local),
            Err(SnapshotError::FrameResumed(_))
        ));
        assert!(matches!(
            inspector.all_non_local_variables(),
            Err(SnapshotError::FrameResumed(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = SnapshotFrame::load(fixture("does_not_exist.json")).unwrap_err();
        assert!(matches!(err, SnapshotError::Io(_)));
    }
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    #[test]
    fn test_inspect_text_output() {
        let mut out = Vec::new();
        cli::inspect(&fixture("counter_tick.json"), ScopeSelection::Members, false, &mut out)
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "count: int = 41\nhistory: std::vector<int> = {size=2} {...}\n"
        );
    }

    #[test]
    fn test_inspect_json_round_trips_through_snapshot_model() {
        let mut out = Vec::new();
        cli::inspect(&fixture("counter_tick.json"), ScopeSelection::Locals, true, &mut out)
            .unwrap();

        let records: Vec<SnapshotVariable> = serde_json::from_slice(&out).unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[1].name, "this");
        assert_eq!(records[1].members.len(), 2);
    }

    #[test]
    fn test_lookup_reports_presence() {
        let mut out = Vec::new();
        assert!(cli::lookup(&fixture("counter_tick.json"), "count", true, &mut out).unwrap());
        assert_eq!(String::from_utf8(out).unwrap(), "count: int = 41\n");

        let mut out: Vec<u8> = Vec::new();
        assert!(!cli::lookup(&fixture("static_main.json"), "argc", true, &mut out).unwrap());
        assert!(out.is_empty());
    }

    #[test]
    fn test_malformed_snapshot_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ \"locals\": [ { \"type\": \"int\" } ] }").unwrap();

        let mut out: Vec<u8> = Vec::new();
        let err = cli::inspect(&path, ScopeSelection::All, false, &mut out).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("broken.json"), "got: {}", message);
        assert!(message.contains("malformed snapshot"), "got: {}", message);
    }
}
