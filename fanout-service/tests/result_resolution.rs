// Result resolution integration tests against run-state snapshots

use fanout_service::{
    ChildOrigin, Loader, ParamValue, PipelineRunState, ResolutionError, ResultOrigin, ResultRef,
    ResultResolver,
};

const STATE_YAML: &str = r#"
tasks:
  - name: build
    matrixed: true
    executions:
      - name: build-1
        index: 1
        status: succeeded
        results:
          - name: digest
            value: sha256:bbb
      - name: build-0
        index: 0
        status: succeeded
        results:
          - name: digest
            value: sha256:aaa
  - name: lint
    executions:
      - name: lint-run
        status: failed
        results:
          - name: report
            value: [a.rs, b.rs]
  - name: approve
    kind: customRun
    executions:
      - name: approve-run
        status: succeeded
        results:
          - name: approver
            value: alice
  - name: deploy
    executions:
      - name: deploy-run
        status: running
"#;

fn state() -> PipelineRunState {
    Loader::parse_run_state(STATE_YAML).unwrap()
}

#[test]
fn test_matrixed_result_aggregates_in_index_order() {
    let resolved = ResultResolver::resolve(&state(), &ResultRef::new("build", "digest")).unwrap();

    assert_eq!(
        resolved.value,
        ParamValue::from(vec!["sha256:aaa", "sha256:bbb"])
    );
    assert_eq!(
        resolved.origin,
        ResultOrigin::TaskRuns(vec![
            ChildOrigin::new(0, "build-0"),
            ChildOrigin::new(1, "build-1"),
        ])
    );
}

#[test]
fn test_matrixed_result_index_selects_combination() {
    let resolved =
        ResultResolver::resolve(&state(), &ResultRef::indexed("build", "digest", 1)).unwrap();
    assert_eq!(resolved.value, ParamValue::from("sha256:bbb"));
    assert_eq!(resolved.origin, ResultOrigin::TaskRun("build-1".to_string()));
}

#[test]
fn test_matrixed_index_out_of_bounds() {
    let err =
        ResultResolver::resolve(&state(), &ResultRef::indexed("build", "digest", 2)).unwrap_err();
    assert_eq!(
        err,
        ResolutionError::IndexOutOfBounds {
            task: "build".to_string(),
            result: "digest".to_string(),
            index: 2,
            size: 2,
        }
    );
    assert_eq!(err.pipeline_task(), "build");
}

#[test]
fn test_aggregate_and_indexed_paths_agree_when_a_child_lacks_the_result() {
    let state = Loader::parse_run_state(
        r#"
tasks:
  - name: build
    matrixed: true
    executions:
      - name: build-0
        index: 0
        status: succeeded
        results:
          - name: foo
            value: a
      - name: build-1
        index: 1
        status: succeeded
      - name: build-2
        index: 2
        status: succeeded
        results:
          - name: foo
            value: c
"#,
    )
    .unwrap();

    let resolved = ResultResolver::resolve_all(&state, &[ResultRef::new("build", "foo")]).unwrap();
    let strings = resolved.string_replacements();
    assert_eq!(strings["tasks.build.results.foo[0]"], "a");
    assert_eq!(strings["tasks.build.results.foo[2]"], "c");
    assert!(!strings.contains_key("tasks.build.results.foo[1]"));

    for (index, expected) in [(0, "a"), (2, "c")] {
        let r = ResultResolver::resolve(&state, &ResultRef::indexed("build", "foo", index)).unwrap();
        assert_eq!(r.value, ParamValue::from(expected));
    }
    let err =
        ResultResolver::resolve(&state, &ResultRef::indexed("build", "foo", 1)).unwrap_err();
    assert!(matches!(err, ResolutionError::ResultNotFound { .. }));
}

#[test]
fn test_failed_task_results_are_still_consumable() {
    let resolved =
        ResultResolver::resolve(&state(), &ResultRef::indexed("lint", "report", 1)).unwrap();
    assert_eq!(resolved.value, ParamValue::from("b.rs"));
}

#[test]
fn test_custom_run_origin() {
    let resolved =
        ResultResolver::resolve(&state(), &ResultRef::new("approve", "approver")).unwrap();
    assert_eq!(resolved.origin, ResultOrigin::Run("approve-run".to_string()));
}

#[test]
fn test_unfinished_and_unknown_tasks() {
    let err = ResultResolver::resolve(&state(), &ResultRef::new("deploy", "url")).unwrap_err();
    assert!(matches!(err, ResolutionError::TaskNotFinished { .. }));

    let err = ResultResolver::resolve(&state(), &ResultRef::new("ghost", "url")).unwrap_err();
    assert!(matches!(err, ResolutionError::UnknownTask { .. }));
}

#[test]
fn test_resolve_all_dedups_and_sorts() {
    let references = ResultRef::extract_all(
        "$(tasks.lint.results.report[0]) $(tasks.build.results.digest) \
         $(tasks.build.results.digest) $(tasks.approve.results.approver)",
    );
    assert_eq!(references.len(), 4);

    let resolved = ResultResolver::resolve_all(&state(), &references).unwrap();
    let tasks: Vec<&str> = resolved
        .iter()
        .map(|r| r.reference.pipeline_task.as_str())
        .collect();
    assert_eq!(tasks, vec!["approve", "build", "lint"]);

    let replacements = resolved.string_replacements();
    assert_eq!(replacements["tasks.approve.results.approver"], "alice");
    assert_eq!(replacements["tasks.build.results.digest[1]"], "sha256:bbb");
    assert_eq!(replacements["tasks.lint.results.report[0]"], "a.rs");
}

#[test]
fn test_resolve_all_stops_at_first_error() {
    let references = vec![
        ResultRef::new("build", "digest"),
        ResultRef::new("build", "missing"),
        ResultRef::new("ghost", "url"),
    ];
    let err = ResultResolver::resolve_all(&state(), &references).unwrap_err();
    assert!(matches!(err, ResolutionError::ResultNotFound { .. }));
}

#[test]
fn test_resolve_for_task_collects_matrix_references() {
    let task = Loader::parse_pipeline_task(
        r#"
name: scan
params:
  - name: approver
    value: $(tasks.approve.results.approver)
matrix:
  params:
    - name: image
      value:
        - $(tasks.build.results.digest[0])
        - $(tasks.build.results.digest[1])
"#,
    )
    .unwrap();

    let resolved = ResultResolver::resolve_for_task(&state(), &task).unwrap();
    assert_eq!(resolved.len(), 3);
}
