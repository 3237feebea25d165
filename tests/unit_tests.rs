//! Unit tests for branchbot modules

mod common;

mod paths_test {
    use branchbot::env::Environment;
    use branchbot::paths::{PathResolver, PathRule, Segment, resolve_paths};
    use branchbot::types::InterpreterVersion;
    use std::path::{Path, PathBuf};

    fn rules(templates: &[&str]) -> Vec<PathRule> {
        templates
            .iter()
            .map(|t| PathRule::parse(t).unwrap())
            .collect()
    }

    #[test]
    fn test_output_preserves_rule_order() {
        let templates = ["zeta", "alpha", "${B}/mid", "beta", "alpha"];
        let env = Environment::new().with("B", "/b");
        let resolved = resolve_paths(Path::new("/repo"), &rules(&templates), &env, None);

        assert_eq!(
            resolved,
            vec![
                PathBuf::from("/repo/zeta"),
                PathBuf::from("/repo/alpha"),
                PathBuf::from("/b/mid"),
                PathBuf::from("/repo/beta"),
                PathBuf::from("/repo/alpha"),
            ]
        );
    }

    #[test]
    fn test_one_entry_per_rule_for_many_rules() {
        let templates: Vec<String> = (0..50).map(|i| format!("dir{i}")).collect();
        let refs: Vec<&str> = templates.iter().map(String::as_str).collect();
        let env = Environment::new();
        let resolved = resolve_paths(Path::new("/r"), &rules(&refs), &env, None);

        assert_eq!(resolved.len(), 50);
        for (i, path) in resolved.iter().enumerate() {
            assert_eq!(path, &PathBuf::from(format!("/r/dir{i}")));
        }
    }

    #[test]
    fn test_unset_variable_segment_is_empty_string() {
        let env = Environment::new();
        let rule = PathRule::new(vec![
            Segment::Literal("pre-".to_string()),
            Segment::Env("MISSING".to_string()),
            Segment::Literal("-post".to_string()),
        ]);
        let resolved = resolve_paths(Path::new("/w"), &[rule], &env, None);
        assert_eq!(resolved, vec![PathBuf::from("/w/pre--post")]);
    }

    #[test]
    fn test_environment_prefix_and_interpreter_version() {
        let env = Environment::new().with("VIRTUAL_ENV", "/home/ci/venv");
        let resolver = PathResolver::new(Path::new("/src"), &env)
            .with_interpreter_version(Some(InterpreterVersion::new(3, 11)));

        let resolved = resolver.resolve(&rules(&[
            "apps",
            "${VIRTUAL_ENV}/lib/python{python_version}/site-packages",
        ]));

        assert_eq!(
            resolved,
            vec![
                PathBuf::from("/src/apps"),
                PathBuf::from("/home/ci/venv/lib/python3.11/site-packages"),
            ]
        );
    }

    #[test]
    fn test_relative_variable_value_joins_base() {
        let env = Environment::new().with("SUB", "nested/dir");
        let resolved = resolve_paths(Path::new("/w"), &rules(&["${SUB}/pkg"]), &env, None);
        assert_eq!(resolved, vec![PathBuf::from("/w/nested/dir/pkg")]);
    }

    #[test]
    fn test_empty_rule_list() {
        let env = Environment::new();
        assert!(resolve_paths(Path::new("/w"), &[], &env, None).is_empty());
    }
}

mod evaluate_test {
    use crate::common::make_pr;
    use branchbot::trigger::{Condition, Decision, evaluate};
    use branchbot::types::{Event, EventKind, PrState};

    fn condition() -> Condition {
        Condition::push_to("master")
            .require_label("autoupdate")
            .exclude_label("no-autoupdate")
    }

    fn skip_reasons(decision: Decision) -> Vec<String> {
        match decision {
            Decision::Skip { reasons } => reasons,
            Decision::Merge => panic!("expected skip"),
        }
    }

    #[test]
    fn test_matching_push_and_label_merges() {
        let pr = make_pr(1, "feature", "master", &["autoupdate"]);
        assert_eq!(
            evaluate(&condition(), &Event::push("master"), &pr),
            Decision::Merge
        );
    }

    #[test]
    fn test_non_matching_branch_never_merges() {
        let pr = make_pr(1, "feature", "develop", &["autoupdate"]);
        let reasons = skip_reasons(evaluate(&condition(), &Event::push("develop"), &pr));
        assert!(reasons.iter().any(|r| r.contains("'develop' is not configured")));
    }

    #[test]
    fn test_missing_required_label_never_merges() {
        let pr = make_pr(1, "feature", "master", &["bug", "enhancement"]);
        let reasons = skip_reasons(evaluate(&condition(), &Event::push("master"), &pr));
        assert_eq!(reasons, vec!["missing required label (autoupdate)"]);
    }

    #[test]
    fn test_no_labels_never_merges() {
        let pr = make_pr(1, "feature", "master", &[]);
        assert!(!evaluate(&condition(), &Event::push("master"), &pr).is_merge());
    }

    #[test]
    fn test_excluded_label_wins_over_required() {
        let pr = make_pr(1, "feature", "master", &["autoupdate", "no-autoupdate"]);
        let reasons = skip_reasons(evaluate(&condition(), &Event::push("master"), &pr));
        assert_eq!(reasons, vec!["has excluded label 'no-autoupdate'"]);
    }

    #[test]
    fn test_any_required_label_is_enough() {
        let condition = condition().require_label("keep-fresh");
        let pr = make_pr(1, "feature", "master", &["keep-fresh"]);
        assert!(evaluate(&condition, &Event::push("master"), &pr).is_merge());
    }

    #[test]
    fn test_no_required_labels_never_merges() {
        let condition = Condition::push_to("master");
        let pr = make_pr(1, "feature", "master", &["autoupdate"]);
        let reasons = skip_reasons(evaluate(&condition, &Event::push("master"), &pr));
        assert_eq!(reasons, vec!["no required labels are configured"]);
    }

    #[test]
    fn test_default_condition_never_merges() {
        let pr = make_pr(1, "feature", "some-branch", &[]);
        let reasons = skip_reasons(evaluate(
            &Condition::default(),
            &Event::push("some-branch"),
            &pr,
        ));
        assert_eq!(
            reasons,
            vec![
                "no branches are configured for updates",
                "no required labels are configured",
            ]
        );
    }

    #[test]
    fn test_other_event_kind_never_merges() {
        let pr = make_pr(1, "feature", "master", &["autoupdate"]);
        let event = Event {
            kind: EventKind::Other("pull_request".to_string()),
            branch: Some("master".to_string()),
        };
        let reasons = skip_reasons(evaluate(&condition(), &event, &pr));
        assert!(reasons[0].contains("'pull_request' does not match 'push'"));
    }

    #[test]
    fn test_tag_push_never_merges() {
        let pr = make_pr(1, "feature", "master", &["autoupdate"]);
        let event = Event {
            kind: EventKind::Push,
            branch: None,
        };
        assert!(!evaluate(&condition(), &event, &pr).is_merge());
    }

    #[test]
    fn test_closed_pr_never_merges() {
        let mut pr = make_pr(1, "feature", "master", &["autoupdate"]);
        pr.state = PrState::Closed;
        let reasons = skip_reasons(evaluate(&condition(), &Event::push("master"), &pr));
        assert_eq!(reasons, vec!["PR is closed"]);
    }

    #[test]
    fn test_base_mismatch_skips_by_default() {
        let condition = Condition::push_to("*").require_label("autoupdate");
        let pr = make_pr(1, "feature", "develop", &["autoupdate"]);
        assert!(!evaluate(&condition, &Event::push("master"), &pr).is_merge());
    }

    #[test]
    fn test_base_mismatch_allowed_when_disabled() {
        let mut condition = Condition::push_to("master").require_label("autoupdate");
        condition.require_base_match = false;
        let pr = make_pr(1, "feature", "develop", &["autoupdate"]);
        assert!(evaluate(&condition, &Event::push("master"), &pr).is_merge());
    }

    #[test]
    fn test_all_reasons_reported() {
        let mut pr = make_pr(1, "feature", "master", &["no-autoupdate"]);
        pr.state = PrState::Merged;
        let reasons = skip_reasons(evaluate(&condition(), &Event::push("master"), &pr));
        assert_eq!(reasons.len(), 3);
    }
}

mod plan_test {
    use crate::common::make_pr;
    use branchbot::trigger::{Condition, UpdateStep, create_update_plan};
    use branchbot::types::Event;

    fn condition() -> Condition {
        Condition::push_to("master").require_label("autoupdate")
    }

    #[test]
    fn test_plan_not_triggered_has_no_steps() {
        let prs = vec![make_pr(1, "a", "develop", &["autoupdate"])];
        let plan = create_update_plan(&condition(), &Event::push("develop"), &prs);

        assert!(!plan.is_triggered());
        assert!(plan.steps.is_empty());
        assert!(plan.is_empty());
        assert_eq!(plan.pushed_branch.as_deref(), Some("develop"));
    }

    #[test]
    fn test_plan_preserves_pr_order() {
        let prs = vec![
            make_pr(3, "c", "master", &["autoupdate"]),
            make_pr(1, "a", "master", &[]),
            make_pr(2, "b", "master", &["autoupdate"]),
        ];
        let plan = create_update_plan(&condition(), &Event::push("master"), &prs);

        assert!(plan.is_triggered());
        let numbers: Vec<u64> = plan.steps.iter().map(UpdateStep::pr_number).collect();
        assert_eq!(numbers, vec![3, 1, 2]);
        assert_eq!(plan.merge_count(), 2);
        assert!(matches!(plan.steps[1], UpdateStep::Skip { .. }));
    }

    #[test]
    fn test_plan_merge_step_merges_base_into_head() {
        let prs = vec![make_pr(7, "feature", "master", &["autoupdate"])];
        let plan = create_update_plan(&condition(), &Event::push("master"), &prs);

        assert_eq!(
            plan.steps[0],
            UpdateStep::Merge {
                pr_number: 7,
                pr_title: "PR for feature".to_string(),
                head_ref: "feature".to_string(),
                base_ref: "master".to_string(),
            }
        );
    }

    #[test]
    fn test_default_config_plans_nothing() {
        let config = branchbot::config::Config::default();
        let prs = vec![make_pr(1, "feature", "some-branch", &["autoupdate"])];
        let plan = create_update_plan(&config.trigger, &Event::push("some-branch"), &prs);

        assert!(!plan.is_triggered());
        assert_eq!(plan.merge_count(), 0);
        assert_eq!(
            plan.event_reasons,
            vec!["no branches are configured for updates"]
        );
    }

    #[test]
    fn test_plan_with_only_skips_is_empty() {
        let prs = vec![make_pr(1, "a", "master", &[])];
        let plan = create_update_plan(&condition(), &Event::push("master"), &prs);
        assert!(plan.is_triggered());
        assert!(plan.is_empty());
        assert_eq!(plan.steps.len(), 1);
    }

    #[test]
    fn test_step_display() {
        let prs = vec![
            make_pr(7, "feature", "master", &["autoupdate"]),
            make_pr(8, "other", "master", &[]),
        ];
        let plan = create_update_plan(&condition(), &Event::push("master"), &prs);

        assert_eq!(
            plan.steps[0].to_string(),
            "merge master into feature (PR #7: PR for feature)"
        );
        assert_eq!(
            plan.steps[1].to_string(),
            "skip PR #8 (other): missing required label (autoupdate)"
        );
    }
}

mod retry_test {
    use crate::common::{MockMergeBackend, RecordingProgress, conflict, make_pr};
    use branchbot::error::Error;
    use branchbot::trigger::{
        Condition, ConflictAction, NoopProgress, RetryPolicy, create_update_plan,
        execute_update, merge_with_retry,
    };
    use branchbot::types::{Event, MergeOutcome};
    use std::time::Duration;
    use tokio::time::Instant;

    fn condition() -> Condition {
        Condition::push_to("master").require_label("autoupdate")
    }

    fn workflow_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 10,
            sleep_seconds: 300,
            on_conflict: ConflictAction::Fail,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fails_after_ten_attempts_without_eleventh() {
        let backend = MockMergeBackend::new();
        backend.always_conflict("feature");
        let prs = vec![make_pr(1, "feature", "master", &["autoupdate"])];
        let plan = create_update_plan(&condition(), &Event::push("master"), &prs);

        let start = Instant::now();
        let result = execute_update(&plan, &workflow_policy(), &backend, &NoopProgress).await;

        match result {
            Err(Error::MergeConflict { branch, attempts }) => {
                assert_eq!(branch, "feature");
                assert_eq!(attempts, 10);
            }
            other => panic!("expected MergeConflict, got {other:?}"),
        }
        assert_eq!(backend.calls_for("feature"), 10);

        // Nine waits between ten attempts, none after the last
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(9 * 300));
        assert!(elapsed < Duration::from_secs(10 * 300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_conflict_then_success_within_budget() {
        let backend = MockMergeBackend::new();
        backend.conflict_times("feature", 2);

        let start = Instant::now();
        let retried = merge_with_retry(
            &backend,
            "feature",
            "master",
            &workflow_policy(),
            &NoopProgress,
        )
        .await
        .unwrap();

        assert_eq!(retried.attempts, 3);
        assert_eq!(
            retried.outcome,
            MergeOutcome::Merged {
                sha: "merged_feature".to_string()
            }
        );
        assert!(start.elapsed() >= Duration::from_secs(600));
        assert!(start.elapsed() < Duration::from_secs(900));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_attempt_success_does_not_sleep() {
        let backend = MockMergeBackend::new();
        let start = Instant::now();
        let retried = merge_with_retry(
            &backend,
            "feature",
            "master",
            &workflow_policy(),
            &NoopProgress,
        )
        .await
        .unwrap();

        assert_eq!(retried.attempts, 1);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_zero_max_attempts_tries_once() {
        let backend = MockMergeBackend::new();
        backend.always_conflict("feature");
        let policy = RetryPolicy {
            max_attempts: 0,
            sleep_seconds: 0,
            on_conflict: ConflictAction::Fail,
        };

        let retried = merge_with_retry(&backend, "feature", "master", &policy, &NoopProgress)
            .await
            .unwrap();

        assert_eq!(retried.attempts, 1);
        assert_eq!(retried.outcome, conflict());
        assert_eq!(backend.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_skip_policy_continues_with_next_pr() {
        let backend = MockMergeBackend::new();
        backend.always_conflict("stuck");
        let prs = vec![
            make_pr(1, "stuck", "master", &["autoupdate"]),
            make_pr(2, "fresh", "master", &["autoupdate"]),
        ];
        let plan = create_update_plan(&condition(), &Event::push("master"), &prs);
        let policy = RetryPolicy {
            max_attempts: 3,
            sleep_seconds: 10,
            on_conflict: ConflictAction::Skip,
        };

        let result = execute_update(&plan, &policy, &backend, &NoopProgress)
            .await
            .unwrap();

        assert!(!result.is_success());
        assert_eq!(result.conflicted.len(), 1);
        assert_eq!(result.conflicted[0].pr_number, 1);
        assert_eq!(result.conflicted[0].attempts, 3);
        assert_eq!(result.updated.len(), 1);
        assert_eq!(result.updated[0].pr_number, 2);
        assert_eq!(backend.calls_for("stuck"), 3);
        assert_eq!(backend.calls_for("fresh"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fail_policy_stops_before_later_prs() {
        let backend = MockMergeBackend::new();
        backend.always_conflict("stuck");
        let prs = vec![
            make_pr(1, "stuck", "master", &["autoupdate"]),
            make_pr(2, "fresh", "master", &["autoupdate"]),
        ];
        let plan = create_update_plan(&condition(), &Event::push("master"), &prs);

        let result = execute_update(&plan, &workflow_policy(), &backend, &NoopProgress).await;

        assert!(matches!(result, Err(Error::MergeConflict { .. })));
        assert_eq!(backend.calls_for("fresh"), 0);
    }

    #[tokio::test]
    async fn test_non_matching_branch_makes_no_attempt() {
        let backend = MockMergeBackend::new();
        let prs = vec![make_pr(1, "feature", "develop", &["autoupdate"])];
        let plan = create_update_plan(&condition(), &Event::push("develop"), &prs);

        let result = execute_update(&plan, &workflow_policy(), &backend, &NoopProgress)
            .await
            .unwrap();

        assert!(result.updated.is_empty());
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unlabelled_and_excluded_prs_make_no_attempt() {
        let backend = MockMergeBackend::new();
        let condition = condition().exclude_label("hold");
        let prs = vec![
            make_pr(1, "unlabelled", "master", &[]),
            make_pr(2, "held", "master", &["autoupdate", "hold"]),
        ];
        let plan = create_update_plan(&condition, &Event::push("master"), &prs);

        let result = execute_update(&plan, &workflow_policy(), &backend, &NoopProgress)
            .await
            .unwrap();

        assert_eq!(result.skipped, vec![1, 2]);
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_backend_error_aborts_without_retry() {
        let backend = MockMergeBackend::new();
        backend.fail_merge("fatal: not a git repository");
        let prs = vec![make_pr(1, "feature", "master", &["autoupdate"])];
        let plan = create_update_plan(&condition(), &Event::push("master"), &prs);

        let result = execute_update(&plan, &workflow_policy(), &backend, &NoopProgress).await;

        assert!(matches!(result, Err(Error::Git(msg)) if msg.contains("not a git repository")));
        assert_eq!(backend.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_up_to_date_counts_as_updated_not_merged() {
        let backend = MockMergeBackend::new();
        backend.script("feature", vec![MergeOutcome::UpToDate]);
        let prs = vec![make_pr(1, "feature", "master", &["autoupdate"])];
        let plan = create_update_plan(&condition(), &Event::push("master"), &prs);

        let result = execute_update(&plan, &workflow_policy(), &backend, &NoopProgress)
            .await
            .unwrap();

        assert!(result.is_success());
        assert_eq!(result.updated.len(), 1);
        assert_eq!(result.merged_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_reports_retries() {
        let backend = MockMergeBackend::new();
        backend.conflict_times("feature", 1);
        let prs = vec![make_pr(1, "feature", "master", &["autoupdate"])];
        let plan = create_update_plan(&condition(), &Event::push("master"), &prs);
        let progress = RecordingProgress::default();

        execute_update(&plan, &workflow_policy(), &backend, &progress)
            .await
            .unwrap();

        let messages = progress.messages();
        assert!(messages.iter().any(|m| m.contains("retrying in 300s")));
        assert!(messages.iter().any(|m| m.contains("attempt 2/10")));
        assert!(messages.iter().any(|m| m.contains("Merged: merged_feature")));
    }

    #[tokio::test]
    async fn test_merge_passes_base_and_head() {
        let backend = MockMergeBackend::new();
        let prs = vec![make_pr(4, "topic", "master", &["autoupdate"])];
        let plan = create_update_plan(&condition(), &Event::push("master"), &prs);

        execute_update(&plan, &workflow_policy(), &backend, &NoopProgress)
            .await
            .unwrap();

        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].head, "topic");
        assert_eq!(calls[0].base, "master");
    }
}
