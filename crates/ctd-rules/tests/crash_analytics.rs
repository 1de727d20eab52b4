//! Integration test: built-in and plugin rules end-to-end via Analyzer.
//!
//! Uses the fixture project under `tests/fixtures/app/`.

use ctd_core::{
    analyze_project, AnalysisResult, Analyzer, Config, Project, Reason, Rule, RuleBox, RuleMeta,
    Severity,
};
use ctd_rules::{
    builtin_rules, find_crash_analytic_service, load_candidates, InvocationPattern,
    InvocationRule, RuleRegistry,
};
use std::path::PathBuf;

fn fixture_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/app")
}

fn analyze_fixture() -> AnalysisResult {
    let root = fixture_root();
    let toml_content =
        std::fs::read_to_string(root.join("ctd.toml")).expect("fixture config should exist");
    let config = Config::parse(&toml_content).expect("fixture config should parse");
    let rules = RuleRegistry::new()
        .builtins(builtin_rules(&config))
        .candidates(load_candidates(&toml_content).expect("plugins should load"))
        .build();

    Analyzer::builder()
        .root(&root)
        .config(config)
        .rules(rules)
        .build()
        .expect("analyzer should build")
        .analyze()
        .expect("analysis should succeed")
}

fn single_rule(rule: impl Rule + 'static) -> Vec<RuleBox> {
    vec![Box::new(rule)]
}

// ── Fixture project ──

#[test]
fn reports_follow_rule_order() {
    let result = analyze_fixture();
    let keys: Vec<&str> = result.reports.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["findCrashAnalyticService", "findLoggerCalls"]);
    assert_eq!(result.files_analyzed, 2, "generated/ is excluded");
}

#[test]
fn crash_analytics_entries_are_grouped_by_tag() {
    let result = analyze_fixture();
    let report = result.get("findCrashAnalyticService").expect("built-in report");

    // cart/CartView.tsx sorts before profile/loadProfile.ts
    let domains: Vec<&str> = report.result.keys().map(String::as_str).collect();
    assert_eq!(domains, vec!["Cart", "", "Profile"]);

    let cart = &report.result["Cart"];
    assert_eq!(cart.len(), 1);
    assert_eq!(cart[0].severity, Severity::Error);
    assert_eq!(cart[0].title, "MapToError");
    assert_eq!(cart[0].reason, Reason::NoExceptionHandling);

    let untagged = &report.result[""];
    assert_eq!(untagged[0].severity, Severity::Debug);
    assert_eq!(untagged[0].title, "rendered");

    let profile = &report.result["Profile"];
    let reasons: Vec<Reason> = profile.iter().map(|e| e.reason).collect();
    assert_eq!(reasons, vec![Reason::FallbackScreen, Reason::ToastShown]);
    assert_eq!(profile[0].line, 8);
}

#[test]
fn plugin_rule_uses_its_own_receiver() {
    let result = analyze_fixture();
    let report = result.get("findLoggerCalls").expect("plugin report");
    let entries = &report.result[""];
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].title, "remove failed");
    assert_eq!(
        entries[0].field("location").as_deref(),
        Some("src/cart/CartView.tsx:8")
    );
}

#[test]
fn fixture_analysis_is_idempotent() {
    assert_eq!(analyze_fixture(), analyze_fixture());
}

// ── In-memory projects ──

#[test]
fn lookup_failure_reported_under_its_tag() {
    let project = Project::from_sources([(
        "app.ts",
        "Service.sendInfo({ error: new Error('lookup failed'), tag: ErrorTag.Profile });",
    )])
    .unwrap();
    let rule = InvocationRule::new(
        RuleMeta::new(
            "calls",
            ["Error message", "Severity", "Reason"],
            ["title", "severity", "reason"],
            "calls.md",
        ),
        InvocationPattern::new("Service"),
    );

    let result = analyze_project(&project, &single_rule(rule));

    let entries = &result.get("calls").unwrap().result["Profile"];
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].severity, Severity::Info);
    assert_eq!(entries[0].reason.to_string(), "fallback screen shown");
}

#[test]
fn toast_beats_fallback_title() {
    let project = Project::from_sources([(
        "app.ts",
        "const f = () => { toast('x'); CrashAnalyticsService.sendInfo({ error: new Error('조회 실패') }); };",
    )])
    .unwrap();

    let result = analyze_project(&project, &single_rule(find_crash_analytic_service()));

    let entries = &result.get("findCrashAnalyticService").unwrap().result[""];
    assert_eq!(entries[0].reason, Reason::ToastShown);
}

#[test]
fn configured_receiver_replaces_default() {
    let config = Config::parse(
        "[rules.findCrashAnalyticService]\nreceiver = \"Crash\"\nmethods = [\"sendError\"]\n",
    )
    .unwrap();
    let project = Project::from_sources([(
        "app.ts",
        "Crash.sendError({}); Crash.sendInfo({}); CrashAnalyticsService.sendError({});",
    )])
    .unwrap();

    let result = analyze_project(&project, &builtin_rules(&config));

    let report = result.get("findCrashAnalyticService").unwrap();
    assert_eq!(report.entry_count(), 1);
    assert_eq!(report.result[""][0].severity, Severity::Error);
}

#[test]
fn no_matches_still_registers_the_rule() {
    let project = Project::from_sources([("app.ts", "console.log('hi');")]).unwrap();
    let result = analyze_project(&project, &single_rule(find_crash_analytic_service()));

    let report = result.get("findCrashAnalyticService").unwrap();
    assert!(report.result.is_empty());
    assert!(result.is_empty());
}
