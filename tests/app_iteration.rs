// Iteration-engine behavior over the null driver: record-per-case
// accounting, filter application, fault absorption, terminal-state
// idempotence, and log determinism.

mod common;

use common::{buffered_console, stage_archive, SharedBuf};
use crucible::app::{App, RunState};
use crucible::archive::Archive;
use crucible::cases::{
    build_default_case_registry, CaseContext, CaseError, CaseRegistry, CaseStatus,
};
use crucible::config::{Config, LogFormat, RunMode};
use crucible::platform::{create_platform, StringQuery};
use crucible::testlog::TestLog;

fn version_case(ctx: &mut CaseContext<'_>) -> Result<CaseStatus, CaseError> {
    let value = ctx.driver()?.get_string(StringQuery::Version)?;
    Ok(CaseStatus::pass(value))
}

fn renderer_case(ctx: &mut CaseContext<'_>) -> Result<CaseStatus, CaseError> {
    let value = ctx.driver()?.get_string(StringQuery::Renderer)?;
    Ok(CaseStatus::pass(value))
}

fn passing_case(_ctx: &mut CaseContext<'_>) -> Result<CaseStatus, CaseError> {
    Ok(CaseStatus::pass("ok"))
}

fn exploding_case(_ctx: &mut CaseContext<'_>) -> Result<CaseStatus, CaseError> {
    panic!("deliberate fault");
}

fn missing_resource_case(ctx: &mut CaseContext<'_>) -> Result<CaseStatus, CaseError> {
    let _ = ctx.read_text_resource("no/such/resource.txt")?;
    Ok(CaseStatus::pass("unreachable"))
}

/// Runs a registry to completion and returns the log text, the console
/// text, and the sequence of `iterate` return values (with one extra probe
/// after completion).
fn run_registry(mut config: Config, registry: CaseRegistry) -> (String, String, Vec<bool>) {
    let archive_dir = stage_archive();
    config.archive_dir = archive_dir.path().to_path_buf();

    let archive = Archive::open(&config.archive_dir).unwrap();
    let log_buf = SharedBuf::default();
    let mut log = TestLog::from_writer(Box::new(log_buf.clone()), config.log_format).unwrap();
    let (console, console_buf) = buffered_console();
    let platform = create_platform(config.driver);

    let mut returns = Vec::new();
    {
        let mut app = App::with_registry(
            platform.as_ref(),
            &archive,
            &mut log,
            &config,
            console,
            registry,
        )
        .unwrap();
        loop {
            let more = app.iterate();
            returns.push(more);
            if !more {
                break;
            }
        }
        returns.push(app.iterate());
        assert_eq!(app.state(), RunState::Done);
    }
    log.finish().unwrap();

    let console_text = console_buf.borrow().as_str().to_string();
    (log_buf.contents(), console_text, returns)
}

fn record_count(log: &str) -> usize {
    log.matches("<TestCaseResult").count()
}

#[test]
fn two_info_cases_pass_and_iteration_terminates() {
    let mut registry = CaseRegistry::new();
    registry.register("dEQP-GLES2.info.version", version_case);
    registry.register("dEQP-GLES2.info.renderer", renderer_case);

    let config = Config {
        case_filter: Some("dEQP-GLES2.info.*".to_string()),
        ..Config::default()
    };
    let (log, _console, returns) = run_registry(config, registry);

    assert_eq!(returns, vec![true, true, false, false]);
    assert_eq!(record_count(&log), 2);
    assert_eq!(log.matches("StatusCode=\"Pass\"").count(), 2);
    assert!(log.contains("CasePath=\"dEQP-GLES2.info.version\""));
    assert!(log.contains("CasePath=\"dEQP-GLES2.info.renderer\""));
}

#[test]
fn filtered_out_cases_are_skipped_without_records() {
    let mut registry = CaseRegistry::new();
    registry.register("dEQP-GLES2.info.version", version_case);
    registry.register("dEQP-GLES2.capability.alpha", passing_case);
    registry.register("dEQP-GLES2.capability.beta", passing_case);

    let config = Config {
        case_filter: Some("dEQP-GLES2.capability.*".to_string()),
        ..Config::default()
    };
    let (log, _console, returns) = run_registry(config, registry);

    assert_eq!(record_count(&log), 2);
    assert!(!log.contains("info.version"));
    assert_eq!(returns, vec![true, true, false, false]);
}

#[test]
fn unmatched_filter_finishes_on_the_first_call() {
    let mut registry = CaseRegistry::new();
    registry.register("dEQP-GLES2.info.version", version_case);

    let config = Config {
        case_filter: Some("dEQP-GLES2.nonexistent.*".to_string()),
        ..Config::default()
    };
    let (log, _console, returns) = run_registry(config, registry);

    assert_eq!(record_count(&log), 0);
    assert_eq!(returns, vec![false, false]);
}

#[test]
fn panicking_case_records_internal_error_and_run_continues() {
    let mut registry = CaseRegistry::new();
    registry.register("dEQP-GLES2.fault.explode", exploding_case);
    registry.register("dEQP-GLES2.fault.after", passing_case);

    let (log, _console, _returns) = run_registry(Config::default(), registry);

    assert_eq!(record_count(&log), 2);
    assert_eq!(log.matches("StatusCode=\"InternalError\"").count(), 1);
    assert!(log.contains("deliberate fault"));
    // the case after the fault still executed and passed
    assert!(log.contains("CasePath=\"dEQP-GLES2.fault.after\""));
    assert_eq!(log.matches("StatusCode=\"Pass\"").count(), 1);
}

#[test]
fn missing_resource_records_resource_error() {
    let mut registry = CaseRegistry::new();
    registry.register("dEQP-GLES2.fault.resource", missing_resource_case);

    let (log, _console, _returns) = run_registry(Config::default(), registry);

    assert_eq!(record_count(&log), 1);
    assert_eq!(log.matches("StatusCode=\"ResourceError\"").count(), 1);
    assert!(log.contains("no/such/resource.txt"));
}

#[test]
fn default_hierarchy_passes_under_the_null_driver() {
    let config = Config {
        log_format: LogFormat::Json,
        ..Config::default()
    };
    let (log, console, _returns) = run_registry(config, build_default_case_registry());

    let records: Vec<serde_json::Value> = log
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(records.len(), build_default_case_registry().len());
    for record in &records {
        let outcome = record["outcome"].as_str().unwrap();
        // npot_textures is the one capability the null driver does not
        // advertise; everything else answers a benign default
        if record["case"] == "dEQP-GLES2.capability.npot_textures" {
            assert_eq!(outcome, "NotSupported");
        } else {
            assert_eq!(outcome, "Pass", "unexpected outcome for {}", record["case"]);
        }
    }
    assert!(console.contains("Test run totals:"));
}

#[test]
fn identical_runs_produce_identical_logs() {
    let config = Config {
        case_filter: Some("dEQP-GLES2.*".to_string()),
        ..Config::default()
    };
    let (first, _, _) = run_registry(config.clone(), build_default_case_registry());
    let (second, _, _) = run_registry(config, build_default_case_registry());
    assert_eq!(first, second);
}

#[test]
fn caselist_mode_enumerates_every_case_ignoring_the_filter() {
    let config = Config {
        run_mode: RunMode::XmlCaselist,
        case_filter: Some("dEQP-GLES2.info.*".to_string()),
        ..Config::default()
    };
    let (log, console, returns) = run_registry(config, build_default_case_registry());

    let total = build_default_case_registry().len();
    assert_eq!(log.matches("<Case Name=").count(), total);
    assert_eq!(returns.len(), total + 2);
    assert!(console.contains(&format!("Listed {total} test cases")));
}

#[test]
fn caselist_filter_flag_restricts_enumeration() {
    let config = Config {
        run_mode: RunMode::XmlCaselist,
        case_filter: Some("dEQP-GLES2.info.*".to_string()),
        caselist_filter: true,
        ..Config::default()
    };
    let (log, _console, _returns) = run_registry(config, build_default_case_registry());

    assert_eq!(log.matches("<Case Name=\"dEQP-GLES2.info.").count(), 5);
    assert_eq!(log.matches("<Case Name=").count(), 5);
}

#[test]
fn caselist_mode_needs_no_driver() {
    // A system-driver configuration would fail library creation on machines
    // without GLES2; caselist generation must not attempt it.
    let config = Config {
        run_mode: RunMode::XmlCaselist,
        driver: crucible::config::DriverKind::System,
        gl_library: Some(std::path::PathBuf::from("/nonexistent/libGLESv2.so")),
        ..Config::default()
    };
    let (log, _console, _returns) = run_registry(config, build_default_case_registry());
    assert!(log.contains("<Case Name=\"dEQP-GLES2.info.version\"/>"));
}
