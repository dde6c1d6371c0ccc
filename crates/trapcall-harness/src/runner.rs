//! Test execution engine.
//!
//! Every case runs twice through a fresh scripted mechanism: once with an
//! owned slot and once with the calling thread's slot. Both runs must agree
//! with each other and with the fixture, and the mechanism must have seen the
//! configured request id and the case's arguments.

use serde::Serialize;
use trapcall_core::errno::{self, ThreadErrno};
use trapcall_core::wrapper::RecordedCall;
use trapcall_core::{ScriptedTrap, Syscaller, Trap, WrapperConfig};

use crate::fixtures::{FixtureCase, FixtureSet};

/// Outcome of one fixture case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseResult {
    pub case_name: String,
    pub passed: bool,
    pub expected_return: i32,
    pub actual_return: i32,
    pub expected_errno: i32,
    pub actual_errno: i32,
    /// Human-readable mismatch notes, empty when the case passed.
    pub notes: Vec<String>,
}

/// What one run of the wrapper produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Observation {
    ret: i32,
    errno: i32,
    arg2_after: i32,
    call: Option<RecordedCall>,
}

/// A mechanism that remembers what it was asked to do.
trait Recording: Trap {
    fn first_call(&self) -> Option<RecordedCall>;
}

impl Recording for ScriptedTrap {
    fn first_call(&self) -> Option<RecordedCall> {
        self.calls().first().copied()
    }
}

/// Runs a fixture set and collects results.
pub struct TestRunner {
    /// Name of the test campaign.
    pub campaign: String,
    /// Overrides the request id recorded in the fixture set.
    pub request: Option<u32>,
}

impl TestRunner {
    /// Create a new test runner.
    #[must_use]
    pub fn new(campaign: impl Into<String>) -> Self {
        Self {
            campaign: campaign.into(),
            request: None,
        }
    }

    #[must_use]
    pub fn with_request(mut self, request: u32) -> Self {
        self.request = Some(request);
        self
    }

    /// Run all fixtures in a set and return results.
    pub fn run(&self, set: &FixtureSet) -> Vec<CaseResult> {
        let request = self.request.unwrap_or(set.request);
        set.cases
            .iter()
            .map(|case| run_case(case, request, script_for))
            .collect()
    }
}

fn config_for(case: &FixtureCase, request: u32) -> WrapperConfig {
    WrapperConfig::default()
        .with_request(request)
        .with_band(case.band.into())
}

fn script_for(case: &FixtureCase) -> ScriptedTrap {
    match case.arg2_write {
        Some(value) => ScriptedTrap::new().writing(case.raw, value),
        None => ScriptedTrap::new().returning(case.raw),
    }
}

fn observe_owned<T: Recording>(case: &FixtureCase, request: u32, trap: T) -> Observation {
    let mut sc = Syscaller::new(trap, &config_for(case, request));
    let mut slot = case.prior_errno;
    let mut arg2 = case.arg2;
    let ret = sc.invoke_with(&mut slot, case.arg1, &mut arg2, case.arg3);
    Observation {
        ret,
        errno: slot,
        arg2_after: arg2,
        call: sc.trap_ref().first_call(),
    }
}

fn observe_thread<T: Recording>(case: &FixtureCase, request: u32, trap: T) -> Observation {
    let mut sc = Syscaller::new(trap, &config_for(case, request));
    let saved = errno::get_errno();
    errno::set_errno(case.prior_errno);
    let mut arg2 = case.arg2;
    let ret = sc.invoke_with(&mut ThreadErrno, case.arg1, &mut arg2, case.arg3);
    let observed = errno::get_errno();
    errno::set_errno(saved);
    Observation {
        ret,
        errno: observed,
        arg2_after: arg2,
        call: sc.trap_ref().first_call(),
    }
}

fn run_case<T, F>(case: &FixtureCase, request: u32, mechanism: F) -> CaseResult
where
    T: Recording,
    F: Fn(&FixtureCase) -> T,
{
    let owned = observe_owned(case, request, mechanism(case));
    let again = observe_owned(case, request, mechanism(case));
    let thread = observe_thread(case, request, mechanism(case));

    let mut notes = Vec::new();
    if owned.ret != case.expected_return {
        notes.push(format!(
            "return: expected {}, got {}",
            case.expected_return, owned.ret
        ));
    }
    if owned.errno != case.expected_errno {
        notes.push(format!(
            "errno: expected {}, got {}",
            case.expected_errno, owned.errno
        ));
    }
    if owned != again {
        notes.push(format!("not idempotent: {owned:?} then {again:?}"));
    }
    if owned != thread {
        notes.push(format!(
            "thread slot disagrees with owned slot: {thread:?} vs {owned:?}"
        ));
    }
    match owned.call {
        None => notes.push("mechanism was never called".to_string()),
        Some(call) => {
            if call.request != request {
                notes.push(format!(
                    "mechanism saw request {}, expected {request}",
                    call.request
                ));
            }
            let seen = (call.arg1, call.arg2_before, call.arg3);
            let sent = (case.arg1, case.arg2, case.arg3);
            if seen != sent {
                notes.push(format!("mechanism saw arguments {seen:?}, expected {sent:?}"));
            }
        }
    }
    let expected_arg2 = case.arg2_write.unwrap_or(case.arg2);
    if owned.arg2_after != expected_arg2 {
        notes.push(format!(
            "arg2: expected {expected_arg2}, got {}",
            owned.arg2_after
        ));
    }

    CaseResult {
        case_name: case.name.clone(),
        passed: notes.is_empty(),
        expected_return: case.expected_return,
        actual_return: owned.ret,
        expected_errno: case.expected_errno,
        actual_errno: owned.errno,
        notes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FixtureSet;

    fn set(cases: &str) -> FixtureSet {
        FixtureSet::from_json(&format!(
            r#"{{"version":"v1","family":"t","captured_at":"now","cases":[{cases}]}}"#
        ))
        .unwrap()
    }

    #[test]
    fn passing_cases() {
        let fixture = set(
            r#"{"name":"enoent","raw":-2,"expected_return":-1,"expected_errno":2},
               {"name":"five","raw":5,"prior_errno":9,"expected_return":5,"expected_errno":9}"#,
        );
        let results = TestRunner::new("unit").run(&fixture);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.passed), "{results:?}");
    }

    #[test]
    fn wrong_expectation_fails_with_notes() {
        let fixture = set(r#"{"name":"bad","raw":-126,"expected_return":-1,"expected_errno":126}"#);
        let results = TestRunner::new("unit").run(&fixture);
        let r = &results[0];
        assert!(!r.passed);
        assert_eq!(r.actual_return, -126);
        assert_eq!(r.actual_errno, 0);
        assert_eq!(r.notes.len(), 2, "{:?}", r.notes);
    }

    #[test]
    fn arg2_write_is_checked() {
        let fixture = set(
            r#"{"name":"w","raw":0,"arg2":1,"arg2_write":42,"expected_return":0,"expected_errno":0}"#,
        );
        let results = TestRunner::new("unit").run(&fixture);
        assert!(results[0].passed, "{:?}", results[0].notes);
    }

    #[test]
    fn request_override_reaches_mechanism() {
        let fixture = set(r#"{"name":"ok","raw":0,"expected_return":0,"expected_errno":0}"#);
        let results = TestRunner::new("unit").with_request(20).run(&fixture);
        assert!(results[0].passed);
    }

    #[test]
    fn thread_slot_restored_after_run() {
        errno::set_errno(31);
        let fixture = set(r#"{"name":"e","raw":-5,"expected_return":-1,"expected_errno":5}"#);
        let results = TestRunner::new("unit").run(&fixture);
        assert!(results[0].passed);
        assert_eq!(errno::get_errno(), 31);
    }

    /// Hands the mechanism `arg3` and `arg1` in swapped positions.
    struct SwappedArgs(ScriptedTrap);

    impl Trap for SwappedArgs {
        fn trap(&mut self, request: u32, arg1: i32, arg2: &mut i32, arg3: i32) -> i32 {
            self.0.trap(request, arg3, arg2, arg1)
        }
    }

    impl Recording for SwappedArgs {
        fn first_call(&self) -> Option<RecordedCall> {
            self.0.first_call()
        }
    }

    #[test]
    fn swapped_arguments_fail_the_case() {
        let fixture = set(
            r#"{"name":"args","raw":0,"arg1":7,"arg2":1,"arg3":9,"expected_return":0,"expected_errno":0}"#,
        );
        let r = run_case(&fixture.cases[0], 128, |case| SwappedArgs(script_for(case)));
        assert!(!r.passed);
        assert_eq!(r.actual_return, 0, "translation itself is unaffected");
        assert_eq!(
            r.notes,
            vec!["mechanism saw arguments (9, 1, 7), expected (7, 1, 9)".to_string()]
        );
    }

    #[test]
    fn matching_arguments_pass() {
        let fixture = set(
            r#"{"name":"args","raw":3,"arg1":-4,"arg2":6,"arg3":12,"expected_return":3,"expected_errno":0}"#,
        );
        let r = run_case(&fixture.cases[0], 128, script_for);
        assert!(r.passed, "{:?}", r.notes);
    }

    #[test]
    fn silent_mechanism_fails_the_case() {
        struct Silent;

        impl Trap for Silent {
            fn trap(&mut self, _: u32, _: i32, _: &mut i32, _: i32) -> i32 {
                0
            }
        }

        impl Recording for Silent {
            fn first_call(&self) -> Option<RecordedCall> {
                None
            }
        }

        let fixture = set(r#"{"name":"quiet","raw":0,"expected_return":0,"expected_errno":0}"#);
        let r = run_case(&fixture.cases[0], 128, |_| Silent);
        assert!(!r.passed);
        assert_eq!(r.notes, vec!["mechanism was never called".to_string()]);
    }
}
