use crate::bindings::Bindings;
use serde::Serialize;
use std::ffi::c_int;

#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    pub name: String,
    pub passed: bool,
    pub detail: String,
}

#[derive(Debug, Default, Serialize)]
pub struct Report {
    pub outcomes: Vec<CheckOutcome>,
}

impl Report {
    fn pass(&mut self, name: impl Into<String>, detail: impl Into<String>) {
        self.outcomes.push(CheckOutcome {
            name: name.into(),
            passed: true,
            detail: detail.into(),
        });
    }

    fn expect_eq(&mut self, name: impl Into<String>, got: c_int, want: c_int) {
        self.outcomes.push(CheckOutcome {
            name: name.into(),
            passed: got == want,
            detail: format!("returned {got}, expected {want}"),
        });
    }

    pub fn failures(&self) -> Vec<&CheckOutcome> {
        self.outcomes.iter().filter(|o| !o.passed).collect()
    }

    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.passed)
    }
}

/// Inputs checked against `int_foo_int`, paired with the expected result.
const INCREMENT_CASES: &[(c_int, c_int)] = &[(0, 1), (41, 42), (-1, 0)];

/// One pass over the benchmark loop body, followed by the increment cases.
/// The init shim is never called, only its presence is recorded.
pub fn run_checks(bindings: &Bindings) -> Report {
    let mut report = Report::default();

    // SAFETY: every pointer in `bindings` has the signature it is typed with,
    // and none of the stubs read their arguments.
    unsafe {
        (bindings.void_foo_void)();
        report.pass("void_foo_void()", "returned");

        report.expect_eq("int_foo_int(1)", (bindings.int_foo_int)(1), 2);

        (bindings.void_foo_int)(1);
        report.pass("void_foo_int(1)", "returned");

        (bindings.void_foo_int_int)(1, 2);
        report.pass("void_foo_int_int(1, 2)", "returned");

        (bindings.void_foo_int_int_int)(1, 2, 3);
        report.pass("void_foo_int_int_int(1, 2, 3)", "returned");

        (bindings.void_foo_int_int_int_int)(1, 2, 3, 4);
        report.pass("void_foo_int_int_int_int(1, 2, 3, 4)", "returned");

        (bindings.void_foo_constchar)(b"bytes\0".as_ptr().cast());
        report.pass("void_foo_constchar(b\"bytes\")", "returned");

        for &(input, want) in INCREMENT_CASES {
            report.expect_eq(
                format!("int_foo_int({input})"),
                (bindings.int_foo_int)(input),
                want,
            );
        }
    }

    // Recorded by address only; the benchmark never calls the shim.
    let shim = bindings.init_shim as usize;
    report.outcomes.push(CheckOutcome {
        name: "PyInit_cmodule".to_string(),
        passed: shim != 0,
        detail: format!("resolved at {shim:#x}, not called"),
    });
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::tests::in_process;

    extern "C" fn identity(a: c_int) -> c_int {
        a
    }

    #[test]
    fn test_fixture_passes() {
        let report = run_checks(&in_process());
        assert!(report.is_success(), "{:?}", report.failures());
        assert!(report.failures().is_empty());
    }

    #[test]
    fn test_covers_call_sequence_and_increment_cases() {
        let report = run_checks(&in_process());
        // Seven stub calls, three extra increment cases, one shim entry.
        assert_eq!(report.outcomes.len(), 7 + INCREMENT_CASES.len() + 1);

        let names: Vec<&str> = report.outcomes.iter().map(|o| o.name.as_str()).collect();
        assert!(names.contains(&"int_foo_int(41)"));
        assert!(names.contains(&"int_foo_int(-1)"));
        assert_eq!(names.last(), Some(&"PyInit_cmodule"));
    }

    #[test]
    fn test_init_shim_recorded_but_not_called() {
        let report = run_checks(&in_process());
        let shim = report.outcomes.last().unwrap();
        assert!(shim.passed);
        assert!(shim.detail.starts_with("resolved at 0x"), "{}", shim.detail);
        assert!(shim.detail.ends_with("not called"));
    }

    #[test]
    fn test_wrong_increment_is_reported() {
        let mut bindings = in_process();
        bindings.int_foo_int = identity;

        let report = run_checks(&bindings);
        assert!(!report.is_success());

        let failed: Vec<&str> = report.failures().iter().map(|o| o.name.as_str()).collect();
        assert_eq!(
            failed,
            vec!["int_foo_int(1)", "int_foo_int(0)", "int_foo_int(41)", "int_foo_int(-1)"]
        );
        assert_eq!(report.failures()[0].detail, "returned 1, expected 2");
    }

    #[test]
    fn test_report_serializes() {
        let report = run_checks(&in_process());
        let json = serde_json::to_value(&report).unwrap();
        let outcomes = json["outcomes"].as_array().unwrap();
        assert_eq!(outcomes[1]["name"], "int_foo_int(1)");
        assert_eq!(outcomes[1]["passed"], true);
    }
}
