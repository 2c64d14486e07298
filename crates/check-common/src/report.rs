//! Labeled sub-check aggregation.
//!
//! Checks whose subject is a runtime-discovered collection (for example
//! the set of running containers) evaluate each element as an
//! independently labeled sub-check. One element's failure must not
//! suppress evaluation or reporting of the others, so failures are
//! collected and reported together when the check finishes.

use std::fmt;

#[derive(Debug)]
struct Failure {
    label: String,
    message: String,
}

/// Collector for independently labeled assertions within one logical check.
#[derive(Debug)]
pub struct SubChecks {
    check: String,
    passed: usize,
    failures: Vec<Failure>,
}

impl SubChecks {
    /// Start collecting sub-checks for the named check.
    pub fn new(check: impl Into<String>) -> Self {
        Self {
            check: check.into(),
            passed: 0,
            failures: Vec::new(),
        }
    }

    /// Record the outcome of one labeled sub-check.
    ///
    /// `Err` carries the diagnostic for that element; recording it does
    /// not short-circuit the remaining elements.
    pub fn check(&mut self, label: impl Into<String>, result: Result<(), String>) {
        match result {
            Ok(()) => self.passed += 1,
            Err(message) => self.failures.push(Failure {
                label: label.into(),
                message,
            }),
        }
    }

    /// Number of sub-checks that passed so far.
    pub fn passed(&self) -> usize {
        self.passed
    }

    /// Finish the check.
    ///
    /// Returns `Ok` iff no sub-check failed; otherwise an error listing
    /// every failed label with its diagnostic.
    pub fn finish(self) -> Result<(), SubCheckFailures> {
        if self.failures.is_empty() {
            Ok(())
        } else {
            Err(SubCheckFailures {
                check: self.check,
                passed: self.passed,
                failures: self.failures,
            })
        }
    }
}

/// Aggregated failure report for a check with labeled sub-checks.
#[derive(Debug)]
pub struct SubCheckFailures {
    check: String,
    passed: usize,
    failures: Vec<Failure>,
}

impl SubCheckFailures {
    /// Labels of the failed sub-checks, in evaluation order.
    pub fn failed_labels(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.label.as_str()).collect()
    }
}

impl fmt::Display for SubCheckFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {} of {} sub-checks failed",
            self.check,
            self.failures.len(),
            self.failures.len() + self.passed
        )?;
        for failure in &self.failures {
            writeln!(f, "  {}: {}", failure.label, failure.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for SubCheckFailures {}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn all_passing_finishes_ok() {
        let mut subchecks = SubChecks::new("containers");
        subchecks.check("container=one", Ok(()));
        subchecks.check("container=two", Ok(()));
        assert_eq!(subchecks.passed(), 2);
        assert!(subchecks.finish().is_ok());
    }

    #[test]
    fn one_failure_does_not_suppress_later_elements() {
        let mut subchecks = SubChecks::new("containers");
        subchecks.check("container=one", Err("not running".to_string()));
        subchecks.check("container=two", Ok(()));
        subchecks.check("container=three", Err("dead".to_string()));

        let failures = subchecks.finish().unwrap_err();
        assert_eq!(
            failures.failed_labels(),
            vec!["container=one", "container=three"]
        );
    }

    #[test]
    fn report_names_each_failed_label_with_its_diagnostic() {
        let mut subchecks = SubChecks::new("networks");
        subchecks.check("network=good", Ok(()));
        subchecks.check("network=bridge", Err("uses the bridge driver".to_string()));

        let report = subchecks.finish().unwrap_err().to_string();
        assert!(report.contains("networks: 1 of 2 sub-checks failed"));
        assert!(report.contains("network=bridge: uses the bridge driver"));
        assert!(!report.contains("network=good:"));
    }
}
