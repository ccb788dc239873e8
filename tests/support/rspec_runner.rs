//! Runs `rspec` suites whose environment is a shared detection timeline.

use rspec::report::Report;
use rspec::{block::Suite, ConfigurationBuilder, Logger, Runner};
use std::sync::Arc;

/// Runs `suite` on one thread, in declaration order.
///
/// Every example runs even after a failure; the test then fails with the
/// number of failed examples.
pub fn run_serial<T>(suite: &Suite<T>)
where
    T: Clone + Send + Sync + std::fmt::Debug,
{
    let logger = Arc::new(Logger::new(std::io::stdout()));
    let config = ConfigurationBuilder::default()
        .parallel(false)
        .exit_on_failure(false)
        .build()
        .unwrap_or_else(|e| panic!("rspec configuration failed: {e}"));
    let report = Runner::new(config, vec![logger]).run(suite);
    assert!(
        report.is_success(),
        "{} of {} rspec examples failed",
        report.get_failed(),
        report.get_passed() + report.get_failed()
    );
}
