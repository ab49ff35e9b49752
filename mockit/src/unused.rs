// vim: tw=80
//! Detection of stubbings that were never used.

use std::{
    fmt,
    panic::Location
};
use tracing::warn;

use crate::{
    invocation::MockId,
    session::Mock
};

/// One stubbing that never answered an invocation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnusedStubbing {
    pub mock: MockId,
    pub mock_name: String,
    /// The stubbing, rendered like `mock.f(1); stubbed with: [Returns: 1]`
    pub stubbing: String,
    /// Where the stubbing was registered
    pub location: &'static Location<'static>
}

impl fmt::Display for UnusedStubbing {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "-> at {} ({})", self.location, self.stubbing)
    }
}

/// The unused stubbings of a session, ordered by mock creation and then by
/// registration.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct UnusedStubbingReport {
    entries: Vec<UnusedStubbing>
}

impl UnusedStubbingReport {
    pub fn entries(&self) -> &[UnusedStubbing] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl fmt::Display for UnusedStubbingReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Unnecessary stubbings detected.")?;
        for (i, e) in self.entries.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, e)?;
        }
        Ok(())
    }
}

impl IntoIterator for UnusedStubbingReport {
    type Item = UnusedStubbing;
    type IntoIter = std::vec::IntoIter<UnusedStubbing>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Receives the unused stubbing report at the end of a session.
///
/// Reporting is advisory.  Implementations must not panic.
pub trait UnusedStubbingReporter: Send + Sync + 'static {
    fn report(&self, report: &UnusedStubbingReport);
}

impl<F> UnusedStubbingReporter for F
    where F: Fn(&UnusedStubbingReport) + Send + Sync + 'static
{
    fn report(&self, report: &UnusedStubbingReport) {
        self(report)
    }
}

/// The default reporter: one warning per unused stubbing.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogReporter;

impl UnusedStubbingReporter for LogReporter {
    fn report(&self, report: &UnusedStubbingReport) {
        for e in report.entries() {
            warn!(mock = %e.mock, location = %e.location,
                  stubbing = %e.stubbing, "unused stubbing");
        }
    }
}

/// Scans mocks for stubbings that were never used.
pub struct UnusedStubbingDetector;

impl UnusedStubbingDetector {
    /// Report every stubbing of a non-lenient mock in `mocks` that has not
    /// answered any invocation.
    pub fn scan(mocks: &[Mock]) -> UnusedStubbingReport {
        let entries = mocks.iter()
            .filter(|m| !m.settings().is_lenient())
            .flat_map(|m| m.stubbings())
            .filter(|s| !s.was_used())
            .map(|s| UnusedStubbing {
                mock: s.mock(),
                mock_name: s.mock_name().to_string(),
                stubbing: s.to_string(),
                location: s.location()
            }).collect();
        UnusedStubbingReport{entries}
    }
}
