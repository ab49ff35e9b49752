// vim: tw=80
//! Verification of recorded invocations.
//!
//! Verifications work on snapshots of the histories of the mocks involved;
//! calls made while a verification runs are not seen by it.
//!
//! Invocations counted by an `only` verification or by an [`InOrder`] chain
//! are *consumed*: no later verification of any kind counts them again.

use std::{
    fmt,
    ops::RangeInclusive,
    sync::Arc
};
use thiserror::Error;
use tracing::debug;

use crate::{
    error::{Error, Result},
    invocation::{Invocation, VerificationId},
    matcher::InvocationMatcher,
    session::Mock
};

/// The allowed number of matching invocations.
///
/// An upper bound of `usize::MAX` means unbounded.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Times {
    range: RangeInclusive<usize>
}

impl Times {
    pub fn exactly(n: usize) -> Self {
        Times{range: n..=n}
    }

    pub fn at_least(n: usize) -> Self {
        Times{range: n..=usize::MAX}
    }

    pub fn at_most(n: usize) -> Self {
        Times{range: 0..=n}
    }

    pub fn never() -> Self {
        Self::exactly(0)
    }

    pub fn is_satisfied_by(&self, count: usize) -> bool {
        self.range.contains(&count)
    }

    /// Is an exact number of invocations required?
    pub fn is_exact(&self) -> bool {
        self.range.start() == self.range.end()
    }

    pub fn is_never(&self) -> bool {
        self.range == (0..=0)
    }

    /// Fewest invocations allowed
    pub fn min(&self) -> usize {
        *self.range.start()
    }

    /// Most invocations allowed
    pub fn max(&self) -> usize {
        *self.range.end()
    }
}

fn pluralize(n: usize) -> String {
    if n == 1 {
        "1 time".to_string()
    } else {
        format!("{} times", n)
    }
}

impl fmt::Display for Times {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_exact() {
            f.write_str(&pluralize(self.min()))
        } else if self.max() == usize::MAX {
            write!(f, "*at least* {}", pluralize(self.min()))
        } else if self.min() == 0 {
            write!(f, "*at most* {}", pluralize(self.max()))
        } else {
            write!(f, "between {} and {} times", self.min(), self.max())
        }
    }
}

/// How many matching invocations a verification requires, and whether they
/// must be the only ones.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VerificationMode {
    times: Times,
    only: bool
}

impl VerificationMode {
    pub fn times(&self) -> &Times {
        &self.times
    }

    pub fn is_only(&self) -> bool {
        self.only
    }

    /// Additionally require that the verified mocks have no other, unmatched,
    /// invocations.
    pub fn and_only(mut self) -> Self {
        self.only = true;
        self
    }
}

impl From<Times> for VerificationMode {
    fn from(times: Times) -> Self {
        VerificationMode{times, only: false}
    }
}

pub fn times(n: usize) -> VerificationMode {
    Times::exactly(n).into()
}

/// Alias for `times(0)`.
pub fn never() -> VerificationMode {
    Times::never().into()
}

pub fn at_least(n: usize) -> VerificationMode {
    Times::at_least(n).into()
}

pub fn at_least_once() -> VerificationMode {
    at_least(1)
}

pub fn at_most(n: usize) -> VerificationMode {
    Times::at_most(n).into()
}

pub fn at_most_once() -> VerificationMode {
    at_most(1)
}

/// Exactly one matching invocation, and nothing else.
pub fn only() -> VerificationMode {
    times(1).and_only()
}

/// What kind of mismatch a [`VerificationFailure`] reports.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FailureKind {
    TooFew,
    TooMany,
    WrongOrder,
    /// Invocations that should not exist: a `never` or `only` violation, or
    /// unverified interactions.
    UnexpectedOccurrence,
}

/// A verification was not satisfied.
#[derive(Clone, Debug, Error)]
#[error("{message}")]
pub struct VerificationFailure {
    kind: FailureKind,
    expected: Times,
    actual: usize,
    wanted: String,
    nearby: Vec<String>,
    message: String
}

impl VerificationFailure {
    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    /// The bound that was not met
    pub fn expected(&self) -> &Times {
        &self.expected
    }

    /// How many matching invocations there were
    pub fn actual(&self) -> usize {
        self.actual
    }

    /// The wanted invocation, rendered
    pub fn wanted(&self) -> &str {
        &self.wanted
    }

    /// The invocations relevant to the failure, rendered
    pub fn nearby(&self) -> &[String] {
        &self.nearby
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Builds a [`VerificationFailure`] and renders its message.
struct Failure {
    kind: FailureKind,
    expected: Times,
    actual: usize,
    wanted: String,
    nearby: Vec<String>,
    in_order: bool
}

impl Failure {
    fn new(kind: FailureKind, expected: &Times, actual: usize, wanted: String)
        -> Self
    {
        Failure {
            kind,
            expected: expected.clone(),
            actual,
            wanted,
            nearby: Vec::new(),
            in_order: false
        }
    }

    fn nearby(mut self, nearby: Vec<String>) -> Self {
        self.nearby = nearby;
        self
    }

    fn in_order(mut self) -> Self {
        self.in_order = true;
        self
    }

    /// Render with a custom message.
    fn with_message(self, message: String) -> VerificationFailure {
        debug!(kind = ?self.kind, wanted = %self.wanted, actual = self.actual,
               "verification failed");
        VerificationFailure {
            kind: self.kind,
            expected: self.expected,
            actual: self.actual,
            wanted: self.wanted,
            nearby: self.nearby,
            message
        }
    }

    fn build(self) -> VerificationFailure {
        let mut lines = Vec::new();
        if self.in_order {
            lines.push("Verification in order failure".to_string());
        }
        match self.kind {
            FailureKind::TooFew if self.actual == 0 => {
                lines.push("Wanted but not invoked:".to_string());
                lines.push(self.wanted.clone());
                if self.nearby.is_empty() {
                    lines.push("Actually, there were zero interactions with \
                               this mock.".to_string());
                } else {
                    lines.push("However, there were other interactions with \
                               this mock:".to_string());
                    lines.extend(self.nearby.iter().cloned());
                }
            },
            FailureKind::TooFew | FailureKind::TooMany => {
                lines.push(self.wanted.clone());
                lines.push(format!("Wanted {}", self.expected));
                lines.push(format!("But was {}:", pluralize(self.actual)));
                lines.extend(self.nearby.iter().cloned());
            },
            FailureKind::UnexpectedOccurrence => {
                lines.push(self.wanted.clone());
                lines.push(format!("Never wanted but invoked {}:",
                                   pluralize(self.actual)));
                lines.extend(self.nearby.iter().cloned());
            },
            FailureKind::WrongOrder => {
                lines.push("Wanted but not invoked:".to_string());
                lines.push(self.wanted.clone());
                lines.push("Wanted anywhere AFTER following interaction:"
                           .to_string());
                lines.extend(self.nearby.iter().cloned());
            }
        }
        let message = lines.join("\n");
        self.with_message(message)
    }
}

/// Render invocations, explaining argument mismatches of calls to the wanted
/// method.
fn describe(invocations: &[Arc<Invocation>], wanted: Option<&InvocationMatcher>)
    -> Vec<String>
{
    invocations.iter()
        .map(|inv| {
            let mut s = inv.to_string();
            if let Some(w) = wanted {
                for m in w.mismatches(inv) {
                    for line in m.lines() {
                        s.push_str("\n    ");
                        s.push_str(line);
                    }
                }
            }
            s
        }).collect()
}

fn names(mocks: &[&Mock]) -> String {
    mocks.iter()
        .map(|m| m.name())
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_wanted(mocks: &[&Mock], wanted: &InvocationMatcher) -> String {
    let name = match mocks {
        [m] => m.name().to_string(),
        _ => format!("{{{}}}", names(mocks))
    };
    let rendered = wanted.display_for(&name).to_string();
    rendered
}

/// Unconsumed invocations of `mocks`, in call order.
fn snapshot(mocks: &[&Mock]) -> Vec<Arc<Invocation>> {
    let mut history: Vec<_> = mocks.iter()
        .flat_map(|m| m.invocations())
        .filter(|i| !i.is_consumed())
        .collect();
    history.sort_by_key(|i| i.sequence_number());
    history
}

fn accept(matched: &[Arc<Invocation>], wanted: &InvocationMatcher,
          consumer: Option<VerificationId>)
{
    for inv in matched {
        wanted.capture_arguments(inv);
        match consumer {
            Some(id) => inv.consume(id),
            None => inv.mark_verified()
        }
    }
}

/// Check the unmatched part of a history for an `only` verification.
fn check_only(mocks: &[&Mock], history: &[Arc<Invocation>],
              wanted: &InvocationMatcher, mode: &VerificationMode)
    -> Result<(), VerificationFailure>
{
    let unmatched: Vec<_> = history.iter()
        .filter(|i| !wanted.matches(i))
        .cloned()
        .collect();
    if unmatched.is_empty() {
        return Ok(());
    }
    let nearby = describe(&unmatched, None);
    let message = format!("No interactions wanted here, but found these on {}:\n{}",
                          names(mocks), nearby.join("\n"));
    let actual = history.len() - unmatched.len();
    Err(Failure::new(FailureKind::UnexpectedOccurrence, mode.times(), actual,
                     render_wanted(mocks, wanted))
        .nearby(nearby)
        .with_message(message))
}

/// Verify that the invocations of `mocks` matching `wanted` satisfy `mode`.
///
/// Counts across all of `mocks`.  On success the counted invocations are
/// marked verified, and capturing matchers of `wanted` record their
/// arguments.
///
/// # Examples
/// ```
/// # use mockit::*;
/// # use mockit::matcher::eq;
/// let session = Session::new();
/// let mock = session.mock_of::<String>();
/// let f = MethodSignature::new("f").param::<i32>();
/// mock.invoke(f.clone(), args![10i32]).unwrap();
///
/// let wanted = InvocationMatcher::new(f, vec![eq(10i32)]);
/// assert!(verify(&[&mock], &wanted, times(1)).is_ok());
/// assert!(verify(&[&mock], &wanted, never()).is_err());
/// ```
pub fn verify(mocks: &[&Mock], wanted: &InvocationMatcher,
              mode: VerificationMode) -> Result<(), VerificationFailure>
{
    let history = snapshot(mocks);
    let matched: Vec<_> = history.iter()
        .filter(|i| wanted.matches(i))
        .cloned()
        .collect();
    let count = matched.len();
    let times = mode.times();
    if !times.is_satisfied_by(count) {
        let rendered = render_wanted(mocks, wanted);
        let failure = if times.is_never() {
            Failure::new(FailureKind::UnexpectedOccurrence, times, count,
                         rendered)
                .nearby(describe(&matched, None))
        } else if count < times.min() {
            let nearby = if count == 0 { &history } else { &matched };
            Failure::new(FailureKind::TooFew, times, count, rendered)
                .nearby(describe(nearby, Some(wanted)))
        } else {
            Failure::new(FailureKind::TooMany, times, count, rendered)
                .nearby(describe(&matched, None))
        };
        return Err(failure.build());
    }
    if mode.is_only() {
        check_only(mocks, &history, wanted, &mode)?;
        let consumer = mocks.first()
            .map(|m| m.shared().next_verification_id());
        accept(&matched, wanted, consumer);
    } else {
        accept(&matched, wanted, None);
    }
    Ok(())
}

fn check_no_more(mocks: &[&Mock], unverified: Vec<Arc<Invocation>>)
    -> Result<(), VerificationFailure>
{
    if unverified.is_empty() {
        return Ok(());
    }
    let nearby = describe(&unverified, None);
    let message = format!("No interactions wanted here, but found these on {}:\n{}",
                          names(mocks), nearby.join("\n"));
    Err(Failure::new(FailureKind::UnexpectedOccurrence, &Times::never(),
                     unverified.len(), String::new())
        .nearby(nearby)
        .with_message(message))
}

/// Fail if any invocation of `mocks` has not been verified.
pub fn verify_no_more_interactions(mocks: &[&Mock])
    -> Result<(), VerificationFailure>
{
    let unverified = snapshot(mocks).into_iter()
        .filter(|i| !i.is_verified())
        .collect();
    check_no_more(mocks, unverified)
}

/// Fail if `mocks` were invoked at all.
pub fn verify_no_interactions(mocks: &[&Mock])
    -> Result<(), VerificationFailure>
{
    let all = mocks.iter()
        .flat_map(|m| m.invocations())
        .collect();
    check_no_more(mocks, all)
}

/// Verifies that invocations on a group of mocks happened in a given order.
///
/// Each step must be satisfied by invocations that happened after every
/// invocation counted by the previous steps.  Each invocation satisfies at
/// most one step.
///
/// # Examples
/// ```
/// # use mockit::*;
/// # use mockit::matcher::*;
/// let session = Session::new();
/// let first = session.mock_of::<String>();
/// let second = session.mock_of::<Vec<u8>>();
/// let f = MethodSignature::new("f");
/// second.invoke(f.clone(), args![]).unwrap();
/// first.invoke(f.clone(), args![]).unwrap();
///
/// let wanted = InvocationMatcher::new(f, vec![]);
/// let mut in_order = session.in_order(&[&first, &second]);
/// in_order.verify(&first, &wanted, times(1)).unwrap();
/// assert!(in_order.verify(&second, &wanted, times(1)).is_err());
/// ```
pub struct InOrder {
    id: VerificationId,
    mocks: Vec<Mock>,
    last: Option<Arc<Invocation>>
}

impl InOrder {
    pub(crate) fn new(id: VerificationId, mocks: &[&Mock]) -> Self {
        InOrder {
            id,
            mocks: mocks.iter().map(|&m| m.clone()).collect(),
            last: None
        }
    }

    fn mocks(&self) -> Vec<&Mock> {
        self.mocks.iter().collect()
    }

    fn after_last(&self, history: Vec<Arc<Invocation>>) -> Vec<Arc<Invocation>> {
        let last = self.last.as_ref().map(|l| l.sequence_number());
        history.into_iter()
            .filter(|i| last.map_or(true, |l| i.sequence_number() > l))
            .collect()
    }

    /// The first run of consecutive wanted invocations in `history`.
    fn first_chunk<F>(history: &[Arc<Invocation>], is_wanted: F)
        -> Vec<Arc<Invocation>>
        where F: Fn(&Invocation) -> bool
    {
        history.iter()
            .skip_while(|i| !is_wanted(&***i))
            .take_while(|i| is_wanted(&***i))
            .cloned()
            .collect()
    }

    /// Verify the next step of the chain.
    ///
    /// Only invocations after the previous step are considered. An exact
    /// count of any size is first tried against the first run of consecutive
    /// matching calls, so `f, f, g, f` passes `f` twice, then `g`, then `f`.
    /// Otherwise every later matching call is counted.
    pub fn verify(&mut self, mock: &Mock, wanted: &InvocationMatcher,
                  mode: VerificationMode) -> Result<()>
    {
        if !self.mocks.iter().any(|m| m.same_mock(mock)) {
            return Err(Error::NotInOrder(mock.name().to_string()));
        }
        let id = mock.id();
        let is_wanted = |i: &Invocation| i.mock() == id && wanted.matches(i);
        let group = self.mocks();
        let history = self.after_last(snapshot(&group));
        let times = mode.times();
        // An exact count may be met by the first run of matching calls,
        // leaving later matches for later steps.
        let chunk = Self::first_chunk(&history, &is_wanted);
        let matched: Vec<_> = if times.is_exact() && chunk.len() == times.min() {
            chunk
        } else {
            history.iter()
                .filter(|i| is_wanted(&***i))
                .cloned()
                .collect()
        };
        let count = matched.len();
        if !times.is_satisfied_by(count) {
            let rendered = render_wanted(&[mock], wanted);
            let last_seq = self.last.as_ref().map(|l| l.sequence_number());
            let earlier = snapshot(&group).into_iter()
                .filter(|i| last_seq.map_or(false, |l| i.sequence_number() <= l))
                .filter(|i| is_wanted(&**i))
                .count();
            let failure = match &self.last {
                Some(last) if count < times.min() && earlier > 0 &&
                    count + earlier >= times.min() =>
                {
                    Failure::new(FailureKind::WrongOrder, times, count,
                                 rendered)
                        .nearby(describe(&[last.clone()], None))
                },
                _ if times.is_never() =>
                    Failure::new(FailureKind::UnexpectedOccurrence, times,
                                 count, rendered)
                        .nearby(describe(&matched, None)),
                _ if count < times.min() => {
                    let own: Vec<_> = history.into_iter()
                        .filter(|i| i.mock() == id)
                        .collect();
                    Failure::new(FailureKind::TooFew, times, count, rendered)
                        .nearby(describe(&own, Some(wanted)))
                },
                _ =>
                    Failure::new(FailureKind::TooMany, times, count, rendered)
                        .nearby(describe(&matched, None))
            };
            return Err(failure.in_order().build().into());
        }
        if mode.is_only() {
            check_only(&[mock], &snapshot(&[mock]), wanted, &mode)?;
        }
        accept(&matched, wanted, Some(self.id));
        if let Some(newest) = matched.last() {
            self.last = Some(newest.clone());
        }
        Ok(())
    }

    /// Fail if any invocation of this group's mocks, after the last one
    /// verified in order, has not been verified.
    pub fn verify_no_more_interactions(&self) -> Result<(), VerificationFailure>
    {
        let group = self.mocks();
        let unverified = self.after_last(snapshot(&group)).into_iter()
            .filter(|i| !i.is_verified())
            .collect();
        check_no_more(&group, unverified)
    }
}

impl fmt::Debug for InOrder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("InOrder")
            .field("id", &self.id)
            .field("mocks", &self.mocks)
            .field("last", &self.last.as_ref().map(|l| l.sequence_number()))
            .finish()
    }
}
