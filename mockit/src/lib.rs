// vim: tw=80
//! Invocation recording, stubbing resolution and verification for mock
//! objects.
//!
//! Mockit is the engine behind a mock object: it records every call made on
//! a mock, decides which configured behavior answers each call, checks that
//! calls happened the expected number of times and in the expected order, and
//! finds configured behaviors that were never used.
//!
//! Mockit does not generate mock types.  Whatever stands in for the real
//! object, be it a hand written struct or generated code, forwards each call
//! to a [`Mock`] handle as a method signature plus a list of arguments.
//!
//! # User Guide
//!
//! * [`Getting started`](#getting-started)
//! * [`Answers`](#answers)
//! * [`Matching arguments`](#matching-arguments)
//! * [`Verification`](#verification)
//! * [`Verification in order`](#verification-in-order)
//! * [`Spies`](#spies)
//! * [`Mocking details`](#mocking-details)
//! * [`Unused stubbings`](#unused-stubbings)
//! * [`Threads`](#threads)
//!
//! ## Getting Started
//! ```
//! use mockit::*;
//! use mockit::matcher::*;
//!
//! trait Calculator {
//!     fn add(&self, x: i32, y: i32) -> i32;
//! }
//!
//! struct MockCalculator(Mock);
//!
//! fn add_sig() -> MethodSignature {
//!     MethodSignature::new("add")
//!         .param::<i32>()
//!         .param::<i32>()
//!         .returns::<i32>()
//! }
//!
//! impl Calculator for MockCalculator {
//!     fn add(&self, x: i32, y: i32) -> i32 {
//!         self.0.call(add_sig(), args![x, y]).unwrap()
//!     }
//! }
//!
//! let session = Session::new();
//! let mock = MockCalculator(session.mock_of::<dyn Calculator>());
//! mock.0.stub(InvocationMatcher::new(add_sig(), vec![eq(2), any::<i32>()]),
//!             [Answer::returns(42i32)]).unwrap();
//!
//! assert_eq!(42, mock.add(2, 3));
//! // Unstubbed calls return the zero value of the return type
//! assert_eq!(0, mock.add(1, 1));
//!
//! let wanted = InvocationMatcher::new(add_sig(), vec![eq(2), eq(3)]);
//! mock.0.verify(&wanted, times(1)).unwrap();
//! ```
//!
//! ## Answers
//!
//! A stubbing has one or more [`Answer`]s.  Successive matching calls use
//! them in order, and the last one keeps answering after that.  An answer may
//! return a fixed value, fail with a fixed [`AnswerError`], compute its
//! outcome with a closure, or call the spied real object.
//!
//! ```
//! # use mockit::*;
//! let session = Session::new();
//! let mock = session.mock_of::<String>();
//! let len = MethodSignature::new("len").returns::<usize>();
//! mock.stub(InvocationMatcher::new(len.clone(), vec![]),
//!           [Answer::returns(1usize), Answer::throws("Overflow", "too long")])
//!     .unwrap();
//!
//! assert_eq!(Ok(1), mock.call::<usize>(len.clone(), args![]));
//! assert_eq!("Overflow: too long",
//!            mock.call::<usize>(len.clone(), args![]).unwrap_err().to_string());
//! assert!(mock.call::<usize>(len, args![]).is_err());
//! ```
//!
//! When several stubbings match the same call, the most recently registered
//! one wins, even if an older one still has answers left.
//!
//! ## Matching arguments
//!
//! Each argument of a stubbing or verification has a [`Matcher`]: equality
//! ([`matcher::eq`]), a typed wildcard ([`matcher::any`]), a wildcard for
//! anything including [`Null`] ([`matcher::anything`]), null checks, a
//! [`Predicate`] ([`matcher::satisfies`]), a closure ([`matcher::function`])
//! or an [`ArgumentCaptor`].
//!
//! ```
//! # use mockit::*;
//! # use mockit::matcher::*;
//! let session = Session::new();
//! let mock = session.mock_of::<String>();
//! let push = MethodSignature::new("push").param::<char>();
//! let captor = ArgumentCaptor::<char>::new();
//! mock.stub(InvocationMatcher::new(push.clone(), vec![captor.capture()]),
//!           [Answer::returns(())]).unwrap();
//!
//! mock.invoke(push.clone(), args!['a']).unwrap();
//! mock.invoke(push, args!['b']).unwrap();
//! assert_eq!(vec!['a', 'b'], captor.values());
//! ```
//!
//! ## Verification
//!
//! [`verify`] checks the number of matching invocations against a
//! [`VerificationMode`]: [`times`], [`never`], [`at_least`], [`at_most`] or
//! [`only`].  A failed verification returns a [`VerificationFailure`]
//! describing what was wanted and what happened instead.
//!
//! ```
//! # use mockit::*;
//! # use mockit::matcher::*;
//! let session = Session::new();
//! let mock = session.mock_of::<String>();
//! let clear = MethodSignature::new("clear");
//! mock.invoke(clear.clone(), args![]).unwrap();
//!
//! let wanted = InvocationMatcher::new(clear, vec![]);
//! let failure = mock.verify(&wanted, times(2)).unwrap_err();
//! assert_eq!(FailureKind::TooFew, failure.kind());
//! assert_eq!(1, failure.actual());
//! ```
//!
//! ## Verification in order
//!
//! Every invocation gets a sequence number from its session's
//! [`SequenceCounter`].  An [`InOrder`] uses them to check that invocations,
//! possibly on different mocks, happened in a given order.
//!
//! ## Spies
//!
//! A spy wraps a [`RealObject`].  Unstubbed calls on a spy pass through to
//! it.
//!
//! ```
//! # use mockit::*;
//! let session = Session::new();
//! let spy = session.spy::<String, _>(|inv: &Invocation| -> Outcome {
//!     Ok(value(format!("real {}", inv.method_name())))
//! });
//! let describe = MethodSignature::new("describe").returns::<String>();
//! assert_eq!(Ok("real describe".to_string()),
//!            spy.call::<String>(describe, args![]));
//! ```
//!
//! ## Mocking details
//!
//! [`Session::mocking_details`] tells whether an object is a mock or a spy,
//! and returns copies of a mock's invocations, settings and stubbings.
//!
//! ## Unused stubbings
//!
//! When a [`Session`] finishes, every stubbing that never answered a call is
//! reported once to the session's [`UnusedStubbingReporter`].  The default
//! reporter logs a warning through `tracing`.  Lenient mocks are not
//! reported.
//!
//! ## Threads
//!
//! A mock may be called from several threads at once.  Recording a call,
//! choosing its stubbing and advancing that stubbing's answers happen
//! atomically for each mock.  Answers run without holding the mock's lock, so
//! they may call back into the same mock.

pub mod answer;
pub mod details;
pub mod error;
pub mod invocation;
pub mod matcher;
mod recorder;
pub mod session;
pub mod settings;
pub mod stubbing;
pub mod unused;
pub mod value;
pub mod verification;

pub use predicates::prelude::{Predicate, predicate};

pub use crate::{
    answer::{Answer, AnswerError, DefaultAnswer, Outcome, RealObject},
    details::MockingDetails,
    error::{Error, NotAMock, Result},
    invocation::{Invocation, MethodSignature, MockId, StubbedBy},
    matcher::{ArgumentCaptor, InvocationMatcher, Matcher},
    recorder::SequenceCounter,
    session::{Mock, Session, SessionConfig},
    settings::{MockCreationSettings, MockSettings},
    stubbing::Stubbing,
    unused::{
        LogReporter,
        UnusedStubbing,
        UnusedStubbingDetector,
        UnusedStubbingReport,
        UnusedStubbingReporter
    },
    value::{Inspect, Null, TypeInfo, Value, value},
    verification::{
        FailureKind,
        InOrder,
        Times,
        VerificationFailure,
        VerificationMode,
        at_least,
        at_least_once,
        at_most,
        at_most_once,
        never,
        only,
        times,
        verify,
        verify_no_interactions,
        verify_no_more_interactions
    }
};
