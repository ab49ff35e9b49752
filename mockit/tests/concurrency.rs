// vim: tw=80
//! Mocks shared between threads, and answers that call back into their mock.

use std::{
    collections::BTreeSet,
    sync::Arc,
    thread
};

use mockit::*;
use mockit::matcher::*;
use pretty_assertions::assert_eq;
use static_assertions::assert_impl_all;

assert_impl_all!(Mock: Clone, Send, Sync);
assert_impl_all!(Session: Send, Sync);
assert_impl_all!(Answer: Send, Sync);
assert_impl_all!(VerificationFailure: std::error::Error, Send, Sync);
assert_impl_all!(Error: std::error::Error, Send, Sync);

trait Foo {}

fn foo() -> MethodSignature {
    MethodSignature::new("foo")
        .param::<u32>()
        .returns::<u32>()
}

fn bar() -> MethodSignature {
    MethodSignature::new("bar").returns::<u32>()
}

const THREADS: u32 = 8;
const CALLS: u32 = 100;

#[test]
fn sequence_numbers_follow_history_order() {
    let session = Session::new();
    let mock = session.mock_of::<dyn Foo>();
    let handles = (0..THREADS).map(|t| {
        let m = mock.clone();
        thread::spawn(move || {
            for i in 0..CALLS {
                m.invoke(foo(), args![t * CALLS + i]).unwrap();
            }
        })
    }).collect::<Vec<_>>();
    for h in handles {
        h.join().unwrap();
    }

    let invocations = session.mocking_details(Some(&mock))
        .invocations()
        .unwrap();
    assert_eq!((THREADS * CALLS) as usize, invocations.len());
    for pair in invocations.windows(2) {
        assert!(pair[0].sequence_number() < pair[1].sequence_number());
    }
    let args = invocations.iter()
        .filter_map(|i| i.arg::<u32>(0).copied())
        .collect::<BTreeSet<_>>();
    assert_eq!((THREADS * CALLS) as usize, args.len());
    mock.verify(&InvocationMatcher::new(foo(), vec![any::<u32>()]),
                times((THREADS * CALLS) as usize))
        .unwrap();
}

/// Each answer of a stubbing is handed out exactly once, even when the calls
/// race.
#[test]
fn consecutive_answers_are_not_lost() {
    let session = Session::new();
    let mock = session.mock_of::<dyn Foo>();
    let answers = (0..THREADS).map(Answer::returns).collect::<Vec<_>>();
    mock.stub(InvocationMatcher::new(bar(), vec![]), answers).unwrap();
    let handles = (0..THREADS).map(|_| {
        let m = mock.clone();
        thread::spawn(move || m.call::<u32>(bar(), args![]).unwrap())
    }).collect::<Vec<_>>();
    let results = handles.into_iter()
        .map(|h| h.join().unwrap())
        .collect::<BTreeSet<_>>();
    assert_eq!((0..THREADS).collect::<BTreeSet<_>>(), results);
}

#[test]
fn reentrant_answer() {
    let session = Session::new();
    let mock = session.mock_of::<dyn Foo>();
    mock.stub(InvocationMatcher::new(bar(), vec![]), [Answer::returns(41u32)])
        .unwrap();
    let m = mock.clone();
    mock.stub(InvocationMatcher::new(foo(), vec![any::<u32>()]),
              [Answer::computes(move |_| {
                  let x = m.call::<u32>(bar(), args![])?;
                  Ok(value(x + 1))
              })])
        .unwrap();
    assert_eq!(Ok(42), mock.call::<u32>(foo(), args![0u32]));

    let invocations = session.mocking_details(Some(&mock))
        .invocations()
        .unwrap();
    let names = invocations.iter()
        .map(|i| i.method_name())
        .collect::<Vec<_>>();
    // The outer call was recorded before its answer ran
    assert_eq!(vec!["foo", "bar"], names);
    mock.reset();
}

#[test]
fn shared_counter() {
    let counter = Arc::new(SequenceCounter::starting_at(100));
    let s1 = Session::with_counter(SessionConfig::default(), counter.clone());
    let s2 = Session::with_counter(SessionConfig::default(), counter.clone());
    let a = s1.mock_of::<dyn Foo>();
    let b = s2.mock_of::<dyn Foo>();
    a.invoke(bar(), args![]).unwrap();
    b.invoke(bar(), args![]).unwrap();
    a.invoke(bar(), args![]).unwrap();

    let seqs = |s: &Session, m: &Mock| {
        s.mocking_details(Some(m))
            .invocations()
            .unwrap()
            .iter()
            .map(|i| i.sequence_number())
            .collect::<Vec<_>>()
    };
    assert_eq!(vec![100, 102], seqs(&s1, &a));
    assert_eq!(vec![101], seqs(&s2, &b));
    assert_eq!(103, counter.peek());
}

#[test]
fn first_sequence() {
    let session = Session::with_config(SessionConfig::default()
                                       .first_sequence(7));
    let mock = session.mock_of::<dyn Foo>();
    mock.invoke(bar(), args![]).unwrap();
    assert_eq!(8, session.counter().peek());
    let invocations = session.mocking_details(Some(&mock))
        .invocations()
        .unwrap();
    assert_eq!(7, invocations[0].sequence_number());
}

#[test]
fn verify_while_invoking() {
    let session = Session::new();
    let mock = session.mock_of::<dyn Foo>();
    let m = mock.clone();
    let h = thread::spawn(move || {
        for i in 0..CALLS {
            m.invoke(foo(), args![i]).unwrap();
        }
    });
    let wanted = InvocationMatcher::new(foo(), vec![any::<u32>()]);
    while mock.verify(&wanted, times(CALLS as usize)).is_err() {
        mock.verify(&wanted, at_most(CALLS as usize)).unwrap();
        thread::yield_now();
    }
    h.join().unwrap();
}
