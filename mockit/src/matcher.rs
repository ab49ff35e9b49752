// vim: tw=80
//! Argument matchers.
//!
//! A [`Matcher`] tests one actual argument.  An [`InvocationMatcher`] combines
//! a method identity with one `Matcher` per argument, and is what stubbings
//! and verifications are expressed with.

use predicates::prelude::Predicate;
use predicates_tree::CaseTreeExt;
use std::{
    fmt,
    marker::PhantomData,
    sync::{Arc, Mutex, PoisonError}
};

use crate::{
    invocation::{Invocation, MethodSignature},
    value::{Null, TypeInfo, Value}
};

/// A type-erased [`Predicate`] over a single argument.
///
/// Built by [`satisfies`] and [`function`].
pub trait ArgPredicate: fmt::Display + Send + Sync {
    fn eval(&self, arg: &dyn Value) -> bool;

    /// Describe why `arg` fails this predicate, as a case tree.
    fn explain(&self, arg: &dyn Value) -> Option<String>;
}

struct Typed<T, P> {
    pred: P,
    _t: PhantomData<fn(&T)>
}

impl<T, P> fmt::Display for Typed<T, P>
    where P: Predicate<T>
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.pred, f)
    }
}

impl<T, P> ArgPredicate for Typed<T, P>
    where T: Value, P: Predicate<T> + Send + Sync
{
    fn eval(&self, arg: &dyn Value) -> bool {
        arg.downcast_ref::<T>()
            .map_or(false, |t| self.pred.eval(t))
    }

    fn explain(&self, arg: &dyn Value) -> Option<String> {
        let t = arg.downcast_ref::<T>().ok()?;
        self.pred.find_case(false, t)
            .map(|case| case.tree().to_string())
    }
}

/// A closure predicate, named for diagnostics.
struct Function<T, F> {
    f: F,
    name: &'static str,
    _t: PhantomData<fn(&T)>
}

impl<T, F> fmt::Display for Function<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}(var)", self.name)
    }
}

impl<T, F> ArgPredicate for Function<T, F>
    where T: Value, F: Fn(&T) -> bool + Send + Sync
{
    fn eval(&self, arg: &dyn Value) -> bool {
        arg.downcast_ref::<T>()
            .map_or(false, |t| (self.f)(t))
    }

    fn explain(&self, _arg: &dyn Value) -> Option<String> {
        None
    }
}

/// Storage shared by an [`ArgumentCaptor`] and the matchers it hands out.
type CaptureSlot = Arc<Mutex<Vec<Arc<dyn Value>>>>;

/// Predicate over one actual argument.
#[derive(Clone)]
pub enum Matcher {
    /// The argument equals this value.
    Eq(Arc<dyn Value>),
    /// Any argument.  With a type, only non-null arguments of exactly that
    /// type match.
    Any(Option<TypeInfo>),
    /// A custom predicate.
    Satisfies(Arc<dyn ArgPredicate>),
    IsNull,
    NotNull,
    /// Any argument of the given type, recorded when its invocation matches.
    Capture(TypeInfo, CaptureSlot),
}

impl Matcher {
    pub fn matches(&self, arg: &dyn Value) -> bool {
        match self {
            Matcher::Eq(v) => v.eq_value(arg),
            Matcher::Any(None) => true,
            Matcher::Any(Some(t)) | Matcher::Capture(t, _) =>
                arg.type_info() == *t,
            Matcher::Satisfies(p) => p.eval(arg),
            Matcher::IsNull => arg.is::<Null>(),
            Matcher::NotNull => !arg.is::<Null>(),
        }
    }

    /// Explain a mismatch, if this matcher can say more than its own
    /// description.
    pub fn explain(&self, arg: &dyn Value) -> Option<String> {
        match self {
            Matcher::Satisfies(p) => p.explain(arg),
            Matcher::Any(Some(t)) | Matcher::Capture(t, _) =>
                Some(format!("expected type {}, got {}", t, arg.type_info())),
            _ => None
        }
    }

    fn capture(&self, arg: &Arc<dyn Value>) {
        if let Matcher::Capture(_, slot) = self {
            slot.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(arg.clone());
        }
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Matcher::Eq(v) => write!(f, "{:?}", v),
            Matcher::Any(None) => f.write_str("<any>"),
            Matcher::Any(Some(t)) => write!(f, "<any {}>", t.simple_name()),
            Matcher::Satisfies(p) => write!(f, "<{}>", p),
            Matcher::IsNull => f.write_str("isNull()"),
            Matcher::NotNull => f.write_str("notNull()"),
            Matcher::Capture(t, _) =>
                write!(f, "<Capturing argument {}>", t.simple_name()),
        }
    }
}

/// Match an argument equal to `t`.
pub fn eq<T: Value>(t: T) -> Matcher {
    Matcher::Eq(Arc::new(t))
}

/// Match any non-null argument of type `T`.
pub fn any<T: Value>() -> Matcher {
    Matcher::Any(Some(TypeInfo::of::<T>()))
}

/// Match every argument, including [`Null`].
pub fn anything() -> Matcher {
    Matcher::Any(None)
}

pub fn is_null() -> Matcher {
    Matcher::IsNull
}

pub fn not_null() -> Matcher {
    Matcher::NotNull
}

/// Match arguments of type `T` satisfying a [`Predicate`].
///
/// # Examples
/// ```
/// # use mockit::*;
/// let m = matcher::satisfies::<i32, _>(predicate::gt(5));
/// assert!(m.matches(&7i32));
/// assert!(!m.matches(&3i32));
/// ```
pub fn satisfies<T, P>(pred: P) -> Matcher
    where T: Value, P: Predicate<T> + Send + Sync + 'static
{
    Matcher::Satisfies(Arc::new(Typed{pred, _t: PhantomData}))
}

/// Match arguments of type `T` for which `f` returns true.
pub fn function<T, F>(f: F) -> Matcher
    where T: Value, F: Fn(&T) -> bool + Send + Sync + 'static
{
    Matcher::Satisfies(Arc::new(Function{f, name: "fn", _t: PhantomData}))
}

/// Captures the arguments its matchers accept, for later inspection.
///
/// A capturing matcher accepts any non-null argument of type `T`.  The value
/// is recorded only when the whole invocation matches: when a stubbing using
/// it answers a call, or when a verification using it counts a call.
pub struct ArgumentCaptor<T> {
    slot: CaptureSlot,
    _t: PhantomData<fn() -> T>
}

impl<T: Value + Clone> ArgumentCaptor<T> {
    pub fn new() -> Self {
        ArgumentCaptor {
            slot: CaptureSlot::default(),
            _t: PhantomData
        }
    }

    /// A matcher that records into this captor.
    pub fn capture(&self) -> Matcher {
        Matcher::Capture(TypeInfo::of::<T>(), self.slot.clone())
    }

    /// All captured values, oldest first.
    pub fn values(&self) -> Vec<T> {
        self.slot.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter_map(|v| v.downcast_ref::<T>().ok().cloned())
            .collect()
    }

    /// The most recently captured value.
    pub fn value(&self) -> Option<T> {
        self.values().pop()
    }
}

impl<T: Value + Clone> Default for ArgumentCaptor<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Method identity plus one [`Matcher`] per argument.
#[derive(Clone)]
pub struct InvocationMatcher {
    signature: MethodSignature,
    args: Vec<Matcher>
}

impl InvocationMatcher {
    pub fn new(signature: MethodSignature, args: Vec<Matcher>) -> Self {
        InvocationMatcher{signature, args}
    }

    /// Match a call to `signature` whose arguments equal `args`.
    pub fn with_args(signature: MethodSignature, args: Vec<Arc<dyn Value>>)
        -> Self
    {
        let args = args.into_iter().map(Matcher::Eq).collect();
        InvocationMatcher{signature, args}
    }

    pub fn signature(&self) -> &MethodSignature {
        &self.signature
    }

    pub fn arg_matchers(&self) -> &[Matcher] {
        &self.args
    }

    pub fn matches(&self, invocation: &Invocation) -> bool {
        invocation.is_call_to(&self.signature) &&
            invocation.args().len() == self.args.len() &&
            self.args.iter()
                .zip(invocation.args())
                .all(|(m, a)| m.matches(&**a))
    }

    /// Record `invocation`'s arguments into any capturing matchers.
    pub(crate) fn capture_arguments(&self, invocation: &Invocation) {
        for (m, a) in self.args.iter().zip(invocation.args()) {
            m.capture(a);
        }
    }

    /// Describe each argument of `invocation` that this matcher rejects.
    /// Empty if the method identity differs.
    pub fn mismatches(&self, invocation: &Invocation) -> Vec<String> {
        if !invocation.is_call_to(&self.signature) {
            return Vec::new();
        }
        if invocation.args().len() != self.args.len() {
            return vec![format!("expected {} arguments, got {}",
                                self.args.len(), invocation.args().len())];
        }
        self.args.iter()
            .zip(invocation.args())
            .enumerate()
            .filter(|(_, (m, a))| !m.matches(&***a))
            .map(|(i, (m, a))| {
                let mut s = format!("argument {}: wanted {:?} but was {:?}",
                                    i, m, a);
                if let Some(why) = m.explain(&**a) {
                    s.push('\n');
                    s.push_str(&why);
                }
                s
            }).collect()
    }

    /// Render as an invocation of the mock named `mock_name`, like
    /// `mock.simpleMethod(<any i32>);`
    pub fn display_for<'a>(&'a self, mock_name: &'a str)
        -> impl fmt::Display + 'a
    {
        struct D<'a>(&'a InvocationMatcher, &'a str);
        impl fmt::Display for D<'_> {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}.{}(", self.1, self.0.signature.name())?;
                for (i, m) in self.0.args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{:?}", m)?;
                }
                f.write_str(");")
            }
        }
        D(self, mock_name)
    }
}

impl fmt::Debug for InvocationMatcher {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.display_for("_"))
    }
}
