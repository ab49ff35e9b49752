// vim: tw=80
//! Answers produce the outcome of a matched invocation.

use fragile::Fragile;
use std::{
    borrow::Cow,
    fmt,
    sync::Arc
};
use thiserror::Error;

use crate::{
    invocation::Invocation,
    value::Value
};

/// The result of answering an invocation.
pub type Outcome = Result<Arc<dyn Value>, AnswerError>;

/// A configured failure, raised by an answer in place of a return value.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("{kind}: {message}")]
pub struct AnswerError {
    kind: Cow<'static, str>,
    message: String
}

impl AnswerError {
    /// The spied instance is missing, so real behavior can't be reached.
    pub const CANNOT_CALL_REAL_METHOD: &'static str = "CannotCallRealMethod";
    /// A single-threaded answer was invoked from another thread.
    pub const INVALID_THREAD_ACCESS: &'static str = "InvalidThreadAccess";
    /// An answer produced a value of the wrong type for its caller.
    pub const WRONG_TYPE_OF_RETURN_VALUE: &'static str =
        "WrongTypeOfReturnValue";

    pub fn new(kind: impl Into<Cow<'static, str>>, message: impl Into<String>)
        -> Self
    {
        AnswerError {
            kind: kind.into(),
            message: message.into()
        }
    }

    /// Name of the error type, like `IllegalStateException` or `io::Error`.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

type AnswerFn = dyn Fn(&Invocation) -> Outcome + Send + Sync;

/// The behavior of a stubbing.
pub enum Answer {
    /// Return a fixed value
    Returns(Arc<dyn Value>),
    /// Fail with a fixed error
    Throws(AnswerError),
    /// Compute the outcome from the invocation
    Computes(Box<AnswerFn>),
    /// Like `Computes`, for closures that are not `Send`.  Must be invoked on
    /// the thread that created it.
    ComputesSt(Fragile<Box<dyn Fn(&Invocation) -> Outcome>>),
    /// Pass the invocation through to the spied instance
    CallsRealMethod,
}

impl Answer {
    pub fn returns<T: Value>(t: T) -> Self {
        Answer::Returns(Arc::new(t))
    }

    pub fn throws(kind: impl Into<Cow<'static, str>>, message: impl Into<String>)
        -> Self
    {
        Answer::Throws(AnswerError::new(kind, message))
    }

    /// Supply a closure that computes the outcome.  The closure may call back
    /// into the mock that is being answered.
    pub fn computes<F>(f: F) -> Self
        where F: Fn(&Invocation) -> Outcome + Send + Sync + 'static
    {
        Answer::Computes(Box::new(f))
    }

    /// Single-threaded version of [`computes`](#method.computes).
    ///
    /// It is an error, reported as an [`AnswerError`] of kind
    /// [`INVALID_THREAD_ACCESS`](AnswerError::INVALID_THREAD_ACCESS), to
    /// answer from a different thread than the one that created it.  The
    /// last handle to the mock must also be dropped on that thread.
    pub fn computes_st<F>(f: F) -> Self
        where F: Fn(&Invocation) -> Outcome + 'static
    {
        Answer::ComputesSt(Fragile::new(Box::new(f)))
    }

    pub fn calls_real_method() -> Self {
        Answer::CallsRealMethod
    }

    /// Produce the outcome for `invocation`.
    ///
    /// `spied` is the real instance wrapped by the invoked mock, if any.
    pub fn execute(&self, invocation: &Invocation, spied: Option<&dyn RealObject>)
        -> Outcome
    {
        match self {
            Answer::Returns(v) => Ok(v.clone()),
            Answer::Throws(e) => Err(e.clone()),
            Answer::Computes(f) => f(invocation),
            Answer::ComputesSt(fragile) => {
                let f = fragile.try_get().map_err(|_| AnswerError::new(
                    AnswerError::INVALID_THREAD_ACCESS,
                    format!("{} was stubbed with a single-threaded answer on another thread",
                        invocation)))?;
                f(invocation)
            },
            Answer::CallsRealMethod => match spied {
                Some(real) => real.call_real(invocation),
                None => Err(AnswerError::new(
                    AnswerError::CANNOT_CALL_REAL_METHOD,
                    format!("{} has no real instance to call; \
                            only spies can call real methods", invocation)))
            }
        }
    }
}

/// Renders like `Returns: 1`
impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Answer::Returns(v) => write!(f, "Returns: {:?}", v),
            Answer::Throws(e) => write!(f, "Throws: {}", e),
            Answer::Computes(_) | Answer::ComputesSt(_) =>
                f.write_str("Computes: <closure>"),
            Answer::CallsRealMethod => f.write_str("CallsRealMethod"),
        }
    }
}

impl fmt::Debug for Answer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// The real object wrapped by a spy.
///
/// Implemented for closures taking the invocation.
pub trait RealObject: Send + Sync + 'static {
    fn call_real(&self, invocation: &Invocation) -> Outcome;
}

impl<F> RealObject for F
    where F: Fn(&Invocation) -> Outcome + Send + Sync + 'static
{
    fn call_real(&self, invocation: &Invocation) -> Outcome {
        self(invocation)
    }
}

/// How to answer invocations that no stubbing matches.
#[derive(Clone, Debug, Default)]
pub enum DefaultAnswer {
    /// Return the zero value of the method's return type
    #[default]
    ReturnsDefaults,
    /// Pass through to the spied instance
    CallsRealMethods,
    /// Use a custom answer
    Answer(Arc<Answer>),
}

impl DefaultAnswer {
    pub fn execute(&self, invocation: &Invocation, spied: Option<&dyn RealObject>)
        -> Outcome
    {
        match self {
            DefaultAnswer::ReturnsDefaults =>
                Ok(invocation.signature().default_return()),
            DefaultAnswer::CallsRealMethods =>
                Answer::CallsRealMethod.execute(invocation, spied),
            DefaultAnswer::Answer(a) => a.execute(invocation, spied)
        }
    }
}
