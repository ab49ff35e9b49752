// vim: tw=80
//! Error types.

use thiserror::Error;

use crate::{
    answer::AnswerError,
    invocation::MockId,
    value::TypeInfo,
    verification::VerificationFailure
};

/// An object handed to [`MockingDetails`](crate::MockingDetails) is not a mock
/// of its session.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum NotAMock {
    #[error("Argument passed to mocking_details() should be a mock, but is null!")]
    Null,
    #[error("Argument passed to mocking_details() should be a mock, but is an instance of class {0}!")]
    Instance(TypeInfo),
}

/// Everything that can go wrong in the engine.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    NotAMock(#[from] NotAMock),

    #[error(transparent)]
    Verification(#[from] VerificationFailure),

    #[error(transparent)]
    Answer(#[from] AnswerError),

    /// A stubbing was registered without any answer.
    #[error("Unfinished stubbing detected: {0} needs at least one answer")]
    UnfinishedStubbing(String),

    /// An in-order verification named a mock outside its context.
    #[error("InOrder can only verify mocks that were passed in during creation of InOrder; {0} was not")]
    NotInOrder(String),

    /// No mock with this id exists in the session.
    #[error("No mock with id {0} exists in this session")]
    UnknownMock(MockId),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
