// vim: tw=80
//! Query surface for mock objects.

use std::sync::Arc;

use crate::{
    error::NotAMock,
    invocation::Invocation,
    session::{Mock, Session},
    settings::MockCreationSettings,
    stubbing::Stubbing,
    value::Inspect
};

/// Provides information about an object that may or may not be a mock.
///
/// Obtained from [`Session::mocking_details`].  Every collection returned is
/// a fresh copy: modifying it has no effect on the mock.
///
/// # Examples
/// ```
/// # use mockit::*;
/// struct Foo;
/// let session = Session::new();
/// let mock = session.mock_of::<Foo>();
/// assert!(session.mocking_details(Some(&mock)).is_mock());
/// assert!(!session.mocking_details(Some(&"not a mock")).is_mock());
/// assert!(!session.mocking_details(None).is_mock());
/// ```
pub struct MockingDetails<'a> {
    session: &'a Session,
    obj: Option<&'a dyn Inspect>
}

impl<'a> MockingDetails<'a> {
    pub(crate) fn new(session: &'a Session, obj: Option<&'a dyn Inspect>)
        -> Self
    {
        MockingDetails{session, obj}
    }

    fn mock(&self) -> Result<&'a Mock, NotAMock> {
        let obj = self.obj.ok_or(NotAMock::Null)?;
        obj.downcast_ref::<Mock>()
            .ok()
            .filter(|mock| self.session.tracks(mock))
            .ok_or_else(|| NotAMock::Instance(obj.runtime_type()))
    }

    /// Is the object a mock (or a spy) of this session?  False for null.
    pub fn is_mock(&self) -> bool {
        self.mock().is_ok()
    }

    /// Is the object a mock wrapping a real instance?  False for null.
    pub fn is_spy(&self) -> bool {
        self.mock()
            .map_or(false, |m| m.settings().is_spy())
    }

    /// All invocations of the mock, oldest first.
    pub fn invocations(&self) -> Result<Vec<Arc<Invocation>>, NotAMock> {
        Ok(self.mock()?.invocations())
    }

    pub fn mock_creation_settings(&self)
        -> Result<Arc<MockCreationSettings>, NotAMock>
    {
        Ok(self.mock()?.settings().clone())
    }

    /// The stubbings of the mock, in registration order.
    pub fn stubbings(&self) -> Result<Vec<Arc<Stubbing>>, NotAMock> {
        Ok(self.mock()?.stubbings())
    }
}
