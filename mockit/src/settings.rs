// vim: tw=80
//! Mock creation settings.

use std::{
    fmt,
    sync::Arc
};

use crate::{
    answer::{DefaultAnswer, RealObject},
    value::TypeInfo
};

/// Everything fixed about a mock when it is created.
///
/// Immutable for the mock's lifetime.
pub struct MockCreationSettings {
    type_to_mock: TypeInfo,
    extra_interfaces: Vec<TypeInfo>,
    name: Arc<str>,
    default_answer: Option<DefaultAnswer>,
    spied_instance: Option<Arc<dyn RealObject>>,
    lenient: bool
}

impl MockCreationSettings {
    /// The exact type requested at creation.
    pub fn type_to_mock(&self) -> TypeInfo {
        self.type_to_mock
    }

    /// Additional types the mock stands in for.  Empty unless requested.
    pub fn extra_interfaces(&self) -> &[TypeInfo] {
        &self.extra_interfaces
    }

    /// Name used when rendering invocations and stubbings.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn shared_name(&self) -> Arc<str> {
        self.name.clone()
    }

    /// The policy for unstubbed calls, if one was chosen for this mock.  When
    /// `None` the session's default applies.
    pub fn default_answer(&self) -> Option<&DefaultAnswer> {
        self.default_answer.as_ref()
    }

    pub fn spied_instance(&self) -> Option<&dyn RealObject> {
        self.spied_instance.as_deref()
    }

    pub fn is_spy(&self) -> bool {
        self.spied_instance.is_some()
    }

    /// Lenient mocks are exempt from unused stubbing detection.
    pub fn is_lenient(&self) -> bool {
        self.lenient
    }
}

impl fmt::Debug for MockCreationSettings {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("MockCreationSettings")
            .field("type_to_mock", &self.type_to_mock)
            .field("extra_interfaces", &self.extra_interfaces)
            .field("name", &self.name)
            .field("default_answer", &self.default_answer)
            .field("spy", &self.is_spy())
            .field("lenient", &self.lenient)
            .finish()
    }
}

/// Builder for [`MockCreationSettings`].
///
/// # Examples
/// ```
/// # use mockit::*;
/// struct Foo;
/// trait Bar {}
/// let settings = MockSettings::of::<Foo>()
///     .name("foo")
///     .extra_interface::<dyn Bar>()
///     .build();
/// assert_eq!("foo", settings.name());
/// assert_eq!(1, settings.extra_interfaces().len());
/// ```
pub struct MockSettings {
    type_to_mock: TypeInfo,
    extra_interfaces: Vec<TypeInfo>,
    name: Option<String>,
    default_answer: Option<DefaultAnswer>,
    spied_instance: Option<Arc<dyn RealObject>>,
    lenient: bool
}

impl MockSettings {
    /// Settings for a mock of type `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        MockSettings {
            type_to_mock: TypeInfo::of::<T>(),
            extra_interfaces: Vec::new(),
            name: None,
            default_answer: None,
            spied_instance: None,
            lenient: false
        }
    }

    /// Also stand in for `T`.  Requesting the same type twice has no effect.
    pub fn extra_interface<T: ?Sized + 'static>(mut self) -> Self {
        let t = TypeInfo::of::<T>();
        if t != self.type_to_mock && !self.extra_interfaces.contains(&t) {
            self.extra_interfaces.push(t);
        }
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn default_answer(mut self, answer: DefaultAnswer) -> Self {
        self.default_answer = Some(answer);
        self
    }

    /// Wrap a real instance.  Unless another default answer is chosen,
    /// unstubbed calls pass through to it.
    pub fn spied_instance<R: RealObject>(mut self, real: R) -> Self {
        self.spied_instance = Some(Arc::new(real));
        self
    }

    pub fn lenient(mut self) -> Self {
        self.lenient = true;
        self
    }

    pub fn build(self) -> MockCreationSettings {
        let name = self.name
            .unwrap_or_else(|| default_name(self.type_to_mock));
        let default_answer = match (self.default_answer, &self.spied_instance) {
            (None, Some(_)) => Some(DefaultAnswer::CallsRealMethods),
            (a, _) => a
        };
        MockCreationSettings {
            type_to_mock: self.type_to_mock,
            extra_interfaces: self.extra_interfaces,
            name: name.into(),
            default_answer,
            spied_instance: self.spied_instance,
            lenient: self.lenient
        }
    }
}

/// The type's simple name with a lower case first letter: `IMethods` becomes
/// `iMethods`.
fn default_name(t: TypeInfo) -> String {
    let simple = t.simple_name()
        .trim_start_matches("dyn ");
    let mut chars = simple.chars();
    match chars.next() {
        Some(c) => c.to_lowercase().chain(chars).collect(),
        None => String::from("mock")
    }
}
