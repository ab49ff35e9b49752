// vim: tw=80
//! Method signatures and recorded invocations.

use std::{
    borrow::Cow,
    collections::BTreeSet,
    fmt,
    sync::{
        Arc,
        Mutex,
        OnceLock,
        PoisonError,
        atomic::{AtomicBool, Ordering}
    }
};

use crate::value::{TypeInfo, Value};

/// Identity of a mock within its [`Session`](crate::Session).
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct MockId(pub(crate) u64);

impl fmt::Display for MockId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "mock#{}", self.0)
    }
}

/// Identity of a verification context that may exclusively consume
/// invocations: an [`InOrder`](crate::InOrder) chain or an `only` check.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct VerificationId(pub(crate) u64);

/// Produces the type-appropriate zero value of a method's return type.
type ZeroFn = fn() -> Arc<dyn Value>;

fn unit() -> Arc<dyn Value> {
    Arc::new(())
}

fn zero<T: Value + Default>() -> Arc<dyn Value> {
    Arc::new(T::default())
}

/// Identifies a mocked method.
///
/// Two signatures denote the same method iff they have the same name and the
/// same parameter types.  The return type only determines the value returned
/// by the [`ReturnsDefaults`](crate::DefaultAnswer::ReturnsDefaults) policy.
#[derive(Clone)]
pub struct MethodSignature {
    name: Cow<'static, str>,
    params: Vec<TypeInfo>,
    returns: TypeInfo,
    zero: ZeroFn
}

impl MethodSignature {
    /// A method with no parameters that returns `()`.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        MethodSignature {
            name: name.into(),
            params: Vec::new(),
            returns: TypeInfo::of::<()>(),
            zero: unit
        }
    }

    /// Append a parameter of type `T`.
    pub fn param<T: ?Sized + 'static>(mut self) -> Self {
        self.params.push(TypeInfo::of::<T>());
        self
    }

    /// Set the return type.  Unstubbed calls return `T::default()`.
    pub fn returns<T: Value + Default>(mut self) -> Self {
        self.returns = TypeInfo::of::<T>();
        self.zero = zero::<T>;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[TypeInfo] {
        &self.params
    }

    pub fn return_type(&self) -> TypeInfo {
        self.returns
    }

    /// The type-appropriate zero value of the return type.
    pub fn default_return(&self) -> Arc<dyn Value> {
        (self.zero)()
    }
}

impl PartialEq for MethodSignature {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.params == other.params
    }
}

impl Eq for MethodSignature {}

impl fmt::Debug for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(p.simple_name())?;
        }
        write!(f, ") -> {}", self.returns.simple_name())
    }
}

/// The stubbing bound to an invocation at call time.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StubbedBy {
    /// Registration index of the matching stubbing
    pub index: usize,
}

/// One recorded call on a mock.
///
/// Everything but the bound stubbing and the verification markers is fixed
/// when the invocation is recorded.
pub struct Invocation {
    mock: MockId,
    mock_name: Arc<str>,
    signature: MethodSignature,
    args: Vec<Arc<dyn Value>>,
    seq: u64,
    stubbed_by: OnceLock<StubbedBy>,
    verified: AtomicBool,
    consumed_by: Mutex<BTreeSet<VerificationId>>
}

impl Invocation {
    pub(crate) fn new(
        mock: MockId,
        mock_name: Arc<str>,
        signature: MethodSignature,
        args: Vec<Arc<dyn Value>>,
        seq: u64) -> Self
    {
        Invocation {
            mock,
            mock_name,
            signature,
            args,
            seq,
            stubbed_by: OnceLock::new(),
            verified: AtomicBool::new(false),
            consumed_by: Mutex::new(BTreeSet::new())
        }
    }

    pub fn mock(&self) -> MockId {
        self.mock
    }

    pub fn mock_name(&self) -> &str {
        &self.mock_name
    }

    pub fn signature(&self) -> &MethodSignature {
        &self.signature
    }

    pub fn method_name(&self) -> &str {
        self.signature.name()
    }

    pub fn args(&self) -> &[Arc<dyn Value>] {
        &self.args
    }

    /// Typed access to the `i`th argument.
    pub fn arg<T: Value>(&self, i: usize) -> Option<&T> {
        self.args.get(i)
            .and_then(|a| a.downcast_ref::<T>().ok())
    }

    /// Position of this call among all calls recorded in its session.
    pub fn sequence_number(&self) -> u64 {
        self.seq
    }

    /// The stubbing that answered this call, if any.
    pub fn stubbed_by(&self) -> Option<StubbedBy> {
        self.stubbed_by.get().copied()
    }

    pub(crate) fn bind_stubbing(&self, index: usize) {
        // The binding is decided once and never re-evaluated
        let _ = self.stubbed_by.set(StubbedBy{index});
    }

    /// Has any verification accounted for this call?
    pub fn is_verified(&self) -> bool {
        self.verified.load(Ordering::Relaxed)
    }

    pub(crate) fn mark_verified(&self) {
        self.verified.store(true, Ordering::Relaxed);
    }

    /// Has an `only` or in-order verification exclusively consumed this call?
    pub fn is_consumed(&self) -> bool {
        !self.consumed_by
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    pub(crate) fn consume(&self, by: VerificationId) {
        self.consumed_by
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(by);
        self.mark_verified();
    }

    /// Whether this invocation has the same method identity as `signature`.
    pub fn is_call_to(&self, signature: &MethodSignature) -> bool {
        self.signature == *signature
    }
}

/// Renders like `mock.simpleMethod(10);`
impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}(", self.mock_name, self.signature.name())?;
        for (i, a) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{:?}", a)?;
        }
        f.write_str(");")
    }
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("mock", &self.mock)
            .field("call", &format_args!("{}", self))
            .field("seq", &self.seq)
            .field("stubbed_by", &self.stubbed_by())
            .finish()
    }
}
