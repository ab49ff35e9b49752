// vim: tw=80
//! Sessions and mock handles.

use std::{
    collections::BTreeMap,
    fmt,
    panic::Location,
    sync::{
        Arc,
        Mutex,
        MutexGuard,
        PoisonError,
        atomic::{AtomicBool, AtomicU64, Ordering}
    },
    thread
};
use tracing::debug;

use crate::{
    answer::{Answer, AnswerError, DefaultAnswer, Outcome, RealObject},
    details::MockingDetails,
    error::{Error, Result},
    invocation::{Invocation, MethodSignature, MockId, VerificationId},
    matcher::InvocationMatcher,
    recorder::{InvocationRecorder, SequenceCounter},
    settings::{MockCreationSettings, MockSettings},
    stubbing::{Stubbing, StubbingRegistry},
    unused::{LogReporter, UnusedStubbingDetector, UnusedStubbingReport,
             UnusedStubbingReporter},
    value::{Inspect, TypeInfo, Value},
    verification::{self, InOrder, VerificationFailure, VerificationMode}
};

/// Session-wide configuration.
///
/// # Examples
/// ```
/// # use mockit::*;
/// let config = SessionConfig::default()
///     .default_answer(DefaultAnswer::Answer(
///         std::sync::Arc::new(Answer::throws("Unstubbed", "no stubbing"))));
/// let session = Session::with_config(config);
/// ```
#[derive(Clone)]
pub struct SessionConfig {
    default_answer: DefaultAnswer,
    reporter: Arc<dyn UnusedStubbingReporter>,
    first_sequence: u64
}

impl SessionConfig {
    /// How to answer unstubbed calls on mocks that didn't choose a policy of
    /// their own.  [`ReturnsDefaults`](DefaultAnswer::ReturnsDefaults) unless
    /// set.
    pub fn default_answer(mut self, answer: DefaultAnswer) -> Self {
        self.default_answer = answer;
        self
    }

    /// Where to deliver the unused stubbing report when the session finishes.
    /// The default reporter logs a warning per unused stubbing.
    pub fn reporter<R: UnusedStubbingReporter>(mut self, reporter: R) -> Self {
        self.reporter = Arc::new(reporter);
        self
    }

    /// First sequence number handed out by the session.
    pub fn first_sequence(mut self, first: u64) -> Self {
        self.first_sequence = first;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            default_answer: DefaultAnswer::default(),
            reporter: Arc::new(LogReporter),
            first_sequence: 0
        }
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("default_answer", &self.default_answer)
            .field("first_sequence", &self.first_sequence)
            .finish_non_exhaustive()
    }
}

/// Mutable state of one mock, guarded by its lock.
struct MockInner {
    recorder: InvocationRecorder,
    registry: StubbingRegistry
}

pub(crate) struct MockState {
    id: MockId,
    settings: Arc<MockCreationSettings>,
    inner: Mutex<MockInner>
}

impl MockState {
    // Every critical section leaves the state consistent, so a panic while
    // holding the lock does not invalidate it.
    fn lock(&self) -> MutexGuard<'_, MockInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// State shared by a [`Session`] and all of its mocks.
pub(crate) struct Shared {
    counter: Arc<SequenceCounter>,
    config: SessionConfig,
    mocks: Mutex<BTreeMap<MockId, Arc<MockState>>>,
    next_mock: AtomicU64,
    next_verification: AtomicU64
}

impl Shared {
    pub(crate) fn next_verification_id(&self) -> VerificationId {
        VerificationId(self.next_verification.fetch_add(1, Ordering::Relaxed))
    }

    fn mocks(&self) -> MutexGuard<'_, BTreeMap<MockId, Arc<MockState>>> {
        self.mocks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle to a mock object.
///
/// This is what an interceptor, like a hand written or generated mock struct,
/// forwards its calls to.  Handles are cheap to clone; clones refer to the
/// same mock.
#[derive(Clone)]
pub struct Mock {
    state: Arc<MockState>,
    shared: Arc<Shared>
}

impl Mock {
    pub fn id(&self) -> MockId {
        self.state.id
    }

    pub fn name(&self) -> &str {
        self.state.settings.name()
    }

    pub fn settings(&self) -> &Arc<MockCreationSettings> {
        &self.state.settings
    }

    /// Handle an intercepted call.
    ///
    /// Recording the invocation, resolving its stubbing and advancing that
    /// stubbing's answers happen atomically with respect to other calls on
    /// this mock.  The answer itself runs after the mock's lock is released,
    /// so it may call back into the same mock.
    pub fn invoke(&self, signature: MethodSignature, args: Vec<Arc<dyn Value>>)
        -> Outcome
    {
        let (invocation, answer) = {
            let mut inner = self.state.lock();
            let invocation = inner.recorder.record(signature, args);
            let answer = inner.registry.resolve(&invocation)
                .map(|(_, answer)| answer);
            (invocation, answer)
        };
        let spied = self.state.settings.spied_instance();
        match answer {
            Some(answer) => answer.execute(&invocation, spied),
            None => self.default_answer().execute(&invocation, spied)
        }
    }

    /// Like [`invoke`](#method.invoke), but return a concrete type.
    ///
    /// Fails with
    /// [`WRONG_TYPE_OF_RETURN_VALUE`](AnswerError::WRONG_TYPE_OF_RETURN_VALUE)
    /// if the answer produced some other type.
    pub fn call<R: Value + Clone>(&self,
        signature: MethodSignature,
        args: Vec<Arc<dyn Value>>) -> Result<R, AnswerError>
    {
        let v = self.invoke(signature, args)?;
        v.downcast_ref::<R>()
            .map(R::clone)
            .map_err(|_| AnswerError::new(
                AnswerError::WRONG_TYPE_OF_RETURN_VALUE,
                format!("{:?} is of type {} but {} was expected",
                        v, v.type_info(), TypeInfo::of::<R>())))
    }

    /// Register a stubbing.  Its answers are used in order for successive
    /// matching calls, and the last one is repeated after that.
    ///
    /// A stubbing registered later takes precedence over earlier ones that
    /// match the same invocation.
    #[track_caller]
    pub fn stub<I>(&self, matcher: InvocationMatcher, answers: I)
        -> Result<Arc<Stubbing>>
        where I: IntoIterator<Item=Answer>
    {
        let location = Location::caller();
        let answers: Vec<Answer> = answers.into_iter().collect();
        if answers.is_empty() {
            let what = matcher.display_for(self.name()).to_string();
            return Err(Error::UnfinishedStubbing(what));
        }
        let stubbing = self.state.lock()
            .registry
            .register(matcher, answers, location);
        Ok(stubbing)
    }

    /// Verify this mock alone.  See [`verify`](crate::verify).
    pub fn verify(&self, wanted: &InvocationMatcher, mode: VerificationMode)
        -> Result<(), VerificationFailure>
    {
        verification::verify(&[self], wanted, mode)
    }

    /// Forget all stubbings and invocations.
    pub fn reset(&self) {
        let mut inner = self.state.lock();
        inner.recorder.clear();
        inner.registry.clear();
        debug!(mock = %self.id(), "reset");
    }

    /// Forget all invocations, but keep the stubbings.
    pub fn clear_invocations(&self) {
        self.state.lock().recorder.clear();
        debug!(mock = %self.id(), "cleared invocations");
    }

    pub(crate) fn invocations(&self) -> Vec<Arc<Invocation>> {
        self.state.lock().recorder.invocations()
    }

    pub(crate) fn stubbings(&self) -> Vec<Arc<Stubbing>> {
        self.state.lock().registry.stubbings()
    }

    pub(crate) fn shared(&self) -> &Arc<Shared> {
        &self.shared
    }

    pub(crate) fn same_mock(&self, other: &Mock) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    fn default_answer(&self) -> &DefaultAnswer {
        self.state.settings
            .default_answer()
            .unwrap_or(&self.shared.config.default_answer)
    }
}

impl fmt::Debug for Mock {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Mock")
            .field("id", &self.id())
            .field("name", &self.name())
            .finish()
    }
}

/// A mocking session: the scope of one test.
///
/// Owns the sequence counter that orders invocations across its mocks, the
/// registry of its mocks and its configuration.  When the session finishes,
/// either through [`finish`](#method.finish) or by being dropped, its
/// stubbings are scanned once for ones that were never used.
pub struct Session {
    shared: Arc<Shared>,
    finished: AtomicBool
}

impl Session {
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    pub fn with_config(config: SessionConfig) -> Self {
        let counter = Arc::new(SequenceCounter::starting_at(config.first_sequence));
        Self::with_counter(config, counter)
    }

    /// Create a session ordering its invocations with an existing counter.
    pub fn with_counter(config: SessionConfig, counter: Arc<SequenceCounter>)
        -> Self
    {
        let shared = Arc::new(Shared {
            counter,
            config,
            mocks: Mutex::new(BTreeMap::new()),
            next_mock: AtomicU64::new(1),
            next_verification: AtomicU64::new(1)
        });
        Session {
            shared,
            finished: AtomicBool::new(false)
        }
    }

    pub fn counter(&self) -> &Arc<SequenceCounter> {
        &self.shared.counter
    }

    pub fn config(&self) -> &SessionConfig {
        &self.shared.config
    }

    /// Create a mock.
    pub fn mock(&self, settings: MockCreationSettings) -> Mock {
        let id = MockId(self.shared.next_mock.fetch_add(1, Ordering::Relaxed));
        let settings = Arc::new(settings);
        let name = settings.shared_name();
        let inner = MockInner {
            recorder: InvocationRecorder::new(id, name.clone(),
                                              self.shared.counter.clone()),
            registry: StubbingRegistry::new(id, name)
        };
        let state = Arc::new(MockState {
            id,
            settings,
            inner: Mutex::new(inner)
        });
        debug!(mock = %id, settings = ?state.settings, "created mock");
        self.shared.mocks().insert(id, state.clone());
        Mock {
            state,
            shared: self.shared.clone()
        }
    }

    /// Create a mock of `T` with default settings.
    pub fn mock_of<T: ?Sized + 'static>(&self) -> Mock {
        self.mock(MockSettings::of::<T>().build())
    }

    /// Create a spy of `T`: a mock whose unstubbed calls pass through to
    /// `real`.
    pub fn spy<T: ?Sized + 'static, R: RealObject>(&self, real: R) -> Mock {
        self.mock(MockSettings::of::<T>().spied_instance(real).build())
    }

    /// Look up a mock of this session by its id.
    pub fn find(&self, id: MockId) -> Option<Mock> {
        self.shared.mocks()
            .get(&id)
            .map(|state| Mock {
                state: state.clone(),
                shared: self.shared.clone()
            })
    }

    /// All mocks of this session, in creation order.
    pub fn mocks(&self) -> Vec<Mock> {
        self.shared.mocks()
            .values()
            .map(|state| Mock {
                state: state.clone(),
                shared: self.shared.clone()
            }).collect()
    }

    /// Is `mock` one of this session's mocks?
    pub(crate) fn tracks(&self, mock: &Mock) -> bool {
        self.shared.mocks()
            .get(&mock.id())
            .map_or(false, |state| Arc::ptr_eq(state, &mock.state))
    }

    /// Entry point for interceptors that only know the mock's id.
    pub fn on_invocation(&self,
        id: MockId,
        signature: MethodSignature,
        args: Vec<Arc<dyn Value>>) -> Result<Arc<dyn Value>>
    {
        let mock = self.find(id).ok_or(Error::UnknownMock(id))?;
        Ok(mock.invoke(signature, args)?)
    }

    /// Inspect `obj`, which might or might not be one of this session's mocks.
    /// `None` stands for null.
    pub fn mocking_details<'a>(&'a self, obj: Option<&'a dyn Inspect>)
        -> MockingDetails<'a>
    {
        MockingDetails::new(self, obj)
    }

    /// Start an in-order verification spanning `mocks`.
    pub fn in_order(&self, mocks: &[&Mock]) -> InOrder {
        InOrder::new(self.shared.next_verification_id(), mocks)
    }

    /// Scan for unused stubbings without finishing the session.
    pub fn unused_stubbings(&self) -> UnusedStubbingReport {
        UnusedStubbingDetector::scan(&self.mocks())
    }

    /// End the session: scan for unused stubbings, deliver the report to the
    /// configured reporter and return it.
    pub fn finish(self) -> UnusedStubbingReport {
        self.finished.store(true, Ordering::Relaxed);
        let report = self.unused_stubbings();
        self.shared.config.reporter.report(&report);
        report
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if !thread::panicking() && !self.finished.swap(true, Ordering::Relaxed)
        {
            let report = self.unused_stubbings();
            self.shared.config.reporter.report(&report);
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.shared.config)
            .field("next_sequence", &self.shared.counter.peek())
            .field("mocks", &self.shared.mocks().len())
            .finish()
    }
}
