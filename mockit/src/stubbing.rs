// vim: tw=80
//! Stubbings and their resolution.

use std::{
    fmt,
    panic::Location,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering}
    }
};
use tracing::{debug, trace};

use crate::{
    answer::Answer,
    invocation::{Invocation, MockId},
    matcher::InvocationMatcher
};

/// A registered rule mapping an invocation pattern to a sequence of answers.
///
/// Answers are handed out in order; once the last one is reached it answers
/// every further match.
pub struct Stubbing {
    index: usize,
    mock: MockId,
    mock_name: Arc<str>,
    matcher: InvocationMatcher,
    answers: Vec<Arc<Answer>>,
    cursor: AtomicUsize,
    used: AtomicUsize,
    location: &'static Location<'static>
}

impl Stubbing {
    /// Position among all stubbings ever registered on the mock.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn mock(&self) -> MockId {
        self.mock
    }

    pub fn mock_name(&self) -> &str {
        &self.mock_name
    }

    pub fn matcher(&self) -> &InvocationMatcher {
        &self.matcher
    }

    pub fn answers(&self) -> &[Arc<Answer>] {
        &self.answers
    }

    /// How many invocations this stubbing has answered.
    pub fn used_count(&self) -> usize {
        self.used.load(Ordering::Relaxed)
    }

    pub fn was_used(&self) -> bool {
        self.used_count() > 0
    }

    /// Where the stubbing was registered.
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    /// Count a match and return the answer for it, advancing the cursor.
    fn answer_next(&self) -> Arc<Answer> {
        self.used.fetch_add(1, Ordering::Relaxed);
        let last = self.answers.len() - 1;
        let i = self.cursor.load(Ordering::Relaxed);
        if i < last {
            self.cursor.store(i + 1, Ordering::Relaxed);
        }
        self.answers[i].clone()
    }
}

/// Renders like `mock.simpleMethod(1); stubbed with: [Returns: 1]`
impl fmt::Display for Stubbing {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} stubbed with: [", self.matcher.display_for(&self.mock_name))?;
        for (i, a) in self.answers.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", a)?;
        }
        f.write_str("]")
    }
}

impl fmt::Debug for Stubbing {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Stubbing")
            .field("index", &self.index)
            .field("stubbing", &format_args!("{}", self))
            .field("used", &self.used_count())
            .field("location", &format_args!("{}", self.location))
            .finish()
    }
}

/// The ordered stubbings of one mock.
pub(crate) struct StubbingRegistry {
    mock: MockId,
    mock_name: Arc<str>,
    stubbings: Vec<Arc<Stubbing>>,
    next_index: usize
}

impl StubbingRegistry {
    pub fn new(mock: MockId, mock_name: Arc<str>) -> Self {
        StubbingRegistry {
            mock,
            mock_name,
            stubbings: Vec::new(),
            next_index: 0
        }
    }

    /// Append a stubbing.  `answers` must not be empty.
    pub fn register(&mut self,
        matcher: InvocationMatcher,
        answers: Vec<Answer>,
        location: &'static Location<'static>) -> Arc<Stubbing>
    {
        debug_assert!(!answers.is_empty());
        let stubbing = Arc::new(Stubbing {
            index: self.next_index,
            mock: self.mock,
            mock_name: self.mock_name.clone(),
            matcher,
            answers: answers.into_iter().map(Arc::new).collect(),
            cursor: AtomicUsize::new(0),
            used: AtomicUsize::new(0),
            location
        });
        self.next_index += 1;
        debug!(mock = %self.mock, stubbing = %stubbing, %location,
               "registered stubbing");
        self.stubbings.push(stubbing.clone());
        stubbing
    }

    /// Find the stubbing that governs `invocation`: the most recently
    /// registered one that matches.  Counts the match, advances its answer
    /// cursor, binds it to the invocation and records captured arguments.
    ///
    /// Must be called with the owning mock's lock held.
    pub fn resolve(&self, invocation: &Invocation)
        -> Option<(Arc<Stubbing>, Arc<Answer>)>
    {
        let stubbing = self.stubbings.iter()
            .rev()
            .find(|s| s.matcher.matches(invocation))?;
        let answer = stubbing.answer_next();
        invocation.bind_stubbing(stubbing.index);
        stubbing.matcher.capture_arguments(invocation);
        trace!(mock = %self.mock, seq = invocation.sequence_number(),
               stubbing = stubbing.index, "resolved stubbing");
        Some((stubbing.clone(), answer))
    }

    /// A freshly owned copy of the stubbings, in registration order.
    pub fn stubbings(&self) -> Vec<Arc<Stubbing>> {
        self.stubbings.clone()
    }

    /// Remove every stubbing.  Registration indexes keep increasing.
    pub fn clear(&mut self) {
        self.stubbings.clear();
    }
}
