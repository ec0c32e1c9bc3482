use std::time::Duration;

use libris_types::{Book, Checkout, User};

use crate::error::{CheckoutError, Rejection};

// ---------------------------------------------------------------------------
// CheckoutRequest
// ---------------------------------------------------------------------------

/// A request to lend one book to one user, exactly as the caller typed it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub user_id: String,
    pub isbn: String,
}

impl CheckoutRequest {
    pub fn new(user_id: impl Into<String>, isbn: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            isbn: isbn.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// StageDecision
// ---------------------------------------------------------------------------

/// The outcome of a single stage evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StageDecision {
    /// Proceed to the next stage.
    Pass,
    /// Stop the pipeline and refuse the request.
    Fail(Rejection),
}

impl StageDecision {
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

// ---------------------------------------------------------------------------
// StageResult
// ---------------------------------------------------------------------------

/// Recorded result from a completed stage evaluation.
#[derive(Clone, Debug)]
pub struct StageResult {
    /// Name of the stage that produced this result.
    pub stage_name: String,
    /// Whether the stage passed.
    pub passed: bool,
    /// Rejection message when the stage failed.
    pub reason: Option<String>,
    /// Wall-clock time the stage took to evaluate.
    pub elapsed: Duration,
}

// ---------------------------------------------------------------------------
// CheckoutContext
// ---------------------------------------------------------------------------

/// State shared by the stages of one evaluation.
///
/// The desk fills `books` and `users` with the merged, deduplicated
/// catalog before the first stage runs. Stages record what they resolve so
/// later stages and the apply step can use it.
#[derive(Debug, Default)]
pub struct CheckoutContext {
    pub books: Vec<Book>,
    pub users: Vec<User>,
    /// The validated request, set by the request stage.
    pub checkout: Option<Checkout>,
    /// Index into `books` of the requested book.
    pub book: Option<usize>,
    /// Index into `users` of the requesting user.
    pub user: Option<usize>,
    /// Results from stages that have already run in this evaluation.
    pub previous_stages: Vec<StageResult>,
}

impl CheckoutContext {
    pub fn new(books: Vec<Book>, users: Vec<User>) -> Self {
        Self {
            books,
            users,
            ..Self::default()
        }
    }

    /// The resolved book, if the book stage has run and passed.
    pub fn resolved_book(&self) -> Option<&Book> {
        self.book.and_then(|i| self.books.get(i))
    }

    /// The resolved user, if the patron stage has run and passed.
    pub fn resolved_user(&self) -> Option<&User> {
        self.user.and_then(|i| self.users.get(i))
    }
}

// ---------------------------------------------------------------------------
// CheckoutStage trait
// ---------------------------------------------------------------------------

/// A single stage in the checkout pipeline.
///
/// A stage refuses a request by returning [`StageDecision::Fail`]. An `Err`
/// means the pipeline itself is broken (for instance a stage that depends
/// on a resolution no earlier stage made).
pub trait CheckoutStage: Send + Sync {
    /// Human-readable name of this stage, recorded in the trail.
    fn name(&self) -> &str;

    /// Evaluate `request` and update `context` with anything resolved.
    fn evaluate(
        &self,
        request: &CheckoutRequest,
        context: &mut CheckoutContext,
    ) -> Result<StageDecision, CheckoutError>;
}
