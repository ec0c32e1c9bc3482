use std::time::{Duration, Instant};

use libris_catalog::{BookRepository, CheckoutRepository, ListMode, UserRepository};
use libris_types::{Availability, Book, Checkout, User};
use tracing::{debug, info, warn};

use crate::error::{CheckoutError, CheckoutResult, Rejection};
use crate::stage::{CheckoutContext, CheckoutRequest, CheckoutStage, StageDecision, StageResult};
use crate::stages::{AvailabilityStage, BookStage, CatalogStage, HoldStage, PatronStage, RequestStage};

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// The outcome of running a request through the stage pipeline.
#[derive(Debug)]
pub struct Evaluation {
    /// The first rejection, or `None` if every stage passed.
    pub rejection: Option<Rejection>,
    /// Per-stage results in evaluation order.
    pub stage_results: Vec<StageResult>,
    /// Total wall-clock time for the pipeline evaluation.
    pub elapsed: Duration,
    context: CheckoutContext,
}

impl Evaluation {
    /// Returns `true` if every stage passed.
    pub fn is_approved(&self) -> bool {
        self.rejection.is_none()
    }

    /// The shared context as the last stage left it.
    pub fn context(&self) -> &CheckoutContext {
        &self.context
    }
}

// ---------------------------------------------------------------------------
// CheckoutReceipt
// ---------------------------------------------------------------------------

/// Proof of a completed checkout.
#[derive(Clone, Debug)]
pub struct CheckoutReceipt {
    /// The book as persisted, now marked unavailable.
    pub book: Book,
    /// The user as persisted, now holding the book.
    pub user: User,
    /// The logged event.
    pub checkout: Checkout,
    /// Per-stage results in evaluation order.
    pub stage_results: Vec<StageResult>,
}

// ---------------------------------------------------------------------------
// CheckoutDesk
// ---------------------------------------------------------------------------

/// Runs checkout requests through a fail-fast pipeline of stages and, when
/// all pass, applies and persists the result.
pub struct CheckoutDesk {
    stages: Vec<Box<dyn CheckoutStage>>,
}

impl CheckoutDesk {
    /// Create a desk with an empty pipeline.
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Create a desk with the standard pipeline:
    /// catalog -> request -> book -> availability -> patron -> hold
    pub fn with_default_stages() -> Self {
        let mut desk = Self::new();
        desk.add_stage(Box::new(CatalogStage));
        desk.add_stage(Box::new(RequestStage));
        desk.add_stage(Box::new(BookStage));
        desk.add_stage(Box::new(AvailabilityStage));
        desk.add_stage(Box::new(PatronStage));
        desk.add_stage(Box::new(HoldStage));
        desk
    }

    /// Append a stage to the end of the pipeline.
    pub fn add_stage(&mut self, stage: Box<dyn CheckoutStage>) {
        self.stages.push(stage);
    }

    /// Number of stages in the pipeline.
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Names of the stages, in pipeline order.
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run `request` through the pipeline against the merged catalog.
    ///
    /// Nothing is modified; the first failing stage stops evaluation.
    pub fn evaluate(
        &self,
        request: &CheckoutRequest,
        books: &BookRepository,
        users: &UserRepository,
    ) -> CheckoutResult<Evaluation> {
        let pipeline_start = Instant::now();
        let mut context = CheckoutContext::new(
            books.list(ListMode::Deduplicated)?,
            users.list(ListMode::Deduplicated)?,
        );
        let mut stage_results = Vec::with_capacity(self.stages.len());

        for stage in &self.stages {
            let stage_start = Instant::now();
            let decision = stage.evaluate(request, &mut context)?;
            let elapsed = stage_start.elapsed();

            let result = StageResult {
                stage_name: stage.name().to_string(),
                passed: decision.is_pass(),
                reason: match &decision {
                    StageDecision::Pass => None,
                    StageDecision::Fail(rejection) => Some(rejection.to_string()),
                },
                elapsed,
            };
            stage_results.push(result.clone());
            context.previous_stages.push(result);

            if let StageDecision::Fail(rejection) = decision {
                debug!(stage = stage.name(), %rejection, "checkout refused");
                return Ok(Evaluation {
                    rejection: Some(rejection),
                    stage_results,
                    elapsed: pipeline_start.elapsed(),
                    context,
                });
            }
        }

        Ok(Evaluation {
            rejection: None,
            stage_results,
            elapsed: pipeline_start.elapsed(),
            context,
        })
    }

    /// Evaluate `request` and, if approved, lend the book.
    ///
    /// On approval the book is marked unavailable and the ISBN is appended
    /// to the user's held books. Both tables are rewritten in full, books
    /// first. If the users write fails the books table is restored to its
    /// previous rows. In-memory records are updated and the event is logged
    /// only once both writes have succeeded.
    pub fn checkout(
        &self,
        request: &CheckoutRequest,
        books: &mut BookRepository,
        users: &mut UserRepository,
        log: &mut CheckoutRepository,
    ) -> CheckoutResult<CheckoutReceipt> {
        let evaluation = self.evaluate(request, books, users)?;
        if let Some(rejection) = evaluation.rejection {
            return Err(CheckoutError::Rejected(rejection));
        }

        let context = &evaluation.context;
        let (Some(book), Some(user), Some(checkout)) = (
            context.resolved_book(),
            context.resolved_user(),
            context.checkout.clone(),
        ) else {
            return Err(CheckoutError::stage(
                "apply",
                "pipeline approved without resolving the book, the user and the request",
            ));
        };

        let mut book = book.clone();
        book.set_availability(Availability::No);
        let mut user = user.clone();
        user.add_hold(book.isbn());

        persist(books, users, &book, &user)?;

        books.set_availability(book.isbn(), Availability::No);
        users.append_hold(user.id().as_str(), book.isbn());
        log.record(checkout.clone());
        info!(user_id = %user.id(), isbn = book.isbn(), "book checked out");

        Ok(CheckoutReceipt {
            book,
            user,
            checkout,
            stage_results: evaluation.stage_results,
        })
    }
}

impl Default for CheckoutDesk {
    fn default() -> Self {
        Self::with_default_stages()
    }
}

impl std::fmt::Debug for CheckoutDesk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutDesk")
            .field("stages", &self.stage_names())
            .finish()
    }
}

/// Rewrite both tables with the updated records, books first.
fn persist(
    books: &BookRepository,
    users: &UserRepository,
    book: &Book,
    user: &User,
) -> CheckoutResult<()> {
    let books_existed = books.table_exists()?;
    let previous_books = books.snapshot()?;
    let book_rows = books.rows_for_rewrite(std::slice::from_ref(book))?;
    let user_rows = users.rows_for_rewrite(std::slice::from_ref(user))?;

    books.replace_stored(&book_rows)?;
    if let Err(e) = users.replace_stored(&user_rows) {
        warn!(error = %e, "users table write failed; restoring books table");
        let restored = if books_existed {
            books.replace_stored(&previous_books)
        } else {
            books.remove_stored()
        };
        if let Err(rollback) = restored {
            warn!(error = %rollback, "books table could not be restored");
        }
        return Err(e.into());
    }
    Ok(())
}
