use crate::error::{CheckoutError, Entity, Rejection};
use crate::stage::{CheckoutContext, CheckoutRequest, CheckoutStage, StageDecision};

/// Resolves the requested ISBN against the merged book list.
pub struct BookStage;

impl CheckoutStage for BookStage {
    fn name(&self) -> &str {
        "book"
    }

    fn evaluate(
        &self,
        request: &CheckoutRequest,
        context: &mut CheckoutContext,
    ) -> Result<StageDecision, CheckoutError> {
        let isbn = request.isbn.trim();
        match context.books.iter().position(|book| book.isbn() == isbn) {
            Some(index) => {
                context.book = Some(index);
                Ok(StageDecision::Pass)
            }
            None => Ok(StageDecision::Fail(Rejection::NotFound {
                entity: Entity::Book,
                key: isbn.to_string(),
            })),
        }
    }
}

/// Refuses books that are not on the shelf.
pub struct AvailabilityStage;

impl CheckoutStage for AvailabilityStage {
    fn name(&self) -> &str {
        "availability"
    }

    fn evaluate(
        &self,
        _request: &CheckoutRequest,
        context: &mut CheckoutContext,
    ) -> Result<StageDecision, CheckoutError> {
        let book = context
            .resolved_book()
            .ok_or_else(|| CheckoutError::stage(self.name(), "no book resolved"))?;
        if book.is_available() {
            Ok(StageDecision::Pass)
        } else {
            Ok(StageDecision::Fail(Rejection::AlreadyCheckedOut {
                isbn: book.isbn().to_string(),
            }))
        }
    }
}
