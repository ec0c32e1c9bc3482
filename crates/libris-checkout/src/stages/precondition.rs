use libris_types::Checkout;

use crate::error::{CheckoutError, Missing, Rejection};
use crate::stage::{CheckoutContext, CheckoutRequest, CheckoutStage, StageDecision};

/// Refuses checkout while either side of the catalog is empty.
pub struct CatalogStage;

impl CheckoutStage for CatalogStage {
    fn name(&self) -> &str {
        "catalog"
    }

    fn evaluate(
        &self,
        _request: &CheckoutRequest,
        context: &mut CheckoutContext,
    ) -> Result<StageDecision, CheckoutError> {
        let missing = match (context.books.is_empty(), context.users.is_empty()) {
            (false, false) => return Ok(StageDecision::Pass),
            (true, true) => Missing::Both,
            (true, false) => Missing::Books,
            (false, true) => Missing::Users,
        };
        Ok(StageDecision::Fail(Rejection::EmptyCatalog(missing)))
    }
}

/// Requires a non-blank user ID and ISBN.
pub struct RequestStage;

impl CheckoutStage for RequestStage {
    fn name(&self) -> &str {
        "request"
    }

    fn evaluate(
        &self,
        request: &CheckoutRequest,
        context: &mut CheckoutContext,
    ) -> Result<StageDecision, CheckoutError> {
        match Checkout::new(&request.user_id, &request.isbn) {
            Ok(checkout) => {
                context.checkout = Some(checkout);
                Ok(StageDecision::Pass)
            }
            Err(e) => Ok(StageDecision::Fail(Rejection::IncompleteRecord(e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use libris_types::{Book, ErrorKind, User};

    use super::*;

    fn stocked() -> CheckoutContext {
        CheckoutContext::new(
            vec![Book::new("T", "A", "978-0-1-1-1").unwrap()],
            vec![User::new("Alice", "1").unwrap()],
        )
    }

    #[test]
    fn catalog_names_the_empty_side() {
        let request = CheckoutRequest::new("1", "978-0-1-1-1");
        let cases = [
            (CheckoutContext::default(), Missing::Both),
            (CheckoutContext::new(Vec::new(), stocked().users), Missing::Books),
            (CheckoutContext::new(stocked().books, Vec::new()), Missing::Users),
        ];
        for (mut context, expected) in cases {
            let decision = CatalogStage.evaluate(&request, &mut context).unwrap();
            assert_eq!(decision, StageDecision::Fail(Rejection::EmptyCatalog(expected)));
        }
        assert!(CatalogStage
            .evaluate(&request, &mut stocked())
            .unwrap()
            .is_pass());
    }

    #[test]
    fn request_requires_both_fields() {
        let mut context = stocked();
        let decision = RequestStage
            .evaluate(&CheckoutRequest::new(" ", "978-0-1-1-1"), &mut context)
            .unwrap();
        let StageDecision::Fail(rejection) = decision else {
            panic!("blank user ID accepted");
        };
        assert_eq!(rejection.kind(), ErrorKind::IncompleteRecord);
        assert!(context.checkout.is_none());

        let decision = RequestStage
            .evaluate(&CheckoutRequest::new("1", " 978-0-1-1-1 "), &mut context)
            .unwrap();
        assert!(decision.is_pass());
        assert_eq!(context.checkout.as_ref().unwrap().isbn(), "978-0-1-1-1");
    }
}
