use crate::error::{CheckoutError, Entity, Rejection};
use crate::stage::{CheckoutContext, CheckoutRequest, CheckoutStage, StageDecision};

/// Resolves the requesting user by ID equivalence.
pub struct PatronStage;

impl CheckoutStage for PatronStage {
    fn name(&self) -> &str {
        "patron"
    }

    fn evaluate(
        &self,
        request: &CheckoutRequest,
        context: &mut CheckoutContext,
    ) -> Result<StageDecision, CheckoutError> {
        let position = context
            .users
            .iter()
            .position(|user| user.id().is_equivalent(&request.user_id));
        match position {
            Some(index) => {
                context.user = Some(index);
                Ok(StageDecision::Pass)
            }
            None => Ok(StageDecision::Fail(Rejection::NotFound {
                entity: Entity::User,
                key: request.user_id.trim().to_string(),
            })),
        }
    }
}

/// Refuses a book the user already holds.
pub struct HoldStage;

impl CheckoutStage for HoldStage {
    fn name(&self) -> &str {
        "hold"
    }

    fn evaluate(
        &self,
        request: &CheckoutRequest,
        context: &mut CheckoutContext,
    ) -> Result<StageDecision, CheckoutError> {
        let user = context
            .resolved_user()
            .ok_or_else(|| CheckoutError::stage(self.name(), "no user resolved"))?;
        if user.holds(&request.isbn) {
            Ok(StageDecision::Fail(Rejection::DuplicateHold {
                user_id: user.id().to_string(),
                isbn: request.isbn.trim().to_string(),
            }))
        } else {
            Ok(StageDecision::Pass)
        }
    }
}

#[cfg(test)]
mod tests {
    use libris_types::User;

    use super::*;

    fn context() -> CheckoutContext {
        let mut alice = User::new("Alice", "1").unwrap();
        alice.add_hold("978-0-1-1-1");
        CheckoutContext::new(Vec::new(), vec![User::new("Bob", "2").unwrap(), alice])
    }

    #[test]
    fn patron_matches_equivalent_id() {
        let mut context = context();
        let decision = PatronStage
            .evaluate(&CheckoutRequest::new("01", "978-0-1-1-2"), &mut context)
            .unwrap();
        assert!(decision.is_pass());
        assert_eq!(context.resolved_user().unwrap().name(), "Alice");
    }

    #[test]
    fn patron_reports_unknown_user() {
        let mut context = context();
        let decision = PatronStage
            .evaluate(&CheckoutRequest::new(" 3 ", "978-0-1-1-2"), &mut context)
            .unwrap();
        assert_eq!(
            decision,
            StageDecision::Fail(Rejection::NotFound {
                entity: Entity::User,
                key: "3".into()
            })
        );
    }

    #[test]
    fn hold_refuses_repeat() {
        let mut context = context();
        context.user = Some(1);
        let repeat = CheckoutRequest::new("1", "978-0-1-1-1");
        assert!(matches!(
            HoldStage.evaluate(&repeat, &mut context).unwrap(),
            StageDecision::Fail(Rejection::DuplicateHold { .. })
        ));
        let fresh = CheckoutRequest::new("1", "978-0-1-1-2");
        assert!(HoldStage.evaluate(&fresh, &mut context).unwrap().is_pass());
    }
}
