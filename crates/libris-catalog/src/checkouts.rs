use libris_types::Checkout;
use tracing::info;

/// Log of successful checkouts made during this run.
///
/// The log is not persisted; held books on the user records are the
/// durable trace of a checkout.
#[derive(Clone, Debug, Default)]
pub struct CheckoutRepository {
    events: Vec<Checkout>,
}

impl CheckoutRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a checkout event.
    pub fn record(&mut self, checkout: Checkout) -> &Checkout {
        info!(
            user_id = %checkout.user_id(),
            isbn = checkout.isbn(),
            "checkout logged"
        );
        self.events.push(checkout);
        let index = self.events.len() - 1;
        &self.events[index]
    }

    /// Every event, oldest first.
    pub fn list(&self) -> &[Checkout] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events whose user ID is equivalent to `user_id`.
    pub fn for_user<'a>(&'a self, user_id: &'a str) -> impl Iterator<Item = &'a Checkout> + 'a {
        self.events
            .iter()
            .filter(move |event| event.user_id().is_equivalent(user_id))
    }
}
