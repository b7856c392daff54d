use crate::offer::{Offer, OfferId};
use std::collections::VecDeque;

/// Offers waiting for the operator, in arrival order.
#[derive(Debug, Default)]
pub struct OfferQueue {
    offers: VecDeque<Offer>,
}

impl OfferQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, offer: Offer) {
        self.offers.push_back(offer);
    }

    pub(crate) fn pop(&mut self) -> Option<Offer> {
        self.offers.pop_front()
    }

    pub fn len(&self) -> usize {
        self.offers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &OfferId> {
        self.offers.iter().map(|offer| &offer.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offer::{OfferState, SteamId};

    fn offer(id: &str) -> Offer {
        Offer {
            id: id.into(),
            partner: SteamId::individual(1),
            message: String::new(),
            state: OfferState::Active,
            items_to_give: vec![],
            items_to_receive: vec![],
            is_our_offer: false,
            created: None,
            updated: None,
            expires: None,
        }
    }

    #[test]
    fn pops_in_arrival_order() {
        let mut queue = OfferQueue::new();
        for id in ["a", "b", "c", "d"] {
            queue.push(offer(id));
        }
        assert_eq!(queue.len(), 4);

        let drained: Vec<_> = std::iter::from_fn(|| queue.pop())
            .map(|offer| offer.id.to_string())
            .collect();
        assert_eq!(drained, ["a", "b", "c", "d"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn interleaved_pushes_keep_fifo() {
        let mut queue = OfferQueue::new();
        queue.push(offer("1"));
        queue.push(offer("2"));
        assert_eq!(queue.pop().unwrap().id.as_str(), "1");
        queue.push(offer("3"));
        let ids: Vec<_> = queue.ids().map(|id| id.as_str()).collect();
        assert_eq!(ids, ["2", "3"]);
    }
}
