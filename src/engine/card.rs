use serde::{Deserialize, Serialize};

/// Stable per-card identifier, unique within a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardId(pub u32);

/// Value shared by the two cards of a pair. Also indexes the board's face set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairId(pub u16);

impl PairId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardStatus {
    Hidden,
    Flipped,
    Matched,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Card {
    id: CardId,
    pair: PairId,
    flipped: bool,
    matched: bool,
}

impl Card {
    pub fn new(id: CardId, pair: PairId) -> Self {
        Card {
            id,
            pair,
            flipped: false,
            matched: false,
        }
    }

    pub fn id(&self) -> CardId {
        self.id
    }

    pub fn pair(&self) -> PairId {
        self.pair
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    pub fn is_matched(&self) -> bool {
        self.matched
    }

    /// Matched cards take no further input.
    pub fn is_interactive(&self) -> bool {
        !self.matched && !self.flipped
    }

    pub fn status(&self) -> CardStatus {
        if self.matched {
            CardStatus::Matched
        } else if self.flipped {
            CardStatus::Flipped
        } else {
            CardStatus::Hidden
        }
    }

    /// Returns `false` without touching the card when it is matched or already face up.
    pub fn request_flip(&mut self) -> bool {
        if !self.is_interactive() {
            return false;
        }
        self.flipped = true;
        true
    }

    pub fn mark_matched(&mut self) {
        self.matched = true;
    }

    pub fn reset(&mut self) {
        self.flipped = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> Card {
        Card::new(CardId(3), PairId(1))
    }

    #[test]
    fn starts_hidden() {
        let c = card();
        assert_eq!(c.status(), CardStatus::Hidden);
        assert!(c.is_interactive());
    }

    #[test]
    fn second_flip_is_ignored() {
        let mut c = card();
        assert!(c.request_flip());
        assert!(!c.request_flip());
        assert_eq!(c.status(), CardStatus::Flipped);
    }

    #[test]
    fn matched_is_terminal() {
        let mut c = card();
        c.request_flip();
        c.mark_matched();
        c.reset();
        assert!(!c.request_flip());
        assert_eq!(c.status(), CardStatus::Matched);
    }

    #[test]
    fn mark_matched_twice_equals_once() {
        let mut once = card();
        once.mark_matched();
        let mut twice = card();
        twice.mark_matched();
        twice.mark_matched();
        assert_eq!(once, twice);
    }

    #[test]
    fn reset_hides_without_unmatching() {
        let mut c = card();
        c.request_flip();
        c.reset();
        assert_eq!(c.status(), CardStatus::Hidden);
        assert!(c.request_flip());
    }
}
