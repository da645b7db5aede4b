use log::debug;
use rand::Rng;

use super::card::{Card, CardId, PairId};
use super::faces::Face;
use super::shuffle::fisher_yates;

pub const MAX_PENDING: usize = 2;

/// Largest face set whose pair identities still fit in a [`PairId`].
pub const MAX_FACES: usize = u16::MAX as usize + 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlipRejection {
    NotInteractive,
    UnknownCard,
    Matched,
    AlreadyFlipped,
    PendingFull,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlipRequest {
    Accepted { pending: usize },
    Ignored(FlipRejection),
}

impl FlipRequest {
    pub fn is_accepted(self) -> bool {
        matches!(self, FlipRequest::Accepted { .. })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    Match(CardId, CardId),
    Mismatch(CardId, CardId),
}

impl Resolution {
    pub fn is_match(self) -> bool {
        matches!(self, Resolution::Match(..))
    }
}

/// Card collection for one round plus the flip bookkeeping.
///
/// The board never renders; it only answers what each card shows and in which order.
#[derive(Clone, Debug, Default)]
pub struct Board {
    faces: Vec<Face>,
    cards: Vec<Card>,
    pending: Vec<CardId>,
    matched: Vec<CardId>,
    interactive: bool,
    reveal_all: bool,
    clicks: u32,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deals every face twice, shuffles, and opens the board for input.
    pub fn init_round<R: Rng + ?Sized>(&mut self, faces: &[Face], rng: &mut R) {
        debug_assert!(faces.len() <= MAX_FACES, "face set exceeds the pair identity range");
        self.faces = faces.to_vec();
        self.cards.clear();
        self.pending.clear();
        self.matched.clear();
        self.clicks = 0;
        self.reveal_all = false;

        let pair_count = faces.len();
        for copy in 0..2 {
            for face_index in 0..pair_count {
                let id = CardId((copy * pair_count + face_index) as u32);
                self.cards.push(Card::new(id, PairId(face_index as u16)));
            }
        }
        fisher_yates(&mut self.cards, rng);
        self.interactive = true;
        debug!("dealt {} cards from {} faces", self.cards.len(), pair_count);
        self.check_invariants();
    }

    /// Drops every card. The face set is kept so a later deal can reuse it.
    pub fn clear(&mut self) {
        self.cards.clear();
        self.pending.clear();
        self.matched.clear();
        self.clicks = 0;
        self.interactive = false;
        self.reveal_all = false;
    }

    pub fn request_card_flip(&mut self, id: CardId) -> FlipRequest {
        if !self.interactive {
            return FlipRequest::Ignored(FlipRejection::NotInteractive);
        }
        if self.pending.len() >= MAX_PENDING {
            return FlipRequest::Ignored(FlipRejection::PendingFull);
        }
        let Some(card) = self.cards.iter_mut().find(|c| c.id() == id) else {
            return FlipRequest::Ignored(FlipRejection::UnknownCard);
        };
        if card.is_matched() {
            return FlipRequest::Ignored(FlipRejection::Matched);
        }
        if !card.request_flip() {
            return FlipRequest::Ignored(FlipRejection::AlreadyFlipped);
        }
        self.pending.push(id);
        self.clicks = self.clicks.saturating_add(1);
        self.check_invariants();
        FlipRequest::Accepted {
            pending: self.pending.len(),
        }
    }

    /// Consumes the two pending flips. Does nothing while fewer than two are pending.
    pub fn resolve_pending(&mut self) -> Option<Resolution> {
        if self.pending.len() < MAX_PENDING {
            return None;
        }
        let first = self.pending[0];
        let second = self.pending[1];
        self.pending.clear();

        let same_pair = self.pair_of(first).is_some() && self.pair_of(first) == self.pair_of(second);
        let resolution = if same_pair {
            for id in [first, second] {
                if let Some(card) = self.card_mut(id) {
                    card.mark_matched();
                }
            }
            self.matched.push(first);
            self.matched.push(second);
            Resolution::Match(first, second)
        } else {
            for id in [first, second] {
                if let Some(card) = self.card_mut(id) {
                    card.reset();
                }
            }
            Resolution::Mismatch(first, second)
        };
        debug!("resolved {:?}", resolution);
        self.check_invariants();
        Some(resolution)
    }

    /// One step of the shuffle animation: unmatched cards trade places among the
    /// slots unmatched cards hold, matched cards stay where they are.
    pub fn reshuffle_unmatched<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let slots: Vec<usize> = self
            .cards
            .iter()
            .enumerate()
            .filter(|(_, card)| !card.is_matched())
            .map(|(idx, _)| idx)
            .collect();
        if slots.len() < 2 {
            return;
        }
        let mut loose: Vec<Card> = slots.iter().map(|&idx| self.cards[idx].clone()).collect();
        fisher_yates(&mut loose, rng);
        for (idx, card) in slots.into_iter().zip(loose) {
            self.cards[idx] = card;
        }
        self.check_invariants();
    }

    /// Shows every unmatched face without flipping anything.
    pub fn begin_reveal(&mut self) {
        self.reveal_all = true;
    }

    /// Ends a shuffle animation: unmatched cards go face down and pending flips are dropped.
    pub fn settle(&mut self) {
        self.reveal_all = false;
        self.pending.clear();
        for card in self.cards.iter_mut().filter(|c| !c.is_matched()) {
            card.reset();
        }
        self.check_invariants();
    }

    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn is_revealing(&self) -> bool {
        self.reveal_all
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.iter().find(|c| c.id() == id)
    }

    fn card_mut(&mut self, id: CardId) -> Option<&mut Card> {
        self.cards.iter_mut().find(|c| c.id() == id)
    }

    fn pair_of(&self, id: CardId) -> Option<PairId> {
        self.card(id).map(Card::pair)
    }

    pub fn position(&self, id: CardId) -> Option<usize> {
        self.cards.iter().position(|c| c.id() == id)
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn face_of(&self, card: &Card) -> Option<&Face> {
        self.faces.get(card.pair().index())
    }

    /// Whether the renderer should draw the front of `card`.
    pub fn shows_face(&self, card: &Card) -> bool {
        card.is_matched() || card.is_flipped() || self.reveal_all
    }

    pub fn pending(&self) -> &[CardId] {
        &self.pending
    }

    pub fn matched(&self) -> &[CardId] {
        &self.matched
    }

    pub fn matched_count(&self) -> usize {
        self.matched.len()
    }

    pub fn total(&self) -> usize {
        self.cards.len()
    }

    pub fn click_count(&self) -> u32 {
        self.clicks
    }

    pub fn is_complete(&self) -> bool {
        !self.cards.is_empty() && self.matched.len() == self.cards.len()
    }

    fn check_invariants(&self) {
        debug_assert!(self.pending.len() <= MAX_PENDING, "more than two pending flips");
        debug_assert!(self.matched.len() <= self.cards.len(), "matched exceeds card count");
        debug_assert!(
            self.pending.iter().all(|id| !self.matched.contains(id)),
            "card both pending and matched"
        );
        debug_assert_eq!(self.cards.len() % 2, 0, "odd card count");
        if cfg!(debug_assertions) && !self.cards.is_empty() {
            let mut copies = vec![0usize; self.faces.len()];
            for card in &self.cards {
                if let Some(count) = copies.get_mut(card.pair().index()) {
                    *count += 1;
                }
            }
            debug_assert!(
                copies.iter().all(|&count| count == 2),
                "pair identity not shared by exactly two cards"
            );
        }
    }
}
