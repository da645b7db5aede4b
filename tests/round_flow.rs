//! Whole-round scenarios driven by a virtual clock.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

use pretty_assertions::assert_eq;

use pairs::engine::{
    CardId, FlipRejection, FlipRequest, Game, GameConfig, GameEvent, ManualScheduler, PairId,
    RoundPhase, ShuffleStyle, default_faces,
};

/// Opening shuffle: 10 steps of 200 ms and a 1 s settle.
const OPENING_MS: u64 = 10 * 200 + 1000;
/// One poll period plus the settle delay, rounded up.
const RESOLVE_MS: u64 = 600;

struct Harness {
    scheduler: Rc<ManualScheduler>,
    game: Game,
    events: Rc<RefCell<Vec<GameEvent>>>,
}

impl Harness {
    fn new(pairs: usize, config: GameConfig) -> Self {
        let scheduler = Rc::new(ManualScheduler::new());
        let faces = default_faces().into_iter().take(pairs).collect();
        let game = Game::with_seed(config, faces, scheduler.clone(), 2024).unwrap();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        game.subscribe(move |event| sink.borrow_mut().push(event.clone()));
        Harness {
            scheduler,
            game,
            events,
        }
    }

    fn started(pairs: usize) -> Self {
        let harness = Self::new(pairs, GameConfig::default());
        harness.game.start_round();
        harness.scheduler.advance_ms(OPENING_MS);
        harness
    }

    fn pairs(&self) -> Vec<(CardId, CardId)> {
        let board = self.game.board();
        let mut grouped: BTreeMap<PairId, Vec<CardId>> = BTreeMap::new();
        for card in board.cards() {
            grouped.entry(card.pair()).or_default().push(card.id());
        }
        grouped.into_values().map(|ids| (ids[0], ids[1])).collect()
    }

    fn flip(&self, id: CardId) -> FlipRequest {
        self.game.request_card_flip(id)
    }

    fn count(&self, wanted: impl Fn(&GameEvent) -> bool) -> usize {
        self.events.borrow().iter().filter(|e| wanted(e)).count()
    }
}

#[test]
fn four_faces_deal_eight_hidden_cards() {
    let h = Harness::started(4);
    let board = h.game.board();
    assert_eq!(board.total(), 8);
    assert_eq!(board.total(), 2 * board.faces().len());
    assert!(board.cards().iter().all(|c| !board.shows_face(c)));
    assert!(board.is_interactive());
}

#[test]
fn matching_flip_resolves_after_the_settle_delay() {
    let h = Harness::started(4);
    let (a, b) = h.pairs()[0];
    assert!(h.flip(a).is_accepted());
    assert!(h.flip(b).is_accepted());

    h.scheduler.advance_ms(400);
    assert_eq!(h.game.board().pending().len(), 2, "resolved before the settle delay");

    h.scheduler.advance_ms(RESOLVE_MS);
    let board = h.game.board();
    assert!(board.pending().is_empty());
    assert_eq!(board.matched_count(), 2);
    assert!(board.card(a).unwrap().is_matched());
    assert!(board.card(b).unwrap().is_matched());
}

#[test]
fn mismatch_turns_both_cards_back() {
    let h = Harness::started(4);
    let pairs = h.pairs();
    let (a, _) = pairs[0];
    let (c, _) = pairs[1];
    h.flip(a);
    h.flip(c);
    h.scheduler.advance_ms(RESOLVE_MS);

    let board = h.game.board();
    assert!(board.pending().is_empty());
    assert_eq!(board.matched_count(), 0);
    assert!(!board.card(a).unwrap().is_flipped());
    assert!(!board.card(c).unwrap().is_flipped());
    assert_eq!(
        h.count(|e| matches!(e, GameEvent::PairResolved(r) if !r.is_match())),
        1
    );
}

#[test]
fn third_flip_while_two_pending_is_dropped() {
    let h = Harness::started(4);
    let pairs = h.pairs();
    h.flip(pairs[0].0);
    h.flip(pairs[1].0);
    let clicks = h.game.board().click_count();

    assert_eq!(
        h.flip(pairs[2].0),
        FlipRequest::Ignored(FlipRejection::PendingFull)
    );
    let board = h.game.board();
    assert_eq!(board.click_count(), clicks);
    assert_eq!(board.pending(), &[pairs[0].0, pairs[1].0]);
    assert!(!board.card(pairs[2].0).unwrap().is_flipped());
}

#[test]
fn clearing_every_pair_wins_exactly_once() {
    let h = Harness::started(4);
    let pairs = h.pairs();

    // one miss first so the click count exceeds the minimum
    h.flip(pairs[0].0);
    h.flip(pairs[1].0);
    h.scheduler.advance_ms(RESOLVE_MS);

    for (a, b) in &pairs {
        h.flip(*a);
        h.flip(*b);
        h.scheduler.advance_ms(RESOLVE_MS);
    }
    h.scheduler.advance_ms(60_000);

    let wins: Vec<_> = h
        .events
        .borrow()
        .iter()
        .filter_map(|e| match e {
            GameEvent::RoundWon(summary) => Some(*summary),
            _ => None,
        })
        .collect();
    assert_eq!(wins.len(), 1);
    let summary = wins[0];
    assert_eq!(summary.clicks, 10);
    assert!(summary.clicks >= 2 * pairs.len() as u32);
    // last pair settles a little before the final advance ends
    assert!((5..=6).contains(&summary.elapsed_secs), "{summary:?}");
    assert!(summary.finished_at_ms > 0);

    assert_eq!(h.game.phase(), RoundPhase::Won);
    assert!(!h.game.board().is_interactive());
    assert_eq!(h.scheduler.pending_timers(), 0);
}

#[test]
fn shuffle_animation_keeps_matched_cards_in_place() {
    let h = Harness::started(6);
    let pairs = h.pairs();
    let (a, b) = pairs[0];
    h.flip(a);
    h.flip(b);
    h.scheduler.advance_ms(RESOLVE_MS);
    let pinned = {
        let board = h.game.board();
        (board.position(a), board.position(b))
    };

    // one card left face up when the animation begins
    h.flip(pairs[1].0);
    h.game
        .animate_shuffle(10, Duration::from_millis(200), ShuffleStyle::Hidden);
    assert!(!h.game.board().is_interactive());
    h.scheduler.advance_ms(2_000);
    assert_eq!(
        h.count(|e| matches!(e, GameEvent::ShuffleStep { .. })),
        20,
        "opening plus penalty animation steps"
    );
    h.scheduler.advance_ms(1_000);

    let board = h.game.board();
    assert_eq!((board.position(a), board.position(b)), pinned);
    assert_eq!(board.matched_count(), 2);
    assert_eq!(board.total(), 12);
    assert!(board.pending().is_empty());
    for card in board.cards().iter().filter(|c| !c.is_matched()) {
        assert!(!board.shows_face(card));
    }
    assert!(board.is_interactive());
}

#[test]
fn countdown_warns_then_reshuffles_on_expiry() {
    let config = GameConfig {
        countdown_secs: 8,
        countdown_warning_secs: 3,
        ..GameConfig::default()
    };
    let h = Harness::new(4, config);
    h.game.start_round();
    h.scheduler.advance_ms(5_000);
    assert_eq!(h.count(|e| *e == GameEvent::CountdownWarning), 1);
    assert_eq!(h.count(|e| *e == GameEvent::CountdownExpired), 0);

    h.scheduler.advance_ms(3_000);
    assert_eq!(h.count(|e| *e == GameEvent::CountdownExpired), 1);
    assert!(!h.game.board().is_interactive());
    assert!(!h.game.board().is_revealing());

    h.scheduler.advance_ms(OPENING_MS);
    assert!(h.game.board().is_interactive());
    assert_eq!(h.count(|e| *e == GameEvent::ShuffleSettled), 2);
    assert_eq!(h.game.board().matched_count(), 0);
}

#[test]
fn reset_cancels_a_pending_resolution() {
    let h = Harness::started(4);
    let (a, b) = h.pairs()[0];
    h.flip(a);
    h.flip(b);
    h.scheduler.advance_ms(100);

    h.game.reset_round();
    assert_eq!(h.scheduler.pending_timers(), 0);
    h.scheduler.advance_ms(10_000);

    assert_eq!(h.count(|e| matches!(e, GameEvent::PairResolved(_))), 0);
    assert_eq!(h.game.phase(), RoundPhase::Preview);
    let board = h.game.board();
    assert_eq!(board.total(), 8);
    assert_eq!(board.matched_count(), 0);
    assert!(!board.is_interactive());
    assert!(board.cards().iter().all(|c| board.shows_face(c)));
}

#[test]
fn restart_after_win_starts_clean() {
    let h = Harness::started(2);
    for (a, b) in h.pairs() {
        h.flip(a);
        h.flip(b);
        h.scheduler.advance_ms(RESOLVE_MS);
    }
    assert_eq!(h.game.phase(), RoundPhase::Won);

    h.game.reset_round();
    h.game.start_round();
    h.scheduler.advance_ms(OPENING_MS);
    let board = h.game.board();
    assert_eq!(h.game.phase(), RoundPhase::Playing);
    assert_eq!(board.matched_count(), 0);
    assert_eq!(board.click_count(), 0);
    assert!(board.is_interactive());
}

#[test]
fn elapsed_follows_the_clock() {
    let h = Harness::started(4);
    assert_eq!(h.game.elapsed(), Duration::from_millis(OPENING_MS));
    h.scheduler.advance_ms(1_500);
    assert_eq!(h.game.elapsed(), Duration::from_millis(OPENING_MS + 1_500));
}
