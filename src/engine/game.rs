use std::cell::{Ref, RefCell};
use std::rc::{Rc, Weak};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use super::board::{Board, FlipRequest, MAX_FACES, MAX_PENDING, Resolution};
use super::card::CardId;
use super::config::GameConfig;
use super::countdown::{Countdown, CountdownSignal};
use super::faces::{Face, validate_faces};
use super::scheduler::{ControlFlow, Scheduler, TimerHandle};
use crate::error::{Error, Result};

/// What a won round reports to history and dialogs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub finished_at_ms: u64,
    pub elapsed_secs: u64,
    pub clicks: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShuffleStyle {
    /// Faces stay visible while cards move, as in the opening preview.
    Reveal,
    /// Cards move face down.
    Hidden,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundPhase {
    /// Fresh deck on display, not accepting input.
    Preview,
    Playing,
    Won,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    RoundReset,
    RoundStarted,
    CardFlipped(CardId),
    PairResolved(Resolution),
    ShuffleStep { step: u32, of: u32 },
    ShuffleSettled,
    CountdownTick { remaining: u32, duration: u32 },
    CountdownWarning,
    CountdownExpired,
    RoundWon(RoundSummary),
}

type Listener = Rc<dyn Fn(&GameEvent)>;

#[derive(Default)]
struct Timers {
    poll: Option<TimerHandle>,
    settle: Option<TimerHandle>,
    animation: Option<TimerHandle>,
    countdown: Option<TimerHandle>,
}

impl Timers {
    fn cancel_all(&mut self) {
        for handle in [
            self.poll.take(),
            self.settle.take(),
            self.animation.take(),
            self.countdown.take(),
        ]
        .into_iter()
        .flatten()
        {
            handle.cancel();
        }
    }
}

struct GameState {
    config: GameConfig,
    faces: Vec<Face>,
    board: Board,
    rng: StdRng,
    round_id: u64,
    phase: RoundPhase,
    started_at: Option<Duration>,
    countdown: Countdown,
    timers: Timers,
}

/// Round lifecycle, the fixed-rate poll loop and win detection.
///
/// Cheap to clone; clones share one game. Events are delivered to listeners
/// after internal state has been released, so listeners may call back in.
#[derive(Clone)]
pub struct Game {
    state: Rc<RefCell<GameState>>,
    listeners: Rc<RefCell<Vec<Listener>>>,
    scheduler: Rc<dyn Scheduler>,
}

#[derive(Clone)]
struct WeakGame {
    state: Weak<RefCell<GameState>>,
    listeners: Weak<RefCell<Vec<Listener>>>,
    scheduler: Weak<dyn Scheduler>,
}

impl WeakGame {
    fn upgrade(&self) -> Option<Game> {
        Some(Game {
            state: self.state.upgrade()?,
            listeners: self.listeners.upgrade()?,
            scheduler: self.scheduler.upgrade()?,
        })
    }
}

impl Game {
    pub fn new(config: GameConfig, faces: Vec<Face>, scheduler: Rc<dyn Scheduler>) -> Result<Self> {
        Self::with_rng(config, faces, scheduler, StdRng::from_rng(&mut rand::rng()))
    }

    pub fn with_seed(
        config: GameConfig,
        faces: Vec<Face>,
        scheduler: Rc<dyn Scheduler>,
        seed: u64,
    ) -> Result<Self> {
        Self::with_rng(config, faces, scheduler, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        config: GameConfig,
        faces: Vec<Face>,
        scheduler: Rc<dyn Scheduler>,
        rng: StdRng,
    ) -> Result<Self> {
        config.validate()?;
        if faces.is_empty() {
            return Err(Error::InvalidConfig("face set is empty".into()));
        }
        if faces.len() > MAX_FACES {
            return Err(Error::InvalidConfig(format!(
                "{} faces given, at most {} are supported",
                faces.len(),
                MAX_FACES
            )));
        }
        validate_faces(&faces)?;
        let countdown = Countdown::new(config.countdown_secs, config.countdown_warning_secs);
        let state = GameState {
            config,
            faces,
            board: Board::new(),
            rng,
            round_id: 0,
            phase: RoundPhase::Preview,
            started_at: None,
            countdown,
            timers: Timers::default(),
        };
        Ok(Game {
            state: Rc::new(RefCell::new(state)),
            listeners: Rc::new(RefCell::new(Vec::new())),
            scheduler,
        })
    }

    fn downgrade(&self) -> WeakGame {
        WeakGame {
            state: Rc::downgrade(&self.state),
            listeners: Rc::downgrade(&self.listeners),
            scheduler: Rc::downgrade(&self.scheduler),
        }
    }

    pub fn subscribe(&self, listener: impl Fn(&GameEvent) + 'static) {
        self.listeners.borrow_mut().push(Rc::new(listener));
    }

    fn emit(&self, events: Vec<GameEvent>) {
        if events.is_empty() {
            return;
        }
        let listeners: Vec<Listener> = self.listeners.borrow().clone();
        for event in &events {
            for listener in &listeners {
                listener(event);
            }
        }
    }

    pub fn board(&self) -> Ref<'_, Board> {
        Ref::map(self.state.borrow(), |st| &st.board)
    }

    pub fn face_count(&self) -> usize {
        self.state.borrow().faces.len()
    }

    pub fn phase(&self) -> RoundPhase {
        self.state.borrow().phase
    }

    pub fn countdown(&self) -> Countdown {
        self.state.borrow().countdown.clone()
    }

    /// Time since the current round started, zero outside a round.
    pub fn elapsed(&self) -> Duration {
        let st = self.state.borrow();
        match (st.phase, st.started_at) {
            (RoundPhase::Playing, Some(started)) => self.scheduler.now().saturating_sub(started),
            _ => Duration::ZERO,
        }
    }

    /// Deals a fresh deck, plays the opening shuffle and starts the poll loop and countdown.
    pub fn start_round(&self) {
        let (iterations, interval) = {
            let mut st = self.state.borrow_mut();
            st.timers.cancel_all();
            st.round_id += 1;
            let GameState {
                board, faces, rng, ..
            } = &mut *st;
            board.init_round(faces, rng);
            st.phase = RoundPhase::Playing;
            st.started_at = Some(self.scheduler.now());
            st.countdown.stop();
            self.start_poll(&mut st);
            self.start_countdown(&mut st);
            info!("round {} started with {} cards", st.round_id, st.board.total());
            (st.config.shuffle_iterations, st.config.shuffle_interval())
        };
        self.emit(vec![GameEvent::RoundStarted]);
        self.animate_shuffle(iterations, interval, ShuffleStyle::Reveal);
    }

    /// Stops every timer and lays out a fresh face-up deck that takes no input.
    pub fn reset_round(&self) {
        {
            let mut st = self.state.borrow_mut();
            st.timers.cancel_all();
            st.round_id += 1;
            st.board.clear();
            let GameState {
                board, faces, rng, ..
            } = &mut *st;
            board.init_round(faces, rng);
            board.set_interactive(false);
            board.begin_reveal();
            st.phase = RoundPhase::Preview;
            st.started_at = None;
            st.countdown.stop();
            info!("round reset, now {}", st.round_id);
        }
        self.emit(vec![GameEvent::RoundReset]);
    }

    /// Cancels every timer without touching the board.
    pub fn shutdown(&self) {
        let mut st = self.state.borrow_mut();
        st.timers.cancel_all();
        st.round_id += 1;
    }

    pub fn request_card_flip(&self, id: CardId) -> FlipRequest {
        let outcome = self.state.borrow_mut().board.request_card_flip(id);
        match outcome {
            FlipRequest::Accepted { pending } => {
                debug!("flipped {:?}, {} pending", id, pending);
                self.emit(vec![GameEvent::CardFlipped(id)]);
            }
            FlipRequest::Ignored(reason) => debug!("flip of {:?} ignored: {:?}", id, reason),
        }
        outcome
    }

    fn start_poll(&self, st: &mut GameState) {
        let weak = self.downgrade();
        let round_id = st.round_id;
        let handle = self.scheduler.every(
            st.config.poll_interval(),
            Box::new(move || match weak.upgrade() {
                Some(game) => game.poll_tick(round_id),
                None => ControlFlow::Break,
            }),
        );
        st.timers.poll = Some(handle);
    }

    fn poll_tick(&self, round_id: u64) -> ControlFlow {
        let mut st = self.state.borrow_mut();
        if st.round_id != round_id || st.phase != RoundPhase::Playing {
            return ControlFlow::Break;
        }
        if st.board.pending().len() == MAX_PENDING && st.timers.settle.is_none() {
            let weak = self.downgrade();
            let handle = self.scheduler.after(
                st.config.settle_delay(),
                Box::new(move || {
                    if let Some(game) = weak.upgrade() {
                        game.resolve_settled(round_id);
                    }
                }),
            );
            st.timers.settle = Some(handle);
        }
        ControlFlow::Continue
    }

    fn resolve_settled(&self, round_id: u64) {
        let events = {
            let mut st = self.state.borrow_mut();
            if st.round_id != round_id {
                return;
            }
            st.timers.settle = None;
            let mut events = Vec::new();
            if let Some(resolution) = st.board.resolve_pending() {
                events.push(GameEvent::PairResolved(resolution));
            }
            if st.phase == RoundPhase::Playing && st.board.is_complete() {
                events.push(GameEvent::RoundWon(self.finish_round(&mut st)));
            }
            events
        };
        self.emit(events);
    }

    fn finish_round(&self, st: &mut GameState) -> RoundSummary {
        st.timers.cancel_all();
        st.phase = RoundPhase::Won;
        st.board.set_interactive(false);
        st.countdown.stop();
        let elapsed = st
            .started_at
            .map(|started| self.scheduler.now().saturating_sub(started))
            .unwrap_or_default();
        let finished_at_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|since| since.as_millis() as u64)
            .unwrap_or_default();
        let summary = RoundSummary {
            finished_at_ms,
            elapsed_secs: elapsed.as_secs(),
            clicks: st.board.click_count(),
        };
        info!(
            "round {} won in {}s with {} clicks",
            st.round_id, summary.elapsed_secs, summary.clicks
        );
        summary
    }

    fn start_countdown(&self, st: &mut GameState) {
        let weak = self.downgrade();
        let round_id = st.round_id;
        let handle = self.scheduler.every(
            Duration::from_secs(1),
            Box::new(move || match weak.upgrade() {
                Some(game) => game.countdown_tick(round_id),
                None => ControlFlow::Break,
            }),
        );
        st.timers.countdown = Some(handle);
    }

    fn countdown_tick(&self, round_id: u64) -> ControlFlow {
        let (events, penalty) = {
            let mut st = self.state.borrow_mut();
            if st.round_id != round_id || st.phase != RoundPhase::Playing {
                return ControlFlow::Break;
            }
            let signal = st.countdown.tick();
            let mut events = vec![GameEvent::CountdownTick {
                remaining: st.countdown.remaining(),
                duration: st.countdown.duration(),
            }];
            let penalty = match signal {
                CountdownSignal::Running => None,
                CountdownSignal::NearExpiry => {
                    events.push(GameEvent::CountdownWarning);
                    None
                }
                CountdownSignal::Expired => {
                    debug!("countdown expired in round {}", round_id);
                    events.push(GameEvent::CountdownExpired);
                    Some((st.config.shuffle_iterations, st.config.shuffle_interval()))
                }
            };
            (events, penalty)
        };
        self.emit(events);
        if let Some((iterations, interval)) = penalty {
            self.animate_shuffle(iterations, interval, ShuffleStyle::Hidden);
        }
        ControlFlow::Continue
    }

    /// Reorders unmatched cards `iterations` times, one step per `interval`, then
    /// waits the configured settle time and turns every unmatched card face down.
    /// Match state is never touched. A running animation is replaced.
    pub fn animate_shuffle(&self, iterations: u32, interval: Duration, style: ShuffleStyle) {
        let mut st = self.state.borrow_mut();
        if let Some(previous) = st.timers.animation.take() {
            previous.cancel();
        }
        if st.board.total() == 0 {
            return;
        }
        st.board.set_interactive(false);
        if style == ShuffleStyle::Reveal {
            st.board.begin_reveal();
        }
        let round_id = st.round_id;
        if iterations == 0 {
            self.schedule_shuffle_settle(&mut st, round_id);
            return;
        }

        let weak = self.downgrade();
        let mut step = 0;
        let handle = self.scheduler.every(
            interval,
            Box::new(move || {
                let Some(game) = weak.upgrade() else {
                    return ControlFlow::Break;
                };
                step += 1;
                game.shuffle_step(round_id, step, iterations)
            }),
        );
        st.timers.animation = Some(handle);
    }

    fn shuffle_step(&self, round_id: u64, step: u32, iterations: u32) -> ControlFlow {
        let flow = {
            let mut st = self.state.borrow_mut();
            if st.round_id != round_id {
                return ControlFlow::Break;
            }
            let GameState { board, rng, .. } = &mut *st;
            board.reshuffle_unmatched(rng);
            if step >= iterations {
                self.schedule_shuffle_settle(&mut st, round_id);
                ControlFlow::Break
            } else {
                ControlFlow::Continue
            }
        };
        self.emit(vec![GameEvent::ShuffleStep {
            step,
            of: iterations,
        }]);
        flow
    }

    fn schedule_shuffle_settle(&self, st: &mut GameState, round_id: u64) {
        let weak = self.downgrade();
        let handle = self.scheduler.after(
            st.config.shuffle_settle(),
            Box::new(move || {
                if let Some(game) = weak.upgrade() {
                    game.finish_shuffle(round_id);
                }
            }),
        );
        st.timers.animation = Some(handle);
    }

    fn finish_shuffle(&self, round_id: u64) {
        {
            let mut st = self.state.borrow_mut();
            if st.round_id != round_id {
                return;
            }
            st.timers.animation = None;
            // pending flips are dropped by the settle, so a queued resolution has nothing to do
            if let Some(settle) = st.timers.settle.take() {
                settle.cancel();
            }
            st.board.settle();
            let playing = st.phase == RoundPhase::Playing;
            st.board.set_interactive(playing);
        }
        self.emit(vec![GameEvent::ShuffleSettled]);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::engine::faces::default_faces;
    use crate::engine::scheduler::ManualScheduler;

    fn game(scheduler: &Rc<ManualScheduler>) -> Game {
        let faces = default_faces().into_iter().take(2).collect();
        Game::with_seed(GameConfig::default(), faces, scheduler.clone(), 11).unwrap()
    }

    #[test]
    fn rejects_bad_setup() {
        let scheduler: Rc<dyn Scheduler> = Rc::new(ManualScheduler::new());
        assert!(Game::new(GameConfig::default(), Vec::new(), scheduler.clone()).is_err());
        let twice = vec![Face::new("x", "X", "X"), Face::new("x", "X", "X")];
        assert!(matches!(
            Game::new(GameConfig::default(), twice, scheduler),
            Err(Error::DuplicateFace(_))
        ));
    }

    #[test]
    fn rejects_more_faces_than_pair_ids() {
        let scheduler: Rc<dyn Scheduler> = Rc::new(ManualScheduler::new());
        let faces: Vec<Face> = (0..=MAX_FACES)
            .map(|i| {
                let key = format!("face-{i}");
                Face::new(&key, &key, "?")
            })
            .collect();
        assert!(matches!(
            Game::new(GameConfig::default(), faces, scheduler),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn listeners_may_reenter() {
        let scheduler = Rc::new(ManualScheduler::new());
        let game = game(&scheduler);
        let seen = Rc::new(Cell::new(0usize));
        let observer = game.clone();
        let counter = seen.clone();
        game.subscribe(move |event| {
            if *event == GameEvent::RoundStarted {
                counter.set(observer.board().total());
            }
        });
        game.start_round();
        assert_eq!(seen.get(), 4);
    }

    #[test]
    fn board_is_closed_until_the_opening_shuffle_settles() {
        let scheduler = Rc::new(ManualScheduler::new());
        let game = game(&scheduler);
        game.start_round();
        assert!(!game.board().is_interactive());
        assert!(game.board().is_revealing());
        scheduler.advance_ms(10 * 200 + 1000);
        assert!(game.board().is_interactive());
        assert!(!game.board().is_revealing());
    }

    #[test]
    fn dropped_game_stops_its_timers() {
        let scheduler = Rc::new(ManualScheduler::new());
        {
            let game = game(&scheduler);
            game.start_round();
        }
        scheduler.advance_ms(5_000);
        assert_eq!(scheduler.pending_timers(), 0);
    }
}
