//! Toolkit-free game rules: deck, flips, pair resolution and the timers around them.

pub mod board;
pub mod card;
pub mod config;
pub mod countdown;
pub mod faces;
pub mod game;
pub mod history;
pub mod scheduler;
pub mod shuffle;

pub use board::{Board, FlipRejection, FlipRequest, MAX_FACES, MAX_PENDING, Resolution};
pub use card::{Card, CardId, CardStatus, PairId};
pub use config::GameConfig;
pub use countdown::{Countdown, CountdownSignal};
pub use faces::{Face, default_faces};
pub use game::{Game, GameEvent, RoundPhase, RoundSummary, ShuffleStyle};
pub use history::{GameHistory, HistoryRecord};
pub use scheduler::{ControlFlow, ManualScheduler, Scheduler, TimerHandle};
