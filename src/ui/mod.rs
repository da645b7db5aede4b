mod app;
mod board;
mod dialogs;
mod history;
mod hud;
mod state;
mod timers;

pub use app::run;
pub use timers::GlibScheduler;
