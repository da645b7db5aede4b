use std::cell::RefCell;
use std::rc::Rc;

use gtk4 as gtk;
use libadwaita as adw;

use adw::prelude::*;

use super::hud::format_mm_ss;
use super::state::AppState;
use crate::engine::RoundSummary;

pub fn show_instructions_dialog(app: &adw::Application) -> adw::AlertDialog {
    let dialog = adw::AlertDialog::new(
        Some("Instructions"),
        Some(
            "Watch the flags while the deck shuffles.\n\
Flip two cards at a time to find matching pairs.\n\
When the timer runs out, the hidden cards shuffle again.",
        ),
    );
    dialog.add_response("ok", "Got it");
    dialog.set_default_response(Some("ok"));
    dialog.set_close_response("ok");
    dialog.present(app.active_window().as_ref());
    dialog
}

pub fn show_about_dialog(app: &adw::Application) -> adw::AboutDialog {
    let dialog = adw::AboutDialog::builder()
        .application_name("Pairs")
        .application_icon("io.github.pairs.Pairs")
        .version(env!("CARGO_PKG_VERSION"))
        .comments("A memory game for finding pairs of flags.")
        .build();
    dialog.add_legal_section("Pairs", None, gtk::License::MitX11, None);
    dialog.present(app.active_window().as_ref());
    dialog
}

pub(super) fn show_win_dialog(state: &Rc<RefCell<AppState>>, summary: RoundSummary) {
    let dialog = adw::AlertDialog::new(
        Some("All pairs found!"),
        Some(&format!(
            "Time: {}\nClicks: {}",
            format_mm_ss(summary.elapsed_secs),
            summary.clicks
        )),
    );
    dialog.add_response("continue", "Continue");
    dialog.set_default_response(Some("continue"));
    dialog.set_close_response("continue");

    let state_next = state.clone();
    dialog.connect_response(None, move |_, _| {
        let game = state_next.borrow().game.clone();
        game.reset_round();
        game.start_round();
    });

    let window = state.borrow().window.clone();
    dialog.present(window.as_ref());
}
