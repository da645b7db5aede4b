use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::{Rc, Weak};
use std::sync::Once;

use gtk4 as gtk;
use gtk4::glib;
use gtk4::prelude::*;
use libadwaita as adw;
use adw::prelude::*;
use gio::SimpleAction;
use log::{error, warn};

use super::board::{CONTENT_MARGIN, rebuild_board, sync_board};
use super::dialogs::{show_about_dialog, show_instructions_dialog, show_win_dialog};
use super::history::show_history_dialog;
use super::hud::{update_countdown, update_subtitle};
use super::state::AppState;
use super::timers::GlibScheduler;
use crate::engine::{Game, GameConfig, GameEvent, GameHistory, default_faces};

const APP_ID: &str = "io.github.pairs.Pairs";
const CONFIG_FILE_NAME: &str = "config.json";
const HISTORY_FILE_NAME: &str = "history.json";

fn data_dir() -> PathBuf {
    glib::user_config_dir().join("pairs")
}

fn handle_game_event(state: &Rc<RefCell<AppState>>, event: &GameEvent) {
    match event {
        GameEvent::RoundWon(summary) => {
            {
                let mut st = state.borrow_mut();
                if let Err(err) = st.history.add_record(summary) {
                    warn!("could not record finished round: {}", err);
                }
                sync_board(&st);
                update_subtitle(&st);
            }
            show_win_dialog(state, *summary);
        }
        GameEvent::RoundStarted | GameEvent::RoundReset => {
            let st = state.borrow();
            update_countdown(&st);
            sync_board(&st);
            update_subtitle(&st);
        }
        GameEvent::CountdownTick { .. } => {
            let st = state.borrow();
            update_countdown(&st);
            update_subtitle(&st);
        }
        GameEvent::CountdownWarning | GameEvent::CountdownExpired => {
            update_countdown(&state.borrow());
        }
        GameEvent::ShuffleStep { .. } => {
            let st = state.borrow();
            if let Some(container) = &st.board_container {
                container.add_css_class("shuffling");
            }
            sync_board(&st);
        }
        GameEvent::ShuffleSettled => {
            let st = state.borrow();
            if let Some(container) = &st.board_container {
                container.remove_css_class("shuffling");
            }
            sync_board(&st);
        }
        GameEvent::CardFlipped(_) | GameEvent::PairResolved(_) => {
            let st = state.borrow();
            sync_board(&st);
            update_subtitle(&st);
        }
    }
}

fn connect_game_events(state: &Rc<RefCell<AppState>>) {
    let weak: Weak<RefCell<AppState>> = Rc::downgrade(state);
    let game = state.borrow().game.clone();
    game.subscribe(move |event| {
        if let Some(state) = weak.upgrade() {
            handle_game_event(&state, event);
        }
    });
}

fn new_round(state: &Rc<RefCell<AppState>>) {
    let game = state.borrow().game.clone();
    game.reset_round();
    game.start_round();
}

fn build_game_view(state: &Rc<RefCell<AppState>>) -> gtk::Box {
    let root = gtk::Box::new(gtk::Orientation::Vertical, 0);
    root.set_hexpand(true);
    root.set_vexpand(true);
    root.add_css_class("game-root");

    let content = gtk::Box::new(gtk::Orientation::Vertical, 12);
    content.set_hexpand(true);
    content.set_vexpand(true);
    content.set_margin_top(CONTENT_MARGIN);
    content.set_margin_bottom(CONTENT_MARGIN);
    content.set_margin_start(CONTENT_MARGIN);
    content.set_margin_end(CONTENT_MARGIN);

    let countdown_bar = gtk::ProgressBar::new();
    countdown_bar.add_css_class("countdown");
    countdown_bar.set_show_text(true);
    content.append(&countdown_bar);

    let board_frame = gtk::AspectFrame::new(0.5, 0.5, 1.0, false);
    board_frame.set_halign(gtk::Align::Fill);
    board_frame.set_valign(gtk::Align::Fill);
    board_frame.set_hexpand(true);
    board_frame.set_vexpand(true);

    let board_card = gtk::Box::new(gtk::Orientation::Vertical, 0);
    board_card.set_hexpand(true);
    board_card.set_vexpand(true);
    board_card.add_css_class("pairs-card-container");
    board_frame.set_child(Some(&board_card));
    content.append(&board_frame);
    root.append(&content);

    {
        let mut st = state.borrow_mut();
        st.board_container = Some(board_card);
        st.countdown_bar = Some(countdown_bar);
    }
    rebuild_board(state);

    root
}

fn load_css() {
    static CSS_INIT: Once = Once::new();
    CSS_INIT.call_once(|| {
        let provider = gtk::CssProvider::new();
        provider.load_from_data(include_str!("style.css"));
        if let Some(display) = gtk::gdk::Display::default() {
            gtk::style_context_add_provider_for_display(
                &display,
                &provider,
                gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
            );
        }
    });
}

fn build_app_state() -> Option<Rc<RefCell<AppState>>> {
    let dir = data_dir();
    let config = GameConfig::load_or_default(&dir.join(CONFIG_FILE_NAME));
    let mut history = GameHistory::open(dir.join(HISTORY_FILE_NAME));
    history.set_limit(config.history_limit);

    let game = match Game::new(config, default_faces(), Rc::new(GlibScheduler::new())) {
        Ok(game) => game,
        Err(err) => {
            error!("cannot set up the game: {}", err);
            return None;
        }
    };
    game.reset_round();
    Some(Rc::new(RefCell::new(AppState::new(game, history))))
}

pub fn run() -> glib::ExitCode {
    glib::set_prgname(Some(APP_ID));
    let app = adw::Application::builder().application_id(APP_ID).build();

    app.connect_activate(move |app| {
        load_css();

        let Some(state) = build_app_state() else {
            app.quit();
            return;
        };

        let instructions_action = SimpleAction::new("instructions", None);
        instructions_action.connect_activate({
            let app = app.clone();
            move |_, _| {
                show_instructions_dialog(&app);
            }
        });
        app.add_action(&instructions_action);

        let about_action = SimpleAction::new("about", None);
        about_action.connect_activate({
            let app = app.clone();
            move |_, _| {
                show_about_dialog(&app);
            }
        });
        app.add_action(&about_action);

        let history_action = SimpleAction::new("history", None);
        history_action.connect_activate({
            let app = app.clone();
            let state = state.clone();
            move |_, _| {
                show_history_dialog(&state, &app);
            }
        });
        app.add_action(&history_action);

        let quit_action = SimpleAction::new("quit", None);
        quit_action.connect_activate({
            let app = app.clone();
            move |_, _| app.quit()
        });
        app.add_action(&quit_action);

        let dynamic_css_provider = gtk::CssProvider::new();
        if let Some(display) = gtk::gdk::Display::default() {
            gtk::style_context_add_provider_for_display(
                &display,
                &dynamic_css_provider,
                gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
            );
        }

        let title_game_box = gtk::Box::new(gtk::Orientation::Vertical, 0);
        title_game_box.set_valign(gtk::Align::Center);
        title_game_box.set_halign(gtk::Align::Center);

        let title_game_main = gtk::Label::builder()
            .label("Pairs")
            .halign(gtk::Align::Center)
            .css_classes(vec!["game-title-main"])
            .build();
        let title_game_subtitle = gtk::Label::builder()
            .label("")
            .halign(gtk::Align::Center)
            .css_classes(vec!["game-title-subtitle", "caption"])
            .build();
        title_game_box.append(&title_game_main);
        title_game_box.append(&title_game_subtitle);

        let header = adw::HeaderBar::builder()
            .title_widget(&title_game_box)
            .build();
        header.add_css_class("app-header");
        header.add_css_class("flat");

        let menu_model = gio::Menu::new();
        menu_model.append(Some("History"), Some("app.history"));
        menu_model.append(Some("Instructions"), Some("app.instructions"));
        menu_model.append(Some("About Pairs"), Some("app.about"));
        menu_model.append(Some("Quit"), Some("app.quit"));
        let menu_button = gtk::MenuButton::builder()
            .icon_name("open-menu-symbolic")
            .menu_model(&menu_model)
            .build();

        let restart_button = gtk::Button::builder()
            .icon_name("view-refresh-symbolic")
            .build();
        restart_button.set_tooltip_text(Some("New Game"));
        restart_button.connect_clicked({
            let state = state.clone();
            move |_| new_round(&state)
        });
        let end_box = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        end_box.append(&restart_button);
        end_box.append(&menu_button);
        header.pack_end(&end_box);

        {
            let mut st = state.borrow_mut();
            st.title_game_subtitle = Some(title_game_subtitle);
            st.dynamic_css_provider = Some(dynamic_css_provider);
        }

        let game_view = build_game_view(&state);

        let toolbar = adw::ToolbarView::new();
        toolbar.set_hexpand(true);
        toolbar.set_vexpand(true);
        toolbar.add_top_bar(&header);
        toolbar.set_content(Some(&game_view));

        let win = adw::ApplicationWindow::builder()
            .application(app)
            .title("Pairs")
            .icon_name(APP_ID)
            .default_width(720)
            .default_height(780)
            .content(&toolbar)
            .build();
        win.set_size_request(360, 480);
        win.add_css_class("app-window");

        win.connect_close_request({
            let state = state.clone();
            move |_| {
                let game = state.borrow().game.clone();
                game.shutdown();
                gtk::glib::Propagation::Proceed
            }
        });

        state.borrow_mut().window = Some(win.clone());
        connect_game_events(&state);
        {
            let st = state.borrow();
            update_countdown(&st);
            update_subtitle(&st);
        }
        win.present();
        new_round(&state);
    });

    app.run()
}
