use std::cell::RefCell;
use std::rc::Rc;

use gtk4 as gtk;
use gtk4::glib;
use gtk4::pango;
use gtk4::prelude::*;

use super::state::AppState;
use crate::engine::{Card, CardStatus};

pub const CONTENT_MARGIN: i32 = 12;
pub const TILE_GAP: i32 = 6;

pub(super) fn redraw_button_child(button: &gtk::Button) {
    if let Some(child) = button.child() {
        child.queue_draw();
    }
}

pub(super) fn sync_board(st: &AppState) {
    let board = st.game.board();
    for (idx, button) in st.grid_buttons.iter().enumerate() {
        button.remove_css_class("matched");
        button.remove_css_class("active");
        button.remove_css_class("revealed");
        if let Some(card) = board.cards().get(idx) {
            match card.status() {
                CardStatus::Matched => button.add_css_class("matched"),
                CardStatus::Flipped => button.add_css_class("active"),
                CardStatus::Hidden if board.shows_face(card) => button.add_css_class("revealed"),
                CardStatus::Hidden => (),
            }
        }
        redraw_button_child(button);
    }
    if let Some(container) = &st.board_container {
        if board.is_interactive() {
            container.remove_css_class("no-hover");
        } else {
            container.add_css_class("no-hover");
        }
    }
}

pub fn handle_card_click(state: &Rc<RefCell<AppState>>, index: usize) {
    let game = state.borrow().game.clone();
    let id = game.board().cards().get(index).map(Card::id);
    if let Some(id) = id {
        game.request_card_flip(id);
    }
}

pub fn build_board_grid(state: &Rc<RefCell<AppState>>) -> gtk::Grid {
    let grid = gtk::Grid::new();
    grid.add_css_class("pairs-board");
    grid.set_row_spacing(TILE_GAP as u32);
    grid.set_column_spacing(TILE_GAP as u32);
    grid.set_halign(gtk::Align::Fill);
    grid.set_valign(gtk::Align::Fill);
    grid.set_hexpand(true);
    grid.set_vexpand(true);

    let (css_provider, grid_cols, grid_rows) = {
        let st = state.borrow();
        (st.dynamic_css_provider.clone(), st.grid_cols, st.grid_rows)
    };

    let update_styles = move |grid: &gtk::Grid| {
        let width = grid.width();
        let height = grid.height();
        if width > 0 && height > 0 {
            let cell_width = (width - (grid_cols - 1) * TILE_GAP) / grid_cols;
            let cell_height = (height - (grid_rows - 1) * TILE_GAP) / grid_rows;
            let card_radius = (cell_width.min(cell_height) as f64 * 0.15) as i32;
            if let Some(provider) = &css_provider {
                provider.load_from_data(&format!(
                    ".pairs-card {{ border-radius: {card_radius}px; }}"
                ));
            }
        }
    };

    let update_styles_clone = update_styles.clone();
    grid.connect_closure(
        "notify::width",
        false,
        glib::closure_local!(move |grid: gtk::Grid, _: glib::ParamSpec| {
            update_styles_clone(&grid);
        }),
    );
    grid.connect_closure(
        "notify::height",
        false,
        glib::closure_local!(move |grid: gtk::Grid, _: glib::ParamSpec| {
            update_styles(&grid);
        }),
    );

    let total = state.borrow().game.board().total();
    let mut buttons = Vec::with_capacity(total);

    for index in 0..total {
        let aspect_frame = gtk::AspectFrame::builder()
            .ratio(1.0)
            .obey_child(false)
            .halign(gtk::Align::Fill)
            .valign(gtk::Align::Fill)
            .hexpand(true)
            .vexpand(true)
            .build();

        let button = gtk::Button::builder()
            .css_classes(vec!["pairs-card"])
            .hexpand(true)
            .vexpand(true)
            .build();

        let drawing_area = gtk::DrawingArea::builder()
            .hexpand(true)
            .vexpand(true)
            .build();
        drawing_area.add_css_class("pairs-card-label");

        let state_draw = Rc::downgrade(state);
        drawing_area.set_draw_func(move |area, cr, width, height| {
            let Some(state) = state_draw.upgrade() else {
                return;
            };
            let st = state.borrow();
            let board = st.game.board();
            let Some(card) = board.cards().get(index) else {
                return;
            };
            let face = board.face_of(card).filter(|_| board.shows_face(card));
            let (glyph, caption) = match face {
                Some(face) => (face.glyph.as_str(), Some(face.label.as_str())),
                None => ("?", None),
            };

            let min_dim = width.min(height) as f64;
            cr.set_antialias(cairo::Antialias::Best);

            let fg = area.style_context().color();
            cr.set_source_rgba(
                fg.red() as f64,
                fg.green() as f64,
                fg.blue() as f64,
                fg.alpha() as f64,
            );

            let layout = pangocairo::functions::create_layout(cr);
            let mut font_desc = pango::FontDescription::new();
            if face.is_some() {
                font_desc.set_family("Noto Color Emoji, Apple Color Emoji, Segoe UI Emoji, sans");
                font_desc.set_size((min_dim * 0.36 * pango::SCALE as f64) as i32);
            } else {
                font_desc.set_family("Cantarell, Noto Sans, sans");
                font_desc.set_weight(pango::Weight::Bold);
                font_desc.set_size((min_dim * 0.34 * pango::SCALE as f64) as i32);
            }
            layout.set_font_description(Some(&font_desc));
            layout.set_text(glyph);
            let (glyph_width, glyph_height) = layout.pixel_size();
            let glyph_top = if caption.is_some() {
                height as f64 * 0.42 - glyph_height as f64 / 2.0
            } else {
                (height as f64 - glyph_height as f64) / 2.0
            };
            cr.move_to((width as f64 - glyph_width as f64) / 2.0, glyph_top);
            pangocairo::functions::show_layout(cr, &layout);

            if let Some(caption) = caption {
                let caption_layout = pangocairo::functions::create_layout(cr);
                let mut caption_font = pango::FontDescription::new();
                caption_font.set_family("Cantarell, Noto Sans, sans");
                caption_font.set_size((min_dim * 0.11 * pango::SCALE as f64) as i32);
                caption_layout.set_font_description(Some(&caption_font));
                caption_layout.set_text(caption);
                let (caption_width, _) = caption_layout.pixel_size();
                cr.move_to(
                    (width as f64 - caption_width as f64) / 2.0,
                    glyph_top + glyph_height as f64,
                );
                pangocairo::functions::show_layout(cr, &caption_layout);
            }
        });

        button.set_child(Some(&drawing_area));

        let state_click = state.clone();
        button.connect_clicked(move |_| {
            handle_card_click(&state_click, index);
        });

        aspect_frame.set_child(Some(&button));

        let x = index as i32 % grid_cols;
        let y = index as i32 / grid_cols;
        grid.attach(&aspect_frame, x, y, 1, 1);
        buttons.push(button);
    }

    {
        let mut st = state.borrow_mut();
        st.grid_buttons = buttons;
        sync_board(&st);
    }

    grid
}

pub(super) fn rebuild_board(state: &Rc<RefCell<AppState>>) {
    let (board_container, grid_cols, grid_rows) = {
        let st = state.borrow();
        (st.board_container.clone(), st.grid_cols, st.grid_rows)
    };
    let Some(board_container) = board_container else {
        return;
    };

    while let Some(child) = board_container.first_child() {
        board_container.remove(&child);
    }
    let grid = build_board_grid(state);
    let grid_ratio = if grid_rows > 0 {
        grid_cols as f32 / grid_rows as f32
    } else {
        1.0
    };
    let grid_frame = gtk::AspectFrame::new(0.5, 0.5, grid_ratio, false);
    grid_frame.set_halign(gtk::Align::Fill);
    grid_frame.set_valign(gtk::Align::Fill);
    grid_frame.set_hexpand(true);
    grid_frame.set_vexpand(true);
    grid_frame.set_child(Some(&grid));
    board_container.append(&grid_frame);
}
