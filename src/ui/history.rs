use std::cell::RefCell;
use std::rc::Rc;

use gtk4 as gtk;
use gtk4::glib;
use libadwaita as adw;
use adw::prelude::*;
use log::warn;

use super::hud::format_mm_ss;
use super::state::AppState;
use crate::engine::{GameHistory, HistoryRecord};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DateRange {
    AllTime,
    Today,
    LastDays(i64),
}

const DATE_RANGES: [(&str, DateRange); 4] = [
    ("All time", DateRange::AllTime),
    ("Today", DateRange::Today),
    ("Last 7 days", DateRange::LastDays(7)),
    ("Last 30 days", DateRange::LastDays(30)),
];
const SECS_PER_DAY: i64 = 24 * 60 * 60;

fn now_unix() -> i64 {
    glib::DateTime::now_local()
        .map(|dt| dt.to_unix())
        .unwrap_or_default()
}

fn local_midnight() -> i64 {
    glib::DateTime::now_local()
        .and_then(|now| {
            glib::DateTime::from_local(now.year(), now.month(), now.day_of_month(), 0, 0, 0.0)
        })
        .map(|dt| dt.to_unix())
        .unwrap_or_else(|_| now_unix() - SECS_PER_DAY)
}

fn range_start(range: DateRange) -> Option<i64> {
    match range {
        DateRange::AllTime => None,
        DateRange::Today => Some(local_midnight()),
        DateRange::LastDays(days) => Some(now_unix() - days * SECS_PER_DAY),
    }
}

fn date_label(record: &HistoryRecord) -> String {
    glib::DateTime::from_unix_local(record.date)
        .and_then(|dt| dt.format("%Y-%m-%d %H:%M"))
        .map(|text| text.to_string())
        .unwrap_or_else(|_| "Unknown date".to_string())
}

fn table_cell(text: &str, class_name: &str, width_chars: i32) -> gtk::Label {
    let label = gtk::Label::new(Some(text));
    label.add_css_class(class_name);
    label.add_css_class("body");
    label.set_halign(gtk::Align::Fill);
    label.set_hexpand(true);
    label.set_xalign(0.5);
    label.set_width_chars(width_chars);
    label
}

fn build_history_grid(history: &GameHistory) -> gtk::Widget {
    let rows = history.view();
    if rows.is_empty() {
        let empty = gtk::Label::new(Some("No previous records."));
        empty.add_css_class("dim-label");
        empty.set_margin_top(12);
        return empty.upcast();
    }

    let grid = gtk::Grid::new();
    grid.set_halign(gtk::Align::Fill);
    grid.set_hexpand(true);
    grid.set_column_homogeneous(true);
    grid.set_column_spacing(10);
    grid.set_row_spacing(5);
    grid.attach(&table_cell("Date", "score-table-head", 16), 0, 0, 1, 1);
    grid.attach(&table_cell("Time", "score-table-head", 6), 1, 0, 1, 1);
    grid.attach(&table_cell("Clicks", "score-table-head", 6), 2, 0, 1, 1);

    for (idx, record) in rows.iter().enumerate() {
        let row = idx as i32 + 1;
        grid.attach(&table_cell(&date_label(record), "score-table-row", 16), 0, row, 1, 1);
        grid.attach(
            &table_cell(&format_mm_ss(record.duration), "score-table-row", 6),
            1,
            row,
            1,
            1,
        );
        grid.attach(
            &table_cell(&record.clicks.to_string(), "score-table-row", 6),
            2,
            row,
            1,
            1,
        );
    }
    grid.upcast()
}

fn refill(list: &gtk::Box, state: &Rc<RefCell<AppState>>) {
    while let Some(child) = list.first_child() {
        list.remove(&child);
    }
    let st = state.borrow();
    list.append(&build_history_grid(&st.history));
}

pub fn show_history_dialog(state: &Rc<RefCell<AppState>>, app: &adw::Application) -> adw::Dialog {
    let dialog = adw::Dialog::new();
    dialog.set_can_close(true);
    dialog.set_content_width(420);

    let title = gtk::Label::new(Some("HISTORY"));
    title.add_css_class("game-title-main");

    let header = adw::HeaderBar::new();
    header.set_title_widget(Some(&title));
    header.set_show_end_title_buttons(true);

    let list = gtk::Box::new(gtk::Orientation::Vertical, 4);
    list.add_css_class("score-list-page");
    list.set_hexpand(true);

    let range_picker = gtk::DropDown::from_strings(&DATE_RANGES.map(|(label, _)| label));
    range_picker.set_tooltip_text(Some("Show records from"));
    range_picker.connect_selected_notify({
        let state = state.clone();
        let list = list.clone();
        move |picker| {
            let start = DATE_RANGES
                .get(picker.selected() as usize)
                .and_then(|(_, range)| range_start(*range));
            {
                let mut st = state.borrow_mut();
                match start {
                    Some(start) => st.history.set_date_filter(Some(start), None),
                    None => {
                        let limit = st.history.limit();
                        st.history.clear_filters();
                        st.history.set_limit(limit);
                    }
                }
            }
            refill(&list, &state);
        }
    });

    let limit = state.borrow().history.limit().unwrap_or(0);
    let limit_spin = gtk::SpinButton::with_range(0.0, 100.0, 1.0);
    limit_spin.set_value(limit as f64);
    limit_spin.set_tooltip_text(Some("Rows to show (0 shows all)"));
    limit_spin.connect_value_changed({
        let state = state.clone();
        let list = list.clone();
        move |spin| {
            let rows = spin.value_as_int().max(0) as usize;
            state
                .borrow_mut()
                .history
                .set_limit((rows > 0).then_some(rows));
            refill(&list, &state);
        }
    });

    let clear_button = gtk::Button::builder()
        .icon_name("user-trash-symbolic")
        .tooltip_text("Clear history")
        .build();
    clear_button.add_css_class("flat");
    clear_button.connect_clicked({
        let state = state.clone();
        let list = list.clone();
        move |_| {
            if let Err(err) = state.borrow_mut().history.clear() {
                warn!("could not clear history: {}", err);
            }
            refill(&list, &state);
        }
    });
    header.pack_start(&clear_button);

    let controls = gtk::Box::new(gtk::Orientation::Horizontal, 8);
    controls.set_halign(gtk::Align::Center);
    controls.append(&range_picker);
    controls.append(&limit_spin);

    let content = gtk::Box::new(gtk::Orientation::Vertical, 8);
    content.set_margin_top(10);
    content.set_margin_bottom(10);
    content.set_margin_start(10);
    content.set_margin_end(10);
    content.append(&controls);
    content.append(&list);
    refill(&list, state);

    let toolbar = adw::ToolbarView::new();
    toolbar.add_top_bar(&header);
    toolbar.set_content(Some(&content));

    dialog.set_child(Some(&toolbar));
    dialog.present(app.active_window().as_ref());
    dialog
}
