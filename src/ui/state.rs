use gtk4 as gtk;
use libadwaita as adw;

use crate::engine::{Game, GameHistory};

pub struct AppState {
    pub window: Option<adw::ApplicationWindow>,
    pub title_game_subtitle: Option<gtk::Label>,
    pub countdown_bar: Option<gtk::ProgressBar>,
    pub board_container: Option<gtk::Box>,
    pub dynamic_css_provider: Option<gtk::CssProvider>,
    pub grid_buttons: Vec<gtk::Button>,
    pub grid_cols: i32,
    pub grid_rows: i32,

    pub game: Game,
    pub history: GameHistory,
}

impl AppState {
    pub fn new(game: Game, history: GameHistory) -> Self {
        let (grid_cols, grid_rows) = grid_dims(game.face_count() * 2);
        AppState {
            window: None,
            title_game_subtitle: None,
            countdown_bar: None,
            board_container: None,
            dynamic_css_provider: None,
            grid_buttons: Vec::new(),
            grid_cols,
            grid_rows,
            game,
            history,
        }
    }
}

pub fn grid_dims(total: usize) -> (i32, i32) {
    if total == 0 {
        return (1, 1);
    }
    let mut cols = 1;
    while cols * cols < total {
        cols += 1;
    }
    let rows = total.div_ceil(cols);
    (cols as i32, rows as i32)
}

#[cfg(test)]
mod tests {
    use super::grid_dims;

    #[test]
    fn grid_fits_every_card() {
        assert_eq!(grid_dims(16), (4, 4));
        assert_eq!(grid_dims(12), (4, 3));
        assert_eq!(grid_dims(4), (2, 2));
        assert_eq!(grid_dims(10), (4, 3));
    }
}
