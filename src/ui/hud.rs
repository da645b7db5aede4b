use gtk4::prelude::*;

use super::state::AppState;
use crate::engine::RoundPhase;

pub(super) fn format_mm_ss(total_secs: u64) -> String {
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

pub(super) fn update_subtitle(st: &AppState) {
    let Some(subtitle) = &st.title_game_subtitle else {
        return;
    };
    let clicks = st.game.board().click_count();
    let text = match st.game.phase() {
        RoundPhase::Preview => "Memorize the flags".to_string(),
        RoundPhase::Playing => format!(
            "{} | {} clicks",
            format_mm_ss(st.game.elapsed().as_secs()),
            clicks
        ),
        RoundPhase::Won => format!("Complete | {} clicks", clicks),
    };
    subtitle.set_text(&text);
}

pub(super) fn update_countdown(st: &AppState) {
    let Some(bar) = &st.countdown_bar else {
        return;
    };
    let countdown = st.game.countdown();
    bar.set_fraction(countdown.fraction_elapsed());
    bar.set_text(Some(&format!("Time left: {}s", countdown.remaining())));
    if countdown.is_warning() {
        bar.add_css_class("warning");
    } else {
        bar.remove_css_class("warning");
    }
}

#[cfg(test)]
mod tests {
    use super::format_mm_ss;

    #[test]
    fn clock_text() {
        assert_eq!(format_mm_ss(0), "00:00");
        assert_eq!(format_mm_ss(75), "01:15");
        assert_eq!(format_mm_ss(3_600), "60:00");
    }
}
