use chrono::{Datelike, NaiveDate};

use super::draw::Season;

/// Group-stage draws happen late in August, so the season a date belongs to
/// only rolls over in July.
const SEASON_ROLLOVER_MONTH: u32 = 7;

#[must_use]
pub fn current_season_for(date: NaiveDate) -> Season {
    if date.month() >= SEASON_ROLLOVER_MONTH {
        date.year()
    } else {
        date.year() - 1
    }
}

#[must_use]
pub fn current_season() -> Season {
    current_season_for(chrono::Local::now().date_naive())
}
