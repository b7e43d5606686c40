use chrono::{Datelike, Duration, Months, NaiveDate};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

const WEEKDAYS: [&str; 7] = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];

/// Width and height a month grid needs, borders included.
pub const PICKER_WIDTH: u16 = 24;
pub const PICKER_HEIGHT: u16 = 10;

/// Single-date calendar shown while the due-date popover is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatePicker {
    pub cursor: NaiveDate,
    pub selected: Option<NaiveDate>,
    pub today: NaiveDate,
}

impl DatePicker {
    pub fn open(selected: Option<NaiveDate>, today: NaiveDate) -> Self {
        Self {
            cursor: selected.unwrap_or(today),
            selected,
            today,
        }
    }

    pub fn move_days(&mut self, days: i64) {
        if let Some(date) = self.cursor.checked_add_signed(Duration::days(days)) {
            self.cursor = date;
        }
    }

    /// Moves by whole months, clamping the day to the end of shorter months.
    pub fn move_months(&mut self, months: i32) {
        let step = Months::new(months.unsigned_abs());
        let moved = if months >= 0 {
            self.cursor.checked_add_months(step)
        } else {
            self.cursor.checked_sub_months(step)
        };
        if let Some(date) = moved {
            self.cursor = date;
        }
    }

    pub fn jump_to_today(&mut self) {
        self.cursor = self.today;
    }

    pub fn month_title(&self) -> String {
        self.cursor.format("%B %Y").to_string()
    }

    /// Weeks of the cursor's month, Sunday first. Days outside the month are `None`.
    pub fn weeks(&self) -> Vec<[Option<NaiveDate>; 7]> {
        let Some(first) = self.cursor.with_day(1) else {
            return Vec::new();
        };
        let offset = first.weekday().num_days_from_sunday() as usize;
        let mut weeks = Vec::new();
        let mut week = [None; 7];
        let mut slot = offset;
        let mut day = first;
        while day.month() == first.month() {
            week[slot] = Some(day);
            slot += 1;
            if slot == 7 {
                weeks.push(week);
                week = [None; 7];
                slot = 0;
            }
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }
        if slot > 0 {
            weeks.push(week);
        }
        weeks
    }
}

impl Widget for &DatePicker {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut lines = vec![
            Line::from(Span::styled(
                format!("{:^20}", self.month_title()),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                WEEKDAYS.join(" "),
                Style::default().fg(Color::DarkGray),
            )),
        ];

        for week in self.weeks() {
            let mut spans = Vec::with_capacity(14);
            for (i, day) in week.iter().enumerate() {
                if i > 0 {
                    spans.push(Span::raw(" "));
                }
                match day {
                    Some(date) => {
                        let mut style = Style::default();
                        if *date == self.today {
                            style = style.add_modifier(Modifier::UNDERLINED);
                        }
                        if Some(*date) == self.selected {
                            style = style.fg(Color::Black).bg(Color::Cyan);
                        }
                        if *date == self.cursor {
                            style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
                        }
                        spans.push(Span::styled(format!("{:>2}", date.day()), style));
                    }
                    None => spans.push(Span::raw("  ")),
                }
            }
            lines.push(Line::from(spans));
        }

        Paragraph::new(lines).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn opens_on_selection_or_today() {
        let today = date(2024, 6, 1);
        assert_eq!(DatePicker::open(None, today).cursor, today);
        assert_eq!(
            DatePicker::open(Some(date(2024, 3, 15)), today).cursor,
            date(2024, 3, 15)
        );
    }

    #[test]
    fn month_moves_clamp_day() {
        let mut picker = DatePicker::open(Some(date(2024, 1, 31)), date(2024, 1, 1));
        picker.move_months(1);
        assert_eq!(picker.cursor, date(2024, 2, 29));
        picker.move_months(-12);
        assert_eq!(picker.cursor, date(2023, 2, 28));
    }

    #[test]
    fn day_and_week_moves_cross_months() {
        let mut picker = DatePicker::open(Some(date(2024, 2, 28)), date(2024, 1, 1));
        picker.move_days(2);
        assert_eq!(picker.cursor, date(2024, 3, 1));
        picker.move_days(-7);
        assert_eq!(picker.cursor, date(2024, 2, 23));
        picker.jump_to_today();
        assert_eq!(picker.cursor, date(2024, 1, 1));
    }

    #[test]
    fn march_2024_grid() {
        let picker = DatePicker::open(Some(date(2024, 3, 15)), date(2024, 3, 1));
        let weeks = picker.weeks();

        // March 1st 2024 is a Friday.
        assert_eq!(weeks.len(), 6);
        assert_eq!(weeks[0][..5], [None::<NaiveDate>; 5]);
        assert_eq!(weeks[0][5], Some(date(2024, 3, 1)));
        assert_eq!(weeks[5][0], Some(date(2024, 3, 31)));
        assert_eq!(weeks[5][1], None);
        assert_eq!(picker.month_title(), "March 2024");
    }
}
