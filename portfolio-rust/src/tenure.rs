use crate::{Project, WorkExperience};
use chrono::{Datelike, NaiveDate};

/// Whole calendar months from `start` to `end`. A month counts once the end
/// reaches the start's day of month. For a single calendar month step, an
/// end on the last day of its month also counts, so Jan 31 to Feb 28 is one
/// month while Jan 31 to Apr 30 is two. Ranges that run backwards count as
/// zero.
#[must_use]
pub fn whole_months_between(start: NaiveDate, end: NaiveDate) -> u32 {
    if end <= start {
        return 0;
    }

    let mut months = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
    if end.day() < start.day() && !(months == 1 && is_last_day_of_month(end)) {
        months -= 1;
    }
    u32::try_from(months).unwrap_or(0)
}

/// Render a duration like `2 yrs 3 mos`, `1 yr`, `5 mos`, or
/// `Less than a month`.
#[must_use]
pub fn format_tenure(start: NaiveDate, end: NaiveDate) -> String {
    let months = whole_months_between(start, end);
    if months == 0 {
        return "Less than a month".to_string();
    }

    let years = months / 12;
    let months = months % 12;

    let mut parts = Vec::with_capacity(2);
    if years > 0 {
        parts.push(format!("{years} yr{}", if years > 1 { "s" } else { "" }));
    }
    if months > 0 {
        parts.push(format!("{months} mo{}", if months > 1 { "s" } else { "" }));
    }
    parts.join(" ")
}

fn is_last_day_of_month(date: NaiveDate) -> bool {
    date.succ_opt()
        .map_or(true, |next| next.month() != date.month())
}

impl WorkExperience {
    /// Time spent in the role, counting up to `today` while it is current.
    #[must_use]
    pub fn tenure(&self, today: NaiveDate) -> String {
        let end = if self.is_current_employer {
            today
        } else {
            self.end_date.unwrap_or(today)
        };
        format_tenure(self.start_date, end)
    }
}

impl Project {
    #[must_use]
    pub fn duration(&self, today: NaiveDate) -> String {
        let end = if self.is_current_project {
            today
        } else {
            self.end_date.unwrap_or(today)
        };
        format_tenure(self.start_date, end)
    }
}
