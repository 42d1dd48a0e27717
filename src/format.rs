use chrono::{DateTime, Utc};

/// Human-readable "how long ago" for list and detail views.
pub fn relative_date(dt: DateTime<Utc>) -> String {
    let delta = Utc::now().signed_duration_since(dt);

    let plural = |n: i64, unit: &str| {
        if n == 1 {
            format!("1 {} ago", unit)
        } else {
            format!("{} {}s ago", n, unit)
        }
    };

    if delta.num_days() >= 365 {
        plural(delta.num_days() / 365, "year")
    } else if delta.num_days() >= 30 {
        plural(delta.num_days() / 30, "month")
    } else if delta.num_days() >= 1 {
        plural(delta.num_days(), "day")
    } else if delta.num_hours() >= 1 {
        plural(delta.num_hours(), "hour")
    } else if delta.num_minutes() >= 1 {
        plural(delta.num_minutes(), "minute")
    } else {
        "just now".to_string()
    }
}

/// Truncate to at most `max` characters, ending in "..." when cut.
/// Budgets too small for the ellipsis get a hard clip instead, so the
/// result never exceeds `max`. Char-based so multibyte text never splits
/// mid-codepoint.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    if max <= 3 {
        return s.chars().take(max).collect();
    }
    let mut out: String = s.chars().take(max - 3).collect();
    out.push_str("...");
    out
}

/// Column budget for the repository list: name column plus a flexible
/// description column, after the fixed star column and padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListBudget {
    pub name: usize,
    pub stars: usize,
    pub desc: usize,
}

/// Recomputed from the live width on every render so resizes just work.
/// The three columns plus separators always fit inside `width`.
pub fn list_budget(width: u16) -> ListBudget {
    let w = width as usize;
    let stars = 7; // "★ 12345"
    let name = w.saturating_sub(stars + 2).clamp(10, 40);
    let desc = w.saturating_sub(name + stars + 2);
    ListBudget { name, stars, desc }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn relative_date_buckets() {
        let now = Utc::now();
        assert_eq!(relative_date(now), "just now");
        assert_eq!(relative_date(now - Duration::minutes(5)), "5 minutes ago");
        assert_eq!(relative_date(now - Duration::hours(1)), "1 hour ago");
        assert_eq!(relative_date(now - Duration::days(3)), "3 days ago");
        assert_eq!(relative_date(now - Duration::days(60)), "2 months ago");
        assert_eq!(relative_date(now - Duration::days(400)), "1 year ago");
    }

    #[test]
    fn truncate_short_string_unchanged() {
        assert_eq!(truncate("hello", 10), "hello");
    }

    #[test]
    fn truncate_long_string_gets_ellipsis() {
        assert_eq!(truncate("hello world", 8), "hello...");
    }

    #[test]
    fn truncate_tiny_budget_hard_clips() {
        assert_eq!(truncate("hello", 0), "");
        assert_eq!(truncate("hello", 2), "he");
        assert_eq!(truncate("hello", 3), "hel");
    }

    #[test]
    fn truncate_never_exceeds_budget() {
        for max in 0..12 {
            assert!(truncate("a description line", max).chars().count() <= max);
        }
    }

    #[test]
    fn truncate_multibyte_safe() {
        let s = "héllö wörld métadata";
        let out = truncate(s, 10);
        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), 10);
    }

    #[test]
    fn budget_fits_within_width() {
        for width in 40..=200u16 {
            let b = list_budget(width);
            assert!(
                b.name + b.stars + b.desc + 2 <= width as usize,
                "budget overflow at width {}",
                width
            );
        }
    }

    #[test]
    fn budget_degrades_without_panic_below_minimum() {
        for width in 0..40u16 {
            let _ = list_budget(width);
        }
    }

    #[test]
    fn budget_name_column_clamped() {
        assert_eq!(list_budget(200).name, 40);
        assert_eq!(list_budget(20).name, 10);
    }
}
