use chrono::{DateTime, Datelike, Timelike, Utc};

/// Number and date conventions for a locale
#[derive(Debug, Clone, Copy, PartialEq)]
struct LocaleFormat {
    group: &'static str,
    /// Shortest integer part that gets separators
    min_grouping: usize,
    decimal: &'static str,
    symbol_first: bool,
    month_first: bool,
    date_separator: &'static str,
    hour12: bool,
}

const EN_US: LocaleFormat = LocaleFormat {
    group: ",",
    min_grouping: 4,
    decimal: ".",
    symbol_first: true,
    month_first: true,
    date_separator: "/",
    hour12: true,
};

fn locale_format(locale: &str) -> LocaleFormat {
    match locale {
        "en-GB" => LocaleFormat {
            month_first: false,
            hour12: false,
            ..EN_US
        },
        "pt-PT" => LocaleFormat {
            min_grouping: 5,
            ..locale_format("fr-FR")
        },
        "fr-FR" => LocaleFormat {
            group: " ",
            min_grouping: 4,
            decimal: ",",
            symbol_first: false,
            month_first: false,
            date_separator: "/",
            hour12: false,
        },
        "de-DE" => LocaleFormat {
            group: ".",
            min_grouping: 4,
            decimal: ",",
            symbol_first: false,
            month_first: false,
            date_separator: ".",
            hour12: false,
        },
        _ => EN_US,
    }
}

fn currency_symbol(currency: &str) -> String {
    match currency {
        "EUR" => "€".to_string(),
        "USD" => "$".to_string(),
        "GBP" => "£".to_string(),
        other => other.to_string(),
    }
}

fn group_digits(digits: &str, separator: &str, min_grouping: usize) -> String {
    if digits.len() < min_grouping {
        return digits.to_string();
    }

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push_str(separator);
        }
        grouped.push(digit);
    }
    grouped
}

/// Format `amount` as money in `currency` using the conventions of `locale`
pub fn format_currency(amount: f64, locale: &str, currency: &str) -> String {
    let format = locale_format(locale);
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let grouped = group_digits(whole, format.group, format.min_grouping);
    let number = format!("{}{}{}", grouped, format.decimal, cents);
    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    let symbol = currency_symbol(currency);

    if format.symbol_first {
        format!("{}{}{}", sign, symbol, number)
    } else {
        format!("{}{} {}", sign, number, symbol)
    }
}

fn format_time(date: &DateTime<Utc>, format: &LocaleFormat) -> String {
    if format.hour12 {
        let (pm, hour) = date.hour12();
        format!("{}:{:02} {}", hour, date.minute(), if pm { "PM" } else { "AM" })
    } else {
        format!("{:02}:{:02}", date.hour(), date.minute())
    }
}

/// Full date and time, e.g. `03/02/2021, 10:51` for pt-PT
pub fn format_date(date: &DateTime<Utc>, locale: &str) -> String {
    let format = locale_format(locale);
    let day_month = if format.month_first {
        format!("{}{}{}", date.month(), format.date_separator, date.day())
    } else {
        format!("{:02}{}{:02}", date.day(), format.date_separator, date.month())
    };

    format!(
        "{}{}{}, {}",
        day_month,
        format.date_separator,
        date.year(),
        format_time(date, &format)
    )
}

/// Whole days between two instants, rounded
pub fn days_passed(date: &DateTime<Utc>, now: &DateTime<Utc>) -> i64 {
    let millis = (*now - *date).num_milliseconds().abs() as f64;
    (millis / (1000.0 * 60.0 * 60.0 * 24.0)).round() as i64
}

/// Date of a ledger row, relative to `now` when it is within a week
pub fn format_movement_date(date: &DateTime<Utc>, now: &DateTime<Utc>, locale: &str) -> String {
    let time = format_time(date, &locale_format(locale));

    match days_passed(date, now) {
        0 => format!("Today, {}", time),
        1 => format!("Yesterday, {}", time),
        days @ 2..=6 => format!("{} days ago, {}", days, time),
        7 => format!("A week ago, {}", time),
        _ => format_date(date, locale),
    }
}

/// Remaining session time as `mm:ss`
pub fn format_timer(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use test_case::test_case;

    #[test_case(1300.0, "en-US", "USD", "$1,300.00" ; "us dollars")]
    #[test_case(-642.21, "en-US", "USD", "-$642.21" ; "us negative")]
    #[test_case(25000.0, "pt-PT", "EUR", "25 000,00 €" ; "portuguese euros")]
    #[test_case(1300.0, "pt-PT", "EUR", "1300,00 €" ; "portuguese four digits stay ungrouped")]
    #[test_case(1300.0, "fr-FR", "EUR", "1 300,00 €" ; "french four digits grouped")]
    #[test_case(-642.21, "pt-PT", "EUR", "-642,21 €" ; "portuguese negative")]
    #[test_case(1234567.891, "de-DE", "EUR", "1.234.567,89 €" ; "german grouping")]
    #[test_case(79.97, "xx-XX", "CHF", "CHF79.97" ; "unknown locale and currency")]
    #[test_case(-0.001, "en-US", "USD", "$0.00" ; "negative zero")]
    fn test_format_currency(amount: f64, locale: &str, currency: &str, expected: &str) {
        assert_eq!(format_currency(amount, locale, currency), expected);
    }

    #[test]
    fn test_format_date() {
        let date = Utc.with_ymd_and_hms(2021, 2, 3, 14, 5, 0).unwrap();
        assert_eq!(format_date(&date, "pt-PT"), "03/02/2021, 14:05");
        assert_eq!(format_date(&date, "en-US"), "2/3/2021, 2:05 PM");
        assert_eq!(format_date(&date, "de-DE"), "03.02.2021, 14:05");
    }

    #[test]
    fn test_format_movement_date_is_relative_within_a_week() {
        let now = Utc.with_ymd_and_hms(2021, 2, 10, 12, 0, 0).unwrap();
        let at = |days: i64| now - Duration::days(days);

        assert_eq!(format_movement_date(&at(0), &now, "pt-PT"), "Today, 12:00");
        assert_eq!(format_movement_date(&at(1), &now, "pt-PT"), "Yesterday, 12:00");
        assert_eq!(format_movement_date(&at(4), &now, "pt-PT"), "4 days ago, 12:00");
        assert_eq!(format_movement_date(&at(7), &now, "pt-PT"), "A week ago, 12:00");
        assert_eq!(format_movement_date(&at(8), &now, "pt-PT"), "02/02/2021, 12:00");
    }

    #[test]
    fn test_format_timer() {
        assert_eq!(format_timer(300), "05:00");
        assert_eq!(format_timer(61), "01:01");
        assert_eq!(format_timer(0), "00:00");
    }
}
