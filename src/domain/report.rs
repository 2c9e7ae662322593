//! Notification text assembly.
//!
//! Pure string building; delivery belongs to the notify adapters.

use crate::domain::positions::SellAlert;
use crate::domain::rank::RankedRow;
use chrono::NaiveDate;

/// Message ceiling of the notification channel, in characters.
pub const MAX_MESSAGE_LEN: usize = 3800;

const TRUNCATION_MARKER: &str = "... [truncated]";

/// Header plus two lines per ranked row.
pub fn format_top_message(market: &str, rows: &[RankedRow], reference_date: NaiveDate) -> String {
    let mut lines = vec![format!(
        "[{market} top {} buy candidates | {reference_date}]",
        rows.len()
    )];
    for row in rows {
        let r = &row.record;
        lines.push(format!(
            "{:02}. {} {} close {}",
            row.rank,
            r.ticker,
            r.name,
            fmt_thousands(r.close)
        ));
        lines.push(format!(
            "    buy(ATR): {} | sell(ATR): {} | stop: {}",
            r.buy_atr,
            r.sell_atr,
            fmt_thousands(r.stop)
        ));
    }
    lines.join("\n")
}

/// Header plus one line per flagged holding.
pub fn format_sell_alerts(alerts: &[SellAlert]) -> String {
    let mut lines = vec!["[holdings sell signals]".to_string()];
    for alert in alerts {
        lines.push(format!(
            "{} {} sell candidate: target {} | avg cost {}",
            alert.ticker,
            alert.name,
            fmt_thousands(alert.target),
            fmt_thousands(alert.average_cost)
        ));
    }
    lines.join("\n")
}

/// Hard cut to the channel ceiling with a visible marker; no re-chunking.
pub fn truncate_message(text: &str) -> String {
    if text.chars().count() <= MAX_MESSAGE_LEN {
        return text.to_string();
    }
    let keep = MAX_MESSAGE_LEN - TRUNCATION_MARKER.chars().count();
    let mut cut: String = text.chars().take(keep).collect();
    cut.push_str(TRUNCATION_MARKER);
    cut
}

/// 1234567 -> "1,234,567"
pub fn fmt_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::band::PriceBand;
    use crate::domain::levels::LevelRecord;

    fn make_row(rank: u32, ticker: &str, close: i64) -> RankedRow {
        RankedRow {
            rank,
            record: LevelRecord {
                date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
                ticker: ticker.to_string(),
                name: format!("{ticker} Corp"),
                close,
                buy_pivot: PriceBand { lo: 900, hi: 950 },
                sell_pivot: PriceBand { lo: 1050, hi: 1100 },
                buy_atr: PriceBand { lo: 950, hi: 975 },
                sell_atr: PriceBand { lo: 1025, hi: 1050 },
                stop: 925,
                atr: 50.0,
                ema: 1000.0,
                score: 0.8,
                in_atr_buy: true,
                in_pivot_buy: false,
            },
        }
    }

    #[test]
    fn fmt_thousands_groups_digits() {
        assert_eq!(fmt_thousands(0), "0");
        assert_eq!(fmt_thousands(999), "999");
        assert_eq!(fmt_thousands(1_000), "1,000");
        assert_eq!(fmt_thousands(70_000), "70,000");
        assert_eq!(fmt_thousands(1_234_567), "1,234,567");
        assert_eq!(fmt_thousands(-42_000), "-42,000");
    }

    #[test]
    fn top_message_contains_header_and_rows() {
        let rows = vec![make_row(1, "005930", 70_000), make_row(2, "000660", 55_000)];
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let message = format_top_message("KOSPI", &rows, date);

        assert!(message.starts_with("[KOSPI top 2 buy candidates | 2024-01-15]"));
        assert!(message.contains("01. 005930 005930 Corp close 70,000"));
        assert!(message.contains("02. 000660"));
        assert!(message.contains("buy(ATR): 950~975 | sell(ATR): 1025~1050 | stop: 925"));
    }

    #[test]
    fn sell_alert_lines_carry_target_and_cost() {
        let alerts = vec![SellAlert {
            ticker: "005930".into(),
            name: "Samsung Electronics".into(),
            target: 74_000,
            average_cost: 60_000,
        }];
        let message = format_sell_alerts(&alerts);
        assert!(message.starts_with("[holdings sell signals]"));
        assert!(message.contains("005930 Samsung Electronics"));
        assert!(message.contains("target 74,000"));
        assert!(message.contains("avg cost 60,000"));
    }

    #[test]
    fn short_messages_pass_through() {
        let text = "short";
        assert_eq!(truncate_message(text), text);
    }

    #[test]
    fn long_messages_are_cut_with_marker() {
        let text = "x".repeat(MAX_MESSAGE_LEN + 500);
        let cut = truncate_message(&text);
        assert_eq!(cut.chars().count(), MAX_MESSAGE_LEN);
        assert!(cut.ends_with("... [truncated]"));
    }

    #[test]
    fn boundary_length_is_untouched() {
        let text = "y".repeat(MAX_MESSAGE_LEN);
        assert_eq!(truncate_message(&text), text);
    }

    #[test]
    fn multibyte_text_cuts_on_char_boundaries() {
        let text = "가".repeat(MAX_MESSAGE_LEN + 10);
        let cut = truncate_message(&text);
        assert_eq!(cut.chars().count(), MAX_MESSAGE_LEN);
        assert!(cut.ends_with("... [truncated]"));
    }
}
