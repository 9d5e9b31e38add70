//! Deterministic report text built only from [`ReportStats`].

use std::fmt::Write;

use chrono::{DateTime, Utc};

use super::stats::ReportStats;
use crate::analysis::Mode;

pub fn render_local_report(stats: &ReportStats, generated_at: DateTime<Utc>) -> String {
    let mut report = String::new();

    let _ = writeln!(
        report,
        "Balance report ({})",
        generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(report);
    let _ = writeln!(report, "Over the last {} analysis cycles:", stats.total_cycles);
    for (mode, label) in [
        (Mode::Calm, "Calm"),
        (Mode::Balanced, "Balanced"),
        (Mode::Aggressive, "Aggressive"),
    ] {
        let _ = writeln!(
            report,
            "- {label}: {}% ({} cycles)",
            stats.percentage(mode),
            stats.mode_counts.get(mode)
        );
    }
    let _ = writeln!(report);
    let _ = writeln!(report, "Average interaction score: {}", stats.average_score);
    let _ = writeln!(
        report,
        "Total interactions: {} (clicks + keys + focus)",
        stats.total_interactions
    );
    let _ = writeln!(report);

    let (analysis, tips): (&str, &[&str]) = match stats.dominant_mode() {
        Mode::Aggressive => (
            "Analysis: activity has been high recently.",
            &[
                "Take regular breaks (try the Pomodoro technique)",
                "Do a short breathing exercise",
                "Spend some time away from the screen",
                "Try slowing down your working rhythm",
            ],
        ),
        Mode::Calm => (
            "Analysis: activity has been low recently.",
            &[
                "Set small goals to get moving",
                "Increase focused work time gradually",
                "Try a motivation technique that suits you",
                "Build a regular activity routine",
            ],
        ),
        Mode::Balanced => (
            "Analysis: your balance looks optimal.",
            &[
                "Keep this rhythm",
                "Keep taking regular breaks",
                "Stay aware of how you work",
            ],
        ),
    };

    let _ = writeln!(report, "{analysis}");
    let _ = writeln!(report);
    let _ = writeln!(report, "Suggestions:");
    for tip in tips {
        let _ = writeln!(report, "- {tip}");
    }

    report.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::report::stats::ModeCounts;

    fn stats(calm: u64, balanced: u64, aggressive: u64) -> ReportStats {
        ReportStats {
            total_cycles: calm + balanced + aggressive,
            mode_counts: ModeCounts {
                calm,
                balanced,
                aggressive,
            },
            average_score: 33,
            total_interactions: 120,
        }
    }

    #[test]
    fn same_input_same_text() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let a = render_local_report(&stats(1, 2, 3), at);
        let b = render_local_report(&stats(1, 2, 3), at);
        assert_eq!(a, b);
        assert!(a.starts_with("Balance report (2024-05-01 09:00 UTC)"));
        assert!(a.contains("- Aggressive: 50% (3 cycles)"));
        assert!(a.contains("Total interactions: 120"));
    }

    #[test]
    fn advice_follows_dominant_mode() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        assert!(render_local_report(&stats(0, 1, 4), at).contains("activity has been high"));
        assert!(render_local_report(&stats(4, 1, 0), at).contains("activity has been low"));
        assert!(render_local_report(&stats(2, 2, 2), at).contains("looks optimal"));
    }
}
