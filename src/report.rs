use std::fmt::Write;

use crate::models::{EvaluationSession, ResultRecord, Verdict};

/// Fixed bonus added to the environmental compliance percentage to form the
/// total viability score. Carried over from the issuing desk's assessment
/// sheet, which states no rationale; overridable with --bonus.
pub const VIABILITY_BONUS: f64 = 50.0;

const HIGHLY_VIABLE_THRESHOLD: f64 = 80.0;
const POTENTIALLY_VIABLE_THRESHOLD: f64 = 60.0;

pub fn verdict_for(total_score: f64) -> Verdict {
    if total_score >= HIGHLY_VIABLE_THRESHOLD {
        Verdict::HighlyViable
    } else if total_score >= POTENTIALLY_VIABLE_THRESHOLD {
        Verdict::PotentiallyViable
    } else {
        Verdict::BelowMinimum
    }
}

/// Combines the session into the final one-row result. `None` when any
/// financial indicator is missing or undetermined; the caller shows the
/// missing-data notice instead of a score.
pub fn aggregate(session: &EvaluationSession, bonus: f64) -> Option<ResultRecord> {
    if !session.financials_complete() {
        return None;
    }

    let total_score = session.compliance + bonus;
    Some(ResultRecord {
        net_present_value: session.npv?,
        internal_rate_of_return: session.irr?,
        return_on_investment: session.roi?,
        payback_period: session.payback?,
        compliance_pct: session.compliance,
        total_score,
        verdict: verdict_for(total_score).as_str().to_string(),
    })
}

pub fn build_summary(record: &ResultRecord) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Green Bond Viability Result");
    let _ = writeln!(output);
    let _ = writeln!(output, "## Financial Indicators");
    let _ = writeln!(
        output,
        "- Net present value: {:.2}",
        record.net_present_value
    );
    let _ = writeln!(
        output,
        "- Internal rate of return: {:.2}%",
        record.internal_rate_of_return * 100.0
    );
    let _ = writeln!(
        output,
        "- Return on investment: {:.2}%",
        record.return_on_investment
    );
    let _ = writeln!(
        output,
        "- Payback period: {} periods",
        record.payback_period
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Environmental Compliance");
    let _ = writeln!(output, "- Compliance: {:.2}%", record.compliance_pct);
    let _ = writeln!(output, "- Total score: {:.2}%", record.total_score);
    let _ = writeln!(output);
    let _ = writeln!(output, "Verdict: the project {}.", record.verdict);

    output
}

pub fn missing_data_notice() -> &'static str {
    "Financial indicators are missing or undetermined. \
     Re-run the finance stage with a complete cash-flow series before asking for a verdict."
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_session(compliance: f64) -> EvaluationSession {
        EvaluationSession {
            npv: Some(4.13),
            irr: Some(0.13),
            roi: Some(20.0),
            payback: Some(2),
            compliance,
        }
    }

    #[test]
    fn tiers_follow_the_thresholds() {
        assert_eq!(verdict_for(100.0), Verdict::HighlyViable);
        assert_eq!(verdict_for(80.0), Verdict::HighlyViable);
        assert_eq!(verdict_for(70.0), Verdict::PotentiallyViable);
        assert_eq!(verdict_for(60.0), Verdict::PotentiallyViable);
        assert_eq!(verdict_for(55.0), Verdict::BelowMinimum);
    }

    #[test]
    fn aggregate_adds_the_bonus() {
        let record = aggregate(&complete_session(50.0), VIABILITY_BONUS).unwrap();
        assert_eq!(record.total_score, 100.0);
        assert_eq!(record.verdict, Verdict::HighlyViable.as_str());

        let record = aggregate(&complete_session(20.0), VIABILITY_BONUS).unwrap();
        assert_eq!(record.total_score, 70.0);
        assert_eq!(record.verdict, Verdict::PotentiallyViable.as_str());

        let record = aggregate(&complete_session(5.0), VIABILITY_BONUS).unwrap();
        assert_eq!(record.total_score, 55.0);
        assert_eq!(record.verdict, Verdict::BelowMinimum.as_str());
    }

    #[test]
    fn aggregate_requires_every_financial_field() {
        let mut session = complete_session(50.0);
        session.irr = None;
        assert!(aggregate(&session, VIABILITY_BONUS).is_none());

        let mut session = complete_session(50.0);
        session.payback = None;
        assert!(aggregate(&session, VIABILITY_BONUS).is_none());

        assert!(aggregate(&EvaluationSession::default(), VIABILITY_BONUS).is_none());
    }

    #[test]
    fn bonus_is_overridable() {
        let record = aggregate(&complete_session(50.0), 0.0).unwrap();
        assert_eq!(record.total_score, 50.0);
        assert_eq!(record.verdict, Verdict::BelowMinimum.as_str());
    }

    #[test]
    fn summary_names_every_indicator() {
        let record = aggregate(&complete_session(50.0), VIABILITY_BONUS).unwrap();
        let summary = build_summary(&record);
        assert!(summary.contains("Net present value"));
        assert!(summary.contains("Payback period: 2 periods"));
        assert!(summary.contains("Total score: 100.00%"));
        assert!(summary.contains("highly viable"));
    }
}
