//! Human-readable text reports for decision makers.

use std::io::Write;

use care_access_costs::{CostEstimate, CostSummary};
use care_access_policy::group_thousands;
use care_access_policy_models::{PolicyRecommendation, Priority, Timeframe};

use crate::ReportError;

const RULE_HEAVY: &str =
    "================================================================================";
const RULE_LIGHT: &str =
    "--------------------------------------------------------------------------------";

/// Writes the executive summary of all policy recommendations, grouped
/// by priority with an implementation roadmap by timeframe.
///
/// # Errors
///
/// * `ReportError::Io` on write failure
pub fn write_executive_summary(
    mut writer: impl Write,
    recommendations: &[PolicyRecommendation],
) -> Result<(), ReportError> {
    writeln!(writer, "{RULE_HEAVY}")?;
    writeln!(writer, "HEALTHCARE ACCESS POLICY RECOMMENDATIONS")?;
    writeln!(writer, "Executive Summary for Decision Makers")?;
    writeln!(writer, "Generated: {}", chrono::Local::now().format("%Y-%m-%d"))?;
    writeln!(writer, "{RULE_HEAVY}")?;
    writeln!(writer)?;

    let total_affected: u64 = recommendations.iter().map(|r| r.affected_population).sum();
    let critical_count = recommendations
        .iter()
        .filter(|r| r.priority == Priority::Critical)
        .count();

    writeln!(writer, "KEY FINDINGS:")?;
    writeln!(writer, "{RULE_LIGHT}")?;
    writeln!(
        writer,
        "• Total population affected by access gaps: {}",
        group_thousands(total_affected)
    )?;
    writeln!(writer, "• Critical priorities identified: {critical_count}")?;
    writeln!(writer, "• Total recommendations: {}", recommendations.len())?;
    writeln!(writer)?;

    for priority in Priority::all() {
        let group: Vec<&PolicyRecommendation> = recommendations
            .iter()
            .filter(|r| r.priority == *priority)
            .collect();
        if group.is_empty() {
            continue;
        }

        writeln!(
            writer,
            "{} PRIORITY RECOMMENDATIONS:",
            priority.to_string().to_uppercase()
        )?;
        writeln!(writer, "{RULE_LIGHT}")?;

        for (i, rec) in group.iter().enumerate() {
            writeln!(writer)?;
            writeln!(writer, "{}. {}", i + 1, rec.title)?;
            writeln!(writer, "   Category: {}", rec.category)?;
            writeln!(
                writer,
                "   Population Impact: {} people",
                group_thousands(rec.affected_population)
            )?;
            writeln!(writer, "   Cost Estimate: {}", rec.estimated_cost)?;
            writeln!(writer, "   Timeline: {}", rec.implementation_timeframe)?;
            writeln!(writer, "   Description: {}", rec.description)?;
            writeln!(writer, "   Expected Impact: {}", rec.expected_impact)?;
            writeln!(writer)?;
            writeln!(writer, "   First Steps:")?;
            for step in rec.actionable_steps.iter().take(3) {
                writeln!(writer, "   → {step}")?;
            }
        }
        writeln!(writer)?;
    }

    writeln!(writer)?;
    writeln!(writer, "IMPLEMENTATION ROADMAP:")?;
    writeln!(writer, "{RULE_LIGHT}")?;
    for timeframe in Timeframe::all() {
        let group: Vec<&PolicyRecommendation> = recommendations
            .iter()
            .filter(|r| r.implementation_timeframe == *timeframe)
            .collect();
        if group.is_empty() {
            continue;
        }
        writeln!(writer)?;
        writeln!(writer, "{timeframe} ({} initiatives):", group.len())?;
        for rec in group {
            writeln!(writer, "  • {}", rec.title)?;
        }
    }

    writeln!(writer)?;
    writeln!(writer, "{RULE_HEAVY}")?;
    writeln!(writer, "For detailed analysis, see full technical report")?;
    writeln!(writer, "{RULE_HEAVY}")?;

    log::info!("Wrote executive summary");
    Ok(())
}

/// Writes the cost-benefit analysis report: one block per estimated
/// category, aggregate totals, and a cost-effectiveness ranking.
///
/// # Errors
///
/// * `ReportError::Io` on write failure
#[allow(clippy::cast_precision_loss)]
pub fn write_cost_benefit_report(
    mut writer: impl Write,
    estimates: &[CostEstimate],
    summary: &CostSummary,
    facility_site_count: usize,
) -> Result<(), ReportError> {
    writeln!(writer, "{RULE_HEAVY}")?;
    writeln!(writer, "COST-BENEFIT ANALYSIS")?;
    writeln!(writer, "Healthcare Access Policy Recommendations")?;
    writeln!(writer, "{RULE_HEAVY}")?;

    for (i, estimate) in estimates.iter().enumerate() {
        writeln!(writer)?;
        writeln!(
            writer,
            "{}. {}",
            i + 1,
            estimate.category.to_string().to_uppercase()
        )?;
        writeln!(writer, "{RULE_LIGHT}")?;
        writeln!(
            writer,
            "ONE-TIME COSTS: {}",
            format_dollars(estimate.one_time_costs)
        )?;
        if estimate.category == care_access_costs::CostCategory::NewFacility
            && facility_site_count > 1
        {
            writeln!(
                writer,
                "  TOTAL FOR {facility_site_count} FACILITIES: {}",
                format_dollars(estimate.one_time_costs * facility_site_count as f64)
            )?;
        }
        writeln!(
            writer,
            "ANNUAL OPERATING COSTS: {}",
            format_dollars(estimate.annual_operating_costs)
        )?;
        writeln!(
            writer,
            "ESTIMATED ANNUAL SAVINGS: {}",
            format_dollars(estimate.annual_savings_estimate)
        )?;
        writeln!(writer)?;
        writeln!(writer, "RETURN ON INVESTMENT:")?;
        if estimate.breaks_even() {
            writeln!(
                writer,
                "  • Break-even timeframe: {:.1} years",
                estimate.break_even_years
            )?;
        } else {
            writeln!(writer, "  • Break-even timeframe: does not break even")?;
        }
        writeln!(
            writer,
            "  • {}-year benefit-cost ratio: {:.2}:1",
            estimate.roi_timeframe_years, estimate.benefit_cost_ratio
        )?;
        writeln!(
            writer,
            "  • Cost per person served ({}-year): {}",
            estimate.roi_timeframe_years,
            format_dollars(estimate.cost_per_person_served)
        )?;
    }

    writeln!(writer)?;
    writeln!(writer)?;
    writeln!(writer, "{RULE_HEAVY}")?;
    writeln!(writer, "SUMMARY OF ALL RECOMMENDATIONS")?;
    writeln!(writer, "{RULE_HEAVY}")?;
    writeln!(writer)?;
    writeln!(writer, "TOTAL INVESTMENT REQUIRED:")?;
    writeln!(
        writer,
        "  • One-time costs: {}",
        format_dollars(summary.total_one_time_costs)
    )?;
    writeln!(
        writer,
        "  • Annual operating costs: {}",
        format_dollars(summary.total_annual_operating_costs)
    )?;
    writeln!(
        writer,
        "  • 10-year total investment: {}",
        format_dollars(summary.ten_year_investment)
    )?;
    writeln!(writer)?;
    writeln!(writer, "TOTAL ESTIMATED BENEFITS:")?;
    writeln!(
        writer,
        "  • Annual savings: {}",
        format_dollars(summary.total_annual_savings)
    )?;
    writeln!(
        writer,
        "  • 10-year total savings: {}",
        format_dollars(summary.ten_year_savings)
    )?;
    writeln!(writer)?;
    writeln!(writer, "OVERALL ROI:")?;
    writeln!(
        writer,
        "  • 10-year net benefit: {}",
        format_dollars(summary.ten_year_net_benefit)
    )?;
    writeln!(writer, "  • 10-year ROI: {:.1}%", summary.ten_year_roi_pct)?;

    writeln!(writer)?;
    writeln!(writer)?;
    writeln!(writer, "PRIORITY RANKING BY COST-EFFECTIVENESS:")?;
    writeln!(writer, "{RULE_LIGHT}")?;
    for (i, estimate) in summary.cost_effectiveness_ranking.iter().enumerate() {
        writeln!(writer, "{}. {}", i + 1, estimate.category)?;
        writeln!(
            writer,
            "   → Benefit-cost ratio: {:.2}:1",
            estimate.benefit_cost_ratio
        )?;
        if estimate.breaks_even() {
            writeln!(
                writer,
                "   → Break-even: {:.1} years",
                estimate.break_even_years
            )?;
        } else {
            writeln!(writer, "   → Break-even: never")?;
        }
    }

    writeln!(writer)?;
    writeln!(writer, "{RULE_HEAVY}")?;
    writeln!(
        writer,
        "Note: Cost estimates based on 2026 industry standards for LA County."
    )?;
    writeln!(
        writer,
        "Actual costs may vary based on location, scope, and implementation details."
    )?;
    writeln!(writer, "{RULE_HEAVY}")?;

    log::info!("Wrote cost-benefit analysis");
    Ok(())
}

/// Formats a dollar amount rounded to whole dollars with thousands
/// separators; negative amounts keep their sign.
fn format_dollars(amount: f64) -> String {
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let magnitude = rounded.abs() as u64;
    format!("{sign}${}", group_thousands(magnitude))
}
