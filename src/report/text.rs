//! Dense text rendering of cycles and run summaries.

use crate::simulation::{CycleMetrics, RunReport, RunSummary, TerminationReason};
use crate::utils::decimal::to_percent;

const RULE_HEAVY: &str =
    "================================================================================";
const RULE_LIGHT: &str =
    "--------------------------------------------------------------------------------";
const RULE_HASH: &str =
    "################################################################################";

/// Render the audit block for one committed cycle.
pub fn render_cycle(m: &CycleMetrics) -> String {
    let mut s = String::new();

    s.push_str(&format!("\n{}\n", RULE_HEAVY));
    s.push_str(&format!(
        "CYCLE {:03} | STRATEGY: {}\n",
        m.cycle,
        m.strategy.label().to_uppercase()
    ));
    s.push_str(&format!("{}\n", RULE_LIGHT));
    s.push_str("[1] SCENARIO ANALYSIS\n");
    s.push_str(&format!("    > Initial LTV:        {:.4}%\n", to_percent(m.ltv_before)));
    s.push_str(&format!("    > Distance to Goal:   {:.8}\n", m.distance_to_goal));
    s.push_str(&format!("    > Available Cash:     {:.8}\n", m.cash_before));
    if let Some(shortfall) = &m.fallback {
        s.push_str(&format!("    > Growth Fallback:    {:?}\n", shortfall));
    }
    s.push('\n');
    s.push_str("[2] STRATEGY EXECUTION\n");
    s.push_str(&format!("    > Recycled Supply:    {:.8} (accumulated)\n", m.reused_amount));
    s.push_str(&format!("    > Supply Deposited:   {:.8}\n", m.collateral_in));
    s.push_str(&format!("    > New/Flash Supply:   {:.8}\n", m.reinvest_in));
    s.push_str(&format!("    > New Borrow:         {:.8}\n", m.borrow_delta));
    s.push_str(&format!("    > Debt Repayment:     {:.8}\n", m.repay_delta));
    s.push('\n');
    s.push_str("[3] COSTS AND FEES\n");
    s.push_str(&format!("    > Transaction Volume: {:.8}\n", m.volume));
    s.push_str(&format!("    > Platform Fee:       {:.8}\n", m.fees_platform_share));
    s.push_str(&format!("    > Flash Loan Fee:     {:.8}\n", m.fees_flash_loan_share));
    s.push_str(&format!("    > TOTAL FEES:         -{:.8}\n", m.fees_total));
    s.push('\n');
    s.push_str("[4] ACCOUNTING RESULT\n");
    s.push_str(&format!("    > Gross Op Profit:    {:.8}\n", m.profit_out));
    s.push_str(&format!("    > Wallet Change:      {:.8}\n", m.wallet_delta));
    s.push_str(&format!("    > Carried Forward:    {:.8}\n", m.pending_reinvest_after));
    s.push_str(&format!("{}\n", RULE_LIGHT));
    s.push_str("[5] FINAL SYSTEM STATE\n");
    s.push_str(&format!("    > TOTAL SUPPLY:       {:.8}\n", m.collateral_after));
    s.push_str(&format!("    > TOTAL BORROW:       {:.8}\n", m.debt_after));
    s.push_str(&format!("    > TOTAL WALLET:       {:.8}\n", m.cash_after));
    s.push_str(&format!("    > FINAL LTV:          {:.4}%\n", to_percent(m.ltv_after)));
    s.push_str(&format!("    > HEALTH FACTOR:      {:.4}\n", m.health_factor));
    s.push_str(&format!("{}\n", RULE_HEAVY));

    s
}

/// Render the consolidated final report.
pub fn render_summary(summary: &RunSummary) -> String {
    let mut s = String::new();

    s.push_str(&format!("\n{}\n", RULE_HASH));
    s.push_str("FINAL CONSOLIDATED REPORT\n");
    s.push_str(&format!("{}\n", RULE_HASH));
    s.push_str("TARGETS:\n");
    s.push_str(&format!("  > Target Supply:   {:.8}\n", summary.targets.target_collateral));
    s.push_str(&format!("  > Target Wallet:   {:.8}\n", summary.targets.target_cash));
    s.push_str("\nRESULTS:\n");
    s.push_str(&format!("  > Final Supply:    {:.8}\n", summary.final_position.collateral));
    s.push_str(&format!("  > Final Borrow:    {:.8}\n", summary.final_position.debt));
    s.push_str(&format!("  > Final Wallet:    {:.8}\n", summary.final_position.cash));
    s.push_str("\nPERFORMANCE:\n");
    s.push_str(&format!("  > Total Cycles:    {}\n", summary.cycles_executed));
    s.push_str(&format!("  > Total Fees:      {:.8}\n", summary.total_fees));
    s.push_str(&format!(
        "  > Termination:     {}\n",
        describe_termination(&summary.termination)
    ));
    s.push_str(&format!("  > Goal Status:     [{}]\n", summary.status_label()));
    s.push_str(&format!("{}\n", RULE_HASH));

    s
}

/// Render every cycle followed by the summary.
pub fn render_run(scenario: &str, report: &RunReport) -> String {
    let mut s = String::new();

    s.push_str(&format!("\n\n{}\n", RULE_HEAVY));
    s.push_str(&format!("SCENARIO: {}\n", scenario.to_uppercase()));
    s.push_str(&format!("{}\n", RULE_HEAVY));

    for cycle in &report.cycles {
        s.push_str(&render_cycle(cycle));
    }
    s.push_str(&render_summary(&report.summary));

    s
}

fn describe_termination(reason: &TerminationReason) -> String {
    match reason {
        TerminationReason::GoalReached => "goal reached".to_string(),
        TerminationReason::CycleBudgetExhausted => "cycle budget exhausted".to_string(),
        TerminationReason::Stagnated { cycle } => {
            format!("stagnated at cycle {} (no margin to operate)", cycle)
        }
        TerminationReason::Aborted(details) => format!(
            "aborted at cycle {} ({}): wallet {:.8} cannot cover {:.8}",
            details.cycle, details.strategy, details.cash, details.wallet_delta
        ),
    }
}
