use crate::outcome::OutcomeStatus;
use crate::report::RunReport;

const RULE_WIDTH: usize = 60;

fn rule() -> String {
    "#".repeat(RULE_WIDTH)
}

/// Human-readable summary block printed at the end of a run.
pub fn format_summary(report: &RunReport) -> String {
    let mut output = format!("{}\n# RUN SUMMARY\n{}\n", rule(), rule());

    if report.interrupted() {
        output.push_str(&format!(
            "Interrupted after {} of {} pages\n",
            report.total(),
            report.requested()
        ));
    }
    output.push_str(&format!("Total pages:  {}\n", report.total()));
    output.push_str(&format!("Success:      {}\n", report.success_count()));
    output.push_str(&format!("Partial:      {}\n", report.partial_count()));
    output.push_str(&format!("Failed:       {}\n", report.failed_count()));

    let problems = format_problems(report);
    if !problems.is_empty() {
        output.push('\n');
        output.push_str(&problems);
    }

    output.push_str(&rule());
    output
}

/// One line per partial or failed page, with its diagnostic.
pub fn format_problems(report: &RunReport) -> String {
    let mut output = String::new();
    for outcome in report.outcomes() {
        let tag = match outcome.status {
            OutcomeStatus::Success => continue,
            OutcomeStatus::Partial => "partial",
            OutcomeStatus::Failed => "failed",
        };
        let message = outcome.message.as_deref().unwrap_or("no details");
        output.push_str(&format!("  {} [{}]: {}\n", outcome.page, tag, message));
    }
    output
}
