use unisession_core::model::Category;
use unisession_core::{CombinePlan, CombineReport};

use super::OutputFormat;

pub fn format_plan(plan: &CombinePlan, fmt: OutputFormat) -> String {
    match fmt {
        OutputFormat::Json => with_newline(serde_json::to_string_pretty(plan).unwrap_or_default()),
        OutputFormat::Text => format_plan_text(plan),
    }
}

fn format_plan_text(plan: &CombinePlan) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "sub-{}: sessions {} -> {}\n",
        plan.subject,
        plan.sessions.join(", "),
        plan.subject_dir().display()
    ));

    for category in Category::ALL {
        let files = plan.category(category);
        if files.is_empty() {
            continue;
        }
        out.push_str(&format!("\n--- {category} ({}) ---\n", files.len()));
        for planned in files {
            let file = &planned.file;
            out.push_str(&format!(
                "  ses-{} {} -> {}\n",
                file.record.session,
                file.record.file_name(),
                file.subject_relative_destination()
            ));
        }
    }

    push_warnings(&mut out, &plan.warnings);
    out.push_str("\n(dry run - no changes made)\n");
    out
}

pub fn format_report(report: &CombineReport, fmt: OutputFormat) -> String {
    match fmt {
        OutputFormat::Json => with_newline(serde_json::to_string_pretty(report).unwrap_or_default()),
        OutputFormat::Text => {
            let mut out = format!(
                "Copied {} file(s) into {}\nLog: {}\n",
                report.transfers.len(),
                report.output_root.display(),
                report.log_path.display()
            );
            push_warnings(&mut out, &report.warnings);
            out
        }
    }
}

fn push_warnings(out: &mut String, warnings: &[String]) {
    if warnings.is_empty() {
        return;
    }
    out.push_str(&format!("\n--- Warnings ({}) ---\n", warnings.len()));
    for warning in warnings {
        out.push_str(&format!("  {warning}\n"));
    }
}

fn with_newline(mut s: String) -> String {
    s.push('\n');
    s
}
