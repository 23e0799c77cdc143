use crate::gate_error::{GateError, GateErrorKind};
use crate::report::{Report, RuleReport, RuleStatus};
use clap::ValueEnum;
use colored::Colorize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Github,
    Gitlab,
}

pub fn render(report: &Report, format: OutputFormat) -> Result<String, Box<GateError>> {
    match format {
        OutputFormat::Text => Ok(render_text(report)),
        OutputFormat::Json => serde_json::to_string_pretty(report).map_err(|e| {
            Box::new(GateError::new(
                "Failed to serialize report",
                &e.to_string(),
                GateErrorKind::Engine,
            ))
        }),
        OutputFormat::Github => Ok(render_github(report)),
        OutputFormat::Gitlab => Ok(render_gitlab(report)),
    }
}

fn status_tag(status: RuleStatus) -> String {
    match status {
        RuleStatus::Passed => "OK".green().to_string(),
        RuleStatus::Failed => "FAIL".red().to_string(),
        RuleStatus::Skipped => "SKIP".dimmed().to_string(),
    }
}

fn commit_label(commit: &crate::commit::Commit) -> String {
    if commit.hash.is_empty() {
        format!("(message) {}", commit.subject)
    } else {
        format!("{} {}", commit.short_hash(), commit.subject)
    }
}

fn push_rule_lines(out: &mut String, results: &[RuleReport]) {
    for result in results {
        out.push_str(&format!(
            "  - {}: {}\n",
            result.name,
            status_tag(result.status)
        ));
        for error in &result.errors {
            out.push_str(&format!(
                "      {} {}\n",
                error.code.as_str().yellow(),
                error.message
            ));
            if !error.help.is_empty() {
                out.push_str(&format!("      {}\n", error.help.dimmed()));
            }
        }
    }
}

fn render_text(report: &Report) -> String {
    let mut out = String::new();

    for commit_report in &report.commits {
        let tag = if commit_report.passed {
            "OK".green().bold().to_string()
        } else {
            "FAIL".red().bold().to_string()
        };
        out.push_str(&format!(
            "{} [{}]\n",
            commit_label(&commit_report.commit),
            tag
        ));
        push_rule_lines(&mut out, &commit_report.rule_results);
    }

    if !report.repository.rule_results.is_empty() {
        out.push_str("Repository:\n");
        push_rule_lines(&mut out, &report.repository.rule_results);
    }

    let summary = &report.summary;
    let verdict = if summary.all_passed {
        "ALL OK".green().bold().to_string()
    } else {
        format!("{} of {} commits failed", summary.failed_commits, summary.total_commits)
            .red()
            .bold()
            .to_string()
    };
    out.push_str(&format!(
        "\nSummary: {} ({} passed, {} failed)\n",
        verdict, summary.passed_commits, summary.failed_commits
    ));
    if !report.metadata.complete {
        out.push_str(&format!("{}\n", "Run was cancelled before completion".yellow()));
    }
    out
}

/// One workflow annotation per finding, in the syntax GitHub Actions parses
/// from job logs.
fn render_github(report: &Report) -> String {
    let mut out = String::new();
    let commit_errors = report.commits.iter().flat_map(|c| {
        c.rule_results
            .iter()
            .flat_map(|r| r.errors.iter())
            .map(move |e| (commit_label(&c.commit), e))
    });
    let repo_errors = report
        .repository
        .rule_results
        .iter()
        .flat_map(|r| r.errors.iter())
        .map(|e| ("repository".to_string(), e));

    for (location, error) in commit_errors.chain(repo_errors) {
        out.push_str(&format!(
            "::error title={} ({})::{} [{}]\n",
            error.rule,
            error.code.as_str(),
            error.message,
            location
        ));
    }
    out.push_str(&format!(
        "{} commits checked, {} failed\n",
        report.summary.total_commits, report.summary.failed_commits
    ));
    out
}

/// Collapsible log sections, one per failing commit.
fn render_gitlab(report: &Report) -> String {
    let mut out = String::new();
    for (index, commit_report) in report.commits.iter().enumerate() {
        let header = commit_label(&commit_report.commit);
        out.push_str(&format!(
            "section_start:{}:commit_{index}\r\x1b[0K{header}\n",
            report.metadata.timestamp
        ));
        for result in &commit_report.rule_results {
            out.push_str(&format!("  {}: {}\n", result.name, result.status.as_str()));
            for error in &result.errors {
                out.push_str(&format!("    {}: {}\n", error.code.as_str(), error.message));
            }
        }
        out.push_str(&format!(
            "section_end:{}:commit_{index}\r\x1b[0K\n",
            report.metadata.timestamp
        ));
    }
    out.push_str(&format!(
        "{} commits checked, {} failed\n",
        report.summary.total_commits, report.summary.failed_commits
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::Commit;
    use crate::report::{CommitReport, ErrorCode, RepositoryReport, ValidationError};

    fn sample_report() -> Report {
        let commit = Commit::new(
            "abc123def456",
            "feat: add login",
            "Ada",
            "ada@example.com",
            "",
            false,
        );
        let failing = RuleReport::from_errors(
            "Subject",
            vec![ValidationError::new(
                "Subject",
                ErrorCode::SubjectTooLong,
                "Subject is 90 characters, 18 over the limit",
            )],
        );
        Report::build(
            vec![CommitReport {
                commit,
                passed: false,
                rule_results: vec![failing],
            }],
            RepositoryReport::default(),
            true,
        )
    }

    #[test]
    fn test_json_has_required_keys() {
        let rendered = render(&sample_report(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert!(value["summary"]["total_commits"].is_number());
        assert!(value["summary"]["passed_commits"].is_number());
        assert!(value["summary"]["all_passed"].is_boolean());
        assert_eq!(value["commits"][0]["commit"]["hash"], "abc123def456");
        assert_eq!(value["commits"][0]["commit"]["subject"], "feat: add login");
        assert_eq!(value["commits"][0]["rule_results"][0]["name"], "Subject");
        assert_eq!(value["commits"][0]["rule_results"][0]["status"], "failed");
        assert_eq!(
            value["commits"][0]["rule_results"][0]["errors"][0]["code"],
            "subject_too_long"
        );
        assert!(
            value["commits"][0]["rule_results"][0]["errors"][0]["message"]
                .as_str()
                .unwrap()
                .contains("90 characters")
        );
    }

    #[test]
    fn test_text_mentions_commit_and_code() {
        colored::control::set_override(false);
        let rendered = render(&sample_report(), OutputFormat::Text).unwrap();
        assert!(rendered.contains("abc123de"));
        assert!(rendered.contains("subject_too_long"));
        assert!(rendered.contains("Summary:"));
    }

    #[test]
    fn test_github_annotations() {
        let rendered = render(&sample_report(), OutputFormat::Github).unwrap();
        assert!(rendered.contains("::error title=Subject (subject_too_long)::"));
    }

    #[test]
    fn test_gitlab_sections() {
        let rendered = render(&sample_report(), OutputFormat::Gitlab).unwrap();
        assert!(rendered.contains("section_start:"));
        assert!(rendered.contains("section_end:"));
        assert!(rendered.contains("subject_too_long"));
    }
}
