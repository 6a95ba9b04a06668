use std::path::PathBuf;

use clap::Parser;
use erbfolge::{Snapshot, calculator::Warning, domain::LineageIssue};
use tracing::instrument;

use super::{
    compute::calculate,
    terminal::Colorize,
    workspace::{Workspace, short_id},
};

#[derive(Debug, Parser)]
#[command(about = "Check the recorded family for inconsistencies")]
pub struct Validate {
    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Suppress all output except errors
    #[arg(long, short)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
    Summary,
}

#[derive(Debug, Default)]
struct ValidationResult {
    record_issues: Vec<RecordIssue>,
    lineage_issues: Vec<LineageIssue>,
    warnings: Vec<Warning>,
}

#[derive(Debug, PartialEq, Eq)]
struct RecordIssue {
    person: String,
    message: &'static str,
}

impl ValidationResult {
    fn count_issues(&self) -> usize {
        self.record_issues.len() + self.lineage_issues.len()
    }

    fn has_issues(&self) -> bool {
        self.count_issues() > 0
    }
}

fn check(snapshot: &Snapshot) -> anyhow::Result<ValidationResult> {
    let mut result = ValidationResult::default();

    if snapshot.deceased_name.trim().is_empty() {
        result.record_issues.push(RecordIssue {
            person: "deceased".to_string(),
            message: "name of the deceased is missing",
        });
    }

    for person in &snapshot.persons {
        let id = short_id(person.id());
        if person.given_name.trim().is_empty() {
            result.record_issues.push(RecordIssue {
                person: id.clone(),
                message: "given name is missing",
            });
        }
        if person.family_name.trim().is_empty() {
            result.record_issues.push(RecordIssue {
                person: id.clone(),
                message: "family name is missing",
            });
        }
        if person.birth_date.is_none() {
            result.record_issues.push(RecordIssue {
                person: id,
                message: "date of birth is missing",
            });
        }
    }

    result.lineage_issues = snapshot.registry()?.lineage_issues();
    result.warnings = calculate(snapshot, None, None).warning().into_iter().collect();

    Ok(result)
}

impl Validate {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let workspace = Workspace::open(&root)?;
        let snapshot = workspace.require_snapshot()?;
        let result = check(&snapshot)?;

        match self.output {
            OutputFormat::Table => self.output_table(&result, &snapshot),
            OutputFormat::Json => Self::output_json(&result)?,
            OutputFormat::Summary => println!("issues={}", result.count_issues()),
        }

        if result.has_issues() {
            std::process::exit(2);
        }

        Ok(())
    }

    fn output_table(&self, result: &ValidationResult, snapshot: &Snapshot) {
        if self.quiet {
            return;
        }

        println!("Validating case...\n");

        if result.record_issues.is_empty() {
            println!(
                "✓ Records:    {} relatives, all complete",
                snapshot.persons.len()
            );
        } else {
            println!(
                "{}",
                format!("✗ Records:    {} issues found", result.record_issues.len()).warning()
            );
            for issue in &result.record_issues {
                println!("    {}: {}", issue.person, issue.message);
            }
        }

        if result.lineage_issues.is_empty() {
            println!("✓ Lineage:    All grandchildren attached to their stirps");
        } else {
            println!(
                "{}",
                format!("✗ Lineage:    {} issues found", result.lineage_issues.len()).warning()
            );
            for issue in &result.lineage_issues {
                println!("    {issue}");
            }
        }

        for warning in &result.warnings {
            println!("{}", format!("⚠️  {warning}").warning());
        }

        let total_issues = result.count_issues();
        if total_issues == 0 {
            println!("\n{}", "Case is consistent (0 issues)".success());
        } else {
            println!("\n{}", format!("Summary: {total_issues} issues found").warning());
            println!(
                "{}",
                "Run 'erbfolge edit' or 'erbfolge remove' to correct records".dim()
            );
        }
    }

    fn output_json(result: &ValidationResult) -> anyhow::Result<()> {
        use serde_json::json;

        let records: Vec<_> = result
            .record_issues
            .iter()
            .map(|issue| json!({ "person": issue.person, "message": issue.message }))
            .collect();

        let lineage: Vec<_> = result
            .lineage_issues
            .iter()
            .map(|issue| {
                json!({
                    "grandchild": issue.grandchild(),
                    "message": issue.to_string(),
                })
            })
            .collect();

        let total_issues = result.count_issues();
        let output = json!({
            "status": if total_issues == 0 { "consistent" } else { "issues_found" },
            "issues": {
                "records": records,
                "lineage": lineage,
            },
            "warnings": result.warnings.iter().map(ToString::to_string).collect::<Vec<_>>(),
            "summary": {
                "total_issues": total_issues,
            }
        });

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }
}
