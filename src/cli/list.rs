use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use erbfolge::{Person, Relationship, domain::today};
use serde_json::json;
use tracing::instrument;

use super::{
    parse_date, parse_relationship,
    terminal::{self, Colorize},
    workspace::{Workspace, short_id},
};

/// Command arguments for `erbfolge list`.
#[derive(Debug, Default, Parser)]
#[command(about = "List recorded relatives")]
pub struct List {
    /// Only show relatives of this kind.
    #[arg(long, value_parser = parse_relationship)]
    relationship: Option<Relationship>,

    /// Reference date for life status (default: today).
    #[arg(long, value_parser = parse_date)]
    as_of: Option<NaiveDate>,

    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

/// Supported output formats.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl List {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let workspace = Workspace::open(&root)?;
        let Some(snapshot) = workspace.snapshot()? else {
            println!("{}", "No case recorded yet. Run 'erbfolge interview' to start.".dim());
            return Ok(());
        };
        let as_of = self.as_of.unwrap_or_else(today);

        let persons: Vec<&Person> = snapshot
            .persons
            .iter()
            .filter(|p| self.relationship.is_none_or(|kind| p.relationship == kind))
            .collect();

        match self.output {
            OutputFormat::Table => {
                if !snapshot.deceased_name.is_empty() {
                    println!("{}\n", format!("Deceased: {}", snapshot.deceased_name).info());
                }
                render_table(&persons, as_of);
            }
            OutputFormat::Json => render_json(&snapshot.deceased_name, &persons, as_of)?,
        }
        Ok(())
    }
}

fn status(person: &Person, as_of: NaiveDate) -> &'static str {
    if person.is_alive(as_of) {
        "alive"
    } else {
        "deceased"
    }
}

fn render_table(persons: &[&Person], as_of: NaiveDate) {
    if persons.is_empty() {
        println!("{}", "No relatives recorded".dim());
        return;
    }

    let narrow = terminal::is_narrow();
    let headers: &[&str] = if narrow {
        &["ID", "RELATIONSHIP", "NAME", "STATUS"]
    } else {
        &["ID", "RELATIONSHIP", "NAME", "BORN", "DIED", "STATUS"]
    };

    let rows: Vec<Vec<String>> = persons
        .iter()
        .map(|person| {
            let mut row = vec![
                short_id(person.id()),
                person.relationship.to_string(),
                person.full_name(),
            ];
            if !narrow {
                row.push(person.birth_date.map_or_else(String::new, |d| d.to_string()));
                row.push(person.death_date.map_or_else(String::new, |d| d.to_string()));
            }
            row.push(status(person, as_of).to_string());
            row
        })
        .collect();

    terminal::print_table(headers, &rows);
}

fn render_json(deceased: &str, persons: &[&Person], as_of: NaiveDate) -> anyhow::Result<()> {
    let rows: Vec<_> = persons
        .iter()
        .map(|person| {
            json!({
                "id": person.id(),
                "relationship": person.relationship,
                "given_name": person.given_name,
                "family_name": person.family_name,
                "birth_date": person.birth_date,
                "death_date": person.death_date,
                "parent_id": person.parent_id,
                "lineage_id": person.lineage_id,
                "generation": person.generation,
                "status": status(person, as_of),
            })
        })
        .collect();

    let output = json!({
        "deceased": deceased,
        "as_of": as_of,
        "persons": rows,
    });
    serde_json::to_writer_pretty(std::io::stdout(), &output)
        .context("failed to render json output")?;
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use erbfolge::{IdAllocator, domain::SequentialIds};

    use super::*;

    #[test]
    fn status_uses_the_reference_date() {
        let mut ids = SequentialIds::default();
        let person = Person::new(ids.person_id(), Relationship::Parent, "Karl", "Berg")
            .with_death_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());

        assert_eq!(status(&person, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()), "alive");
        assert_eq!(status(&person, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()), "deceased");
    }

    #[test]
    fn list_without_case_succeeds() {
        let tmp = tempfile::tempdir().unwrap();
        List::default()
            .run(tmp.path().to_path_buf())
            .expect("listing an empty directory should succeed");
    }
}
