use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use erbfolge::{
    Calculation, Snapshot,
    calculator::{self, Request},
    domain::today,
};
use serde_json::json;
use tracing::{info, instrument};

use super::{
    parse_date, parse_estate_value,
    terminal::{self, Colorize},
    workspace::{Workspace, short_id},
};

/// Command arguments for `erbfolge compute`.
#[derive(Debug, Parser)]
#[command(about = "Compute statutory shares")]
pub struct Compute {
    /// Reference date for life status (default: today).
    #[arg(long, value_parser = parse_date)]
    as_of: Option<NaiveDate>,

    /// Estate value to distribute (overrides the stored value).
    #[arg(long, value_parser = parse_estate_value)]
    estate_value: Option<f64>,

    /// Include relatives who inherit nothing.
    #[arg(long)]
    all: bool,

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

impl Compute {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let workspace = Workspace::open(&root)?;
        let snapshot = workspace.require_snapshot()?;
        let decimals = workspace.config().decimals();

        let calculation = calculate(&snapshot, self.as_of, self.estate_value);
        info!(
            heirs = calculation.shares.len(),
            regime = %calculation.regime,
            "computed shares"
        );

        match self.output {
            OutputFormat::Table => self.render_table(&snapshot, &calculation, decimals),
            OutputFormat::Json => render_json(&snapshot, &calculation)?,
        }
        Ok(())
    }

    fn render_table(&self, snapshot: &Snapshot, calculation: &Calculation, decimals: usize) {
        if !snapshot.deceased_name.is_empty() {
            println!("{}", format!("Deceased: {}", snapshot.deceased_name).info());
        }
        println!(
            "{}\n",
            format!(
                "Regime: {} | as of {}",
                calculation.regime.label(),
                calculation.as_of
            )
            .dim()
        );

        let mut headers = vec!["ID", "RELATIONSHIP", "NAME", "SHARE"];
        if calculation.estate_value.is_some() {
            headers.push("AMOUNT");
        }

        let rows: Vec<Vec<String>> = snapshot
            .persons
            .iter()
            .filter(|p| self.all || calculation.shares.share(p.id()).is_some())
            .map(|person| {
                let mut row = vec![
                    short_id(person.id()),
                    person.relationship.to_string(),
                    person.full_name(),
                    calculation.shares.format(person.id(), decimals),
                ];
                if let Some(amount) = calculation.amount_of(person.id()) {
                    row.push(format!("{amount:.decimals$}"));
                }
                row
            })
            .collect();

        if rows.is_empty() {
            println!("{}", "Nobody inherits".dim());
        } else {
            terminal::print_table(&headers, &rows);
        }

        if let Some(warning) = calculation.warning() {
            println!("\n{}", format!("⚠️  {warning}").warning());
        }
    }
}

/// Computes shares for the stored case.
pub fn calculate(
    snapshot: &Snapshot,
    as_of: Option<NaiveDate>,
    estate_value: Option<f64>,
) -> Calculation {
    calculator::calculate(Request {
        persons: &snapshot.persons,
        regime: snapshot.regime,
        as_of: as_of.unwrap_or_else(today),
        estate_value: estate_value.or(snapshot.estate_value),
    })
}

fn render_json(snapshot: &Snapshot, calculation: &Calculation) -> anyhow::Result<()> {
    let shares: Vec<_> = snapshot
        .persons
        .iter()
        .filter_map(|person| {
            let share = calculation.shares.share(person.id())?;
            Some(json!({
                "id": person.id(),
                "name": person.full_name(),
                "relationship": person.relationship,
                "share": share,
                "amount": calculation.amount_of(person.id()),
            }))
        })
        .collect();

    let output = json!({
        "deceased": snapshot.deceased_name,
        "regime": calculation.regime,
        "as_of": calculation.as_of,
        "estate_value": calculation.estate_value,
        "shares": shares,
        "warning": calculation.warning().map(|w| w.to_string()),
    });

    serde_json::to_writer_pretty(std::io::stdout(), &output)
        .context("failed to render json output")?;
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use erbfolge::{IdAllocator, MatrimonialRegime, Person, Relationship, domain::SequentialIds};

    use super::*;

    #[test]
    fn command_line_value_overrides_stored_estate_value() {
        let mut ids = SequentialIds::default();
        let spouse = Person::new(ids.person_id(), Relationship::Spouse, "Helga", "Berg");
        let spouse_id = spouse.id();
        let mut snapshot = Snapshot::new("Erich Berg", MatrimonialRegime::default(), vec![spouse]);
        snapshot.estate_value = Some(1_000.0);
        let as_of = NaiveDate::from_ymd_opt(2024, 6, 1);

        let stored = calculate(&snapshot, as_of, None);
        assert_eq!(stored.amount_of(spouse_id), Some(1_000.0));

        let overridden = calculate(&snapshot, as_of, Some(500.0));
        assert_eq!(overridden.amount_of(spouse_id), Some(500.0));
    }

    #[test]
    fn compute_requires_a_stored_case() {
        let tmp = tempfile::tempdir().unwrap();
        let command = Compute {
            as_of: None,
            estate_value: None,
            all: false,
            output: OutputFormat::Json,
        };
        assert!(command.run(tmp.path().to_path_buf()).is_err());
    }
}
