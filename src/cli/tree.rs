use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use erbfolge::{TreeNode, projection::project_with_precision};
use tracing::instrument;

use super::{
    compute::calculate,
    parse_date,
    terminal::{self, Colorize},
    workspace::Workspace,
};

/// Command arguments for `erbfolge tree`.
#[derive(Debug, Parser)]
#[command(about = "Show the family tree with shares")]
pub struct Tree {
    /// Reference date for life status (default: today).
    #[arg(long, value_parser = parse_date)]
    as_of: Option<NaiveDate>,

    /// Output format (default: outline).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

/// Supported output formats.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Outline,
    Json,
}

impl Tree {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let workspace = Workspace::open(&root)?;
        let snapshot = workspace.require_snapshot()?;
        let calculation = calculate(&snapshot, self.as_of, None);

        let tree = project_with_precision(
            &snapshot.deceased_name,
            &snapshot.persons,
            &calculation.shares,
            workspace.config().decimals(),
        );

        match self.output {
            OutputFormat::Outline => {
                let width = terminal::terminal_width().map(usize::from);
                for line in outline(&tree, width) {
                    println!("{line}");
                }
            }
            OutputFormat::Json => {
                serde_json::to_writer_pretty(std::io::stdout(), &tree)
                    .context("failed to render json output")?;
                println!();
            }
        }
        Ok(())
    }
}

fn label(node: &TreeNode) -> String {
    let details: Vec<String> = ["relationship", "birth", "death"]
        .into_iter()
        .filter_map(|key| {
            node.attribute(key).map(|value| match key {
                "birth" => format!("* {value}"),
                "death" => format!("† {value}"),
                _ => value.to_string(),
            })
        })
        .collect();

    let mut line = node.name.clone();
    if !details.is_empty() {
        line.push_str(&format!(" ({})", details.join(", ")).dim());
    }
    if let Some(share) = node.attribute("share") {
        let share = if share == "0%" {
            share.dim()
        } else {
            share.success()
        };
        line.push_str(&format!("  {share}"));
    }
    line
}

/// Renders the tree as indented lines, truncated to `width` characters.
fn outline(tree: &TreeNode, width: Option<usize>) -> Vec<String> {
    fn walk(node: &TreeNode, prefix: &str, lines: &mut Vec<String>) {
        let count = node.children.len();
        for (idx, child) in node.children.iter().enumerate() {
            let last = idx + 1 == count;
            let branch = if last { "└── " } else { "├── " };
            lines.push(format!("{prefix}{branch}{}", label(child)));
            let nested = format!("{prefix}{}", if last { "    " } else { "│   " });
            walk(child, &nested, lines);
        }
    }

    let mut lines = vec![label(tree)];
    walk(tree, "", &mut lines);

    if let Some(width) = width {
        for line in &mut lines {
            if line.chars().count() > width && !terminal::supports_color() {
                *line = line.chars().take(width.saturating_sub(1)).collect();
                line.push('…');
            }
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use erbfolge::{
        IdAllocator, MatrimonialRegime, Person, Relationship, ShareMap, domain::SequentialIds,
        project,
    };

    use super::*;

    #[test]
    fn outline_nests_grandchildren() {
        let mut ids = SequentialIds::default();
        let lineage = ids.lineage_id();
        let anna = Person::new(ids.person_id(), Relationship::Child, "Anna", "Berg")
            .with_lineage(lineage);
        let lea = Person::new(ids.person_id(), Relationship::Grandchild, "Lea", "Berg")
            .with_parent(anna.id())
            .with_lineage(lineage);
        let karl = Person::new(ids.person_id(), Relationship::Parent, "Karl", "Berg");
        let persons = vec![anna, lea, karl];
        let shares = erbfolge::compute(
            &persons,
            MatrimonialRegime::default(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        );

        let lines = outline(&project("Erich Berg", &persons, &shares), None);

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Erich Berg"));
        assert!(lines[1].starts_with("├── Anna Berg"));
        assert!(lines[2].starts_with("│   └── Lea Berg"));
        assert!(lines[3].starts_with("└── Karl Berg"));
    }

    #[test]
    fn empty_tree_has_only_the_root() {
        let lines = outline(&project("", &[], &ShareMap::new()), Some(80));
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("Deceased"));
    }
}
