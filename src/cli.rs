use std::path::{Path, PathBuf};

mod compute;
mod interview;
mod list;
mod terminal;
mod tree;
mod validate;
mod workspace;

use anyhow::Context;
use chrono::NaiveDate;
use clap::ArgAction;
use compute::Compute;
use erbfolge::{IdAllocator, MatrimonialRegime, Person, RandomIds, Relationship};
use interview::Interview;
use list::List;
use tracing::instrument;
use tree::Tree;
use validate::Validate;
use workspace::{STATE_DIR, Workspace, resolve_person, short_id};

/// Parse a date given as `YYYY-MM-DD` or `DD.MM.YYYY`.
fn parse_date(s: &str) -> Result<NaiveDate, String> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%d.%m.%Y"))
        .map_err(|_| format!("invalid date '{s}': expected YYYY-MM-DD or DD.MM.YYYY"))
}

/// Parse an estate value, rejecting negative and non-finite numbers.
fn parse_estate_value(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("invalid estate value '{s}': expected a number"))?;
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(format!("invalid estate value '{s}': must be a non-negative number"))
    }
}

/// Parse a relationship, accepting English and German names.
fn parse_relationship(s: &str) -> Result<Relationship, String> {
    s.parse().map_err(|e| format!("{e}"))
}

/// Parse a matrimonial regime, accepting English and German names.
fn parse_regime(s: &str) -> Result<MatrimonialRegime, String> {
    s.parse().map_err(|e| format!("{e}"))
}

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global=true)]
    verbose: u8,

    /// The directory holding the case data
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command
            .unwrap_or_else(|| Command::List(List::default()))
            .run(self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Initialize a new case directory
    Init(Init),

    /// Collect the family through a guided interview
    Interview(Interview),

    /// Set the deceased's name, matrimonial regime, or estate value
    Case(Case),

    /// Record a relative
    Add(Add),

    /// Change a recorded relative
    Edit(Edit),

    /// Delete a recorded relative
    Remove(Remove),

    /// List recorded relatives (default)
    List(List),

    /// Compute statutory shares
    Compute(Compute),

    /// Show the family tree with shares
    Tree(Tree),

    /// Check the recorded family for inconsistencies
    Validate(Validate),

    /// Show or modify configuration settings
    Config(Config),
}

impl Command {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::Init(command) => command.run(&root)?,
            Self::Interview(command) => command.run(root)?,
            Self::Case(command) => command.run(root)?,
            Self::Add(command) => command.run(root)?,
            Self::Edit(command) => command.run(root)?,
            Self::Remove(command) => command.run(root)?,
            Self::List(command) => command.run(root)?,
            Self::Compute(command) => command.run(root)?,
            Self::Tree(command) => command.run(root)?,
            Self::Validate(command) => command.run(root)?,
            Self::Config(command) => command.run(&root)?,
        }
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Init {
    /// Key the case is stored under
    #[arg(long)]
    tool_id: Option<String>,

    /// Matrimonial regime preselected in the interview
    #[arg(long, value_parser = parse_regime)]
    regime: Option<MatrimonialRegime>,
}

impl Init {
    #[instrument]
    fn run(self, root: &Path) -> anyhow::Result<()> {
        use terminal::Colorize;

        let state_dir = root.join(STATE_DIR);
        if state_dir.exists() {
            anyhow::bail!(
                "Case directory already initialized (found existing {STATE_DIR} directory)"
            );
        }

        std::fs::create_dir_all(&state_dir)
            .with_context(|| format!("Failed to create {STATE_DIR} directory"))?;

        let mut config = erbfolge::Config::default();
        if let Some(tool_id) = &self.tool_id {
            config.set_tool_id(tool_id);
        }
        if let Some(regime) = self.regime {
            config.default_regime = regime;
        }
        config
            .save(&Workspace::config_path(root))
            .map_err(|e| anyhow::anyhow!("Failed to create config.toml: {e}"))?;

        println!(
            "{}",
            format!("Initialized case directory in {}", root.display()).success()
        );
        println!("  Created: {STATE_DIR}/config.toml");
        println!();
        println!("Next steps:");
        println!("  erbfolge interview");
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Case {
    /// Full name of the deceased
    #[arg(long)]
    deceased: Option<String>,

    /// Matrimonial regime of the deceased
    #[arg(long, value_parser = parse_regime)]
    regime: Option<MatrimonialRegime>,

    /// Value of the estate
    #[arg(long, value_parser = parse_estate_value, conflicts_with = "clear_estate_value")]
    estate_value: Option<f64>,

    /// Forget the estate value
    #[arg(long)]
    clear_estate_value: bool,
}

impl Case {
    #[instrument]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let workspace = Workspace::open(&root)?;
        let mut snapshot = workspace.snapshot_or_default()?;

        if let Some(name) = &self.deceased {
            let name = name.trim();
            if name.is_empty() {
                anyhow::bail!("the name of the deceased must not be empty");
            }
            snapshot.deceased_name = name.to_string();
        }
        if let Some(regime) = self.regime {
            snapshot.regime = regime;
        }
        if let Some(value) = self.estate_value {
            snapshot.estate_value = Some(value);
        }
        if self.clear_estate_value {
            snapshot.estate_value = None;
        }

        workspace.save(&mut snapshot)?;

        let name = if snapshot.deceased_name.is_empty() {
            "(not set)"
        } else {
            snapshot.deceased_name.as_str()
        };
        println!("Deceased:     {name}");
        println!("Regime:       {}", snapshot.regime.label());
        match snapshot.estate_value {
            Some(value) => println!("Estate value: {value:.2}"),
            None => println!("Estate value: (not set)"),
        }
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Add {
    /// How the person is related to the deceased (e.g. child, grandchild,
    /// parent)
    #[clap(value_parser = parse_relationship)]
    relationship: Relationship,

    /// Given name
    given_name: String,

    /// Family name
    family_name: String,

    /// Date of birth (YYYY-MM-DD or DD.MM.YYYY)
    #[arg(long, value_parser = parse_date)]
    born: Option<NaiveDate>,

    /// Date of death (YYYY-MM-DD or DD.MM.YYYY)
    #[arg(long, value_parser = parse_date)]
    died: Option<NaiveDate>,

    /// Identifier (or unique prefix) of the child a grandchild descends from
    #[arg(long)]
    parent: Option<String>,
}

impl Add {
    #[instrument]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        use terminal::Colorize;

        let given_name = self.given_name.trim();
        let family_name = self.family_name.trim();
        if given_name.is_empty() || family_name.is_empty() {
            anyhow::bail!("given name and family name must not be empty");
        }

        let workspace = Workspace::open(&root)?;
        let mut snapshot = workspace.snapshot_or_default()?;
        let mut registry = snapshot.registry()?;
        let mut ids = RandomIds;

        let mut person = Person::new(ids.person_id(), self.relationship, given_name, family_name);
        if let Some(born) = self.born {
            person = person.with_birth_date(born);
        }
        if let Some(died) = self.died {
            person = person.with_death_date(died);
        }

        match (self.relationship, &self.parent) {
            (Relationship::Child, None) => person = person.with_lineage(ids.lineage_id()),
            (Relationship::Grandchild, Some(parent)) => {
                let parent_id = resolve_person(&snapshot, parent)?;
                let parent = registry
                    .get(parent_id)
                    .with_context(|| format!("person {parent_id} not found"))?;
                if parent.relationship != Relationship::Child {
                    anyhow::bail!(
                        "{} is a {}, not a child of the deceased",
                        parent.full_name(),
                        parent.relationship
                    );
                }
                person = person
                    .with_parent(parent_id)
                    .with_generation(parent.generation + 1);
                if let Some(lineage) = parent.lineage_id {
                    person = person.with_lineage(lineage);
                }
            }
            (Relationship::Grandchild, None) => {
                anyhow::bail!("a grandchild needs --parent naming the child it descends from");
            }
            (_, Some(_)) => anyhow::bail!("--parent only applies to grandchildren"),
            (_, None) => {}
        }

        let id = registry.add(person)?;
        snapshot.persons = registry.into_persons();
        workspace.save(&mut snapshot)?;

        println!(
            "{}",
            format!(
                "Added {} {given_name} {family_name} ({})",
                self.relationship,
                short_id(id)
            )
            .success()
        );
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Edit {
    /// Identifier (or unique prefix) of the person to change
    id: String,

    /// New given name
    #[arg(long)]
    given_name: Option<String>,

    /// New family name
    #[arg(long)]
    family_name: Option<String>,

    /// New date of birth
    #[arg(long, value_parser = parse_date)]
    born: Option<NaiveDate>,

    /// New date of death
    #[arg(long, value_parser = parse_date, conflicts_with = "alive")]
    died: Option<NaiveDate>,

    /// Clear the date of death
    #[arg(long)]
    alive: bool,
}

impl Edit {
    #[instrument]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        use terminal::Colorize;

        let workspace = Workspace::open(&root)?;
        let mut snapshot = workspace.require_snapshot()?;
        let id = resolve_person(&snapshot, &self.id)?;
        let mut registry = snapshot.registry()?;

        let mut person = registry
            .get(id)
            .cloned()
            .with_context(|| format!("person {id} not found"))?;

        if let Some(name) = &self.given_name {
            let name = name.trim();
            if name.is_empty() {
                anyhow::bail!("given name must not be empty");
            }
            person.given_name = name.to_string();
        }
        if let Some(name) = &self.family_name {
            let name = name.trim();
            if name.is_empty() {
                anyhow::bail!("family name must not be empty");
            }
            person.family_name = name.to_string();
        }
        if let Some(born) = self.born {
            person.birth_date = Some(born);
        }
        if let Some(died) = self.died {
            person.death_date = Some(died);
        }
        if self.alive {
            person.death_date = None;
        }

        let name = person.full_name();
        registry.replace(id, person)?;
        snapshot.persons = registry.into_persons();
        workspace.save(&mut snapshot)?;

        println!("{}", format!("Updated {name} ({})", short_id(id)).success());
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Remove {
    /// Identifier (or unique prefix) of the person to delete
    id: String,
}

impl Remove {
    #[instrument]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        use terminal::Colorize;

        let workspace = Workspace::open(&root)?;
        let mut snapshot = workspace.require_snapshot()?;
        let id = resolve_person(&snapshot, &self.id)?;
        let mut registry = snapshot.registry()?;

        let removed = registry.remove(id)?;
        let orphaned = registry
            .all()
            .iter()
            .filter(|p| p.parent_id == Some(id))
            .count();

        snapshot.persons = registry.into_persons();
        workspace.save(&mut snapshot)?;

        println!(
            "{}",
            format!("Removed {} ({})", removed.full_name(), short_id(id)).success()
        );
        if orphaned > 0 {
            eprintln!(
                "{}",
                format!("⚠️  {orphaned} recorded descendant(s) still name this person as parent")
                    .warning()
            );
            eprintln!("{}", "Run 'erbfolge validate' for details".dim());
        }
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Config {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Debug, clap::Parser)]
enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key to set
        key: String,

        /// Value to set
        value: String,
    },
}

impl Config {
    #[instrument]
    fn run(self, root: &Path) -> anyhow::Result<()> {
        use terminal::Colorize;

        let config_path = Workspace::config_path(root);
        let mut config = Workspace::open(root)?.config().clone();

        match self.command {
            ConfigCommand::Show => {
                println!("Configuration:");
                println!("  tool_id: {}", config.tool_id());
                println!(
                    "  default_regime: {} ({})",
                    config.default_regime,
                    config.default_regime.label().dim()
                );
                println!("  decimals: {}", config.decimals());
            }
            ConfigCommand::Set { key, value } => {
                match key.as_str() {
                    "tool_id" => {
                        if !config.set_tool_id(&value) {
                            anyhow::bail!("tool_id must not be empty");
                        }
                    }
                    "default_regime" => {
                        config.default_regime =
                            parse_regime(&value).map_err(|e| anyhow::anyhow!(e))?;
                    }
                    "decimals" => {
                        let decimals = value
                            .parse::<usize>()
                            .map_err(|_| anyhow::anyhow!("Value must be a non-negative integer"))?;
                        config.set_decimals(decimals);
                    }
                    _ => {
                        return Err(anyhow::anyhow!(
                            "Unknown configuration key: '{key}'\nSupported keys: tool_id, \
                             default_regime, decimals",
                        ));
                    }
                }

                if let Some(parent) = config_path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                config
                    .save(&config_path)
                    .map_err(|e| anyhow::anyhow!("{e}"))?;
                println!("{}", format!("Set {key} = {value}").success());
            }
        }

        Ok(())
    }
}
