use std::path::PathBuf;

use anyhow::Context as _;
use chrono::NaiveDate;
use clap::Parser;
use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};
use erbfolge::{
    Event, MatrimonialRegime, PersonForm, RandomIds, Snapshot, Step,
    domain::today,
    interview::{Context, InterviewError, InterviewSummary},
};
use tracing::{debug, instrument};

use super::{parse_date, terminal::Colorize, workspace::Workspace};

type Session = erbfolge::Interview<RandomIds>;

/// Command arguments for `erbfolge interview`.
#[derive(Debug, Parser)]
#[command(about = "Collect the family through a guided interview")]
pub struct Interview {
    /// Continue with the relatives already recorded.
    #[arg(long)]
    resume: bool,

    /// Reference date deciding who is deceased (default: today).
    #[arg(long, value_parser = parse_date)]
    as_of: Option<NaiveDate>,
}

/// What the person answering chose on a screen.
#[derive(Debug)]
enum Action {
    Event(Event),
    Back,
    Quit,
}

const YES: &str = "Yes";
const NO: &str = "No";
const ENTER: &str = "Enter details";
const FINISH: &str = "Finish and save";
const BACK: &str = "Back";
const QUIT: &str = "Quit";

/// The choices offered on a screen, in display order.
fn options(step: Step, can_go_back: bool) -> Vec<&'static str> {
    let mut options = match step {
        Step::DeceasedIdentity => Vec::new(),
        Step::Completion => vec![FINISH],
        step if step.is_question() => vec![YES, NO],
        _ => vec![ENTER],
    };
    if can_go_back {
        options.push(BACK);
    }
    options.push(QUIT);
    options
}

/// The question shown for a screen, naming the child being expanded.
fn heading(step: Step, context: &Context) -> String {
    match (step, context.child()) {
        (Step::GrandchildrenQuestion | Step::GrandchildDetails, Some(child)) => {
            format!("{} [{}]", step.prompt(), child.full_name())
        }
        _ => step.prompt().to_string(),
    }
}

/// Parses an optional date; blank input means no date.
fn parse_optional_date(input: &str) -> Result<Option<NaiveDate>, String> {
    if input.trim().is_empty() {
        Ok(None)
    } else {
        parse_date(input).map(Some)
    }
}

fn print_summary(summary: &InterviewSummary) {
    println!("\n{}", format!("Deceased: {}", summary.deceased_name).info());
    println!("  Spouses:       {}", summary.spouses);
    println!("  Children:      {}", summary.children);
    println!("  Grandchildren: {}", summary.grandchildren);
    println!("  Parents:       {}\n", summary.parents);
}

struct Prompter {
    theme: ColorfulTheme,
    default_regime: MatrimonialRegime,
}

impl Prompter {
    fn text(&self, prompt: &str, initial: &str) -> anyhow::Result<String> {
        let input = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .with_initial_text(initial)
            .interact_text()?;
        Ok(input)
    }

    fn date(&self, prompt: &str) -> anyhow::Result<Option<NaiveDate>> {
        loop {
            let input = self.text(prompt, "")?;
            match parse_optional_date(&input) {
                Ok(date) => return Ok(date),
                Err(e) => eprintln!("{}", e.warning()),
            }
        }
    }

    fn choose(&self, prompt: &str, items: &[&'static str]) -> anyhow::Result<&'static str> {
        let index = Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact()?;
        Ok(items[index])
    }

    fn form(&self) -> anyhow::Result<PersonForm> {
        Ok(PersonForm {
            given_name: self.text("Given name", "")?,
            family_name: self.text("Family name", "")?,
            birth_date: self.date("Date of birth (YYYY-MM-DD or DD.MM.YYYY)")?,
            death_date: self.date("Date of death (leave empty if alive)")?,
        })
    }

    fn regime(&self) -> anyhow::Result<MatrimonialRegime> {
        let labels: Vec<&str> = MatrimonialRegime::ALL.iter().map(|r| r.label()).collect();
        let default = MatrimonialRegime::ALL
            .iter()
            .position(|r| *r == self.default_regime)
            .unwrap_or(0);
        let index = Select::with_theme(&self.theme)
            .with_prompt("Matrimonial regime")
            .items(&labels[..])
            .default(default)
            .interact()?;
        Ok(MatrimonialRegime::ALL[index])
    }

    fn ask(&self, session: &Session) -> anyhow::Result<Action> {
        let step = session.step();

        if step == Step::DeceasedIdentity {
            let name = self.text(step.prompt(), session.deceased_name())?;
            return Ok(Action::Event(Event::Identify(name)));
        }

        if step == Step::Completion {
            print_summary(&session.summary());
        }

        let choice = self.choose(
            &heading(step, session.context()),
            &options(step, session.can_go_back()),
        )?;

        let action = match choice {
            YES => Action::Event(Event::Answer(true)),
            NO => Action::Event(Event::Answer(false)),
            FINISH => Action::Event(Event::Complete),
            BACK => Action::Back,
            QUIT => Action::Quit,
            _ if step == Step::RegimeAndSpouseDetails => {
                let regime = self.regime()?;
                Action::Event(Event::SubmitSpouse {
                    regime,
                    form: self.form()?,
                })
            }
            _ => Action::Event(Event::Submit(self.form()?)),
        };
        Ok(action)
    }
}

impl Interview {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let workspace = Workspace::open(&root)?;
        let existing = workspace.snapshot()?;
        let today = self.as_of.unwrap_or_else(today);
        let theme = ColorfulTheme::default();

        let (mut session, estate_value) = if self.resume {
            let snapshot = existing.context("no case recorded yet; start without --resume")?;
            let session = Session::resume(
                snapshot.deceased_name,
                snapshot.persons,
                snapshot.regime,
                RandomIds,
                today,
            )?;
            (session, snapshot.estate_value)
        } else {
            if existing.is_some() {
                let replace = Confirm::with_theme(&theme)
                    .with_prompt(format!(
                        "A case is already stored under '{}'. Replace it?",
                        workspace.config().tool_id()
                    ))
                    .default(false)
                    .interact()?;
                if !replace {
                    println!("Cancelled");
                    return Ok(());
                }
            }
            (Session::new(RandomIds, today), None)
        };

        let prompter = Prompter {
            theme,
            default_regime: workspace.config().default_regime,
        };

        while !session.is_finished() {
            match prompter.ask(&session)? {
                Action::Event(event) => match session.apply(event) {
                    Ok(step) => debug!(%step, "advanced"),
                    Err(InterviewError::Validation(e)) => {
                        eprintln!("{}", format!("⚠️  {e}").warning());
                    }
                    Err(e) => return Err(e.into()),
                },
                Action::Back => {
                    session.back();
                }
                Action::Quit => {
                    let keep = Confirm::with_theme(&prompter.theme)
                        .with_prompt("Save the data collected so far?")
                        .default(true)
                        .interact()?;
                    if keep {
                        let mut snapshot = Snapshot::from(session.into_outcome());
                        snapshot.estate_value = estate_value;
                        workspace.save(&mut snapshot)?;
                        println!("{}", "Saved. Continue with 'erbfolge interview --resume'.".dim());
                    } else {
                        println!("Cancelled");
                    }
                    return Ok(());
                }
            }
        }

        let mut snapshot = Snapshot::from(session.complete()?);
        snapshot.estate_value = estate_value;
        workspace.save(&mut snapshot)?;

        println!(
            "{}",
            format!("✅ Recorded {} relative(s)", snapshot.persons.len()).success()
        );
        println!("{}", "Run 'erbfolge compute' to see the statutory shares".dim());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use erbfolge::domain::SequentialIds;

    use super::*;

    #[test]
    fn options_follow_the_step_kind() {
        assert_eq!(options(Step::DeceasedIdentity, false), [QUIT]);
        assert_eq!(options(Step::ChildrenQuestion, true), [YES, NO, BACK, QUIT]);
        assert_eq!(options(Step::ParentDetails, true), [ENTER, BACK, QUIT]);
        assert_eq!(options(Step::Completion, false), [FINISH, QUIT]);
    }

    #[test]
    fn heading_names_the_child_being_expanded() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let mut session = erbfolge::Interview::new(SequentialIds::default(), today);
        session.apply(Event::Identify("Erich Berg".into())).unwrap();
        session.apply(Event::Answer(false)).unwrap();
        session.apply(Event::Answer(true)).unwrap();
        session
            .apply(Event::Submit(
                PersonForm::new("Anna", "Berg", NaiveDate::from_ymd_opt(1970, 1, 1).unwrap())
                    .died(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()),
            ))
            .unwrap();

        assert_eq!(session.step(), Step::GrandchildrenQuestion);
        assert!(heading(session.step(), session.context()).ends_with("[Anna Berg]"));
        assert_eq!(
            heading(Step::ParentsQuestion, session.context()),
            Step::ParentsQuestion.prompt()
        );
    }

    #[test]
    fn blank_date_input_means_no_date() {
        assert_eq!(parse_optional_date("  "), Ok(None));
        assert_eq!(
            parse_optional_date("24.12.1950"),
            Ok(NaiveDate::from_ymd_opt(1950, 12, 24))
        );
        assert!(parse_optional_date("yesterday").is_err());
    }
}
