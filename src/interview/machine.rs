//! The pure transition function of the interview.
//!
//! [`transition`] never touches the registry. It reads the persons recorded so
//! far and describes the record to append as an [`Effect`]; the session
//! applies it.

use chrono::NaiveDate;
use tracing::trace;

use super::{
    InterviewError,
    context::Context,
    form::{self, AcceptedForm, PersonForm},
    step::Step,
};
use crate::domain::{IdAllocator, MatrimonialRegime, Person, Relationship};

/// Input from the person answering the interview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The deceased's name was entered.
    Identify(String),
    /// A yes/no question was answered.
    Answer(bool),
    /// The spouse screen was submitted.
    SubmitSpouse {
        /// The chosen matrimonial regime.
        regime: MatrimonialRegime,
        /// The spouse's details.
        form: PersonForm,
    },
    /// A child, grandchild, or parent screen was submitted.
    Submit(PersonForm),
    /// The collected data was confirmed.
    Complete,
}

impl Event {
    /// A short name for diagnostics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Identify(_) => "identify",
            Self::Answer(true) => "answer-yes",
            Self::Answer(false) => "answer-no",
            Self::SubmitSpouse { .. } => "submit-spouse",
            Self::Submit(_) => "submit",
            Self::Complete => "complete",
        }
    }
}

/// A change the session must apply alongside a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Record the deceased's name.
    Deceased(String),
    /// Append a relative.
    Record(Person),
    /// Append the spouse and remember the regime.
    RecordSpouse {
        /// The spouse.
        spouse: Person,
        /// The chosen matrimonial regime.
        regime: MatrimonialRegime,
    },
    /// Hand the collected data to the caller.
    Complete,
}

/// The outcome of a successful transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// The step to show next.
    pub step: Step,
    /// The context for that step.
    pub context: Context,
    /// The change to apply, if any.
    pub effect: Option<Effect>,
}

/// What a transition may consult besides its own context.
pub struct Env<'a> {
    /// The persons recorded so far, in order.
    pub persons: &'a [Person],
    /// The date deciding whether someone is deceased.
    pub today: NaiveDate,
    /// Source of new person and lineage identifiers.
    pub ids: &'a mut dyn IdAllocator,
}

impl std::fmt::Debug for Env<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Env")
            .field("persons", &self.persons.len())
            .field("today", &self.today)
            .finish_non_exhaustive()
    }
}

fn to(step: Step, context: Context) -> Transition {
    Transition {
        step,
        context,
        effect: None,
    }
}

fn record(step: Step, context: Context, person: Person) -> Transition {
    Transition {
        step,
        context,
        effect: Some(Effect::Record(person)),
    }
}

fn person_from(accepted: AcceptedForm, relationship: Relationship, env: &mut Env<'_>) -> Person {
    let mut person = Person::new(
        env.ids.person_id(),
        relationship,
        accepted.given_name.as_str(),
        accepted.family_name.as_str(),
    )
    .with_birth_date(accepted.birth_date);
    if let Some(death) = accepted.death_date {
        person = person.with_death_date(death);
    }
    person
}

/// Whether any child or grandchild recorded so far is alive.
fn has_living_descendant(persons: &[Person], today: NaiveDate) -> bool {
    persons
        .iter()
        .any(|p| p.relationship.is_descendant() && p.is_alive(today))
}

/// Computes the next step for `event` at `step`.
///
/// Forms are validated before any identifier is allocated, so a rejected
/// event leaves the allocator untouched.
///
/// # Errors
///
/// Returns [`InterviewError::Validation`] when a form is incomplete and
/// [`InterviewError::UnexpectedEvent`] when `event` does not apply to `step`.
pub fn transition(
    step: Step,
    context: &Context,
    event: Event,
    env: &mut Env<'_>,
) -> Result<Transition, InterviewError> {
    trace!(%step, event = event.name(), "interview transition");
    let mut next = context.clone();

    let transition = match (step, event) {
        (Step::DeceasedIdentity, Event::Identify(name)) => {
            let name = form::deceased_name(&name)?;
            Transition {
                step: Step::SpouseQuestion,
                context: next,
                effect: Some(Effect::Deceased(name.as_str().to_string())),
            }
        }

        (Step::SpouseQuestion, Event::Answer(true)) => to(Step::RegimeAndSpouseDetails, next),
        (Step::SpouseQuestion, Event::Answer(false)) => to(Step::ChildrenQuestion, next),

        (Step::RegimeAndSpouseDetails, Event::SubmitSpouse { regime, form }) => {
            let accepted = form.accept()?;
            let spouse = person_from(accepted, Relationship::Spouse, env);
            Transition {
                step: Step::ChildrenQuestion,
                context: next,
                effect: Some(Effect::RecordSpouse { spouse, regime }),
            }
        }

        (Step::ChildrenQuestion, Event::Answer(true)) => {
            next.lineage = Some(env.ids.lineage_id());
            next.child = None;
            next.generation = 1;
            to(Step::ChildDetails, next)
        }
        (Step::ChildrenQuestion, Event::Answer(false)) => {
            if next.open_stirps(env.today).is_some() {
                to(Step::GrandchildrenQuestion, next)
            } else if has_living_descendant(env.persons, env.today) {
                to(Step::Completion, next)
            } else {
                to(Step::ParentsQuestion, next)
            }
        }

        (Step::ChildDetails, Event::Submit(form)) => {
            let accepted = form.accept()?;
            let lineage = match next.lineage {
                Some(lineage) => lineage,
                None => env.ids.lineage_id(),
            };
            let child = person_from(accepted, Relationship::Child, env)
                .with_generation(1)
                .with_lineage(lineage);

            next.child = Some(child.clone());
            if child.is_deceased(env.today) {
                next.lineage = Some(lineage);
                record(Step::GrandchildrenQuestion, next, child)
            } else {
                next.finish_lineage(lineage);
                next.lineage = None;
                record(Step::ChildrenQuestion, next, child)
            }
        }

        (Step::GrandchildrenQuestion, Event::Answer(true)) => {
            next.generation = next.child.as_ref().map_or(1, |child| child.generation) + 1;
            to(Step::GrandchildDetails, next)
        }
        (Step::GrandchildrenQuestion, Event::Answer(false)) => {
            if let Some(lineage) = next.lineage.or_else(|| next.child.as_ref()?.lineage_id) {
                next.finish_lineage(lineage);
            }
            next.lineage = None;
            next.child = None;
            next.generation = 1;
            to(Step::ChildrenQuestion, next)
        }

        (Step::GrandchildDetails, Event::Submit(form)) => {
            let accepted = form.accept()?;
            let mut grandchild = person_from(accepted, Relationship::Grandchild, env)
                .with_generation(next.generation);
            if let Some(child) = &next.child {
                grandchild = grandchild.with_parent(child.id());
            }
            if let Some(lineage) = next.lineage.or_else(|| next.child.as_ref()?.lineage_id) {
                grandchild = grandchild.with_lineage(lineage);
            }
            record(Step::GrandchildrenQuestion, next, grandchild)
        }

        (Step::ParentsQuestion, Event::Answer(true)) => to(Step::ParentDetails, next),
        (Step::ParentsQuestion, Event::Answer(false)) => to(Step::Completion, next),

        (Step::ParentDetails, Event::Submit(form)) => {
            let accepted = form.accept()?;
            let parent = person_from(accepted, Relationship::Parent, env).with_generation(1);
            next.parent = Some(parent.clone());
            record(Step::ParentsQuestion, next, parent)
        }

        (Step::Completion, Event::Complete) => Transition {
            step: Step::Completion,
            context: next,
            effect: Some(Effect::Complete),
        },

        (step, event) => {
            return Err(InterviewError::UnexpectedEvent {
                step,
                event: event.name(),
            });
        }
    };

    Ok(transition)
}
