//! The guided family interview.
//!
//! An [`Interview`] walks the person answering through a fixed sequence of
//! screens ([`Step`]) and records relatives as it goes. Each screen is left
//! through an [`Event`]; the next screen is decided by the pure
//! [`transition`] function. Every accepted event is remembered, so
//! [`Interview::back`] can return to the previous screen.

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::domain::{
    IdAllocator, MatrimonialRegime, Person, RandomIds, Registry, RegistryError, Relationship,
};

mod context;
pub use context::Context;

mod form;
pub use form::{PersonForm, ValidationError};

mod machine;
pub use machine::{Effect, Env, Event, Transition, transition};

mod step;
pub use step::Step;

/// Errors raised while driving an interview.
#[derive(Debug, Error)]
pub enum InterviewError {
    /// A required field was left empty; the screen is shown again.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The event does not apply to the current screen.
    #[error("'{event}' is not a valid answer at step {step}")]
    UnexpectedEvent {
        /// The current screen.
        step: Step,
        /// The rejected event.
        event: &'static str,
    },

    /// The record could not be added.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The interview was already completed.
    #[error("the interview has already been completed")]
    Finished,

    /// The interview has not been completed yet.
    #[error("the interview is not complete (current step: {0})")]
    NotFinished(Step),
}

/// The data handed to the caller once the interview completes.
#[derive(Debug, Clone, PartialEq)]
pub struct InterviewOutcome {
    /// Name of the deceased.
    pub deceased_name: String,
    /// The matrimonial regime chosen on the spouse screen.
    pub regime: MatrimonialRegime,
    /// Recorded relatives, in order.
    pub persons: Vec<Person>,
}

/// Counts shown on the completion screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterviewSummary {
    /// Name of the deceased.
    pub deceased_name: String,
    /// Number of spouses recorded.
    pub spouses: usize,
    /// Number of children recorded.
    pub children: usize,
    /// Number of grandchildren recorded.
    pub grandchildren: usize,
    /// Number of parents recorded.
    pub parents: usize,
}

/// An interview session.
#[derive(Debug)]
pub struct Interview<A: IdAllocator = RandomIds> {
    deceased_name: String,
    regime: MatrimonialRegime,
    registry: Registry,
    step: Step,
    context: Context,
    history: Vec<(Step, Context)>,
    ids: A,
    today: NaiveDate,
    finished: bool,
}

impl<A: IdAllocator> Interview<A> {
    /// Starts a fresh interview.
    #[must_use]
    pub fn new(ids: A, today: NaiveDate) -> Self {
        Self {
            deceased_name: String::new(),
            regime: MatrimonialRegime::default(),
            registry: Registry::new(),
            step: Step::default(),
            context: Context::default(),
            history: Vec::new(),
            ids,
            today,
            finished: false,
        }
    }

    /// Starts an interview seeded with previously collected data.
    ///
    /// Records already present are kept and new ones are appended. The
    /// session skips the screens the seed already answers:
    ///
    /// - without a name of the deceased it starts at the first screen;
    /// - with a recorded parent it asks for further parents;
    /// - with a recorded spouse or descendant it asks for further children;
    /// - otherwise it asks about the spouse.
    ///
    /// The stirps of every recorded child count as finished.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] if two seed records share an id.
    pub fn resume(
        deceased_name: impl Into<String>,
        persons: Vec<Person>,
        regime: MatrimonialRegime,
        ids: A,
        today: NaiveDate,
    ) -> Result<Self, RegistryError> {
        let mut interview = Self::new(ids, today);
        interview.deceased_name = deceased_name.into();
        interview.regime = regime;
        interview.registry = Registry::from_persons(persons)?;

        for lineage in interview
            .registry
            .by_relationship(Relationship::Child)
            .filter_map(|child| child.lineage_id)
        {
            interview.context.finish_lineage(lineage);
        }
        interview.step = interview.resume_step();
        debug!(step = %interview.step, records = interview.registry.len(), "resumed");
        Ok(interview)
    }

    fn resume_step(&self) -> Step {
        let recorded = |kind| self.registry.by_relationship(kind).next().is_some();
        if self.deceased_name.trim().is_empty() {
            Step::DeceasedIdentity
        } else if recorded(Relationship::Parent) {
            Step::ParentsQuestion
        } else if recorded(Relationship::Spouse)
            || recorded(Relationship::Child)
            || recorded(Relationship::Grandchild)
        {
            Step::ChildrenQuestion
        } else {
            Step::SpouseQuestion
        }
    }

    /// The current screen.
    #[must_use]
    pub const fn step(&self) -> Step {
        self.step
    }

    /// The scratch state of the current screen.
    #[must_use]
    pub const fn context(&self) -> &Context {
        &self.context
    }

    /// The relatives recorded so far.
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The name of the deceased, empty until entered.
    #[must_use]
    pub fn deceased_name(&self) -> &str {
        &self.deceased_name
    }

    /// The matrimonial regime chosen so far.
    #[must_use]
    pub const fn regime(&self) -> MatrimonialRegime {
        self.regime
    }

    /// The reference date for life status.
    #[must_use]
    pub const fn today(&self) -> NaiveDate {
        self.today
    }

    /// Whether the interview has been completed.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Whether [`Interview::back`] would restore an earlier screen.
    #[must_use]
    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty()
    }

    /// Applies an event and moves to the next screen.
    ///
    /// A rejected event leaves the session exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns [`InterviewError::Finished`] after completion, and otherwise
    /// whatever [`transition`] or the registry reports.
    #[instrument(level = "debug", skip(self, event), fields(step = %self.step))]
    pub fn apply(&mut self, event: Event) -> Result<Step, InterviewError> {
        if self.finished {
            return Err(InterviewError::Finished);
        }

        let mut env = Env {
            persons: self.registry.all(),
            today: self.today,
            ids: &mut self.ids,
        };
        let Transition {
            step,
            context,
            effect,
        } = transition(self.step, &self.context, event, &mut env)?;

        match effect {
            Some(Effect::Complete) => {
                debug!("interview completed");
                self.finished = true;
                self.step = step;
                self.context = context;
                return Ok(step);
            }
            Some(Effect::Deceased(name)) => self.deceased_name = name,
            Some(Effect::Record(person)) => {
                debug!(relationship = %person.relationship, id = %person.id(), "recorded");
                self.registry.add(person)?;
            }
            Some(Effect::RecordSpouse { spouse, regime }) => {
                debug!(id = %spouse.id(), %regime, "recorded spouse");
                self.registry.add(spouse)?;
                self.regime = regime;
            }
            None => {}
        }

        let previous_context = std::mem::replace(&mut self.context, context);
        self.history.push((self.step, previous_context));
        self.step = step;
        Ok(step)
    }

    /// Returns to the previous screen.
    ///
    /// Persons recorded on the way are kept. With no earlier screen the
    /// interview restarts at the first one with a fresh context.
    pub fn back(&mut self) -> Step {
        if let Some((step, context)) = self.history.pop() {
            self.step = step;
            self.context = context;
        } else {
            self.step = Step::default();
            self.context = Context::default();
        }
        self.finished = false;
        self.step
    }

    /// Counts of recorded relatives by kind.
    #[must_use]
    pub fn summary(&self) -> InterviewSummary {
        let count = |kind| self.registry.by_relationship(kind).count();
        InterviewSummary {
            deceased_name: self.deceased_name.clone(),
            spouses: count(Relationship::Spouse),
            children: count(Relationship::Child),
            grandchildren: count(Relationship::Grandchild),
            parents: count(Relationship::Parent),
        }
    }

    /// The collected data, whether or not the interview is complete.
    #[must_use]
    pub fn into_outcome(self) -> InterviewOutcome {
        InterviewOutcome {
            deceased_name: self.deceased_name,
            regime: self.regime,
            persons: self.registry.into_persons(),
        }
    }

    /// The collected data of a completed interview.
    ///
    /// # Errors
    ///
    /// Returns [`InterviewError::NotFinished`] if [`Event::Complete`] has not
    /// been applied.
    pub fn complete(self) -> Result<InterviewOutcome, InterviewError> {
        if self.finished {
            Ok(self.into_outcome())
        } else {
            Err(InterviewError::NotFinished(self.step))
        }
    }
}
