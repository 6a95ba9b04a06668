use std::fmt;

/// A screen of the interview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Step {
    /// Who died.
    #[default]
    DeceasedIdentity,
    /// Was the deceased married?
    SpouseQuestion,
    /// Matrimonial regime and the spouse's personal details.
    RegimeAndSpouseDetails,
    /// Are there (further) children?
    ChildrenQuestion,
    /// A child's personal details.
    ChildDetails,
    /// Did the current deceased child leave (further) children?
    GrandchildrenQuestion,
    /// A grandchild's personal details.
    GrandchildDetails,
    /// Are there (further) living parents?
    ParentsQuestion,
    /// A parent's personal details.
    ParentDetails,
    /// All data collected; waiting for confirmation.
    Completion,
}

impl Step {
    /// Whether this step asks a yes/no question.
    #[must_use]
    pub const fn is_question(self) -> bool {
        matches!(
            self,
            Self::SpouseQuestion
                | Self::ChildrenQuestion
                | Self::GrandchildrenQuestion
                | Self::ParentsQuestion
        )
    }

    /// Whether this step collects a person's details.
    #[must_use]
    pub const fn is_details(self) -> bool {
        matches!(
            self,
            Self::RegimeAndSpouseDetails
                | Self::ChildDetails
                | Self::GrandchildDetails
                | Self::ParentDetails
        )
    }

    /// The question or instruction shown for this step.
    #[must_use]
    pub const fn prompt(self) -> &'static str {
        match self {
            Self::DeceasedIdentity => "Full name of the deceased",
            Self::SpouseQuestion => "Was the deceased married at the time of death?",
            Self::RegimeAndSpouseDetails => "Matrimonial regime and details of the spouse",
            Self::ChildrenQuestion => "Did the deceased have (further) children?",
            Self::ChildDetails => "Details of the child",
            Self::GrandchildrenQuestion => "Did this deceased child leave (further) children?",
            Self::GrandchildDetails => "Details of the grandchild",
            Self::ParentsQuestion => "Is there a (further) parent of the deceased to record?",
            Self::ParentDetails => "Details of the parent",
            Self::Completion => "All required data has been collected",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::DeceasedIdentity => "deceased-identity",
            Self::SpouseQuestion => "spouse-question",
            Self::RegimeAndSpouseDetails => "regime-and-spouse-details",
            Self::ChildrenQuestion => "children-question",
            Self::ChildDetails => "child-details",
            Self::GrandchildrenQuestion => "grandchildren-question",
            Self::GrandchildDetails => "grandchild-details",
            Self::ParentsQuestion => "parents-question",
            Self::ParentDetails => "parent-details",
            Self::Completion => "completion",
        };
        f.write_str(name)
    }
}
