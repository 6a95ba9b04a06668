use crate::domain::{LineageId, Person};

/// Scratch state carried between interview steps.
///
/// Transitions return a fresh context rather than mutating one in place, so
/// a snapshot can be pushed onto the history stack as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    pub(super) generation: u32,
    pub(super) lineage: Option<LineageId>,
    pub(super) child: Option<Person>,
    pub(super) parent: Option<Person>,
    pub(super) finished_lineages: Vec<LineageId>,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            generation: 1,
            lineage: None,
            child: None,
            parent: None,
            finished_lineages: Vec::new(),
        }
    }
}

impl Context {
    /// Generation depth assigned to the next descendant.
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }

    /// The stirps currently being recorded.
    #[must_use]
    pub const fn lineage(&self) -> Option<LineageId> {
        self.lineage
    }

    /// The child whose descendants are being expanded.
    #[must_use]
    pub const fn child(&self) -> Option<&Person> {
        self.child.as_ref()
    }

    /// The parent recorded most recently.
    #[must_use]
    pub const fn parent(&self) -> Option<&Person> {
        self.parent.as_ref()
    }

    /// Stirpes that need no further questions.
    #[must_use]
    pub fn finished_lineages(&self) -> &[LineageId] {
        &self.finished_lineages
    }

    pub(super) fn is_finished(&self, lineage: LineageId) -> bool {
        self.finished_lineages.contains(&lineage)
    }

    /// The stirps of a deceased child that still awaits its grandchildren.
    pub(super) fn open_stirps(&self, today: chrono::NaiveDate) -> Option<LineageId> {
        let child = self.child.as_ref()?;
        let lineage = child.lineage_id?;
        (child.is_deceased(today) && !self.is_finished(lineage)).then_some(lineage)
    }

    pub(super) fn finish_lineage(&mut self, lineage: LineageId) {
        if !self.is_finished(lineage) {
            self.finished_lineages.push(lineage);
        }
    }
}
