use chrono::NaiveDate;
use non_empty_string::NonEmptyString;
use thiserror::Error;

/// Personal details entered on a details screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonForm {
    /// Given name.
    pub given_name: String,
    /// Family name.
    pub family_name: String,
    /// Date of birth.
    pub birth_date: Option<NaiveDate>,
    /// Date of death, left empty for living persons.
    pub death_date: Option<NaiveDate>,
}

/// A required field was left empty.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// The deceased's name is blank.
    #[error("the name of the deceased is required")]
    MissingDeceasedName,
    /// The given name is blank.
    #[error("a given name is required")]
    MissingGivenName,
    /// The family name is blank.
    #[error("a family name is required")]
    MissingFamilyName,
    /// No birth date was entered.
    #[error("a date of birth is required")]
    MissingBirthDate,
}

/// A form that passed validation, with names trimmed.
#[derive(Debug, Clone)]
pub(super) struct AcceptedForm {
    pub(super) given_name: NonEmptyString,
    pub(super) family_name: NonEmptyString,
    pub(super) birth_date: NaiveDate,
    pub(super) death_date: Option<NaiveDate>,
}

impl PersonForm {
    /// Creates a form for a living person.
    #[must_use]
    pub fn new(
        given_name: impl Into<String>,
        family_name: impl Into<String>,
        birth_date: NaiveDate,
    ) -> Self {
        Self {
            given_name: given_name.into(),
            family_name: family_name.into(),
            birth_date: Some(birth_date),
            death_date: None,
        }
    }

    /// Sets the date of death.
    #[must_use]
    pub fn died(mut self, date: NaiveDate) -> Self {
        self.death_date = Some(date);
        self
    }

    /// Checks that every required field is filled in.
    ///
    /// # Errors
    ///
    /// Returns the first missing field, in form order.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.accept().map(|_| ())
    }

    pub(super) fn accept(&self) -> Result<AcceptedForm, ValidationError> {
        let given_name = NonEmptyString::new(self.given_name.trim().to_string())
            .map_err(|_| ValidationError::MissingGivenName)?;
        let family_name = NonEmptyString::new(self.family_name.trim().to_string())
            .map_err(|_| ValidationError::MissingFamilyName)?;
        let birth_date = self.birth_date.ok_or(ValidationError::MissingBirthDate)?;

        Ok(AcceptedForm {
            given_name,
            family_name,
            birth_date,
            death_date: self.death_date,
        })
    }
}

/// Trims the deceased's name, rejecting blank input.
pub(super) fn deceased_name(name: &str) -> Result<NonEmptyString, ValidationError> {
    NonEmptyString::new(name.trim().to_string()).map_err(|_| ValidationError::MissingDeceasedName)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn birth() -> NaiveDate {
        NaiveDate::from_ymd_opt(1970, 5, 1).unwrap()
    }

    #[test]
    fn complete_form_is_accepted_and_trimmed() {
        let form = PersonForm::new("  Anna ", "Berg", birth());
        let accepted = form.accept().unwrap();
        assert_eq!(accepted.given_name.as_str(), "Anna");
        assert_eq!(accepted.birth_date, birth());
    }

    #[test]
    fn reports_first_missing_field() {
        let mut form = PersonForm::new(" ", "", birth());
        assert_eq!(form.validate(), Err(ValidationError::MissingGivenName));

        form.given_name = "Anna".into();
        assert_eq!(form.validate(), Err(ValidationError::MissingFamilyName));

        form.family_name = "Berg".into();
        form.birth_date = None;
        assert_eq!(form.validate(), Err(ValidationError::MissingBirthDate));
    }

    #[test]
    fn blank_deceased_name_is_rejected() {
        assert_eq!(
            deceased_name("   ").unwrap_err(),
            ValidationError::MissingDeceasedName
        );
        assert_eq!(deceased_name(" Erich Berg ").unwrap().as_str(), "Erich Berg");
    }
}
