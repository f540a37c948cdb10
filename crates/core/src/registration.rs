//! Vendor registration wizard.
//!
//! A four-step linear flow, `Business → Menu → Location → Review`, that
//! accumulates a [`RegistrationDraft`]. Only the business step is validated
//! before moving on; the remaining steps accept whatever was entered and
//! leave format checks to the vendor service at submission.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Steps of the wizard, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WizardStep {
    #[default]
    Business,
    Menu,
    Location,
    Review,
}

impl WizardStep {
    /// All steps in order.
    pub const ALL: [Self; 4] = [Self::Business, Self::Menu, Self::Location, Self::Review];

    /// The following step, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Business => Some(Self::Menu),
            Self::Menu => Some(Self::Location),
            Self::Location => Some(Self::Review),
            Self::Review => None,
        }
    }

    /// The preceding step, if any.
    #[must_use]
    pub const fn previous(self) -> Option<Self> {
        match self {
            Self::Business => None,
            Self::Menu => Some(Self::Business),
            Self::Location => Some(Self::Menu),
            Self::Review => Some(Self::Location),
        }
    }

    /// One-based position, for the step indicator.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Business => 1,
            Self::Menu => 2,
            Self::Location => 3,
            Self::Review => 4,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Business => "Business Info",
            Self::Menu => "Menu",
            Self::Location => "Location",
            Self::Review => "Review",
        }
    }

    /// Progress bar fill, in percent.
    #[must_use]
    pub const fn progress(self) -> f32 {
        match self {
            Self::Business => 0.0,
            Self::Menu => 33.3,
            Self::Location => 66.6,
            Self::Review => 100.0,
        }
    }
}

/// Draft fields that can be edited by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DraftField {
    BusinessName,
    Description,
    Address,
    City,
    State,
    ZipCode,
    MenuImage,
    AgreeToTerms,
}

impl DraftField {
    /// Form field name, matching the vendor service's multipart names.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::BusinessName => "businessName",
            Self::Description => "description",
            Self::Address => "address",
            Self::City => "city",
            Self::State => "state",
            Self::ZipCode => "zipCode",
            Self::MenuImage => "menuImage",
            Self::AgreeToTerms => "agreeToTerms",
        }
    }

    /// Look a field up by its form name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        [
            Self::BusinessName,
            Self::Description,
            Self::Address,
            Self::City,
            Self::State,
            Self::ZipCode,
            Self::MenuImage,
            Self::AgreeToTerms,
        ]
        .into_iter()
        .find(|f| f.name() == name)
    }
}

/// An uploaded menu photo.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for MenuImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuImage")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// The in-progress registration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegistrationDraft {
    pub business_name: String,
    pub description: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub menu_image: Option<MenuImage>,
    pub agree_to_terms: bool,
}

impl RegistrationDraft {
    /// Set a text field. Checkbox values accept `"on"`/`"true"`; the menu
    /// image is set through [`RegistrationWizard::set_menu_image`].
    fn set_text(&mut self, field: DraftField, value: &str) {
        match field {
            DraftField::BusinessName => value.clone_into(&mut self.business_name),
            DraftField::Description => value.clone_into(&mut self.description),
            DraftField::Address => value.clone_into(&mut self.address),
            DraftField::City => value.clone_into(&mut self.city),
            DraftField::State => value.clone_into(&mut self.state),
            DraftField::ZipCode => value.clone_into(&mut self.zip_code),
            DraftField::AgreeToTerms => {
                self.agree_to_terms = matches!(value, "on" | "true" | "1");
            }
            DraftField::MenuImage => {}
        }
    }
}

/// Field-level validation messages, keyed by field.
pub type FieldErrors = BTreeMap<DraftField, String>;

/// Errors from wizard operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    /// The current step has invalid fields.
    #[error("please fix the highlighted fields")]
    Invalid(FieldErrors),
    /// Submission was attempted before reaching the review step.
    #[error("the registration can only be submitted from the review step (currently on {0:?})")]
    NotAtReview(WizardStep),
}

/// Result of going back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Back {
    /// Now on this step.
    Step(WizardStep),
    /// Backed out of the first step; leave the wizard.
    Exit,
}

/// Registration wizard state machine.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegistrationWizard {
    step: WizardStep,
    draft: RegistrationDraft,
    errors: FieldErrors,
    submit_error: Option<String>,
}

impl RegistrationWizard {
    /// A fresh wizard on the business step with an empty draft.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn step(&self) -> WizardStep {
        self.step
    }

    #[must_use]
    pub const fn draft(&self) -> &RegistrationDraft {
        &self.draft
    }

    /// Validation messages from the last blocked transition.
    #[must_use]
    pub const fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Message from the last failed submission.
    #[must_use]
    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    #[must_use]
    pub const fn progress(&self) -> f32 {
        self.step.progress()
    }

    /// Update a text field and clear its error.
    pub fn update(&mut self, field: DraftField, value: &str) {
        self.draft.set_text(field, value);
        self.errors.remove(&field);
    }

    /// Attach (or replace) the menu photo.
    pub fn set_menu_image(&mut self, image: MenuImage) {
        self.draft.menu_image = Some(image);
        self.errors.remove(&DraftField::MenuImage);
    }

    /// Advance one step.
    ///
    /// Leaving the business step requires a business name and description.
    /// On the review step this only clears a previous submit error.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::Invalid`] when the business step fails
    /// validation; the wizard stays where it is and [`Self::errors`] holds
    /// the messages.
    pub fn next(&mut self) -> Result<WizardStep, WizardError> {
        if self.step == WizardStep::Business {
            let errors = validate_business(&self.draft);
            if !errors.is_empty() {
                self.errors.clone_from(&errors);
                return Err(WizardError::Invalid(errors));
            }
        }
        self.errors.clear();
        self.submit_error = None;
        if let Some(next) = self.step.next() {
            self.step = next;
        }
        Ok(self.step)
    }

    /// Go back one step, or report [`Back::Exit`] from the first step.
    pub fn previous(&mut self) -> Back {
        match self.step.previous() {
            Some(step) => {
                self.step = step;
                self.errors.clear();
                self.submit_error = None;
                Back::Step(step)
            }
            None => Back::Exit,
        }
    }

    /// The draft to send, available only on the review step.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::NotAtReview`] on any other step.
    pub fn submission(&self) -> Result<&RegistrationDraft, WizardError> {
        if self.step == WizardStep::Review {
            Ok(&self.draft)
        } else {
            Err(WizardError::NotAtReview(self.step))
        }
    }

    /// Keep the draft and stay on review after a failed submission.
    pub fn record_submit_error(&mut self, message: impl Into<String>) {
        self.submit_error = Some(message.into());
    }

    /// Discard everything after a successful submission.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

fn validate_business(draft: &RegistrationDraft) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if draft.business_name.trim().is_empty() {
        errors.insert(DraftField::BusinessName, "Business name is required".to_owned());
    }
    if draft.description.trim().is_empty() {
        errors.insert(DraftField::Description, "Description is required".to_owned());
    }
    errors
}
