//! Vendor registration wizard.
//!
//! The [`RegistrationWizard`] lives in the session between requests. Each
//! step posts its fields to `/next`; the review step posts to `/submit`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Multipart, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use street_bite_core::{Back, DraftField, MenuImage, RegistrationWizard, WizardError, WizardStep};

use crate::api::ApiError;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::session_keys;
use crate::routes::{NavView, with_message};
use crate::services::auth::AuthGate;
use crate::state::AppState;

/// Progress indicator entry.
pub struct StepView {
    pub number: u8,
    pub label: &'static str,
    pub active: bool,
    pub done: bool,
}

/// Wizard page template.
#[derive(Template, WebTemplate)]
#[template(path = "register/wizard.html")]
pub struct WizardTemplate {
    pub nav: NavView,
    /// `business`, `menu`, `location` or `review`.
    pub step: &'static str,
    pub step_number: u8,
    pub step_label: &'static str,
    pub progress: String,
    pub steps: Vec<StepView>,
    pub business_name: String,
    pub description: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub menu_image_name: Option<String>,
    pub agree_to_terms: bool,
    pub business_name_error: Option<String>,
    pub description_error: Option<String>,
    pub submit_error: Option<String>,
}

impl WizardTemplate {
    fn new(nav: NavView, wizard: &RegistrationWizard) -> Self {
        let current = wizard.step();
        let draft = wizard.draft();
        let error = |field: DraftField| wizard.errors().get(&field).cloned();

        Self {
            nav,
            step: step_key(current),
            step_number: current.number(),
            step_label: current.label(),
            progress: format!("{:.1}", wizard.progress()),
            steps: WizardStep::ALL
                .into_iter()
                .map(|s| StepView {
                    number: s.number(),
                    label: s.label(),
                    active: s == current,
                    done: s.number() < current.number(),
                })
                .collect(),
            business_name: draft.business_name.clone(),
            description: draft.description.clone(),
            address: draft.address.clone(),
            city: draft.city.clone(),
            state: draft.state.clone(),
            zip_code: draft.zip_code.clone(),
            menu_image_name: draft.menu_image.as_ref().map(|i| i.file_name.clone()),
            agree_to_terms: draft.agree_to_terms,
            business_name_error: error(DraftField::BusinessName),
            description_error: error(DraftField::Description),
            submit_error: wizard.submit_error().map(str::to_string),
        }
    }
}

const fn step_key(step: WizardStep) -> &'static str {
    match step {
        WizardStep::Business => "business",
        WizardStep::Menu => "menu",
        WizardStep::Location => "location",
        WizardStep::Review => "review",
    }
}

async fn load_wizard(session: &Session) -> Result<RegistrationWizard> {
    Ok(session
        .get::<RegistrationWizard>(session_keys::REGISTRATION_WIZARD)
        .await?
        .unwrap_or_default())
}

async fn save_wizard(session: &Session, wizard: &RegistrationWizard) -> Result<()> {
    session
        .insert(session_keys::REGISTRATION_WIZARD, wizard)
        .await
        .map_err(AppError::from)
}

/// Display the current step.
pub async fn show(RequireAuth(user): RequireAuth, session: Session) -> Result<impl IntoResponse> {
    let wizard = load_wizard(&session).await?;
    Ok(WizardTemplate::new(NavView::new(Some(&user)), &wizard))
}

/// Apply the posted fields and advance.
///
/// A failed validation keeps the wizard on its step with field errors.
#[instrument(skip_all)]
pub async fn next(
    RequireAuth(_user): RequireAuth,
    session: Session,
    multipart: Multipart,
) -> Result<Redirect> {
    let mut wizard = load_wizard(&session).await?;
    apply_fields(&mut wizard, multipart).await?;

    match wizard.next() {
        Ok(step) => tracing::debug!(step = step.label(), "Wizard advanced"),
        Err(WizardError::Invalid(errors)) => {
            tracing::debug!(fields = errors.len(), "Wizard step has errors");
        }
        Err(e) => return Err(e.into()),
    }

    save_wizard(&session, &wizard).await?;
    Ok(Redirect::to("/vendor-register"))
}

/// Go back one step; from the first step, leave the wizard.
pub async fn previous(RequireAuth(_user): RequireAuth, session: Session) -> Result<Redirect> {
    let mut wizard = load_wizard(&session).await?;

    match wizard.previous() {
        Back::Step(_) => {
            save_wizard(&session, &wizard).await?;
            Ok(Redirect::to("/vendor-register"))
        }
        Back::Exit => {
            session
                .remove::<RegistrationWizard>(session_keys::REGISTRATION_WIZARD)
                .await?;
            Ok(Redirect::to("/"))
        }
    }
}

/// Review step form.
#[derive(Debug, Default, Deserialize)]
pub struct SubmitForm {
    #[serde(rename = "agreeToTerms")]
    pub agree_to_terms: Option<String>,
}

/// Send the draft to the vendor service.
///
/// Success discards the draft and opens the dashboard. A rejected token
/// signs the user out. Any other failure stays on review with the message.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn submit(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Form(form): Form<SubmitForm>,
) -> Result<Response> {
    let mut wizard = load_wizard(&session).await?;
    wizard.update(
        DraftField::AgreeToTerms,
        form.agree_to_terms.as_deref().unwrap_or_default(),
    );

    let draft = match wizard.submission() {
        Ok(draft) => draft.clone(),
        Err(e) => {
            tracing::debug!(error = %e, "Submit outside review step");
            save_wizard(&session, &wizard).await?;
            return Ok(Redirect::to("/vendor-register").into_response());
        }
    };

    let mut gate = AuthGate::load(session.clone(), state.api().clone()).await?;
    let Some(token) = gate.token().cloned() else {
        return Ok(Redirect::to("/auth/login").into_response());
    };

    match state.api().create_vendor(&token, &draft).await {
        Ok(created) => {
            tracing::info!(business_name = %created.business_name, "Vendor registered");
            add_breadcrumb("registration", "Registered vendor", None);
            wizard.reset();
            session
                .remove::<RegistrationWizard>(session_keys::REGISTRATION_WIZARD)
                .await?;
            Ok(Redirect::to(&format!("/dashboard/{}", user.id)).into_response())
        }
        Err(ApiError::Unauthorized(_)) => {
            gate.token_rejected().await?;
            Ok(Redirect::to(&with_message(
                "/auth/login",
                "error",
                "Your session has expired. Please sign in again.",
            ))
            .into_response())
        }
        Err(e) => {
            tracing::warn!(error = %e, "Vendor registration failed");
            wizard.record_submit_error(e.user_message());
            save_wizard(&session, &wizard).await?;
            Ok(Redirect::to("/vendor-register").into_response())
        }
    }
}

/// Copy multipart fields into the wizard. An empty file input is skipped.
async fn apply_fields(wizard: &mut RegistrationWizard, mut multipart: Multipart) -> Result<()> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        let Some(name) = field.name().and_then(DraftField::from_name) else {
            continue;
        };

        if name == DraftField::MenuImage {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            if file_name.is_empty() || bytes.is_empty() {
                continue;
            }
            wizard.set_menu_image(MenuImage {
                file_name,
                content_type,
                bytes: bytes.to_vec(),
            });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            wizard.update(name, &value);
        }
    }
    Ok(())
}
