//! # Admission
//!
//! Gatekeeper between a submitted form and a persisted participant.
//!
//! Decisions here are pure: the handler reads the roster size and the
//! configured limit, calls [`admit`], and only then touches the store. The
//! capacity check is read-then-write, so two sign-ups racing at the boundary
//! can both land and leave the roster momentarily over the limit. Accepted
//! trade-off; a WATCH/MULTI conditional write would close it if strict
//! enforcement is ever needed.
//!
//! Admin-created participants go through the same validation and the same
//! capacity gate as public sign-ups.

use chrono::{DateTime, NaiveDate, Utc};

use crate::{
    dates::{compute_age, is_minor},
    error::AppError,
    phone::format_phone,
    roster::{Participant, Status},
};

pub const REQUIRED_FIELDS_MESSAGE: &str = "Por favor, preencha todos os campos obrigatórios.";
pub const POSITIVE_LIMIT_MESSAGE: &str = "O limite deve ser um número inteiro positivo.";

#[derive(Debug, Clone)]
pub struct Candidate {
    pub name: String,
    pub birth_date: NaiveDate,
    pub phone: Option<String>,
}

/// A stamped record ready for the store, plus whether the sign-up screen has
/// to walk the guardian-consent step.
#[derive(Debug, Clone)]
pub struct Admission {
    pub participant: Participant,
    pub requires_consent_flow: bool,
}

/// Patch applied by the admin edit dialog. Absent fields are left untouched;
/// an empty phone string clears the number.
#[derive(Debug, Clone, Default)]
pub struct ParticipantPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub consent_delivered: Option<bool>,
}

fn validated_name(name: &str) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation(REQUIRED_FIELDS_MESSAGE.to_string()));
    }

    Ok(name.to_string())
}

fn normalized_phone(phone: Option<&str>) -> Option<String> {
    phone
        .map(format_phone)
        .filter(|formatted| !formatted.is_empty())
}

/// Validates the candidate, applies the capacity gate and stamps the
/// system-assigned fields. The caller persists the result; exactly one
/// document per successful call.
pub fn admit(
    candidate: Candidate,
    roster_size: usize,
    capacity: u32,
    now: DateTime<Utc>,
) -> Result<Admission, AppError> {
    let name = validated_name(&candidate.name)?;
    let age = compute_age(candidate.birth_date, now.date_naive())?;

    if roster_size >= capacity as usize {
        return Err(AppError::CapacityExceeded);
    }

    let participant = Participant {
        id: String::new(),
        name,
        phone: normalized_phone(candidate.phone.as_deref()),
        birth_date: candidate.birth_date,
        age,
        registered_at: now,
        status: Status::Inscrito,
        consent_delivered: false,
    };

    Ok(Admission {
        requires_consent_flow: is_minor(age),
        participant,
    })
}

/// Applies an admin edit in place. A changed birth date recomputes the stored
/// age against the edit date.
pub fn apply_patch(
    participant: &mut Participant,
    patch: ParticipantPatch,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    if let Some(name) = patch.name {
        participant.name = validated_name(&name)?;
    }

    if let Some(birth_date) = patch.birth_date {
        participant.age = compute_age(birth_date, now.date_naive())?;
        participant.birth_date = birth_date;
    }

    if let Some(phone) = patch.phone {
        participant.phone = normalized_phone(Some(&phone));
    }

    if let Some(consent_delivered) = patch.consent_delivered {
        participant.consent_delivered = consent_delivered;
    }

    Ok(())
}

pub fn validate_capacity(capacity: u32) -> Result<(), AppError> {
    if capacity == 0 {
        return Err(AppError::Validation(POSITIVE_LIMIT_MESSAGE.to_string()));
    }

    Ok(())
}
