//! # Frontend Payloads
//!
//! Request/response shapes between the site and the backend. Everything is
//! JSON; field names follow the Portuguese schema the frontend already uses.
//!
//! ## Public sign-up
//!
//! To backend
//! - `nome`: full name (required)
//! - `dataNascimento`: ISO date (required)
//! - `telefone`: raw phone digits, optional — normalized server-side
//!
//! From backend
//! - the created participant
//! - `precisaAutorizacao`: whether the guardian-consent dialog must be shown
//!
//! ## Admin session
//!
//! - login is `email` + `senha`; the reply carries the bearer token
//! - every admin request sends `Authorization: Bearer <token>`
//!
//! ## Roster listing
//!
//! Query-string parameters, all optional:
//! - `nome`: name search, active from 3 characters
//! - `data`: registration date, `dd/mm/yyyy`
//! - `menores` / `maiores`: age checkboxes — both checked restricts nothing
//! - `entregues` / `pendentes`: consent checkboxes, same convention
//! - `telefone`: last 4 phone digits, active only at exactly 4
//! - `pagina` (1-based, default 1), `porPagina` (default 10)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    roster::{AgeFilter, ConsentFilter, Criteria, Participant},
};

pub const DATE_PARAM_FORMAT: &str = "%d/%m/%Y";

#[derive(Debug, Deserialize)]
pub struct RegistrationForm {
    #[serde(rename = "nome")]
    pub name: String,

    #[serde(rename = "dataNascimento")]
    pub birth_date: NaiveDate,

    #[serde(rename = "telefone", default)]
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegistrationReply {
    #[serde(rename = "participante")]
    pub participant: Participant,

    #[serde(rename = "precisaAutorizacao")]
    pub requires_consent_flow: bool,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,

    #[serde(rename = "senha")]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionReply {
    pub token: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct ParticipantPatchForm {
    #[serde(rename = "nome")]
    pub name: Option<String>,

    #[serde(rename = "telefone")]
    pub phone: Option<String>,

    #[serde(rename = "dataNascimento")]
    pub birth_date: Option<NaiveDate>,

    #[serde(rename = "autorizacaoEntregue")]
    pub consent_delivered: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CapacityForm {
    #[serde(rename = "limiteParticipantes")]
    pub capacity: u32,
}

#[derive(Debug, Serialize)]
pub struct CapacityReply {
    #[serde(rename = "limiteParticipantes")]
    pub capacity: u32,

    #[serde(rename = "totalParticipantes")]
    pub roster_size: usize,
}

fn default_page() -> usize {
    1
}

fn default_page_size() -> usize {
    10
}

#[derive(Debug, Deserialize)]
pub struct RosterParams {
    #[serde(rename = "nome", default)]
    pub name: Option<String>,

    #[serde(rename = "data", default)]
    pub date: Option<String>,

    #[serde(rename = "menores", default)]
    pub minors: bool,

    #[serde(rename = "maiores", default)]
    pub adults: bool,

    #[serde(rename = "entregues", default)]
    pub delivered: bool,

    #[serde(rename = "pendentes", default)]
    pub pending: bool,

    #[serde(rename = "telefone", default)]
    pub phone_suffix: Option<String>,

    #[serde(rename = "pagina", default = "default_page")]
    pub page: usize,

    #[serde(rename = "porPagina", default = "default_page_size")]
    pub page_size: usize,
}

impl RosterParams {
    pub fn criteria(&self) -> Result<Criteria, AppError> {
        let registered_on = self
            .date
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .map(|d| {
                NaiveDate::parse_from_str(d.trim(), DATE_PARAM_FORMAT)
                    .map_err(|_| AppError::Validation("Data de inscrição inválida.".to_string()))
            })
            .transpose()?;

        Ok(Criteria {
            name_contains: self.name.clone(),
            registered_on,
            age: AgeFilter::from_flags(self.minors, self.adults),
            consent: ConsentFilter::from_flags(self.delivered, self.pending),
            phone_suffix: self.phone_suffix.clone(),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct RosterPage {
    #[serde(rename = "participantes")]
    pub rows: Vec<Participant>,

    #[serde(rename = "totalPaginas")]
    pub total_pages: usize,
}

#[derive(Debug, Serialize)]
pub struct DateCount {
    #[serde(rename = "data")]
    pub date: String,

    #[serde(rename = "total")]
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct PhoneSuffixCount {
    #[serde(rename = "finalTelefone")]
    pub suffix: String,

    #[serde(rename = "total")]
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> RosterParams {
        RosterParams {
            name: None,
            date: None,
            minors: false,
            adults: false,
            delivered: false,
            pending: false,
            phone_suffix: None,
            page: 1,
            page_size: 10,
        }
    }

    #[test]
    fn test_checkbox_pairs_collapse_to_all() {
        let mut both = params();
        both.minors = true;
        both.adults = true;

        let criteria = both.criteria().unwrap();
        assert_eq!(criteria.age, AgeFilter::All);
        assert_eq!(criteria.consent, ConsentFilter::All);
    }

    #[test]
    fn test_date_param_parsing() {
        let mut with_date = params();
        with_date.date = Some("06/02/2025".to_string());

        let criteria = with_date.criteria().unwrap();
        assert_eq!(
            criteria.registered_on,
            NaiveDate::from_ymd_opt(2025, 2, 6)
        );
    }

    #[test]
    fn test_bad_date_param_is_a_validation_error() {
        let mut with_date = params();
        with_date.date = Some("2025-02-06".to_string());

        assert!(matches!(
            with_date.criteria(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_blank_date_param_is_ignored() {
        let mut with_date = params();
        with_date.date = Some("  ".to_string());

        assert_eq!(with_date.criteria().unwrap().registered_on, None);
    }
}
