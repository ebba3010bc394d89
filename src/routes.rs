use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use tracing::info;

use crate::{
    admission::{self, Candidate, ParticipantPatch},
    auth, dates,
    error::AppError,
    export,
    payloads::{
        CapacityForm, CapacityReply, DateCount, LoginForm, ParticipantPatchForm,
        PhoneSuffixCount, RegistrationForm, RegistrationReply, RosterPage, RosterParams,
        SessionReply,
    },
    roster::{self, Participant},
    state::State as AppState,
    store,
};

/// Public sign-up. Validates, applies the capacity gate and persists exactly
/// one document on success.
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(form): Json<RegistrationForm>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = state.redis_connection.clone();

    let capacity = store::read_capacity(&mut conn).await?;
    let roster = store::read_roster(&mut conn).await?;

    let admission = admission::admit(
        Candidate {
            name: form.name,
            birth_date: form.birth_date,
            phone: form.phone,
        },
        roster.len(),
        capacity,
        Utc::now(),
    )?;

    let participant = store::create_participant(&mut conn, admission.participant).await?;
    info!(
        "Participante {} inscrito ({}/{})",
        participant.id,
        roster.len() + 1,
        capacity
    );

    Ok((
        StatusCode::CREATED,
        Json(RegistrationReply {
            requires_consent_flow: admission.requires_consent_flow,
            participant,
        }),
    ))
}

pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(form): Json<LoginForm>,
) -> Result<Json<SessionReply>, AppError> {
    let mut conn = state.redis_connection.clone();

    let token = auth::authenticate(&mut conn, &state.config, &form.email, &form.password).await?;
    info!("Sessão de administrador aberta");

    Ok(Json(SessionReply { token }))
}

pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let mut conn = state.redis_connection.clone();

    auth::end_session(&mut conn, &headers).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// One page of the filtered roster for the admin table.
pub async fn roster_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<RosterParams>,
) -> Result<Json<RosterPage>, AppError> {
    let mut conn = state.redis_connection.clone();
    auth::current_session(&mut conn, &headers).await?;

    let criteria = params.criteria()?;
    let roster = store::read_roster(&mut conn).await?;
    let page = roster::query(&roster, &criteria, params.page, params.page_size);

    Ok(Json(RosterPage {
        rows: page.rows,
        total_pages: page.total_pages,
    }))
}

/// Admin add. Same validation and the same capacity gate as the public form.
pub async fn create_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(form): Json<RegistrationForm>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = state.redis_connection.clone();
    auth::current_session(&mut conn, &headers).await?;

    let capacity = store::read_capacity(&mut conn).await?;
    let roster = store::read_roster(&mut conn).await?;

    let admission = admission::admit(
        Candidate {
            name: form.name,
            birth_date: form.birth_date,
            phone: form.phone,
        },
        roster.len(),
        capacity,
        Utc::now(),
    )?;

    let participant = store::create_participant(&mut conn, admission.participant).await?;
    info!("Participante {} adicionado pelo painel", participant.id);

    Ok((StatusCode::CREATED, Json(participant)))
}

pub async fn update_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(form): Json<ParticipantPatchForm>,
) -> Result<Json<Participant>, AppError> {
    let mut conn = state.redis_connection.clone();
    auth::current_session(&mut conn, &headers).await?;

    let mut participant = store::read_participant(&mut conn, &id).await?;
    admission::apply_patch(
        &mut participant,
        ParticipantPatch {
            name: form.name,
            phone: form.phone,
            birth_date: form.birth_date,
            consent_delivered: form.consent_delivered,
        },
        Utc::now(),
    )?;

    store::write_participant(&mut conn, &participant).await?;
    info!("Participante {} atualizado", participant.id);

    Ok(Json(participant))
}

pub async fn delete_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let mut conn = state.redis_connection.clone();
    auth::current_session(&mut conn, &headers).await?;

    store::delete_participant(&mut conn, &id).await?;
    info!("Participante {id} removido");

    Ok(StatusCode::NO_CONTENT)
}

pub async fn capacity_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<CapacityReply>, AppError> {
    let mut conn = state.redis_connection.clone();
    auth::current_session(&mut conn, &headers).await?;

    let capacity = store::read_capacity(&mut conn).await?;
    let roster = store::read_roster(&mut conn).await?;

    Ok(Json(CapacityReply {
        capacity,
        roster_size: roster.len(),
    }))
}

pub async fn set_capacity_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(form): Json<CapacityForm>,
) -> Result<Json<CapacityReply>, AppError> {
    let mut conn = state.redis_connection.clone();
    auth::current_session(&mut conn, &headers).await?;

    admission::validate_capacity(form.capacity)?;
    store::write_capacity(&mut conn, form.capacity).await?;

    let roster = store::read_roster(&mut conn).await?;
    info!("Limite atualizado para {} participantes", form.capacity);

    Ok(Json(CapacityReply {
        capacity: form.capacity,
        roster_size: roster.len(),
    }))
}

/// CSV download of the filtered roster, in table order. The PDF printout is
/// rendered client-side from the same rows.
pub async fn export_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<RosterParams>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = state.redis_connection.clone();
    auth::current_session(&mut conn, &headers).await?;

    let criteria = params.criteria()?;
    let roster = store::read_roster(&mut conn).await?;
    let rows = export::to_rows(&roster::filtered(&roster, &criteria));

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"participantes.csv\"",
            ),
        ],
        export::to_csv(&rows),
    ))
}

pub async fn dates_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<DateCount>>, AppError> {
    let mut conn = state.redis_connection.clone();
    auth::current_session(&mut conn, &headers).await?;

    let roster = store::read_roster(&mut conn).await?;
    let counts = roster::date_counts(&roster)
        .into_iter()
        .map(|(date, count)| DateCount {
            date: dates::format_br(date),
            count,
        })
        .collect();

    Ok(Json(counts))
}

pub async fn phones_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<PhoneSuffixCount>>, AppError> {
    let mut conn = state.redis_connection.clone();
    auth::current_session(&mut conn, &headers).await?;

    let roster = store::read_roster(&mut conn).await?;
    let counts = roster::phone_suffix_counts(&roster)
        .into_iter()
        .map(|(suffix, count)| PhoneSuffixCount { suffix, count })
        .collect();

    Ok(Json(counts))
}
