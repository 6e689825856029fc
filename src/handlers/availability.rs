use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::availability::{expand_dates, sort_slots, AvailabilitySlot};
use crate::models::user::UserType;
use crate::services::availability_editor::{
    apply_incremental, commit_batch, parse_hour, plan_batch, Reconciliation,
};
use crate::services::backend::BackendApi;
use crate::session::SessionHandle;
use crate::state::AppState;
use crate::validate::FieldErrors;

#[derive(Serialize)]
pub struct SlotsResponse {
    pub slots: Vec<AvailabilitySlot>,
}

// GET /api/availability
pub async fn load_availability(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<SlotsResponse>, AppError> {
    let handle = state.sessions.authenticate(&headers)?;
    handle.require(UserType::Partner)?;
    let slots = refresh_slots(state.backend.as_ref(), &handle).await?;
    Ok(Json(SlotsResponse { slots }))
}

// POST /api/availability/commit
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitForm {
    #[serde(default)]
    pub dates: Vec<String>,
    /// Inclusive date range, expanded day by day. Combines with `dates`.
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub times: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitResponse {
    pub added: usize,
    pub removed: usize,
    pub skipped_booked: usize,
    pub slots: Vec<AvailabilitySlot>,
}

pub async fn commit_availability(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(form): Json<CommitForm>,
) -> Result<Json<CommitResponse>, AppError> {
    let handle = state.sessions.authenticate(&headers)?;
    handle.require(UserType::Partner)?;
    let (dates, hours) = parse_selection(&form)?;

    if handle.committing.swap(true, Ordering::SeqCst) {
        return Err(AppError::Conflict(
            "An availability update is already in progress".to_string(),
        ));
    }
    let result = commit_inner(&state, &handle, &dates, &hours).await;
    handle.committing.store(false, Ordering::SeqCst);
    result.map(Json)
}

async fn commit_inner(
    state: &AppState,
    handle: &SessionHandle,
    dates: &[NaiveDate],
    hours: &[u32],
) -> Result<CommitResponse, AppError> {
    // Plan against this session's cached truth, loading it on first use.
    let cached = { handle.slots.lock().unwrap().clone() };
    let cache = match cached {
        Some(slots) => slots,
        None => refresh_slots(state.backend.as_ref(), handle).await?,
    };

    let plan = plan_batch(&cache, dates, hours);
    tracing::info!(
        partner = handle.session.user_id,
        creates = plan.creates.len(),
        deletes = plan.deletes.len(),
        skipped = plan.skipped_booked,
        "committing availability batch"
    );
    if plan.is_empty() {
        return Ok(CommitResponse {
            added: 0,
            removed: 0,
            skipped_booked: plan.skipped_booked,
            slots: cache,
        });
    }

    match commit_batch(
        state.backend.as_ref(),
        &handle.session,
        handle.session.user_id,
        &plan,
    )
    .await
    {
        Reconciliation::Incremental { added, removed_ids } => {
            let mut guard = handle.slots.lock().unwrap();
            let cache = guard.get_or_insert_with(Vec::new);
            let added_count = added.len();
            apply_incremental(cache, added, &removed_ids);
            Ok(CommitResponse {
                added: added_count,
                removed: removed_ids.len(),
                skipped_booked: plan.skipped_booked,
                slots: cache.clone(),
            })
        }
        Reconciliation::Refetch { error } => {
            // Resync truth from the backend before surfacing the failure;
            // partial results must never leak into the cache.
            if let Err(reload) = refresh_slots(state.backend.as_ref(), handle).await {
                tracing::warn!(error = %reload, "availability reload after failed batch also failed");
            }
            Err(AppError::Backend(error))
        }
    }
}

// DELETE /api/availability/:id
pub async fn remove_slot(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<SlotsResponse>, AppError> {
    let handle = state.sessions.authenticate(&headers)?;
    handle.require(UserType::Partner)?;

    let cached = { handle.slots.lock().unwrap().clone() };
    let slots = match cached {
        Some(slots) => slots,
        None => refresh_slots(state.backend.as_ref(), &handle).await?,
    };
    let Some(slot) = slots.iter().find(|s| s.id == id) else {
        return Err(AppError::NotFound(format!("availability slot {id}")));
    };
    if slot.is_booked {
        return Err(AppError::Conflict(
            "Booked slots cannot be removed".to_string(),
        ));
    }

    match state
        .backend
        .delete_availability(&handle.session, id)
        .await
    {
        Ok(()) => {
            let mut guard = handle.slots.lock().unwrap();
            let cache = guard.get_or_insert_with(Vec::new);
            cache.retain(|s| s.id != id);
            Ok(Json(SlotsResponse {
                slots: cache.clone(),
            }))
        }
        Err(err) => {
            if let Err(reload) = refresh_slots(state.backend.as_ref(), &handle).await {
                tracing::warn!(error = %reload, "availability reload after failed delete also failed");
            }
            Err(err.into())
        }
    }
}

/// Authoritative reload: fetches the partner's slots and replaces the
/// session cache with them.
async fn refresh_slots(
    backend: &dyn BackendApi,
    handle: &SessionHandle,
) -> Result<Vec<AvailabilitySlot>, AppError> {
    let records = backend
        .list_availability(&handle.session, handle.session.user_id)
        .await?;
    let mut slots: Vec<AvailabilitySlot> = records
        .iter()
        .filter_map(AvailabilitySlot::from_record)
        .collect();
    sort_slots(&mut slots);
    *handle.slots.lock().unwrap() = Some(slots.clone());
    Ok(slots)
}

fn parse_selection(form: &CommitForm) -> Result<(Vec<NaiveDate>, Vec<u32>), AppError> {
    let mut errors = FieldErrors::new();
    let mut dates = Vec::new();

    for raw in &form.dates {
        match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => dates.push(date),
            Err(_) => errors.push("dates", format!("Invalid date: {raw}")),
        }
    }
    match (form.from.as_deref(), form.to.as_deref()) {
        (Some(from), Some(to)) => {
            match (
                NaiveDate::parse_from_str(from, "%Y-%m-%d"),
                NaiveDate::parse_from_str(to, "%Y-%m-%d"),
            ) {
                (Ok(from), Ok(to)) if from <= to => dates.extend(expand_dates(from, to)),
                (Ok(_), Ok(_)) => errors.push("to", "Range end is before its start"),
                _ => errors.push("from", "Invalid date range"),
            }
        }
        (None, None) => {}
        _ => errors.push("from", "Date ranges need both ends"),
    }
    if dates.is_empty() {
        errors.push("dates", "Select at least one date");
    }

    let mut hours = Vec::new();
    for raw in &form.times {
        match parse_hour(raw) {
            Some(hour) => hours.push(hour),
            None => errors.push("times", format!("Invalid time slot: {raw}")),
        }
    }
    if hours.is_empty() {
        errors.push("times", "Select at least one time slot");
    }

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }
    dates.sort();
    dates.dedup();
    hours.sort_unstable();
    hours.dedup();
    Ok((dates, hours))
}
