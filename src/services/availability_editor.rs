use chrono::NaiveDate;
use futures::future::join_all;

use crate::models::availability::{hour_slot_times, sort_slots, AvailabilitySlot};
use crate::services::backend::{BackendApi, CreateSlotPayload};
use crate::session::Session;

/// One hour-slot creation the batch will issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCreate {
    pub date: String,
    pub time: String,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedDelete {
    pub slot_id: i64,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchPlan {
    pub creates: Vec<PlannedCreate>,
    pub deletes: Vec<PlannedDelete>,
    /// Tuples whose existing slot is booked; protected from mutation.
    pub skipped_booked: usize,
}

impl BatchPlan {
    pub fn is_empty(&self) -> bool {
        self.creates.is_empty() && self.deletes.is_empty()
    }

    pub fn op_count(&self) -> usize {
        self.creates.len() + self.deletes.len()
    }
}

/// Turns the partner's (dates × hours) selection into create/delete ops
/// against the cached slot set. A selected tuple toggles: an existing
/// unbooked slot is deleted, a missing one is created for the following
/// hour, and a booked slot is left alone.
pub fn plan_batch(cache: &[AvailabilitySlot], dates: &[NaiveDate], hours: &[u32]) -> BatchPlan {
    let mut plan = BatchPlan::default();
    for &date in dates {
        let date_str = date.to_string();
        for &hour in hours {
            let time = format!("{hour:02}:00");
            match cache.iter().find(|s| s.date == date_str && s.time == time) {
                Some(slot) if slot.is_booked => plan.skipped_booked += 1,
                Some(slot) => plan.deletes.push(PlannedDelete { slot_id: slot.id }),
                None => {
                    let (start_time, end_time) = hour_slot_times(date, hour);
                    plan.creates.push(PlannedCreate {
                        date: date_str.clone(),
                        time,
                        start_time,
                        end_time,
                    });
                }
            }
        }
    }
    plan
}

/// How the slot cache gets back in sync after a commit. The two
/// strategies sit behind this one value so callers cannot mix a partial
/// incremental patch with an unresolved batch.
#[derive(Debug)]
pub enum Reconciliation {
    /// Every op succeeded; patch the cache in place.
    Incremental {
        added: Vec<AvailabilitySlot>,
        removed_ids: Vec<i64>,
    },
    /// At least one op failed or came back unreadable. Nothing local may
    /// change; only a full reload from the backend is trustworthy.
    Refetch { error: String },
}

/// Issues every planned op concurrently and decides only after all have
/// settled. A single failure poisons the whole batch.
pub async fn commit_batch(
    backend: &dyn BackendApi,
    session: &Session,
    partner_id: i64,
    plan: &BatchPlan,
) -> Reconciliation {
    let creates = join_all(plan.creates.iter().map(|c| {
        let payload = CreateSlotPayload {
            partner_id,
            start_time: c.start_time.clone(),
            end_time: c.end_time.clone(),
        };
        async move { backend.create_availability(session, &payload).await }
    }));
    let deletes = join_all(
        plan.deletes
            .iter()
            .map(|d| backend.delete_availability(session, d.slot_id)),
    );
    let (created, deleted) = futures::join!(creates, deletes);

    let mut error: Option<String> = None;
    let mut added = Vec::with_capacity(created.len());
    for result in created {
        match result {
            Ok(record) => match AvailabilitySlot::from_record(&record) {
                Some(slot) => added.push(slot),
                None => {
                    if error.is_none() {
                        error = Some("Server returned an unreadable slot".to_string());
                    }
                }
            },
            Err(err) => {
                if error.is_none() {
                    error = Some(err.message());
                }
            }
        }
    }
    for result in deleted {
        if let Err(err) = result {
            if error.is_none() {
                error = Some(err.message());
            }
        }
    }

    match error {
        Some(error) => Reconciliation::Refetch { error },
        None => Reconciliation::Incremental {
            added,
            removed_ids: plan.deletes.iter().map(|d| d.slot_id).collect(),
        },
    }
}

/// Fast-path reconciliation once every op in the batch succeeded.
pub fn apply_incremental(
    cache: &mut Vec<AvailabilitySlot>,
    added: Vec<AvailabilitySlot>,
    removed_ids: &[i64],
) {
    cache.retain(|slot| !removed_ids.contains(&slot.id));
    cache.extend(added);
    sort_slots(cache);
}

/// Parses an hour label like `"14:00"`. Only whole hours are bookable.
pub fn parse_hour(label: &str) -> Option<u32> {
    let (hour, minutes) = label.split_once(':')?;
    if minutes != "00" {
        return None;
    }
    let hour: u32 = hour.parse().ok()?;
    (hour < 24).then_some(hour)
}
