use std::sync::Mutex;

use serde::Serialize;

use crate::errors::{ApiError, AppError};
use crate::models::matching::{Candidate, MatchKind, RequestOutcome, SettledBooking};
use crate::services::backend::{BackendApi, BookingRequestPayload};
use crate::session::Session;

/// Booking-request flow for one customer session.
///
/// Request and confirm calls both pass through here, so at most one
/// backend call is in flight per session and a stale response can never
/// clobber newer state.
pub struct BookingFlow {
    state: FlowState,
    /// Bumped on every accepted submission and on cancel. A response is
    /// applied only if its ticket still matches.
    generation: u64,
    last_error: Option<String>,
}

#[derive(Debug, Clone)]
enum FlowState {
    Idle,
    Requesting,
    Confirmed { outcome: RequestOutcome },
    PendingChoice { outcome: RequestOutcome },
    NoMatch { status: String },
    Confirming { outcome: RequestOutcome, exact: bool },
    Settled { booking: SettledBooking },
}

/// Data a confirm call needs, captured under the lock before the await.
pub struct ConfirmTicket {
    pub generation: u64,
    pub request_id: String,
    pub partner_id: i64,
}

impl Default for BookingFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingFlow {
    pub fn new() -> Self {
        Self {
            state: FlowState::Idle,
            generation: 0,
            last_error: None,
        }
    }

    /// Accepts a new request submission or explains why not. While a
    /// request or confirmation is in flight, further submissions are
    /// rejected here, before any network call. From a candidate-bearing
    /// state the customer must cancel first; candidates are never
    /// silently discarded.
    pub fn begin_request(&mut self) -> Result<u64, AppError> {
        match self.state {
            FlowState::Requesting => Err(AppError::Conflict(
                "A booking request is already in progress".to_string(),
            )),
            FlowState::Confirming { .. } => Err(AppError::Conflict(
                "A confirmation is in progress".to_string(),
            )),
            FlowState::Confirmed { .. } | FlowState::PendingChoice { .. } => {
                Err(AppError::Conflict(
                    "Finish or cancel the current request before starting a new one".to_string(),
                ))
            }
            FlowState::Idle | FlowState::NoMatch { .. } | FlowState::Settled { .. } => {
                self.generation += 1;
                self.state = FlowState::Requesting;
                self.last_error = None;
                Ok(self.generation)
            }
        }
    }

    /// Applies the backend's response to a request submission. Responses
    /// from an abandoned generation are dropped.
    pub fn apply_request(&mut self, ticket: u64, result: Result<RequestOutcome, ApiError>) {
        if ticket != self.generation || !matches!(self.state, FlowState::Requesting) {
            tracing::debug!(ticket, generation = self.generation, "dropping stale request response");
            return;
        }
        match result {
            Ok(outcome) => {
                self.state = match outcome.classify() {
                    MatchKind::Confirmed => FlowState::Confirmed { outcome },
                    MatchKind::Alternatives => FlowState::PendingChoice { outcome },
                    MatchKind::NoMatch => FlowState::NoMatch {
                        status: outcome.status,
                    },
                };
            }
            Err(err) => {
                self.state = FlowState::Idle;
                self.last_error = Some(err.message());
            }
        }
    }

    /// Starts confirming the chosen candidate. Legal only from a
    /// candidate-bearing state, and the partner must be among the offered
    /// slots. The confirm call is always issued, for an exact match as
    /// much as for a picked alternative.
    pub fn begin_confirm(&mut self, partner_id: i64) -> Result<ConfirmTicket, AppError> {
        let (outcome, exact) = match &self.state {
            FlowState::Confirmed { outcome } => (outcome, true),
            FlowState::PendingChoice { outcome } => (outcome, false),
            FlowState::Requesting | FlowState::Confirming { .. } => {
                return Err(AppError::Conflict(
                    "Another booking operation is in progress".to_string(),
                ))
            }
            _ => {
                return Err(AppError::Conflict(
                    "No booking request to confirm".to_string(),
                ))
            }
        };
        if outcome.candidate(partner_id).is_none() {
            return Err(AppError::Conflict(
                "That partner is not among the offered slots".to_string(),
            ));
        }
        let outcome = outcome.clone();
        self.generation += 1;
        let ticket = ConfirmTicket {
            generation: self.generation,
            request_id: outcome.uuid.clone(),
            partner_id,
        };
        self.state = FlowState::Confirming { outcome, exact };
        self.last_error = None;
        Ok(ticket)
    }

    /// Applies the confirm result: success settles the flow, failure
    /// returns to the prior candidate-bearing state with the list intact
    /// and a specific message. Stale responses are dropped.
    pub fn apply_confirm(&mut self, ticket: u64, result: Result<SettledBooking, ConfirmFailure>) {
        if ticket != self.generation || !matches!(self.state, FlowState::Confirming { .. }) {
            tracing::debug!(ticket, generation = self.generation, "dropping stale confirm response");
            return;
        }
        let FlowState::Confirming { outcome, exact } =
            std::mem::replace(&mut self.state, FlowState::Idle)
        else {
            return;
        };
        match result {
            Ok(booking) => {
                self.state = FlowState::Settled { booking };
            }
            Err(failure) => {
                self.last_error = Some(failure.message());
                self.state = if exact {
                    FlowState::Confirmed { outcome }
                } else {
                    FlowState::PendingChoice { outcome }
                };
            }
        }
    }

    /// Local-only cancel: abandons interest in any in-flight call and
    /// resets to Idle. The server-side call still completes; its response
    /// will arrive with a stale ticket and be ignored.
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.state = FlowState::Idle;
        self.last_error = None;
    }

    pub fn view(&self) -> FlowView {
        let mut view = FlowView {
            state: "idle",
            request_id: None,
            candidates: Vec::new(),
            status: None,
            booking: None,
            error: self.last_error.clone(),
        };
        match &self.state {
            FlowState::Idle => {}
            FlowState::Requesting => view.state = "requesting",
            FlowState::Confirmed { outcome } => {
                view.state = "confirmed";
                view.request_id = Some(outcome.uuid.clone());
                view.candidates = outcome.nearest_availabilities.clone();
            }
            FlowState::PendingChoice { outcome } => {
                view.state = "pending_choice";
                view.request_id = Some(outcome.uuid.clone());
                view.candidates = outcome.nearest_availabilities.clone();
            }
            FlowState::NoMatch { status } => {
                view.state = "no_match";
                view.status = Some(status.clone());
            }
            FlowState::Confirming { outcome, .. } => {
                view.state = "confirming";
                view.request_id = Some(outcome.uuid.clone());
                view.candidates = outcome.nearest_availabilities.clone();
            }
            FlowState::Settled { booking } => {
                view.state = "settled";
                view.booking = Some(booking.clone());
            }
        }
        view
    }
}

/// What the customer's browser sees of the flow.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowView {
    pub state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<Candidate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking: Option<SettledBooking>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Confirm failures, each with its own actionable message. The backend
/// signals lost races through message text, so the sniffing happens once
/// here and nowhere else. None of these are retried automatically; the
/// underlying availability has changed and only the user can decide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmFailure {
    PartnerUnavailable,
    SlotTaken,
    RequestExpired,
    Network,
    Other(String),
}

impl ConfirmFailure {
    pub fn from_api(err: &ApiError) -> Self {
        if matches!(err, ApiError::Transport(_)) {
            return ConfirmFailure::Network;
        }
        let message = err.message();
        let lower = message.to_lowercase();
        if lower.contains("no longer available") {
            ConfirmFailure::PartnerUnavailable
        } else if lower.contains("already been booked") || lower.contains("already booked") {
            ConfirmFailure::SlotTaken
        } else if lower.contains("expired") {
            ConfirmFailure::RequestExpired
        } else {
            ConfirmFailure::Other(message)
        }
    }

    pub fn message(&self) -> String {
        match self {
            ConfirmFailure::PartnerUnavailable => {
                "This partner was just booked by someone else. Pick another slot or start a new request."
            }
            ConfirmFailure::SlotTaken => {
                "That time slot has already been booked. Pick a different slot."
            }
            ConfirmFailure::RequestExpired => {
                "Your booking request expired. Submit a new request to see current availability."
            }
            ConfirmFailure::Network => {
                "Connection problem while confirming. Check your bookings before trying again."
            }
            ConfirmFailure::Other(message) => return message.clone(),
        }
        .to_string()
    }
}

/// Runs one request submission end to end: guard, backend call, apply.
/// The flow lock is never held across the await.
pub async fn submit_request(
    flow: &Mutex<BookingFlow>,
    backend: &dyn BackendApi,
    session: &Session,
    payload: &BookingRequestPayload,
) -> Result<FlowView, AppError> {
    let ticket = flow.lock().unwrap().begin_request()?;
    tracing::info!(
        user = session.user_id,
        start = %payload.start_time,
        "submitting booking request"
    );
    let result = backend.create_booking_request(session, payload).await;
    let mut flow = flow.lock().unwrap();
    let expired = matches!(result, Err(ApiError::Unauthorized));
    flow.apply_request(ticket, result);
    if expired {
        return Err(AppError::SessionExpired);
    }
    Ok(flow.view())
}

/// Runs one confirm attempt end to end. Failure does not error the route;
/// the returned view carries the prior candidates and the failure message.
pub async fn submit_confirm(
    flow: &Mutex<BookingFlow>,
    backend: &dyn BackendApi,
    session: &Session,
    partner_id: i64,
) -> Result<FlowView, AppError> {
    let ticket = flow.lock().unwrap().begin_confirm(partner_id)?;
    tracing::info!(
        user = session.user_id,
        partner = partner_id,
        request = %ticket.request_id,
        "confirming booking request"
    );
    let result = backend
        .confirm_booking_request(session, &ticket.request_id, ticket.partner_id)
        .await;
    let mut flow = flow.lock().unwrap();
    match result {
        Ok(booking) => flow.apply_confirm(ticket.generation, Ok(booking)),
        Err(ApiError::Unauthorized) => {
            flow.apply_confirm(
                ticket.generation,
                Err(ConfirmFailure::from_api(&ApiError::Unauthorized)),
            );
            return Err(AppError::SessionExpired);
        }
        Err(err) => flow.apply_confirm(ticket.generation, Err(ConfirmFailure::from_api(&err))),
    }
    Ok(flow.view())
}
