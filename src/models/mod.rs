pub mod availability;
pub mod booking;
pub mod matching;
pub mod user;

pub use availability::{AvailabilitySlot, PartnerSlot, SlotPartner, SlotRecord};
pub use booking::{Booking, BookingStatus, ServiceType};
pub use matching::{Candidate, MatchKind, RequestOutcome, SettledBooking};
pub use user::{AccountInfo, Customer, DashboardStats, LoginData, Partner, UserType};
