pub mod availability_editor;
pub mod backend;
pub mod booking_flow;
