pub mod cancellation;
pub mod classification_session;
pub mod slot;
pub mod status;
pub mod worker;
