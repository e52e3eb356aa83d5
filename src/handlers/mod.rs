use serde::Serialize;

pub mod appointments;
pub mod auth;
pub mod doctors;
pub mod patients;
pub mod users;

/// `{success, data}` envelope body for list/detail responses
#[derive(Debug, Serialize)]
pub struct DataPayload<T: Serialize> {
    pub data: T,
}

/// `{success, message}` envelope body for updates
#[derive(Debug, Serialize)]
pub struct MessagePayload {
    pub message: &'static str,
}

/// `{success, message, id}` envelope body for creates
#[derive(Debug, Serialize)]
pub struct CreatedPayload {
    pub message: &'static str,
    pub id: i64,
}
