pub mod client;
mod handler;
pub mod tools;
mod types;

pub use client::{ApiError, ElementsApi, HttpElementsApi, DEFAULT_API_BASE_URL};
pub use handler::{ElementsServer, SERVER_NAME};
pub use types::{
    ClaimMode, EventTicketParams, IssuanceData, PageParams, PageQuery, StartIssuanceInput,
    StartIssuanceResponse, StatusListDetails,
};
