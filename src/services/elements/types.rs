use schemars::JsonSchema;
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::mcp::ToolParams;

fn default_limit() -> u32 {
    10
}

/// Any JSON number is accepted as a page size; fractions are truncated
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lenient_limit<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let n = f64::deserialize(deserializer)?;
    if !n.is_finite() || n < 0.0 || n > f64::from(u32::MAX) {
        return Err(de::Error::custom(format!(
            "limit must be a non-negative number, got {n}"
        )));
    }
    Ok(n.trunc() as u32)
}

/// Arguments shared by the paginated listing tools
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct PageParams {
    /// API key
    #[serde(rename = "apiKey")]
    pub api_key: String,
    /// Maximum number of items to fetch in a list, default value: 10
    #[serde(default = "default_limit", deserialize_with = "lenient_limit")]
    #[schemars(with = "f64")]
    pub limit: u32,
    /// The base64url encoded key of the first item that this operation will
    /// evaluate (it is not returned). Use the value that was returned in the
    /// previous operation.
    #[serde(rename = "exclusiveStartKey", default)]
    pub exclusive_start_key: Option<String>,
}

impl PageParams {
    pub fn page_query(&self) -> PageQuery {
        PageQuery {
            limit: Some(self.limit),
            exclusive_start_key: self.exclusive_start_key.clone(),
        }
    }
}

impl ToolParams for PageParams {}

/// Pagination query string of the listing endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(rename = "exclusiveStartKey", skip_serializing_if = "Option::is_none")]
    pub exclusive_start_key: Option<String>,
}

/// Arguments of `vc_issuance_event_ticket`
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct EventTicketParams {
    /// API key
    #[serde(rename = "apiKey")]
    pub api_key: String,
    /// Project id under which it should use issuance config for issuing a verifiable credential(VC)
    pub project_id: String,
    /// First/given name of the customer who is purchasing the event ticket
    pub given_name: String,
    /// Last/family name of the customer who is purchasing the event ticket
    pub last_name: String,
    /// Email of the customer who is purchasing the event ticket
    pub email: String,
    /// Name of event for which ticket should be purchased
    pub event_name: String,
    /// Event location of the event where it is happening
    pub location: String,
    /// Ticket type premium or regular
    #[serde(default)]
    pub ticket_type: Option<String>,
    /// Event date when it is happening
    pub event_date: String,
}

impl ToolParams for EventTicketParams {}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ListProjectsResponse {
    #[serde(default)]
    pub(crate) projects: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ListLoginConfigurationsResponse {
    #[serde(default)]
    pub(crate) configurations: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimMode {
    Normal,
    TxCode,
    FixedHolder,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusListDetails {
    pub purpose: String,
    pub standard: String,
}

impl StatusListDetails {
    pub fn revocable() -> Self {
        Self {
            purpose: "REVOCABLE".to_string(),
            standard: "RevocationList2020".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuanceData {
    pub credential_type_id: String,
    pub credential_data: Value,
    pub status_list_details: Vec<StatusListDetails>,
}

/// Body of `POST /cis/v1/{projectId}/issuance/start`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartIssuanceInput {
    pub claim_mode: ClaimMode,
    pub data: Vec<IssuanceData>,
}

/// Credential offer returned by a started issuance
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartIssuanceResponse {
    pub credential_offer_uri: String,
    #[serde(default)]
    pub tx_code: Option<String>,
    #[serde(default)]
    pub issuance_id: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}
