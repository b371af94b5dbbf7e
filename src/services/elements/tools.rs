use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use super::client::ElementsApi;
use super::types::{
    ClaimMode, EventTicketParams, IssuanceData, PageParams, StartIssuanceInput,
    StartIssuanceResponse, StatusListDetails,
};
use crate::mcp::ToolOutput;

pub const LIST_PROJECT: &str = "list_project";
pub const LIST_LOGIN_CONFIGURATIONS: &str = "list_login_configurations";
pub const VC_ISSUANCE_EVENT_TICKET: &str = "vc_issuance_event_ticket";

pub const EVENT_TICKET_CREDENTIAL_TYPE: &str = "EventTicketVC";
pub const CLAIM_BASE_URL: &str = "https://vault.affinidi.com/claim";

const DEFAULT_TICKET_TYPE: &str = "premium";
const LOGIN_CONFIGURATION_HIDDEN_FIELDS: [&str; 2] = ["idTokenMapping", "presentationDefinition"];

pub async fn list_projects(api: &dyn ElementsApi, params: PageParams) -> ToolOutput {
    match api.list_projects(&params.api_key, &params.page_query()).await {
        Ok(projects) => ToolOutput::text(format!("List of projects => {}", Value::Array(projects))),
        Err(e) => {
            tracing::warn!(error = %e, "listing projects failed");
            ToolOutput::text(format!("Error while fetching projects {e}"))
        }
    }
}

pub async fn list_login_configurations(api: &dyn ElementsApi, params: PageParams) -> ToolOutput {
    match api
        .list_login_configurations(&params.api_key, &params.page_query())
        .await
    {
        Ok(configurations) => {
            let configurations: Vec<Value> = configurations
                .into_iter()
                .map(strip_login_configuration)
                .collect();
            ToolOutput::text(format!(
                "List of Login Configurations => {}",
                Value::Array(configurations)
            ))
        }
        Err(e) => {
            tracing::warn!(error = %e, "listing login configurations failed");
            ToolOutput::text(format!("Error while fetching login configurations {e}"))
        }
    }
}

pub async fn vc_issuance_event_ticket(
    api: &dyn ElementsApi,
    params: EventTicketParams,
) -> ToolOutput {
    let credential = event_ticket_credential(&params, Uuid::new_v4(), Utc::now());
    let input = event_ticket_issuance(credential);

    match api
        .start_issuance(&params.api_key, &params.project_id, &input)
        .await
    {
        Ok(offer) => {
            tracing::info!(
                project_id = %params.project_id,
                issuance_id = ?offer.issuance_id,
                "event ticket offer created"
            );
            ToolOutput::text(claim_message(&offer))
        }
        Err(e) => {
            tracing::warn!(error = %e, project_id = %params.project_id, "event ticket issuance failed");
            ToolOutput::text(format!("Error while creating event ticket vc {e}"))
        }
    }
}

/// Drops the bulky mapping fields from a login configuration
pub fn strip_login_configuration(mut configuration: Value) -> Value {
    if let Some(fields) = configuration.as_object_mut() {
        for hidden in LOGIN_CONFIGURATION_HIDDEN_FIELDS {
            fields.remove(hidden);
        }
    }
    configuration
}

/// Credential subject of an event ticket
pub fn event_ticket_credential(
    params: &EventTicketParams,
    ticket_id: Uuid,
    created_at: DateTime<Utc>,
) -> Value {
    let ticket_type = params
        .ticket_type
        .as_deref()
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_TICKET_TYPE);

    json!({
        "event": {
            "eventId": "event1234",
            "name": params.event_name,
            "location": params.location,
            "startDate": format!("{}T00:00:00Z", params.event_date),
            "endDate": format!("{}T23:59:59Z", params.event_date),
        },
        "ticket": {
            "ticketId": ticket_id.to_string(),
            "ticketType": ticket_type,
            "seat": "1B",
        },
        "createdAt": created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        // field name is fixed by the EventTicketVC schema
        "attendeeAtrributes": {
            "email": params.email,
            "firstName": params.given_name,
            "lastName": params.last_name,
            "dateOfBirth": "2010-10-17",
        },
    })
}

pub fn event_ticket_issuance(credential_data: Value) -> StartIssuanceInput {
    StartIssuanceInput {
        claim_mode: ClaimMode::TxCode,
        data: vec![IssuanceData {
            credential_type_id: EVENT_TICKET_CREDENTIAL_TYPE.to_string(),
            credential_data,
            status_list_details: vec![StatusListDetails::revocable()],
        }],
    }
}

pub fn claim_url(credential_offer_uri: &str) -> String {
    format!("{CLAIM_BASE_URL}?credential_offer_uri={credential_offer_uri}")
}

pub fn claim_message(offer: &StartIssuanceResponse) -> String {
    format!(
        "**Event ticket VC offer ready to claim!**\n\
         Click the link below and enter the transaction code to complete the process:\n\n\
         🔗 [Claim your Event Ticket VC]({})\n\n\
         🔒 **Transaction Code:** `{}`",
        claim_url(&offer.credential_offer_uri),
        offer.tx_code.as_deref().unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::elements::client::ApiError;
    use crate::services::elements::types::PageQuery;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeApi {
        projects: Option<Vec<Value>>,
        configurations: Option<Vec<Value>>,
        offer: Option<StartIssuanceResponse>,
        error: Option<String>,
        seen: Mutex<Vec<(String, Option<PageQuery>, Option<StartIssuanceInput>)>>,
    }

    impl FakeApi {
        fn failing(message: &str) -> Self {
            Self {
                error: Some(message.to_string()),
                ..Self::default()
            }
        }

        fn fail(&self) -> ApiError {
            ApiError::Other(self.error.clone().unwrap_or_default())
        }
    }

    #[async_trait]
    impl ElementsApi for FakeApi {
        async fn list_projects(
            &self,
            api_key: &str,
            page: &PageQuery,
        ) -> Result<Vec<Value>, ApiError> {
            self.seen
                .lock()
                .unwrap()
                .push((api_key.to_string(), Some(page.clone()), None));
            self.projects.clone().ok_or_else(|| self.fail())
        }

        async fn list_login_configurations(
            &self,
            api_key: &str,
            page: &PageQuery,
        ) -> Result<Vec<Value>, ApiError> {
            self.seen
                .lock()
                .unwrap()
                .push((api_key.to_string(), Some(page.clone()), None));
            self.configurations.clone().ok_or_else(|| self.fail())
        }

        async fn start_issuance(
            &self,
            api_key: &str,
            _project_id: &str,
            input: &StartIssuanceInput,
        ) -> Result<StartIssuanceResponse, ApiError> {
            self.seen
                .lock()
                .unwrap()
                .push((api_key.to_string(), None, Some(input.clone())));
            self.offer.clone().ok_or_else(|| self.fail())
        }
    }

    fn page(api_key: &str) -> PageParams {
        serde_json::from_value(json!({ "apiKey": api_key })).unwrap()
    }

    fn ticket_params(ticket_type: Option<&str>) -> EventTicketParams {
        serde_json::from_value(json!({
            "apiKey": "key",
            "project_id": "p1",
            "given_name": "Ada",
            "last_name": "Lovelace",
            "email": "ada@example.com",
            "event_name": "RustConf",
            "location": "Montreal",
            "ticket_type": ticket_type,
            "event_date": "2025-09-01",
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_list_projects_success() {
        let api = FakeApi {
            projects: Some(vec![json!({ "id": "p1", "name": "Demo" })]),
            ..FakeApi::default()
        };
        let output = list_projects(&api, page("key")).await;
        assert_eq!(
            output.joined_text(),
            r#"List of projects => [{"id":"p1","name":"Demo"}]"#
        );

        let seen = api.seen.lock().unwrap();
        assert_eq!(seen[0].0, "key");
        assert_eq!(seen[0].1.as_ref().unwrap().limit, Some(10));
    }

    #[tokio::test]
    async fn test_list_projects_failure_is_text() {
        let api = FakeApi::failing("timeout");
        let output = list_projects(&api, page("key")).await;
        assert_eq!(output.joined_text(), "Error while fetching projects timeout");
    }

    #[tokio::test]
    async fn test_list_login_configurations_strips_fields() {
        let api = FakeApi {
            configurations: Some(vec![json!({
                "name": "login",
                "idTokenMapping": [{ "sourceField": "email" }],
                "presentationDefinition": { "id": "pd" },
            })]),
            ..FakeApi::default()
        };
        let output = list_login_configurations(&api, page("key")).await;
        assert_eq!(
            output.joined_text(),
            r#"List of Login Configurations => [{"name":"login"}]"#
        );
    }

    #[tokio::test]
    async fn test_list_login_configurations_failure() {
        let api = FakeApi::failing("Request failed with status code 403");
        let output = list_login_configurations(&api, page("key")).await;
        assert_eq!(
            output.joined_text(),
            "Error while fetching login configurations Request failed with status code 403"
        );
    }

    #[test]
    fn test_event_ticket_credential() {
        let ticket_id = Uuid::new_v4();
        let created_at = DateTime::parse_from_rfc3339("2025-01-02T03:04:05Z")
            .unwrap()
            .with_timezone(&Utc);
        let credential = event_ticket_credential(&ticket_params(None), ticket_id, created_at);

        assert_eq!(credential["event"]["startDate"], "2025-09-01T00:00:00Z");
        assert_eq!(credential["event"]["endDate"], "2025-09-01T23:59:59Z");
        assert_eq!(credential["event"]["name"], "RustConf");
        assert_eq!(credential["ticket"]["ticketId"], ticket_id.to_string());
        assert_eq!(credential["ticket"]["ticketType"], "premium");
        assert_eq!(credential["ticket"]["seat"], "1B");
        assert_eq!(credential["createdAt"], "2025-01-02T03:04:05.000Z");
        assert_eq!(credential["attendeeAtrributes"]["firstName"], "Ada");
        assert_eq!(credential["attendeeAtrributes"]["lastName"], "Lovelace");
        assert_eq!(credential["attendeeAtrributes"]["email"], "ada@example.com");
    }

    #[test]
    fn test_explicit_ticket_type() {
        let credential =
            event_ticket_credential(&ticket_params(Some("regular")), Uuid::new_v4(), Utc::now());
        assert_eq!(credential["ticket"]["ticketType"], "regular");
    }

    #[tokio::test]
    async fn test_event_ticket_success() {
        let api = FakeApi {
            offer: Some(StartIssuanceResponse {
                credential_offer_uri: "https://offer/1".into(),
                tx_code: Some("1234".into()),
                issuance_id: Some("i1".into()),
                expires_in: Some(600),
            }),
            ..FakeApi::default()
        };
        let output = vc_issuance_event_ticket(&api, ticket_params(None)).await;
        let text = output.joined_text();
        assert!(text.contains(
            "(https://vault.affinidi.com/claim?credential_offer_uri=https://offer/1)"
        ));
        assert!(text.contains("`1234`"));

        let seen = api.seen.lock().unwrap();
        let input = seen[0].2.as_ref().unwrap();
        assert_eq!(input.claim_mode, ClaimMode::TxCode);
        assert_eq!(input.data[0].credential_type_id, EVENT_TICKET_CREDENTIAL_TYPE);
    }

    #[tokio::test]
    async fn test_event_ticket_failure() {
        let api = FakeApi::failing("boom");
        let output = vc_issuance_event_ticket(&api, ticket_params(None)).await;
        assert_eq!(output.joined_text(), "Error while creating event ticket vc boom");
    }
}
