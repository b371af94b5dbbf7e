use std::sync::Arc;

use rmcp::model::{
    CallToolRequestParam, CallToolResult, ListToolsResult, PaginatedRequestParam,
    ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData, RoleServer, ServerHandler};

use super::client::ElementsApi;
use super::tools::{self, LIST_LOGIN_CONFIGURATIONS, LIST_PROJECT, VC_ISSUANCE_EVENT_TICKET};
use super::types::{EventTicketParams, PageParams};
use crate::mcp::{parse_arguments, ToolSpec, ValidationError};
use crate::services::server_info;

pub const SERVER_NAME: &str = "mcp-affinidi-elements-server";

/// Affinidi Elements tools. Collaborator failures come back as tool text,
/// never as protocol errors.
#[derive(Clone)]
pub struct ElementsServer {
    api: Arc<dyn ElementsApi>,
}

impl ElementsServer {
    pub fn new(api: Arc<dyn ElementsApi>) -> Self {
        Self { api }
    }

    pub fn tools() -> Vec<ToolSpec> {
        vec![
            ToolSpec::new::<PageParams>(
                LIST_PROJECT,
                "Get the list of projects created in affinidi",
            ),
            ToolSpec::new::<PageParams>(
                LIST_LOGIN_CONFIGURATIONS,
                "List all the Login Configurations in the Project",
            ),
            ToolSpec::new::<EventTicketParams>(
                VC_ISSUANCE_EVENT_TICKET,
                "Issue a verifiable credential (VC) for an event ticket. Use this tool when a user requests a ticket or VC for an event (e.g., \"I want a ticket VC for Tech Event in Bangalore tomorrow\"). On success, it returns a VC offer URL for the user to claim the ticket.",
            ),
        ]
    }
}

impl ServerHandler for ElementsServer {
    fn get_info(&self) -> ServerInfo {
        server_info(
            SERVER_NAME,
            "Affinidi Elements tools: list projects and login configurations, issue event ticket credentials. Every tool takes the caller's API key.",
            ServerCapabilities::builder()
                .enable_logging()
                .enable_tools()
                .build(),
        )
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult::with_all_items(
            Self::tools().iter().map(ToolSpec::to_tool).collect(),
        ))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let CallToolRequestParam {
            name, arguments, ..
        } = request;
        tracing::debug!(tool = %name, "tool call");

        let output = match name.as_ref() {
            LIST_PROJECT => {
                let params: PageParams = parse_arguments(LIST_PROJECT, arguments)?;
                tools::list_projects(self.api.as_ref(), params).await
            }
            LIST_LOGIN_CONFIGURATIONS => {
                let params: PageParams = parse_arguments(LIST_LOGIN_CONFIGURATIONS, arguments)?;
                tools::list_login_configurations(self.api.as_ref(), params).await
            }
            VC_ISSUANCE_EVENT_TICKET => {
                let params: EventTicketParams =
                    parse_arguments(VC_ISSUANCE_EVENT_TICKET, arguments)?;
                tools::vc_issuance_event_ticket(self.api.as_ref(), params).await
            }
            other => return Err(ValidationError::UnknownTool(other.to_string()).into()),
        };
        Ok(output.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::elements::client::{HttpElementsApi, DEFAULT_API_BASE_URL};
    use serde_json::json;

    #[test]
    fn test_tool_specs() {
        let specs = ElementsServer::tools();
        let names: Vec<&str> = specs.iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec![LIST_PROJECT, LIST_LOGIN_CONFIGURATIONS, VC_ISSUANCE_EVENT_TICKET]
        );

        let list_required = specs[0].input_schema["required"].as_array().unwrap();
        assert_eq!(list_required, &vec![json!("apiKey")]);

        assert!(specs[2].description.contains("Use this tool when a user requests a ticket"));

        let ticket_required = specs[2].input_schema["required"].as_array().unwrap();
        assert!(ticket_required.contains(&json!("event_date")));
        assert!(!ticket_required.contains(&json!("ticket_type")));
    }

    #[test]
    fn test_server_info() {
        let api = HttpElementsApi::new(DEFAULT_API_BASE_URL, None).unwrap();
        let info = ElementsServer::new(Arc::new(api)).get_info();
        assert_eq!(info.server_info.name, SERVER_NAME);
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.prompts.is_none());
    }
}
