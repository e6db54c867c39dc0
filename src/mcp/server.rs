use crate::research::{prompts, ResearchOrchestrator};
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::*,
    tool, tool_handler, tool_router,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Parameters for full research
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct ResearchParams {
    /// The research topic or question
    pub query: String,
}

/// Parameters for a single-pass search
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct SearchParams {
    /// The search query
    pub query: String,
}

/// Parameters for repository-focused research
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct AskReposParams {
    /// The repository-focused question
    pub query: String,
    /// GitHub repo references (e.g., ["owner/repo"])
    #[serde(default)]
    pub repos: Option<Vec<String>>,
}

/// MCP server exposing the research orchestrator as tools
#[derive(Clone)]
pub struct PlinyMcpServer {
    orchestrator: Arc<ResearchOrchestrator>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl PlinyMcpServer {
    pub fn new(orchestrator: Arc<ResearchOrchestrator>) -> Self {
        Self {
            orchestrator,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Full research with synthesis. Decomposes the topic into subtopics, researches each with the fast and slow agent backends in parallel, and produces a comprehensive report."
    )]
    async fn pliny_research(
        &self,
        params: Parameters<ResearchParams>,
    ) -> Result<CallToolResult, McpError> {
        let query = params.0.query;
        tracing::info!(tool = "pliny_research", "{}", query);

        Ok(into_tool_result(self.orchestrator.research(&query).await))
    }

    #[tool(
        description = "Quick single-pass research. No decomposition: the query itself is researched by both backends and synthesized."
    )]
    async fn pliny_search(&self, params: Parameters<SearchParams>) -> Result<CallToolResult, McpError> {
        let query = params.0.query;
        tracing::info!(tool = "pliny_search", "{}", query);

        let result = self
            .orchestrator
            .run_with_subtopics(&query, vec![query.clone()])
            .await
            .map(|run| run.report);

        Ok(into_tool_result(result))
    }

    #[tool(
        description = "Repository-focused research. Best for understanding codebases and comparing implementations; prefers repo-aware tools such as DeepWiki, Nia and GitHub."
    )]
    async fn pliny_ask_repos(
        &self,
        params: Parameters<AskReposParams>,
    ) -> Result<CallToolResult, McpError> {
        let AskReposParams { query, repos } = params.0;
        tracing::info!(tool = "pliny_ask_repos", "{}", query);

        if query.trim().is_empty() {
            return Ok(CallToolResult::error(vec![Content::text(
                "Error: query must not be empty",
            )]));
        }

        let topic = prompts::repo_query(&query, &repos.unwrap_or_default());
        Ok(into_tool_result(self.orchestrator.research(&topic).await))
    }
}

fn into_tool_result(result: crate::types::Result<String>) -> CallToolResult {
    match result {
        Ok(report) => CallToolResult::success(vec![Content::text(report)]),
        Err(e) => {
            tracing::error!("Tool call failed: {}", e);
            CallToolResult::error(vec![Content::text(format!("Error: {}", e))])
        }
    }
}

#[tool_handler]
impl ServerHandler for PlinyMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "pliny".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Pliny - multi-backend research: pliny_research, pliny_search and pliny_ask_repos"
                    .into(),
            ),
        }
    }
}

/// Serve the orchestrator over stdio until the client disconnects
pub async fn start_stdio_server(orchestrator: Arc<ResearchOrchestrator>) -> crate::types::Result<()> {
    use rmcp::{ServiceExt, transport::io::stdio};

    let server = PlinyMcpServer::new(orchestrator);
    let transport = stdio();

    let service = server
        .serve(transport)
        .await
        .map_err(|e| crate::types::AppError::Internal(format!("MCP server error: {}", e)))?;

    service
        .waiting()
        .await
        .map_err(|e| crate::types::AppError::Internal(format!("MCP server error: {}", e)))?;

    Ok(())
}
