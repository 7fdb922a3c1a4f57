use serde::Deserialize;

/// The pod configuration as it is authored (YAML or JSON): the raw,
/// untyped shape described in §6 of the spec, before eager validation
/// turns it into a [`crate::validated::ValidatedConfiguration`].
#[derive(Debug, Clone, Deserialize)]
pub struct PodConfiguration {
    #[serde(rename = "streamingCluster")]
    pub streaming_cluster: Option<serde_json::Value>,

    #[serde(default)]
    pub input: Vec<String>,

    #[serde(default)]
    pub output: Vec<String>,

    pub agent: AgentSchema,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentSchema {
    #[serde(rename = "applicationId")]
    pub application_id: String,

    #[serde(rename = "agentId")]
    pub agent_id: String,

    #[serde(default)]
    pub configuration: AgentClassSchema,

    #[serde(rename = "errorHandlerConfiguration", default)]
    pub error_handler_configuration: ErrorHandlerSchema,
}

/// `agent.configuration` in full, including `className`. Passed verbatim
/// to the agent's `init`; the runtime only ever reads `className` out of
/// it itself.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AgentClassSchema(#[serde(default)] pub serde_json::Map<String, serde_json::Value>);

impl AgentClassSchema {
    pub fn class_name(&self) -> Option<&str> {
        self.0.get("className").and_then(|v| v.as_str())
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ErrorHandlerSchema {
    #[serde(default)]
    pub retries: u64,

    #[serde(rename = "onFailure", default)]
    pub on_failure: Option<String>,
}
