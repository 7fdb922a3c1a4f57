use connectors::StreamingClusterConfig;
use engine_core::{ErrorHandlerConfiguration, OnFailure};

use crate::{error::ConfigError, schema::PodConfiguration};

/// The pod configuration after eager validation at Runner construction.
/// Everything the Runner needs is already typed and defaulted; no further
/// validation happens once the loop starts.
#[derive(Debug, Clone)]
pub struct ValidatedConfiguration {
    pub streaming_cluster: StreamingClusterConfig,
    pub input_topics: Vec<String>,
    pub output_topics: Vec<String>,
    pub agent_id: String,
    pub class_name: Option<String>,
    pub agent_settings: serde_json::Value,
    pub error_handler: ErrorHandlerConfiguration,
}

impl PodConfiguration {
    /// Validates the configuration, turning it into a
    /// [`ValidatedConfiguration`]. The only checks performed at this layer
    /// are the ones the spec calls fatal-at-startup: a present
    /// `streamingCluster` with a `kind`, and a recognized `onFailure`
    /// value. Whether `className` is required is decided by the Runner,
    /// which alone knows whether an agent instance was injected.
    pub fn validate(&self) -> Result<ValidatedConfiguration, ConfigError> {
        let streaming_cluster = self.streaming_cluster()?;

        let on_failure = match &self.agent.error_handler_configuration.on_failure {
            Some(raw) => OnFailure::parse(raw)
                .ok_or_else(|| ConfigError::InvalidValue("agent.errorHandlerConfiguration.onFailure".into(), raw.clone()))?,
            None => OnFailure::default(),
        };

        let agent_id = format!(
            "{}-{}",
            self.agent.application_id, self.agent.agent_id
        );

        Ok(ValidatedConfiguration {
            streaming_cluster,
            input_topics: self.input.clone(),
            output_topics: self.output.clone(),
            agent_id,
            class_name: self.agent.configuration.class_name().map(str::to_string),
            agent_settings: serde_json::Value::Object(self.agent.configuration.0.clone()),
            error_handler: ErrorHandlerConfiguration {
                retries: self.agent.error_handler_configuration.retries,
                on_failure,
            },
        })
    }

    fn streaming_cluster(&self) -> Result<StreamingClusterConfig, ConfigError> {
        let value = self
            .streaming_cluster
            .clone()
            .ok_or_else(|| ConfigError::MissingField("streamingCluster".into()))?;

        let kind = value
            .get("kind")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ConfigError::MissingField("streamingCluster.kind".into()))?
            .to_string();

        Ok(StreamingClusterConfig::new(kind, value))
    }
}
