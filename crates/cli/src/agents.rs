use async_trait::async_trait;
use engine_core::{Agent, AgentRegistry, Capabilities};
use model::{AgentError, Batch, ProcessingResult, Record};

/// Builds the agent registry this binary ships with (§9, "Agent registry
/// replaces dynamic class loading"). A real deployment would grow this list
/// at build time with whichever agents that binary is meant to host; this
/// one ships two illustrative agents so the runtime is drivable end to end
/// without any out-of-tree code.
pub fn build_registry() -> AgentRegistry {
    let mut registry = AgentRegistry::new();
    registry.register("uppercase", || Box::new(UppercaseAgent));
    registry.register("passthrough", || Box::new(PassthroughAgent));
    registry
}

/// A processor-only agent: uppercases a string payload, or fails the
/// record if the payload isn't a string. Demonstrates the pass-through
/// source/sink wrappers (§4.2) doing their job around a real `process`.
struct UppercaseAgent;

#[async_trait]
impl Agent for UppercaseAgent {
    fn capabilities(&self) -> Capabilities {
        Capabilities::NONE.with_processor()
    }

    async fn process(&mut self, batch: Batch) -> Result<Vec<ProcessingResult>, AgentError> {
        Ok(batch
            .into_vec()
            .into_iter()
            .map(|record| match record.payload.as_str() {
                Some(text) => {
                    let derived = Record::new(serde_json::Value::String(text.to_uppercase()));
                    ProcessingResult::derived(record, Batch::new(vec![derived]))
                }
                None => {
                    let error = AgentError::msg(format!(
                        "payload is not a string: {}",
                        record.payload
                    ));
                    ProcessingResult::error(record, error)
                }
            })
            .collect())
    }
}

/// An agent with no declared capabilities: every role falls back to the
/// messaging-substrate wrapper (§4.2), so the loop is just a topic-to-topic
/// relay. Useful for exercising the runtime against the memory connector
/// without writing any processing logic at all.
struct PassthroughAgent;

#[async_trait]
impl Agent for PassthroughAgent {
    fn capabilities(&self) -> Capabilities {
        Capabilities::NONE
    }
}
