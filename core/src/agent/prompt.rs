//! Prompt templates for the pipeline agent

use crate::error::Result;
use handlebars::Handlebars;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Built-in system prompt
pub const SYSTEM_PROMPT: &str = r#"You are a Harness.io pipeline and connector expert. Your role is to help users create
pipelines in the Harness V0 format and connector YAML configurations for Harness.io based on their requirements.

You have access to Harness.io tools that can help you:
- Create pipelines with Harness V0 format
- Create connectors
- List existing pipelines and connectors
- Get pipeline/connector details
- Validate configurations

When a user asks you to generate a pipeline or connector:
1. Understand their requirements clearly
2. Use the appropriate tools to interact with Harness.io
3. Generate or retrieve the YAML configuration in V0 format, following the schema at https://raw.githubusercontent.com/harness/harness-schema/refs/heads/main/v0/pipeline.json
4. Return the YAML in a clean, well-formatted manner

Basic pipeline structure:

pipeline:
    name: YAML Example ## A name for the pipeline.
    identifier: YAML_Example ## A unique Id for the pipeline.
    projectIdentifier: default ## Specify the project this pipeline belongs to.
    orgIdentifier: default ## Specify the organization this pipeline belongs to.
    description:
    stages: ## Contains the stage definitions.
        - stage:
            ...
        - stage:
            ...
    notificationRules:
    flowControl:
    properties:
    timeout:
    variables: ## Contains pipeline variables. Stage and step variables are defined within their own sections.
        -

Provide only the YAML configuration as the response, no other text or explanation."#;

const PIPELINE_TEMPLATE: &str = "Generate a Harness.io pipeline YAML based on the following request:

{{request}}

Please create the appropriate pipeline configuration and return it as YAML.";

const CONNECTOR_TEMPLATE: &str = "Generate a Harness.io connector YAML based on the following request:

{{request}}

Please create the appropriate connector configuration and return it as YAML.";

const GENERAL_TEMPLATE: &str = "{{request}}";

/// What the user is asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    Pipeline,
    Connector,
    General,
}

impl RequestKind {
    fn template_name(self) -> &'static str {
        match self {
            RequestKind::Pipeline => "pipeline",
            RequestKind::Connector => "connector",
            RequestKind::General => "general",
        }
    }
}

/// Compiled user-prompt templates
pub struct PromptTemplates {
    registry: Handlebars<'static>,
}

impl PromptTemplates {
    pub fn new() -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(handlebars::no_escape);
        for (kind, template) in [
            (RequestKind::Pipeline, PIPELINE_TEMPLATE),
            (RequestKind::Connector, CONNECTOR_TEMPLATE),
            (RequestKind::General, GENERAL_TEMPLATE),
        ] {
            registry.register_template_string(kind.template_name(), template)?;
        }
        Ok(Self { registry })
    }

    /// Render the user message for a request
    pub fn render(&self, kind: RequestKind, request: &str) -> Result<String> {
        Ok(self
            .registry
            .render(kind.template_name(), &json!({ "request": request }))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_prompt_wraps_request() {
        let templates = PromptTemplates::new().unwrap();
        let prompt = templates
            .render(RequestKind::Pipeline, "CI for a Python app with build & test")
            .unwrap();
        assert!(prompt.starts_with("Generate a Harness.io pipeline YAML"));
        assert!(prompt.contains("CI for a Python app with build & test"));
        assert!(prompt.ends_with("return it as YAML."));
    }

    #[test]
    fn test_connector_prompt() {
        let templates = PromptTemplates::new().unwrap();
        let prompt = templates
            .render(RequestKind::Connector, "GitHub connector for <myorg/myrepo>")
            .unwrap();
        assert!(prompt.contains("connector YAML"));
        assert!(prompt.contains("<myorg/myrepo>"));
    }

    #[test]
    fn test_general_request_is_passed_through() {
        let templates = PromptTemplates::new().unwrap();
        assert_eq!(
            templates
                .render(RequestKind::General, "List all pipelines")
                .unwrap(),
            "List all pipelines"
        );
    }
}
