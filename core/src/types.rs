//! Domain inputs for Carrot actions.
//!
//! # Design
//! Properties are JSON objects owned by each `Action` value, so every call
//! starts from its own empty map. They are encoded with serde_json's compact
//! writer (no spaces after `,` or `:`) because the encoded text is part of the
//! signed parameter string.

use serde::{Deserialize, Serialize};

/// Free-form properties attached to an action or its object.
pub type Properties = serde_json::Map<String, serde_json::Value>;

/// An Open Graph style action performed by a user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub action_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_instance_id: Option<String>,
    #[serde(default)]
    pub action_properties: Properties,
    #[serde(default)]
    pub object_properties: Properties,
}

impl Action {
    /// An action with no object instance and empty properties.
    pub fn new(action_id: &str) -> Self {
        Action {
            action_id: action_id.to_string(),
            ..Default::default()
        }
    }

    pub fn with_object_instance(mut self, object_instance_id: &str) -> Self {
        self.object_instance_id = Some(object_instance_id.to_string());
        self
    }

    pub fn with_action_properties(mut self, properties: Properties) -> Self {
        self.action_properties = properties;
        self
    }

    pub fn with_object_properties(mut self, properties: Properties) -> Self {
        self.object_properties = properties;
        self
    }
}

/// Compact JSON text of a property map.
pub fn compact_json(properties: &Properties) -> serde_json::Result<String> {
    serde_json::to_string(properties)
}
