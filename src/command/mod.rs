//! Scene-edit command schema.
//!
//! A [`Command`] mirrors the JSON the language model is asked to produce.
//! Every field except `action` is optional and nothing here validates
//! values: unknown primitive, colour or component names are carried as
//! given and resolved (or defaulted) when the command is executed.

mod parse;

pub use parse::{ParseError, parse};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The only action the executor understands.
pub const CREATE_OBJECT: &str = "create_object";

/// Typed form of the `action` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateObject,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateObject => CREATE_OBJECT,
        }
    }
}

/// `action` was missing or named something we cannot do.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("command has no action")]
    MissingAction,

    #[error("unrecognized action '{0}'")]
    UnknownAction(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Command {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primitive: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Vec<f32>>,

    /// Euler angles in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Vec<f32>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<Vec<f32>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
}

/// Settings consumed by components. Missing or `null` keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "PropertiesWire")]
pub struct Properties {
    pub mass: f32,
    pub use_gravity: bool,
    pub is_trigger: bool,
    pub intensity: f32,
    pub light_type: String,
}

/// What a model actually sends: any key may be absent or `null`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PropertiesWire {
    #[serde(default)]
    mass: Option<f32>,
    #[serde(default)]
    use_gravity: Option<bool>,
    #[serde(default)]
    is_trigger: Option<bool>,
    #[serde(default)]
    intensity: Option<f32>,
    #[serde(default)]
    light_type: Option<String>,
}

impl From<PropertiesWire> for Properties {
    fn from(wire: PropertiesWire) -> Self {
        Self {
            mass: wire.mass.unwrap_or_else(default_mass),
            use_gravity: wire.use_gravity.unwrap_or_else(default_true),
            is_trigger: wire.is_trigger.unwrap_or_default(),
            intensity: wire.intensity.unwrap_or_else(default_intensity),
            light_type: wire.light_type.unwrap_or_else(default_light_type),
        }
    }
}

impl Default for Properties {
    fn default() -> Self {
        Self {
            mass: default_mass(),
            use_gravity: default_true(),
            is_trigger: false,
            intensity: default_intensity(),
            light_type: default_light_type(),
        }
    }
}

fn default_mass() -> f32 {
    1.0
}
fn default_true() -> bool {
    true
}
fn default_intensity() -> f32 {
    1.0
}
fn default_light_type() -> String {
    "Directional".to_string()
}

impl Command {
    /// Start a `create_object` command for the given primitive.
    pub fn create_object(primitive: &str) -> Self {
        Self {
            action: Some(CREATE_OBJECT.to_string()),
            primitive: Some(primitive.to_string()),
            ..Self::default()
        }
    }

    pub fn action(&self) -> Result<Action, DispatchError> {
        match self.action.as_deref().map(str::trim) {
            None | Some("") => Err(DispatchError::MissingAction),
            Some(CREATE_OBJECT) => Ok(Action::CreateObject),
            Some(other) => Err(DispatchError::UnknownAction(other.to_string())),
        }
    }

    /// Display name, if one was given and it is not blank.
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }

    pub fn component_names(&self) -> &[String] {
        self.components.as_deref().unwrap_or_default()
    }

    /// The property bag with defaults filled in.
    pub fn resolved_properties(&self) -> Properties {
        self.properties.clone().unwrap_or_default()
    }
}

/// First three elements of an optional vector; `None` if absent or short.
pub fn vec3(values: Option<&[f32]>) -> Option<glam::Vec3> {
    match values {
        Some([x, y, z, ..]) => Some(glam::Vec3::new(*x, *y, *z)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_dispatch() {
        assert_eq!(
            Command::create_object("Cube").action(),
            Ok(Action::CreateObject)
        );
        assert_eq!(
            Command::default().action(),
            Err(DispatchError::MissingAction)
        );

        let cmd = Command {
            action: Some("delete_object".into()),
            ..Command::default()
        };
        assert_eq!(
            cmd.action(),
            Err(DispatchError::UnknownAction("delete_object".into()))
        );
    }

    #[test]
    fn blank_name_is_no_name() {
        let mut cmd = Command::create_object("Cube");
        cmd.name = Some("   ".into());
        assert_eq!(cmd.display_name(), None);
        cmd.name = Some("Crate".into());
        assert_eq!(cmd.display_name(), Some("Crate"));
    }

    #[test]
    fn short_vectors_are_ignored() {
        assert_eq!(vec3(None), None);
        assert_eq!(vec3(Some(&[1.0, 2.0])), None);
        assert_eq!(
            vec3(Some(&[1.0, 2.0, 3.0, 4.0])),
            Some(glam::Vec3::new(1.0, 2.0, 3.0))
        );
    }

    #[test]
    fn missing_properties_resolve_to_defaults() {
        let props = Command::create_object("Cube").resolved_properties();
        assert_eq!(props.mass, 1.0);
        assert!(props.use_gravity);
        assert!(!props.is_trigger);
        assert_eq!(props.intensity, 1.0);
        assert_eq!(props.light_type, "Directional");
    }

    #[test]
    fn null_properties_resolve_to_defaults() {
        let cmd = parse(
            r#"{"action":"create_object","components":["Rigidbody"],
                "properties":{"mass":null,"useGravity":null,"isTrigger":null,"intensity":2,"lightType":null}}"#,
        )
        .unwrap();
        let props = cmd.resolved_properties();
        assert_eq!(props.mass, 1.0);
        assert!(props.use_gravity);
        assert!(!props.is_trigger);
        assert_eq!(props.intensity, 2.0);
        assert_eq!(props.light_type, "Directional");

        let cmd = parse(r#"{"action":"create_object","properties":{"mass":null,"useGravity":true}}"#)
            .unwrap();
        assert_eq!(cmd.resolved_properties(), Properties::default());
    }
}
