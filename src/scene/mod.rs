//! Scene host abstraction.
//!
//! The executor never touches a concrete scene graph. It drives a
//! [`SceneHost`], which exposes exactly the single-call mutations an editor
//! offers: instantiate a primitive, set transform parts, assign a material,
//! attach and configure components, record undo, select, frame.

mod editor;

pub use editor::{EditorScene, ObjectSnapshot, SceneSnapshot, UndoRecord};

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{ComponentKind, LightType, PrimitiveKind, Rgba};

/// Stable handle to a scene object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialId(pub u64);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub color: Rgba,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

/// Per-kind component configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ComponentSettings {
    Rigidbody { mass: f32, use_gravity: bool },
    Collider { is_trigger: bool },
    Light { light_type: LightType, intensity: f32 },
}

impl ComponentSettings {
    /// Whether these settings can be applied to a component of `kind`.
    pub fn fits(&self, kind: ComponentKind) -> bool {
        match self {
            Self::Rigidbody { .. } => kind == ComponentKind::Rigidbody,
            Self::Collider { .. } => kind.is_collider(),
            Self::Light { .. } => kind == ComponentKind::Light,
        }
    }
}

/// Settings a freshly attached component starts with.
pub fn initial_settings(kind: ComponentKind) -> Option<ComponentSettings> {
    match kind {
        ComponentKind::Rigidbody => Some(ComponentSettings::Rigidbody {
            mass: 1.0,
            use_gravity: true,
        }),
        k if k.is_collider() => Some(ComponentSettings::Collider { is_trigger: false }),
        ComponentKind::Light => Some(ComponentSettings::Light {
            light_type: LightType::Point,
            intensity: 1.0,
        }),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub kind: ComponentKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<ComponentSettings>,
}

impl Component {
    pub fn new(kind: ComponentKind) -> Self {
        Self {
            kind,
            settings: initial_settings(kind),
        }
    }
}

/// Notification of a scene change, for mirrors such as the viewer.
#[derive(Debug, Clone)]
pub enum SceneEvent {
    Upserted(ObjectSnapshot),
    Removed(ObjectId),
    Framed(ObjectId),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error("object {0} does not exist")]
    ObjectNotFound(ObjectId),

    #[error("scene object limit of {limit} reached")]
    LimitReached { limit: usize },

    #[error("{kind:?} settings do not apply to a {component}")]
    SettingsMismatch {
        component: &'static str,
        kind: ComponentSettings,
    },

    #[error("host refused: {0}")]
    Refused(String),
}

/// Mutations the executor needs from an editable scene.
///
/// Implementations are driven from a single thread; no method is expected
/// to be called concurrently with another.
#[cfg_attr(test, mockall::automock)]
pub trait SceneHost {
    fn instantiate(&mut self, primitive: PrimitiveKind) -> Result<ObjectId, SceneError>;

    fn set_name(&mut self, object: ObjectId, name: &str) -> Result<(), SceneError>;

    fn set_position(&mut self, object: ObjectId, position: Vec3) -> Result<(), SceneError>;

    fn set_rotation(&mut self, object: ObjectId, rotation: Quat) -> Result<(), SceneError>;

    fn set_scale(&mut self, object: ObjectId, scale: Vec3) -> Result<(), SceneError>;

    fn has_renderer(&self, object: ObjectId) -> bool;

    /// Assign a brand-new material instance to the object's renderer.
    fn assign_material(
        &mut self,
        object: ObjectId,
        material: Material,
    ) -> Result<MaterialId, SceneError>;

    fn has_component(&self, object: ObjectId, kind: ComponentKind) -> bool;

    fn add_component(&mut self, object: ObjectId, kind: ComponentKind) -> Result<(), SceneError>;

    fn configure_component(
        &mut self,
        object: ObjectId,
        kind: ComponentKind,
        settings: ComponentSettings,
    ) -> Result<(), SceneError>;

    /// Record the creation of `object` so that it can be undone.
    fn register_created(&mut self, object: ObjectId, label: &str);

    fn select(&mut self, object: ObjectId);

    /// Ask the viewport to bring `object` into view.
    fn frame(&mut self, object: ObjectId);

    fn object_name(&self, object: ObjectId) -> Option<String>;
}
