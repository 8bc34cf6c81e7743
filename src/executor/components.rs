//! Component capabilities: attach-or-reuse and property application.

use thiserror::Error;

use crate::catalog::{ComponentKind, resolve_light_type};
use crate::command::Properties;
use crate::scene::{ComponentSettings, ObjectId, SceneError, SceneHost};

/// A single component could not be attached or configured.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind:?}: {source}")]
pub struct ComponentError {
    pub kind: ComponentKind,
    #[source]
    pub source: SceneError,
}

/// How a component ended up on the object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attachment {
    Added,
    Reused,
}

pub trait ComponentCapability {
    /// Make sure exactly one component of this kind is on the object.
    fn attach_or_reuse<H: SceneHost + ?Sized>(
        &self,
        host: &mut H,
        object: ObjectId,
    ) -> Result<Attachment, ComponentError>;

    /// Push the relevant subset of `properties` onto the component.
    fn apply_properties<H: SceneHost + ?Sized>(
        &self,
        host: &mut H,
        object: ObjectId,
        properties: &Properties,
    ) -> Result<(), ComponentError>;
}

impl ComponentKind {
    /// Settings this kind takes from the property bag, if any.
    pub fn settings_from(&self, properties: &Properties) -> Option<ComponentSettings> {
        match self {
            Self::Rigidbody => Some(ComponentSettings::Rigidbody {
                mass: properties.mass,
                use_gravity: properties.use_gravity,
            }),
            k if k.is_collider() => Some(ComponentSettings::Collider {
                is_trigger: properties.is_trigger,
            }),
            Self::Light => Some(ComponentSettings::Light {
                light_type: resolve_light_type(&properties.light_type),
                intensity: properties.intensity,
            }),
            _ => None,
        }
    }
}

impl ComponentCapability for ComponentKind {
    fn attach_or_reuse<H: SceneHost + ?Sized>(
        &self,
        host: &mut H,
        object: ObjectId,
    ) -> Result<Attachment, ComponentError> {
        if host.has_component(object, *self) {
            return Ok(Attachment::Reused);
        }
        host.add_component(object, *self)
            .map_err(|source| ComponentError {
                kind: *self,
                source,
            })?;
        Ok(Attachment::Added)
    }

    fn apply_properties<H: SceneHost + ?Sized>(
        &self,
        host: &mut H,
        object: ObjectId,
        properties: &Properties,
    ) -> Result<(), ComponentError> {
        let Some(settings) = self.settings_from(properties) else {
            return Ok(());
        };
        host.configure_component(object, *self, settings)
            .map_err(|source| ComponentError {
                kind: *self,
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{LightType, PrimitiveKind};
    use crate::scene::EditorScene;

    #[test]
    fn reattach_reuses_existing_component() {
        let mut scene = EditorScene::default();
        let id = scene.instantiate(PrimitiveKind::Cube).unwrap();

        // cubes come with a box collider
        assert_eq!(
            ComponentKind::BoxCollider.attach_or_reuse(&mut scene, id),
            Ok(Attachment::Reused)
        );
        assert_eq!(
            ComponentKind::Rigidbody.attach_or_reuse(&mut scene, id),
            Ok(Attachment::Added)
        );
        assert_eq!(
            ComponentKind::Rigidbody.attach_or_reuse(&mut scene, id),
            Ok(Attachment::Reused)
        );
        assert_eq!(scene.component_count(id, ComponentKind::Rigidbody), 1);
    }

    #[test]
    fn light_consumes_intensity_and_type() {
        let mut scene = EditorScene::default();
        let id = scene.instantiate(PrimitiveKind::Sphere).unwrap();
        let props = Properties {
            intensity: 4.0,
            light_type: "spot".into(),
            ..Properties::default()
        };

        ComponentKind::Light.attach_or_reuse(&mut scene, id).unwrap();
        ComponentKind::Light
            .apply_properties(&mut scene, id, &props)
            .unwrap();

        assert_eq!(
            scene.component(id, ComponentKind::Light).unwrap().settings,
            Some(ComponentSettings::Light {
                light_type: LightType::Spot,
                intensity: 4.0,
            })
        );
    }

    #[test]
    fn character_controller_is_a_collider() {
        let props = Properties {
            is_trigger: true,
            ..Properties::default()
        };
        assert_eq!(
            ComponentKind::CharacterController.settings_from(&props),
            Some(ComponentSettings::Collider { is_trigger: true })
        );
        assert_eq!(ComponentKind::Camera.settings_from(&props), None);
        assert_eq!(ComponentKind::AudioSource.settings_from(&props), None);
    }
}
