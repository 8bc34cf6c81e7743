//! In-memory editor scene.
//!
//! Behaves like an editor's edit-time object model: every primitive comes
//! with a renderer and its default collider, materials are owned per object,
//! creations are recorded for undo, and there is a single selection.

use std::collections::{BTreeMap, HashMap};

use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    Component, ComponentSettings, Material, MaterialId, ObjectId, SceneError, SceneHost, Transform,
};
use crate::catalog::{ComponentKind, PrimitiveKind};

#[derive(Debug, Clone)]
struct SceneObject {
    name: String,
    primitive: PrimitiveKind,
    transform: Transform,
    material: Option<MaterialId>,
    components: Vec<Component>,
}

/// One undoable creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UndoRecord {
    pub label: String,
    pub object: ObjectId,
}

#[derive(Debug)]
pub struct EditorScene {
    objects: BTreeMap<ObjectId, SceneObject>,
    materials: HashMap<MaterialId, Material>,
    next_object: u64,
    next_material: u64,
    max_objects: usize,
    undo_stack: Vec<UndoRecord>,
    selection: Option<ObjectId>,
    framed: Option<ObjectId>,
}

impl Default for EditorScene {
    fn default() -> Self {
        Self::new(usize::MAX)
    }
}

impl EditorScene {
    pub fn new(max_objects: usize) -> Self {
        Self {
            objects: BTreeMap::new(),
            materials: HashMap::new(),
            next_object: 1,
            next_material: 1,
            max_objects,
            undo_stack: Vec::new(),
            selection: None,
            framed: None,
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn contains(&self, object: ObjectId) -> bool {
        self.objects.contains_key(&object)
    }

    pub fn selection(&self) -> Option<ObjectId> {
        self.selection
    }

    pub fn framed(&self) -> Option<ObjectId> {
        self.framed
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn material_of(&self, object: ObjectId) -> Option<(MaterialId, &Material)> {
        let id = self.objects.get(&object)?.material?;
        self.materials.get(&id).map(|m| (id, m))
    }

    pub fn transform(&self, object: ObjectId) -> Option<Transform> {
        self.objects.get(&object).map(|o| o.transform)
    }

    pub fn components(&self, object: ObjectId) -> &[Component] {
        self.objects
            .get(&object)
            .map(|o| o.components.as_slice())
            .unwrap_or_default()
    }

    /// Number of components of `kind` on the object.
    pub fn component_count(&self, object: ObjectId, kind: ComponentKind) -> usize {
        self.components(object)
            .iter()
            .filter(|c| c.kind == kind)
            .count()
    }

    pub fn component(&self, object: ObjectId, kind: ComponentKind) -> Option<&Component> {
        self.components(object).iter().find(|c| c.kind == kind)
    }

    /// Revert the most recent creation. Returns what was undone.
    pub fn undo(&mut self) -> Option<UndoRecord> {
        let record = self.undo_stack.pop()?;
        self.destroy(record.object);
        debug!("Undid '{}'", record.label);
        Some(record)
    }

    fn destroy(&mut self, object: ObjectId) {
        if let Some(removed) = self.objects.remove(&object)
            && let Some(material) = removed.material
        {
            self.materials.remove(&material);
        }
        if self.selection == Some(object) {
            self.selection = None;
        }
        if self.framed == Some(object) {
            self.framed = None;
        }
    }

    fn object_mut(&mut self, object: ObjectId) -> Result<&mut SceneObject, SceneError> {
        self.objects
            .get_mut(&object)
            .ok_or(SceneError::ObjectNotFound(object))
    }

    pub fn snapshot_object(&self, object: ObjectId) -> Option<ObjectSnapshot> {
        let obj = self.objects.get(&object)?;
        let (y, x, z) = obj.transform.rotation.to_euler(EulerRot::YXZ);
        Some(ObjectSnapshot {
            id: object,
            name: obj.name.clone(),
            primitive: obj.primitive,
            position: obj.transform.position.to_array(),
            rotation_degrees: [x.to_degrees(), y.to_degrees(), z.to_degrees()],
            rotation: obj.transform.rotation.to_array(),
            scale: obj.transform.scale.to_array(),
            material: obj
                .material
                .and_then(|id| self.materials.get(&id))
                .cloned(),
            components: obj.components.clone(),
        })
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        let objects: Vec<ObjectSnapshot> = self
            .objects
            .keys()
            .filter_map(|id| self.snapshot_object(*id))
            .collect();
        SceneSnapshot {
            object_count: objects.len(),
            selection: self.selection,
            objects,
        }
    }
}

impl SceneHost for EditorScene {
    fn instantiate(&mut self, primitive: PrimitiveKind) -> Result<ObjectId, SceneError> {
        if self.objects.len() >= self.max_objects {
            return Err(SceneError::LimitReached {
                limit: self.max_objects,
            });
        }

        let id = ObjectId(self.next_object);
        self.next_object += 1;
        self.objects.insert(
            id,
            SceneObject {
                name: primitive.as_str().to_string(),
                primitive,
                transform: Transform::default(),
                material: None,
                components: vec![Component::new(primitive.default_collider())],
            },
        );
        Ok(id)
    }

    fn set_name(&mut self, object: ObjectId, name: &str) -> Result<(), SceneError> {
        self.object_mut(object)?.name = name.to_string();
        Ok(())
    }

    fn set_position(&mut self, object: ObjectId, position: Vec3) -> Result<(), SceneError> {
        self.object_mut(object)?.transform.position = position;
        Ok(())
    }

    fn set_rotation(&mut self, object: ObjectId, rotation: Quat) -> Result<(), SceneError> {
        self.object_mut(object)?.transform.rotation = rotation;
        Ok(())
    }

    fn set_scale(&mut self, object: ObjectId, scale: Vec3) -> Result<(), SceneError> {
        self.object_mut(object)?.transform.scale = scale;
        Ok(())
    }

    fn has_renderer(&self, object: ObjectId) -> bool {
        self.objects.contains_key(&object)
    }

    fn assign_material(
        &mut self,
        object: ObjectId,
        material: Material,
    ) -> Result<MaterialId, SceneError> {
        let id = MaterialId(self.next_material);
        let previous = self.object_mut(object)?.material.replace(id);
        self.next_material += 1;
        if let Some(previous) = previous {
            self.materials.remove(&previous);
        }
        self.materials.insert(id, material);
        Ok(id)
    }

    fn has_component(&self, object: ObjectId, kind: ComponentKind) -> bool {
        self.component(object, kind).is_some()
    }

    fn add_component(&mut self, object: ObjectId, kind: ComponentKind) -> Result<(), SceneError> {
        self.object_mut(object)?.components.push(Component::new(kind));
        Ok(())
    }

    fn configure_component(
        &mut self,
        object: ObjectId,
        kind: ComponentKind,
        settings: ComponentSettings,
    ) -> Result<(), SceneError> {
        if !settings.fits(kind) {
            return Err(SceneError::SettingsMismatch {
                component: kind.as_str(),
                kind: settings,
            });
        }
        let component = self
            .object_mut(object)?
            .components
            .iter_mut()
            .find(|c| c.kind == kind)
            .ok_or_else(|| SceneError::Refused(format!("no {} on {}", kind.as_str(), object)))?;
        component.settings = Some(settings);
        Ok(())
    }

    fn register_created(&mut self, object: ObjectId, label: &str) {
        self.undo_stack.push(UndoRecord {
            label: label.to_string(),
            object,
        });
    }

    fn select(&mut self, object: ObjectId) {
        if self.objects.contains_key(&object) {
            self.selection = Some(object);
        }
    }

    fn frame(&mut self, object: ObjectId) {
        if self.objects.contains_key(&object) {
            self.framed = Some(object);
        }
    }

    fn object_name(&self, object: ObjectId) -> Option<String> {
        self.objects.get(&object).map(|o| o.name.clone())
    }
}

/// Serializable view of one object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSnapshot {
    pub id: ObjectId,
    pub name: String,
    pub primitive: PrimitiveKind,
    pub position: [f32; 3],
    pub rotation_degrees: [f32; 3],
    /// Quaternion as `[x, y, z, w]`.
    pub rotation: [f32; 4],
    pub scale: [f32; 3],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material: Option<Material>,
    pub components: Vec<Component>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub object_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<ObjectId>,
    pub objects: Vec<ObjectSnapshot>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::LightType;

    #[test]
    fn instantiate_uses_engine_defaults() {
        let mut scene = EditorScene::default();
        let id = scene.instantiate(PrimitiveKind::Sphere).unwrap();

        assert_eq!(scene.object_name(id).as_deref(), Some("Sphere"));
        assert_eq!(scene.transform(id), Some(Transform::default()));
        assert!(scene.has_renderer(id));
        assert!(scene.has_component(id, ComponentKind::SphereCollider));
        assert!(scene.material_of(id).is_none());
    }

    #[test]
    fn object_limit_refuses_instantiation() {
        let mut scene = EditorScene::new(1);
        scene.instantiate(PrimitiveKind::Cube).unwrap();
        assert_eq!(
            scene.instantiate(PrimitiveKind::Cube),
            Err(SceneError::LimitReached { limit: 1 })
        );
    }

    #[test]
    fn materials_are_never_shared() {
        let mut scene = EditorScene::default();
        let a = scene.instantiate(PrimitiveKind::Cube).unwrap();
        let b = scene.instantiate(PrimitiveKind::Cube).unwrap();
        let red = Material {
            name: "redMaterial".into(),
            color: [1.0, 0.0, 0.0, 1.0],
        };

        let ma = scene.assign_material(a, red.clone()).unwrap();
        let mb = scene.assign_material(b, red).unwrap();
        assert_ne!(ma, mb);
        assert_eq!(scene.material_count(), 2);

        // reassigning frees the old instance
        let ma2 = scene
            .assign_material(
                a,
                Material {
                    name: "blueMaterial".into(),
                    color: [0.0, 0.0, 1.0, 1.0],
                },
            )
            .unwrap();
        assert_ne!(ma, ma2);
        assert_eq!(scene.material_count(), 2);
    }

    #[test]
    fn configure_rejects_mismatched_settings() {
        let mut scene = EditorScene::default();
        let id = scene.instantiate(PrimitiveKind::Cube).unwrap();
        let err = scene
            .configure_component(
                id,
                ComponentKind::BoxCollider,
                ComponentSettings::Light {
                    light_type: LightType::Spot,
                    intensity: 2.0,
                },
            )
            .unwrap_err();
        assert!(matches!(err, SceneError::SettingsMismatch { .. }));
    }

    #[test]
    fn configure_requires_attached_component() {
        let mut scene = EditorScene::default();
        let id = scene.instantiate(PrimitiveKind::Cube).unwrap();
        let err = scene
            .configure_component(
                id,
                ComponentKind::Rigidbody,
                ComponentSettings::Rigidbody {
                    mass: 2.0,
                    use_gravity: false,
                },
            )
            .unwrap_err();
        assert!(matches!(err, SceneError::Refused(_)));
    }

    #[test]
    fn undo_removes_last_creation() {
        let mut scene = EditorScene::default();
        let first = scene.instantiate(PrimitiveKind::Cube).unwrap();
        scene.register_created(first, "Create Cube");
        let second = scene.instantiate(PrimitiveKind::Plane).unwrap();
        scene
            .assign_material(
                second,
                Material {
                    name: "grayMaterial".into(),
                    color: [0.5, 0.5, 0.5, 1.0],
                },
            )
            .unwrap();
        scene.register_created(second, "Create Plane");
        scene.select(second);
        scene.frame(second);

        let undone = scene.undo().unwrap();
        assert_eq!(undone.object, second);
        assert_eq!(undone.label, "Create Plane");
        assert!(!scene.contains(second));
        assert!(scene.contains(first));
        assert_eq!(scene.selection(), None);
        assert_eq!(scene.framed(), None);
        assert_eq!(scene.material_count(), 0);

        assert_eq!(scene.undo().map(|r| r.object), Some(first));
        assert!(scene.undo().is_none());
        assert!(scene.is_empty());
    }

    #[test]
    fn snapshot_reports_euler_degrees() {
        let mut scene = EditorScene::default();
        let id = scene.instantiate(PrimitiveKind::Quad).unwrap();
        let rotation = Quat::from_euler(EulerRot::YXZ, 90f32.to_radians(), 0.0, 0.0);
        scene.set_rotation(id, rotation).unwrap();

        let snap = scene.snapshot_object(id).unwrap();
        assert!((snap.rotation_degrees[1] - 90.0).abs() < 1e-3);
        assert!(snap.rotation_degrees[0].abs() < 1e-3);

        let all = scene.snapshot();
        assert_eq!(all.object_count, 1);
        assert_eq!(all.objects[0].components[0].kind, ComponentKind::MeshCollider);
    }
}
