//! Bevy side of the viewer: default scene, event processing, framing.

use bevy::prelude::*;
use tokio::sync::mpsc::error::TryRecvError;

use super::ViewerChannels;
use super::registry::*;
use crate::catalog::{ComponentKind, LightType, PrimitiveKind};
use crate::scene::{ComponentSettings, ObjectId, ObjectSnapshot, SceneEvent};

/// Colour of objects that were created without a colour.
const UNPAINTED: Color = Color::srgb(0.8, 0.8, 0.8);

/// Bevy resource wrapping the channel endpoint.
#[derive(Resource)]
pub struct SceneEventRes {
    channels: ViewerChannels,
}

/// Marker for the camera that framing moves.
#[derive(Component)]
pub struct MainCamera;

/// Initialize the viewer world: channel, default scene, systems.
pub fn setup_viewer_app(app: &mut App, channels: ViewerChannels) {
    app.insert_resource(SceneEventRes { channels })
        .init_resource::<ObjectRegistry>()
        .add_systems(Startup, setup_default_scene)
        .add_systems(Update, process_scene_events);
}

/// Default scene: ground plane, camera, directional light.
fn setup_default_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::new(Vec3::Y, Vec2::new(25.0, 25.0)))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgba(0.3, 0.3, 0.3, 1.0),
            perceptual_roughness: 0.9,
            ..default()
        })),
        Transform::from_xyz(0.0, -0.001, 0.0),
        Name::new("ground"),
    ));

    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(6.0, 5.0, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
        Name::new("main_camera"),
        MainCamera,
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: 10_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 8.0, 4.0).looking_at(Vec3::ZERO, Vec3::Y),
        Name::new("main_light"),
    ));
}

/// Drain the event channel each frame.
fn process_scene_events(
    mut channel_res: ResMut<SceneEventRes>,
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut registry: ResMut<ObjectRegistry>,
    mut cameras: Query<&mut Transform, With<MainCamera>>,
    mut exit: EventWriter<AppExit>,
) {
    loop {
        let event = match channel_res.channels.events.try_recv() {
            Ok(event) => event,
            Err(TryRecvError::Empty) => break,
            Err(TryRecvError::Disconnected) => {
                info!("Session ended, closing viewer");
                exit.send(AppExit::Success);
                break;
            }
        };

        match event {
            SceneEvent::Upserted(snapshot) => {
                let transform = object_transform(&snapshot);
                let entity = spawn_object(
                    &snapshot,
                    transform,
                    &mut commands,
                    &mut meshes,
                    &mut materials,
                );
                if let Some(previous) = registry.insert(snapshot.id, entity, transform) {
                    commands.entity(previous).despawn_recursive();
                }
            }
            SceneEvent::Removed(id) => {
                if let Some(entity) = registry.remove_by_object(id) {
                    commands.entity(entity).despawn_recursive();
                }
            }
            SceneEvent::Framed(id) => frame_object(id, &registry, &mut cameras),
        }
    }
}

fn frame_object(
    id: ObjectId,
    registry: &ObjectRegistry,
    cameras: &mut Query<&mut Transform, With<MainCamera>>,
) {
    let Some(tracked) = registry.get(id) else {
        warn!("Cannot frame {}: not in the viewer", id);
        return;
    };
    for mut camera in cameras.iter_mut() {
        *camera = frame_pose(&tracked.transform);
    }
}

/// Camera pose looking at `target` from a distance that fits its scale.
pub fn frame_pose(target: &Transform) -> Transform {
    let extent = target.scale.abs().max_element().max(0.1);
    let distance = extent * 3.0 + 2.0;
    let eye = target.translation + Vec3::new(1.0, 0.8, 1.0).normalize() * distance;
    Transform::from_translation(eye).looking_at(target.translation, Vec3::Y)
}

pub fn object_transform(snapshot: &ObjectSnapshot) -> Transform {
    Transform {
        translation: Vec3::from_array(snapshot.position),
        rotation: Quat::from_array(snapshot.rotation),
        scale: Vec3::from_array(snapshot.scale),
    }
}

/// Mesh matching the editor's built-in primitive of each kind.
pub fn primitive_mesh(kind: PrimitiveKind) -> Mesh {
    match kind {
        PrimitiveKind::Cube => Mesh::from(Cuboid::new(1.0, 1.0, 1.0)),
        PrimitiveKind::Sphere => Sphere::new(0.5).mesh().uv(32, 18),
        // total height 2: 1 of cylinder plus two 0.5 caps
        PrimitiveKind::Capsule => Mesh::from(Capsule3d::new(0.5, 1.0)),
        PrimitiveKind::Cylinder => Mesh::from(Cylinder::new(0.5, 2.0)),
        PrimitiveKind::Plane => Mesh::from(Plane3d::new(Vec3::Y, Vec2::new(5.0, 5.0))),
        PrimitiveKind::Quad => Mesh::from(Rectangle::new(1.0, 1.0)),
    }
}

fn spawn_object(
    snapshot: &ObjectSnapshot,
    transform: Transform,
    commands: &mut Commands,
    meshes: &mut ResMut<Assets<Mesh>>,
    materials: &mut ResMut<Assets<StandardMaterial>>,
) -> Entity {
    let base_color = snapshot
        .material
        .as_ref()
        .map(|m| Color::srgba(m.color[0], m.color[1], m.color[2], m.color[3]))
        .unwrap_or(UNPAINTED);

    let mut entity = commands.spawn((
        Mesh3d(meshes.add(primitive_mesh(snapshot.primitive))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color,
            ..default()
        })),
        transform,
        Name::new(snapshot.name.clone()),
    ));

    entity.with_children(|parent| {
        for component in &snapshot.components {
            match (component.kind, component.settings) {
                (
                    ComponentKind::Light,
                    Some(ComponentSettings::Light {
                        light_type,
                        intensity,
                    }),
                ) => spawn_light(parent, light_type, intensity),
                (ComponentKind::Camera, _) => {
                    // only the main camera renders
                    parent.spawn((
                        Camera3d::default(),
                        Camera {
                            is_active: false,
                            ..default()
                        },
                    ));
                }
                _ => {}
            }
        }
    });

    entity.id()
}

fn spawn_light(parent: &mut ChildBuilder, light_type: LightType, intensity: f32) {
    match light_type {
        LightType::Directional => {
            parent.spawn(DirectionalLight {
                illuminance: intensity * 10_000.0,
                shadows_enabled: true,
                ..default()
            });
        }
        LightType::Point => {
            parent.spawn(PointLight {
                intensity: intensity * 1_000_000.0,
                shadows_enabled: true,
                ..default()
            });
        }
        LightType::Spot => {
            parent.spawn(SpotLight {
                intensity: intensity * 1_000_000.0,
                shadows_enabled: true,
                ..default()
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{EditorScene, SceneHost};

    #[test]
    fn framing_looks_at_target() {
        let target = Transform::from_xyz(2.0, 1.0, -3.0).with_scale(Vec3::splat(2.0));
        let pose = frame_pose(&target);

        let to_target = (target.translation - pose.translation).normalize();
        assert!(pose.forward().dot(to_target) > 0.999);
        let distance = pose.translation.distance(target.translation);
        assert!((distance - 8.0).abs() < 1e-4);
    }

    #[test]
    fn snapshot_transform_is_mirrored() {
        let mut scene = EditorScene::default();
        let id = scene.instantiate(PrimitiveKind::Capsule).unwrap();
        scene.set_position(id, glam::Vec3::new(1.0, 2.0, 3.0)).unwrap();
        scene.set_scale(id, glam::Vec3::new(1.0, 2.0, 1.0)).unwrap();

        let snapshot = scene.snapshot_object(id).unwrap();
        let transform = object_transform(&snapshot);
        assert_eq!(transform.translation, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(transform.scale, Vec3::new(1.0, 2.0, 1.0));
        assert_eq!(transform.rotation, Quat::IDENTITY);
    }

    #[test]
    fn every_primitive_has_a_mesh() {
        for kind in PrimitiveKind::ALL {
            let mesh = primitive_mesh(kind);
            assert!(mesh.count_vertices() > 0, "{:?}", kind);
        }
    }
}
