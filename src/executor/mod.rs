//! Applies a parsed [`Command`] to a [`SceneHost`].
//!
//! Execution is one linear pass with no memory between calls. Soft problems
//! (unknown primitive, colour or component names) resolve to defaults and
//! are logged; a component that fails to attach is logged and skipped; only
//! an unknown action or a refused instantiation fails the whole command.

mod components;

pub use components::{Attachment, ComponentCapability, ComponentError};

use glam::{EulerRot, Quat};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::catalog::{ComponentKind, resolve_color, resolve_primitive};
use crate::command::{Action, Command, vec3};
use crate::scene::{Material, ObjectId, SceneHost};

/// Outcome of one execution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<ObjectId>,
}

impl ExecutionResult {
    pub fn success(message: impl Into<String>, object: ObjectId) -> Self {
        Self {
            success: true,
            message: message.into(),
            object: Some(object),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            object: None,
        }
    }
}

/// Host-side follow-ups after a successful creation.
#[derive(Debug, Clone, Copy)]
pub struct ExecutorOptions {
    pub select_on_create: bool,
    pub frame_on_create: bool,
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self {
            select_on_create: true,
            frame_on_create: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CommandExecutor {
    options: ExecutorOptions,
}

/// What happened to each requested component name.
#[derive(Debug, Default)]
struct ComponentReport {
    attached: Vec<&'static str>,
    unknown: Vec<String>,
    failed: Vec<&'static str>,
    /// Attached, but the host refused its settings.
    misconfigured: Vec<&'static str>,
}

fn push_once(list: &mut Vec<&'static str>, name: &'static str) {
    if !list.contains(&name) {
        list.push(name);
    }
}

impl CommandExecutor {
    pub fn new(options: ExecutorOptions) -> Self {
        Self { options }
    }

    pub fn execute<H: SceneHost + ?Sized>(
        &self,
        command: &Command,
        host: &mut H,
    ) -> ExecutionResult {
        match command.action() {
            Ok(Action::CreateObject) => self.create_object(command, host),
            Err(e) => {
                warn!("Rejected command: {}", e);
                ExecutionResult::failure(format!("Cannot execute command: {}", e))
            }
        }
    }

    fn create_object<H: SceneHost + ?Sized>(
        &self,
        command: &Command,
        host: &mut H,
    ) -> ExecutionResult {
        let primitive = resolve_primitive(command.primitive.as_deref());

        let object = match host.instantiate(primitive) {
            Ok(object) => object,
            Err(e) => {
                return ExecutionResult::failure(format!(
                    "Failed to create {}: {}",
                    primitive.as_str(),
                    e
                ));
            }
        };

        if let Some(name) = command.display_name()
            && let Err(e) = host.set_name(object, name)
        {
            warn!("Could not name {} '{}': {}", object, name, e);
        }

        self.apply_transform(command, host, object);
        self.apply_color(command, host, object);
        let report = self.apply_components(command, host, object);

        let name = host
            .object_name(object)
            .unwrap_or_else(|| primitive.as_str().to_string());
        host.register_created(object, &format!("Create {}", name));
        if self.options.select_on_create {
            host.select(object);
        }
        if self.options.frame_on_create {
            host.frame(object);
        }

        info!("Created {} '{}' ({})", primitive.as_str(), name, object);
        ExecutionResult::success(success_message(&name, primitive.as_str(), &report), object)
    }

    fn apply_transform<H: SceneHost + ?Sized>(
        &self,
        command: &Command,
        host: &mut H,
        object: ObjectId,
    ) {
        if let Some(position) = vec3(command.position.as_deref())
            && let Err(e) = host.set_position(object, position)
        {
            warn!("Could not set position on {}: {}", object, e);
        }

        if let Some(degrees) = vec3(command.rotation.as_deref()) {
            let rotation = Quat::from_euler(
                EulerRot::YXZ,
                degrees.y.to_radians(),
                degrees.x.to_radians(),
                degrees.z.to_radians(),
            );
            if let Err(e) = host.set_rotation(object, rotation) {
                warn!("Could not set rotation on {}: {}", object, e);
            }
        }

        if let Some(scale) = vec3(command.scale.as_deref())
            && let Err(e) = host.set_scale(object, scale)
        {
            warn!("Could not set scale on {}: {}", object, e);
        }
    }

    fn apply_color<H: SceneHost + ?Sized>(
        &self,
        command: &Command,
        host: &mut H,
        object: ObjectId,
    ) {
        let Some(requested) = command.color.as_deref() else {
            return;
        };
        let color = resolve_color(requested);

        if !host.has_renderer(object) {
            debug!("{} has no renderer, skipping color", object);
            return;
        }

        let material = Material {
            name: format!("{}Material", color.name),
            color: color.rgba,
        };
        if let Err(e) = host.assign_material(object, material) {
            warn!("Could not assign material to {}: {}", object, e);
        }
    }

    fn apply_components<H: SceneHost + ?Sized>(
        &self,
        command: &Command,
        host: &mut H,
        object: ObjectId,
    ) -> ComponentReport {
        let mut report = ComponentReport::default();
        let names = command.component_names();
        if names.is_empty() {
            return report;
        }

        let properties = command.resolved_properties();
        for name in names {
            let Some(kind) = ComponentKind::from_name(name) else {
                warn!("Unknown component '{}', skipping", name);
                report.unknown.push(name.clone());
                continue;
            };

            if let Err(e) = kind.attach_or_reuse(host, object) {
                warn!("Component error on {}: {}", object, e);
                push_once(&mut report.failed, kind.as_str());
                continue;
            }
            push_once(&mut report.attached, kind.as_str());

            if let Err(e) = kind.apply_properties(host, object, &properties) {
                warn!("Component error on {}: {}", object, e);
                push_once(&mut report.misconfigured, kind.as_str());
            }
        }

        report
    }
}

fn success_message(name: &str, primitive: &str, report: &ComponentReport) -> String {
    let mut message = format!("Created {} '{}'", primitive, name);
    if !report.attached.is_empty() {
        message.push_str(&format!(" with components: {}", report.attached.join(", ")));
    }
    if !report.unknown.is_empty() {
        message.push_str(&format!(
            " (skipped unknown components: {})",
            report.unknown.join(", ")
        ));
    }
    if !report.failed.is_empty() {
        message.push_str(&format!(
            " (failed components: {})",
            report.failed.join(", ")
        ));
    }
    if !report.misconfigured.is_empty() {
        message.push_str(&format!(
            " (misconfigured components: {})",
            report.misconfigured.join(", ")
        ));
    }
    message
}
