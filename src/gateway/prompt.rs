//! Prompt text and completion clean-up.

/// Instruction sent as the system turn of every request.
pub const SYSTEM_PROMPT: &str = r#"You translate scene-editing requests into a single JSON object.
Reply with JSON only: no prose, no markdown.

Schema:
{
  "action": "create_object",
  "name": string,
  "primitive": "Cube" | "Sphere" | "Capsule" | "Cylinder" | "Plane" | "Quad",
  "position": [x, y, z],
  "rotation": [x, y, z],          // Euler angles in degrees
  "scale": [x, y, z],
  "color": "red" | "green" | "blue" | "yellow" | "cyan" | "magenta" | "white" | "black" | "gray" | "orange" | "purple" | "pink" | "brown",
  "components": ["Rigidbody" | "BoxCollider" | "SphereCollider" | "CapsuleCollider" | "MeshCollider" | "CharacterController" | "Light" | "Camera" | "AudioSource"],
  "properties": {
    "mass": number,               // default 1.0
    "useGravity": boolean,        // default true
    "isTrigger": boolean,         // default false
    "intensity": number,          // default 1.0
    "lightType": "Directional" | "Point" | "Spot"
  }
}

Only "action" is required. Omit fields the request does not mention."#;

/// Strip a surrounding markdown code fence and trim.
///
/// Models often wrap JSON in ```json ... ``` even when told not to.
pub fn strip_code_fence(text: &str) -> String {
    let mut body = text.trim();

    if let Some(rest) = body.strip_prefix("```") {
        // drop an info string such as `json`
        body = match rest.find('\n') {
            Some(newline) if !rest[..newline].trim_start().starts_with('{') => &rest[newline + 1..],
            _ => rest.strip_prefix("json").unwrap_or(rest),
        };
    }
    if let Some(rest) = body.trim_end().strip_suffix("```") {
        body = rest;
    }

    body.trim().to_string()
}
