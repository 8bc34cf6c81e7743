//! Closed catalogs of everything a command can name: primitives, component
//! kinds, light types and colours.
//!
//! Every lookup here is total. Names are matched case-insensitively and a
//! miss is reported as `None` (or resolved to the documented default by the
//! `resolve_*` helpers) so that callers can decide how loudly to complain.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// RGBA colour, components in `0.0..=1.0`.
pub type Rgba = [f32; 4];

// ---------------------------------------------------------------------------
// Primitives
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveKind {
    Cube,
    Sphere,
    Capsule,
    Cylinder,
    Plane,
    Quad,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 6] = [
        Self::Cube,
        Self::Sphere,
        Self::Capsule,
        Self::Cylinder,
        Self::Plane,
        Self::Quad,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cube => "Cube",
            Self::Sphere => "Sphere",
            Self::Capsule => "Capsule",
            Self::Cylinder => "Cylinder",
            Self::Plane => "Plane",
            Self::Quad => "Quad",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
    }

    /// Collider the editor attaches when it instantiates this primitive.
    pub fn default_collider(&self) -> ComponentKind {
        match self {
            Self::Cube => ComponentKind::BoxCollider,
            Self::Sphere => ComponentKind::SphereCollider,
            Self::Capsule | Self::Cylinder => ComponentKind::CapsuleCollider,
            Self::Plane | Self::Quad => ComponentKind::MeshCollider,
        }
    }
}

/// Resolve a requested primitive, falling back to `Cube`.
pub fn resolve_primitive(requested: Option<&str>) -> PrimitiveKind {
    match requested {
        Some(name) => PrimitiveKind::from_name(name).unwrap_or_else(|| {
            warn!("Unknown primitive '{}', using Cube", name);
            PrimitiveKind::Cube
        }),
        None => {
            warn!("No primitive given, using Cube");
            PrimitiveKind::Cube
        }
    }
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    Rigidbody,
    BoxCollider,
    SphereCollider,
    CapsuleCollider,
    MeshCollider,
    CharacterController,
    Light,
    Camera,
    AudioSource,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 9] = [
        Self::Rigidbody,
        Self::BoxCollider,
        Self::SphereCollider,
        Self::CapsuleCollider,
        Self::MeshCollider,
        Self::CharacterController,
        Self::Light,
        Self::Camera,
        Self::AudioSource,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rigidbody => "Rigidbody",
            Self::BoxCollider => "BoxCollider",
            Self::SphereCollider => "SphereCollider",
            Self::CapsuleCollider => "CapsuleCollider",
            Self::MeshCollider => "MeshCollider",
            Self::CharacterController => "CharacterController",
            Self::Light => "Light",
            Self::Camera => "Camera",
            Self::AudioSource => "AudioSource",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
    }

    /// Kinds that honour the `isTrigger` property.
    pub fn is_collider(&self) -> bool {
        matches!(
            self,
            Self::BoxCollider
                | Self::SphereCollider
                | Self::CapsuleCollider
                | Self::MeshCollider
                | Self::CharacterController
        )
    }
}

// ---------------------------------------------------------------------------
// Lights
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LightType {
    Directional,
    Point,
    Spot,
}

impl LightType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Directional => "Directional",
            Self::Point => "Point",
            Self::Spot => "Spot",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        [Self::Directional, Self::Point, Self::Spot]
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
    }
}

/// Resolve a requested light type, falling back to `Directional`.
pub fn resolve_light_type(requested: &str) -> LightType {
    LightType::from_name(requested).unwrap_or_else(|| {
        warn!("Unknown light type '{}', using Directional", requested);
        LightType::Directional
    })
}

// ---------------------------------------------------------------------------
// Colours
// ---------------------------------------------------------------------------

pub const WHITE: Rgba = [1.0, 1.0, 1.0, 1.0];

/// Named colours understood in commands.
pub const COLOR_TABLE: [(&str, Rgba); 14] = [
    ("red", [1.0, 0.0, 0.0, 1.0]),
    ("green", [0.0, 1.0, 0.0, 1.0]),
    ("blue", [0.0, 0.0, 1.0, 1.0]),
    ("yellow", [1.0, 0.92, 0.016, 1.0]),
    ("cyan", [0.0, 1.0, 1.0, 1.0]),
    ("magenta", [1.0, 0.0, 1.0, 1.0]),
    ("white", WHITE),
    ("black", [0.0, 0.0, 0.0, 1.0]),
    ("gray", [0.5, 0.5, 0.5, 1.0]),
    ("grey", [0.5, 0.5, 0.5, 1.0]),
    ("orange", [1.0, 0.5, 0.0, 1.0]),
    ("purple", [0.5, 0.0, 0.5, 1.0]),
    ("pink", [1.0, 0.75, 0.8, 1.0]),
    ("brown", [0.6, 0.3, 0.1, 1.0]),
];

/// A colour name resolved against [`COLOR_TABLE`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NamedColor {
    /// Canonical (lowercase) table name.
    pub name: &'static str,
    pub rgba: Rgba,
}

pub fn lookup_color(name: &str) -> Option<NamedColor> {
    let name = name.trim();
    COLOR_TABLE
        .iter()
        .find(|(entry, _)| entry.eq_ignore_ascii_case(name))
        .map(|(entry, rgba)| NamedColor {
            name: entry,
            rgba: *rgba,
        })
}

/// Resolve a colour name, falling back to white.
pub fn resolve_color(name: &str) -> NamedColor {
    lookup_color(name).unwrap_or_else(|| {
        warn!("Unknown color '{}', using white", name);
        NamedColor {
            name: "white",
            rgba: WHITE,
        }
    })
}
