use serde::Deserialize;
use uuid::Uuid;

/// Characteristic type tag. Only `PowerState` is acted on by the menu;
/// everything else the helper reports lands in `Unsupported`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacteristicKind {
    PowerState,
    Brightness,
    Hue,
    Saturation,
    #[serde(other)]
    Unsupported,
}

/// Cached characteristic value as delivered by the helper. The wire value is
/// dynamically typed, so every shape it can take gets its own variant instead
/// of a lossy cast.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CharacteristicValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl CharacteristicValue {
    /// Decodes a power state: integer 0 is off, any other integer is on.
    /// Non-integer values are not a power state.
    pub fn power_on(&self) -> Option<bool> {
        match self {
            CharacteristicValue::Int(n) => Some(*n != 0),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Characteristic {
    pub kind: CharacteristicKind,
    pub id: Uuid,
    #[serde(default)]
    pub value: Option<CharacteristicValue>,
}

impl Characteristic {
    pub fn is_power_state(&self) -> bool {
        self.kind == CharacteristicKind::PowerState
    }
}

/// Service category, used only to pick the menu glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    Lightbulb,
    Switch,
    Outlet,
    #[serde(other)]
    Other,
}

/// One device: a named service with its characteristics.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceDescriptor {
    pub name: String,
    #[serde(default = "ServiceKind::default_kind")]
    pub kind: ServiceKind,
    #[serde(default)]
    pub characteristics: Vec<Characteristic>,
}

impl ServiceKind {
    fn default_kind() -> ServiceKind {
        ServiceKind::Other
    }
}

/// A named collection of services presented as one menu entry
/// (e.g. "All Lights").
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceGroupDescriptor {
    pub name: String,
    #[serde(default)]
    pub services: Vec<ServiceDescriptor>,
}
