use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Round a float to N decimal places.
pub fn round_f64(v: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (v * factor).round() / factor
}

/// Wrapper that rounds f64 to 6 decimal places on serialization.
pub(crate) fn serialize_f64_rounded<S: Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(round_f64(*v, 6))
}

// ─── Node identity ───────────────────────────────────────────────────

/// Electrical identity of a point. Two drawing objects carrying the same
/// node id are the same electrical point, wherever they are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NodeId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(NodeId)
    }
}

// ─── Geometry ────────────────────────────────────────────────────────

/// A bare world-space coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    #[serde(serialize_with = "serialize_f64_rounded")]
    pub x: f64,
    #[serde(serialize_with = "serialize_f64_rounded")]
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// A stroke vertex, optionally carrying a node id.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    #[serde(serialize_with = "serialize_f64_rounded")]
    pub x: f64,
    #[serde(serialize_with = "serialize_f64_rounded")]
    pub y: f64,
    #[serde(rename = "pointId", default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<NodeId>,
}

impl StrokePoint {
    pub fn new(p: Point, node_id: Option<NodeId>) -> Self {
        Self {
            x: p.x,
            y: p.y,
            node_id,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

// ─── Layer ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Top,
    Bottom,
}

impl Layer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Top => "top",
            Layer::Bottom => "bottom",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Drawing strokes ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StrokeKind {
    Via,
    Pad,
    Trace,
    TestPoint,
}

impl StrokeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrokeKind::Via => "via",
            StrokeKind::Pad => "pad",
            StrokeKind::Trace => "trace",
            StrokeKind::TestPoint => "testPoint",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawingStroke {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: StrokeKind,
    pub points: Vec<StrokePoint>,
    pub color: String,
    #[serde(serialize_with = "serialize_f64_rounded")]
    pub size: f64,
    pub layer: Layer,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl DrawingStroke {
    /// Every node id carried by this stroke's vertices, in vertex order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.points.iter().filter_map(|p| p.node_id)
    }
}

// ─── Buses and power/ground symbols ──────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerBus {
    pub id: String,
    pub name: String,
    pub voltage: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundBus {
    pub id: String,
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerSymbol {
    pub id: String,
    #[serde(serialize_with = "serialize_f64_rounded")]
    pub x: f64,
    #[serde(serialize_with = "serialize_f64_rounded")]
    pub y: f64,
    #[serde(rename = "pointId")]
    pub node_id: NodeId,
    pub layer: Layer,
    pub bus_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundSymbol {
    pub id: String,
    #[serde(serialize_with = "serialize_f64_rounded")]
    pub x: f64,
    #[serde(serialize_with = "serialize_f64_rounded")]
    pub y: f64,
    #[serde(rename = "pointId")]
    pub node_id: NodeId,
    pub layer: Layer,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bus_id: Option<String>,
}

// ─── Component values ────────────────────────────────────────────────

/// A value with an optional unit, e.g. `10` + `kΩ`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quantity {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl Quantity {
    pub fn new(value: impl Into<String>, unit: Option<&str>) -> Self {
        Self {
            value: value.into(),
            unit: unit.map(str::to_string),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.as_deref().unwrap_or(""))
    }
}

/// Which value payload a component definition produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueKind {
    Resistor,
    Capacitor,
    Inductor,
    Diode,
    Fuse,
    Battery,
    PowerSupply,
    Generic,
}

/// Type-specific electrical values of a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ComponentValue {
    Resistor {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        resistance: Option<Quantity>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        power: Option<Quantity>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tolerance: Option<Quantity>,
    },
    Capacitor {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        capacitance: Option<Quantity>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        voltage: Option<Quantity>,
    },
    Inductor {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        inductance: Option<Quantity>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        current: Option<Quantity>,
    },
    Diode {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        voltage: Option<Quantity>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        current: Option<Quantity>,
    },
    Fuse {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        current: Option<Quantity>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        voltage: Option<Quantity>,
    },
    Battery {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        capacity: Option<Quantity>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        voltage: Option<Quantity>,
    },
    #[serde(rename_all = "camelCase")]
    PowerSupply {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        output_voltage: Option<Quantity>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        output_current: Option<Quantity>,
    },
    Generic {
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        fields: BTreeMap<String, Quantity>,
    },
}

impl Default for ComponentValue {
    fn default() -> Self {
        ComponentValue::Generic {
            fields: BTreeMap::new(),
        }
    }
}

impl ComponentValue {
    /// An empty payload of the given kind.
    pub fn empty(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Resistor => ComponentValue::Resistor {
                resistance: None,
                power: None,
                tolerance: None,
            },
            ValueKind::Capacitor => ComponentValue::Capacitor {
                capacitance: None,
                voltage: None,
            },
            ValueKind::Inductor => ComponentValue::Inductor {
                inductance: None,
                current: None,
            },
            ValueKind::Diode => ComponentValue::Diode {
                voltage: None,
                current: None,
            },
            ValueKind::Fuse => ComponentValue::Fuse {
                current: None,
                voltage: None,
            },
            ValueKind::Battery => ComponentValue::Battery {
                capacity: None,
                voltage: None,
            },
            ValueKind::PowerSupply => ComponentValue::PowerSupply {
                output_voltage: None,
                output_current: None,
            },
            ValueKind::Generic => ComponentValue::default(),
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            ComponentValue::Resistor { .. } => ValueKind::Resistor,
            ComponentValue::Capacitor { .. } => ValueKind::Capacitor,
            ComponentValue::Inductor { .. } => ValueKind::Inductor,
            ComponentValue::Diode { .. } => ValueKind::Diode,
            ComponentValue::Fuse { .. } => ValueKind::Fuse,
            ComponentValue::Battery { .. } => ValueKind::Battery,
            ComponentValue::PowerSupply { .. } => ValueKind::PowerSupply,
            ComponentValue::Generic { .. } => ValueKind::Generic,
        }
    }

    /// Schema field names this payload stores. Generic payloads accept any name.
    pub fn field_names(&self) -> &'static [&'static str] {
        match self {
            ComponentValue::Resistor { .. } => &["resistance", "power", "tolerance"],
            ComponentValue::Capacitor { .. } => &["capacitance", "voltage"],
            ComponentValue::Inductor { .. } => &["inductance", "current"],
            ComponentValue::Diode { .. } => &["voltage", "current"],
            ComponentValue::Fuse { .. } => &["current", "voltage"],
            ComponentValue::Battery { .. } => &["capacity", "voltage"],
            ComponentValue::PowerSupply { .. } => &["outputVoltage", "outputCurrent"],
            ComponentValue::Generic { .. } => &[],
        }
    }

    fn slot(&self, name: &str) -> Option<&Option<Quantity>> {
        match (self, name) {
            (ComponentValue::Resistor { resistance, .. }, "resistance") => Some(resistance),
            (ComponentValue::Resistor { power, .. }, "power") => Some(power),
            (ComponentValue::Resistor { tolerance, .. }, "tolerance") => Some(tolerance),
            (ComponentValue::Capacitor { capacitance, .. }, "capacitance") => Some(capacitance),
            (ComponentValue::Capacitor { voltage, .. }, "voltage") => Some(voltage),
            (ComponentValue::Inductor { inductance, .. }, "inductance") => Some(inductance),
            (ComponentValue::Inductor { current, .. }, "current") => Some(current),
            (ComponentValue::Diode { voltage, .. }, "voltage") => Some(voltage),
            (ComponentValue::Diode { current, .. }, "current") => Some(current),
            (ComponentValue::Fuse { current, .. }, "current") => Some(current),
            (ComponentValue::Fuse { voltage, .. }, "voltage") => Some(voltage),
            (ComponentValue::Battery { capacity, .. }, "capacity") => Some(capacity),
            (ComponentValue::Battery { voltage, .. }, "voltage") => Some(voltage),
            (ComponentValue::PowerSupply { output_voltage, .. }, "outputVoltage") => {
                Some(output_voltage)
            }
            (ComponentValue::PowerSupply { output_current, .. }, "outputCurrent") => {
                Some(output_current)
            }
            _ => None,
        }
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut Option<Quantity>> {
        match (self, name) {
            (ComponentValue::Resistor { resistance, .. }, "resistance") => Some(resistance),
            (ComponentValue::Resistor { power, .. }, "power") => Some(power),
            (ComponentValue::Resistor { tolerance, .. }, "tolerance") => Some(tolerance),
            (ComponentValue::Capacitor { capacitance, .. }, "capacitance") => Some(capacitance),
            (ComponentValue::Capacitor { voltage, .. }, "voltage") => Some(voltage),
            (ComponentValue::Inductor { inductance, .. }, "inductance") => Some(inductance),
            (ComponentValue::Inductor { current, .. }, "current") => Some(current),
            (ComponentValue::Diode { voltage, .. }, "voltage") => Some(voltage),
            (ComponentValue::Diode { current, .. }, "current") => Some(current),
            (ComponentValue::Fuse { current, .. }, "current") => Some(current),
            (ComponentValue::Fuse { voltage, .. }, "voltage") => Some(voltage),
            (ComponentValue::Battery { capacity, .. }, "capacity") => Some(capacity),
            (ComponentValue::Battery { voltage, .. }, "voltage") => Some(voltage),
            (ComponentValue::PowerSupply { output_voltage, .. }, "outputVoltage") => {
                Some(output_voltage)
            }
            (ComponentValue::PowerSupply { output_current, .. }, "outputCurrent") => {
                Some(output_current)
            }
            _ => None,
        }
    }

    /// Look up a schema field by name.
    pub fn field(&self, name: &str) -> Option<&Quantity> {
        match self {
            ComponentValue::Generic { fields } => fields.get(name),
            other => other.slot(name).and_then(Option::as_ref),
        }
    }

    /// Store a schema field. Returns false when a typed payload has no
    /// field of that name.
    pub fn set_field(&mut self, name: &str, quantity: Quantity) -> bool {
        if let ComponentValue::Generic { fields } = self {
            fields.insert(name.to_string(), quantity);
            return true;
        }
        match self.slot_mut(name) {
            Some(slot) => {
                *slot = Some(quantity);
                true
            }
            None => false,
        }
    }
}

// ─── Component ───────────────────────────────────────────────────────

/// `pinConnections` persists as strings where `""` means unconnected.
mod pin_connections {
    use super::NodeId;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(pins: &[Option<NodeId>], s: S) -> Result<S::Ok, S::Error> {
        let raw: Vec<String> = pins
            .iter()
            .map(|p| p.map(|id| id.to_string()).unwrap_or_default())
            .collect();
        raw.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Option<NodeId>>, D::Error> {
        let raw = Vec::<String>::deserialize(d)?;
        Ok(raw.iter().map(|s| s.parse::<NodeId>().ok()).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub id: String,
    pub component_type: String,
    pub designator: String,
    pub layer: Layer,
    #[serde(serialize_with = "serialize_f64_rounded")]
    pub x: f64,
    #[serde(serialize_with = "serialize_f64_rounded")]
    pub y: f64,
    pub color: String,
    #[serde(serialize_with = "serialize_f64_rounded")]
    pub size: f64,
    #[serde(default)]
    pub orientation: f64,
    pub pin_count: usize,
    #[serde(with = "pin_connections")]
    pub pin_connections: Vec<Option<NodeId>>,
    #[serde(default)]
    pub pin_names: Vec<String>,
    #[serde(default)]
    pub value: ComponentValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

impl Component {
    /// Node wired to a 1-based pin number.
    pub fn pin_node(&self, pin: usize) -> Option<NodeId> {
        pin.checked_sub(1)
            .and_then(|i| self.pin_connections.get(i))
            .copied()
            .flatten()
    }

    /// Name of a 1-based pin, if one is set.
    pub fn pin_name(&self, pin: usize) -> Option<&str> {
        pin.checked_sub(1)
            .and_then(|i| self.pin_names.get(i))
            .map(String::as_str)
            .filter(|n| !n.is_empty())
    }

    /// `(pin number, node)` for every connected pin.
    pub fn connected_pins(&self) -> impl Iterator<Item = (usize, NodeId)> + '_ {
        self.pin_connections
            .iter()
            .enumerate()
            .filter_map(|(i, node)| node.map(|n| (i + 1, n)))
    }
}

/// Natural sort key: split into (prefix, number) for sorting like R1, R2, R10.
pub fn natural_sort_key(s: &str) -> (String, u64) {
    let prefix_end = s
        .char_indices()
        .find(|(_, c)| c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    let prefix = s[..prefix_end].to_string();
    let num: u64 = s[prefix_end..].parse().unwrap_or(0);
    (prefix, num)
}
