use crate::designator::BaseKind;
use crate::error::AnnotateError;
use crate::types::ValueKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Pin-name entry meaning "names depend on the specific chip".
pub const CHIP_DEPENDENT: &str = "CHIP_DEPENDENT";

/// One editable field of a component schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDefinition {
    pub name: String,
    pub component_type: String,
    pub category: String,
    #[serde(default)]
    pub subcategory: String,
    #[serde(default)]
    pub designators: Vec<String>,
    pub pin_count: usize,
    #[serde(default)]
    pub pin_names: Vec<String>,
    pub value_kind: ValueKind,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

impl ComponentDefinition {
    pub fn base_kind(&self) -> BaseKind {
        BaseKind::from_category(&self.category, &self.subcategory)
    }

    pub fn pins_depend_on_chip(&self) -> bool {
        self.pin_names.iter().any(|n| n == CHIP_DEPENDENT)
    }
}

/// Parse a JSON array of definitions.
pub fn definitions_from_json(json: &str) -> Result<Vec<ComponentDefinition>, AnnotateError> {
    Ok(serde_json::from_str(json)?)
}

fn field(name: &str, label: &str, default: &str, unit: Option<&str>) -> FieldDescriptor {
    FieldDescriptor {
        name: name.to_string(),
        label: label.to_string(),
        default: Some(default.to_string()),
        unit: unit.map(str::to_string),
    }
}

struct Builder(ComponentDefinition);

impl Builder {
    fn new(name: &str, component_type: &str, category: &str, subcategory: &str) -> Self {
        Self(ComponentDefinition {
            name: name.to_string(),
            component_type: component_type.to_string(),
            category: category.to_string(),
            subcategory: subcategory.to_string(),
            designators: Vec::new(),
            pin_count: 2,
            pin_names: Vec::new(),
            value_kind: ValueKind::Generic,
            properties: BTreeMap::new(),
            fields: Vec::new(),
        })
    }

    fn designator(mut self, prefix: &str) -> Self {
        self.0.designators.push(prefix.to_string());
        self
    }

    fn pins(mut self, count: usize, names: &[&str]) -> Self {
        self.0.pin_count = count;
        self.0.pin_names = names.iter().map(|n| n.to_string()).collect();
        self
    }

    fn value(mut self, kind: ValueKind, fields: Vec<FieldDescriptor>) -> Self {
        self.0.value_kind = kind;
        self.0.fields = fields;
        self
    }

    fn property(mut self, key: &str, value: &str) -> Self {
        self.0.properties.insert(key.to_string(), value.to_string());
        self
    }
}

static BUILTIN: LazyLock<Vec<ComponentDefinition>> = LazyLock::new(|| {
    vec![
        Builder::new("Resistor", "Resistor", "Passive", "Resistors")
            .designator("R")
            .value(
                ValueKind::Resistor,
                vec![
                    field("resistance", "Resistance", "10", Some("kΩ")),
                    field("power", "Power", "0.25", Some("W")),
                    field("tolerance", "Tolerance", "5", Some("%")),
                ],
            ),
        Builder::new("Ceramic Capacitor", "Capacitor", "Passive", "Capacitors")
            .designator("C")
            .value(
                ValueKind::Capacitor,
                vec![
                    field("capacitance", "Capacitance", "100", Some("nF")),
                    field("voltage", "Voltage", "50", Some("V")),
                ],
            )
            .property("dielectric", "X7R"),
        Builder::new(
            "Electrolytic Capacitor",
            "ElectrolyticCapacitor",
            "Passive",
            "Capacitors",
        )
        .designator("C")
        .pins(2, &["+", "-"])
        .value(
            ValueKind::Capacitor,
            vec![
                field("capacitance", "Capacitance", "10", Some("µF")),
                field("voltage", "Voltage", "25", Some("V")),
            ],
        )
        .property("polarized", "true"),
        Builder::new("Inductor", "Inductor", "Passive", "Inductors")
            .designator("L")
            .value(
                ValueKind::Inductor,
                vec![
                    field("inductance", "Inductance", "10", Some("µH")),
                    field("current", "Current", "1", Some("A")),
                ],
            ),
        Builder::new("Diode", "Diode", "Semiconductors", "Diodes")
            .designator("D")
            .pins(2, &["A", "K"])
            .value(
                ValueKind::Diode,
                vec![
                    field("voltage", "Forward Voltage", "0.7", Some("V")),
                    field("current", "Current", "1", Some("A")),
                ],
            ),
        Builder::new("LED", "LED", "Semiconductors", "LEDs")
            .designator("D")
            .pins(2, &["A", "K"])
            .value(
                ValueKind::Diode,
                vec![field("voltage", "Forward Voltage", "2", Some("V"))],
            )
            .property("color", "red"),
        Builder::new("NPN Transistor", "Transistor", "Semiconductors", "Transistors")
            .designator("Q")
            .pins(3, &["B", "C", "E"])
            .property("polarity", "NPN"),
        Builder::new(
            "Integrated Circuit",
            "IntegratedCircuit",
            "Semiconductors",
            "Integrated Circuits",
        )
        .designator("U")
        .pins(8, &[CHIP_DEPENDENT]),
        Builder::new("Pin Header", "Connector", "Connectors", "Headers")
            .designator("J")
            .pins(2, &[]),
        Builder::new("Switch", "Switch", "Electromechanical", "Switches").pins(2, &[]),
        Builder::new("Fuse", "Fuse", "Power", "Fuses")
            .designator("F")
            .value(
                ValueKind::Fuse,
                vec![
                    field("current", "Current", "1", Some("A")),
                    field("voltage", "Voltage", "250", Some("V")),
                ],
            ),
        Builder::new("Battery", "Battery", "Power", "Batteries")
            .designator("BT")
            .pins(2, &["+", "-"])
            .value(
                ValueKind::Battery,
                vec![
                    field("capacity", "Capacity", "2000", Some("mAh")),
                    field("voltage", "Voltage", "3.7", Some("V")),
                ],
            ),
        Builder::new("Power Supply", "PowerSupply", "Power", "Power Supplies")
            .pins(2, &["+", "-"])
            .value(
                ValueKind::PowerSupply,
                vec![
                    field("outputVoltage", "Output Voltage", "5", Some("V")),
                    field("outputCurrent", "Output Current", "2", Some("A")),
                ],
            ),
        Builder::new("Transformer", "Transformer", "Passive", "Transformers")
            .pins(4, &["P1", "P2", "S1", "S2"]),
        Builder::new("Crystal", "Crystal", "Passive", "Crystals")
            .designator("Y")
            .value(
                ValueKind::Generic,
                vec![field("frequency", "Frequency", "16", Some("MHz"))],
            ),
    ]
    .into_iter()
    .map(|b| b.0)
    .collect()
});

/// The built-in component library.
pub fn builtin_definitions() -> &'static [ComponentDefinition] {
    &BUILTIN
}

pub fn find_definition(name: &str) -> Option<&'static ComponentDefinition> {
    BUILTIN.iter().find(|d| d.name == name)
}
