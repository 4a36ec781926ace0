use crate::error::AnnotateError;
use crate::types::*;
use serde::Serialize;
use std::collections::BTreeMap;

/// Layer classification of a BOM row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BomLayer {
    Top,
    Bottom,
    Both,
}

impl BomLayer {
    pub fn as_str(&self) -> &'static str {
        match self {
            BomLayer::Top => "top",
            BomLayer::Bottom => "bottom",
            BomLayer::Both => "both",
        }
    }

    fn merge(self, other: BomLayer) -> BomLayer {
        if self == other {
            self
        } else {
            BomLayer::Both
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BomItem {
    #[serde(rename = "type")]
    pub type_name: String,
    pub value: String,
    pub quantity: usize,
    pub designators: Vec<String>,
    pub layer: BomLayer,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BomDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    pub total_components: usize,
    pub items: Vec<BomItem>,
}

impl BomDocument {
    /// `Type,Value,Quantity,Designators,Layer`, designators joined with ", ".
    pub fn to_csv(&self) -> Result<String, AnnotateError> {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(["Type", "Value", "Quantity", "Designators", "Layer"])?;
        for item in &self.items {
            wtr.write_record([
                item.type_name.as_str(),
                item.value.as_str(),
                item.quantity.to_string().as_str(),
                item.designators.join(", ").as_str(),
                item.layer.as_str(),
            ])?;
        }
        let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// "ElectrolyticCapacitor" -> "Electrolytic Capacitor".
pub fn format_type_name(component_type: &str) -> String {
    let mut out = String::with_capacity(component_type.len() + 4);
    let mut prev: Option<char> = None;
    for c in component_type.chars() {
        if let Some(p) = prev {
            if c.is_uppercase() && p.is_lowercase() {
                out.push(' ');
            }
        }
        out.push(c);
        prev = Some(c);
    }
    out
}

fn quantity_text(q: Option<&Quantity>) -> Option<String> {
    q.filter(|q| !q.is_blank()).map(Quantity::to_string)
}

/// Display value for a component, by value kind.
pub fn display_value(component: &Component) -> String {
    let v = &component.value;
    let typed = match v.kind() {
        ValueKind::Resistor => quantity_text(v.field("resistance")),
        ValueKind::Capacitor => quantity_text(v.field("capacitance")),
        ValueKind::Inductor => quantity_text(v.field("inductance")),
        ValueKind::Fuse => quantity_text(v.field("current")),
        ValueKind::Battery => {
            quantity_text(v.field("capacity")).or_else(|| quantity_text(v.field("voltage")))
        }
        ValueKind::PowerSupply => quantity_text(v.field("outputVoltage")),
        ValueKind::Diode | ValueKind::Generic => None,
    };
    let non_empty = |s: &Option<String>| {
        s.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    typed
        .or_else(|| non_empty(&component.part_name))
        .or_else(|| non_empty(&component.part_number))
        .unwrap_or_else(|| format_type_name(&component.component_type))
}

/// Group components by `(type, value)`.
///
/// A component id present in both lists counts once, on layer `both`.
pub fn generate_bom(
    top: &[Component],
    bottom: &[Component],
    project_name: Option<&str>,
) -> BomDocument {
    // First occurrence of an id wins the record; the layer is the list it came from.
    let mut unique: Vec<(&Component, BomLayer)> = Vec::new();
    let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
    let listed = top
        .iter()
        .map(|c| (c, BomLayer::Top))
        .chain(bottom.iter().map(|c| (c, BomLayer::Bottom)));
    for (comp, layer) in listed {
        match seen.get(comp.id.as_str()) {
            Some(&idx) => unique[idx].1 = unique[idx].1.merge(layer),
            None => {
                seen.insert(comp.id.as_str(), unique.len());
                unique.push((comp, layer));
            }
        }
    }

    let mut groups: BTreeMap<(String, String), BomItem> = BTreeMap::new();
    for (comp, layer) in &unique {
        let type_name = format_type_name(&comp.component_type);
        let value = display_value(comp);
        groups
            .entry((type_name.clone(), value.clone()))
            .and_modify(|item| {
                item.quantity += 1;
                item.designators.push(comp.designator.clone());
                item.layer = item.layer.merge(*layer);
            })
            .or_insert_with(|| BomItem {
                type_name,
                value,
                quantity: 1,
                designators: vec![comp.designator.clone()],
                layer: *layer,
            });
    }

    // BTreeMap order is type then value, byte-wise.
    let items: Vec<BomItem> = groups
        .into_values()
        .map(|mut item| {
            item.designators
                .sort_by(|a, b| natural_sort_key(a).cmp(&natural_sort_key(b)));
            item
        })
        .collect();

    BomDocument {
        project_name: project_name.map(str::to_string),
        total_components: unique.len(),
        items,
    }
}
