use crate::definitions::ComponentDefinition;
use crate::designator::{assign_designator, DesignatorCounters};
use crate::types::{Component, ComponentValue, Layer, Point, Quantity};
use std::collections::BTreeMap;

pub const DEFAULT_COMPONENT_SIZE: f64 = 18.0;

/// Optional overrides for a new component.
#[derive(Debug, Clone, Default)]
pub struct InstanceOptions {
    pub id: Option<String>,
    pub color: Option<String>,
    pub size: Option<f64>,
    pub designator: Option<String>,
}

/// Build a component record from a definition.
///
/// The designator comes from `opts` or, when absent, from
/// [`assign_designator`] over `existing`.
pub fn create_instance<'a, I>(
    definition: &ComponentDefinition,
    layer: Layer,
    at: Point,
    opts: InstanceOptions,
    existing: I,
    counters: &mut DesignatorCounters,
) -> Component
where
    I: IntoIterator<Item = &'a Component>,
{
    let designator = match opts.designator {
        Some(d) if !d.trim().is_empty() => d.trim().to_string(),
        _ => assign_designator(definition, existing, counters),
    };
    let id = opts.id.unwrap_or_else(|| {
        format!("{}-{}", definition.component_type.to_lowercase(), designator)
    });

    let mut component = Component {
        id,
        component_type: definition.component_type.clone(),
        designator,
        layer,
        x: at.x,
        y: at.y,
        color: opts.color.unwrap_or_else(|| "#6b7280".to_string()),
        size: opts.size.unwrap_or(DEFAULT_COMPONENT_SIZE),
        orientation: 0.0,
        pin_count: definition.pin_count,
        pin_connections: vec![None; definition.pin_count],
        pin_names: Vec::new(),
        value: ComponentValue::empty(definition.value_kind),
        manufacturer: None,
        part_number: None,
        part_name: None,
        notes: None,
        properties: BTreeMap::new(),
    };

    // Properties only fill declared payload slots; everything else is free text.
    for (key, raw) in &definition.properties {
        if component.value.field_names().contains(&key.as_str()) {
            component.value.set_field(key, Quantity::new(raw.as_str(), None));
        } else {
            component.properties.insert(key.clone(), raw.clone());
        }
    }

    component.pin_names = if definition.pins_depend_on_chip() {
        vec![String::new(); definition.pin_count]
    } else {
        (0..definition.pin_count)
            .map(|i| definition.pin_names.get(i).cloned().unwrap_or_default())
            .collect()
    };

    for field in &definition.fields {
        let Some(default) = &field.default else {
            continue;
        };
        let quantity = Quantity {
            value: default.clone(),
            unit: field.unit.clone(),
        };
        if !component.value.set_field(&field.name, quantity) {
            component
                .properties
                .insert(field.name.clone(), default.clone());
            if let Some(unit) = &field.unit {
                component
                    .properties
                    .insert(format!("{}Unit", field.name), unit.clone());
            }
        }
    }

    component
}
