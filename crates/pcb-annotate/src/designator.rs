use crate::definitions::ComponentDefinition;
use crate::types::Component;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Coarse component family used to pick a fallback designator prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BaseKind {
    Capacitor,
    Diode,
    Resistor,
    Semiconductor,
    Passive,
    PowerEnergy,
    Connector,
    Switch,
    Transformer,
    Other,
}

impl BaseKind {
    /// Classify a library category/subcategory pair. The subcategory is the
    /// more specific of the two and is checked first.
    pub fn from_category(category: &str, subcategory: &str) -> Self {
        Self::from_keywords(subcategory)
            .or_else(|| Self::from_keywords(category))
            .unwrap_or(BaseKind::Other)
    }

    fn from_keywords(text: &str) -> Option<Self> {
        let lower = text.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| lower.contains(w));
        if lower.is_empty() {
            None
        } else if has(&["capacitor"]) {
            Some(BaseKind::Capacitor)
        } else if has(&["diode", "led", "rectifier"]) {
            Some(BaseKind::Diode)
        } else if has(&["resistor", "potentiometer", "thermistor", "varistor"]) {
            Some(BaseKind::Resistor)
        } else if has(&["transformer"]) {
            Some(BaseKind::Transformer)
        } else if has(&["semiconductor", "transistor", "mosfet", "thyristor", "integrated"]) {
            Some(BaseKind::Semiconductor)
        } else if has(&["switch", "relay", "button"]) {
            Some(BaseKind::Switch)
        } else if has(&["connector", "header", "jack", "socket"]) {
            Some(BaseKind::Connector)
        } else if has(&["power", "batter", "energy", "fuse"]) {
            Some(BaseKind::PowerEnergy)
        } else if has(&["passive", "inductor", "crystal", "ferrite", "oscillator"]) {
            Some(BaseKind::Passive)
        } else {
            None
        }
    }

    pub fn default_prefix(&self) -> &'static str {
        match self {
            BaseKind::Capacitor => "C",
            BaseKind::Diode => "D",
            BaseKind::Resistor => "R",
            BaseKind::Semiconductor => "Q",
            BaseKind::Passive => "L",
            BaseKind::PowerEnergy => "PS",
            BaseKind::Connector => "J",
            BaseKind::Switch => "S",
            BaseKind::Transformer => "T",
            BaseKind::Other => "?",
        }
    }
}

/// Highest number handed out per prefix since the last reset.
///
/// Lets a burst of placements get increasing numbers even before the new
/// components show up in the collection being scanned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignatorCounters(BTreeMap<String, u64>);

impl DesignatorCounters {
    pub fn get(&self, prefix: &str) -> u64 {
        self.0.get(prefix).copied().unwrap_or(0)
    }

    pub fn reset(&mut self) {
        self.0.clear();
    }

    fn advance(&mut self, prefix: &str, to: u64) {
        let entry = self.0.entry(prefix.to_string()).or_insert(0);
        *entry = (*entry).max(to);
    }
}

/// Prefix a definition's components are labelled with.
pub fn designator_prefix(definition: &ComponentDefinition) -> &str {
    definition
        .designators
        .first()
        .map(String::as_str)
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| definition.base_kind().default_prefix())
}

/// Numeric suffix of `designator` after `prefix`, if it is purely digits
/// and still leaves room for a successor.
fn numeric_suffix(designator: &str, prefix: &str) -> Option<u64> {
    let rest = designator.strip_prefix(prefix)?;
    if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    rest.parse::<u64>().ok().filter(|&n| n < u64::MAX)
}

/// Next free designator for `definition`, e.g. `R5`.
///
/// The number is one past the larger of the highest numeric suffix already
/// used with this prefix and the prefix's running counter; the counter is
/// advanced to the returned number.
pub fn assign_designator<'a, I>(
    definition: &ComponentDefinition,
    existing: I,
    counters: &mut DesignatorCounters,
) -> String
where
    I: IntoIterator<Item = &'a Component>,
{
    let prefix = designator_prefix(definition);
    let used = existing
        .into_iter()
        .filter_map(|c| numeric_suffix(&c.designator, prefix))
        .max()
        .unwrap_or(0);
    let next = used.max(counters.get(prefix)).saturating_add(1);
    counters.advance(prefix, next);
    log::debug!("assigned designator {prefix}{next} to {}", definition.name);
    format!("{prefix}{next}")
}
