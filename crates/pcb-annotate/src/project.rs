use crate::connectivity::ConnectivityManager;
use crate::definitions::ComponentDefinition;
use crate::designator::DesignatorCounters;
use crate::error::AnnotateError;
use crate::ids::NodeIdAllocator;
use crate::instance::{create_instance, InstanceOptions};
use crate::snap::find_snap_target;
use crate::types::*;
use crate::EditorOptions;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What a point-like creation resolved to.
#[derive(Debug, Clone, PartialEq)]
pub struct Placed {
    pub id: String,
    pub node_id: NodeId,
    /// True when the click snapped onto an existing node.
    pub snapped: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub strokes: Vec<DrawingStroke>,
    #[serde(default)]
    pub top_components: Vec<Component>,
    #[serde(default)]
    pub bottom_components: Vec<Component>,
    #[serde(default)]
    pub power_symbols: Vec<PowerSymbol>,
    #[serde(default)]
    pub ground_symbols: Vec<GroundSymbol>,
    #[serde(default)]
    pub power_buses: Vec<PowerBus>,
    #[serde(default)]
    pub ground_buses: Vec<GroundBus>,
    #[serde(skip)]
    node_ids: NodeIdAllocator,
    #[serde(skip)]
    counters: DesignatorCounters,
    #[serde(skip)]
    next_object: u64,
    #[serde(skip)]
    pub options: EditorOptions,
}

impl Project {
    pub fn new(name: impl Into<String>, options: EditorOptions) -> Self {
        Self {
            name: name.into(),
            options,
            ..Default::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, AnnotateError> {
        let mut project: Project = serde_json::from_str(json)?;
        project.reseed()?;
        Ok(project)
    }

    pub fn to_json(&self, pretty: bool) -> Result<String, AnnotateError> {
        Ok(if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        })
    }

    pub fn load(path: &Path) -> Result<Self, AnnotateError> {
        let text = std::fs::read_to_string(path)?;
        let project = Self::from_json(&text)?;
        debug!(
            "loaded {}: {} strokes, {} components",
            path.display(),
            project.strokes.len(),
            project.components().count()
        );
        Ok(project)
    }

    pub fn save(&self, path: &Path) -> Result<(), AnnotateError> {
        std::fs::write(path, self.to_json(true)?)?;
        Ok(())
    }

    /// Restart id allocation past everything loaded and reset designator counters.
    fn reseed(&mut self) -> Result<(), AnnotateError> {
        self.node_ids = NodeIdAllocator::after(self.all_node_ids())?;
        self.counters.reset();
        self.next_object = 0;
        Ok(())
    }

    fn all_node_ids(&self) -> Vec<NodeId> {
        let strokes = self.strokes.iter().flat_map(|s| s.node_ids());
        let pins = self
            .components()
            .flat_map(|c| c.pin_connections.iter().flatten().copied());
        let power = self.power_symbols.iter().map(|p| p.node_id);
        let ground = self.ground_symbols.iter().map(|g| g.node_id);
        strokes.chain(pins).chain(power).chain(ground).collect()
    }

    fn object_id(&mut self, prefix: &str) -> String {
        loop {
            self.next_object += 1;
            let id = format!("{prefix}-{}", self.next_object);
            if !self.id_in_use(&id) {
                return id;
            }
        }
    }

    fn id_in_use(&self, id: &str) -> bool {
        self.strokes.iter().any(|s| s.id == id)
            || self.components().any(|c| c.id == id)
            || self.power_symbols.iter().any(|p| p.id == id)
            || self.ground_symbols.iter().any(|g| g.id == id)
            || self.power_buses.iter().any(|b| b.id == id)
            || self.ground_buses.iter().any(|b| b.id == id)
    }

    /// Snap `at` onto an existing node, or mint a fresh one.
    fn resolve_node(&mut self, at: Point) -> Result<(NodeId, Point, bool), AnnotateError> {
        Ok(match find_snap_target(
            &self.strokes,
            &self.power_symbols,
            &self.ground_symbols,
            at,
            self.options.snap_distance,
        ) {
            Some(hit) => (hit.node_id, hit.position, true),
            None => (self.node_ids.allocate()?, at, false),
        })
    }

    // ─── Strokes ─────────────────────────────────────────────────────

    fn add_point_stroke(
        &mut self,
        kind: StrokeKind,
        at: Point,
        layer: Layer,
        color: &str,
        size: f64,
    ) -> Result<Placed, AnnotateError> {
        let (node_id, position, snapped) = self.resolve_node(at)?;
        let id = self.object_id(kind.as_str());
        self.strokes.push(DrawingStroke {
            id: id.clone(),
            kind,
            points: vec![StrokePoint::new(position, Some(node_id))],
            color: color.to_string(),
            size,
            layer,
            note: None,
        });
        debug!("added {} {id} on node {node_id} (snapped: {snapped})", kind.as_str());
        Ok(Placed {
            id,
            node_id,
            snapped,
        })
    }

    pub fn add_via(
        &mut self,
        at: Point,
        layer: Layer,
        color: &str,
        size: f64,
    ) -> Result<Placed, AnnotateError> {
        self.add_point_stroke(StrokeKind::Via, at, layer, color, size)
    }

    pub fn add_pad(
        &mut self,
        at: Point,
        layer: Layer,
        color: &str,
        size: f64,
    ) -> Result<Placed, AnnotateError> {
        self.add_point_stroke(StrokeKind::Pad, at, layer, color, size)
    }

    pub fn add_test_point(
        &mut self,
        at: Point,
        layer: Layer,
        color: &str,
        size: f64,
    ) -> Result<Placed, AnnotateError> {
        self.add_point_stroke(StrokeKind::TestPoint, at, layer, color, size)
    }

    /// Add a trace. Vertices near an id-bearing point take its id and
    /// position; the rest are plain geometry.
    pub fn add_trace(
        &mut self,
        points: &[Point],
        layer: Layer,
        color: &str,
        size: f64,
    ) -> Result<String, AnnotateError> {
        if points.len() < 2 {
            return Err(AnnotateError::InvalidTrace(points.len()));
        }
        let vertices: Vec<StrokePoint> = points
            .iter()
            .map(|&p| {
                match find_snap_target(
                    &self.strokes,
                    &self.power_symbols,
                    &self.ground_symbols,
                    p,
                    self.options.snap_distance,
                ) {
                    Some(hit) => StrokePoint::new(hit.position, Some(hit.node_id)),
                    None => StrokePoint::new(p, None),
                }
            })
            .collect();
        let id = self.object_id("trace");
        self.strokes.push(DrawingStroke {
            id: id.clone(),
            kind: StrokeKind::Trace,
            points: vertices,
            color: color.to_string(),
            size,
            layer,
            note: None,
        });
        Ok(id)
    }

    pub fn remove_stroke(&mut self, id: &str) -> Result<DrawingStroke, AnnotateError> {
        let idx = self
            .strokes
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| not_found("stroke", id))?;
        Ok(self.strokes.remove(idx))
    }

    // ─── Buses ───────────────────────────────────────────────────────

    pub fn add_power_bus(&mut self, name: &str, voltage: &str, color: &str) -> String {
        let id = self.object_id("power-bus");
        self.power_buses.push(PowerBus {
            id: id.clone(),
            name: name.to_string(),
            voltage: voltage.to_string(),
            color: color.to_string(),
        });
        id
    }

    pub fn add_ground_bus(&mut self, name: &str, color: &str) -> String {
        let id = self.object_id("ground-bus");
        self.ground_buses.push(GroundBus {
            id: id.clone(),
            name: name.to_string(),
            color: color.to_string(),
        });
        id
    }

    /// Remove a power bus. Refused while any power symbol references it.
    pub fn remove_power_bus(&mut self, id: &str) -> Result<PowerBus, AnnotateError> {
        let idx = self
            .power_buses
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| not_found("power bus", id))?;
        let users = self.power_symbols.iter().filter(|p| p.bus_id == id).count();
        if users > 0 {
            warn!("refusing to delete power bus {id}: {users} symbol(s) still use it");
            return Err(AnnotateError::BusInUse {
                bus_id: id.to_string(),
                symbols: users,
            });
        }
        Ok(self.power_buses.remove(idx))
    }

    /// Remove a ground bus. Refused while any ground symbol references it.
    pub fn remove_ground_bus(&mut self, id: &str) -> Result<GroundBus, AnnotateError> {
        let idx = self
            .ground_buses
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| not_found("ground bus", id))?;
        let users = self
            .ground_symbols
            .iter()
            .filter(|g| g.bus_id.as_deref() == Some(id))
            .count();
        if users > 0 {
            warn!("refusing to delete ground bus {id}: {users} symbol(s) still use it");
            return Err(AnnotateError::BusInUse {
                bus_id: id.to_string(),
                symbols: users,
            });
        }
        Ok(self.ground_buses.remove(idx))
    }

    // ─── Power and ground symbols ────────────────────────────────────

    /// Node a click at `at` would land on, without minting anything.
    fn peek_node(&self, at: Point) -> Option<(NodeId, Point)> {
        find_snap_target(
            &self.strokes,
            &self.power_symbols,
            &self.ground_symbols,
            at,
            self.options.snap_distance,
        )
        .map(|hit| (hit.node_id, hit.position))
    }

    /// Place a power symbol. Rejected if the node is already grounded.
    pub fn add_power_symbol(
        &mut self,
        at: Point,
        layer: Layer,
        bus_id: &str,
    ) -> Result<Placed, AnnotateError> {
        if !self.power_buses.iter().any(|b| b.id == bus_id) {
            return Err(not_found("power bus", bus_id));
        }
        let target = self.peek_node(at);
        if let Some((node_id, _)) = target {
            if self.ground_symbols.iter().any(|g| g.node_id == node_id) {
                warn!("power symbol rejected: node {node_id} is ground");
                return Err(AnnotateError::NodeConflict {
                    node_id,
                    claimed_by: "ground",
                });
            }
        }
        let (node_id, position, snapped) = match target {
            Some((node_id, position)) => (node_id, position, true),
            None => (self.node_ids.allocate()?, at, false),
        };
        let id = self.object_id("power");
        self.power_symbols.push(PowerSymbol {
            id: id.clone(),
            x: position.x,
            y: position.y,
            node_id,
            layer,
            bus_id: bus_id.to_string(),
        });
        Ok(Placed {
            id,
            node_id,
            snapped,
        })
    }

    /// Place a ground symbol. Rejected if the node already carries power.
    pub fn add_ground_symbol(
        &mut self,
        at: Point,
        layer: Layer,
        bus_id: Option<&str>,
    ) -> Result<Placed, AnnotateError> {
        if let Some(bus_id) = bus_id {
            if !self.ground_buses.iter().any(|b| b.id == bus_id) {
                return Err(not_found("ground bus", bus_id));
            }
        }
        let target = self.peek_node(at);
        if let Some((node_id, _)) = target {
            if self.power_symbols.iter().any(|p| p.node_id == node_id) {
                warn!("ground symbol rejected: node {node_id} is powered");
                return Err(AnnotateError::NodeConflict {
                    node_id,
                    claimed_by: "power",
                });
            }
        }
        let (node_id, position, snapped) = match target {
            Some((node_id, position)) => (node_id, position, true),
            None => (self.node_ids.allocate()?, at, false),
        };
        let id = self.object_id("ground");
        self.ground_symbols.push(GroundSymbol {
            id: id.clone(),
            x: position.x,
            y: position.y,
            node_id,
            layer,
            bus_id: bus_id.map(str::to_string),
        });
        Ok(Placed {
            id,
            node_id,
            snapped,
        })
    }

    pub fn remove_power_symbol(&mut self, id: &str) -> Result<PowerSymbol, AnnotateError> {
        let idx = self
            .power_symbols
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| not_found("power symbol", id))?;
        Ok(self.power_symbols.remove(idx))
    }

    pub fn remove_ground_symbol(&mut self, id: &str) -> Result<GroundSymbol, AnnotateError> {
        let idx = self
            .ground_symbols
            .iter()
            .position(|g| g.id == id)
            .ok_or_else(|| not_found("ground symbol", id))?;
        Ok(self.ground_symbols.remove(idx))
    }

    // ─── Components ──────────────────────────────────────────────────

    /// Top-layer components followed by bottom-layer ones.
    pub fn components(&self) -> impl Iterator<Item = &Component> + '_ {
        self.top_components
            .iter()
            .chain(self.bottom_components.iter())
    }

    pub fn component(&self, id: &str) -> Option<&Component> {
        self.components().find(|c| c.id == id)
    }

    fn component_mut(&mut self, id: &str) -> Option<&mut Component> {
        self.top_components
            .iter_mut()
            .chain(self.bottom_components.iter_mut())
            .find(|c| c.id == id)
    }

    /// Instantiate `definition` on `layer` and return the new component's id.
    /// An explicit designator already carried by another component is refused.
    pub fn place_component(
        &mut self,
        definition: &ComponentDefinition,
        layer: Layer,
        at: Point,
        mut opts: InstanceOptions,
    ) -> Result<String, AnnotateError> {
        if let Some(designator) = opts.designator.as_deref().map(str::trim) {
            if !designator.is_empty() && self.components().any(|c| c.designator == designator) {
                warn!("refusing to place {}: designator {designator} is taken", definition.name);
                return Err(AnnotateError::DuplicateDesignator(designator.to_string()));
            }
        }
        if opts.id.is_none() {
            opts.id = Some(self.object_id("component"));
        }
        let component = create_instance(
            definition,
            layer,
            at,
            opts,
            self.top_components
                .iter()
                .chain(self.bottom_components.iter()),
            &mut self.counters,
        );
        let id = component.id.clone();
        debug!("placed {} ({}) on {layer}", component.designator, definition.name);
        match layer {
            Layer::Top => self.top_components.push(component),
            Layer::Bottom => self.bottom_components.push(component),
        }
        Ok(id)
    }

    /// Wire a 1-based pin to a node.
    pub fn connect_pin(
        &mut self,
        component_id: &str,
        pin: usize,
        node: NodeId,
    ) -> Result<(), AnnotateError> {
        self.set_pin(component_id, pin, Some(node))
    }

    pub fn disconnect_pin(&mut self, component_id: &str, pin: usize) -> Result<(), AnnotateError> {
        self.set_pin(component_id, pin, None)
    }

    fn set_pin(
        &mut self,
        component_id: &str,
        pin: usize,
        node: Option<NodeId>,
    ) -> Result<(), AnnotateError> {
        let component = self
            .component_mut(component_id)
            .ok_or_else(|| not_found("component", component_id))?;
        if pin == 0 || pin > component.pin_count {
            return Err(AnnotateError::PinOutOfRange {
                designator: component.designator.clone(),
                pin,
                pin_count: component.pin_count,
            });
        }
        if component.pin_connections.len() < component.pin_count {
            component.pin_connections.resize(component.pin_count, None);
        }
        component.pin_connections[pin - 1] = node;
        Ok(())
    }

    pub fn remove_component(&mut self, id: &str) -> Result<Component, AnnotateError> {
        if let Some(idx) = self.top_components.iter().position(|c| c.id == id) {
            return Ok(self.top_components.remove(idx));
        }
        if let Some(idx) = self.bottom_components.iter().position(|c| c.id == id) {
            return Ok(self.bottom_components.remove(idx));
        }
        Err(not_found("component", id))
    }

    // ─── Connectivity ────────────────────────────────────────────────

    /// Feed the current collections to `manager`.
    pub fn sync(&self, manager: &mut ConnectivityManager) {
        manager.sync(
            &self.strokes,
            self.components(),
            &self.power_symbols,
            &self.ground_symbols,
            &self.power_buses,
        );
    }

    /// A manager synced to the current collections.
    pub fn connectivity(&self) -> ConnectivityManager {
        let mut manager = ConnectivityManager::new();
        self.sync(&mut manager);
        manager
    }
}

fn not_found(kind: &'static str, id: &str) -> AnnotateError {
    AnnotateError::NotFound {
        kind,
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectivity::{NetMember, NodeType};
    use crate::definitions::find_definition;

    fn project() -> Project {
        Project::new("test", EditorOptions::default())
    }

    #[test]
    fn test_via_pad_pin_scenario() {
        let mut p = project();
        let via = p.add_via(Point::new(10.0, 10.0), Layer::Top, "#0a0", 6.0).unwrap();
        assert_eq!(via.node_id, NodeId(1));
        assert!(!via.snapped);

        let pad = p.add_pad(Point::new(11.0, 10.5), Layer::Top, "#aa0", 6.0).unwrap();
        assert_eq!(pad.node_id, NodeId(1));
        assert!(pad.snapped);
        // Snapped objects take the target's position.
        assert_eq!(p.strokes[1].points[0].position(), Point::new(10.0, 10.0));

        let r = p.place_component(
            find_definition("Resistor").unwrap(),
            Layer::Top,
            Point::new(40.0, 10.0),
            InstanceOptions::default(),
        )
        .unwrap();
        p.connect_pin(&r, 1, NodeId(1)).unwrap();

        let mgr = p.connectivity();
        let net = mgr.net_of(NodeId(1)).unwrap();
        assert_eq!(net.members.len(), 3);
        assert!(net.contains_stroke(&via.id));
        assert!(net.contains_stroke(&pad.id));
        assert!(net.members.contains(&NetMember::ComponentPin {
            component_id: r.clone(),
            designator: "R1".to_string(),
            pin: 1,
        }));
        assert_eq!(mgr.resolve_node_type(NodeId(1), &p.power_buses), NodeType::Signal);
    }

    #[test]
    fn test_ground_on_power_node_rejected() {
        let mut p = project();
        let bus = p.add_power_bus("+3V3", "+3.3V", "#f00");
        let pwr = p
            .add_power_symbol(Point::new(50.0, 50.0), Layer::Top, &bus)
            .unwrap();
        let before = p.ground_symbols.clone();
        let allocator_before = p.node_ids.peek();

        let err = p
            .add_ground_symbol(Point::new(51.0, 50.0), Layer::Top, None)
            .unwrap_err();
        assert!(matches!(
            err,
            AnnotateError::NodeConflict { node_id, claimed_by: "power" } if node_id == pwr.node_id
        ));
        assert_eq!(p.ground_symbols, before);
        assert_eq!(p.node_ids.peek(), allocator_before);
    }

    #[test]
    fn test_power_on_ground_node_rejected() {
        let mut p = project();
        let bus = p.add_power_bus("+5V", "+5V", "#f00");
        p.add_ground_symbol(Point::new(0.0, 0.0), Layer::Bottom, None)
            .unwrap();
        let err = p
            .add_power_symbol(Point::new(2.0, 0.0), Layer::Bottom, &bus)
            .unwrap_err();
        assert!(matches!(err, AnnotateError::NodeConflict { claimed_by: "ground", .. }));
        assert!(p.power_symbols.is_empty());
    }

    #[test]
    fn test_power_ground_claims_never_overlap() {
        let mut p = project();
        let bus = p.add_power_bus("VCC", "+5V", "#f00");
        let spots = [0.0, 3.0, 40.0, 43.0, 80.0, 1.0, 41.0, 200.0];
        for (i, x) in spots.iter().enumerate() {
            let at = Point::new(*x, 0.0);
            let _ = if i % 2 == 0 {
                p.add_power_symbol(at, Layer::Top, &bus)
            } else {
                p.add_ground_symbol(at, Layer::Top, None)
            };
        }
        for g in &p.ground_symbols {
            assert!(p.power_symbols.iter().all(|s| s.node_id != g.node_id));
        }
        assert_eq!(p.power_symbols.len(), 4);
        assert_eq!(p.ground_symbols.len(), 1);
    }

    #[test]
    fn test_bus_delete_blocked_while_in_use() {
        let mut p = project();
        let bus = p.add_power_bus("+12V", "+12V", "#f00");
        let sym = p.add_power_symbol(Point::new(0.0, 0.0), Layer::Top, &bus).unwrap();

        let err = p.remove_power_bus(&bus).unwrap_err();
        assert!(matches!(err, AnnotateError::BusInUse { symbols: 1, .. }));
        assert_eq!(p.power_buses.len(), 1);
        assert_eq!(p.power_symbols.len(), 1);

        p.remove_power_symbol(&sym.id).unwrap();
        assert_eq!(p.remove_power_bus(&bus).unwrap().name, "+12V");
        assert!(p.power_buses.is_empty());
    }

    #[test]
    fn test_ground_bus_delete_blocked_while_in_use() {
        let mut p = project();
        let bus = p.add_ground_bus("AGND", "#888");
        p.add_ground_symbol(Point::new(0.0, 0.0), Layer::Top, Some(&bus))
            .unwrap();
        assert!(p.remove_ground_bus(&bus).is_err());
        assert_eq!(p.ground_buses.len(), 1);
    }

    #[test]
    fn test_unknown_bus_rejected() {
        let mut p = project();
        assert!(matches!(
            p.add_power_symbol(Point::new(0.0, 0.0), Layer::Top, "nope"),
            Err(AnnotateError::NotFound { .. })
        ));
        assert!(p.add_ground_symbol(Point::new(0.0, 0.0), Layer::Top, Some("nope")).is_err());
    }

    #[test]
    fn test_trace_snaps_only_near_nodes() {
        let mut p = project();
        let a = p.add_via(Point::new(0.0, 0.0), Layer::Top, "#0a0", 6.0).unwrap();
        let b = p.add_pad(Point::new(100.0, 0.0), Layer::Top, "#aa0", 6.0).unwrap();
        let t = p
            .add_trace(
                &[
                    Point::new(1.0, 1.0),
                    Point::new(50.0, 20.0),
                    Point::new(99.0, -1.0),
                ],
                Layer::Top,
                "#c60",
                2.0,
            )
            .unwrap();
        let trace = p.strokes.iter().find(|s| s.id == t).unwrap();
        assert_eq!(trace.points[0].node_id, Some(a.node_id));
        assert_eq!(trace.points[1].node_id, None);
        assert_eq!(trace.points[2].node_id, Some(b.node_id));
        assert_eq!(trace.points[0].position(), Point::new(0.0, 0.0));

        assert!(matches!(
            p.add_trace(&[Point::new(0.0, 0.0)], Layer::Top, "#c60", 2.0),
            Err(AnnotateError::InvalidTrace(1))
        ));
    }

    #[test]
    fn test_connect_pin_bounds() {
        let mut p = project();
        let r = p.place_component(
            find_definition("Resistor").unwrap(),
            Layer::Bottom,
            Point::new(0.0, 0.0),
            InstanceOptions::default(),
        )
        .unwrap();
        assert!(matches!(
            p.connect_pin(&r, 3, NodeId(1)),
            Err(AnnotateError::PinOutOfRange { pin: 3, pin_count: 2, .. })
        ));
        assert!(p.connect_pin(&r, 0, NodeId(1)).is_err());
        p.connect_pin(&r, 2, NodeId(9)).unwrap();
        assert_eq!(p.component(&r).unwrap().pin_node(2), Some(NodeId(9)));
        p.disconnect_pin(&r, 2).unwrap();
        assert_eq!(p.component(&r).unwrap().pin_node(2), None);
        assert_eq!(p.bottom_components.len(), 1);
        assert!(p.connect_pin("missing", 1, NodeId(1)).is_err());
    }

    #[test]
    fn test_designators_continue_across_layers() {
        let mut p = project();
        let def = find_definition("Resistor").unwrap();
        p.place_component(def, Layer::Top, Point::default(), InstanceOptions::default()).unwrap();
        p.place_component(def, Layer::Bottom, Point::default(), InstanceOptions::default()).unwrap();
        let labels: Vec<&str> = p.components().map(|c| c.designator.as_str()).collect();
        assert_eq!(labels, vec!["R1", "R2"]);
    }

    #[test]
    fn test_duplicate_designator_rejected() {
        let mut p = project();
        let def = find_definition("Resistor").unwrap();
        let opts = |d: &str| InstanceOptions {
            designator: Some(d.to_string()),
            ..Default::default()
        };
        p.place_component(def, Layer::Top, Point::default(), opts("R1"))
            .unwrap();
        let err = p
            .place_component(def, Layer::Bottom, Point::default(), opts(" R1 "))
            .unwrap_err();
        assert!(matches!(err, AnnotateError::DuplicateDesignator(ref d) if d == "R1"));
        assert!(p.bottom_components.is_empty());

        // Assigned designators skip past the taken one.
        p.place_component(def, Layer::Bottom, Point::default(), InstanceOptions::default())
            .unwrap();
        assert_eq!(p.bottom_components[0].designator, "R2");
    }

    #[test]
    fn test_load_rejects_exhausted_node_ids() {
        let json = r##"{
            "name": "edge",
            "strokes": [{
                "id": "via-1", "type": "via", "color": "#0a0", "size": 6.0, "layer": "top",
                "points": [{"x": 0.0, "y": 0.0, "pointId": 4294967295}]
            }]
        }"##;
        assert!(matches!(
            Project::from_json(json),
            Err(AnnotateError::NodeIdsExhausted(NodeId(u32::MAX)))
        ));
    }

    #[test]
    fn test_creation_fails_once_ids_run_out() {
        let mut p = project();
        p.node_ids = NodeIdAllocator::after([NodeId(u32::MAX - 1)]).unwrap();
        let before = p.strokes.clone();
        assert!(matches!(
            p.add_via(Point::new(0.0, 0.0), Layer::Top, "#0a0", 6.0),
            Err(AnnotateError::NodeIdsExhausted(_))
        ));
        assert_eq!(p.strokes, before);

        let bus = p.add_power_bus("+5V", "+5V", "#f00");
        assert!(p.add_power_symbol(Point::new(0.0, 0.0), Layer::Top, &bus).is_err());
        assert!(p.power_symbols.is_empty());
    }

    #[test]
    fn test_load_reseeds_allocator() {
        let mut p = project();
        p.add_via(Point::new(0.0, 0.0), Layer::Top, "#0a0", 6.0).unwrap();
        p.add_via(Point::new(100.0, 0.0), Layer::Top, "#0a0", 6.0).unwrap();
        let json = p.to_json(false).unwrap();

        let mut loaded = Project::from_json(&json).unwrap();
        assert_eq!(loaded.strokes, p.strokes);
        let fresh = loaded.add_via(Point::new(500.0, 0.0), Layer::Top, "#0a0", 6.0).unwrap();
        assert_eq!(fresh.node_id, NodeId(3));
        assert!(loaded.strokes.iter().filter(|s| s.id == fresh.id).count() == 1);
    }

    #[test]
    fn test_removals() {
        let mut p = project();
        let v = p.add_via(Point::new(0.0, 0.0), Layer::Top, "#0a0", 6.0).unwrap();
        assert!(p.remove_stroke(&v.id).is_ok());
        assert!(p.remove_stroke(&v.id).is_err());
        let r = p.place_component(
            find_definition("Diode").unwrap(),
            Layer::Top,
            Point::default(),
            InstanceOptions::default(),
        )
        .unwrap();
        assert_eq!(p.remove_component(&r).unwrap().designator, "D1");
        assert!(p.components().next().is_none());
    }

    #[test]
    fn test_save_and_load_file() {
        let mut p = project();
        p.add_test_point(Point::new(5.0, 5.0), Layer::Bottom, "#00f", 4.0).unwrap();
        let path = std::env::temp_dir().join(format!("pcb-annotate-{}.json", std::process::id()));
        p.save(&path).unwrap();
        let loaded = Project::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded.strokes, p.strokes);
        assert_eq!(loaded.name, "test");
    }
}
