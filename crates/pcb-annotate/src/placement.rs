use crate::error::PlacementError;
use crate::types::{serialize_f64_rounded, Point};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Arrangement {
    Linear,
    TwoSided,
    FourSided,
}

impl FromStr for Arrangement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linear" => Ok(Arrangement::Linear),
            "two-sided" | "2" => Ok(Arrangement::TwoSided),
            "four-sided" | "4" => Ok(Arrangement::FourSided),
            _ => Err(format!(
                "Unknown arrangement: {s}. Use: linear, two-sided, four-sided"
            )),
        }
    }
}

/// Which pair of parallel edges a two-sided package uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeOrientation {
    /// Left and right edges (DIP/SOIC style).
    Vertical,
    /// Top and bottom edges.
    Horizontal,
}

impl EdgeOrientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeOrientation::Vertical => "vertical",
            EdgeOrientation::Horizontal => "horizontal",
        }
    }
}

impl FromStr for EdgeOrientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "vertical" | "v" => Ok(EdgeOrientation::Vertical),
            "horizontal" | "h" => Ok(EdgeOrientation::Horizontal),
            _ => Err(format!("Unknown orientation: {s}. Use: vertical, horizontal")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Corner {
    TopLeft,
    BottomLeft,
    BottomRight,
    TopRight,
}

impl Corner {
    /// Counter-clockwise order; edge `i` runs from `CCW[i]` to `CCW[i + 1]`.
    const CCW: [Corner; 4] = [
        Corner::TopLeft,
        Corner::BottomLeft,
        Corner::BottomRight,
        Corner::TopRight,
    ];

    fn index(self) -> usize {
        match self {
            Corner::TopLeft => 0,
            Corner::BottomLeft => 1,
            Corner::BottomRight => 2,
            Corner::TopRight => 3,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Corner::TopLeft => "top-left",
            Corner::BottomLeft => "bottom-left",
            Corner::BottomRight => "bottom-right",
            Corner::TopRight => "top-right",
        }
    }
}

/// One generated pad/via position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PinPlacement {
    pub pin: usize,
    #[serde(serialize_with = "serialize_f64_rounded")]
    pub x: f64,
    #[serde(serialize_with = "serialize_f64_rounded")]
    pub y: f64,
}

struct Rect {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl Rect {
    fn corner(&self, c: Corner) -> Point {
        match c {
            Corner::TopLeft => Point::new(self.min_x, self.min_y),
            Corner::BottomLeft => Point::new(self.min_x, self.max_y),
            Corner::BottomRight => Point::new(self.max_x, self.max_y),
            Corner::TopRight => Point::new(self.max_x, self.min_y),
        }
    }

    /// Endpoints of the `step`-th edge counter-clockwise from `start`.
    fn edge(&self, start: Corner, step: usize) -> (Point, Point) {
        let i = start.index() + step;
        (
            self.corner(Corner::CCW[i % 4]),
            self.corner(Corner::CCW[(i + 1) % 4]),
        )
    }
}

fn lerp(a: Point, b: Point, t: f64) -> Point {
    Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
}

/// Compute pad/via positions for an IC footprint.
///
/// `pin1` is the click and `opposite` the drag-release corner, in canvas
/// coordinates (y grows downward). Edges are walked counter-clockwise on
/// screen starting from Pin 1's corner.
pub fn generate_placements(
    num_pins: usize,
    arrangement: Arrangement,
    orientation: Option<EdgeOrientation>,
    pin1: Point,
    opposite: Point,
) -> Result<Vec<PinPlacement>, PlacementError> {
    if num_pins == 0 {
        return Err(PlacementError::NoPins);
    }
    match arrangement {
        Arrangement::TwoSided if num_pins % 2 != 0 => {
            return Err(PlacementError::OddPinCount(num_pins))
        }
        Arrangement::FourSided if num_pins % 4 != 0 => {
            return Err(PlacementError::NotDivisibleByFour(num_pins))
        }
        _ => {}
    }
    if pin1.x == opposite.x || pin1.y == opposite.y {
        return Err(PlacementError::DegenerateRectangle);
    }

    let rect = Rect {
        min_x: pin1.x.min(opposite.x),
        min_y: pin1.y.min(opposite.y),
        max_x: pin1.x.max(opposite.x),
        max_y: pin1.y.max(opposite.y),
    };
    let corner = match (pin1.x < opposite.x, pin1.y < opposite.y) {
        (true, true) => Corner::TopLeft,
        (true, false) => Corner::BottomLeft,
        (false, false) => Corner::BottomRight,
        (false, true) => Corner::TopRight,
    };

    let points = match arrangement {
        Arrangement::Linear => linear(num_pins, &rect, pin1, opposite),
        Arrangement::TwoSided => two_sided(num_pins, &rect, corner, orientation)?,
        Arrangement::FourSided => four_sided(num_pins, &rect, corner),
    };

    log::debug!(
        "generated {} {:?} placements from pin 1 at {}",
        points.len(),
        arrangement,
        corner.name()
    );

    Ok(points
        .into_iter()
        .enumerate()
        .map(|(i, p)| PinPlacement {
            pin: i + 1,
            x: p.x,
            y: p.y,
        })
        .collect())
}

/// Single row along the longer dimension, centred on the shorter one.
fn linear(num_pins: usize, rect: &Rect, pin1: Point, opposite: Point) -> Vec<Point> {
    let along_x = rect.max_x - rect.min_x >= rect.max_y - rect.min_y;
    let (start, end) = if along_x {
        let y = (rect.min_y + rect.max_y) / 2.0;
        (Point::new(pin1.x, y), Point::new(opposite.x, y))
    } else {
        let x = (rect.min_x + rect.max_x) / 2.0;
        (Point::new(x, pin1.y), Point::new(x, opposite.y))
    };
    if num_pins == 1 {
        return vec![lerp(start, end, 0.5)];
    }
    let last = (num_pins - 1) as f64;
    (0..num_pins)
        .map(|i| lerp(start, end, i as f64 / last))
        .collect()
}

/// Pins on one pair of parallel edges, landing on the edge endpoints.
fn two_sided(
    num_pins: usize,
    rect: &Rect,
    corner: Corner,
    orientation: Option<EdgeOrientation>,
) -> Result<Vec<Point>, PlacementError> {
    let starts_vertical = matches!(corner, Corner::TopLeft | Corner::BottomRight);
    let orientation = orientation.unwrap_or(if starts_vertical {
        EdgeOrientation::Vertical
    } else {
        EdgeOrientation::Horizontal
    });
    let allowed = match orientation {
        EdgeOrientation::Vertical => starts_vertical,
        EdgeOrientation::Horizontal => !starts_vertical,
    };
    if !allowed {
        return Err(PlacementError::Pin1Corner {
            orientation: orientation.as_str(),
            corner: corner.name(),
        });
    }

    let per_side = num_pins / 2;
    let mut points = Vec::with_capacity(num_pins);
    for step in [0, 2] {
        let (a, b) = rect.edge(corner, step);
        if per_side == 1 {
            points.push(lerp(a, b, 0.5));
            continue;
        }
        let last = (per_side - 1) as f64;
        points.extend((0..per_side).map(|j| lerp(a, b, j as f64 / last)));
    }
    Ok(points)
}

/// Pins on all four edges, inset so no pin sits on a corner.
fn four_sided(num_pins: usize, rect: &Rect, corner: Corner) -> Vec<Point> {
    let per_side = num_pins / 4;
    let divisions = (per_side + 1) as f64;
    let mut points = Vec::with_capacity(num_pins);
    for step in 0..4 {
        let (a, b) = rect.edge(corner, step);
        points.extend((1..=per_side).map(|j| lerp(a, b, j as f64 / divisions)));
    }
    points
}
