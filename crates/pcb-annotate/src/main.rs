use clap::{Parser, Subcommand};
use pcb_annotate::bom::generate_bom;
use pcb_annotate::netlist::build_netlist;
use pcb_annotate::placement::{generate_placements, Arrangement, EdgeOrientation};
use pcb_annotate::schematic::schematic_text;
use pcb_annotate::types::Point;
use pcb_annotate::{load_project, AnnotateError, EditorOptions};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "pcb-annotate",
    about = "Connectivity, BOM and netlist export for PCB annotation projects"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Bill of materials as JSON or CSV
    Bom {
        /// Project JSON file
        project: PathBuf,
        /// Write CSV instead of JSON
        #[arg(long)]
        csv: bool,
        /// Project name to record in the BOM (defaults to the project's own)
        #[arg(long)]
        name: Option<String>,
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Every net with its members and node type
    Nets {
        project: PathBuf,
        #[arg(long)]
        pretty: bool,
    },
    /// Netlist text
    Netlist {
        project: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Schematic text
    Schematic {
        project: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Generate IC pad/via positions
    PlaceIc {
        /// Number of pins
        #[arg(long)]
        pins: usize,
        /// linear, two-sided or four-sided
        #[arg(long)]
        arrangement: Arrangement,
        /// vertical or horizontal (two-sided only; inferred from Pin 1 if omitted)
        #[arg(long)]
        orientation: Option<EdgeOrientation>,
        /// Pin 1 corner as X,Y
        #[arg(long, value_parser = parse_point)]
        from: Point,
        /// Opposite corner as X,Y
        #[arg(long, value_parser = parse_point)]
        to: Point,
        #[arg(long)]
        pretty: bool,
    },
}

fn parse_point(s: &str) -> Result<Point, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("Expected X,Y but got: {s}"))?;
    let x: f64 = x.trim().parse().map_err(|_| format!("Bad X coordinate: {x}"))?;
    let y: f64 = y.trim().parse().map_err(|_| format!("Bad Y coordinate: {y}"))?;
    Ok(Point::new(x, y))
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String, AnnotateError> {
    Ok(if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    })
}

fn emit(text: &str, output: Option<&Path>) -> Result<(), AnnotateError> {
    match output {
        Some(path) => {
            std::fs::write(path, text)?;
            eprintln!("Written to {}", path.display());
        }
        None => println!("{}", text.trim_end()),
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), AnnotateError> {
    let opts = EditorOptions::default();
    match cli.command {
        Command::Bom {
            project,
            csv,
            name,
            output,
            pretty,
        } => {
            let (project, _) = load_project(&project, &opts)?;
            let name = name.unwrap_or_else(|| project.name.clone());
            let name = (!name.is_empty()).then_some(name.as_str());
            let bom = generate_bom(&project.top_components, &project.bottom_components, name);
            let text = if csv {
                bom.to_csv()?
            } else {
                to_json(&bom, pretty)?
            };
            emit(&text, output.as_deref())
        }
        Command::Nets { project, pretty } => {
            let (_, manager) = load_project(&project, &opts)?;
            let nets: Vec<_> = manager.all_nets().collect();
            emit(&to_json(&nets, pretty)?, None)
        }
        Command::Netlist { project, output } => {
            let (project, manager) = load_project(&project, &opts)?;
            emit(&build_netlist(&project, &manager).to_text(), output.as_deref())
        }
        Command::Schematic { project, output } => {
            let (project, manager) = load_project(&project, &opts)?;
            let title = if project.name.is_empty() {
                "Untitled"
            } else {
                project.name.as_str()
            };
            emit(&schematic_text(&project, &manager, title), output.as_deref())
        }
        Command::PlaceIc {
            pins,
            arrangement,
            orientation,
            from,
            to,
            pretty,
        } => {
            let placements = generate_placements(pins, arrangement, orientation, from, to)?;
            emit(&to_json(&placements, pretty)?, None)
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
