//! BMesh CLI - builds procedural test shapes and reports on their topology.
//!
//! Usage: bmesh <COMMAND> [OPTIONS]
//!
//! Run `bmesh --help` for available commands. Set `RUST_LOG=debug` to see
//! kernel diagnostics.

use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};
use nalgebra::Point3;

use bmesh::attribute::{AttributeDefinition, AttributeValue, BaseType, ElementKind};
use bmesh::geometry::MATERIAL_ID;
use bmesh::mesh::{build_from_quads, build_from_triangles, BMesh};
use bmesh::options::MeshOptions;

#[derive(Parser)]
#[command(name = "bmesh")]
#[command(author, version, about = "Topological mesh kernel CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a shape and display its topology and geometry
    Info {
        /// Shape to build
        #[arg(short, long, value_enum, default_value = "grid")]
        shape: Shape,

        /// Shape resolution (grid cells per side, fan segments)
        #[arg(short = 'n', long, default_value = "4")]
        size: usize,

        /// Reverse triangle winding in the extracted geometry
        #[arg(long)]
        flip: bool,

        /// Assign material ids 0, 1, 2 to faces in turn
        #[arg(long)]
        material_stripes: bool,

        /// Use single-threaded execution (for benchmarking)
        #[arg(long)]
        sequential: bool,
    },

    /// Build a shape, then remove every face and vertex, validating each step
    Strip {
        /// Shape to build
        #[arg(short, long, value_enum, default_value = "grid")]
        shape: Shape,

        /// Shape resolution (grid cells per side, fan segments)
        #[arg(short = 'n', long, default_value = "4")]
        size: usize,

        /// Remove faces newest first
        #[arg(long)]
        reverse: bool,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Shape {
    /// A single unit quad
    Quad,
    /// A flat grid of quads
    Grid,
    /// A closed unit cube made of six quads
    Cube,
    /// A disk of triangles around a center vertex
    Fan,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info {
            shape,
            size,
            flip,
            material_stripes,
            sequential,
        } => {
            let options = MeshOptions::default()
                .with_flip_faces(flip)
                .with_parallel(!sequential);
            cmd_info(shape, size, options, material_stripes)?;
        }

        Commands::Strip {
            shape,
            size,
            reverse,
        } => {
            cmd_strip(shape, size, reverse)?;
        }
    }

    Ok(())
}

fn build_shape(shape: Shape, size: usize) -> Result<BMesh, Box<dyn std::error::Error>> {
    let mesh = match shape {
        Shape::Quad => {
            let mut mesh = BMesh::new();
            let corners = [
                mesh.add_vertex(Point3::new(0.0, 0.0, 0.0)),
                mesh.add_vertex(Point3::new(1.0, 0.0, 0.0)),
                mesh.add_vertex(Point3::new(1.0, 1.0, 0.0)),
                mesh.add_vertex(Point3::new(0.0, 1.0, 0.0)),
            ];
            mesh.add_face(&corners).ok_or("failed to add quad face")?;
            mesh
        }
        Shape::Grid => {
            let n = size.max(1);
            let mut vertices = Vec::with_capacity((n + 1) * (n + 1));
            for j in 0..=n {
                for i in 0..=n {
                    vertices.push(Point3::new(i as f64 / n as f64, j as f64 / n as f64, 0.0));
                }
            }
            let mut faces = Vec::with_capacity(n * n);
            for j in 0..n {
                for i in 0..n {
                    let v00 = j * (n + 1) + i;
                    faces.push([v00, v00 + 1, v00 + n + 2, v00 + n + 1]);
                }
            }
            build_from_quads(&vertices, &faces)?
        }
        Shape::Cube => {
            let vertices: Vec<Point3<f64>> = (0..8)
                .map(|i| {
                    Point3::new(
                        (i & 1) as f64,
                        ((i >> 1) & 1) as f64,
                        ((i >> 2) & 1) as f64,
                    )
                })
                .collect();
            // Outward-facing, counter-clockwise seen from outside.
            let faces = [
                [0, 2, 3, 1], // bottom
                [4, 5, 7, 6], // top
                [0, 1, 5, 4], // front
                [2, 6, 7, 3], // back
                [0, 4, 6, 2], // left
                [1, 3, 7, 5], // right
            ];
            build_from_quads(&vertices, &faces)?
        }
        Shape::Fan => {
            let n = size.max(3);
            let mut vertices = vec![Point3::origin()];
            for i in 0..n {
                let t = i as f64 * std::f64::consts::TAU / n as f64;
                vertices.push(Point3::new(t.cos(), t.sin(), 0.0));
            }
            let faces: Vec<[usize; 3]> = (0..n).map(|i| [0, 1 + i, 1 + (i + 1) % n]).collect();
            build_from_triangles(&vertices, &faces)?
        }
    };

    Ok(mesh)
}

fn cmd_info(
    shape: Shape,
    size: usize,
    options: MeshOptions,
    material_stripes: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();
    let mut mesh = build_shape(shape, size)?;
    mesh.set_options(options);

    if material_stripes {
        mesh.define_attribute(
            ElementKind::Face,
            AttributeDefinition::new(MATERIAL_ID, BaseType::Int, 1),
        );
        let faces: Vec<_> = mesh.face_keys().collect();
        for (i, f) in faces.into_iter().enumerate() {
            mesh.set_attribute(f.into(), MATERIAL_ID, AttributeValue::Int((i % 3) as i64))?;
        }
    }

    mesh.validate()?;

    println!("Vertices: {}", mesh.num_vertices());
    println!("Edges: {}", mesh.num_edges());
    println!("Loops: {}", mesh.num_loops());
    println!("Faces: {}", mesh.num_faces());

    let boundary = mesh
        .edge_keys()
        .filter(|&e| mesh.edge_faces(e).count() == 1)
        .count();
    let non_manifold = mesh
        .edge_keys()
        .filter(|&e| mesh.edge_faces(e).count() > 2)
        .count();
    let max_valence = mesh.vertex_keys().map(|v| mesh.valence(v)).max().unwrap_or(0);
    if boundary == 0 {
        println!("Topology: Closed (no boundary)");
    } else {
        println!("Topology: Open ({} boundary edges)", boundary);
    }
    if non_manifold > 0 {
        println!("Non-manifold edges: {}", non_manifold);
    }
    println!("Max valence: {}", max_valence);

    let arrays = mesh.arrays()?;
    let elapsed = start.elapsed();

    println!("Triangles: {}", arrays.num_triangles());
    let min = arrays.aabb.min;
    let max = arrays.aabb.max;
    println!(
        "Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
        min.x, min.y, min.z, max.x, max.y, max.z
    );
    for (id, surface) in &arrays.surfaces {
        println!("Surface {}: {} triangles", id, surface.len() / 3);
    }
    println!("Built in {:.2?}", elapsed);

    Ok(())
}

fn cmd_strip(shape: Shape, size: usize, reverse: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut mesh = build_shape(shape, size)?;

    println!(
        "Built: {} vertices, {} edges, {} faces",
        mesh.num_vertices(),
        mesh.num_edges(),
        mesh.num_faces()
    );

    let start = Instant::now();

    let mut faces: Vec<_> = mesh.face_keys().collect();
    if reverse {
        faces.reverse();
    }
    for f in faces {
        mesh.remove_face(f);
        mesh.validate()?;
    }
    println!(
        "Faces removed: {} vertices, {} edges, {} loops remain",
        mesh.num_vertices(),
        mesh.num_edges(),
        mesh.num_loops()
    );

    let vertices: Vec<_> = mesh.vertex_keys().collect();
    for v in vertices {
        mesh.remove_vertex(v);
        mesh.validate()?;
    }
    let elapsed = start.elapsed();

    println!(
        "Result: {} vertices, {} edges, {} loops, {} faces ({:.2?})",
        mesh.num_vertices(),
        mesh.num_edges(),
        mesh.num_loops(),
        mesh.num_faces(),
        elapsed
    );

    Ok(())
}
