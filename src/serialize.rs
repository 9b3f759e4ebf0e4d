/// Reverse serializer: construction nodes back to canonical DSL text.
///
/// Emission follows the grammar table's field order exactly, recursing into
/// composite operands recorded in provenance. Numbers are canonicalized
/// (integral values print without a decimal point), so repeated
/// parse → evaluate → serialize round-trips are stable even when the
/// original whitespace or number formatting differs.
use crate::ast::{Command, CommandKind};
use crate::backend::GeometryBackend;
use crate::document::{ConstructionNode, Provenance};
use crate::error::SerializeError;
use std::fmt::Write as _;

/// The serializer's output. `Approximate` marks text reconstructed from
/// geometry with no recorded provenance; re-evaluating it will not
/// reproduce the original shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Description {
    Exact(String),
    Approximate(String),
}

impl Description {
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Exact(text) | Self::Approximate(text) => text,
        }
    }

    #[must_use]
    pub const fn is_lossy(&self) -> bool {
        matches!(self, Self::Approximate(_))
    }
}

/// Re-emit the command that produced `node`.
///
/// Nodes without provenance fall back to a coarse structural
/// decomposition: an axis-aligned bounding box queried from the backend,
/// emitted as a placeholder `CREATE BOX` and flagged [`Description::Approximate`].
///
/// # Errors
/// `SerializeError::NoProvenance` when the node has neither provenance nor
/// a shape the backend can approximate.
pub fn describe_node(
    node: &ConstructionNode,
    backend: &dyn GeometryBackend,
) -> Result<Description, SerializeError> {
    match &node.provenance {
        Provenance::Command(command) => Ok(Description::Exact(command_text(command))),
        Provenance::External => {
            let shape = node.shape.ok_or_else(|| {
                SerializeError::NoProvenance("node has no shape handle".to_string())
            })?;
            let (min, max) = backend
                .bounding_box(shape)
                .map_err(|e| SerializeError::NoProvenance(e.0))?;
            let mut out = String::new();
            let _ = write!(
                out,
                "CREATE BOX ORIGIN {} {} {} SIZE {} {} HEIGHT {}",
                num(min[0]),
                num(min[1]),
                num(min[2]),
                num(max[0] - min[0]),
                num(max[1] - min[1]),
                num(max[2] - min[2]),
            );
            Ok(Description::Approximate(out))
        }
    }
}

/// Canonical text of one command tree.
#[must_use]
pub fn command_text(command: &Command) -> String {
    let mut out = String::new();
    write_command(command, &mut out);
    out
}

fn write_command(command: &Command, out: &mut String) {
    match &command.kind {
        CommandKind::Box {
            origin,
            size,
            height,
        } => {
            out.push_str("CREATE BOX ORIGIN");
            push_vec3(out, *origin);
            out.push_str(" SIZE");
            push_vec2(out, *size);
            out.push_str(" HEIGHT");
            push_num(out, *height);
        }
        CommandKind::Arc {
            center,
            start,
            normal,
            angle,
        } => {
            out.push_str("CREATE ARC CENTER");
            push_vec3(out, *center);
            out.push_str(" START");
            push_vec3(out, *start);
            out.push_str(" NORMAL");
            push_vec3(out, *normal);
            out.push_str(" ANGLE");
            push_num(out, *angle);
        }
        CommandKind::Circle {
            center,
            radius,
            normal,
        } => {
            out.push_str("CREATE CIRCLE CENTER");
            push_vec3(out, *center);
            out.push_str(" RADIUS");
            push_num(out, *radius);
            out.push_str(" NORMAL");
            push_vec3(out, *normal);
        }
        CommandKind::Line { from, to } => {
            out.push_str("CREATE LINE FROM");
            push_vec3(out, *from);
            out.push_str(" TO");
            push_vec3(out, *to);
        }
        CommandKind::Polygon { points } => {
            out.push_str("CREATE POLYGON POINTS");
            for point in points {
                push_vec3(out, *point);
            }
        }
        CommandKind::Rectangle { origin, size } => {
            out.push_str("CREATE RECTANGLE ORIGIN");
            push_vec3(out, *origin);
            out.push_str(" SIZE");
            push_vec2(out, *size);
        }
        CommandKind::Folder { name } => {
            out.push_str("CREATE FOLDER");
            if let Some(name) = name {
                out.push_str(" NAME ");
                out.push_str(name);
            }
        }
        CommandKind::Prism { section, length } => {
            out.push_str("CREATE PRISM SECTION ");
            write_command(section, out);
            out.push_str(" LENGTH");
            push_num(out, *length);
        }
        CommandKind::Revolve {
            profile,
            axis_origin,
            axis_direction,
            angle,
        } => {
            out.push_str("CREATE REVOLVE PROFILE ");
            write_command(profile, out);
            out.push_str(" AXIS ORIGIN");
            push_vec3(out, *axis_origin);
            out.push_str(" DIRECTION");
            push_vec3(out, *axis_direction);
            out.push_str(" ANGLE");
            push_num(out, *angle);
        }
        CommandKind::Sweep { profile, path } => {
            out.push_str("CREATE SWEEP PROFILE ");
            write_command(profile, out);
            out.push_str(" PATH ");
            write_command(path, out);
        }
        CommandKind::Bezier { points } => {
            out.push_str("CREATE BEZIER POINTS");
            for point in points {
                push_vec3(out, *point);
            }
        }
        CommandKind::Boolean { op, first, second } => {
            out.push_str("CREATE BOOLEAN ");
            out.push_str(op.keyword());
            out.push_str(" FIRST ");
            write_command(first, out);
            out.push_str(" SECOND ");
            write_command(second, out);
        }
        CommandKind::FaceFromWire { wire } => {
            out.push_str("CREATE FACE WIRE ");
            write_command(wire, out);
        }
        CommandKind::FaceFromEdges { edges } => {
            out.push_str("CREATE FACE EDGES ");
            write_edge_list(edges, out);
        }
        CommandKind::Wire { edges } => {
            out.push_str("CREATE WIRE EDGES ");
            write_edge_list(edges, out);
        }
        CommandKind::ThickSolid { base, thickness } => {
            out.push_str("CREATE THICKSOLID ");
            write_command(base, out);
            out.push_str(" THICKNESS");
            push_num(out, *thickness);
        }
        // Variable and assignment wrappers re-emit their resolved body so
        // the canonical text is self-contained (re-parsable without the
        // environment that bound the name).
        CommandKind::VarRef { body, .. } | CommandKind::Assignment { body, .. } => {
            write_command(body, out);
        }
    }
    if let Some(material) = &command.material {
        out.push_str(" WITH MATERIAL ");
        out.push_str(&material.category);
        out.push('.');
        out.push_str(&material.preset);
    }
}

fn write_edge_list(edges: &[Command], out: &mut String) {
    for (i, edge) in edges.iter().enumerate() {
        if i > 0 {
            out.push_str(" AND ");
        }
        write_command(edge, out);
    }
}

fn push_vec3(out: &mut String, v: [f64; 3]) {
    for component in v {
        push_num(out, component);
    }
}

fn push_vec2(out: &mut String, v: [f64; 2]) {
    for component in v {
        push_num(out, component);
    }
}

fn push_num(out: &mut String, n: f64) {
    out.push(' ');
    out.push_str(&num(n));
}

/// Canonical number formatting: integral values without a decimal point,
/// everything else via Rust's shortest-round-trip `f64` formatting.
#[must_use]
pub fn num(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}
