//! Post-order evaluator: walks an ACT, calls the geometry backend, and
//! grows the construction-node graph.
//!
//! Children evaluate before their parent; the inputs a boolean, wire, or
//! face folds into itself are detached from the document afterwards
//! (consumed-input semantics). Any backend rejection aborts the run;
//! nothing already committed is rolled back.

use crate::ast::{Command, CommandKind};
use crate::backend::{GeometryBackend, ShapeHandle};
use crate::document::{ConstructionNode, Document, NodeId, Provenance, ShapeClass};
use crate::env::Environment;
use crate::error::{EvalError, Warning};
use crate::material::MaterialRegistry;
use tracing::{debug, warn};

pub struct Evaluator<'a> {
    backend: &'a mut dyn GeometryBackend,
    materials: &'a mut dyn MaterialRegistry,
    /// Non-fatal conditions recorded during this run.
    pub warnings: Vec<Warning>,
}

impl<'a> Evaluator<'a> {
    pub fn new(
        backend: &'a mut dyn GeometryBackend,
        materials: &'a mut dyn MaterialRegistry,
    ) -> Self {
        Self {
            backend,
            materials,
            warnings: Vec::new(),
        }
    }

    /// Evaluate one command tree, adding its node (and any surviving
    /// child nodes) to `document`. Returns the id of the command's own
    /// resulting node.
    pub fn evaluate(
        &mut self,
        command: &Command,
        env: &mut Environment,
        document: &mut Document,
    ) -> Result<NodeId, EvalError> {
        let id = self.evaluate_kind(command, env, document)?;
        if let Some(material) = &command.material {
            let handle = self
                .materials
                .resolve(&material.category, &material.preset)
                .ok_or_else(|| EvalError::UnknownMaterial {
                    category: material.category.clone(),
                    preset: material.preset.clone(),
                })?;
            let material_id = self.materials.create_and_register(handle);
            if let Some(node) = document.get_mut(id) {
                node.material = Some(material_id);
            }
        }
        Ok(id)
    }

    fn evaluate_kind(
        &mut self,
        command: &Command,
        env: &mut Environment,
        document: &mut Document,
    ) -> Result<NodeId, EvalError> {
        match &command.kind {
            CommandKind::Box {
                origin,
                size,
                height,
            } => {
                let shape = self
                    .backend
                    .make_box(*origin, *size, *height)
                    .map_err(|e| EvalError::Backend(e.0))?;
                Ok(self.commit(command, shape, ShapeClass::Solid, document))
            }
            CommandKind::Arc {
                center,
                start,
                normal,
                angle,
            } => {
                let shape = self
                    .backend
                    .make_arc(*center, *start, *normal, *angle)
                    .map_err(|e| EvalError::Backend(e.0))?;
                Ok(self.commit(command, shape, ShapeClass::Edge, document))
            }
            CommandKind::Circle {
                center,
                radius,
                normal,
            } => {
                let shape = self
                    .backend
                    .make_circle(*center, *radius, *normal)
                    .map_err(|e| EvalError::Backend(e.0))?;
                Ok(self.commit(command, shape, ShapeClass::Wire, document))
            }
            CommandKind::Line { from, to } => {
                let shape = self
                    .backend
                    .make_line(*from, *to)
                    .map_err(|e| EvalError::Backend(e.0))?;
                Ok(self.commit(command, shape, ShapeClass::Edge, document))
            }
            CommandKind::Polygon { points } => {
                let shape = self
                    .backend
                    .make_polygon(points)
                    .map_err(|e| EvalError::Backend(e.0))?;
                Ok(self.commit(command, shape, ShapeClass::Wire, document))
            }
            CommandKind::Rectangle { origin, size } => {
                let shape = self
                    .backend
                    .make_rect(*origin, *size)
                    .map_err(|e| EvalError::Backend(e.0))?;
                Ok(self.commit(command, shape, ShapeClass::Wire, document))
            }
            CommandKind::Bezier { points } => {
                let shape = self
                    .backend
                    .make_bezier(points)
                    .map_err(|e| EvalError::Backend(e.0))?;
                Ok(self.commit(command, shape, ShapeClass::Edge, document))
            }
            CommandKind::Folder { .. } => {
                // Folders carry no geometry.
                Ok(document.add(ConstructionNode {
                    shape: None,
                    class: ShapeClass::Empty,
                    provenance: Provenance::Command(command.clone()),
                    material: None,
                }))
            }
            CommandKind::Prism { section, length } => {
                let section_id = self.evaluate(section, env, document)?;
                let handle = self.profile_handle(section_id, document, "PRISM", "SECTION")?;
                let shape = self
                    .backend
                    .prism(handle, *length)
                    .map_err(|e| EvalError::Backend(e.0))?;
                Ok(self.commit(command, shape, ShapeClass::Solid, document))
            }
            CommandKind::Revolve {
                profile,
                axis_origin,
                axis_direction,
                angle,
            } => {
                let profile_id = self.evaluate(profile, env, document)?;
                let handle = self.profile_handle(profile_id, document, "REVOLVE", "PROFILE")?;
                let shape = self
                    .backend
                    .revolve(
                        handle,
                        *axis_origin,
                        *axis_direction,
                        normalize_angle(*angle),
                    )
                    .map_err(|e| EvalError::Backend(e.0))?;
                Ok(self.commit(command, shape, ShapeClass::Solid, document))
            }
            CommandKind::Sweep { profile, path } => {
                let profile_id = self.evaluate(profile, env, document)?;
                let path_id = self.evaluate(path, env, document)?;
                let profile_handle =
                    self.profile_handle(profile_id, document, "SWEEP", "PROFILE")?;
                let path_handle = self.path_handle(path_id, document)?;
                let shape = self
                    .backend
                    .sweep(profile_handle, path_handle)
                    .map_err(|e| EvalError::Backend(e.0))?;
                Ok(self.commit(command, shape, ShapeClass::Solid, document))
            }
            CommandKind::ThickSolid { base, thickness } => {
                // Whether the base qualifies (a prism result) is the
                // backend's precondition; its rejection propagates.
                let base_id = self.evaluate(base, env, document)?;
                let handle = self.shape_of(base_id, document, base.kind_name())?;
                let shape = self
                    .backend
                    .make_thick_solid(handle, *thickness)
                    .map_err(|e| EvalError::Backend(e.0))?;
                Ok(self.commit(command, shape, ShapeClass::Solid, document))
            }
            CommandKind::Boolean { op, first, second } => {
                let first_id = self.evaluate(first, env, document)?;
                let second_id = self.evaluate(second, env, document)?;
                let a = self.shape_of(first_id, document, first.kind_name())?;
                let b = self.shape_of(second_id, document, second.kind_name())?;
                let out = self
                    .backend
                    .boolean(*op, a, b)
                    .map_err(|e| EvalError::Backend(e.0))?;
                let (shape, class) = if out.solids.len() == 1 {
                    (out.solids[0], ShapeClass::Solid)
                } else {
                    let warning = Warning::AmbiguousBooleanResult {
                        solids: out.solids.len(),
                    };
                    warn!(solids = out.solids.len(), "keeping compound boolean result");
                    self.warnings.push(warning);
                    (out.shape, ShapeClass::Compound)
                };
                // Consumed inputs leave the document only after the
                // boolean itself succeeded.
                document.detach(first_id);
                document.detach(second_id);
                Ok(self.commit(command, shape, class, document))
            }
            CommandKind::Wire { edges } => {
                let ids = self.evaluate_all(edges, env, document)?;
                let handles = self.shapes_of(&ids, edges, document)?;
                let shape = self
                    .backend
                    .wire(&handles)
                    .map_err(|e| EvalError::Backend(e.0))?;
                for id in ids {
                    document.detach(id);
                }
                Ok(self.commit(command, shape, ShapeClass::Wire, document))
            }
            CommandKind::FaceFromWire { wire } => {
                let wire_id = self.evaluate(wire, env, document)?;
                let handle = self.shape_of(wire_id, document, wire.kind_name())?;
                // Planarity/closure validation is delegated to the backend.
                let shape = self
                    .backend
                    .face_from_wire(handle)
                    .map_err(|e| EvalError::Backend(e.0))?;
                document.detach(wire_id);
                Ok(self.commit(command, shape, ShapeClass::Face, document))
            }
            CommandKind::FaceFromEdges { edges } => {
                let ids = self.evaluate_all(edges, env, document)?;
                let handles = self.shapes_of(&ids, edges, document)?;
                let shape = self
                    .backend
                    .face_from_edges(&handles)
                    .map_err(|e| EvalError::Backend(e.0))?;
                for id in ids {
                    document.detach(id);
                }
                Ok(self.commit(command, shape, ShapeClass::Face, document))
            }
            CommandKind::VarRef { name, body } => {
                // Lazy, at-most-once materialization per run.
                if let Some(id) = env.result_of(name) {
                    if document.contains(id) {
                        debug!(name, "reusing memoized variable result");
                        return Ok(id);
                    }
                    // The memoized node was folded into a composite; its
                    // shape no longer exists to be reused.
                    return Err(EvalError::ConsumedVariable(name.clone()));
                }
                let id = self.evaluate(body, env, document)?;
                env.memoize(name, id);
                Ok(id)
            }
            CommandKind::Assignment { name, body } => {
                // Pass-through: an assignment evaluates to its right side.
                let id = self.evaluate(body, env, document)?;
                env.memoize(name, id);
                Ok(id)
            }
        }
    }

    fn evaluate_all(
        &mut self,
        commands: &[Command],
        env: &mut Environment,
        document: &mut Document,
    ) -> Result<Vec<NodeId>, EvalError> {
        commands
            .iter()
            .map(|cmd| self.evaluate(cmd, env, document))
            .collect()
    }

    fn commit(
        &mut self,
        command: &Command,
        shape: ShapeHandle,
        class: ShapeClass,
        document: &mut Document,
    ) -> NodeId {
        document.add(ConstructionNode {
            shape: Some(shape),
            class,
            provenance: Provenance::Command(command.clone()),
            material: None,
        })
    }

    fn shape_of(
        &self,
        id: NodeId,
        document: &Document,
        kind_name: &'static str,
    ) -> Result<ShapeHandle, EvalError> {
        document
            .get(id)
            .and_then(|node| node.shape)
            .ok_or(EvalError::MissingShape(kind_name))
    }

    fn shapes_of(
        &self,
        ids: &[NodeId],
        commands: &[Command],
        document: &Document,
    ) -> Result<Vec<ShapeHandle>, EvalError> {
        ids.iter()
            .zip(commands)
            .map(|(id, cmd)| self.shape_of(*id, document, cmd.kind_name()))
            .collect()
    }

    /// Enforce the 2D-profile precondition of prism/revolve/sweep.
    fn profile_handle(
        &self,
        id: NodeId,
        document: &Document,
        command: &'static str,
        field: &'static str,
    ) -> Result<ShapeHandle, EvalError> {
        let node = document
            .get(id)
            .ok_or(EvalError::Not2D { command, field })?;
        match node.class {
            ShapeClass::Wire | ShapeClass::Face => {
                node.shape.ok_or(EvalError::Not2D { command, field })
            }
            _ => Err(EvalError::Not2D { command, field }),
        }
    }

    /// A sweep path must be a wire or a single edge.
    fn path_handle(&self, id: NodeId, document: &Document) -> Result<ShapeHandle, EvalError> {
        let node = document.get(id).ok_or(EvalError::Not2D {
            command: "SWEEP",
            field: "PATH",
        })?;
        match node.class {
            ShapeClass::Wire | ShapeClass::Edge => node.shape.ok_or(EvalError::Not2D {
                command: "SWEEP",
                field: "PATH",
            }),
            _ => Err(EvalError::Not2D {
                command: "SWEEP",
                field: "PATH",
            }),
        }
    }
}

/// Normalize a revolve angle in degrees into `(0, 360]`.
fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped == 0.0 {
        360.0
    } else {
        wrapped
    }
}
