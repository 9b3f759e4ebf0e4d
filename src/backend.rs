/// The abstract geometry backend.
///
/// The engine never does geometry math itself; every primitive constructor
/// and combinator is one narrow trait method returning a typed result. A
/// host backs this with a real kernel; [`StubBackend`] backs it with
/// nothing, for dry runs and tests.
use crate::ast::BooleanKind;
use thiserror::Error;

/// An opaque handle to a backend-owned shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeHandle(pub u64);

/// A backend rejection; the reason string is surfaced to the user verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct BackendError(pub String);

impl BackendError {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Result of a boolean operation: the raw (possibly compound) shape plus
/// the solids the backend could extract from it. The evaluator keeps the
/// single solid when there is exactly one, otherwise the compound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanOutput {
    pub shape: ShapeHandle,
    pub solids: Vec<ShapeHandle>,
}

pub type BackendResult<T> = Result<T, BackendError>;

/// One method per primitive and combinator of the grammar surface. All
/// take fully resolved numeric arguments; preconditions the backend
/// owns (e.g. thick-solid bases) are reported through `BackendError`.
pub trait GeometryBackend {
    fn make_box(&mut self, origin: [f64; 3], size: [f64; 2], height: f64)
        -> BackendResult<ShapeHandle>;
    fn make_arc(
        &mut self,
        center: [f64; 3],
        start: [f64; 3],
        normal: [f64; 3],
        angle: f64,
    ) -> BackendResult<ShapeHandle>;
    fn make_circle(
        &mut self,
        center: [f64; 3],
        radius: f64,
        normal: [f64; 3],
    ) -> BackendResult<ShapeHandle>;
    fn make_line(&mut self, from: [f64; 3], to: [f64; 3]) -> BackendResult<ShapeHandle>;
    fn make_polygon(&mut self, points: &[[f64; 3]]) -> BackendResult<ShapeHandle>;
    fn make_rect(&mut self, origin: [f64; 3], size: [f64; 2]) -> BackendResult<ShapeHandle>;
    fn make_bezier(&mut self, points: &[[f64; 3]]) -> BackendResult<ShapeHandle>;

    fn boolean(
        &mut self,
        op: BooleanKind,
        first: ShapeHandle,
        second: ShapeHandle,
    ) -> BackendResult<BooleanOutput>;
    fn prism(&mut self, section: ShapeHandle, length: f64) -> BackendResult<ShapeHandle>;
    fn revolve(
        &mut self,
        profile: ShapeHandle,
        axis_origin: [f64; 3],
        axis_direction: [f64; 3],
        angle: f64,
    ) -> BackendResult<ShapeHandle>;
    fn sweep(&mut self, profile: ShapeHandle, path: ShapeHandle) -> BackendResult<ShapeHandle>;
    fn make_thick_solid(&mut self, base: ShapeHandle, thickness: f64)
        -> BackendResult<ShapeHandle>;
    fn wire(&mut self, edges: &[ShapeHandle]) -> BackendResult<ShapeHandle>;
    fn face_from_wire(&mut self, wire: ShapeHandle) -> BackendResult<ShapeHandle>;
    fn face_from_edges(&mut self, edges: &[ShapeHandle]) -> BackendResult<ShapeHandle>;

    /// Axis-aligned bounds of a shape, used by the lossy serializer
    /// fallback for shapes with no provenance.
    fn bounding_box(&self, shape: ShapeHandle) -> BackendResult<([f64; 3], [f64; 3])>;
}

/// A kernel-less backend that mints handles and records every call.
///
/// Deterministic and side-effect free, so programs can be dry-run and the
/// engine's own behavior tested without a geometry kernel.
#[derive(Debug, Default)]
pub struct StubBackend {
    next: u64,
    /// One entry per backend call, in call order.
    pub calls: Vec<String>,
    /// Number of solids the next boolean reports; 1 means unambiguous.
    pub boolean_solids: Option<usize>,
    /// When set, the next mutating call fails with this reason.
    pub fail_with: Option<String>,
}

impl StubBackend {
    #[must_use]
    pub fn new() -> Self {
        Self {
            boolean_solids: Some(1),
            ..Self::default()
        }
    }

    fn mint(&mut self, call: String) -> BackendResult<ShapeHandle> {
        if let Some(reason) = self.fail_with.take() {
            return Err(BackendError(reason));
        }
        self.calls.push(call);
        self.next += 1;
        Ok(ShapeHandle(self.next))
    }
}

impl GeometryBackend for StubBackend {
    fn make_box(
        &mut self,
        origin: [f64; 3],
        size: [f64; 2],
        height: f64,
    ) -> BackendResult<ShapeHandle> {
        self.mint(format!("box {origin:?} {size:?} {height}"))
    }

    fn make_arc(
        &mut self,
        center: [f64; 3],
        start: [f64; 3],
        normal: [f64; 3],
        angle: f64,
    ) -> BackendResult<ShapeHandle> {
        self.mint(format!("arc {center:?} {start:?} {normal:?} {angle}"))
    }

    fn make_circle(
        &mut self,
        center: [f64; 3],
        radius: f64,
        normal: [f64; 3],
    ) -> BackendResult<ShapeHandle> {
        self.mint(format!("circle {center:?} {radius} {normal:?}"))
    }

    fn make_line(&mut self, from: [f64; 3], to: [f64; 3]) -> BackendResult<ShapeHandle> {
        self.mint(format!("line {from:?} {to:?}"))
    }

    fn make_polygon(&mut self, points: &[[f64; 3]]) -> BackendResult<ShapeHandle> {
        self.mint(format!("polygon {}pts", points.len()))
    }

    fn make_rect(&mut self, origin: [f64; 3], size: [f64; 2]) -> BackendResult<ShapeHandle> {
        self.mint(format!("rect {origin:?} {size:?}"))
    }

    fn make_bezier(&mut self, points: &[[f64; 3]]) -> BackendResult<ShapeHandle> {
        self.mint(format!("bezier {}pts", points.len()))
    }

    fn boolean(
        &mut self,
        op: BooleanKind,
        first: ShapeHandle,
        second: ShapeHandle,
    ) -> BackendResult<BooleanOutput> {
        let solids = self.boolean_solids.unwrap_or(1);
        let shape = self.mint(format!(
            "boolean {} {} {}",
            op.keyword(),
            first.0,
            second.0
        ))?;
        let extracted = (0..solids)
            .map(|i| {
                if solids == 1 {
                    shape
                } else {
                    ShapeHandle(shape.0 + 1 + i as u64)
                }
            })
            .collect();
        Ok(BooleanOutput {
            shape,
            solids: extracted,
        })
    }

    fn prism(&mut self, section: ShapeHandle, length: f64) -> BackendResult<ShapeHandle> {
        self.mint(format!("prism {} {length}", section.0))
    }

    fn revolve(
        &mut self,
        profile: ShapeHandle,
        axis_origin: [f64; 3],
        axis_direction: [f64; 3],
        angle: f64,
    ) -> BackendResult<ShapeHandle> {
        self.mint(format!(
            "revolve {} {axis_origin:?} {axis_direction:?} {angle}",
            profile.0
        ))
    }

    fn sweep(&mut self, profile: ShapeHandle, path: ShapeHandle) -> BackendResult<ShapeHandle> {
        self.mint(format!("sweep {} {}", profile.0, path.0))
    }

    fn make_thick_solid(
        &mut self,
        base: ShapeHandle,
        thickness: f64,
    ) -> BackendResult<ShapeHandle> {
        self.mint(format!("thicksolid {} {thickness}", base.0))
    }

    fn wire(&mut self, edges: &[ShapeHandle]) -> BackendResult<ShapeHandle> {
        self.mint(format!("wire {}edges", edges.len()))
    }

    fn face_from_wire(&mut self, wire: ShapeHandle) -> BackendResult<ShapeHandle> {
        self.mint(format!("face-wire {}", wire.0))
    }

    fn face_from_edges(&mut self, edges: &[ShapeHandle]) -> BackendResult<ShapeHandle> {
        self.mint(format!("face-edges {}edges", edges.len()))
    }

    fn bounding_box(&self, shape: ShapeHandle) -> BackendResult<([f64; 3], [f64; 3])> {
        // The stub has no geometry; report a unit cell so the lossy
        // serializer path stays exercisable.
        let _ = shape;
        Ok(([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]))
    }
}
