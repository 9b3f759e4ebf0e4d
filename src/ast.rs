/// Abstract Command Tree node types.
///
/// A `Command` is the parsed-but-not-yet-evaluated form of one DSL command,
/// owning its nested sub-commands outright. The tree is finite and acyclic
/// by construction: a variable reference is resolved while parsing and
/// carries its expanded body.
use crate::span::Span;

/// A parsed command with its optional trailing material attachment.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub kind: CommandKind,
    /// Trailing `WITH MATERIAL CATEGORY.PRESET`, resolved at evaluation.
    pub material: Option<MaterialRef>,
    /// Byte range within the originating line; `Span::DUMMY` for commands
    /// spliced in from a variable binding.
    pub span: Span,
}

/// An unresolved `CATEGORY.PRESET` material reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialRef {
    pub category: String,
    pub preset: String,
}

/// The three boolean operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanKind {
    Cut,
    Common,
    Fuse,
}

impl BooleanKind {
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Cut => "CUT",
            Self::Common => "COMMON",
            Self::Fuse => "FUSE",
        }
    }
}

/// Tagged union over all command kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandKind {
    /// `CREATE BOX ORIGIN x y z SIZE dx dy HEIGHT dz`
    Box {
        origin: [f64; 3],
        size: [f64; 2],
        height: f64,
    },
    /// `CREATE ARC CENTER … START … NORMAL … ANGLE a`
    Arc {
        center: [f64; 3],
        start: [f64; 3],
        normal: [f64; 3],
        angle: f64,
    },
    /// `CREATE CIRCLE CENTER … RADIUS r NORMAL …`
    Circle {
        center: [f64; 3],
        radius: f64,
        normal: [f64; 3],
    },
    /// `CREATE LINE FROM … TO …`
    Line { from: [f64; 3], to: [f64; 3] },
    /// `CREATE POLYGON POINTS x y z …` (at least 3 points)
    Polygon { points: Vec<[f64; 3]> },
    /// `CREATE RECTANGLE ORIGIN … SIZE dx dy`
    Rectangle { origin: [f64; 3], size: [f64; 2] },
    /// `CREATE FOLDER [NAME text]`, a grouping node with no geometry.
    Folder { name: Option<String> },
    /// `CREATE PRISM SECTION <cmd> LENGTH n`
    Prism { section: Box<Command>, length: f64 },
    /// `CREATE REVOLVE PROFILE <cmd> AXIS ORIGIN … DIRECTION … ANGLE a`
    Revolve {
        profile: Box<Command>,
        axis_origin: [f64; 3],
        axis_direction: [f64; 3],
        angle: f64,
    },
    /// `CREATE SWEEP PROFILE <cmd> PATH <cmd>`
    Sweep {
        profile: Box<Command>,
        path: Box<Command>,
    },
    /// `CREATE BEZIER POINTS x y z …` (at least 2 points)
    Bezier { points: Vec<[f64; 3]> },
    /// `CREATE BOOLEAN (CUT|COMMON|FUSE) FIRST <cmd> SECOND <cmd>`
    Boolean {
        op: BooleanKind,
        first: Box<Command>,
        second: Box<Command>,
    },
    /// `CREATE FACE WIRE <cmd>`
    FaceFromWire { wire: Box<Command> },
    /// `CREATE FACE EDGES <cmd> [AND <cmd>]*`
    FaceFromEdges { edges: Vec<Command> },
    /// `CREATE WIRE EDGES <cmd> [AND <cmd>]*`
    Wire { edges: Vec<Command> },
    /// `CREATE THICKSOLID <cmd> THICKNESS n`
    ThickSolid { base: Box<Command>, thickness: f64 },
    /// `$name` where a command is expected; `body` is the binding's source
    /// re-parsed at the reference site.
    VarRef { name: String, body: Box<Command> },
    /// `name = <command>`; evaluates to whatever the right-hand side does.
    Assignment { name: String, body: Box<Command> },
}

impl Command {
    #[must_use]
    pub const fn new(kind: CommandKind, span: Span) -> Self {
        Self {
            kind,
            material: None,
            span,
        }
    }

    /// Canonical display name of the command kind, as used in diagnostics.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            CommandKind::Box { .. } => "BOX",
            CommandKind::Arc { .. } => "ARC",
            CommandKind::Circle { .. } => "CIRCLE",
            CommandKind::Line { .. } => "LINE",
            CommandKind::Polygon { .. } => "POLYGON",
            CommandKind::Rectangle { .. } => "RECTANGLE",
            CommandKind::Folder { .. } => "FOLDER",
            CommandKind::Prism { .. } => "PRISM",
            CommandKind::Revolve { .. } => "REVOLVE",
            CommandKind::Sweep { .. } => "SWEEP",
            CommandKind::Bezier { .. } => "BEZIER",
            CommandKind::Boolean { op, .. } => match op {
                BooleanKind::Cut => "BOOLEAN CUT",
                BooleanKind::Common => "BOOLEAN COMMON",
                BooleanKind::Fuse => "BOOLEAN FUSE",
            },
            CommandKind::FaceFromWire { .. } | CommandKind::FaceFromEdges { .. } => "FACE",
            CommandKind::Wire { .. } => "WIRE",
            CommandKind::ThickSolid { .. } => "THICKSOLID",
            CommandKind::VarRef { body, .. } | CommandKind::Assignment { body, .. } => {
                body.kind_name()
            }
        }
    }

    /// The command this one evaluates to, with assignment and variable
    /// wrappers peeled off.
    #[must_use]
    pub fn unwrapped(&self) -> &Self {
        match &self.kind {
            CommandKind::VarRef { body, .. } | CommandKind::Assignment { body, .. } => {
                body.unwrapped()
            }
            _ => self,
        }
    }
}
