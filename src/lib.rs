//! # cadcmd
//!
//! A command-DSL engine for parametric CAD construction.
//!
//! The DSL describes construction steps (boxes, arcs, circles, polygons,
//! booleans, sweeps, revolves, thick solids, materials, variables), one
//! command per line, with arbitrarily nested sub-commands:
//!
//! ```text
//! profile = CREATE CIRCLE CENTER 0 0 0 RADIUS 10 NORMAL 0 0 1
//! CREATE PRISM SECTION $profile LENGTH 50 WITH MATERIAL METALS.POLISHED_STEEL
//! ```
//!
//! The engine runs both directions: forward (parse text, evaluate against
//! an abstract [`GeometryBackend`], grow a construction-node graph) and
//! reverse (walk an existing node's provenance and re-emit canonical DSL
//! text, recursing into composite operands).
//!
//! ## Quick Start
//!
//! ```rust
//! use cadcmd::{Engine, RunOptions, StubBackend, StandardMaterials};
//!
//! let mut backend = StubBackend::new();
//! let mut materials = StandardMaterials::new();
//! let mut engine = Engine::new(&mut backend, &mut materials);
//!
//! let output = engine
//!     .run_program(
//!         "CREATE BOX ORIGIN 0 0 0 SIZE 100 50 HEIGHT 75",
//!         RunOptions::default(),
//!     )
//!     .expect("program failed");
//! let text = engine.describe(output.last).expect("describe failed");
//! assert_eq!(text.text(), "CREATE BOX ORIGIN 0 0 0 SIZE 100 50 HEIGHT 75");
//! ```

pub mod ast;
pub mod backend;
pub mod document;
pub mod engine;
pub mod env;
pub mod error;
pub mod eval;
pub mod grammar;
pub mod lexer;
pub mod material;
pub mod parser;
pub mod serialize;
pub mod span;
pub mod token;

// Re-exports for convenience
pub use ast::{BooleanKind, Command, CommandKind, MaterialRef};
pub use backend::{BackendError, BooleanOutput, GeometryBackend, ShapeHandle, StubBackend};
pub use document::{ConstructionNode, Document, NodeId, Provenance, ShapeClass};
pub use engine::{Engine, ProgramOutput, RunOptions};
pub use env::Environment;
pub use error::{EngineError, EvalError, LexError, ParseError, SerializeError, Warning};
pub use eval::Evaluator;
pub use material::{MaterialHandle, MaterialId, MaterialRegistry, StandardMaterials};
pub use parser::parse_line;
pub use serialize::{command_text, describe_node, Description};
pub use span::Span;
