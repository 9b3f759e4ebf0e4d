/// The engine ties the halves together: parse a multi-line program, run it
/// against the backend, and describe existing nodes back into DSL text.
///
/// A program is a sequence of lines executed strictly in order; later lines
/// may reference variables bound by earlier ones. Execution stops at the
/// first failing line. Nodes committed by earlier lines stay in the
/// document; there is deliberately no transaction or rollback.
use crate::backend::GeometryBackend;
use crate::document::{Document, NodeId};
use crate::env::Environment;
use crate::error::{EngineError, SerializeError, Warning};
use crate::eval::Evaluator;
use crate::material::MaterialRegistry;
use crate::parser;
use crate::serialize::{self, Description};
use tracing::debug;

/// Options for one program run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Keep variable bindings across `run_program` calls ("maintain"
    /// mode). Memoized evaluation results are always per-run.
    pub persist_environment: bool,
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramOutput {
    /// Node produced by the last executed line.
    pub last: NodeId,
    /// Non-fatal conditions, in occurrence order.
    pub warnings: Vec<Warning>,
}

pub struct Engine<'a> {
    backend: &'a mut dyn GeometryBackend,
    materials: &'a mut dyn MaterialRegistry,
    document: Document,
    env: Environment,
    warnings: Vec<Warning>,
}

impl<'a> Engine<'a> {
    pub fn new(
        backend: &'a mut dyn GeometryBackend,
        materials: &'a mut dyn MaterialRegistry,
    ) -> Self {
        Self {
            backend,
            materials,
            document: Document::new(),
            env: Environment::new(),
            warnings: Vec::new(),
        }
    }

    /// Non-fatal conditions from the most recent run, retained even when
    /// the run ended in an error.
    #[must_use]
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// The construction-node graph grown by prior runs.
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    #[must_use]
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Execute a program: one command or assignment per line. Blank lines
    /// and `//` comment lines are skipped; reported line numbers are
    /// 1-based positions in `source`.
    ///
    /// # Errors
    /// The first line that fails to parse or evaluate aborts the run with
    /// an `EngineError` carrying its line number. Warnings recorded by
    /// earlier, successful lines remain available via [`Engine::warnings`].
    pub fn run_program(
        &mut self,
        source: &str,
        options: RunOptions,
    ) -> Result<ProgramOutput, EngineError> {
        if options.persist_environment {
            self.env.clear_results();
        } else {
            self.env.clear();
        }

        let mut evaluator = Evaluator::new(&mut *self.backend, &mut *self.materials);
        let mut last = None;
        let mut failure = None;
        for (index, raw) in source.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with("//") {
                continue;
            }
            debug!(line_no, line, "executing");
            let command = match parser::parse_line(line, &mut self.env) {
                Ok(command) => command,
                Err(source) => {
                    failure = Some(EngineError::Parse {
                        line: line_no,
                        source,
                    });
                    break;
                }
            };
            match evaluator.evaluate(&command, &mut self.env, &mut self.document) {
                Ok(id) => last = Some(id),
                Err(source) => {
                    failure = Some(EngineError::Eval {
                        line: line_no,
                        source,
                    });
                    break;
                }
            }
        }
        self.warnings = std::mem::take(&mut evaluator.warnings);

        if let Some(err) = failure {
            return Err(err);
        }
        match last {
            Some(last) => Ok(ProgramOutput {
                last,
                warnings: self.warnings.clone(),
            }),
            None => Err(EngineError::EmptyProgram),
        }
    }

    /// Reverse direction: regenerate canonical DSL text for a document
    /// node, recursing into composite operands recorded in its provenance.
    ///
    /// # Errors
    /// `SerializeError::UnknownNode` if `id` is not (or no longer) in the
    /// document; `SerializeError::NoProvenance` for external shapes the
    /// backend cannot approximate.
    pub fn describe(&self, id: NodeId) -> Result<Description, SerializeError> {
        let node = self.document.get(id).ok_or(SerializeError::UnknownNode)?;
        serialize::describe_node(node, &*self.backend)
    }
}
