//! Compile driver for the oj compiler.
//!
//! One call compiles one parsed unit:
//!
//! ```text
//! parent ModelState (optional)
//!     │
//!     ▼
//! Model::load_state ──► Builder::build ──► Model::prepare
//!     │
//!     ▼
//! Generator::generate ──► Modifier::finish ──► CompileOutput
//! ```
//!
//! A hard error anywhere aborts the unit; the driver bundles it with the
//! warnings collected up to that point into a [`CompileFailure`]. Every
//! diagnostic that leaves the driver is tagged with the file path and
//! resolved to a line and column.

mod logging;

use std::fmt;

use ojc_diagnostic::{CompileError, LineOffsetTable, Warning};
use ojc_gen::Generator;
use ojc_ir::Ast;
use ojc_model::{Builder, Model};

pub use logging::{init_tracing, init_tracing_with, LogWriter, LOG_ENV};
pub use ojc_diagnostic::{ErrorKind, WarningKind};
pub use ojc_gen::{InlineValue, Mode, Options as CompileOptions};
pub use ojc_model::{ModelState, StateError};

/// Output of a successful compile.
#[derive(Clone, Debug)]
pub struct CompileOutput {
    pub code: String,
    pub warnings: Vec<Warning>,
    /// Snapshot for dependent compiles.
    pub state: ModelState,
}

/// A hard error together with every warning reported before it.
#[derive(Clone, Debug)]
pub struct CompileFailure {
    pub error: CompileError,
    pub warnings: Vec<Warning>,
}

impl fmt::Display for CompileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(file) = &self.error.file {
            write!(f, "{file}:")?;
        }
        if let (Some(line), Some(column)) = (self.error.line, self.error.column) {
            write!(f, "{line}:{column}: ")?;
        } else if self.error.file.is_some() {
            f.write_str(" ")?;
        }
        write!(f, "error[{}]: {}", self.error.kind, self.error.message)
    }
}

impl std::error::Error for CompileFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Compiles units against a shared configuration and optional parent state.
#[derive(Clone, Debug, Default)]
pub struct Compiler {
    options: CompileOptions,
    parent: Option<ModelState>,
}

impl Compiler {
    pub fn new(options: CompileOptions) -> Self {
        Compiler {
            options,
            parent: None,
        }
    }

    /// Merge `state` into every subsequent compile.
    #[must_use]
    pub fn with_parent(mut self, state: ModelState) -> Self {
        self.parent = Some(state);
        self
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile one unit. `file` is used only to tag diagnostics.
    pub fn compile(
        &self,
        file: &str,
        ast: &Ast,
        source: &str,
    ) -> Result<CompileOutput, CompileFailure> {
        compile_unit(file, ast, source, &self.options, self.parent.as_ref())
    }
}

/// Compile one unit without keeping a [`Compiler`] around.
#[tracing::instrument(level = "debug", skip_all, fields(file = file, mode = ?options.mode))]
pub fn compile_unit(
    file: &str,
    ast: &Ast,
    source: &str,
    options: &CompileOptions,
    parent: Option<&ModelState>,
) -> Result<CompileOutput, CompileFailure> {
    let table = LineOffsetTable::build(source);
    let locate_warnings = |warnings: Vec<Warning>| -> Vec<Warning> {
        warnings
            .into_iter()
            .map(|mut warning| {
                warning.locate(&table, source);
                warning.in_file(file)
            })
            .collect()
    };
    let fail = |mut error: CompileError, warnings: Vec<Warning>| {
        error.locate(&table, source);
        tracing::debug!(kind = %error.kind, "compile failed");
        CompileFailure {
            error: error.in_file(file),
            warnings: locate_warnings(warnings),
        }
    };

    let mut model = Model::new();
    if let Some(state) = parent {
        model.load_state(state.clone());
    }
    model.symbols_mut().configure_squeeze(
        options.squeezes(),
        options.squeeze_start_index,
        options.squeeze_end_index,
    );

    if let Err(error) = Builder::new(ast, &mut model).build() {
        return Err(fail(error, Vec::new()));
    }
    if let Err(error) = model.prepare() {
        return Err(fail(error, Vec::new()));
    }

    let mut generator = match Generator::new(ast, source, &mut model, options) {
        Ok(generator) => generator,
        Err(error) => return Err(fail(error, Vec::new())),
    };
    if let Err(error) = generator.generate() {
        let warnings = generator.warnings().to_vec();
        return Err(fail(error, warnings));
    }
    let generation = match generator.finish() {
        Ok(generation) => generation,
        Err(error) => return Err(fail(error, Vec::new())),
    };

    tracing::debug!(
        bytes = generation.code.len(),
        warnings = generation.warnings.len(),
        "compiled unit"
    );
    Ok(CompileOutput {
        code: generation.code,
        warnings: locate_warnings(generation.warnings),
        state: model.save_state(),
    })
}
