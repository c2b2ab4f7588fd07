//! Shader Template Manager
//!
//! WGSL sources are minijinja templates embedded with `rust-embed`. A program
//! is a template rendered against a [`ShaderDefines`] set. Programs are
//! deduplicated twice:
//!
//! | Key                          | Maps to        |
//! |------------------------------|----------------|
//! | `(template, defines hash)`   | [`ProgramId`]  |
//! | xxh3 of the generated source | the source     |
//!
//! so two define sets that render to identical WGSL share one program.
//!
//! Template syntax: `{$ ... $}` blocks, `{{ ... }}` variables and `$$` line
//! statements. `{$ include "name" $}` resolves to `chunks/name.wgsl`.

use std::borrow::Cow;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use minijinja::syntax::SyntaxConfig;
use minijinja::{Environment, Error, ErrorKind, UndefinedBehavior};
use rust_embed::RustEmbed;
use rustc_hash::FxHashMap;
use xxhash_rust::xxh3::xxh3_64;

use crate::errors::Result;
use crate::resources::shader_defines::ShaderDefines;

#[derive(RustEmbed)]
#[folder = "src/renderer/shaders"]
struct ShaderAssets;

/// Identity of a generated program: the xxh3 hash of its WGSL source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramId(pub u64);

#[derive(Debug, Clone)]
pub struct CompiledProgram {
    pub id: ProgramId,
    pub template: &'static str,
    pub source: Arc<str>,
}

fn shader_loader(name: &str) -> std::result::Result<Option<String>, Error> {
    let filename = if std::path::Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wgsl"))
    {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("{name}.wgsl"))
    };

    // Debug builds read straight from the source tree so shaders can be
    // edited without a rebuild.
    #[cfg(debug_assertions)]
    {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("src/renderer/shaders")
            .join(filename.as_ref());
        if path.exists() {
            return std::fs::read_to_string(&path).map(Some).map_err(|e| {
                Error::new(ErrorKind::TemplateNotFound, format!("Failed to read file: {e}"))
            });
        }
    }

    if let Some(file) = ShaderAssets::get(&filename)
        && let Ok(source) = std::str::from_utf8(file.data.as_ref())
    {
        return Ok(Some(source.to_string()));
    }

    Ok(None)
}

fn build_env() -> Result<Environment<'static>> {
    let mut env = Environment::new();

    let syntax = SyntaxConfig::builder()
        .block_delimiters("{$", "$}")
        .variable_delimiters("{{", "}}")
        .line_statement_prefix("$$")
        .build()?;

    env.set_syntax(syntax);
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.set_undefined_behavior(UndefinedBehavior::SemiStrict);
    env.set_loader(shader_loader);
    env.set_path_join_callback(|name, _parent| format!("chunks/{name}").into());

    Ok(env)
}

/// Program cache. Owned by the render pipeline.
pub struct ShaderManager {
    env: Environment<'static>,
    by_key: FxHashMap<(&'static str, u64), ProgramId>,
    programs: FxHashMap<ProgramId, CompiledProgram>,
    /// Programs created since the last [`ShaderManager::take_new_programs`].
    fresh: Vec<ProgramId>,
}

impl std::fmt::Debug for ShaderManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShaderManager")
            .field("programs", &self.programs.len())
            .finish_non_exhaustive()
    }
}

impl ShaderManager {
    pub fn new() -> Result<Self> {
        Ok(Self {
            env: build_env()?,
            by_key: FxHashMap::default(),
            programs: FxHashMap::default(),
            fresh: Vec::new(),
        })
    }

    /// Renders `template` with `defines` into WGSL.
    pub fn generate(&self, template: &str, defines: &ShaderDefines) -> Result<String> {
        let source = self.env.get_template(template)?.render(defines.to_map())?;
        Ok(format!("// === Generated from {template} ===\n{source}"))
    }

    /// Returns the program for `(template, defines)`, generating it on first use.
    pub fn get_or_compile(&mut self, template: &'static str, defines: &ShaderDefines) -> Result<ProgramId> {
        let key = (template, defines.compute_hash());
        if let Some(&id) = self.by_key.get(&key) {
            return Ok(id);
        }

        let source = self.generate(template, defines)?;
        let id = ProgramId(xxh3_64(source.as_bytes()));
        if let Entry::Vacant(slot) = self.programs.entry(id) {
            log::debug!("Generated program {template} {:016x} ({} defines)", id.0, defines.len());
            slot.insert(CompiledProgram {
                id,
                template,
                source: source.into(),
            });
            self.fresh.push(id);
        }
        self.by_key.insert(key, id);
        Ok(id)
    }

    #[must_use]
    pub fn program(&self, id: ProgramId) -> Option<&CompiledProgram> {
        self.programs.get(&id)
    }

    #[must_use]
    pub fn program_count(&self) -> usize {
        self.programs.len()
    }

    /// Drains the programs the backend has not been told about yet.
    pub fn take_new_programs(&mut self) -> Vec<CompiledProgram> {
        self.fresh
            .drain(..)
            .filter_map(|id| self.programs.get(&id).cloned())
            .collect()
    }
}
