use dashmap::DashMap;
use ferrous_hooks_domain::HookError;
use rquickjs::context::EvalOptions;
use rquickjs::{CatchResultExt, Context, Ctx, Function, Runtime};
use rustc_hash::FxBuildHasher;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

const WRAPPER_HEAD: &str = "(function (exports, require, module, __filename, __dirname) {\n";
const WRAPPER_TAIL: &str = "\n;if (typeof main === \"function\" && module.exports != null \
    && typeof module.exports.main !== \"function\") { module.exports.main = main; }\n})";

/// A source module wrapped as a CommonJS factory and checked for syntax
/// errors. Immutable once built.
#[derive(Debug)]
pub struct CompiledScript {
    path: PathBuf,
    dirname: PathBuf,
    source: Arc<str>,
}

impl CompiledScript {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dirname(&self) -> &Path {
        &self.dirname
    }

    /// Wrapped source; evaluating it yields the module factory.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluates the wrapper in `ctx` and returns the factory function.
    pub fn factory<'js>(&self, ctx: &Ctx<'js>) -> rquickjs::Result<Function<'js>> {
        ctx.eval_with_options(self.source.as_bytes().to_vec(), sloppy())
    }
}

type CacheSlot = Arc<OnceLock<Result<Arc<CompiledScript>, HookError>>>;

/// Loads hook modules from disk once per canonical path. Paths outside the
/// module root are never loaded.
///
/// Successful path lookups are remembered, so once a module is cached it is
/// served without touching the filesystem again.
pub struct ModuleLoader {
    root: PathBuf,
    cache: DashMap<PathBuf, CacheSlot, FxBuildHasher>,
    resolved: DashMap<(PathBuf, String), PathBuf, FxBuildHasher>,
    located: DashMap<PathBuf, PathBuf, FxBuildHasher>,
    compiled: AtomicUsize,
}

impl ModuleLoader {
    pub fn new(root: impl AsRef<Path>) -> Result<Self, HookError> {
        let root = root.as_ref();
        let root = root.canonicalize().map_err(|e| {
            HookError::ModuleNotFound(format!("module root {}: {}", root.display(), e))
        })?;

        Ok(Self {
            root,
            cache: DashMap::with_hasher(FxBuildHasher),
            resolved: DashMap::with_hasher(FxBuildHasher),
            located: DashMap::with_hasher(FxBuildHasher),
            compiled: AtomicUsize::new(0),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of modules actually compiled so far.
    pub fn compiled_count(&self) -> usize {
        self.compiled.load(Ordering::Relaxed)
    }

    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    /// Resolves a `require` specifier issued by a module living in `from_dir`.
    ///
    /// `./x` and `../x` are relative to `from_dir`, bare names to the module
    /// root. A specifier without extension is retried with `.js`.
    pub fn resolve(&self, specifier: &str, from_dir: &Path) -> Result<PathBuf, HookError> {
        let key = (from_dir.to_path_buf(), specifier.to_string());
        let known = self.resolved.get(&key).map(|path| path.value().clone());
        if let Some(path) = known {
            return Ok(path);
        }

        let path = self.resolve_on_disk(specifier, from_dir)?;
        self.resolved.insert(key, path.clone());
        Ok(path)
    }

    fn resolve_on_disk(&self, specifier: &str, from_dir: &Path) -> Result<PathBuf, HookError> {
        let requested = Path::new(specifier);
        let base = if requested.is_absolute() {
            requested.to_path_buf()
        } else if specifier.starts_with("./") || specifier.starts_with("../") {
            from_dir.join(requested)
        } else {
            self.root.join(requested)
        };

        let mut with_ext = base.clone().into_os_string();
        with_ext.push(".js");

        for candidate in [base, PathBuf::from(with_ext)] {
            if candidate.is_file() {
                return self.locate(&candidate);
            }
        }

        Err(HookError::ModuleNotFound(format!(
            "{} (from {})",
            specifier,
            from_dir.display()
        )))
    }

    /// Canonicalizes `path` and checks it stays under the module root.
    pub fn locate(&self, path: &Path) -> Result<PathBuf, HookError> {
        let canonical = path
            .canonicalize()
            .map_err(|e| HookError::ModuleNotFound(format!("{}: {}", path.display(), e)))?;

        if !canonical.starts_with(&self.root) {
            warn!(
                path = %canonical.display(),
                root = %self.root.display(),
                "Refusing to load module outside the module root"
            );
            return Err(HookError::ModuleNotFound(format!(
                "{} is outside {}",
                path.display(),
                self.root.display()
            )));
        }

        Ok(canonical)
    }

    /// Returns the compiled module at `path`, compiling it on first use.
    /// Concurrent first callers wait for the single compilation.
    pub fn load(&self, path: &Path) -> Result<Arc<CompiledScript>, HookError> {
        let canonical = self.canonical(path)?;

        let cached = self.cache.get(&canonical).map(|slot| Arc::clone(slot.value()));
        let slot = match cached {
            Some(slot) => slot,
            None => self
                .cache
                .entry(canonical.clone())
                .or_insert_with(|| Arc::new(OnceLock::new()))
                .clone(),
        };

        slot.get_or_init(|| {
            self.compiled.fetch_add(1, Ordering::Relaxed);
            compile(canonical)
        })
        .clone()
    }

    /// [`locate`](Self::locate), remembered per requested path.
    fn canonical(&self, path: &Path) -> Result<PathBuf, HookError> {
        let known = self.located.get(path).map(|canonical| canonical.value().clone());
        if let Some(canonical) = known {
            return Ok(canonical);
        }

        let canonical = self.locate(path)?;
        self.located.insert(path.to_path_buf(), canonical.clone());
        Ok(canonical)
    }

    pub fn require(&self, specifier: &str, from_dir: &Path) -> Result<Arc<CompiledScript>, HookError> {
        let path = self.resolve(specifier, from_dir)?;
        self.load(&path)
    }
}

fn compile(path: PathBuf) -> Result<Arc<CompiledScript>, HookError> {
    let display_path = path.display().to_string();
    let raw = std::fs::read_to_string(&path)
        .map_err(|e| HookError::ModuleNotFound(format!("{}: {}", display_path, e)))?;

    let mut source = String::with_capacity(WRAPPER_HEAD.len() + raw.len() + WRAPPER_TAIL.len());
    source.push_str(WRAPPER_HEAD);
    source.push_str(&raw);
    source.push_str(WRAPPER_TAIL);

    check_syntax(&source).map_err(|message| HookError::Compile {
        path: display_path.clone(),
        message,
    })?;

    debug!(path = %display_path, bytes = raw.len(), "Module compiled");

    let dirname = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("/"));

    Ok(Arc::new(CompiledScript {
        path,
        dirname,
        source: Arc::from(source),
    }))
}

/// Evaluating the wrapper only builds the factory, so this surfaces syntax
/// errors without running any module code.
fn check_syntax(source: &str) -> Result<(), String> {
    let runtime = Runtime::new().map_err(|e| e.to_string())?;
    let context = Context::full(&runtime).map_err(|e| e.to_string())?;

    context.with(|ctx| {
        ctx.eval_with_options::<Function, _>(source.as_bytes().to_vec(), sloppy())
            .catch(&ctx)
            .map(|_| ())
            .map_err(|e| e.to_string())
    })
}

fn sloppy() -> EvalOptions {
    let mut options = EvalOptions::default();
    options.strict = false;
    options
}
