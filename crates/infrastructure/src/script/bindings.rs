use super::module_loader::ModuleLoader;
use crate::fetch::FetchBridge;
use ferrous_hooks_domain::{ActionKind, HookError, Phase, RecordType};
use rquickjs::convert::Coerced;
use rquickjs::prelude::{Opt, Rest};
use rquickjs::{Ctx, Exception, Function, Object, Value};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub const SCRIPT_LOG_TARGET: &str = "ferrous_hooks::script";

/// CommonJS module registry and record views, private to one context.
const PRELUDE: &str = r#"(function (load) {
  "use strict";
  var modules = Object.create(null);

  function requireFrom(dir) {
    return function require(specifier) {
      var found = load(String(specifier), dir);
      var cached = modules[found.filename];
      if (cached !== undefined) {
        return cached.exports;
      }
      var module = { id: found.filename, filename: found.filename, exports: {}, loaded: false };
      modules[found.filename] = module;
      found.factory.call(module.exports, module.exports, requireFrom(found.dirname), module,
        found.filename, found.dirname);
      module.loaded = true;
      return module.exports;
    };
  }

  function record(r) {
    var header = Object.freeze({ Name: r.name, Rrtype: r.type, Class: 1, Ttl: r.ttl });
    var view = { Header: function () { return header; } };
    var text = function () { return r.ip; };
    switch (r.type) {
      case 1: view.A = Object.freeze({ String: text }); break;
      case 28: view.AAAA = Object.freeze({ String: text }); break;
      case 5: view.Target = r.target; break;
      case 2: view.Ns = r.target; break;
      case 12: view.Ptr = r.target; break;
      case 15: view.Mx = r.target; view.Preference = r.preference; break;
      case 16: view.Txt = Object.freeze([r.txt]); break;
      case 33:
        view.Target = r.target;
        view.Port = r.port;
        view.Priority = r.priority;
        view.Weight = r.weight;
        break;
    }
    return Object.freeze(view);
  }

  function answers(list) {
    return list === null ? null : list.map(record);
  }

  return { requireFrom: requireFrom, answers: answers };
})"#;

/// Per-invocation state the injected functions close over.
#[derive(Clone)]
pub struct InvocationScope {
    pub hook: Arc<str>,
    pub loader: Arc<ModuleLoader>,
    pub fetch: Arc<FetchBridge>,
    pub cancel: CancellationToken,
    load_failure: Arc<Mutex<Option<HookError>>>,
}

impl InvocationScope {
    pub fn new(
        hook: Arc<str>,
        loader: Arc<ModuleLoader>,
        fetch: Arc<FetchBridge>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            hook,
            loader,
            fetch,
            cancel,
            load_failure: Arc::new(Mutex::new(None)),
        }
    }

    /// First module load failure seen during this invocation, if any.
    pub fn take_load_failure(&self) -> Option<HookError> {
        self.load_failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    fn record_load_failure(&self, e: HookError) {
        let mut slot = self.load_failure.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_none() {
            *slot = Some(e);
        }
    }
}

/// Handles into the prelude, valid for the lifetime of one context.
pub struct Bindings<'js> {
    require_from: Function<'js>,
    answers: Function<'js>,
}

impl<'js> Bindings<'js> {
    /// A `require` resolving relative to `dir`.
    pub fn require_from(&self, dir: &Path) -> rquickjs::Result<Function<'js>> {
        self.require_from
            .call((dir.to_string_lossy().into_owned(),))
    }

    /// Wraps the plain JSON answers into read-only record views.
    pub fn answers(&self, plain: Value<'js>) -> rquickjs::Result<Value<'js>> {
        self.answers.call((plain,))
    }
}

/// Installs the script vocabulary into a fresh context.
pub fn install<'js>(ctx: &Ctx<'js>, scope: &InvocationScope) -> rquickjs::Result<Bindings<'js>> {
    let globals = ctx.globals();

    for record_type in RecordType::all() {
        globals.set(record_type.script_constant(), record_type.to_u16())?;
    }
    for phase in [Phase::Pre, Phase::Post] {
        globals.set(phase.as_str(), phase.code())?;
    }
    for kind in ActionKind::all() {
        globals.set(kind.as_str(), kind.code())?;
    }

    globals.set("console", console(ctx, &scope.hook)?)?;
    globals.set("fetch", fetch(ctx, scope)?)?;

    let factory: Function = ctx.eval(PRELUDE)?;
    let prelude: Object = factory.call((loader(ctx, scope)?,))?;
    let bindings = Bindings {
        require_from: prelude.get("requireFrom")?,
        answers: prelude.get("answers")?,
    };

    globals.set("require", bindings.require_from(scope.loader.root())?)?;

    Ok(bindings)
}

fn console<'js>(ctx: &Ctx<'js>, hook: &Arc<str>) -> rquickjs::Result<Object<'js>> {
    let console = Object::new(ctx.clone())?;

    for level in ["log", "info", "debug", "warn", "error"] {
        let hook = Arc::clone(hook);
        let print = Function::new(ctx.clone(), move |args: Rest<Coerced<String>>| {
            let message = args
                .0
                .into_iter()
                .map(|arg| arg.0)
                .collect::<Vec<_>>()
                .join(" ");

            match level {
                "debug" => debug!(target: SCRIPT_LOG_TARGET, hook = %hook, "{}", message),
                "warn" => warn!(target: SCRIPT_LOG_TARGET, hook = %hook, "{}", message),
                "error" => error!(target: SCRIPT_LOG_TARGET, hook = %hook, "{}", message),
                _ => info!(target: SCRIPT_LOG_TARGET, hook = %hook, "{}", message),
            }
        })?;
        console.set(level, print)?;
    }

    Ok(console)
}

/// `fetch.get(url, onSuccess, onError)`. Exactly one callback runs; failures
/// never throw, except cancellation which aborts the script.
fn fetch<'js>(ctx: &Ctx<'js>, scope: &InvocationScope) -> rquickjs::Result<Object<'js>> {
    let bridge = Arc::clone(&scope.fetch);
    let cancel = scope.cancel.clone();
    let hook = Arc::clone(&scope.hook);

    let get = Function::new(
        ctx.clone(),
        move |ctx: Ctx<'js>,
              url: Coerced<String>,
              on_success: Opt<Function<'js>>,
              on_error: Opt<Function<'js>>|
              -> rquickjs::Result<()> {
            match bridge.get_blocking(&url.0, &cancel) {
                Ok(response) => {
                    if let Some(callback) = on_success.0 {
                        let result = Object::new(ctx.clone())?;
                        result.set("statusCode", response.status)?;
                        result.set("body", response.body.as_str())?;
                        result.set("StatusCode", response.status)?;
                        result.set("Body", response.body.as_str())?;
                        let _: Value = callback.call((result,))?;
                    }
                }
                Err(HookError::Cancelled) => {
                    return Err(Exception::throw_internal(&ctx, "fetch cancelled"));
                }
                Err(e) => {
                    debug!(hook = %hook, url = %url.0, error = %e, "Script fetch failed");
                    if let Some(callback) = on_error.0 {
                        let _: Value = callback.call((e.to_string(),))?;
                    }
                }
            }
            Ok(())
        },
    )?;

    let fetch = Object::new(ctx.clone())?;
    fetch.set("get", get)?;
    Ok(fetch)
}

/// Native half of `require`: resolves, loads and evaluates a module
/// wrapper, leaving instantiation and caching to the prelude.
fn loader<'js>(ctx: &Ctx<'js>, scope: &InvocationScope) -> rquickjs::Result<Function<'js>> {
    let scope = scope.clone();

    Function::new(
        ctx.clone(),
        move |ctx: Ctx<'js>, specifier: String, from_dir: String| -> rquickjs::Result<Object<'js>> {
            let script = match scope.loader.require(&specifier, Path::new(&from_dir)) {
                Ok(script) => script,
                Err(e) => {
                    let message = e.to_string();
                    scope.record_load_failure(e);
                    return Err(Exception::throw_message(&ctx, &message));
                }
            };

            let found = Object::new(ctx.clone())?;
            found.set("filename", script.path().to_string_lossy().into_owned())?;
            found.set("dirname", script.dirname().to_string_lossy().into_owned())?;
            found.set("factory", script.factory(&ctx)?)?;
            Ok(found)
        },
    )
}
