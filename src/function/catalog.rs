use super::handler::{FunctionEntry, Handler};
use arc_swap::ArcSwap;
use http::Method;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Function attached to a request by the catalog.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub function: Arc<FunctionEntry>,
    /// Literal argument for GET-style invocation of a transform
    pub argument: Option<String>,
}

/// Resolves a request to the function that should serve it.
///
/// Implementations only attach roles that make sense for the verb; the
/// engine still rejects anything it cannot dispatch.
pub trait FunctionCatalog: Send + Sync {
    fn resolve(&self, method: &Method, path: &str) -> Option<Resolution>;
}

/// In-memory catalog keyed by function name.
///
/// Routing, relative to `base_path`:
///
/// - `POST /{name}` → transform or sink `name`
/// - `GET /{name}` → source `name` (or a transform, which then fails for lack of argument)
/// - `GET /{name}/{argument}` → transform `name` with the URL-decoded remainder as argument
///
/// Names may contain `/`; the longest registered name wins. Reads are
/// lock-free, so functions can be registered while the server is running.
pub struct FunctionRegistry {
    base_path: String,
    functions: ArcSwap<HashMap<String, Arc<FunctionEntry>>>,
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_path("/")
    }

    /// Registry serving functions below `base_path` (e.g. `/functions`).
    #[must_use]
    pub fn with_base_path(base_path: &str) -> Self {
        let trimmed = base_path.trim_matches('/');
        let base_path = if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{trimmed}")
        };
        Self {
            base_path,
            functions: ArcSwap::from_pointee(HashMap::new()),
        }
    }

    #[must_use]
    pub fn base_path(&self) -> &str {
        if self.base_path.is_empty() {
            "/"
        } else {
            &self.base_path
        }
    }

    /// Add a function, replacing any previous entry with the same name.
    pub fn register(&self, entry: FunctionEntry) {
        let name = entry.name.trim_matches('/').to_string();
        let entry = Arc::new(entry);
        let mut replaced = false;
        self.functions.rcu(|current| {
            let mut next = HashMap::clone(current);
            replaced = next.insert(name.clone(), Arc::clone(&entry)).is_some();
            next
        });
        if replaced {
            warn!(function = %name, "Replaced existing function");
        }
        info!(
            function = %name,
            kind = %entry.kind(),
            signature = %entry.signature,
            "Function registered"
        );
    }

    /// Remove a function; returns whether it was present.
    pub fn unregister(&self, name: &str) -> bool {
        let name = name.trim_matches('/');
        let mut removed = false;
        self.functions.rcu(|current| {
            let mut next = HashMap::clone(current);
            removed = next.remove(name).is_some();
            next
        });
        removed
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<FunctionEntry>> {
        self.functions.load().get(name.trim_matches('/')).cloned()
    }

    /// Registered names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.load().keys().cloned().collect();
        names.sort();
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.functions.load().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn relative<'a>(&self, path: &'a str) -> Option<&'a str> {
        let rest = path.strip_prefix(self.base_path.as_str())?;
        if !self.base_path.is_empty() && !rest.is_empty() && !rest.starts_with('/') {
            // "/functionsX" must not match base "/functions"
            return None;
        }
        let rest = rest.trim_matches('/');
        (!rest.is_empty()).then_some(rest)
    }
}

impl FunctionCatalog for FunctionRegistry {
    fn resolve(&self, method: &Method, path: &str) -> Option<Resolution> {
        let relative = self.relative(path)?;
        let functions = self.functions.load();

        if *method == Method::POST {
            let entry = functions.get(relative)?;
            return match entry.handler {
                Handler::Transform(_) | Handler::Sink(_) => Some(Resolution {
                    function: Arc::clone(entry),
                    argument: None,
                }),
                Handler::Source(_) => None,
            };
        }

        if *method != Method::GET {
            return None;
        }

        if let Some(entry) = functions.get(relative) {
            if matches!(entry.handler, Handler::Source(_) | Handler::Transform(_)) {
                return Some(Resolution {
                    function: Arc::clone(entry),
                    argument: None,
                });
            }
        }

        // longest registered transform name that prefixes the path
        let mut split = relative.len();
        while let Some(idx) = relative[..split].rfind('/') {
            let (name, argument) = (&relative[..idx], &relative[idx + 1..]);
            if let Some(entry) = functions.get(name) {
                if matches!(entry.handler, Handler::Transform(_)) {
                    let argument = urlencoding::decode(argument)
                        .map(|a| a.into_owned())
                        .unwrap_or_else(|_| argument.to_string());
                    debug!(function = %name, argument = %argument, "Resolved GET argument");
                    return Some(Resolution {
                        function: Arc::clone(entry),
                        argument: Some(argument),
                    });
                }
            }
            split = idx;
        }
        None
    }
}
