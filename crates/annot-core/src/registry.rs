use dashmap::DashSet;

/// Source of the annotation type names the tracker scans for.
///
/// The returned order carries no meaning; the tracker sorts names itself.
pub trait AnnotationRegistry: Send + Sync {
    /// All currently registered annotation names.
    fn names(&self) -> Vec<String>;
}

/// Registry of annotation type names.
///
/// Designed for concurrent access: annotators may be registered from any
/// thread while the tracker reads the name set during a scan.
///
/// # Examples
///
/// ```
/// use annot_core::{AnnotationRegistry, NameRegistry};
///
/// let registry = NameRegistry::new();
/// registry.register("suggestion");
/// registry.register("comment");
///
/// let mut names = registry.names();
/// names.sort();
/// assert_eq!(names, vec!["comment", "suggestion"]);
/// ```
pub struct NameRegistry {
    names: DashSet<String>,
}

impl NameRegistry {
    /// Create a new empty registry
    ///
    /// # Examples
    ///
    /// ```
    /// use annot_core::NameRegistry;
    ///
    /// let registry = NameRegistry::new();
    /// assert!(registry.is_empty());
    /// ```
    pub fn new() -> Self {
        Self {
            names: DashSet::new(),
        }
    }

    /// Register an annotation name.
    ///
    /// Returns `false` if the name was already registered.
    pub fn register(&self, name: impl Into<String>) -> bool {
        let name = name.into();
        tracing::debug!("Registering annotation type {}", name);
        self.names.insert(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for NameRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotationRegistry for NameRegistry {
    fn names(&self) -> Vec<String> {
        self.names.iter().map(|name| name.key().clone()).collect()
    }
}

impl<S: AsRef<str>> FromIterator<S> for NameRegistry {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let registry = Self::new();
        for name in iter {
            registry.register(name.as_ref());
        }
        registry
    }
}
