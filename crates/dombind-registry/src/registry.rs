//! DataRegistry - process-lifetime store of registered type metadata.
//!
//! # Storage Model
//!
//! - **Types**: `TypeInfo` stored by name. Re-registering a name replaces the
//!   entry (last write wins).
//! - **Shells**: members registered before their type create an empty shell
//!   entry. When the real `TypeInfo` arrives it replaces the shell but adopts
//!   the shell's members, so declaration and member attachment may happen in
//!   any order.
//! - **Generators**: owned by the registry and run by
//!   [`DataRegistry::generate_bindings`] against a snapshot.
//!
//! # Thread Safety
//!
//! Registration may happen from several initialization threads. A single
//! coarse mutex guards the type map; registration is a startup activity, not
//! a hot path. Callables are cloned out of the map and invoked after the lock
//! is released, so a callable may itself register or query types.
//!
//! # Example
//!
//! ```
//! use dombind_registry::{Callable, DataRegistry, EntryKind, FunctionInfo, SemanticType, TypeInfo, Value};
//!
//! let registry = DataRegistry::new();
//! registry.register_type(TypeInfo::new("Widget", EntryKind::Object)).unwrap();
//! registry
//!     .register_function(
//!         "Widget",
//!         FunctionInfo::new("getName").returns(SemanticType::String),
//!         Callable::unary(|_| Value::Str("main".into())),
//!     )
//!     .unwrap();
//!
//! assert!(registry.lookup_type("Widget").is_some());
//! ```

use std::fmt;
use std::path::Path;

use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};

use dombind_core::{
    Callable, DataRegistrySnapshot, FunctionInfo, ObjectHandle, PropertyInfo, RegistryError,
    TypeInfo, Value,
};

use crate::{BindingGenerator, GenerationSummary, GeneratorOutcome};

#[derive(Default)]
struct TypeStore {
    types: FxHashMap<String, TypeInfo>,
    /// Names whose entry is an implicit shell.
    shells: FxHashSet<String>,
}

impl TypeStore {
    /// Entry for `name`, creating a shell if absent.
    fn entry_or_shell(&mut self, name: &str) -> &mut TypeInfo {
        if !self.types.contains_key(name) {
            tracing::debug!(type_name = name, "creating implicit type shell");
            self.shells.insert(name.to_string());
        }
        self.types
            .entry(name.to_string())
            .or_insert_with(|| TypeInfo::shell(name))
    }
}

/// Thread-safe store of [`TypeInfo`] by name.
#[derive(Default)]
pub struct DataRegistry {
    store: Mutex<TypeStore>,
    generators: Mutex<Vec<Box<dyn BindingGenerator>>>,
}

impl DataRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // ==========================================================================
    // Registration
    // ==========================================================================

    /// Register a type, replacing any previous entry with the same name.
    ///
    /// Returns the replaced entry. If the previous entry was an implicit
    /// shell, its members are carried over and `None` is returned.
    pub fn register_type(&self, mut info: TypeInfo) -> Result<Option<TypeInfo>, RegistryError> {
        if info.name.is_empty() {
            return Err(RegistryError::EmptyName("type"));
        }

        let mut store = self.store.lock();
        let name = info.name.clone();

        if store.shells.remove(&name) {
            if let Some(shell) = store.types.remove(&name) {
                info.absorb_members(shell);
            }
            tracing::debug!(type_name = %name, "type replaces implicit shell");
            store.types.insert(name, info);
            return Ok(None);
        }

        let previous = store.types.insert(name.clone(), info);
        if previous.is_some() {
            tracing::debug!(type_name = %name, "type re-registered, previous metadata replaced");
        } else {
            tracing::debug!(type_name = %name, "type registered");
        }
        Ok(previous)
    }

    /// Attach a function to `type_name`, creating a shell entry if needed.
    ///
    /// A function with the same name on that type is replaced.
    pub fn register_function(
        &self,
        type_name: &str,
        meta: FunctionInfo,
        callable: Callable,
    ) -> Result<(), RegistryError> {
        if type_name.is_empty() {
            return Err(RegistryError::EmptyName("type"));
        }
        if meta.name.is_empty() {
            return Err(RegistryError::EmptyName("function"));
        }

        let mut store = self.store.lock();
        tracing::debug!(
            type_name,
            function = %meta.name,
            shape = ?callable.shape(),
            exported = meta.exported,
            "function registered"
        );
        store
            .entry_or_shell(type_name)
            .upsert_function(meta.with_callable(callable));
        Ok(())
    }

    /// Attach a property to `type_name`, creating a shell entry if needed.
    ///
    /// The setter is dropped when `meta` is read-only.
    pub fn register_property(
        &self,
        type_name: &str,
        meta: PropertyInfo,
        getter: Callable,
        setter: Option<Callable>,
    ) -> Result<(), RegistryError> {
        if type_name.is_empty() {
            return Err(RegistryError::EmptyName("type"));
        }
        if meta.name.is_empty() {
            return Err(RegistryError::EmptyName("property"));
        }

        let mut meta = meta.with_getter(getter);
        meta.setter = None;
        if let Some(setter) = setter {
            meta = meta.with_setter(setter);
        }

        let mut store = self.store.lock();
        tracing::debug!(
            type_name,
            property = %meta.name,
            read_only = meta.read_only,
            "property registered"
        );
        store.entry_or_shell(type_name).upsert_property(meta);
        Ok(())
    }

    /// Remove every type. Generators are kept.
    pub fn clear(&self) {
        let mut store = self.store.lock();
        store.types.clear();
        store.shells.clear();
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    /// Get a copy of the current metadata for `name`.
    pub fn lookup_type(&self, name: &str) -> Option<TypeInfo> {
        self.store.lock().types.get(name).cloned()
    }

    pub fn contains_type(&self, name: &str) -> bool {
        self.store.lock().types.contains_key(name)
    }

    /// All registered type names, unordered.
    pub fn list_types(&self) -> Vec<String> {
        self.store.lock().types.keys().cloned().collect()
    }

    pub fn type_count(&self) -> usize {
        self.store.lock().types.len()
    }

    /// Value copy of all registered types.
    pub fn snapshot(&self) -> DataRegistrySnapshot {
        DataRegistrySnapshot::new(self.store.lock().types.clone())
    }

    // ==========================================================================
    // Runtime Bridge
    // ==========================================================================

    /// Invoke a registered function with `args`.
    pub fn invoke_function(
        &self,
        type_name: &str,
        function: &str,
        args: &[Value],
    ) -> Result<Value, RegistryError> {
        let callable = {
            let store = self.store.lock();
            let info = store
                .types
                .get(type_name)
                .ok_or_else(|| RegistryError::TypeNotFound(type_name.to_string()))?;
            let func = info
                .function(function)
                .ok_or_else(|| RegistryError::FunctionNotFound {
                    type_name: type_name.to_string(),
                    function: function.to_string(),
                })?;
            func.callable.clone().ok_or_else(|| RegistryError::NoCallable {
                type_name: type_name.to_string(),
                member: function.to_string(),
            })?
        };
        Ok(callable.call(args)?)
    }

    /// Read a property through its getter.
    pub fn get_property(
        &self,
        type_name: &str,
        property: &str,
        handle: ObjectHandle,
    ) -> Result<Value, RegistryError> {
        let getter = {
            let store = self.store.lock();
            let prop = Self::find_property(&store, type_name, property)?;
            prop.getter.clone().ok_or_else(|| RegistryError::NoCallable {
                type_name: type_name.to_string(),
                member: property.to_string(),
            })?
        };
        Ok(getter.call(&[Value::Handle(handle)])?)
    }

    /// Write a property through its setter.
    pub fn set_property(
        &self,
        type_name: &str,
        property: &str,
        handle: ObjectHandle,
        value: Value,
    ) -> Result<(), RegistryError> {
        let setter = {
            let store = self.store.lock();
            let prop = Self::find_property(&store, type_name, property)?;
            if prop.read_only {
                return Err(RegistryError::ReadOnlyProperty {
                    type_name: type_name.to_string(),
                    property: property.to_string(),
                });
            }
            prop.setter.clone().ok_or_else(|| RegistryError::NoCallable {
                type_name: type_name.to_string(),
                member: property.to_string(),
            })?
        };
        setter.call(&[Value::Handle(handle), value])?;
        Ok(())
    }

    fn find_property<'s>(
        store: &'s TypeStore,
        type_name: &str,
        property: &str,
    ) -> Result<&'s PropertyInfo, RegistryError> {
        store
            .types
            .get(type_name)
            .ok_or_else(|| RegistryError::TypeNotFound(type_name.to_string()))?
            .property(property)
            .ok_or_else(|| RegistryError::PropertyNotFound {
                type_name: type_name.to_string(),
                property: property.to_string(),
            })
    }

    // ==========================================================================
    // Generation
    // ==========================================================================

    /// Transfer ownership of a generator to the registry.
    pub fn add_generator(&self, generator: Box<dyn BindingGenerator>) {
        tracing::debug!(generator = generator.name(), "generator added");
        self.generators.lock().push(generator);
    }

    pub fn generator_count(&self) -> usize {
        self.generators.lock().len()
    }

    /// Run every registered generator, in registration order, against a
    /// snapshot taken before the first one starts.
    ///
    /// All generators run even if an earlier one fails.
    pub fn generate_bindings(&self, output_dir: &Path) -> GenerationSummary {
        let snapshot = self.snapshot();
        let mut generators = self.generators.lock();
        let mut summary = GenerationSummary::default();

        tracing::info!(
            types = snapshot.len(),
            generators = generators.len(),
            output_dir = %output_dir.display(),
            "generating bindings"
        );

        for generator in generators.iter_mut() {
            let name = generator.name().to_string();
            let result = generator.generate(&snapshot, output_dir);
            match &result {
                Ok(report) => tracing::info!(
                    generator = %name,
                    written = report.written.len(),
                    unchanged = report.unchanged.len(),
                    skipped = report.errors.len(),
                    "generator finished"
                ),
                Err(err) => tracing::error!(generator = %name, error = %err, "generator failed"),
            }
            summary.outcomes.push(GeneratorOutcome { name, result });
        }

        summary
    }
}

impl fmt::Debug for DataRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let store = self.store.lock();
        f.debug_struct("DataRegistry")
            .field("types", &format!("<{} types>", store.types.len()))
            .field("shells", &store.shells.len())
            .field("generators", &format!("<{} generators>", self.generators.lock().len()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dombind_core::{
        BindingError, CallError, EntryKind, GenerationError, GenerationReport, SemanticType,
    };
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::thread;

    fn widget() -> TypeInfo {
        TypeInfo::new("Widget", EntryKind::Object).with_file_stem("widget")
    }

    #[test]
    fn new_registry_is_empty() {
        let registry = DataRegistry::new();
        assert_eq!(registry.type_count(), 0);
        assert!(registry.list_types().is_empty());
        assert!(registry.lookup_type("Widget").is_none());
    }

    #[test]
    fn register_and_lookup() {
        let registry = DataRegistry::new();
        assert!(registry.register_type(widget()).unwrap().is_none());
        let found = registry.lookup_type("Widget").unwrap();
        assert_eq!(found.file_stem, "widget");
        assert_eq!(registry.list_types(), vec!["Widget".to_string()]);
    }

    #[test]
    fn reregistration_overwrites() {
        let registry = DataRegistry::new();
        registry
            .register_type(widget().with_function(FunctionInfo::new("old")))
            .unwrap();
        let previous = registry.register_type(widget().with_doc("v2")).unwrap();
        assert!(previous.unwrap().function("old").is_some());

        let current = registry.lookup_type("Widget").unwrap();
        assert_eq!(current.doc, "v2");
        assert!(current.function("old").is_none());
    }

    #[test]
    fn empty_names_are_rejected() {
        let registry = DataRegistry::new();
        assert_eq!(
            registry.register_type(TypeInfo::new("", EntryKind::Object)),
            Err(RegistryError::EmptyName("type"))
        );
        assert_eq!(
            registry.register_function("Widget", FunctionInfo::new(""), Callable::Host),
            Err(RegistryError::EmptyName("function"))
        );
    }

    #[test]
    fn members_before_type_create_shell() {
        let registry = DataRegistry::new();
        registry
            .register_function("Button", FunctionInfo::new("click"), Callable::Host)
            .unwrap();
        let shell = registry.lookup_type("Button").unwrap();
        assert_eq!(shell.kind, EntryKind::Object);
        assert!(shell.function("click").is_some());

        let declared = TypeInfo::new("Button", EntryKind::Object).with_file_stem("controls");
        assert!(registry.register_type(declared).unwrap().is_none());

        let merged = registry.lookup_type("Button").unwrap();
        assert_eq!(merged.file_stem, "controls");
        assert!(merged.function("click").is_some());
    }

    #[test]
    fn declared_member_keeps_shell_callable() {
        let declared = || {
            widget()
                .with_function(FunctionInfo::new("getName").returns(SemanticType::String))
                .with_property(PropertyInfo::new("width", SemanticType::Int32))
        };
        let attach = |registry: &DataRegistry| {
            registry
                .register_function(
                    "Widget",
                    FunctionInfo::new("getName").returns(SemanticType::String),
                    Callable::unary(|_| Value::Str("w".into())),
                )
                .unwrap();
            registry
                .register_property(
                    "Widget",
                    PropertyInfo::new("width", SemanticType::Int32),
                    Callable::getter(|_| Value::Int(4)),
                    None,
                )
                .unwrap();
        };

        let type_first = DataRegistry::new();
        type_first.register_type(declared()).unwrap();
        attach(&type_first);

        let members_first = DataRegistry::new();
        attach(&members_first);
        members_first.register_type(declared()).unwrap();

        for registry in [&type_first, &members_first] {
            let widget = registry.lookup_type("Widget").unwrap();
            assert_eq!(widget.functions.len(), 1);
            assert!(widget.function("getName").unwrap().is_bindable());
            let name = registry
                .invoke_function("Widget", "getName", &[Value::Handle(ObjectHandle(1))])
                .unwrap();
            assert_eq!(name, Value::Str("w".into()));
            let width = registry.get_property("Widget", "width", ObjectHandle(1)).unwrap();
            assert_eq!(width, Value::Int(4));
        }
        assert_eq!(
            type_first.lookup_type("Widget"),
            members_first.lookup_type("Widget")
        );
    }

    #[test]
    fn overwrite_after_shell_merge_is_plain() {
        let registry = DataRegistry::new();
        registry
            .register_function("Button", FunctionInfo::new("click"), Callable::Host)
            .unwrap();
        registry
            .register_type(TypeInfo::new("Button", EntryKind::Object))
            .unwrap();
        registry
            .register_type(TypeInfo::new("Button", EntryKind::Object))
            .unwrap();
        assert!(registry.lookup_type("Button").unwrap().functions.is_empty());
    }

    #[test]
    fn register_function_replaces_same_name() {
        let registry = DataRegistry::new();
        registry.register_type(widget()).unwrap();
        registry
            .register_function("Widget", FunctionInfo::new("getName"), Callable::Host)
            .unwrap();
        registry
            .register_function(
                "Widget",
                FunctionInfo::new("getName").returns(SemanticType::String),
                Callable::Host,
            )
            .unwrap();
        let info = registry.lookup_type("Widget").unwrap();
        assert_eq!(info.functions.len(), 1);
        assert_eq!(info.functions[0].return_type, SemanticType::String);
    }

    #[test]
    fn read_only_property_drops_setter() {
        let registry = DataRegistry::new();
        registry
            .register_property(
                "Label",
                PropertyInfo::new("text", SemanticType::String).read_only(),
                Callable::getter(|_| Value::Str("hello".into())),
                Some(Callable::setter(|_, _| {})),
            )
            .unwrap();
        let prop = registry.lookup_type("Label").unwrap().properties[0].clone();
        assert!(prop.getter.is_some());
        assert!(prop.setter.is_none());

        let err = registry
            .set_property("Label", "text", ObjectHandle(1), Value::Str("x".into()))
            .unwrap_err();
        assert!(matches!(err, RegistryError::ReadOnlyProperty { .. }));
    }

    #[test]
    fn property_accessors_round_trip() {
        let registry = DataRegistry::new();
        let stored = Arc::new(AtomicU64::new(10));
        let read = Arc::clone(&stored);
        let write = Arc::clone(&stored);
        registry
            .register_property(
                "Frame",
                PropertyInfo::new("width", SemanticType::Uint32),
                Callable::getter(move |_| Value::UInt(read.load(Ordering::SeqCst))),
                Some(Callable::setter(move |_, v| {
                    if let Value::UInt(v) = v {
                        write.store(v, Ordering::SeqCst);
                    }
                })),
            )
            .unwrap();

        registry
            .set_property("Frame", "width", ObjectHandle(2), Value::UInt(64))
            .unwrap();
        assert_eq!(
            registry.get_property("Frame", "width", ObjectHandle(2)).unwrap(),
            Value::UInt(64)
        );
    }

    #[test]
    fn invoke_function_reports_lookup_failures() {
        let registry = DataRegistry::new();
        registry.register_type(widget()).unwrap();
        assert_eq!(
            registry.invoke_function("Nope", "x", &[]),
            Err(RegistryError::TypeNotFound("Nope".into()))
        );
        assert!(matches!(
            registry.invoke_function("Widget", "x", &[]),
            Err(RegistryError::FunctionNotFound { .. })
        ));

        registry
            .register_function("Widget", FunctionInfo::new("native"), Callable::Host)
            .unwrap();
        assert_eq!(
            registry.invoke_function("Widget", "native", &[]),
            Err(RegistryError::Call(CallError::HostBound))
        );
    }

    #[test]
    fn callable_may_reenter_registry() {
        let registry = Arc::new(DataRegistry::new());
        let inner = Arc::clone(&registry);
        registry
            .register_function(
                "Core",
                FunctionInfo::new("typeCount").static_fn(),
                Callable::nullary(move || Value::UInt(inner.type_count() as u64)),
            )
            .unwrap();
        assert_eq!(
            registry.invoke_function("Core", "typeCount", &[]).unwrap(),
            Value::UInt(1)
        );
    }

    #[test]
    fn concurrent_registration() {
        let registry = Arc::new(DataRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    for j in 0..25 {
                        let name = format!("Type{i}_{j}");
                        registry
                            .register_type(TypeInfo::new(name.clone(), EntryKind::Object))
                            .unwrap();
                        registry
                            .register_function(&name, FunctionInfo::new("f"), Callable::Host)
                            .unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(registry.type_count(), 200);
        assert!(registry.snapshot().iter().all(|t| t.functions.len() == 1));
    }

    #[test]
    fn snapshot_is_isolated_from_later_registration() {
        let registry = DataRegistry::new();
        registry.register_type(widget()).unwrap();
        let snapshot = registry.snapshot();
        registry
            .register_type(TypeInfo::new("Stage", EntryKind::Object))
            .unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(registry.type_count(), 2);
    }

    struct Recording {
        name: &'static str,
        fail: bool,
        seen: Arc<AtomicU64>,
    }

    impl BindingGenerator for Recording {
        fn name(&self) -> &str {
            self.name
        }

        fn generate(
            &mut self,
            snapshot: &DataRegistrySnapshot,
            _output_dir: &Path,
        ) -> Result<GenerationReport, GenerationError> {
            self.seen.fetch_add(snapshot.len() as u64, Ordering::SeqCst);
            if self.fail {
                return Err(GenerationError::OutputDirsNotConfigured);
            }
            let mut report = GenerationReport::new(self.name);
            report.errors.push(BindingError::MissingCallable {
                type_name: "Widget".into(),
                function: "x".into(),
            });
            Ok(report)
        }
    }

    #[test]
    fn generate_bindings_runs_every_generator() {
        let registry = DataRegistry::new();
        registry.register_type(widget()).unwrap();
        let seen = Arc::new(AtomicU64::new(0));
        for (name, fail) in [("first", true), ("second", false)] {
            registry.add_generator(Box::new(Recording {
                name,
                fail,
                seen: Arc::clone(&seen),
            }));
        }

        let summary = registry.generate_bindings(Path::new("unused"));
        assert!(!summary.succeeded());
        assert_eq!(seen.load(Ordering::SeqCst), 2);
        assert_eq!(summary.outcomes[0].name, "first");
        assert_eq!(summary.failures().count(), 1);
        assert_eq!(summary.binding_errors().count(), 1);
        assert_eq!(summary.reports().count(), 1);
    }

    #[test]
    fn generate_bindings_without_generators_succeeds() {
        let registry = DataRegistry::new();
        assert!(registry.generate_bindings(Path::new("unused")).succeeded());
    }
}
