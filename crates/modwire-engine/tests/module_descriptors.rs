//! Integration tests for module descriptor creation
//!
//! Covers extraction, companion merging, hierarchy includes and the
//! descriptor cache as seen through the public factory API.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Weak};
use std::thread;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;

use modwire_engine::{
    DeclarationFactory, DescriptorError, DescriptorHandle, ModuleDescriptor,
    ModuleDescriptorFactory, StandardDeclarationFactory,
};
use modwire_types::{
    BindingDeclaration, ClassName, ContributionBinding, ContributionKind, DelegateDeclaration, Key,
    Marker, MetadataError, MethodBuilder, MethodElement, ModuleAnnotation, ModuleKind,
    MultibindingDeclaration, OptionalBindingDeclaration, SubcomponentDeclaration, TypeId,
    TypeMetadata, TypeModel,
};

/// `@Module class Foo { @Provides fun a(): A; @Binds fun b(): B }`
fn foo_module() -> (TypeModel, TypeId) {
    let mut b = TypeModel::builder();
    let foo = b.declare("com.example.Foo");
    let mut class = b.class(foo);
    class.module(ModuleKind::Module);
    class.method(MethodBuilder::new("a").returns("com.example.A").marker(Marker::Provides));
    class.method(MethodBuilder::new("b").returns("com.example.B").marker(Marker::Binds));
    (b.build(), foo)
}

#[test]
fn test_provides_and_binds() {
    let (model, foo) = foo_module();
    let factory = ModuleDescriptorFactory::new(Arc::new(model));

    let descriptor = factory.create(foo).unwrap();
    assert_eq!(descriptor.module_type(), foo);
    assert_eq!(descriptor.kind(), ModuleKind::Module);

    assert_eq!(descriptor.bindings().len(), 1);
    let binding = &descriptor.bindings()[0];
    assert_eq!(binding.kind, ContributionKind::Provision);
    assert_eq!(binding.key, Key::of("com.example.A"));
    assert_eq!(binding.contributing_module, foo);

    assert_eq!(descriptor.delegate_declarations().len(), 1);
    let delegate = &descriptor.delegate_declarations()[0];
    assert_eq!(delegate.key, Key::of("com.example.B"));
    assert_eq!(delegate.delegate_key, None);
    assert_eq!(delegate.binding_element.name, "b");

    assert!(descriptor.included_modules().is_empty());
    assert!(descriptor.multibinding_declarations().is_empty());
    assert!(descriptor.optional_declarations().is_empty());
    assert!(descriptor.subcomponent_declarations().is_empty());
    assert_eq!(descriptor.all_binding_declarations().len(), 2);
}

#[test]
fn test_create_is_idempotent() {
    let (model, foo) = foo_module();
    let factory = ModuleDescriptorFactory::new(Arc::new(model));

    let first = factory.create(foo).unwrap();
    let second = factory.create(foo).unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    let stats = factory.cache_stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);
}

#[test]
fn test_all_binding_declarations_is_the_union() {
    let mut b = TypeModel::builder();
    let module = b.declare("com.example.EverythingModule");
    let child = b.declare("com.example.ChildComponent");
    let mut class = b.class(module);
    class.module(ModuleKind::ProducerModule).subcomponent(child);
    class.method(MethodBuilder::new("clock").returns("com.Clock").marker(Marker::Provides));
    class.method(MethodBuilder::new("rates").returns("com.Rates").marker(Marker::Produces));
    class.method(
        MethodBuilder::new("api")
            .returns("com.Api")
            .param("com.ApiImpl")
            .marker(Marker::Binds),
    );
    class.method(
        MethodBuilder::new("plugins")
            .returns("java.util.Set<com.Plugin>")
            .marker(Marker::Multibinds),
    );
    class.method(
        MethodBuilder::new("tracer")
            .returns("com.Tracer")
            .marker(Marker::BindsOptionalOf),
    );
    let factory = ModuleDescriptorFactory::new(Arc::new(b.build()));

    let descriptor = factory.create(module).unwrap();
    assert_eq!(descriptor.kind(), ModuleKind::ProducerModule);

    let expected = descriptor.bindings().len()
        + descriptor.delegate_declarations().len()
        + descriptor.multibinding_declarations().len()
        + descriptor.optional_declarations().len()
        + descriptor.subcomponent_declarations().len();
    assert_eq!(expected, 6);
    assert_eq!(descriptor.all_binding_declarations().len(), expected);

    let subcomponents = descriptor
        .all_binding_declarations()
        .iter()
        .filter(|declaration| matches!(declaration, BindingDeclaration::Subcomponent(_)))
        .count();
    assert_eq!(subcomponents, 1);
    assert!(descriptor
        .all_binding_keys()
        .contains(&Key::of("java.util.Set<com.Plugin>")));
}

#[test]
fn test_companion_bindings_are_merged() {
    let mut b = TypeModel::builder();
    let module = b.declare("com.example.NetworkModule");
    let companion = b.declare("com.example.NetworkModule.Companion");
    b.class(module).module(ModuleKind::Module).companion(companion);
    b.class(module).method(
        MethodBuilder::new("client")
            .returns("com.example.Client")
            .marker(Marker::Provides),
    );
    // Mirror of the companion method, visible on the owner
    b.class(module).method(
        MethodBuilder::new("baseUrl")
            .returns("java.lang.String")
            .marker(Marker::Provides),
    );
    b.class(companion).method(
        MethodBuilder::new("baseUrl")
            .returns("java.lang.String")
            .marker(Marker::Provides),
    );
    b.class(companion).method(
        MethodBuilder::new("timeout")
            .returns("long")
            .marker(Marker::Provides),
    );
    b.class(companion).method(
        MethodBuilder::new("cache")
            .returns("com.example.Cache")
            .marker(Marker::Provides)
            .marker(Marker::JvmStatic),
    );
    let factory = ModuleDescriptorFactory::new(Arc::new(b.build()));

    let descriptor = factory.create(module).unwrap();
    let owners: Vec<(String, TypeId)> = descriptor
        .bindings()
        .iter()
        .map(|binding| (binding.binding_element.name.clone(), binding.contributing_module))
        .collect();
    assert_eq!(
        owners,
        vec![
            ("client".to_string(), module),
            ("baseUrl".to_string(), module),
            ("timeout".to_string(), companion),
        ]
    );
}

#[test]
fn test_hierarchy_includes_and_inherited_bindings() {
    let mut b = TypeModel::builder();
    let object = b.declare("java.lang.Object");
    let base = b.declare("com.example.BaseModule");
    let module = b.declare("com.example.AppModule");
    let x = b.declare("com.example.X");
    let y = b.declare("com.example.Y");
    b.class(base).extends(object).include(x);
    b.class(base).method(
        MethodBuilder::new("logger")
            .returns("com.example.Logger")
            .marker(Marker::Provides),
    );
    b.class(module).extends(base).include(y);
    b.class(x).module(ModuleKind::Module);
    b.class(y).module(ModuleKind::Module);
    let factory = ModuleDescriptorFactory::new(Arc::new(b.build()));

    let descriptor = factory.create(module).unwrap();
    assert_eq!(
        descriptor.included_modules().iter().copied().collect::<Vec<_>>(),
        vec![x, y]
    );
    assert_eq!(descriptor.bindings().len(), 1);
    assert_eq!(descriptor.bindings()[0].contributing_module, module);
}

#[test]
fn test_self_include_is_dropped() {
    let mut b = TypeModel::builder();
    let module = b.declare("com.example.LoopModule");
    b.class(module).include(module);
    let factory = ModuleDescriptorFactory::new(Arc::new(b.build()));

    let descriptor = factory.create(module).unwrap();
    assert!(descriptor.included_modules().is_empty());
}

#[test]
fn test_not_a_module() {
    let mut b = TypeModel::builder();
    let plain = b.declare("com.example.Plain");
    let factory = ModuleDescriptorFactory::new(Arc::new(b.build()));

    let err = factory.create(plain).unwrap_err();
    assert_eq!(
        err,
        DescriptorError::NotAModule {
            ty: plain,
            name: "com.example.Plain".to_string(),
        }
    );
    assert!(err.to_string().contains("com.example.Plain"));
    assert!(factory.cache().is_empty());
}

#[test]
fn test_failed_build_is_not_cached() {
    let mut b = TypeModel::builder();
    let module = b.declare("com.example.BrokenModule");
    let dangling = TypeId::from_raw(99);
    b.class(module).module(ModuleKind::Module).companion(dangling);
    b.class(module).method(MethodBuilder::new("api").returns("com.Api").marker(Marker::Provides));
    let factory = ModuleDescriptorFactory::new(Arc::new(b.build()));

    assert_eq!(
        factory.create(module).unwrap_err(),
        DescriptorError::Metadata(MetadataError::UnknownType(dangling))
    );
    assert!(factory.cache().is_empty());

    // The next request retries from scratch
    assert!(factory.create(module).is_err());
    assert_eq!(factory.cache_stats().misses, 2);
}

#[test]
fn test_unknown_type_is_a_metadata_error() {
    let factory = ModuleDescriptorFactory::new(Arc::new(TypeModel::default()));
    let ghost = TypeId::from_raw(42);

    assert_eq!(
        factory.create(ghost).unwrap_err(),
        DescriptorError::Metadata(MetadataError::UnknownType(ghost))
    );
}

/// Delegates to a [`TypeModel`], counting how often members are enumerated
struct CountingMetadata {
    inner: TypeModel,
    member_scans: AtomicUsize,
}

impl TypeMetadata for CountingMetadata {
    fn class_name(&self, ty: TypeId) -> Result<ClassName, MetadataError> {
        self.inner.class_name(ty)
    }

    fn superclass(&self, ty: TypeId) -> Result<Option<TypeId>, MetadataError> {
        self.inner.superclass(ty)
    }

    fn all_methods(&self, ty: TypeId) -> Result<Vec<MethodElement>, MetadataError> {
        self.member_scans.fetch_add(1, Ordering::SeqCst);
        self.inner.all_methods(ty)
    }

    fn enclosed_methods(&self, ty: TypeId) -> Result<Vec<MethodElement>, MetadataError> {
        self.inner.enclosed_methods(ty)
    }

    fn has_marker(&self, method: &MethodElement, marker: Marker) -> Result<bool, MetadataError> {
        self.inner.has_marker(method, marker)
    }

    fn module_annotation(&self, ty: TypeId) -> Result<Option<ModuleAnnotation>, MetadataError> {
        self.inner.module_annotation(ty)
    }

    fn companion_object(&self, ty: TypeId) -> Result<Option<TypeId>, MetadataError> {
        self.inner.companion_object(ty)
    }

    fn type_by_name(&self, canonical_name: &str) -> Option<TypeId> {
        self.inner.type_by_name(canonical_name)
    }
}

#[test]
fn test_clear_cache_reruns_extraction() {
    let (model, foo) = foo_module();
    let metadata = Arc::new(CountingMetadata {
        inner: model,
        member_scans: AtomicUsize::new(0),
    });
    let factory = ModuleDescriptorFactory::new(metadata.clone());

    let first = factory.create(foo).unwrap();
    factory.create(foo).unwrap();
    assert_eq!(metadata.member_scans.load(Ordering::SeqCst), 1);

    factory.clear_cache();
    assert!(factory.cache().is_empty());

    let rebuilt = factory.create(foo).unwrap();
    assert_eq!(metadata.member_scans.load(Ordering::SeqCst), 2);
    assert!(!Arc::ptr_eq(&first, &rebuilt));
    assert_eq!(first.bindings(), rebuilt.bindings());
}

#[test]
fn test_create_uncached_bypasses_cache() {
    let (model, foo) = foo_module();
    let factory = ModuleDescriptorFactory::new(Arc::new(model));

    let descriptor = factory.create_uncached(foo).unwrap();
    assert_eq!(descriptor.bindings().len(), 1);
    assert!(factory.cache().is_empty());
}

/// Standard declarations, with a hook run before every provision binding
struct HookedDeclarations<F> {
    hook: F,
}

impl<F> DeclarationFactory for HookedDeclarations<F>
where
    F: Fn(&MethodElement, TypeId) + Send + Sync,
{
    fn provides_method_binding(
        &self,
        method: &MethodElement,
        module: TypeId,
    ) -> Result<ContributionBinding, DescriptorError> {
        (self.hook)(method, module);
        StandardDeclarationFactory.provides_method_binding(method, module)
    }

    fn produces_method_binding(
        &self,
        method: &MethodElement,
        module: TypeId,
    ) -> Result<ContributionBinding, DescriptorError> {
        StandardDeclarationFactory.produces_method_binding(method, module)
    }

    fn delegate_declaration(
        &self,
        method: &MethodElement,
        module: TypeId,
    ) -> Result<DelegateDeclaration, DescriptorError> {
        StandardDeclarationFactory.delegate_declaration(method, module)
    }

    fn multibinding_declaration(
        &self,
        method: &MethodElement,
        module: TypeId,
    ) -> Result<MultibindingDeclaration, DescriptorError> {
        StandardDeclarationFactory.multibinding_declaration(method, module)
    }

    fn optional_declaration(
        &self,
        method: &MethodElement,
        module: TypeId,
    ) -> Result<OptionalBindingDeclaration, DescriptorError> {
        StandardDeclarationFactory.optional_declaration(method, module)
    }

    fn subcomponent_declarations(
        &self,
        metadata: &dyn TypeMetadata,
        module: TypeId,
        annotation: &ModuleAnnotation,
    ) -> Result<Vec<SubcomponentDeclaration>, DescriptorError> {
        StandardDeclarationFactory.subcomponent_declarations(metadata, module, annotation)
    }
}

/// Factory whose declaration hook calls back into it, the way a resolver
/// might during extraction
fn hooked_factory<F>(model: TypeModel, hook: F) -> Arc<ModuleDescriptorFactory>
where
    F: Fn(&ModuleDescriptorFactory, &MethodElement, TypeId) + Send + Sync + 'static,
{
    let owner: Arc<OnceCell<Weak<ModuleDescriptorFactory>>> = Arc::new(OnceCell::new());
    let declarations = HookedDeclarations {
        hook: {
            let owner = Arc::clone(&owner);
            move |method: &MethodElement, module: TypeId| {
                if let Some(factory) = owner.get().and_then(Weak::upgrade) {
                    hook(&*factory, method, module);
                }
            }
        },
    };
    let factory = Arc::new(
        ModuleDescriptorFactory::new(Arc::new(model)).with_declarations(Arc::new(declarations)),
    );
    assert!(owner.set(Arc::downgrade(&factory)).is_ok());
    factory
}

#[test]
fn test_reentrant_request_gets_pending_handle() {
    let (model, foo) = foo_module();
    let handles: Arc<Mutex<Vec<DescriptorHandle>>> = Arc::default();
    let nested_creates: Arc<Mutex<Vec<DescriptorError>>> = Arc::default();

    let factory = {
        let handles = Arc::clone(&handles);
        let nested_creates = Arc::clone(&nested_creates);
        hooked_factory(model, move |factory, _, module| {
            let handle = factory.request(module).unwrap();
            assert!(!handle.is_ready());
            handles.lock().push(handle);
            if let Err(err) = factory.create(module) {
                nested_creates.lock().push(err);
            }
        })
    };

    let descriptor = factory.create(foo).unwrap();

    let handles = handles.lock();
    assert_eq!(handles.len(), 1);
    let nested = handles[0].get().unwrap();
    assert!(Arc::ptr_eq(&nested, &descriptor));

    assert_eq!(
        *nested_creates.lock(),
        vec![DescriptorError::BuildInProgress(foo)]
    );

    let stats = factory.cache_stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.reentrant_hits, 2);
}

#[test]
fn test_panicking_collaborator_leaves_nothing_cached() {
    let (model, foo) = foo_module();
    let panicked = AtomicBool::new(false);
    let factory = hooked_factory(model, move |_, _, _| {
        if !panicked.swap(true, Ordering::SeqCst) {
            panic!("resolver crashed");
        }
    });

    let first = panic::catch_unwind(AssertUnwindSafe(|| factory.create(foo)));
    assert!(first.is_err());
    assert!(factory.cache().is_empty());

    let retried = factory.create(foo).unwrap();
    assert_eq!(retried.bindings().len(), 1);
    assert_eq!(factory.cache_stats().misses, 2);
}

#[test]
fn test_crossed_builds_on_two_threads_finish() {
    // Building X needs Y and building Y needs X, each started on its own thread
    let mut b = TypeModel::builder();
    let x = b.declare("com.example.XModule");
    let y = b.declare("com.example.YModule");
    b.class(x).module(ModuleKind::Module);
    b.class(x).method(MethodBuilder::new("x").returns("com.X").marker(Marker::Provides));
    b.class(y).module(ModuleKind::Module);
    b.class(y).method(MethodBuilder::new("y").returns("com.Y").marker(Marker::Provides));

    type Nested = (TypeId, Result<Arc<ModuleDescriptor>, DescriptorError>);
    let both_building = Arc::new(Barrier::new(2));
    let nested: Arc<Mutex<Vec<Nested>>> = Arc::default();
    let factory = {
        let both_building = Arc::clone(&both_building);
        let nested = Arc::clone(&nested);
        hooked_factory(b.build(), move |factory, _, module| {
            let other = if module == x { y } else { x };
            both_building.wait();
            let result = factory.create(other);
            nested.lock().push((other, result));
        })
    };

    let workers: Vec<_> = [x, y]
        .into_iter()
        .map(|module| {
            let factory = Arc::clone(&factory);
            thread::spawn(move || factory.create(module))
        })
        .collect();
    for worker in workers {
        assert!(worker.join().unwrap().is_ok());
    }

    let nested = nested.lock();
    assert_eq!(nested.len(), 2);
    let refused: Vec<_> = nested
        .iter()
        .filter_map(|(other, result)| result.as_ref().err().map(|err| (*other, err.clone())))
        .collect();
    assert_eq!(refused.len(), 1);
    assert_eq!(refused[0].1, DescriptorError::BuildInProgress(refused[0].0));

    let built = nested.iter().find_map(|(_, result)| result.as_ref().ok()).unwrap();
    assert!(Arc::ptr_eq(built, &factory.create(built.module_type()).unwrap()));
}

#[test]
fn test_concurrent_creates_share_one_descriptor() {
    let (model, foo) = foo_module();
    let factory = Arc::new(ModuleDescriptorFactory::new(Arc::new(model)));

    let workers: Vec<_> = (0..8)
        .map(|_| {
            let factory = Arc::clone(&factory);
            thread::spawn(move || factory.create(foo).unwrap())
        })
        .collect();
    let descriptors: Vec<_> = workers
        .into_iter()
        .map(|worker| worker.join().unwrap())
        .collect();

    for descriptor in &descriptors[1..] {
        assert!(Arc::ptr_eq(descriptor, &descriptors[0]));
    }
    assert_eq!(factory.cache_stats().misses, 1);
}
