//! Actor type descriptors
//!
//! A [`TypeDescriptor`] is the structural description of an actor implementation:
//! its unique name, a factory for fresh instances and a dispatch table mapping
//! method names to type-erased invokers. Invokers take serialized arguments and
//! return a serialized result, so callers never need reflection at call time.

use std::{
    any::{Any, type_name},
    collections::BTreeMap,
    convert::Infallible,
    fmt,
    marker::PhantomData,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::Arc
};

use serde::Serialize;

use crate::domain::{
    error::InvokeError,
    value::{ArgList, Payload}
};

/// A live actor instance, owned by whichever worker hosts it
pub type ActorInstance = Box<dyn Any + Send>;

type Factory = Arc<dyn Fn() -> ActorInstance + Send + Sync>;
type Invoker = Arc<dyn Fn(&mut (dyn Any + Send), &[Payload]) -> Result<Payload, String> + Send + Sync>;

/// One entry of a type's dispatch table
#[derive(Clone)]
pub struct MethodDescriptor {
    name:        String,
    arg_types:   Vec<&'static str>,
    return_type: &'static str,
    invoker:     Invoker
}

impl MethodDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arg_types(&self) -> &[&'static str] {
        &self.arg_types
    }

    pub fn return_type(&self) -> &'static str {
        self.return_type
    }

    /// Run the method against an instance. Application errors, argument
    /// decoding errors and panics are all reported as `Err(message)`.
    pub fn invoke(&self, instance: &mut (dyn Any + Send), args: &[Payload]) -> Result<Payload, String> {
        match catch_unwind(AssertUnwindSafe(|| (self.invoker)(instance, args))) {
            Ok(result) => result,
            Err(panic) => {
                let reason = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                Err(format!("method `{}` panicked: {}", self.name, reason))
            }
        }
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("arg_types", &self.arg_types)
            .field("return_type", &self.return_type)
            .finish()
    }
}

/// Description of an actor implementation, keyed by its unique name
pub struct TypeDescriptor {
    namespace:   String,
    name:        String,
    unique_name: String,
    rust_type:   &'static str,
    factory:     Factory,
    methods:     BTreeMap<String, MethodDescriptor>
}

impl TypeDescriptor {
    /// Start describing `T`, instantiated through `T::default()`
    pub fn builder<T: Default + Send + 'static>(namespace: &str, name: &str) -> TypeDescriptorBuilder<T> {
        TypeDescriptorBuilder::new(namespace, name, T::default)
    }

    /// Start describing `T`, instantiated through `factory`
    pub fn builder_with<T, F>(namespace: &str, name: &str, factory: F) -> TypeDescriptorBuilder<T>
    where
        T: Send + 'static,
        F: Fn() -> T + Send + Sync + 'static
    {
        TypeDescriptorBuilder::new(namespace, name, factory)
    }

    /// Globally unique name: `namespace.name`, or `name` for the empty namespace
    pub fn unique_name(&self) -> &str {
        &self.unique_name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rust type name of the implementation
    pub fn rust_type(&self) -> &'static str {
        self.rust_type
    }

    /// Resolve a method on this type's surface
    pub fn method(&self, name: &str) -> Result<&MethodDescriptor, InvokeError> {
        self.methods.get(name).ok_or_else(|| InvokeError::MethodNotFound {
            type_name: self.unique_name.clone(),
            method:    name.to_string()
        })
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Method names in sorted order
    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    /// Create a fresh instance of the implementation
    pub fn instantiate(&self) -> ActorInstance {
        (self.factory)()
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("unique_name", &self.unique_name)
            .field("rust_type", &self.rust_type)
            .field("methods", &self.methods.values().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for a [`TypeDescriptor`] over the implementation type `T`
pub struct TypeDescriptorBuilder<T> {
    namespace: String,
    name:      String,
    factory:   Factory,
    methods:   BTreeMap<String, MethodDescriptor>,
    _marker:   PhantomData<fn() -> T>
}

impl<T: Send + 'static> TypeDescriptorBuilder<T> {
    fn new<F>(namespace: &str, name: &str, factory: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static
    {
        Self {
            namespace: namespace.to_string(),
            name:      name.to_string(),
            factory:   Arc::new(move || Box::new(factory()) as ActorInstance),
            methods:   BTreeMap::new(),
            _marker:   PhantomData
        }
    }

    /// Add an infallible method. A later method with the same name replaces it.
    pub fn method<A, R, F>(self, name: &str, f: F) -> Self
    where
        A: ArgList,
        R: Serialize + 'static,
        F: Fn(&mut T, A) -> R + Send + Sync + 'static
    {
        self.fallible_method(name, move |instance: &mut T, args: A| Ok::<R, Infallible>(f(instance, args)))
    }

    /// Add a method whose `Err` is reported to callers as a failed result
    pub fn fallible_method<A, R, E, F>(mut self, name: &str, f: F) -> Self
    where
        A: ArgList,
        R: Serialize + 'static,
        E: fmt::Display,
        F: Fn(&mut T, A) -> Result<R, E> + Send + Sync + 'static
    {
        let invoker: Invoker = Arc::new(move |state: &mut (dyn Any + Send), args: &[Payload]| {
            let instance =
                state.downcast_mut::<T>().ok_or_else(|| format!("actor instance is not a `{}`", type_name::<T>()))?;
            let args = A::decode(args)?;
            let value = f(instance, args).map_err(|e| e.to_string())?;
            Payload::encode(&value).map_err(|e| e.to_string())
        });

        let descriptor = MethodDescriptor {
            name: name.to_string(),
            arg_types: A::type_names(),
            return_type: type_name::<R>(),
            invoker
        };
        self.methods.insert(name.to_string(), descriptor);
        self
    }

    pub fn build(self) -> TypeDescriptor {
        let unique_name =
            if self.namespace.is_empty() { self.name.clone() } else { format!("{}.{}", self.namespace, self.name) };

        TypeDescriptor {
            namespace: self.namespace,
            name: self.name,
            unique_name,
            rust_type: type_name::<T>(),
            factory: self.factory,
            methods: self.methods
        }
    }
}
