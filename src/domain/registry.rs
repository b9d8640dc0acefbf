//! Type Registry
//!
//! Maps unique type names to [`TypeDescriptor`]s. The registry is populated on an
//! owned value during initialization and then frozen into an `Arc`, after which
//! it is read-only and may be shared across threads.

use std::{collections::HashMap, sync::Arc};

use tracing::{Level, event};

use crate::domain::{constant::registry, descriptor::TypeDescriptor, error::InvokeError};

#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: HashMap<String, Arc<TypeDescriptor>>
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a descriptor under its unique name. Re-registering a name is rejected
    /// and leaves the existing entry untouched.
    pub fn register(&mut self, descriptor: TypeDescriptor) -> Result<Arc<TypeDescriptor>, InvokeError> {
        let name = descriptor.unique_name().to_string();

        if self.types.contains_key(&name) {
            event!(Level::WARN, event = registry::TYPE_REJECTED, type_name = %name);
            return Err(InvokeError::DuplicateType(name));
        }

        let descriptor = Arc::new(descriptor);
        self.types.insert(name.clone(), Arc::clone(&descriptor));

        event!(Level::DEBUG, event = registry::TYPE_REGISTERED, type_name = %name,
               methods = descriptor.method_names().count());

        Ok(descriptor)
    }

    /// Look up a descriptor by unique name
    pub fn resolve(&self, name: &str) -> Result<Arc<TypeDescriptor>, InvokeError> {
        match self.types.get(name) {
            Some(descriptor) => Ok(Arc::clone(descriptor)),
            None => {
                event!(Level::DEBUG, event = registry::TYPE_UNKNOWN, type_name = %name);
                Err(InvokeError::UnknownType(name.to_string()))
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Registered names in sorted order
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.types.keys().cloned().collect();
        names.sort();
        names
    }

    /// End the registration phase. The returned handle is read-only.
    pub fn freeze(self) -> Arc<TypeRegistry> {
        event!(Level::DEBUG, event = registry::REGISTRY_FROZEN, types = self.types.len());
        Arc::new(self)
    }
}
