//! Task callers
//!
//! A [`TaskCaller`] is bound to one actor and one method that was verified to
//! exist when the caller was built. Arguments are encoded as they are added,
//! so a value that cannot be serialized fails before anything is submitted.
//!
//! [`Method`] is the typed path: a method reference carrying its argument
//! tuple and return type, checked against the registered signature once.

use std::{fmt, marker::PhantomData};

use serde::{Serialize, de::DeserializeOwned};
use tokio_util::sync::CancellationToken;

use crate::{
    domain::{
        descriptor::MethodDescriptor,
        error::InvokeError,
        value::{ArgList, Payload}
    },
    runtime::{
        handle::ActorHandle,
        object_ref::{ObjectRef, TypedObjectRef}
    }
};

pub struct TaskCaller<'a> {
    handle: &'a ActorHandle,
    method: &'a MethodDescriptor,
    args:   Vec<Payload>
}

impl<'a> TaskCaller<'a> {
    pub(crate) fn new(handle: &'a ActorHandle, method: &'a MethodDescriptor) -> Self {
        Self { handle, method, args: Vec::new() }
    }

    /// Append one argument
    pub fn arg<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self, InvokeError> {
        self.args.push(Payload::encode(value)?);
        Ok(self)
    }

    /// Append every value of an argument tuple, in order
    pub fn with_args<A: ArgList>(mut self, args: &A) -> Result<Self, InvokeError> {
        self.args.extend(args.encode()?);
        Ok(self)
    }

    pub fn method(&self) -> &str {
        self.method.name()
    }

    pub fn arg_count(&self) -> usize {
        self.args.len()
    }

    /// Submit the task and return a reference to its result
    ///
    /// Calling `remote` twice submits two independent tasks.
    pub async fn remote(&self) -> Result<ObjectRef, InvokeError> {
        self.handle.submit(self.method, self.args.clone(), None).await
    }

    pub async fn remote_cancellable(&self, cancel: &CancellationToken) -> Result<ObjectRef, InvokeError> {
        self.handle.submit(self.method, self.args.clone(), Some(cancel)).await
    }
}

impl fmt::Debug for TaskCaller<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskCaller")
            .field("actor", self.handle.id())
            .field("method", &self.method.name())
            .field("args", &self.args.len())
            .finish()
    }
}

/// A method reference with a compile-time signature
///
/// ```ignore
/// const INCREASE: Method<(i64,), i64> = Method::new("Increase");
/// let total = handle.method(&INCREASE)?.remote((5,)).await?.get().await?;
/// ```
pub struct Method<A, R> {
    name:    &'static str,
    _marker: PhantomData<fn(A) -> R>
}

impl<A, R> Method<A, R> {
    pub const fn new(name: &'static str) -> Self {
        Self { name, _marker: PhantomData }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<A, R> Clone for Method<A, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A, R> Copy for Method<A, R> {}

impl<A, R> fmt::Debug for Method<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Method").field(&self.name).finish()
    }
}

/// Caller produced from a signature-checked [`Method`]
pub struct TypedTaskCaller<'a, A, R> {
    handle:  &'a ActorHandle,
    method:  &'a MethodDescriptor,
    _marker: PhantomData<fn(A) -> R>
}

impl<'a, A: ArgList, R: DeserializeOwned> TypedTaskCaller<'a, A, R> {
    pub(crate) fn new(handle: &'a ActorHandle, method: &'a MethodDescriptor) -> Self {
        Self { handle, method, _marker: PhantomData }
    }

    pub async fn remote(&self, args: A) -> Result<TypedObjectRef<R>, InvokeError> {
        let object_ref = self.handle.submit(self.method, args.encode()?, None).await?;
        Ok(TypedObjectRef::new(object_ref))
    }

    pub async fn remote_cancellable(&self, args: A, cancel: &CancellationToken) -> Result<TypedObjectRef<R>, InvokeError> {
        let object_ref = self.handle.submit(self.method, args.encode()?, Some(cancel)).await?;
        Ok(TypedObjectRef::new(object_ref))
    }
}
