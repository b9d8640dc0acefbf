//! Actor creators and handles

use std::{any::type_name, fmt, sync::Arc, time::Duration};

use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{Level, event};

use crate::{
    domain::{
        constant::{caller, creator},
        descriptor::{MethodDescriptor, TypeDescriptor},
        error::InvokeError,
        id::{ActorId, Language, TaskId},
        task::{ActorCreationOptions, ActorCreationRequest, DEFAULT_NUM_RETURNS, TaskInvocation},
        value::{ArgList, Payload}
    },
    port::{cluster::ClusterClient, store::ObjectStore},
    runtime::{
        caller::{Method, TaskCaller, TypedTaskCaller},
        object_ref::ObjectRef
    }
};

/// Collaborators shared by every creator, handle and reference of one runtime
pub(crate) struct ClusterContext {
    pub(crate) cluster:     Arc<dyn ClusterClient>,
    pub(crate) store:       Arc<dyn ObjectStore>,
    pub(crate) get_timeout: Option<Duration>
}

/// Builder for one remote actor of a resolved type
///
/// Holds no network state until [`ActorCreator::remote`] is awaited.
pub struct ActorCreator {
    descriptor: Arc<TypeDescriptor>,
    options:    ActorCreationOptions,
    context:    Arc<ClusterContext>
}

impl ActorCreator {
    pub(crate) fn new(descriptor: Arc<TypeDescriptor>, context: Arc<ClusterContext>) -> Self {
        Self { descriptor, options: ActorCreationOptions::default(), context }
    }

    /// Give the actor a name, unique within its namespace
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.options.name = Some(name.into());
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.options.namespace = Some(namespace.into());
        self
    }

    pub fn options(&self) -> &ActorCreationOptions {
        &self.options
    }

    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    /// Ask the cluster to create the actor and wait until it is placed
    pub async fn remote(&self) -> Result<ActorHandle, InvokeError> {
        self.create(None).await
    }

    pub async fn remote_cancellable(&self, cancel: &CancellationToken) -> Result<ActorHandle, InvokeError> {
        self.create(Some(cancel)).await
    }

    async fn create(&self, cancel: Option<&CancellationToken>) -> Result<ActorHandle, InvokeError> {
        let type_name = self.descriptor.unique_name();
        let request = ActorCreationRequest {
            type_name: type_name.to_string(),
            language:  Language::Rust,
            options:   self.options.clone()
        };

        event!(Level::DEBUG, event = creator::ACTOR_CREATING, type_name = %type_name,
               name = ?self.options.name, namespace = ?self.options.namespace);

        let spawn = self.context.cluster.spawn_actor(request);
        let result = match cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(InvokeError::Cancelled),
                result = spawn => result
            },
            None => spawn.await
        };

        match result {
            Ok(id) => {
                event!(Level::INFO, event = creator::ACTOR_CREATED, type_name = %type_name, actor_id = %id);
                Ok(ActorHandle {
                    id,
                    language: Language::Rust,
                    descriptor: self.descriptor.clone(),
                    context: self.context.clone()
                })
            }
            Err(e) => {
                let error = match e {
                    InvokeError::ActorCreationFailed { .. } | InvokeError::Cancelled => e,
                    other => InvokeError::ActorCreationFailed { type_name: type_name.to_string(), reason: other.to_string() }
                };
                event!(Level::WARN, event = creator::ACTOR_CREATION_FAILED, type_name = %type_name, error = %error);
                Err(error)
            }
        }
    }
}

impl fmt::Debug for ActorCreator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorCreator")
            .field("type_name", &self.descriptor.unique_name())
            .field("options", &self.options)
            .finish()
    }
}

/// Client-side reference to one live remote actor
///
/// Not `Clone`: a handle identifies one creation result.
pub struct ActorHandle {
    id:         ActorId,
    language:   Language,
    descriptor: Arc<TypeDescriptor>,
    context:    Arc<ClusterContext>
}

impl ActorHandle {
    pub fn id(&self) -> &ActorId {
        &self.id
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    pub fn type_name(&self) -> &str {
        self.descriptor.unique_name()
    }

    /// Prepare a call to `method`, failing with `MethodNotFound` before any I/O
    pub fn task(&self, method: &str) -> Result<TaskCaller<'_>, InvokeError> {
        Ok(TaskCaller::new(self, self.resolve(method)?))
    }

    /// Prepare a typed call, checking the reference's signature against the registered one
    pub fn method<A: ArgList, R: DeserializeOwned + 'static>(
        &self,
        method: &Method<A, R>
    ) -> Result<TypedTaskCaller<'_, A, R>, InvokeError> {
        let descriptor = self.resolve(method.name())?;

        let expected_args = A::type_names();
        if descriptor.arg_types() != expected_args.as_slice() {
            return Err(InvokeError::TypeMismatch {
                expected: format!("{}({})", descriptor.name(), descriptor.arg_types().join(", ")),
                found:    format!("{}({})", method.name(), expected_args.join(", "))
            });
        }
        if descriptor.return_type() != type_name::<R>() {
            return Err(InvokeError::TypeMismatch {
                expected: descriptor.return_type().to_string(),
                found:    type_name::<R>().to_string()
            });
        }

        Ok(TypedTaskCaller::new(self, descriptor))
    }

    fn resolve(&self, method: &str) -> Result<&MethodDescriptor, InvokeError> {
        match self.descriptor.method(method) {
            Ok(descriptor) => {
                event!(Level::DEBUG, event = caller::METHOD_RESOLVED, type_name = %self.type_name(), method = %method);
                Ok(descriptor)
            }
            Err(e) => {
                event!(Level::WARN, event = caller::METHOD_NOT_FOUND, type_name = %self.type_name(), method = %method);
                Err(e)
            }
        }
    }

    pub(crate) async fn submit(
        &self,
        method: &MethodDescriptor,
        args: Vec<Payload>,
        cancel: Option<&CancellationToken>
    ) -> Result<ObjectRef, InvokeError> {
        let invocation = TaskInvocation {
            task_id: TaskId::random(),
            actor_id: self.id.clone(),
            method: method.name().to_string(),
            args,
            num_returns: DEFAULT_NUM_RETURNS
        };

        let submission = self.context.cluster.submit_task(invocation);
        let result = match cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(InvokeError::Cancelled),
                result = submission => result
            },
            None => submission.await
        };

        let ids = result
            .and_then(|ids| {
                if ids.len() == DEFAULT_NUM_RETURNS {
                    Ok(ids)
                } else {
                    Err(InvokeError::TaskSubmissionFailed {
                        actor_id: self.id.to_string(),
                        method:   method.name().to_string(),
                        reason:   format!("cluster returned {} object id(s), expected {}", ids.len(), DEFAULT_NUM_RETURNS)
                    })
                }
            })
            .map_err(|e| {
                let error = match e {
                    InvokeError::TaskSubmissionFailed { .. } | InvokeError::Cancelled => e,
                    other => InvokeError::TaskSubmissionFailed {
                        actor_id: self.id.to_string(),
                        method:   method.name().to_string(),
                        reason:   other.to_string()
                    }
                };
                event!(Level::WARN, event = caller::TASK_SUBMISSION_FAILED, actor_id = %self.id,
                       method = %method.name(), error = %error);
                error
            })?;

        event!(Level::DEBUG, event = caller::TASK_SUBMITTED, actor_id = %self.id, method = %method.name());

        let expected_types = vec![method.return_type(); ids.len()];
        Ok(ObjectRef::new(ids, expected_types, self.context.store.clone(), self.context.get_timeout))
    }
}

impl fmt::Debug for ActorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorHandle")
            .field("id", &self.id)
            .field("language", &self.language)
            .field("type_name", &self.descriptor.unique_name())
            .finish()
    }
}
