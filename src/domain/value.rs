//! Serialized values exchanged with the cluster and the object store
//!
//! Every value crossing the boundary is a [`Payload`]: serde_json bytes tagged
//! with the Rust type name of the encoded value. Results come back as
//! [`ObjectValue`]s, which carry an explicit success/failure marker so that a
//! remote application error is never mistaken for a value.

use std::any::type_name;

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::domain::error::InvokeError;

/// One serialized value plus the type tag it was encoded from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    type_tag: String,
    data:     Vec<u8>
}

impl Payload {
    /// Encode a value, tagging it with its Rust type name
    pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Self, InvokeError> {
        let data = serde_json::to_vec(value)
            .map_err(|e| InvokeError::Serialization(format!("failed to encode `{}`: {}", type_name::<T>(), e)))?;
        Ok(Self { type_tag: type_name::<T>().to_string(), data })
    }

    /// Decode as `T`, failing with `TypeMismatch` if the tag names another type
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, InvokeError> {
        let expected = type_name::<T>();
        if self.type_tag != expected {
            return Err(InvokeError::TypeMismatch { expected: expected.to_string(), found: self.type_tag.clone() });
        }
        serde_json::from_slice(&self.data)
            .map_err(|e| InvokeError::Serialization(format!("failed to decode `{}`: {}", expected, e)))
    }

    /// Decode as `T` ignoring the tag; any JSON-compatible encoding is accepted
    pub fn decode_untagged<T: DeserializeOwned>(&self) -> Result<T, String> {
        serde_json::from_slice(&self.data)
            .map_err(|e| format!("cannot decode `{}` as `{}`: {}", self.type_tag, type_name::<T>(), e))
    }

    /// Untyped view of the value
    pub fn to_json(&self) -> Result<serde_json::Value, InvokeError> {
        Ok(serde_json::from_slice(&self.data)?)
    }

    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Failure reported by the worker that executed a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFailure {
    pub method:  String,
    pub message: String
}

/// One resolved result slot of an object reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectValue {
    /// The task produced a value
    Ready(Payload),
    /// The task ran and raised an application error
    Failed(TaskFailure)
}

impl ObjectValue {
    pub fn failed(method: impl Into<String>, message: impl Into<String>) -> Self {
        ObjectValue::Failed(TaskFailure { method: method.into(), message: message.into() })
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ObjectValue::Ready(_))
    }

    pub fn payload(&self) -> Option<&Payload> {
        match self {
            ObjectValue::Ready(payload) => Some(payload),
            ObjectValue::Failed(_) => None
        }
    }

    /// Type tag of a successful value
    pub fn type_tag(&self) -> Option<&str> {
        self.payload().map(Payload::type_tag)
    }

    /// Checked accessor: the value as `T`
    pub fn get<T: DeserializeOwned>(&self) -> Result<T, InvokeError> {
        match self {
            ObjectValue::Ready(payload) => payload.decode(),
            ObjectValue::Failed(failure) => Err(failure.clone().into())
        }
    }

    /// Untyped accessor: the value as JSON
    pub fn to_json(&self) -> Result<serde_json::Value, InvokeError> {
        match self {
            ObjectValue::Ready(payload) => payload.to_json(),
            ObjectValue::Failed(failure) => Err(failure.clone().into())
        }
    }
}

impl From<TaskFailure> for InvokeError {
    fn from(failure: TaskFailure) -> Self {
        InvokeError::RemoteExecutionFailed { method: failure.method, message: failure.message }
    }
}

/// An ordered argument list, implemented for tuples of up to four values
///
/// Encoding happens on the submitting side, decoding on the executing side.
/// Decoding checks arity and accepts any JSON-compatible encoding, so an `i32`
/// argument satisfies an `i64` parameter.
pub trait ArgList: Sized + Send + 'static {
    fn type_names() -> Vec<&'static str>;

    fn encode(&self) -> Result<Vec<Payload>, InvokeError>;

    fn decode(args: &[Payload]) -> Result<Self, String>;
}

macro_rules! impl_arg_list {
    ($len:expr; $($name:ident : $idx:tt),*) => {
        impl<$($name),*> ArgList for ($($name,)*)
        where
            $($name: Serialize + DeserializeOwned + Send + 'static),*
        {
            fn type_names() -> Vec<&'static str> {
                vec![$(type_name::<$name>()),*]
            }

            fn encode(&self) -> Result<Vec<Payload>, InvokeError> {
                Ok(vec![$(Payload::encode(&self.$idx)?),*])
            }

            fn decode(args: &[Payload]) -> Result<Self, String> {
                if args.len() != $len {
                    return Err(format!("expected {} argument(s), got {}", $len, args.len()));
                }
                Ok(($(args[$idx].decode_untagged::<$name>()?,)*))
            }
        }
    };
}

impl_arg_list!(0;);
impl_arg_list!(1; A: 0);
impl_arg_list!(2; A: 0, B: 1);
impl_arg_list!(3; A: 0, B: 1, C: 2);
impl_arg_list!(4; A: 0, B: 1, C: 2, D: 3);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_accessor_rejects_other_types() {
        let value = ObjectValue::Ready(Payload::encode(&10i64).unwrap());

        assert_eq!(value.get::<i64>().unwrap(), 10);
        assert_eq!(value.type_tag(), Some("i64"));

        match value.get::<String>() {
            Err(InvokeError::TypeMismatch { expected, found }) => {
                assert_eq!(expected, type_name::<String>());
                assert_eq!(found, "i64");
            }
            other => panic!("expected TypeMismatch, got {:?}", other)
        }
    }

    #[test]
    fn test_failed_value_surfaces_remote_error() {
        let value = ObjectValue::failed("Divide", "division by zero");

        assert!(!value.is_ready());
        assert!(value.payload().is_none());
        assert_eq!(
            value.get::<i64>(),
            Err(InvokeError::RemoteExecutionFailed {
                method:  "Divide".to_string(),
                message: "division by zero".to_string()
            })
        );
        assert!(value.to_json().is_err());
    }

    #[test]
    fn test_untyped_accessor() {
        let value = ObjectValue::Ready(Payload::encode("hello").unwrap());
        assert_eq!(value.to_json().unwrap(), serde_json::json!("hello"));
    }

    #[test]
    fn test_arg_list_checks_arity_and_decodes_leniently() {
        let encoded = (5i32, "x".to_string()).encode().unwrap();
        assert_eq!(encoded.len(), 2);

        let decoded = <(i64, String)>::decode(&encoded).unwrap();
        assert_eq!(decoded, (5, "x".to_string()));

        let err = <(i64,)>::decode(&encoded).unwrap_err();
        assert!(err.contains("expected 1 argument(s), got 2"));

        assert!(<()>::decode(&[]).is_ok());
        assert!(<()>::type_names().is_empty());
        assert_eq!(<(i64, bool)>::type_names(), vec!["i64", "bool"]);
    }
}
