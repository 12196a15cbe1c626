//! Operation registry
//!
//! An explicit registration table mapping operation names to a description,
//! an optional argument schema, and a handler. The table is built once at
//! startup and is read-only afterward.
//!
//! # Example
//!
//! ```rust,ignore
//! use mcp_common::OperationRegistry;
//!
//! let registry = OperationRegistry::new(Arc::new(service))
//!     .operation("read_file", "Read a file", |svc, args: ReadArgs| async move {
//!         svc.read(args).await
//!     })
//!     .raw_operation("roots", "List roots", |svc, _args| async move {
//!         Ok::<_, MyError>(svc.roots())
//!     });
//!
//! let output = registry.invoke("read_file", json!({ "path": "a.txt" })).await?;
//! ```

use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{DispatchError, OperationFailure};
use crate::result::Output;
use crate::validate::parse_arguments;

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

type Handler<S> = Box<dyn Fn(Arc<S>, Value) -> BoxFuture<Result<Output, DispatchError>> + Send + Sync>;

/// Metadata describing one callable operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    /// JSON Schema of the argument type, `None` for raw operations
    pub input_schema: Option<Value>,
}

struct Entry<S> {
    descriptor: OperationDescriptor,
    handler: Handler<S>,
}

/// Registration table plus the service the handlers run against
pub struct OperationRegistry<S> {
    service: Arc<S>,
    entries: Vec<Entry<S>>,
}

impl<S: Send + Sync + 'static> OperationRegistry<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self {
            service,
            entries: Vec::new(),
        }
    }

    /// Register an operation taking one structured argument
    ///
    /// The argument's JSON Schema is derived from `A` and used both for the
    /// descriptor and for validating untyped arguments before the call.
    pub fn operation<A, R, E, F, Fut>(
        self,
        name: &'static str,
        description: &'static str,
        handler: F,
    ) -> Self
    where
        A: DeserializeOwned + JsonSchema + Send + 'static,
        R: Serialize + Debug + Send + 'static,
        E: OperationFailure + Send + 'static,
        F: Fn(Arc<S>, A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
    {
        let schema = serde_json::to_value(schemars::schema_for!(A))
            .unwrap_or_else(|_| Value::Object(Map::new()));
        let check_schema = schema.clone();

        let boxed: Handler<S> = Box::new(
            move |service: Arc<S>, args: Value| -> BoxFuture<Result<Output, DispatchError>> {
                match parse_arguments::<A>(&check_schema, args) {
                    Ok(parsed) => {
                        let fut = handler(service, parsed);
                        Box::pin(async move {
                            fut.await
                                .map(|value| Output::from_value(&value))
                                .map_err(|e| DispatchError::failed(name, &e))
                        })
                    }
                    Err(violations) => Box::pin(async move {
                        Err(DispatchError::Validation {
                            operation: name.to_string(),
                            violations,
                        })
                    }),
                }
            },
        );

        self.push(name, description, Some(schema), boxed)
    }

    /// Register an operation without a structured argument
    ///
    /// The handler receives the raw argument map (`null` becomes empty).
    pub fn raw_operation<R, E, F, Fut>(
        self,
        name: &'static str,
        description: &'static str,
        handler: F,
    ) -> Self
    where
        R: Serialize + Debug + Send + 'static,
        E: OperationFailure + Send + 'static,
        F: Fn(Arc<S>, Map<String, Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
    {
        let boxed: Handler<S> = Box::new(
            move |service: Arc<S>, args: Value| -> BoxFuture<Result<Output, DispatchError>> {
                let map = match args {
                    Value::Null => Map::new(),
                    Value::Object(map) => map,
                    other => {
                        let violation =
                            format!("arguments must be a JSON object, got {}", other);
                        return Box::pin(async move {
                            Err(DispatchError::Validation {
                                operation: name.to_string(),
                                violations: vec![violation],
                            })
                        });
                    }
                };

                let fut = handler(service, map);
                Box::pin(async move {
                    fut.await
                        .map(|value| Output::from_value(&value))
                        .map_err(|e| DispatchError::failed(name, &e))
                })
            },
        );

        self.push(name, description, None, boxed)
    }

    fn push(
        mut self,
        name: &'static str,
        description: &'static str,
        input_schema: Option<Value>,
        handler: Handler<S>,
    ) -> Self {
        debug_assert!(
            self.lookup(name).is_none(),
            "operation {} registered twice",
            name
        );
        self.entries.push(Entry {
            descriptor: OperationDescriptor {
                name,
                description,
                input_schema,
            },
            handler,
        });
        self
    }

    fn lookup(&self, name: &str) -> Option<&Entry<S>> {
        self.entries.iter().find(|e| e.descriptor.name == name)
    }

    /// Descriptors in registration order
    pub fn list_operations(&self) -> Vec<OperationDescriptor> {
        self.entries.iter().map(|e| e.descriptor.clone()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Validate `args` and run the named operation
    pub async fn invoke(&self, name: &str, args: Value) -> Result<Output, DispatchError> {
        let Some(entry) = self.lookup(name) else {
            tracing::debug!("Rejected unknown operation {}", name);
            return Err(DispatchError::UnknownOperation(name.to_string()));
        };

        tracing::debug!("Invoking {}", name);
        let result = (entry.handler)(Arc::clone(&self.service), args).await;

        if let Err(e) = &result {
            tracing::debug!("{} returned {}: {}", name, e.kind(), e);
        }
        result
    }
}
