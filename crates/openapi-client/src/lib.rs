//! # OpenAPI client
//!
//! Loads an OpenAPI 3 document (YAML or JSON) and invokes its operations by
//! `operationId`, filling path templates, query string, headers and JSON body from
//! an [`OperationRequest`]. Returns status, reason phrase and raw body text; callers
//! decide what a non-2xx status means.
//!
//! [`OperationInvoker`] is object-safe so bot actions can hold `Arc<dyn OperationInvoker>`.

mod client;
mod error;
mod spec;

pub use client::{ApiResponse, OpenApiClient, OperationInvoker, OperationRequest};
pub use error::{ApiError, Result};
pub use spec::{
    HttpMethod, OpenApiSpec, Operation, OperationRef, Parameter, ParameterLocation, PathItem,
    Server,
};
