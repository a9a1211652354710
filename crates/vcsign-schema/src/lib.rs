//! # vcsign-schema — Schema Evaluation
//!
//! Structural validation of credential subjects is delegated to a
//! [`SchemaEvaluator`]. Schema binding in `vcsign-vc` decides *which*
//! schema governs a subject and whether it is trusted; this crate only
//! answers whether an instance conforms.
//!
//! The default [`JsonSchemaEvaluator`] is backed by the `jsonschema` crate
//! and evaluates under Draft 2020-12. It never reaches the network: `$ref`
//! targets must be registered up front with
//! [`JsonSchemaEvaluator::with_schema`].
//!
//! ## Crate Policy
//!
//! - Depends only on `vcsign-core` internally.
//! - Evaluation failures are returned with structured violations
//!   (instance path, schema path, message), never logged.

pub mod evaluator;

pub use evaluator::{
    EvaluationError, JsonSchemaEvaluator, SchemaEvaluator, SchemaViolations, Violation,
    META_SCHEMA_ID,
};
