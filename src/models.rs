//! Public Twine models.
//!
//! Models are the primary public interface of this crate.
//!
//! # Model structure
//!
//! Each model lives in its own module and contains a `core` submodule where
//! the computation and domain logic live. Stateless pieces of a model, such
//! as the friction factor root search, are [`twine_core::Model`]s solved
//! with `twine-solvers`.

pub mod pipeline;
