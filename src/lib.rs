//! # Twine Pipeflow
//!
//! Transient compressible gas pipeline models for
//! [Twine](https://github.com/isentropic-dev/twine).
//!
//! [`models::pipeline`] advances pressure, temperature, mass flow and
//! composition along a pipe one time step at a time. [`support`] holds the
//! pieces it is built from: sign-checked inputs, gas composition and
//! equations of state, and linear solves.
//!
//! The [`support`] modules are public so they can be reused, but their APIs
//! may change between minor versions. Code starts out inside a model's `core`
//! and is promoted to [`support`] once a second part of the crate needs it.

pub mod models;
pub mod support;
