//! Parametric **gear solids**: involute, cycloidal, bevel and rack teeth,
//! generated from a handful of gear parameters and built into solids through
//! a pluggable geometry [`Kernel`](kernel::Kernel).
//!
//! The pipeline is pure and deterministic:
//! 1. a [tooth generator](tooth) samples the flank curves of one tooth,
//! 2. the [profile assembler](profile) replicates the tooth around the axis
//!    into a closed outline,
//! 3. the [solid builder](solid) extrudes, sweeps or lofts that outline with
//!    the kernel's primitives.
//!
//! [`MeshKernel`] is a polygon-mesh kernel shipped with the crate; a CAD host
//! implements [`Kernel`](kernel::Kernel) over its own B-rep types.
//!
//! # Features
//! #### Default
//! - **f64**: use f64 as Real
//!
//! #### Optional
//! - **f32**: use f32 as Real, this conflicts with f64
//! - **parallel**: use rayon for multithreading
//!
//! # Logging
//! Every stage emits [`tracing`] events: `debug` for derived dimensions and
//! intermediate shapes, `info` once per built gear, `warn` when a solid has to
//! be reversed. Install any `tracing` subscriber to see them.

#![forbid(unsafe_code)]
#![warn(clippy::missing_const_for_fn, clippy::approx_constant, clippy::all)]

pub mod errors;
pub mod float_types;
pub mod gear;
pub mod gear_spec;
pub mod kernel;
pub mod mesh;
pub mod profile;
pub mod solid;
pub mod tooth;

#[cfg(any(all(feature = "f64", feature = "f32"), not(any(feature = "f64", feature = "f32"))))]
compile_error!("Either 'f64' or 'f32' feature must be specified, but not both");

pub use errors::{ConstructionError, GearError, GearResult};
pub use float_types::Real;
pub use gear_spec::{GearSpec, ToothFamily};
pub use kernel::{Kernel, MeshKernel};
pub use mesh::Mesh;
pub use profile::Profile;
pub use tooth::{ToothCurve, ToothGenerator};
