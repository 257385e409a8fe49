//! Transient gas pipeline model.
//!
//! Simulates pressure, temperature, mass flow and composition along a
//! pipeline over time, given conditions at its ends. The computational core
//! lives in [`core`]; the most used types are re-exported here.
//!
//! ```no_run
//! use twine_pipeflow::models::pipeline::{
//!     AnyPhysics, BoundaryConditions, BoundarySetting, Config, HeatTransfer, Pipe, PipeState,
//! };
//! use twine_pipeflow::support::{
//!     constraint::StrictlyPositive,
//!     thermo::{Composition, Eos},
//! };
//! use uom::si::{
//!     f64::{Length, MassRate, Pressure, ThermodynamicTemperature, Time},
//!     length::{kilometer, meter},
//!     mass_rate::kilogram_per_second,
//!     pressure::bar,
//!     thermodynamic_temperature::degree_celsius,
//!     time::second,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pipe = Pipe::new(Length::new::<kilometer>(100.0), Length::new::<meter>(0.9), 101)?
//!     .with_roughness(Length::new::<meter>(1e-5))?;
//! let heat_transfer = HeatTransfer::steady_state(pipe.diameter())?;
//! let mut physics = AnyPhysics::new(pipe, Eos::default(), heat_transfer, Config::default())?;
//!
//! let mut state = PipeState::uniform(
//!     101,
//!     MassRate::new::<kilogram_per_second>(400.0),
//!     Pressure::new::<bar>(150.0),
//!     ThermodynamicTemperature::new::<degree_celsius>(40.0),
//!     Composition::default(),
//! )
//! .with_ambient_temperature(ThermodynamicTemperature::new::<degree_celsius>(5.0));
//! physics.initialize(&mut state)?;
//!
//! use BoundarySetting::{Inlet, Outlet};
//! let boundary = BoundaryConditions::from_state(&state, [Outlet, Inlet, Inlet])?;
//! let dt = StrictlyPositive::new(Time::new::<second>(60.0))?;
//! for _ in 0..60 {
//!     state = physics.advance(&state, &boundary, dt)?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod core;

pub use self::core::{
    Config, ConfigError, ConvergenceLoop, DerivedProperties, FrictionConfig, Formulation,
    HeatCoupling, InputError, Pipe, PipeState, SolverConfig, StepError, ToleranceKind,
    batch_tracking::{Batch, BatchTrackingError, BatchTrackingState},
    boundary::{BoundaryConditions, BoundarySetting, EndConditions, SingleCondition, Variable},
    discretizer::{Discretizer, Enthalpy, InternalEnergy},
    heat_transfer::{
        AmbientFluid, Burial, FixedQ, FixedU, HeatTransfer, HeatTransferState, Material, PipeWall,
        SteadyState, Unsteady, WallLayer,
    },
    physics::{AnyPhysics, Physics},
};
