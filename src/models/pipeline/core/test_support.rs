use std::f64::consts::PI;

use uom::si::{
    f64::{Length, MassRate, Pressure, ThermodynamicTemperature, Time},
    length::meter,
    mass_rate::kilogram_per_second,
    pressure::pascal,
    thermodynamic_temperature::kelvin,
    time::second,
};

use crate::support::{
    constraint::{Constrained, StrictlyPositive},
    thermo::{Composition, Eos},
};

use super::{
    FrictionConfig, Pipe, PipeState,
    boundary::{BoundaryConditions, EndConditions, SingleCondition},
    discretizer::Element,
};

/// A horizontal pipe with 10 µm roughness.
pub(crate) fn test_pipe(length: f64, diameter: f64, grid_points: usize) -> Pipe {
    Pipe::new(
        Length::new::<meter>(length),
        Length::new::<meter>(diameter),
        grid_points,
    )
    .and_then(|pipe| pipe.with_roughness(Length::new::<meter>(1e-5)))
    .expect("test pipe should be valid")
}

/// Uniform state of the default gas, without derived properties.
pub(crate) fn uniform_state(
    grid_points: usize,
    flow: f64,
    pressure: f64,
    temperature: f64,
) -> PipeState {
    PipeState::uniform(
        grid_points,
        MassRate::new::<kilogram_per_second>(flow),
        Pressure::new::<pascal>(pressure),
        ThermodynamicTemperature::new::<kelvin>(temperature),
        Composition::default(),
    )
}

/// Uniform state with derived properties.
pub(crate) fn initialized_state(
    pipe: &Pipe,
    eos: &Eos,
    flow: f64,
    pressure: f64,
    temperature: f64,
) -> PipeState {
    let mut state = uniform_state(pipe.len(), flow, pressure, temperature);
    state
        .update_derived(pipe, eos, &FrictionConfig::default())
        .expect("test state should evaluate");
    state
}

/// Inlet pressure and temperature with outlet flow, taken from `state`
/// except for the inlet temperature.
pub(crate) fn transit_boundary(state: &PipeState, inlet_temperature: f64) -> BoundaryConditions {
    let last = state.len() - 1;
    let mut inlet = EndConditions::new(state.composition[0]);
    inlet.pressure = SingleCondition::active(state.pressure[0]);
    inlet.temperature = SingleCondition::active(inlet_temperature);

    let mut outlet = EndConditions::new(state.composition[last]);
    outlet.flow = SingleCondition::active(state.flow[last]);

    BoundaryConditions::new(inlet, outlet)
}

pub(crate) fn step(seconds: f64) -> Constrained<Time, StrictlyPositive> {
    StrictlyPositive::new(Time::new::<second>(seconds)).expect("time step should be positive")
}

/// A flat 100 m element of an ideal gas at 50 bar and 290 K, flowing at
/// 20 kg/s through a 0.5 m bore, unchanged since the previous step.
pub(crate) fn element() -> Element {
    let gas_constant = 470.0;
    let pressure = 50e5;
    let temperature = 290.0;
    let flow = 20.0;
    Element {
        dt: 5.0,
        dx: 100.0,
        dh: 0.0,
        diameter: 0.5,
        area: PI * 0.25 * 0.25,
        gas_constant,

        flow,
        pressure,
        temperature,
        friction: 0.01,
        cp: 2200.0,
        cv: 2200.0 - gas_constant,
        heat_flux: 0.0,
        density: pressure / (gas_constant * temperature),
        z: 1.0,
        dz_dt_p: 0.0,
        dz_dp_t: 0.0,
        dz_dt_rho: 0.0,

        previous_flow_sum: 2.0 * flow,
        previous_pressure_sum: 2.0 * pressure,
        previous_temperature_sum: 2.0 * temperature,
    }
}
