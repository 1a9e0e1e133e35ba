pub mod config;
pub mod energy;
pub mod ensemble;
pub mod estimators;
pub mod io;
pub mod metropolis;
pub mod run;
pub mod state;

pub use config::{Config, Mode, Parameters};
pub use estimators::Estimators;
pub use metropolis::{Metropolis, SweepStatistics};
pub use run::{run, simulation, Phase, SimulationData, SimulationOutput, SweepObserver};
pub use state::{HeisenbergState, IsingState, SpinModel};
