#![warn(clippy::all)]
#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

pub mod config;
pub mod element;
pub mod errors;
pub mod geometry;
pub mod loader;
pub mod model;
pub mod report;
pub mod results;
pub mod solver;
pub mod truss;

pub use config::{MaterialDefaults, Settings, SolverSettings};
pub use element::Element;
pub use errors::{
    AnalysisError, BarPropertyError, InputError, SupportCodeError, TrussEditError,
};
pub use geometry::{displacement, force, point, Displacement, Force, Point};
pub use model::{Bar, Node, Support, DEFAULT_AREA, DEFAULT_ELASTIC_MODULUS};
pub use results::{BarResult, NodeResult, SolveResult};
pub use truss::{Assembly, Truss};
