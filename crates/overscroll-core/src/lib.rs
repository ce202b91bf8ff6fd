pub mod config;
pub mod controller;
pub mod edge;
pub mod error;
pub mod gesture;
pub mod host;
pub mod presenter;
pub mod pull;
pub mod scroll;

#[cfg(test)]
mod testing;

pub use config::{AppConfig, DemoConfig, EasingType, GeneralConfig, PhysicsConfig};
pub use controller::{OverScrollController, Request, Requests, TouchDisposition};
pub use error::{Error, Result};
pub use gesture::{TouchAction, TouchEvent, TouchSample};
pub use host::{LayoutSnapshot, ListHost};
pub use presenter::{FooterEvent, FooterPresenter, HeaderEvent, HeaderPresenter};
pub use pull::PullPhase;
