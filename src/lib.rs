//! Capacity and load-distribution planning for data-center commissioning.
//!
//! A topology of lineups, PDUs, and subfeed breakers is built from a
//! [`config::PlanConfig`]. [`plan::distribute`] spreads a target load over
//! it, [`plan::overload_check`] reports exceeded ceilings, and
//! [`session::Planner`] ties the two together for an interactive session.

#[cfg(feature = "api")]
pub mod api;
pub mod capacity;
pub mod config;
pub mod error;
pub mod io;
pub mod logging;
pub mod plan;
/// Planning session controller.
pub mod session;
pub mod store;
pub mod topology;
