//! Carpool API: JSON HTTP service whose protected routes sit behind an
//! authentication gateway that verifies externally issued JWTs and resolves
//! them to local users.
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod repos;
pub mod services;
pub mod state;
