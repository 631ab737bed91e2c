//! candido-server — delivery order and billing backend
//!
//! REST API for an aggregates delivery business: clients, vehicles,
//! materials, delivery orders and billing closures, with JWT-authenticated
//! users. The order/closure engine keeps every closure's stored total
//! consistent with its member orders inside database transactions.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod pricing;
pub mod state;
pub mod util;
