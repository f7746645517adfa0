//! Pedestrian wayfinding for Wayfinder.
//!
//! This crate decides, tick by tick, where a simulated pedestrian walks next
//! through an environment made of convex rooms joined by directed doors. It
//! has no engine or scheduler of its own: callers own the agents and call
//! [`navigation::NavigationMachine::update`] once per reaction, applying the
//! returned displacement however their physics sees fit.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`cognitive`] | Per-agent landmark graph and known-destination test |
//! | [`config`] | Weighting constants, reaction rate, tolerances |
//! | [`error`] | Precondition violations (`NavError`) |
//! | [`geometry`] | Vectors, segments, convex polygons, line of sight |
//! | [`graph`] | Rooms, passages, room lookup, crossing points |
//! | [`memory`] | Volatile per-room visit counters |
//! | [`navigation`] | The per-agent state machine |
//! | [`ranking`] | Door suitability ranks via a room-boundary shortest path |
//! | [`strategy`] | Pursuing, route following, exploring and their composition |
//! | [`weighting`] | Memory × suitability × destination × impasse × congestion |

pub mod cognitive;
pub mod config;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod memory;
pub mod navigation;
pub mod ranking;
pub mod strategy;
pub mod weighting;
