//! Multimodal trip planner server.
//!
//! A web service that answers: "how do I best get from here to there, on
//! foot and by transit, by car, by bicycle, or by parking and continuing by
//! transit?"

pub mod cache;
pub mod config;
pub mod domain;
pub mod engine;
pub mod gtfs;
pub mod output;
pub mod parking;
pub mod planner;
pub mod web;
