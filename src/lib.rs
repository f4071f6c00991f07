pub mod accuracy;
pub mod archive;
pub mod config;
pub mod error;
pub mod fetch;
pub mod live_game;
pub mod model;
pub mod predictor;
pub mod recorder;
pub mod service;
pub mod stats;
pub mod tournament;
