#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod app;
pub mod config;
pub mod feed;
pub mod model;
pub mod observability;
pub mod profile;
pub mod ranking;
pub mod recommend;
pub mod text;
