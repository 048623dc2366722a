use wasm_bindgen::prelude::*;

mod ambience;
mod bodies;
mod config;
mod editor;
mod error;
mod game;
mod navigator;
mod orbit;
mod registry;
mod scripted;
mod sim;
use game::SolarSystem;

orrery_web::export_game!(SolarSystem, "solar-system");
