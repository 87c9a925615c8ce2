pub mod app;
pub mod config;
pub mod entry;
pub mod icons;
pub mod io;
pub mod nav;
pub mod state;
pub mod surface;
pub mod trace;
