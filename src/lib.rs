//! MiniPaint: a single-layer raster painter.
//!
//! The core (`canvas`, `components`, `ops::shapes`, `ops::render`) is UI-free
//! and driven through [`project::Project`]. `app` hosts it in an egui window
//! and `cli` replays gesture scripts headlessly.

#![allow(clippy::too_many_arguments)]

#[macro_use]
pub mod logger;
#[macro_use]
pub mod i18n;

pub mod app;
pub mod canvas;
pub mod cli;
pub mod components;
pub mod io;
pub mod ops;
pub mod project;
pub mod settings;
