// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod command;
pub mod input;
pub mod model;
pub mod state;
pub mod tracker;
pub mod update;

pub use command::*;
pub use input::*;
pub use model::*;
pub use state::*;
pub use tracker::*;
pub use update::*;
