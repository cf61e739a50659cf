//! Reference entities consumed by id: companies, projects, third parties and
//! transaction categories. Their management workflows live outside the core;
//! the models exist so the startup pull and foreign-key relations are real.

mod model;
mod repository;

pub use model::*;
pub use repository::*;
