//! Service layer: the hierarchy index, projection engine, expansion
//! registry and the stateful [`OutlineService`] facade on top of them.

pub mod error;
pub mod expansion;
pub mod hierarchy;
pub mod outline_service;
pub mod projection;

pub use error::OutlineError;
pub use expansion::ExpansionRegistry;
pub use hierarchy::{ancestors_of, descendants_of, Hierarchy};
pub use outline_service::{Notice, OutlineService};
pub use projection::{project, Projection, VisibleHierarchy, VisibleNode};
