//! COLLADA document scanning.
//!
//! Section parsers driven by a single forward pass of [`EventCursor`]:
//! geometry libraries feed mesh builders directly, the remaining libraries
//! only fill id-keyed tables for the deferred material linking.

pub mod cursor;
pub mod effects;
pub mod geometry;
pub mod input;
pub mod numbers;
pub mod source;
pub mod vertices;
pub mod visual_scene;

pub use cursor::EventCursor;
pub use geometry::{GeometryTables, PrimitiveBlock, PrimitiveKind};
pub use input::{InputBinding, InputSet, Semantic};
pub use source::{BulkArray, BulkDataStore};
pub use vertices::VertexAliases;
