//! Scene model and per-frame traversal for the **lumen** viewer.
//!
//! This crate is GPU-free: it loads s72 scenes, flattens their meshes into one
//! vertex array, and turns the scene graph plus a camera into an ordered list
//! of draw instances. The engine crate uploads and draws what this produces.
//!
//! # Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`model`] | `Scene` arenas, dense ids, `Node`, `Mesh`, `Camera`, ... |
//! | [`loader`] | s72 JSON loading (`load_file`, `load_str`) |
//! | [`source`] | `DataSource` for referenced binaries |
//! | [`attributes`] | strided attribute and index decoding |
//! | [`flatten`] | `PosNorTexVertex`, `VertexSpan`, `flatten` |
//! | [`bounds`] | `Aabb` |
//! | [`camera`] | projections, `OrbitCamera`, `CameraMode` |
//! | [`traversal`] | `WorldWalk`, `Visibility`, `DrawInstance` |
//! | [`textures`] | `TexturePlan` and procedural textures |
//! | [`lines`] | wireframe vertices |
//! | [`state`] | `RenderState` |

pub mod attributes;
pub mod bounds;
pub mod camera;
pub mod error;
pub mod flatten;
pub mod lines;
pub mod loader;
pub mod model;
pub mod source;
pub mod state;
pub mod textures;
pub mod traversal;

pub use bounds::Aabb;
pub use camera::{CameraMode, OrbitCamera};
pub use error::SceneError;
pub use flatten::{FlatMeshes, PosNorTexVertex, VertexSpan};
pub use lines::PosColVertex;
pub use loader::{load_file, load_str};
pub use model::Scene;
pub use state::{FrameView, RenderState, StateOptions, WorldUniform};
pub use textures::{TextureImage, TexturePlan};
pub use traversal::{CullMode, DrawInstance, ObjectTransform, Visibility};
