//! Frame workspaces.
//!
//! A fixed ring of slots, each owning the staging/resident buffer pairs and
//! bind groups one in-flight frame writes. The CPU only touches a slot after
//! the GPU work last submitted on it has completed.

mod fence;
mod pair;
mod ring;
mod workspace;

pub use fence::SubmissionFence;
pub use pair::{PAGE_SIZE, PairAllocator, StagedPair, page_rounded};
pub use ring::{SlotFence, WorkspaceRing};
pub use workspace::{CAMERA_UNIFORM_SIZE, Workspace, WorkspaceLayouts};
