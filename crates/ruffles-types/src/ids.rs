//! Stable handles for mesh and topology entities.
//!
//! Handles are generational slot-map keys: inserting never invalidates an
//! existing handle, removing invalidates exactly the removed one.

use slotmap::new_key_type;

new_key_type! {
    /// Handle of a vertex in a simulation mesh.
    pub struct VertexId;

    /// Handle of a segment in a simulation mesh.
    pub struct SegmentId;

    /// Handle of a connection point in a ruffle.
    pub struct ConnectionPointId;

    /// Handle of a section in a ruffle.
    pub struct SectionId;
}
