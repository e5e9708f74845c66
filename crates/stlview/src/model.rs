//! A loaded, titled model and the caller-owned slot that caches it.

use stlview_mesh::Mesh;

/// A parsed mesh together with its display title.
#[derive(Debug, Clone)]
pub struct Model {
    title: String,
    mesh: Mesh,
}

impl Model {
    /// Wrap a mesh with a title.
    pub fn new(title: impl Into<String>, mesh: Mesh) -> Self {
        Self {
            title: title.into(),
            mesh,
        }
    }

    /// Display title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The mesh.
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// The mesh, for the in-place transforms.
    pub fn mesh_mut(&mut self) -> &mut Mesh {
        &mut self.mesh
    }

    /// Prepare for display: fit into a cube of side `bound_size`.
    ///
    /// Returns the floor offset the ground plane should be placed at.
    pub fn setup(&mut self, bound_size: f32) -> f32 {
        self.mesh.init_model_matrix(bound_size);
        self.mesh.floor_offset()
    }
}

/// Holds the most recently loaded model so it survives view rebuilds.
///
/// The slot has a single owner and is overwritten on every load.
#[derive(Debug, Default)]
pub struct ModelSlot {
    current: Option<Model>,
}

impl ModelSlot {
    /// An empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `model`, returning the one it displaces.
    pub fn replace(&mut self, model: Model) -> Option<Model> {
        self.current.replace(model)
    }

    /// The cached model, if any.
    pub fn get(&self) -> Option<&Model> {
        self.current.as_ref()
    }

    /// The cached model, mutably.
    pub fn get_mut(&mut self) -> Option<&mut Model> {
        self.current.as_mut()
    }

    /// Remove and return the cached model.
    pub fn take(&mut self) -> Option<Model> {
        self.current.take()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }
}
