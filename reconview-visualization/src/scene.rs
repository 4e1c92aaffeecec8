//! Scene graph of loaded reconstructions and their overlays

use reconview_core::{Bounds, Drawable, Point3f, PointCloud, TriangleMesh};
use reconview_gpu::DrawFlags;

pub type ModelId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Mesh,
    Wireframe,
    PointCloud,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub name: String,
    pub kind: NodeKind,
    pub visible: bool,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>, kind: NodeKind, visible: bool) -> Self {
        Self {
            name: name.into(),
            kind,
            visible,
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    fn set_kind_visible(&mut self, kind: NodeKind, visible: bool) {
        if self.kind == kind {
            self.visible = visible;
        }
        for child in &mut self.children {
            child.set_kind_visible(kind, visible);
        }
    }

    /// Depth-first walk passing each node's effective visibility
    fn visit<'a>(&'a self, parent_visible: bool, f: &mut impl FnMut(&'a SceneNode, bool)) {
        let visible = parent_visible && self.visible;
        f(self, visible);
        for child in &self.children {
            child.visit(visible, f);
        }
    }
}

/// A reconstruction, its optional source cloud and its node hierarchy
#[derive(Debug, Clone)]
pub struct Model {
    pub id: ModelId,
    pub root: SceneNode,
    pub mesh: TriangleMesh,
    pub cloud: Option<PointCloud<Point3f>>,
    pub bounds: Bounds,
}

impl Model {
    /// Which passes to run for this model
    pub fn draw_flags(&self) -> DrawFlags {
        let mut flags = DrawFlags::default();
        self.root.visit(true, &mut |node, visible| match node.kind {
            NodeKind::Mesh => flags.surface |= visible,
            NodeKind::Wireframe => flags.wireframe |= visible,
            NodeKind::PointCloud => flags.points |= visible,
        });
        flags
    }
}

#[derive(Debug)]
pub struct Scene {
    models: Vec<Model>,
    next_id: ModelId,
    show_wireframe: bool,
    show_point_cloud: bool,
}

impl Scene {
    /// Overlay defaults apply to every model added later
    pub fn new(show_wireframe: bool, show_point_cloud: bool) -> Self {
        Self {
            models: Vec::new(),
            next_id: 1,
            show_wireframe,
            show_point_cloud,
        }
    }

    pub fn models(&self) -> &[Model] {
        &self.models
    }

    pub fn model(&self, id: ModelId) -> Option<&Model> {
        self.models.iter().find(|m| m.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn clear_models(&mut self) {
        if !self.models.is_empty() {
            log::debug!("Removing {} model(s) from the scene", self.models.len());
        }
        self.models.clear();
    }

    /// Add `mesh` with a wireframe child and, when given, a point cloud child
    pub fn add_model(
        &mut self,
        name: &str,
        mesh: TriangleMesh,
        cloud: Option<PointCloud<Point3f>>,
    ) -> ModelId {
        let id = self.next_id;
        self.next_id += 1;

        let mut root = SceneNode::new(name, NodeKind::Mesh, true).with_child(SceneNode::new(
            format!("{} wireframe", name),
            NodeKind::Wireframe,
            self.show_wireframe,
        ));

        let mut bounds = mesh.bounds();
        let cloud = cloud.filter(|c| !c.is_empty());
        if let Some(cloud) = &cloud {
            bounds = bounds.merge(&cloud.bounds());
            root = root.with_child(SceneNode::new(
                format!("{} points", name),
                NodeKind::PointCloud,
                self.show_point_cloud,
            ));
        }

        self.models.push(Model {
            id,
            root,
            mesh,
            cloud,
            bounds,
        });
        id
    }

    /// Set visibility on every node of `kind`, now and for future models
    pub fn set_kind_visible(&mut self, kind: NodeKind, visible: bool) {
        match kind {
            NodeKind::Wireframe => self.show_wireframe = visible,
            NodeKind::PointCloud => self.show_point_cloud = visible,
            NodeKind::Mesh => {}
        }
        for model in &mut self.models {
            model.root.set_kind_visible(kind, visible);
        }
    }

    /// Every node with its effective visibility, in depth-first order
    pub fn visible_nodes(&self) -> Vec<(&SceneNode, bool)> {
        let mut nodes = Vec::new();
        for model in &self.models {
            model.root.visit(true, &mut |node, visible| nodes.push((node, visible)));
        }
        nodes
    }

    pub fn bounds(&self) -> Bounds {
        self.models
            .iter()
            .fold(Bounds::empty(), |acc, m| acc.merge(&m.bounds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle(offset: f32) -> TriangleMesh {
        TriangleMesh::from_vertices_and_faces(
            vec![
                Point3f::new(offset, 0.0, 0.0),
                Point3f::new(offset + 1.0, 0.0, 0.0),
                Point3f::new(offset, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        )
    }

    fn cloud() -> PointCloud<Point3f> {
        PointCloud::from_points(vec![Point3f::new(0.0, 0.0, 2.0), Point3f::new(0.5, 0.5, -1.0)])
    }

    #[test]
    fn test_hierarchy_with_cloud() {
        let mut scene = Scene::new(true, false);
        let id = scene.add_model("poisson", triangle(0.0), Some(cloud()));
        let model = scene.model(id).unwrap();

        assert_eq!(model.root.kind, NodeKind::Mesh);
        assert_eq!(model.root.name, "poisson");
        let kinds: Vec<_> = model.root.children.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![NodeKind::Wireframe, NodeKind::PointCloud]);

        assert_eq!(
            model.draw_flags(),
            DrawFlags {
                surface: true,
                wireframe: true,
                points: false
            }
        );
    }

    #[test]
    fn test_empty_cloud_has_no_node() {
        let mut scene = Scene::new(true, true);
        let id = scene.add_model("m", triangle(0.0), Some(PointCloud::new()));
        let model = scene.model(id).unwrap();
        assert!(model.cloud.is_none());
        assert_eq!(model.root.children.len(), 1);
        assert!(!model.draw_flags().points);
    }

    #[test]
    fn test_toggle_by_kind() {
        let mut scene = Scene::new(true, false);
        let id = scene.add_model("m", triangle(0.0), Some(cloud()));

        scene.set_kind_visible(NodeKind::Wireframe, false);
        scene.set_kind_visible(NodeKind::PointCloud, true);
        let flags = scene.model(id).unwrap().draw_flags();
        assert!(flags.surface);
        assert!(!flags.wireframe);
        assert!(flags.points);
    }

    #[test]
    fn test_hidden_parent_hides_children() {
        let mut scene = Scene::new(true, true);
        scene.add_model("m", triangle(0.0), Some(cloud()));
        scene.set_kind_visible(NodeKind::Mesh, false);

        let nodes = scene.visible_nodes();
        assert_eq!(nodes.len(), 3);
        // Children keep their own flag but are not effectively visible
        assert!(nodes.iter().all(|(_, visible)| !visible));
        assert!(nodes[1].0.visible);
        assert!(!scene.models()[0].draw_flags().any());
    }

    #[test]
    fn test_new_models_inherit_overlay_state() {
        let mut scene = Scene::new(true, false);
        scene.set_kind_visible(NodeKind::Wireframe, false);
        scene.set_kind_visible(NodeKind::PointCloud, true);
        scene.clear_models();
        assert!(scene.is_empty());

        let id = scene.add_model("next", triangle(0.0), Some(cloud()));
        let flags = scene.model(id).unwrap().draw_flags();
        assert!(!flags.wireframe);
        assert!(flags.points);
    }

    #[test]
    fn test_bounds_include_cloud_and_all_models() {
        let mut scene = Scene::new(true, false);
        assert!(!scene.bounds().is_valid());

        scene.add_model("a", triangle(0.0), Some(cloud()));
        scene.add_model("b", triangle(5.0), None);
        let bounds = scene.bounds();
        assert_eq!(bounds.min, Point3f::new(0.0, 0.0, -1.0));
        assert_eq!(bounds.max, Point3f::new(6.0, 1.0, 2.0));
    }

    #[test]
    fn test_ids_are_unique_after_clear() {
        let mut scene = Scene::new(true, false);
        let a = scene.add_model("a", triangle(0.0), None);
        scene.clear_models();
        let b = scene.add_model("b", triangle(0.0), None);
        assert_ne!(a, b);
        assert!(scene.model(a).is_none());
    }
}
