//! Arena scene graph and the startup scene.
//!
//! Every node is owned by the [`Scene`] for the life of the process and
//! addressed by [`NodeId`]. Parents list their children; world transforms are
//! composed on demand by walking up the parent chain.

use glam::{Mat4, Quat, Vec3};

use crate::camera::PerspectiveCamera;
use crate::helper::BvhHelper;
use crate::lasso::LassoOverlay;
use crate::mesh::{Geometry, Mesh, StandardMaterial};

pub const CLEAR_COLOR: u32 = 0x263238;
pub const AMBIENT_COLOR: u32 = 0xb0bec5;
pub const SHADOW_MAP_SIZE: u32 = 2048;

/// `0xRRGGBB` to sRGB channels in [0, 1]; the renderer linearizes them
pub fn hex_to_rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::default()
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub color: [f32; 3],
    pub intensity: f32,
    pub cast_shadow: bool,
    pub shadow_map_size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: [f32; 3],
    pub intensity: f32,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Root,
    Group,
    Camera(PerspectiveCamera),
    DirectionalLight(DirectionalLight),
    AmbientLight(AmbientLight),
    Mesh(Box<Mesh>),
    BvhHelper(BvhHelper),
    Lasso(LassoOverlay),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    pub transform: Transform,
    pub visible: bool,
    pub frustum_culled: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Transform relative to the parent
    ///
    /// Cameras are placed by their own position/target and the lasso by its
    /// depth/scale, not by `transform`.
    pub fn local_matrix(&self) -> Mat4 {
        match &self.kind {
            NodeKind::Camera(camera) => camera.world_matrix(),
            NodeKind::Lasso(lasso) => lasso.local_matrix(),
            _ => self.transform.matrix(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Scene {
    nodes: Vec<Node>,
    pub background: [f32; 3],
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                name: "root".to_string(),
                kind: NodeKind::Root,
                transform: Transform::default(),
                visible: true,
                frustum_culled: false,
                parent: None,
                children: Vec::new(),
            }],
            background: hex_to_rgb(CLEAR_COLOR),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn add(&mut self, parent: NodeId, name: &str, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name: name.to_string(),
            kind,
            transform: Transform::default(),
            visible: true,
            frustum_culled: true,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let node = self.node(id);
        match node.parent {
            Some(parent) => self.world_matrix(parent) * node.local_matrix(),
            None => node.local_matrix(),
        }
    }

    /// Visible only if every ancestor is
    pub fn is_visible(&self, id: NodeId) -> bool {
        let node = self.node(id);
        node.visible && node.parent.map_or(true, |parent| self.is_visible(parent))
    }

    pub fn camera(&self, id: NodeId) -> Option<&PerspectiveCamera> {
        match &self.node(id).kind {
            NodeKind::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    pub fn camera_mut(&mut self, id: NodeId) -> Option<&mut PerspectiveCamera> {
        match &mut self.node_mut(id).kind {
            NodeKind::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    pub fn mesh(&self, id: NodeId) -> Option<&Mesh> {
        match &self.node(id).kind {
            NodeKind::Mesh(mesh) => Some(&**mesh),
            _ => None,
        }
    }

    pub fn mesh_mut(&mut self, id: NodeId) -> Option<&mut Mesh> {
        match &mut self.node_mut(id).kind {
            NodeKind::Mesh(mesh) => Some(&mut **mesh),
            _ => None,
        }
    }

    pub fn helper(&self, id: NodeId) -> Option<&BvhHelper> {
        match &self.node(id).kind {
            NodeKind::BvhHelper(helper) => Some(helper),
            _ => None,
        }
    }

    pub fn lasso(&self, id: NodeId) -> Option<&LassoOverlay> {
        match &self.node(id).kind {
            NodeKind::Lasso(lasso) => Some(lasso),
            _ => None,
        }
    }

    pub fn lasso_mut(&mut self, id: NodeId) -> Option<&mut LassoOverlay> {
        match &mut self.node_mut(id).kind {
            NodeKind::Lasso(lasso) => Some(lasso),
            _ => None,
        }
    }

    pub fn directional_lights(&self) -> impl Iterator<Item = (NodeId, &DirectionalLight)> {
        self.iter().filter_map(|(id, node)| match &node.kind {
            NodeKind::DirectionalLight(light) => Some((id, light)),
            _ => None,
        })
    }

    pub fn ambient_light(&self) -> Option<&AmbientLight> {
        self.nodes.iter().find_map(|node| match &node.kind {
            NodeKind::AmbientLight(light) => Some(light),
            _ => None,
        })
    }

    /// Apply the helper depth, rebuilding its lines from the mesh's tree only
    /// when the depth changed
    pub fn set_helper_depth(&mut self, helper: NodeId, mesh: NodeId, depth: usize) -> bool {
        if self.helper(helper).map_or(true, |h| h.depth() == depth) {
            return false;
        }
        let Some(tree) = self.mesh(mesh).and_then(|m| m.bounds_tree()).cloned() else {
            return false;
        };
        match &mut self.node_mut(helper).kind {
            NodeKind::BvhHelper(h) => h.set_depth(&tree, depth),
            _ => false,
        }
    }
}

/// Which of the two viewers to build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Mesh, lights and orbit camera only
    Viewer,
    /// Viewer plus bounds tree, helper and lasso selection
    Selection,
}

/// Ids of the nodes the viewer touches every frame
#[derive(Debug, Clone, Copy)]
pub struct SceneHandles {
    pub camera: NodeId,
    pub sun: NodeId,
    pub ambient: NodeId,
    pub group: NodeId,
    pub mesh: NodeId,
    pub helper: Option<NodeId>,
    pub lasso: Option<NodeId>,
}

/// Build the startup scene around `geometry`
pub fn bootstrap(
    geometry: Geometry,
    variant: Variant,
    aspect: f32,
    far: f32,
    helper_depth: usize,
) -> (Scene, SceneHandles) {
    let mut scene = Scene::new();
    let root = scene.root();

    let sun = scene.add(
        root,
        "directional light",
        NodeKind::DirectionalLight(DirectionalLight {
            color: [1.0, 1.0, 1.0],
            intensity: 1.0,
            cast_shadow: true,
            shadow_map_size: SHADOW_MAP_SIZE,
        }),
    );
    scene.node_mut(sun).transform = Transform::from_translation(Vec3::new(10.0, 10.0, 10.0));

    let ambient = scene.add(
        root,
        "ambient light",
        NodeKind::AmbientLight(AmbientLight {
            color: hex_to_rgb(AMBIENT_COLOR),
            intensity: 0.8,
        }),
    );

    let camera = scene.add(
        root,
        "camera",
        NodeKind::Camera(PerspectiveCamera::new(aspect).with_far(far)),
    );

    let group = scene.add(root, "group", NodeKind::Group);

    let mut mesh = Mesh::new(
        geometry,
        StandardMaterial::default().with_polygon_offset(1.0, 0.0),
    );

    let (mut helper, mut lasso) = (None, None);
    if variant == Variant::Selection {
        let tree = mesh.compute_bounds_tree();
        let stats = tree.stats();
        log::info!(
            "Bounds tree: {} nodes, {} leaves, depth {}, {:.2} triangles/leaf",
            stats.num_nodes,
            stats.num_leaves,
            stats.max_depth,
            stats.avg_leaf_size
        );
        let helper_node = BvhHelper::new(tree, helper_depth);
        mesh.cast_shadow = true;
        mesh.receive_shadow = true;

        helper = Some(helper_node);
    }

    log::info!("Mesh: {} triangles", mesh.geometry().triangle_count());
    let mesh = scene.add(group, "mesh", NodeKind::Mesh(Box::new(mesh)));

    let helper = helper.map(|h| {
        let id = scene.add(group, "bvh helper", NodeKind::BvhHelper(h));
        scene.node_mut(id).visible = false;
        id
    });

    if variant == Variant::Selection {
        let id = scene.add(camera, "lasso", NodeKind::Lasso(LassoOverlay::new()));
        scene.node_mut(id).visible = false;
        lasso = Some(id);
    }

    let handles = SceneHandles {
        camera,
        sun,
        ambient,
        group,
        mesh,
        helper,
        lasso,
    };
    (scene, handles)
}
