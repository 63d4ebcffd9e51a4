use crate::element::Element;
use crate::error::{Errors, Loaded, Result};
use crate::frame::Frame;
use crate::frame_graphs::{GraphHandle, MODEL_FRAME};
use crate::joint::Joint;
use crate::link::Link;
use crate::pose::{load_pose, Pose};
use crate::utils::{expect_tag, get_or_record, load_name, load_unique_repeated, Children, Loadable};

/// A `<model>`: links, the joints between them and explicit frames.
#[derive(Debug, Clone, Default)]
pub struct Model {
    name: String,
    is_static: bool,
    self_collide: bool,
    allow_auto_disable: bool,
    enable_wind: bool,
    canonical_link: String,
    pose: Pose,
    pose_relative_to: String,
    links: Children<Link>,
    joints: Children<Joint>,
    frames: Children<Frame>,
    graph: Option<GraphHandle>,
}

impl Loadable for Model {
    const TAG: &'static str = "model";

    fn load(elem: &Element) -> Result<Loaded<Self>> {
        expect_tag(elem, Self::TAG, "model")?;
        let mut errors = Errors::new();

        let name = load_name(elem, "model", &mut errors);
        let is_static = get_or_record(elem, "static", false, &mut errors);
        let self_collide = get_or_record(elem, "self_collide", false, &mut errors);
        let allow_auto_disable = get_or_record(elem, "allow_auto_disable", true, &mut errors);
        let enable_wind = get_or_record(elem, "enable_wind", false, &mut errors);
        let canonical_link = elem
            .attribute("canonical_link")
            .unwrap_or_default()
            .to_owned();
        let (pose, pose_relative_to) = load_pose(elem, &mut errors);

        let links = load_unique_repeated::<Link>(elem).merge_into(&mut errors);
        let joints = load_unique_repeated::<Joint>(elem).merge_into(&mut errors);
        let frames = load_unique_repeated::<Frame>(elem).merge_into(&mut errors);

        tracing::debug!(
            model = name.as_str(),
            links = links.len(),
            joints = joints.len(),
            frames = frames.len(),
            "loaded model"
        );

        Ok(Loaded::with_errors(
            Self {
                name,
                is_static,
                self_collide,
                allow_auto_disable,
                enable_wind,
                canonical_link,
                pose,
                pose_relative_to,
                links,
                joints,
                frames,
                graph: None,
            },
            errors,
        ))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Model {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn self_collide(&self) -> bool {
        self.self_collide
    }

    pub fn allow_auto_disable(&self) -> bool {
        self.allow_auto_disable
    }

    pub fn enable_wind(&self) -> bool {
        self.enable_wind
    }

    /// Link the implicit model frame is attached to: the
    /// `canonical_link` attribute, else the first link.
    pub fn canonical_link_name(&self) -> Option<&str> {
        if !self.canonical_link.is_empty() {
            return Some(&self.canonical_link);
        }
        self.links.get(0).map(Link::name)
    }

    pub fn canonical_link(&self) -> Option<&Link> {
        self.canonical_link_name()
            .and_then(|name| self.links.by_name(name))
    }

    pub fn raw_pose(&self) -> &Pose {
        &self.pose
    }

    /// Empty means the enclosing world frame.
    pub fn pose_relative_to(&self) -> &str {
        &self.pose_relative_to
    }

    pub fn links(&self) -> &Children<Link> {
        &self.links
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn link_by_index(&self, index: usize) -> Option<&Link> {
        self.links.get(index)
    }

    pub fn link_by_name(&self, name: &str) -> Option<&Link> {
        self.links.by_name(name)
    }

    pub fn link_name_exists(&self, name: &str) -> bool {
        self.links.contains(name)
    }

    pub fn joints(&self) -> &Children<Joint> {
        &self.joints
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    pub fn joint_by_index(&self, index: usize) -> Option<&Joint> {
        self.joints.get(index)
    }

    pub fn joint_by_name(&self, name: &str) -> Option<&Joint> {
        self.joints.by_name(name)
    }

    pub fn joint_name_exists(&self, name: &str) -> bool {
        self.joints.contains(name)
    }

    pub fn frames(&self) -> &Children<Frame> {
        &self.frames
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frame_by_index(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn frame_by_name(&self, name: &str) -> Option<&Frame> {
        self.frames.by_name(name)
    }

    pub fn frame_name_exists(&self, name: &str) -> bool {
        self.frames.contains(name)
    }

    /// Handle on this model's scope, once loaded through a [`crate::Root`].
    pub fn graph(&self) -> Option<&GraphHandle> {
        self.graph.as_ref()
    }

    pub(crate) fn set_graph(&mut self, graph: Option<GraphHandle>) {
        if let Some(graph) = &graph {
            for link in self.links.iter_mut() {
                link.set_graph(graph.clone());
            }
            for joint in self.joints.iter_mut() {
                joint.set_graph(graph.clone());
            }
            for frame in self.frames.iter_mut() {
                frame.set_graph(graph.clone());
            }
        }
        self.graph = graph;
    }

    /// Pose of the model frame in `relative_to`. Empty means the world
    /// frame for a model in a world, and the model frame itself otherwise.
    pub fn resolve_pose(&self, relative_to: &str) -> Result<Pose> {
        GraphHandle::require(self.graph.as_ref())?.resolve_pose(MODEL_FRAME, relative_to)
    }
}
