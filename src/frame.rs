use crate::element::Element;
use crate::error::{Errors, Loaded, Result};
use crate::frame_graphs::GraphHandle;
use crate::pose::{load_pose, Pose};
use crate::utils::{expect_tag, load_name, Loadable};

/// What a frame graph vertex stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    World,
    Model,
    Link,
    Joint,
    Visual,
    Collision,
    ExplicitFrame,
}

impl FrameKind {
    /// Kinds an attached-to chain may end on.
    pub fn is_body(self) -> bool {
        matches!(self, FrameKind::Link | FrameKind::World)
    }
}

/// Vertex payload shared by both frame graphs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameVertex {
    pub name: String,
    pub kind: FrameKind,
}

impl FrameVertex {
    pub fn new(name: &str, kind: FrameKind) -> Self {
        Self {
            name: name.to_owned(),
            kind,
        }
    }
}

/// An explicit `<frame>` element.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    name: String,
    attached_to: String,
    pose: Pose,
    pose_relative_to: String,
    graph: Option<GraphHandle>,
}

impl Loadable for Frame {
    const TAG: &'static str = "frame";

    fn load(elem: &Element) -> Result<Loaded<Self>> {
        expect_tag(elem, Self::TAG, "frame")?;
        let mut errors = Errors::new();

        let name = load_name(elem, "frame", &mut errors);
        let attached_to = elem.attribute("attached_to").unwrap_or_default().to_owned();
        let (pose, pose_relative_to) = load_pose(elem, &mut errors);

        Ok(Loaded::with_errors(
            Self {
                name,
                attached_to,
                pose,
                pose_relative_to,
                graph: None,
            },
            errors,
        ))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Frame {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Frame this one is rigidly attached to; empty means the enclosing
    /// scope's implicit frame.
    pub fn attached_to(&self) -> &str {
        &self.attached_to
    }

    pub fn raw_pose(&self) -> &Pose {
        &self.pose
    }

    /// Frame the raw pose is expressed in; empty means `attached_to`,
    /// then the implicit frame.
    pub fn pose_relative_to(&self) -> &str {
        &self.pose_relative_to
    }

    pub(crate) fn set_graph(&mut self, graph: GraphHandle) {
        self.graph = Some(graph);
    }

    /// Pose of this frame in `relative_to`; empty resolves to the graph root.
    pub fn resolve_pose(&self, relative_to: &str) -> Result<Pose> {
        GraphHandle::require(self.graph.as_ref())?.resolve_pose(&self.name, relative_to)
    }

    /// Name of the link (or world) this frame moves with.
    pub fn resolve_attached_to_body(&self) -> Result<String> {
        GraphHandle::require(self.graph.as_ref())?.resolve_attached_to_body(&self.name)
    }
}
