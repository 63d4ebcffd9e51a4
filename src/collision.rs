use crate::element::Element;
use crate::error::{Errors, Loaded, Result};
use crate::frame_graphs::GraphHandle;
use crate::geometry::{load_child_geometry, Geometry};
use crate::pose::{load_pose, Pose};
use crate::utils::{expect_tag, load_name, Loadable};

#[derive(Debug, Clone, Default)]
pub struct Collision {
    name: String,
    pose: Pose,
    pose_relative_to: String,
    geometry: Geometry,
    graph: Option<GraphHandle>,
}

impl Loadable for Collision {
    const TAG: &'static str = "collision";

    fn load(elem: &Element) -> Result<Loaded<Self>> {
        expect_tag(elem, Self::TAG, "collision")?;
        let mut errors = Errors::new();

        let name = load_name(elem, "collision", &mut errors);
        let (pose, pose_relative_to) = load_pose(elem, &mut errors);
        let geometry = load_child_geometry(elem, &mut errors);

        Ok(Loaded::with_errors(
            Self {
                name,
                pose,
                pose_relative_to,
                geometry,
                graph: None,
            },
            errors,
        ))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Collision {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn raw_pose(&self) -> &Pose {
        &self.pose
    }

    pub fn pose_relative_to(&self) -> &str {
        &self.pose_relative_to
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub(crate) fn set_graph(&mut self, graph: Option<GraphHandle>) {
        self.graph = graph;
    }

    pub fn resolve_pose(&self, relative_to: &str) -> Result<Pose> {
        GraphHandle::require(self.graph.as_ref())?.resolve_pose(&self.name, relative_to)
    }

    pub fn resolve_attached_to_body(&self) -> Result<String> {
        GraphHandle::require(self.graph.as_ref())?.resolve_attached_to_body(&self.name)
    }
}
