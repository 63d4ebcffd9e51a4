use crate::element::Element;
use crate::error::{Errors, Loaded, Result};
use crate::frame_graphs::GraphHandle;
use crate::geometry::{load_child_geometry, Geometry};
use crate::pose::{load_pose, Pose};
use crate::utils::{expect_tag, get_or_record, load_name, Loadable};

#[derive(Debug, Clone, Default)]
pub struct Visual {
    name: String,
    pose: Pose,
    pose_relative_to: String,
    geometry: Geometry,
    cast_shadows: bool,
    transparency: f64,
    graph: Option<GraphHandle>,
}

impl Loadable for Visual {
    const TAG: &'static str = "visual";

    fn load(elem: &Element) -> Result<Loaded<Self>> {
        expect_tag(elem, Self::TAG, "visual")?;
        let mut errors = Errors::new();

        let name = load_name(elem, "visual", &mut errors);
        let (pose, pose_relative_to) = load_pose(elem, &mut errors);
        let geometry = load_child_geometry(elem, &mut errors);
        let cast_shadows = get_or_record(elem, "cast_shadows", true, &mut errors);
        let transparency = get_or_record(elem, "transparency", 0.0, &mut errors);

        Ok(Loaded::with_errors(
            Self {
                name,
                pose,
                pose_relative_to,
                geometry,
                cast_shadows,
                transparency,
                graph: None,
            },
            errors,
        ))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Visual {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn raw_pose(&self) -> &Pose {
        &self.pose
    }

    /// Empty means the owning link.
    pub fn pose_relative_to(&self) -> &str {
        &self.pose_relative_to
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn cast_shadows(&self) -> bool {
        self.cast_shadows
    }

    pub fn transparency(&self) -> f64 {
        self.transparency
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
