use crate::collision::Collision;
use crate::element::Element;
use crate::error::{Error, ErrorCode, Errors, Loaded, Result};
use crate::frame_graphs::GraphHandle;
use crate::pose::{load_pose, Pose};
use crate::spatial_inertial::Inertial;
use crate::utils::{expect_tag, load_name, load_unique_repeated, Children, Loadable};
use crate::visual::Visual;

#[derive(Debug, Clone, Default)]
pub struct Link {
    name: String,
    pose: Pose,
    pose_relative_to: String,
    visuals: Children<Visual>,
    collisions: Children<Collision>,
    inertial: Inertial,
    graph: Option<GraphHandle>,
}

impl Loadable for Link {
    const TAG: &'static str = "link";

    fn load(elem: &Element) -> Result<Loaded<Self>> {
        expect_tag(elem, Self::TAG, "link")?;
        let mut errors = Errors::new();

        let name = load_name(elem, "link", &mut errors);
        let (pose, pose_relative_to) = load_pose(elem, &mut errors);
        let visuals = load_unique_repeated::<Visual>(elem).merge_into(&mut errors);
        let collisions = load_unique_repeated::<Collision>(elem).merge_into(&mut errors);

        let mut inertial = Inertial::default();
        if let Some(inertial_elem) = elem.element("inertial") {
            let candidate = Inertial::load(&inertial_elem, &mut errors);
            if candidate.is_valid() {
                inertial = candidate;
            } else {
                tracing::warn!(link = name.as_str(), "invalid inertia, keeping default");
                errors.push(Error::new(
                    ErrorCode::LinkInertiaInvalid,
                    format!("a link named {name} has invalid inertia"),
                ));
            }
        }

        Ok(Loaded::with_errors(
            Self {
                name,
                pose,
                pose_relative_to,
                visuals,
                collisions,
                inertial,
                graph: None,
            },
            errors,
        ))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Link {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn raw_pose(&self) -> &Pose {
        &self.pose
    }

    /// Empty means the model's implicit frame.
    pub fn pose_relative_to(&self) -> &str {
        &self.pose_relative_to
    }

    pub fn inertial(&self) -> &Inertial {
        &self.inertial
    }

    pub fn visuals(&self) -> &Children<Visual> {
        &self.visuals
    }

    pub fn visual_count(&self) -> usize {
        self.visuals.len()
    }

    pub fn visual_by_index(&self, index: usize) -> Option<&Visual> {
        self.visuals.get(index)
    }

    pub fn visual_by_name(&self, name: &str) -> Option<&Visual> {
        self.visuals.by_name(name)
    }

    pub fn visual_name_exists(&self, name: &str) -> bool {
        self.visuals.contains(name)
    }

    pub fn collisions(&self) -> &Children<Collision> {
        &self.collisions
    }

    pub fn collision_count(&self) -> usize {
        self.collisions.len()
    }

    pub fn collision_by_index(&self, index: usize) -> Option<&Collision> {
        self.collisions.get(index)
    }

    pub fn collision_by_name(&self, name: &str) -> Option<&Collision> {
        self.collisions.by_name(name)
    }

    pub fn collision_name_exists(&self, name: &str) -> bool {
        self.collisions.contains(name)
    }

    /// `graph` is the handle of the enclosing model scope; visuals and
    /// collisions get the link's own scope.
    pub(crate) fn set_graph(&mut self, graph: GraphHandle) {
        let inner = graph.child(&self.name);
        for visual in self.visuals.iter_mut() {
            visual.set_graph(inner.clone());
        }
        for collision in self.collisions.iter_mut() {
            collision.set_graph(inner.clone());
        }
        self.graph = Some(graph);
    }

    pub fn resolve_pose(&self, relative_to: &str) -> Result<Pose> {
        GraphHandle::require(self.graph.as_ref())?.resolve_pose(&self.name, relative_to)
    }

    pub fn resolve_attached_to_body(&self) -> Result<String> {
        GraphHandle::require(self.graph.as_ref())?.resolve_attached_to_body(&self.name)
    }
}
