//! Construction of the two frame graphs of a world or standalone model,
//! and the read-only handle DOM objects query them through.
//!
//! Both graphs share one vertex skeleton: every frame of the document is
//! registered once, in its scope, and the skeleton is then copied into
//! the attached-to and relative-to graphs before their edges are added.
//! Vertex and scope ids are therefore identical in the two graphs.

use std::sync::Arc;

use petgraph::graph::NodeIndex;

use crate::attached_to::FrameAttachedToGraph;
use crate::error::{Error, ErrorCode, Errors, Loaded, Result};
use crate::frame::{FrameKind, FrameVertex};
use crate::model::Model;
use crate::pose::Pose;
use crate::relative_to::PoseRelativeToGraph;
use crate::scoped_graph::{ScopeId, ScopedGraph};
use crate::world::World;

/// Implicit frame of a world scope.
pub const WORLD_FRAME: &str = "world";

/// Implicit frame of a model scope.
pub const MODEL_FRAME: &str = "__model__";

/// Where an edge of a registered frame points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Target {
    /// No outgoing edge.
    Sink,
    /// Implicit frame of the scope.
    Implicit(ScopeId),
    /// Name looked up from the scope.
    Named(ScopeId, String),
}

impl Target {
    fn named_or(scope: ScopeId, name: &str, fallback: Target) -> Target {
        if name.is_empty() {
            fallback
        } else {
            Target::Named(scope, name.to_owned())
        }
    }
}

/// One registered frame and the edges it asks for.
#[derive(Debug, Clone)]
pub(crate) struct FrameRecord {
    pub node: NodeIndex,
    pub attached_to: Target,
    pub relative_to: Target,
    pub pose: Pose,
}

/// Vertices of every frame in a document scope, without edges.
#[derive(Debug, Clone)]
pub(crate) struct Skeleton {
    pub graph: ScopedGraph<FrameVertex, ()>,
    pub records: Vec<FrameRecord>,
}

impl Skeleton {
    pub(crate) fn for_world(world: &World) -> Loaded<Self> {
        let mut skeleton = Self {
            graph: ScopedGraph::new(
                world.name(),
                WORLD_FRAME,
                FrameVertex::new(WORLD_FRAME, FrameKind::World),
            ),
            records: Vec::new(),
        };
        let mut errors = Errors::new();
        let top = skeleton.graph.root_scope();

        for model in world.models() {
            let Some(node) = skeleton.add(top, model.name(), FrameKind::Model, &mut errors) else {
                continue;
            };
            let scope = match skeleton
                .graph
                .add_scope(top, model.name(), node, Some(MODEL_FRAME))
            {
                Ok(scope) => scope,
                Err(err) => {
                    errors.push(err);
                    continue;
                }
            };
            skeleton.records.push(FrameRecord {
                node,
                attached_to: canonical_target(scope, model),
                relative_to: Target::named_or(top, model.pose_relative_to(), Target::Implicit(top)),
                pose: *model.raw_pose(),
            });
            skeleton.add_model_contents(scope, model, &mut errors);
        }

        for frame in world.frames() {
            let Some(node) = skeleton.add(top, frame.name(), FrameKind::ExplicitFrame, &mut errors)
            else {
                continue;
            };
            let attached_to = Target::named_or(top, frame.attached_to(), Target::Implicit(top));
            skeleton.records.push(FrameRecord {
                node,
                relative_to: Target::named_or(top, frame.pose_relative_to(), attached_to.clone()),
                attached_to,
                pose: *frame.raw_pose(),
            });
        }

        Loaded::with_errors(skeleton, errors)
    }

    /// A model loaded on its own: `__model__` is the root, and the
    /// model's own pose has nothing to be relative to.
    pub(crate) fn for_model(model: &Model) -> Loaded<Self> {
        let mut skeleton = Self {
            graph: ScopedGraph::new(
                model.name(),
                MODEL_FRAME,
                FrameVertex::new(MODEL_FRAME, FrameKind::Model),
            ),
            records: Vec::new(),
        };
        let mut errors = Errors::new();
        let top = skeleton.graph.root_scope();
        skeleton.records.push(FrameRecord {
            node: skeleton.graph.root(),
            attached_to: canonical_target(top, model),
            relative_to: Target::Sink,
            pose: Pose::identity(),
        });
        skeleton.add_model_contents(top, model, &mut errors);
        Loaded::with_errors(skeleton, errors)
    }

    fn add(
        &mut self,
        scope: ScopeId,
        name: &str,
        kind: FrameKind,
        errors: &mut Errors,
    ) -> Option<NodeIndex> {
        match self.graph.add_vertex(scope, name, FrameVertex::new(name, kind)) {
            Ok(node) => Some(node),
            Err(err) => {
                errors.push(err);
                None
            }
        }
    }

    fn add_model_contents(&mut self, scope: ScopeId, model: &Model, errors: &mut Errors) {
        for link in model.links() {
            let Some(node) = self.add(scope, link.name(), FrameKind::Link, errors) else {
                continue;
            };
            self.records.push(FrameRecord {
                node,
                attached_to: Target::Sink,
                relative_to: Target::named_or(
                    scope,
                    link.pose_relative_to(),
                    Target::Implicit(scope),
                ),
                pose: *link.raw_pose(),
            });

            let link_scope = match self.graph.add_scope(scope, link.name(), node, None) {
                Ok(link_scope) => link_scope,
                Err(err) => {
                    errors.push(err);
                    continue;
                }
            };
            let shapes = link
                .visuals()
                .iter()
                .map(|v| (v.name(), FrameKind::Visual, v.pose_relative_to(), v.raw_pose()))
                .chain(link.collisions().iter().map(|c| {
                    (c.name(), FrameKind::Collision, c.pose_relative_to(), c.raw_pose())
                }));
            for (name, kind, relative_to, pose) in shapes {
                let Some(node) = self.add(link_scope, name, kind, errors) else {
                    continue;
                };
                self.records.push(FrameRecord {
                    node,
                    attached_to: Target::Implicit(link_scope),
                    relative_to: Target::named_or(
                        link_scope,
                        relative_to,
                        Target::Implicit(link_scope),
                    ),
                    pose: *pose,
                });
            }
        }

        for joint in model.joints() {
            let Some(node) = self.add(scope, joint.name(), FrameKind::Joint, errors) else {
                continue;
            };
            let child = Target::named_or(scope, joint.child_link_name(), Target::Sink);
            let default_relative_to = match &child {
                Target::Sink => Target::Implicit(scope),
                named => named.clone(),
            };
            self.records.push(FrameRecord {
                node,
                relative_to: Target::named_or(scope, joint.pose_relative_to(), default_relative_to),
                attached_to: child,
                pose: *joint.raw_pose(),
            });
        }

        for frame in model.frames() {
            let Some(node) = self.add(scope, frame.name(), FrameKind::ExplicitFrame, errors) else {
                continue;
            };
            let attached_to = Target::named_or(scope, frame.attached_to(), Target::Implicit(scope));
            self.records.push(FrameRecord {
                node,
                relative_to: Target::named_or(scope, frame.pose_relative_to(), attached_to.clone()),
                attached_to,
                pose: *frame.raw_pose(),
            });
        }
    }
}

fn canonical_target(scope: ScopeId, model: &Model) -> Target {
    match model.canonical_link_name() {
        Some(name) => Target::Named(scope, name.to_owned()),
        None => Target::Sink,
    }
}

/// Resolve a target to a vertex from the skeleton's point of view.
pub(crate) fn resolve_target<E>(
    graph: &ScopedGraph<FrameVertex, E>,
    target: &Target,
) -> Option<Result<NodeIndex>> {
    match target {
        Target::Sink => None,
        Target::Implicit(scope) => Some(Ok(graph.implicit_frame(*scope))),
        Target::Named(scope, name) => Some(graph.resolve(*scope, name)),
    }
}

/// The attached-to and relative-to graphs of one world or model.
#[derive(Debug, Clone)]
pub struct FrameGraphs {
    attached_to: FrameAttachedToGraph,
    relative_to: PoseRelativeToGraph,
}

impl FrameGraphs {
    pub fn for_world(world: &World) -> Loaded<Self> {
        Self::assemble(Skeleton::for_world(world), world.name())
    }

    pub fn for_model(model: &Model) -> Loaded<Self> {
        Self::assemble(Skeleton::for_model(model), model.name())
    }

    fn assemble(skeleton: Loaded<Skeleton>, owner: &str) -> Loaded<Self> {
        let (skeleton, mut errors) = skeleton.into_parts();
        let poisoned = errors.first().map(|err| err.code);

        let mut attached_to = FrameAttachedToGraph::build(&skeleton).merge_into(&mut errors);
        let mut relative_to = PoseRelativeToGraph::build(&skeleton).merge_into(&mut errors);
        if let Some(code) = poisoned {
            attached_to.invalidate(code);
            relative_to.invalidate(code);
        }

        tracing::debug!(
            owner,
            vertices = skeleton.graph.vertex_count(),
            errors = errors.len(),
            "built frame graphs"
        );
        Loaded::with_errors(
            Self {
                attached_to,
                relative_to,
            },
            errors,
        )
    }

    pub fn attached_to(&self) -> &FrameAttachedToGraph {
        &self.attached_to
    }

    pub fn relative_to(&self) -> &PoseRelativeToGraph {
        &self.relative_to
    }
}

/// Shared read-only view of a document's frame graphs, positioned on one
/// scope. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct GraphHandle {
    graphs: Arc<FrameGraphs>,
    scope: ScopeId,
}

impl GraphHandle {
    /// Handle on the top scope.
    pub fn new(graphs: Arc<FrameGraphs>) -> Self {
        let scope = graphs.relative_to.scoped().root_scope();
        Self { graphs, scope }
    }

    /// Handle on the nested scope named `name`.
    pub fn child(&self, name: &str) -> Option<Self> {
        self.graphs
            .relative_to
            .scoped()
            .child_scope(self.scope, name)
            .map(|scope| Self {
                graphs: Arc::clone(&self.graphs),
                scope,
            })
    }

    pub fn scope_name(&self) -> &str {
        self.graphs.relative_to.scoped().scope_name(self.scope)
    }

    pub fn graphs(&self) -> &FrameGraphs {
        &self.graphs
    }

    /// Pose of `source` expressed in `destination`, both looked up from
    /// this scope. An empty destination means the graph root.
    pub fn resolve_pose(&self, source: &str, destination: &str) -> Result<Pose> {
        self.graphs
            .relative_to
            .resolve_pose(self.scope, source, destination)
    }

    /// Name of the link or world `frame` is rigidly attached to.
    pub fn resolve_attached_to_body(&self, frame: &str) -> Result<String> {
        self.graphs.attached_to.resolve_body(self.scope, frame)
    }

    pub(crate) fn require(handle: Option<&GraphHandle>) -> Result<&GraphHandle> {
        handle.ok_or_else(|| {
            Error::new(
                ErrorCode::PoseRelativeToInvalid,
                "no frame graph is attached; load through a Root to query frames",
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use roxmltree::Document;

    use super::*;
    use crate::element::Element;
    use crate::utils::Loadable;

    fn model(text: &str) -> Model {
        let doc = Document::parse(text).unwrap();
        Model::load(&Element::from(doc.root_element())).unwrap().value
    }

    #[test]
    fn skeleton_records_defaults() {
        let model = model(
            r#"<model name="m">
                <link name="base"><visual name="v"/></link>
                <link name="arm"><pose relative_to="base">0 0 1 0 0 0</pose></link>
                <joint name="j" type="fixed"><parent>base</parent><child>arm</child></joint>
                <frame name="f" attached_to="arm"/>
            </model>"#,
        );
        let (skeleton, errors) = Skeleton::for_model(&model).into_parts();
        assert!(errors.is_empty());
        // __model__, base, v, arm, j, f
        assert_eq!(skeleton.graph.vertex_count(), 6);

        let top = skeleton.graph.root_scope();
        let of = |name: &str| {
            let node = skeleton.graph.resolve(top, name).unwrap();
            skeleton.records.iter().find(|r| r.node == node).unwrap().clone()
        };
        assert_eq!(of(MODEL_FRAME).attached_to, Target::Named(top, "base".into()));
        assert_eq!(of(MODEL_FRAME).relative_to, Target::Sink);
        assert_eq!(of("base").relative_to, Target::Implicit(top));
        assert_eq!(of("arm").relative_to, Target::Named(top, "base".into()));
        assert_eq!(of("j").attached_to, Target::Named(top, "arm".into()));
        assert_eq!(of("j").relative_to, Target::Named(top, "arm".into()));
        assert_eq!(of("f").relative_to, Target::Named(top, "arm".into()));

        let link_scope = skeleton.graph.child_scope(top, "base").unwrap();
        let v = skeleton.graph.resolve(link_scope, "v").unwrap();
        let record = skeleton.records.iter().find(|r| r.node == v).unwrap();
        assert_eq!(record.attached_to, Target::Implicit(link_scope));
    }

    #[test]
    fn cross_kind_name_clash_is_reported() {
        let model = model(
            r#"<model name="m">
                <link name="same"/>
                <frame name="same"/>
            </model>"#,
        );
        let (graphs, errors) = FrameGraphs::for_model(&model).into_parts();
        assert_eq!(errors[0].code, ErrorCode::DuplicateName);
        let handle = GraphHandle::new(Arc::new(graphs));
        assert_eq!(
            handle.resolve_pose("same", "").unwrap_err().code,
            ErrorCode::DuplicateName
        );
    }

    #[test]
    fn handles_walk_into_link_scopes() {
        let model = model(
            r#"<model name="m">
                <link name="base"><collision name="c"><pose>1 0 0 0 0 0</pose></collision></link>
            </model>"#,
        );
        let (graphs, errors) = FrameGraphs::for_model(&model).into_parts();
        assert!(errors.is_empty(), "{errors:?}");
        let handle = GraphHandle::new(Arc::new(graphs));
        assert_eq!(handle.scope_name(), "m");
        let base = handle.child("base").unwrap();
        assert_eq!(base.scope_name(), "base");
        assert!(handle.child("nope").is_none());

        let pose = base.resolve_pose("c", "base").unwrap();
        assert!((pose.translation.vector.x - 1.0).abs() < 1e-12);
        assert_eq!(base.resolve_attached_to_body("c").unwrap(), "base");
        // visuals are not visible from the model scope
        assert_eq!(
            handle.resolve_pose("c", "").unwrap_err().code,
            ErrorCode::UnresolvedName
        );
    }
}
