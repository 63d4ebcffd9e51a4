//! Pose relative-to graph and pose resolution.
//!
//! Every `child relative_to parent` relation is stored twice: a forward
//! edge `child -> parent` and a reverse edge `parent -> child`. Both
//! carry the child's pose in the parent frame. Walking a forward edge
//! applies the pose as stored, walking a reverse edge applies its
//! inverse, so a path search over the whole graph can move in either
//! direction. Validation only looks at forward edges.

use crate::error::{Error, ErrorCode, Errors, Loaded, Result};
use crate::frame::FrameVertex;
use crate::frame_graphs::{resolve_target, Skeleton, Target};
use crate::pose::Pose;
use crate::scoped_graph::{ScopeId, ScopedGraph};
use crate::search::{find_cycle, shortest_path, walk_to_sink, SinkWalk};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// child -> parent, apply the pose as stored
    Forward,
    /// parent -> child, apply the inverse
    Reverse,
}

impl Direction {
    pub fn sign(self) -> i8 {
        match self {
            Direction::Forward => 1,
            Direction::Reverse => -1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PoseEdge {
    /// Pose of the child frame in the parent frame.
    pub pose: Pose,
    pub direction: Direction,
}

impl PoseEdge {
    fn is_forward(&self) -> bool {
        self.direction == Direction::Forward
    }

    /// Transform of the edge's source expressed in its target.
    fn transform(&self) -> Pose {
        match self.direction {
            Direction::Forward => self.pose,
            Direction::Reverse => self.pose.inverse(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PoseRelativeToGraph {
    graph: ScopedGraph<FrameVertex, PoseEdge>,
    invalid: Option<ErrorCode>,
}

impl PoseRelativeToGraph {
    pub(crate) fn build(skeleton: &Skeleton) -> Loaded<Self> {
        let mut graph = skeleton.graph.without_edges::<PoseEdge>();
        let mut errors = Errors::new();

        for record in &skeleton.records {
            match resolve_target(&graph, &record.relative_to) {
                None => {}
                Some(Ok(parent)) => {
                    graph.add_edge(
                        record.node,
                        parent,
                        PoseEdge {
                            pose: record.pose,
                            direction: Direction::Forward,
                        },
                    );
                    graph.add_edge(
                        parent,
                        record.node,
                        PoseEdge {
                            pose: record.pose,
                            direction: Direction::Reverse,
                        },
                    );
                }
                Some(Err(_)) => {
                    let name = match &record.relative_to {
                        Target::Named(_, name) => name.as_str(),
                        _ => "",
                    };
                    errors.push(Error::new(
                        ErrorCode::UnresolvedName,
                        format!(
                            "relative_to name[{name}] specified by {:?}[{}] does not match a frame in scope",
                            graph.vertex(record.node).kind,
                            graph.vertex(record.node).name
                        ),
                    ));
                }
            }
        }

        let mut this = Self {
            graph,
            invalid: None,
        };
        let validation = this.validate();
        this.invalid = errors.first().or(validation.first()).map(|err| err.code);
        errors.extend(validation);
        Loaded::with_errors(this, errors)
    }

    /// Check acyclicity, then that every frame reaches the root frame.
    pub fn validate(&self) -> Errors {
        let graph = self.graph.graph();

        if let Some(cycle) = find_cycle(graph, PoseEdge::is_forward) {
            let names: Vec<&str> = cycle
                .iter()
                .map(|&n| self.graph.vertex(n).name.as_str())
                .collect();
            return vec![Error::new(
                ErrorCode::PoseRelativeToCycle,
                format!("relative_to graph contains a cycle: {}", names.join(" -> ")),
            )];
        }

        let root = self.graph.root();
        let mut errors = Errors::new();
        for node in graph.node_indices() {
            let vertex = self.graph.vertex(node);
            let problem = match walk_to_sink(graph, node, PoseEdge::is_forward) {
                SinkWalk::Sink(sink) if sink == root => continue,
                SinkWalk::Sink(sink) => format!(
                    "relative_to chain ends at frame[{}] instead of [{}]",
                    self.graph.vertex(sink).name,
                    self.graph.vertex(root).name
                ),
                SinkWalk::Branch(at) => format!(
                    "frame[{}] is relative to more than one frame",
                    self.graph.vertex(at).name
                ),
                SinkWalk::Unterminated => "relative_to chain does not terminate".to_owned(),
            };
            errors.push(Error::new(
                ErrorCode::PoseRelativeToInvalid,
                format!("{:?}[{}]: {problem}", vertex.kind, vertex.name),
            ));
        }
        errors
    }

    /// Pose of `source` expressed in `destination`, both names resolved
    /// from `scope`. An empty destination is the graph root.
    ///
    /// The unit-weight shortest path runs from source to destination; it
    /// is walked from the destination end back towards the source,
    /// right-multiplying each edge transform onto the accumulator.
    pub fn resolve_pose(&self, scope: ScopeId, source: &str, destination: &str) -> Result<Pose> {
        if let Some(code) = self.invalid {
            return Err(Error::new(
                code,
                format!("relative_to graph failed validation; cannot resolve frame[{source}]"),
            ));
        }
        let from = self.graph.resolve(scope, source)?;
        let to = if destination.is_empty() {
            self.graph.root()
        } else {
            self.graph.resolve(scope, destination)?
        };

        let graph = self.graph.graph();
        let no_path = || {
            Error::new(
                ErrorCode::NoPath,
                format!("no relative_to path from frame[{source}] to frame[{destination}]"),
            )
        };
        let path = shortest_path(graph, from, to).ok_or_else(no_path)?;

        let mut pose = Pose::identity();
        for step in path.windows(2).rev() {
            let edge = graph.find_edge(step[0], step[1]).ok_or_else(no_path)?;
            pose *= graph[edge].transform();
        }
        Ok(pose)
    }

    pub fn is_valid(&self) -> bool {
        self.invalid.is_none()
    }

    pub(crate) fn invalidate(&mut self, code: ErrorCode) {
        self.invalid.get_or_insert(code);
    }

    pub fn scoped(&self) -> &ScopedGraph<FrameVertex, PoseEdge> {
        &self.graph
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::{Point3, Vector3};
    use roxmltree::Document;

    use super::*;
    use crate::element::Element;
    use crate::model::Model;
    use crate::utils::Loadable;
    use crate::world::World;

    fn model_graph(text: &str) -> (PoseRelativeToGraph, Errors) {
        let doc = Document::parse(text).unwrap();
        let model = Model::load(&Element::from(doc.root_element())).unwrap().value;
        PoseRelativeToGraph::build(&Skeleton::for_model(&model).value).into_parts()
    }

    fn close(a: &Pose, b: &Pose) -> bool {
        (a.to_homogeneous() - b.to_homogeneous()).abs().max() < 1e-9
    }

    const CHAIN: &str = r#"<model name="m">
        <link name="base"><pose>1 0 0 0 0 0</pose></link>
        <link name="arm"><pose relative_to="base">0 2 0 0 0 1.5707963267948966</pose></link>
        <frame name="tip" attached_to="arm"><pose>0 0 3 0 0 0</pose></frame>
        <frame name="side"><pose relative_to="base">0 0 0 0.3 0.2 0.1</pose></frame>
    </model>"#;

    #[test]
    fn chain_composes() {
        let (graph, errors) = model_graph(CHAIN);
        assert!(errors.is_empty(), "{errors:?}");
        let top = graph.scoped().root_scope();

        let arm = graph.resolve_pose(top, "arm", "").unwrap();
        assert!((arm.translation.vector - Vector3::new(1.0, 2.0, 0.0)).norm() < 1e-12);

        // tip defaults to being relative to its attached_to frame
        let tip = graph.resolve_pose(top, "tip", "__model__").unwrap();
        assert!((tip.translation.vector - Vector3::new(1.0, 2.0, 3.0)).norm() < 1e-12);

        // arm is yawed a quarter turn, so its x axis is base's y axis
        let base_from_arm = graph.resolve_pose(top, "arm", "base").unwrap();
        let p = base_from_arm * Point3::new(1.0, 0.0, 0.0);
        assert!((p.coords - Vector3::new(0.0, 3.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn reverse_direction_is_inverse() {
        let (graph, _) = model_graph(CHAIN);
        let top = graph.scoped().root_scope();
        let forward = graph.resolve_pose(top, "tip", "side").unwrap();
        let backward = graph.resolve_pose(top, "side", "tip").unwrap();
        assert!(close(&(forward * backward), &Pose::identity()));
    }

    #[test]
    fn identity_for_every_frame() {
        let (graph, _) = model_graph(CHAIN);
        let top = graph.scoped().root_scope();
        for name in ["__model__", "base", "arm", "tip", "side"] {
            let pose = graph.resolve_pose(top, name, name).unwrap();
            assert!(close(&pose, &Pose::identity()), "{name}");
        }
    }

    #[test]
    fn transitivity() {
        let (graph, _) = model_graph(CHAIN);
        let top = graph.scoped().root_scope();
        let names = ["__model__", "base", "arm", "tip", "side"];
        for a in names {
            for b in names {
                for c in names {
                    let c_from_a = graph.resolve_pose(top, a, c).unwrap();
                    let b_from_a = graph.resolve_pose(top, a, b).unwrap();
                    let c_from_b = graph.resolve_pose(top, b, c).unwrap();
                    assert!(close(&c_from_a, &(c_from_b * b_from_a)), "{a} {b} {c}");
                }
            }
        }
    }

    #[test]
    fn cycle_blocks_every_query() {
        let (graph, errors) = model_graph(
            r#"<model name="m">
                <link name="base"/>
                <frame name="x"><pose relative_to="y"/></frame>
                <frame name="y"><pose relative_to="x"/></frame>
            </model>"#,
        );
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::PoseRelativeToCycle);
        assert!(!graph.is_valid());
        let top = graph.scoped().root_scope();
        for (a, b) in [("x", "y"), ("base", ""), ("base", "base")] {
            assert_eq!(
                graph.resolve_pose(top, a, b).unwrap_err().code,
                ErrorCode::PoseRelativeToCycle
            );
        }
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let (_, errors) = model_graph(
            r#"<model name="m"><link name="l"><pose relative_to="l"/></link></model>"#,
        );
        assert_eq!(errors[0].code, ErrorCode::PoseRelativeToCycle);
    }

    #[test]
    fn undefined_relative_to_is_unresolved() {
        let (graph, errors) = model_graph(
            r#"<model name="m"><link name="l"><pose relative_to="ghost"/></link></model>"#,
        );
        assert_eq!(errors[0].code, ErrorCode::UnresolvedName);
        assert!(errors[0].message.contains("ghost"));
        assert_eq!(errors[1].code, ErrorCode::PoseRelativeToInvalid);
        let top = graph.scoped().root_scope();
        assert!(graph.resolve_pose(top, "l", "").is_err());
    }

    #[test]
    fn unknown_query_names() {
        let (graph, _) = model_graph(CHAIN);
        let top = graph.scoped().root_scope();
        assert_eq!(
            graph.resolve_pose(top, "nope", "").unwrap_err().code,
            ErrorCode::UnresolvedName
        );
        assert_eq!(
            graph.resolve_pose(top, "base", "nope").unwrap_err().code,
            ErrorCode::UnresolvedName
        );
    }

    #[test]
    fn world_models_resolve_to_world() {
        let doc = Document::parse(
            r#"<world name="w">
                <model name="a"><pose>0 0 1 0 0 0</pose><link name="l"><pose>1 0 0 0 0 0</pose></link></model>
                <model name="b"><pose relative_to="a">0 5 0 0 0 0</pose><link name="l"/></model>
            </world>"#,
        )
        .unwrap();
        let world = World::load(&Element::from(doc.root_element())).unwrap().value;
        let (graph, errors) =
            PoseRelativeToGraph::build(&Skeleton::for_world(&world).value).into_parts();
        assert!(errors.is_empty(), "{errors:?}");
        let top = graph.scoped().root_scope();
        let a = graph.scoped().child_scope(top, "a").unwrap();
        let b = graph.scoped().child_scope(top, "b").unwrap();

        let l = graph.resolve_pose(a, "l", "").unwrap();
        assert!((l.translation.vector - Vector3::new(1.0, 0.0, 1.0)).norm() < 1e-12);
        let l = graph.resolve_pose(a, "l", "world").unwrap();
        assert!((l.translation.vector - Vector3::new(1.0, 0.0, 1.0)).norm() < 1e-12);
        let model_b = graph.resolve_pose(b, "__model__", "").unwrap();
        assert!((model_b.translation.vector - Vector3::new(0.0, 5.0, 1.0)).norm() < 1e-12);
        // a's link is out of b's reach
        assert!(graph.resolve_pose(b, "l", "a").is_ok());
        assert_eq!(
            graph.resolve_pose(top, "l", "").unwrap_err().code,
            ErrorCode::UnresolvedName
        );
    }

    #[test]
    fn sign_matches_direction() {
        assert_eq!(Direction::Forward.sign(), 1);
        assert_eq!(Direction::Reverse.sign(), -1);
    }
}
