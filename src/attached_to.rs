//! Frame attached-to graph: which rigid body does each frame move with.

use crate::error::{Error, ErrorCode, Errors, Loaded, Result};
use crate::frame::FrameVertex;
use crate::frame_graphs::{resolve_target, Skeleton, Target};
use crate::scoped_graph::{ScopeId, ScopedGraph};
use crate::search::{find_cycle, walk_to_sink, SinkWalk};

/// Edges point from a frame to the frame it is attached to. Links and
/// the world are sinks.
#[derive(Debug, Clone)]
pub struct FrameAttachedToGraph {
    graph: ScopedGraph<FrameVertex, ()>,
    invalid: Option<ErrorCode>,
}

impl FrameAttachedToGraph {
    pub(crate) fn build(skeleton: &Skeleton) -> Loaded<Self> {
        let mut graph = skeleton.graph.without_edges::<()>();
        let mut errors = Errors::new();

        for record in &skeleton.records {
            match resolve_target(&graph, &record.attached_to) {
                None => {}
                Some(Ok(target)) => {
                    graph.add_edge(record.node, target, ());
                }
                Some(Err(_)) => {
                    let name = match &record.attached_to {
                        Target::Named(_, name) => name.as_str(),
                        _ => "",
                    };
                    errors.push(Error::new(
                        ErrorCode::UnresolvedName,
                        format!(
                            "attached_to name[{name}] specified by {:?}[{}] does not match a frame in scope",
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

    /// Check acyclicity, then that every frame ends on a link or world.
    pub fn validate(&self) -> Errors {
        let graph = self.graph.graph();

        if let Some(cycle) = find_cycle(graph, |_| true) {
            let names: Vec<&str> = cycle
                .iter()
                .map(|&n| self.graph.vertex(n).name.as_str())
                .collect();
            return vec![Error::new(
                ErrorCode::FrameAttachedToCycle,
                format!("attached_to graph contains a cycle: {}", names.join(" -> ")),
            )];
        }

        let mut errors = Errors::new();
        for node in graph.node_indices() {
            let vertex = self.graph.vertex(node);
            match walk_to_sink(graph, node, |_| true) {
                SinkWalk::Sink(sink) if self.graph.vertex(sink).kind.is_body() => {}
                SinkWalk::Sink(sink) => {
                    let sink = self.graph.vertex(sink);
                    errors.push(Error::new(
                        ErrorCode::FrameAttachedToInvalid,
                        format!(
                            "{:?}[{}] is attached to {:?}[{}], which is not a link or world",
                            vertex.kind, vertex.name, sink.kind, sink.name
                        ),
                    ));
                }
                SinkWalk::Branch(at) => errors.push(Error::new(
                    ErrorCode::FrameAttachedToInvalid,
                    format!(
                        "frame[{}] is attached to more than one frame",
                        self.graph.vertex(at).name
                    ),
                )),
                SinkWalk::Unterminated => errors.push(Error::new(
                    ErrorCode::FrameAttachedToInvalid,
                    format!("attached_to chain of frame[{}] does not terminate", vertex.name),
                )),
            }
        }
        errors
    }

    /// Follow attachments from `frame` to the body it moves with.
    pub fn resolve_body(&self, scope: ScopeId, frame: &str) -> Result<String> {
        if let Some(code) = self.invalid {
            return Err(Error::new(
                code,
                format!("attached_to graph failed validation; cannot resolve frame[{frame}]"),
            ));
        }
        let start = self.graph.resolve(scope, frame)?;
        match walk_to_sink(self.graph.graph(), start, |_| true) {
            SinkWalk::Sink(sink) if self.graph.vertex(sink).kind.is_body() => {
                Ok(self.graph.vertex(sink).name.clone())
            }
            _ => Err(Error::new(
                ErrorCode::FrameAttachedToInvalid,
                format!("frame[{frame}] is not attached to a link or world"),
            )),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.invalid.is_none()
    }

    pub(crate) fn invalidate(&mut self, code: ErrorCode) {
        self.invalid.get_or_insert(code);
    }

    pub fn scoped(&self) -> &ScopedGraph<FrameVertex, ()> {
        &self.graph
    }
}

#[cfg(test)]
mod tests {
    use roxmltree::Document;

    use super::*;
    use crate::element::Element;
    use crate::model::Model;
    use crate::utils::Loadable;
    use crate::world::World;

    fn model_graph(text: &str) -> (FrameAttachedToGraph, Errors) {
        let doc = Document::parse(text).unwrap();
        let model = Model::load(&Element::from(doc.root_element())).unwrap().value;
        let skeleton = Skeleton::for_model(&model).value;
        FrameAttachedToGraph::build(&skeleton).into_parts()
    }

    #[test]
    fn frames_resolve_to_links() {
        let (graph, errors) = model_graph(
            r#"<model name="m">
                <link name="base"/>
                <link name="arm"/>
                <joint name="j" type="revolute"><parent>base</parent><child>arm</child></joint>
                <frame name="on_joint" attached_to="j"/>
                <frame name="on_frame" attached_to="on_joint"/>
                <frame name="on_model"/>
            </model>"#,
        );
        assert!(errors.is_empty(), "{errors:?}");
        assert!(graph.is_valid());
        let top = graph.scoped().root_scope();
        assert_eq!(graph.resolve_body(top, "on_frame").unwrap(), "arm");
        assert_eq!(graph.resolve_body(top, "j").unwrap(), "arm");
        assert_eq!(graph.resolve_body(top, "on_model").unwrap(), "base");
        assert_eq!(graph.resolve_body(top, "__model__").unwrap(), "base");
        assert_eq!(graph.resolve_body(top, "base").unwrap(), "base");
        // idempotent
        assert_eq!(graph.resolve_body(top, "on_frame").unwrap(), "arm");
        assert_eq!(
            graph.resolve_body(top, "nope").unwrap_err().code,
            ErrorCode::UnresolvedName
        );
    }

    #[test]
    fn canonical_link_attribute_is_followed() {
        let (graph, errors) = model_graph(
            r#"<model name="m" canonical_link="second">
                <link name="first"/>
                <link name="second"/>
            </model>"#,
        );
        assert!(errors.is_empty());
        let top = graph.scoped().root_scope();
        assert_eq!(graph.resolve_body(top, "__model__").unwrap(), "second");
    }

    #[test]
    fn cycle_is_rejected() {
        let (graph, errors) = model_graph(
            r#"<model name="m">
                <link name="base"/>
                <frame name="a" attached_to="b"/>
                <frame name="b" attached_to="a"/>
            </model>"#,
        );
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::FrameAttachedToCycle);
        assert!(errors[0].message.contains("a -> b -> a") || errors[0].message.contains("b -> a -> b"));
        let top = graph.scoped().root_scope();
        assert!(graph.resolve_body(top, "base").is_err());
    }

    #[test]
    fn model_without_links_is_invalid() {
        let (graph, errors) = model_graph(r#"<model name="m"><frame name="f"/></model>"#);
        assert!(!graph.is_valid());
        assert!(errors
            .iter()
            .all(|e| e.code == ErrorCode::FrameAttachedToInvalid));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn unknown_attached_to_is_unresolved() {
        let (graph, errors) = model_graph(
            r#"<model name="m"><link name="l"/><frame name="f" attached_to="ghost"/></model>"#,
        );
        assert_eq!(errors[0].code, ErrorCode::UnresolvedName);
        assert!(errors[0].message.contains("ghost"));
        // the dangling frame also fails the sink check
        assert_eq!(errors[1].code, ErrorCode::FrameAttachedToInvalid);
        assert!(!graph.is_valid());
    }

    #[test]
    fn world_frames_attach_through_models() {
        let doc = Document::parse(
            r#"<world name="w">
                <model name="m"><link name="l"/></model>
                <frame name="on_model" attached_to="m"/>
                <frame name="floating"/>
            </world>"#,
        )
        .unwrap();
        let world = World::load(&Element::from(doc.root_element())).unwrap().value;
        let skeleton = Skeleton::for_world(&world).value;
        let (graph, errors) = FrameAttachedToGraph::build(&skeleton).into_parts();
        assert!(errors.is_empty(), "{errors:?}");
        let top = graph.scoped().root_scope();
        assert_eq!(graph.resolve_body(top, "on_model").unwrap(), "l");
        assert_eq!(graph.resolve_body(top, "floating").unwrap(), "world");
        let model_scope = graph.scoped().child_scope(top, "m").unwrap();
        assert_eq!(graph.resolve_body(model_scope, "__model__").unwrap(), "l");
    }
}
