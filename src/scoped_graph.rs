//! Directed graph of named vertices split into nested scopes.
//!
//! All vertices of a document live in one `petgraph` arena. Scopes only
//! own name tables pointing into that arena, so a model scope can alias
//! its implicit `__model__` frame to the model vertex registered in the
//! enclosing world scope.

use hashbrown::HashMap;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};

use crate::error::{Error, ErrorCode, Result};

/// Index of a scope inside a [`ScopedGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

#[derive(Debug, Clone)]
struct Scope {
    name: String,
    parent: Option<ScopeId>,
    implicit: NodeIndex,
    vertices: HashMap<String, NodeIndex>,
    children: HashMap<String, ScopeId>,
}

#[derive(Debug, Clone)]
pub struct ScopedGraph<V, E> {
    graph: DiGraph<V, E>,
    scopes: Vec<Scope>,
}

impl<V, E> ScopedGraph<V, E> {
    /// New graph whose top scope is named `scope_name` and owns the
    /// implicit frame `implicit_name`.
    pub fn new(scope_name: &str, implicit_name: &str, data: V) -> Self {
        let mut graph = DiGraph::new();
        let implicit = graph.add_node(data);
        let mut vertices = HashMap::new();
        vertices.insert(implicit_name.to_owned(), implicit);
        Self {
            graph,
            scopes: vec![Scope {
                name: scope_name.to_owned(),
                parent: None,
                implicit,
                vertices,
                children: HashMap::new(),
            }],
        }
    }

    pub fn root_scope(&self) -> ScopeId {
        ScopeId(0)
    }

    /// Implicit frame of the top scope; every relative-to chain ends here.
    pub fn root(&self) -> NodeIndex {
        self.scopes[0].implicit
    }

    /// Open a child scope whose implicit frame is the existing vertex
    /// `implicit`, optionally reachable inside the scope as `alias`.
    pub fn add_scope(
        &mut self,
        parent: ScopeId,
        name: &str,
        implicit: NodeIndex,
        alias: Option<&str>,
    ) -> Result<ScopeId> {
        let id = ScopeId(self.scopes.len());
        if self.scopes[parent.0].children.contains_key(name) {
            return Err(Error::new(
                ErrorCode::DuplicateName,
                format!(
                    "scope[{name}] already exists in scope[{}]",
                    self.scopes[parent.0].name
                ),
            ));
        }
        self.scopes[parent.0].children.insert(name.to_owned(), id);
        let mut vertices = HashMap::new();
        if let Some(alias) = alias {
            vertices.insert(alias.to_owned(), implicit);
        }
        self.scopes.push(Scope {
            name: name.to_owned(),
            parent: Some(parent),
            implicit,
            vertices,
            children: HashMap::new(),
        });
        Ok(id)
    }

    pub fn child_scope(&self, scope: ScopeId, name: &str) -> Option<ScopeId> {
        self.scopes[scope.0].children.get(name).copied()
    }

    pub fn scope_name(&self, scope: ScopeId) -> &str {
        &self.scopes[scope.0].name
    }

    pub fn implicit_frame(&self, scope: ScopeId) -> NodeIndex {
        self.scopes[scope.0].implicit
    }

    /// Register a vertex; names are unique within one scope.
    pub fn add_vertex(&mut self, scope: ScopeId, name: &str, data: V) -> Result<NodeIndex> {
        let table = &self.scopes[scope.0];
        if table.vertices.contains_key(name) {
            return Err(Error::new(
                ErrorCode::DuplicateName,
                format!("frame name[{name}] is already used in scope[{}]", table.name),
            ));
        }
        let id = self.graph.add_node(data);
        self.scopes[scope.0].vertices.insert(name.to_owned(), id);
        Ok(id)
    }

    /// Same vertices and scopes with no edges; ids carry over unchanged.
    pub fn without_edges<E2>(&self) -> ScopedGraph<V, E2>
    where
        V: Clone,
    {
        ScopedGraph {
            graph: self
                .graph
                .filter_map(|_, vertex| Some(vertex.clone()), |_, _| None),
            scopes: self.scopes.clone(),
        }
    }

    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex, payload: E) -> EdgeIndex {
        self.graph.add_edge(from, to, payload)
    }

    /// Look `name` up in `scope`, then in its parent. Lookups never
    /// climb further than one level.
    pub fn resolve(&self, scope: ScopeId, name: &str) -> Result<NodeIndex> {
        let table = &self.scopes[scope.0];
        if let Some(id) = table.vertices.get(name) {
            return Ok(*id);
        }
        table
            .parent
            .and_then(|parent| self.scopes[parent.0].vertices.get(name))
            .copied()
            .ok_or_else(|| Error::unresolved(name, &table.name))
    }

    pub fn vertex(&self, id: NodeIndex) -> &V {
        &self.graph[id]
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn graph(&self) -> &DiGraph<V, E> {
        &self.graph
    }
}
