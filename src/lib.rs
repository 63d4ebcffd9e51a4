//! SDFormat DOM loading with frame semantics.
//!
//! [`Root`] reads a document into worlds, models, links, joints and
//! frames. Each world or standalone model owns two frame graphs: the
//! attached-to graph answers which link a frame moves with, and the
//! relative-to graph resolves the pose of any frame in any other.

mod actor;
mod attached_to;
mod collision;
mod element;
mod error;
mod frame;
mod frame_graphs;
mod geometry;
mod joint;
mod light;
mod link;
mod model;
mod pose;
mod relative_to;
mod root;
mod scoped_graph;
mod search;
mod spatial_inertial;
mod utils;
mod visual;
mod world;

pub use actor::{Actor, Animation, Skin};
pub use attached_to::FrameAttachedToGraph;
pub use collision::Collision;
pub use element::{Element, Elements, ParseValue};
pub use error::{Error, ErrorCode, Errors, Loaded, Result};
pub use frame::{Frame, FrameKind, FrameVertex};
pub use frame_graphs::{FrameGraphs, GraphHandle, MODEL_FRAME, WORLD_FRAME};
pub use geometry::{BoxShape, Cylinder, Geometry, GeometryKind, Mesh, Plane, Sphere};
pub use joint::{Joint, JointAxis, JointType};
pub use light::{Attenuation, Light, LightType, Spot};
pub use link::Link;
pub use model::Model;
pub use pose::{pose_from_xyz_rpy, Pose};
pub use relative_to::{Direction, PoseEdge, PoseRelativeToGraph};
pub use root::Root;
pub use scoped_graph::{ScopeId, ScopedGraph};
pub use spatial_inertial::Inertial;
pub use utils::{Children, Loadable};
pub use visual::Visual;
pub use world::World;

/// The only document version DOM loading accepts.
pub const SDF_PROTOCOL_VERSION: &str = "1.7";
