//! Document entry point: version check, then worlds, a standalone model,
//! a light and an actor. Every world and model gets its frame graphs
//! built and validated before it is exposed.

use std::path::Path;
use std::sync::Arc;

use roxmltree::Document;

use crate::actor::Actor;
use crate::element::Element;
use crate::error::{Error, ErrorCode, Errors, Loaded};
use crate::frame_graphs::{FrameGraphs, GraphHandle};
use crate::light::Light;
use crate::model::Model;
use crate::utils::{read_file, Children, Loadable};
use crate::world::World;
use crate::SDF_PROTOCOL_VERSION;

#[derive(Debug, Clone, Default)]
pub struct Root {
    version: String,
    worlds: Children<World>,
    model: Option<Model>,
    light: Option<Light>,
    actor: Option<Actor>,
}

impl Root {
    /// Read and load the document at `path`.
    pub fn load(path: impl AsRef<Path>) -> Loaded<Self> {
        let path = path.as_ref();
        match read_file(path) {
            Ok(text) => Self::load_str(&text),
            Err(err) => Self::failed(
                ErrorCode::FileRead,
                format!("unable to read file[{}]: {err}", path.display()),
            ),
        }
    }

    /// Load a document held in memory.
    pub fn load_str(text: &str) -> Loaded<Self> {
        let doc = match Document::parse(text) {
            Ok(doc) => doc,
            Err(err) => {
                return Self::failed(ErrorCode::StringRead, format!("unable to parse SDF string: {err}"))
            }
        };
        let elem = Element::from(doc.root_element());
        if elem.name() != "sdf" {
            return Self::failed(
                ErrorCode::StringRead,
                format!("document root is <{}>, expected <sdf>", elem.name()),
            );
        }
        Self::load_element(&elem)
    }

    fn failed(code: ErrorCode, message: String) -> Loaded<Self> {
        Loaded::with_errors(Self::default(), vec![Error::new(code, message)])
    }

    #[tracing::instrument(skip_all)]
    fn load_element(elem: &Element) -> Loaded<Self> {
        let Some(version) = elem.attribute("version") else {
            return Self::failed(ErrorCode::AttributeMissing, "SDF does not have a version".into());
        };
        if version != SDF_PROTOCOL_VERSION {
            return Self::failed(
                ErrorCode::AttributeInvalid,
                format!(
                    "SDF version attribute[{version}] should match the latest \
                     version[{SDF_PROTOCOL_VERSION}] when loading DOM objects"
                ),
            );
        }

        let mut root = Self {
            version: version.to_owned(),
            ..Self::default()
        };
        let mut errors = Errors::new();

        for world_elem in elem.elements(World::TAG) {
            let mut world_errors = Errors::new();
            let mut world = match World::load(&world_elem) {
                Ok(loaded) => loaded.merge_into(&mut world_errors),
                Err(err) => {
                    errors.push(err);
                    continue;
                }
            };
            let graphs = FrameGraphs::for_world(&world).merge_into(&mut world_errors);
            world.set_graph(GraphHandle::new(Arc::new(graphs)));

            if !world_errors.is_empty() {
                errors.extend(world_errors);
                errors.push(Error::new(
                    ErrorCode::ElementInvalid,
                    format!("failed to load world[{}]", world.name()),
                ));
            }
            if let Err(world) = root.worlds.push(world) {
                tracing::warn!(world = world.name(), "duplicate world name, skipping");
                errors.push(Error::new(
                    ErrorCode::DuplicateName,
                    format!(
                        "world with name[{}] already exists; each world must have a unique name",
                        world.name()
                    ),
                ));
            }
        }

        if let Some(model_elem) = elem.element(Model::TAG) {
            match Model::load(&model_elem) {
                Ok(loaded) => {
                    let mut model = loaded.merge_into(&mut errors);
                    let graphs = FrameGraphs::for_model(&model).merge_into(&mut errors);
                    model.set_graph(Some(GraphHandle::new(Arc::new(graphs))));
                    root.model = Some(model);
                }
                Err(err) => errors.push(err),
            }
        }

        if let Some(light_elem) = elem.element(Light::TAG) {
            match Light::load(&light_elem) {
                Ok(loaded) => root.light = Some(loaded.merge_into(&mut errors)),
                Err(err) => errors.push(err),
            }
        }

        if let Some(actor_elem) = elem.element(Actor::TAG) {
            match Actor::load(&actor_elem) {
                Ok(loaded) => root.actor = Some(loaded.merge_into(&mut errors)),
                Err(err) => errors.push(err),
            }
        }

        tracing::debug!(
            worlds = root.worlds.len(),
            model = root.model.is_some(),
            errors = errors.len(),
            "loaded root"
        );
        Loaded::with_errors(root, errors)
    }

    /// Empty unless the document version was accepted.
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn world_count(&self) -> usize {
        self.worlds.len()
    }

    pub fn world_by_index(&self, index: usize) -> Option<&World> {
        self.worlds.get(index)
    }

    pub fn world_by_name(&self, name: &str) -> Option<&World> {
        self.worlds.by_name(name)
    }

    pub fn world_name_exists(&self, name: &str) -> bool {
        self.worlds.contains(name)
    }

    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    pub fn light(&self) -> Option<&Light> {
        self.light.as_ref()
    }

    pub fn actor(&self) -> Option<&Actor> {
        self.actor.as_ref()
    }
}
