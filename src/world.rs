use nalgebra::Vector3;

use crate::element::Element;
use crate::error::{Errors, Loaded, Result};
use crate::frame::Frame;
use crate::frame_graphs::GraphHandle;
use crate::model::Model;
use crate::utils::{expect_tag, get_or_record, load_name, load_unique_repeated, Children, Loadable};

#[derive(Debug, Clone)]
pub struct World {
    name: String,
    gravity: Vector3<f64>,
    magnetic_field: Vector3<f64>,
    models: Children<Model>,
    frames: Children<Frame>,
    graph: Option<GraphHandle>,
}

impl Default for World {
    fn default() -> Self {
        Self {
            name: String::new(),
            gravity: Vector3::new(0.0, 0.0, -9.8),
            magnetic_field: Vector3::new(5.5645e-6, 22.8758e-6, -42.3884e-6),
            models: Children::default(),
            frames: Children::default(),
            graph: None,
        }
    }
}

impl Loadable for World {
    const TAG: &'static str = "world";

    fn load(elem: &Element) -> Result<Loaded<Self>> {
        expect_tag(elem, Self::TAG, "world")?;
        let mut errors = Errors::new();
        let defaults = Self::default();

        let name = load_name(elem, "world", &mut errors);
        let gravity = get_or_record(elem, "gravity", defaults.gravity, &mut errors);
        let magnetic_field =
            get_or_record(elem, "magnetic_field", defaults.magnetic_field, &mut errors);
        let models = load_unique_repeated::<Model>(elem).merge_into(&mut errors);
        let frames = load_unique_repeated::<Frame>(elem).merge_into(&mut errors);

        tracing::debug!(
            world = name.as_str(),
            models = models.len(),
            frames = frames.len(),
            "loaded world"
        );

        Ok(Loaded::with_errors(
            Self {
                name,
                gravity,
                magnetic_field,
                models,
                frames,
                graph: None,
            },
            errors,
        ))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl World {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn gravity(&self) -> &Vector3<f64> {
        &self.gravity
    }

    pub fn magnetic_field(&self) -> &Vector3<f64> {
        &self.magnetic_field
    }

    pub fn models(&self) -> &Children<Model> {
        &self.models
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    pub fn model_by_index(&self, index: usize) -> Option<&Model> {
        self.models.get(index)
    }

    pub fn model_by_name(&self, name: &str) -> Option<&Model> {
        self.models.by_name(name)
    }

    pub fn model_name_exists(&self, name: &str) -> bool {
        self.models.contains(name)
    }

    pub fn frames(&self) -> &Children<Frame> {
        &self.frames
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frame_by_index(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn frame_by_name(&self, name: &str) -> Option<&Frame> {
        self.frames.by_name(name)
    }

    pub fn frame_name_exists(&self, name: &str) -> bool {
        self.frames.contains(name)
    }

    pub fn graph(&self) -> Option<&GraphHandle> {
        self.graph.as_ref()
    }

    pub(crate) fn set_graph(&mut self, graph: GraphHandle) {
        for model in self.models.iter_mut() {
            let scope = graph.child(model.name());
            model.set_graph(scope);
        }
        for frame in self.frames.iter_mut() {
            frame.set_graph(graph.clone());
        }
        self.graph = Some(graph);
    }
}
