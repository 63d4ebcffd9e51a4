use crate::element::Element;
use crate::error::{Errors, Loaded, Result};
use crate::pose::{load_pose, Pose};
use crate::utils::{expect_tag, get_or_record, load_name, load_unique_repeated, Children, Loadable};

/// Mesh file driving an actor's skin or one of its animations.
#[derive(Debug, Clone, PartialEq)]
pub struct Skin {
    pub filename: String,
    pub scale: f64,
}

impl Skin {
    fn load(elem: &Element, errors: &mut Errors) -> Self {
        Self {
            filename: get_or_record(elem, "filename", String::new(), errors),
            scale: get_or_record(elem, "scale", 1.0, errors),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    name: String,
    pub skin: Skin,
    pub interpolate_x: bool,
}

impl Loadable for Animation {
    const TAG: &'static str = "animation";

    fn load(elem: &Element) -> Result<Loaded<Self>> {
        expect_tag(elem, Self::TAG, "animation")?;
        let mut errors = Errors::new();
        let name = load_name(elem, "animation", &mut errors);
        let skin = Skin::load(elem, &mut errors);
        let interpolate_x = get_or_record(elem, "interpolate_x", false, &mut errors);
        Ok(Loaded::with_errors(
            Self {
                name,
                skin,
                interpolate_x,
            },
            errors,
        ))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Default)]
pub struct Actor {
    name: String,
    pose: Pose,
    pose_relative_to: String,
    skin: Option<Skin>,
    animations: Children<Animation>,
}

impl Loadable for Actor {
    const TAG: &'static str = "actor";

    fn load(elem: &Element) -> Result<Loaded<Self>> {
        expect_tag(elem, Self::TAG, "actor")?;
        let mut errors = Errors::new();

        let name = load_name(elem, "actor", &mut errors);
        let (pose, pose_relative_to) = load_pose(elem, &mut errors);
        let skin = elem.element("skin").map(|skin| Skin::load(&skin, &mut errors));
        let animations = load_unique_repeated::<Animation>(elem).merge_into(&mut errors);

        Ok(Loaded::with_errors(
            Self {
                name,
                pose,
                pose_relative_to,
                skin,
                animations,
            },
            errors,
        ))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Actor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn raw_pose(&self) -> &Pose {
        &self.pose
    }

    pub fn pose_relative_to(&self) -> &str {
        &self.pose_relative_to
    }

    pub fn skin(&self) -> Option<&Skin> {
        self.skin.as_ref()
    }

    pub fn animation_count(&self) -> usize {
        self.animations.len()
    }

    pub fn animation_by_index(&self, index: usize) -> Option<&Animation> {
        self.animations.get(index)
    }

    pub fn animation_by_name(&self, name: &str) -> Option<&Animation> {
        self.animations.by_name(name)
    }

    pub fn animation_name_exists(&self, name: &str) -> bool {
        self.animations.contains(name)
    }
}

impl Animation {
    pub fn name(&self) -> &str {
        &self.name
    }
}
