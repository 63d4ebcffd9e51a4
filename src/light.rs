use std::str::FromStr;

use nalgebra::{Vector3, Vector4};

use crate::element::Element;
use crate::error::{Error, Errors, Loaded, Result};
use crate::pose::{load_pose, Pose};
use crate::utils::{expect_tag, get_or_record, load_name, Loadable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightType {
    #[default]
    Point,
    Directional,
    Spot,
}

impl FromStr for LightType {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "point" => Ok(LightType::Point),
            "directional" => Ok(LightType::Directional),
            "spot" => Ok(LightType::Spot),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attenuation {
    pub range: f64,
    pub constant: f64,
    pub linear: f64,
    pub quadratic: f64,
}

impl Default for Attenuation {
    fn default() -> Self {
        Self {
            range: 10.0,
            constant: 1.0,
            linear: 1.0,
            quadratic: 0.0,
        }
    }
}

/// Cone of a spot light, angles in radians.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Spot {
    pub inner_angle: f64,
    pub outer_angle: f64,
    pub falloff: f64,
}

#[derive(Debug, Clone)]
pub struct Light {
    name: String,
    light_type: LightType,
    pose: Pose,
    pose_relative_to: String,
    cast_shadows: bool,
    intensity: f64,
    /// rgba
    diffuse: Vector4<f64>,
    /// rgba
    specular: Vector4<f64>,
    direction: Vector3<f64>,
    attenuation: Attenuation,
    spot: Spot,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            name: String::new(),
            light_type: LightType::default(),
            pose: Pose::identity(),
            pose_relative_to: String::new(),
            cast_shadows: false,
            intensity: 1.0,
            diffuse: Vector4::repeat(1.0),
            specular: Vector4::new(0.1, 0.1, 0.1, 1.0),
            direction: Vector3::new(0.0, 0.0, -1.0),
            attenuation: Attenuation::default(),
            spot: Spot::default(),
        }
    }
}

impl Loadable for Light {
    const TAG: &'static str = "light";

    fn load(elem: &Element) -> Result<Loaded<Self>> {
        expect_tag(elem, Self::TAG, "light")?;
        let mut errors = Errors::new();
        let mut light = Self::default();

        light.name = load_name(elem, "light", &mut errors);
        if let Some(text) = elem.attribute("type") {
            match text.parse() {
                Ok(light_type) => light.light_type = light_type,
                Err(()) => errors.push(Error::attribute_invalid(format!(
                    "light[{}] has an invalid type[{text}]",
                    light.name
                ))),
            }
        }
        (light.pose, light.pose_relative_to) = load_pose(elem, &mut errors);
        light.cast_shadows = get_or_record(elem, "cast_shadows", light.cast_shadows, &mut errors);
        light.intensity = get_or_record(elem, "intensity", light.intensity, &mut errors);
        light.diffuse = get_or_record(elem, "diffuse", light.diffuse, &mut errors);
        light.specular = get_or_record(elem, "specular", light.specular, &mut errors);
        light.direction = get_or_record(elem, "direction", light.direction, &mut errors);

        if let Some(attenuation) = elem.element("attenuation") {
            let a = &mut light.attenuation;
            a.range = get_or_record(&attenuation, "range", a.range, &mut errors);
            a.constant = get_or_record(&attenuation, "constant", a.constant, &mut errors);
            a.linear = get_or_record(&attenuation, "linear", a.linear, &mut errors);
            a.quadratic = get_or_record(&attenuation, "quadratic", a.quadratic, &mut errors);
        }
        if let Some(spot) = elem.element("spot") {
            let s = &mut light.spot;
            s.inner_angle = get_or_record(&spot, "inner_angle", s.inner_angle, &mut errors);
            s.outer_angle = get_or_record(&spot, "outer_angle", s.outer_angle, &mut errors);
            s.falloff = get_or_record(&spot, "falloff", s.falloff, &mut errors);
        }

        Ok(Loaded::with_errors(light, errors))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Light {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn light_type(&self) -> LightType {
        self.light_type
    }

    pub fn raw_pose(&self) -> &Pose {
        &self.pose
    }

    pub fn pose_relative_to(&self) -> &str {
        &self.pose_relative_to
    }

    pub fn cast_shadows(&self) -> bool {
        self.cast_shadows
    }

    pub fn intensity(&self) -> f64 {
        self.intensity
    }

    pub fn diffuse(&self) -> &Vector4<f64> {
        &self.diffuse
    }

    pub fn specular(&self) -> &Vector4<f64> {
        &self.specular
    }

    pub fn direction(&self) -> &Vector3<f64> {
        &self.direction
    }

    pub fn attenuation(&self) -> &Attenuation {
        &self.attenuation
    }

    pub fn spot(&self) -> &Spot {
        &self.spot
    }
}

#[cfg(test)]
mod tests {
    use roxmltree::Document;

    use super::*;
    use crate::error::ErrorCode;

    fn load(text: &str) -> Loaded<Light> {
        let doc = Document::parse(text).unwrap();
        Light::load(&Element::from(doc.root_element())).unwrap()
    }

    #[test]
    fn spot_light() {
        let light = load(
            r#"<light name="sun" type="spot">
                <cast_shadows>true</cast_shadows>
                <diffuse>0.5 0.5 0.5 1</diffuse>
                <direction>0 1 0</direction>
                <attenuation><range>20</range></attenuation>
                <spot><outer_angle>0.8</outer_angle></spot>
            </light>"#,
        );
        assert!(light.is_clean(), "{:?}", light.errors);
        let light = light.value;
        assert_eq!(light.light_type(), LightType::Spot);
        assert!(light.cast_shadows());
        assert_eq!(light.intensity(), 1.0);
        assert_eq!(light.diffuse(), &Vector4::new(0.5, 0.5, 0.5, 1.0));
        assert_eq!(light.direction(), &Vector3::y());
        assert_eq!(light.attenuation().range, 20.0);
        assert_eq!(light.attenuation().linear, 1.0);
        assert_eq!(light.spot().outer_angle, 0.8);
    }

    #[test]
    fn defaults() {
        let light = load(r#"<light name="l"/>"#).value;
        assert_eq!(light.light_type(), LightType::Point);
        assert!(!light.cast_shadows());
        assert_eq!(light.direction(), &Vector3::new(0.0, 0.0, -1.0));
        assert_eq!(light.specular(), &Vector4::new(0.1, 0.1, 0.1, 1.0));
    }

    #[test]
    fn unknown_type() {
        let light = load(r#"<light name="l" type="laser"/>"#);
        assert_eq!(light.errors[0].code, ErrorCode::AttributeInvalid);
        assert_eq!(light.value.light_type(), LightType::Point);
    }
}
