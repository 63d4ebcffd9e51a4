use std::fmt;
use std::str::FromStr;

use nalgebra::Vector3;

use crate::element::Element;
use crate::error::{Error, Errors, Loaded, Result};
use crate::frame_graphs::GraphHandle;
use crate::pose::{load_pose, Pose};
use crate::utils::{expect_tag, get_or_record, load_name, Loadable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum JointType {
    /// Missing or unrecognised `type` attribute.
    #[default]
    Invalid,
    Ball,
    Continuous,
    Fixed,
    Gearbox,
    Prismatic,
    Revolute,
    Revolute2,
    Screw,
    Universal,
}

impl JointType {
    /// Number of `<axis>` elements the type reads.
    pub fn axis_count(self) -> usize {
        match self {
            JointType::Invalid | JointType::Ball | JointType::Fixed => 0,
            JointType::Gearbox | JointType::Revolute2 | JointType::Universal => 2,
            _ => 1,
        }
    }
}

impl FromStr for JointType {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "ball" => JointType::Ball,
            "continuous" => JointType::Continuous,
            "fixed" => JointType::Fixed,
            "gearbox" => JointType::Gearbox,
            "prismatic" => JointType::Prismatic,
            "revolute" => JointType::Revolute,
            "revolute2" => JointType::Revolute2,
            "screw" => JointType::Screw,
            "universal" => JointType::Universal,
            _ => return Err(()),
        })
    }
}

impl fmt::Display for JointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JointType::Invalid => "invalid",
            JointType::Ball => "ball",
            JointType::Continuous => "continuous",
            JointType::Fixed => "fixed",
            JointType::Gearbox => "gearbox",
            JointType::Prismatic => "prismatic",
            JointType::Revolute => "revolute",
            JointType::Revolute2 => "revolute2",
            JointType::Screw => "screw",
            JointType::Universal => "universal",
        };
        f.write_str(s)
    }
}

/// Motion axis with its limits.
#[derive(Debug, Clone, PartialEq)]
pub struct JointAxis {
    /// Unit direction.
    pub xyz: Vector3<f64>,
    pub lower: f64,
    pub upper: f64,
    /// Negative means unlimited.
    pub effort: f64,
    /// Negative means unlimited.
    pub velocity: f64,
    pub damping: f64,
    pub friction: f64,
}

impl Default for JointAxis {
    fn default() -> Self {
        Self {
            xyz: Vector3::z(),
            lower: -1e16,
            upper: 1e16,
            effort: -1.0,
            velocity: -1.0,
            damping: 0.0,
            friction: 0.0,
        }
    }
}

impl JointAxis {
    fn load(elem: &Element, errors: &mut Errors) -> Self {
        let mut axis = Self::default();
        let xyz: Vector3<f64> = get_or_record(elem, "xyz", axis.xyz, errors);
        match xyz.try_normalize(f64::EPSILON) {
            Some(unit) => axis.xyz = unit,
            None => errors.push(Error::attribute_invalid(
                "the norm of the axis xyz vector cannot be zero",
            )),
        }
        if let Some(dynamics) = elem.element("dynamics") {
            axis.damping = get_or_record(&dynamics, "damping", axis.damping, errors);
            axis.friction = get_or_record(&dynamics, "friction", axis.friction, errors);
        }
        if let Some(limit) = elem.element("limit") {
            axis.lower = get_or_record(&limit, "lower", axis.lower, errors);
            axis.upper = get_or_record(&limit, "upper", axis.upper, errors);
            axis.effort = get_or_record(&limit, "effort", axis.effort, errors);
            axis.velocity = get_or_record(&limit, "velocity", axis.velocity, errors);
        }
        axis
    }
}

#[derive(Debug, Clone, Default)]
pub struct Joint {
    name: String,
    joint_type: JointType,
    parent_link_name: String,
    child_link_name: String,
    pose: Pose,
    pose_relative_to: String,
    axes: [Option<JointAxis>; 2],
    thread_pitch: f64,
    graph: Option<GraphHandle>,
}

impl Loadable for Joint {
    const TAG: &'static str = "joint";

    fn load(elem: &Element) -> Result<Loaded<Self>> {
        expect_tag(elem, Self::TAG, "joint")?;
        let mut errors = Errors::new();

        let name = load_name(elem, "joint", &mut errors);

        let joint_type = match elem.attribute("type") {
            None => {
                errors.push(Error::attribute_missing(format!(
                    "a joint type is required, but joint[{name}] has none"
                )));
                JointType::Invalid
            }
            Some(text) => text.parse().unwrap_or_else(|()| {
                errors.push(Error::attribute_invalid(format!(
                    "joint[{name}] has an invalid type[{text}]"
                )));
                JointType::Invalid
            }),
        };

        let parent_link_name = link_reference(elem, "parent", &name, &mut errors);
        let child_link_name = link_reference(elem, "child", &name, &mut errors);
        let (pose, pose_relative_to) = load_pose(elem, &mut errors);

        let mut axes = [None, None];
        if let Some(axis) = elem.element("axis") {
            axes[0] = Some(JointAxis::load(&axis, &mut errors));
        }
        if let Some(axis) = elem.element("axis2") {
            axes[1] = Some(JointAxis::load(&axis, &mut errors));
        }
        let thread_pitch = get_or_record(elem, "thread_pitch", 1.0, &mut errors);

        Ok(Loaded::with_errors(
            Self {
                name,
                joint_type,
                parent_link_name,
                child_link_name,
                pose,
                pose_relative_to,
                axes,
                thread_pitch,
                graph: None,
            },
            errors,
        ))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn link_reference(elem: &Element, key: &str, joint: &str, errors: &mut Errors) -> String {
    match elem.get::<String>(key) {
        Ok(Some(link)) if !link.is_empty() => link,
        Ok(_) => {
            errors.push(Error::attribute_missing(format!(
                "the {key} element is missing or empty in joint[{joint}]"
            )));
            String::new()
        }
        Err(err) => {
            errors.push(err);
            String::new()
        }
    }
}

impl Joint {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn joint_type(&self) -> JointType {
        self.joint_type
    }

    pub fn parent_link_name(&self) -> &str {
        &self.parent_link_name
    }

    pub fn child_link_name(&self) -> &str {
        &self.child_link_name
    }

    pub fn raw_pose(&self) -> &Pose {
        &self.pose
    }

    /// Empty means the child link.
    pub fn pose_relative_to(&self) -> &str {
        &self.pose_relative_to
    }

    /// `index` 0 is `<axis>`, 1 is `<axis2>`.
    pub fn axis(&self, index: usize) -> Option<&JointAxis> {
        self.axes.get(index).and_then(Option::as_ref)
    }

    pub fn thread_pitch(&self) -> f64 {
        self.thread_pitch
    }

    pub(crate) fn set_graph(&mut self, graph: GraphHandle) {
        self.graph = Some(graph);
    }

    pub fn resolve_pose(&self, relative_to: &str) -> Result<Pose> {
        GraphHandle::require(self.graph.as_ref())?.resolve_pose(&self.name, relative_to)
    }

    /// The child link, unless the graph says otherwise.
    pub fn resolve_attached_to_body(&self) -> Result<String> {
        GraphHandle::require(self.graph.as_ref())?.resolve_attached_to_body(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use roxmltree::Document;

    use super::*;
    use crate::error::ErrorCode;

    fn load(text: &str) -> Loaded<Joint> {
        let doc = Document::parse(text).unwrap();
        Joint::load(&Element::from(doc.root_element())).unwrap()
    }

    #[test]
    fn load_revolute() {
        let joint = load(
            r#"<joint name="j" type="revolute">
                <parent>base</parent>
                <child>arm</child>
                <pose relative_to="base">0 0 1 0 0 0</pose>
                <axis>
                    <xyz>0 2 0</xyz>
                    <limit><lower>-1.5</lower><upper>1.5</upper><effort>10</effort></limit>
                    <dynamics><damping>0.3</damping></dynamics>
                </axis>
            </joint>"#,
        );
        assert!(joint.is_clean(), "{:?}", joint.errors);
        let joint = joint.value;
        assert_eq!(joint.joint_type(), JointType::Revolute);
        assert_eq!(joint.parent_link_name(), "base");
        assert_eq!(joint.child_link_name(), "arm");
        assert_eq!(joint.pose_relative_to(), "base");

        let axis = joint.axis(0).unwrap();
        assert_eq!(axis.xyz, Vector3::y());
        assert_eq!(axis.lower, -1.5);
        assert_eq!(axis.upper, 1.5);
        assert_eq!(axis.effort, 10.0);
        assert_eq!(axis.velocity, -1.0);
        assert_eq!(axis.damping, 0.3);
        assert!(joint.axis(1).is_none());
        assert!(joint.axis(7).is_none());
    }

    #[test]
    fn defaults() {
        let joint = load(r#"<joint name="j" type="universal"><parent>a</parent><child>b</child><axis/></joint>"#);
        assert!(joint.is_clean());
        let joint = joint.value;
        assert_eq!(joint.axis(0).unwrap(), &JointAxis::default());
        assert_eq!(joint.thread_pitch(), 1.0);
        assert!(joint.pose_relative_to().is_empty());
        assert_eq!(joint.joint_type().axis_count(), 2);
    }

    #[test]
    fn bad_type_is_invalid() {
        let joint = load(r#"<joint name="j" type="hinge"><parent>a</parent><child>b</child></joint>"#);
        assert_eq!(joint.errors.len(), 1);
        assert_eq!(joint.errors[0].code, ErrorCode::AttributeInvalid);
        assert_eq!(joint.value.joint_type(), JointType::Invalid);

        let joint = load(r#"<joint name="j"><parent>a</parent><child>b</child></joint>"#);
        assert_eq!(joint.errors[0].code, ErrorCode::AttributeMissing);
    }

    #[test]
    fn parent_and_child_are_required() {
        let joint = load(r#"<joint name="j" type="fixed"><child></child></joint>"#);
        let codes: Vec<_> = joint.errors.iter().map(|e| e.code).collect();
        assert_eq!(codes, [ErrorCode::AttributeMissing, ErrorCode::AttributeMissing]);
        assert!(joint.value.child_link_name().is_empty());
    }

    #[test]
    fn zero_axis_is_rejected() {
        let joint = load(
            r#"<joint name="j" type="prismatic"><parent>a</parent><child>b</child><axis><xyz>0 0 0</xyz></axis></joint>"#,
        );
        assert_eq!(joint.errors[0].code, ErrorCode::AttributeInvalid);
        assert_eq!(joint.value.axis(0).unwrap().xyz, Vector3::z());
    }

    #[test]
    fn type_names_round_trip() {
        for name in ["ball", "fixed", "revolute2", "screw", "gearbox"] {
            assert_eq!(name.parse::<JointType>().unwrap().to_string(), name);
        }
    }
}
