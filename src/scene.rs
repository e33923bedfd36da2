use anyhow::{anyhow, Context, Result};
use glam::Vec3;
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

use crate::color::{parse_hex, Rgb};
use crate::mesh::{uv_sphere, MeshData};

/// Scene shown when no scene file is supplied.
pub const DEFAULT_SCENE_XML: &str = r##"
<scene>
    <object>
        <name>Ball</name>
        <type>sphere</type>
        <radius>3</radius>
        <segments>16 16</segments>
        <color>#00ff83</color>
    </object>
    <object>
        <name>Light</name>
        <type>light</type>
        <position>0 10 10</position>
        <color>#ffffff</color>
        <intensity>150</intensity>
    </object>
    <object>
        <name>Camera</name>
        <type>camera</type>
        <position>0 0 20</position>
        <fov>50</fov>
        <near>0.1</near>
        <far>100</far>
    </object>
</scene>
"##;

/// Runtime representation of a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Scene {
    pub objects: Vec<SceneObject>,
    pub lights: Vec<Light>,
}

impl Scene {
    pub fn from_xml(xml: &str) -> Result<Self> {
        let document = Document::parse(xml).context("invalid scene XML")?;
        let mut objects = Vec::new();

        for node in document.descendants().filter(|n| n.has_tag_name("object")) {
            let mut object = SceneObject::default();
            object.name = required_text(&node, "name")?;
            object.object_type = optional_text(&node, "type").unwrap_or_else(|| "sphere".to_string());
            object.color = parse_color(optional_text(&node, "color"), object.color)
                .with_context(|| format!("object {}", object.name))?;
            object.position = parse_vec3(optional_text(&node, "position"), object.position)?;
            object.fov = parse_f32(optional_text(&node, "fov"), object.fov)?;
            object.near = parse_f32(optional_text(&node, "near"), object.near)?;
            object.far = parse_f32(optional_text(&node, "far"), object.far)?;
            object.intensity = parse_f32(optional_text(&node, "intensity"), object.intensity)?;
            object.radius = parse_f32(optional_text(&node, "radius"), object.radius)?;
            object.segments = parse_segments(optional_text(&node, "segments"), object.segments)?;
            objects.push(object);
        }

        let lights = objects
            .iter()
            .filter(|obj| obj.object_type == "light")
            .map(|obj| Light {
                position: obj.position,
                color: obj.color.to_linear(),
                intensity: obj.intensity,
            })
            .collect();

        Ok(Self { objects, lights })
    }

    pub fn builtin() -> Result<Self> {
        Self::from_xml(DEFAULT_SCENE_XML)
    }

    pub fn sphere(&self) -> Result<&SceneObject> {
        self.find_type("sphere")
            .ok_or_else(|| anyhow!("scene does not contain a sphere"))
    }

    pub fn camera(&self) -> Option<&SceneObject> {
        self.find_type("camera")
    }

    pub fn light(&self) -> Option<&Light> {
        self.lights.first()
    }

    fn find_type(&self, object_type: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.object_type == object_type)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub name: String,
    #[serde(rename = "type")]
    pub object_type: String,
    /// sRGB color as authored.
    #[serde(default = "default_color")]
    pub color: Rgb,
    #[serde(default)]
    pub position: Vec3,
    #[serde(default = "default_fov")]
    pub fov: f32,
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
    #[serde(default = "default_intensity")]
    pub intensity: f32,
    #[serde(default = "default_radius")]
    pub radius: f32,
    #[serde(default = "default_segments")]
    pub segments: (u32, u32),
}

impl Default for SceneObject {
    fn default() -> Self {
        Self {
            name: String::new(),
            object_type: String::new(),
            color: default_color(),
            position: Vec3::ZERO,
            fov: default_fov(),
            near: default_near(),
            far: default_far(),
            intensity: default_intensity(),
            radius: default_radius(),
            segments: default_segments(),
        }
    }
}

impl SceneObject {
    /// Tessellates a `Sphere` object into GPU ready buffers.
    pub fn geometry(&self) -> Result<MeshData> {
        uv_sphere(self.radius, self.segments.0, self.segments.1)
            .with_context(|| format!("failed to build geometry for {}", self.name))
    }
}

fn default_color() -> Rgb {
    Rgb::new(255, 255, 255)
}

fn default_fov() -> f32 {
    50.0
}

fn default_near() -> f32 {
    0.1
}

fn default_far() -> f32 {
    100.0
}

fn default_intensity() -> f32 {
    1.0
}

fn default_radius() -> f32 {
    1.0
}

fn default_segments() -> (u32, u32) {
    (32, 16)
}

/// Point light extracted from the scene object list; color is linear.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

fn required_text(node: &Node<'_, '_>, tag: &str) -> Result<String> {
    optional_text(node, tag).ok_or_else(|| anyhow!("<{tag}> tag is missing"))
}

fn optional_text(node: &Node<'_, '_>, tag: &str) -> Option<String> {
    node.children()
        .find(|child| child.has_tag_name(tag))
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| text.to_string())
}

fn parse_numbers(value: &str, expected: usize, what: &str) -> Result<Vec<f32>> {
    let numbers = value
        .split_whitespace()
        .map(|component| {
            component
                .parse::<f32>()
                .map_err(|err| anyhow!("invalid {what} component {component:?}: {err}"))
        })
        .collect::<Result<Vec<_>>>()?;
    if numbers.len() < expected {
        return Err(anyhow!("{what} is missing components"));
    }
    Ok(numbers)
}

fn parse_vec3(value: Option<String>, default: Vec3) -> Result<Vec3> {
    let Some(value) = value else {
        return Ok(default);
    };
    let numbers = parse_numbers(&value, 3, "vector")?;
    Ok(Vec3::new(numbers[0], numbers[1], numbers[2]))
}

fn parse_color(value: Option<String>, default: Rgb) -> Result<Rgb> {
    let Some(value) = value else {
        return Ok(default);
    };
    if value.starts_with('#') {
        return parse_hex(&value);
    }
    let numbers = parse_numbers(&value, 3, "color")?;
    Ok(Rgb::new(
        numbers[0].round() as i32,
        numbers[1].round() as i32,
        numbers[2].round() as i32,
    ))
}

fn parse_segments(value: Option<String>, default: (u32, u32)) -> Result<(u32, u32)> {
    let Some(value) = value else {
        return Ok(default);
    };
    let numbers = parse_numbers(&value, 2, "segments")?;
    Ok((numbers[0].max(0.0) as u32, numbers[1].max(0.0) as u32))
}

fn parse_f32(value: Option<String>, default: f32) -> Result<f32> {
    match value {
        Some(value) => value
            .parse::<f32>()
            .map_err(|err| anyhow!("failed to parse float: {err}")),
        None => Ok(default),
    }
}
