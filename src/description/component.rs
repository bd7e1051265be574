use super::connection::{AutoRotateOptions, ConnectionGroup};
use super::point::{PointSeed, Vector};
use super::render::RenderCommand;
use crate::condition::{ConditionTree, EvaluationContext, PropertyValue};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// A user-settable property of a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDescription {
    pub name: String,
    pub display_name: String,
    /// Name used when the property is stored in documents and configurations.
    pub serialize_as: String,
    pub default: PropertyValue,
    /// When present, the property only takes one of these values, and may
    /// drive offset templates.
    pub options: Option<Vec<PropertyValue>>,
}

impl PropertyDescription {
    pub fn new(name: &str, default: PropertyValue) -> Self {
        Self {
            name: name.to_string(),
            display_name: name.to_string(),
            serialize_as: name.to_string(),
            default,
            options: None,
        }
    }

    pub fn with_options(mut self, options: Vec<PropertyValue>) -> Self {
        self.options = Some(options);
        self
    }
}

/// A named preset of property values, shown as its own toolbox entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentConfiguration {
    pub name: String,
    pub setters: Vec<(String, PropertyValue)>,
    pub icon: Option<IconSet>,
}

/// One rendering of an icon at a fixed resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IconResolution {
    pub size: u32,
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// A multi-resolution icon.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IconSet {
    pub resolutions: Vec<IconResolution>,
}

/// Descriptive metadata carried alongside the geometry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComponentMetadata {
    pub guid: String,
    pub author: String,
    pub version: String,
    pub configurations: Vec<ComponentConfiguration>,
    pub icon: Option<IconSet>,
}

/// A conditionally-applicable set of render commands. Groups nest; child
/// conditions AND with their ancestors during flattening.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderGroup {
    pub conditions: ConditionTree,
    pub auto_rotate: AutoRotateOptions,
    pub commands: Vec<RenderCommand<PointSeed>>,
    pub children: Vec<RenderGroup>,
}

impl RenderGroup {
    pub fn new(conditions: ConditionTree) -> Self {
        Self {
            conditions,
            auto_rotate: AutoRotateOptions::off(),
            commands: Vec::new(),
            children: Vec::new(),
        }
    }
}

/// The complete, canonical description of one component, built once by the
/// Load stage. Immutable afterwards except for icon attachment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDescription {
    /// Session-local identifier from the loading registry; the declarative
    /// source carries none.
    pub local_id: u32,
    pub name: String,
    pub min_size: f64,
    pub properties: Vec<PropertyDescription>,
    pub connections: Vec<ConnectionGroup<PointSeed>>,
    pub render: Vec<RenderGroup>,
    pub metadata: ComponentMetadata,
}

impl ComponentDescription {
    pub fn new(local_id: u32, name: &str) -> Self {
        Self {
            local_id,
            name: name.to_string(),
            min_size: 0.0,
            properties: Vec::new(),
            connections: Vec::new(),
            render: Vec::new(),
            metadata: ComponentMetadata::default(),
        }
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDescription> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Attaches a compiled icon to the description or one of its
    /// configurations.
    pub fn set_icon(&mut self, configuration: Option<&str>, icon: IconSet) {
        match configuration {
            None => self.metadata.icon = Some(icon),
            Some(name) => {
                if let Some(config) = self
                    .metadata
                    .configurations
                    .iter_mut()
                    .find(|c| c.name == name)
                {
                    config.icon = Some(icon);
                }
            }
        }
    }
}

/// Allocates session-local description identifiers.
///
/// Constructed by the caller and handed into load/compile calls; its
/// lifetime is one load session. There is no process-wide registry.
#[derive(Debug, Default)]
pub struct DescriptionRegistry {
    next_id: u32,
    names: AHashMap<u32, String>,
}

impl DescriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self, name: &str) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.names.insert(id, name.to_string());
        id
    }

    pub fn name(&self, id: u32) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// The orientation of a placed instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn is_horizontal(self) -> bool {
        self == Orientation::Horizontal
    }
}

/// A placed component instance: where it sits, how long it is, which way it
/// points, and any property overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentInstance {
    pub location: Vector,
    pub size: f64,
    pub orientation: Orientation,
    pub properties: AHashMap<String, PropertyValue>,
}

impl ComponentInstance {
    pub fn new(location: Vector, size: f64, orientation: Orientation) -> Self {
        Self {
            location,
            size,
            orientation,
            properties: AHashMap::new(),
        }
    }

    pub fn with_property(mut self, name: &str, value: PropertyValue) -> Self {
        self.properties.insert(name.to_string(), value);
        self
    }

    /// Extent along the X axis: the instance size when horizontal.
    pub fn extent_x(&self) -> f64 {
        if self.orientation.is_horizontal() {
            self.size
        } else {
            0.0
        }
    }

    /// Extent along the Y axis: the instance size when vertical.
    pub fn extent_y(&self) -> f64 {
        if self.orientation.is_horizontal() {
            0.0
        } else {
            self.size
        }
    }

    /// Builds the bindings this instance presents to condition evaluation:
    /// description defaults, instance overrides, and the `horizontal` state.
    pub fn evaluation_context(&self, description: &ComponentDescription) -> EvaluationContext {
        let mut ctx = EvaluationContext::new();
        for property in &description.properties {
            ctx.set_property(property.name.clone(), property.default.clone());
        }
        for (name, value) in &self.properties {
            ctx.set_property(name.clone(), value.clone());
        }
        ctx.set_state("horizontal", self.orientation.is_horizontal());
        ctx
    }
}
