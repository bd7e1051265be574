//! The Load stage: parses the declarative XML source into a
//! `ComponentDescription`.
//!
//! Recognised root sections are dispatched through an explicit
//! `{namespace}:{localname}` -> parser-function table built at startup;
//! unrecognised root elements are ignored. Parse errors attach to a source
//! position and never abort sibling parsing.

use super::context::CompileContext;
use super::diagnostics::{Diagnostic, SourcePosition, SourceRange};
use crate::condition::{ConditionTree, is_valid_property_name, parse_conditions};
use crate::description::{
    AutoRotateOptions, ComponentConfiguration, ComponentDescription, ComponentMetadata,
    ComponentPoint, ConnectionDescription, ConnectionEdge, ConnectionGroup, DescriptionRegistry,
    PointSeed, PropertyDescription, RenderCommand, RenderGroup, TextAlignment, TextValue,
    parse_path_data,
};
use crate::condition::PropertyValue;
use ahash::AHashMap;
use roxmltree::{Document, Node};
use std::io::Read;

/// The namespace recognised sections must live in.
pub const COMPONENT_NAMESPACE: &str = "http://schemas.kairo.dev/component";

type SectionParser = fn(&mut LoadState<'_, '_>, Node<'_, '_>);

/// The explicit section-dispatch table. Built once per compile call; no
/// reflection, no container.
pub(super) struct SectionRegistry {
    parsers: AHashMap<String, SectionParser>,
}

impl SectionRegistry {
    pub(super) fn with_default_sections() -> Self {
        let mut parsers: AHashMap<String, SectionParser> = AHashMap::new();
        parsers.insert(section_key("declaration"), parse_declaration);
        parsers.insert(section_key("connections"), parse_connections);
        parsers.insert(section_key("render"), parse_render);
        parsers.insert(section_key("properties"), parse_properties);
        parsers.insert(section_key("definitions"), parse_properties);
        Self { parsers }
    }

    fn get(&self, namespace: &str, local: &str) -> Option<SectionParser> {
        self.parsers
            .get(&format!("{namespace}:{local}"))
            .copied()
    }
}

fn section_key(local: &str) -> String {
    format!("{COMPONENT_NAMESPACE}:{local}")
}

pub(super) struct LoadState<'d, 'i> {
    doc: &'d Document<'i>,
    name: Option<String>,
    min_size: Option<f64>,
    metadata: ComponentMetadata,
    properties: Vec<PropertyDescription>,
    connections: Vec<ConnectionGroup<PointSeed>>,
    render: Vec<RenderGroup>,
    diagnostics: Vec<Diagnostic>,
}

impl<'d, 'i> LoadState<'d, 'i> {
    fn new(doc: &'d Document<'i>) -> Self {
        Self {
            doc,
            name: None,
            min_size: None,
            metadata: ComponentMetadata::default(),
            properties: Vec::new(),
            connections: Vec::new(),
            render: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    fn range_of(&self, node: Node<'_, '_>) -> SourceRange {
        let range = node.range();
        let start = self.doc.text_pos_at(range.start);
        let end = self.doc.text_pos_at(range.end);
        SourceRange {
            start: SourcePosition {
                line: start.row,
                column: start.col,
            },
            end: SourcePosition {
                line: end.row,
                column: end.col,
            },
        }
    }

    fn error_at(&mut self, node: Node<'_, '_>, message: impl Into<String>) {
        let range = self.range_of(node);
        self.diagnostics.push(Diagnostic::error(message).at(range));
    }
}

/// Runs the Load stage. On structural failure the context keeps no
/// description and later stages are skipped.
pub(super) fn run(
    ctx: &mut CompileContext<'_>,
    registry: &mut DescriptionRegistry,
    sections: &SectionRegistry,
) {
    let mut source = String::new();
    if let Err(e) = ctx.input.read_to_string(&mut source) {
        ctx.report(Diagnostic::error(format!("Failed to read source: {e}")));
        return;
    }

    let doc = match Document::parse(&source) {
        Ok(doc) => doc,
        Err(e) => {
            ctx.report(Diagnostic::error(format!(
                "Source is not well-formed XML: {e}"
            )));
            return;
        }
    };

    let root = doc.root_element();
    if root.tag_name().name() != "component"
        || root.tag_name().namespace() != Some(COMPONENT_NAMESPACE)
    {
        ctx.report(Diagnostic::error(
            "Root element is not a component declaration",
        ));
        return;
    }

    let mut state = LoadState::new(&doc);
    for child in root.children().filter(Node::is_element) {
        let namespace = child.tag_name().namespace().unwrap_or("");
        match sections.get(namespace, child.tag_name().name()) {
            Some(parser) => parser(&mut state, child),
            None => {
                tracing::debug!(element = child.tag_name().name(), "ignoring unrecognised root element");
            }
        }
    }

    let LoadState {
        name,
        min_size,
        metadata,
        properties,
        connections,
        render,
        diagnostics,
        ..
    } = state;
    ctx.diagnostics.extend(diagnostics);

    let Some(name) = name else {
        ctx.report(Diagnostic::error(
            "Declaration is missing the component name",
        ));
        return;
    };
    for (field, present) in [
        ("guid", !metadata.guid.is_empty()),
        ("author", !metadata.author.is_empty()),
        ("version", !metadata.version.is_empty()),
    ] {
        if !present {
            ctx.report(Diagnostic::error(format!(
                "Declaration is missing the required '{field}' meta"
            )));
        }
    }
    if min_size.is_none() {
        ctx.report(Diagnostic::error(
            "Declaration is missing the required 'minsize' meta",
        ));
    }

    // The source carries no identifier; one is assigned per load session.
    let local_id = registry.allocate(&name);
    tracing::debug!(component = %name, local_id, "description loaded");

    ctx.description = Some(ComponentDescription {
        local_id,
        name,
        min_size: min_size.unwrap_or_default(),
        properties,
        connections,
        render,
        metadata,
    });
}

fn parse_declaration(state: &mut LoadState<'_, '_>, node: Node<'_, '_>) {
    for child in node.children().filter(Node::is_element) {
        match child.tag_name().name() {
            "meta" => parse_meta(state, child),
            "property" => parse_property(state, child),
            "configuration" => parse_configuration(state, child),
            other => {
                tracing::debug!(element = other, "ignoring unknown declaration element");
            }
        }
    }
}

fn parse_meta(state: &mut LoadState<'_, '_>, node: Node<'_, '_>) {
    let (Some(name), Some(value)) = (node.attribute("name"), node.attribute("value")) else {
        state.error_at(node, "Meta element requires 'name' and 'value' attributes");
        return;
    };
    match name {
        "name" => state.name = Some(value.to_string()),
        "guid" => state.metadata.guid = value.to_string(),
        "author" => state.metadata.author = value.to_string(),
        "version" => state.metadata.version = value.to_string(),
        "minsize" => match value.parse::<f64>() {
            Ok(size) => state.min_size = Some(size),
            Err(_) => state.error_at(node, format!("Malformed minsize value '{value}'")),
        },
        other => {
            tracing::debug!(meta = other, "ignoring unknown meta");
        }
    }
}

fn parse_properties(state: &mut LoadState<'_, '_>, node: Node<'_, '_>) {
    for child in node.children().filter(Node::is_element) {
        if child.tag_name().name() == "property" {
            parse_property(state, child);
        }
    }
}

fn parse_property(state: &mut LoadState<'_, '_>, node: Node<'_, '_>) {
    let Some(name) = node.attribute("name") else {
        state.error_at(node, "Property element requires a 'name' attribute");
        return;
    };
    if !is_valid_property_name(name) {
        state.error_at(node, format!("Invalid property name '{name}'"));
        return;
    }
    let default = node
        .attribute("default")
        .map(PropertyValue::parse)
        .unwrap_or(PropertyValue::String(String::new()));

    let mut property = PropertyDescription::new(name, default);
    if let Some(display) = node.attribute("display") {
        property.display_name = display.to_string();
    }
    if let Some(serialize) = node.attribute("serialize") {
        property.serialize_as = serialize.to_string();
    }

    let options: Vec<PropertyValue> = node
        .children()
        .filter(Node::is_element)
        .filter(|c| c.tag_name().name() == "option")
        .filter_map(|c| c.attribute("value"))
        .map(PropertyValue::parse)
        .collect();
    if !options.is_empty() {
        property.options = Some(options);
    }

    state.properties.push(property);
}

fn parse_configuration(state: &mut LoadState<'_, '_>, node: Node<'_, '_>) {
    let Some(name) = node.attribute("name") else {
        state.error_at(node, "Configuration element requires a 'name' attribute");
        return;
    };
    let mut setters = Vec::new();
    for child in node.children().filter(Node::is_element) {
        if child.tag_name().name() != "set" {
            continue;
        }
        let (Some(property), Some(value)) = (child.attribute("property"), child.attribute("value"))
        else {
            state.error_at(child, "Set element requires 'property' and 'value' attributes");
            continue;
        };
        setters.push((property.to_string(), PropertyValue::parse(value)));
    }
    state.metadata.configurations.push(ComponentConfiguration {
        name: name.to_string(),
        setters,
        icon: None,
    });
}

fn parse_connections(state: &mut LoadState<'_, '_>, node: Node<'_, '_>) {
    for group_node in node.children().filter(Node::is_element) {
        if group_node.tag_name().name() != "group" {
            continue;
        }
        let conditions = parse_condition_attr(state, group_node);
        let auto_rotate = parse_auto_rotate_attrs(state, group_node);

        let mut connections = Vec::new();
        for child in group_node.children().filter(Node::is_element) {
            if child.tag_name().name() != "connection" {
                continue;
            }
            let Some(start) = parse_point_seed(state, child, "start") else {
                continue;
            };
            let Some(end) = parse_point_seed(state, child, "end") else {
                continue;
            };
            let edge = match ConnectionEdge::parse(child.attribute("edge").unwrap_or("")) {
                Ok(edge) => edge,
                Err(e) => {
                    state.error_at(child, e.to_string());
                    continue;
                }
            };
            connections.push(ConnectionDescription {
                start,
                end,
                edge,
                name: child.attribute("name").unwrap_or("").to_string(),
            });
        }

        state.connections.push(ConnectionGroup {
            conditions,
            connections,
            auto_rotate,
        });
    }
}

fn parse_render(state: &mut LoadState<'_, '_>, node: Node<'_, '_>) {
    for child in node.children().filter(Node::is_element) {
        if child.tag_name().name() == "group" {
            let group = parse_render_group(state, child, false);
            state.render.push(group);
        }
    }
}

fn parse_render_group(state: &mut LoadState<'_, '_>, node: Node<'_, '_>, nested: bool) -> RenderGroup {
    let conditions = parse_condition_attr(state, node);
    let mut auto_rotate = parse_auto_rotate_attrs(state, node);
    if nested && auto_rotate.is_enabled() {
        state.error_at(node, "Auto-rotate can only be declared on top-level groups");
        auto_rotate = AutoRotateOptions::off();
    }

    let mut group = RenderGroup {
        conditions,
        auto_rotate,
        commands: Vec::new(),
        children: Vec::new(),
    };

    for child in node.children().filter(Node::is_element) {
        match child.tag_name().name() {
            "group" => {
                let nested_group = parse_render_group(state, child, true);
                group.children.push(nested_group);
            }
            "line" => {
                if let (Some(start), Some(end)) = (
                    parse_point_seed(state, child, "start"),
                    parse_point_seed(state, child, "end"),
                ) {
                    group.commands.push(RenderCommand::Line {
                        start,
                        end,
                        thickness: parse_f64_attr(state, child, "thickness", 2.0),
                    });
                }
            }
            "rect" => {
                if let Some(top_left) = parse_point_seed(state, child, "location") {
                    group.commands.push(RenderCommand::Rectangle {
                        top_left,
                        width: parse_f64_attr(state, child, "width", 0.0),
                        height: parse_f64_attr(state, child, "height", 0.0),
                        thickness: parse_f64_attr(state, child, "thickness", 2.0),
                        fill: child.attribute("fill") == Some("true"),
                    });
                }
            }
            "ellipse" => {
                if let Some(center) = parse_point_seed(state, child, "center") {
                    group.commands.push(RenderCommand::Ellipse {
                        center,
                        radius_x: parse_f64_attr(state, child, "rx", 0.0),
                        radius_y: parse_f64_attr(state, child, "ry", 0.0),
                        thickness: parse_f64_attr(state, child, "thickness", 2.0),
                        fill: child.attribute("fill") == Some("true"),
                    });
                }
            }
            "path" => {
                let Some(start) = parse_point_seed(state, child, "start") else {
                    continue;
                };
                let commands = match parse_path_data(child.attribute("data").unwrap_or("")) {
                    Ok(commands) => commands,
                    Err(e) => {
                        state.error_at(child, e.to_string());
                        continue;
                    }
                };
                group.commands.push(RenderCommand::Path {
                    start,
                    commands,
                    thickness: parse_f64_attr(state, child, "thickness", 2.0),
                    fill: child.attribute("fill") == Some("true"),
                });
            }
            "text" => {
                let Some(location) = parse_point_seed(state, child, "location") else {
                    continue;
                };
                let alignment = match TextAlignment::parse(
                    child.attribute("align").unwrap_or("center"),
                ) {
                    Ok(alignment) => alignment,
                    Err(e) => {
                        state.error_at(child, e.to_string());
                        continue;
                    }
                };
                group.commands.push(RenderCommand::Text {
                    location,
                    alignment,
                    size: parse_f64_attr(state, child, "size", 12.0),
                    value: TextValue::parse(child.attribute("value").unwrap_or("")),
                });
            }
            other => {
                tracing::debug!(element = other, "ignoring unknown render element");
            }
        }
    }
    group
}

fn parse_condition_attr(state: &mut LoadState<'_, '_>, node: Node<'_, '_>) -> ConditionTree {
    match parse_conditions(node.attribute("conditions").unwrap_or("")) {
        Ok(tree) => tree,
        Err(e) => {
            state.error_at(node, e.to_string());
            ConditionTree::Empty
        }
    }
}

fn parse_auto_rotate_attrs(state: &mut LoadState<'_, '_>, node: Node<'_, '_>) -> AutoRotateOptions {
    match AutoRotateOptions::parse(node.attribute("autorotate"), node.attribute("flip")) {
        Ok(options) => options,
        Err(e) => {
            state.error_at(node, e.to_string());
            AutoRotateOptions::off()
        }
    }
}

/// Parses a point attribute and its optional `<attr>-x`/`<attr>-y` template
/// attributes into a seed.
fn parse_point_seed(
    state: &mut LoadState<'_, '_>,
    node: Node<'_, '_>,
    attr: &str,
) -> Option<PointSeed> {
    let Some(text) = node.attribute(attr) else {
        state.error_at(node, format!("Element requires a '{attr}' attribute"));
        return None;
    };
    let base = match ComponentPoint::parse(text) {
        Ok(point) => point,
        Err(e) => {
            state.error_at(node, e.to_string());
            return None;
        }
    };
    let template_x = template_attr(state, node, &format!("{attr}-x"));
    let template_y = template_attr(state, node, &format!("{attr}-y"));
    Some(PointSeed {
        base,
        template_x,
        template_y,
    })
}

fn template_attr(state: &mut LoadState<'_, '_>, node: Node<'_, '_>, attr: &str) -> Option<String> {
    let value = node.attribute(attr)?;
    match value.strip_prefix('$') {
        Some(name) if is_valid_property_name(name) => Some(name.to_string()),
        _ => {
            state.error_at(
                node,
                format!("Offset template '{value}' must name a property as '$name'"),
            );
            None
        }
    }
}

fn parse_f64_attr(
    state: &mut LoadState<'_, '_>,
    node: Node<'_, '_>,
    attr: &str,
    default: f64,
) -> f64 {
    match node.attribute(attr) {
        None => default,
        Some(text) => match text.parse() {
            Ok(value) => value,
            Err(_) => {
                state.error_at(node, format!("Malformed number '{text}' in '{attr}'"));
                default
            }
        },
    }
}
