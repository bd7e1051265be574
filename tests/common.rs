//! Common test utilities for building component descriptions and instances.
use kairo::codec::{MemorySigner, MemoryVerifier};
use kairo::condition::{ConditionTree, PropertyValue, parse_conditions};
use kairo::description::*;
use rsa::RsaPrivateKey;

/// A minimal valid declarative source describing a wire.
#[allow(dead_code)]
pub const WIRE_SOURCE: &str = r#"
<component xmlns="http://schemas.kairo.dev/component">
  <declaration>
    <meta name="name" value="Wire"/>
    <meta name="guid" value="6353882b-5208-4f88-983c-18730c6efc4e"/>
    <meta name="author" value="Component Tests"/>
    <meta name="version" value="1.0"/>
    <meta name="minsize" value="20"/>
  </declaration>
  <connections>
    <group autorotate="hv">
      <connection start="_Start" end="_End" edge="both" name="a"/>
    </group>
  </connections>
  <render>
    <group autorotate="hv">
      <line start="_Start" end="_End" thickness="2"/>
    </group>
  </render>
</component>
"#;

/// Builds a resistor-like description programmatically: one enumerated
/// property, one auto-rotated connection group, and a body with a label.
#[allow(dead_code)]
pub fn resistor_description() -> ComponentDescription {
    let mut description = ComponentDescription::new(0, "Resistor");
    description.min_size = 40.0;
    description.metadata.guid = "f4d9bcbe-c74e-4050-93b7-7b0217f29a91".to_string();
    description.metadata.author = "Component Tests".to_string();
    description.metadata.version = "1.1".to_string();

    description.properties.push(PropertyDescription::new(
        "Resistance",
        PropertyValue::Number(4700.0),
    ));

    let mut group = ConnectionGroup {
        conditions: ConditionTree::Empty,
        connections: Vec::new(),
        auto_rotate: AutoRotateOptions::horizontal_to_vertical(),
    };
    group.connections.push(ConnectionDescription {
        start: PointSeed::fixed(ComponentPoint::anchored(ComponentPosition::Start)),
        end: PointSeed::fixed(ComponentPoint::anchored(ComponentPosition::End)),
        edge: ConnectionEdge::Both,
        name: "a".to_string(),
    });
    description.connections.push(group);

    let mut render = RenderGroup::new(ConditionTree::Empty);
    render.auto_rotate = AutoRotateOptions::horizontal_to_vertical();
    render.commands.push(RenderCommand::Line {
        start: PointSeed::fixed(ComponentPoint::anchored(ComponentPosition::Start)),
        end: PointSeed::fixed(ComponentPoint::anchored(ComponentPosition::End)),
        thickness: 2.0,
    });
    render.commands.push(RenderCommand::Text {
        location: PointSeed::fixed(ComponentPoint::new(
            ComponentPosition::Middle,
            ComponentPosition::Middle,
            Vector::new(0.0, -8.0),
        )),
        alignment: TextAlignment::BottomCenter,
        size: 10.0,
        value: TextValue::Property("Resistance".to_string()),
    });
    description.render.push(render);

    description
}

/// A description whose single connection runs `_Start` -> `_Start+45x` with
/// edge at the start only, matching the positioning worked example.
#[allow(dead_code)]
pub fn worked_example_description() -> ComponentDescription {
    let mut description = ComponentDescription::new(0, "Probe");
    description.min_size = 100.0;
    description.connections.push(ConnectionGroup {
        conditions: ConditionTree::Empty,
        connections: vec![ConnectionDescription {
            start: PointSeed::fixed(ComponentPoint::anchored(ComponentPosition::Start)),
            end: PointSeed::fixed(ComponentPoint::new(
                ComponentPosition::Start,
                ComponentPosition::Start,
                Vector::new(45.0, 0.0),
            )),
            edge: ConnectionEdge::Start,
            name: "tip".to_string(),
        }],
        auto_rotate: AutoRotateOptions::off(),
    });
    description
}

#[allow(dead_code)]
pub fn horizontal_instance(size: f64) -> ComponentInstance {
    ComponentInstance::new(Vector::ZERO, size, Orientation::Horizontal)
}

#[allow(dead_code)]
pub fn vertical_instance(size: f64) -> ComponentInstance {
    ComponentInstance::new(Vector::ZERO, size, Orientation::Vertical)
}

/// Parses condition text, panicking on failure.
#[allow(dead_code)]
pub fn conditions(text: &str) -> ConditionTree {
    parse_conditions(text).expect("condition text should parse")
}

/// Generates an in-memory RSA signer plus a verifier for its public key.
/// The certificate is opaque test bytes; trust is decided by membership.
#[allow(dead_code)]
pub fn test_signer() -> (MemorySigner, MemoryVerifier) {
    let key = RsaPrivateKey::new(&mut rand::thread_rng(), 1024).expect("RSA key generation");
    let signer = MemorySigner::new(key.clone(), b"unit-test-certificate".to_vec());
    let verifier = MemoryVerifier::new(key.to_public_key());
    (signer, verifier)
}
