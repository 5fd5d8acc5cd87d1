use hier_config::{json_schema, json_schema_string};

#[test]
fn schema_describes_every_section() {
    let schema = json_schema();
    let object = schema.schema.object.as_ref().expect("object schema");
    for section in ["build", "codec", "logging"] {
        assert!(object.properties.contains_key(section), "missing {section}");
    }

    let text = json_schema_string().unwrap();
    assert!(text.contains("cancel_check_interval"));
    assert!(text.contains("max_payload_bytes"));
}
