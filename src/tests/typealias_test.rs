use crate::*;

#[test]
fn test_array_alias() {
    const SCHEMA: &str = r##"
components:
  schemas:
    Pet:
      type: object
      properties:
        id:
          type: integer
          format: int64
        name:
          type: string
        tag:
          type: string
      required:
        - id
        - name
        - tag
    Pets:
      type: array
      items:
        $ref: '#/components/schemas/Pet'
"##;

    let openapi = OpenApi::from_str(SCHEMA).unwrap();
    let config = GeneratorConfig::default();
    let sdk = generate_sdk_sources(&openapi, &config).unwrap();
    let s = &sdk.files[TYPES_FILE];

    assert!(s.contains("pub type Pets = Vec<Pet>;"));
    assert!(s.contains("pub id: i64,"));
    assert!(s.contains("pub tag: String,"));
}

#[test]
fn test_map_alias() {
    const SCHEMA: &str = r##"
components:
  schemas:
    Labels:
      description: Free-form labels.
      type: object
      additionalProperties:
        type: string
    Counters:
      type: object
      additionalProperties: true
"##;

    let openapi = OpenApi::from_str(SCHEMA).unwrap();
    let config = GeneratorConfig::default();
    let sdk = generate_sdk_sources(&openapi, &config).unwrap();
    let s = &sdk.files[TYPES_FILE];

    assert!(s.contains("/// Free-form labels.\npub type Labels = std::collections::BTreeMap<String, String>;"));
    assert!(s.contains("pub type Counters = std::collections::BTreeMap<String, serde_json::Value>;"));
}
