use crate::*;

#[test]
fn test_config_defaults() {
    let config = GeneratorConfig::from_str("page_size: 25\nskip_path_prefixes: [/oauth2/]\n").unwrap();
    assert_eq!(config.page_size, 25);
    assert_eq!(config.package_name, "kittycad");
    assert_eq!(config.extension_key, "x-rust");
    assert!(config.is_path_skipped("/oauth2/device/auth"));
    assert!(!config.is_path_skipped("/users"));
    assert_eq!(
        config.struct_derive_line(),
        "Debug, Clone, PartialEq, Serialize, Deserialize"
    );
}

#[test]
fn test_config_derives() {
    let config = GeneratorConfig::from_str(r#"{"struct_derives": ["Debug", "Deserialize"]}"#).unwrap();
    assert_eq!(config.struct_derive_line(), "Debug, Deserialize");
}

#[test]
fn test_config_rejects_wrong_types() {
    let err = GeneratorConfig::from_str("page_size: many\n").unwrap_err();
    assert!(matches!(err, GenError::ParseSpec { .. }));
}

#[test]
fn test_skipped_paths_get_no_methods() {
    const SPEC: &str = r##"
paths:
  /oauth2/token:
    post:
      operationId: oauth2_token
      tags: [oauth2]
      responses:
        '204':
          description: ok
  /ping:
    get:
      operationId: ping
      tags: [meta]
      responses:
        '200':
          description: pong
          content:
            application/json:
              schema:
                type: string
"##;

    let openapi = OpenApi::from_str(SPEC).unwrap();
    let config = GeneratorConfig::from_str("skip_path_prefixes: [/oauth2/]").unwrap();
    let mut ctx = GenerationContext::new(&openapi, &config);
    ctx.process_paths().unwrap();

    assert_eq!(ctx.services.keys().collect::<Vec<_>>(), ["Meta"]);
}
