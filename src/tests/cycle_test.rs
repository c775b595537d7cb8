use crate::datatypes::{DataType, Origin, TypeRef};
use crate::tests::{field, struct_fields};
use crate::*;

#[test]
fn test_mutually_recursive_structs_are_boxed() {
    const SCHEMA: &str = r##"
components:
  schemas:
    A:
      type: object
      properties:
        b:
          $ref: '#/components/schemas/B'
    B:
      type: object
      properties:
        a:
          $ref: '#/components/schemas/A'
        siblings:
          type: array
          items:
            $ref: '#/components/schemas/B'
"##;

    let openapi = OpenApi::from_str(SCHEMA).unwrap();
    let config = GeneratorConfig::default();
    let sdk = generate_sdk_sources(&openapi, &config).unwrap();
    let s = &sdk.files[TYPES_FILE];

    assert!(s.contains("pub b: Option<Box<B>>,"));
    assert!(s.contains("pub a: Option<Box<A>>,"));
    // a Vec already breaks the cycle
    assert!(s.contains("pub siblings: Option<Vec<B>>,"));
}

#[test]
fn test_self_referential_alias_terminates() {
    const SCHEMA: &str = r##"
components:
  schemas:
    Forest:
      type: object
      properties:
        trees:
          $ref: '#/components/schemas/Tree'
    Tree:
      type: array
      items:
        $ref: '#/components/schemas/Tree'
"##;

    let openapi = OpenApi::from_str(SCHEMA).unwrap();
    let config = GeneratorConfig::default();
    let mut ctx = GenerationContext::new(&openapi, &config);
    ctx.process_components().unwrap();

    assert!(ctx.is_forward_declared("Tree"));
    match &ctx.types["Tree"].datatype {
        DataType::Alias {
            target, newtype, ..
        } => {
            assert!(*newtype);
            assert_eq!(
                *target,
                TypeRef::Vec(Box::new(TypeRef::named("Tree", Origin::Forward)))
            );
        }
        other => panic!("Tree is not an alias: {other:?}"),
    }
    let fields = struct_fields(&ctx.types, "Forest");
    assert_eq!(
        field(fields, "trees").type_,
        TypeRef::Vec(Box::new(TypeRef::named("Tree", Origin::Forward)))
    );

    let s = generate_sdk_sources(&openapi, &config).unwrap().files[TYPES_FILE].clone();
    assert!(s.contains("#[serde(transparent)]\npub struct Tree(pub Vec<Tree>);"));
}

#[test]
fn test_alias_chain_is_inlined() {
    const SCHEMA: &str = r##"
components:
  schemas:
    Name:
      type: string
      description: A display name.
    Nickname:
      $ref: '#/components/schemas/Name'
    Person:
      type: object
      required: [nickname]
      properties:
        nickname:
          $ref: '#/components/schemas/Nickname'
"##;

    let openapi = OpenApi::from_str(SCHEMA).unwrap();
    let config = GeneratorConfig::default();
    let mut ctx = GenerationContext::new(&openapi, &config);
    ctx.process_components().unwrap();

    let fields = struct_fields(&ctx.types, "Person");
    assert_eq!(
        field(fields, "nickname").type_,
        TypeRef::Builtin(crate::datatypes::Builtin::String)
    );
    assert!(!ctx.is_forward_declared("Name"));
    assert!(!ctx.is_forward_declared("Nickname"));
}
