use crate::diff::PatchOperation;
use crate::*;
use std::fs;

const SPEC: &str = r##"
openapi: 3.0.3
info:
  title: KittyCAD API
  version: 0.1.0
tags:
  - name: meta
    description: Meta information about the API.
paths:
  /ping:
    get:
      operationId: ping
      tags: [meta]
      summary: Return pong.
      responses:
        '200':
          description: successful operation
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Pong'
components:
  schemas:
    Pong:
      type: object
      required: [message]
      properties:
        message:
          type: string
"##;

#[test]
fn test_generate_sdk_writes_every_file() {
    let dir = tempfile::tempdir().unwrap();
    let spec_path = dir.path().join("spec.yaml");
    fs::write(&spec_path, SPEC).unwrap();
    let out = dir.path().join("sdk");

    let config = GeneratorConfig::default();
    let patch = generate_sdk(&spec_path, &out, &config).unwrap();

    for file in [CLIENT_FILE, TYPES_FILE, PATHS_FILE, PAGINATION_FILE, config.patch_file.as_str()] {
        assert!(out.join(file).is_file(), "{file} was not written");
    }
    let types = fs::read_to_string(out.join(TYPES_FILE)).unwrap();
    assert!(types.starts_with("//! # Data types"));
    assert!(types.contains("pub struct Pong {"));

    // the patch only adds, and the spec itself is left alone
    assert!(patch.operations().iter().all(|op| !op.is_remove()));
    let paths: Vec<&str> = patch.operations().iter().map(PatchOperation::path).collect();
    assert_eq!(paths, ["/info/x-rust", "/paths/~1ping/get/x-rust"]);
    assert_eq!(fs::read_to_string(&spec_path).unwrap(), SPEC);

    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join(&config.patch_file)).unwrap()).unwrap();
    assert_eq!(written, serde_json::to_value(&patch).unwrap());
    let example = written[1]["value"]["example"].as_str().unwrap();
    assert!(example.contains("let result = client.metas().ping().await?;"));
}

#[test]
fn test_generation_is_deterministic() {
    for spec in [SPEC, super::operations_test::SPEC] {
        let openapi = OpenApi::from_str(spec).unwrap();
        let config = GeneratorConfig::default();
        let first = generate_sdk_sources(&openapi, &config).unwrap();
        let second = generate_sdk_sources(&openapi, &config).unwrap();
        assert_eq!(first.files, second.files);
        assert_eq!(first.annotations.operations, second.annotations.operations);
    }
}

#[test]
fn test_pipeline_output_is_byte_identical_across_runs() {
    let config = GeneratorConfig::default();
    let dir = tempfile::tempdir().unwrap();
    let spec_path = dir.path().join("spec.yaml");
    fs::write(&spec_path, super::operations_test::SPEC).unwrap();

    let run = |out: &str| {
        let out_dir = dir.path().join(out);
        let patch = generate_sdk(&spec_path, &out_dir, &config).unwrap();
        let files: Vec<(String, String)> = [TYPES_FILE, CLIENT_FILE, PATHS_FILE, PAGINATION_FILE, config.patch_file.as_str()]
            .into_iter()
            .map(|name| (name.to_owned(), fs::read_to_string(out_dir.join(name)).unwrap()))
            .collect();
        (patch, files)
    };
    let (first_patch, first_files) = run("first");
    let (second_patch, second_files) = run("second");

    assert_eq!(first_patch, second_patch);
    assert_eq!(first_files, second_files);
    // one entry per operation plus the info block; the wrapper shares its base's
    assert_eq!(first_patch.operations().len(), 8);
    let types_rs = &first_files[0].1;
    assert!(types_rs.contains("pub enum FileConversionOutput {"));
    assert!(types_rs.contains("pub enum CreatedAtSortMode {"));
}

#[test]
fn test_missing_spec_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = generate_sdk(dir.path().join("nope.json"), dir.path(), &GeneratorConfig::default()).unwrap_err();
    assert!(matches!(err, GenError::ReadSpec { .. }));
    assert!(!err.is_spec_structure());
}
