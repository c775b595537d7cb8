use crate::datatypes::{Builtin, IntFormat, Origin, TypeRef};
use crate::openapi::{HttpMethod, ParameterLocation};
use crate::operations::{BodyKind, ResponseKind};
use crate::*;

pub(crate) const SPEC: &str = r##"
info:
  title: KittyCAD API
  version: 0.1.0
tags:
  - name: api-calls
    description: API calls that have been performed by users.
  - name: file
    description: CAD file operations.
paths:
  /api-calls:
    get:
      operationId: list_api_calls
      tags: [api-calls]
      summary: List API calls.
      description: This endpoint requires authentication by a KittyCAD employee.
      parameters:
        - name: limit
          in: query
          description: Maximum number of items returned by a single call
          schema:
            type: integer
            format: uint32
        - name: page_token
          in: query
          description: Token returned by previous call to retrieve the subsequent page
          schema:
            type: string
        - name: sort_by
          in: query
          schema:
            $ref: '#/components/schemas/CreatedAtSortMode'
      responses:
        '200':
          description: successful operation
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/ApiCallResultsPage'
  /api-calls/{id}:
    parameters:
      - name: id
        in: path
        required: true
        description: The ID of the API call.
        schema:
          type: string
    get:
      operationId: get_api_call
      tags: [api-calls]
      responses:
        '200':
          description: successful operation
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/ApiCall'
    delete:
      operationId: delete_api_call
      tags: [api-calls]
      deprecated: true
      responses:
        '204':
          description: successful deletion
  /file/conversion/{src_format}/{output_format}:
    post:
      operationId: create_file_conversion
      tags: [file]
      parameters:
        - name: output_format
          in: path
          required: true
          schema:
            type: string
        - name: src_format
          in: path
          required: true
          schema:
            type: string
      requestBody:
        required: true
        content:
          application/octet-stream:
            schema:
              type: string
              format: binary
      responses:
        '201':
          description: successful creation
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/ApiCall'
  /file/conversions/{id}:
    get:
      operationId: get_file_conversion
      tags: [file]
      parameters:
        - name: id
          in: path
          required: true
          schema:
            type: string
      responses:
        '200':
          description: raw export
          content:
            application/octet-stream:
              schema:
                type: string
                format: binary
  /logout:
    post:
      operationId: logout
      tags: [file]
      responses:
        '200':
          description: empty
          content:
            application/json:
              schema:
                title: "Null"
                type: string
                enum: [null]
                nullable: true
  /user:
    put:
      operationId: update_user_self
      tags: [users]
      requestBody:
        description: The user to update.
        content:
          application/json:
            schema:
              type: object
              properties:
                company:
                  type: string
      responses:
        '200':
          description: successful operation
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/ApiCall'
components:
  schemas:
    ApiCall:
      type: object
      required: [id]
      properties:
        id:
          type: string
          format: uuid
    ApiCallResultsPage:
      type: object
      required: [items]
      properties:
        items:
          type: array
          items:
            $ref: '#/components/schemas/ApiCall'
        next_page:
          type: string
          nullable: true
    CreatedAtSortMode:
      type: string
      enum: [created_at_ascending, created_at_descending]
    FileConversionOutput:
      oneOf:
        - type: object
          required: [type]
          properties:
            type:
              type: string
              enum: [pending]
        - type: object
          required: [type, url]
          properties:
            type:
              type: string
              enum: [done]
            url:
              type: string
              format: uri
"##;

fn generate(spec: &str) -> (OpenApi, GeneratorConfig) {
    (OpenApi::from_str(spec).unwrap(), GeneratorConfig::default())
}

#[test]
fn test_services_by_tag() {
    let (openapi, config) = generate(SPEC);
    let mut ctx = GenerationContext::new(&openapi, &config);
    ctx.process_components().unwrap();
    ctx.process_paths().unwrap();

    assert_eq!(
        ctx.services.keys().collect::<Vec<_>>(),
        ["APICall", "File", "User"]
    );
    let api_calls = &ctx.services["APICall"];
    assert_eq!(api_calls.name, "APICallService");
    assert_eq!(api_calls.accessor, "api_calls");
    assert_eq!(api_calls.description, "API calls that have been performed by users.");
    assert_eq!(
        api_calls.methods.keys().collect::<Vec<_>>(),
        ["delete", "get", "list", "list_all_pages"]
    );
    assert_eq!(
        ctx.services["File"].methods.keys().collect::<Vec<_>>(),
        ["create_conversion", "get_conversion", "logout"]
    );
    assert_eq!(
        ctx.services["User"].methods.keys().collect::<Vec<_>>(),
        ["update_self"]
    );
}

#[test]
fn test_method_parameters() {
    let (openapi, config) = generate(SPEC);
    let mut ctx = GenerationContext::new(&openapi, &config);
    ctx.process_components().unwrap();
    ctx.process_paths().unwrap();

    let list = &ctx.services["APICall"].methods["list"];
    let names: Vec<&str> = list.params.iter().map(|p| p.rust_name.as_str()).collect();
    assert_eq!(names, ["limit", "page_token", "sort_by"]);
    assert!(list.params.iter().all(|p| p.location == ParameterLocation::Query && !p.required));
    assert_eq!(list.params[0].type_, TypeRef::Builtin(Builtin::Integer(IntFormat::U32)));
    assert_eq!(
        list.params[2].type_,
        TypeRef::named("CreatedAtSortMode", Origin::Schema)
    );

    // path-level parameters are merged in, path order wins over declaration order
    let get = &ctx.services["APICall"].methods["get"];
    assert_eq!(get.params.len(), 1);
    assert!(get.params[0].required);
    let create = &ctx.services["File"].methods["create_conversion"];
    let names: Vec<&str> = create.params.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["src_format", "output_format"]);
}

#[test]
fn test_bodies_and_responses() {
    let (openapi, config) = generate(SPEC);
    let mut ctx = GenerationContext::new(&openapi, &config);
    ctx.process_components().unwrap();
    ctx.process_paths().unwrap();

    let create = &ctx.services["File"].methods["create_conversion"];
    assert_eq!(create.http_method, HttpMethod::Post);
    assert_eq!(
        create.body.as_ref().unwrap().kind,
        BodyKind::Raw {
            content_type: "application/octet-stream".to_owned()
        }
    );
    assert_eq!(
        create.response,
        ResponseKind::Json(TypeRef::named("APICall", Origin::Schema))
    );

    assert_eq!(ctx.services["File"].methods["get_conversion"].response, ResponseKind::Raw);
    assert_eq!(ctx.services["File"].methods["logout"].response, ResponseKind::Empty);
    assert_eq!(ctx.services["APICall"].methods["delete"].response, ResponseKind::Empty);

    // an inline body gets a type named after the operation
    let update = &ctx.services["User"].methods["update_self"];
    let body = update.body.as_ref().unwrap();
    assert_eq!(body.arg, "body");
    assert_eq!(body.description, "The user to update.");
    assert_eq!(
        body.kind,
        BodyKind::Json(TypeRef::named("UpdateUserSelfBody", Origin::Local))
    );
    assert!(ctx.types.contains_key("UpdateUserSelfBody"));
}

#[test]
fn test_pagination_wrapper() {
    let (openapi, config) = generate(SPEC);
    let mut ctx = GenerationContext::new(&openapi, &config);
    ctx.process_components().unwrap();
    ctx.process_paths().unwrap();

    let service = &ctx.services["APICall"];
    assert!(service.methods["list"].pagination.is_none());
    let wrapper = &service.methods["list_all_pages"];
    let pagination = wrapper.pagination.as_ref().unwrap();
    assert_eq!(pagination.base, "list");
    assert_eq!(pagination.item, TypeRef::named("APICall", Origin::Schema));
    assert!(!pagination.items_optional);
    assert!(pagination.next_page_optional);
    assert_eq!(
        wrapper.response,
        ResponseKind::Json(TypeRef::Vec(Box::new(TypeRef::named("APICall", Origin::Schema))))
    );
    // page_token and limit are driven by the wrapper itself
    let arguments: Vec<&str> = wrapper.arguments().map(|p| p.rust_name.as_str()).collect();
    assert_eq!(arguments, ["sort_by"]);

    let example = &service.methods["list"].example;
    assert!(example.contains("client.api_calls().list(limit, page_token, sort_by).await?"));
    assert!(example.contains("// - OR -"));
    assert!(example.contains("client.api_calls().list_all_pages(sort_by).await?"));

    // no pagination on a non-GET or without the cursor parameters
    assert!(ctx.services["APICall"].methods["get"].pagination.is_none());
    assert!(!ctx.services["File"].methods.keys().any(|k| k.ends_with("_all_pages")));
}

#[test]
fn test_method_docs() {
    let (openapi, config) = generate(SPEC);
    let mut ctx = GenerationContext::new(&openapi, &config);
    ctx.process_components().unwrap();
    ctx.process_paths().unwrap();

    let list = &ctx.services["APICall"].methods["list"];
    assert_eq!(list.docs[0], "List API calls.");
    assert!(list.docs.contains(&"**Parameters:**".to_owned()));
    assert!(list
        .docs
        .contains(&"* `limit`: Maximum number of items returned by a single call".to_owned()));

    let delete = &ctx.services["APICall"].methods["delete"];
    assert_eq!(delete.docs.last().map(String::as_str), Some("**Deprecated**"));
    assert!(delete.docs.contains(&"* `id`: The ID of the API call. (required)".to_owned()));

    let link = ctx.docs_link(&ctx.services["APICall"], "list");
    assert_eq!(
        link,
        "https://docs.rs/kittycad/latest/kittycad/client/struct.APICallService.html#method.list"
    );
}

#[test]
fn test_rendered_methods() {
    let (openapi, config) = generate(SPEC);
    let sdk = generate_sdk_sources(&openapi, &config).unwrap();

    let paths = &sdk.files[PATHS_FILE];
    assert!(paths.contains("impl crate::client::APICallService {"));
    assert!(paths.contains("pub async fn list_all_pages("));
    assert!(paths.contains("crate::pagination::collect_all_pages("));
    assert!(paths.contains("Ok((page.items, page.next_page))"));
    assert!(paths.contains("self.client.send_empty(req).await"));
    assert!(paths.contains("self.client.send_raw(req).await"));
    assert!(paths.contains("crate::client::encode_path(&src_format.to_string())"));

    let client = &sdk.files[CLIENT_FILE];
    assert!(client.contains("pub const DEFAULT_SERVER_URL: &str = \"https://api.kittycad.io\";"));
    assert!(client.contains("pub struct APICallService {"));
    assert!(client.contains("pub fn api_calls(&self) -> APICallService {"));
    assert!(client.contains("pub fn users(&self) -> UserService {"));

    let pagination = &sdk.files[PAGINATION_FILE];
    assert!(pagination.contains("pub async fn collect_all_pages<"));
}

#[test]
fn test_missing_tag() {
    const UNTAGGED: &str = r##"
paths:
  /ping:
    get:
      operationId: ping
      responses:
        '200':
          description: pong
"##;

    let (openapi, config) = generate(UNTAGGED);
    let mut ctx = GenerationContext::new(&openapi, &config);
    let err = ctx.process_paths().unwrap_err();
    assert!(matches!(
        err.root_cause(),
        GenError::MissingTag { path, .. } if path == "/ping"
    ));
    assert!(ctx.services.is_empty());
}

#[test]
fn test_undeclared_path_parameter() {
    const UNDECLARED: &str = r##"
paths:
  /things/{id}:
    get:
      operationId: get_thing
      tags: [things]
      responses:
        '204':
          description: ok
"##;

    let (openapi, config) = generate(UNDECLARED);
    let mut ctx = GenerationContext::new(&openapi, &config);
    let err = ctx.process_paths().unwrap_err();
    assert!(matches!(
        err.root_cause(),
        GenError::UndeclaredPathParameter { name, .. } if name == "id"
    ));
}

#[test]
fn test_method_name_collision_falls_back_to_operation_id() {
    const COLLIDING: &str = r##"
paths:
  /user/{id}:
    get:
      operationId: get_user
      tags: [users]
      parameters:
        - name: id
          in: path
          required: true
          schema:
            type: string
      responses:
        '204':
          description: ok
  /users/{id}:
    get:
      operationId: user_get
      tags: [users]
      parameters:
        - name: id
          in: path
          required: true
          schema:
            type: string
      responses:
        '204':
          description: ok
"##;

    let (openapi, config) = generate(COLLIDING);
    let mut ctx = GenerationContext::new(&openapi, &config);
    ctx.process_paths().unwrap();
    assert_eq!(
        ctx.services["User"].methods.keys().collect::<Vec<_>>(),
        ["get", "user_get"]
    );
}

#[test]
fn test_operation_without_id() {
    const ANONYMOUS: &str = r##"
paths:
  /users/{id}/sessions:
    get:
      tags: [sessions]
      parameters:
        - name: id
          in: path
          required: true
          schema:
            type: string
      responses:
        '204':
          description: ok
"##;

    let (openapi, config) = generate(ANONYMOUS);
    let mut ctx = GenerationContext::new(&openapi, &config);
    ctx.process_paths().unwrap();
    // get_users_id_sessions: the tag is stripped, the path is a collection
    assert_eq!(
        ctx.services["Session"].methods.keys().collect::<Vec<_>>(),
        ["list_users_id"]
    );
}

#[test]
fn test_pagination_docs_name_the_actual_wrapper() {
    const TAKEN: &str = r##"
paths:
  /a:
    get:
      operationId: list_all_pages
      tags: [things]
      responses:
        '204':
          description: ok
  /things:
    get:
      operationId: list_things
      tags: [things]
      parameters:
        - name: limit
          in: query
          schema:
            type: integer
        - name: page_token
          in: query
          schema:
            type: string
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/ThingPage'
components:
  schemas:
    ThingPage:
      type: object
      properties:
        items:
          type: array
          items:
            type: string
        next_page:
          type: string
"##;

    let (openapi, config) = generate(TAKEN);
    let mut ctx = GenerationContext::new(&openapi, &config);
    ctx.process_components().unwrap();
    ctx.process_paths().unwrap();

    let service = &ctx.services["Thing"];
    assert_eq!(
        service.methods.keys().collect::<Vec<_>>(),
        ["list", "list_all_pages", "list_all_pages_2"]
    );
    assert!(service.methods["list_all_pages"].pagination.is_none());
    assert_eq!(
        service.methods["list_all_pages_2"].pagination.as_ref().unwrap().base,
        "list"
    );
    assert!(service.methods["list"]
        .docs
        .contains(&"This endpoint is paginated; `list_all_pages_2` fetches every page.".to_owned()));
}
