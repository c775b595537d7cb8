use crate::naming::*;

#[test]
fn test_type_names_keep_acronyms() {
    assert_eq!(normalize_type_name("user_id"), "UserID");
    assert_eq!(normalize_type_name("ip_address"), "IPAddress");
    assert_eq!(normalize_type_name("gpu_count"), "GPUCount");
    assert_eq!(normalize_type_name("api-call-with-price"), "APICallWithPrice");
    assert_eq!(normalize_type_name("file conversion"), "FileConversion");
}

#[test]
fn test_type_name_normalization_is_idempotent() {
    for raw in [
        "user_id",
        "ip_address",
        "gpu_count",
        "file-conversion",
        "APICallStatus",
        "unit_conversion_ids",
        "createdAtSortMode",
        "gpu_id",
        "api_json",
        "id_url",
        "json-api",
        "gpu_id_spec",
        "gpus",
    ] {
        let once = normalize_type_name(raw);
        assert_eq!(normalize_type_name(&once), once, "{raw}");
    }
}

#[test]
fn test_adjacent_acronyms_stay_apart() {
    assert_eq!(normalize_type_name("gpu_id"), "GPUID");
    assert_eq!(normalize_type_name("GPUID"), "GPUID");
    assert_eq!(normalize_type_name("APIJSON"), "APIJSON");
    assert_eq!(normalize_type_name("IDURL"), "IDURL");
    assert_eq!(normalize_type_name("GPUIDSpec"), "GPUIDSpec");
    assert_eq!(words("JSONAPI"), ["json", "api"]);
    assert_eq!(words("UserIDURL"), ["user", "id", "url"]);
    assert_eq!(constant_name("GPUID"), "GPU_ID");
}

#[test]
fn test_leading_gpu_is_capitalized() {
    assert_eq!(normalize_type_name("gpus"), "GPUs");
    assert_eq!(normalize_type_name("GPUs"), "GPUs");
    assert_eq!(normalize_type_name("gpus_available"), "GPUsAvailable");
    assert_eq!(normalize_field_name("GPUs").unwrap(), "gpus");
}

#[test]
fn test_type_name_escapes() {
    assert_eq!(normalize_type_name("self"), "Self_");
    assert_eq!(normalize_type_name("string"), "String_");
    assert!(normalize_type_name("").is_empty());
}

#[test]
fn test_field_names() {
    assert_eq!(normalize_field_name("firstOrSecond").unwrap(), "first_or_second");
    assert_eq!(normalize_field_name("page-token").unwrap(), "page_token");
    assert_eq!(normalize_field_name("type").unwrap(), "type_");
    assert_eq!(normalize_field_name("self").unwrap(), "self_");
    assert!(matches!(
        normalize_field_name("$$"),
        Err(crate::GenError::InvalidIdentifier { .. })
    ));
}

#[test]
fn test_singular_and_plural() {
    assert_eq!(singularize("FileConversions"), "FileConversion");
    assert_eq!(singularize("APICallStatus"), "APICallStatus");
    assert_eq!(singularize("Status"), "Status");
    assert_eq!(singularize("User"), "User");

    assert_eq!(pluralize("FileExportFormat"), "FileExportFormats");
    assert_eq!(pluralize("Users"), "Users");
    assert_eq!(pluralize("APICallStatus"), "APICallStatuses");
}

#[test]
fn test_tag_and_constant_names() {
    assert_eq!(tag_name("api-calls"), "APICall");
    assert_eq!(tag_name("users"), "User");
    assert_eq!(tag_name("file"), "File");
    assert_eq!(constant_name("FileExportFormats"), "FILE_EXPORT_FORMATS");
    assert_eq!(constant_name("APICallStatuses"), "API_CALL_STATUSES");
}
