//! Integration test for REST-XML service translation

use svcmodel_common::{metadata_keys, Location, TranslateError, TranslateOptions};
use svcmodel_translator::{plugins::ids, translate_api, ApiTranslator, RawDescription};

const S3_JSON: &str = r#"{
    "api_version": "2006-03-01",
    "type": "rest-xml",
    "signature_version": "s3",
    "service_full_name": "Amazon Simple Storage Service",
    "service_abbreviation": "Amazon S3",
    "global_endpoint": "s3.amazonaws.com",
    "xmlnamespace": "http://s3.amazonaws.com/doc/2006-03-01/",
    "timestamp_format": "rfc822",
    "operations": {
        "PutBucketAcl": {
            "name": "PutBucketAcl",
            "alias": "PutBucketACL",
            "http": { "method": "PUT", "uri": "/{Bucket}?acl" },
            "input": {
                "type": "structure",
                "members": {
                    "Bucket": { "type": "string", "location": "uri", "required": true },
                    "AccessControlPolicy": {
                        "type": "structure",
                        "payload": true,
                        "members": {
                            "Grants": {
                                "type": "list",
                                "flattened": true,
                                "members": { "type": "structure", "xmlname": "Grant", "members": {} }
                            }
                        }
                    }
                }
            }
        },
        "CreateBucket2006_03_01": {
            "name": "CreateBucket2006_03_01",
            "http": { "method": "PUT", "uri": "/{Bucket}" },
            "input": {
                "type": "structure",
                "members": {
                    "Bucket": { "type": "string", "location": "uri", "required": true },
                    "ACL": { "type": "string", "location": "header", "location_name": "x-amz-acl" },
                    "LocationConstraint": { "type": "string" }
                }
            },
            "output": {
                "type": "structure",
                "members": {
                    "Location": { "type": "string", "location": "header" },
                    "Expires": { "type": "timestamp", "flattened": true }
                }
            }
        },
        "ListBuckets": {
            "name": "ListBuckets",
            "http": { "method": "GET", "uri": "/" }
        },
        "DeleteBucketCors": {
            "name": "DeleteBucketCors",
            "http": { "method": "DELETE", "uri": "/{Bucket}?cors" },
            "input": { "type": "structure", "members": {} }
        }
    }
}"#;

fn translate_s3() -> svcmodel_common::NormalizedApi {
    ApiTranslator::from_json(S3_JSON, TranslateOptions::default())
        .unwrap()
        .translate()
        .unwrap()
}

#[test]
fn test_xml_plugins_and_endpoint() {
    let api = translate_s3();
    assert!(api.has_plugin(ids::XML_PROTOCOL));
    assert!(!api.has_plugin(ids::SIMPLE_JSON));
    assert_eq!(api.plugins.last().map(String::as_str), Some(ids::S3_SIGNER));
    assert_eq!(api.endpoint.as_deref(), Some("s3.amazonaws.com"));
    assert_eq!(api.metadata_str("service_class_name"), Some("S3"));
}

#[test]
fn test_service_namespace_removed_from_metadata() {
    let api = translate_s3();
    assert!(!api.metadata.contains_key(metadata_keys::XMLNAMESPACE));
}

#[test]
fn test_namespace_attaches_to_payload_member() {
    let api = translate_s3();
    let op = &api.operations["put_bucket_acl"];
    let input = op.input.as_ref().unwrap();

    assert_eq!(input.payload.as_deref(), Some("access_control_policy"));
    let payload = input.payload_member().unwrap();
    assert_eq!(
        payload.metadata_str(metadata_keys::XMLNS_URI),
        Some("http://s3.amazonaws.com/doc/2006-03-01/")
    );
    assert!(!payload.metadata.contains_key(metadata_keys::PAYLOAD));

    // Never both locations
    assert!(!input.metadata.contains_key(metadata_keys::XMLNS_URI));
    assert!(input.serialized_name.is_none());

    let grants = &payload.members["grants"];
    assert_eq!(grants.shape_type.to_string(), "flat_list");
    assert_eq!(
        grants.member.as_ref().unwrap().serialized_name.as_deref(),
        Some("Grant")
    );
}

#[test]
fn test_namespace_attaches_to_input_without_payload() {
    let api = translate_s3();
    let op = &api.operations["create_bucket"];
    assert_eq!(op.name, "CreateBucket");
    assert_eq!(op.http_path, "/{bucket}");

    let input = op.input.as_ref().unwrap();
    assert!(input.payload.is_none());
    assert_eq!(input.serialized_name.as_deref(), Some("CreateBucketRequest"));
    assert_eq!(
        input.metadata_str(metadata_keys::XMLNS_URI),
        Some("http://s3.amazonaws.com/doc/2006-03-01/")
    );
    assert!(input
        .members
        .values()
        .all(|m| !m.metadata.contains_key(metadata_keys::XMLNS_URI)));

    let bucket = &input.members["bucket"];
    assert_eq!(bucket.location, Some(Location::Uri));
    assert!(bucket.serialized_name.is_none());
    assert_eq!(
        input.members["acl"].serialized_name.as_deref(),
        Some("x-amz-acl")
    );

    let output = op.output.as_ref().unwrap();
    assert_eq!(
        output.members["expires"].shape_type.to_string(),
        "flat_rfc822_timestamp"
    );
}

#[test]
fn test_namespace_skips_inputs_without_members() {
    let api = translate_s3();

    let list = &api.operations["list_buckets"];
    assert!(list.input.is_none());

    let delete = api.operations["delete_bucket_cors"].input.as_ref().unwrap();
    assert!(delete.serialized_name.is_none());
    assert!(delete.metadata.is_empty());
}

#[test]
fn test_alias_dropped_and_query_suffix_kept() {
    let api = translate_s3();
    let op = &api.operations["put_bucket_acl"];
    assert!(op.metadata.is_empty());
    assert_eq!(op.http_path, "/{bucket}?acl");
}

#[test]
fn test_no_propagation_for_json_protocol() {
    let raw: RawDescription = serde_json::from_str(
        r#"{
            "type": "rest-json",
            "xmlnamespace": "http://example.com/ns",
            "operations": {
                "PutThing": {
                    "name": "PutThing",
                    "input": { "type": "structure", "members": { "Name": { "type": "string" } } }
                }
            }
        }"#,
    )
    .unwrap();

    let api = translate_api(&raw, &TranslateOptions::default()).unwrap();
    assert_eq!(
        api.metadata_str(metadata_keys::XMLNAMESPACE),
        Some("http://example.com/ns")
    );
    let input = api.operations["put_thing"].input.as_ref().unwrap();
    assert!(input.serialized_name.is_none());
}

#[test]
fn test_bad_signature_version_is_fatal() {
    let raw: RawDescription =
        serde_json::from_str(r#"{ "type": "rest-xml", "signature_version": "v9" }"#).unwrap();

    let err = translate_api(&raw, &TranslateOptions::default()).unwrap_err();
    assert!(matches!(err, TranslateError::UnknownSignatureVersion(ref v) if v == "v9"));
    assert_eq!(err.to_string(), "unhandled signature version `v9`");
}
