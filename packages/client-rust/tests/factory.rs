use std::io::Write;

use soapline_client::{CallArguments, Client, ClientConfig, ClientError, FileDescription};
use soapline_core::{FactoryError, Value};

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/duck_service.json");

async fn client() -> Client {
    Client::connect(FIXTURE, ClientConfig::default()).await.unwrap()
}

#[tokio::test]
async fn simple_object_attributes() {
    let client = client().await;
    let obj = client
        .create("T_KeyValuePair", [("Key", "key1"), ("Value", "value1")])
        .unwrap();
    assert_eq!(obj.get("Key"), Some(&Value::from("key1")));
    assert_eq!(obj.get("Value"), Some(&Value::from("value1")));
}

#[tokio::test]
async fn constructor_entry_point_is_equivalent() {
    let client = client().await;
    let obj = client
        .factory()
        .constructor("T_KeyValuePair")
        .unwrap()
        .build([("Key", "key1"), ("Value", "value1")])
        .unwrap();
    let direct = client
        .create("T_KeyValuePair", [("Key", "key1"), ("Value", "value1")])
        .unwrap();
    assert_eq!(obj, direct);
}

#[tokio::test]
async fn default_attributes_are_null() {
    let client = client().await;
    let obj = client.factory().create("T_KeyValuePair").unwrap();
    assert_eq!(obj.get("Key"), Some(&Value::Null));
    assert_eq!(obj.get("Value"), Some(&Value::Null));
}

#[tokio::test]
async fn invalid_attribute_is_rejected() {
    let client = client().await;
    let err = client
        .create("T_KeyValuePair", [("Invalid", true)])
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::Factory(FactoryError::UnknownAttribute { ref attribute, .. }) if attribute == "Invalid"
    ));

    let mut obj = client.factory().create("T_KeyValuePair").unwrap();
    assert!(obj.set("Invalid", true).is_err());
    assert!(!obj.has_attribute("Invalid"));
}

#[tokio::test]
async fn enumeration_literals_are_their_own_values() {
    let client = client().await;
    let state = client.factory().create("T_JobState").unwrap();
    assert!(state.is_enumeration());
    for literal in ["PENDING", "RUNNING", "DONE"] {
        assert_eq!(state.get(literal), Some(&Value::from(literal)));
    }
}

#[tokio::test]
async fn enumeration_literals_cannot_be_reassigned() {
    let client = client().await;
    let err = client.create("T_JobState", [("DONE", "PENDING")]).unwrap_err();
    assert!(matches!(
        err,
        ClientError::Factory(FactoryError::ReadOnlyLiteral { ref literal, .. }) if literal == "DONE"
    ));

    let mut state = client.factory().create("T_JobState").unwrap();
    assert!(state.set("RUNNING", "DONE").is_err());
    assert_eq!(state.get("RUNNING"), Some(&Value::from("RUNNING")));
}

#[tokio::test]
async fn nested_and_repeated_fields() {
    let client = client().await;
    let job = client.factory().create("T_Job").unwrap();
    assert_eq!(job.get("Tags"), Some(&Value::Array(Vec::new())));
    assert_eq!(job.get("Parent"), Some(&Value::Null));
    assert_eq!(job.get("State"), Some(&Value::Null));
    let Some(Value::Object(property)) = job.get("Property") else {
        panic!("expected nested object");
    };
    assert_eq!(property.type_name(), "T_KeyValuePair");
}

#[tokio::test]
async fn qualified_and_dotted_names_resolve() {
    let client = client().await;
    assert!(client.factory().create("ns1:T_KeyValuePair").is_ok());
    let property = client.factory().create("T_Job.Property").unwrap();
    assert_eq!(property.type_name(), "T_KeyValuePair");
}

#[tokio::test]
async fn unknown_type_is_not_found() {
    let client = client().await;
    let err = client.factory().create("T_Missing").unwrap_err();
    assert!(matches!(err, FactoryError::TypeNotFound(name) if name == "T_Missing"));
}

#[tokio::test]
async fn value_objects_serialize_as_call_arguments() {
    let client = client().await;
    let pair = client
        .create("T_KeyValuePair", [("Key", "k")])
        .unwrap();
    client
        .operation("Disco.Count")
        .unwrap()
        .call(
            CallArguments::new()
                .arg(1)
                .header(pair)
                .inject(soapline_client::InjectedReply::new("")),
        )
        .await
        .unwrap();
    let sent = client.last_sent().unwrap().to_string();
    assert!(sent.contains("<ns0:T_KeyValuePair><Key>k</Key></ns0:T_KeyValuePair>"));
}

#[tokio::test]
async fn description_loads_from_temporary_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "name": "Tiny",
            "namespace": "urn:tiny",
            "endpoint": "http://localhost/tiny",
            "types": [{{"kind": "complex", "name": "Point",
                        "fields": [{{"name": "x", "type": "xsd:int"}}]}}]
        }}"#
    )
    .unwrap();

    let client = Client::load(&FileDescription::new(file.path()), ClientConfig::default())
        .await
        .unwrap();
    assert_eq!(client.name(), "Tiny");
    let point = client.create("Point", [("x", 3)]).unwrap();
    assert_eq!(point.get("x"), Some(&Value::Int(3)));
}

#[tokio::test]
async fn missing_description_reports_locator() {
    let err = Client::connect("/nonexistent/duck.json", ClientConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::Description { ref locator, .. } if locator == "file:///nonexistent/duck.json"
    ));
}
