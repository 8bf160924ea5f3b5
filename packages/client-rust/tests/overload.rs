//! Overload dispatch scenarios against the duck service description.

use soapline_client::{CallArguments, Client, ClientConfig, ClientError, InjectedReply, INJECT_KEY};
use soapline_core::Value;

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/duck_service.json");

fn empty_body(name: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
        <SOAP-ENV:Envelope xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/" xmlns:ns1="http://www.example.com/donald">
           <SOAP-ENV:Header/>
           <SOAP-ENV:Body>
              <ns1:{name}/>
           </SOAP-ENV:Body>
        </SOAP-ENV:Envelope>"#
    )
}

fn empty_response(name: &str) -> InjectedReply {
    InjectedReply::new(empty_body(name))
}

async fn client() -> Client {
    Client::connect(FIXTURE, ClientConfig::default()).await.unwrap()
}

fn sent(client: &Client) -> String {
    client.last_sent().unwrap().to_string()
}

#[tokio::test]
async fn registry_groups_overloads() {
    let client = client().await;
    let registry = client.service().registry();
    assert_eq!(registry.len(), 4);
    assert_eq!(registry.lookup("Disco.Submit").unwrap().len(), 3);
    assert_eq!(registry.lookup("Disco.List").unwrap().len(), 1);
    assert_eq!(registry.lookup("Disco.ListNew").unwrap().len(), 1);
    assert_eq!(registry.lookup("Disco.Count").unwrap().len(), 1);

    let submit = registry.lookup("Disco.Submit").unwrap().signatures();
    assert_ne!(submit[0], submit[1]);
    assert_ne!(submit[1], submit[2]);
    assert_ne!(submit[2], submit[0]);
}

#[tokio::test]
async fn non_overloaded_method_is_callable() {
    let client = client().await;
    let list = client.operation("Disco.List").unwrap();
    assert_eq!(list.signatures().len(), 1);
    assert!(list.signature().is_some());

    list.call(CallArguments::new().inject(empty_response("Disco.List")))
        .await
        .unwrap();
    assert!(sent(&client).contains("Disco.List/>"));

    list.call(CallArguments::new().arg(1).inject(empty_response("Disco.List")))
        .await
        .unwrap();
    let message = sent(&client);
    assert!(message.contains("Disco.List>"));
    assert!(message.contains("1</SessionID>"));

    list.call(
        CallArguments::new()
            .kw("ApplianceID", 1)
            .inject(empty_response("Disco.List")),
    )
    .await
    .unwrap();
    let message = sent(&client);
    assert!(message.contains("Disco.List>"));
    assert!(message.contains("1</ApplianceID>"));
    assert!(!message.contains("SessionID"));
}

#[tokio::test]
async fn overloaded_methods_by_index() {
    let client = client().await;
    let submit = client.operation("Disco.Submit").unwrap();
    assert_eq!(submit.signatures().len(), 3);
    assert!(submit.signature().is_none());

    let expected: [(&[&str], &[&str]); 3] = [
        (&["sessionID", "errorMessage", "assetData"], &["resendList"]),
        (
            &["sessionID", "jobID", "jobComplete", "errorMessage", "assetData"],
            &["invalidJob", "resendList"],
        ),
        (
            &["SessionID", "ApplianceID", "JobID", "JobComplete", "ErrorMessage", "Asset"],
            &["MalformedJob", "InvalidJob", "Msg"],
        ),
    ];
    for (idx, (inputs, outputs)) in expected.iter().enumerate() {
        let call = submit.index(idx).unwrap();
        let signature = call.signature();
        assert_eq!(signature.name(), "Disco.Submit");
        assert_eq!(signature.input_names().collect::<Vec<_>>(), *inputs);
        assert_eq!(
            signature.outputs().iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
            *outputs
        );
        call.call(CallArguments::new().inject(empty_response("Disco.Submit")))
            .await
            .unwrap();
        assert!(sent(&client).contains("Disco.Submit/>"));
    }

    assert!(matches!(
        submit.index(3),
        Err(ClientError::OverloadIndexOutOfRange { index: 3, count: 3, .. })
    ));
}

#[tokio::test]
async fn index_selected_overload_binds_positionally() {
    let client = client().await;
    let submit = client.operation("Disco.Submit").unwrap();
    submit
        .index(0)
        .unwrap()
        .call(
            CallArguments::new()
                .arg(7)
                .arg("No error")
                .inject(empty_response("Disco.Submit")),
        )
        .await
        .unwrap();
    let message = sent(&client);
    assert!(message.contains(">7</sessionID>"));
    assert!(message.contains(">No error</errorMessage>"));
    assert!(!message.contains("assetData"));
}

#[tokio::test]
async fn overloaded_method_requires_exact_parameters() {
    let client = client().await;
    let submit = client.operation("Disco.Submit").unwrap();

    let err = submit
        .call(CallArguments::new().inject(empty_response("Disco.Submit")))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::OverloadedMethodNotMatching(_)));
    assert!(err.to_string().contains("'Disco.Submit'"));

    let err = submit
        .call(
            CallArguments::new()
                .kw("sessionID", 1)
                .kw("assetData", "Data")
                .kw("errorMessage", "No error")
                .kw("nonexistent", "X")
                .inject(empty_response("Disco.Submit")),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::OverloadedMethodNotMatching(_)));
    assert!(err.to_string().contains("'Disco.Submit'"));
    assert!(client.last_sent().is_none());
}

#[tokio::test]
async fn overloaded_method_rejects_positional_parameters() {
    let client = client().await;
    let err = client
        .operation("Disco.Submit")
        .unwrap()
        .call(
            CallArguments::new()
                .arg(1)
                .kw("assetData", "Data")
                .kw("errorMessage", "No error")
                .inject(empty_response("Disco.Submit")),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::OverloadedMethodWithPositionalArguments(_)
    ));
    assert!(err.to_string().contains("'Disco.Submit'"));
}

#[tokio::test]
async fn correct_invocations_of_overloaded_method() {
    let client = client().await;
    let submit = client.operation("Disco.Submit").unwrap();

    submit
        .call(
            CallArguments::new()
                .kw("sessionID", 1)
                .kw("assetData", "Data")
                .kw("errorMessage", "No error")
                .kw(INJECT_KEY, empty_body("Disco.Submit")),
        )
        .await
        .unwrap();
    let message = sent(&client);
    assert!(message.contains("Disco.Submit>"));
    assert!(message.contains(">1</sessionID>"));
    assert!(message.contains(">No error</errorMessage>"));
    assert!(message.contains(">Data</assetData>"));

    submit
        .call(
            CallArguments::new()
                .kw("sessionID", Value::Null)
                .kw("assetData", Value::Null)
                .kw("errorMessage", "No error")
                .inject(empty_response("Disco.Submit")),
        )
        .await
        .unwrap();
    let message = sent(&client);
    assert!(message.contains("Disco.Submit>"));
    assert!(!message.contains("sessionID"));
    assert!(message.contains(">No error</errorMessage>"));
    assert!(!message.contains("assetData"));

    submit
        .call(
            CallArguments::new()
                .kw("sessionID", 1)
                .kw("jobID", 2)
                .kw("jobComplete", true)
                .kw("errorMessage", "No error")
                .kw("assetData", "Data")
                .inject(empty_response("Disco.Submit")),
        )
        .await
        .unwrap();
    let message = sent(&client);
    assert!(message.contains("Disco.Submit>"));
    assert!(message.contains(">1</sessionID>"));
    assert!(message.contains(">2</jobID>"));
    assert!(message.contains(">true</jobComplete>"));
    assert!(message.contains(">No error</errorMessage>"));
    assert!(message.contains(">Data</assetData>"));
}

#[tokio::test]
async fn unknown_operation_is_not_found() {
    let client = client().await;
    let err = client.operation("Disco.Delete").unwrap_err();
    assert!(matches!(err, ClientError::MethodNotFound(name) if name == "Disco.Delete"));
}
