//! Integration tests for the Gofile client
//!
//! A mocked service stands in for both the API host and the upload server.

use gofile_client::{
    progress_callback, ClientError, Config, FolderOption, GofileClient, Limit, StagingStrategy,
};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn ok(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "ok", "data": data}))
}

fn client_for(server: &MockServer) -> GofileClient {
    let config = Config::new(server.uri())
        .with_token("test-token")
        .with_upload_endpoint(format!("{}/uploadFile", server.uri()));
    GofileClient::new(config).unwrap()
}

fn form_value(req: &Request, key: &str) -> Option<String> {
    url::form_urlencoded::parse(&req.body)
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// Test a full session: discover, create, upload, list, configure, delete
#[tokio::test]
async fn test_folder_and_upload_session() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/getServer"))
        .respond_with(ok(serde_json::json!({"server": "store3"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/getAccountDetails"))
        .respond_with(ok(serde_json::json!({
            "token": "test-token",
            "email": "me@example.com",
            "tier": "standard",
            "rootFolder": "root",
            "filesCount": 0,
            "filesCountLimit": false,
            "totalSize": 0,
            "totalSizeLimit": false,
            "total30DDLTraffic": 0,
            "total30DDLTrafficLimit": 100000000
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/createFolder"))
        .respond_with(ok(serde_json::json!({
            "id": "music",
            "type": "folder",
            "name": "Music",
            "parentFolder": "root",
            "createTime": 1700000000,
            "childs": [],
            "code": "m1"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/uploadFile"))
        .respond_with(ok(serde_json::json!({
            "downloadPage": "https://gofile.io/d/m1",
            "code": "m1",
            "parentFolder": "music",
            "fileId": "track1",
            "fileName": "track.flac",
            "md5": "d41d8cd98f00b204e9800998ecf8427e"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/getContent"))
        .and(query_param("contentId", "music"))
        .respond_with(ok(serde_json::json!({
            "isOwner": true,
            "id": "music",
            "type": "folder",
            "name": "Music",
            "parentFolder": "root",
            "childs": ["track1"],
            "totalSize": 4096,
            "contents": {
                "track1": {
                    "id": "track1",
                    "type": "file",
                    "name": "track.flac",
                    "size": 4096,
                    "mimetype": "audio/flac"
                }
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/setFolderOption"))
        .respond_with(ok(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/deleteContent"))
        .respond_with(ok(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);

    let account = client.get_account_details().await.unwrap();
    assert_eq!(account.total_size_limit, Limit::Unlimited);
    assert_eq!(account.total_30ddl_traffic_limit, Limit::Max(100000000));

    let upload_server = client.get_server().await.unwrap();
    assert_eq!(upload_server, "store3");

    let folder = client.create_folder(&account.root_folder, "Music").await.unwrap();
    assert_eq!(folder.parent_folder, "root");

    let staging_dir = tempfile::tempdir().unwrap();
    let sent = Arc::new(Mutex::new(Vec::new()));
    let sent_clone = sent.clone();
    let data = vec![0x5au8; 4096];
    let upload = client
        .upload_file(
            &upload_server,
            &folder.id,
            "track.flac",
            &mut data.as_slice(),
            &StagingStrategy::temp_file_in(staging_dir.path()),
            Some(progress_callback(move |total, sent| {
                sent_clone.lock().unwrap().push((total, sent));
            })),
        )
        .await
        .unwrap();
    assert_eq!(upload.file_id, "track1");
    assert_eq!(std::fs::read_dir(staging_dir.path()).unwrap().count(), 0);

    let progress = sent.lock().unwrap();
    let &(total, last) = progress.last().unwrap();
    assert_eq!(total, last);
    assert!(total > data.len() as u64);

    let content = client.get_content(&folder.id).await.unwrap();
    let files: Vec<_> = content.children().collect();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].mimetype, "audio/flac");

    client
        .set_folder_option(&folder.id, &FolderOption::Public(true))
        .await
        .unwrap();
    client.delete_content(&[upload.file_id.as_str()]).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let option_request = requests
        .iter()
        .find(|r| r.url.path() == "/setFolderOption")
        .unwrap();
    assert_eq!(form_value(option_request, "option").as_deref(), Some("public"));
    assert_eq!(form_value(option_request, "value").as_deref(), Some("true"));
    assert_eq!(form_value(option_request, "token").as_deref(), Some("test-token"));
}

/// Test that a rejected token surfaces as an API status error everywhere
#[tokio::test]
async fn test_rejected_token() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(
            ResponseTemplate::new(401).set_body_json(serde_json::json!({"status": "error-auth"})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);

    let errors = vec![
        client.get_account_details().await.unwrap_err(),
        client.create_folder("root", "x").await.unwrap_err(),
        client.copy_content("dest", &["a", "b"]).await.unwrap_err(),
        client.get_content("root").await.unwrap_err(),
        client
            .upload_file(
                "store3",
                "root",
                "a.txt",
                &mut &b"hello"[..],
                &StagingStrategy::Memory,
                None,
            )
            .await
            .unwrap_err(),
    ];

    for error in errors {
        assert!(
            matches!(&error, ClientError::ApiStatus { status } if status == "error-auth"),
            "unexpected error: {:?}",
            error
        );
    }
}
