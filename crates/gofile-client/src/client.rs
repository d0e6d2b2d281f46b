//! Main client implementation

use crate::{
    envelope::{decode_data, decode_envelope},
    types::*,
    ClientError, Config, Result,
};
use reqwest::{header, Client, Method, RequestBuilder};
use serde::de::{DeserializeOwned, IgnoredAny};
use tracing::{debug, instrument};

/// Gofile API client
///
/// Holds the token and a pooled HTTP transport; no other state is kept
/// between calls, so a client can be shared across tasks.
#[derive(Clone)]
pub struct GofileClient {
    config: Config,
    http: Client,
}

impl std::fmt::Debug for GofileClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GofileClient")
            .field("api_endpoint", &self.config.api_endpoint)
            .finish_non_exhaustive()
    }
}

impl GofileClient {
    /// Create a new client with the given configuration
    pub fn new(config: Config) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            config
                .user_agent
                .parse()
                .map_err(|_| ClientError::Config(format!("invalid user agent: {}", config.user_agent)))?,
        );

        let http = Client::builder()
            .connect_timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(ClientError::Http)?;

        Ok(Self { config, http })
    }

    /// Create with the default endpoint and the given token
    pub fn with_token(token: impl Into<String>) -> Result<Self> {
        Self::new(Config::default().with_token(token))
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    pub(crate) fn token(&self) -> &str {
        &self.config.token
    }

    // ==================== Account ====================

    /// Get the best server to upload to
    #[instrument(skip(self))]
    pub async fn get_server(&self) -> Result<String> {
        let result: ServerResult = self
            .request(Method::GET, "getServer", None, None)
            .await?;
        Ok(result.server)
    }

    /// Get account details, including quotas
    #[instrument(skip(self))]
    pub async fn get_account_details(&self) -> Result<AccountDetails> {
        let query = [("allDetails", "true"), ("token", self.token())];
        self.request(Method::GET, "getAccountDetails", Some(&query[..]), None)
            .await
    }

    // ==================== Content ====================

    /// Create a folder under `parent_folder_id`
    #[instrument(skip(self))]
    pub async fn create_folder(&self, parent_folder_id: &str, folder_name: &str) -> Result<FolderCreated> {
        let form = [
            ("parentFolderId", parent_folder_id),
            ("folderName", folder_name),
            ("token", self.token()),
        ];
        self.request(Method::PUT, "createFolder", None, Some(&form[..]))
            .await
    }

    /// Copy contents into `folder_id_dest`
    #[instrument(skip(self, contents_id))]
    pub async fn copy_content<S: AsRef<str>>(&self, folder_id_dest: &str, contents_id: &[S]) -> Result<()> {
        let ids = join_ids(contents_id)?;
        let form = [
            ("folderIdDest", folder_id_dest),
            ("contentsId", ids.as_str()),
            ("token", self.token()),
        ];
        self.request_unit(Method::PUT, "copyContent", None, Some(&form[..]))
            .await
    }

    /// Delete contents
    #[instrument(skip(self, contents_id))]
    pub async fn delete_content<S: AsRef<str>>(&self, contents_id: &[S]) -> Result<()> {
        let ids = join_ids(contents_id)?;
        let form = [("contentsId", ids.as_str()), ("token", self.token())];
        self.request_unit(Method::DELETE, "deleteContent", None, Some(&form[..]))
            .await
    }

    /// Set an option on a folder
    #[instrument(skip(self, option), fields(option = option.name()))]
    pub async fn set_folder_option(&self, folder_id: &str, option: &FolderOption) -> Result<()> {
        let value = option.value();
        let form = [
            ("folderId", folder_id),
            ("option", option.name()),
            ("value", value.as_str()),
            ("token", self.token()),
        ];
        self.request_unit(Method::PUT, "setFolderOption", None, Some(&form[..]))
            .await
    }

    /// Get a folder and the metadata of its children
    #[instrument(skip(self))]
    pub async fn get_content(&self, content_id: &str) -> Result<ContentResult> {
        let query = [("contentId", content_id), ("token", self.token())];
        self.request(Method::GET, "getContent", Some(&query[..]), None)
            .await
    }

    // ==================== Helper Methods ====================

    /// Call an API operation whose envelope carries a payload
    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: Option<&[(&str, &str)]>,
        form: Option<&[(&str, &str)]>,
    ) -> Result<T> {
        let req = self.build(method, path, query, form);
        let body = self.execute(req).await?;
        decode_data(&body)
    }

    /// Call an API operation whose payload is ignored
    async fn request_unit(
        &self,
        method: Method,
        path: &str,
        query: Option<&[(&str, &str)]>,
        form: Option<&[(&str, &str)]>,
    ) -> Result<()> {
        let req = self.build(method, path, query, form);
        let body = self.execute(req).await?;
        decode_envelope::<IgnoredAny>(&body)?;
        Ok(())
    }

    fn build(
        &self,
        method: Method,
        path: &str,
        query: Option<&[(&str, &str)]>,
        form: Option<&[(&str, &str)]>,
    ) -> RequestBuilder {
        let url = self.config.api_url(path);
        debug!("Sending {} request to {}", method, url);

        let mut req = self
            .http
            .request(method, &url)
            .timeout(self.config.timeout);

        if let Some(q) = query {
            req = req.query(q);
        }

        // `form` sets Content-Type: application/x-www-form-urlencoded
        if let Some(f) = form {
            req = req.form(f);
        }

        req
    }

    /// Send a request and read the whole response body
    pub(crate) async fn execute(&self, req: RequestBuilder) -> Result<bytes::Bytes> {
        let response = req.send().await?;
        debug!(status = %response.status(), "Received response");
        Ok(response.bytes().await?)
    }
}

/// Join content IDs the way the API expects them
fn join_ids<S: AsRef<str>>(ids: &[S]) -> Result<String> {
    if ids.is_empty() {
        return Err(ClientError::InvalidArgument("no content ids given".to_string()));
    }
    Ok(ids.iter().map(|id| id.as_ref()).collect::<Vec<&str>>().join(","))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    async fn mock_client(server: &MockServer) -> GofileClient {
        GofileClient::new(Config::new(server.uri()).with_token("secret")).unwrap()
    }

    fn ok(data: serde_json::Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "ok", "data": data}))
    }

    fn form_value(req: &Request, key: &str) -> Option<String> {
        url::form_urlencoded::parse(&req.body)
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    #[test]
    fn test_join_ids() {
        assert_eq!(join_ids(&["a", "b", "c"]).unwrap(), "a,b,c");
        assert_eq!(join_ids(&["only".to_string()]).unwrap(), "only");
        assert!(matches!(
            join_ids::<&str>(&[]),
            Err(ClientError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_get_server() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/getServer"))
            .respond_with(ok(serde_json::json!({"server": "store3"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = mock_client(&server).await;
        assert_eq!(client.get_server().await.unwrap(), "store3");
    }

    #[tokio::test]
    async fn test_error_status_fails_any_endpoint() {
        let server = MockServer::start().await;
        Mock::given(wiremock::matchers::any())
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "error-auth"})),
            )
            .mount(&server)
            .await;

        let client = mock_client(&server).await;

        let err = client.get_server().await.unwrap_err();
        assert_eq!(err.status(), Some("error-auth"));
        let err = client.get_account_details().await.unwrap_err();
        assert_eq!(err.status(), Some("error-auth"));
        let err = client.delete_content(&["x"]).await.unwrap_err();
        assert_eq!(err.status(), Some("error-auth"));
    }

    #[tokio::test]
    async fn test_error_status_with_empty_data() {
        let server = MockServer::start().await;
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(401).set_body_json(
                serde_json::json!({"status": "error-auth", "data": {}}),
            ))
            .mount(&server)
            .await;

        let client = mock_client(&server).await;

        let err = client.get_server().await.unwrap_err();
        assert!(err.is_api_status(), "unexpected error: {:?}", err);
        let err = client.create_folder("root", "x").await.unwrap_err();
        assert_eq!(err.status(), Some("error-auth"));
        let err = client.get_content("root").await.unwrap_err();
        assert_eq!(err.status(), Some("error-auth"));
    }

    #[tokio::test]
    async fn test_http_status_is_not_inspected() {
        let server = MockServer::start().await;
        Mock::given(path("/getServer"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(serde_json::json!({"status": "ok", "data": {"server": "store9"}})),
            )
            .mount(&server)
            .await;

        let client = mock_client(&server).await;
        assert_eq!(client.get_server().await.unwrap(), "store9");
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(path("/getServer"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let client = mock_client(&server).await;
        assert!(matches!(
            client.get_server().await,
            Err(ClientError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_get_account_details_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/getAccountDetails"))
            .and(query_param("allDetails", "true"))
            .and(query_param("token", "secret"))
            .respond_with(ok(serde_json::json!({
                "token": "secret",
                "email": "me@example.com",
                "tier": "standard",
                "rootFolder": "root1",
                "filesCount": 2,
                "filesCountLimit": false,
                "totalSize": 10,
                "totalSizeLimit": 1000,
                "total30DDLTraffic": 0,
                "total30DDLTrafficLimit": false
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = mock_client(&server).await;
        let details = client.get_account_details().await.unwrap();
        assert_eq!(details.root_folder, "root1");
        assert_eq!(details.files_count_limit, Limit::Unlimited);
        assert_eq!(details.total_size_limit, Limit::Max(1000));
    }

    #[tokio::test]
    async fn test_create_folder_form() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/createFolder"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(|req: &Request| {
                form_value(req, "parentFolderId").as_deref() == Some("root1")
                    && form_value(req, "folderName").as_deref() == Some("new folder")
                    && form_value(req, "token").as_deref() == Some("secret")
            })
            .respond_with(ok(serde_json::json!({
                "id": "f2",
                "type": "folder",
                "name": "new folder",
                "parentFolder": "root1",
                "createTime": 1700000000,
                "childs": [],
                "code": "abc"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = mock_client(&server).await;
        let folder = client.create_folder("root1", "new folder").await.unwrap();
        assert_eq!(folder.id, "f2");
        assert_eq!(folder.kind, "folder");
        assert_eq!(folder.create_time, 1700000000);
    }

    #[tokio::test]
    async fn test_copy_content_joins_ids() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/copyContent"))
            .and(|req: &Request| {
                form_value(req, "contentsId").as_deref() == Some("a,b,c")
                    && form_value(req, "folderIdDest").as_deref() == Some("dest")
            })
            .respond_with(ok(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let client = mock_client(&server).await;
        client.copy_content("dest", &["a", "b", "c"]).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_content_joins_ids() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/deleteContent"))
            .and(|req: &Request| {
                form_value(req, "contentsId").as_deref() == Some("a,b,c")
                    && form_value(req, "token").as_deref() == Some("secret")
            })
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = mock_client(&server).await;
        let ids = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        client.delete_content(&ids).await.unwrap();
    }

    #[tokio::test]
    async fn test_set_folder_option() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/setFolderOption"))
            .and(|req: &Request| {
                form_value(req, "folderId").as_deref() == Some("f1")
                    && form_value(req, "option").as_deref() == Some("tags")
                    && form_value(req, "value").as_deref() == Some("music,live")
            })
            .respond_with(ok(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let client = mock_client(&server).await;
        let option = FolderOption::Tags(vec!["music".to_string(), "live".to_string()]);
        client.set_folder_option("f1", &option).await.unwrap();
    }

    #[tokio::test]
    async fn test_get_content_uses_lookup_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/getContent"))
            .and(query_param("contentId", "folder1"))
            .and(query_param("token", "secret"))
            .respond_with(ok(serde_json::json!({
                "isOwner": true,
                "id": "folder1",
                "type": "folder",
                "name": "root",
                "childs": ["c1"],
                "totalSize": 5,
                "contents": {
                    "c1": {"id": "c1", "type": "file", "name": "hello.txt", "size": 5, "md5": "abc"}
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = mock_client(&server).await;
        let content = client.get_content("folder1").await.unwrap();
        assert!(content.is_owner);
        assert_eq!(content.children().next().unwrap().name, "hello.txt");
    }
}
