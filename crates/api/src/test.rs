use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use tower::util::ServiceExt;

use amani_database::DatabaseInfo;

/// Boundary used for hand-built multipart request bodies
const BOUNDARY: &str = "X-AMANI-TEST-BOUNDARY";

/// In-memory application instance for route tests.
///
/// Every harness gets its own reference database, so tests never observe
/// each other's reports.
pub struct TestHarness {
    app: Router,
}

impl TestHarness {
    pub const ADMIN_TOKEN: &'static str = "test-admin-token";

    pub async fn new() -> TestHarness {
        // Same values in every test, so whichever harness wins the race to
        // populate the cached settings produces the expected configuration.
        std::env::set_var("AMANI__API__SECURITY__ADMIN_TOKEN", Self::ADMIN_TOKEN);
        std::env::set_var(
            "AMANI__FILES__UPLOAD_DIR",
            std::env::temp_dir().join("amani-test-uploads"),
        );

        let db = DatabaseInfo::Reference
            .connect()
            .await
            .expect("reference database");

        TestHarness {
            app: crate::api::router(db).await,
        }
    }

    pub async fn request(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("infallible service");

        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("collected body")
            .to_bytes()
            .to_vec();

        (status, body)
    }

    pub async fn request_json(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let (status, body) = self.request(request).await;
        let value = if body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&body).expect("json body")
        };

        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Vec<u8>) {
        self.request(
            Request::builder()
                .method(Method::GET)
                .uri(uri)
                .body(Body::empty())
                .expect("request"),
        )
        .await
    }

    pub async fn get_json(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let (status, body) = self.get(uri).await;
        let value = if body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&body).expect("json body")
        };

        (status, value)
    }

    pub async fn post_json(
        &self,
        uri: &str,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        self.request_json(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("request"),
        )
        .await
    }

    pub async fn patch_json(
        &self,
        uri: &str,
        body: serde_json::Value,
        token: Option<&str>,
    ) -> (StatusCode, serde_json::Value) {
        let mut request = Request::builder()
            .method(Method::PATCH)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");

        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        self.request_json(request.body(Body::from(body.to_string())).expect("request"))
            .await
    }

    pub async fn post_multipart(
        &self,
        uri: &str,
        fields: &[(&str, &str)],
        files: &[(&str, &str, &[u8])],
    ) -> (StatusCode, serde_json::Value) {
        let mut body = Vec::new();

        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }

        for (name, filename, contents) in files {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(contents);
            body.extend_from_slice(b"\r\n");
        }

        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        self.request_json(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(body))
                .expect("request"),
        )
        .await
    }
}
