/// # Liveness
///
/// Plain-text liveness check.
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Liveness text", body = String)
    )
)]
pub async fn root() -> &'static str {
    "Amani Reporting & Support API"
}

#[cfg(test)]
mod test {
    use axum::http::StatusCode;

    use crate::test::TestHarness;

    #[tokio::test]
    async fn liveness_text() {
        let harness = TestHarness::new().await;
        let (status, body) = harness.get("/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"Amani Reporting & Support API".as_slice());
    }
}
