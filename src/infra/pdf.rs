//! HTML-to-PDF conversion through an external renderer service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};

use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

const RENDER_TIMEOUT: Duration = Duration::from_secs(30);

/// Converts an HTML document to PDF bytes.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PdfConverter: Send + Sync {
    async fn convert(&self, html: &str) -> AppResult<Vec<u8>>;
}

/// Posts the HTML to a renderer endpoint and returns the response body.
pub struct HttpPdfConverter {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpPdfConverter {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(RENDER_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl PdfConverter for HttpPdfConverter {
    async fn convert(&self, html: &str) -> AppResult<Vec<u8>> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "text/html; charset=utf-8")
            .header(ACCEPT, "application/pdf")
            .body(html.to_owned())
            .send()
            .await
            .map_err(|e| AppError::Render(format!("PDF renderer unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Render(format!("PDF renderer returned {}", status)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::Render(format!("PDF renderer body: {}", e)))?;

        if !bytes.starts_with(b"%PDF") {
            return Err(AppError::Render("PDF renderer returned a non-PDF body".into()));
        }

        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_convert_returns_pdf_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/render"))
            .and(header("content-type", "text/html; charset=utf-8"))
            .and(body_string_contains("INV-2025-000001"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.7 test".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let converter = HttpPdfConverter::new(format!("{}/render", server.uri()));
        let pdf = converter
            .convert("<html><body>INV-2025-000001</body></html>")
            .await
            .unwrap();

        assert!(pdf.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_converter_error_status_is_render_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let converter = HttpPdfConverter::new(server.uri());
        let result = converter.convert("<html></html>").await;
        assert!(matches!(result, Err(AppError::Render(_))));
    }

    #[tokio::test]
    async fn test_non_pdf_body_is_render_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let converter = HttpPdfConverter::new(server.uri());
        assert!(converter.convert("<html></html>").await.is_err());
    }

    #[tokio::test]
    async fn test_unreachable_renderer_is_render_error() {
        let converter = HttpPdfConverter::new("http://127.0.0.1:9/render");
        let result = converter.convert("<html></html>").await;
        assert!(matches!(result, Err(AppError::Render(_))));
    }
}
