//! HTTP-level tests: multipart uploads against the real router, with a
//! scripted generator standing in for Gemini.

mod common;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use common::{document_xml, files_in, summary_pdf, workbook_rows, ScriptedGenerator, Workspace};
use edgequake_pdfsection::{router, AppState, ExtractionConfig, TextGenerator};
use std::sync::Arc;

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

fn server_for(config: ExtractionConfig) -> TestServer {
    let state = AppState::new(config).unwrap();
    TestServer::new(router(state)).expect("Failed to create test server")
}

fn pdf_part(bytes: Vec<u8>) -> Part {
    Part::bytes(bytes)
        .file_name("report.pdf")
        .mime_type("application/pdf")
}

fn upload_form(heading: &str, pdf: Vec<u8>) -> MultipartForm {
    MultipartForm::new()
        .add_text("heading", heading)
        .add_part("pdf", pdf_part(pdf))
}

fn assert_workspace_clean(ws: &Workspace) {
    assert!(files_in(&ws.uploads).is_empty(), "uploads left: {:?}", files_in(&ws.uploads));
    assert!(files_in(&ws.output).is_empty(), "artifacts left: {:?}", files_in(&ws.output));
}

#[tokio::test]
async fn narrative_answer_downloads_docx() {
    let ws = Workspace::new();
    let generator = ScriptedGenerator::answering("Total: 42");
    let server = server_for(ws.config(generator.clone()));

    let response = server
        .post("/upload-pdf")
        .multipart(upload_form("Summary", summary_pdf()))
        .await;

    response.assert_status_ok();
    assert_eq!(response.header("content-type"), DOCX_MIME);
    let disposition = response.header("content-disposition");
    let disposition = disposition.to_str().unwrap();
    assert!(
        disposition.starts_with("attachment; filename=\"Extracted_Content_")
            && disposition.ends_with(".docx\""),
        "got {disposition}"
    );

    let xml = document_xml(response.as_bytes());
    assert!(xml.contains("Extracted Content"));
    assert!(xml.contains("Heading1"));
    assert!(xml.contains("Total: 42"));

    assert_eq!(generator.calls(), 1);
    assert!(generator.prompts()[0].contains("\"Summary\""));
    assert_workspace_clean(&ws);
}

#[tokio::test]
async fn tabular_answer_downloads_xlsx() {
    let ws = Workspace::new();
    let generator = ScriptedGenerator::answering("Table:\nName,Age\nAlice,30\nBob,25");
    let server = server_for(ws.config(generator));

    let response = server
        .post("/upload-pdf")
        .multipart(upload_form("Staff", summary_pdf()))
        .await;

    response.assert_status_ok();
    assert_eq!(response.header("content-type"), XLSX_MIME);
    assert_eq!(
        workbook_rows(response.as_bytes()),
        vec![
            vec!["Name".to_string(), "Age".to_string()],
            vec!["Alice".to_string(), "30".to_string()],
            vec!["Bob".to_string(), "25".to_string()],
        ]
    );
    assert_workspace_clean(&ws);
}

#[tokio::test]
async fn split_marker_answer_downloads_docx() {
    let ws = Workspace::new();
    let server = server_for(ws.config(ScriptedGenerator::answering("Ta\u{200B}ble:\nName,Age")));

    let response = server
        .post("/upload-pdf")
        .multipart(upload_form("Staff", summary_pdf()))
        .await;

    response.assert_status_ok();
    assert_eq!(response.header("content-type"), DOCX_MIME);
    assert!(document_xml(response.as_bytes()).contains("Name,Age"));
    assert_workspace_clean(&ws);
}

#[tokio::test]
async fn fenced_narrative_answer_is_delivered_verbatim() {
    let ws = Workspace::new();
    let answer = "```\nTotal: 42   \n\n\n\n\nSee appendix\n```";
    let server = server_for(ws.config(ScriptedGenerator::answering(answer)));

    let response = server
        .post("/upload-pdf")
        .multipart(upload_form("Summary", summary_pdf()))
        .await;

    response.assert_status_ok();
    assert_eq!(response.header("content-type"), DOCX_MIME);
    let xml = document_xml(response.as_bytes());
    assert!(xml.contains("```"), "fence was stripped: {xml}");
    assert!(xml.contains("Total: 42   "), "trailing spaces lost: {xml}");
    assert_eq!(xml.matches("<w:br").count(), answer.matches('\n').count());
    assert_workspace_clean(&ws);
}

#[tokio::test]
async fn non_pdf_upload_is_500_and_cleaned_up() {
    let ws = Workspace::new();
    let generator = ScriptedGenerator::answering("unused");
    let server = server_for(ws.config(generator.clone()));

    let response = server
        .post("/upload-pdf")
        .multipart(upload_form("Summary", b"GIF89a not a pdf".to_vec()))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    response.assert_text("Failed to process PDF.");
    assert_eq!(generator.calls(), 0);
    assert_workspace_clean(&ws);
}

#[tokio::test]
async fn remote_failure_is_500_with_no_artifact() {
    let ws = Workspace::new();
    let generator = ScriptedGenerator::failing("API key not valid");
    let config = ws.builder(generator.clone()).max_retries(1).build().unwrap();
    let server = server_for(config);

    let response = server
        .post("/upload-pdf")
        .multipart(upload_form("Summary", summary_pdf()))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    response.assert_text("Failed to process PDF.");
    assert_eq!(generator.calls(), 2);
    assert_workspace_clean(&ws);
}

#[tokio::test]
async fn missing_pdf_is_400() {
    let ws = Workspace::new();
    let server = server_for(ws.config(ScriptedGenerator::answering("unused")));

    let response = server
        .post("/upload-pdf")
        .multipart(MultipartForm::new().add_text("heading", "Summary"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_text("Missing required field 'pdf'");
    assert_workspace_clean(&ws);
}

#[tokio::test]
async fn missing_or_blank_heading_is_400() {
    let ws = Workspace::new();
    let generator = ScriptedGenerator::answering("unused");
    let server = server_for(ws.config(generator.clone()));

    let missing = server
        .post("/upload-pdf")
        .multipart(MultipartForm::new().add_part("pdf", pdf_part(summary_pdf())))
        .await;
    missing.assert_status(StatusCode::BAD_REQUEST);
    missing.assert_text("Missing required field 'heading'");

    let blank = server
        .post("/upload-pdf")
        .multipart(upload_form("   ", summary_pdf()))
        .await;
    blank.assert_status(StatusCode::BAD_REQUEST);

    assert_eq!(generator.calls(), 0);
    assert_workspace_clean(&ws);
}

#[tokio::test]
async fn field_order_and_extra_fields_do_not_matter() {
    let ws = Workspace::new();
    let generator = ScriptedGenerator::answering("Total: 42");
    let server = server_for(ws.config(generator.clone()));

    let form = MultipartForm::new()
        .add_text("note", "ignored")
        .add_part("pdf", pdf_part(summary_pdf()))
        .add_text("heading", "  Summary  ");
    let response = server.post("/upload-pdf").multipart(form).await;

    response.assert_status_ok();
    assert!(generator.prompts()[0].contains("\"Summary\""));
    assert_workspace_clean(&ws);
}

#[tokio::test]
async fn oversize_upload_is_400() {
    let ws = Workspace::new();
    let config = ws
        .builder(ScriptedGenerator::answering("unused"))
        .max_upload_bytes(1024)
        .build()
        .unwrap();
    let server = server_for(config);

    let mut big = summary_pdf();
    big.resize(8 * 1024, b' ');
    let response = server
        .post("/upload-pdf")
        .multipart(upload_form("Summary", big))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.text().contains("1024 bytes"), "got {}", response.text());
    assert_workspace_clean(&ws);
}

#[tokio::test]
async fn missing_output_dir_is_500() {
    let ws = Workspace::new();
    let config = ws
        .builder(ScriptedGenerator::answering("Total: 42"))
        .output_dir(ws.output.join("missing"))
        .build()
        .unwrap();
    let server = server_for(config);

    let response = server
        .post("/upload-pdf")
        .multipart(upload_form("Summary", summary_pdf()))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert!(files_in(&ws.uploads).is_empty());
}

#[tokio::test]
async fn form_and_health_are_served() {
    let ws = Workspace::new();
    let generator: Arc<dyn TextGenerator> = ScriptedGenerator::answering("unused");
    let server = server_for(ws.config(generator));

    let form = server.get("/").await;
    form.assert_status_ok();
    let html = form.text();
    assert!(html.contains("name=\"pdf\""));
    assert!(html.contains("name=\"heading\""));
    assert!(html.contains("/upload-pdf"));

    let health = server.get("/health").await;
    health.assert_status_ok();
    health.assert_text("ok");
}
