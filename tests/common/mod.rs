//! Shared fixtures: a real one-page PDF, a scripted generator, and a scratch
//! upload/output directory pair.

#![allow(dead_code)]

use async_trait::async_trait;
use edgequake_pdfsection::{
    ExtractionConfig, ExtractionConfigBuilder, Generation, GenerationOptions, PdfSectionError,
    TextGenerator,
};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// A one-page PDF with one Courier line per entry of `lines`.
pub fn pdf_with_lines(lines: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 12.into()]),
        Operation::new("Td", vec![72.into(), 720.into()]),
    ];
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            operations.push(Operation::new("Td", vec![0.into(), (-20).into()]));
        }
        operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
    }
    operations.push(Operation::new("ET", vec![]));

    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// The "Summary / Total: 42" document used by most scenarios.
pub fn summary_pdf() -> Vec<u8> {
    pdf_with_lines(&["Summary", "Total: 42"])
}

/// Generator that returns a fixed answer (or a fixed error) and records
/// every prompt it was sent.
pub struct ScriptedGenerator {
    answer: Result<String, String>,
    calls: AtomicU32,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn answering(answer: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: Ok(answer.to_string()),
            calls: AtomicU32::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: Err(message.to_string()),
            calls: AtomicU32::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(
        &self,
        prompt: &str,
        _options: &GenerationOptions,
    ) -> Result<Generation, PdfSectionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.answer {
            Ok(text) => Ok(Generation {
                content: text.clone(),
                input_tokens: prompt.len() / 4,
                output_tokens: text.len() / 4,
            }),
            Err(message) => Err(PdfSectionError::LlmApiError {
                message: message.clone(),
            }),
        }
    }
}

/// Scratch `uploads/` and `output/` directories, removed on drop.
pub struct Workspace {
    root: TempDir,
    pub uploads: PathBuf,
    pub output: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let uploads = root.path().join("uploads");
        let output = root.path().join("output");
        std::fs::create_dir_all(&uploads).unwrap();
        std::fs::create_dir_all(&output).unwrap();
        Self {
            root,
            uploads,
            output,
        }
    }

    /// Builder pointed at this workspace, with fast retries.
    pub fn builder(&self, generator: Arc<dyn TextGenerator>) -> ExtractionConfigBuilder {
        ExtractionConfig::builder()
            .upload_dir(&self.uploads)
            .output_dir(&self.output)
            .generator(generator)
            .retry_backoff_ms(1)
            .api_timeout_secs(5)
    }

    pub fn config(&self, generator: Arc<dyn TextGenerator>) -> ExtractionConfig {
        self.builder(generator).build().unwrap()
    }

    /// Write `bytes` into the workspace root and return the path.
    pub fn write_input(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.root.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }
}

pub fn files_in(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(Result::ok)
        .map(|e| e.path())
        .collect();
    files.sort();
    files
}

/// Every cell of the `Extracted Content` sheet, as strings.
pub fn workbook_rows(bytes: &[u8]) -> Vec<Vec<String>> {
    use calamine::{Reader, Xlsx};
    let mut workbook: Xlsx<_> = Xlsx::new(std::io::Cursor::new(bytes.to_vec())).unwrap();
    let range = workbook.worksheet_range("Extracted Content").unwrap();
    range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}

/// `word/document.xml` of a `.docx`.
pub fn document_xml(bytes: &[u8]) -> String {
    use std::io::Read;
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes.to_vec())).unwrap();
    let mut part = archive.by_name("word/document.xml").unwrap();
    let mut xml = String::new();
    part.read_to_string(&mut xml).unwrap();
    xml
}
