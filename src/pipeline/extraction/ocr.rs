use std::io::Write;
use std::process::{Command, Stdio};

use super::types::OcrEngine;
use super::ExtractionError;

/// Tesseract OCR through its command-line binary.
///
/// The rendered PNG is piped to `tesseract stdin stdout -l <lang>`; no
/// temporary files are written.
pub struct TesseractCli {
    binary: String,
    lang: String,
}

impl TesseractCli {
    pub fn new(binary: &str, lang: &str) -> Self {
        Self {
            binary: binary.to_string(),
            lang: lang.to_string(),
        }
    }

    /// Verify the binary is runnable (`tesseract --version`).
    pub fn probe(&self) -> Result<(), ExtractionError> {
        let status = Command::new(&self.binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| ExtractionError::OcrInit(format!("{}: {e}", self.binary)))?;
        if status.success() {
            Ok(())
        } else {
            Err(ExtractionError::OcrInit(format!(
                "{} --version exited with {status}",
                self.binary
            )))
        }
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }
}

impl OcrEngine for TesseractCli {
    fn ocr_image(&self, image_bytes: &[u8], page_number: usize) -> Result<String, ExtractionError> {
        let mut child = Command::new(&self.binary)
            .args(["stdin", "stdout", "-l", &self.lang])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ExtractionError::OcrInit(format!("{}: {e}", self.binary)))?;

        // Tesseract consumes the whole image before writing anything,
        // so a full write then wait cannot deadlock.
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(image_bytes)?;
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(ExtractionError::OcrProcessing {
                page: page_number,
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        tracing::debug!(page = page_number, chars = text.len(), "Tesseract OCR complete");
        Ok(text)
    }
}

/// Mock OCR engine for testing: returns fixed text, or fails on demand.
pub struct MockOcrEngine {
    pub text: String,
    pub fail: bool,
}

impl MockOcrEngine {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            text: String::new(),
            fail: true,
        }
    }
}

impl OcrEngine for MockOcrEngine {
    fn ocr_image(&self, _image_bytes: &[u8], page_number: usize) -> Result<String, ExtractionError> {
        if self.fail {
            return Err(ExtractionError::OcrProcessing {
                page: page_number,
                reason: "mock OCR failure".into(),
            });
        }
        Ok(self.text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_ocr_returns_text() {
        let engine = MockOcrEngine::new("Metformin 500mg");
        assert_eq!(engine.ocr_image(b"png", 1).unwrap(), "Metformin 500mg");
    }

    #[test]
    fn failing_mock_reports_page() {
        let err = MockOcrEngine::failing().ocr_image(b"png", 4).unwrap_err();
        assert!(matches!(err, ExtractionError::OcrProcessing { page: 4, .. }));
    }

    #[test]
    fn missing_binary_is_init_error() {
        let engine = TesseractCli::new("/nonexistent/tesseract-binary", "eng");
        assert!(matches!(engine.probe(), Err(ExtractionError::OcrInit(_))));
        assert!(matches!(
            engine.ocr_image(b"png", 1),
            Err(ExtractionError::OcrInit(_))
        ));
    }

    #[test]
    fn language_is_kept() {
        assert_eq!(TesseractCli::new("tesseract", "eng+fra").lang(), "eng+fra");
    }
}
