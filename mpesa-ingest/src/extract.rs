//! Boundary to the PDF table extraction engine.
//!
//! The engine decrypts the statement and returns its tables. It is treated
//! as a black box: [`TabulaExtractor`] shells out to tabula-java, writes the
//! upload to a temporary file, and reads the JSON it prints. The call blocks
//! until the engine exits; there is no timeout.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::error::ExtractError;
use crate::parsers::read_tabula_json;
use crate::types::RawTable;

pub trait TableExtractor {
    fn extract_tables(&self, bytes: &[u8], password: &str) -> Result<Vec<RawTable>, ExtractError>;
}

/// Runs `<command> <args..> --pages all --format JSON [--password <pw>] <file>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabulaExtractor {
    pub command: String,
    pub args: Vec<String>,
}

impl Default for TabulaExtractor {
    fn default() -> Self {
        Self {
            command: "tabula".to_string(),
            args: Vec::new(),
        }
    }
}

impl TabulaExtractor {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    fn resolve_command(&self) -> Result<PathBuf, ExtractError> {
        which::which(&self.command)
            .map_err(|e| ExtractError::EngineUnavailable(format!("{}: {e}", self.command)))
    }

    /// Arguments passed to the engine for one statement.
    pub fn invocation(&self, pdf: &Path, password: &str) -> Vec<String> {
        let mut argv = self.args.clone();
        argv.extend(["--pages", "all", "--format", "JSON"].map(String::from));
        // tabula-java only takes the password on its command line, so it is
        // visible in the process list for the life of the engine.
        if !password.is_empty() {
            argv.push("--password".to_string());
            argv.push(password.to_string());
        }
        argv.push(pdf.display().to_string());
        argv
    }
}

impl TableExtractor for TabulaExtractor {
    fn extract_tables(&self, bytes: &[u8], password: &str) -> Result<Vec<RawTable>, ExtractError> {
        if !bytes.starts_with(b"%PDF") {
            return Err(ExtractError::Corrupt("missing %PDF header".to_string()));
        }

        let program = self.resolve_command()?;

        let mut file = tempfile::Builder::new()
            .prefix("mpesa-statement-")
            .suffix(".pdf")
            .tempfile()?;
        file.write_all(bytes)?;
        file.flush()?;

        debug!(engine = %program.display(), "running extraction engine");
        let output = Command::new(&program)
            .args(self.invocation(file.path(), password))
            .stdin(Stdio::null())
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_failure(&stderr));
        }

        let tables = read_tabula_json(output.stdout.as_slice())?;
        info!(tables = tables.len(), "tables extracted");
        Ok(tables)
    }
}

/// Map the engine's stderr to an extraction error.
pub fn classify_failure(stderr: &str) -> ExtractError {
    let lower = stderr.to_lowercase();
    let first_line = stderr
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("extraction engine failed")
        .to_string();

    if lower.contains("password") {
        ExtractError::BadPassword
    } else if lower.contains("header doesn't contain versioninfo")
        || lower.contains("not a pdf")
        || lower.contains("end-of-file")
        || lower.contains("missing root object")
    {
        ExtractError::Corrupt(first_line)
    } else {
        ExtractError::Unsupported(first_line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_shape() {
        let ex = TabulaExtractor::new("java", vec!["-jar".into(), "tabula.jar".into()]);
        let argv = ex.invocation(Path::new("/tmp/s.pdf"), "1234");
        assert_eq!(
            argv,
            vec![
                "-jar", "tabula.jar", "--pages", "all", "--format", "JSON", "--password", "1234",
                "/tmp/s.pdf"
            ]
        );
    }

    #[test]
    fn test_invocation_without_password() {
        let argv = TabulaExtractor::default().invocation(Path::new("s.pdf"), "");
        assert!(!argv.contains(&"--password".to_string()));
    }

    #[test]
    fn test_classify_failures() {
        assert!(matches!(
            classify_failure(
                "InvalidPasswordException: Cannot decrypt PDF, the password is incorrect"
            ),
            ExtractError::BadPassword
        ));
        assert!(matches!(
            classify_failure("Error: Header doesn't contain versioninfo"),
            ExtractError::Corrupt(_)
        ));
        match classify_failure("\nError: page out of range\n") {
            ExtractError::Unsupported(msg) => assert_eq!(msg, "Error: page out of range"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_non_pdf_bytes_rejected_before_engine() {
        let ex = TabulaExtractor::new("definitely-not-installed-tabula", vec![]);
        let err = ex.extract_tables(b"hello", "pw").unwrap_err();
        assert!(matches!(err, ExtractError::Corrupt(_)));
    }

    #[test]
    fn test_missing_engine() {
        let ex = TabulaExtractor::new("definitely-not-installed-tabula", vec![]);
        let err = ex.extract_tables(b"%PDF-1.4 ...", "pw").unwrap_err();
        assert!(matches!(err, ExtractError::EngineUnavailable(_)));
    }
}
