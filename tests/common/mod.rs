#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use encoding_rs::WINDOWS_1252;
use tempfile::{TempDir, tempdir};

/// Semicolon-separated export in the shape the tool is usually fed.
pub const PRODUCTION_CSV: &str = "\
Etapa;Unidade;Produto;Valor;Custo
Corte;Norte;Mesa;10;2,5
Corte;Sul;Cadeira;5;1,5
Montagem;Norte;Mesa;-3;4
Corte;Norte;Mesa;0;1
Corte;Norte;Mesa;2,5;abc
";

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` as UTF-8 into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        self.write_bytes(name, contents.as_bytes())
    }

    /// Writes `contents` encoded as ISO-8859-1 (windows-1252).
    pub fn write_latin1(&self, name: &str, contents: &str) -> PathBuf {
        let (encoded, _, had_errors) = WINDOWS_1252.encode(contents);
        assert!(!had_errors, "contents not representable in latin-1");
        self.write_bytes(name, &encoded)
    }

    pub fn write_bytes(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents).expect("write temp file contents");
        path
    }
}
