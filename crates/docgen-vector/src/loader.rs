use docgen_core::{CorpusConfig, DocGenError, Result, SourceDocument};
use globset::{GlobBuilder, GlobMatcher};
use ignore::WalkBuilder;
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Outcome of loading a corpus directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub files_seen: usize,
    pub files_loaded: usize,
    pub files_skipped: usize,
    pub pages: usize,
}

/// Loads every PDF under a directory, one [`SourceDocument`] per page.
#[derive(Debug, Clone)]
pub struct DirectoryLoader {
    root: PathBuf,
    matcher: GlobMatcher,
    skip_unreadable: bool,
}

impl DirectoryLoader {
    pub fn new(root: impl Into<PathBuf>, glob: &str, skip_unreadable: bool) -> Result<Self> {
        let matcher = GlobBuilder::new(glob)
            .literal_separator(true)
            .build()
            .map_err(|e| DocGenError::Parse(format!("Invalid corpus glob '{}': {}", glob, e)))?
            .compile_matcher();

        Ok(Self {
            root: root.into(),
            matcher,
            skip_unreadable,
        })
    }

    pub fn from_config(config: &CorpusConfig) -> Result<Self> {
        Self::new(&config.pdf_dir, &config.glob, config.skip_unreadable)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Files under the root matching the glob, sorted by path.
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Err(DocGenError::not_found(format!(
                "PDF directory {} does not exist",
                self.root.display()
            )));
        }

        let walker = WalkBuilder::new(&self.root)
            .standard_filters(false)
            .follow_links(true)
            .build();

        let mut paths = Vec::new();
        for dent in walker {
            let dent = match dent {
                Ok(d) => d,
                Err(e) => {
                    warn!("Walker error: {}", e);
                    continue;
                }
            };

            if !dent.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let path = dent.path();
            let relative = path.strip_prefix(&self.root).unwrap_or(path);
            if self.matcher.is_match(relative) {
                paths.push(path.to_path_buf());
            }
        }

        paths.sort();
        debug!("Discovered {} corpus files in {:?}", paths.len(), self.root);
        Ok(paths)
    }

    /// Load all matching PDFs. Blocking; call from `spawn_blocking` in async code.
    pub fn load(&self) -> Result<(Vec<SourceDocument>, LoadReport)> {
        let paths = self.discover()?;
        self.load_paths(&paths)
    }

    pub fn load_paths(&self, paths: &[PathBuf]) -> Result<(Vec<SourceDocument>, LoadReport)> {
        let results: Vec<(PathBuf, Result<Vec<SourceDocument>>)> = paths
            .par_iter()
            .map(|path| (path.clone(), load_pdf(path)))
            .collect();

        let mut report = LoadReport {
            files_seen: paths.len(),
            ..LoadReport::default()
        };
        let mut documents = Vec::new();

        for (path, result) in results {
            match result {
                Ok(pages) => {
                    report.files_loaded += 1;
                    report.pages += pages.len();
                    documents.extend(pages);
                }
                Err(e) if self.skip_unreadable => {
                    warn!("Skipping unreadable PDF {}: {}", path.display(), e);
                    report.files_skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            "Loaded {} pages from {}/{} PDFs ({} skipped)",
            report.pages, report.files_loaded, report.files_seen, report.files_skipped
        );

        Ok((documents, report))
    }
}

/// Extract the text of each page of a PDF.
pub fn load_pdf(path: &Path) -> Result<Vec<SourceDocument>> {
    let document = lopdf::Document::load(path)
        .map_err(|e| DocGenError::Pdf(format!("{}: {}", path.display(), e)))?;

    let mut pages = Vec::new();
    // get_pages numbers pages from 1
    for (index, page_number) in document.get_pages().keys().enumerate() {
        let content = match document.extract_text(&[*page_number]) {
            Ok(text) => text,
            Err(e) => {
                debug!(
                    "No text extracted from {} page {}: {}",
                    path.display(),
                    page_number,
                    e
                );
                String::new()
            }
        };

        pages.push(SourceDocument {
            content,
            source: path.to_path_buf(),
            page: index as u32,
        });
    }

    Ok(pages)
}
