use crate::{ApiError, ApiResult, AppState};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::header,
    response::{Html, IntoResponse},
    Json,
};
use docgen_ai::{DocumentRequest, SourceReference};
use docgen_core::DocumentType;
use docgen_export::{DocumentOutline, DocxWriter, DOCX_MIME};
use docgen_vector::IndexStats;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

const INDEX_HTML: &str = include_str!("../assets/index.html");

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub index_chunks: usize,
    pub embedding_model: String,
    pub llm_model: String,
}

#[derive(Serialize)]
pub struct DocumentTypeInfo {
    pub slug: &'static str,
    pub label: &'static str,
    pub sections: &'static [&'static str],
}

#[derive(Deserialize)]
pub struct GenerateRequest {
    /// Slug or label; defaults to FRS.
    #[serde(default)]
    pub doc_type: Option<String>,
    #[serde(default)]
    pub project_description: String,
}

#[derive(Serialize)]
pub struct GenerateResponse {
    pub id: Uuid,
    pub doc_type: DocumentType,
    pub label: &'static str,
    pub content: String,
    pub sources: Vec<SourceReference>,
    pub model: String,
    pub elapsed_ms: u64,
    pub download_url: String,
}

#[derive(Serialize)]
pub struct IndexResponse {
    pub pdf_dir: String,
    pub sources: Vec<String>,
    #[serde(flatten)]
    pub stats: IndexStats,
}

pub async fn index_page() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let index_chunks = state.vector_store.read().await.len();
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        index_chunks,
        embedding_model: state.embedding_model().to_string(),
        llm_model: state.llm_model().to_string(),
    })
}

pub async fn document_types() -> Json<Vec<DocumentTypeInfo>> {
    Json(
        DocumentType::ALL
            .iter()
            .map(|doc_type| DocumentTypeInfo {
                slug: doc_type.slug(),
                label: doc_type.label(),
                sections: doc_type.sections(),
            })
            .collect(),
    )
}

pub async fn generate_document(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> ApiResult<Json<GenerateResponse>> {
    let Json(request) = payload?;
    let doc_type = match request.doc_type.as_deref() {
        Some(raw) if !raw.trim().is_empty() => raw.parse::<DocumentType>()?,
        _ => DocumentType::default(),
    };

    let document = state
        .chain
        .generate(&DocumentRequest {
            doc_type,
            project_description: request.project_description,
        })
        .await?;

    let outline = DocumentOutline::parse(document.title(), &document.content);
    let docx = tokio::task::spawn_blocking(move || DocxWriter::new().render(&outline))
        .await
        .map_err(|e| ApiError::Internal(format!("Export task failed: {}", e)))??;

    let response = GenerateResponse {
        id: document.id,
        doc_type: document.doc_type,
        label: document.doc_type.label(),
        content: document.content.clone(),
        sources: document.sources.clone(),
        model: document.model.clone(),
        elapsed_ms: document.elapsed_ms,
        download_url: format!("/api/documents/{}/download", document.id),
    };

    state.documents.insert(document, docx);
    info!("{} generated, id {}", response.label, response.id);

    Ok(Json(response))
}

pub async fn download_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    // ids that are not UUIDs can never have been issued
    let stored = Uuid::parse_str(&id)
        .ok()
        .and_then(|uuid| state.documents.get(&uuid))
        .ok_or_else(|| ApiError::NotFound(format!("Document {} not found", id)))?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        state.config.export.file_name
    );

    Ok((
        [
            (header::CONTENT_TYPE, DOCX_MIME.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        stored.docx.as_ref().clone(),
    ))
}

pub async fn index_info(State(state): State<AppState>) -> Json<IndexResponse> {
    let sources = state
        .vector_store
        .read()
        .await
        .sources()
        .into_iter()
        .map(|path| path.display().to_string())
        .collect();
    let stats = state.index_stats.read().await.clone();

    Json(IndexResponse {
        pdf_dir: state.config.corpus.pdf_dir.display().to_string(),
        sources,
        stats,
    })
}

pub async fn rebuild_index(State(state): State<AppState>) -> ApiResult<Json<IndexStats>> {
    Ok(Json(state.rebuild_index().await?))
}
