use std::sync::Arc;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use vn_core::{Error, NewsReport, VoiceConfig, DEFAULT_SPEECH_LANGUAGE, DEFAULT_TRANSLATION_LANGUAGE};
use crate::error::ApiError;
use crate::AppState;

type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Deserialize)]
pub struct FetchNewsParams {
    pub company: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TranslateParams {
    pub text: Option<String>,
    pub target_language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SpeechParams {
    pub text: Option<String>,
    pub lang: Option<String>,
}

fn required(value: Option<String>, name: &str) -> ApiResult<String> {
    value.ok_or_else(|| ApiError(Error::InvalidInput(format!("missing query parameter `{}`", name))))
}

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Hello, World!" }))
}

pub async fn fetch_news(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FetchNewsParams>,
) -> ApiResult<Json<NewsReport>> {
    let company = required(params.company, "company")?;
    tracing::info!(%company, "🦗 fetching news");
    let report = state.pipeline.run(&company).await?;
    Ok(Json(report))
}

pub async fn translate(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TranslateParams>,
) -> ApiResult<Json<String>> {
    let text = required(params.text, "text")?;
    let target = params
        .target_language
        .unwrap_or_else(|| DEFAULT_TRANSLATION_LANGUAGE.to_string());
    let translated = state.translator.translate(&text, &target).await?;
    Ok(Json(translated))
}

pub async fn generate_tts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SpeechParams>,
) -> ApiResult<impl IntoResponse> {
    let text = required(params.text, "text")?;
    let lang = params.lang.unwrap_or_else(|| DEFAULT_SPEECH_LANGUAGE.to_string());
    let audio = state.speech.synthesize(&text, &VoiceConfig::for_language(&lang)).await?;

    let disposition = format!("inline; filename=\"output.{}\"", audio.encoding.extension());
    Ok((
        [
            (header::CONTENT_TYPE, audio.encoding.mime_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        audio.bytes,
    ))
}
