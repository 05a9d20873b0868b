//! Transcription proxy.
//!
//! Forwards a stored audio blob to the external speech-to-text service and
//! returns the transcript. With `attach: true` the transcript is written
//! into the entry's content under the normal entry-update policy.

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use super::{require_session, store_error_response};
use crate::media::store::mime_for_ext;
use crate::models::UpdateEntryRequest;
use crate::AppState;

#[derive(Serialize)]
struct TranscribeResponse {
    success: bool,
    text: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranscribeRequest {
    /// Media-store URL of the audio to transcribe.
    audio_url: Option<String>,
    /// Alternative source: an entry whose `audio_url` is used.
    note_id: Option<String>,
    entry_id: Option<String>,
    /// Write the transcript back into the entry's content.
    #[serde(default)]
    attach: bool,
}

fn fail(status: actix_web::http::StatusCode, message: &str) -> HttpResponse {
    HttpResponse::build(status).json(TranscribeResponse {
        success: false,
        text: None,
        error: Some(message.to_string()),
    })
}

async fn transcribe(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<TranscribeRequest>,
) -> impl Responder {
    use actix_web::http::StatusCode;

    let session = match require_session(&state, &req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    let transcriber_url = match &state.config.transcriber_url {
        Some(url) => url.clone(),
        None => {
            return fail(
                StatusCode::SERVICE_UNAVAILABLE,
                "Transcription service not configured",
            );
        }
    };

    if body.attach && (body.note_id.is_none() || body.entry_id.is_none()) {
        return fail(
            StatusCode::BAD_REQUEST,
            "attach requires note_id and entry_id",
        );
    }

    // Resolve the audio source: explicit URL, or the entry's stored pointer
    let audio_url = if let Some(url) = &body.audio_url {
        url.clone()
    } else if let (Some(note_id), Some(entry_id)) = (&body.note_id, &body.entry_id) {
        match state.db.get_entry(&session.user_id, note_id, entry_id) {
            Ok(entry) => match entry.audio_url {
                Some(url) => url,
                None => return fail(StatusCode::BAD_REQUEST, "Entry has no audio"),
            },
            Err(e) => return store_error_response(e),
        }
    } else {
        return fail(
            StatusCode::BAD_REQUEST,
            "Provide audio_url, or note_id and entry_id",
        );
    };

    // Only blobs in the local media store are forwarded
    let filename = audio_url.rsplit('/').next().unwrap_or("").to_string();
    let audio_path = match state.media.resolve(&filename) {
        Some(p) => p,
        None => return fail(StatusCode::NOT_FOUND, "Audio object not found"),
    };

    let audio_data = match tokio::fs::read(&audio_path).await {
        Ok(d) => d,
        Err(e) => {
            log::error!("Failed to read audio {}: {}", filename, e);
            return fail(StatusCode::INTERNAL_SERVER_ERROR, "Failed to read audio");
        }
    };

    let ext = filename.rsplit('.').next().unwrap_or("").to_lowercase();
    let mime = mime_for_ext(&ext);
    let url = format!("{}/transcribe", transcriber_url.trim_end_matches('/'));

    let audio_part = reqwest::multipart::Part::bytes(audio_data)
        .file_name(filename.clone())
        .mime_str(mime)
        .unwrap_or_else(|_| reqwest::multipart::Part::bytes(vec![]).file_name("audio.webm"));

    let form = reqwest::multipart::Form::new()
        .part("audio", audio_part)
        .text("language", "en");

    let client = reqwest::Client::new();
    let result = client
        .post(&url)
        .multipart(form)
        .timeout(std::time::Duration::from_secs(30))
        .send()
        .await;

    let resp = match result {
        Ok(resp) => resp,
        Err(e) => {
            log::error!("Failed to reach transcriber at {}: {}", url, e);
            return fail(
                StatusCode::BAD_GATEWAY,
                &format!("Cannot reach transcription service: {}", e),
            );
        }
    };

    if !resp.status().is_success() {
        let status = resp.status();
        let body_text = resp.text().await.unwrap_or_default();
        log::error!("Transcriber returned {}: {}", status, body_text);
        return fail(
            StatusCode::BAD_GATEWAY,
            &format!("Transcription service error: {} {}", status, body_text),
        );
    }

    // Transcriber response: { "text": "..." }
    let text = match resp.json::<serde_json::Value>().await {
        Ok(json) => json
            .get("text")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string(),
        Err(e) => {
            log::error!("Failed to parse transcriber response: {}", e);
            return fail(
                StatusCode::BAD_GATEWAY,
                "Invalid response from transcription service",
            );
        }
    };

    if body.attach {
        // Presence of both ids was checked up front
        let note_id = body.note_id.as_deref().unwrap();
        let entry_id = body.entry_id.as_deref().unwrap();
        let update = UpdateEntryRequest {
            content: Some(text.clone()),
            ..Default::default()
        };
        if let Err(e) = state
            .db
            .update_entry(&session.user_id, note_id, entry_id, &update)
        {
            return store_error_response(e);
        }
    }

    HttpResponse::Ok().json(TranscribeResponse {
        success: true,
        text: Some(text),
        error: None,
    })
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api/transcribe").route("", web::post().to(transcribe)));
}
