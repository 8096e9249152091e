//! API calls from the browser
//!
//! Thin fetch wrappers over the AuditLens API. Uploads are independent
//! in-flight requests; callers receive each URL as its response arrives,
//! in completion order, not submission order.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{File, FormData, Request, RequestInit, RequestMode, Response};

use shared_types::wire::RunAuditRequest;

fn window() -> Result<web_sys::Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no window"))
}

async fn send(request: &Request) -> Result<Response, JsValue> {
    let response = JsFuture::from(window()?.fetch_with_request(request)).await?;
    let response: Response = response.dyn_into()?;
    if !response.ok() {
        return Err(JsValue::from_str(&format!(
            "request failed: {}",
            response.status()
        )));
    }
    Ok(response)
}

async fn response_text(response: Response) -> Result<String, JsValue> {
    let text = JsFuture::from(response.text()?).await?;
    text.as_string()
        .ok_or_else(|| JsValue::from_str("response was not text"))
}

/// Sign in with an email; returns the login response JSON
/// (`{token, userId, email, createdAt}`).
#[wasm_bindgen]
pub async fn login(api_base: String, email: String) -> Result<String, JsValue> {
    let body = serde_json::json!({ "email": email });

    let opts = RequestInit::new();
    opts.set_method("POST");
    opts.set_mode(RequestMode::Cors);
    opts.set_body(&JsValue::from_str(&body.to_string()));

    let url = format!("{}/api/auth/login", api_base);
    let request = Request::new_with_str_and_init(&url, &opts)?;
    request.headers().set("Content-Type", "application/json")?;

    let response = send(&request).await?;
    response_text(response).await
}

/// Upload one screenshot; returns its retrievable URL.
#[wasm_bindgen]
pub async fn upload_screenshot(
    api_base: String,
    token: String,
    file: File,
) -> Result<String, JsValue> {
    let form = FormData::new()?;
    form.append_with_blob_and_filename("file", &file, &file.name())?;

    let opts = RequestInit::new();
    opts.set_method("POST");
    opts.set_mode(RequestMode::Cors);
    opts.set_body(&form);

    let url = format!("{}/api/upload", api_base);
    let request = Request::new_with_str_and_init(&url, &opts)?;
    request
        .headers()
        .set("Authorization", &format!("Bearer {}", token))?;

    let response = send(&request).await?;
    let body = response_text(response).await?;

    let parsed: serde_json::Value =
        serde_json::from_str(&body).map_err(|e| JsValue::from_str(&e.to_string()))?;
    parsed["url"]
        .as_str()
        .map(|u| u.to_string())
        .ok_or_else(|| JsValue::from_str("upload response had no url"))
}

/// Run an accessibility audit; returns the run-audit response JSON
/// (`{auditId, result}`) to hand to [`crate::viewer::AuditViewer`].
#[wasm_bindgen]
pub async fn run_accessibility_audit(
    api_base: String,
    token: String,
    project_id: String,
    image_urls: Vec<String>,
) -> Result<String, JsValue> {
    let body = RunAuditRequest {
        project_id,
        image_urls,
    };
    let body_str =
        serde_json::to_string(&body).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let opts = RequestInit::new();
    opts.set_method("POST");
    opts.set_mode(RequestMode::Cors);
    opts.set_body(&JsValue::from_str(&body_str));

    let url = format!("{}/api/audit/accessibility", api_base);
    let request = Request::new_with_str_and_init(&url, &opts)?;
    request.headers().set("Content-Type", "application/json")?;
    request
        .headers()
        .set("Authorization", &format!("Bearer {}", token))?;

    let response = send(&request).await?;
    response_text(response).await
}
