use async_trait::async_trait;
use shared::api::CONTENT_TYPE;
use shared::{ClientError, HttpRequest, HttpResponse, Transport};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{console, Request, RequestInit, RequestMode, Response};

/// [`Transport`] over the browser's `fetch`.
pub struct FetchTransport;

fn transport_error(message: &str) -> ClientError {
    ClientError::Transport(message.to_string())
}

#[async_trait(?Send)]
impl Transport for FetchTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        console::log_1(&format!("[DEBUG] {} {}", request.method.as_str(), request.url).into());

        let opts = RequestInit::new();
        opts.set_method(request.method.as_str());
        opts.set_mode(RequestMode::Cors);
        if let Some(body) = &request.body {
            opts.set_body(&JsValue::from_str(body));
        }

        let req = Request::new_with_str_and_init(&request.url, &opts)
            .map_err(|_| transport_error("Failed to create request"))?;

        req.headers()
            .set("Content-Type", CONTENT_TYPE)
            .map_err(|_| transport_error("Failed to set header"))?;

        let window = web_sys::window().ok_or_else(|| transport_error("No window available"))?;

        let response: Response = JsFuture::from(window.fetch_with_request(&req))
            .await
            .map_err(|e| ClientError::Transport(format!("Failed to send request: {:?}", e)))?
            .into();

        let status = response.status();
        let text_promise = response
            .text()
            .map_err(|_| transport_error("Failed to read response"))?;
        let body = JsFuture::from(text_promise)
            .await
            .map_err(|_| transport_error("Failed to get text"))?
            .as_string()
            .ok_or_else(|| transport_error("Failed to convert to string"))?;

        Ok(HttpResponse { status, body })
    }
}
