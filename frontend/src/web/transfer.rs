//! 课程总结文件的上传 / 下载
//!
//! fetch 无法报告上传进度，因此上传使用 `XMLHttpRequest`；
//! 下载把响应体包装为 Blob 并通过临时 `<a download>` 触发保存。

use std::cell::RefCell;
use std::rc::Rc;

use classhub_shared::HEADER_AUTHORIZATION;
use classhub_shared::protocol::summary_path;
use futures::channel::oneshot;
use leptos::logging::{error, log};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Blob, FormData, HtmlAnchorElement, ProgressEvent, Url, XmlHttpRequest};

use crate::api::{ClassHubApi, HttpTransport};
use crate::error::{ApiError, ApiResult};
use crate::web::KeyValueStore;

fn js_error(e: JsValue) -> ApiError {
    ApiError::Network(format!("{:?}", e))
}

impl<T: HttpTransport, S: KeyValueStore> ClassHubApi<T, S> {
    fn bearer(&self) -> Option<String> {
        self.session().token().map(|t| format!("Bearer {}", t))
    }

    /// 上传课程总结（multipart），`on_progress` 接收 0..=100 的百分比
    ///
    /// 单个请求，不排队、不重试、不可取消。
    pub async fn upload_summary<F>(
        &self,
        lesson_id: &str,
        form: &FormData,
        on_progress: F,
    ) -> ApiResult<()>
    where
        F: Fn(f64) + 'static,
    {
        let url = self.config().url(&summary_path(lesson_id));
        let xhr = XmlHttpRequest::new().map_err(js_error)?;

        let (tx, rx) = oneshot::channel::<ApiResult<()>>();
        let tx = Rc::new(RefCell::new(Some(tx)));

        let on_upload_progress =
            Closure::<dyn FnMut(ProgressEvent)>::new(move |event: ProgressEvent| {
                if event.length_computable() {
                    on_progress(upload_percent(event.loaded(), event.total()));
                }
            });
        xhr.upload()
            .map_err(js_error)?
            .set_onprogress(Some(on_upload_progress.as_ref().unchecked_ref()));

        let on_load = {
            let xhr = xhr.clone();
            let tx = tx.clone();
            Closure::<dyn FnMut()>::new(move || {
                let status = xhr.status().unwrap_or(0);
                let result = if (200..300).contains(&status) {
                    Ok(())
                } else {
                    let status_text = xhr.status_text().unwrap_or_default();
                    Err(ApiError::Status {
                        status,
                        message: format!("Upload failed: {}", status_text),
                    })
                };
                if let Some(tx) = tx.borrow_mut().take() {
                    let _ = tx.send(result);
                }
            })
        };
        xhr.set_onload(Some(on_load.as_ref().unchecked_ref()));

        let on_error = {
            let tx = tx.clone();
            Closure::<dyn FnMut()>::new(move || {
                if let Some(tx) = tx.borrow_mut().take() {
                    let _ = tx.send(Err(ApiError::Network("Upload failed".to_string())));
                }
            })
        };
        xhr.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        xhr.open("POST", &url).map_err(js_error)?;
        if let Some(bearer) = self.bearer() {
            xhr.set_request_header(HEADER_AUTHORIZATION, &bearer)
                .map_err(js_error)?;
        }
        xhr.send_with_opt_form_data(Some(form)).map_err(js_error)?;

        // 回调闭包需存活到请求结束
        let result = rx
            .await
            .unwrap_or_else(|_| Err(ApiError::Network("Upload aborted".to_string())));
        drop((on_upload_progress, on_load, on_error));

        match &result {
            Ok(()) => log!("[Api] Summary uploaded for lesson {}.", lesson_id),
            Err(e) => error!("[Api] Summary upload for lesson {} failed: {}", lesson_id, e),
        }
        result
    }

    /// 下载课程总结并触发浏览器保存
    pub async fn download_summary(&self, lesson_id: &str) -> ApiResult<()> {
        use gloo_net::http::Request;

        let url = self.config().url(&summary_path(lesson_id));
        let mut builder = Request::get(&url);
        if let Some(bearer) = self.bearer() {
            builder = builder.header(HEADER_AUTHORIZATION, &bearer);
        }
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !response.ok() {
            let message = format!("Failed to download summary: {}", response.status_text());
            error!("[Api] {}", message);
            return Err(ApiError::Status {
                status: response.status(),
                message,
            });
        }

        let filename = response
            .headers()
            .get("Content-Disposition")
            .and_then(|value| filename_from_disposition(&value))
            .unwrap_or_else(|| format!("lesson-{}-summary", lesson_id));

        let bytes = response
            .binary()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        save_bytes(&bytes, &filename).map_err(js_error)
    }
}

/// 把字节保存为本地文件
fn save_bytes(bytes: &[u8], filename: &str) -> Result<(), JsValue> {
    let parts = js_sys::Array::of1(&js_sys::Uint8Array::from(bytes));
    let blob = Blob::new_with_u8_array_sequence(&parts)?;
    let object_url = Url::create_object_url_with_blob(&blob)?;

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("document unavailable"))?;
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("document body unavailable"))?;

    let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    anchor.set_href(&object_url);
    anchor.set_download(filename);
    body.append_child(&anchor)?;
    anchor.click();

    Url::revoke_object_url(&object_url)?;
    body.remove_child(&anchor)?;
    Ok(())
}

/// 上传进度百分比
pub fn upload_percent(loaded: f64, total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    (loaded / total * 100.0).clamp(0.0, 100.0)
}

/// 从 `Content-Disposition` 中取出文件名
pub fn filename_from_disposition(header: &str) -> Option<String> {
    let start = header.find("filename")?;
    let rest = &header[start + "filename".len()..];

    // filename 与 '=' 之间只允许出现 '*' 之类的修饰，不允许跨越参数
    let eq = rest.find('=')?;
    if rest[..eq].contains([';', '\n']) {
        return None;
    }
    let value = rest[eq + 1..].trim_start();

    let raw = match value.chars().next() {
        Some(quote @ ('"' | '\'')) => {
            let inner = &value[1..];
            match inner.find(quote) {
                Some(end) => &inner[..end],
                None => inner,
            }
        }
        _ => value.split([';', '\n']).next().unwrap_or_default(),
    };

    // RFC 5987: filename*=UTF-8''name.pdf
    let raw = raw
        .strip_prefix("UTF-8''")
        .or_else(|| raw.strip_prefix("utf-8''"))
        .unwrap_or(raw);
    let name = raw.replace(['"', '\''], "");
    let name = name.trim();

    (!name.is_empty()).then(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_quoted() {
        assert_eq!(
            filename_from_disposition(r#"attachment; filename="summary 1.pdf""#).as_deref(),
            Some("summary 1.pdf")
        );
    }

    #[test]
    fn test_filename_unquoted_with_trailing_params() {
        assert_eq!(
            filename_from_disposition("attachment; filename=notes.docx; size=120").as_deref(),
            Some("notes.docx")
        );
    }

    #[test]
    fn test_filename_extended_form() {
        assert_eq!(
            filename_from_disposition("attachment; filename*=UTF-8''report.pdf").as_deref(),
            Some("report.pdf")
        );
    }

    #[test]
    fn test_filename_missing() {
        assert_eq!(filename_from_disposition("inline"), None);
        assert_eq!(filename_from_disposition("attachment; filename="), None);
    }

    #[test]
    fn test_upload_percent() {
        assert_eq!(upload_percent(50.0, 200.0), 25.0);
        assert_eq!(upload_percent(10.0, 0.0), 0.0);
        assert_eq!(upload_percent(300.0, 200.0), 100.0);
    }
}
