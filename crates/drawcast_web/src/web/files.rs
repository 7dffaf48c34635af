use drawcast::UploadFile;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Reads every selected file into memory, in selection order.
pub(super) async fn read_uploads(list: &web_sys::FileList) -> Result<Vec<UploadFile>, String> {
    let mut out = Vec::with_capacity(list.length() as usize);
    for i in 0..list.length() {
        let Some(file) = list.get(i) else {
            continue;
        };
        let filename = file.name();
        let bytes = read_file_bytes(file).await?;
        out.push(UploadFile { filename, bytes });
    }
    Ok(out)
}

pub(super) async fn read_file_bytes(file: web_sys::File) -> Result<Vec<u8>, String> {
    let promise = file_reader_array_buffer_promise(file)?;
    let v = wasm_bindgen_futures::JsFuture::from(promise)
        .await
        .map_err(|_| "file: read failed".to_string())?;

    let buf = v
        .dyn_into::<js_sys::ArrayBuffer>()
        .map_err(|_| "file: expected ArrayBuffer".to_string())?;
    Ok(js_sys::Uint8Array::new(&buf).to_vec())
}

fn file_reader_array_buffer_promise(file: web_sys::File) -> Result<js_sys::Promise, String> {
    let reader =
        web_sys::FileReader::new().map_err(|_| "file: FileReader::new failed".to_string())?;
    reader
        .read_as_array_buffer(&file)
        .map_err(|_| "file: read_as_array_buffer failed".to_string())?;

    Ok(js_sys::Promise::new(&mut |resolve, reject| {
        let reject_err = reject.clone();
        let reader_ok = reader.clone();
        let onload = Closure::once_into_js(move |_ev: web_sys::ProgressEvent| {
            match reader_ok.result() {
                Ok(v) if !v.is_null() && !v.is_undefined() => {
                    let _ = resolve.call1(&JsValue::UNDEFINED, &v);
                }
                _ => {
                    let _ = reject.call1(&JsValue::UNDEFINED, &JsValue::from_str("file: missing result"));
                }
            }
        });
        reader.set_onload(Some(onload.unchecked_ref()));

        let onerror = Closure::once_into_js(move |_ev: web_sys::ProgressEvent| {
            let _ = reject_err.call1(&JsValue::UNDEFINED, &JsValue::from_str("file: read error"));
        });
        reader.set_onerror(Some(onerror.unchecked_ref()));
    }))
}
