// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use garzone_http::{
    BodyKind,
    HeaderName,
    Method,
    Request,
    Response,
    StatusCode,
};

use crate::{
    GarzoneSettings,
    MediaType,
    find_request_path_in_document_root,
};

/// Serves a file from the document root.
///
/// `HEAD` answers with the exact headers a `GET` would carry, including the
/// file-sized `Content-Length`, but without a body.
pub async fn serve_file(request: &Request, settings: &GarzoneSettings) -> Response {
    let path = match find_request_path_in_document_root(&settings.document_root, request.target.as_str()) {
        Ok(path) => path,
        Err(response) => return response,
    };

    let Ok(metadata) = tokio::fs::metadata(&path).await else {
        return Response::with_status(StatusCode::NotFound);
    };

    if !metadata.is_file() {
        return Response::with_status(StatusCode::NotFound);
    }

    let mut response = Response::with_status(StatusCode::Ok);

    if request.method != Method::Head {
        match tokio::fs::read(&path).await {
            Ok(contents) => response.body = Some(BodyKind::Bytes(contents)),
            Err(_) => return Response::with_status(StatusCode::NotFound),
        }
    }

    response.headers.set_content_length(metadata.len() as usize);
    if let Ok(modified_date) = metadata.modified() {
        response.headers.set_last_modified(modified_date);
    }
    response.headers.append_or_override(HeaderName::Allow, "GET,HEAD".into());
    response.headers.append_or_override(
        HeaderName::ContentType,
        MediaType::from_path(&path.to_string_lossy()).into());

    response
}
