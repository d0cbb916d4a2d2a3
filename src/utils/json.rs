// src/utils/json.rs

use axum::extract::FromRequest;

use crate::error::AppError;

/// JSON body extractor whose rejections go through `AppError`,
/// so a bad body gets a 400 with the usual `{"error": ...}` shape.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
