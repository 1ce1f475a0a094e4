//! URL-encoded form extractor with validation, for endpoints that accept
//! form fields instead of JSON.

use crate::errors::AppError;
use axum::{
    extract::{Form, FromRequest, Request},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Deserializer, de, de::DeserializeOwned};
use std::{fmt, str::FromStr};
use validator::Validate;

pub struct ValidatedForm<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedForm<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(data) = Form::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::from(e).into_response())?;

        data.validate()
            .map_err(|e| AppError::from(e).into_response())?;

        Ok(ValidatedForm(data))
    }
}

/// Serde helper for optional form fields: an empty or blank value is `None`.
///
/// ```ignore
/// #[serde(default, deserialize_with = "axum_helpers::empty_string_as_none")]
/// pub title: Option<String>,
/// ```
pub fn empty_string_as_none<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let opt = Option::<String>::deserialize(de)?;
    match opt.as_deref() {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => T::from_str(s).map(Some).map_err(de::Error::custom),
    }
}
