//! `Json`, `Query` and `Multipart` extractors whose rejections render as [`AppError`].

use axum::async_trait;
use axum::extract::{FromRequest, FromRequestParts, Multipart, Request};

use crate::errors::AppError;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

pub struct ApiMultipart(pub Multipart);

#[async_trait]
impl<S> FromRequest<S> for ApiMultipart
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let multipart = Multipart::from_request(req, state).await?;
        Ok(ApiMultipart(multipart))
    }
}
