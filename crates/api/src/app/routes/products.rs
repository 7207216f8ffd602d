use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use catalog_core::{validation, AppError, ErrorKind, PageRequest, RequestContext};
use catalog_products::ProductId;

use crate::app::dto::{
    CreateProdutoRequest, ListProdutosQuery, PatchProdutoRequest, ProdutoResponse,
    UpdateProdutoRequest,
};
use crate::app::errors::ApiResult;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_produtos).post(create_produto))
        .route(
            "/:id",
            get(get_produto)
                .put(update_produto)
                .patch(patch_produto)
                .delete(delete_produto),
        )
}

pub async fn list_produtos(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    query: Result<Query<ListProdutosQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(query) = query.map_err(|e| {
        tracing::debug!(error = %e.body_text(), "rejected query string");
        AppError::new(ErrorKind::BadRequest)
    })?;

    if query.wants_page() {
        let page = services
            .products
            .find_all_paginated(
                &ctx,
                PageRequest::new(query.page, query.page_size),
                query.filter(),
            )
            .await?;
        return Ok(Json(page.map(ProdutoResponse::from)).into_response());
    }

    let all = services.products.find_all(&ctx).await?;
    let body: Vec<ProdutoResponse> = all.into_iter().map(ProdutoResponse::from).collect();
    Ok(Json(body).into_response())
}

pub async fn get_produto(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let id: ProductId = id.parse()?;
    let product = services.products.find_by_id(&ctx, id).await?;
    Ok(Json(ProdutoResponse::from(product)).into_response())
}

pub async fn create_produto(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    body: Result<Json<CreateProdutoRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let req = decode(body)?;
    validation::validate(&req)?;

    let created = services.products.create(&ctx, req.to_model()).await?;
    Ok((StatusCode::CREATED, Json(ProdutoResponse::from(created))).into_response())
}

pub async fn update_produto(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    body: Result<Json<UpdateProdutoRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let id: ProductId = id.parse()?;
    let req = decode(body)?;
    validation::validate(&req)?;

    let updated = services.products.update(&ctx, id, req.to_model()).await?;
    Ok(Json(ProdutoResponse::from(updated)).into_response())
}

pub async fn patch_produto(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    body: Result<Json<PatchProdutoRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let id: ProductId = id.parse()?;
    let req = decode(body)?;
    validation::validate(&req)?;

    let patched = services.products.patch(&ctx, id, req.to_map()).await?;
    Ok(Json(ProdutoResponse::from(patched)).into_response())
}

pub async fn delete_produto(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let id: ProductId = id.parse()?;
    services.products.delete(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// Unwrap a JSON body, turning any decode failure into `BadRequest`.
fn decode<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "rejected request body");
            Err(AppError::new(ErrorKind::BadRequest))
        }
    }
}
