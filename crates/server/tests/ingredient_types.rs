//! Integration tests for the ingredient type endpoints.

mod common;

use http::StatusCode;

use cookbook_server::http_server::api::v0::ingredient_types::{
    GetIngredientTypeRequest, ListIngredientTypesRequest, UpsertIngredientTypeRequest,
};
use cookbook_server::{ApiError, DietFlags};

fn template(alias: &str, diet: DietFlags) -> UpsertIngredientTypeRequest {
    UpsertIngredientTypeRequest {
        id: 0,
        version: 1,
        alias: alias.to_string(),
        description: None,
        diet,
    }
}

#[tokio::test]
async fn diet_flags_cascade_on_creation() {
    let server = common::spawn().await;
    let admin = server.admin_client();

    let created = admin
        .call(template(
            "tofu",
            DietFlags {
                vegan: true,
                ..Default::default()
            },
        ))
        .await
        .unwrap();

    let tofu = admin
        .call(GetIngredientTypeRequest { id: created.id })
        .await
        .unwrap();
    assert!(tofu.diet.vegan);
    assert!(tofu.diet.lacto_vegetarian);
    assert!(tofu.diet.lacto_ovo_vegetarian);
    assert!(tofu.diet.pescatarian);
    assert_eq!(tofu.avatar_reference, cookbook_server::DEFAULT_AVATAR_ID);
}

#[tokio::test]
async fn duplicate_alias_conflicts() {
    let server = common::spawn().await;
    let admin = server.admin_client();

    admin
        .call(template("salt", DietFlags::default()))
        .await
        .unwrap();
    let error = admin
        .call(template("salt", DietFlags::default()))
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        ApiError::HttpStatus(StatusCode::CONFLICT, _)
    ));
}

#[tokio::test]
async fn query_by_diet_and_alias() {
    let server = common::spawn().await;
    let admin = server.admin_client();

    admin
        .call(template(
            "tofu",
            DietFlags {
                vegan: true,
                ..Default::default()
            },
        ))
        .await
        .unwrap();
    admin
        .call(template(
            "salmon",
            DietFlags {
                pescatarian: true,
                ..Default::default()
            },
        ))
        .await
        .unwrap();

    let vegan = admin
        .call(ListIngredientTypesRequest {
            vegan: Some(true),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(vegan.len(), 1);
    assert_eq!(vegan[0].alias, "tofu");

    let by_alias = admin
        .call(ListIngredientTypesRequest {
            alias: Some("salmon".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_alias.len(), 1);
    assert!(by_alias[0].diet.pescatarian);
    assert!(!by_alias[0].diet.vegan);
}

#[tokio::test]
async fn avatar_upload_requires_an_image_type() {
    let server = common::spawn().await;
    let admin = server.admin_client();

    let created = admin
        .call(template("basil", DietFlags::default()))
        .await
        .unwrap();
    let avatar_url = server
        .url
        .join(&format!("/api/v0/ingredient-types/{}/avatar", created.id))
        .unwrap();

    let response = admin
        .http_client()
        .put(avatar_url.clone())
        .header(http::header::CONTENT_TYPE, "text/plain")
        .body(b"not an image".to_vec())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let response = admin
        .http_client()
        .put(avatar_url.clone())
        .header(http::header::CONTENT_TYPE, "image/jpeg")
        .body(b"jpeg bytes".to_vec())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let avatar = admin
        .http_client()
        .get(avatar_url)
        .header(http::header::ACCEPT, "image/*")
        .send()
        .await
        .unwrap();
    assert_eq!(avatar.status(), StatusCode::OK);
    assert_eq!(
        avatar
            .headers()
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
        Some("image/jpeg")
    );
    assert_eq!(avatar.bytes().await.unwrap(), b"jpeg bytes".as_slice());
}
