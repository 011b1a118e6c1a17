//! Integration tests for the recipe flow: creation, ingredients, diet
//! queries, avatars and illustrations.

mod common;

use http::StatusCode;

use cookbook_server::http_server::api::v0::ingredient_types::UpsertIngredientTypeRequest;
use cookbook_server::http_server::api::v0::people::UpsertPersonRequest;
use cookbook_server::http_server::api::v0::recipes::{
    GetIllustrationsRequest, GetIngredientsRequest, GetRecipeRequest, ListRecipesRequest,
    SetIllustrationsRequest, SetIngredientsRequest, UpsertRecipeRequest,
};
use cookbook_server::{
    Address, ApiClient, ApiError, DietFlags, Group, IngredientTemplate, PersonName,
    RecipeCategory, Unit,
};

async fn create_type(client: &ApiClient, alias: &str, diet: DietFlags) -> i64 {
    client
        .call(UpsertIngredientTypeRequest {
            id: 0,
            version: 1,
            alias: alias.to_string(),
            description: None,
            diet,
        })
        .await
        .unwrap()
        .id
}

fn recipe_template(title: &str) -> UpsertRecipeRequest {
    UpsertRecipeRequest {
        id: 0,
        version: 1,
        title: title.to_string(),
        category: RecipeCategory::MainCourse,
        description: Some("hearty".to_string()),
        instruction: Some("stir well".to_string()),
    }
}

fn ingredient(type_reference: i64, amount: f64, unit: Unit) -> IngredientTemplate {
    IngredientTemplate {
        id: 0,
        version: 1,
        amount,
        unit,
        type_reference,
    }
}

#[tokio::test]
async fn recipe_round_trip_with_ingredients() {
    let server = common::spawn().await;
    let admin = server.admin_client();

    let vegan = DietFlags {
        vegan: true,
        ..Default::default()
    };
    let carrot = create_type(&admin, "carrot", vegan).await;
    let salmon = create_type(&admin, "salmon", DietFlags {
        pescatarian: true,
        ..Default::default()
    })
    .await;

    let recipe_id = admin.call(recipe_template("Carrot Soup")).await.unwrap().id;

    admin
        .call(SetIngredientsRequest {
            recipe_id,
            ingredients: vec![
                ingredient(carrot, 500.0, Unit::Gram),
                ingredient(salmon, 200.0, Unit::Gram),
            ],
        })
        .await
        .unwrap();

    let ingredients = admin
        .call(GetIngredientsRequest { recipe_id })
        .await
        .unwrap();
    assert_eq!(ingredients.len(), 2);
    assert_eq!(ingredients[0].unit, Unit::Gram);

    let info = admin.call(GetRecipeRequest { id: recipe_id }).await.unwrap();
    assert_eq!(info.title, "Carrot Soup");
    assert_eq!(info.ingredient_references.len(), 2);
    // salmon is pescatarian but not vegan
    assert!(info.diet.pescatarian);
    assert!(!info.diet.vegan);
}

#[tokio::test]
async fn ingredient_replacement_drops_unlisted_rows() {
    let server = common::spawn().await;
    let admin = server.admin_client();

    let carrot = create_type(&admin, "carrot", DietFlags::default()).await;
    let onion = create_type(&admin, "onion", DietFlags::default()).await;
    let recipe_id = admin.call(recipe_template("Stew")).await.unwrap().id;

    admin
        .call(SetIngredientsRequest {
            recipe_id,
            ingredients: vec![
                ingredient(carrot, 2.0, Unit::Piece),
                ingredient(onion, 1.0, Unit::Piece),
            ],
        })
        .await
        .unwrap();

    let before = admin
        .call(GetIngredientsRequest { recipe_id })
        .await
        .unwrap();
    assert_eq!(before.len(), 2);

    // keep only the carrot row, updating its amount
    let keep = IngredientTemplate {
        id: before[0].base.id,
        version: 2,
        amount: 3.0,
        unit: Unit::Piece,
        type_reference: carrot,
    };
    admin
        .call(SetIngredientsRequest {
            recipe_id,
            ingredients: vec![keep],
        })
        .await
        .unwrap();

    let after = admin
        .call(GetIngredientsRequest { recipe_id })
        .await
        .unwrap();
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].base.id, before[0].base.id);
    assert_eq!(after[0].amount, 3.0);
    assert_eq!(after[0].base.version, 2);
}

#[tokio::test]
async fn unknown_ingredient_type_is_not_found() {
    let server = common::spawn().await;
    let admin = server.admin_client();
    let recipe_id = admin.call(recipe_template("Mystery")).await.unwrap().id;

    let error = admin
        .call(SetIngredientsRequest {
            recipe_id,
            ingredients: vec![ingredient(999_999, 1.0, Unit::Piece)],
        })
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        ApiError::HttpStatus(StatusCode::NOT_FOUND, _)
    ));
}

#[tokio::test]
async fn diet_queries_use_all_ingredient_semantics() {
    let server = common::spawn().await;
    let admin = server.admin_client();

    let vegan = DietFlags {
        vegan: true,
        ..Default::default()
    };
    let carrot = create_type(&admin, "carrot", vegan).await;
    let salmon = create_type(&admin, "salmon", DietFlags {
        pescatarian: true,
        ..Default::default()
    })
    .await;

    let soup = admin.call(recipe_template("Carrot Soup")).await.unwrap().id;
    admin
        .call(SetIngredientsRequest {
            recipe_id: soup,
            ingredients: vec![ingredient(carrot, 500.0, Unit::Gram)],
        })
        .await
        .unwrap();

    let bowl = admin.call(recipe_template("Salmon Bowl")).await.unwrap().id;
    admin
        .call(SetIngredientsRequest {
            recipe_id: bowl,
            ingredients: vec![
                ingredient(carrot, 100.0, Unit::Gram),
                ingredient(salmon, 200.0, Unit::Gram),
            ],
        })
        .await
        .unwrap();

    let vegan_only = admin
        .call(ListRecipesRequest {
            vegan: Some(true),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(vegan_only.len(), 1);
    assert_eq!(vegan_only[0].id, soup);

    let pescatarian = admin
        .call(ListRecipesRequest {
            pescatarian: Some(true),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(pescatarian.len(), 2);

    let by_owner = admin
        .call(ListRecipesRequest {
            owner_email: Some(cookbook_server::SEED_ADMIN_EMAIL.to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_owner.len(), 2);
}

#[tokio::test]
async fn avatars_deduplicate_through_the_store() {
    let server = common::spawn().await;
    let admin = server.admin_client();
    let recipe_id = admin.call(recipe_template("Pretty Dish")).await.unwrap().id;

    let png = b"fake png bytes".to_vec();
    let uploaded = admin
        .upload_document("image/png", png.clone())
        .await
        .unwrap();

    // re-uploading the same bytes as an avatar re-points at the same document
    let response = admin
        .http_client()
        .put(
            server
                .url
                .join(&format!("/api/v0/recipes/{recipe_id}/avatar"))
                .unwrap(),
        )
        .header(http::header::CONTENT_TYPE, "image/png")
        .body(png.clone())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["id"].as_i64(), Some(uploaded));

    let avatar = admin
        .http_client()
        .get(
            server
                .url
                .join(&format!("/api/v0/recipes/{recipe_id}/avatar"))
                .unwrap(),
        )
        .header(http::header::ACCEPT, "image/*")
        .send()
        .await
        .unwrap();
    assert_eq!(avatar.status(), StatusCode::OK);
    assert_eq!(avatar.bytes().await.unwrap(), png.as_slice());
}

#[tokio::test]
async fn illustrations_replace_wholesale_and_drop_unknown_ids() {
    let server = common::spawn().await;
    let admin = server.admin_client();
    let recipe_id = admin.call(recipe_template("Illustrated")).await.unwrap().id;

    let one = admin
        .upload_document("image/png", b"illustration one".to_vec())
        .await
        .unwrap();
    let two = admin
        .upload_document("image/jpeg", b"illustration two".to_vec())
        .await
        .unwrap();

    admin
        .call(SetIllustrationsRequest {
            recipe_id,
            document_ids: vec![two, one, 999_999],
        })
        .await
        .unwrap();

    let references = admin
        .call(GetIllustrationsRequest { recipe_id })
        .await
        .unwrap();
    assert_eq!(references, vec![one, two]);

    admin
        .call(SetIllustrationsRequest {
            recipe_id,
            document_ids: vec![two],
        })
        .await
        .unwrap();
    let references = admin
        .call(GetIllustrationsRequest { recipe_id })
        .await
        .unwrap();
    assert_eq!(references, vec![two]);
}

#[tokio::test]
async fn only_owner_or_admin_may_update() {
    let server = common::spawn().await;
    let admin = server.admin_client();

    admin
        .call(UpsertPersonRequest {
            id: 0,
            version: 1,
            email: "guest@example.org".to_string(),
            group: Group::User,
            name: PersonName {
                title: None,
                family: "Guest".to_string(),
                given: "Gwen".to_string(),
            },
            address: Address::default(),
            phones: Vec::new(),
            set_password: Some("guest!".to_string()),
        })
        .await
        .unwrap();

    let recipe_id = admin.call(recipe_template("Admin's Own")).await.unwrap().id;

    let guest = server.client("guest@example.org", "guest!");
    let mut update = recipe_template("Admin's Own");
    update.id = recipe_id;
    let error = guest.call(update).await.unwrap_err();
    assert!(matches!(
        error,
        ApiError::HttpStatus(StatusCode::FORBIDDEN, _)
    ));

    // guests still create their own recipes
    let own = guest.call(recipe_template("Guest Dish")).await.unwrap();
    let info = admin.call(GetRecipeRequest { id: own.id }).await.unwrap();
    assert!(info.owner_reference.is_some());
}

#[tokio::test]
async fn duplicate_title_conflicts() {
    let server = common::spawn().await;
    let admin = server.admin_client();

    admin.call(recipe_template("Twice")).await.unwrap();
    let error = admin.call(recipe_template("Twice")).await.unwrap_err();
    assert!(matches!(
        error,
        ApiError::HttpStatus(StatusCode::CONFLICT, _)
    ));
}
