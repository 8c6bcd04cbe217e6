// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Provisioning and record lifecycle against an in-memory platform.

mod common;

use std::sync::Arc;

use common::{InMemoryPlatform, SCHEMA};
use metaobject_orm::{prelude::*, registry, shape::ShapeCache};

#[tokio::test]
async fn provision_is_ordered_and_idempotent() {
    let schema = Schema::from_toml_str(SCHEMA).unwrap();
    let platform = Arc::new(InMemoryPlatform::new(&schema));
    let manager = DefinitionManager::new(platform.clone());

    let report = manager.provision(&schema).await.unwrap();
    assert_eq!(report.layers, vec![vec!["store_type".to_string()], vec!["store".to_string()]]);
    assert_eq!(report.created, vec!["store_type", "store"]);
    assert_eq!(platform.definition_types(), vec!["store", "store_type"]);

    let again = DefinitionManager::new(platform.clone())
        .provision(&schema)
        .await
        .unwrap();
    assert!(again.created.is_empty());
    assert_eq!(again.existing.len(), 2);
    assert_eq!(again.ids, report.ids);
}

#[tokio::test]
async fn record_lifecycle() {
    let schema = Schema::from_toml_str(SCHEMA).unwrap();
    let platform = Arc::new(InMemoryPlatform::new(&schema));

    let types = Repository::new(platform.clone(), &schema, "store_type").unwrap();
    let flagship = types
        .create(
            &RecordInput::new().handle("flagship").field("label", "Flagship"),
            &FindOptions::new()
        )
        .await
        .unwrap();

    let stores = Repository::new(platform.clone(), &schema, "store").unwrap();
    let created = stores
        .create(
            &RecordInput::new()
                .handle("main")
                .field("title", "Main")
                .field("storeType", flagship.id())
                .field("floors", 3_i64),
            &FindOptions::new()
        )
        .await
        .unwrap();
    assert_eq!(created.get("floors"), Some(&FieldValue::Integer(3)));
    assert_eq!(created.get("storeType").and_then(FieldValue::as_str), Some(flagship.id()));

    let duplicate = stores
        .create(&RecordInput::new().handle("main").field("title", "Other"), &FindOptions::new())
        .await
        .unwrap_err();
    let Error::UserErrors(errors) = duplicate else {
        panic!("expected user errors");
    };
    assert!(errors.has_code("TAKEN"));

    let updated = stores
        .update(created.id(), &RecordInput::new().field("title", "Renamed"), &FindOptions::new())
        .await
        .unwrap();
    assert_eq!(updated.get("title").and_then(FieldValue::as_str), Some("Renamed"));
    assert_eq!(updated.get("floors"), Some(&FieldValue::Integer(3)));

    let upserted = stores
        .upsert("main", &RecordInput::new().field("floors", 4_i64), &FindOptions::new())
        .await
        .unwrap();
    assert_eq!(upserted.id(), created.id());
    assert_eq!(upserted.get("floors"), Some(&FieldValue::Integer(4)));

    assert_eq!(stores.find_all(&FindOptions::new()).await.unwrap().len(), 1);

    assert_eq!(stores.delete(created.id()).await.unwrap(), created.id());
    assert!(
        stores
            .find_by_handle("main", &FindOptions::new())
            .await
            .unwrap()
            .is_none()
    );
    assert_eq!(platform.record_count(), 1);
}

#[tokio::test]
async fn empty_values_clear_fields() {
    let schema = Schema::from_toml_str(SCHEMA).unwrap();
    let platform = Arc::new(InMemoryPlatform::new(&schema));
    let stores = Repository::new(platform, &schema, "store").unwrap();

    let created = stores
        .create(
            &RecordInput::new().handle("x").field("title", "X").field("floors", 2_i64),
            &FindOptions::new()
        )
        .await
        .unwrap();
    let cleared = stores
        .update(created.id(), &RecordInput::new().field("floors", FieldValue::Null), &FindOptions::new())
        .await
        .unwrap();
    assert_eq!(cleared.get("floors"), Some(&FieldValue::Null));
}

#[test]
fn registry_and_shape_cache_serve_the_same_schema() {
    let schema = Schema::from_toml_str(SCHEMA).unwrap();
    let installed = registry::install(schema).unwrap_or_else(|_| panic!("registry already installed"));
    assert!(registry::is_installed());
    assert!(std::ptr::eq(installed, registry::schema().unwrap()));

    let cache = ShapeCache::new();
    let mut paths = PopulateSet::new();
    paths.insert("storeType");
    let first = cache.shape_of(installed, "store", &paths).unwrap();
    let second = cache.shape_of(installed, "store", &paths).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.len(), 1);
}
