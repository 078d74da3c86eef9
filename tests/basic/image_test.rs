use crate::common::{self, ALICE, TAG_ROADS};
use agora::publications::PublicationError;
use agora::storage::ObjectStore as _;

const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

#[actix_web::test]
async fn test_add_when_publication_exists_expect_ordered_images() {
    let context = common::initialize_context().await;
    let id = context.publish(ALICE, "Graffiti", &[]).await;
    let images = context.publications.images();

    let first = images.add(id, PNG.to_vec(), "image/png").await.unwrap();
    let second = images.add(id, vec![0xff, 0xd8], "image/jpeg").await.unwrap();

    assert_eq!(first.order, 1);
    assert_eq!(second.order, 2);
    assert!(first.key.starts_with(&format!("publications/{id}/images/1-")));
    assert!(first.key.ends_with(".png"));
    assert_eq!(context.store.keys().len(), 2);
    let listed = images.list(id).await.unwrap();
    let actual: Vec<i64> = listed.iter().map(|image| image.order).collect();
    assert_eq!(actual, vec![1, 2]);
}

#[actix_web::test]
async fn test_add_when_publication_missing_expect_not_found_and_nothing_stored() {
    let context = common::initialize_context().await;

    let actual = context
        .publications
        .images()
        .add(123, PNG.to_vec(), "image/png")
        .await;

    assert!(matches!(actual, Err(PublicationError::NotFound(123))));
    assert_eq!(context.store.puts(), 0);
    assert!(context.store.keys().is_empty());
}

#[actix_web::test]
async fn test_add_when_not_an_image_expect_invalid_input() {
    let context = common::initialize_context().await;
    let id = context.publish(ALICE, "Text upload", &[]).await;

    let actual = context
        .publications
        .images()
        .add(id, b"<html></html>".to_vec(), "text/html")
        .await;

    assert!(matches!(actual, Err(PublicationError::InvalidInput(_))));
    assert_eq!(context.count_rows("publication_image", id).await, 0);
}

#[actix_web::test]
async fn test_remove_when_present_expect_row_and_object_gone() {
    let context = common::initialize_context().await;
    let id = context.publish(ALICE, "Overflowing bin", &[]).await;
    let images = context.publications.images();
    let image = images.add(id, PNG.to_vec(), "image/png").await.unwrap();

    images.remove(id, image.order).await.unwrap();

    assert_eq!(context.count_rows("publication_image", id).await, 0);
    assert_eq!(context.store.deletes(), vec![image.key]);
    assert!(context.store.keys().is_empty());
    assert_eq!(context.count_all("pending_object_deletion").await, 0);
}

#[actix_web::test]
async fn test_remove_when_image_missing_expect_image_not_found() {
    let context = common::initialize_context().await;
    let id = context.publish(ALICE, "No images", &[]).await;

    let actual = context.publications.images().remove(id, 1).await;

    assert!(matches!(
        actual,
        Err(PublicationError::ImageNotFound { order: 1, .. })
    ));
}

#[actix_web::test]
async fn test_delete_when_two_images_expect_two_object_deletions() {
    let context = common::initialize_context().await;
    let id = context.publish(ALICE, "Two photos", &[TAG_ROADS]).await;
    let images = context.publications.images();
    let first = images.add(id, PNG.to_vec(), "image/png").await.unwrap();
    let second = images.add(id, PNG.to_vec(), "image/png").await.unwrap();

    let actual = context.publications.delete(id).await.unwrap();

    assert_eq!(actual.images_removed, 2);
    let mut deletes = context.store.deletes();
    deletes.sort();
    let mut expected = vec![first.key, second.key];
    expected.sort();
    assert_eq!(deletes, expected);
    assert_eq!(context.count_rows("publication_image", id).await, 0);
}

#[actix_web::test]
async fn test_delete_when_object_store_fails_expect_rows_gone_and_keys_queued() {
    let context = common::initialize_context().await;
    let id = context.publish(ALICE, "Store outage", &[]).await;
    let images = context.publications.images();
    images.add(id, PNG.to_vec(), "image/png").await.unwrap();
    images.add(id, PNG.to_vec(), "image/png").await.unwrap();
    context.store.fail_deletes(true);

    let actual = context.publications.delete(id).await.unwrap();

    assert_eq!(context.store.deletes().len(), 2);
    assert_eq!(actual.pending_objects.len(), 2);
    assert_eq!(context.count_rows("publication", id).await, 0);
    assert_eq!(context.count_rows("publication_image", id).await, 0);
    let mut pending = context.publications.cleanup().pending(10).await.unwrap();
    pending.sort();
    let mut expected = actual.pending_objects.clone();
    expected.sort();
    assert_eq!(pending, expected);
    assert_eq!(context.store.keys().len(), 2);
}

#[actix_web::test]
async fn test_reconcile_when_store_recovers_expect_queue_drained() {
    let context = common::initialize_context().await;
    let id = context.publish(ALICE, "Recovering", &[]).await;
    context
        .publications
        .images()
        .add(id, PNG.to_vec(), "image/png")
        .await
        .unwrap();
    context.store.fail_deletes(true);
    context.publications.delete(id).await.unwrap();
    let cleanup = context.publications.cleanup();

    let still_failing = cleanup.reconcile(10).await.unwrap();
    context.store.fail_deletes(false);
    let recovered = cleanup.reconcile(10).await.unwrap();

    assert_eq!(still_failing.attempted, 1);
    assert_eq!(still_failing.pending.len(), 1);
    assert_eq!(recovered.attempted, 1);
    assert_eq!(recovered.purged, 1);
    assert!(recovered.pending.is_empty());
    assert!(cleanup.pending(10).await.unwrap().is_empty());
    assert!(context.store.keys().is_empty());
}

#[actix_web::test]
async fn test_open_when_signed_url_expect_bytes() {
    let context = common::initialize_context().await;
    let id = context.publish(ALICE, "Signed", &[]).await;
    let images = context.publications.images();
    images.add(id, PNG.to_vec(), "image/png").await.unwrap();

    let detail = context.publications.find_by_id(id).await.unwrap();
    let view = &detail.images[0];
    let url = url::Url::parse(&view.url).unwrap();
    let param = |name: &str| {
        url.query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
            .unwrap()
    };
    let expires: i64 = param("expires").parse().unwrap();

    let actual = images
        .open(&view.image.key, expires, &param("signature"))
        .await
        .unwrap();
    assert_eq!(actual.bytes, PNG);
    assert_eq!(actual.content_type, "image/png");

    let tampered = images.open(&view.image.key, expires + 1, &param("signature")).await;
    assert!(matches!(tampered, Err(PublicationError::InvalidSignature)));
}

#[actix_web::test]
async fn test_reconcile_when_key_never_attempted_expect_purged() {
    let context = common::initialize_context().await;
    let key = "publications/1/images/1-1.png";
    context
        .store
        .put(key, PNG.to_vec(), "image/png")
        .await
        .unwrap();
    sqlx::query(
        "INSERT INTO pending_object_deletion ( image_key, queued_at, attempts ) VALUES ( $1, $2, 0 )",
    )
    .bind(key)
    .bind("2024-01-01T00:00:00.000000Z")
    .execute(&context.db.pool)
    .await
    .unwrap();
    let cleanup = context.publications.cleanup();

    assert_eq!(cleanup.pending(10).await.unwrap(), vec![key.to_owned()]);
    let actual = cleanup.reconcile(10).await.unwrap();

    assert_eq!(actual.attempted, 1);
    assert_eq!(actual.purged, 1);
    assert!(actual.pending.is_empty());
    assert!(context.store.keys().is_empty());
    assert_eq!(context.count_all("pending_object_deletion").await, 0);
}
