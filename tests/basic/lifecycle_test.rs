use crate::common::{
    self, ADMIN, ALICE, BOB, CAROL, MISSING_TAG, TAG_LIGHTING, TAG_PARKS, TAG_ROADS,
};
use agora::publications::PublicationError;

#[actix_web::test]
async fn test_create_when_no_tags_expect_tag_tables_untouched() {
    let context = common::initialize_context().await;
    let tags_before = context.count_all("tag").await;

    let id = context.publish(ALICE, "Broken bench", &[]).await;

    assert_eq!(context.count_rows("publication", id).await, 1);
    assert_eq!(context.count_all("publication_tag").await, 0);
    assert_eq!(context.count_all("tag").await, tags_before);
}

#[actix_web::test]
async fn test_create_when_mixed_tags_expect_only_existing_attached() {
    let context = common::initialize_context().await;

    let id = context
        .publish(ALICE, "Dark alley", &[TAG_ROADS, MISSING_TAG])
        .await;

    let tags = context.publications.tags().tags_of(id).await.unwrap();
    let actual: Vec<i64> = tags.iter().map(|tag| tag.id).collect();
    assert_eq!(actual, vec![TAG_ROADS]);
}

#[actix_web::test]
async fn test_create_when_only_missing_tags_expect_invalid_reference_and_no_row() {
    let context = common::initialize_context().await;

    let actual = context
        .publications
        .create(&common::new_publication(ALICE, "Ghost tags"), &[MISSING_TAG, 42])
        .await;

    assert!(matches!(actual, Err(PublicationError::InvalidReference(_))));
    assert_eq!(context.count_all("publication").await, 0);
    assert_eq!(context.count_all("publication_tag").await, 0);
}

#[actix_web::test]
async fn test_create_when_unknown_city_expect_error_and_no_row() {
    let context = common::initialize_context().await;
    let mut data = common::new_publication(ALICE, "Nowhere");
    data.city_id = 999;

    let actual = context.publications.create(&data, &[TAG_ROADS]).await;

    assert!(matches!(actual, Err(PublicationError::StorageFailure(_))));
    assert_eq!(context.count_all("publication").await, 0);
}

#[actix_web::test]
async fn test_create_when_duplicate_tag_ids_expect_attached_once() {
    let context = common::initialize_context().await;

    let id = context
        .publish(ALICE, "Repeated", &[TAG_PARKS, TAG_PARKS])
        .await;

    assert_eq!(context.count_rows("publication_tag", id).await, 1);
}

#[actix_web::test]
async fn test_find_by_id_when_created_expect_details() {
    let context = common::initialize_context().await;
    let id = context
        .publish(BOB, "Flooded park", &[TAG_PARKS, TAG_LIGHTING])
        .await;
    context.publications.votes().toggle(id, ALICE).await.unwrap();

    let actual = context.publications.find_by_id(id).await.unwrap();

    assert_eq!(actual.summary.publication.title, "Flooded park");
    assert_eq!(actual.summary.user.username, "bob");
    assert_eq!(actual.summary.votes_count, 1);
    assert_eq!(actual.city.name, "Springfield");
    assert_eq!(actual.publication_type.name, "Complaint");
    assert_eq!(actual.tags.len(), 2);
    assert!(actual.images.is_empty());
}

#[actix_web::test]
async fn test_find_by_id_when_missing_expect_not_found() {
    let context = common::initialize_context().await;

    let actual = context.publications.find_by_id(99999).await;

    assert!(matches!(actual, Err(PublicationError::NotFound(99999))));
}

#[actix_web::test]
async fn test_delete_when_fully_attached_expect_no_rows_left() {
    let context = common::initialize_context().await;
    let id = context
        .publish(ALICE, "Cracked sidewalk", &[TAG_ROADS, TAG_PARKS])
        .await;
    let votes = context.publications.votes();
    votes.toggle(id, ALICE).await.unwrap();
    votes.toggle(id, BOB).await.unwrap();
    votes.toggle(id, CAROL).await.unwrap();
    let images = context.publications.images();
    images.add(id, vec![1, 2, 3], "image/png").await.unwrap();

    let actual = context.publications.delete(id).await.unwrap();

    assert_eq!(actual.tags_removed, 2);
    assert_eq!(actual.votes_removed, 3);
    assert_eq!(actual.images_removed, 1);
    assert!(actual.pending_objects.is_empty());
    for table in ["publication", "publication_tag", "vote", "publication_image"] {
        assert_eq!(context.count_rows(table, id).await, 0, "rows left in {table}");
    }
    assert_eq!(context.count_all("pending_object_deletion").await, 0);
    assert!(context.store.keys().is_empty());
}

#[actix_web::test]
async fn test_delete_when_missing_expect_not_found_and_nothing_mutated() {
    let context = common::initialize_context().await;
    let id = context.publish(ALICE, "Bystander", &[TAG_ROADS]).await;
    context.publications.votes().toggle(id, BOB).await.unwrap();
    context
        .publications
        .images()
        .add(id, vec![1, 2], "image/png")
        .await
        .unwrap();
    let tables = [
        "publication",
        "publication_tag",
        "vote",
        "publication_image",
        "pending_object_deletion",
    ];
    let mut before = vec![];
    for table in tables {
        before.push(context.count_all(table).await);
    }

    let actual = context.publications.delete(99999).await;

    assert!(matches!(actual, Err(PublicationError::NotFound(99999))));
    let mut after = vec![];
    for table in tables {
        after.push(context.count_all(table).await);
    }
    assert_eq!(before, vec![1, 1, 1, 1, 0]);
    assert_eq!(after, before);
    assert!(context.store.deletes().is_empty());
    assert_eq!(context.store.keys().len(), 1);
}

#[actix_web::test]
async fn test_delete_when_other_publications_exist_expect_them_untouched() {
    let context = common::initialize_context().await;
    let doomed = context.publish(ALICE, "Doomed", &[TAG_ROADS]).await;
    let kept = context.publish(BOB, "Kept", &[TAG_ROADS]).await;
    context.publications.votes().toggle(kept, ALICE).await.unwrap();

    context.publications.delete(doomed).await.unwrap();

    assert_eq!(context.count_rows("publication", kept).await, 1);
    assert_eq!(context.count_rows("publication_tag", kept).await, 1);
    assert_eq!(context.count_rows("vote", kept).await, 1);
}

#[actix_web::test]
async fn test_delete_when_deleted_twice_expect_not_found() {
    let context = common::initialize_context().await;
    let id = context.publish(ALICE, "Once", &[]).await;

    context.publications.delete(id).await.unwrap();
    let actual = context.publications.delete(id).await;

    assert!(matches!(actual, Err(PublicationError::NotFound(_))));
}

#[actix_web::test]
async fn test_set_tags_when_replacing_expect_new_set() {
    let context = common::initialize_context().await;
    let id = context.publish(ALICE, "Retag", &[TAG_ROADS]).await;

    context
        .publications
        .tags()
        .set_tags(id, &[TAG_PARKS, TAG_LIGHTING, MISSING_TAG])
        .await
        .unwrap();

    let tags = context.publications.tags().tags_of(id).await.unwrap();
    let mut actual: Vec<i64> = tags.iter().map(|tag| tag.id).collect();
    actual.sort_unstable();
    assert_eq!(actual, vec![TAG_PARKS, TAG_LIGHTING]);
}

#[actix_web::test]
async fn test_set_tags_when_only_missing_expect_previous_tags_kept() {
    let context = common::initialize_context().await;
    let id = context.publish(ALICE, "Keep tags", &[TAG_ROADS]).await;

    let actual = context.publications.tags().set_tags(id, &[MISSING_TAG]).await;

    assert!(matches!(actual, Err(PublicationError::InvalidReference(_))));
    assert_eq!(context.count_rows("publication_tag", id).await, 1);
}

#[actix_web::test]
async fn test_set_tags_when_publication_missing_expect_not_found() {
    let context = common::initialize_context().await;

    let actual = context.publications.tags().set_tags(77, &[TAG_ROADS]).await;

    assert!(matches!(actual, Err(PublicationError::NotFound(77))));
}

#[actix_web::test]
async fn test_create_when_no_reference_link_expect_none_read_back() {
    let context = common::initialize_context().await;

    let created = context
        .publications
        .create(&common::new_publication(ALICE, "No link"), &[])
        .await
        .unwrap();

    assert_eq!(created.reference_link, None);
    let detail = context.publications.find_by_id(created.id).await.unwrap();
    assert_eq!(detail.summary.publication.reference_link, None);
}

#[actix_web::test]
async fn test_create_when_reference_link_expect_link_read_back() {
    let context = common::initialize_context().await;
    let mut data = common::new_publication(ALICE, "With link");
    data.reference_link = Some("https://example.org/minutes/12".to_owned());

    let created = context.publications.create(&data, &[]).await.unwrap();

    assert_eq!(
        created.reference_link.as_deref(),
        Some("https://example.org/minutes/12")
    );
    let detail = context.publications.find_by_id(created.id).await.unwrap();
    assert_eq!(detail.summary.publication.reference_link, created.reference_link);
}

#[actix_web::test]
async fn test_find_by_id_when_author_image_url_set_or_null_expect_decoded() {
    let context = common::initialize_context().await;
    let without_image = context.publish(ALICE, "Plain author", &[]).await;
    let with_image = context.publish(ADMIN, "Pictured author", &[]).await;

    let plain = context.publications.find_by_id(without_image).await.unwrap();
    let pictured = context.publications.find_by_id(with_image).await.unwrap();

    assert_eq!(plain.summary.user.image_url, None);
    assert_eq!(
        pictured.summary.user.image_url.as_deref(),
        Some("http://localhost/ada.png")
    );
}

#[actix_web::test]
async fn test_owner_of_when_present_or_missing_expect_author_or_not_found() {
    let context = common::initialize_context().await;
    let id = context.publish(BOB, "Owned", &[]).await;

    assert_eq!(context.publications.owner_of(id).await.unwrap(), BOB);
    assert!(matches!(
        context.publications.owner_of(99999).await,
        Err(PublicationError::NotFound(99999))
    ));
}
