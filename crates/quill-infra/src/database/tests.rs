#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::database::entity::{comment, post, post_tag, tag};
    use crate::database::postgres_repo::{
        PostgresCommentRepository, PostgresPostRepository, PostgresTagRepository,
    };
    use quill_core::domain::{Comment, Post, PostStatus, Tag};
    use quill_core::error::RepoError;
    use quill_core::pagination::PageRequest;
    use quill_core::ports::{
        BaseRepository, CommentRepository, PostFilter, PostRepository, TagRepository,
    };
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, RuntimeErr, Value};

    fn post_model(id: uuid::Uuid, status: post::Status) -> post::Model {
        let now = chrono::Utc::now();
        post::Model {
            id,
            author_id: uuid::Uuid::new_v4(),
            title: "Test Post".to_owned(),
            slug: "test-post".to_owned(),
            body: "Content".to_owned(),
            status,
            publish: now.into(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn count_row(n: i64) -> Vec<BTreeMap<&'static str, Value>> {
        vec![BTreeMap::from([("num_items", Value::from(n))])]
    }

    /// Count, page rows, then empty tag-link and tag lookups.
    fn paged_db(total: i64, rows: Vec<post::Model>) -> sea_orm::DatabaseConnection {
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([count_row(total)])
            .append_query_results([rows])
            .append_query_results([Vec::<post_tag::Model>::new()])
            .append_query_results([Vec::<tag::Model>::new()])
            .into_connection()
    }

    fn logged_sql(db: sea_orm::DatabaseConnection) -> String {
        format!("{:?}", db.into_transaction_log())
    }

    #[tokio::test]
    async fn test_list_published_clamps_to_last_page() {
        let rows = vec![
            post_model(uuid::Uuid::new_v4(), post::Status::Published),
            post_model(uuid::Uuid::new_v4(), post::Status::Published),
        ];
        let db = paged_db(10, rows);
        let repo = PostgresPostRepository::new(db.clone());

        let page = repo
            .list_published(&PostFilter::default(), PageRequest::new(99, 4))
            .await
            .unwrap();

        assert_eq!(page.number, 3);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_items, 10);
        assert_eq!(page.items.len(), 2);
        assert!(!page.has_next());

        let sql = logged_sql(db);
        assert!(sql.contains("COUNT(*)"));
        assert!(sql.contains("OFFSET"));
        assert!(!sql.contains("IN (SELECT"));
    }

    #[tokio::test]
    async fn test_list_published_empty_is_single_page() {
        let db = paged_db(0, Vec::new());
        let repo = PostgresPostRepository::new(db);

        let page = repo
            .list_published(&PostFilter::default(), PageRequest::new(5, 4))
            .await
            .unwrap();

        assert_eq!(page.number, 1);
        assert_eq!(page.total_pages, 1);
        assert!(page.items.is_empty());
    }

    #[tokio::test]
    async fn test_list_published_by_tag_uses_subquery() {
        let tag = Tag::new("Rust");
        let rows = vec![post_model(uuid::Uuid::new_v4(), post::Status::Published)];
        let db = paged_db(1, rows);
        let repo = PostgresPostRepository::new(db.clone());

        let page = repo
            .list_published(&PostFilter::tagged(&tag), PageRequest::first(4))
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);

        let sql = logged_sql(db);
        assert!(sql.contains("IN (SELECT"));
        assert!(sql.contains("post_tags"));
        assert!(sql.contains(&tag.id.to_string()));
    }

    #[tokio::test]
    async fn test_find_tag_by_slug() {
        let tag_id = uuid::Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![tag::Model {
                id: tag_id,
                name: "Rust".to_owned(),
                slug: "rust".to_owned(),
            }]])
            .into_connection();

        let repo = PostgresTagRepository::new(db);
        let result: Option<Tag> = repo.find_by_slug("rust").await.unwrap();

        let tag = result.unwrap();
        assert_eq!(tag.id, tag_id);
        assert_eq!(tag.name, "Rust");
    }

    #[tokio::test]
    async fn test_find_unknown_tag_is_none() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<tag::Model>::new()])
            .into_connection();

        let repo = PostgresTagRepository::new(db);
        assert!(repo.find_by_slug("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_active_comments() {
        let post_id = uuid::Uuid::new_v4();
        let now = chrono::Utc::now();
        let rows = ["First", "Second"].map(|body| comment::Model {
            id: uuid::Uuid::new_v4(),
            post_id,
            name: "Alice".to_owned(),
            email: "a@example.com".to_owned(),
            body: body.to_owned(),
            active: true,
            created_at: now.into(),
            updated_at: now.into(),
        });
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![rows.to_vec()])
            .into_connection();

        let repo = PostgresCommentRepository::new(db);
        let comments: Vec<Comment> = repo.find_active_by_post(post_id).await.unwrap();

        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].body, "First");
        assert!(comments.iter().all(|c| c.active && c.post_id == post_id));
    }

    #[tokio::test]
    async fn test_missing_published_post_is_none() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<post::Model>::new()])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let result: Option<Post> = repo
            .find_published_by_id(uuid::Uuid::new_v4())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_similar_for_untagged_post_skips_query() {
        // No query results are queued: any query would fail.
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let repo = PostgresPostRepository::new(db);
        let model = post_model(uuid::Uuid::new_v4(), post::Status::Published);
        let post = model.into_post(Vec::new());

        assert!(repo.find_similar(&post, 4).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_query_failure_maps_to_repo_error() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Query(RuntimeErr::Internal(
                "relation \"tags\" does not exist".to_owned(),
            ))])
            .into_connection();

        let repo = PostgresTagRepository::new(db);
        let err = repo.find_by_slug("rust").await.unwrap_err();
        assert!(matches!(err, RepoError::Query(_)));
    }

    #[test]
    fn test_model_conversion_keeps_status_and_tags() {
        let id = uuid::Uuid::new_v4();
        let tags = vec![tag::Model {
            id: uuid::Uuid::new_v4(),
            name: "Rust".to_owned(),
            slug: "rust".to_owned(),
        }];
        let post = post_model(id, post::Status::Draft).into_post(tags);

        assert_eq!(post.id, id);
        assert_eq!(post.status, PostStatus::Draft);
        assert_eq!(post.tags.len(), 1);
        assert_eq!(post.tags[0].slug, "rust");

        let active: post::ActiveModel = (&post).into();
        assert_eq!(active.status.unwrap(), post::Status::Draft);
    }

    #[tokio::test]
    async fn test_insert_comment_returns_saved_row() {
        let comment = Comment::new(
            uuid::Uuid::new_v4(),
            "Alice".into(),
            "a@example.com".into(),
            "Nice post".into(),
        );
        let row = comment::Model {
            id: comment.id,
            post_id: comment.post_id,
            name: comment.name.clone(),
            email: comment.email.clone(),
            body: comment.body.clone(),
            active: true,
            created_at: comment.created_at.into(),
            updated_at: comment.updated_at.into(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![row]])
            .into_connection();

        let repo = PostgresCommentRepository::new(db);
        let saved = BaseRepository::<Comment, uuid::Uuid>::insert(&repo, comment.clone())
            .await
            .unwrap();
        assert_eq!(saved.id, comment.id);
        assert!(saved.active);
    }
}
