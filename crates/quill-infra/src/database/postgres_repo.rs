//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveTime};
use sea_orm::sea_query::{Expr, ExprTrait, OnConflict, Query};
use sea_orm::{
    ColumnTrait, DbConn, EntityTrait, JoinType, LoaderTrait, Order, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Select, TransactionTrait,
};
use uuid::Uuid;

use quill_core::domain::{Author, Comment, Post, Tag};
use quill_core::error::RepoError;
use quill_core::pagination::{Page, PageRequest};
use quill_core::ports::{
    AuthorRepository, BaseRepository, CommentRepository, PostFilter, PostRepository,
    TagRepository,
};

use super::entity::author::{self, Entity as AuthorEntity};
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::post_tag::{self, Entity as PostTagEntity};
use super::entity::tag::{self, Entity as TagEntity};
use super::postgres_base::{PostgresBaseRepository, db_err};

/// PostgreSQL author repository.
pub type PostgresAuthorRepository = PostgresBaseRepository<AuthorEntity>;

/// PostgreSQL tag repository.
pub type PostgresTagRepository = PostgresBaseRepository<TagEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

/// Full-text match of title and body against a plain query.
const SEARCH_CONDITION: &str = "to_tsvector('simple', coalesce(\"posts\".\"title\", '') || ' ' || \
     coalesce(\"posts\".\"body\", '')) @@ plainto_tsquery('simple', $1)";

#[async_trait]
impl AuthorRepository for PostgresAuthorRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<Author>, RepoError> {
        let result = AuthorEntity::find()
            .filter(author::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl TagRepository for PostgresTagRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError> {
        tracing::debug!(tag_slug = %slug, "Finding tag by slug");

        let result = TagEntity::find()
            .filter(tag::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn find_active_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let result = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .filter(comment::Column::Active.eq(true))
            .order_by_asc(comment::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

/// PostgreSQL post repository. Posts are loaded together with their tags.
pub struct PostgresPostRepository {
    db: DbConn,
}

impl PostgresPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    /// The single place the published predicate is expressed in SQL.
    fn published() -> Select<PostEntity> {
        PostEntity::find().filter(post::Column::Status.eq(post::Status::Published))
    }

    async fn with_tags(&self, models: Vec<post::Model>) -> Result<Vec<Post>, RepoError> {
        let tags = models
            .load_many_to_many(TagEntity, PostTagEntity, &self.db)
            .await
            .map_err(db_err)?;

        Ok(models.into_iter().zip(tags)
            .map(|(model, tags)| model.into_post(tags))
            .collect())
    }

    async fn one_with_tags(&self, model: Option<post::Model>) -> Result<Option<Post>, RepoError> {
        match model {
            Some(model) => Ok(self.with_tags(vec![model]).await?.pop()),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for PostgresPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let model = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        self.one_with_tags(model).await
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        self.save(post).await
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let active: post::ActiveModel = (&post).into();
        PostEntity::insert(active)
            .on_conflict(
                OnConflict::column(post::Column::Id)
                    .update_columns([
                        post::Column::Title,
                        post::Column::Slug,
                        post::Column::Body,
                        post::Column::Status,
                        post::Column::Publish,
                        post::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&txn)
            .await
            .map_err(db_err)?;

        PostTagEntity::delete_many()
            .filter(post_tag::Column::PostId.eq(post.id))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        if !post.tags.is_empty() {
            let links = post.tags.iter().map(|tag| post_tag::ActiveModel {
                post_id: sea_orm::Set(post.id),
                tag_id: sea_orm::Set(tag.id),
            });
            PostTagEntity::insert_many(links)
                .exec(&txn)
                .await
                .map_err(db_err)?;
        }

        txn.commit().await.map_err(db_err)?;
        tracing::debug!(post_id = %post.id, tags = post.tags.len(), "Post saved");

        Ok(post)
    }

    async fn find_published_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let model = Self::published()
            .filter(post::Column::Id.eq(id))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        self.one_with_tags(model).await
    }

    async fn find_published_by_date_slug(
        &self,
        date: NaiveDate,
        slug: &str,
    ) -> Result<Option<Post>, RepoError> {
        let day_start = date.and_time(NaiveTime::MIN).and_utc();
        let day_end = day_start + Duration::days(1);

        let model = Self::published()
            .filter(post::Column::Slug.eq(slug))
            .filter(post::Column::Publish.gte(day_start))
            .filter(post::Column::Publish.lt(day_end))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        self.one_with_tags(model).await
    }

    async fn list_published(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<Page<Post>, RepoError> {
        let mut select = Self::published();
        if let Some(tag_id) = filter.tag_id {
            select = select.filter(
                post::Column::Id.in_subquery(
                    Query::select()
                        .column(post_tag::Column::PostId)
                        .from(PostTagEntity)
                        .and_where(post_tag::Column::TagId.eq(tag_id))
                        .to_owned(),
                ),
            );
        }

        let paginator = select
            .order_by_desc(post::Column::Publish)
            .order_by_asc(post::Column::Id)
            .paginate(&self.db, page.size);

        let total_items = paginator.num_items().await.map_err(db_err)?;
        let number = page.clamp(total_items);
        if number != page.number {
            tracing::debug!(requested = page.number, resolved = number, "Page clamped");
        }

        let models = paginator.fetch_page(number - 1).await.map_err(db_err)?;
        let posts = self.with_tags(models).await?;

        Ok(Page::new(posts, number, page.size, total_items))
    }

    async fn all_published(&self) -> Result<Vec<Post>, RepoError> {
        let models = Self::published()
            .order_by_desc(post::Column::Publish)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        self.with_tags(models).await
    }

    async fn find_similar(&self, post: &Post, limit: u64) -> Result<Vec<Post>, RepoError> {
        let tag_ids: Vec<Uuid> = post.tags.iter().map(|t| t.id).collect();
        if tag_ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = Self::published()
            .join(JoinType::InnerJoin, post::Relation::PostTag.def())
            .filter(post_tag::Column::TagId.is_in(tag_ids))
            .filter(post::Column::Id.ne(post.id))
            .group_by(post::Column::Id)
            .order_by(
                Expr::col((PostTagEntity, post_tag::Column::TagId)).count(),
                Order::Desc,
            )
            .order_by_desc(post::Column::Publish)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        self.with_tags(models).await
    }

    async fn search_published(&self, query: &str) -> Result<Vec<Post>, RepoError> {
        let models = Self::published()
            .filter(Expr::cust_with_values(SEARCH_CONDITION, [query]))
            .order_by_desc(post::Column::Publish)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        self.with_tags(models).await
    }
}
