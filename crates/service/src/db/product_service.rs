use models::product;
use sea_orm::{
    sea_query::{Expr, Func, LikeExpr, SimpleExpr},
    ActiveModelTrait, Condition, ConnectionTrait, DbBackend, EntityTrait, ModelTrait, NotSet,
    QueryFilter, Set,
};
use tracing::{debug, info, instrument};

use crate::errors::ServiceError;
use crate::product::{CreateProductInput, SearchFilter};
use crate::session::Session;

/// Create a product from validated input; the store assigns the id.
///
/// Runs in its own transaction. A storage failure rolls it back and comes
/// back as `ServiceError::Db`; the caller decides how to report it.
#[instrument(skip(session, input), fields(name = %input.name))]
pub async fn create_product(session: &Session, input: CreateProductInput) -> Result<product::Model, ServiceError> {
    let price = input.normalized_price();
    let am = product::ActiveModel {
        id: NotSet,
        name: Set(input.name),
        description: Set(input.description),
        price: Set(price),
        category: Set(input.category),
        sizes: Set(input.sizes),
    };

    let txn = session.begin().await?;
    let stored = match am.insert(&txn).await {
        Ok(m) => m,
        Err(e) => {
            txn.rollback().await?;
            return Err(e.into());
        }
    };
    txn.commit().await?;
    info!(id = stored.id, "created product");
    Ok(stored)
}

/// Every product, in the store's native order.
#[instrument(skip(session))]
pub async fn list_products(session: &Session) -> Result<Vec<product::Model>, ServiceError> {
    let rows = product::Entity::find().all(session.connection()).await?;
    debug!(count = rows.len(), "listed products");
    Ok(rows)
}

/// Case-insensitive substring search on name and category.
///
/// When both filters are given a product matching either one qualifies.
/// Without any effective filter this is the same as [`list_products`].
#[instrument(skip(session))]
pub async fn search_products(session: &Session, filter: &SearchFilter) -> Result<Vec<product::Model>, ServiceError> {
    let backend = session.connection().get_database_backend();
    let mut clauses = Vec::new();
    if let Some(name) = filter.name() {
        clauses.push(contains_ci(backend, product::Column::Name, name));
    }
    if let Some(category) = filter.category() {
        clauses.push(contains_ci(backend, product::Column::Category, category));
    }
    if clauses.is_empty() {
        return list_products(session).await;
    }

    let any = clauses.into_iter().fold(Condition::any(), |cond, clause| cond.add(clause));
    let rows = product::Entity::find().filter(any).all(session.connection()).await?;
    debug!(count = rows.len(), "searched products");
    Ok(rows)
}

/// Look up one product; `Ok(None)` when the id does not exist.
#[instrument(skip(session))]
pub async fn get_product(session: &Session, id: i32) -> Result<Option<product::Model>, ServiceError> {
    Ok(product::Entity::find_by_id(id).one(session.connection()).await?)
}

/// Hard delete by id. `Ok(false)` when there was nothing to delete; a
/// storage failure rolls back and leaves the row in place.
#[instrument(skip(session))]
pub async fn delete_product(session: &Session, id: i32) -> Result<bool, ServiceError> {
    let txn = session.begin().await?;
    let outcome = match product::Entity::find_by_id(id).one(&txn).await {
        Ok(Some(found)) => found.delete(&txn).await.map(|_| true),
        Ok(None) => Ok(false),
        Err(e) => Err(e),
    };
    match outcome {
        Ok(true) => {
            txn.commit().await?;
            info!(id, "deleted product");
            Ok(true)
        }
        Ok(false) => {
            txn.rollback().await?;
            Ok(false)
        }
        Err(e) => {
            txn.rollback().await?;
            Err(e.into())
        }
    }
}

/// `LOWER(column) LIKE '%needle%'` with LIKE wildcards in the needle escaped.
fn contains_ci(backend: DbBackend, column: product::Column, needle: &str) -> SimpleExpr {
    let pattern = format!("%{}%", escape_like(&fold_case(backend, needle)));
    Expr::expr(Func::lower(Expr::col((product::Entity, column))))
        .like(LikeExpr::new(pattern).escape('\\'))
}

/// Lowercase the needle the way the backend's `LOWER()` folds the column.
/// SQLite's built-in `LOWER()` only folds ASCII letters, so there non-ASCII
/// matching is case-sensitive.
fn fold_case(backend: DbBackend, raw: &str) -> String {
    match backend {
        DbBackend::Sqlite => raw.to_ascii_lowercase(),
        _ => raw.to_lowercase(),
    }
}

fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn input(name: &str, category: &str) -> CreateProductInput {
        CreateProductInput {
            name: name.into(),
            description: Some(format!("{name} description")),
            price: Decimal::from_str("100.00").unwrap(),
            category: category.into(),
            sizes: Some("S,M,L".into()),
        }
    }

    fn ids(rows: &[product::Model]) -> Vec<i32> {
        let mut ids: Vec<i32> = rows.iter().map(|m| m.id).collect();
        ids.sort();
        ids
    }

    #[tokio::test]
    async fn create_then_get_returns_equal_row() -> Result<(), anyhow::Error> {
        let sessions = get_db().await?;
        let session = sessions.open();

        let created = create_product(&session, input("Test", "Test category")).await?;
        assert_eq!(created.id, 1);

        let got = get_product(&session, created.id).await?.expect("created row");
        assert_eq!(got, created);
        assert_eq!(got.name, "Test");
        assert_eq!(got.description.as_deref(), Some("Test description"));
        assert_eq!(got.sizes.as_deref(), Some("S,M,L"));
        assert_eq!(got.price, Decimal::from(100));
        Ok(())
    }

    #[tokio::test]
    async fn get_unknown_id_is_absent() -> Result<(), anyhow::Error> {
        let sessions = get_db().await?;
        let session = sessions.open();
        assert!(get_product(&session, 999).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn list_returns_every_row() -> Result<(), anyhow::Error> {
        let sessions = get_db().await?;
        let session = sessions.open();
        assert!(list_products(&session).await?.is_empty());

        create_product(&session, input("Boot", "Shoes")).await?;
        create_product(&session, input("Cap", "Hats")).await?;

        assert_eq!(ids(&list_products(&session).await?), vec![1, 2]);
        Ok(())
    }

    #[tokio::test]
    async fn search_by_category_is_case_insensitive_substring() -> Result<(), anyhow::Error> {
        let sessions = get_db().await?;
        let session = sessions.open();
        create_product(&session, input("Runner", "Sport Shoes")).await?;
        create_product(&session, input("Cap", "Hats")).await?;

        let f = SearchFilter::new(None, Some("shoe".into()));
        assert_eq!(ids(&search_products(&session, &f).await?), vec![1]);

        let f = SearchFilter::new(None, Some("SPORT".into()));
        assert_eq!(ids(&search_products(&session, &f).await?), vec![1]);

        let f = SearchFilter::new(None, Some("Untitled".into()));
        assert!(search_products(&session, &f).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn search_with_both_filters_returns_union() -> Result<(), anyhow::Error> {
        let sessions = get_db().await?;
        let session = sessions.open();
        create_product(&session, input("Red Boot", "Shoes")).await?;
        create_product(&session, input("Blue Cap", "Hats")).await?;
        create_product(&session, input("Green Scarf", "Winter")).await?;

        // name hits #1 only, category hits #2 only
        let f = SearchFilter::new(Some("boot".into()), Some("hat".into()));
        assert_eq!(ids(&search_products(&session, &f).await?), vec![1, 2]);
        Ok(())
    }

    #[tokio::test]
    async fn search_without_effective_filter_lists_all() -> Result<(), anyhow::Error> {
        let sessions = get_db().await?;
        let session = sessions.open();
        create_product(&session, input("Boot", "Shoes")).await?;
        create_product(&session, input("Cap", "Hats")).await?;

        let f = SearchFilter::new(Some(String::new()), None);
        assert_eq!(ids(&search_products(&session, &f).await?), vec![1, 2]);
        Ok(())
    }

    #[tokio::test]
    async fn search_treats_wildcards_literally() -> Result<(), anyhow::Error> {
        let sessions = get_db().await?;
        let session = sessions.open();
        create_product(&session, input("100% Wool", "Knit")).await?;
        create_product(&session, input("Wool_Blend", "Knit")).await?;
        create_product(&session, input("Cotton", "Basics")).await?;

        let f = SearchFilter::new(Some("%".into()), None);
        assert_eq!(ids(&search_products(&session, &f).await?), vec![1]);

        let f = SearchFilter::new(Some("_".into()), None);
        assert_eq!(ids(&search_products(&session, &f).await?), vec![2]);
        Ok(())
    }

    #[tokio::test]
    async fn delete_twice_reports_absent_second_time() -> Result<(), anyhow::Error> {
        let sessions = get_db().await?;
        let session = sessions.open();
        let created = create_product(&session, input("Test", "Test category")).await?;

        assert!(delete_product(&session, created.id).await?);
        assert!(!delete_product(&session, created.id).await?);
        assert!(get_product(&session, created.id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn delete_unknown_id_leaves_rows_alone() -> Result<(), anyhow::Error> {
        let sessions = get_db().await?;
        let session = sessions.open();
        create_product(&session, input("Boot", "Shoes")).await?;

        assert!(!delete_product(&session, 42).await?);
        assert_eq!(list_products(&session).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn storage_failure_on_create_is_an_error_not_a_row() -> Result<(), anyhow::Error> {
        let sessions = get_db().await?;
        let session = sessions.open();
        sessions.connection().execute_unprepared("DROP TABLE products").await?;

        let res = create_product(&session, input("Boot", "Shoes")).await;
        assert!(matches!(res, Err(ServiceError::Db(_))));
        Ok(())
    }

    #[tokio::test]
    async fn failed_insert_rolls_back_and_frees_the_session() -> Result<(), anyhow::Error> {
        let sessions = get_db().await?;
        let session = sessions.open();
        sessions
            .connection()
            .execute_unprepared(
                "CREATE TRIGGER reject_insert BEFORE INSERT ON products \
                 BEGIN SELECT RAISE(ABORT, 'insert rejected'); END",
            )
            .await?;

        let res = create_product(&session, input("Boot", "Shoes")).await;
        assert!(matches!(res, Err(ServiceError::Db(_))));
        assert!(list_products(&session).await?.is_empty());

        // the single pooled connection must not be left inside a transaction
        sessions.connection().execute_unprepared("DROP TRIGGER reject_insert").await?;
        let created = create_product(&session, input("Boot", "Shoes")).await?;
        assert_eq!(created.id, 1);
        Ok(())
    }

    #[tokio::test]
    async fn failed_delete_rolls_back_and_keeps_the_row() -> Result<(), anyhow::Error> {
        let sessions = get_db().await?;
        let session = sessions.open();
        let created = create_product(&session, input("Boot", "Shoes")).await?;
        sessions
            .connection()
            .execute_unprepared(
                "CREATE TRIGGER reject_delete BEFORE DELETE ON products \
                 BEGIN SELECT RAISE(ABORT, 'delete rejected'); END",
            )
            .await?;

        let res = delete_product(&session, created.id).await;
        assert!(matches!(res, Err(ServiceError::Db(_))));
        assert_eq!(get_product(&session, created.id).await?, Some(created.clone()));

        sessions.connection().execute_unprepared("DROP TRIGGER reject_delete").await?;
        assert!(delete_product(&session, created.id).await?);
        Ok(())
    }

    #[tokio::test]
    async fn search_matches_non_ascii_terms() -> Result<(), anyhow::Error> {
        let sessions = get_db().await?;
        let session = sessions.open();
        create_product(&session, input("Ёлка", "Décor")).await?;
        create_product(&session, input("Boot", "Shoes")).await?;

        let f = SearchFilter::new(Some("Ёл".into()), None);
        assert_eq!(ids(&search_products(&session, &f).await?), vec![1]);

        let f = SearchFilter::new(None, Some("DÉCOR".into()));
        assert!(search_products(&session, &f).await?.is_empty());

        let f = SearchFilter::new(None, Some("DéCOR".into()));
        assert_eq!(ids(&search_products(&session, &f).await?), vec![1]);
        Ok(())
    }

    #[test]
    fn fold_case_follows_backend_lower() {
        assert_eq!(fold_case(DbBackend::Sqlite, "ЁлКА Boot"), "ЁлКА boot");
        assert_eq!(fold_case(DbBackend::Postgres, "ЁлКА Boot"), "ёлка boot");
    }

    #[test]
    fn escape_like_escapes_wildcards() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }
}
