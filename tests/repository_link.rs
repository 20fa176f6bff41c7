use chrono::Utc;
use link_shortener::domain::entities::NewLink;
use link_shortener::domain::repositories::LinkRepository;
use link_shortener::error::AppError;
use link_shortener::infrastructure::persistence::PgLinkRepository;
use sqlx::PgPool;
use std::sync::Arc;

#[sqlx::test]
async fn test_create_link(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));

    let result = repo
        .create(NewLink::new("test123", "https://example.com"))
        .await;

    assert!(result.is_ok());
    let link = result.unwrap();
    assert_eq!(link.code, "test123");
    assert_eq!(link.url, "https://example.com");
    assert_eq!(link.clicks, 0);
    assert!(link.last_clicked_at.is_none());
}

#[sqlx::test]
async fn test_create_duplicate_code_conflicts(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));

    repo.create(NewLink::new("dup123", "https://one.example"))
        .await
        .unwrap();

    let result = repo
        .create(NewLink::new("dup123", "https://two.example"))
        .await;

    match result {
        Err(AppError::Conflict { message, .. }) => assert!(message.contains("dup123")),
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[sqlx::test]
async fn test_find_by_code(pool: PgPool) {
    sqlx::query("INSERT INTO links (code, url) VALUES ($1, $2)")
        .bind("abc123")
        .bind("https://example.com")
        .execute(&pool)
        .await
        .unwrap();

    let repo = PgLinkRepository::new(Arc::new(pool));
    let result = repo.find_by_code("abc123").await;

    assert!(result.is_ok());
    let link = result.unwrap();
    assert!(link.is_some());
    assert_eq!(link.unwrap().url, "https://example.com");
}

#[sqlx::test]
async fn test_find_by_code_not_found(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));

    let result = repo.find_by_code("nothere").await.unwrap();

    assert!(result.is_none());
}

#[sqlx::test]
async fn test_codes_are_case_sensitive(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));

    repo.create(NewLink::new("AbCdEf", "https://upper.example"))
        .await
        .unwrap();
    repo.create(NewLink::new("abcdef", "https://lower.example"))
        .await
        .unwrap();

    let upper = repo.find_by_code("AbCdEf").await.unwrap().unwrap();
    assert_eq!(upper.url, "https://upper.example");
}

#[sqlx::test]
async fn test_list_newest_first(pool: PgPool) {
    for (code, offset) in [("old001", 30), ("mid001", 20), ("new001", 10)] {
        sqlx::query(
            "INSERT INTO links (code, url, created_at) VALUES ($1, $2, NOW() - make_interval(secs => $3))",
        )
        .bind(code)
        .bind("https://example.com")
        .bind(offset as f64)
        .execute(&pool)
        .await
        .unwrap();
    }

    let repo = PgLinkRepository::new(Arc::new(pool));
    let codes: Vec<String> = repo
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.code)
        .collect();

    assert_eq!(codes, vec!["new001", "mid001", "old001"]);
}

#[sqlx::test]
async fn test_increment_clicks(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));
    repo.create(NewLink::new("click1", "https://example.com"))
        .await
        .unwrap();

    for _ in 0..3 {
        assert!(repo.increment_clicks("click1", Utc::now()).await.unwrap());
    }

    let link = repo.find_by_code("click1").await.unwrap().unwrap();
    assert_eq!(link.clicks, 3);
    assert!(link.last_clicked_at.is_some());
}

#[sqlx::test]
async fn test_last_clicked_at_keeps_latest_click(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));
    repo.create(NewLink::new("order1", "https://example.com"))
        .await
        .unwrap();

    let later = Utc::now() - chrono::Duration::seconds(5);
    let earlier = later - chrono::Duration::seconds(30);

    repo.increment_clicks("order1", later).await.unwrap();
    repo.increment_clicks("order1", earlier).await.unwrap();

    let link = repo.find_by_code("order1").await.unwrap().unwrap();
    assert_eq!(link.clicks, 2);
    // TIMESTAMPTZ keeps microseconds
    let stored = link.last_clicked_at.unwrap();
    assert!((stored - later).num_milliseconds().abs() < 1);
}

#[sqlx::test]
async fn test_concurrent_increments_are_not_lost(pool: PgPool) {
    let repo = Arc::new(PgLinkRepository::new(Arc::new(pool)));
    repo.create(NewLink::new("race01", "https://example.com"))
        .await
        .unwrap();

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let repo = repo.clone();
            tokio::spawn(async move { repo.increment_clicks("race01", Utc::now()).await })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap().unwrap());
    }

    let link = repo.find_by_code("race01").await.unwrap().unwrap();
    assert_eq!(link.clicks, 20);
}

#[sqlx::test]
async fn test_increment_missing_code(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));

    assert!(!repo.increment_clicks("ghost1", Utc::now()).await.unwrap());
}

#[sqlx::test]
async fn test_delete(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));
    repo.create(NewLink::new("del001", "https://example.com"))
        .await
        .unwrap();

    assert!(repo.delete("del001").await.unwrap());
    assert!(!repo.delete("del001").await.unwrap());
    assert!(repo.find_by_code("del001").await.unwrap().is_none());
}

#[sqlx::test]
async fn test_totals(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));

    assert_eq!(repo.count().await.unwrap(), 0);
    assert_eq!(repo.total_clicks().await.unwrap(), 0);

    repo.create(NewLink::new("tot001", "https://a.example"))
        .await
        .unwrap();
    repo.create(NewLink::new("tot002", "https://b.example"))
        .await
        .unwrap();
    repo.increment_clicks("tot001", Utc::now()).await.unwrap();
    repo.increment_clicks("tot002", Utc::now()).await.unwrap();
    repo.increment_clicks("tot002", Utc::now()).await.unwrap();

    assert_eq!(repo.count().await.unwrap(), 2);
    assert_eq!(repo.total_clicks().await.unwrap(), 3);
}
