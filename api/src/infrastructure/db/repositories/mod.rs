pub mod article_repository_sqlx;
