use std::sync::Arc;

use crate::application::ports::article_repository::ArticleRepository;
use crate::application::use_cases::bulk_replace::commit::ArticleLinks;
use crate::bootstrap::config::Config;

#[derive(Clone)]
pub struct AppContext {
    pub cfg: Config,
    services: Arc<AppServices>,
}

#[derive(Clone)]
pub struct AppServices {
    article_repo: Arc<dyn ArticleRepository>,
}

impl AppServices {
    pub fn new(article_repo: Arc<dyn ArticleRepository>) -> Self {
        Self { article_repo }
    }
}

impl AppContext {
    pub fn new(cfg: Config, services: AppServices) -> Self {
        Self {
            cfg,
            services: Arc::new(services),
        }
    }

    pub fn article_repo(&self) -> Arc<dyn ArticleRepository> {
        self.services.article_repo.clone()
    }

    pub fn article_links(&self) -> ArticleLinks {
        ArticleLinks {
            admin_base: self.cfg.admin_base_url.clone(),
            public_base: self.cfg.public_base_url.clone(),
        }
    }
}
