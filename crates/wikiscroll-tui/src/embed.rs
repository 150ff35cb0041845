//! Live article previews: the terminal's embeds.
//!
//! Mounting a preview spawns a task that loads the article introduction.
//! Dropping it aborts that task, so scrolled-away items stop loading.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use wikiscroll_core::{Embed, EmbedFactory, FetchError, PageId, WikipediaClient};

/// Loads the text shown inside a preview
#[async_trait::async_trait]
pub trait ExtractLoader: Send + Sync + 'static {
    async fn load_extract(&self, page_id: PageId) -> Result<String, FetchError>;
}

#[async_trait::async_trait]
impl ExtractLoader for WikipediaClient {
    async fn load_extract(&self, page_id: PageId) -> Result<String, FetchError> {
        self.fetch_extract(page_id).await
    }
}

/// Load state of one preview
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preview {
    Loading,
    Ready(String),
    Failed(String),
}

#[derive(Debug)]
pub struct ArticleEmbed {
    page_id: PageId,
    height: u32,
    preview: watch::Receiver<Preview>,
    task: JoinHandle<()>,
}

impl ArticleEmbed {
    pub fn preview(&self) -> Preview {
        self.preview.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Preview> {
        self.preview.clone()
    }
}

impl Embed for ArticleEmbed {
    fn page_id(&self) -> PageId {
        self.page_id
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn set_height(&mut self, height: u32) {
        self.height = height;
    }
}

impl Drop for ArticleEmbed {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawns a preview load on the runtime for every mounted item
pub struct PreviewFactory {
    loader: Arc<dyn ExtractLoader>,
    runtime: Handle,
    mounted_total: u64,
}

impl PreviewFactory {
    pub fn new(loader: Arc<dyn ExtractLoader>, runtime: Handle) -> Self {
        Self {
            loader,
            runtime,
            mounted_total: 0,
        }
    }

    /// Number of previews built so far, remounts included
    pub fn mounted_total(&self) -> u64 {
        self.mounted_total
    }
}

impl EmbedFactory for PreviewFactory {
    type Embed = ArticleEmbed;

    fn mount(&mut self, page_id: PageId, height: u32) -> ArticleEmbed {
        let (tx, rx) = watch::channel(Preview::Loading);
        let loader = Arc::clone(&self.loader);

        let task = self.runtime.spawn(async move {
            let preview = match loader.load_extract(page_id).await {
                Ok(text) => Preview::Ready(text),
                Err(e) => {
                    tracing::debug!(%page_id, error = %e, "Preview load failed");
                    Preview::Failed(e.to_string())
                }
            };
            let _ = tx.send(preview);
        });

        self.mounted_total += 1;
        ArticleEmbed {
            page_id,
            height,
            preview: rx,
            task,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticLoader;

    #[async_trait::async_trait]
    impl ExtractLoader for StaticLoader {
        async fn load_extract(&self, page_id: PageId) -> Result<String, FetchError> {
            if page_id.0 == 0 {
                Err(FetchError::MalformedResponse("no such page".to_string()))
            } else {
                Ok(format!("Intro of {}", page_id))
            }
        }
    }

    /// Never finishes; holds a clone of `alive` while its load is running
    struct StalledLoader {
        alive: Arc<()>,
    }

    #[async_trait::async_trait]
    impl ExtractLoader for StalledLoader {
        async fn load_extract(&self, _page_id: PageId) -> Result<String, FetchError> {
            let _guard = Arc::clone(&self.alive);
            std::future::pending::<()>().await;
            Ok(String::new())
        }
    }

    #[tokio::test]
    async fn test_preview_loads_extract() {
        let mut factory = PreviewFactory::new(Arc::new(StaticLoader), Handle::current());
        let embed = factory.mount(PageId(7), 804);
        assert_eq!(embed.height(), 804);

        let mut rx = embed.subscribe();
        let preview = rx.wait_for(|p| *p != Preview::Loading).await.unwrap().clone();
        assert_eq!(preview, Preview::Ready("Intro of 7".to_string()));
        assert_eq!(factory.mounted_total(), 1);
    }

    #[tokio::test]
    async fn test_failed_load_is_reported() {
        let mut factory = PreviewFactory::new(Arc::new(StaticLoader), Handle::current());
        let embed = factory.mount(PageId(0), 804);

        let mut rx = embed.subscribe();
        let preview = rx.wait_for(|p| *p != Preview::Loading).await.unwrap().clone();
        assert!(matches!(preview, Preview::Failed(_)));
    }

    #[tokio::test]
    async fn test_drop_abandons_load() {
        let alive = Arc::new(());
        let loader = StalledLoader { alive: Arc::clone(&alive) };
        let mut factory = PreviewFactory::new(Arc::new(loader), Handle::current());

        let embed = factory.mount(PageId(1), 804);
        for _ in 0..100 {
            if Arc::strong_count(&alive) > 2 {
                break;
            }
            tokio::task::yield_now().await;
        }
        // One count here, one in the loader, one in the running load
        assert_eq!(Arc::strong_count(&alive), 3);

        drop(embed);
        for _ in 0..100 {
            if Arc::strong_count(&alive) == 2 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(Arc::strong_count(&alive), 2);
    }
}
