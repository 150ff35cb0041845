//! Mounts embeds near the viewport and parks everything else behind
//! placeholders of identical height.

use crate::embed::{Embed, EmbedFactory, ItemContent, Placeholder};
use crate::store::{FeedItem, FeedStore, ItemKey};
use crate::viewport::{Viewport, VisibilityEntry, VisibilityObserver};

/// Outcome of applying one batch of visibility entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwapReport {
    pub mounted: usize,
    pub unmounted: usize,
}

impl SwapReport {
    pub fn is_empty(&self) -> bool {
        self.mounted == 0 && self.unmounted == 0
    }
}

pub struct ViewportVirtualizer {
    observer: Box<dyn VisibilityObserver>,
}

impl ViewportVirtualizer {
    pub fn new(observer: Box<dyn VisibilityObserver>) -> Self {
        Self { observer }
    }

    pub fn register(&mut self, key: ItemKey) {
        self.observer.observe(key);
    }

    /// Forget every registration (the store is about to be cleared)
    pub fn reset(&mut self) {
        self.observer.disconnect();
    }

    /// Pull pending visibility changes from the observer and apply them
    pub fn sync<F>(
        &mut self,
        store: &mut FeedStore<F::Embed>,
        factory: &mut F,
        viewport: &Viewport,
        chrome_height: u32,
    ) -> SwapReport
    where
        F: EmbedFactory,
    {
        let layout = store.layout(chrome_height);
        let entries = self.observer.take_records(viewport, &layout);
        Self::apply(store, factory, &entries)
    }

    /// Apply visibility entries. Entries for unknown or stale keys are ignored,
    /// and entries that match the current representation are no-ops.
    pub fn apply<F>(store: &mut FeedStore<F::Embed>, factory: &mut F, entries: &[VisibilityEntry]) -> SwapReport
    where
        F: EmbedFactory,
    {
        let mut report = SwapReport::default();

        for entry in entries {
            let Some(item) = store.get_mut(entry.key) else {
                continue;
            };

            match (entry.is_intersecting, item.is_mounted()) {
                (false, true) => {
                    unmount(item);
                    report.unmounted += 1;
                }
                (true, false) => {
                    mount(item, factory);
                    report.mounted += 1;
                }
                _ => {}
            }
        }

        if !report.is_empty() {
            tracing::debug!(
                mounted = report.mounted,
                unmounted = report.unmounted,
                "Applied visibility changes"
            );
        }
        report
    }
}

/// Replace the embed with a placeholder; dropping the embed releases it
fn unmount<E: Embed>(item: &mut FeedItem<E>) {
    let placeholder = Placeholder {
        page_id: item.content().page_id(),
        height: item.frame_height(),
    };
    let released = item.replace_content(ItemContent::Placeholder(placeholder));
    drop(released);
}

/// Build a fresh embed from the placeholder's page id and the recorded height
fn mount<F: EmbedFactory>(item: &mut FeedItem<F::Embed>, factory: &mut F) {
    let ItemContent::Placeholder(placeholder) = item.content() else {
        return;
    };
    let embed = factory.mount(placeholder.page_id, item.frame_height());
    item.replace_content(ItemContent::Embed(embed));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expand::ExpandController;
    use crate::source::PageId;
    use crate::testing::{article, full_geometry, FakeEmbed, FakeFactory, ScriptedObserver};

    fn setup(n: u64) -> (FeedStore<FakeEmbed>, FakeFactory, Vec<ItemKey>) {
        let mut factory = FakeFactory::default();
        let mut store = FeedStore::new();
        let keys = store.append(
            (1..=n).map(article).collect(),
            full_geometry(),
            |id, h| factory.mount(id, h),
        );
        (store, factory, keys)
    }

    #[test]
    fn test_hidden_item_becomes_placeholder_with_same_height() {
        let (mut store, mut factory, keys) = setup(2);
        let before = store.get(keys[0]).unwrap().content().height();

        let report = ViewportVirtualizer::apply(&mut store, &mut factory, &[VisibilityEntry::hidden(keys[0])]);

        let item = store.get(keys[0]).unwrap();
        assert_eq!(report, SwapReport { mounted: 0, unmounted: 1 });
        assert!(!item.is_mounted());
        assert_eq!(item.content().height(), before);
        assert!(matches!(
            item.content(),
            ItemContent::Placeholder(Placeholder { page_id: PageId(1), .. })
        ));
        assert_eq!(factory.released(), 1);
    }

    #[test]
    fn test_visible_item_remounts_from_placeholder_id() {
        let (mut store, mut factory, keys) = setup(1);
        ViewportVirtualizer::apply(&mut store, &mut factory, &[VisibilityEntry::hidden(keys[0])]);
        let mounts_before = factory.mounts().len();

        ViewportVirtualizer::apply(&mut store, &mut factory, &[VisibilityEntry::visible(keys[0])]);

        let item = store.get(keys[0]).unwrap();
        assert!(item.is_mounted());
        assert_eq!(item.content().height(), 804);
        assert_eq!(factory.mounts().len(), mounts_before + 1);
        assert_eq!(factory.mounts().last(), Some(&(PageId(1), 804)));
    }

    #[test]
    fn test_repeated_entries_are_idempotent() {
        let (mut store, mut factory, keys) = setup(1);
        let mounts = factory.mounts().len();

        let report = ViewportVirtualizer::apply(
            &mut store,
            &mut factory,
            &[VisibilityEntry::visible(keys[0]), VisibilityEntry::visible(keys[0])],
        );
        assert!(report.is_empty());
        assert_eq!(factory.mounts().len(), mounts);

        let report = ViewportVirtualizer::apply(
            &mut store,
            &mut factory,
            &[VisibilityEntry::hidden(keys[0]), VisibilityEntry::hidden(keys[0])],
        );
        assert_eq!(report.unmounted, 1);
        assert_eq!(factory.released(), 1);
    }

    #[test]
    fn test_remount_uses_expanded_height() {
        let (mut store, mut factory, keys) = setup(1);
        let expander = ExpandController::new(300);

        ViewportVirtualizer::apply(&mut store, &mut factory, &[VisibilityEntry::hidden(keys[0])]);
        expander.expand(store.get_mut(keys[0]).unwrap());
        assert_eq!(store.get(keys[0]).unwrap().content().height(), 1104);

        ViewportVirtualizer::apply(&mut store, &mut factory, &[VisibilityEntry::visible(keys[0])]);
        assert_eq!(factory.mounts().last(), Some(&(PageId(1), 1104)));
    }

    #[test]
    fn test_stale_keys_are_ignored() {
        let (mut store, mut factory, keys) = setup(1);
        store.clear();
        store.append(vec![article(2)], full_geometry(), |id, h| factory.mount(id, h));

        let report = ViewportVirtualizer::apply(&mut store, &mut factory, &[VisibilityEntry::hidden(keys[0])]);
        assert!(report.is_empty());
        assert!(store.all()[0].is_mounted());
    }

    #[test]
    fn test_sync_drains_observer() {
        let (mut store, mut factory, keys) = setup(2);
        let observer = ScriptedObserver::default();
        let script = observer.handle();
        let mut virtualizer = ViewportVirtualizer::new(Box::new(observer));
        for key in &keys {
            virtualizer.register(*key);
        }
        script.push(VisibilityEntry::hidden(keys[1]));

        let report = virtualizer.sync(&mut store, &mut factory, &Viewport::default(), 80);
        assert_eq!(report.unmounted, 1);
        assert_eq!(script.observed(), keys);

        let report = virtualizer.sync(&mut store, &mut factory, &Viewport::default(), 80);
        assert!(report.is_empty());
    }
}
