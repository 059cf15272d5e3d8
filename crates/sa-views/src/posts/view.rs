use std::sync::Arc;

use sa_core::{MetricsSnapshot, StateTree};
use tracing::debug;

use super::{project_posts, PostQuery, PostsProjection};

/// Memoized posts table
///
/// Recomputes only when the snapshot behind the tree or the query changed.
/// Holding the snapshot `Arc` keeps its pointer unique: the store copies on
/// write while a view still references the old data.
#[derive(Default)]
pub struct PostsView {
    cached: Option<Cached>,
    recomputes: usize,
}

struct Cached {
    snapshot: Arc<MetricsSnapshot>,
    loaded: bool,
    query: PostQuery,
    projection: Arc<PostsProjection>,
}

impl PostsView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Project the posts of `tree` through `query`
    pub fn project(&mut self, tree: &StateTree, query: &PostQuery) -> Arc<PostsProjection> {
        let posts = tree.posts();
        let loaded = posts.is_some();

        if let Some(cached) = &self.cached {
            if Arc::ptr_eq(&cached.snapshot, tree.data())
                && cached.loaded == loaded
                && &cached.query == query
            {
                return Arc::clone(&cached.projection);
            }
        }

        let projection = Arc::new(project_posts(posts, query));
        self.recomputes += 1;
        debug!(
            "Posts projection recomputed ({} rows, search '{}', sort {} {:?})",
            projection.rows().len(),
            query.search,
            query.sort.key,
            query.sort.direction
        );

        self.cached = Some(Cached {
            snapshot: Arc::clone(tree.data()),
            loaded,
            query: query.clone(),
            projection: Arc::clone(&projection),
        });
        projection
    }

    /// How many times the pipeline actually ran
    pub fn recomputes(&self) -> usize {
        self.recomputes
    }

    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::posts::tests::post;
    use crate::posts::{SortConfig, SortDirection, SortKey};
    use sa_core::{Action, FilterState, PlatformId, PlatformStats, RequestClass, RequestId};

    fn loaded_tree() -> StateTree {
        let mut tree = StateTree::new(FilterState::default());
        let request_id = RequestId::new();
        tree.apply(Action::Pending {
            class: RequestClass::All,
            request_id,
        });

        let mut snapshot = MetricsSnapshot::empty();
        snapshot.recent_posts = vec![
            post(1, PlatformId::Twitter, "a", 10),
            post(2, PlatformId::Facebook, "b", 30),
        ];
        tree.apply(Action::AllFulfilled {
            request_id,
            snapshot,
        });
        tree
    }

    #[test]
    fn test_unchanged_inputs_reuse_result() {
        let tree = loaded_tree();
        let mut view = PostsView::new();
        let query = PostQuery::default();

        let first = view.project(&tree, &query);
        let second = view.project(&tree, &query.clone());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(view.recomputes(), 1);
    }

    #[test]
    fn test_query_change_recomputes() {
        let tree = loaded_tree();
        let mut view = PostsView::new();

        view.project(&tree, &PostQuery::default());
        let query = PostQuery {
            sort: SortConfig::new(SortKey::Engagement, SortDirection::Desc),
            ..PostQuery::default()
        };
        let projection = view.project(&tree, &query);

        assert_eq!(view.recomputes(), 2);
        assert_eq!(projection.rows()[0].engagement, 30);
    }

    #[test]
    fn test_new_data_recomputes() {
        let mut tree = loaded_tree();
        let mut view = PostsView::new();
        view.project(&tree, &PostQuery::default());

        let request_id = RequestId::new();
        tree.apply(Action::Pending {
            class: RequestClass::Platform,
            request_id,
        });
        tree.apply(Action::PlatformFulfilled {
            request_id,
            platform: PlatformId::Twitter,
            stats: PlatformStats::default(),
        });

        view.project(&tree, &PostQuery::default());
        assert_eq!(view.recomputes(), 2);
    }

    #[test]
    fn test_before_first_fetch() {
        let tree = StateTree::new(FilterState::default());
        let mut view = PostsView::new();
        assert_eq!(
            *view.project(&tree, &PostQuery::default()),
            PostsProjection::NotLoaded
        );
    }
}
