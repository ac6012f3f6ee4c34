//! History-driven navigation: an observable history list keeps a navigation
//! widget's children structurally synchronized.
//!
//! Every history mutation flows through a [`ListObserver`] into the
//! navigation widget: deleted entries dispose the corresponding trailing
//! children, inserted entries instantiate the matched route's page and
//! append it. Disposal detaches a child silently, so servicing a mutation
//! never re-enters the router. If the host removes a navigation child on its
//! own (a back gesture), the `childRemoved` event pops the router's history
//! until `history.len() == nav child count` again.
//!
//! # Invariants
//!
//! 1. After any router operation or host child removal returns, the history
//!    length equals the navigation widget's child count.
//! 2. Each `go_to` instantiates exactly one fresh page.
//! 3. Route lookup is frozen at construction; the matcher rejects duplicate
//!    names before the router exists.

use std::rc::Rc;

use tether_core::{EVENT_CHILD_REMOVED, Subscription, Widget};
use tether_list::{List, ListObserver, ListSource, Mutation};

use crate::matcher::{RouteConfig, RouteError, RouterMatcher};

/// One history entry: the route name it was navigated to.
#[derive(Clone, Debug, PartialEq)]
pub struct HistoryItem {
    pub route: String,
}

impl HistoryItem {
    #[must_use]
    pub fn new(route: impl Into<String>) -> Self {
        Self {
            route: route.into(),
        }
    }
}

struct RouterInner {
    nav: Widget,
    matcher: RouterMatcher,
    history: List<HistoryItem>,
    // Held for lifetime only: the observer owns the history subscription,
    // the guard owns the childRemoved listener.
    _observer: ListObserver<HistoryItem>,
    _child_removed: Subscription,
}

/// Owns a navigation widget and the history list that drives it.
#[derive(Clone)]
pub struct Router {
    inner: Rc<RouterInner>,
}

impl Router {
    /// Build a router over `nav` from the route list. Fails on duplicate
    /// route names.
    pub fn new(nav: Widget, routes: &List<RouteConfig>) -> Result<Self, RouteError> {
        let matcher = RouterMatcher::new(routes)?;
        let history: List<HistoryItem> = List::new();

        let mut observer = {
            let nav = nav.clone();
            let matcher = matcher.clone();
            ListObserver::new(move |mutation: &Mutation<HistoryItem>| {
                service_history_mutation(&nav, &matcher, mutation);
            })
        };
        observer.set_source(Some(ListSource::Observed(history.clone())));

        let child_removed = {
            let nav_cb = nav.clone();
            let history = history.clone();
            nav.on(EVENT_CHILD_REMOVED, move |_| {
                // Host-initiated removal: shrink our history to match. The
                // resulting delete mutation lands past the shortened child
                // list, so servicing it disposes nothing further.
                let target = nav_cb.child_count();
                if history.len() > target && history.set_length(target as f64).is_err() {
                    tracing::error!("failed to reconcile history after child removal");
                }
            })
        };

        Ok(Self {
            inner: Rc::new(RouterInner {
                nav,
                matcher,
                history,
                _observer: observer,
                _child_removed: child_removed,
            }),
        })
    }

    /// Navigate to a named route: push a history entry and append the
    /// instantiated page.
    pub fn go_to(&self, name: &str) -> Result<(), RouteError> {
        if self.inner.matcher.get(name).is_none() {
            return Err(RouteError::UnknownRoute(name.to_owned()));
        }
        tracing::debug!(route = name, "navigating");
        self.inner.history.push(HistoryItem::new(name));
        Ok(())
    }

    /// Navigate back: pop the newest history entry and dispose its page.
    pub fn back(&self) -> Result<HistoryItem, RouteError> {
        self.inner.history.pop().ok_or(RouteError::EmptyHistory)
    }

    /// The newest history entry.
    #[must_use]
    pub fn current(&self) -> Option<HistoryItem> {
        let len = self.inner.history.len();
        len.checked_sub(1).and_then(|i| self.inner.history.get(i))
    }

    #[must_use]
    pub fn history(&self) -> List<HistoryItem> {
        self.inner.history.clone()
    }

    #[must_use]
    pub fn nav(&self) -> &Widget {
        &self.inner.nav
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.inner.matcher.len())
            .field("history", &self.inner.history.len())
            .finish()
    }
}

/// Apply one history mutation to the navigation widget: dispose the deleted
/// range's children, then instantiate and append pages for the insertions.
fn service_history_mutation(nav: &Widget, matcher: &RouterMatcher, mutation: &Mutation<HistoryItem>) {
    let children = nav.children();
    for child in children
        .iter()
        .skip(mutation.start)
        .take(mutation.delete_count)
    {
        child.dispose();
    }
    for slot in &mutation.items {
        let Some(item) = slot.value() else { continue };
        let Some(config) = matcher.get(&item.route) else {
            // go_to validates names; a foreign push of an unknown route is
            // skipped rather than desynchronizing the view.
            tracing::warn!(route = %item.route, "history entry without a matching route");
            continue;
        };
        let page = config.create_page();
        if let Err(err) = nav.append(&page) {
            tracing::error!(route = %item.route, error = %err, "failed to append page");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn routes() -> List<RouteConfig> {
        List::from([
            RouteConfig::new("home", || Widget::new("HomePage")),
            RouteConfig::new("about", || Widget::new("AboutPage")),
        ])
    }

    fn router() -> Router {
        Router::new(Widget::new("NavigationView"), &routes()).unwrap()
    }

    // ── Navigation ──────────────────────────────────────────────────

    #[test]
    fn go_to_appends_the_matched_page() {
        let router = router();
        router.go_to("home").unwrap();
        router.go_to("about").unwrap();

        let children = router.nav().children();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].type_name(), "HomePage");
        assert_eq!(children[1].type_name(), "AboutPage");
        assert_eq!(router.current(), Some(HistoryItem::new("about")));
    }

    #[test]
    fn go_to_unknown_route_fails_without_history_change() {
        let router = router();
        let err = router.go_to("missing").unwrap_err();
        assert_eq!(err, RouteError::UnknownRoute("missing".to_owned()));
        assert_eq!(router.history().len(), 0);
        assert_eq!(router.nav().child_count(), 0);
    }

    #[test]
    fn back_disposes_the_newest_page() {
        let router = router();
        router.go_to("home").unwrap();
        router.go_to("about").unwrap();
        let about = router.nav().children()[1].clone();

        let popped = router.back().unwrap();
        assert_eq!(popped, HistoryItem::new("about"));
        assert!(about.is_disposed());
        assert_eq!(router.nav().child_count(), 1);
        assert_eq!(router.current(), Some(HistoryItem::new("home")));
    }

    #[test]
    fn back_on_empty_history_fails() {
        let router = router();
        assert_eq!(router.back().unwrap_err(), RouteError::EmptyHistory);
    }

    #[test]
    fn each_go_to_instantiates_a_fresh_page() {
        let router = router();
        router.go_to("home").unwrap();
        router.go_to("home").unwrap();
        let children = router.nav().children();
        assert_eq!(children.len(), 2);
        assert!(!children[0].ptr_eq(&children[1]));
    }

    // ── Host-initiated reconciliation ───────────────────────────────

    #[test]
    fn host_child_removal_pops_history_to_match() {
        let router = router();
        router.go_to("home").unwrap();
        router.go_to("about").unwrap();

        // A back gesture: the host removes the top page directly.
        let top = router.nav().children()[1].clone();
        assert!(router.nav().remove_child(&top));

        assert_eq!(router.history().len(), 1);
        assert_eq!(router.nav().child_count(), 1);
        assert_eq!(router.current(), Some(HistoryItem::new("home")));
    }

    #[test]
    fn host_removing_everything_empties_the_history() {
        let router = router();
        router.go_to("home").unwrap();
        router.go_to("about").unwrap();

        for child in router.nav().children() {
            router.nav().remove_child(&child);
        }
        assert_eq!(router.history().len(), 0);
        assert_eq!(router.back().unwrap_err(), RouteError::EmptyHistory);
    }

    #[test]
    fn history_length_matches_child_count_through_mixed_traffic() {
        let router = router();
        router.go_to("home").unwrap();
        router.go_to("about").unwrap();
        router.back().unwrap();
        router.go_to("about").unwrap();
        let top = router.nav().children()[1].clone();
        router.nav().remove_child(&top);
        router.go_to("home").unwrap();

        assert_eq!(router.history().len(), router.nav().child_count());
        assert_eq!(router.history().len(), 2);
    }
}
