//! Named route configs and the name lookup built from them.

use std::rc::Rc;

use ahash::AHashMap;
use tether_core::Widget;
use tether_list::List;

/// Errors from route registration and navigation.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteError {
    /// Two routes share a name.
    DuplicateRoute(String),
    /// `go_to` named a route that is not registered.
    UnknownRoute(String),
    /// `back` on an empty history.
    EmptyHistory,
}

impl std::fmt::Display for RouteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateRoute(name) => write!(f, "duplicate route name {name:?}"),
            Self::UnknownRoute(name) => write!(f, "no route named {name:?}"),
            Self::EmptyHistory => f.write_str("history is empty"),
        }
    }
}

impl std::error::Error for RouteError {}

/// A named route and the factory producing its page widget.
#[derive(Clone)]
pub struct RouteConfig {
    name: String,
    create_page: Rc<dyn Fn() -> Widget>,
}

impl RouteConfig {
    pub fn new(name: impl Into<String>, create_page: impl Fn() -> Widget + 'static) -> Self {
        Self {
            name: name.into(),
            create_page: Rc::new(create_page),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Instantiate a fresh page for this route.
    #[must_use]
    pub fn create_page(&self) -> Widget {
        (self.create_page)()
    }
}

impl std::fmt::Debug for RouteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteConfig")
            .field("name", &self.name)
            .finish()
    }
}

/// Name → config lookup, built once from the route list.
#[derive(Clone, Debug, Default)]
pub struct RouterMatcher {
    routes: AHashMap<String, RouteConfig>,
}

impl RouterMatcher {
    /// Build the lookup, rejecting duplicate names immediately.
    pub fn new(routes: &List<RouteConfig>) -> Result<Self, RouteError> {
        let mut map = AHashMap::new();
        for slot in routes.snapshot() {
            let Some(config) = slot.into_value() else {
                continue;
            };
            if map.contains_key(config.name()) {
                return Err(RouteError::DuplicateRoute(config.name().to_owned()));
            }
            map.insert(config.name().to_owned(), config);
        }
        Ok(Self { routes: map })
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RouteConfig> {
        self.routes.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
