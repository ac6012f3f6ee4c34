//! Registration layer over [`Injector`]: many candidates per type, one
//! dispatching handler.
//!
//! The injector itself admits a single handler per exact type. The manager
//! keeps an ordered candidate list per [`TypeKey`] and installs one handler
//! for that key on first registration; the handler picks a candidate per
//! resolution by parameter match and priority. A candidate may also serve a
//! second, more abstract key (`implements`), sharing its memoized instance
//! across both keys.
//!
//! # Invariants
//!
//! 1. Exactly one injector handler per key, installed on the first
//!    registration for that key; later registrations only extend the list.
//! 2. Candidate selection: exact parameter match first, then highest
//!    priority, ties resolved in favor of the later registration.
//! 3. A `shared` candidate's factory runs at most once; every resolution
//!    through every key it serves returns the same instance.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use ahash::AHashMap;

use crate::injector::{InjectError, Injection, Injector, TypeKey};

/// Registration options for one injectable candidate.
#[derive(Clone, Debug, Default)]
pub struct InjectableConfig {
    /// Memoize the first produced instance and return it for every
    /// subsequent resolution.
    pub shared: bool,
    /// Higher wins among candidates for the same key.
    pub priority: i32,
    /// Only selected when the injection site supplies the same
    /// discriminator (`None` matches only param-less injections).
    pub param: Option<String>,
    /// Additional key this candidate serves, for resolving an abstract type
    /// to a concrete implementation.
    pub implements: Option<TypeKey>,
}

impl InjectableConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn shared(mut self) -> Self {
        self.shared = true;
        self
    }

    #[must_use]
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn param(mut self, param: impl Into<String>) -> Self {
        self.param = Some(param.into());
        self
    }

    #[must_use]
    pub fn implements(mut self, key: TypeKey) -> Self {
        self.implements = Some(key);
        self
    }
}

struct Candidate {
    priority: i32,
    order: usize,
    shared: bool,
    param: Option<String>,
    factory: Box<dyn Fn() -> Rc<dyn Any>>,
    instance: RefCell<Option<Rc<dyn Any>>>,
}

impl Candidate {
    fn matches(&self, injection: &Injection) -> bool {
        self.param == injection.param
    }

    fn produce(&self) -> Rc<dyn Any> {
        if !self.shared {
            return (self.factory)();
        }
        let memoized = self.instance.borrow().clone();
        match memoized {
            Some(instance) => instance,
            None => {
                let instance = (self.factory)();
                *self.instance.borrow_mut() = Some(Rc::clone(&instance));
                instance
            }
        }
    }
}

type CandidateList = Rc<RefCell<Vec<Rc<Candidate>>>>;

/// Candidate registry plus the [`Injector`] it feeds.
#[derive(Default)]
pub struct InjectionManager {
    injector: Injector,
    candidates: RefCell<AHashMap<TypeKey, CandidateList>>,
    next_order: Cell<usize>,
}

impl InjectionManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The injector this manager installs its dispatch handlers into.
    #[must_use]
    pub fn injector(&self) -> &Injector {
        &self.injector
    }

    /// Register a candidate producing `T`, keyed by `T` and, when the
    /// config names one, by its `implements` key as well.
    pub fn register<T: 'static>(
        &self,
        config: InjectableConfig,
        factory: impl Fn() -> T + 'static,
    ) -> Result<(), InjectError> {
        let order = self.next_order.get();
        self.next_order.set(order + 1);

        let candidate = Rc::new(Candidate {
            priority: config.priority,
            order,
            shared: config.shared,
            param: config.param,
            factory: Box::new(move || Rc::new(factory()) as Rc<dyn Any>),
            instance: RefCell::new(None),
        });

        self.attach(TypeKey::of::<T>(), Rc::clone(&candidate))?;
        if let Some(base) = config.implements {
            self.attach(base, candidate)?;
        }
        Ok(())
    }

    fn attach(&self, key: TypeKey, candidate: Rc<Candidate>) -> Result<(), InjectError> {
        let list = {
            let mut candidates = self.candidates.borrow_mut();
            match candidates.get(&key) {
                Some(list) => {
                    list.borrow_mut().push(candidate);
                    return Ok(());
                }
                None => {
                    let list: CandidateList = Rc::new(RefCell::new(vec![candidate]));
                    candidates.insert(key, Rc::clone(&list));
                    list
                }
            }
        };
        let dispatch = Rc::clone(&list);
        self.injector.add_handler(key, move |injection| {
            let best = dispatch
                .borrow()
                .iter()
                .filter(|c| c.matches(injection))
                .max_by_key(|c| (c.priority, c.order))
                .cloned()
                .ok_or(InjectError::MissingHandler(injection.ty.name()))?;
            Ok(best.produce())
        })
    }
}

impl std::fmt::Debug for InjectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InjectionManager")
            .field("keys", &self.candidates.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Theme {
        accent: &'static str,
    }

    // Abstract key stand-in: resolution happens by key, not by trait.
    struct ThemeLike;

    // ── Sharing ─────────────────────────────────────────────────────

    #[test]
    fn shared_candidate_is_memoized() {
        let manager = InjectionManager::new();
        let builds = Rc::new(Cell::new(0));
        let counter = Rc::clone(&builds);
        manager
            .register(InjectableConfig::new().shared(), move || {
                counter.set(counter.get() + 1);
                Theme { accent: "teal" }
            })
            .unwrap();

        let a = manager.injector().resolve::<Theme>(None).unwrap();
        let b = manager.injector().resolve::<Theme>(None).unwrap();
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(builds.get(), 1);
    }

    #[test]
    fn default_candidate_builds_fresh_per_resolve() {
        let manager = InjectionManager::new();
        let builds = Rc::new(Cell::new(0));
        let counter = Rc::clone(&builds);
        manager
            .register(InjectableConfig::new(), move || {
                counter.set(counter.get() + 1);
                Theme { accent: "teal" }
            })
            .unwrap();

        let a = manager.injector().resolve::<Theme>(None).unwrap();
        let b = manager.injector().resolve::<Theme>(None).unwrap();
        assert!(!Rc::ptr_eq(&a, &b));
        assert_eq!(builds.get(), 2);
    }

    // ── Priority ────────────────────────────────────────────────────

    #[test]
    fn highest_priority_wins() {
        let manager = InjectionManager::new();
        manager
            .register(InjectableConfig::new().priority(5), || Theme {
                accent: "high",
            })
            .unwrap();
        manager
            .register(InjectableConfig::new().priority(1), || Theme {
                accent: "low",
            })
            .unwrap();

        let theme = manager.injector().resolve::<Theme>(None).unwrap();
        assert_eq!(theme.accent, "high");
    }

    #[test]
    fn priority_tie_favors_later_registration() {
        let manager = InjectionManager::new();
        manager
            .register(InjectableConfig::new(), || Theme { accent: "first" })
            .unwrap();
        manager
            .register(InjectableConfig::new(), || Theme { accent: "second" })
            .unwrap();

        let theme = manager.injector().resolve::<Theme>(None).unwrap();
        assert_eq!(theme.accent, "second");
    }

    // ── Parameter dispatch ──────────────────────────────────────────

    #[test]
    fn param_candidates_require_an_exact_match() {
        let manager = InjectionManager::new();
        manager
            .register(InjectableConfig::new(), || Theme { accent: "plain" })
            .unwrap();
        manager
            .register(InjectableConfig::new().param("dark"), || Theme {
                accent: "dark",
            })
            .unwrap();

        let plain = manager.injector().resolve::<Theme>(None).unwrap();
        assert_eq!(plain.accent, "plain");
        let dark = manager.injector().resolve::<Theme>(Some("dark")).unwrap();
        assert_eq!(dark.accent, "dark");
    }

    #[test]
    fn unmatched_param_is_a_missing_handler() {
        let manager = InjectionManager::new();
        manager
            .register(InjectableConfig::new().param("dark"), || Theme {
                accent: "dark",
            })
            .unwrap();

        let err = manager.injector().resolve::<Theme>(None).unwrap_err();
        assert!(matches!(err, InjectError::MissingHandler(_)));
        let err = manager
            .injector()
            .resolve::<Theme>(Some("light"))
            .unwrap_err();
        assert!(matches!(err, InjectError::MissingHandler(_)));
    }

    // ── implements ──────────────────────────────────────────────────

    #[test]
    fn implements_serves_the_base_key() {
        let manager = InjectionManager::new();
        manager
            .register(
                InjectableConfig::new()
                    .shared()
                    .implements(TypeKey::of::<ThemeLike>()),
                || Theme { accent: "teal" },
            )
            .unwrap();

        // Resolving through the base key yields the concrete instance,
        // untyped since the base is only a key.
        let injection = Injection::of::<ThemeLike>();
        let resolved = manager.injector().resolve_injection(&injection).unwrap();
        let concrete = resolved.downcast::<Theme>().unwrap();
        assert_eq!(concrete.accent, "teal");

        // Shared instance is the same through both keys.
        let direct = manager.injector().resolve::<Theme>(None).unwrap();
        assert!(Rc::ptr_eq(&direct, &concrete));
    }

    #[test]
    fn later_registrations_reuse_the_installed_handler() {
        let manager = InjectionManager::new();
        manager
            .register(InjectableConfig::new(), || Theme { accent: "a" })
            .unwrap();
        // The key's dispatch handler already exists; this must extend the
        // candidate list rather than hit the duplicate guard.
        manager
            .register(InjectableConfig::new().priority(1), || Theme {
                accent: "b",
            })
            .unwrap();
        let theme = manager.injector().resolve::<Theme>(None).unwrap();
        assert_eq!(theme.accent, "b");
    }
}
