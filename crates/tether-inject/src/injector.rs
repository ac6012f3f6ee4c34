//! Exact-type handler registry with a use-once removal guard.
//!
//! An [`Injector`] maps a [`TypeKey`] to at most one handler. Resolving a
//! type marks its handler as used, which permanently blocks `remove_handler`
//! and `clear_handlers` for that entry: an instance the handler produced may
//! already be depended upon elsewhere, so the registration is frozen.
//!
//! [`Constructor`] describes a parameter list mixing injected and positional
//! slots; [`Injector::create`] fills the injected slots by resolution and
//! the rest from caller-supplied arguments.
//!
//! # Invariants
//!
//! 1. At most one handler per exact [`TypeKey`].
//! 2. Once `resolve` has touched an entry, that entry can never be removed.
//! 3. `create` sizes its slot vector as the maximum of the declared
//!    parameter count and the supplied argument count, so trailing
//!    arguments beyond the declared list still arrive.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Missing handler | `resolve` on an unregistered type | `InjectError::MissingHandler` |
//! | Duplicate handler | second `add_handler` for a key | `InjectError::DuplicateHandler` |
//! | Removal after use | `remove_handler`/`clear_handlers` on a used entry | `InjectError::HandlerInUse` |
//! | Handler type drift | handler produced a value of another type | `InjectError::TypeMismatch` |

use std::any::{Any, TypeId};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use ahash::AHashMap;

/// Errors from injector operations.
#[derive(Debug, Clone, PartialEq)]
pub enum InjectError {
    /// No handler is registered for the named type.
    MissingHandler(&'static str),
    /// A handler is already registered for the named type.
    DuplicateHandler(&'static str),
    /// The named type's handler was already invoked and is frozen.
    HandlerInUse(&'static str),
    /// A handler produced a value that is not of the requested type.
    TypeMismatch { expected: &'static str },
    /// A constructor build closure rejected its inputs.
    Construct(String),
}

impl std::fmt::Display for InjectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingHandler(name) => write!(f, "no injection handler for type {name}"),
            Self::DuplicateHandler(name) => {
                write!(f, "an injection handler for type {name} already exists")
            }
            Self::HandlerInUse(name) => write!(
                f,
                "the injection handler for type {name} was already used and cannot be removed"
            ),
            Self::TypeMismatch { expected } => {
                write!(f, "injection handler did not produce a value of type {expected}")
            }
            Self::Construct(msg) => write!(f, "constructor failed: {msg}"),
        }
    }
}

impl std::error::Error for InjectError {}

/// Identity of an injectable type: its `TypeId` plus the type name kept for
/// diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    #[must_use]
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Per-call-site context handed to handlers: the requested type plus an
/// optional string discriminator from the injection site.
#[derive(Clone, Debug, PartialEq)]
pub struct Injection {
    pub ty: TypeKey,
    pub param: Option<String>,
}

impl Injection {
    #[must_use]
    pub fn of<T: 'static>() -> Self {
        Self {
            ty: TypeKey::of::<T>(),
            param: None,
        }
    }

    #[must_use]
    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.param = Some(param.into());
        self
    }
}

type Handler = Rc<dyn Fn(&Injection) -> Result<Rc<dyn Any>, InjectError>>;

struct Entry {
    handler: Handler,
    used: Cell<bool>,
}

/// One constructor parameter slot.
#[derive(Clone, Debug)]
pub enum Param {
    /// Filled by resolution against the injector.
    Injected {
        ty: TypeKey,
        param: Option<String>,
    },
    /// Filled from the caller-supplied argument at the same position.
    Positional,
}

/// Resolved constructor arguments, indexed by slot position. Slots that were
/// positional but had no supplied argument are empty.
pub struct Slots(Vec<Option<Rc<dyn Any>>>);

impl Slots {
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The argument at `index`, downcast to `T`. Empty slots and wrong types
    /// both fail with a constructor error naming the slot.
    pub fn get<T: 'static>(&self, index: usize) -> Result<Rc<T>, InjectError> {
        self.0
            .get(index)
            .and_then(Option::as_ref)
            .ok_or_else(|| InjectError::Construct(format!("missing argument at slot {index}")))?
            .clone()
            .downcast::<T>()
            .map_err(|_| {
                InjectError::Construct(format!(
                    "argument at slot {index} is not of type {}",
                    std::any::type_name::<T>()
                ))
            })
    }

    /// Like [`Slots::get`], but clones the value out of its shared handle.
    pub fn value<T: Clone + 'static>(&self, index: usize) -> Result<T, InjectError> {
        Ok(self.get::<T>(index)?.as_ref().clone())
    }
}

/// Parameter-slot descriptor plus build closure for [`Injector::create`].
pub struct Constructor<T> {
    params: Vec<Param>,
    build: Rc<dyn Fn(&Slots) -> Result<T, InjectError>>,
}

impl<T> Constructor<T> {
    pub fn new(build: impl Fn(&Slots) -> Result<T, InjectError> + 'static) -> Self {
        Self {
            params: Vec::new(),
            build: Rc::new(build),
        }
    }

    /// Append a slot resolved from the injector.
    #[must_use]
    pub fn injected<D: 'static>(mut self) -> Self {
        self.params.push(Param::Injected {
            ty: TypeKey::of::<D>(),
            param: None,
        });
        self
    }

    /// Append a slot resolved from the injector with a string discriminator.
    #[must_use]
    pub fn injected_with_param<D: 'static>(mut self, param: impl Into<String>) -> Self {
        self.params.push(Param::Injected {
            ty: TypeKey::of::<D>(),
            param: Some(param.into()),
        });
        self
    }

    /// Append a slot filled from the caller's argument list.
    #[must_use]
    pub fn positional(mut self) -> Self {
        self.params.push(Param::Positional);
        self
    }

    #[must_use]
    pub fn param_count(&self) -> usize {
        self.params.len()
    }
}

/// Type-keyed registry of injection handlers. Owned by the composition
/// root; not a process-global.
#[derive(Default)]
pub struct Injector {
    entries: RefCell<AHashMap<TypeKey, Entry>>,
}

impl Injector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the single handler for `key`.
    pub fn add_handler(
        &self,
        key: TypeKey,
        handler: impl Fn(&Injection) -> Result<Rc<dyn Any>, InjectError> + 'static,
    ) -> Result<(), InjectError> {
        let mut entries = self.entries.borrow_mut();
        if entries.contains_key(&key) {
            return Err(InjectError::DuplicateHandler(key.name));
        }
        entries.insert(key, Entry {
            handler: Rc::new(handler),
            used: Cell::new(false),
        });
        Ok(())
    }

    /// Unregister the handler for `key`. Fails once the handler has
    /// produced anything.
    pub fn remove_handler(&self, key: &TypeKey) -> Result<(), InjectError> {
        let mut entries = self.entries.borrow_mut();
        let entry = entries
            .get(key)
            .ok_or(InjectError::MissingHandler(key.name))?;
        if entry.used.get() {
            return Err(InjectError::HandlerInUse(key.name));
        }
        entries.remove(key);
        Ok(())
    }

    /// Unregister every handler. Fails on the first used entry, removing
    /// nothing.
    pub fn clear_handlers(&self) -> Result<(), InjectError> {
        let mut entries = self.entries.borrow_mut();
        if let Some(key) = entries
            .iter()
            .find_map(|(key, entry)| entry.used.get().then_some(*key))
        {
            return Err(InjectError::HandlerInUse(key.name));
        }
        entries.clear();
        Ok(())
    }

    #[must_use]
    pub fn has_handler(&self, key: &TypeKey) -> bool {
        self.entries.borrow().contains_key(key)
    }

    /// Resolve `T`, marking its handler used. The handler runs with no
    /// registry borrow held, so it may re-enter the injector.
    pub fn resolve<T: 'static>(&self, param: Option<&str>) -> Result<Rc<T>, InjectError> {
        let injection = Injection {
            ty: TypeKey::of::<T>(),
            param: param.map(str::to_owned),
        };
        self.resolve_injection(&injection)?
            .downcast::<T>()
            .map_err(|_| InjectError::TypeMismatch {
                expected: injection.ty.name,
            })
    }

    /// Resolve `T` and clone the value out of its shared handle. This is
    /// the unboxing path for value types held behind `Rc` only for the
    /// registry's sake.
    pub fn resolve_value<T: Clone + 'static>(&self, param: Option<&str>) -> Result<T, InjectError> {
        Ok(self.resolve::<T>(param)?.as_ref().clone())
    }

    /// Untyped resolution against an explicit [`Injection`] context.
    pub fn resolve_injection(&self, injection: &Injection) -> Result<Rc<dyn Any>, InjectError> {
        let handler = {
            let entries = self.entries.borrow();
            let entry = entries
                .get(&injection.ty)
                .ok_or(InjectError::MissingHandler(injection.ty.name))?;
            entry.used.set(true);
            Rc::clone(&entry.handler)
        };
        handler(injection)
    }

    /// Construct a `T`: injected slots resolve against this injector,
    /// positional slots take the argument at the same index. The slot
    /// vector covers `max(declared params, supplied args)` positions.
    pub fn create<T>(
        &self,
        constructor: &Constructor<T>,
        args: Vec<Rc<dyn Any>>,
    ) -> Result<T, InjectError> {
        let count = constructor.params.len().max(args.len());
        let mut args = args.into_iter().map(Some).collect::<Vec<_>>();
        args.resize_with(count, || None);

        let mut slots = Vec::with_capacity(count);
        for (index, supplied) in args.into_iter().enumerate() {
            match constructor.params.get(index) {
                Some(Param::Injected { ty, param }) => {
                    let injection = Injection {
                        ty: *ty,
                        param: param.clone(),
                    };
                    slots.push(Some(self.resolve_injection(&injection)?));
                }
                Some(Param::Positional) | None => slots.push(supplied),
            }
        }
        (constructor.build)(&Slots(slots))
    }
}

impl std::fmt::Debug for Injector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Injector")
            .field("handlers", &self.entries.borrow().len())
            .finish()
    }
}
