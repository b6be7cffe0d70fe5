//! Type-erased callables attached to registered members.
//!
//! A [`Callable`] is a closed set of call shapes. The shape is known when the
//! callable is registered, so recovering it never needs runtime type identity
//! checks: [`Callable::call`] only validates arity and the receiver handle.

use std::fmt;
use std::sync::Arc;

use crate::{CallError, ObjectHandle, Value};

type GetterFn = dyn Fn(ObjectHandle) -> Value + Send + Sync;
type SetterFn = dyn Fn(ObjectHandle, Value) + Send + Sync;
type NullaryFn = dyn Fn() -> Value + Send + Sync;
type UnaryFn = dyn Fn(Value) -> Value + Send + Sync;
type BinaryFn = dyn Fn(Value, Value) -> Value + Send + Sync;

/// Type-erased callable for a property accessor or function.
///
/// The inner closures are wrapped in `Arc` so the registry can hand out a
/// clone and invoke it after releasing its lock.
#[derive(Clone)]
pub enum Callable {
    /// Property getter: `(self) -> T`.
    Getter(Arc<GetterFn>),
    /// Property setter: `(self, T)`.
    Setter(Arc<SetterFn>),
    /// Zero-argument function.
    Nullary(Arc<NullaryFn>),
    /// One-argument function. Methods receive the handle as the argument.
    Unary(Arc<UnaryFn>),
    /// Two-argument function. Methods receive the handle first.
    Binary(Arc<BinaryFn>),
    /// Implemented by the host runtime and reachable only through the
    /// generated bridge.
    Host,
}

/// The call shape of a [`Callable`], without the closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallShape {
    Getter,
    Setter,
    Nullary,
    Unary,
    Binary,
    Host,
}

impl Callable {
    pub fn getter<F>(f: F) -> Self
    where
        F: Fn(ObjectHandle) -> Value + Send + Sync + 'static,
    {
        Callable::Getter(Arc::new(f))
    }

    pub fn setter<F>(f: F) -> Self
    where
        F: Fn(ObjectHandle, Value) + Send + Sync + 'static,
    {
        Callable::Setter(Arc::new(f))
    }

    pub fn nullary<F>(f: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Callable::Nullary(Arc::new(f))
    }

    pub fn unary<F>(f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        Callable::Unary(Arc::new(f))
    }

    pub fn binary<F>(f: F) -> Self
    where
        F: Fn(Value, Value) -> Value + Send + Sync + 'static,
    {
        Callable::Binary(Arc::new(f))
    }

    /// Get the call shape.
    pub fn shape(&self) -> CallShape {
        match self {
            Callable::Getter(_) => CallShape::Getter,
            Callable::Setter(_) => CallShape::Setter,
            Callable::Nullary(_) => CallShape::Nullary,
            Callable::Unary(_) => CallShape::Unary,
            Callable::Binary(_) => CallShape::Binary,
            Callable::Host => CallShape::Host,
        }
    }

    /// Number of arguments the callable expects, `None` for host callables.
    pub fn arity(&self) -> Option<usize> {
        match self {
            Callable::Nullary(_) => Some(0),
            Callable::Getter(_) | Callable::Unary(_) => Some(1),
            Callable::Setter(_) | Callable::Binary(_) => Some(2),
            Callable::Host => None,
        }
    }

    /// Invoke the callable.
    ///
    /// Getters and setters require a [`Value::Handle`] as their first
    /// argument. Setters return [`Value::Void`].
    pub fn call(&self, args: &[Value]) -> Result<Value, CallError> {
        let Some(expected) = self.arity() else {
            return Err(CallError::HostBound);
        };
        if args.len() != expected {
            return Err(CallError::ArityMismatch {
                expected,
                found: args.len(),
            });
        }

        match self {
            Callable::Getter(f) => Ok(f(receiver(&args[0])?)),
            Callable::Setter(f) => {
                f(receiver(&args[0])?, args[1].clone());
                Ok(Value::Void)
            }
            Callable::Nullary(f) => Ok(f()),
            Callable::Unary(f) => Ok(f(args[0].clone())),
            Callable::Binary(f) => Ok(f(args[0].clone(), args[1].clone())),
            Callable::Host => Err(CallError::HostBound),
        }
    }
}

fn receiver(value: &Value) -> Result<ObjectHandle, CallError> {
    value.as_handle().ok_or(CallError::ExpectedHandle {
        found: value.type_name(),
    })
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Callable").field(&self.shape()).finish()
    }
}
